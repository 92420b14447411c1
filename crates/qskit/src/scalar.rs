//! Leaf codecs for primitive and well-known types
//!
//! Primitive codecs check the runtime kind of the value rather than its exact
//! type, so one codec serves every width of an integer family. Integers are
//! written in base 10 and read with an optional `0x`, `0o`, `0b` or leading
//! `0` (octal) prefix, bounded by the width of the target. Floats that
//! overflow the target width are rejected rather than read as infinity.

use std::any::{Any, type_name};
use std::num::IntErrorKind;
use std::sync::Arc;

use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use url::Url;

use crate::codec::{Marshaler, Unmarshaler};
use crate::error::{QsError, QsResult};
use crate::options::{MarshalOptions, UnmarshalOptions};
use crate::reflect::{
    ScalarKind, TextHook, TypeDescriptor, Value, WellKnown, downcast_mut, downcast_ref,
};

/// Text that is not a valid number or boolean
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("invalid syntax")]
    Invalid,

    #[error("value out of range")]
    OutOfRange,
}

macro_rules! render_as {
    ($any:expr => $($ty:ty),+) => {{
        $(
            if let Some(value) = $any.downcast_ref::<$ty>() {
                return Some(value.to_string());
            }
        )+
        None
    }};
}

macro_rules! assign_parsed {
    ($any:expr, $text:expr, $parse:ident => $($ty:ty),+) => {{
        $(
            if let Some(slot) = $any.downcast_mut::<$ty>() {
                *slot = $parse::<$ty>($text)?;
                return Ok(true);
            }
        )+
        Ok(false)
    }};
}

macro_rules! is_zero_as {
    ($any:expr, $zero:expr => $($ty:ty),+) => {{
        $(
            if let Some(value) = $any.downcast_ref::<$ty>() {
                return *value == $zero;
            }
        )+
        false
    }};
}

fn render(kind: ScalarKind, any: &dyn Any) -> Option<String> {
    match kind {
        ScalarKind::Bool => render_as!(any => bool),
        ScalarKind::Int => render_as!(any => i8, i16, i32, i64, isize),
        ScalarKind::Uint => render_as!(any => u8, u16, u32, u64, usize),
        ScalarKind::Float => render_as!(any => f32, f64),
        ScalarKind::String => any.downcast_ref::<String>().cloned(),
    }
}

/// Returns `Ok(false)` if the value is not of the kind's family.
fn assign(kind: ScalarKind, any: &mut dyn Any, text: &str) -> QsResult<bool> {
    match kind {
        ScalarKind::Bool => assign_parsed!(any, text, parse_bool => bool),
        ScalarKind::Int => assign_parsed!(any, text, parse_signed => i8, i16, i32, i64, isize),
        ScalarKind::Uint => assign_parsed!(any, text, parse_unsigned => u8, u16, u32, u64, usize),
        ScalarKind::Float => assign_parsed!(any, text, parse_float => f32, f64),
        ScalarKind::String => match any.downcast_mut::<String>() {
            Some(slot) => {
                text.clone_into(slot);
                Ok(true)
            }
            None => Ok(false),
        },
    }
}

/// Whether a primitive value is its kind's empty value
pub(crate) fn is_zero(kind: ScalarKind, value: &dyn Value) -> bool {
    let any = value.as_any();
    match kind {
        ScalarKind::Bool => is_zero_as!(any, false => bool),
        ScalarKind::Int => is_zero_as!(any, 0 => i8, i16, i32, i64, isize),
        ScalarKind::Uint => is_zero_as!(any, 0 => u8, u16, u32, u64, usize),
        ScalarKind::Float => is_zero_as!(any, 0.0 => f32, f64),
        ScalarKind::String => any.downcast_ref::<String>().is_some_and(String::is_empty),
    }
}

/// Parse a boolean the way query strings commonly spell it
pub fn parse_bool<T: From<bool>>(text: &str) -> QsResult<T> {
    match text {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(T::from(true)),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(T::from(false)),
        _ => Err(QsError::parse(text, type_name::<T>(), SyntaxError::Invalid)),
    }
}

fn split_radix(digits: &str) -> (u32, &str) {
    let prefixed = |lower: &str, upper: &str| {
        digits.strip_prefix(lower).or_else(|| digits.strip_prefix(upper))
    };
    if let Some(rest) = prefixed("0x", "0X") {
        (16, rest)
    } else if let Some(rest) = prefixed("0o", "0O") {
        (8, rest)
    } else if let Some(rest) = prefixed("0b", "0B") {
        (2, rest)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, &digits[1..])
    } else {
        (10, digits)
    }
}

/// Splits `text` into its sign and magnitude
fn parse_magnitude(text: &str) -> Result<(bool, u128), SyntaxError> {
    let (negative, unsigned) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let (radix, digits) = split_radix(unsigned);
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return Err(SyntaxError::Invalid);
    }
    let magnitude = u128::from_str_radix(digits, radix).map_err(|err| match err.kind() {
        IntErrorKind::PosOverflow => SyntaxError::OutOfRange,
        _ => SyntaxError::Invalid,
    })?;
    Ok((negative, magnitude))
}

/// Parse a signed integer bounded by the width of `T`
pub fn parse_signed<T: TryFrom<i128>>(text: &str) -> QsResult<T> {
    let fail = |err: SyntaxError| QsError::parse(text, type_name::<T>(), err);
    let (negative, magnitude) = parse_magnitude(text).map_err(fail)?;
    let magnitude = i128::try_from(magnitude).map_err(|_| fail(SyntaxError::OutOfRange))?;
    let value = if negative { -magnitude } else { magnitude };
    T::try_from(value).map_err(|_| fail(SyntaxError::OutOfRange))
}

/// Parse an unsigned integer bounded by the width of `T`
pub fn parse_unsigned<T: TryFrom<u128>>(text: &str) -> QsResult<T> {
    let fail = |err: SyntaxError| QsError::parse(text, type_name::<T>(), err);
    let (negative, magnitude) = parse_magnitude(text).map_err(fail)?;
    if negative {
        return Err(fail(SyntaxError::Invalid));
    }
    T::try_from(magnitude).map_err(|_| fail(SyntaxError::OutOfRange))
}

trait FloatWidth: std::str::FromStr<Err = std::num::ParseFloatError> {
    fn is_infinite(&self) -> bool;
}

macro_rules! impl_float_width {
    ($($ty:ty),+) => {
        $(
            impl FloatWidth for $ty {
                fn is_infinite(&self) -> bool {
                    <$ty>::is_infinite(*self)
                }
            }
        )+
    };
}

impl_float_width!(f32, f64);

fn is_infinity_literal(text: &str) -> bool {
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

/// Parse a float, failing when finite text overflows the width of `T`
fn parse_float<T: FloatWidth>(text: &str) -> QsResult<T> {
    let value = text
        .parse::<T>()
        .map_err(|err| QsError::parse(text, type_name::<T>(), err))?;
    if value.is_infinite() && !is_infinity_literal(text) {
        return Err(QsError::parse(text, type_name::<T>(), SyntaxError::OutOfRange));
    }
    Ok(value)
}

/// Codec for bool, the integer families, floats and `String`
#[derive(Debug, Clone)]
pub struct ScalarCodec {
    kind: ScalarKind,
}

impl ScalarCodec {
    pub fn new(kind: ScalarKind) -> Self {
        Self { kind }
    }

    fn mismatch(&self, value: &dyn Value) -> QsError {
        QsError::KindMismatch {
            actual: value.type_name(),
            expected: self.kind.into(),
        }
    }
}

impl Marshaler for ScalarCodec {
    fn marshal(&self, value: &dyn Value, _opts: &MarshalOptions) -> QsResult<Vec<String>> {
        render(self.kind, value.as_any())
            .map(|text| vec![text])
            .ok_or_else(|| self.mismatch(value))
    }
}

impl Unmarshaler for ScalarCodec {
    fn unmarshal(
        &self,
        value: &mut dyn Value,
        values: Option<&[String]>,
        opts: &UnmarshalOptions,
    ) -> QsResult<()> {
        let Some(values) = values else {
            return Ok(());
        };
        let text = (opts.collapse)(values)?;
        if assign(self.kind, value.as_any_mut(), &text)? {
            Ok(())
        } else {
            Err(self.mismatch(value))
        }
    }
}

/// Codec for `time::OffsetDateTime` (RFC 3339) and `url::Url`
#[derive(Debug, Clone)]
pub struct WellKnownCodec {
    desc: TypeDescriptor,
    kind: WellKnown,
}

impl WellKnownCodec {
    pub fn new(desc: &TypeDescriptor, kind: WellKnown) -> Self {
        Self {
            desc: desc.clone(),
            kind,
        }
    }
}

impl Marshaler for WellKnownCodec {
    fn marshal(&self, value: &dyn Value, _opts: &MarshalOptions) -> QsResult<Vec<String>> {
        self.desc.check(value)?;
        let text = match self.kind {
            WellKnown::Timestamp => downcast_ref::<OffsetDateTime>(value)?
                .format(&Rfc3339)
                .map_err(|err| QsError::Render {
                    target: self.desc.name(),
                    source: Arc::new(err),
                })?,
            WellKnown::Url => downcast_ref::<Url>(value)?.to_string(),
        };
        Ok(vec![text])
    }
}

impl Unmarshaler for WellKnownCodec {
    fn unmarshal(
        &self,
        value: &mut dyn Value,
        values: Option<&[String]>,
        opts: &UnmarshalOptions,
    ) -> QsResult<()> {
        self.desc.check(value)?;
        let Some(values) = values else {
            return Ok(());
        };
        let text = (opts.collapse)(values)?;
        match self.kind {
            WellKnown::Timestamp => {
                *downcast_mut::<OffsetDateTime>(value)? = OffsetDateTime::parse(&text, &Rfc3339)
                    .map_err(|err| QsError::parse(&text, self.desc.name(), err))?;
            }
            WellKnown::Url => {
                *downcast_mut::<Url>(value)? =
                    Url::parse(&text).map_err(|err| QsError::parse(&text, self.desc.name(), err))?;
            }
        }
        Ok(())
    }
}

/// Codec for types that render and parse themselves as a single string
#[derive(Clone)]
pub struct TextCodec {
    desc: TypeDescriptor,
    hook: Arc<dyn TextHook>,
}

impl TextCodec {
    pub fn new(desc: &TypeDescriptor, hook: Arc<dyn TextHook>) -> Self {
        Self {
            desc: desc.clone(),
            hook,
        }
    }
}

impl Marshaler for TextCodec {
    fn marshal(&self, value: &dyn Value, _opts: &MarshalOptions) -> QsResult<Vec<String>> {
        self.desc.check(value)?;
        Ok(vec![self.hook.render(value)?])
    }
}

impl Unmarshaler for TextCodec {
    fn unmarshal(
        &self,
        value: &mut dyn Value,
        values: Option<&[String]>,
        opts: &UnmarshalOptions,
    ) -> QsResult<()> {
        self.desc.check(value)?;
        let Some(values) = values else {
            return Ok(());
        };
        let text = (opts.collapse)(values)?;
        self.hook.parse_into(value, &text)
    }
}

impl std::fmt::Debug for TextCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextCodec")
            .field("type", &self.desc.name())
            .finish()
    }
}
