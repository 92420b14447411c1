//! Type descriptors
//!
//! Codecs are built from a [`TypeDescriptor`] rather than from the value
//! itself. A descriptor identifies the type, names its [`Shape`] and carries
//! the optional hooks a type can use to take over its own encoding. Shapes
//! hold type-erased accessors so the codec layer can walk optionals,
//! sequences, maps and records behind `&dyn Value`.

use std::any::{Any, TypeId, type_name};
use std::error::Error as StdError;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{QsError, QsResult};
use crate::options::{MarshalOptions, UnmarshalOptions};

/// Object-safe view of a reflectable value
pub trait Value: Any + Send + Sync + 'static {
    /// Name of the concrete type
    fn type_name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Reflect> Value for T {
    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl dyn Value {
    /// `TypeId` of the concrete type behind this value
    pub fn value_type_id(&self) -> TypeId {
        Any::type_id(self.as_any())
    }

    pub fn is<T: Any>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

/// Implemented by every type that can be marshaled to or from query strings
///
/// Usually derived with `#[derive(Reflect)]`.
pub trait Reflect: Any + Send + Sync + Sized {
    /// Describes the type to the codec factories
    fn descriptor() -> TypeDescriptor;

    /// Returns the value decoding starts from when it has to allocate one
    ///
    /// `None` means the type has no zero value; decoding that needs one fails.
    fn zero() -> Option<Self>;
}

/// Coarse runtime kind of a type, used in error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    Int,
    Uint,
    Float,
    String,
    Timestamp,
    Url,
    Optional,
    Record,
    Map,
    Array,
    Seq,
    Opaque,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Uint => "uint",
            Kind::Float => "float",
            Kind::String => "string",
            Kind::Timestamp => "timestamp",
            Kind::Url => "url",
            Kind::Optional => "optional",
            Kind::Record => "record",
            Kind::Map => "map",
            Kind::Array => "array",
            Kind::Seq => "seq",
            Kind::Opaque => "opaque",
        };
        f.write_str(name)
    }
}

/// Primitive scalar families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    /// `i8`, `i16`, `i32`, `i64` and `isize`
    Int,
    /// `u8`, `u16`, `u32`, `u64` and `usize`
    Uint,
    /// `f32` and `f64`
    Float,
    String,
}

impl From<ScalarKind> for Kind {
    fn from(kind: ScalarKind) -> Self {
        match kind {
            ScalarKind::Bool => Kind::Bool,
            ScalarKind::Int => Kind::Int,
            ScalarKind::Uint => Kind::Uint,
            ScalarKind::Float => Kind::Float,
            ScalarKind::String => Kind::String,
        }
    }
}

/// Value types with a fixed single-string encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnown {
    /// `time::OffsetDateTime`, RFC 3339
    Timestamp,
    /// `url::Url`, canonical serialization
    Url,
}

impl From<WellKnown> for Kind {
    fn from(kind: WellKnown) -> Self {
        match kind {
            WellKnown::Timestamp => Kind::Timestamp,
            WellKnown::Url => Kind::Url,
        }
    }
}

/// Structural shape of a type
#[derive(Clone)]
pub enum Shape {
    Optional(Arc<dyn OptionalAccess>),
    Record(Arc<[FieldInfo]>),
    Map(Arc<dyn MapAccess>),
    /// Fixed-length sequence
    Array(Arc<dyn SeqAccess>),
    /// Variable-length sequence
    Seq(Arc<dyn SeqAccess>),
    WellKnown(WellKnown),
    Scalar(ScalarKind),
    /// No generic handling; only hooks or custom factories apply
    Opaque,
}

impl Shape {
    pub fn kind(&self) -> Kind {
        match self {
            Shape::Optional(_) => Kind::Optional,
            Shape::Record(_) => Kind::Record,
            Shape::Map(_) => Kind::Map,
            Shape::Array(_) => Kind::Array,
            Shape::Seq(_) => Kind::Seq,
            Shape::WellKnown(known) => (*known).into(),
            Shape::Scalar(scalar) => (*scalar).into(),
            Shape::Opaque => Kind::Opaque,
        }
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Record(fields) => f
                .debug_tuple("Record")
                .field(&fields.iter().map(|field| field.name).collect::<Vec<_>>())
                .finish(),
            Shape::WellKnown(known) => f.debug_tuple("WellKnown").field(known).finish(),
            Shape::Scalar(scalar) => f.debug_tuple("Scalar").field(scalar).finish(),
            other => write!(f, "{:?}", other.kind()),
        }
    }
}

/// One declared field of a record
#[derive(Clone, Copy)]
pub struct FieldInfo {
    /// Declared field name
    pub name: &'static str,
    /// Raw annotation string, parsed when the record codec is built
    pub tag: Option<&'static str>,
    /// Merge the field's own keys into the parent instead of nesting
    pub flatten: bool,
    pub descriptor: fn() -> TypeDescriptor,
    pub get: fn(&dyn Value) -> Option<&dyn Value>,
    pub get_mut: fn(&mut dyn Value) -> Option<&mut dyn Value>,
}

impl FieldInfo {
    pub fn new(
        name: &'static str,
        tag: Option<&'static str>,
        flatten: bool,
        descriptor: fn() -> TypeDescriptor,
        get: fn(&dyn Value) -> Option<&dyn Value>,
        get_mut: fn(&mut dyn Value) -> Option<&mut dyn Value>,
    ) -> Self {
        Self {
            name,
            tag,
            flatten,
            descriptor,
            get,
            get_mut,
        }
    }
}

impl fmt::Debug for FieldInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldInfo")
            .field("name", &self.name)
            .field("tag", &self.tag)
            .field("flatten", &self.flatten)
            .finish()
    }
}

/// Accessor for `Option<T>`
pub trait OptionalAccess: Send + Sync {
    fn inner(&self) -> TypeDescriptor;

    fn get<'a>(&self, value: &'a dyn Value) -> QsResult<Option<&'a dyn Value>>;

    /// Allocates the inner value from its zero value if it is absent
    fn get_or_insert<'a>(&self, value: &'a mut dyn Value) -> QsResult<&'a mut dyn Value>;
}

/// Accessor for fixed and variable length sequences
pub trait SeqAccess: Send + Sync {
    fn element(&self) -> TypeDescriptor;

    /// Declared length of a fixed-length sequence
    fn fixed_len(&self) -> Option<usize>;

    fn len(&self, value: &dyn Value) -> QsResult<usize>;

    fn get<'a>(&self, value: &'a dyn Value, index: usize) -> QsResult<&'a dyn Value>;

    fn get_mut<'a>(&self, value: &'a mut dyn Value, index: usize) -> QsResult<&'a mut dyn Value>;

    /// Sets the length, growing with zero values
    fn resize(&self, value: &mut dyn Value, len: usize) -> QsResult<()>;
}

/// Accessor for associative containers
pub trait MapAccess: Send + Sync {
    fn key(&self) -> TypeDescriptor;

    fn value(&self) -> TypeDescriptor;

    fn len(&self, map: &dyn Value) -> QsResult<usize>;

    fn entries<'a>(&self, map: &'a dyn Value) -> QsResult<Vec<(&'a str, &'a dyn Value)>>;

    /// Inserts a zero value under `key` after `fill` has decoded into it
    fn insert_with(
        &self,
        map: &mut dyn Value,
        key: &str,
        fill: &mut dyn FnMut(&mut dyn Value) -> QsResult<()>,
    ) -> QsResult<()>;
}

/// A type that encodes and decodes itself
///
/// Checked before any other dispatch rule, so it overrides the built-in
/// handling of whatever shape the type has.
pub trait SelfDescribing {
    fn marshal_qs(&self, opts: &MarshalOptions) -> QsResult<Vec<String>>;

    /// `values` is `None` when the field's wire key is absent
    fn unmarshal_qs(&mut self, values: Option<&[String]>, opts: &UnmarshalOptions) -> QsResult<()>;
}

/// Type-erased [`SelfDescribing`] implementation
pub trait SelfDescribingHook: Send + Sync {
    fn marshal(&self, value: &dyn Value, opts: &MarshalOptions) -> QsResult<Vec<String>>;

    fn unmarshal(
        &self,
        value: &mut dyn Value,
        values: Option<&[String]>,
        opts: &UnmarshalOptions,
    ) -> QsResult<()>;
}

/// Type-erased text interchange (`Display` + `FromStr`)
pub trait TextHook: Send + Sync {
    fn render(&self, value: &dyn Value) -> QsResult<String>;

    fn parse_into(&self, value: &mut dyn Value, text: &str) -> QsResult<()>;
}

struct SelfDescribingAdapter<T>(PhantomData<fn() -> T>);

impl<T: Reflect + SelfDescribing> SelfDescribingHook for SelfDescribingAdapter<T> {
    fn marshal(&self, value: &dyn Value, opts: &MarshalOptions) -> QsResult<Vec<String>> {
        downcast_ref::<T>(value)?.marshal_qs(opts)
    }

    fn unmarshal(
        &self,
        value: &mut dyn Value,
        values: Option<&[String]>,
        opts: &UnmarshalOptions,
    ) -> QsResult<()> {
        downcast_mut::<T>(value)?.unmarshal_qs(values, opts)
    }
}

struct TextAdapter<T>(PhantomData<fn() -> T>);

impl<T> TextHook for TextAdapter<T>
where
    T: Reflect + FromStr + fmt::Display,
    T::Err: StdError + Send + Sync + 'static,
{
    fn render(&self, value: &dyn Value) -> QsResult<String> {
        Ok(downcast_ref::<T>(value)?.to_string())
    }

    fn parse_into(&self, value: &mut dyn Value, text: &str) -> QsResult<()> {
        let slot = downcast_mut::<T>(value)?;
        *slot = text
            .parse::<T>()
            .map_err(|err| QsError::parse(text, type_name::<T>(), err))?;
        Ok(())
    }
}

/// Identity, shape and hooks of a type
#[derive(Clone)]
pub struct TypeDescriptor {
    id: TypeId,
    name: &'static str,
    shape: Shape,
    self_describing: Option<Arc<dyn SelfDescribingHook>>,
    text: Option<Arc<dyn TextHook>>,
}

impl TypeDescriptor {
    /// Descriptor of `T`
    pub fn of<T: Reflect>() -> Self {
        T::descriptor()
    }

    pub fn new<T: Reflect>(shape: Shape) -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            shape,
            self_describing: None,
            text: None,
        }
    }

    /// Descriptor of a type with no generic shape
    pub fn opaque<T: Reflect>() -> Self {
        Self::new::<T>(Shape::Opaque)
    }

    /// Descriptor of a record with the given fields in declaration order
    pub fn record<T: Reflect>(fields: Vec<FieldInfo>) -> Self {
        Self::new::<T>(Shape::Record(fields.into()))
    }

    /// Attach the self-describing hook of `T`
    pub fn with_self_describing<T: Reflect + SelfDescribing>(mut self) -> Self {
        self.self_describing = Some(Arc::new(SelfDescribingAdapter::<T>(PhantomData)));
        self
    }

    /// Attach the text interchange hook of `T`
    pub fn with_text<T>(mut self) -> Self
    where
        T: Reflect + FromStr + fmt::Display,
        T::Err: StdError + Send + Sync + 'static,
    {
        self.text = Some(Arc::new(TextAdapter::<T>(PhantomData)));
        self
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn self_describing(&self) -> Option<&Arc<dyn SelfDescribingHook>> {
        self.self_describing.as_ref()
    }

    pub fn text(&self) -> Option<&Arc<dyn TextHook>> {
        self.text.as_ref()
    }

    /// Whether `value` holds the empty value of this type
    ///
    /// False, zero numbers, empty strings, sequences and maps, and absent
    /// optionals are empty. Records and opaque types never are.
    pub fn is_empty(&self, value: &dyn Value) -> bool {
        match &self.shape {
            Shape::Optional(access) => matches!(access.get(value), Ok(None)),
            Shape::Array(access) | Shape::Seq(access) => matches!(access.len(value), Ok(0)),
            Shape::Map(access) => matches!(access.len(value), Ok(0)),
            Shape::Scalar(kind) => crate::scalar::is_zero(*kind, value),
            Shape::Record(_) | Shape::WellKnown(_) | Shape::Opaque => false,
        }
    }

    /// Fails with a type mismatch unless `value` is of this type
    pub(crate) fn check(&self, value: &dyn Value) -> QsResult<()> {
        if value.value_type_id() == self.id {
            Ok(())
        } else {
            Err(QsError::type_mismatch(value.type_name(), self.name))
        }
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("shape", &self.shape)
            .field("self_describing", &self.self_describing.is_some())
            .field("text", &self.text.is_some())
            .finish()
    }
}

pub(crate) fn downcast_ref<T: Reflect>(value: &dyn Value) -> QsResult<&T> {
    let actual = value.type_name();
    value
        .downcast_ref::<T>()
        .ok_or_else(|| QsError::type_mismatch(actual, type_name::<T>()))
}

pub(crate) fn downcast_mut<T: Reflect>(value: &mut dyn Value) -> QsResult<&mut T> {
    let actual = value.type_name();
    value
        .downcast_mut::<T>()
        .ok_or_else(|| QsError::type_mismatch(actual, type_name::<T>()))
}

pub(crate) fn zero_of<T: Reflect>() -> QsResult<T> {
    T::zero().ok_or(QsError::NoZeroValue(type_name::<T>()))
}
