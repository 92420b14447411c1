//! Query string entry points
//!
//! [`QsMarshaler`] and [`QsUnmarshaler`] own prepared options and therefore
//! their own codec caches. Build one per configuration and share it; the free
//! functions use process-wide instances with default options.
//!
//! `unmarshal` and `unmarshal_values` decode in place so that absent keys can
//! leave existing field values untouched. A failed call may therefore leave
//! `into` partly updated. `decode_query` and `decode_values` decode into a fresh
//! zero value and only hand it back once every field has decoded.

use once_cell::sync::OnceCell;
use url::form_urlencoded;

use crate::codec::Values;
use crate::error::QsResult;
use crate::options::{MarshalOptions, UnmarshalOptions};
use crate::reflect::{Reflect, zero_of};

static DEFAULT_MARSHALER: OnceCell<QsMarshaler> = OnceCell::new();
static DEFAULT_UNMARSHALER: OnceCell<QsUnmarshaler> = OnceCell::new();

/// Assemble query string text, keys in order, values in sequence order
pub fn encode_query(values: &Values) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, list) in values {
        for value in list {
            serializer.append_pair(key, value);
        }
    }
    serializer.finish()
}

/// Split query string text into the wire multimap
pub fn parse_query(query: &str) -> Values {
    let mut values = Values::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        values
            .entry(key.into_owned())
            .or_default()
            .push(value.into_owned());
    }
    values
}

/// Encodes records and maps as query strings
#[derive(Debug, Clone)]
pub struct QsMarshaler {
    opts: MarshalOptions,
}

impl QsMarshaler {
    pub fn new(opts: MarshalOptions) -> Self {
        Self {
            opts: opts.prepare(),
        }
    }

    /// Get the shared instance built from default options
    pub fn global() -> &'static QsMarshaler {
        DEFAULT_MARSHALER.get_or_init(|| QsMarshaler::new(MarshalOptions::default()))
    }

    /// Prepared options, with caching factories and resolved defaults
    pub fn options(&self) -> &MarshalOptions {
        &self.opts
    }

    pub fn marshal<T: Reflect>(&self, value: &T) -> QsResult<String> {
        Ok(encode_query(&self.marshal_values(value)?))
    }

    pub fn marshal_values<T: Reflect>(&self, value: &T) -> QsResult<Values> {
        let marshaler = self
            .opts
            .values_marshaler_factory
            .values_marshaler(&T::descriptor(), &self.opts)?;
        marshaler.marshal_values(value, &self.opts)
    }

    /// Fails if values of type `T` cannot be marshaled
    ///
    /// Only the type is inspected; the outcome is cached like any other
    /// resolution.
    pub fn check_marshal<T: Reflect>(&self) -> QsResult<()> {
        self.opts
            .values_marshaler_factory
            .values_marshaler(&T::descriptor(), &self.opts)
            .map(|_| ())
    }
}

impl Default for QsMarshaler {
    fn default() -> Self {
        Self::new(MarshalOptions::default())
    }
}

/// Decodes query strings into records and maps
#[derive(Debug, Clone)]
pub struct QsUnmarshaler {
    opts: UnmarshalOptions,
}

impl QsUnmarshaler {
    pub fn new(opts: UnmarshalOptions) -> Self {
        Self {
            opts: opts.prepare(),
        }
    }

    /// Get the shared instance built from default options
    pub fn global() -> &'static QsUnmarshaler {
        DEFAULT_UNMARSHALER.get_or_init(|| QsUnmarshaler::new(UnmarshalOptions::default()))
    }

    /// Prepared options, with caching factories and resolved defaults
    pub fn options(&self) -> &UnmarshalOptions {
        &self.opts
    }

    /// Decode `query` into `into` in place
    ///
    /// Fields are written as they decode. On error, fields decoded before the
    /// failing one keep their new values; use [`decode_query`](Self::decode_query)
    /// when the target must stay untouched on failure.
    pub fn unmarshal<T: Reflect>(&self, into: &mut T, query: &str) -> QsResult<()> {
        self.unmarshal_values(into, &parse_query(query))
    }

    /// Decode `values` into `into` in place, with the same partial update
    /// behavior on error as [`unmarshal`](Self::unmarshal)
    pub fn unmarshal_values<T: Reflect>(&self, into: &mut T, values: &Values) -> QsResult<()> {
        let unmarshaler = self
            .opts
            .values_unmarshaler_factory
            .values_unmarshaler(&T::descriptor(), &self.opts)?;
        unmarshaler.unmarshal_values(into, values, &self.opts)
    }

    /// Decode `query` into a new zero value of `T`, all or nothing
    pub fn decode_query<T: Reflect>(&self, query: &str) -> QsResult<T> {
        self.decode_values(&parse_query(query))
    }

    /// Decode `values` into a new zero value of `T`, all or nothing
    pub fn decode_values<T: Reflect>(&self, values: &Values) -> QsResult<T> {
        let mut value = zero_of::<T>()?;
        self.unmarshal_values(&mut value, values)?;
        Ok(value)
    }

    /// Fails if values of type `T` cannot be unmarshaled
    pub fn check_unmarshal<T: Reflect>(&self) -> QsResult<()> {
        self.opts
            .values_unmarshaler_factory
            .values_unmarshaler(&T::descriptor(), &self.opts)
            .map(|_| ())
    }
}

impl Default for QsUnmarshaler {
    fn default() -> Self {
        Self::new(UnmarshalOptions::default())
    }
}

/// Marshal `value` to a query string with default options
pub fn marshal<T: Reflect>(value: &T) -> QsResult<String> {
    QsMarshaler::global().marshal(value)
}

/// Marshal `value` to a wire multimap with default options
pub fn marshal_values<T: Reflect>(value: &T) -> QsResult<Values> {
    QsMarshaler::global().marshal_values(value)
}

/// Unmarshal a query string into `into` with default options
pub fn unmarshal<T: Reflect>(into: &mut T, query: &str) -> QsResult<()> {
    QsUnmarshaler::global().unmarshal(into, query)
}

/// Unmarshal a wire multimap into `into` with default options
pub fn unmarshal_values<T: Reflect>(into: &mut T, values: &Values) -> QsResult<()> {
    QsUnmarshaler::global().unmarshal_values(into, values)
}

/// Decode a query string into a new `T` with default options
pub fn decode_query<T: Reflect>(query: &str) -> QsResult<T> {
    QsUnmarshaler::global().decode_query(query)
}

/// Decode a wire multimap into a new `T` with default options
pub fn decode_values<T: Reflect>(values: &Values) -> QsResult<T> {
    QsUnmarshaler::global().decode_values(values)
}

pub fn check_marshal<T: Reflect>() -> QsResult<()> {
    QsMarshaler::global().check_marshal::<T>()
}

pub fn check_unmarshal<T: Reflect>() -> QsResult<()> {
    QsUnmarshaler::global().check_unmarshal::<T>()
}
