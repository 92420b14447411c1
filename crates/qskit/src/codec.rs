//! Codec traits
//!
//! Codecs come in two capability shapes. Scalar-ish codecs exchange an
//! ordered list of strings (one field's worth of wire values), composite codecs
//! exchange a whole [`Values`] multimap. Each shape has a marshal and an
//! unmarshal side. Codecs are immutable after construction and shared behind
//! `Arc`, so every trait requires `Send + Sync`.

use std::collections::BTreeMap;

use crate::error::QsResult;
use crate::options::{MarshalOptions, UnmarshalOptions};
use crate::reflect::Value;

/// The wire multimap: wire key to the ordered values under that key
pub type Values = BTreeMap<String, Vec<String>>;

/// Encodes one value as a list of strings
pub trait Marshaler: Send + Sync {
    fn marshal(&self, value: &dyn Value, opts: &MarshalOptions) -> QsResult<Vec<String>>;
}

/// Decodes a list of strings into one value
pub trait Unmarshaler: Send + Sync {
    /// `values` is `None` when the wire key was absent from the input.
    fn unmarshal(
        &self,
        value: &mut dyn Value,
        values: Option<&[String]>,
        opts: &UnmarshalOptions,
    ) -> QsResult<()>;
}

/// Encodes one value as a whole wire multimap
pub trait ValuesMarshaler: Send + Sync {
    fn marshal_values(&self, value: &dyn Value, opts: &MarshalOptions) -> QsResult<Values>;
}

/// Decodes a whole wire multimap into one value
pub trait ValuesUnmarshaler: Send + Sync {
    fn unmarshal_values(
        &self,
        value: &mut dyn Value,
        values: &Values,
        opts: &UnmarshalOptions,
    ) -> QsResult<()>;
}
