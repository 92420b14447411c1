//! # qskit
//!
//! Type-driven marshaling between Rust values and URL query strings.
//!
//! Describe a record once with `#[derive(Reflect)]`. qskit works out how to
//! encode and decode every field from its type, caches the resulting codecs
//! per type, and lets field annotations control wire keys and presence rules.
//!
//! ```
//! use qskit::Reflect;
//!
//! #[derive(Debug, Default, PartialEq, Reflect)]
//! struct Search {
//!     search: String,
//!     page: i32,
//!     page_size: i32,
//!     #[qs(tag = "category")]
//!     categories: Vec<String>,
//! }
//!
//! let query = Search {
//!     search: "my search".into(),
//!     page: 2,
//!     page_size: 50,
//!     categories: vec!["c1".into(), "c2".into()],
//! };
//!
//! let text = qskit::marshal(&query).unwrap();
//! assert_eq!(text, "category=c1&category=c2&page=2&page_size=50&search=my+search");
//!
//! let mut decoded = Search::default();
//! qskit::unmarshal(&mut decoded, &text).unwrap();
//! assert_eq!(decoded, query);
//! ```
//!
//! ## Field annotations
//!
//! `#[qs(tag = "name,options")]` takes a comma separated list. The first token
//! overrides the wire key (`-` skips the field, empty keeps the default key).
//! The rest pick at most one of `keepempty`/`omitempty` and at most one of
//! `opt`/`nil`/`req`. `#[qs(flatten)]` merges a nested record's keys into the
//! parent.
//!
//! ## Crate structure
//!
//! - [`Reflect`] and [`TypeDescriptor`] describe types to the engine
//! - [`dispatch`] holds the ordered rules that pick a codec for a type
//! - the factory traits build codecs, the cache types memoize them
//! - [`QsMarshaler`] and [`QsUnmarshaler`] are the entry points

extern crate self as qskit;

mod cache;
mod codec;
mod config;
pub mod dispatch;
mod error;
mod factory;
mod hooks;
mod impls;
mod map;
pub mod naming;
mod options;
mod presence;
mod query;
mod record;
mod reflect;
mod scalar;
mod sequence;
mod tag;

pub use cache::{MarshalerCache, UnmarshalerCache, ValuesMarshalerCache, ValuesUnmarshalerCache};
pub use codec::{Marshaler, Unmarshaler, Values, ValuesMarshaler, ValuesUnmarshaler};
pub use config::{CollapseStrategy, NamingStrategy, QsConfig};
pub use error::{ErrorKind, QsError, QsResult, SharedError};
pub use factory::{
    BuiltinMarshalerFactory, BuiltinUnmarshalerFactory, BuiltinValuesMarshalerFactory,
    BuiltinValuesUnmarshalerFactory, MarshalerFactory, UnmarshalerFactory,
    ValuesMarshalerFactory, ValuesUnmarshalerFactory,
};
pub use hooks::SelfDescribingCodec;
pub use map::{MapMarshaler, MapUnmarshaler, OptionalValuesMarshaler, OptionalValuesUnmarshaler};
pub use options::{
    CollapseFn, MarshalOptions, NameTransform, UnmarshalOptions, collapse_exactly_one,
    collapse_first, collapse_join, collapse_last,
};
pub use presence::{MarshalPresence, UnmarshalPresence};
pub use query::{
    QsMarshaler, QsUnmarshaler, check_marshal, check_unmarshal, decode_query, decode_values,
    encode_query, marshal, marshal_values, parse_query, unmarshal, unmarshal_values,
};
pub use record::{RecordMarshaler, RecordUnmarshaler};
pub use reflect::{
    FieldInfo, Kind, MapAccess, OptionalAccess, Reflect, ScalarKind, SelfDescribing,
    SelfDescribingHook, SeqAccess, Shape, TextHook, TypeDescriptor, Value, WellKnown,
};
pub use scalar::{
    ScalarCodec, SyntaxError, TextCodec, WellKnownCodec, parse_bool, parse_signed, parse_unsigned,
};
pub use sequence::{OptionalMarshaler, OptionalUnmarshaler, SeqMarshaler, SeqUnmarshaler};
pub use tag::{FieldTag, ParsedTag, parse_field_tag};

/// Derive macro generating a [`Reflect`] implementation
pub use qskit_macros::Reflect;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        MarshalOptions, MarshalPresence, QsError, QsMarshaler, QsResult, QsUnmarshaler, Reflect,
        SelfDescribing, UnmarshalOptions, UnmarshalPresence, Values,
    };
}

#[cfg(test)]
mod lib_tests;
