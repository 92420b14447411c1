//! Codec dispatch rules
//!
//! The built-in factories classify a [`TypeDescriptor`] with one of the two
//! functions here and then build the codec for the resulting [`Dispatch`].
//! Rules are tried in order and the first match wins:
//!
//! 1. self-describing hook
//! 2. optional
//! 3. record
//! 4. string-keyed map
//! 5. fixed-length sequence
//! 6. variable-length sequence
//! 7. well-known value type (timestamp, URL)
//! 8. primitive scalar
//! 9. text hook, for types without a generic shape
//!
//! Anything else is an unhandled type.

use std::any::TypeId;
use std::sync::Arc;

use crate::error::{QsError, QsResult};
use crate::reflect::{
    FieldInfo, MapAccess, OptionalAccess, ScalarKind, SelfDescribingHook, SeqAccess, Shape,
    TextHook, TypeDescriptor, WellKnown,
};

/// Outcome of classifying a type descriptor
#[derive(Clone)]
pub enum Dispatch<'a> {
    SelfDescribing(&'a Arc<dyn SelfDescribingHook>),
    Optional(&'a Arc<dyn OptionalAccess>),
    Record(&'a Arc<[FieldInfo]>),
    Map(&'a Arc<dyn MapAccess>),
    Array(&'a Arc<dyn SeqAccess>),
    Seq(&'a Arc<dyn SeqAccess>),
    WellKnown(WellKnown),
    Scalar(ScalarKind),
    Text(&'a Arc<dyn TextHook>),
}

impl Dispatch<'_> {
    /// Short name of the matched rule
    pub fn rule(&self) -> &'static str {
        match self {
            Dispatch::SelfDescribing(_) => "self_describing",
            Dispatch::Optional(_) => "optional",
            Dispatch::Record(_) => "record",
            Dispatch::Map(_) => "map",
            Dispatch::Array(_) => "array",
            Dispatch::Seq(_) => "seq",
            Dispatch::WellKnown(_) => "well_known",
            Dispatch::Scalar(_) => "scalar",
            Dispatch::Text(_) => "text",
        }
    }

    /// Whether the rule produces a multi-valued encoding
    pub fn is_sequence(&self) -> bool {
        matches!(self, Dispatch::Array(_) | Dispatch::Seq(_))
    }
}

impl std::fmt::Debug for Dispatch<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.rule())
    }
}

/// Classify a type for field, element and map value codecs
pub fn classify(desc: &TypeDescriptor) -> QsResult<Dispatch<'_>> {
    if let Some(hook) = desc.self_describing() {
        return Ok(Dispatch::SelfDescribing(hook));
    }
    classify_shape(desc)
}

/// Classify a type by its shape alone, ignoring the self-describing hook
///
/// Used for top-level records and maps, which are always walked generically.
pub fn classify_shape(desc: &TypeDescriptor) -> QsResult<Dispatch<'_>> {
    match desc.shape() {
        Shape::Optional(access) => Ok(Dispatch::Optional(access)),
        Shape::Record(fields) => Ok(Dispatch::Record(fields)),
        Shape::Map(access) => {
            if access.key().type_id() != TypeId::of::<String>() {
                return Err(QsError::MapKeyTypeInvalid(desc.name()));
            }
            Ok(Dispatch::Map(access))
        }
        Shape::Array(access) => Ok(Dispatch::Array(access)),
        Shape::Seq(access) => Ok(Dispatch::Seq(access)),
        Shape::WellKnown(known) => Ok(Dispatch::WellKnown(*known)),
        Shape::Scalar(kind) => Ok(Dispatch::Scalar(*kind)),
        Shape::Opaque => match desc.text() {
            Some(hook) => Ok(Dispatch::Text(hook)),
            None => Err(QsError::UnhandledType(desc.name())),
        },
    }
}

#[cfg(test)]
#[path = "dispatch/dispatch_tests.rs"]
mod dispatch_tests;
