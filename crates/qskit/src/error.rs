//! Error types for query string marshaling

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::reflect::Kind;

/// Result type alias for qskit operations
pub type QsResult<T> = Result<T, QsError>;

/// Shared, clonable source error for parse and hook failures
pub type SharedError = Arc<dyn StdError + Send + Sync>;

/// Error type for codec construction and marshal/unmarshal calls
///
/// Construction errors are cached per type, which is why the enum is `Clone`.
#[derive(Error, Debug, Clone)]
pub enum QsError {
    /// The runtime kind of a value disagrees with the codec
    #[error("received type {actual}, want kind {expected}")]
    KindMismatch { actual: &'static str, expected: Kind },

    /// The exact type of a value disagrees with the codec it was handed to
    #[error("received type {actual}, want {expected}")]
    TypeMismatch {
        actual: &'static str,
        expected: &'static str,
    },

    /// No dispatch rule matched the type
    #[error("unhandled type: {0}")]
    UnhandledType(&'static str),

    /// A map type whose key is not `String`
    #[error("map key type is expected to be string: {0}")]
    MapKeyTypeInvalid(&'static str),

    /// A sequence whose elements are sequences themselves
    #[error("sequence element type {element} of {sequence} is multi-valued")]
    NestedSequence {
        sequence: &'static str,
        element: &'static str,
    },

    /// A required wire key was absent
    #[error("missing required field {field:?} in {owner}")]
    RequiredFieldMissing { field: String, owner: &'static str },

    /// A required wire key of a flattened sub-record was absent
    #[error("embedded field {field:?} of {owner} :: {source}")]
    RequiredEmbeddedField {
        field: &'static str,
        owner: &'static str,
        source: Box<QsError>,
    },

    /// The collapse function rejected a multi-valued scalar input
    #[error("cannot collapse {} value(s) into one: {values:?}", .values.len())]
    Collapse { values: Vec<String> },

    /// A fixed-length sequence received the wrong number of values
    #[error("array length == {actual}, want {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    /// A sequence element codec produced zero or several strings
    #[error("marshaler returned {count} values for sequence index {index}")]
    ElementArity { index: usize, count: usize },

    /// Text could not be converted into the target type
    #[error("error parsing {input:?} as {target} :: {source}")]
    Parse {
        input: String,
        target: &'static str,
        source: SharedError,
    },

    /// A value could not be rendered as text
    #[error("error rendering {target} :: {source}")]
    Render {
        target: &'static str,
        source: SharedError,
    },

    /// A field annotation could not be parsed
    #[error("invalid qs tag on field {field}: {reason} {token:?}")]
    InvalidTag {
        field: String,
        token: String,
        reason: &'static str,
    },

    /// Decoding needed a fresh value of a type that has no zero value
    #[error("type {0} has no zero value to allocate")]
    NoZeroValue(&'static str),

    /// A self-describing or custom codec failed
    #[error("{0}")]
    Custom(SharedError),

    /// Construction of a record field codec failed
    #[error("error creating codec for field {field} of {owner} :: {source}")]
    FieldConstruction {
        owner: &'static str,
        field: &'static str,
        source: Box<QsError>,
    },

    /// Construction of a map value codec failed
    #[error("error getting codec for map value type {value} :: {source}")]
    MapValueConstruction {
        value: &'static str,
        source: Box<QsError>,
    },

    /// Encoding or decoding a record field failed
    #[error("error processing values entry {key:?} of {owner} :: {source}")]
    Field {
        owner: &'static str,
        key: String,
        source: Box<QsError>,
    },

    /// Encoding or decoding a flattened sub-record failed
    #[error("error processing embedded field {field:?} of {owner} :: {source}")]
    Embedded {
        owner: &'static str,
        field: &'static str,
        source: Box<QsError>,
    },

    /// Encoding or decoding a sequence element failed
    #[error("error processing sequence index {index} :: {source}")]
    Element { index: usize, source: Box<QsError> },

    /// Encoding or decoding a map entry failed
    #[error("error processing map key {key:?} :: {source}")]
    MapEntry { key: String, source: Box<QsError> },
}

/// Coarse classification of a [`QsError`], independent of context wrappers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    KindMismatch,
    TypeMismatch,
    UnhandledType,
    RequiredFieldMissing,
    MapKeyTypeInvalid,
    MultiValueCollapse,
    LengthMismatch,
    Parse,
    Config,
    Custom,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl QsError {
    /// Wraps a source error produced by a user hook
    pub fn custom<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        QsError::Custom(Arc::new(err))
    }

    /// Builds a parse failure for `input` converted into `target`
    pub fn parse<E>(input: &str, target: &'static str, err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        QsError::Parse {
            input: input.to_string(),
            target,
            source: Arc::new(err),
        }
    }

    /// Returns the classification of the innermost error
    pub fn kind(&self) -> ErrorKind {
        match self {
            QsError::KindMismatch { .. } => ErrorKind::KindMismatch,
            QsError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            QsError::UnhandledType(_) | QsError::NestedSequence { .. } => ErrorKind::UnhandledType,
            QsError::MapKeyTypeInvalid(_) => ErrorKind::MapKeyTypeInvalid,
            QsError::RequiredFieldMissing { .. } | QsError::RequiredEmbeddedField { .. } => {
                ErrorKind::RequiredFieldMissing
            }
            QsError::Collapse { .. } => ErrorKind::MultiValueCollapse,
            QsError::LengthMismatch { .. } | QsError::ElementArity { .. } => {
                ErrorKind::LengthMismatch
            }
            QsError::Parse { .. } | QsError::Render { .. } => ErrorKind::Parse,
            QsError::InvalidTag { .. } | QsError::NoZeroValue(_) => ErrorKind::Config,
            QsError::Custom(_) => ErrorKind::Custom,
            QsError::FieldConstruction { source, .. }
            | QsError::MapValueConstruction { source, .. }
            | QsError::Field { source, .. }
            | QsError::Embedded { source, .. }
            | QsError::Element { source, .. }
            | QsError::MapEntry { source, .. } => source.kind(),
        }
    }

    /// Returns the name of the missing field if this is a required field error
    ///
    /// For a flattened sub-record the embedding field's name is returned.
    pub fn required_field(&self) -> Option<&str> {
        match self {
            QsError::RequiredFieldMissing { field, .. } => Some(field.as_str()),
            QsError::RequiredEmbeddedField { field, .. } => Some(*field),
            _ => None,
        }
    }

    pub(crate) fn field(owner: &'static str, key: &str, source: QsError) -> Self {
        QsError::Field {
            owner,
            key: key.to_string(),
            source: Box::new(source),
        }
    }

    pub(crate) fn element(index: usize, source: QsError) -> Self {
        QsError::Element {
            index,
            source: Box::new(source),
        }
    }

    pub(crate) fn map_entry(key: &str, source: QsError) -> Self {
        QsError::MapEntry {
            key: key.to_string(),
            source: Box::new(source),
        }
    }

    pub(crate) fn type_mismatch(actual: &'static str, expected: &'static str) -> Self {
        QsError::TypeMismatch { actual, expected }
    }
}
