//! Presence policies for record fields

use std::fmt;

use serde::{Deserialize, Serialize};

/// Controls encoding of fields holding their type's empty value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarshalPresence {
    /// Resolved to the configured default when a codec is built
    #[default]
    Unspecified,

    /// Empty values are still emitted under their wire key
    KeepEmpty,

    /// Empty values are left out of the output
    OmitEmpty,
}

impl MarshalPresence {
    /// Global default used when nothing else is configured
    pub const DEFAULT: MarshalPresence = MarshalPresence::KeepEmpty;

    /// Returns `self`, or `default` if `self` is unspecified
    pub fn or(self, default: MarshalPresence) -> MarshalPresence {
        match self {
            MarshalPresence::Unspecified => default,
            other => other,
        }
    }
}

impl fmt::Display for MarshalPresence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarshalPresence::Unspecified => write!(f, "unspecified"),
            MarshalPresence::KeepEmpty => write!(f, "keepempty"),
            MarshalPresence::OmitEmpty => write!(f, "omitempty"),
        }
    }
}

/// Controls decoding of fields whose wire key is absent
///
/// - `Opt` invokes the field codec with no input. Built-in codecs leave the
///   field untouched in that case; custom codecs may react to it.
/// - `Nil` leaves the field untouched without invoking its codec.
/// - `Req` fails the decode with [`QsError::RequiredFieldMissing`].
///
/// [`QsError::RequiredFieldMissing`]: crate::QsError::RequiredFieldMissing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnmarshalPresence {
    /// Resolved to the configured default when a codec is built
    #[default]
    Unspecified,
    Opt,
    Nil,
    Req,
}

impl UnmarshalPresence {
    /// Global default used when nothing else is configured
    pub const DEFAULT: UnmarshalPresence = UnmarshalPresence::Opt;

    /// Returns `self`, or `default` if `self` is unspecified
    pub fn or(self, default: UnmarshalPresence) -> UnmarshalPresence {
        match self {
            UnmarshalPresence::Unspecified => default,
            other => other,
        }
    }
}

impl fmt::Display for UnmarshalPresence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmarshalPresence::Unspecified => write!(f, "unspecified"),
            UnmarshalPresence::Opt => write!(f, "opt"),
            UnmarshalPresence::Nil => write!(f, "nil"),
            UnmarshalPresence::Req => write!(f, "req"),
        }
    }
}
