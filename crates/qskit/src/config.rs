//! Declarative codec configuration

use serde::{Deserialize, Serialize};

use crate::presence::{MarshalPresence, UnmarshalPresence};

/// Settings document for building marshal and unmarshal options
///
/// Every field is optional in the JSON form:
///
/// ```json
/// {
///   "marshal_presence": "omitempty",
///   "unmarshal_presence": "req",
///   "naming": "verbatim",
///   "collapse": { "join": { "separator": "," } }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QsConfig {
    /// Default marshal presence for fields without an explicit option
    pub marshal_presence: MarshalPresence,

    /// Default unmarshal presence for fields without an explicit option
    pub unmarshal_presence: UnmarshalPresence,

    /// How declared field names become wire keys
    pub naming: NamingStrategy,

    /// How a multi-valued wire entry is reduced for a single-valued field
    pub collapse: CollapseStrategy,
}

impl QsConfig {
    /// Create a configuration with every setting at its default
    pub fn new() -> Self {
        Self::default()
    }

    /// Create configuration from JSON bytes
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        if bytes.is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_slice(bytes)
    }
}

/// Field name to wire key strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingStrategy {
    /// `PageSize` becomes `page_size`
    #[default]
    SnakeCase,

    /// The declared name is used unchanged
    Verbatim,
}

/// Multi-value collapse strategy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollapseStrategy {
    /// Fail unless exactly one value is present
    #[default]
    ExactlyOne,

    /// Take the first value
    First,

    /// Take the last value
    Last,

    /// Concatenate all values with a separator
    Join { separator: String },
}
