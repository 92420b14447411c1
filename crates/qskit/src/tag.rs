//! Field annotation parsing
//!
//! An annotation is a comma separated token list. The first token is the wire
//! key override, `-` to exclude the field, or empty to derive the key from the
//! declared field name. The remaining tokens pick at most one marshal option
//! (`keepempty`, `omitempty`) and at most one unmarshal option (`opt`, `nil`,
//! `req`).

use crate::error::{QsError, QsResult};
use crate::presence::{MarshalPresence, UnmarshalPresence};

/// Parsed form of a field annotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTag {
    /// Wire key of the field
    pub name: String,
    pub marshal_presence: MarshalPresence,
    pub unmarshal_presence: UnmarshalPresence,
}

/// Outcome of [`parse_field_tag`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldTag {
    /// The field is excluded in both directions
    Skip,
    Field(ParsedTag),
}

/// Parse the annotation of the field declared as `field`.
///
/// Options that the annotation leaves unset take the supplied defaults.
pub fn parse_field_tag(
    field: &str,
    tag: Option<&str>,
    name_transform: &dyn Fn(&str) -> String,
    default_marshal: MarshalPresence,
    default_unmarshal: UnmarshalPresence,
) -> QsResult<FieldTag> {
    let tag = tag.unwrap_or("");
    let mut tokens = tag.split(',');
    let first = tokens.next().unwrap_or("");

    if first == "-" {
        return Ok(FieldTag::Skip);
    }

    let name = if first.is_empty() {
        name_transform(field)
    } else {
        first.to_string()
    };

    let mut marshal_presence = MarshalPresence::Unspecified;
    let mut unmarshal_presence = UnmarshalPresence::Unspecified;

    for token in tokens {
        let invalid = |reason| QsError::InvalidTag {
            field: field.to_string(),
            token: token.to_string(),
            reason,
        };
        match token {
            "keepempty" | "omitempty" => {
                if marshal_presence != MarshalPresence::Unspecified {
                    return Err(invalid("more than one marshal option"));
                }
                marshal_presence = if token == "keepempty" {
                    MarshalPresence::KeepEmpty
                } else {
                    MarshalPresence::OmitEmpty
                };
            }
            "opt" | "nil" | "req" => {
                if unmarshal_presence != UnmarshalPresence::Unspecified {
                    return Err(invalid("more than one unmarshal option"));
                }
                unmarshal_presence = match token {
                    "opt" => UnmarshalPresence::Opt,
                    "nil" => UnmarshalPresence::Nil,
                    _ => UnmarshalPresence::Req,
                };
            }
            _ => return Err(invalid("unknown option")),
        }
    }

    Ok(FieldTag::Field(ParsedTag {
        name,
        marshal_presence: marshal_presence.or(default_marshal),
        unmarshal_presence: unmarshal_presence.or(default_unmarshal),
    }))
}

#[cfg(test)]
#[path = "tag/tag_tests.rs"]
mod tag_tests;
