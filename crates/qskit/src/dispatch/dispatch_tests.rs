#![allow(non_snake_case)]

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::*;
use crate::error::ErrorKind;
use crate::options::{MarshalOptions, UnmarshalOptions};
use crate::reflect::{Reflect, SelfDescribing};
use test_case::test_case;
use url::Url;

#[derive(Debug, Default, crate::Reflect)]
struct Paging {
    page: u32,
}

#[derive(Debug, Default, PartialEq, crate::Reflect)]
#[qs(text)]
struct Level(u8);

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

impl FromStr for Level {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim_start_matches('L').parse().map(Level)
    }
}

/// A record that takes over its own encoding
#[derive(Debug, Default, crate::Reflect)]
#[qs(self_describing)]
struct Token {
    raw: String,
}

impl SelfDescribing for Token {
    fn marshal_qs(&self, _opts: &MarshalOptions) -> QsResult<Vec<String>> {
        Ok(vec![self.raw.clone()])
    }

    fn unmarshal_qs(
        &mut self,
        values: Option<&[String]>,
        _opts: &UnmarshalOptions,
    ) -> QsResult<()> {
        if let Some([raw]) = values {
            self.raw = raw.clone();
        }
        Ok(())
    }
}

#[test_case(TypeDescriptor::of::<Option<i32>>(), "optional")]
#[test_case(TypeDescriptor::of::<Paging>(), "record")]
#[test_case(TypeDescriptor::of::<HashMap<String, i32>>(), "map")]
#[test_case(TypeDescriptor::of::<[i32; 2]>(), "array")]
#[test_case(TypeDescriptor::of::<Vec<i32>>(), "seq")]
#[test_case(TypeDescriptor::of::<Url>(), "well_known")]
#[test_case(TypeDescriptor::of::<u16>(), "scalar")]
#[test_case(TypeDescriptor::of::<Level>(), "text")]
#[test_case(TypeDescriptor::of::<Token>(), "self_describing")]
fn classify___builtin_shapes___match_expected_rule(desc: TypeDescriptor, rule: &str) {
    assert_eq!(classify(&desc).unwrap().rule(), rule);
}

#[test]
fn classify___self_describing___wins_over_record_shape() {
    let desc = TypeDescriptor::of::<Token>();

    assert_eq!(desc.shape().kind(), crate::reflect::Kind::Opaque);
    assert!(matches!(classify(&desc).unwrap(), Dispatch::SelfDescribing(_)));
}

#[test]
fn classify_shape___self_describing_without_text___is_unhandled() {
    let desc = TypeDescriptor::of::<Token>();

    let err = classify_shape(&desc).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UnhandledType);
}

#[test]
fn classify___non_string_map_key___fails() {
    let desc = TypeDescriptor::of::<BTreeMap<i32, String>>();

    let err = classify(&desc).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MapKeyTypeInvalid);
}

#[test]
fn classify___opaque_without_hooks___is_unhandled() {
    let desc = TypeDescriptor::of::<Duration>();

    let err = classify(&desc).unwrap_err();

    assert!(matches!(err, QsError::UnhandledType(name) if name.contains("Duration")));
}

#[test_case(TypeDescriptor::of::<Vec<String>>(), true)]
#[test_case(TypeDescriptor::of::<[u8; 4]>(), true)]
#[test_case(TypeDescriptor::of::<Option<Vec<String>>>(), false)]
#[test_case(TypeDescriptor::of::<String>(), false)]
fn Dispatch___is_sequence___only_for_sequences(desc: TypeDescriptor, expected: bool) {
    assert_eq!(classify(&desc).unwrap().is_sequence(), expected);
}

#[test]
fn Dispatch___scalar___carries_scalar_kind() {
    let desc = TypeDescriptor::of::<i64>();

    assert!(matches!(
        classify(&desc).unwrap(),
        Dispatch::Scalar(ScalarKind::Int)
    ));
}

#[test]
fn Dispatch___debug___prints_rule() {
    let desc = TypeDescriptor::of::<time::OffsetDateTime>();

    assert_eq!(format!("{:?}", classify(&desc).unwrap()), "well_known");
}

#[test]
fn Level___text_roundtrip___uses_display_and_from_str() {
    assert_eq!("L3".parse::<Level>().unwrap(), Level(3));
    assert_eq!(Level(3).to_string(), "L3");
    assert_eq!(Level::zero(), Some(Level(0)));
}
