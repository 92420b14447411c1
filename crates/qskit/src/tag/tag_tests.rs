#![allow(non_snake_case)]

use super::*;
use crate::error::ErrorKind;
use crate::naming::snake_case;
use test_case::test_case;

fn parse(field: &str, tag: Option<&str>) -> QsResult<FieldTag> {
    parse_field_tag(
        field,
        tag,
        &snake_case,
        MarshalPresence::KeepEmpty,
        UnmarshalPresence::Opt,
    )
}

fn parsed(field: &str, tag: Option<&str>) -> ParsedTag {
    match parse(field, tag).unwrap() {
        FieldTag::Field(parsed) => parsed,
        FieldTag::Skip => panic!("field {field} was skipped"),
    }
}

#[test]
fn parse_field_tag___no_tag___uses_name_transform_and_defaults() {
    let tag = parsed("PageSize", None);

    assert_eq!(tag.name, "page_size");
    assert_eq!(tag.marshal_presence, MarshalPresence::KeepEmpty);
    assert_eq!(tag.unmarshal_presence, UnmarshalPresence::Opt);
}

#[test]
fn parse_field_tag___empty_first_token___uses_name_transform() {
    let tag = parsed("PageSize", Some(",omitempty"));

    assert_eq!(tag.name, "page_size");
    assert_eq!(tag.marshal_presence, MarshalPresence::OmitEmpty);
}

#[test]
fn parse_field_tag___name_override___replaces_wire_key() {
    let tag = parsed("categories", Some("category"));

    assert_eq!(tag.name, "category");
}

#[test_case(Some("-"))]
#[test_case(Some("-,omitempty"))]
fn parse_field_tag___dash___skips_field(tag: Option<&str>) {
    assert_eq!(parse("secret", tag).unwrap(), FieldTag::Skip);
}

#[test_case("keepempty", MarshalPresence::KeepEmpty, UnmarshalPresence::Opt)]
#[test_case("omitempty", MarshalPresence::OmitEmpty, UnmarshalPresence::Opt)]
#[test_case("opt", MarshalPresence::KeepEmpty, UnmarshalPresence::Opt)]
#[test_case("nil", MarshalPresence::KeepEmpty, UnmarshalPresence::Nil)]
#[test_case("req", MarshalPresence::KeepEmpty, UnmarshalPresence::Req)]
#[test_case("omitempty,req", MarshalPresence::OmitEmpty, UnmarshalPresence::Req)]
#[test_case("nil,omitempty", MarshalPresence::OmitEmpty, UnmarshalPresence::Nil)]
fn parse_field_tag___options___select_presence(
    options: &str,
    marshal: MarshalPresence,
    unmarshal: UnmarshalPresence,
) {
    let tag_text = format!("key,{options}");

    let tag = parsed("field", Some(&tag_text));

    assert_eq!(tag.name, "key");
    assert_eq!(tag.marshal_presence, marshal);
    assert_eq!(tag.unmarshal_presence, unmarshal);
}

#[test_case("key,keepempty,omitempty", "omitempty")]
#[test_case("key,omitempty,omitempty", "omitempty")]
#[test_case("key,opt,req", "req")]
#[test_case("key,nil,nil", "nil")]
#[test_case("key,required", "required")]
#[test_case("key,", "")]
fn parse_field_tag___bad_options___fail_naming_field_and_token(tag: &str, bad_token: &str) {
    let err = parse("my_field", Some(tag)).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Config);
    match err {
        QsError::InvalidTag { field, token, .. } => {
            assert_eq!(field, "my_field");
            assert_eq!(token, bad_token);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn parse_field_tag___unspecified_defaults___stay_unspecified() {
    let tag = parse_field_tag(
        "field",
        None,
        &snake_case,
        MarshalPresence::Unspecified,
        UnmarshalPresence::Unspecified,
    )
    .unwrap();

    assert_eq!(
        tag,
        FieldTag::Field(ParsedTag {
            name: "field".into(),
            marshal_presence: MarshalPresence::Unspecified,
            unmarshal_presence: UnmarshalPresence::Unspecified,
        })
    );
}
