#![allow(non_snake_case)]

use super::*;
use crate::error::ErrorKind;
use crate::factory::{
    BuiltinMarshalerFactory, BuiltinUnmarshalerFactory, MarshalerFactory, UnmarshalerFactory,
};
use crate::reflect::{Reflect, Shape};

fn marshaler<T: Reflect>() -> Arc<dyn Marshaler> {
    BuiltinMarshalerFactory
        .marshaler(&T::descriptor(), &MarshalOptions::default())
        .unwrap()
}

fn unmarshaler<T: Reflect>() -> Arc<dyn Unmarshaler> {
    BuiltinUnmarshalerFactory
        .unmarshaler(&T::descriptor(), &UnmarshalOptions::default())
        .unwrap()
}

fn encode<T: Reflect>(value: &T) -> QsResult<Vec<String>> {
    marshaler::<T>().marshal(value, &MarshalOptions::default())
}

fn decode<T: Reflect>(value: &mut T, values: &[&str]) -> QsResult<()> {
    let owned: Vec<String> = values.iter().map(|value| value.to_string()).collect();
    unmarshaler::<T>().unmarshal(value, Some(owned.as_slice()), &UnmarshalOptions::default())
}

fn decode_absent<T: Reflect>(value: &mut T) -> QsResult<()> {
    unmarshaler::<T>().unmarshal(value, None, &UnmarshalOptions::default())
}

// OptionalMarshaler / OptionalUnmarshaler tests

#[test]
fn OptionalMarshaler___none___encodes_no_values() {
    assert!(encode(&None::<i32>).unwrap().is_empty());
}

#[test]
fn OptionalMarshaler___some___encodes_inner_value() {
    assert_eq!(encode(&Some(4_i32)).unwrap(), vec!["4"]);
}

#[test]
fn OptionalMarshaler___some_empty_sequence___encodes_no_values() {
    assert!(encode(&Some(Vec::<String>::new())).unwrap().is_empty());
}

#[test]
fn OptionalUnmarshaler___absent___leaves_none() {
    let mut value: Option<i32> = None;

    decode_absent(&mut value).unwrap();

    assert_eq!(value, None);
}

#[test]
fn OptionalUnmarshaler___present___allocates_and_decodes() {
    let mut value: Option<i32> = None;

    decode(&mut value, &["5"]).unwrap();

    assert_eq!(value, Some(5));
}

#[test]
fn OptionalUnmarshaler___empty_list___allocates_empty_sequence() {
    let mut value: Option<Vec<i32>> = None;

    decode(&mut value, &[]).unwrap();

    assert_eq!(value, Some(Vec::new()));
}

// SeqMarshaler tests

#[test]
fn SeqMarshaler___vec___encodes_one_string_per_element() {
    assert_eq!(encode(&vec![1_i32, 2, 3]).unwrap(), vec!["1", "2", "3"]);
}

#[test]
fn SeqMarshaler___empty_vec___encodes_no_values() {
    assert!(encode(&Vec::<bool>::new()).unwrap().is_empty());
}

#[test]
fn SeqMarshaler___array___encodes_all_elements() {
    assert_eq!(encode(&[true, false]).unwrap(), vec!["true", "false"]);
}

#[test]
fn SeqMarshaler___element_without_value___fails_with_arity() {
    let err = encode(&vec![Some(1_i32), None]).unwrap_err();

    assert!(matches!(err, QsError::ElementArity { index: 1, count: 0 }));
}

#[test]
fn SeqMarshaler___nested_sequence___fails_construction() {
    let result = BuiltinMarshalerFactory.marshaler(
        &TypeDescriptor::of::<Vec<Vec<i32>>>(),
        &MarshalOptions::default(),
    );

    let err = result.err().unwrap();
    assert!(matches!(err, QsError::NestedSequence { .. }));
    assert_eq!(err.kind(), ErrorKind::UnhandledType);
}

#[test]
fn SeqMarshaler___wrong_type___returns_type_mismatch() {
    let err = marshaler::<Vec<i32>>()
        .marshal(&vec![1_u8], &MarshalOptions::default())
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
}

// SeqUnmarshaler tests

#[test]
fn SeqUnmarshaler___vec___replaces_contents() {
    let mut value = vec![9_u8, 9, 9];

    decode(&mut value, &["1", "2"]).unwrap();

    assert_eq!(value, vec![1, 2]);
}

#[test]
fn SeqUnmarshaler___absent___leaves_contents() {
    let mut value = vec![9_u8];

    decode_absent(&mut value).unwrap();

    assert_eq!(value, vec![9]);
}

#[test]
fn SeqUnmarshaler___array_exact_count___decodes() {
    let mut value = [0_i32; 2];

    decode(&mut value, &["-1", "1"]).unwrap();

    assert_eq!(value, [-1, 1]);
}

#[test]
fn SeqUnmarshaler___array_wrong_count___fails() {
    let mut value = [0_i32; 2];

    let err = decode(&mut value, &["1", "2", "3"]).unwrap_err();

    assert!(matches!(
        err,
        QsError::LengthMismatch {
            expected: 2,
            actual: 3
        }
    ));
    assert_eq!(value, [0, 0]);
}

#[test]
fn SeqUnmarshaler___bad_element___reports_index() {
    let mut value: Vec<i32> = Vec::new();

    let err = decode(&mut value, &["1", "x"]).unwrap_err();

    assert!(matches!(err, QsError::Element { index: 1, .. }));
    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[test]
fn SeqUnmarshaler___optional_elements___are_allocated() {
    let mut value: Vec<Option<String>> = Vec::new();

    decode(&mut value, &["a", "b"]).unwrap();

    assert_eq!(value, vec![Some("a".to_string()), Some("b".to_string())]);
}

#[test]
fn SeqUnmarshaler___debug___names_codec_and_type() {
    let desc = TypeDescriptor::of::<Vec<i32>>();
    let Shape::Seq(access) = desc.shape() else {
        panic!("expected a sequence shape");
    };
    let codec = SeqUnmarshaler::new(&desc, access, &UnmarshalOptions::default()).unwrap();

    let debug = format!("{codec:?}");

    assert!(debug.starts_with("SeqUnmarshaler"));
    assert!(debug.contains("Vec<i32>"));
}
