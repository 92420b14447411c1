#![allow(non_snake_case)]

use super::*;
use crate::error::ErrorKind;
use crate::reflect::Kind;
use test_case::test_case;

fn seq_access<T: Reflect>() -> Arc<dyn SeqAccess> {
    match T::descriptor().shape() {
        Shape::Seq(access) | Shape::Array(access) => access.clone(),
        other => panic!("expected a sequence shape, got {other:?}"),
    }
}

fn map_access<T: Reflect>() -> Arc<dyn MapAccess> {
    match T::descriptor().shape() {
        Shape::Map(access) => access.clone(),
        other => panic!("expected a map shape, got {other:?}"),
    }
}

fn optional_access<T: Reflect>() -> Arc<dyn OptionalAccess> {
    match T::descriptor().shape() {
        Shape::Optional(access) => access.clone(),
        other => panic!("expected an optional shape, got {other:?}"),
    }
}

#[test_case(TypeDescriptor::of::<bool>(), Kind::Bool)]
#[test_case(TypeDescriptor::of::<i16>(), Kind::Int)]
#[test_case(TypeDescriptor::of::<usize>(), Kind::Uint)]
#[test_case(TypeDescriptor::of::<f32>(), Kind::Float)]
#[test_case(TypeDescriptor::of::<String>(), Kind::String)]
#[test_case(TypeDescriptor::of::<OffsetDateTime>(), Kind::Timestamp)]
#[test_case(TypeDescriptor::of::<Url>(), Kind::Url)]
#[test_case(TypeDescriptor::of::<Duration>(), Kind::Opaque)]
#[test_case(TypeDescriptor::of::<Option<i32>>(), Kind::Optional)]
#[test_case(TypeDescriptor::of::<Vec<i32>>(), Kind::Seq)]
#[test_case(TypeDescriptor::of::<[i32; 3]>(), Kind::Array)]
#[test_case(TypeDescriptor::of::<BTreeMap<String, i32>>(), Kind::Map)]
fn TypeDescriptor___builtin_types___report_expected_kind(desc: TypeDescriptor, expected: Kind) {
    assert_eq!(desc.shape().kind(), expected);
}

#[test]
fn TypeDescriptor___same_type___has_same_identity() {
    assert_eq!(
        TypeDescriptor::of::<Vec<String>>().type_id(),
        TypeDescriptor::of::<Vec<String>>().type_id()
    );
    assert_ne!(
        TypeDescriptor::of::<Vec<String>>().type_id(),
        TypeDescriptor::of::<Vec<i32>>().type_id()
    );
}

#[test]
fn Url___zero___is_about_blank() {
    assert_eq!(Url::zero().unwrap().as_str(), "about:blank");
}

#[test]
fn Array___zero___fills_with_element_zero() {
    assert_eq!(<[i32; 3]>::zero(), Some([0, 0, 0]));
}

#[test]
fn OptionAccess___get_or_insert___allocates_zero_when_absent() {
    let access = optional_access::<Option<i32>>();
    let mut value: Option<i32> = None;

    let inner = access.get_or_insert(&mut value).unwrap();
    *inner.downcast_mut::<i32>().unwrap() = 7;

    assert_eq!(value, Some(7));
}

#[test]
fn OptionAccess___get_or_insert___keeps_existing_value() {
    let access = optional_access::<Option<i32>>();
    let mut value = Some(3);

    let inner = access.get_or_insert(&mut value).unwrap();

    assert_eq!(inner.downcast_ref::<i32>(), Some(&3));
}

#[test]
fn OptionAccess___wrong_type___returns_type_mismatch() {
    let access = optional_access::<Option<i32>>();

    let err = access.get(&5_i32).err().unwrap();

    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
}

#[test]
fn VecAccess___resize___grows_with_zero_and_truncates() {
    let access = seq_access::<Vec<i32>>();
    let mut value = vec![1, 2];

    access.resize(&mut value, 4).unwrap();
    assert_eq!(value, vec![1, 2, 0, 0]);

    access.resize(&mut value, 1).unwrap();
    assert_eq!(value, vec![1]);
}

#[test]
fn ArrayAccess___resize_to_other_length___fails() {
    let access = seq_access::<[i32; 2]>();
    let mut value = [1, 2];

    let err = access.resize(&mut value, 3).unwrap_err();

    assert!(matches!(
        err,
        QsError::LengthMismatch {
            expected: 2,
            actual: 3
        }
    ));
}

#[test]
fn ArrayAccess___fixed_len___reports_declared_length() {
    assert_eq!(seq_access::<[u8; 4]>().fixed_len(), Some(4));
    assert_eq!(seq_access::<Vec<u8>>().fixed_len(), None);
}

#[test]
fn MapAccess___insert_with___fills_fresh_value() {
    let access = map_access::<HashMap<String, i32>>();
    let mut value: HashMap<String, i32> = HashMap::new();

    access
        .insert_with(&mut value, "a", &mut |item| {
            *item.downcast_mut::<i32>().unwrap() = 9;
            Ok(())
        })
        .unwrap();

    assert_eq!(value.get("a"), Some(&9));
}

#[test]
fn MapAccess___failed_fill___leaves_map_unchanged() {
    let access = map_access::<BTreeMap<String, i32>>();
    let mut value: BTreeMap<String, i32> = BTreeMap::new();

    let result = access.insert_with(&mut value, "a", &mut |_| Err(QsError::UnhandledType("x")));

    assert!(result.is_err());
    assert!(value.is_empty());
}

#[test]
fn MapAccess___entries___exposes_string_keys() {
    let access = map_access::<BTreeMap<String, i32>>();
    let value = BTreeMap::from([("a".to_string(), 1), ("b".to_string(), 2)]);

    let keys: Vec<&str> = access
        .entries(&value)
        .unwrap()
        .into_iter()
        .map(|(key, _)| key)
        .collect();

    assert_eq!(keys, vec!["a", "b"]);
}

#[test]
fn MapAccess___non_string_key___returns_map_key_error() {
    let access = map_access::<BTreeMap<i32, i32>>();
    let mut value: BTreeMap<i32, i32> = BTreeMap::new();

    let err = access.insert_with(&mut value, "1", &mut |_| Ok(())).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MapKeyTypeInvalid);
}
