#![allow(non_snake_case)]

use crate::prelude::*;

#[derive(Debug, Default, PartialEq, Reflect)]
struct Page {
    #[qs(tag = ",req")]
    number: u32,
    #[qs(tag = "per,omitempty")]
    per_page: Option<u32>,
}

#[test]
fn prelude___derive_and_entry_points___work_together() {
    let marshaler = QsMarshaler::default();
    let unmarshaler = QsUnmarshaler::default();
    let page = Page {
        number: 4,
        per_page: Some(20),
    };

    let text = marshaler.marshal(&page).unwrap();
    let mut decoded = Page::default();
    unmarshaler.unmarshal(&mut decoded, &text).unwrap();

    assert_eq!(text, "number=4&per=20");
    assert_eq!(decoded, page);
}

#[test]
fn prelude___required_field___error_is_exposed() {
    let mut page = Page::default();

    let err = QsUnmarshaler::default().unmarshal(&mut page, "per=3").unwrap_err();

    assert!(matches!(err, QsError::RequiredFieldMissing { .. }));
}

#[test]
fn prelude___omitted_optional___is_absent_from_output() {
    let page = Page {
        number: 1,
        per_page: None,
    };

    assert_eq!(crate::marshal(&page).unwrap(), "number=1");
}

#[test]
fn Reflect___derived_record___describes_fields_in_order() {
    let desc = crate::TypeDescriptor::of::<Page>();

    let crate::Shape::Record(fields) = desc.shape() else {
        panic!("expected a record shape");
    };
    let names: Vec<_> = fields.iter().map(|field| field.name).collect();

    assert_eq!(names, vec!["number", "per_page"]);
    assert_eq!(fields[1].tag, Some("per,omitempty"));
}
