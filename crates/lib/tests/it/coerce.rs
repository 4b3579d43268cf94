use ysync::reflect::coerce::{coerce_from_str, coerce_to_string, convert, scalar_new, scalar_set};
use ysync::reflect::{Scalar, ScalarKind};

#[test]
fn test_literal_round_trip_across_kinds() {
    let cases = [
        (ScalarKind::String, "hello world"),
        (ScalarKind::I8, "-128"),
        (ScalarKind::I64, "9223372036854775807"),
        (ScalarKind::U16, "65535"),
        (ScalarKind::U64, "18446744073709551615"),
        (ScalarKind::F64, "0.25"),
        (ScalarKind::F32, "-1.5"),
        (ScalarKind::Bool, "true"),
        (ScalarKind::Bool, "false"),
    ];
    for (kind, literal) in cases {
        let value = coerce_from_str(kind, literal).unwrap();
        assert_eq!(coerce_to_string(&value), literal, "{kind} {literal}");
    }
}

#[test]
fn test_width_and_parse_errors_are_type_errors() {
    for (kind, literal) in [
        (ScalarKind::U8, "256"),
        (ScalarKind::I8, "-129"),
        (ScalarKind::U32, "-1"),
        (ScalarKind::I32, "12abc"),
        (ScalarKind::Bool, "yes"),
    ] {
        let err = scalar_new(kind, literal).unwrap_err();
        assert!(err.is_type_error(), "{kind} {literal}: {err}");
        let err: ysync::Error = err.into();
        assert_eq!(err.kind(), ysync::ErrorKind::TypeNotConvertible);
    }
}

#[test]
fn test_cross_kind_rules() {
    assert_eq!(convert(Scalar::Int(5), ScalarKind::Bool).unwrap(), Scalar::Bool(true));
    assert_eq!(convert(Scalar::Float(0.0), ScalarKind::Bool).unwrap(), Scalar::Bool(false));
    assert_eq!(convert(Scalar::Bool(true), ScalarKind::U8).unwrap(), Scalar::Uint(1));
    assert_eq!(convert(Scalar::Bool(false), ScalarKind::F64).unwrap(), Scalar::Float(0.0));
    assert_eq!(
        convert(Scalar::Bool(true), ScalarKind::String).unwrap(),
        Scalar::Str("true".to_string())
    );
    assert!(convert(Scalar::Int(300), ScalarKind::U8).is_err());
    assert!(convert(Scalar::Float(1.5), ScalarKind::I32).is_err());
}

#[test]
fn test_scalar_set_through_nested_options() {
    let mut slot: Option<Option<Box<u16>>> = None;
    scalar_set(&mut slot, "8080").unwrap();
    assert_eq!(slot, Some(Some(Box::new(8080))));

    let mut flag = false;
    scalar_set(&mut flag, "TRUE").unwrap();
    assert!(flag);

    let mut list: Vec<u8> = Vec::new();
    assert!(scalar_set(&mut list, "1").is_err());
}
