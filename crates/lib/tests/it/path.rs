use ysync::path::{StructuredKey, extract_name_and_substring, join_path, parse_path};

#[test]
fn test_documented_paths() {
    assert_eq!(parse_path("/a/b/c").unwrap(), vec!["a", "b", "c"]);
    assert_eq!(parse_path("/a/b[k=v]/").unwrap(), vec!["a", "b[k=v]"]);
    assert!(parse_path("/a]/").is_err());
    assert!(parse_path("").unwrap().is_empty());
}

#[test]
fn test_documented_keys() {
    let key = StructuredKey::parse("multikeylist[str=STR][integer=10]").unwrap();
    assert_eq!(key.name, "multikeylist");
    assert_eq!(
        key.fields,
        vec![
            ("str".to_string(), "STR".to_string()),
            ("integer".to_string(), "10".to_string()),
        ]
    );

    let quoted = StructuredKey::parse("abc[a=']']").unwrap();
    assert_eq!(quoted.name, "abc");
    assert_eq!(quoted.get("a"), Some("]"));
}

#[test]
fn test_path_segments_decompose_into_keys() {
    let segments =
        parse_path("/interfaces/interface[name=ge-0/0/1][unit='0']/address[ip=10.0.0.1/24]").unwrap();
    assert_eq!(segments.len(), 3);

    let interface = StructuredKey::parse(&segments[1]).unwrap();
    assert_eq!(interface.name, "interface");
    assert_eq!(interface.get("name"), Some("ge-0/0/1"));
    assert_eq!(interface.get("unit"), Some("0"));

    let (name, rest) = extract_name_and_substring(&segments[2]).unwrap();
    assert_eq!(name, "address");
    assert_eq!(rest, "[ip=10.0.0.1/24]");

    assert_eq!(join_path(&segments), "/interfaces/interface[name=ge-0/0/1][unit='0']/address[ip=10.0.0.1/24]");
}

#[test]
fn test_nested_key_survives_one_level_at_a_time() {
    let outer = StructuredKey::parse("list[Sfield=[I=20][S=hello]]").unwrap();
    let nested = outer.get("Sfield").unwrap();
    assert_eq!(nested, "[I=20][S=hello]");

    let inner = StructuredKey::parse(nested).unwrap();
    assert!(inner.name.is_empty());
    assert_eq!(inner.get("I"), Some("20"));
    assert_eq!(inner.get("S"), Some("hello"));
}

#[test]
fn test_error_reports_offset() {
    let err = parse_path("/a/b[k=v").unwrap_err();
    assert!(err.is_unbalanced());
    assert_eq!(err.input(), "/a/b[k=v");
    assert_eq!(err.offset(), Some(4));

    let err = StructuredKey::parse("list[novalue]").unwrap_err();
    assert!(!err.is_unbalanced());
    let err: ysync::Error = err.into();
    assert_eq!(err.module(), "path");
    assert_eq!(err.kind(), ysync::ErrorKind::InvalidPath);
}
