use std::collections::BTreeMap;

use insta::assert_snapshot;
use tessera::{ErrorKind, Model};
use tessera_cbor::{CborError, Item, from_slice, to_item, to_vec};

#[derive(Model, Debug, Clone, PartialEq)]
struct Sample {
    id: u32,
    offset: i16,
    label: Option<String>,
    weights: Vec<f32>,
}

#[derive(Model, Debug, Clone, PartialEq)]
enum Event {
    Reset,
    Moved(i64, i64),
    Renamed { to: String },
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[tessera_testhelpers::test]
fn record_bytes() {
    let sample = Sample {
        id: 1000,
        offset: -500,
        label: None,
        weights: vec![0.25],
    };
    assert_snapshot!(
        hex(&to_vec(&sample)),
        @"a4 62 69 64 19 03 e8 66 6f 66 66 73 65 74 39 01 f3 65 6c 61 62 65 6c f6 67 77 65 69 67 68 74 73 81 fa 3e 80 00 00"
    );
    assert_eq!(from_slice::<Sample>(&to_vec(&sample)).unwrap(), sample);
}

#[tessera_testhelpers::test]
fn integers_grow_only_as_needed() {
    assert_eq!(to_vec(&0u64), [0x00]);
    assert_eq!(to_vec(&-1i8), [0x20]);
    assert_eq!(to_vec(&300u16), [0x19, 0x01, 0x2c]);
    assert_eq!(to_vec(&(u32::MAX as u64)), [0x1a, 0xff, 0xff, 0xff, 0xff]);
    assert_eq!(to_vec(&(u32::MAX as u64 + 1))[0], 0x1b);
}

#[tessera_testhelpers::test]
fn any_width_decodes_to_the_same_value() {
    let encodings: [&[u8]; 4] = [
        &[0x07],
        &[0x18, 0x07],
        &[0x19, 0x00, 0x07],
        &[0x1b, 0, 0, 0, 0, 0, 0, 0, 0x07],
    ];
    for bytes in encodings {
        assert_eq!(from_slice::<u8>(bytes).unwrap(), 7);
    }
}

#[tessera_testhelpers::test]
fn out_of_range_integers_are_mismatches() {
    // 300 as a u8
    let err = from_slice::<u8>(&[0x19, 0x01, 0x2c]).unwrap_err();
    assert_snapshot!(err.to_string(), @"type mismatch: expected u8, got integer 300");
    // -1 as a u32
    let err = from_slice::<u32>(&[0x20]).unwrap_err();
    assert!(matches!(err.kind(), Some(ErrorKind::TypeMismatch { .. })));
    // -(2^64) fits no target
    let err = from_slice::<i64>(&[0x3b, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]).unwrap_err();
    assert!(matches!(err.kind(), Some(ErrorKind::TypeMismatch { .. })));
}

#[tessera_testhelpers::test]
fn reserved_width_is_unknown_width() {
    let err = from_slice::<u64>(&[0x1d]).unwrap_err();
    assert_eq!(err.kind(), Some(&ErrorKind::UnknownWidth { bytes: 32 }));
    assert_snapshot!(err.to_string(), @"Unknown width: 32-byte integers are not supported");
}

#[tessera_testhelpers::test]
fn enums_are_externally_tagged() {
    let events = vec![
        Event::Reset,
        Event::Moved(-3, 4),
        Event::Renamed { to: "x".into() },
    ];
    let item = to_item(&events);
    assert_eq!(
        item,
        Item::Array(vec![
            Item::Text("Reset".into()),
            Item::Map(vec![(
                Item::Text("Moved".into()),
                Item::Array(vec![Item::Negative(2), Item::Unsigned(4)])
            )]),
            Item::Map(vec![(
                Item::Text("Renamed".into()),
                Item::Map(vec![(Item::Text("to".into()), Item::Text("x".into()))])
            )]),
        ])
    );
    assert_eq!(from_slice::<Vec<Event>>(&to_vec(&events)).unwrap(), events);
}

#[tessera_testhelpers::test]
fn maps_need_text_keys() {
    // {1: 2}
    let err = from_slice::<BTreeMap<String, u8>>(&[0xa1, 0x01, 0x02]).unwrap_err();
    assert!(
        matches!(err.kind(), Some(ErrorKind::KeyTypeError { got }) if got == "unsigned integer"),
        "{err}"
    );
}

#[tessera_testhelpers::test]
fn errors_carry_the_path() {
    // {"id": 1, "offset": "far", "label": null, "weights": []}
    let input = b"\xa4\x62id\x01\x66offset\x63far\x65label\xf6\x67weights\x80";
    let err = from_slice::<Sample>(input).unwrap_err();
    assert_snapshot!(err.to_string(), @r#"type mismatch: expected i16, got string "far" (at offset)"#);
}

#[tessera_testhelpers::test]
fn integers_are_not_floats() {
    // {"id": 1, "offset": 0, "label": null, "weights": [1]}
    let input = b"\xa4\x62id\x01\x66offset\x00\x65label\xf6\x67weights\x81\x01";
    let err = from_slice::<Sample>(input).unwrap_err();
    assert_snapshot!(err.to_string(), @"type mismatch: expected f32, got integer 1 (at weights[0])");

    // f64 1e300 does not fit an f32
    let input = b"\xa4\x62id\x01\x66offset\x00\x65label\xf6\x67weights\x81\xfb\x7e\x37\xe4\x3c\x88\x00\x75\x9c";
    let err = from_slice::<Sample>(input).unwrap_err();
    assert!(matches!(err.kind(), Some(ErrorKind::TypeMismatch { expected: "f32", .. })), "{err}");
}

#[tessera_testhelpers::test]
fn decode_errors_are_not_read_errors() {
    let err = from_slice::<u8>(&[0x18]).unwrap_err();
    assert!(matches!(err, CborError::UnexpectedEof { offset: 1 }));
    assert!(err.as_read_error().is_none());

    let err = from_slice::<u8>(&[0xc0, 0x00]).unwrap_err();
    assert_snapshot!(err.to_string(), @"unsupported CBOR item at offset 0: tagged item");
}

#[tessera_testhelpers::test]
fn io_round_trip() {
    let mut out = Vec::new();
    tessera_cbor::to_writer(&mut out, &vec!["a".to_owned()]).unwrap();
    assert_eq!(out, [0x81, 0x61, b'a']);
    let back: Vec<String> = tessera_cbor::from_reader(out.as_slice()).unwrap();
    assert_eq!(back, ["a"]);
}
