//! Integration tests for wirestruct.
//!
//! These tests drive whole structs through every protocol and check the
//! wire-level guarantees: compatibility, skipping, truncation and limits.

mod common;

use std::error::Error as _;

use common::{decode, encode, sample, Everything, PROTOCOLS};
use wirestruct::annotation::{Adapter, Hidden, Name};
use wirestruct::protocol::{
    skip, BinaryInputProtocol, BinaryOutputProtocol, CompactInputProtocol,
    CompactOutputProtocol, InputProtocol, OutputProtocol, TType,
};
use wirestruct::{CodecConfig, ProtocolError, ProtocolKind, Serializer, Thrift};

/// Populated struct survives every protocol unchanged.
#[test]
fn test_round_trip_all_protocols() {
    let value = sample();
    for kind in PROTOCOLS {
        let bytes = encode(kind, &value);
        let decoded: Everything = decode(kind, &bytes, CodecConfig::new()).unwrap();
        assert_eq!(decoded, value, "{kind:?}");
    }
}

/// Default instance round trips too (empty containers, no optionals).
#[test]
fn test_round_trip_default() {
    for kind in PROTOCOLS {
        let bytes = encode(kind, &Everything::default());
        let decoded: Everything = decode(kind, &bytes, CodecConfig::new()).unwrap();
        assert_eq!(decoded, Everything::default(), "{kind:?}");
    }
}

/// Serializer facade and direct protocol use produce the same bytes.
#[test]
fn test_serializer_matches_protocols() {
    let value = sample();
    for kind in PROTOCOLS {
        let serializer = Serializer::new(CodecConfig::new().protocol(kind));
        let bytes = serializer.serialize(&value).unwrap();
        assert_eq!(&bytes[..], &encode(kind, &value)[..], "{kind:?}");
        assert_eq!(serializer.deserialize::<Everything>(&bytes).unwrap(), value);
    }
}

/// Unknown fields of every composite kind are skipped (binary).
#[test]
fn test_forward_compat_binary() {
    let mut bytes = Vec::new();
    // 1: name = "foo"
    bytes.extend_from_slice(&[0x0B, 0x00, 0x01, 0x00, 0x00, 0x00, 0x03]);
    bytes.extend_from_slice(b"foo");
    // 5: struct { 1: map<string, list<i32>> {"k": [7]} }
    bytes.extend_from_slice(&[0x0C, 0x00, 0x05]);
    bytes.extend_from_slice(&[0x0D, 0x00, 0x01, 0x0B, 0x0F, 0x00, 0x00, 0x00, 0x01]);
    bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x01, b'k']);
    bytes.extend_from_slice(&[0x08, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x07]);
    bytes.push(0x00);
    // 6: set<double> {1.0}
    bytes.extend_from_slice(&[0x0E, 0x00, 0x06, 0x04, 0x00, 0x00, 0x00, 0x01]);
    bytes.extend_from_slice(&1.0f64.to_be_bytes());
    // 7: bool true, 8: i64 -1
    bytes.extend_from_slice(&[0x02, 0x00, 0x07, 0x01]);
    bytes.extend_from_slice(&[0x0A, 0x00, 0x08]);
    bytes.extend_from_slice(&(-1i64).to_be_bytes());
    // 2: typeHint = "bar"
    bytes.extend_from_slice(&[0x0B, 0x00, 0x02, 0x00, 0x00, 0x00, 0x03]);
    bytes.extend_from_slice(b"bar");
    bytes.push(0x00);

    let decoded: Adapter = decode(ProtocolKind::Binary, &bytes, CodecConfig::new()).unwrap();
    assert_eq!(decoded, Adapter::default().with_name("foo").with_type_hint("bar"));
}

/// Unknown field between known ones, with a long-form header after it (compact).
#[test]
fn test_forward_compat_compact() {
    let bytes = [
        0x18, 0x01, b'a', // 1: name = "a"
        0x25, 0x0A, // 3: i32 5 (unknown)
        0x08, 0x04, 0x01, b'b', // 2: typeHint = "b", long-form header
        0x00,
    ];
    let decoded: Adapter = decode(ProtocolKind::Compact, &bytes, CodecConfig::new()).unwrap();
    assert_eq!(decoded, Adapter::default().with_name("a").with_type_hint("b"));
}

/// Unknown fields in a JSON document, including one holding binary-looking text.
#[test]
fn test_forward_compat_json() {
    let doc = br#"{"1":{"str":"foo"},"4":{"lst":["i32",2,1,2]},"5":{"str":"not base64!"},"9":{"rec":{"1":{"tf":1}}},"2":{"str":"bar"}}"#;
    let decoded: Adapter = decode(ProtocolKind::Json, doc, CodecConfig::new()).unwrap();
    assert_eq!(decoded, Adapter::default().with_name("foo").with_type_hint("bar"));
}

/// Skipping a whole struct leaves the cursor at the next value.
#[test]
fn test_skip_lands_on_next_value() {
    let value = sample();

    let mut out = BinaryOutputProtocol::new(Vec::new());
    value.write(&mut out).unwrap();
    out.write_i32(0x7EAD_BEEF).unwrap();
    let bytes = out.into_inner();
    let mut input = BinaryInputProtocol::new(&bytes[..]);
    skip(&mut input, TType::Struct).unwrap();
    assert_eq!(input.read_i32().unwrap(), 0x7EAD_BEEF);

    let mut out = CompactOutputProtocol::new(Vec::new());
    value.write(&mut out).unwrap();
    out.write_i32(0x7EAD_BEEF).unwrap();
    let bytes = out.into_inner();
    let mut input = CompactInputProtocol::new(&bytes[..]);
    input.skip(TType::Struct).unwrap();
    assert_eq!(input.read_i32().unwrap(), 0x7EAD_BEEF);
}

/// Every strict prefix of an encoding fails to decode.
#[test]
fn test_truncation_at_every_boundary() {
    let value = sample();
    for kind in PROTOCOLS {
        let bytes = encode(kind, &value);
        for len in 0..bytes.len() {
            let result: wirestruct::Result<Everything> =
                decode(kind, &bytes[..len], CodecConfig::new());
            let err = match result {
                Ok(_) => panic!("{kind:?} prefix of {len} bytes decoded"),
                Err(err) => err,
            };
            if kind == ProtocolKind::Binary {
                assert!(err.is_unexpected_eof(), "prefix {len}: {err}");
            }
        }
    }
}

/// Empty struct is a lone stop byte (or `{}`) and decodes to the default.
#[test]
fn test_empty_struct() {
    assert_eq!(encode(ProtocolKind::Binary, &Hidden::default()), vec![0x00]);
    assert_eq!(encode(ProtocolKind::Compact, &Hidden::default()), vec![0x00]);
    assert_eq!(encode(ProtocolKind::Json, &Hidden::default()), b"{}".to_vec());

    for (kind, bytes) in [
        (ProtocolKind::Binary, &b"\x00"[..]),
        (ProtocolKind::Compact, &b"\x00"[..]),
        (ProtocolKind::Json, &b"{}"[..]),
    ] {
        let decoded: Everything = decode(kind, bytes, CodecConfig::new()).unwrap();
        assert_eq!(decoded, Everything::default(), "{kind:?}");
    }
}

/// Exact binary bytes for a small struct.
#[test]
fn test_binary_wire_format() {
    let name = Name::default().with_name("ab");
    assert_eq!(
        encode(ProtocolKind::Binary, &name),
        vec![0x0B, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02, b'a', b'b', 0x00]
    );
}

/// Bool fields fold their value into the compact field header.
#[test]
fn test_compact_bool_in_header() {
    let bytes = encode(ProtocolKind::Compact, &sample());
    // field 1 (delta 1), boolean-true
    assert_eq!(bytes[0], 0x11);
}

/// JSON form of an annotation record.
#[test]
fn test_json_wire_format() {
    let adapter = Adapter::default().with_name("foo").with_type_hint("bar");
    assert_eq!(
        String::from_utf8(encode(ProtocolKind::Json, &adapter)).unwrap(),
        r#"{"1":{"str":"foo"},"2":{"str":"bar"}}"#
    );
}

/// JSON objects list fields in declaration order, not sorted as strings.
#[test]
fn test_json_field_order() {
    let value = Everything {
        long: 5,
        note: Some("n".into()),
        ..Everything::default()
    };
    let json = String::from_utf8(encode(ProtocolKind::Json, &value)).unwrap();
    let ids = ["\"1\":", "\"2\":", "\"9\":", "\"10\":", "\"12\":", "\"14\":"];
    let positions: Vec<usize> = ids
        .iter()
        .map(|id| json.find(id).unwrap_or_else(|| panic!("{id} missing in {json}")))
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{json}");

    let decoded: Everything = decode(ProtocolKind::Json, json.as_bytes(), CodecConfig::new()).unwrap();
    assert_eq!(decoded, value);
}

/// Nesting beyond the configured depth is rejected.
#[test]
fn test_depth_limit() {
    let mut value = Everything::default();
    for _ in 0..6 {
        value = Everything {
            child: Some(Box::new(value)),
            ..Everything::default()
        };
    }

    for kind in PROTOCOLS {
        let bytes = encode(kind, &value);
        let decoded: Everything = decode(kind, &bytes, CodecConfig::new()).unwrap();
        assert_eq!(decoded, value, "{kind:?}");

        let err = decode::<Everything>(kind, &bytes, CodecConfig::new().max_depth(4)).unwrap_err();
        assert!(
            matches!(err.root_cause(), ProtocolError::DepthLimit(4)),
            "{kind:?}: {err}"
        );
    }
}

/// Oversized declared lengths fail before allocation.
#[test]
fn test_size_limits() {
    let value = Everything {
        ints: vec![0; 10],
        text: "0123456789".into(),
        ..Everything::default()
    };
    for kind in PROTOCOLS {
        let bytes = encode(kind, &value);

        let err =
            decode::<Everything>(kind, &bytes, CodecConfig::new().max_container_len(9)).unwrap_err();
        assert!(
            matches!(err.root_cause(), ProtocolError::SizeLimit { size: 10, limit: 9 }),
            "{kind:?}: {err}"
        );

        let err =
            decode::<Everything>(kind, &bytes, CodecConfig::new().max_string_len(9)).unwrap_err();
        assert!(
            matches!(err.root_cause(), ProtocolError::SizeLimit { limit: 9, .. }),
            "{kind:?}: {err}"
        );
    }
}

/// Nested failures keep the whole path in the message and the source chain.
#[test]
fn test_error_context_chain() {
    let value = Everything {
        child: Some(Box::new(Everything {
            text: "inner".into(),
            ..Everything::default()
        })),
        ..Everything::default()
    };
    let bytes = encode(ProtocolKind::Binary, &value);
    // drop the child's stop byte and the outer stop byte
    let err = decode::<Everything>(ProtocolKind::Binary, &bytes[..bytes.len() - 2], CodecConfig::new())
        .unwrap_err();

    let message = err.to_string();
    assert!(
        message.starts_with(
            "Everything field 20 (child) read error: error reading field 20: \
             Everything field header read error: "
        ),
        "{message}"
    );
    assert!(err.source().is_some());
    assert!(err.is_unexpected_eof());
}

/// A negative length is rejected as such.
#[test]
fn test_negative_length() {
    let bytes = [0x0B, 0x00, 0x01, 0xFF, 0xFF, 0xFF, 0xFF];
    let err = decode::<Adapter>(ProtocolKind::Binary, &bytes, CodecConfig::new()).unwrap_err();
    assert!(matches!(err.root_cause(), ProtocolError::NegativeSize(-1)));
}

/// Rendering follows declaration order and marks unset optionals.
#[test]
fn test_rendering() {
    assert_eq!(
        Adapter::default().with_name("foo").with_type_hint("bar").to_string(),
        "Adapter({Name:foo TypeHint:bar})"
    );
    assert_eq!(Hidden::default().to_string(), "Hidden({})");

    let rendered = Everything {
        ints: vec![1, 2],
        hint: Some(Name::default().with_name("n")),
        ..Everything::default()
    }
    .to_string();
    assert!(rendered.starts_with("Everything({Flag:false Small:0 "), "{rendered}");
    assert!(rendered.contains(" Ints:[1 2] "), "{rendered}");
    assert!(rendered.contains(" Scores:map[] "), "{rendered}");
    assert!(rendered.contains(" Hint:Name({Name:n}) "), "{rendered}");
    assert!(rendered.ends_with(" Note:<nil> Enabled:<nil> Child:<nil>})"), "{rendered}");
}

/// The required check runs after the frame loop, for every protocol.
#[test]
fn test_required_field_missing() {
    #[derive(Debug, Default, PartialEq)]
    struct Strict {
        id: i64,
    }

    impl wirestruct::ThriftStruct for Strict {
        fn descriptor() -> &'static wirestruct::StructDescriptor<Self> {
            static DESCRIPTOR: wirestruct::StructDescriptor<Strict> = wirestruct::StructDescriptor {
                name: "Strict",
                fields: &[wirestruct::thrift_field!(Strict, 1: id: required i64 => "id", "Id")],
            };
            &DESCRIPTOR
        }
    }
    wirestruct::impl_thrift_struct!(Strict);

    for kind in PROTOCOLS {
        let bytes = encode(kind, &Hidden::default());
        let err = decode::<Strict>(kind, &bytes, CodecConfig::new()).unwrap_err();
        assert!(
            matches!(
                err.root_cause(),
                ProtocolError::MissingRequiredField { id: 1, name: "id" }
            ),
            "{kind:?}: {err}"
        );

        let bytes = encode(kind, &Strict { id: 3 });
        assert_eq!(decode::<Strict>(kind, &bytes, CodecConfig::new()).unwrap(), Strict { id: 3 });
    }
}
