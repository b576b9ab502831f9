//! Shared struct shapes for the integration and property tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};

use bytes::Bytes;
use wirestruct::annotation::{Adapter, Name};
use wirestruct::codec::{StructDescriptor, ThriftStruct};
use wirestruct::protocol::{
    BinaryInputProtocol, BinaryOutputProtocol, CompactInputProtocol, CompactOutputProtocol,
    JsonInputProtocol, JsonOutputProtocol,
};
use wirestruct::{impl_thrift_struct, thrift_field, CodecConfig, ProtocolKind, Thrift};

/// One field of every value kind, plus a recursive child.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Everything {
    pub flag: bool,
    pub small: i8,
    pub short: i16,
    pub int: i32,
    pub long: i64,
    pub ratio: f64,
    pub text: String,
    pub blob: Bytes,
    pub ints: Vec<i32>,
    pub names: BTreeSet<String>,
    pub scores: BTreeMap<String, i64>,
    pub adapters: Vec<Adapter>,
    pub hint: Option<Name>,
    pub note: Option<String>,
    pub enabled: Option<bool>,
    pub child: Option<Box<Everything>>,
}

impl ThriftStruct for Everything {
    fn descriptor() -> &'static StructDescriptor<Self> {
        static DESCRIPTOR: StructDescriptor<Everything> = StructDescriptor {
            name: "Everything",
            fields: &[
                thrift_field!(Everything, 1: flag: bool => "flag", "Flag"),
                thrift_field!(Everything, 2: small: i8 => "small", "Small"),
                thrift_field!(Everything, 3: short: i16 => "short", "Short"),
                thrift_field!(Everything, 4: int: i32 => "int", "Int"),
                thrift_field!(Everything, 5: long: i64 => "long", "Long"),
                thrift_field!(Everything, 6: ratio: f64 => "ratio", "Ratio"),
                thrift_field!(Everything, 7: text: String => "text", "Text"),
                thrift_field!(Everything, 8: blob: Bytes => "blob", "Blob"),
                thrift_field!(Everything, 9: ints: Vec<i32> => "ints", "Ints"),
                thrift_field!(Everything, 10: names: BTreeSet<String> => "names", "Names"),
                thrift_field!(Everything, 11: scores: BTreeMap<String, i64> => "scores", "Scores"),
                thrift_field!(Everything, 12: adapters: Vec<Adapter> => "adapters", "Adapters"),
                thrift_field!(Everything, 13: hint: optional Name => "hint", "Hint"),
                thrift_field!(Everything, 14: note: optional String => "note", "Note"),
                thrift_field!(Everything, 15: enabled: optional bool => "enabled", "Enabled"),
                thrift_field!(Everything, 20: child: optional Box<Everything> => "child", "Child"),
            ],
        };
        &DESCRIPTOR
    }
}
impl_thrift_struct!(Everything);

/// A populated instance with a one-level child.
pub fn sample() -> Everything {
    let child = Everything {
        flag: false,
        int: -1,
        text: "child".into(),
        enabled: Some(false),
        ..Everything::default()
    };
    Everything {
        flag: true,
        small: -8,
        short: 300,
        int: -70_000,
        long: i64::MIN + 1,
        ratio: 2.5,
        text: "héllo".into(),
        blob: Bytes::from_static(&[0, 1, 0xFE, 0xFF]),
        ints: vec![1, -2, 3],
        names: ["a".to_string(), "b".to_string()].into_iter().collect(),
        scores: [("x".to_string(), 10i64), ("y".to_string(), -20)]
            .into_iter()
            .collect(),
        adapters: vec![Adapter::default().with_name("foo").with_type_hint("bar")],
        hint: Some(Name::default().with_name("renamed")),
        note: None,
        enabled: Some(true),
        child: Some(Box::new(child)),
    }
}

pub const PROTOCOLS: [ProtocolKind; 3] =
    [ProtocolKind::Binary, ProtocolKind::Compact, ProtocolKind::Json];

/// Encode with `kind` through the protocol types directly.
pub fn encode<T: Thrift>(kind: ProtocolKind, value: &T) -> Vec<u8> {
    match kind {
        ProtocolKind::Binary => {
            let mut out = BinaryOutputProtocol::new(Vec::new());
            value.write(&mut out).unwrap();
            out.into_inner()
        }
        ProtocolKind::Compact => {
            let mut out = CompactOutputProtocol::new(Vec::new());
            value.write(&mut out).unwrap();
            out.into_inner()
        }
        ProtocolKind::Json => {
            let mut out = JsonOutputProtocol::new(Vec::new());
            value.write(&mut out).unwrap();
            out.into_inner()
        }
    }
}

/// Decode with `kind` and `config` limits.
pub fn decode<T: Thrift>(
    kind: ProtocolKind,
    bytes: &[u8],
    config: CodecConfig,
) -> wirestruct::Result<T> {
    match kind {
        ProtocolKind::Binary => T::read(&mut BinaryInputProtocol::with_config(bytes, config)),
        ProtocolKind::Compact => T::read(&mut CompactInputProtocol::with_config(bytes, config)),
        ProtocolKind::Json => T::read(&mut JsonInputProtocol::with_config(bytes, config)),
    }
}
