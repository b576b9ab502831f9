//! Annotations - encode the annotation records with every protocol.
//!
//! This example demonstrates:
//! - Serializing through the `Serializer` facade for each protocol
//! - Decoding a message that carries a field the reader does not know
//! - The human-readable rendering of records
//!
//! # Running
//!
//! ```text
//! RUST_LOG=wirestruct=trace cargo run --example annotations
//! ```
//!
//! With `trace` enabled the skipped unknown field is logged.

use wirestruct::annotation::{Adapter, Flags, Hidden, IOBuf, Name};
use wirestruct::{CodecConfig, ProtocolKind, Serializer, Thrift};

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn show<T: Thrift + std::fmt::Display>(
    label: &str,
    value: &T,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("{label}: {value}");
    for kind in [ProtocolKind::Binary, ProtocolKind::Compact, ProtocolKind::Json] {
        let serializer = Serializer::new(CodecConfig::new().protocol(kind));
        let bytes = serializer.serialize(value)?;
        match kind {
            ProtocolKind::Json => println!("  {kind:?}: {}", String::from_utf8_lossy(&bytes)),
            _ => println!("  {kind:?}: {}", hex(&bytes)),
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    show("hidden", &Hidden::default())?;
    show("flags", &Flags::default())?;
    show("iobuf", &IOBuf::default())?;
    show("name", &Name::default().with_name("renamed"))?;
    show(
        "adapter",
        &Adapter::default()
            .with_name("::my::Adapter")
            .with_type_hint("::my::Wrapped"),
    )?;

    // A newer writer added field 3; this reader skips it.
    let newer = br#"{"1":{"str":"::my::Adapter"},"3":{"lst":["i32",2,7,8]},"2":{"str":"hint"}}"#;
    let json = Serializer::new(CodecConfig::new().protocol(ProtocolKind::Json));
    let adapter: Adapter = json.deserialize(newer)?;
    println!("decoded from newer writer: {adapter}");

    Ok(())
}
