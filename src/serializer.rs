//! One-call encode/decode of a value to and from `Bytes`.
//!
//! [`Serializer`] picks the protocol from its [`CodecConfig`] and applies
//! the same limits on decode. The free functions [`serialize`] and
//! [`deserialize`] use the default configuration (binary protocol).
//!
//! # Example
//!
//! ```
//! use wirestruct::annotation::Adapter;
//! use wirestruct::{CodecConfig, ProtocolKind, Serializer};
//!
//! let adapter = Adapter::default().with_name("foo").with_type_hint("bar");
//!
//! let serializer = Serializer::new(CodecConfig::new().protocol(ProtocolKind::Json));
//! let bytes = serializer.serialize(&adapter).unwrap();
//! assert_eq!(&bytes[..], br#"{"1":{"str":"foo"},"2":{"str":"bar"}}"#);
//!
//! let decoded: Adapter = serializer.deserialize(&bytes).unwrap();
//! assert_eq!(decoded, adapter);
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use crate::codec::Thrift;
use crate::config::{CodecConfig, ProtocolKind};
use crate::error::Result;
use crate::protocol::{
    BinaryInputProtocol, BinaryOutputProtocol, CompactInputProtocol, CompactOutputProtocol,
    JsonInputProtocol, JsonOutputProtocol, OutputProtocol,
};

/// Encodes and decodes whole messages with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct Serializer {
    config: CodecConfig,
}

impl Serializer {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encode `value` into a fresh buffer.
    ///
    /// # Errors
    ///
    /// Fails if a length does not fit the wire format or a protocol rejects
    /// the value.
    pub fn serialize<T: Thrift>(&self, value: &T) -> Result<Bytes> {
        let mut writer = BytesMut::new().writer();
        match self.config.protocol {
            ProtocolKind::Binary => encode(value, &mut BinaryOutputProtocol::new(&mut writer))?,
            ProtocolKind::Compact => {
                encode(value, &mut CompactOutputProtocol::new(&mut writer))?
            }
            ProtocolKind::Json => encode(value, &mut JsonOutputProtocol::new(&mut writer))?,
        }
        Ok(writer.into_inner().freeze())
    }

    /// Decode one `T` from the start of `bytes`.
    ///
    /// Bytes left over after the value are ignored and logged at `debug`.
    ///
    /// # Errors
    ///
    /// Fails on truncated or malformed input, on limits being exceeded, and
    /// on missing required fields.
    pub fn deserialize<T: Thrift>(&self, bytes: &[u8]) -> Result<T> {
        let config = self.config.clone();
        let (value, trailing) = match config.protocol {
            ProtocolKind::Binary => {
                let mut input = BinaryInputProtocol::with_config(bytes, config);
                let value = T::read(&mut input)?;
                (value, input.into_inner().len())
            }
            ProtocolKind::Compact => {
                let mut input = CompactInputProtocol::with_config(bytes, config);
                let value = T::read(&mut input)?;
                (value, input.into_inner().len())
            }
            ProtocolKind::Json => {
                let mut input = JsonInputProtocol::with_config(bytes, config);
                let value = T::read(&mut input)?;
                let rest = &bytes[input.byte_offset().min(bytes.len())..];
                let trailing = rest.iter().filter(|b| !b.is_ascii_whitespace()).count();
                (value, trailing)
            }
        };

        if trailing > 0 {
            tracing::debug!(
                protocol = ?self.config.protocol,
                trailing,
                "trailing bytes after decoded message"
            );
        }
        Ok(value)
    }
}

fn encode<T: Thrift>(value: &T, out: &mut dyn OutputProtocol) -> Result<()> {
    value.write(out)?;
    out.flush()
}

/// Encode with the binary protocol and default limits.
pub fn serialize<T: Thrift>(value: &T) -> Result<Bytes> {
    Serializer::default().serialize(value)
}

/// Decode with the binary protocol and default limits.
pub fn deserialize<T: Thrift>(bytes: &[u8]) -> Result<T> {
    Serializer::default().deserialize(bytes)
}
