//! Codec configuration: protocol choice and decode limits.
//!
//! Limits are checked before any allocation, so a corrupt or hostile length
//! field fails fast instead of reserving gigabytes.
//!
//! # Example
//!
//! ```
//! use wirestruct::{CodecConfig, ProtocolKind};
//!
//! let config = CodecConfig::new()
//!     .protocol(ProtocolKind::Compact)
//!     .max_string_len(1024)
//!     .max_depth(16);
//!
//! assert_eq!(config.protocol, ProtocolKind::Compact);
//! assert_eq!(config.max_container_len, wirestruct::config::DEFAULT_MAX_CONTAINER_LEN);
//! ```

use serde::{Deserialize, Serialize};

/// Default maximum string/binary length (64 MiB).
pub const DEFAULT_MAX_STRING_LEN: usize = 64 * 1024 * 1024;

/// Default maximum declared element count for a list, set or map.
pub const DEFAULT_MAX_CONTAINER_LEN: usize = 16 * 1024 * 1024;

/// Default maximum nesting of structs and skipped composites.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Concrete wire encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolKind {
    /// Fixed-width big-endian encoding.
    #[default]
    Binary,
    /// Varint encoding with packed field headers.
    Compact,
    /// Thrift JSON encoding.
    Json,
}

/// Protocol choice plus decode limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Wire encoding used by the serializer facade.
    pub protocol: ProtocolKind,
    /// Longest string or binary value accepted on decode.
    pub max_string_len: usize,
    /// Largest declared container size accepted on decode.
    pub max_container_len: usize,
    /// Deepest struct/composite nesting accepted on decode.
    pub max_depth: usize,
}

impl CodecConfig {
    /// Configuration with default limits and the binary protocol.
    pub fn new() -> Self {
        Self {
            protocol: ProtocolKind::Binary,
            max_string_len: DEFAULT_MAX_STRING_LEN,
            max_container_len: DEFAULT_MAX_CONTAINER_LEN,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the wire encoding.
    pub fn protocol(mut self, protocol: ProtocolKind) -> Self {
        self.protocol = protocol;
        self
    }

    /// Set the maximum string/binary length.
    pub fn max_string_len(mut self, limit: usize) -> Self {
        self.max_string_len = limit;
        self
    }

    /// Set the maximum container element count.
    pub fn max_container_len(mut self, limit: usize) -> Self {
        self.max_container_len = limit;
        self
    }

    /// Set the maximum nesting depth.
    pub fn max_depth(mut self, limit: usize) -> Self {
        self.max_depth = limit;
        self
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CodecConfig::default();
        assert_eq!(config.protocol, ProtocolKind::Binary);
        assert_eq!(config.max_string_len, DEFAULT_MAX_STRING_LEN);
        assert_eq!(config.max_container_len, DEFAULT_MAX_CONTAINER_LEN);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: CodecConfig =
            serde_json::from_str(r#"{"protocol":"json","max_depth":8}"#).unwrap();
        assert_eq!(config.protocol, ProtocolKind::Json);
        assert_eq!(config.max_depth, 8);
        assert_eq!(config.max_string_len, DEFAULT_MAX_STRING_LEN);
    }

    #[test]
    fn test_setters_chain() {
        let config = CodecConfig::new()
            .protocol(ProtocolKind::Json)
            .max_container_len(10)
            .max_string_len(20);
        assert_eq!(config.protocol, ProtocolKind::Json);
        assert_eq!(config.max_container_len, 10);
        assert_eq!(config.max_string_len, 20);
    }
}
