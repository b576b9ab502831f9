//! Protocol module - the capability traits and their concrete encodings.
//!
//! Struct traversal is written once against [`InputProtocol`] and
//! [`OutputProtocol`]; each encoding only decides how a header or a
//! primitive looks on the wire:
//!
//! - [`BinaryInputProtocol`] / [`BinaryOutputProtocol`] - fixed-width, big-endian
//! - [`CompactInputProtocol`] / [`CompactOutputProtocol`] - zigzag varints, packed headers
//! - [`JsonInputProtocol`] / [`JsonOutputProtocol`] - Thrift JSON
//!
//! Both traits are object safe; traversal code takes `&mut dyn InputProtocol`.
//! A protocol instance owns its stream cursor and nesting state, so it must
//! not be shared between concurrent operations.

mod binary;
mod compact;
mod json;
mod skip;
mod wire_format;

pub use binary::{BinaryInputProtocol, BinaryOutputProtocol};
pub use compact::{CompactInputProtocol, CompactOutputProtocol};
pub use json::{JsonInputProtocol, JsonOutputProtocol};
pub use skip::skip;
pub use wire_format::{
    FieldIdentifier, ListIdentifier, MapIdentifier, SetIdentifier, StructIdentifier, TType,
};

pub(crate) use wire_format::{
    checked_container_len, checked_string_len, encodable_len, MAX_PREALLOC,
};

use crate::config::CodecConfig;
use crate::error::{ProtocolError, Result};

/// Read side of a wire encoding.
pub trait InputProtocol {
    fn read_struct_begin(&mut self) -> Result<StructIdentifier>;
    fn read_struct_end(&mut self) -> Result<()>;

    /// Next field header; the stop marker ends the frame.
    fn read_field_begin(&mut self) -> Result<FieldIdentifier>;
    fn read_field_end(&mut self) -> Result<()>;

    fn read_list_begin(&mut self) -> Result<ListIdentifier>;
    fn read_list_end(&mut self) -> Result<()>;
    fn read_set_begin(&mut self) -> Result<SetIdentifier>;
    fn read_set_end(&mut self) -> Result<()>;
    fn read_map_begin(&mut self) -> Result<MapIdentifier>;
    fn read_map_end(&mut self) -> Result<()>;

    fn read_bool(&mut self) -> Result<bool>;
    fn read_byte(&mut self) -> Result<i8>;
    fn read_i16(&mut self) -> Result<i16>;
    fn read_i32(&mut self) -> Result<i32>;
    fn read_i64(&mut self) -> Result<i64>;
    fn read_double(&mut self) -> Result<f64>;
    fn read_string(&mut self) -> Result<String>;
    fn read_binary(&mut self) -> Result<Vec<u8>>;

    /// Consume a string or binary value without interpreting it.
    fn skip_bytes(&mut self) -> Result<()> {
        self.read_binary().map(drop)
    }

    /// Limits this instance enforces.
    fn config(&self) -> &CodecConfig;

    /// Consume and discard one value of `field_type`.
    fn skip(&mut self, field_type: TType) -> Result<()> {
        skip(self, field_type)
    }
}

/// Write side of a wire encoding.
pub trait OutputProtocol {
    fn write_struct_begin(&mut self, identifier: &StructIdentifier) -> Result<()>;
    fn write_struct_end(&mut self) -> Result<()>;

    fn write_field_begin(&mut self, identifier: &FieldIdentifier) -> Result<()>;
    fn write_field_end(&mut self) -> Result<()>;
    fn write_field_stop(&mut self) -> Result<()>;

    fn write_list_begin(&mut self, identifier: &ListIdentifier) -> Result<()>;
    fn write_list_end(&mut self) -> Result<()>;
    fn write_set_begin(&mut self, identifier: &SetIdentifier) -> Result<()>;
    fn write_set_end(&mut self) -> Result<()>;
    fn write_map_begin(&mut self, identifier: &MapIdentifier) -> Result<()>;
    fn write_map_end(&mut self) -> Result<()>;

    fn write_bool(&mut self, value: bool) -> Result<()>;
    fn write_byte(&mut self, value: i8) -> Result<()>;
    fn write_i16(&mut self, value: i16) -> Result<()>;
    fn write_i32(&mut self, value: i32) -> Result<()>;
    fn write_i64(&mut self, value: i64) -> Result<()>;
    fn write_double(&mut self, value: f64) -> Result<()>;
    fn write_string(&mut self, value: &str) -> Result<()>;
    fn write_binary(&mut self, value: &[u8]) -> Result<()>;

    /// Flush buffered output to the underlying writer.
    fn flush(&mut self) -> Result<()>;
}

/// Struct nesting counter shared by the input protocols.
#[derive(Debug, Default)]
pub(crate) struct Depth(usize);

impl Depth {
    pub(crate) fn enter(&mut self, limit: usize) -> Result<()> {
        if self.0 >= limit {
            return Err(ProtocolError::DepthLimit(limit));
        }
        self.0 += 1;
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.0 = self.0.saturating_sub(1);
    }
}
