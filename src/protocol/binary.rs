//! Binary protocol: fixed-width, big-endian encoding.
//!
//! ```text
//! field     := type:u8  id:i16be  value
//! stop      := 0x00
//! string    := len:i32be  bytes[len]
//! list/set  := elem:u8  count:i32be  elems
//! map       := key:u8  val:u8  count:i32be  (key val)*
//! ```
//!
//! Struct begin/end emit nothing; bool is one byte (0 or 1), double is the
//! IEEE-754 bit pattern as a big-endian u64.

use std::io::{self, Read, Write};

use super::{
    checked_container_len, checked_string_len, encodable_len, Depth, FieldIdentifier,
    InputProtocol, ListIdentifier, MapIdentifier, OutputProtocol, SetIdentifier,
    StructIdentifier, TType, MAX_PREALLOC,
};
use crate::config::CodecConfig;
use crate::error::{ProtocolError, Result};

/// Reads the binary protocol from any [`Read`].
///
/// # Example
///
/// ```
/// use wirestruct::protocol::{BinaryInputProtocol, InputProtocol, TType};
///
/// let bytes = [11u8, 0, 1, 0, 0, 0, 3, b'f', b'o', b'o', 0];
/// let mut input = BinaryInputProtocol::new(&bytes[..]);
///
/// let field = input.read_field_begin().unwrap();
/// assert_eq!((field.field_type, field.id), (TType::String, 1));
/// assert_eq!(input.read_string().unwrap(), "foo");
/// assert!(input.read_field_begin().unwrap().is_stop());
/// ```
#[derive(Debug)]
pub struct BinaryInputProtocol<R> {
    reader: R,
    config: CodecConfig,
    depth: Depth,
}

impl<R: Read> BinaryInputProtocol<R> {
    /// Create a reader with default limits.
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, CodecConfig::default())
    }

    /// Create a reader with custom limits.
    pub fn with_config(reader: R, config: CodecConfig) -> Self {
        Self {
            reader,
            config,
            depth: Depth::default(),
        }
    }

    /// Give back the underlying reader, positioned after the last value read.
    pub fn into_inner(self) -> R {
        self.reader
    }

    #[inline]
    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.reader.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn read_ttype(&mut self) -> Result<TType> {
        let [tag] = self.read_array::<1>()?;
        TType::try_from(tag)
    }

    fn read_len_prefixed(&mut self) -> Result<Vec<u8>> {
        let len = checked_string_len(self.read_i32()? as i64, &self.config)?;
        read_exact_vec(&mut self.reader, len)
    }
}

/// Read exactly `len` bytes without trusting `len` for the initial allocation.
pub(crate) fn read_exact_vec<R: Read>(reader: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(len.min(MAX_PREALLOC));
    reader.by_ref().take(len as u64).read_to_end(&mut buf)?;
    if buf.len() != len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("expected {} bytes, stream ended after {}", len, buf.len()),
        )
        .into());
    }
    Ok(buf)
}

impl<R: Read> InputProtocol for BinaryInputProtocol<R> {
    fn read_struct_begin(&mut self) -> Result<StructIdentifier> {
        self.depth.enter(self.config.max_depth)?;
        Ok(StructIdentifier { name: None })
    }

    fn read_struct_end(&mut self) -> Result<()> {
        self.depth.leave();
        Ok(())
    }

    fn read_field_begin(&mut self) -> Result<FieldIdentifier> {
        let field_type = self.read_ttype()?;
        if field_type == TType::Stop {
            return Ok(FieldIdentifier::stop());
        }
        let id = self.read_i16()?;
        Ok(FieldIdentifier::decoded(field_type, id))
    }

    fn read_field_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_list_begin(&mut self) -> Result<ListIdentifier> {
        let element_type = self.read_ttype()?;
        let size = checked_container_len(self.read_i32()? as i64, &self.config)?;
        Ok(ListIdentifier::new(element_type, size))
    }

    fn read_list_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_set_begin(&mut self) -> Result<SetIdentifier> {
        let element_type = self.read_ttype()?;
        let size = checked_container_len(self.read_i32()? as i64, &self.config)?;
        Ok(SetIdentifier::new(element_type, size))
    }

    fn read_set_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_map_begin(&mut self) -> Result<MapIdentifier> {
        let key_type = self.read_ttype()?;
        let value_type = self.read_ttype()?;
        let size = checked_container_len(self.read_i32()? as i64, &self.config)?;
        Ok(MapIdentifier::new(key_type, value_type, size))
    }

    fn read_map_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_bool(&mut self) -> Result<bool> {
        let [b] = self.read_array::<1>()?;
        Ok(b != 0)
    }

    fn read_byte(&mut self) -> Result<i8> {
        let [b] = self.read_array::<1>()?;
        Ok(b as i8)
    }

    fn read_i16(&mut self) -> Result<i16> {
        Ok(i16::from_be_bytes(self.read_array()?))
    }

    fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_be_bytes(self.read_array()?))
    }

    fn read_i64(&mut self) -> Result<i64> {
        Ok(i64::from_be_bytes(self.read_array()?))
    }

    fn read_double(&mut self) -> Result<f64> {
        Ok(f64::from_bits(u64::from_be_bytes(self.read_array()?)))
    }

    fn read_string(&mut self) -> Result<String> {
        let bytes = self.read_len_prefixed()?;
        String::from_utf8(bytes)
            .map_err(|e| ProtocolError::invalid_data(format!("string is not UTF-8: {}", e)))
    }

    fn read_binary(&mut self) -> Result<Vec<u8>> {
        self.read_len_prefixed()
    }

    fn config(&self) -> &CodecConfig {
        &self.config
    }
}

/// Writes the binary protocol to any [`Write`].
///
/// # Example
///
/// ```
/// use wirestruct::protocol::{BinaryOutputProtocol, FieldIdentifier, OutputProtocol, TType};
///
/// let mut out = BinaryOutputProtocol::new(Vec::new());
/// out.write_field_begin(&FieldIdentifier::new("name", TType::String, 1)).unwrap();
/// out.write_string("foo").unwrap();
/// out.write_field_end().unwrap();
/// out.write_field_stop().unwrap();
///
/// assert_eq!(out.into_inner(), [11, 0, 1, 0, 0, 0, 3, b'f', b'o', b'o', 0]);
/// ```
#[derive(Debug)]
pub struct BinaryOutputProtocol<W> {
    writer: W,
}

impl<W: Write> BinaryOutputProtocol<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Give back the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    #[inline]
    fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        Ok(())
    }

    fn write_len_prefixed(&mut self, bytes: &[u8]) -> Result<()> {
        let len = encodable_len(bytes.len())?;
        self.write_i32(len)?;
        self.write_raw(bytes)
    }
}

impl<W: Write> OutputProtocol for BinaryOutputProtocol<W> {
    fn write_struct_begin(&mut self, _identifier: &StructIdentifier) -> Result<()> {
        Ok(())
    }

    fn write_struct_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_field_begin(&mut self, identifier: &FieldIdentifier) -> Result<()> {
        let id = identifier.id.to_be_bytes();
        self.write_raw(&[identifier.field_type.as_u8(), id[0], id[1]])
    }

    fn write_field_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_field_stop(&mut self) -> Result<()> {
        self.write_raw(&[TType::Stop.as_u8()])
    }

    fn write_list_begin(&mut self, identifier: &ListIdentifier) -> Result<()> {
        self.write_raw(&[identifier.element_type.as_u8()])?;
        self.write_i32(encodable_len(identifier.size)?)
    }

    fn write_list_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_set_begin(&mut self, identifier: &SetIdentifier) -> Result<()> {
        self.write_raw(&[identifier.element_type.as_u8()])?;
        self.write_i32(encodable_len(identifier.size)?)
    }

    fn write_set_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_map_begin(&mut self, identifier: &MapIdentifier) -> Result<()> {
        let (key_type, value_type) = match (identifier.key_type, identifier.value_type) {
            (Some(k), Some(v)) => (k, v),
            _ => {
                return Err(ProtocolError::invalid_data(
                    "binary map header needs key and value types",
                ))
            }
        };
        self.write_raw(&[key_type.as_u8(), value_type.as_u8()])?;
        self.write_i32(encodable_len(identifier.size)?)
    }

    fn write_map_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_raw(&[value as u8])
    }

    fn write_byte(&mut self, value: i8) -> Result<()> {
        self.write_raw(&[value as u8])
    }

    fn write_i16(&mut self, value: i16) -> Result<()> {
        self.write_raw(&value.to_be_bytes())
    }

    fn write_i32(&mut self, value: i32) -> Result<()> {
        self.write_raw(&value.to_be_bytes())
    }

    fn write_i64(&mut self, value: i64) -> Result<()> {
        self.write_raw(&value.to_be_bytes())
    }

    fn write_double(&mut self, value: f64) -> Result<()> {
        self.write_raw(&value.to_bits().to_be_bytes())
    }

    fn write_string(&mut self, value: &str) -> Result<()> {
        self.write_len_prefixed(value.as_bytes())
    }

    fn write_binary(&mut self, value: &[u8]) -> Result<()> {
        self.write_len_prefixed(value)
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
