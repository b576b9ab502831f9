//! Compact protocol: varint integers and packed field headers.
//!
//! ```text
//! field header  := (delta:4 | ctype:4)                  when 0 < delta <= 15
//!                | (0:4 | ctype:4) zigzag-varint(id)     otherwise
//! bool field    := header with ctype 1 (true) or 2 (false), no value byte
//! list/set      := (size:4 | ctype:4)                   when size < 15
//!                | (0xF:4 | ctype:4) varint(size)
//! map           := 0x00                                  when empty
//!                | varint(size) (kctype:4 | vctype:4)
//! i16/i32/i64   := zigzag varint
//! double        := 8 bytes little-endian
//! string/binary := varint(len) bytes
//! ```
//!
//! Field-id deltas are relative to the previous field in the same struct, so
//! both sides keep a stack of "last field id" values across nested structs.

use std::io::{Read, Write};

use super::binary::read_exact_vec;
use super::{
    checked_container_len, checked_string_len, encodable_len, Depth, FieldIdentifier,
    InputProtocol, ListIdentifier, MapIdentifier, OutputProtocol, SetIdentifier,
    StructIdentifier, TType,
};
use crate::config::CodecConfig;
use crate::error::{ProtocolError, Result};

const CT_STOP: u8 = 0x00;
const CT_BOOL_TRUE: u8 = 0x01;
const CT_BOOL_FALSE: u8 = 0x02;
const CT_BYTE: u8 = 0x03;
const CT_I16: u8 = 0x04;
const CT_I32: u8 = 0x05;
const CT_I64: u8 = 0x06;
const CT_DOUBLE: u8 = 0x07;
const CT_BINARY: u8 = 0x08;
const CT_LIST: u8 = 0x09;
const CT_SET: u8 = 0x0A;
const CT_MAP: u8 = 0x0B;
const CT_STRUCT: u8 = 0x0C;

/// Longest varint a u64 can need.
const MAX_VARINT_LEN: usize = 10;

fn to_compact(ttype: TType) -> u8 {
    match ttype {
        TType::Stop => CT_STOP,
        TType::Bool => CT_BOOL_TRUE,
        TType::Byte => CT_BYTE,
        TType::I16 => CT_I16,
        TType::I32 => CT_I32,
        TType::I64 => CT_I64,
        TType::Double => CT_DOUBLE,
        TType::String => CT_BINARY,
        TType::List => CT_LIST,
        TType::Set => CT_SET,
        TType::Map => CT_MAP,
        TType::Struct => CT_STRUCT,
    }
}

fn from_compact(ctype: u8) -> Result<TType> {
    Ok(match ctype {
        CT_STOP => TType::Stop,
        CT_BOOL_TRUE | CT_BOOL_FALSE => TType::Bool,
        CT_BYTE => TType::Byte,
        CT_I16 => TType::I16,
        CT_I32 => TType::I32,
        CT_I64 => TType::I64,
        CT_DOUBLE => TType::Double,
        CT_BINARY => TType::String,
        CT_LIST => TType::List,
        CT_SET => TType::Set,
        CT_MAP => TType::Map,
        CT_STRUCT => TType::Struct,
        other => return Err(ProtocolError::InvalidTag(other)),
    })
}

#[inline]
fn zigzag_i32(n: i32) -> u32 {
    ((n << 1) ^ (n >> 31)) as u32
}

#[inline]
fn zigzag_i64(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

#[inline]
fn unzigzag_i32(n: u32) -> i32 {
    ((n >> 1) as i32) ^ -((n & 1) as i32)
}

#[inline]
fn unzigzag_i64(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}

/// Reads the compact protocol from any [`Read`].
#[derive(Debug)]
pub struct CompactInputProtocol<R> {
    reader: R,
    config: CodecConfig,
    depth: Depth,
    last_field_id: i16,
    field_id_stack: Vec<i16>,
    /// Bool value carried by the last field header.
    pending_bool: Option<bool>,
}

impl<R: Read> CompactInputProtocol<R> {
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
            last_field_id: 0,
            field_id_stack: Vec::new(),
            pending_bool: None,
        }
    }

    /// Give back the underlying reader, positioned after the last value read.
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn read_u8(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.reader.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    fn read_varint_u64(&mut self) -> Result<u64> {
        let mut result = 0u64;
        for i in 0..MAX_VARINT_LEN {
            let byte = self.read_u8()?;
            result |= u64::from(byte & 0x7F) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(ProtocolError::invalid_data("varint longer than 10 bytes"))
    }

    fn read_varint_u32(&mut self) -> Result<u32> {
        let value = self.read_varint_u64()?;
        u32::try_from(value)
            .map_err(|_| ProtocolError::invalid_data(format!("varint {} overflows u32", value)))
    }

    fn read_len_prefixed(&mut self) -> Result<Vec<u8>> {
        let len = checked_string_len(i64::from(self.read_varint_u32()?), &self.config)?;
        read_exact_vec(&mut self.reader, len)
    }

    fn read_collection_header(&mut self) -> Result<(TType, usize)> {
        let header = self.read_u8()?;
        let element_type = from_compact(header & 0x0F)?;
        let short_size = header >> 4;
        let size = if short_size == 0x0F {
            i64::from(self.read_varint_u32()?)
        } else {
            i64::from(short_size)
        };
        Ok((element_type, checked_container_len(size, &self.config)?))
    }
}

impl<R: Read> InputProtocol for CompactInputProtocol<R> {
    fn read_struct_begin(&mut self) -> Result<StructIdentifier> {
        self.depth.enter(self.config.max_depth)?;
        self.field_id_stack.push(self.last_field_id);
        self.last_field_id = 0;
        Ok(StructIdentifier { name: None })
    }

    fn read_struct_end(&mut self) -> Result<()> {
        self.last_field_id = self.field_id_stack.pop().unwrap_or(0);
        self.depth.leave();
        Ok(())
    }

    fn read_field_begin(&mut self) -> Result<FieldIdentifier> {
        let header = self.read_u8()?;
        let ctype = header & 0x0F;
        if ctype == CT_STOP {
            return Ok(FieldIdentifier::stop());
        }
        let field_type = from_compact(ctype)?;

        let delta = header >> 4;
        let id = if delta == 0 {
            self.read_i16()?
        } else {
            self.last_field_id
                .checked_add(i16::from(delta))
                .ok_or_else(|| ProtocolError::invalid_data("field id delta overflows i16"))?
        };

        if field_type == TType::Bool {
            self.pending_bool = Some(ctype == CT_BOOL_TRUE);
        }
        self.last_field_id = id;
        Ok(FieldIdentifier::decoded(field_type, id))
    }

    fn read_field_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_list_begin(&mut self) -> Result<ListIdentifier> {
        let (element_type, size) = self.read_collection_header()?;
        Ok(ListIdentifier::new(element_type, size))
    }

    fn read_list_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_set_begin(&mut self) -> Result<SetIdentifier> {
        let (element_type, size) = self.read_collection_header()?;
        Ok(SetIdentifier::new(element_type, size))
    }

    fn read_set_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_map_begin(&mut self) -> Result<MapIdentifier> {
        let size = checked_container_len(i64::from(self.read_varint_u32()?), &self.config)?;
        if size == 0 {
            return Ok(MapIdentifier {
                key_type: None,
                value_type: None,
                size: 0,
            });
        }
        let types = self.read_u8()?;
        let key_type = from_compact(types >> 4)?;
        let value_type = from_compact(types & 0x0F)?;
        Ok(MapIdentifier::new(key_type, value_type, size))
    }

    fn read_map_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn read_bool(&mut self) -> Result<bool> {
        match self.pending_bool.take() {
            Some(value) => Ok(value),
            None => Ok(self.read_u8()? == CT_BOOL_TRUE),
        }
    }

    fn read_byte(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    fn read_i16(&mut self) -> Result<i16> {
        let value = unzigzag_i32(self.read_varint_u32()?);
        i16::try_from(value)
            .map_err(|_| ProtocolError::invalid_data(format!("{} out of range for i16", value)))
    }

    fn read_i32(&mut self) -> Result<i32> {
        Ok(unzigzag_i32(self.read_varint_u32()?))
    }

    fn read_i64(&mut self) -> Result<i64> {
        Ok(unzigzag_i64(self.read_varint_u64()?))
    }

    fn read_double(&mut self) -> Result<f64> {
        let mut buf = [0u8; 8];
        self.reader.read_exact(&mut buf)?;
        Ok(f64::from_bits(u64::from_le_bytes(buf)))
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

/// Writes the compact protocol to any [`Write`].
///
/// # Example
///
/// ```
/// use wirestruct::protocol::{CompactOutputProtocol, FieldIdentifier, OutputProtocol, TType};
///
/// let mut out = CompactOutputProtocol::new(Vec::new());
/// out.write_field_begin(&FieldIdentifier::new("enabled", TType::Bool, 1)).unwrap();
/// out.write_bool(true).unwrap();
/// out.write_field_end().unwrap();
/// out.write_field_stop().unwrap();
///
/// // delta 1, ctype BOOL_TRUE, then stop.
/// assert_eq!(out.into_inner(), [0x11, 0x00]);
/// ```
#[derive(Debug)]
pub struct CompactOutputProtocol<W> {
    writer: W,
    last_field_id: i16,
    field_id_stack: Vec<i16>,
    /// Id of a bool field whose header waits for its value.
    pending_bool_field: Option<i16>,
}

impl<W: Write> CompactOutputProtocol<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            last_field_id: 0,
            field_id_stack: Vec::new(),
            pending_bool_field: None,
        }
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

    fn write_varint(&mut self, mut value: u64) -> Result<()> {
        let mut buf = [0u8; MAX_VARINT_LEN];
        let mut n = 0;
        loop {
            let byte = (value & 0x7F) as u8;
            value >>= 7;
            if value == 0 {
                buf[n] = byte;
                n += 1;
                break;
            }
            buf[n] = byte | 0x80;
            n += 1;
        }
        self.write_raw(&buf[..n])
    }

    fn write_field_header(&mut self, ctype: u8, id: i16) -> Result<()> {
        let delta = i32::from(id) - i32::from(self.last_field_id);
        if (1..=15).contains(&delta) {
            self.write_raw(&[((delta as u8) << 4) | ctype])?;
        } else {
            self.write_raw(&[ctype])?;
            self.write_varint(u64::from(zigzag_i32(i32::from(id))))?;
        }
        self.last_field_id = id;
        Ok(())
    }

    fn write_collection_header(&mut self, element_type: TType, size: usize) -> Result<()> {
        let size = encodable_len(size)?;
        let ctype = to_compact(element_type);
        if size < 15 {
            self.write_raw(&[((size as u8) << 4) | ctype])
        } else {
            self.write_raw(&[0xF0 | ctype])?;
            self.write_varint(size as u64)
        }
    }

    fn write_len_prefixed(&mut self, bytes: &[u8]) -> Result<()> {
        let len = encodable_len(bytes.len())?;
        self.write_varint(len as u64)?;
        self.write_raw(bytes)
    }

    /// A bool field header is held back until its value arrives.
    fn ensure_no_pending_bool(&self) -> Result<()> {
        match self.pending_bool_field {
            Some(id) => Err(ProtocolError::invalid_data(format!(
                "bool field {} ended without a value",
                id
            ))),
            None => Ok(()),
        }
    }
}

impl<W: Write> OutputProtocol for CompactOutputProtocol<W> {
    fn write_struct_begin(&mut self, _identifier: &StructIdentifier) -> Result<()> {
        self.field_id_stack.push(self.last_field_id);
        self.last_field_id = 0;
        Ok(())
    }

    fn write_struct_end(&mut self) -> Result<()> {
        self.ensure_no_pending_bool()?;
        self.last_field_id = self.field_id_stack.pop().unwrap_or(0);
        Ok(())
    }

    fn write_field_begin(&mut self, identifier: &FieldIdentifier) -> Result<()> {
        if self.pending_bool_field.is_some() {
            return Err(ProtocolError::invalid_data(
                "field begun before previous bool field got its value",
            ));
        }
        if identifier.field_type == TType::Bool {
            self.pending_bool_field = Some(identifier.id);
            Ok(())
        } else {
            self.write_field_header(to_compact(identifier.field_type), identifier.id)
        }
    }

    fn write_field_end(&mut self) -> Result<()> {
        self.ensure_no_pending_bool()
    }

    fn write_field_stop(&mut self) -> Result<()> {
        self.ensure_no_pending_bool()?;
        self.write_raw(&[CT_STOP])
    }

    fn write_list_begin(&mut self, identifier: &ListIdentifier) -> Result<()> {
        self.write_collection_header(identifier.element_type, identifier.size)
    }

    fn write_list_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_set_begin(&mut self, identifier: &SetIdentifier) -> Result<()> {
        self.write_collection_header(identifier.element_type, identifier.size)
    }

    fn write_set_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_map_begin(&mut self, identifier: &MapIdentifier) -> Result<()> {
        if identifier.size == 0 {
            return self.write_raw(&[0]);
        }
        let (key_type, value_type) = match (identifier.key_type, identifier.value_type) {
            (Some(k), Some(v)) => (k, v),
            _ => {
                return Err(ProtocolError::invalid_data(
                    "non-empty map header needs key and value types",
                ))
            }
        };
        let size = encodable_len(identifier.size)?;
        self.write_varint(size as u64)?;
        self.write_raw(&[(to_compact(key_type) << 4) | to_compact(value_type)])
    }

    fn write_map_end(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_bool(&mut self, value: bool) -> Result<()> {
        let ctype = if value { CT_BOOL_TRUE } else { CT_BOOL_FALSE };
        match self.pending_bool_field.take() {
            Some(id) => self.write_field_header(ctype, id),
            None => self.write_raw(&[ctype]),
        }
    }

    fn write_byte(&mut self, value: i8) -> Result<()> {
        self.write_raw(&[value as u8])
    }

    fn write_i16(&mut self, value: i16) -> Result<()> {
        self.write_varint(u64::from(zigzag_i32(i32::from(value))))
    }

    fn write_i32(&mut self, value: i32) -> Result<()> {
        self.write_varint(u64::from(zigzag_i32(value)))
    }

    fn write_i64(&mut self, value: i64) -> Result<()> {
        self.write_varint(zigzag_i64(value))
    }

    fn write_double(&mut self, value: f64) -> Result<()> {
        self.write_raw(&value.to_bits().to_le_bytes())
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
