//! Wire types and the header records protocols exchange with callers.
//!
//! Tag values follow the binary protocol and are shared by every
//! encoding as the logical type of a value:
//!
//! ```text
//! STOP=0  BOOL=2  BYTE=3  DOUBLE=4  I16=6  I32=8  I64=10
//! STRING=11  STRUCT=12  MAP=13  SET=14  LIST=15
//! ```

use std::fmt;

use crate::config::CodecConfig;
use crate::error::{ProtocolError, Result};

/// Wire-type tag of an encoded value.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TType {
    /// End of a struct's field sequence.
    Stop = 0,
    Bool = 2,
    /// Signed 8-bit integer.
    Byte = 3,
    Double = 4,
    I16 = 6,
    I32 = 8,
    I64 = 10,
    /// UTF-8 string or raw binary; both share the tag.
    String = 11,
    Struct = 12,
    Map = 13,
    Set = 14,
    List = 15,
}

impl TType {
    /// Numeric tag written by the binary protocol.
    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for TType {
    type Error = ProtocolError;

    fn try_from(tag: u8) -> Result<Self> {
        Ok(match tag {
            0 => TType::Stop,
            2 => TType::Bool,
            3 => TType::Byte,
            4 => TType::Double,
            6 => TType::I16,
            8 => TType::I32,
            10 => TType::I64,
            11 => TType::String,
            12 => TType::Struct,
            13 => TType::Map,
            14 => TType::Set,
            15 => TType::List,
            other => return Err(ProtocolError::InvalidTag(other)),
        })
    }
}

impl fmt::Display for TType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TType::Stop => "stop",
            TType::Bool => "bool",
            TType::Byte => "byte",
            TType::Double => "double",
            TType::I16 => "i16",
            TType::I32 => "i32",
            TType::I64 => "i64",
            TType::String => "string",
            TType::Struct => "struct",
            TType::Map => "map",
            TType::Set => "set",
            TType::List => "list",
        };
        f.write_str(name)
    }
}

/// Struct header. Only text protocols transmit the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructIdentifier {
    pub name: Option<String>,
}

impl StructIdentifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

/// Field header: name (diagnostic), wire type and id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIdentifier {
    /// Present on write; decoders never see it.
    pub name: Option<String>,
    pub field_type: TType,
    /// Zero for the stop marker.
    pub id: i16,
}

impl FieldIdentifier {
    /// Header for a field about to be written.
    pub fn new(name: impl Into<String>, field_type: TType, id: i16) -> Self {
        Self {
            name: Some(name.into()),
            field_type,
            id,
        }
    }

    /// Header as decoded from the wire.
    pub fn decoded(field_type: TType, id: i16) -> Self {
        Self {
            name: None,
            field_type,
            id,
        }
    }

    /// The stop marker.
    pub fn stop() -> Self {
        Self::decoded(TType::Stop, 0)
    }

    #[inline]
    pub fn is_stop(&self) -> bool {
        self.field_type == TType::Stop
    }
}

/// List header: element type and count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListIdentifier {
    pub element_type: TType,
    pub size: usize,
}

impl ListIdentifier {
    pub fn new(element_type: TType, size: usize) -> Self {
        Self { element_type, size }
    }
}

/// Set header: element type and count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetIdentifier {
    pub element_type: TType,
    pub size: usize,
}

impl SetIdentifier {
    pub fn new(element_type: TType, size: usize) -> Self {
        Self { element_type, size }
    }
}

/// Map header.
///
/// Key and value types are `None` only when decoding an empty map from an
/// encoding that elides them (compact).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapIdentifier {
    pub key_type: Option<TType>,
    pub value_type: Option<TType>,
    pub size: usize,
}

impl MapIdentifier {
    pub fn new(key_type: TType, value_type: TType, size: usize) -> Self {
        Self {
            key_type: Some(key_type),
            value_type: Some(value_type),
            size,
        }
    }
}

/// Upper bound on slots reserved up front for a decoded length.
///
/// A declared size within limits still says nothing about how many bytes
/// actually follow, so buffers grow past this point only as data arrives.
pub(crate) const MAX_PREALLOC: usize = 4096;

/// Validate a decoded container count against the configured limit.
pub(crate) fn checked_container_len(size: i64, config: &CodecConfig) -> Result<usize> {
    checked_len(size, config.max_container_len)
}

/// Validate a decoded string/binary length against the configured limit.
pub(crate) fn checked_string_len(size: i64, config: &CodecConfig) -> Result<usize> {
    checked_len(size, config.max_string_len)
}

fn checked_len(size: i64, limit: usize) -> Result<usize> {
    if size < 0 {
        return Err(ProtocolError::NegativeSize(size));
    }
    let size = size as u64;
    if size > limit as u64 {
        return Err(ProtocolError::SizeLimit {
            size,
            limit: limit as u64,
        });
    }
    Ok(size as usize)
}

/// Convert a length to the signed 32-bit form most encodings carry.
pub(crate) fn encodable_len(len: usize) -> Result<i32> {
    i32::try_from(len).map_err(|_| ProtocolError::SizeLimit {
        size: len as u64,
        limit: i32::MAX as u64,
    })
}
