//! Type-driven skipping of values the reader does not want.
//!
//! Only the wire-type tag is needed: composite values are walked header by
//! header and every contained element is consumed, so the cursor ends
//! exactly after the skipped value. Recursion is bounded by
//! [`CodecConfig::max_depth`](crate::CodecConfig::max_depth).

use super::{InputProtocol, TType};
use crate::error::{ProtocolError, Result};

/// Consume and discard one value of `field_type` from `input`.
///
/// # Example
///
/// ```
/// use wirestruct::protocol::{skip, BinaryInputProtocol, InputProtocol, TType};
///
/// // list<i32> [1, 2] followed by a trailing byte
/// let bytes = [8u8, 0, 0, 0, 2, 0, 0, 0, 1, 0, 0, 0, 2, 0xAA];
/// let mut input = BinaryInputProtocol::new(&bytes[..]);
/// skip(&mut input, TType::List).unwrap();
/// assert_eq!(input.read_byte().unwrap(), 0xAAu8 as i8);
/// ```
pub fn skip<P: InputProtocol + ?Sized>(input: &mut P, field_type: TType) -> Result<()> {
    let limit = input.config().max_depth;
    skip_till_depth(input, field_type, limit)
}

fn skip_till_depth<P: InputProtocol + ?Sized>(
    input: &mut P,
    field_type: TType,
    depth: usize,
) -> Result<()> {
    if depth == 0 {
        return Err(ProtocolError::DepthLimit(input.config().max_depth));
    }

    match field_type {
        TType::Bool => input.read_bool().map(drop),
        TType::Byte => input.read_byte().map(drop),
        TType::I16 => input.read_i16().map(drop),
        TType::I32 => input.read_i32().map(drop),
        TType::I64 => input.read_i64().map(drop),
        TType::Double => input.read_double().map(drop),
        TType::String => input.skip_bytes(),
        TType::Struct => {
            input.read_struct_begin()?;
            loop {
                let field = input.read_field_begin()?;
                if field.is_stop() {
                    break;
                }
                skip_till_depth(input, field.field_type, depth - 1)?;
                input.read_field_end()?;
            }
            input.read_struct_end()
        }
        TType::List => {
            let list = input.read_list_begin()?;
            for _ in 0..list.size {
                skip_till_depth(input, list.element_type, depth - 1)?;
            }
            input.read_list_end()
        }
        TType::Set => {
            let set = input.read_set_begin()?;
            for _ in 0..set.size {
                skip_till_depth(input, set.element_type, depth - 1)?;
            }
            input.read_set_end()
        }
        TType::Map => {
            let map = input.read_map_begin()?;
            if map.size > 0 {
                let (key_type, value_type) = match (map.key_type, map.value_type) {
                    (Some(k), Some(v)) => (k, v),
                    _ => {
                        return Err(ProtocolError::invalid_data(
                            "non-empty map header without key/value types",
                        ))
                    }
                };
                for _ in 0..map.size {
                    skip_till_depth(input, key_type, depth - 1)?;
                    skip_till_depth(input, value_type, depth - 1)?;
                }
            }
            input.read_map_end()
        }
        TType::Stop => Err(ProtocolError::invalid_data("cannot skip a stop marker")),
    }
}
