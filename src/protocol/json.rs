//! JSON protocol, compatible with the Thrift JSON encoding.
//!
//! ```text
//! struct  {"1":{"str":"foo"},"2":{"i32":7}}
//! list    ["i32",3,1,2,3]            (set: same shape)
//! map     ["str","i64",2,{"a":1,"b":2}]
//! ```
//!
//! Type names: `tf i8 i16 i32 i64 dbl str rec map set lst`. Bools are `1`/`0`,
//! binary is base64, non-finite doubles are the strings `"NaN"`,
//! `"Infinity"` and `"-Infinity"`, and map keys are always JSON strings.
//!
//! Composite values are assembled as a [`serde_json::Value`] tree on write
//! and emitted when the outermost value is complete; on read each top-level
//! value is parsed whole and then walked with a stack of cursors. Object keys
//! keep insertion order, so struct fields appear in declaration order.

use std::io::{self, Read, Write};

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine as _;
use serde_json::de::IoRead;
use serde_json::{Map, Number, Value};

use super::{
    checked_container_len, checked_string_len, Depth, FieldIdentifier, InputProtocol,
    ListIdentifier, MapIdentifier, OutputProtocol, SetIdentifier, StructIdentifier, TType,
    MAX_PREALLOC,
};
use crate::config::CodecConfig;
use crate::error::{ProtocolError, Result};

fn type_name(ttype: TType) -> Result<&'static str> {
    Ok(match ttype {
        TType::Bool => "tf",
        TType::Byte => "i8",
        TType::I16 => "i16",
        TType::I32 => "i32",
        TType::I64 => "i64",
        TType::Double => "dbl",
        TType::String => "str",
        TType::Struct => "rec",
        TType::Map => "map",
        TType::Set => "set",
        TType::List => "lst",
        TType::Stop => {
            return Err(ProtocolError::invalid_data("stop has no JSON type name"))
        }
    })
}

fn type_from_name(name: &str) -> Result<TType> {
    Ok(match name {
        "tf" => TType::Bool,
        "i8" => TType::Byte,
        "i16" => TType::I16,
        "i32" => TType::I32,
        "i64" => TType::I64,
        "dbl" => TType::Double,
        "str" => TType::String,
        "rec" => TType::Struct,
        "map" => TType::Map,
        "set" => TType::Set,
        "lst" => TType::List,
        other => {
            return Err(ProtocolError::invalid_data(format!(
                "unknown JSON type name {:?}",
                other
            )))
        }
    })
}

fn type_from_value(value: Option<Value>) -> Result<TType> {
    match value {
        Some(Value::String(name)) => type_from_name(&name),
        other => Err(ProtocolError::invalid_data(format!(
            "expected type name, found {:?}",
            other
        ))),
    }
}

fn count_from_value(value: Option<Value>, config: &CodecConfig) -> Result<usize> {
    match value.as_ref().and_then(Value::as_i64) {
        Some(count) => checked_container_len(count, config),
        None => Err(ProtocolError::invalid_data(format!(
            "expected element count, found {:?}",
            value
        ))),
    }
}

/// Map keys travel as JSON strings whatever their Thrift type.
fn key_string(value: Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(ProtocolError::invalid_data(format!(
            "map key must be a string or number in JSON, found {}",
            other
        ))),
    }
}

fn value_as_i64(value: Value) -> Result<i64> {
    let parsed = match &value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    };
    parsed.ok_or_else(|| ProtocolError::invalid_data(format!("expected integer, found {}", value)))
}

fn check_count(kind: &str, declared: usize, actual: usize) -> Result<()> {
    if declared != actual {
        tracing::warn!(kind, declared, actual, "JSON container count does not match its elements");
        return Err(ProtocolError::invalid_data(format!(
            "{} declares {} elements but holds {}",
            kind, declared, actual
        )));
    }
    Ok(())
}

enum ReadFrame {
    Struct {
        fields: serde_json::map::IntoIter,
        pending: Option<Value>,
    },
    Seq {
        items: std::vec::IntoIter<Value>,
    },
    Map {
        entries: serde_json::map::IntoIter,
        pending_value: Option<Value>,
    },
}

/// Reads the Thrift JSON encoding from any [`Read`].
///
/// Each top-level value is parsed into memory before it is walked, so
/// [`CodecConfig`] string and container limits are enforced after parsing.
/// Cap the size of untrusted input before handing it to this reader.
///
/// # Example
///
/// ```
/// use wirestruct::protocol::{InputProtocol, JsonInputProtocol, TType};
///
/// let json = br#"{"1":{"str":"foo"}}"#;
/// let mut input = JsonInputProtocol::new(&json[..]);
///
/// input.read_struct_begin().unwrap();
/// let field = input.read_field_begin().unwrap();
/// assert_eq!((field.field_type, field.id), (TType::String, 1));
/// assert_eq!(input.read_string().unwrap(), "foo");
/// input.read_field_end().unwrap();
/// assert!(input.read_field_begin().unwrap().is_stop());
/// input.read_struct_end().unwrap();
/// ```
pub struct JsonInputProtocol<R: Read> {
    values: serde_json::StreamDeserializer<'static, IoRead<R>, Value>,
    config: CodecConfig,
    depth: Depth,
    stack: Vec<ReadFrame>,
}

impl<R: Read> JsonInputProtocol<R> {
    /// Create a reader with default limits.
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, CodecConfig::default())
    }

    /// Create a reader with custom limits.
    pub fn with_config(reader: R, config: CodecConfig) -> Self {
        Self {
            values: serde_json::Deserializer::from_reader(reader).into_iter(),
            config,
            depth: Depth::default(),
            stack: Vec::new(),
        }
    }

    /// Byte offset just past the last top-level value parsed.
    pub fn byte_offset(&self) -> usize {
        self.values.byte_offset()
    }

    fn next_value(&mut self) -> Result<Value> {
        match self.stack.last_mut() {
            None => match self.values.next() {
                Some(value) => Ok(value?),
                None => Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "no further JSON value in stream",
                )
                .into()),
            },
            Some(ReadFrame::Struct { pending, .. }) => pending
                .take()
                .ok_or_else(|| ProtocolError::invalid_data("value read outside a field")),
            Some(ReadFrame::Seq { items }) => items
                .next()
                .ok_or_else(|| ProtocolError::invalid_data("read past the end of a container")),
            Some(ReadFrame::Map {
                entries,
                pending_value,
            }) => {
                if let Some(value) = pending_value.take() {
                    return Ok(value);
                }
                let (key, value) = entries
                    .next()
                    .ok_or_else(|| ProtocolError::invalid_data("read past the end of a map"))?;
                *pending_value = Some(value);
                Ok(Value::String(key))
            }
        }
    }

    fn read_seq_begin(&mut self, kind: &str) -> Result<(TType, usize)> {
        let mut items = match self.next_value()? {
            Value::Array(items) => items.into_iter(),
            other => {
                return Err(ProtocolError::invalid_data(format!(
                    "expected JSON array for {}, found {}",
                    kind, other
                )))
            }
        };
        let element_type = type_from_value(items.next())?;
        let size = count_from_value(items.next(), &self.config)?;
        check_count(kind, size, items.len())?;
        self.stack.push(ReadFrame::Seq { items });
        Ok((element_type, size))
    }

    fn pop_seq(&mut self) -> Result<()> {
        match self.stack.pop() {
            Some(ReadFrame::Seq { .. }) => Ok(()),
            _ => Err(ProtocolError::invalid_data("container end without begin")),
        }
    }

    fn read_text(&mut self) -> Result<String> {
        match self.next_value()? {
            Value::String(s) => {
                checked_string_len(s.len() as i64, &self.config)?;
                Ok(s)
            }
            other => Err(ProtocolError::invalid_data(format!(
                "expected JSON string, found {}",
                other
            ))),
        }
    }
}

impl<R: Read> InputProtocol for JsonInputProtocol<R> {
    fn read_struct_begin(&mut self) -> Result<StructIdentifier> {
        self.depth.enter(self.config.max_depth)?;
        match self.next_value()? {
            Value::Object(fields) => {
                self.stack.push(ReadFrame::Struct {
                    fields: fields.into_iter(),
                    pending: None,
                });
                Ok(StructIdentifier { name: None })
            }
            other => Err(ProtocolError::invalid_data(format!(
                "expected JSON object for struct, found {}",
                other
            ))),
        }
    }

    fn read_struct_end(&mut self) -> Result<()> {
        match self.stack.pop() {
            Some(ReadFrame::Struct { .. }) => {
                self.depth.leave();
                Ok(())
            }
            _ => Err(ProtocolError::invalid_data("struct end without begin")),
        }
    }

    fn read_field_begin(&mut self) -> Result<FieldIdentifier> {
        let (fields, pending) = match self.stack.last_mut() {
            Some(ReadFrame::Struct { fields, pending }) => (fields, pending),
            _ => return Err(ProtocolError::invalid_data("field read outside a struct")),
        };
        let (key, value) = match fields.next() {
            Some(entry) => entry,
            None => return Ok(FieldIdentifier::stop()),
        };

        let id: i16 = key
            .parse()
            .map_err(|_| ProtocolError::invalid_data(format!("invalid field id {:?}", key)))?;
        let mut typed = match value {
            Value::Object(typed) if typed.len() == 1 => typed.into_iter(),
            other => {
                return Err(ProtocolError::invalid_data(format!(
                    "field {} must be a single-entry object, found {}",
                    id, other
                )))
            }
        };
        let (name, inner) = typed
            .next()
            .ok_or_else(|| ProtocolError::invalid_data("empty typed value"))?;
        let field_type = type_from_name(&name)?;
        *pending = Some(inner);
        Ok(FieldIdentifier::decoded(field_type, id))
    }

    fn read_field_end(&mut self) -> Result<()> {
        match self.stack.last_mut() {
            Some(ReadFrame::Struct { pending, .. }) if pending.is_some() => {
                Err(ProtocolError::invalid_data("field value was not consumed"))
            }
            _ => Ok(()),
        }
    }

    fn read_list_begin(&mut self) -> Result<ListIdentifier> {
        let (element_type, size) = self.read_seq_begin("list")?;
        Ok(ListIdentifier::new(element_type, size))
    }

    fn read_list_end(&mut self) -> Result<()> {
        self.pop_seq()
    }

    fn read_set_begin(&mut self) -> Result<SetIdentifier> {
        let (element_type, size) = self.read_seq_begin("set")?;
        Ok(SetIdentifier::new(element_type, size))
    }

    fn read_set_end(&mut self) -> Result<()> {
        self.pop_seq()
    }

    fn read_map_begin(&mut self) -> Result<MapIdentifier> {
        let mut parts = match self.next_value()? {
            Value::Array(parts) => parts.into_iter(),
            other => {
                return Err(ProtocolError::invalid_data(format!(
                    "expected JSON array for map, found {}",
                    other
                )))
            }
        };
        let key_type = type_from_value(parts.next())?;
        let value_type = type_from_value(parts.next())?;
        let size = count_from_value(parts.next(), &self.config)?;
        let entries = match parts.next() {
            Some(Value::Object(entries)) => entries,
            other => {
                return Err(ProtocolError::invalid_data(format!(
                    "expected JSON object of map entries, found {:?}",
                    other
                )))
            }
        };
        check_count("map", size, entries.len())?;
        self.stack.push(ReadFrame::Map {
            entries: entries.into_iter(),
            pending_value: None,
        });
        Ok(MapIdentifier::new(key_type, value_type, size))
    }

    fn read_map_end(&mut self) -> Result<()> {
        match self.stack.pop() {
            Some(ReadFrame::Map { .. }) => Ok(()),
            _ => Err(ProtocolError::invalid_data("map end without begin")),
        }
    }

    fn read_bool(&mut self) -> Result<bool> {
        Ok(value_as_i64(self.next_value()?)? != 0)
    }

    fn read_byte(&mut self) -> Result<i8> {
        let value = value_as_i64(self.next_value()?)?;
        i8::try_from(value)
            .map_err(|_| ProtocolError::invalid_data(format!("{} out of range for i8", value)))
    }

    fn read_i16(&mut self) -> Result<i16> {
        let value = value_as_i64(self.next_value()?)?;
        i16::try_from(value)
            .map_err(|_| ProtocolError::invalid_data(format!("{} out of range for i16", value)))
    }

    fn read_i32(&mut self) -> Result<i32> {
        let value = value_as_i64(self.next_value()?)?;
        i32::try_from(value)
            .map_err(|_| ProtocolError::invalid_data(format!("{} out of range for i32", value)))
    }

    fn read_i64(&mut self) -> Result<i64> {
        value_as_i64(self.next_value()?)
    }

    fn read_double(&mut self) -> Result<f64> {
        let value = self.next_value()?;
        let parsed = match &value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => match s.as_str() {
                "NaN" => Some(f64::NAN),
                "Infinity" => Some(f64::INFINITY),
                "-Infinity" => Some(f64::NEG_INFINITY),
                other => other.parse().ok(),
            },
            _ => None,
        };
        parsed.ok_or_else(|| ProtocolError::invalid_data(format!("expected double, found {}", value)))
    }

    fn read_string(&mut self) -> Result<String> {
        self.read_text()
    }

    fn read_binary(&mut self) -> Result<Vec<u8>> {
        let text = self.read_text()?;
        STANDARD_NO_PAD
            .decode(text.trim_end_matches('='))
            .map_err(|e| ProtocolError::invalid_data(format!("invalid base64: {}", e)))
    }

    fn skip_bytes(&mut self) -> Result<()> {
        self.read_text().map(drop)
    }

    fn config(&self) -> &CodecConfig {
        &self.config
    }
}

enum WriteFrame {
    Struct {
        fields: Map<String, Value>,
        pending: Option<(i16, TType)>,
    },
    Seq {
        element_type: &'static str,
        declared: usize,
        items: Vec<Value>,
    },
    Map {
        key_type: &'static str,
        value_type: &'static str,
        declared: usize,
        entries: Map<String, Value>,
        pending_key: Option<String>,
    },
}

/// Writes the Thrift JSON encoding to any [`Write`].
///
/// # Example
///
/// ```
/// use wirestruct::protocol::{
///     FieldIdentifier, JsonOutputProtocol, ListIdentifier, OutputProtocol, StructIdentifier,
///     TType,
/// };
///
/// let mut out = JsonOutputProtocol::new(Vec::new());
/// out.write_struct_begin(&StructIdentifier::new("Numbers")).unwrap();
/// out.write_field_begin(&FieldIdentifier::new("values", TType::List, 1)).unwrap();
/// out.write_list_begin(&ListIdentifier::new(TType::I32, 2)).unwrap();
/// out.write_i32(4).unwrap();
/// out.write_i32(5).unwrap();
/// out.write_list_end().unwrap();
/// out.write_field_end().unwrap();
/// out.write_field_stop().unwrap();
/// out.write_struct_end().unwrap();
///
/// assert_eq!(out.into_inner(), br#"{"1":{"lst":["i32",2,4,5]}}"#);
/// ```
pub struct JsonOutputProtocol<W> {
    writer: W,
    stack: Vec<WriteFrame>,
}

impl<W: Write> JsonOutputProtocol<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            stack: Vec::new(),
        }
    }

    /// Give back the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Attach a finished value to the enclosing frame, or write it out.
    fn emit(&mut self, value: Value) -> Result<()> {
        match self.stack.last_mut() {
            None => {
                serde_json::to_writer(&mut self.writer, &value)?;
                Ok(())
            }
            Some(WriteFrame::Struct { fields, pending }) => {
                let (id, field_type) = pending
                    .take()
                    .ok_or_else(|| ProtocolError::invalid_data("value written outside a field"))?;
                let mut typed = Map::new();
                typed.insert(type_name(field_type)?.to_string(), value);
                fields.insert(id.to_string(), Value::Object(typed));
                Ok(())
            }
            Some(WriteFrame::Seq { items, .. }) => {
                items.push(value);
                Ok(())
            }
            Some(WriteFrame::Map {
                entries,
                pending_key,
                ..
            }) => {
                match pending_key.take() {
                    None => *pending_key = Some(key_string(value)?),
                    Some(key) => {
                        entries.insert(key, value);
                    }
                }
                Ok(())
            }
        }
    }

    fn ensure_no_pending_field(&self) -> Result<()> {
        match self.stack.last() {
            Some(WriteFrame::Struct {
                pending: Some((id, _)),
                ..
            }) => Err(ProtocolError::invalid_data(format!(
                "field {} ended without a value",
                id
            ))),
            _ => Ok(()),
        }
    }

    fn push_seq(&mut self, element_type: TType, declared: usize) -> Result<()> {
        self.stack.push(WriteFrame::Seq {
            element_type: type_name(element_type)?,
            declared,
            items: Vec::with_capacity(declared.min(MAX_PREALLOC)),
        });
        Ok(())
    }

    fn finish_seq(&mut self, kind: &str) -> Result<()> {
        match self.stack.pop() {
            Some(WriteFrame::Seq {
                element_type,
                declared,
                items,
            }) => {
                check_count(kind, declared, items.len())?;
                let mut array = Vec::with_capacity(items.len() + 2);
                array.push(Value::from(element_type));
                array.push(Value::from(declared));
                array.extend(items);
                self.emit(Value::Array(array))
            }
            _ => Err(ProtocolError::invalid_data(format!("{} end without begin", kind))),
        }
    }
}

impl<W: Write> OutputProtocol for JsonOutputProtocol<W> {
    fn write_struct_begin(&mut self, _identifier: &StructIdentifier) -> Result<()> {
        self.stack.push(WriteFrame::Struct {
            fields: Map::new(),
            pending: None,
        });
        Ok(())
    }

    fn write_struct_end(&mut self) -> Result<()> {
        self.ensure_no_pending_field()?;
        match self.stack.pop() {
            Some(WriteFrame::Struct { fields, .. }) => self.emit(Value::Object(fields)),
            _ => Err(ProtocolError::invalid_data("struct end without begin")),
        }
    }

    fn write_field_begin(&mut self, identifier: &FieldIdentifier) -> Result<()> {
        match self.stack.last_mut() {
            Some(WriteFrame::Struct { pending, .. }) if pending.is_none() => {
                *pending = Some((identifier.id, identifier.field_type));
                Ok(())
            }
            Some(WriteFrame::Struct { .. }) => Err(ProtocolError::invalid_data(
                "field begun before previous field got its value",
            )),
            _ => Err(ProtocolError::invalid_data("field written outside a struct")),
        }
    }

    fn write_field_end(&mut self) -> Result<()> {
        self.ensure_no_pending_field()
    }

    fn write_field_stop(&mut self) -> Result<()> {
        self.ensure_no_pending_field()
    }

    fn write_list_begin(&mut self, identifier: &ListIdentifier) -> Result<()> {
        self.push_seq(identifier.element_type, identifier.size)
    }

    fn write_list_end(&mut self) -> Result<()> {
        self.finish_seq("list")
    }

    fn write_set_begin(&mut self, identifier: &SetIdentifier) -> Result<()> {
        self.push_seq(identifier.element_type, identifier.size)
    }

    fn write_set_end(&mut self) -> Result<()> {
        self.finish_seq("set")
    }

    fn write_map_begin(&mut self, identifier: &MapIdentifier) -> Result<()> {
        let (key_type, value_type) = match (identifier.key_type, identifier.value_type) {
            (Some(k), Some(v)) => (type_name(k)?, type_name(v)?),
            _ => {
                return Err(ProtocolError::invalid_data(
                    "JSON map header needs key and value types",
                ))
            }
        };
        self.stack.push(WriteFrame::Map {
            key_type,
            value_type,
            declared: identifier.size,
            entries: Map::new(),
            pending_key: None,
        });
        Ok(())
    }

    fn write_map_end(&mut self) -> Result<()> {
        match self.stack.pop() {
            Some(WriteFrame::Map {
                key_type,
                value_type,
                declared,
                entries,
                pending_key,
            }) => {
                if pending_key.is_some() {
                    return Err(ProtocolError::invalid_data("map key written without a value"));
                }
                check_count("map", declared, entries.len())?;
                self.emit(Value::Array(vec![
                    Value::from(key_type),
                    Value::from(value_type),
                    Value::from(declared),
                    Value::Object(entries),
                ]))
            }
            _ => Err(ProtocolError::invalid_data("map end without begin")),
        }
    }

    fn write_bool(&mut self, value: bool) -> Result<()> {
        self.emit(Value::from(u8::from(value)))
    }

    fn write_byte(&mut self, value: i8) -> Result<()> {
        self.emit(Value::from(value))
    }

    fn write_i16(&mut self, value: i16) -> Result<()> {
        self.emit(Value::from(value))
    }

    fn write_i32(&mut self, value: i32) -> Result<()> {
        self.emit(Value::from(value))
    }

    fn write_i64(&mut self, value: i64) -> Result<()> {
        self.emit(Value::from(value))
    }

    fn write_double(&mut self, value: f64) -> Result<()> {
        let encoded = match Number::from_f64(value) {
            Some(n) => Value::Number(n),
            None if value.is_nan() => Value::from("NaN"),
            None if value > 0.0 => Value::from("Infinity"),
            None => Value::from("-Infinity"),
        };
        self.emit(encoded)
    }

    fn write_string(&mut self, value: &str) -> Result<()> {
        self.emit(Value::from(value))
    }

    fn write_binary(&mut self, value: &[u8]) -> Result<()> {
        self.emit(Value::from(STANDARD_NO_PAD.encode(value)))
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_with<F>(f: F) -> String
    where
        F: FnOnce(&mut JsonOutputProtocol<Vec<u8>>),
    {
        let mut out = JsonOutputProtocol::new(Vec::new());
        f(&mut out);
        String::from_utf8(out.into_inner()).unwrap()
    }

    fn input(json: &str) -> JsonInputProtocol<&[u8]> {
        JsonInputProtocol::new(json.as_bytes())
    }

    #[test]
    fn test_struct_layout() {
        let json = write_with(|out| {
            out.write_struct_begin(&StructIdentifier::new("Adapter")).unwrap();
            out.write_field_begin(&FieldIdentifier::new("name", TType::String, 1))
                .unwrap();
            out.write_string("foo").unwrap();
            out.write_field_end().unwrap();
            out.write_field_begin(&FieldIdentifier::new("typeHint", TType::String, 2))
                .unwrap();
            out.write_string("bar").unwrap();
            out.write_field_end().unwrap();
            out.write_field_stop().unwrap();
            out.write_struct_end().unwrap();
        });
        assert_eq!(json, r#"{"1":{"str":"foo"},"2":{"str":"bar"}}"#);
    }

    #[test]
    fn test_empty_struct() {
        let json = write_with(|out| {
            out.write_struct_begin(&StructIdentifier::new("Hidden")).unwrap();
            out.write_field_stop().unwrap();
            out.write_struct_end().unwrap();
        });
        assert_eq!(json, "{}");
    }

    #[test]
    fn test_map_and_special_values() {
        let json = write_with(|out| {
            out.write_map_begin(&MapIdentifier::new(TType::I32, TType::Double, 2))
                .unwrap();
            out.write_i32(1).unwrap();
            out.write_double(f64::NAN).unwrap();
            out.write_i32(2).unwrap();
            out.write_double(f64::NEG_INFINITY).unwrap();
            out.write_map_end().unwrap();
        });
        assert_eq!(json, r#"["i32","dbl",2,{"1":"NaN","2":"-Infinity"}]"#);

        let mut inp = input(&json);
        let header = inp.read_map_begin().unwrap();
        assert_eq!(header, MapIdentifier::new(TType::I32, TType::Double, 2));
        assert_eq!(inp.read_i32().unwrap(), 1);
        assert!(inp.read_double().unwrap().is_nan());
        assert_eq!(inp.read_i32().unwrap(), 2);
        assert_eq!(inp.read_double().unwrap(), f64::NEG_INFINITY);
        inp.read_map_end().unwrap();
    }

    #[test]
    fn test_double_exact() {
        for value in [-397288987395.69037, 0.1 + 0.2, f64::MIN_POSITIVE, 5e-324, f64::MAX] {
            let json = write_with(|out| out.write_double(value).unwrap());
            let read = input(&json).read_double().unwrap();
            assert_eq!(read.to_bits(), value.to_bits(), "{json}");
        }
    }

    #[test]
    fn test_string_limit_checked_after_parse() {
        let config = CodecConfig::new().max_string_len(4);
        let mut inp = JsonInputProtocol::with_config(&br#""abcdef" "ab""#[..], config);
        assert!(matches!(
            inp.read_string(),
            Err(ProtocolError::SizeLimit { size: 6, limit: 4 })
        ));
        // the oversized value was consumed whole; the stream stays aligned
        assert_eq!(inp.read_string().unwrap(), "ab");
    }

    #[test]
    fn test_stop_with_unfinished_field() {
        let mut out = JsonOutputProtocol::new(Vec::new());
        out.write_struct_begin(&StructIdentifier::new("S")).unwrap();
        out.write_field_begin(&FieldIdentifier::new("a", TType::I32, 1))
            .unwrap();
        assert!(out.write_field_stop().is_err());
        assert!(out.write_struct_end().is_err());
    }

    #[test]
    fn test_fields_keep_write_order() {
        let json = write_with(|out| {
            out.write_struct_begin(&StructIdentifier::new("S")).unwrap();
            for id in [2, 10, 1] {
                out.write_field_begin(&FieldIdentifier::new("f", TType::I16, id))
                    .unwrap();
                out.write_i16(id).unwrap();
                out.write_field_end().unwrap();
            }
            out.write_field_stop().unwrap();
            out.write_struct_end().unwrap();
        });
        assert_eq!(json, r#"{"2":{"i16":2},"10":{"i16":10},"1":{"i16":1}}"#);
    }

    #[test]
    fn test_bool_and_binary_encoding() {
        let json = write_with(|out| {
            out.write_list_begin(&ListIdentifier::new(TType::Bool, 2)).unwrap();
            out.write_bool(true).unwrap();
            out.write_bool(false).unwrap();
            out.write_list_end().unwrap();
        });
        assert_eq!(json, r#"["tf",2,1,0]"#);

        let json = write_with(|out| out.write_binary(&[0x00, 0xFF]).unwrap());
        assert_eq!(json, r#""AP8""#);

        // Padded base64 from other writers is accepted.
        assert_eq!(input(r#""AP8=""#).read_binary().unwrap(), vec![0x00, 0xFF]);
    }

    #[test]
    fn test_count_mismatch_rejected() {
        let mut inp = input(r#"["i32",3,1,2]"#);
        assert!(matches!(
            inp.read_list_begin(),
            Err(ProtocolError::InvalidData(_))
        ));

        let mut out = JsonOutputProtocol::new(Vec::new());
        out.write_list_begin(&ListIdentifier::new(TType::I32, 2)).unwrap();
        out.write_i32(1).unwrap();
        assert!(out.write_list_end().is_err());
    }

    #[test]
    fn test_negative_count_rejected() {
        let mut inp = input(r#"["i32",-1]"#);
        assert!(matches!(
            inp.read_list_begin(),
            Err(ProtocolError::NegativeSize(-1))
        ));
    }

    #[test]
    fn test_unknown_type_name() {
        let mut inp = input(r#"{"1":{"uuid":"x"}}"#);
        inp.read_struct_begin().unwrap();
        assert!(inp.read_field_begin().is_err());
    }

    #[test]
    fn test_truncated_document() {
        let mut inp = input(r#"{"1":{"str":"fo"#);
        let err = inp.read_struct_begin().unwrap_err();
        assert!(err.is_unexpected_eof());
    }

    #[test]
    fn test_empty_stream_is_eof() {
        let err = input("").read_struct_begin().unwrap_err();
        assert!(err.is_unexpected_eof());
    }

    #[test]
    fn test_skip_string_does_not_decode_base64() {
        let mut inp = input(r#"{"9":{"str":"not base64!"}}"#);
        inp.read_struct_begin().unwrap();
        let field = inp.read_field_begin().unwrap();
        inp.skip(field.field_type).unwrap();
        inp.read_field_end().unwrap();
        assert!(inp.read_field_begin().unwrap().is_stop());
    }

    #[test]
    fn test_out_of_range_integer() {
        assert!(input("300").read_byte().is_err());
        assert_eq!(input("-128").read_byte().unwrap(), -128);
    }
}
