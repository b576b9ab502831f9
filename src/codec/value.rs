//! [`Thrift`] and [`Render`] for primitives and containers.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use bytes::Bytes;

use super::{Render, Thrift};
use crate::error::{ProtocolError, Result};
use crate::protocol::{
    InputProtocol, ListIdentifier, MapIdentifier, OutputProtocol, SetIdentifier, TType,
    MAX_PREALLOC,
};

macro_rules! primitive {
    ($ty:ty, $ttype:ident, $write:ident, $read:ident) => {
        impl Thrift for $ty {
            const TTYPE: TType = TType::$ttype;

            fn write(&self, out: &mut dyn OutputProtocol) -> Result<()> {
                out.$write(*self)
            }

            fn read(input: &mut dyn InputProtocol) -> Result<Self> {
                input.$read()
            }
        }

        impl Render for $ty {
            fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(self, f)
            }
        }
    };
}

primitive!(bool, Bool, write_bool, read_bool);
primitive!(i8, Byte, write_byte, read_byte);
primitive!(i16, I16, write_i16, read_i16);
primitive!(i32, I32, write_i32, read_i32);
primitive!(i64, I64, write_i64, read_i64);
primitive!(f64, Double, write_double, read_double);

impl Thrift for String {
    const TTYPE: TType = TType::String;

    fn write(&self, out: &mut dyn OutputProtocol) -> Result<()> {
        out.write_string(self)
    }

    fn read(input: &mut dyn InputProtocol) -> Result<Self> {
        input.read_string()
    }
}

impl Render for String {
    fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self)
    }
}

/// Binary fields share the string tag; text protocols encode them as base64.
impl Thrift for Bytes {
    const TTYPE: TType = TType::String;

    fn write(&self, out: &mut dyn OutputProtocol) -> Result<()> {
        out.write_binary(self)
    }

    fn read(input: &mut dyn InputProtocol) -> Result<Self> {
        input.read_binary().map(Bytes::from)
    }
}

impl Render for Bytes {
    fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render_seq(self.iter().map(|b| b as &dyn Render), f)
    }
}

impl Render for u8 {
    fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl<T: Thrift> Thrift for Box<T> {
    const TTYPE: TType = T::TTYPE;

    fn write(&self, out: &mut dyn OutputProtocol) -> Result<()> {
        (**self).write(out)
    }

    fn read(input: &mut dyn InputProtocol) -> Result<Self> {
        T::read(input).map(Box::new)
    }
}

impl<T: Render> Render for Box<T> {
    fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (**self).render(f)
    }
}

/// Reject a non-empty container whose declared element type differs from
/// the binding's. Empty containers carry no elements to misread.
fn check_element(kind: &str, expected: TType, found: TType, size: usize) -> Result<()> {
    if size > 0 && found != expected {
        tracing::debug!(kind, %expected, %found, "container element type mismatch");
        return Err(ProtocolError::InvalidData(format!(
            "{kind} element type {found} does not match expected {expected}"
        )));
    }
    Ok(())
}

fn check_map(expected: (TType, TType), header: &MapIdentifier) -> Result<()> {
    if header.size == 0 {
        return Ok(());
    }
    match (header.key_type, header.value_type) {
        (Some(key), Some(value)) => {
            check_element("map key", expected.0, key, header.size)?;
            check_element("map value", expected.1, value, header.size)
        }
        _ => Err(ProtocolError::invalid_data(
            "non-empty map header without key/value types",
        )),
    }
}

impl<T: Thrift> Thrift for Vec<T> {
    const TTYPE: TType = TType::List;

    fn write(&self, out: &mut dyn OutputProtocol) -> Result<()> {
        out.write_list_begin(&ListIdentifier::new(T::TTYPE, self.len()))?;
        for item in self {
            item.write(out)?;
        }
        out.write_list_end()
    }

    fn read(input: &mut dyn InputProtocol) -> Result<Self> {
        let header = input.read_list_begin()?;
        check_element("list", T::TTYPE, header.element_type, header.size)?;
        let mut items = Vec::with_capacity(header.size.min(MAX_PREALLOC));
        for _ in 0..header.size {
            items.push(T::read(input)?);
        }
        input.read_list_end()?;
        Ok(items)
    }
}

impl<T: Render> Render for Vec<T> {
    fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render_seq(self.iter().map(|v| v as &dyn Render), f)
    }
}

fn write_set<'a, T: Thrift + 'a>(
    out: &mut dyn OutputProtocol,
    len: usize,
    items: impl Iterator<Item = &'a T>,
) -> Result<()> {
    out.write_set_begin(&SetIdentifier::new(T::TTYPE, len))?;
    for item in items {
        item.write(out)?;
    }
    out.write_set_end()
}

fn read_set<T: Thrift, C: Extend<T>>(
    input: &mut dyn InputProtocol,
    mut collection: C,
) -> Result<C> {
    let header = input.read_set_begin()?;
    check_element("set", T::TTYPE, header.element_type, header.size)?;
    for _ in 0..header.size {
        collection.extend(Some(T::read(input)?));
    }
    input.read_set_end()?;
    Ok(collection)
}

impl<T: Thrift + Ord> Thrift for BTreeSet<T> {
    const TTYPE: TType = TType::Set;

    fn write(&self, out: &mut dyn OutputProtocol) -> Result<()> {
        write_set(out, self.len(), self.iter())
    }

    fn read(input: &mut dyn InputProtocol) -> Result<Self> {
        read_set(input, BTreeSet::new())
    }
}

impl<T: Thrift + Eq + Hash> Thrift for HashSet<T> {
    const TTYPE: TType = TType::Set;

    fn write(&self, out: &mut dyn OutputProtocol) -> Result<()> {
        write_set(out, self.len(), self.iter())
    }

    fn read(input: &mut dyn InputProtocol) -> Result<Self> {
        read_set(input, HashSet::new())
    }
}

impl<T: Render> Render for BTreeSet<T> {
    fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render_seq(self.iter().map(|v| v as &dyn Render), f)
    }
}

impl<T: Render> Render for HashSet<T> {
    fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut items: Vec<String> = self.iter().map(|v| Rendered(v).to_string()).collect();
        items.sort();
        write!(f, "[{}]", items.join(" "))
    }
}

fn write_map<'a, K: Thrift + 'a, V: Thrift + 'a>(
    out: &mut dyn OutputProtocol,
    len: usize,
    entries: impl Iterator<Item = (&'a K, &'a V)>,
) -> Result<()> {
    out.write_map_begin(&MapIdentifier::new(K::TTYPE, V::TTYPE, len))?;
    for (key, value) in entries {
        key.write(out)?;
        value.write(out)?;
    }
    out.write_map_end()
}

fn read_map<K: Thrift, V: Thrift, C: Extend<(K, V)>>(
    input: &mut dyn InputProtocol,
    mut collection: C,
) -> Result<C> {
    let header = input.read_map_begin()?;
    check_map((K::TTYPE, V::TTYPE), &header)?;
    for _ in 0..header.size {
        let key = K::read(input)?;
        let value = V::read(input)?;
        collection.extend(Some((key, value)));
    }
    input.read_map_end()?;
    Ok(collection)
}

impl<K: Thrift + Ord, V: Thrift> Thrift for BTreeMap<K, V> {
    const TTYPE: TType = TType::Map;

    fn write(&self, out: &mut dyn OutputProtocol) -> Result<()> {
        write_map(out, self.len(), self.iter())
    }

    fn read(input: &mut dyn InputProtocol) -> Result<Self> {
        read_map(input, BTreeMap::new())
    }
}

impl<K: Thrift + Eq + Hash, V: Thrift> Thrift for HashMap<K, V> {
    const TTYPE: TType = TType::Map;

    fn write(&self, out: &mut dyn OutputProtocol) -> Result<()> {
        write_map(out, self.len(), self.iter())
    }

    fn read(input: &mut dyn InputProtocol) -> Result<Self> {
        read_map(input, HashMap::new())
    }
}

impl<K: Render, V: Render> Render for BTreeMap<K, V> {
    fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("map[")?;
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            key.render(f)?;
            f.write_str(":")?;
            value.render(f)?;
        }
        f.write_str("]")
    }
}

/// Entries are sorted by their rendered form so output is stable.
impl<K: Render, V: Render> Render for HashMap<K, V> {
    fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<String> = self
            .iter()
            .map(|(k, v)| format!("{}:{}", Rendered(k), Rendered(v)))
            .collect();
        entries.sort();
        write!(f, "map[{}]", entries.join(" "))
    }
}

fn render_seq<'a>(
    items: impl Iterator<Item = &'a dyn Render>,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        item.render(f)?;
    }
    f.write_str("]")
}

/// `Display` adapter over any [`Render`] value.
pub struct Rendered<'a, T: ?Sized>(pub &'a T);

impl<T: Render + ?Sized> fmt::Display for Rendered<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.render(f)
    }
}
