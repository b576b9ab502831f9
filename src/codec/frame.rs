//! Struct frames: the field loop shared by every struct binding.
//!
//! Writing emits present fields in declaration order followed by the stop
//! marker. Reading dispatches each field header through the descriptor
//! table; ids the binding does not know, and known ids arriving with a
//! different wire type, are skipped so that newer writers stay readable.

use std::fmt;

use super::descriptor::ThriftStruct;
use crate::error::{ProtocolError, Result, ResultExt};
use crate::protocol::{FieldIdentifier, InputProtocol, OutputProtocol, StructIdentifier};

/// Encode `value` as one struct frame.
pub fn write_struct<T: ThriftStruct>(value: &T, out: &mut dyn OutputProtocol) -> Result<()> {
    let descriptor = T::descriptor();
    let name = descriptor.name;

    out.write_struct_begin(&StructIdentifier::new(name))
        .with_context(|| format!("{name} write struct begin error: "))?;

    for field in descriptor.fields {
        if !(field.is_set)(value) {
            continue;
        }
        out.write_field_begin(&FieldIdentifier::new(field.name, field.field_type, field.id))
            .with_context(|| format!("{name} write field begin error {}:{}: ", field.id, field.name))?;
        (field.write)(value, out)
            .with_context(|| format!("{name}.{} ({}) field write error: ", field.name, field.id))?;
        out.write_field_end()
            .with_context(|| format!("{name} write field end error {}:{}: ", field.id, field.name))?;
    }

    out.write_field_stop().context("write field stop error: ")?;
    out.write_struct_end().context("write struct stop error: ")
}

/// Decode one struct frame into a fresh `T`.
///
/// Fields absent from the input keep their `Default` value. Fails if a
/// required field never appeared.
pub fn read_struct<T: ThriftStruct>(input: &mut dyn InputProtocol) -> Result<T> {
    let descriptor = T::descriptor();
    let name = descriptor.name;
    debug_assert!(descriptor.is_well_formed(), "{name} has a malformed field table");
    let mut value = T::default();
    let mut seen = Vec::with_capacity(descriptor.fields.len());

    input
        .read_struct_begin()
        .with_context(|| format!("{name} read error: "))?;

    loop {
        let header = input
            .read_field_begin()
            .with_context(|| format!("{name} field header read error: "))?;
        if header.is_stop() {
            break;
        }

        match descriptor.position(header.id) {
            Some(index) if descriptor.fields[index].field_type == header.field_type => {
                let field = &descriptor.fields[index];
                (field.read)(&mut value, input)
                    .with_context(|| format!("error reading field {}: ", header.id))
                    .with_context(|| {
                        format!("{name} field {} ({}) read error: ", header.id, field.name)
                    })?;
                seen.push(header.id);
            }
            Some(index) => {
                tracing::debug!(
                    r#struct = name,
                    id = header.id,
                    expected = %descriptor.fields[index].field_type,
                    found = %header.field_type,
                    "field type mismatch, skipping"
                );
                input
                    .skip(header.field_type)
                    .with_context(|| format!("{name} field {} skip error: ", header.id))?;
            }
            None => {
                tracing::trace!(
                    r#struct = name,
                    id = header.id,
                    field_type = %header.field_type,
                    "skipping unknown field"
                );
                input
                    .skip(header.field_type)
                    .with_context(|| format!("{name} field {} skip error: ", header.id))?;
            }
        }

        input
            .read_field_end()
            .with_context(|| format!("{name} field {} read field end error: ", header.id))?;
    }

    input
        .read_struct_end()
        .with_context(|| format!("{name} read struct end error: "))?;

    let missing = descriptor
        .required_fields()
        .find(|field| !seen.contains(&field.id));
    if let Some(field) = missing {
        return Err(ProtocolError::MissingRequiredField {
            id: field.id,
            name: field.name,
        }
        .context(format!("{name} validation error: ")));
    }

    Ok(value)
}

/// Render `value` as `Name({Label:value ...})`, one entry per declared field.
pub fn fmt_struct<T: ThriftStruct>(value: &T, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let descriptor = T::descriptor();
    write!(f, "{}({{", descriptor.name)?;
    for (i, field) in descriptor.fields.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{}:", field.label)?;
        (field.render)(value, f)?;
    }
    f.write_str("})")
}

/// Implement [`Thrift`](crate::codec::Thrift), [`Render`](crate::codec::Render)
/// and `Display` for a type that implements
/// [`ThriftStruct`](crate::codec::ThriftStruct).
#[macro_export]
macro_rules! impl_thrift_struct {
    ($ty:ty) => {
        impl $crate::codec::Thrift for $ty {
            const TTYPE: $crate::protocol::TType = $crate::protocol::TType::Struct;

            fn write(
                &self,
                out: &mut dyn $crate::protocol::OutputProtocol,
            ) -> $crate::Result<()> {
                $crate::codec::write_struct(self, out)
            }

            fn read(input: &mut dyn $crate::protocol::InputProtocol) -> $crate::Result<Self> {
                $crate::codec::read_struct(input)
            }
        }

        impl $crate::codec::Render for $ty {
            fn render(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                $crate::codec::fmt_struct(self, f)
            }
        }

        impl ::core::fmt::Display for $ty {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                $crate::codec::fmt_struct(self, f)
            }
        }
    };
}
