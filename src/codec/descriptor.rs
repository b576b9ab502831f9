//! Struct descriptors: the per-shape table that maps field ids to handlers.
//!
//! A struct binding exposes one static [`StructDescriptor`] listing its
//! fields in declaration order. Each [`Field`] carries plain fn pointers for
//! reading, writing, presence and rendering, so decoding dispatches by id
//! through the table instead of through a generated `match`.
//!
//! # Example
//!
//! ```
//! use wirestruct::codec::{StructDescriptor, ThriftStruct};
//! use wirestruct::{impl_thrift_struct, thrift_field};
//!
//! #[derive(Debug, Default, Clone, PartialEq)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//!     label: Option<String>,
//! }
//!
//! impl ThriftStruct for Point {
//!     fn descriptor() -> &'static StructDescriptor<Self> {
//!         static DESCRIPTOR: StructDescriptor<Point> = StructDescriptor {
//!             name: "Point",
//!             fields: &[
//!                 thrift_field!(Point, 1: x: i32 => "x", "X"),
//!                 thrift_field!(Point, 2: y: i32 => "y", "Y"),
//!                 thrift_field!(Point, 3: label: optional String => "label", "Label"),
//!             ],
//!         };
//!         &DESCRIPTOR
//!     }
//! }
//! impl_thrift_struct!(Point);
//!
//! let descriptor = Point::descriptor();
//! assert_eq!(descriptor.field(2).unwrap().name, "y");
//! assert!(descriptor.field(9).is_none());
//! assert_eq!(Point { x: 1, y: 2, label: None }.to_string(), "Point({X:1 Y:2 Label:<nil>})");
//! ```

use std::fmt;

use crate::error::Result;
use crate::protocol::{InputProtocol, OutputProtocol, TType};

/// How a field's absence is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requiredness {
    /// Must appear on the wire; decoding fails without it.
    Required,
    /// May be absent; held as `Option<T>` and elided when `None`.
    Optional,
    /// Always written; defaults when absent on read.
    Default,
}

/// One field of a struct shape.
pub struct Field<T: 'static> {
    pub id: i16,
    /// Schema name, sent as the field name by text protocols.
    pub name: &'static str,
    /// Name used in the human-readable rendering.
    pub label: &'static str,
    pub field_type: TType,
    pub requiredness: Requiredness,
    /// Decode the value into the struct. Called only when the wire type matches.
    pub read: fn(&mut T, &mut dyn InputProtocol) -> Result<()>,
    /// Encode the value (not the field header).
    pub write: fn(&T, &mut dyn OutputProtocol) -> Result<()>,
    /// Whether the field should be written at all.
    pub is_set: fn(&T) -> bool,
    pub render: fn(&T, &mut fmt::Formatter<'_>) -> fmt::Result,
}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .field("requiredness", &self.requiredness)
            .finish()
    }
}

/// Name plus field table of a struct shape.
#[derive(Debug)]
pub struct StructDescriptor<T: 'static> {
    pub name: &'static str,
    /// Fields in declaration order, which is also the write order.
    pub fields: &'static [Field<T>],
}

impl<T> StructDescriptor<T> {
    /// Look up a field by wire id.
    pub fn field(&self, id: i16) -> Option<&Field<T>> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Index of a field in the table.
    pub fn position(&self, id: i16) -> Option<usize> {
        self.fields.iter().position(|f| f.id == id)
    }

    /// Fields that must be present on decode.
    pub fn required_fields(&self) -> impl Iterator<Item = &Field<T>> {
        self.fields
            .iter()
            .filter(|f| f.requiredness == Requiredness::Required)
    }

    /// True when no id appears twice and no field uses the stop type.
    pub fn is_well_formed(&self) -> bool {
        self.fields.iter().enumerate().all(|(i, f)| {
            f.field_type != TType::Stop && self.fields[i + 1..].iter().all(|g| g.id != f.id)
        })
    }
}

/// A struct shape with a static descriptor.
///
/// Implement this, then call [`impl_thrift_struct!`](crate::impl_thrift_struct)
/// to get the [`Thrift`](super::Thrift), [`Render`](super::Render) and
/// `Display` impls that route through the descriptor.
pub trait ThriftStruct: Default + Sized + 'static {
    fn descriptor() -> &'static StructDescriptor<Self>;
}

/// Build a [`Field`] entry for a member of a struct binding.
///
/// ```text
/// thrift_field!(Owner, 1: member: Type => "wireName", "Label")           // default
/// thrift_field!(Owner, 2: member: required Type => "wireName", "Label")  // required
/// thrift_field!(Owner, 3: member: optional Type => "wireName", "Label")  // Option<Type>
/// ```
#[macro_export]
macro_rules! thrift_field {
    ($owner:ty, $id:literal : $member:ident : optional $ty:ty => $name:literal, $label:literal) => {
        $crate::codec::Field::<$owner> {
            id: $id,
            name: $name,
            label: $label,
            field_type: <$ty as $crate::codec::Thrift>::TTYPE,
            requiredness: $crate::codec::Requiredness::Optional,
            read: |value, input| {
                value.$member = ::core::option::Option::Some(
                    <$ty as $crate::codec::Thrift>::read(input)?,
                );
                ::core::result::Result::Ok(())
            },
            write: |value, out| match &value.$member {
                ::core::option::Option::Some(v) => $crate::codec::Thrift::write(v, out),
                ::core::option::Option::None => ::core::result::Result::Ok(()),
            },
            is_set: |value| value.$member.is_some(),
            render: |value, f| match &value.$member {
                ::core::option::Option::Some(v) => $crate::codec::Render::render(v, f),
                ::core::option::Option::None => f.write_str("<nil>"),
            },
        }
    };
    ($owner:ty, $id:literal : $member:ident : required $ty:ty => $name:literal, $label:literal) => {
        $crate::thrift_field!(@plain $owner, $id, $member, $ty, $name, $label, Required)
    };
    ($owner:ty, $id:literal : $member:ident : $ty:ty => $name:literal, $label:literal) => {
        $crate::thrift_field!(@plain $owner, $id, $member, $ty, $name, $label, Default)
    };
    (@plain $owner:ty, $id:literal, $member:ident, $ty:ty, $name:literal, $label:literal, $req:ident) => {
        $crate::codec::Field::<$owner> {
            id: $id,
            name: $name,
            label: $label,
            field_type: <$ty as $crate::codec::Thrift>::TTYPE,
            requiredness: $crate::codec::Requiredness::$req,
            read: |value, input| {
                value.$member = <$ty as $crate::codec::Thrift>::read(input)?;
                ::core::result::Result::Ok(())
            },
            write: |value, out| $crate::codec::Thrift::write(&value.$member, out),
            is_set: |_| true,
            render: |value, f| $crate::codec::Render::render(&value.$member, f),
        }
    };
}
