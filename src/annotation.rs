//! Schema annotation records, bound by hand over the struct codec.
//!
//! `Hidden`, `Flags` and `IOBuf` are markers with no fields. `Name` carries
//! a replacement identifier and `Adapter` names an adapter type plus an
//! optional type hint.
//!
//! # Example
//!
//! ```
//! use wirestruct::annotation::{Adapter, Hidden};
//!
//! let adapter = Adapter::default().with_name("foo").with_type_hint("bar");
//! assert_eq!(adapter.to_string(), "Adapter({Name:foo TypeHint:bar})");
//! assert_eq!(Hidden::default().to_string(), "Hidden({})");
//! ```

use crate::codec::{StructDescriptor, ThriftStruct};
use crate::{impl_thrift_struct, thrift_field};

/// Marks a definition as hidden from generated output.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct Hidden {}

impl ThriftStruct for Hidden {
    fn descriptor() -> &'static StructDescriptor<Self> {
        static DESCRIPTOR: StructDescriptor<Hidden> = StructDescriptor {
            name: "Hidden",
            fields: &[],
        };
        &DESCRIPTOR
    }
}
impl_thrift_struct!(Hidden);

/// Marks an enum as a bit set.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct Flags {}

impl ThriftStruct for Flags {
    fn descriptor() -> &'static StructDescriptor<Self> {
        static DESCRIPTOR: StructDescriptor<Flags> = StructDescriptor {
            name: "Flags",
            fields: &[],
        };
        &DESCRIPTOR
    }
}
impl_thrift_struct!(Flags);

/// Marks a binary field as backed by a chained buffer.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct IOBuf {}

impl ThriftStruct for IOBuf {
    fn descriptor() -> &'static StructDescriptor<Self> {
        static DESCRIPTOR: StructDescriptor<IOBuf> = StructDescriptor {
            name: "IOBuf",
            fields: &[],
        };
        &DESCRIPTOR
    }
}
impl_thrift_struct!(IOBuf);

/// Overrides the generated identifier of a definition.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct Name {
    pub name: String,
}

impl Name {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }
}

impl ThriftStruct for Name {
    fn descriptor() -> &'static StructDescriptor<Self> {
        static DESCRIPTOR: StructDescriptor<Name> = StructDescriptor {
            name: "Name",
            fields: &[thrift_field!(Name, 1: name: String => "name", "Name")],
        };
        &DESCRIPTOR
    }
}
impl_thrift_struct!(Name);

/// Attaches an adapter type to a field or typedef.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct Adapter {
    /// Fully qualified adapter type.
    pub name: String,
    /// Type the adapter produces, when it differs from the declared one.
    pub type_hint: String,
}

impl Adapter {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_type_hint(mut self, type_hint: impl Into<String>) -> Self {
        self.type_hint = type_hint.into();
        self
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    pub fn set_type_hint(&mut self, type_hint: impl Into<String>) -> &mut Self {
        self.type_hint = type_hint.into();
        self
    }
}

impl ThriftStruct for Adapter {
    fn descriptor() -> &'static StructDescriptor<Self> {
        static DESCRIPTOR: StructDescriptor<Adapter> = StructDescriptor {
            name: "Adapter",
            fields: &[
                thrift_field!(Adapter, 1: name: String => "name", "Name"),
                thrift_field!(Adapter, 2: type_hint: String => "typeHint", "TypeHint"),
            ],
        };
        &DESCRIPTOR
    }
}
impl_thrift_struct!(Adapter);
