//! Codec module - typed values on top of the protocol traits.
//!
//! - [`Thrift`] binds a Rust type to a wire type: primitives, `String`,
//!   [`bytes::Bytes`], `Vec`, sets, maps and struct bindings
//! - [`StructDescriptor`] / [`Field`] describe a struct shape as a table of
//!   field handlers keyed by id
//! - [`write_struct`] / [`read_struct`] run the field loop for any shape
//! - [`Render`] produces the `Name({Label:value ...})` text form
//!
//! Struct bindings are declared with [`thrift_field!`](crate::thrift_field)
//! and [`impl_thrift_struct!`](crate::impl_thrift_struct).
//!
//! # Example
//!
//! ```
//! use wirestruct::codec::Thrift;
//! use wirestruct::protocol::{BinaryInputProtocol, BinaryOutputProtocol};
//!
//! let mut out = BinaryOutputProtocol::new(Vec::new());
//! vec![1i16, 2].write(&mut out).unwrap();
//! let bytes = out.into_inner();
//! assert_eq!(bytes, [6, 0, 0, 0, 2, 0, 1, 0, 2]);
//!
//! let decoded = Vec::<i16>::read(&mut BinaryInputProtocol::new(&bytes[..])).unwrap();
//! assert_eq!(decoded, vec![1, 2]);
//! ```

mod descriptor;
mod frame;
mod value;

use std::fmt;

pub use descriptor::{Field, Requiredness, StructDescriptor, ThriftStruct};
pub use frame::{fmt_struct, read_struct, write_struct};
pub use value::Rendered;

use crate::error::Result;
use crate::protocol::{InputProtocol, OutputProtocol, TType};

/// A Rust type with a fixed Thrift wire type.
pub trait Thrift: Sized {
    /// Tag written in field and container headers.
    const TTYPE: TType;

    fn write(&self, out: &mut dyn OutputProtocol) -> Result<()>;

    fn read(input: &mut dyn InputProtocol) -> Result<Self>;
}

/// Human-readable rendering used by struct `Display` impls.
///
/// Lists and sets render as `[a b]`, maps as `map[k:v]`, structs as
/// `Name({Label:value ...})`.
pub trait Render {
    fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}
