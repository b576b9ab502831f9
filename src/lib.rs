//! # wirestruct
//!
//! Thrift-style struct serialization: tagged fields, typed containers and
//! unknown-field skipping over binary, compact and JSON encodings.
//!
//! ## Layers
//!
//! - **Protocols** ([`protocol`]): `InputProtocol`/`OutputProtocol` and their
//!   binary, compact and JSON implementations
//! - **Codec** ([`codec`]): the `Thrift` value trait, struct descriptors and
//!   the shared field loop
//! - **Serializer** ([`Serializer`]): whole-message encode/decode to `Bytes`
//!
//! ## Example
//!
//! ```
//! use wirestruct::annotation::Adapter;
//!
//! let adapter = Adapter::default().with_name("foo").with_type_hint("bar");
//! let bytes = wirestruct::serialize(&adapter).unwrap();
//! let decoded: Adapter = wirestruct::deserialize(&bytes).unwrap();
//!
//! assert_eq!(decoded, adapter);
//! assert_eq!(decoded.to_string(), "Adapter({Name:foo TypeHint:bar})");
//! ```

pub mod annotation;
pub mod codec;
pub mod config;
pub mod error;
pub mod protocol;

mod serializer;

pub use codec::{Render, StructDescriptor, Thrift, ThriftStruct};
pub use config::{CodecConfig, ProtocolKind};
pub use error::{ProtocolError, Result, ResultExt};
pub use serializer::{deserialize, serialize, Serializer};
