//! Typed, in-memory model of JSON Schema (draft-4) documents.
//!
//! Documents go into a [`RegistryBuilder`], which materializes one
//! [`Schema`] node per schema object and links `$ref`s by [`SchemaId`].
//! Consumers probe a node's type-specific keywords by narrowing
//! ([`Schema::as_number`], [`Schema::as_object`], ...), walk the graph with
//! [`Registry::walk`], and project nodes into the codegen IR with
//! [`lower::lower_to_ir`].
//!
//! ```
//! use json_schema_model::Registry;
//! use serde_json::json;
//! use url::Url;
//!
//! let doc = json!({ "type": ["number", "null"], "minimum": 3, "exclusiveMinimum": true });
//! let reg = Registry::from_document(Url::parse("https://example.com/s.json").unwrap(), &doc).unwrap();
//! let root = &reg[reg.roots()[0]];
//! let num = root.as_number().unwrap();
//! assert_eq!(num.exclusive_minimum(), Some(true));
//! assert!(num.maximum().is_none());
//! assert!(root.as_null().is_some());
//! assert!(root.as_array().is_none());
//! ```
pub mod dispatch;
pub mod emit;
pub mod error;
pub mod ir;
pub mod keyword;
pub mod lower;
mod path_de;
mod raw;
pub mod registry;
pub mod schema;
pub mod walk;

pub use dispatch::{Facet, JsonType, TypeSet};
pub use error::SchemaError;
pub use keyword::{Additional, Dependency, Items, Number, Reference, SchemaId};
pub use registry::{BuildOptions, Registry, RegistryBuilder};
pub use schema::{
    ArraySchema, BooleanSchema, Edge, NullSchema, NumberSchema, ObjectSchema, Schema, StringSchema,
};
pub use walk::Walk;
