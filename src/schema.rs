//! Schema nodes.
//!
//! A [`Schema`] is one JSON Schema object literal: the keywords every type
//! shares, plus one [`Facet`] per applicable JSON type holding the
//! type-specific keywords. Nodes live in a [`crate::Registry`] arena and
//! refer to each other by [`SchemaId`]; owned children (combinators,
//! definitions, properties, items) form a tree, while `$ref` is a separate
//! non-owning link that may close cycles.
//!
//! Nodes are immutable once the registry is built. Every keyword accessor
//! returns `None` when the keyword was not declared.
pub mod arr;
pub mod num;
pub mod obj;
pub mod str;

use std::fmt;

use indexmap::IndexMap;
use serde_json::Value;
use url::Url;

pub use arr::ArraySchema;
pub use num::NumberSchema;
pub use obj::ObjectSchema;
pub use str::StringSchema;

use crate::dispatch::{Facet, JsonType, Materializer, TypeSet};
use crate::error::{Result, SchemaError};
use crate::keyword::{Additional, Reference, SchemaId};

/// The `boolean` specialization. Draft-4 defines no boolean keywords.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BooleanSchema;

/// The `null` specialization. Draft-4 defines no null keywords.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NullSchema;

#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub(crate) id: SchemaId,
    pub(crate) location: Url,
    pub(crate) scope_id: Option<String>,
    pub(crate) schema_uri: Option<String>,
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) default_value: Option<Value>,
    pub(crate) enum_values: Option<Vec<Value>>,
    pub(crate) format: Option<String>,
    pub(crate) all_of: Option<Vec<SchemaId>>,
    pub(crate) any_of: Option<Vec<SchemaId>>,
    pub(crate) one_of: Option<Vec<SchemaId>>,
    pub(crate) not: Option<SchemaId>,
    pub(crate) definitions: Option<IndexMap<String, SchemaId>>,
    pub(crate) declared_type: Option<TypeSet>,
    pub(crate) reference: Option<Reference>,
    pub(crate) facets: Vec<Facet>,
}

impl Schema {
    pub(crate) fn empty(id: SchemaId, location: Url) -> Self {
        Self {
            id,
            location,
            scope_id: None,
            schema_uri: None,
            title: None,
            description: None,
            default_value: None,
            enum_values: None,
            format: None,
            all_of: None,
            any_of: None,
            one_of: None,
            not: None,
            definitions: None,
            declared_type: None,
            reference: None,
            facets: Vec::new(),
        }
    }

    pub fn id(&self) -> SchemaId {
        self.id
    }

    /// Canonical location: the document URI with the node's JSON Pointer as
    /// fragment.
    pub fn location(&self) -> &Url {
        &self.location
    }

    /// The JSON Pointer of this node inside its document.
    pub fn pointer(&self) -> &str {
        self.location.fragment().unwrap_or("")
    }

    /// The `id` keyword: a URI that rebases the resolution scope of this
    /// node and everything below it.
    pub fn scope_id(&self) -> Option<&str> {
        self.scope_id.as_deref()
    }

    /// The `$schema` keyword, naming the meta-schema.
    pub fn schema_uri(&self) -> Option<&str> {
        self.schema_uri.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The `default` keyword. `Some(Value::Null)` is a declared null
    /// default, distinct from no default.
    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    /// An instance is valid iff it equals one of these values. Order is kept
    /// as written.
    pub fn enum_values(&self) -> Option<&[Value]> {
        self.enum_values.as_deref()
    }

    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    /// Valid iff the instance is valid against every child.
    pub fn all_of(&self) -> Option<&[SchemaId]> {
        self.all_of.as_deref()
    }

    /// Valid iff the instance is valid against at least one child.
    pub fn any_of(&self) -> Option<&[SchemaId]> {
        self.any_of.as_deref()
    }

    /// Valid iff the instance is valid against exactly one child.
    pub fn one_of(&self) -> Option<&[SchemaId]> {
        self.one_of.as_deref()
    }

    /// Valid iff the instance is not valid against the child.
    pub fn not(&self) -> Option<SchemaId> {
        self.not
    }

    pub fn definitions(&self) -> Option<&IndexMap<String, SchemaId>> {
        self.definitions.as_ref()
    }

    /// The `type` keyword as declared. `None` means the node is untyped and
    /// only carries the facets its keywords imply.
    pub fn declared_type(&self) -> Option<&TypeSet> {
        self.declared_type.as_ref()
    }

    pub fn reference(&self) -> Option<&Reference> {
        self.reference.as_ref()
    }

    /// Untyped and without any type-specific keyword: matches any instance
    /// as far as type is concerned.
    pub fn is_any(&self) -> bool {
        self.declared_type.is_none() && self.facets.is_empty()
    }

    pub fn facets(&self) -> &[Facet] {
        &self.facets
    }

    /// The specialized view for `ty`, or `None` if this node is not of that
    /// type. Never fails: probing is how multi-type nodes are handled.
    pub fn narrow(&self, ty: JsonType) -> Option<&Facet> {
        self.facets.iter().find(|f| f.json_type() == ty)
    }

    /// The `number` view only. An `integer` node answers through
    /// [`Schema::as_integer`] instead, so the two stay distinguishable; use
    /// [`Schema::numeric`] when either will do.
    pub fn as_number(&self) -> Option<&NumberSchema> {
        self.facets.iter().find_map(|f| match f {
            Facet::Number(n) => Some(n),
            _ => None,
        })
    }

    pub fn as_integer(&self) -> Option<&NumberSchema> {
        self.facets.iter().find_map(|f| match f {
            Facet::Integer(n) => Some(n),
            _ => None,
        })
    }

    /// Numeric keywords of a `number` or `integer` node, preferring `number`
    /// when both are declared. Both facets are built from the same keywords.
    pub fn numeric(&self) -> Option<&NumberSchema> {
        self.as_number().or_else(|| self.as_integer())
    }

    pub fn as_string(&self) -> Option<&StringSchema> {
        self.facets.iter().find_map(|f| match f {
            Facet::String(s) => Some(s),
            _ => None,
        })
    }

    pub fn as_array(&self) -> Option<&ArraySchema> {
        self.facets.iter().find_map(|f| match f {
            Facet::Array(a) => Some(a),
            _ => None,
        })
    }

    pub fn as_object(&self) -> Option<&ObjectSchema> {
        self.facets.iter().find_map(|f| match f {
            Facet::Object(o) => Some(o),
            _ => None,
        })
    }

    pub fn as_boolean(&self) -> Option<&BooleanSchema> {
        self.facets.iter().find_map(|f| match f {
            Facet::Boolean(b) => Some(b),
            _ => None,
        })
    }

    pub fn as_null(&self) -> Option<&NullSchema> {
        self.facets.iter().find_map(|f| match f {
            Facet::Null(n) => Some(n),
            _ => None,
        })
    }

    /// Owned child nodes with the edge that leads to each, in keyword
    /// order. `$ref` targets are not children; see [`Schema::reference`].
    pub fn children(&self) -> Vec<(Edge<'_>, SchemaId)> {
        let mut out = Vec::new();
        out.extend(self.all_of.iter().flatten().enumerate().map(|(i, id)| (Edge::AllOf(i), *id)));
        out.extend(self.any_of.iter().flatten().enumerate().map(|(i, id)| (Edge::AnyOf(i), *id)));
        out.extend(self.one_of.iter().flatten().enumerate().map(|(i, id)| (Edge::OneOf(i), *id)));
        out.extend(self.not.map(|id| (Edge::Not, id)));
        out.extend(
            self.definitions
                .iter()
                .flatten()
                .map(|(name, id)| (Edge::Definition(name), *id)),
        );
        for facet in &self.facets {
            match facet {
                Facet::Array(a) => out.extend(a.children()),
                Facet::Object(o) => out.extend(o.children()),
                _ => {}
            }
        }
        out
    }
}

/// How a parent owns a child node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge<'a> {
    AllOf(usize),
    AnyOf(usize),
    OneOf(usize),
    Not,
    Definition(&'a str),
    Items,
    TupleItem(usize),
    AdditionalItems,
    Property(&'a str),
    PatternProperty(&'a str),
    AdditionalProperties,
    Dependency(&'a str),
}

impl fmt::Display for Edge<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edge::AllOf(i) => write!(f, "allOf[{i}]"),
            Edge::AnyOf(i) => write!(f, "anyOf[{i}]"),
            Edge::OneOf(i) => write!(f, "oneOf[{i}]"),
            Edge::Not => f.write_str("not"),
            Edge::Definition(name) => write!(f, "definitions[{name}]"),
            Edge::Items => f.write_str("items"),
            Edge::TupleItem(i) => write!(f, "items[{i}]"),
            Edge::AdditionalItems => f.write_str("additionalItems"),
            Edge::Property(name) => write!(f, "properties[{name}]"),
            Edge::PatternProperty(pattern) => write!(f, "patternProperties[{pattern}]"),
            Edge::AdditionalProperties => f.write_str("additionalProperties"),
            Edge::Dependency(name) => write!(f, "dependencies[{name}]"),
        }
    }
}

/// Decode an `additionalItems` / `additionalProperties` value.
pub(crate) fn additional_from(
    value: &Value,
    path: &str,
    cx: &mut dyn Materializer,
) -> Result<Additional> {
    match value {
        Value::Bool(b) => Ok(Additional::Allowed(*b)),
        Value::Object(_) => Ok(Additional::Schema(cx.child(value, path)?)),
        _ => Err(SchemaError::malformed(path, "must be a boolean or a schema")),
    }
}
