//! Keyword value types: plain data carried by schema nodes.

use std::fmt;

use ordered_float::OrderedFloat;
use serde::Deserialize;
use url::Url;

/// Stable handle of a node inside a [`crate::Registry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchemaId(pub(crate) usize);

impl SchemaId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A numeric keyword value exactly as written in the document.
///
/// Integers stay integers (`3` and `3.0` are distinct values); comparisons
/// go through [`Number::value`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Number(serde_json::Number);

impl Number {
    pub fn value(&self) -> OrderedFloat<f64> {
        // Without arbitrary_precision every serde_json::Number has an f64 form.
        OrderedFloat(self.0.as_f64().unwrap_or(f64::NAN))
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.0.as_i64()
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.0.as_u64()
    }

    pub fn is_integer(&self) -> bool {
        self.0.is_i64() || self.0.is_u64()
    }

    pub fn as_json(&self) -> &serde_json::Number {
        &self.0
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Self(n.into())
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// `additionalItems` / `additionalProperties`: a boolean or a child schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Additional {
    Allowed(bool),
    Schema(SchemaId),
}

impl Additional {
    /// `false` only when explicitly forbidden; a schema still admits values.
    pub fn permits_any(&self) -> bool {
        !matches!(self, Additional::Allowed(false))
    }
}

/// `items`: one schema for every element, or one per position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Items {
    List(SchemaId),
    Tuple(Vec<SchemaId>),
}

/// One entry of `dependencies`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dependency {
    /// Schema dependency: the whole instance must validate against it.
    Schema(SchemaId),
    /// Property dependency: these names must also be present.
    Properties(Vec<String>),
}

/// A `$ref`, stored as a link rather than ownership.
///
/// `target` is `None` until the registry resolves it, and stays `None` for a
/// dangling reference when the registry is configured to tolerate them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    raw: String,
    uri: Url,
    target: Option<SchemaId>,
}

impl Reference {
    pub(crate) fn new(raw: String, uri: Url) -> Self {
        Self { raw, uri, target: None }
    }

    pub(crate) fn bind(&mut self, target: SchemaId) {
        self.target = Some(target);
    }

    /// The reference text as written.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Absolute URI after joining against the enclosing resolution scope.
    pub fn uri(&self) -> &Url {
        &self.uri
    }

    pub fn target(&self) -> Option<SchemaId> {
        self.target
    }

    pub fn is_resolved(&self) -> bool {
        self.target.is_some()
    }
}
