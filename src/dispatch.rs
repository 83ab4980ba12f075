//! Narrowing dispatch: the one place that maps a JSON type token to its
//! specialized keyword set.
//!
//! The registry calls [`materialize`] while building a node; consumers call
//! [`crate::Schema::narrow`] (or the `as_*` shorthands), which pattern-match
//! over [`Facet`]. Both sides are total over the closed set of seven draft-4
//! types, so adding a type is a compile error everywhere it matters.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::{child_path, Result, SchemaError};
use crate::keyword::SchemaId;
use crate::raw::RawKeywords;
use crate::schema::{ArraySchema, BooleanSchema, NullSchema, NumberSchema, ObjectSchema, StringSchema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum JsonType {
    Array,
    Boolean,
    Integer,
    Null,
    Number,
    Object,
    String,
}

impl JsonType {
    pub const ALL: [JsonType; 7] = [
        JsonType::Array,
        JsonType::Boolean,
        JsonType::Integer,
        JsonType::Null,
        JsonType::Number,
        JsonType::Object,
        JsonType::String,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            JsonType::Array => "array",
            JsonType::Boolean => "boolean",
            JsonType::Integer => "integer",
            JsonType::Null => "null",
            JsonType::Number => "number",
            JsonType::Object => "object",
            JsonType::String => "string",
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A token that is not one of the seven type names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownType(pub String);

impl FromStr for JsonType {
    type Err = UnknownType;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        JsonType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownType(s.to_string()))
    }
}

/// The value of a `type` keyword: one or more distinct type names, in the
/// order they were declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSet(Vec<JsonType>);

impl TypeSet {
    pub fn single(ty: JsonType) -> Self {
        Self(vec![ty])
    }

    pub fn contains(&self, ty: JsonType) -> bool {
        self.0.contains(&ty)
    }

    pub fn iter(&self) -> impl Iterator<Item = JsonType> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[JsonType] {
        &self.0
    }

    /// Decode a `type` keyword value: a type name or a non-empty array of
    /// distinct type names.
    pub(crate) fn from_keyword(value: &Value, path: &str) -> Result<Self> {
        let parse = |token: &str, at: String| {
            token.parse::<JsonType>().map_err(|UnknownType(token)| {
                SchemaError::UnrecognizedType { path: at, token }
            })
        };
        match value {
            Value::String(token) => Ok(Self(vec![parse(token, path.to_string())?])),
            Value::Array(tokens) => {
                if tokens.is_empty() {
                    return Err(SchemaError::malformed(path, "must name at least one type"));
                }
                let mut out = Vec::with_capacity(tokens.len());
                for (i, token) in tokens.iter().enumerate() {
                    let at = child_path(path, &i.to_string());
                    let Value::String(token) = token else {
                        return Err(SchemaError::malformed(at, "type names must be strings"));
                    };
                    let ty = parse(token, at.clone())?;
                    if out.contains(&ty) {
                        return Err(SchemaError::malformed(at, format!("repeats {ty}")));
                    }
                    out.push(ty);
                }
                Ok(Self(out))
            }
            _ => Err(SchemaError::malformed(path, "must be a string or an array of strings")),
        }
    }
}

impl fmt::Display for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, ty) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            write!(f, "{ty}")?;
        }
        Ok(())
    }
}

/// The type-specialized view of a node, one variant per JSON type.
#[derive(Debug, Clone, PartialEq)]
pub enum Facet {
    Array(ArraySchema),
    Boolean(BooleanSchema),
    Integer(NumberSchema),
    Null(NullSchema),
    Number(NumberSchema),
    Object(ObjectSchema),
    String(StringSchema),
}

impl Facet {
    pub fn json_type(&self) -> JsonType {
        match self {
            Facet::Array(_) => JsonType::Array,
            Facet::Boolean(_) => JsonType::Boolean,
            Facet::Integer(_) => JsonType::Integer,
            Facet::Null(_) => JsonType::Null,
            Facet::Number(_) => JsonType::Number,
            Facet::Object(_) => JsonType::Object,
            Facet::String(_) => JsonType::String,
        }
    }
}

/// Builds owned child nodes on behalf of a facet constructor.
pub(crate) trait Materializer {
    /// Allocate the node for the sub-schema `value` found at `path`.
    fn child(&mut self, value: &Value, path: &str) -> Result<SchemaId>;
}

/// Construct the facet for `ty` from a node's keyword mapping.
pub(crate) fn materialize(
    ty: JsonType,
    raw: &RawKeywords,
    path: &str,
    cx: &mut dyn Materializer,
) -> Result<Facet> {
    Ok(match ty {
        JsonType::Array => Facet::Array(ArraySchema::from_raw(raw, path, cx)?),
        JsonType::Boolean => Facet::Boolean(BooleanSchema),
        JsonType::Integer => Facet::Integer(NumberSchema::from_raw(raw, path)?),
        JsonType::Null => Facet::Null(NullSchema),
        JsonType::Number => Facet::Number(NumberSchema::from_raw(raw, path)?),
        JsonType::Object => Facet::Object(ObjectSchema::from_raw(raw, path, cx)?),
        JsonType::String => Facet::String(StringSchema::from_raw(raw, path)?),
    })
}

/// Which types' keywords appear in `raw`, for nodes without a `type`.
///
/// Numeric keywords infer `number` only: every integer is a number, not the
/// other way round. Boolean and null have no keywords and are never inferred.
pub(crate) fn inferred_types(raw: &RawKeywords) -> Vec<JsonType> {
    let mut out = Vec::new();
    if raw.has_array() {
        out.push(JsonType::Array);
    }
    if raw.has_numeric() {
        out.push(JsonType::Number);
    }
    if raw.has_object() {
        out.push(JsonType::Object);
    }
    if raw.has_string() {
        out.push(JsonType::String);
    }
    out
}

/// Keyword families present in `raw` that `declared` does not cover.
pub(crate) fn inapplicable_families(raw: &RawKeywords, declared: &TypeSet) -> Vec<&'static str> {
    let mut out = Vec::new();
    if raw.has_numeric() && !declared.contains(JsonType::Number) && !declared.contains(JsonType::Integer) {
        out.push("numeric");
    }
    if raw.has_string() && !declared.contains(JsonType::String) {
        out.push("string");
    }
    if raw.has_array() && !declared.contains(JsonType::Array) {
        out.push("array");
    }
    if raw.has_object() && !declared.contains(JsonType::Object) {
        out.push("object");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn every_token_round_trips() {
        for ty in JsonType::ALL {
            assert_eq!(ty.as_str().parse::<JsonType>(), Ok(ty));
        }
    }

    #[test]
    fn banana_is_not_a_type() {
        let err = TypeSet::from_keyword(&json!("banana"), "#/type").unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnrecognizedType { path: "#/type".into(), token: "banana".into() }
        );
        // draft-3 "any" is gone in draft-4
        assert!(TypeSet::from_keyword(&json!(["string", "any"]), "#/type").is_err());
    }

    #[test]
    fn type_arrays_are_checked() {
        let set = TypeSet::from_keyword(&json!(["number", "null"]), "#/type").unwrap();
        assert_eq!(set.as_slice(), &[JsonType::Number, JsonType::Null]);
        assert_eq!(set.to_string(), "number|null");

        assert!(matches!(
            TypeSet::from_keyword(&json!([]), "#/type"),
            Err(SchemaError::MalformedKeyword { .. })
        ));
        assert!(matches!(
            TypeSet::from_keyword(&json!(["null", "null"]), "#/type"),
            Err(SchemaError::MalformedKeyword { ref path, .. }) if path == "#/type/1"
        ));
        assert!(matches!(
            TypeSet::from_keyword(&json!(7), "#/type"),
            Err(SchemaError::MalformedKeyword { .. })
        ));
    }

    proptest! {
        #[test]
        fn unknown_tokens_never_parse(token in "[a-z]{1,10}") {
            let known = JsonType::ALL.iter().any(|t| t.as_str() == token);
            let parsed = TypeSet::from_keyword(&json!(token), "#/type");
            prop_assert_eq!(parsed.is_ok(), known);
        }
    }
}
