//! Numeric keywords, shared by the `number` and `integer` specializations.
//!
//! Draft-4 validation, section 5.1:
//! <https://tools.ietf.org/html/draft-fge-json-schema-validation-00#section-5.1>

use crate::error::{child_path, Result, SchemaError};
use crate::keyword::Number;
use crate::raw::RawKeywords;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NumberSchema {
    multiple_of: Option<Number>,
    maximum: Option<Number>,
    exclusive_maximum: Option<bool>,
    minimum: Option<Number>,
    exclusive_minimum: Option<bool>,
}

impl NumberSchema {
    pub(crate) fn from_raw(raw: &RawKeywords, path: &str) -> Result<Self> {
        let out = Self {
            multiple_of: raw.multiple_of.clone(),
            maximum: raw.maximum.clone(),
            exclusive_maximum: raw.exclusive_maximum,
            minimum: raw.minimum.clone(),
            exclusive_minimum: raw.exclusive_minimum,
        };
        out.check(path)?;
        Ok(out)
    }

    fn check(&self, path: &str) -> Result<()> {
        if let Some(m) = &self.multiple_of {
            if m.value().0 <= 0.0 {
                return Err(SchemaError::malformed(
                    child_path(path, "multipleOf"),
                    format!("must be strictly greater than 0, found {m}"),
                ));
            }
        }
        if self.exclusive_maximum == Some(true) && self.maximum.is_none() {
            return Err(SchemaError::inconsistent(
                child_path(path, "exclusiveMaximum"),
                "exclusiveMaximum is true but no maximum is declared",
            ));
        }
        if self.exclusive_minimum == Some(true) && self.minimum.is_none() {
            return Err(SchemaError::inconsistent(
                child_path(path, "exclusiveMinimum"),
                "exclusiveMinimum is true but no minimum is declared",
            ));
        }
        if let (Some(lo), Some(hi)) = (&self.minimum, &self.maximum) {
            let empty = lo.value() > hi.value()
                || (lo.value() == hi.value()
                    && (self.is_exclusive_minimum() || self.is_exclusive_maximum()));
            if empty {
                return Err(SchemaError::inconsistent(
                    path,
                    format!("no number satisfies minimum {lo} and maximum {hi}"),
                ));
            }
        }
        Ok(())
    }

    /// A numeric instance is valid against `multipleOf` iff dividing it by
    /// this value yields an integer. Always strictly positive when present.
    pub fn multiple_of(&self) -> Option<&Number> {
        self.multiple_of.as_ref()
    }

    /// Upper bound for numeric instances. Inclusive unless
    /// [`exclusive_maximum`](Self::exclusive_maximum) is `Some(true)`.
    pub fn maximum(&self) -> Option<&Number> {
        self.maximum.as_ref()
    }

    /// When `Some(true)`, the instance must be strictly less than
    /// [`maximum`](Self::maximum); absent means the bound is inclusive.
    /// Never `Some(true)` without a maximum.
    pub fn exclusive_maximum(&self) -> Option<bool> {
        self.exclusive_maximum
    }

    /// Effective value of `exclusiveMaximum`, defaulting to `false`.
    pub fn is_exclusive_maximum(&self) -> bool {
        self.exclusive_maximum.unwrap_or(false)
    }

    /// Lower bound for numeric instances. Inclusive unless
    /// [`exclusive_minimum`](Self::exclusive_minimum) is `Some(true)`.
    pub fn minimum(&self) -> Option<&Number> {
        self.minimum.as_ref()
    }

    /// When `Some(true)`, the instance must be strictly greater than
    /// [`minimum`](Self::minimum); absent means the bound is inclusive.
    /// Never `Some(true)` without a minimum.
    pub fn exclusive_minimum(&self) -> Option<bool> {
        self.exclusive_minimum
    }

    /// Effective value of `exclusiveMinimum`, defaulting to `false`.
    pub fn is_exclusive_minimum(&self) -> bool {
        self.exclusive_minimum.unwrap_or(false)
    }

    /// `true` when no numeric keyword was declared.
    pub fn is_unconstrained(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path_de::from_value_with_path;
    use proptest::prelude::*;
    use serde_json::{json, Value};

    fn build(doc: Value) -> Result<NumberSchema> {
        let raw: RawKeywords = from_value_with_path(&doc, "#")?;
        NumberSchema::from_raw(&raw, "#")
    }

    #[test]
    fn reflects_declared_keywords() {
        let n = build(json!({ "minimum": 3, "exclusiveMinimum": true })).unwrap();
        assert_eq!(n.minimum().and_then(Number::as_i64), Some(3));
        assert_eq!(n.exclusive_minimum(), Some(true));
        assert!(n.maximum().is_none());
        assert_eq!(n.exclusive_maximum(), None);
        assert!(!n.is_exclusive_maximum());
    }

    #[test]
    fn unset_and_false_are_distinct() {
        let unset = build(json!({ "maximum": 1 })).unwrap();
        let off = build(json!({ "maximum": 1, "exclusiveMaximum": false })).unwrap();
        assert_eq!(unset.exclusive_maximum(), None);
        assert_eq!(off.exclusive_maximum(), Some(false));
        assert_eq!(unset.is_exclusive_maximum(), off.is_exclusive_maximum());
    }

    #[test]
    fn exclusive_without_bound_is_reported() {
        let err = build(json!({ "exclusiveMaximum": true })).unwrap_err();
        assert!(matches!(err, SchemaError::InconsistentConstraint { ref path, .. } if path == "#/exclusiveMaximum"));
        let err = build(json!({ "exclusiveMinimum": true, "maximum": 4 })).unwrap_err();
        assert!(matches!(err, SchemaError::InconsistentConstraint { .. }));
    }

    #[test]
    fn multiple_of_must_be_positive() {
        assert!(matches!(
            build(json!({ "multipleOf": 0 })),
            Err(SchemaError::MalformedKeyword { .. })
        ));
        assert!(build(json!({ "multipleOf": 0.5 })).is_ok());
    }

    #[test]
    fn empty_ranges_are_inconsistent() {
        assert!(build(json!({ "minimum": 5, "maximum": 4 })).is_err());
        assert!(build(json!({ "minimum": 4, "maximum": 4, "exclusiveMaximum": true })).is_err());
        assert!(build(json!({ "minimum": 4, "maximum": 4 })).is_ok());
    }

    #[test]
    fn wrong_shape_is_malformed() {
        let err = build(json!({ "minimum": "3" })).unwrap_err();
        assert!(matches!(err, SchemaError::MalformedKeyword { ref path, .. } if path == "#/minimum"));
    }

    proptest! {
        #[test]
        fn exclusivity_requires_its_bound(
            max in proptest::option::of(0i64..100),
            excl_max in proptest::option::of(any::<bool>()),
            min in proptest::option::of(-100i64..0),
            excl_min in proptest::option::of(any::<bool>()),
        ) {
            let mut doc = serde_json::Map::new();
            if let Some(v) = max { doc.insert("maximum".into(), json!(v)); }
            if let Some(v) = excl_max { doc.insert("exclusiveMaximum".into(), json!(v)); }
            if let Some(v) = min { doc.insert("minimum".into(), json!(v)); }
            if let Some(v) = excl_min { doc.insert("exclusiveMinimum".into(), json!(v)); }

            let broken = (excl_max == Some(true) && max.is_none())
                || (excl_min == Some(true) && min.is_none());
            match build(Value::Object(doc)) {
                Ok(n) => {
                    prop_assert!(!broken);
                    if n.exclusive_maximum() == Some(true) { prop_assert!(n.maximum().is_some()); }
                    if n.exclusive_minimum() == Some(true) { prop_assert!(n.minimum().is_some()); }
                }
                Err(err) => {
                    prop_assert!(broken);
                    let is_inconsistent = matches!(err, SchemaError::InconsistentConstraint { .. });
                    prop_assert!(is_inconsistent);
                }
            }
        }
    }
}
