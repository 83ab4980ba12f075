//! String keywords (draft-4 validation, section 5.2).

use crate::error::{child_path, Result, SchemaError};
use crate::raw::RawKeywords;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StringSchema {
    max_length: Option<u64>,
    min_length: Option<u64>,
    pattern: Option<String>,
}

impl StringSchema {
    pub(crate) fn from_raw(raw: &RawKeywords, path: &str) -> Result<Self> {
        if let (Some(lo), Some(hi)) = (raw.min_length, raw.max_length) {
            if lo > hi {
                return Err(SchemaError::inconsistent(
                    child_path(path, "minLength"),
                    format!("minLength {lo} exceeds maxLength {hi}"),
                ));
            }
        }
        Ok(Self {
            max_length: raw.max_length,
            min_length: raw.min_length,
            pattern: raw.pattern.clone(),
        })
    }

    /// A string is valid iff its length, counted in code points, is at
    /// most this value.
    pub fn max_length(&self) -> Option<u64> {
        self.max_length
    }

    /// A string is valid iff its length, counted in code points, is at
    /// least this value. Absent behaves as `0`.
    pub fn min_length(&self) -> Option<u64> {
        self.min_length
    }

    /// ECMA 262 regular expression; a string is valid iff the expression
    /// matches it anywhere (patterns are not implicitly anchored).
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }
}

/// Warn about patterns the `regex` crate cannot compile. ECMA 262 allows
/// more than the Rust dialect (lookaround, backreferences), so the pattern
/// is kept either way.
pub(crate) fn check_pattern(pattern: &str, path: &str) -> bool {
    match regex::Regex::new(pattern) {
        Ok(_) => true,
        Err(error) => {
            tracing::warn!(%path, %pattern, %error, "pattern is not supported by the regex crate");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path_de::from_value_with_path;
    use serde_json::json;

    fn build(doc: serde_json::Value) -> Result<StringSchema> {
        let raw: RawKeywords = from_value_with_path(&doc, "#")?;
        StringSchema::from_raw(&raw, "#")
    }

    #[test]
    fn keeps_declared_keywords() {
        let s = build(json!({ "minLength": 2, "pattern": "^a+$" })).unwrap();
        assert_eq!(s.min_length(), Some(2));
        assert_eq!(s.max_length(), None);
        assert_eq!(s.pattern(), Some("^a+$"));
    }

    #[test]
    fn negative_length_is_malformed() {
        let err = build(json!({ "maxLength": -1 })).unwrap_err();
        assert!(matches!(err, SchemaError::MalformedKeyword { ref path, .. } if path == "#/maxLength"));
    }

    #[test]
    fn crossed_lengths_are_inconsistent() {
        assert!(matches!(
            build(json!({ "minLength": 3, "maxLength": 2 })),
            Err(SchemaError::InconsistentConstraint { .. })
        ));
    }

    #[test]
    fn lookahead_is_flagged_but_kept() {
        assert!(check_pattern("^[a-z]+$", "#/pattern"));
        assert!(!check_pattern("^(?=a)a$", "#/pattern"));
    }
}
