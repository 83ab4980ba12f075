//! Construction-time failures.
//!
//! Every variant carries the JSON Pointer (as a URI fragment, e.g.
//! `#/properties/age/minimum`) of the keyword that caused it. Nothing here
//! is transient: a schema that fails to build will fail again, so callers
//! get no partial graph and no retry semantics.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A keyword value has the wrong JSON shape for its slot.
    #[error("malformed keyword at {path}: {reason}")]
    MalformedKeyword { path: String, reason: String },

    /// A combination of keywords contradicts itself.
    #[error("inconsistent constraint at {path}: {reason}")]
    InconsistentConstraint { path: String, reason: String },

    /// A `type` token outside the seven draft-4 primitive types.
    #[error("unrecognized type {token:?} at {path}")]
    UnrecognizedType { path: String, token: String },

    /// A `$ref` that no registered node answers to.
    #[error("dangling reference {reference:?} at {path}")]
    DanglingReference { path: String, reference: String },
}

impl SchemaError {
    pub(crate) fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedKeyword { path: path.into(), reason: reason.into() }
    }

    pub(crate) fn inconsistent(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InconsistentConstraint { path: path.into(), reason: reason.into() }
    }

    /// Location of the failure, regardless of kind.
    pub fn path(&self) -> &str {
        match self {
            Self::MalformedKeyword { path, .. }
            | Self::InconsistentConstraint { path, .. }
            | Self::UnrecognizedType { path, .. }
            | Self::DanglingReference { path, .. } => path,
        }
    }
}

pub type Result<T, E = SchemaError> = std::result::Result<T, E>;

/// Append one reference token to a fragment pointer, escaping per RFC 6901.
pub(crate) fn child_path(parent: &str, token: &str) -> String {
    let escaped = token.replace('~', "~0").replace('/', "~1");
    format!("{parent}/{escaped}")
}
