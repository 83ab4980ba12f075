//! Object keywords (draft-4 validation, section 5.4).

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde_json::Value;

use super::{additional_from, Edge};
use crate::dispatch::Materializer;
use crate::error::{child_path, Result, SchemaError};
use crate::keyword::{Additional, Dependency, SchemaId};
use crate::raw::RawKeywords;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectSchema {
    properties: Option<IndexMap<String, SchemaId>>,
    pattern_properties: Option<IndexMap<String, SchemaId>>,
    additional_properties: Option<Additional>,
    required: Option<Vec<String>>,
    max_properties: Option<u64>,
    min_properties: Option<u64>,
    dependencies: Option<IndexMap<String, Dependency>>,
}

impl ObjectSchema {
    pub(crate) fn from_raw(
        raw: &RawKeywords,
        path: &str,
        cx: &mut dyn Materializer,
    ) -> Result<Self> {
        if let (Some(lo), Some(hi)) = (raw.min_properties, raw.max_properties) {
            if lo > hi {
                return Err(SchemaError::inconsistent(
                    child_path(path, "minProperties"),
                    format!("minProperties {lo} exceeds maxProperties {hi}"),
                ));
            }
        }
        if let Some(required) = &raw.required {
            unique_names(required, &child_path(path, "required"))?;
        }

        let properties = raw
            .properties
            .as_ref()
            .map(|m| child_map(m, &child_path(path, "properties"), cx))
            .transpose()?;
        let pattern_properties = raw
            .pattern_properties
            .as_ref()
            .map(|m| child_map(m, &child_path(path, "patternProperties"), cx))
            .transpose()?;
        let additional_properties = raw
            .additional_properties
            .as_ref()
            .map(|v| additional_from(v, &child_path(path, "additionalProperties"), cx))
            .transpose()?;

        let dependencies = match &raw.dependencies {
            None => None,
            Some(deps) => {
                let deps_path = child_path(path, "dependencies");
                let mut out = IndexMap::with_capacity(deps.len());
                for (name, value) in deps {
                    let dep_path = child_path(&deps_path, name);
                    let dep = match value {
                        Value::Object(_) => Dependency::Schema(cx.child(value, &dep_path)?),
                        Value::Array(_) => {
                            let names: Vec<String> =
                                crate::path_de::from_value_with_path(value, &dep_path)?;
                            unique_names(&names, &dep_path)?;
                            Dependency::Properties(names)
                        }
                        _ => {
                            return Err(SchemaError::malformed(
                                dep_path,
                                "must be a schema or an array of property names",
                            ));
                        }
                    };
                    out.insert(name.clone(), dep);
                }
                Some(out)
            }
        };

        Ok(Self {
            properties,
            pattern_properties,
            additional_properties,
            required: raw.required.clone(),
            max_properties: raw.max_properties,
            min_properties: raw.min_properties,
            dependencies,
        })
    }

    /// Per-name child schemas, in document order. A member named here must
    /// validate against its schema; it is not thereby required.
    pub fn properties(&self) -> Option<&IndexMap<String, SchemaId>> {
        self.properties.as_ref()
    }

    pub fn property(&self, name: &str) -> Option<SchemaId> {
        self.properties.as_ref()?.get(name).copied()
    }

    /// ECMA 262 regex keys; every member whose name matches a key must
    /// validate against that key's schema.
    pub fn pattern_properties(&self) -> Option<&IndexMap<String, SchemaId>> {
        self.pattern_properties.as_ref()
    }

    /// Governs members matched by neither `properties` nor
    /// `patternProperties`. Absent behaves as `Allowed(true)`.
    pub fn additional_properties(&self) -> Option<Additional> {
        self.additional_properties
    }

    /// Names that must be present. Never empty and never repeats a name.
    pub fn required(&self) -> Option<&[String]> {
        self.required.as_deref()
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().flatten().any(|n| n == name)
    }

    /// An object is valid iff it has at most this many members.
    pub fn max_properties(&self) -> Option<u64> {
        self.max_properties
    }

    /// An object is valid iff it has at least this many members. Absent
    /// behaves as `0`.
    pub fn min_properties(&self) -> Option<u64> {
        self.min_properties
    }

    /// When the named member is present, the instance must also satisfy the
    /// dependency (a schema, or a list of further required names).
    pub fn dependencies(&self) -> Option<&IndexMap<String, Dependency>> {
        self.dependencies.as_ref()
    }

    pub(crate) fn children(&self) -> impl Iterator<Item = (Edge<'_>, SchemaId)> + '_ {
        let props = self
            .properties
            .iter()
            .flatten()
            .map(|(k, id)| (Edge::Property(k), *id));
        let patterns = self
            .pattern_properties
            .iter()
            .flatten()
            .map(|(k, id)| (Edge::PatternProperty(k), *id));
        let additional = match self.additional_properties {
            Some(Additional::Schema(id)) => Some((Edge::AdditionalProperties, id)),
            _ => None,
        };
        let deps = self.dependencies.iter().flatten().filter_map(|(k, d)| match d {
            Dependency::Schema(id) => Some((Edge::Dependency(k), *id)),
            Dependency::Properties(_) => None,
        });
        props.chain(patterns).chain(additional).chain(deps)
    }
}

fn child_map(
    members: &IndexMap<String, Value>,
    path: &str,
    cx: &mut dyn Materializer,
) -> Result<IndexMap<String, SchemaId>> {
    members
        .iter()
        .map(|(name, value)| -> Result<(String, SchemaId)> {
            Ok((name.clone(), cx.child(value, &child_path(path, name))?))
        })
        .collect()
}

fn unique_names(names: &[String], path: &str) -> Result<()> {
    if names.is_empty() {
        return Err(SchemaError::malformed(path, "must list at least one name"));
    }
    let mut seen = BTreeSet::new();
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(SchemaError::malformed(path, format!("repeats {name:?}")));
        }
    }
    Ok(())
}
