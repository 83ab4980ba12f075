//! The keyword mapping of one schema object, decoded but not yet checked.
//!
//! Sub-schema slots stay as raw JSON here; the registry turns them into
//! arena nodes. Every field uses [`present`] so that `"default": null` is
//! kept and `"minimum": null` is rejected instead of read as absent.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::keyword::Number;
use crate::path_de::present;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawKeywords {
    // core
    #[serde(default, deserialize_with = "present")]
    pub id: Option<String>,
    #[serde(rename = "$schema", default, deserialize_with = "present")]
    pub schema_uri: Option<String>,
    #[serde(rename = "$ref", default, deserialize_with = "present")]
    pub reference: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub default: Option<Value>,
    #[serde(rename = "enum", default, deserialize_with = "present")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(rename = "type", default, deserialize_with = "present")]
    pub type_: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub format: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub all_of: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "present")]
    pub any_of: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "present")]
    pub one_of: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "present")]
    pub not: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub definitions: Option<IndexMap<String, Value>>,

    // number / integer
    #[serde(default, deserialize_with = "present")]
    pub multiple_of: Option<Number>,
    #[serde(default, deserialize_with = "present")]
    pub maximum: Option<Number>,
    #[serde(default, deserialize_with = "present")]
    pub exclusive_maximum: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    pub minimum: Option<Number>,
    #[serde(default, deserialize_with = "present")]
    pub exclusive_minimum: Option<bool>,

    // string
    #[serde(default, deserialize_with = "present")]
    pub max_length: Option<u64>,
    #[serde(default, deserialize_with = "present")]
    pub min_length: Option<u64>,
    #[serde(default, deserialize_with = "present")]
    pub pattern: Option<String>,

    // array
    #[serde(default, deserialize_with = "present")]
    pub items: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub additional_items: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub max_items: Option<u64>,
    #[serde(default, deserialize_with = "present")]
    pub min_items: Option<u64>,
    #[serde(default, deserialize_with = "present")]
    pub unique_items: Option<bool>,

    // object
    #[serde(default, deserialize_with = "present")]
    pub properties: Option<IndexMap<String, Value>>,
    #[serde(default, deserialize_with = "present")]
    pub pattern_properties: Option<IndexMap<String, Value>>,
    #[serde(default, deserialize_with = "present")]
    pub additional_properties: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub required: Option<Vec<String>>,
    #[serde(default, deserialize_with = "present")]
    pub max_properties: Option<u64>,
    #[serde(default, deserialize_with = "present")]
    pub min_properties: Option<u64>,
    #[serde(default, deserialize_with = "present")]
    pub dependencies: Option<IndexMap<String, Value>>,
}

impl RawKeywords {
    pub fn has_numeric(&self) -> bool {
        self.multiple_of.is_some()
            || self.maximum.is_some()
            || self.exclusive_maximum.is_some()
            || self.minimum.is_some()
            || self.exclusive_minimum.is_some()
    }

    pub fn has_string(&self) -> bool {
        self.max_length.is_some() || self.min_length.is_some() || self.pattern.is_some()
    }

    pub fn has_array(&self) -> bool {
        self.items.is_some()
            || self.additional_items.is_some()
            || self.max_items.is_some()
            || self.min_items.is_some()
            || self.unique_items.is_some()
    }

    pub fn has_object(&self) -> bool {
        self.properties.is_some()
            || self.pattern_properties.is_some()
            || self.additional_properties.is_some()
            || self.required.is_some()
            || self.max_properties.is_some()
            || self.min_properties.is_some()
            || self.dependencies.is_some()
    }
}
