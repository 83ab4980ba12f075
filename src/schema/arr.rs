//! Array keywords (draft-4 validation, section 5.3).

use serde_json::Value;

use super::{additional_from, Edge};
use crate::dispatch::Materializer;
use crate::error::{child_path, Result, SchemaError};
use crate::keyword::{Additional, Items, SchemaId};
use crate::raw::RawKeywords;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArraySchema {
    items: Option<Items>,
    additional_items: Option<Additional>,
    max_items: Option<u64>,
    min_items: Option<u64>,
    unique_items: Option<bool>,
}

impl ArraySchema {
    pub(crate) fn from_raw(
        raw: &RawKeywords,
        path: &str,
        cx: &mut dyn Materializer,
    ) -> Result<Self> {
        if let (Some(lo), Some(hi)) = (raw.min_items, raw.max_items) {
            if lo > hi {
                return Err(SchemaError::inconsistent(
                    child_path(path, "minItems"),
                    format!("minItems {lo} exceeds maxItems {hi}"),
                ));
            }
        }

        let items = match &raw.items {
            None => None,
            Some(value) => {
                let items_path = child_path(path, "items");
                Some(match value {
                    Value::Object(_) => Items::List(cx.child(value, &items_path)?),
                    Value::Array(elems) => Items::Tuple(
                        elems
                            .iter()
                            .enumerate()
                            .map(|(i, v)| cx.child(v, &child_path(&items_path, &i.to_string())))
                            .collect::<Result<Vec<_>>>()?,
                    ),
                    _ => {
                        return Err(SchemaError::malformed(
                            items_path,
                            "must be a schema or an array of schemas",
                        ));
                    }
                })
            }
        };

        let additional_items = raw
            .additional_items
            .as_ref()
            .map(|v| additional_from(v, &child_path(path, "additionalItems"), cx))
            .transpose()?;

        Ok(Self {
            items,
            additional_items,
            max_items: raw.max_items,
            min_items: raw.min_items,
            unique_items: raw.unique_items,
        })
    }

    /// Either one schema every element must match, or one schema per
    /// position (tuple form). Absent means any element is valid.
    pub fn items(&self) -> Option<&Items> {
        self.items.as_ref()
    }

    /// Only meaningful with tuple-form `items`: governs elements past the
    /// last positional schema. `Allowed(false)` caps the length at the tuple
    /// arity; absent behaves as `Allowed(true)`.
    pub fn additional_items(&self) -> Option<Additional> {
        self.additional_items
    }

    /// An array is valid iff it has at most this many elements.
    pub fn max_items(&self) -> Option<u64> {
        self.max_items
    }

    /// An array is valid iff it has at least this many elements. Absent
    /// behaves as `0`.
    pub fn min_items(&self) -> Option<u64> {
        self.min_items
    }

    /// When `Some(true)`, all elements must be pairwise distinct.
    pub fn unique_items(&self) -> Option<bool> {
        self.unique_items
    }

    /// Effective value of `uniqueItems`, defaulting to `false`.
    pub fn is_unique_items(&self) -> bool {
        self.unique_items.unwrap_or(false)
    }

    pub(crate) fn children(&self) -> impl Iterator<Item = (Edge<'_>, SchemaId)> + '_ {
        let items = self.items.iter().flat_map(|items| match items {
            Items::List(id) => vec![(Edge::Items, *id)],
            Items::Tuple(ids) => ids
                .iter()
                .enumerate()
                .map(|(i, id)| (Edge::TupleItem(i), *id))
                .collect(),
        });
        let additional = match self.additional_items {
            Some(Additional::Schema(id)) => Some((Edge::AdditionalItems, id)),
            _ => None,
        };
        items.chain(additional)
    }
}
