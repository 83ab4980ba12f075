use serde_json::Value;

use crate::ir::{Field, Ty};
use crate::keyword::{Additional, Items, Number, SchemaId};
use crate::registry::Registry;
use crate::schema::{ArraySchema, NumberSchema, ObjectSchema, Schema, StringSchema};

/// Lower one node into the codegen IR.
///
/// References become `Ty::Ref` and are never expanded, so cyclic graphs
/// lower in one pass over the owned tree.
pub fn lower_to_ir(registry: &Registry, id: SchemaId) -> Ty {
    lower_node(registry, &registry[id])
}

fn lower_node(reg: &Registry, node: &Schema) -> Ty {
    if let Some(reference) = node.reference() {
        return match reference.target() {
            Some(target) => Ty::Ref(target),
            None => {
                tracing::warn!(location = %node.location(), reference = reference.raw(), "lowering unresolved reference as Any");
                Ty::Any
            }
        };
    }

    if !node.facets().is_empty() {
        let arms = lower_facets(reg, node);
        return match arms.len() {
            1 => arms.into_iter().next().unwrap_or(Ty::Any),
            _ => simplify_unions(arms),
        };
    }

    // Untyped: fall back to combinators, then to literal enums.
    if let Some(alts) = node.one_of().or(node.any_of()) {
        return simplify_unions(alts.iter().map(|id| lower_node(reg, &reg[*id])).collect());
    }
    if let Some([only]) = node.all_of() {
        return lower_node(reg, &reg[*only]);
    }
    if let Some(values) = node.enum_values() {
        return lower_enum(values);
    }
    Ty::Any
}

// Arrays first, then objects, numbers, strings, bool; null last so it can
// collapse into Nullable.
fn lower_facets(reg: &Registry, node: &Schema) -> Vec<Ty> {
    let mut arms: Vec<Ty> = Vec::new();

    if let Some(arr) = node.as_array() {
        arms.push(lower_array(reg, arr));
    }
    if let Some(obj) = node.as_object() {
        arms.push(lower_object(reg, obj));
    }
    if let Some(int) = node.as_integer() {
        arms.push(lower_integer(int));
    }
    if let Some(num) = node.as_number() {
        arms.push(Ty::Number {
            min: num.minimum().map(|n| n.value().0),
            max: num.maximum().map(|n| n.value().0),
            exclusive_min: num.is_exclusive_minimum(),
            exclusive_max: num.is_exclusive_maximum(),
        });
    }
    if let Some(s) = node.as_string() {
        arms.push(lower_string(node, s));
    }
    if node.as_boolean().is_some() {
        arms.push(Ty::Bool);
    }
    if node.as_null().is_some() {
        arms.push(Ty::Null);
    }

    debug_assert_eq!(arms.len(), node.facets().len());
    arms
}

fn lower_array(reg: &Registry, arr: &ArraySchema) -> Ty {
    match arr.items() {
        Some(Items::Tuple(ids)) => {
            let (rest, closed) = match arr.additional_items() {
                Some(Additional::Schema(id)) => (Some(Box::new(lower_to_ir(reg, id))), false),
                Some(Additional::Allowed(false)) => (None, true),
                _ => (None, false),
            };
            Ty::ArrayTuple {
                elems: ids.iter().map(|id| lower_to_ir(reg, *id)).collect(),
                rest,
                closed,
            }
        }
        Some(Items::List(id)) => Ty::ArrayList {
            item: Box::new(lower_to_ir(reg, *id)),
            min_items: arr.min_items(),
            max_items: arr.max_items(),
            unique: arr.is_unique_items(),
        },
        None => Ty::ArrayList {
            item: Box::new(Ty::Any),
            min_items: arr.min_items(),
            max_items: arr.max_items(),
            unique: arr.is_unique_items(),
        },
    }
}

fn lower_object(reg: &Registry, obj: &ObjectSchema) -> Ty {
    let fields: Vec<Field> = obj
        .properties()
        .into_iter()
        .flatten()
        .map(|(name, id)| Field {
            name: name.clone(),
            ty: lower_to_ir(reg, *id),
            required: obj.is_required(name),
        })
        .collect();
    let (additional, closed) = match obj.additional_properties() {
        Some(Additional::Schema(id)) => (Some(Box::new(lower_to_ir(reg, id))), false),
        Some(Additional::Allowed(false)) => (None, true),
        _ => (None, false),
    };
    Ty::Object { fields, additional, closed }
}

// Bounds that do not fit in i64 are dropped rather than clamped.
fn lower_integer(int: &NumberSchema) -> Ty {
    fn bound(n: &Number, exclusive: bool, upward: bool) -> Option<i64> {
        if let Some(exact) = n.as_i64() {
            return match (exclusive, upward) {
                (true, true) => exact.checked_add(1),
                (true, false) => exact.checked_sub(1),
                (false, _) => Some(exact),
            };
        }
        let f = n.value().0;
        let f = match (exclusive && f.fract() == 0.0, upward) {
            (true, true) => f + 1.0,
            (true, false) => f - 1.0,
            (false, true) => f.ceil(),
            (false, false) => f.floor(),
        };
        // i64::MAX as f64 rounds up to 2^63, which is already out of range
        (f >= i64::MIN as f64 && f < i64::MAX as f64).then(|| f as i64)
    }
    Ty::Integer {
        min: int.minimum().and_then(|n| bound(n, int.is_exclusive_minimum(), true)),
        max: int.maximum().and_then(|n| bound(n, int.is_exclusive_maximum(), false)),
    }
}

fn lower_string(node: &Schema, s: &StringSchema) -> Ty {
    let enum_ = node
        .enum_values()
        .map(|values| values.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
        .unwrap_or_default();
    Ty::String {
        enum_,
        pattern: s.pattern().map(str::to_string),
        format: node.format().map(str::to_string),
    }
}

fn lower_enum(values: &[Value]) -> Ty {
    let strings: Vec<String> = values.iter().filter_map(|v| v.as_str().map(str::to_string)).collect();
    let has_null = values.iter().any(Value::is_null);
    if strings.len() + usize::from(has_null) != values.len() {
        return Ty::Any;
    }
    let core = Ty::String { enum_: strings, pattern: None, format: None };
    if has_null { Ty::Nullable(Box::new(core)) } else { core }
}

// Collapse common unions: X ∪ null → Nullable(X)
fn simplify_unions(mut arms: Vec<Ty>) -> Ty {
    let mut had_null = false;
    arms.retain(|t| {
        if matches!(t, Ty::Null) { had_null = true; false } else { true }
    });

    let core = match arms.len() {
        0 => Ty::Null,
        1 => arms.remove(0),
        _ => Ty::OneOf(arms),
    };

    if had_null && !matches!(core, Ty::Null) {
        Ty::Nullable(Box::new(core))
    } else {
        core
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use url::Url;

    fn lower(doc: Value) -> (Registry, Ty) {
        let reg = Registry::from_document(Url::parse("https://example.com/m.json").unwrap(), &doc).unwrap();
        let ty = lower_to_ir(&reg, reg.roots()[0]);
        (reg, ty)
    }

    #[test]
    fn number_or_null_becomes_nullable() {
        let (_, ty) = lower(json!({ "type": ["null", "number"], "maximum": 2.5, "exclusiveMaximum": true }));
        assert_eq!(
            ty,
            Ty::Nullable(Box::new(Ty::Number {
                min: None,
                max: Some(2.5),
                exclusive_min: false,
                exclusive_max: true,
            }))
        );
    }

    #[test]
    fn integer_bounds_absorb_exclusivity() {
        let (_, ty) = lower(json!({
            "type": "integer",
            "minimum": 3, "exclusiveMinimum": true,
            "maximum": 9.5
        }));
        assert_eq!(ty, Ty::Integer { min: Some(4), max: Some(9) });
    }

    #[test]
    fn integer_bounds_outside_i64_are_dropped() {
        let (_, ty) = lower(json!({ "type": "integer", "minimum": -1e30, "maximum": 1e30 }));
        assert_eq!(ty, Ty::Integer { min: None, max: None });

        let (_, ty) = lower(json!({
            "type": "integer",
            "minimum": i64::MIN, "exclusiveMinimum": true,
            "maximum": i64::MAX, "exclusiveMaximum": true
        }));
        assert_eq!(ty, Ty::Integer { min: Some(i64::MIN + 1), max: Some(i64::MAX - 1) });

        let (_, ty) = lower(json!({ "type": "integer", "maximum": u64::MAX }));
        assert_eq!(ty, Ty::Integer { min: None, max: None });
    }

    #[test]
    fn objects_keep_property_order_and_requiredness() {
        let (_, ty) = lower(json!({
            "type": "object",
            "properties": {
                "zeta": { "type": "string", "enum": ["a", "b"] },
                "alpha": { "type": "boolean" }
            },
            "required": ["alpha"],
            "additionalProperties": false
        }));
        let Ty::Object { fields, additional, closed } = ty else { panic!("expected object") };
        assert!(closed);
        assert!(additional.is_none());
        assert_eq!(fields.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(), vec!["zeta", "alpha"]);
        assert!(!fields[0].required);
        assert!(fields[1].required);
        assert_eq!(
            fields[0].ty,
            Ty::String { enum_: vec!["a".into(), "b".into()], pattern: None, format: None }
        );
    }

    #[test]
    fn recursive_schemas_lower_to_refs() {
        let (reg, ty) = lower(json!({
            "type": "object",
            "properties": { "next": { "$ref": "#" } }
        }));
        let Ty::Object { fields, .. } = ty else { panic!("expected object") };
        assert_eq!(fields[0].ty, Ty::Ref(reg.roots()[0]));
    }

    #[test]
    fn tuples_and_untyped_nodes() {
        let (_, ty) = lower(json!({
            "type": "array",
            "items": [{ "type": "string" }, {}],
            "additionalItems": false
        }));
        assert_eq!(
            ty,
            Ty::ArrayTuple {
                elems: vec![Ty::String { enum_: vec![], pattern: None, format: None }, Ty::Any],
                rest: None,
                closed: true,
            }
        );
    }

    #[test]
    fn untyped_one_of_and_enums() {
        let (_, ty) = lower(json!({ "oneOf": [{ "type": "string" }, { "type": "null" }] }));
        assert_eq!(ty, Ty::Nullable(Box::new(Ty::String { enum_: vec![], pattern: None, format: None })));

        let (_, ty) = lower(json!({ "enum": ["x", null] }));
        assert_eq!(ty, Ty::Nullable(Box::new(Ty::String { enum_: vec!["x".into()], pattern: None, format: None })));

        let (_, ty) = lower(json!({ "enum": [1, "x"] }));
        assert_eq!(ty, Ty::Any);
    }
}
