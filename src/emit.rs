//! Render nodes back into draft-4 keyword mappings.
//!
//! The output holds exactly the keywords that were declared, in a fixed
//! canonical order, so two documents that build the same graph emit the
//! same JSON. References are written back as their original `$ref` text.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::dispatch::Facet;
use crate::keyword::{Additional, Dependency, Items, Number, SchemaId};
use crate::registry::Registry;
use crate::schema::Schema;

pub fn emit_schema(registry: &Registry, id: SchemaId) -> Value {
    emit_node(registry, &registry[id])
}

fn emit_node(reg: &Registry, node: &Schema) -> Value {
    let mut o = Map::new();
    let child = |id: &SchemaId| emit_node(reg, &reg[*id]);

    put_str(&mut o, "$schema", node.schema_uri());
    put_str(&mut o, "id", node.scope_id());
    if let Some(r) = node.reference() {
        o.insert("$ref".into(), Value::from(r.raw()));
    }
    put_str(&mut o, "title", node.title());
    put_str(&mut o, "description", node.description());
    if let Some(types) = node.declared_type() {
        let names: Vec<Value> = types.iter().map(|t| Value::from(t.as_str())).collect();
        o.insert(
            "type".into(),
            if names.len() == 1 { names[0].clone() } else { Value::Array(names) },
        );
    }
    put_str(&mut o, "format", node.format());
    if let Some(v) = node.default_value() {
        o.insert("default".into(), v.clone());
    }
    if let Some(vs) = node.enum_values() {
        o.insert("enum".into(), Value::Array(vs.to_vec()));
    }

    // Number and integer share keywords; emit them once.
    if let Some(num) = node.numeric() {
        put_num(&mut o, "multipleOf", num.multiple_of());
        put_num(&mut o, "maximum", num.maximum());
        put_bool(&mut o, "exclusiveMaximum", num.exclusive_maximum());
        put_num(&mut o, "minimum", num.minimum());
        put_bool(&mut o, "exclusiveMinimum", num.exclusive_minimum());
    }

    for facet in node.facets() {
        match facet {
            Facet::String(s) => {
                put_u64(&mut o, "maxLength", s.max_length());
                put_u64(&mut o, "minLength", s.min_length());
                put_str(&mut o, "pattern", s.pattern());
            }
            Facet::Array(a) => {
                match a.items() {
                    Some(Items::List(id)) => {
                        o.insert("items".into(), child(id));
                    }
                    Some(Items::Tuple(ids)) => {
                        o.insert("items".into(), Value::Array(ids.iter().map(child).collect()));
                    }
                    None => {}
                }
                if let Some(add) = a.additional_items() {
                    o.insert("additionalItems".into(), emit_additional(reg, add));
                }
                put_u64(&mut o, "maxItems", a.max_items());
                put_u64(&mut o, "minItems", a.min_items());
                put_bool(&mut o, "uniqueItems", a.unique_items());
            }
            Facet::Object(ob) => {
                if let Some(props) = ob.properties() {
                    o.insert("properties".into(), emit_map(reg, props));
                }
                if let Some(props) = ob.pattern_properties() {
                    o.insert("patternProperties".into(), emit_map(reg, props));
                }
                if let Some(add) = ob.additional_properties() {
                    o.insert("additionalProperties".into(), emit_additional(reg, add));
                }
                if let Some(req) = ob.required() {
                    o.insert("required".into(), Value::from(req.to_vec()));
                }
                put_u64(&mut o, "maxProperties", ob.max_properties());
                put_u64(&mut o, "minProperties", ob.min_properties());
                if let Some(deps) = ob.dependencies() {
                    let mut m = Map::new();
                    for (name, dep) in deps {
                        let v = match dep {
                            Dependency::Schema(id) => child(id),
                            Dependency::Properties(names) => Value::from(names.clone()),
                        };
                        m.insert(name.clone(), v);
                    }
                    o.insert("dependencies".into(), Value::Object(m));
                }
            }
            Facet::Number(_) | Facet::Integer(_) | Facet::Boolean(_) | Facet::Null(_) => {}
        }
    }

    for (key, list) in [("allOf", node.all_of()), ("anyOf", node.any_of()), ("oneOf", node.one_of())] {
        if let Some(ids) = list {
            o.insert(key.into(), Value::Array(ids.iter().map(child).collect()));
        }
    }
    if let Some(id) = node.not() {
        o.insert("not".into(), child(&id));
    }
    if let Some(defs) = node.definitions() {
        o.insert("definitions".into(), emit_map(reg, defs));
    }

    Value::Object(o)
}

fn emit_map(reg: &Registry, members: &IndexMap<String, SchemaId>) -> Value {
    Value::Object(
        members
            .iter()
            .map(|(k, id)| (k.clone(), emit_node(reg, &reg[*id])))
            .collect(),
    )
}

fn emit_additional(reg: &Registry, add: Additional) -> Value {
    match add {
        Additional::Allowed(b) => Value::Bool(b),
        Additional::Schema(id) => emit_node(reg, &reg[id]),
    }
}

fn put_str(o: &mut Map<String, Value>, key: &str, v: Option<&str>) {
    if let Some(v) = v {
        o.insert(key.into(), Value::from(v));
    }
}

fn put_num(o: &mut Map<String, Value>, key: &str, v: Option<&Number>) {
    if let Some(v) = v {
        o.insert(key.into(), Value::Number(v.as_json().clone()));
    }
}

fn put_bool(o: &mut Map<String, Value>, key: &str, v: Option<bool>) {
    if let Some(v) = v {
        o.insert(key.into(), Value::Bool(v));
    }
}

fn put_u64(o: &mut Map<String, Value>, key: &str, v: Option<u64>) {
    if let Some(v) = v {
        o.insert(key.into(), Value::from(v));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use url::Url;

    fn emit(doc: &Value) -> Value {
        let reg = Registry::from_document(Url::parse("https://example.com/e.json").unwrap(), doc).unwrap();
        emit_schema(&reg, reg.roots()[0])
    }

    #[test]
    fn declared_keywords_survive() {
        let doc = json!({
            "title": "Point",
            "type": "object",
            "properties": {
                "x": { "type": "number", "minimum": 0, "exclusiveMinimum": false },
                "tags": { "type": "array", "items": { "type": "string", "pattern": "^[a-z]+$" }, "uniqueItems": true }
            },
            "required": ["x"],
            "additionalProperties": false
        });
        assert_eq!(emit(&doc), doc);
    }

    #[test]
    fn inapplicable_keywords_are_dropped() {
        let doc = json!({ "type": "string", "minimum": 3, "maxLength": 4 });
        assert_eq!(emit(&doc), json!({ "type": "string", "maxLength": 4 }));
    }

    #[test]
    fn references_are_written_back_verbatim() {
        let doc = json!({
            "definitions": { "n": { "type": ["integer", "null"], "default": null } },
            "oneOf": [{ "$ref": "#/definitions/n" }, { "enum": ["none"] }]
        });
        assert_eq!(
            emit(&doc),
            json!({
                "oneOf": [{ "$ref": "#/definitions/n" }, { "enum": ["none"] }],
                "definitions": { "n": { "type": ["integer", "null"], "default": null } }
            })
        );
    }
}
