use json_schema_model::emit::emit_schema;
use json_schema_model::ir::Ty;
use json_schema_model::lower::lower_to_ir;
use json_schema_model::{
    Additional, BuildOptions, Items, JsonType, Registry, RegistryBuilder, SchemaError,
};
use serde_json::{json, Value};
use url::Url;

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

fn single(doc: Value) -> Registry {
    Registry::from_document(url("https://example.com/schemas/root.json"), &doc).unwrap()
}

fn build_err(doc: Value) -> SchemaError {
    Registry::from_document(url("https://example.com/schemas/root.json"), &doc).unwrap_err()
}

#[test]
fn references_cross_documents() {
    let person = json!({
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "home": { "$ref": "address.json#/definitions/street" }
        }
    });
    let address = json!({
        "definitions": {
            "street": { "type": "string", "minLength": 1 }
        }
    });

    let mut builder = RegistryBuilder::new(BuildOptions::default());
    let person_root = builder.add_document(url("https://example.com/schemas/person.json"), &person).unwrap();
    builder.add_document(url("https://example.com/schemas/address.json"), &address).unwrap();
    let reg = builder.build().unwrap();

    let home = reg[person_root].as_object().unwrap().property("home").unwrap();
    let reference = reg[home].reference().unwrap();
    assert_eq!(reference.raw(), "address.json#/definitions/street");
    let street = reg.resolve(reference).unwrap();
    assert_eq!(street.location().as_str(), "https://example.com/schemas/address.json#/definitions/street");
    assert_eq!(street.as_string().unwrap().min_length(), Some(1));
    assert_eq!(reg.follow(home), Some(street.id()));

    // walking from the person root reaches the other document too
    let seen: Vec<String> = reg.walk(person_root).map(|n| n.location().to_string()).collect();
    assert!(seen.contains(&"https://example.com/schemas/address.json#/definitions/street".to_string()));
}

#[test]
fn documents_added_out_of_order_still_link() {
    let mut builder = Registry::builder();
    builder
        .add_document(url("https://example.com/a.json"), &json!({ "$ref": "b.json" }))
        .unwrap();
    let b = builder
        .add_document(url("https://example.com/b.json"), &json!({ "type": "boolean" }))
        .unwrap();
    let reg = builder.build().unwrap();
    assert_eq!(reg.follow(reg.roots()[0]), Some(b));
    assert!(reg[b].as_boolean().is_some());
}

#[test]
fn number_or_null_narrows_both_ways() {
    let reg = single(json!({
        "type": ["number", "null"],
        "minimum": 0,
        "maximum": 100,
        "exclusiveMaximum": true
    }));
    let root = &reg[reg.roots()[0]];
    let declared: Vec<JsonType> = root.declared_type().unwrap().iter().collect();
    assert_eq!(declared, vec![JsonType::Number, JsonType::Null]);

    let num = root.as_number().unwrap();
    assert_eq!(num.minimum().and_then(|n| n.as_i64()), Some(0));
    assert_eq!(num.maximum().and_then(|n| n.as_i64()), Some(100));
    assert!(num.is_exclusive_maximum());
    assert!(!num.is_exclusive_minimum());
    assert!(root.as_null().is_some());
    assert!(root.as_integer().is_none());
    assert!(root.as_string().is_none());
}

#[test]
fn banana_is_not_a_type() {
    let err = build_err(json!({
        "type": "object",
        "properties": { "fruit": { "type": "banana" } }
    }));
    assert_eq!(
        err,
        SchemaError::UnrecognizedType {
            path: "https://example.com/schemas/root.json#/properties/fruit/type".into(),
            token: "banana".into(),
        }
    );
}

#[test]
fn errors_point_at_the_keyword() {
    let err = build_err(json!({
        "type": "object",
        "properties": { "age": { "type": "integer", "minimum": "ten" } }
    }));
    assert!(matches!(err, SchemaError::MalformedKeyword { .. }), "{err}");
    assert_eq!(err.path(), "https://example.com/schemas/root.json#/properties/age/minimum");

    let err = build_err(json!({ "type": "string", "minLength": 5, "maxLength": 2 }));
    assert!(matches!(err, SchemaError::InconsistentConstraint { .. }), "{err}");
}

#[test]
fn dangling_references_are_configurable() {
    let doc = json!({ "properties": { "x": { "$ref": "#/definitions/missing" } } });
    let err = build_err(doc.clone());
    assert!(matches!(err, SchemaError::DanglingReference { .. }), "{err}");

    let mut builder = RegistryBuilder::new(BuildOptions {
        allow_dangling_references: true,
        ..BuildOptions::default()
    });
    let root = builder.add_document(url("https://example.com/d.json"), &doc).unwrap();
    let reg = builder.build().unwrap();
    let x = reg[root].as_object().unwrap().property("x").unwrap();
    assert!(!reg[x].reference().unwrap().is_resolved());
    assert_eq!(reg.follow(x), None);
}

#[test]
fn recursive_tree_walks_and_lowers() {
    let reg = single(json!({
        "title": "Tree",
        "type": "object",
        "properties": {
            "label": { "type": "string" },
            "children": { "type": "array", "items": { "$ref": "#" } }
        },
        "required": ["label"],
        "additionalProperties": false
    }));
    let root = reg.roots()[0];

    let pointers: Vec<&str> = reg.walk(root).map(|n| n.pointer()).collect();
    assert_eq!(pointers, vec!["", "/properties/label", "/properties/children", "/properties/children/items"]);

    let Ty::Object { fields, closed, .. } = lower_to_ir(&reg, root) else { panic!("expected object") };
    assert!(closed);
    assert_eq!(fields[0].name, "label");
    assert!(fields[0].required);
    let Ty::ArrayList { item, .. } = &fields[1].ty else { panic!("expected list") };
    assert_eq!(**item, Ty::Ref(root));

    let children = reg[root].as_object().unwrap().property("children").unwrap();
    assert!(matches!(reg[children].as_array().unwrap().items(), Some(Items::List(_))));
    assert_eq!(
        reg[root].as_object().unwrap().additional_properties(),
        Some(Additional::Allowed(false))
    );
}

#[test]
fn emit_is_stable_across_rebuilds() {
    let doc = json!({
        "$schema": "http://json-schema.org/draft-04/schema#",
        "id": "https://example.com/schemas/order.json",
        "type": "object",
        "definitions": {
            "money": { "type": "number", "multipleOf": 0.01, "minimum": 0 }
        },
        "properties": {
            "total": { "$ref": "#/definitions/money" },
            "lines": {
                "type": "array",
                "items": [{ "type": "string" }, { "type": "integer" }],
                "additionalItems": { "type": "boolean" },
                "minItems": 1
            }
        },
        "dependencies": { "total": ["lines"] }
    });
    let reg = single(doc.clone());
    let first = emit_schema(&reg, reg.roots()[0]);
    assert_eq!(first, doc);

    let rebuilt = single(first.clone());
    assert_eq!(emit_schema(&rebuilt, rebuilt.roots()[0]), first);
}

#[test]
fn registry_is_shareable_across_threads() {
    let reg = single(json!({
        "type": "object",
        "properties": { "n": { "type": "integer", "maximum": 5 } }
    }));
    let root = reg.roots()[0];
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                s.spawn(|| {
                    let n = reg[root].as_object().unwrap().property("n").unwrap();
                    reg[n].as_integer().unwrap().maximum().and_then(|m| m.as_i64())
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), Some(5));
        }
    });
}
