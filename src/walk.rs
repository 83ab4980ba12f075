//! Cycle-safe traversal.
//!
//! Owned edges form a tree, but `$ref` links can point anywhere, including
//! back at an ancestor. [`Walk`] keeps a visited set so a revisit is treated
//! as a back-edge and never expanded again.

use std::collections::HashSet;

use crate::keyword::SchemaId;
use crate::registry::Registry;
use crate::schema::Schema;

/// Depth-first, pre-order iterator over every node reachable from a root
/// through owned children and resolved references. Each node is yielded
/// exactly once.
pub struct Walk<'r> {
    registry: &'r Registry,
    stack: Vec<SchemaId>,
    visited: HashSet<SchemaId>,
}

impl<'r> Walk<'r> {
    pub(crate) fn new(registry: &'r Registry, root: SchemaId) -> Self {
        Self { registry, stack: vec![root], visited: HashSet::new() }
    }

    pub fn visited(&self) -> &HashSet<SchemaId> {
        &self.visited
    }
}

impl<'r> Iterator for Walk<'r> {
    type Item = &'r Schema;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(id) = self.stack.pop() {
            if !self.visited.insert(id) {
                continue;
            }
            let Some(node) = self.registry.get(id) else { continue };

            // push in reverse so children come out in keyword order, the
            // reference target last
            if let Some(target) = node.reference().and_then(|r| r.target()) {
                self.stack.push(target);
            }
            for (_, child) in node.children().into_iter().rev() {
                self.stack.push(child);
            }
            return Some(node);
        }
        None
    }
}

impl Registry {
    pub fn walk(&self, root: SchemaId) -> Walk<'_> {
        Walk::new(self, root)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use url::Url;

    use crate::registry::Registry;

    fn build(doc: serde_json::Value) -> Registry {
        Registry::from_document(Url::parse("https://example.com/tree.json").unwrap(), &doc).unwrap()
    }

    #[test]
    fn self_reference_terminates() {
        let reg = build(json!({
            "type": "object",
            "properties": {
                "value": { "type": "integer" },
                "children": { "type": "array", "items": { "$ref": "#" } }
            }
        }));
        let root = reg.roots()[0];
        let pointers: Vec<&str> = reg.walk(root).map(|n| n.pointer()).collect();
        assert_eq!(
            pointers,
            vec!["", "/properties/value", "/properties/children", "/properties/children/items"]
        );
    }

    #[test]
    fn mutual_references_visit_each_node_once() {
        let reg = build(json!({
            "definitions": {
                "a": { "type": "object", "properties": { "b": { "$ref": "#/definitions/b" } } },
                "b": { "type": "object", "properties": { "a": { "$ref": "#/definitions/a" } } }
            },
            "$ref": "#/definitions/a"
        }));
        let root = reg.roots()[0];
        let mut walk = reg.walk(root);
        let ids: Vec<_> = walk.by_ref().map(|n| n.id()).collect();
        assert_eq!(ids.len(), reg.len());
        assert_eq!(walk.visited().len(), reg.len());
    }

    #[test]
    fn walk_starts_anywhere() {
        let reg = build(json!({
            "definitions": { "leaf": { "type": "string" } },
            "properties": { "x": { "$ref": "#/definitions/leaf" } }
        }));
        let x = reg[reg.roots()[0]].as_object().unwrap().property("x").unwrap();
        let pointers: Vec<&str> = reg.walk(x).map(|n| n.pointer()).collect();
        assert_eq!(pointers, vec!["/properties/x", "/definitions/leaf"]);
    }
}
