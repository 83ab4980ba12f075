//! Node arena and document walking.
//!
//! [`RegistryBuilder`] turns parsed JSON documents into [`Schema`] nodes,
//! one per schema object literal, depth-first and in document order. Each
//! node is indexed under its canonical location (`document#pointer`) and
//! under every enclosing `id` scope. [`RegistryBuilder::build`] then binds
//! every `$ref` to a node and hands out an immutable [`Registry`].

use std::collections::{HashMap, HashSet};
use std::ops::Index;

use indexmap::IndexMap;
use percent_encoding::percent_decode_str;
use serde_json::Value;
use url::Url;

use crate::dispatch::{self, JsonType, Materializer, TypeSet};
use crate::error::{child_path, Result, SchemaError};
use crate::keyword::{Reference, SchemaId};
use crate::path_de::from_value_with_path;
use crate::raw::RawKeywords;
use crate::schema::{self, Schema};

#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Keep unresolvable `$ref`s unbound instead of failing [`RegistryBuilder::build`].
    pub allow_dangling_references: bool,
    /// Warn about `pattern` / `patternProperties` the `regex` crate rejects.
    pub check_patterns: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self { allow_dangling_references: false, check_patterns: true }
    }
}

#[derive(Debug, Default)]
pub struct RegistryBuilder {
    options: BuildOptions,
    nodes: Vec<Schema>,
    index: HashMap<String, SchemaId>,
    roots: Vec<SchemaId>,
}

impl RegistryBuilder {
    pub fn new(options: BuildOptions) -> Self {
        Self { options, ..Self::default() }
    }

    /// Materialize every schema in `document`, returning the root node.
    ///
    /// `base` is the retrieval URI of the document; any fragment is ignored.
    /// On error nothing from `document` is kept and the builder stays usable.
    pub fn add_document(&mut self, base: Url, document: &Value) -> Result<SchemaId> {
        let mut base = base;
        base.set_fragment(None);
        let root_path = format!("{}#", base.as_str());
        let checkpoint = self.nodes.len();
        let mut walker = DocumentWalker {
            prefix_len: root_path.len(),
            scopes: vec![Scope { base: base.clone(), pointer: String::new() }],
            document: base,
            added_keys: Vec::new(),
            builder: self,
        };
        let result = walker.node(document, &root_path);
        let added_keys = std::mem::take(&mut walker.added_keys);
        match result {
            Ok(root) => {
                self.roots.push(root);
                Ok(root)
            }
            Err(error) => {
                let discarded = self.nodes.len() - checkpoint;
                self.nodes.truncate(checkpoint);
                for key in &added_keys {
                    self.index.remove(key);
                }
                tracing::debug!(discarded, %error, "rolled back failed document");
                Err(error)
            }
        }
    }

    /// Bind every `$ref` and freeze the graph.
    pub fn build(mut self) -> Result<Registry> {
        for node in &mut self.nodes {
            let Some(reference) = &mut node.reference else { continue };
            match self.index.get(reference.uri().as_str()) {
                Some(target) => {
                    tracing::debug!(from = %node.location, to = %reference.uri(), "resolved reference");
                    reference.bind(*target);
                }
                None if self.options.allow_dangling_references => {
                    tracing::warn!(from = %node.location, reference = reference.raw(), "leaving reference unresolved");
                }
                None => {
                    return Err(SchemaError::DanglingReference {
                        path: node.location.to_string(),
                        reference: reference.raw().to_string(),
                    });
                }
            }
        }
        Ok(Registry { nodes: self.nodes, index: self.index, roots: self.roots })
    }
}

struct Scope {
    base: Url,
    /// Pointer of the node that opened this scope.
    pointer: String,
}

struct DocumentWalker<'b> {
    builder: &'b mut RegistryBuilder,
    document: Url,
    /// Length of `"<document>#"`, so a path's pointer is `&path[prefix_len..]`.
    prefix_len: usize,
    scopes: Vec<Scope>,
    /// Index keys this document inserted, removed again if it fails.
    added_keys: Vec<String>,
}

impl Materializer for DocumentWalker<'_> {
    fn child(&mut self, value: &Value, path: &str) -> Result<SchemaId> {
        self.node(value, path)
    }
}

impl DocumentWalker<'_> {
    fn scope(&self) -> &Url {
        // scopes[0] is the document itself and is never popped
        &self.scopes[self.scopes.len() - 1].base
    }

    fn node(&mut self, value: &Value, path: &str) -> Result<SchemaId> {
        if !value.is_object() {
            return Err(SchemaError::malformed(path, "a schema must be a JSON object"));
        }
        let raw: RawKeywords = from_value_with_path(value, path)?;
        let pointer = path[self.prefix_len..].to_string();

        let mut location = self.document.clone();
        location.set_fragment(Some(&pointer));
        let id = SchemaId(self.builder.nodes.len());
        self.builder.nodes.push(Schema::empty(id, location.clone()));

        let opened_scope = self.enter_scope(&raw, path, &pointer, id)?;
        self.register(&pointer, id);
        let result = self.fill(id, &raw, path);
        if opened_scope {
            self.scopes.pop();
        }
        result?;

        let node = &self.builder.nodes[id.0];
        tracing::debug!(
            %location,
            types = ?node.facets.iter().map(|f| f.json_type().as_str()).collect::<Vec<_>>(),
            "materialized schema node"
        );
        Ok(id)
    }

    /// Handle the `id` keyword. Returns whether a new scope was pushed.
    fn enter_scope(&mut self, raw: &RawKeywords, path: &str, pointer: &str, id: SchemaId) -> Result<bool> {
        let Some(scope_id) = &raw.id else { return Ok(false) };
        let mut joined = self
            .scope()
            .join(scope_id)
            .map_err(|e| SchemaError::malformed(child_path(path, "id"), e.to_string()))?;
        if joined.fragment().is_some_and(|f| !f.is_empty()) {
            // plain-name fragment: an alias, not a new base
            normalize_fragment(&mut joined);
            self.insert_key(joined.to_string(), id);
            return Ok(false);
        }
        joined.set_fragment(None);
        self.scopes.push(Scope { base: joined, pointer: pointer.to_string() });
        Ok(true)
    }

    fn register(&mut self, pointer: &str, id: SchemaId) {
        let keys: Vec<String> = self
            .scopes
            .iter()
            .map(|scope| {
                let mut key = scope.base.clone();
                key.set_fragment(Some(&pointer[scope.pointer.len()..]));
                key.to_string()
            })
            .collect();
        for key in keys {
            self.insert_key(key, id);
        }
    }

    fn insert_key(&mut self, key: String, id: SchemaId) {
        if let Some(existing) = self.builder.index.get(&key) {
            if *existing != id {
                tracing::warn!(%key, "location already registered, keeping the first node");
            }
            return;
        }
        self.added_keys.push(key.clone());
        self.builder.index.insert(key, id);
    }

    fn fill(&mut self, id: SchemaId, raw: &RawKeywords, path: &str) -> Result<()> {
        if raw.enum_values.as_ref().is_some_and(Vec::is_empty) {
            return Err(SchemaError::malformed(child_path(path, "enum"), "must have at least one value"));
        }

        let reference = match &raw.reference {
            None => None,
            Some(text) => {
                let mut uri = self.scope().join(text).map_err(|e| {
                    SchemaError::malformed(child_path(path, "$ref"), e.to_string())
                })?;
                normalize_fragment(&mut uri);
                Some(Reference::new(text.clone(), uri))
            }
        };

        let all_of = self.child_list(raw.all_of.as_deref(), &child_path(path, "allOf"))?;
        let any_of = self.child_list(raw.any_of.as_deref(), &child_path(path, "anyOf"))?;
        let one_of = self.child_list(raw.one_of.as_deref(), &child_path(path, "oneOf"))?;
        let not = raw
            .not
            .as_ref()
            .map(|v| self.node(v, &child_path(path, "not")))
            .transpose()?;
        let definitions = match &raw.definitions {
            None => None,
            Some(defs) => {
                let defs_path = child_path(path, "definitions");
                let mut out = IndexMap::with_capacity(defs.len());
                for (name, value) in defs {
                    out.insert(name.clone(), self.node(value, &child_path(&defs_path, name))?);
                }
                Some(out)
            }
        };

        let declared_type = raw
            .type_
            .as_ref()
            .map(|v| TypeSet::from_keyword(v, &child_path(path, "type")))
            .transpose()?;
        let types: Vec<JsonType> = match &declared_type {
            Some(declared) => {
                for family in dispatch::inapplicable_families(raw, declared) {
                    tracing::debug!(%path, %declared, family, "ignoring keywords that do not apply to the declared type");
                }
                declared.iter().collect()
            }
            None => dispatch::inferred_types(raw),
        };
        let facets = types
            .into_iter()
            .map(|ty| dispatch::materialize(ty, raw, path, self))
            .collect::<Result<Vec<_>>>()?;

        if self.builder.options.check_patterns {
            self.check_patterns(raw, &facets, path);
        }

        let node = &mut self.builder.nodes[id.0];
        node.scope_id = raw.id.clone();
        node.schema_uri = raw.schema_uri.clone();
        node.title = raw.title.clone();
        node.description = raw.description.clone();
        node.default_value = raw.default.clone();
        node.enum_values = raw.enum_values.clone();
        node.format = raw.format.clone();
        node.all_of = all_of;
        node.any_of = any_of;
        node.one_of = one_of;
        node.not = not;
        node.definitions = definitions;
        node.declared_type = declared_type;
        node.reference = reference;
        node.facets = facets;
        Ok(())
    }

    fn child_list(&mut self, values: Option<&[Value]>, path: &str) -> Result<Option<Vec<SchemaId>>> {
        let Some(values) = values else { return Ok(None) };
        if values.is_empty() {
            return Err(SchemaError::malformed(path, "must have at least one schema"));
        }
        values
            .iter()
            .enumerate()
            .map(|(i, v)| self.node(v, &child_path(path, &i.to_string())))
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    fn check_patterns(&self, raw: &RawKeywords, facets: &[dispatch::Facet], path: &str) {
        for facet in facets {
            match facet {
                dispatch::Facet::String(s) => {
                    if let Some(p) = s.pattern() {
                        schema::str::check_pattern(p, &child_path(path, "pattern"));
                    }
                }
                dispatch::Facet::Object(_) => {
                    let pp_path = child_path(path, "patternProperties");
                    for key in raw.pattern_properties.iter().flat_map(|m| m.keys()) {
                        schema::str::check_pattern(key, &child_path(&pp_path, key));
                    }
                }
                _ => {}
            }
        }
    }
}

/// Bring a reference fragment into the form index keys are written in.
///
/// Keys are built from raw pointers and encoded by `Url` itself, so a
/// fragment is decoded first: `#/definitions/a%25b` names the key `a%b`.
/// A missing fragment means the document root.
fn normalize_fragment(uri: &mut Url) {
    let decoded = uri
        .fragment()
        .map(|f| percent_decode_str(f).decode_utf8_lossy().into_owned())
        .unwrap_or_default();
    uri.set_fragment(Some(&decoded));
}

/// An immutable, fully linked node graph.
///
/// Safe to share across threads; nothing is mutated after
/// [`RegistryBuilder::build`].
#[derive(Debug, Clone)]
pub struct Registry {
    nodes: Vec<Schema>,
    index: HashMap<String, SchemaId>,
    roots: Vec<SchemaId>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Build a registry from a single document with default options.
    pub fn from_document(base: Url, document: &Value) -> Result<Self> {
        let mut builder = Self::builder();
        builder.add_document(base, document)?;
        builder.build()
    }

    pub fn get(&self, id: SchemaId) -> Option<&Schema> {
        self.nodes.get(id.0)
    }

    /// Find the node registered under `uri`. A missing fragment means the
    /// document root.
    pub fn lookup(&self, uri: &Url) -> Option<SchemaId> {
        let mut key = uri.clone();
        normalize_fragment(&mut key);
        self.index.get(key.as_str()).copied()
    }

    /// The node a reference points at, if it was resolved.
    pub fn resolve(&self, reference: &Reference) -> Option<&Schema> {
        reference.target().and_then(|id| self.get(id))
    }

    /// Follow `$ref` links from `id` to the first node that is not a pure
    /// reference. `None` if the chain dangles or loops back on itself.
    pub fn follow(&self, id: SchemaId) -> Option<SchemaId> {
        let mut seen = HashSet::new();
        let mut current = id;
        while let Some(reference) = self.get(current)?.reference() {
            if !seen.insert(current) {
                return None;
            }
            current = reference.target()?;
        }
        Some(current)
    }

    /// Root node of each added document, in the order they were added.
    pub fn roots(&self) -> &[SchemaId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Schema> {
        self.nodes.iter()
    }
}

impl Index<SchemaId> for Registry {
    type Output = Schema;

    fn index(&self, id: SchemaId) -> &Schema {
        &self.nodes[id.0]
    }
}
