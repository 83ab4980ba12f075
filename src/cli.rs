//! Minimal CLI: load schemas → (check | outline | emit | lower)
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use json_schema_model::emit::emit_schema;
use json_schema_model::lower::lower_to_ir;
use json_schema_model::{BuildOptions, Registry, RegistryBuilder, Schema, SchemaId};
use rayon::prelude::*;
use serde_json::Value;
use url::Url;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// build typed draft-4 schema graphs from JSON Schema documents and inspect them
#[derive(Parser, Debug)]
#[command(name = "json-schema-model", version, about)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// build the node graph and report the first authoring error
    Check(InputSettings),
    /// print an indented tree of every node with its types and constraints
    Outline(InputSettings),
    /// print every document re-emitted as canonical draft-4 JSON
    Emit(EmitOut),
    /// print the codegen IR of every document root
    Lower(InputSettings),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// keep unresolvable $refs unbound instead of failing
    #[arg(long, default_value_t = false)]
    allow_dangling: bool,

    /// skip the regex compatibility check on `pattern` and `patternProperties`
    #[arg(long, default_value_t = false)]
    no_pattern_check: bool,

    /// One or more inputs. May be literal paths or quoted glob patterns.
    ///
    /// All inputs share one registry, so `$ref`s may cross files.
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct EmitOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

struct Loaded {
    registry: Registry,
    documents: Vec<(PathBuf, SchemaId)>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn options(&self) -> BuildOptions {
        BuildOptions {
            allow_dangling_references: self.allow_dangling,
            check_patterns: !self.no_pattern_check,
        }
    }

    fn load(&self) -> Result<Loaded> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .map_err(|error| anyhow!("failed to resolve input file paths: {error}"))?;

        // reading and parsing is independent per file; building is not
        let parsed = source_paths
            .par_iter()
            .map(|source_path| -> Result<(PathBuf, Url, Value)> {
                let absolute = std::fs::canonicalize(source_path)
                    .with_context(|| format!("Failed to locate source file ({})", source_path.display()))?;
                let source = std::fs::read_to_string(&absolute)
                    .with_context(|| format!("Failed to read source file ({})", source_path.display()))?;
                let json_value = serde_json::from_str::<Value>(&source)
                    .with_context(|| format!("Failed to parse JSON source file ({})", source_path.display()))?;
                let base = Url::from_file_path(&absolute)
                    .map_err(|()| anyhow!("cannot express {} as a file URL", absolute.display()))?;
                Ok((source_path.clone(), base, json_value))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut builder = RegistryBuilder::new(self.options());
        let mut documents = Vec::with_capacity(parsed.len());
        for (source_path, base, json_value) in parsed {
            tracing::info!(path = %source_path.display(), "adding schema document");
            let root = builder
                .add_document(base, &json_value)
                .with_context(|| format!("Failed to build schema ({})", source_path.display()))?;
            documents.push((source_path, root));
        }
        let registry = builder.build().context("Failed to link references")?;
        Ok(Loaded { registry, documents })
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Check(settings) => {
                let loaded = settings.load()?;
                println!(
                    "{} {} document(s), {} schema node(s)",
                    "ok".green().bold(),
                    loaded.documents.len(),
                    loaded.registry.len(),
                );
            }
            Command::Outline(settings) => {
                let loaded = settings.load()?;
                for (source_path, root) in &loaded.documents {
                    println!("{}", source_path.display().to_string().bold());
                    print_outline(&loaded.registry, *root, "#", 1);
                }
            }
            Command::Emit(target) => {
                let loaded = target.input_settings.load()?;
                let emitted = match loaded.documents.as_slice() {
                    [(_, root)] => emit_schema(&loaded.registry, *root),
                    documents => Value::Object(
                        documents
                            .iter()
                            .map(|(path, root)| {
                                (path.display().to_string(), emit_schema(&loaded.registry, *root))
                            })
                            .collect(),
                    ),
                };
                let schema_src = serde_json::to_string_pretty(&emitted)?;
                if let Some(out) = target.out.as_ref() {
                    if let Some(parent) = out.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(out, &schema_src)
                        .with_context(|| format!("Failed to write {}", out.display()))?;
                } else {
                    println!("{schema_src}");
                }
            }
            Command::Lower(settings) => {
                let loaded = settings.load()?;
                for (source_path, root) in &loaded.documents {
                    println!("{}", source_path.display().to_string().bold());
                    println!("{:#?}", lower_to_ir(&loaded.registry, *root));
                }
            }
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn print_outline(registry: &Registry, id: SchemaId, label: &str, depth: usize) {
    let node = &registry[id];
    let mut line = format!("{}{} {}", "  ".repeat(depth), label.dimmed(), type_label(node).cyan());
    if let Some(reference) = node.reference() {
        line.push_str(&format!(" {} {}", "$ref".yellow(), reference.raw()));
        if !reference.is_resolved() {
            line.push_str(&format!(" {}", "(unresolved)".red()));
        }
    }
    let constraints = describe(node);
    if !constraints.is_empty() {
        line.push_str(&format!(" [{constraints}]"));
    }
    if let Some(title) = node.title() {
        line.push_str(&format!(" {title:?}"));
    }
    println!("{line}");
    // owned children only; references were printed above and are not followed
    for (edge, child) in node.children() {
        print_outline(registry, child, &edge.to_string(), depth + 1);
    }
}

fn type_label(node: &Schema) -> String {
    match node.declared_type() {
        Some(types) => types.to_string(),
        None if node.is_any() => "any".to_string(),
        None => {
            let inferred: Vec<&str> = node.facets().iter().map(|f| f.json_type().as_str()).collect();
            format!("~{}", inferred.join("|"))
        }
    }
}

fn describe(node: &Schema) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(num) = node.numeric() {
        if let Some(m) = num.minimum() {
            parts.push(format!("{}{m}", if num.is_exclusive_minimum() { ">" } else { ">=" }));
        }
        if let Some(m) = num.maximum() {
            parts.push(format!("{}{m}", if num.is_exclusive_maximum() { "<" } else { "<=" }));
        }
        if let Some(m) = num.multiple_of() {
            parts.push(format!("multipleOf {m}"));
        }
    }
    if let Some(s) = node.as_string() {
        if s.min_length().is_some() || s.max_length().is_some() {
            parts.push(format!("length {}", span(s.min_length(), s.max_length())));
        }
        if let Some(p) = s.pattern() {
            parts.push(format!("/{p}/"));
        }
    }
    if let Some(a) = node.as_array() {
        if a.min_items().is_some() || a.max_items().is_some() {
            parts.push(format!("items {}", span(a.min_items(), a.max_items())));
        }
        if a.is_unique_items() {
            parts.push("unique".to_string());
        }
    }
    if let Some(o) = node.as_object() {
        if let Some(required) = o.required() {
            parts.push(format!("required {}", required.join(", ")));
        }
        if o.min_properties().is_some() || o.max_properties().is_some() {
            parts.push(format!("properties {}", span(o.min_properties(), o.max_properties())));
        }
        if o.additional_properties().is_some_and(|a| !a.permits_any()) {
            parts.push("closed".to_string());
        }
    }
    if let Some(values) = node.enum_values() {
        parts.push(format!("enum of {}", values.len()));
    }
    if let Some(format) = node.format() {
        parts.push(format!("format {format}"));
    }
    parts.join(", ")
}

fn span(lo: Option<u64>, hi: Option<u64>) -> String {
    match (lo, hi) {
        (Some(lo), Some(hi)) => format!("{lo}..={hi}"),
        (Some(lo), None) => format!("{lo}.."),
        (None, Some(hi)) => format!("..={hi}"),
        (None, None) => "..".to_string(),
    }
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                match entry {
                    Ok(p) => {
                        matched_any = true;
                        out.push(p);
                    }
                    Err(e) => return Err(Box::new(e)),
                }
            }
            if !matched_any {
                // Pattern was explicitly a glob but matched nothing -> surface as an error
                return Err(format!("glob pattern matched no files: {pattern}").into());
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
