//! Schema loader for YAML declarations
//!
//! ```yaml
//! name: ContactEditor
//! extends: BaseEditor
//! untranslated: true
//! attributes:
//!   - name
//!   - name: description
//!     from: related
//!   - name: password
//!     from: ~
//!   - name: valid_from
//!     as: date
//! ```
//!
//! A missing `from` reads the backing record's same-named field; an explicit
//! null or empty `from` declares an attribute without default.

use crate::cast::PersistHint;
use crate::inheritance::{InheritanceGraph, merge_schemas};
use crate::model::{AttributeOptions, AttributeSchema};
use crate::registry::SchemaRegistry;
use crate::source::SourceExpression;
use crate::transforms::Transform;
use crate::{Error, Result};
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, trace};

/// Serializable schema format for loading from files
#[derive(Debug, Deserialize)]
struct SchemaFile {
    name: String,
    #[serde(default)]
    extends: Option<String>,
    #[serde(default)]
    untranslated: bool,
    #[serde(default)]
    attributes: Vec<AttributeEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AttributeEntry {
    Name(String),
    Full(AttributeFile),
}

#[derive(Debug, Deserialize)]
struct AttributeFile {
    name: String,
    #[serde(default, deserialize_with = "deserialize_present")]
    from: Option<Option<String>>,
    #[serde(default)]
    input: Option<String>,
    #[serde(default)]
    output: Option<String>,
    #[serde(default, rename = "as")]
    persist_as: Option<String>,
}

/// Distinguish an explicit `from: ~` (`Some(None)`) from a missing key (`None`)
fn deserialize_present<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl AttributeFile {
    fn into_options(self) -> Result<(String, AttributeOptions)> {
        let mut options = AttributeOptions::new();
        match self.from {
            None => {}
            Some(None) => options = options.from_nothing(),
            Some(Some(expr)) => options = options.source(SourceExpression::parse(&expr)),
        }
        if let Some(name) = self.input {
            options = options.input(transform_named(&name)?);
        }
        if let Some(name) = self.output {
            options = options.output(transform_named(&name)?);
        }
        if let Some(tag) = self.persist_as {
            let hint = PersistHint::from_name(&tag).ok_or_else(|| {
                Error::Parse(format!("Unknown persist type `{tag}` for `{}`", self.name))
            })?;
            options = options.persist_as(hint);
        }
        Ok((self.name, options))
    }
}

fn transform_named(name: &str) -> Result<Transform> {
    Transform::from_name(name).ok_or_else(|| Error::Parse(format!("Unknown transform `{name}`")))
}

/// Loads schema declarations and caches the merged result
pub struct SchemaLoader {
    registry: Arc<SchemaRegistry>,
    schema_paths: Vec<PathBuf>,
}

impl SchemaLoader {
    /// Create a new schema loader with the given search paths
    #[must_use]
    pub fn new(schema_paths: Vec<PathBuf>) -> Self {
        Self {
            registry: Arc::new(SchemaRegistry::new()),
            schema_paths,
        }
    }

    /// Create a new schema loader with a pre-configured registry
    #[must_use]
    pub fn with_registry(registry: Arc<SchemaRegistry>, schema_paths: Vec<PathBuf>) -> Self {
        Self {
            registry,
            schema_paths,
        }
    }

    /// Load a schema by type name, resolving its parents
    ///
    /// Checks the registry first, then searches the schema paths for
    /// `<name>.yaml`, `<name>.yml` or the lowercase variants.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when no file declares the type,
    /// [`Error::Inheritance`] for missing parents or cycles, and
    /// [`Error::Parse`] for malformed declarations.
    pub fn load(&self, type_name: &str) -> Result<Arc<AttributeSchema>> {
        self.load_resolving(type_name, &mut InheritanceGraph::new())
    }

    /// Load a schema from a YAML string and register it
    ///
    /// # Errors
    ///
    /// Returns an error when the YAML is malformed or a parent cannot be resolved.
    pub fn load_from_yaml(&self, yaml: &str) -> Result<Arc<AttributeSchema>> {
        self.register_parsed(Self::parse_yaml(yaml)?, &mut InheritanceGraph::new())
    }

    /// Load a schema from a specific file path and register it
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed.
    pub fn load_from_file(&self, path: &Path) -> Result<Arc<AttributeSchema>> {
        self.load_file_resolving(path, &mut InheritanceGraph::new())
    }

    /// Add a search path for schema files
    pub fn add_path(&mut self, path: PathBuf) {
        self.schema_paths.push(path);
    }

    /// Registry holding every schema loaded so far
    #[must_use]
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    fn load_resolving(
        &self,
        type_name: &str,
        graph: &mut InheritanceGraph,
    ) -> Result<Arc<AttributeSchema>> {
        if let Some(cached) = self.registry.get(type_name) {
            debug!("Cache hit for schema: {}", type_name);
            return Ok(cached);
        }
        trace!("Cache miss for schema: {}", type_name);

        let path = self.find_file(type_name)?;
        self.load_file_resolving(&path, graph)
    }

    fn load_file_resolving(
        &self,
        path: &Path,
        graph: &mut InheritanceGraph,
    ) -> Result<Arc<AttributeSchema>> {
        trace!("Loading schema from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        self.register_parsed(Self::parse_yaml(&content)?, graph)
    }

    fn register_parsed(
        &self,
        (schema, extends): (AttributeSchema, Option<String>),
        graph: &mut InheritanceGraph,
    ) -> Result<Arc<AttributeSchema>> {
        let schema = match extends {
            Some(parent_name) => {
                let child_name = schema.type_name().to_string();
                if graph.would_create_cycle(&child_name, &parent_name) {
                    return Err(Error::Inheritance(format!(
                        "Circular dependency detected: {child_name} -> {parent_name}"
                    )));
                }
                graph.add_edge(&child_name, &parent_name);

                let parent = match self.load_resolving(&parent_name, graph) {
                    Ok(parent) => parent,
                    Err(Error::NotFound(_)) => {
                        return Err(Error::Inheritance(format!(
                            "Parent schema not found: {parent_name} (referenced by {child_name})"
                        )));
                    }
                    Err(e) => return Err(e),
                };
                info!(
                    "Merged {} into schema: {} (ancestors: {:?})",
                    parent_name,
                    child_name,
                    graph.ancestors(&child_name)
                );
                merge_schemas(&parent, &schema)
            }
            None => schema,
        };

        info!("Registered schema: {}", schema.type_name());
        Ok(self.registry.register(schema))
    }

    fn parse_yaml(yaml: &str) -> Result<(AttributeSchema, Option<String>)> {
        let file: SchemaFile = serde_yaml::from_str(yaml)
            .map_err(|e| Error::Parse(format!("YAML parse error: {e}")))?;

        let mut schema = AttributeSchema::new(file.name);
        for entry in file.attributes {
            let (name, options) = match entry {
                AttributeEntry::Name(name) => (name, AttributeOptions::new()),
                AttributeEntry::Full(attribute) => attribute.into_options()?,
            };
            schema.declare(name, options);
        }
        if file.untranslated {
            schema.dont_translate_error_messages();
        }
        Ok((schema, file.extends))
    }

    fn find_file(&self, type_name: &str) -> Result<PathBuf> {
        let lower = type_name.to_lowercase();
        let variations = [
            format!("{type_name}.yaml"),
            format!("{type_name}.yml"),
            format!("{lower}.yaml"),
            format!("{lower}.yml"),
        ];

        for path in &self.schema_paths {
            for variation in &variations {
                let file_path = path.join(variation);
                if file_path.exists() {
                    trace!("Found schema file: {:?}", file_path);
                    return Ok(file_path);
                }
            }
        }

        Err(Error::NotFound(format!(
            "Schema {} not found in search paths: {:?}",
            type_name, self.schema_paths
        )))
    }
}

impl Default for SchemaLoader {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
