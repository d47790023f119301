//! Schema registry

use crate::model::AttributeSchema;
use dashmap::DashMap;
use std::sync::Arc;

/// Thread-safe registry of schemas by type name
///
/// Schemas are registered once and then shared read-only; lookups hand out
/// `Arc` clones so editors never hold a borrow into the map.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: DashMap<String, Arc<AttributeSchema>>,
}

impl SchemaRegistry {
    /// Create a new empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            schemas: DashMap::new(),
        }
    }

    /// Register a schema under its type name, replacing any previous one
    pub fn register(&self, schema: AttributeSchema) -> Arc<AttributeSchema> {
        let schema = Arc::new(schema);
        self.schemas
            .insert(schema.type_name().to_string(), Arc::clone(&schema));
        schema
    }

    /// Get a schema by type name
    #[must_use]
    pub fn get(&self, type_name: &str) -> Option<Arc<AttributeSchema>> {
        self.schemas.get(type_name).map(|entry| Arc::clone(entry.value()))
    }

    /// Check if a schema exists
    #[must_use]
    pub fn contains(&self, type_name: &str) -> bool {
        self.schemas.contains_key(type_name)
    }

    /// Registered type names, sorted
    #[must_use]
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.schemas.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_register_and_get() {
        let registry = SchemaRegistry::new();
        registry.register(AttributeSchema::builder("UserEditor").attributes(["name"]).build());

        assert!(registry.contains("UserEditor"));
        assert_eq!(registry.get("UserEditor").unwrap().names(), vec!["name"]);
        assert!(registry.get("Missing").is_none());
    }

    #[test]
    fn test_concurrent_registration() {
        let registry = Arc::new(SchemaRegistry::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    registry.register(AttributeSchema::new(format!("Editor{i}")));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.len(), 4);
        assert_eq!(registry.type_names()[0], "Editor0");
    }
}
