//! Schema inheritance and merge logic

use crate::model::AttributeSchema;
use std::collections::HashMap;

/// Parent links recorded while resolving an `extends` chain
///
/// Each schema extends at most one parent, so a cycle exists exactly when
/// walking up from the proposed parent reaches the child again.
#[derive(Debug, Default)]
pub struct InheritanceGraph {
    parents: HashMap<String, String>,
}

impl InheritanceGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `child` extends `parent`
    pub fn add_edge(&mut self, child: impl Into<String>, parent: impl Into<String>) {
        self.parents.insert(child.into(), parent.into());
    }

    /// Whether letting `child` extend `parent` closes a loop
    #[must_use]
    pub fn would_create_cycle(&self, child: &str, parent: &str) -> bool {
        let mut ancestor = Some(parent);
        let mut steps = 0;
        while let Some(name) = ancestor {
            if name == child {
                return true;
            }
            // A loop not involving `child` was recorded earlier.
            if steps > self.parents.len() {
                return true;
            }
            ancestor = self.parents.get(name).map(String::as_str);
            steps += 1;
        }
        false
    }

    /// Ancestors of `name`, nearest first
    #[must_use]
    pub fn ancestors(&self, name: &str) -> Vec<&str> {
        let mut chain = Vec::new();
        let mut current = self.parents.get(name);
        while let Some(parent) = current {
            if chain.contains(&parent.as_str()) || parent == name {
                break;
            }
            chain.push(parent.as_str());
            current = self.parents.get(parent);
        }
        chain
    }
}

/// Merge a parent schema into a child schema
///
/// The result lists the parent's definitions first, in the parent's order,
/// with any the child redeclares replaced in place; definitions only the
/// child has follow in the child's order. The untranslated flag is inherited.
#[must_use]
pub fn merge_schemas(parent: &AttributeSchema, child: &AttributeSchema) -> AttributeSchema {
    let mut merged = AttributeSchema::new(child.type_name());
    merged.set_parent(parent.type_name());

    for definition in parent.iter() {
        let winner = child.get(definition.name()).unwrap_or(definition);
        merged.declare(winner.name(), winner.options().clone());
    }
    for definition in child.iter() {
        if !parent.contains(definition.name()) {
            merged.declare(definition.name(), definition.options().clone());
        }
    }

    if parent.untranslated() || child.untranslated() {
        merged.dont_translate_error_messages();
    }
    merged
}

/// Apply a full inheritance chain, most general schema first
#[must_use]
pub fn apply_inheritance_chain(chain: &[&AttributeSchema]) -> Option<AttributeSchema> {
    let (first, rest) = chain.split_first()?;
    let mut result = (*first).clone();
    for child in rest {
        result = merge_schemas(&result, child);
    }
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AttributeOptions;
    use crate::source::SourceExpression;

    fn schema(name: &str, attributes: &[&str]) -> AttributeSchema {
        AttributeSchema::builder(name)
            .attributes(attributes.iter().copied())
            .build()
    }

    #[test]
    fn test_merge_schemas() {
        let parent = schema("Parent", &["name"]);
        let child = schema("Child", &["password"]);

        let merged = merge_schemas(&parent, &child);

        assert_eq!(merged.type_name(), "Child");
        assert_eq!(merged.parent(), Some("Parent"));
        assert_eq!(merged.names(), vec!["name", "password"]);
    }

    #[test]
    fn test_override_properties() {
        let parent = schema("Parent", &["name", "description"]);
        let child = AttributeSchema::builder("Child")
            .attribute("description", AttributeOptions::new().from("related"))
            .build();

        let merged = merge_schemas(&parent, &child);

        assert_eq!(merged.names(), vec!["name", "description"]);
        assert_eq!(
            merged.get("description").unwrap().source(),
            &SourceExpression::parse("related")
        );
    }

    #[test]
    fn test_parent_is_not_modified() {
        let parent = schema("Parent", &["name"]);
        let child = schema("Child", &["password"]);

        let _ = merge_schemas(&parent, &child);

        assert_eq!(parent.names(), vec!["name"]);
    }

    #[test]
    fn test_apply_inheritance_chain() {
        let base = schema("Base", &["id_label"]);
        let level1 = schema("Level1", &["name"]);
        let level2 = schema("Level2", &["password"]);

        let result = apply_inheritance_chain(&[&base, &level1, &level2]).unwrap();

        assert_eq!(result.type_name(), "Level2");
        assert_eq!(result.names(), vec!["id_label", "name", "password"]);
        assert!(apply_inheritance_chain(&[]).is_none());
    }

    #[test]
    fn test_untranslated_is_inherited() {
        let parent = AttributeSchema::builder("Parent")
            .dont_translate_error_messages()
            .build();
        let merged = merge_schemas(&parent, &schema("Child", &["name"]));
        assert!(merged.untranslated());
    }

    #[test]
    fn test_circular_dependency_detection() {
        let mut graph = InheritanceGraph::new();
        graph.add_edge("A", "B");
        graph.add_edge("B", "C");

        assert!(graph.would_create_cycle("C", "A"));
        assert!(!graph.would_create_cycle("A", "D"));
        assert!(graph.would_create_cycle("A", "A"));
        assert_eq!(graph.ancestors("A"), vec!["B", "C"]);
        assert!(graph.ancestors("C").is_empty());
    }
}
