//! Attribute schema model

use crate::cast::PersistHint;
use crate::inheritance::merge_schemas;
use crate::source::SourceExpression;
use crate::transforms::Transform;
use crate::{Error, Result};
use editkit_value::Value;

/// Options accepted when declaring an attribute
#[derive(Debug, Clone)]
pub struct AttributeOptions {
    /// Where the default value comes from (default: backing record)
    pub source: SourceExpression,
    /// Applied to raw values on assignment (default: [`Transform::Clean`])
    pub input: Transform,
    /// Applied to resolved defaults (default: [`Transform::Identity`])
    pub output: Transform,
    /// Cast applied when persisting
    pub persist: Option<PersistHint>,
}

impl Default for AttributeOptions {
    fn default() -> Self {
        Self {
            source: SourceExpression::Backing,
            input: Transform::Clean,
            output: Transform::Identity,
            persist: None,
        }
    }
}

impl AttributeOptions {
    /// Create options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the default from a source expression in string notation
    #[must_use]
    pub fn from(mut self, expr: &str) -> Self {
        self.source = SourceExpression::parse(expr);
        self
    }

    /// Declare the attribute without any default
    #[must_use]
    pub fn from_nothing(mut self) -> Self {
        self.source = SourceExpression::Nothing;
        self
    }

    /// Set the source expression
    #[must_use]
    pub fn source(mut self, source: SourceExpression) -> Self {
        self.source = source;
        self
    }

    /// Set the input transform
    #[must_use]
    pub fn input(mut self, transform: Transform) -> Self {
        self.input = transform;
        self
    }

    /// Set the output transform
    #[must_use]
    pub fn output(mut self, transform: Transform) -> Self {
        self.output = transform;
        self
    }

    /// Cast the value with `hint` when persisting
    #[must_use]
    pub fn persist_as(mut self, hint: PersistHint) -> Self {
        self.persist = Some(hint);
        self
    }
}

/// Definition of a single attribute
#[derive(Debug, Clone)]
pub struct AttributeDefinition {
    name: String,
    options: AttributeOptions,
}

impl AttributeDefinition {
    /// Create a definition
    pub fn new(name: impl Into<String>, options: AttributeOptions) -> Self {
        Self {
            name: name.into(),
            options,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn source(&self) -> &SourceExpression {
        &self.options.source
    }

    #[must_use]
    pub fn persist_hint(&self) -> Option<&PersistHint> {
        self.options.persist.as_ref()
    }

    #[must_use]
    pub fn options(&self) -> &AttributeOptions {
        &self.options
    }

    /// Field read on the source object for this attribute's default
    #[must_use]
    pub fn source_field(&self) -> &str {
        self.options.source.field_for(&self.name)
    }

    /// Run the input transform on a raw assigned value
    #[must_use]
    pub fn format_input(&self, raw: Value) -> Value {
        self.options.input.apply(raw)
    }

    /// Run the output transform on a resolved default
    #[must_use]
    pub fn format_output(&self, value: Value) -> Value {
        self.options.output.apply(value)
    }

    /// Cast a current value for persisting
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFormat`] when the persist hint cannot convert the value.
    pub fn format_for_persist(&self, value: Value) -> Result<Value> {
        match &self.options.persist {
            Some(hint) => hint.cast(value),
            None => Ok(value),
        }
    }
}

/// Declarative attribute table of one editor type
///
/// Definitions keep their declaration order; inherited definitions come
/// first. Schemas are immutable once handed to an editor and are shared
/// between every editor of the type.
#[derive(Debug, Clone)]
pub struct AttributeSchema {
    type_name: String,
    parent: Option<String>,
    attributes: Vec<AttributeDefinition>,
    untranslated: bool,
}

impl AttributeSchema {
    /// Create an empty schema for a type
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            parent: None,
            attributes: Vec::new(),
            untranslated: false,
        }
    }

    /// Start building a schema for a type
    pub fn builder(type_name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            schema: Self::new(type_name),
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Name of the schema this one extends
    #[must_use]
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub(crate) fn set_parent(&mut self, parent: impl Into<String>) {
        self.parent = Some(parent.into());
    }

    /// Register or replace a definition
    ///
    /// A replaced definition keeps its original position; the new options
    /// are not merged with the old ones.
    pub fn declare(&mut self, name: impl Into<String>, options: AttributeOptions) -> &mut Self {
        let definition = AttributeDefinition::new(name, options);
        match self
            .attributes
            .iter_mut()
            .find(|existing| existing.name == definition.name)
        {
            Some(existing) => *existing = definition,
            None => self.attributes.push(definition),
        }
        self
    }

    /// Declared attribute names in declaration order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.attributes.iter().map(|d| d.name.as_str()).collect()
    }

    /// Look up a definition
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttributeDefinition> {
        self.attributes.iter().find(|d| d.name == name)
    }

    /// Look up a definition, failing for undeclared names
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSuchAttribute`] when `name` is not declared.
    pub fn definition(&self, name: &str) -> Result<&AttributeDefinition> {
        self.get(name)
            .ok_or_else(|| Error::no_such_attribute(&self.type_name, name))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate over definitions in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &AttributeDefinition> {
        self.attributes.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Whether validation errors stay as raw symbolic codes
    #[must_use]
    pub fn untranslated(&self) -> bool {
        self.untranslated
    }

    /// Keep validation error messages as raw symbolic codes
    pub fn dont_translate_error_messages(&mut self) -> &mut Self {
        self.untranslated = true;
        self
    }
}

/// Fluent builder for [`AttributeSchema`]
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    schema: AttributeSchema,
}

impl SchemaBuilder {
    /// Copy every definition of `parent` into the schema being built
    ///
    /// Definitions declared on the child, before or after this call, win
    /// over inherited ones.
    #[must_use]
    pub fn extends(mut self, parent: &AttributeSchema) -> Self {
        self.schema = merge_schemas(parent, &self.schema);
        self
    }

    /// Declare an attribute
    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>, options: AttributeOptions) -> Self {
        self.schema.declare(name, options);
        self
    }

    /// Declare several attributes with default options
    #[must_use]
    pub fn attributes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.schema.declare(name, AttributeOptions::default());
        }
        self
    }

    /// Keep validation error messages as raw symbolic codes
    #[must_use]
    pub fn dont_translate_error_messages(mut self) -> Self {
        self.schema.dont_translate_error_messages();
        self
    }

    #[must_use]
    pub fn build(self) -> AttributeSchema {
        self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_order_is_kept() {
        let schema = AttributeSchema::builder("Editor")
            .attributes(["name", "password"])
            .attribute("timestamp", AttributeOptions::new().from(".timestamp_str"))
            .build();
        assert_eq!(schema.names(), vec!["name", "password", "timestamp"]);
    }

    #[test]
    fn test_redeclaring_replaces_without_merging() {
        let mut schema = AttributeSchema::builder("Editor")
            .attribute(
                "valid_from",
                AttributeOptions::new().persist_as(PersistHint::Date),
            )
            .attribute("name", AttributeOptions::new())
            .build();
        schema.declare("valid_from", AttributeOptions::new().from_nothing());

        assert_eq!(schema.names(), vec!["valid_from", "name"]);
        let definition = schema.definition("valid_from").unwrap();
        assert!(definition.persist_hint().is_none());
        assert_eq!(definition.source(), &SourceExpression::Nothing);
    }

    #[test]
    fn test_undeclared_name_fails() {
        let schema = AttributeSchema::builder("ObjectEditor").attributes(["name"]).build();
        let err = schema.definition("undefined").unwrap_err();
        assert!(matches!(err, Error::NoSuchAttribute { .. }));
        assert_eq!(err.to_string(), "ObjectEditor has no attribute `undefined`");
    }

    #[test]
    fn test_default_transforms() {
        let definition = AttributeDefinition::new("name", AttributeOptions::default());
        assert_eq!(
            definition.format_input(Value::from("\tInfected\u{88}\u{4}")),
            Value::from("Infected")
        );
        assert_eq!(definition.format_output(Value::Integer(2)), Value::Integer(2));
        assert_eq!(
            definition.format_for_persist(Value::from("2002-13-31")).unwrap(),
            Value::from("2002-13-31")
        );
    }

    #[test]
    fn test_untranslated_flag() {
        let schema = AttributeSchema::builder("Editor")
            .dont_translate_error_messages()
            .build();
        assert!(schema.untranslated());
        assert!(!AttributeSchema::new("Other").untranslated());
    }
}
