//! Validation error set

use crate::messages::{Message, MessageCatalog, humanize};
use std::fmt;

/// A normalized error as read back from an [`ErrorSet`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorEntry {
    /// Raw symbolic code, returned when translation is switched off
    Code(String),
    /// Message text
    Text(String),
}

impl ErrorEntry {
    /// Build a code entry
    pub fn code(code: impl Into<String>) -> Self {
        ErrorEntry::Code(code.into())
    }

    /// Build a text entry
    pub fn text(text: impl Into<String>) -> Self {
        ErrorEntry::Text(text.into())
    }
}

impl fmt::Display for ErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorEntry::Code(code) => write!(f, "{code}"),
            ErrorEntry::Text(text) => write!(f, "{text}"),
        }
    }
}

/// Validation errors of one editor, keyed by attribute name
///
/// Messages are stored as recorded and normalized on read. In untranslated
/// mode symbolic codes come back as [`ErrorEntry::Code`]; computed messages
/// are always evaluated, whatever the mode.
#[derive(Debug, Clone, Default)]
pub struct ErrorSet {
    untranslated: bool,
    catalog: MessageCatalog,
    entries: Vec<(String, Message)>,
}

impl ErrorSet {
    /// Create an empty error set
    #[must_use]
    pub fn new(untranslated: bool) -> Self {
        Self {
            untranslated,
            catalog: MessageCatalog::default(),
            entries: Vec::new(),
        }
    }

    /// Use `catalog` to translate symbolic codes
    #[must_use]
    pub fn with_catalog(mut self, catalog: MessageCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    #[must_use]
    pub fn untranslated(&self) -> bool {
        self.untranslated
    }

    /// Record an error on an attribute
    pub fn add(&mut self, attribute: impl Into<String>, message: impl Into<Message>) {
        self.entries.push((attribute.into(), message.into()));
    }

    /// Errors recorded on an attribute, in recording order
    #[must_use]
    pub fn get(&self, attribute: &str) -> Vec<ErrorEntry> {
        self.entries
            .iter()
            .filter(|(name, _)| name == attribute)
            .map(|(name, message)| self.normalize(name, message))
            .collect()
    }

    /// Whether an attribute has any error
    #[must_use]
    pub fn contains(&self, attribute: &str) -> bool {
        self.entries.iter().any(|(name, _)| name == attribute)
    }

    /// Attributes with errors, in first-recorded order
    #[must_use]
    pub fn attributes(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for (name, _) in &self.entries {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
        names
    }

    /// Every error as `(attribute, entry)`
    pub fn iter(&self) -> impl Iterator<Item = (&str, ErrorEntry)> + '_ {
        self.entries
            .iter()
            .map(|(name, message)| (name.as_str(), self.normalize(name, message)))
    }

    /// Messages prefixed with the humanized attribute name
    #[must_use]
    pub fn full_messages(&self) -> Vec<String> {
        self.iter()
            .map(|(name, entry)| format!("{} {}", capitalize(&humanize(name)), entry))
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn normalize(&self, attribute: &str, message: &Message) -> ErrorEntry {
        match message {
            Message::Computed(func) => ErrorEntry::Text(func(attribute)),
            Message::Code(code) if self.untranslated => ErrorEntry::Code(code.clone()),
            Message::Code(code) => ErrorEntry::Text(self.catalog.translate(code)),
            Message::Literal(text) => ErrorEntry::Text(text.clone()),
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_before_adding() {
        let errors = ErrorSet::new(false);
        assert!(errors.is_empty());
        assert!(errors.get("name").is_empty());
    }

    #[test]
    fn test_translated_code() {
        let mut errors = ErrorSet::new(false);
        errors.add("name", Message::code("blank"));
        assert_eq!(errors.get("name"), vec![ErrorEntry::text("can't be blank")]);
        assert_eq!(errors.full_messages(), vec!["Name can't be blank"]);
    }

    #[test]
    fn test_untranslated_code() {
        let mut errors = ErrorSet::new(true);
        errors.add("name", Message::code("blank"));
        assert_eq!(errors.get("name"), vec![ErrorEntry::code("blank")]);
    }

    #[test]
    fn test_literal_message_is_kept_in_both_modes() {
        for untranslated in [false, true] {
            let mut errors = ErrorSet::new(untranslated);
            errors.add("password", "overridden message");
            assert_eq!(
                errors.get("password"),
                vec![ErrorEntry::text("overridden message")]
            );
        }
    }

    #[test]
    fn test_computed_message_passes_through_untranslated() {
        let mut errors = ErrorSet::new(true);
        errors.add(
            "valid_from",
            Message::computed(|attr| format!("{attr} is in the past")),
        );
        assert_eq!(
            errors.get("valid_from"),
            vec![ErrorEntry::text("valid_from is in the past")]
        );
    }

    #[test]
    fn test_attributes_and_clear() {
        let mut errors = ErrorSet::new(false);
        errors.add("name", Message::code("blank"));
        errors.add("email", Message::code("invalid"));
        errors.add("name", Message::code("too_short"));

        assert_eq!(errors.attributes(), vec!["name", "email"]);
        assert_eq!(errors.get("name").len(), 2);
        assert_eq!(errors.len(), 3);

        errors.clear();
        assert!(errors.is_empty());
        assert!(!errors.contains("name"));
    }

    #[test]
    fn test_custom_catalog() {
        let catalog = MessageCatalog::new().with_message("blank", "required");
        let mut errors = ErrorSet::new(false).with_catalog(catalog);
        errors.add("name", Message::code("blank"));
        assert_eq!(errors.get("name")[0].to_string(), "required");
    }
}
