//! Error messages and their translation

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Type alias for a message computed from the attribute name
pub type MessageFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// A validation message as recorded by a validator
#[derive(Clone)]
pub enum Message {
    /// Symbolic code such as `blank`, translated through a [`MessageCatalog`]
    Code(String),
    /// Fixed text supplied by the validator
    Literal(String),
    /// Text computed from the attribute name when the error is read
    Computed(MessageFn),
}

impl Message {
    /// Symbolic message code
    pub fn code(code: impl Into<String>) -> Self {
        Message::Code(code.into())
    }

    /// Fixed message text
    pub fn literal(text: impl Into<String>) -> Self {
        Message::Literal(text.into())
    }

    /// Message computed when read
    pub fn computed(func: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        Message::Computed(Arc::new(func))
    }

    /// Whether the message is computed when read
    #[must_use]
    pub fn is_computed(&self) -> bool {
        matches!(self, Message::Computed(_))
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Code(code) => f.debug_tuple("Code").field(code).finish(),
            Message::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            Message::Computed(_) => write!(f, "Computed(..)"),
        }
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Message::Literal(text.to_string())
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Message::Literal(text)
    }
}

/// Localized texts for symbolic message codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageCatalog {
    messages: HashMap<String, String>,
}

impl Default for MessageCatalog {
    fn default() -> Self {
        let messages = [
            ("blank", "can't be blank"),
            ("present", "must be blank"),
            ("empty", "can't be empty"),
            ("invalid", "is invalid"),
            ("taken", "has already been taken"),
            ("inclusion", "is not included in the list"),
            ("exclusion", "is reserved"),
            ("too_long", "is too long"),
            ("too_short", "is too short"),
            ("not_a_number", "is not a number"),
            ("confirmation", "doesn't match confirmation"),
        ]
        .into_iter()
        .map(|(code, text)| (code.to_string(), text.to_string()))
        .collect();
        Self { messages }
    }
}

impl MessageCatalog {
    /// Create a catalog with the default English texts
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog without any texts
    #[must_use]
    pub fn empty() -> Self {
        Self {
            messages: HashMap::new(),
        }
    }

    /// Set the text of a code
    #[must_use]
    pub fn with_message(mut self, code: impl Into<String>, text: impl Into<String>) -> Self {
        self.messages.insert(code.into(), text.into());
        self
    }

    /// Text for a code; unknown codes are humanized
    #[must_use]
    pub fn translate(&self, code: &str) -> String {
        self.messages
            .get(code)
            .cloned()
            .unwrap_or_else(|| humanize(code))
    }
}

/// `too_long` → `too long`
pub(crate) fn humanize(name: &str) -> String {
    name.replace('_', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_texts() {
        let catalog = MessageCatalog::new();
        assert_eq!(catalog.translate("blank"), "can't be blank");
        assert_eq!(catalog.translate("custom_code"), "custom code");
    }

    #[test]
    fn test_override_text() {
        let catalog = MessageCatalog::new().with_message("blank", "doit être rempli");
        assert_eq!(catalog.translate("blank"), "doit être rempli");
    }

    #[test]
    fn test_message_kinds() {
        assert!(Message::computed(|attr| format!("{attr}!")).is_computed());
        assert!(!Message::from("text").is_computed());
        assert_eq!(format!("{:?}", Message::code("blank")), r#"Code("blank")"#);
    }
}
