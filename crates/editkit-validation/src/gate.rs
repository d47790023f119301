//! Validation gate

use crate::errors::ErrorSet;
use crate::messages::MessageCatalog;
use crate::rules::Validator;
use editkit_value::Attributes;
use std::fmt;
use tracing::trace;

/// Something that can be checked before it is persisted
pub trait Validatable {
    type Error;

    /// Run validations, refreshing [`Validatable::errors`]
    ///
    /// # Errors
    ///
    /// Returns an error when the values to validate cannot be produced.
    fn valid(&mut self) -> Result<bool, Self::Error>;

    /// Errors from the last validation run
    fn errors(&self) -> &ErrorSet;

    /// Whether the last run, if any, left no errors
    fn without_error(&self) -> bool {
        self.errors().is_empty()
    }

    /// Whether a blank `attribute` fails validation
    fn mandatory(&self, attribute: &str) -> bool;
}

/// A validator together with the error set it writes into
pub struct ValidationGate {
    validator: Box<dyn Validator>,
    errors: ErrorSet,
}

impl ValidationGate {
    /// Create a gate; `untranslated` keeps symbolic codes raw
    pub fn new(validator: impl Validator + 'static, untranslated: bool) -> Self {
        Self {
            validator: Box::new(validator),
            errors: ErrorSet::new(untranslated),
        }
    }

    /// Translate symbolic codes through `catalog`
    #[must_use]
    pub fn with_catalog(mut self, catalog: MessageCatalog) -> Self {
        self.errors = self.errors.with_catalog(catalog);
        self
    }

    /// Validate `attributes`, replacing previous errors
    pub fn run(&mut self, attributes: &Attributes) -> bool {
        self.errors.clear();
        self.validator.validate(attributes, &mut self.errors);
        trace!(error_count = self.errors.len(), "Validation finished");
        self.errors.is_empty()
    }

    #[must_use]
    pub fn errors(&self) -> &ErrorSet {
        &self.errors
    }

    /// Whether the validator rejects a blank `attribute`
    #[must_use]
    pub fn mandatory(&self, attribute: &str) -> bool {
        self.validator.requires_presence(attribute)
    }
}

impl fmt::Debug for ValidationGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationGate")
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorEntry;
    use crate::rules::{PresenceOf, Validators};
    use editkit_value::Value;

    #[test]
    fn test_run_replaces_previous_errors() {
        let mut gate = ValidationGate::new(PresenceOf::new(["name"]), false);
        let mut attributes = Attributes::new();
        attributes.insert("name".to_string(), Value::Null);

        assert!(!gate.run(&attributes));
        assert_eq!(gate.errors().len(), 1);

        attributes.insert("name".to_string(), Value::from("Anthony"));
        assert!(gate.run(&attributes));
        assert!(gate.errors().is_empty());
    }

    #[test]
    fn test_untranslated_gate() {
        let mut gate = ValidationGate::new(PresenceOf::new(["name"]), true);
        gate.run(&Attributes::new());
        assert_eq!(gate.errors().get("name"), vec![ErrorEntry::code("blank")]);
    }

    #[test]
    fn test_empty_validators_always_pass() {
        let mut gate = ValidationGate::new(Validators::new(), false);
        assert!(gate.run(&Attributes::new()));
        assert!(!gate.mandatory("name"));
    }
}
