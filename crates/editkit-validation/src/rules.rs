//! Validator contract
//!
//! Validators inspect an editor's current attributes and record messages in
//! an [`ErrorSet`]. Presence is the only check shipped here since editors
//! need it to answer which attributes are mandatory; anything else is
//! supplied by the application.

use crate::errors::ErrorSet;
use crate::messages::Message;
use editkit_value::{Attributes, Value};

/// A validation rule over an attribute map
pub trait Validator {
    /// Record errors for invalid attributes
    fn validate(&self, attributes: &Attributes, errors: &mut ErrorSet);

    /// Whether this validator rejects a blank `attribute`
    fn requires_presence(&self, _attribute: &str) -> bool {
        false
    }
}

/// Rejects blank values
#[derive(Debug, Clone)]
pub struct PresenceOf {
    attributes: Vec<String>,
    message: Option<Message>,
}

impl PresenceOf {
    /// Require every named attribute to be present
    pub fn new<I, S>(attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            attributes: attributes.into_iter().map(Into::into).collect(),
            message: None,
        }
    }

    /// Record `message` instead of the `blank` code
    #[must_use]
    pub fn message(mut self, message: impl Into<Message>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl Validator for PresenceOf {
    fn validate(&self, attributes: &Attributes, errors: &mut ErrorSet) {
        for name in &self.attributes {
            if attributes.get(name).is_none_or(Value::is_blank) {
                let message = self
                    .message
                    .clone()
                    .unwrap_or_else(|| Message::code("blank"));
                errors.add(name.clone(), message);
            }
        }
    }

    fn requires_presence(&self, attribute: &str) -> bool {
        self.attributes.iter().any(|name| name == attribute)
    }
}

/// Adapts a closure into a [`Validator`]
pub struct FnValidator<F>(pub F);

impl<F> Validator for FnValidator<F>
where
    F: Fn(&Attributes, &mut ErrorSet),
{
    fn validate(&self, attributes: &Attributes, errors: &mut ErrorSet) {
        (self.0)(attributes, errors);
    }
}

/// Ordered collection of validators run as one
#[derive(Default)]
pub struct Validators {
    validators: Vec<Box<dyn Validator>>,
}

impl Validators {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a validator
    #[must_use]
    pub fn with(mut self, validator: impl Validator + 'static) -> Self {
        self.push(validator);
        self
    }

    /// Append a validator in place
    pub fn push(&mut self, validator: impl Validator + 'static) {
        self.validators.push(Box::new(validator));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl Validator for Validators {
    fn validate(&self, attributes: &Attributes, errors: &mut ErrorSet) {
        for validator in &self.validators {
            validator.validate(attributes, errors);
        }
    }

    fn requires_presence(&self, attribute: &str) -> bool {
        self.validators
            .iter()
            .any(|validator| validator.requires_presence(attribute))
    }
}
