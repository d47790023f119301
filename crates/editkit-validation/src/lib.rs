#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # editkit-validation
//!
//! Validation gate and error reporting for edit sessions.
//!
//! This crate does not ship a rule engine. Rules are supplied by callers
//! through the [`Validator`] trait; the crate provides the error collection
//! they write into, the translation of symbolic error codes into messages,
//! and the gate an editor consults before persisting.
//!
//! ## Example Usage
//!
//! ```rust
//! use editkit_validation::{ErrorEntry, PresenceOf, ValidationGate, Validators};
//! use editkit_value::{Attributes, Value};
//!
//! let validators = Validators::new().with(PresenceOf::new(["name"]));
//! let mut gate = ValidationGate::new(validators, false);
//!
//! let mut attributes = Attributes::new();
//! attributes.insert("name".to_string(), Value::Null);
//!
//! assert!(!gate.run(&attributes));
//! assert_eq!(gate.errors().get("name"), vec![ErrorEntry::text("can't be blank")]);
//! ```

pub mod errors;
pub mod gate;
pub mod messages;
pub mod rules;

pub use errors::{ErrorEntry, ErrorSet};
pub use gate::{Validatable, ValidationGate};
pub use messages::{Message, MessageCatalog};
pub use rules::{FnValidator, PresenceOf, Validator, Validators};
