#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # editkit-value
//!
//! Attribute values, record identifiers and the backing record contract.
//!
//! Everything an edit session reads from or hands to its collaborators is
//! expressed in these types, so the schema, validation and session crates
//! never need to know the concrete domain record they operate on.

/// Record identifiers and their URL-parameter form.
pub mod id;
/// The backing record contract and a field-map implementation.
pub mod record;
/// Dynamically typed attribute values.
pub mod value;

/// Identifier of a backing record.
pub use id::RecordId;
/// Backing record contract plus the generic field-map record.
pub use record::{FieldRecord, Record};
/// Value primitives and the attribute map alias.
pub use value::{Attributes, Value};

use thiserror::Error;

/// Errors that can occur when converting values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("Invalid record id: {0}")]
    InvalidId(String),
}

impl Error {
    /// Build a type-mismatch error from the expected and actual type names.
    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Crate-local result type for value conversions.
pub type Result<T> = std::result::Result<T, Error>;
