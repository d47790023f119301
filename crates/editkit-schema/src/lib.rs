#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all)]

//! # editkit-schema
//!
//! Attribute schemas for edit sessions.
//!
//! A schema is the static descriptor table of one editor type: which
//! attributes it exposes, where each attribute's default comes from, how raw
//! input is cleaned and how values are cast right before persisting. Schemas
//! are built once, either in code through [`SchemaBuilder`] or from YAML
//! declarations through [`SchemaLoader`], and may extend a parent schema:
//! inherited definitions are copied into the child and can be overridden.

pub mod cast;
pub mod inheritance;
pub mod loader;
pub mod model;
pub mod registry;
pub mod source;
pub mod transforms;

pub use cast::PersistHint;
pub use loader::SchemaLoader;
pub use model::{AttributeDefinition, AttributeOptions, AttributeSchema, SchemaBuilder};
pub use registry::SchemaRegistry;
pub use source::SourceExpression;
pub use transforms::Transform;

use thiserror::Error;

/// Errors that can occur when working with schemas
#[derive(Error, Debug)]
pub enum Error {
    #[error("{type_name} has no attribute `{attribute}`")]
    NoSuchAttribute { type_name: String, attribute: String },

    #[error("Invalid {expected} format: {raw}")]
    InvalidFormat { expected: String, raw: String },

    #[error("Schema not found: {0}")]
    NotFound(String),

    #[error("Inheritance error: {0}")]
    Inheritance(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a missing-attribute error for a schema type.
    pub fn no_such_attribute(type_name: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::NoSuchAttribute {
            type_name: type_name.into(),
            attribute: attribute.into(),
        }
    }

    /// Build a format error carrying the raw value that failed to cast.
    pub fn invalid_format(expected: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::InvalidFormat {
            expected: expected.into(),
            raw: raw.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
