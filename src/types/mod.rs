//! Core type definitions.
//!
//! - [`schema`] - type and field descriptors making up the schema model
//! - [`tree`] - the resource tree handed to the validator
//! - [`path`] - element paths locating nodes inside a tree
//! - [`validation`] - violations and validation results

pub mod path;
pub mod schema;
pub mod tree;
pub mod validation;

pub use path::{ElementPath, PathSegment};
pub use schema::{
    ChoiceGroup, DEFAULT_DISCRIMINATOR_FIELD, Discriminator, FieldDescriptor, FieldKind,
    TypeDescriptor,
};
pub use tree::{ResourceTree, Scalar, Value};
pub use validation::{ValidationResult, Violation, ViolationKind};
