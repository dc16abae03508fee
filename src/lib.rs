//! # fhir-conformance
//!
//! Structural conformance checking for FHIR resources.
//!
//! Resources are described by declarative [`TypeDescriptor`]s held in a
//! [`SchemaRegistry`]. The [`Validator`] walks a populated [`ResourceTree`]
//! against those descriptors and reports every missing required field,
//! cardinality breach, wrong discriminator and unresolved or ambiguous
//! choice element as a [`Violation`] located by its [`ElementPath`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fhir_conformance::*;
//!
//! # fn example() -> Result<()> {
//! let registry = embedded::core_registry();
//! let validator = Validator::new(registry);
//!
//! let patient = ResourceTree::resource("Patient")
//!     .with("active", true)
//!     .with("deceasedBoolean", false);
//! let result = validator.validate(&patient, "Patient")?;
//! assert!(result.is_valid());
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`types`] - descriptors, resource trees, paths and results
//! - [`registry`] - the schema registry and its builder
//! - [`validation`] - the validation walk
//! - [`embedded`] - bundled FHIR R4 core descriptors
//! - [`config`] - validator configuration

pub mod config;
pub mod embedded;
pub mod error;
pub mod registry;
pub mod types;
pub mod validation;

pub use config::{DEFAULT_MAX_DEPTH, ValidationMode, ValidatorConfig};
pub use error::{FhirConformanceError, Result};
pub use registry::{RegistryStats, SchemaRegistry, SchemaRegistryBuilder};
pub use types::{
    ChoiceGroup, DEFAULT_DISCRIMINATOR_FIELD, Discriminator, ElementPath, FieldDescriptor,
    FieldKind, PathSegment, ResourceTree, Scalar, TypeDescriptor, ValidationResult, Value,
    Violation, ViolationKind,
};
pub use validation::Validator;
