use thiserror::Error;

/// Fatal errors raised by the schema registry and the validator.
///
/// Structural findings about a resource are never reported through this
/// type; they are returned as [`crate::Violation`] records inside a
/// [`crate::ValidationResult`]. Everything here points at a configuration
/// problem or a producer bug.
#[derive(Error, Debug)]
pub enum FhirConformanceError {
    #[error("Unknown type: {type_name}")]
    UnknownType { type_name: String },

    #[error("Type already registered: {type_name}")]
    DuplicateType { type_name: String },

    #[error("Invalid descriptor for {type_name}: {message}")]
    InvalidDescriptor { type_name: String, message: String },

    #[error("Type {type_name} refers to unregistered type {target} in field {field}")]
    DanglingTypeReference {
        type_name: String,
        field: String,
        target: String,
    },

    #[error("Shape mismatch at {path}: expected {expected}, got {got}")]
    ShapeMismatch {
        path: String,
        expected: String,
        got: String,
    },

    #[error("Nesting depth limit of {limit} exceeded at {path}")]
    DepthLimitExceeded { path: String, limit: usize },

    #[error("Invalid document: {message}")]
    InvalidDocument { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FhirConformanceError>;

impl FhirConformanceError {
    pub fn unknown_type<S: Into<String>>(type_name: S) -> Self {
        Self::UnknownType {
            type_name: type_name.into(),
        }
    }

    pub fn duplicate_type<S: Into<String>>(type_name: S) -> Self {
        Self::DuplicateType {
            type_name: type_name.into(),
        }
    }

    pub fn invalid_descriptor<S: Into<String>, M: Into<String>>(type_name: S, message: M) -> Self {
        Self::InvalidDescriptor {
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    pub fn dangling_type_reference<S: Into<String>>(type_name: S, field: S, target: S) -> Self {
        Self::DanglingTypeReference {
            type_name: type_name.into(),
            field: field.into(),
            target: target.into(),
        }
    }

    pub fn shape_mismatch<P: Into<String>, S: Into<String>>(path: P, expected: S, got: S) -> Self {
        Self::ShapeMismatch {
            path: path.into(),
            expected: expected.into(),
            got: got.into(),
        }
    }

    pub fn depth_limit_exceeded<P: Into<String>>(path: P, limit: usize) -> Self {
        Self::DepthLimitExceeded {
            path: path.into(),
            limit,
        }
    }

    pub fn invalid_document<S: Into<String>>(message: S) -> Self {
        Self::InvalidDocument {
            message: message.into(),
        }
    }

    /// True for errors caused by the schema configuration rather than by
    /// the document handed to the validator.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownType { .. }
                | Self::DuplicateType { .. }
                | Self::InvalidDescriptor { .. }
                | Self::DanglingTypeReference { .. }
        )
    }
}
