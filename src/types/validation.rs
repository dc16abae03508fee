//! Validation result types.
//!
//! - [`ViolationKind`] - the structural findings the validator can report
//! - [`Violation`] - a single finding located by path
//! - [`ValidationResult`] - overall verdict for one resource

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

use super::path::ElementPath;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationKind {
    DiscriminatorMismatch,
    MissingRequiredField,
    CardinalityViolation,
    MissingRequiredChoice,
    AmbiguousChoice,
    UnknownField,
}

impl ViolationKind {
    /// Stable code surfaced to API consumers.
    pub fn code(self) -> &'static str {
        match self {
            ViolationKind::DiscriminatorMismatch => "FC1001",
            ViolationKind::MissingRequiredField => "FC1002",
            ViolationKind::CardinalityViolation => "FC1003",
            ViolationKind::MissingRequiredChoice => "FC1004",
            ViolationKind::AmbiguousChoice => "FC1005",
            ViolationKind::UnknownField => "FC1006",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ViolationKind::DiscriminatorMismatch => "discriminator-mismatch",
            ViolationKind::MissingRequiredField => "missing-required-field",
            ViolationKind::CardinalityViolation => "cardinality-violation",
            ViolationKind::MissingRequiredChoice => "missing-required-choice",
            ViolationKind::AmbiguousChoice => "ambiguous-choice",
            ViolationKind::UnknownField => "unknown-field",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single structural non-conformance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Violation {
    pub kind: ViolationKind,
    pub path: ElementPath,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub expected: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub got: Option<JsonValue>,
    /// Populated choice members, for ambiguous choices.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub members: Vec<String>,
}

impl Violation {
    pub fn new(kind: ViolationKind, path: ElementPath, message: impl Into<String>) -> Self {
        Self {
            kind,
            path,
            message: message.into(),
            expected: None,
            got: None,
            members: Vec::new(),
        }
    }

    pub fn discriminator_mismatch(path: ElementPath, field: &str, expected: &str, got: Option<&str>) -> Self {
        let message = match got {
            Some(got) => format!("{field} must be {expected}, got {got}"),
            None => format!("{field} must be {expected}, but it is missing"),
        };
        let mut violation = Self::new(ViolationKind::DiscriminatorMismatch, path, message);
        violation.expected = Some(JsonValue::from(expected));
        violation.got = got.map(JsonValue::from);
        violation
    }

    pub fn missing_required_field(path: ElementPath, field: &str) -> Self {
        Self::new(
            ViolationKind::MissingRequiredField,
            path,
            format!("Required element {field} is missing"),
        )
    }

    pub fn cardinality(path: ElementPath, field: &str, min: u32, max: Option<u32>, actual: usize) -> Self {
        let bound = match max {
            Some(max) => format!("{min}..{max}"),
            None => format!("{min}..*"),
        };
        let mut violation = Self::new(
            ViolationKind::CardinalityViolation,
            path,
            format!("Element {field} has {actual} entries, expected {bound}"),
        );
        violation.expected = Some(JsonValue::from(bound));
        violation.got = Some(JsonValue::from(actual));
        violation
    }

    pub fn missing_required_choice(path: ElementPath, group: &str, members: &[String]) -> Self {
        let mut violation = Self::new(
            ViolationKind::MissingRequiredChoice,
            path,
            format!("Exactly one of {} must be present for {group}", members.join(", ")),
        );
        violation.expected = Some(JsonValue::from(members.to_vec()));
        violation
    }

    pub fn ambiguous_choice(path: ElementPath, group: &str, populated: Vec<String>) -> Self {
        let mut violation = Self::new(
            ViolationKind::AmbiguousChoice,
            path,
            format!(
                "Only one alternative may be present for {group}, found {}",
                populated.join(", ")
            ),
        );
        violation.members = populated;
        violation
    }

    pub fn unknown_field(path: ElementPath, field: &str) -> Self {
        Self::new(
            ViolationKind::UnknownField,
            path,
            format!("Element {field} is unknown"),
        )
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} at {}: {}", self.kind.code(), self.kind, self.path, self.message)
    }
}

/// Result of validating one resource tree.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ValidationResult {
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub violations: Vec<Violation>,
}

impl ValidationResult {
    pub fn success() -> Self {
        Self {
            valid: true,
            violations: Vec::new(),
        }
    }

    pub fn from_violations(violations: Vec<Violation>) -> Self {
        Self {
            valid: violations.is_empty(),
            violations,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn first(&self) -> Option<&Violation> {
        self.violations.first()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn of_kind(&self, kind: ViolationKind) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.kind == kind)
    }
}
