use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::error::{FhirConformanceError, Result};

pub const DEFAULT_DISCRIMINATOR_FIELD: &str = "resourceType";

/// Shape of the value a field holds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    Scalar,
    Object,
    ScalarList,
    ObjectList,
}

impl FieldKind {
    pub fn is_list(self) -> bool {
        matches!(self, FieldKind::ScalarList | FieldKind::ObjectList)
    }

    /// Object-valued kinds carry a nested type name.
    pub fn is_object_valued(self) -> bool {
        matches!(self, FieldKind::Object | FieldKind::ObjectList)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Scalar => "scalar",
            FieldKind::Object => "object",
            FieldKind::ScalarList => "scalar-list",
            FieldKind::ObjectList => "object-list",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One declared field of a type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub min: u32,
    /// `None` means unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(rename = "choiceOf", default, skip_serializing_if = "Option::is_none")]
    pub choice_of: Option<String>,
}

impl FieldDescriptor {
    fn with_kind(name: impl Into<String>, kind: FieldKind, type_name: Option<String>) -> Self {
        let max = if kind.is_list() { None } else { Some(1) };
        Self {
            name: name.into(),
            kind,
            required: false,
            min: 0,
            max,
            type_name,
            choice_of: None,
        }
    }

    pub fn scalar(name: impl Into<String>) -> Self {
        Self::with_kind(name, FieldKind::Scalar, None)
    }

    pub fn object(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::with_kind(name, FieldKind::Object, Some(type_name.into()))
    }

    pub fn scalar_list(name: impl Into<String>) -> Self {
        Self::with_kind(name, FieldKind::ScalarList, None)
    }

    pub fn object_list(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::with_kind(name, FieldKind::ObjectList, Some(type_name.into()))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_cardinality(mut self, min: u32, max: Option<u32>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn with_choice_of(mut self, group: impl Into<String>) -> Self {
        self.choice_of = Some(group.into());
        self
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Whether an absent value falls short of the declared minimum.
    pub fn has_minimum(&self) -> bool {
        self.min > 0
    }

    /// Upper bound on repetitions; single-valued kinds are capped at one.
    pub fn effective_max(&self) -> Option<u32> {
        if self.kind.is_list() {
            self.max
        } else {
            Some(self.max.unwrap_or(1))
        }
    }

    pub fn is_choice_member(&self) -> bool {
        self.choice_of.is_some()
    }
}

/// A named exactly-one-of-N group of alternative fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChoiceGroup {
    pub name: String,
    pub members: Vec<String>,
    #[serde(default)]
    pub required: bool,
}

impl ChoiceGroup {
    pub fn new<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            members: members.into_iter().map(Into::into).collect(),
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Literal tag a resource node must carry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Discriminator {
    #[serde(default = "default_discriminator_field")]
    pub field: String,
    pub value: String,
}

fn default_discriminator_field() -> String {
    DEFAULT_DISCRIMINATOR_FIELD.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Discriminator>,
    #[serde(default)]
    pub elements: Vec<FieldDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<ChoiceGroup>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            discriminator: None,
            elements: Vec::new(),
            choices: Vec::new(),
        }
    }

    /// A top-level resource whose `resourceType` must equal its own name.
    pub fn resource(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(name.clone()).with_discriminator(DEFAULT_DISCRIMINATOR_FIELD, name)
    }

    pub fn with_discriminator(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.discriminator = Some(Discriminator {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.elements.push(field);
        self
    }

    pub fn with_choice(mut self, group: ChoiceGroup) -> Self {
        self.choices.push(group);
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.elements.iter().find(|f| f.name == name)
    }

    pub fn choice_group(&self, name: &str) -> Option<&ChoiceGroup> {
        self.choices.iter().find(|g| g.name == name)
    }

    pub fn declares(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Nested type names referenced by object-valued fields.
    pub fn referenced_types(&self) -> impl Iterator<Item = (&str, &str)> {
        self.elements
            .iter()
            .filter_map(|f| f.type_name.as_deref().map(|t| (f.name.as_str(), t)))
    }

    /// Checks the descriptor's internal consistency.
    pub fn validate_structure(&self) -> Result<()> {
        let invalid = |message: String| FhirConformanceError::invalid_descriptor(&self.name, message);

        if self.name.is_empty() {
            return Err(invalid("type name cannot be empty".to_string()));
        }

        if let Some(discriminator) = &self.discriminator {
            if discriminator.field.is_empty() || discriminator.value.is_empty() {
                return Err(invalid("discriminator field and value cannot be empty".to_string()));
            }
            if self.declares(&discriminator.field) {
                return Err(invalid(format!(
                    "discriminator field {} is also declared as an element",
                    discriminator.field
                )));
            }
        }

        let mut seen = HashSet::new();
        for field in &self.elements {
            if field.name.is_empty() {
                return Err(invalid("field name cannot be empty".to_string()));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(invalid(format!("field {} is declared twice", field.name)));
            }
            if !field.kind.is_list() && field.max.is_some_and(|max| max > 1) {
                return Err(invalid(format!(
                    "field {} is a single {} but allows repetition",
                    field.name, field.kind
                )));
            }
            if let Some(max) = field.effective_max()
                && field.min > max
            {
                return Err(invalid(format!(
                    "field {} has min {} greater than max {}",
                    field.name, field.min, max
                )));
            }
            match (field.kind.is_object_valued(), &field.type_name) {
                (true, None) => {
                    return Err(invalid(format!(
                        "field {} of kind {} has no nested type",
                        field.name, field.kind
                    )));
                }
                (false, Some(type_name)) => {
                    return Err(invalid(format!(
                        "scalar field {} cannot reference type {type_name}",
                        field.name
                    )));
                }
                _ => {}
            }
            if let Some(group) = &field.choice_of {
                match self.choice_group(group) {
                    None => {
                        return Err(invalid(format!(
                            "field {} belongs to undeclared choice group {group}",
                            field.name
                        )));
                    }
                    Some(declared) if !declared.members.contains(&field.name) => {
                        return Err(invalid(format!(
                            "field {} claims choice group {group} but is not listed among its members",
                            field.name
                        )));
                    }
                    Some(_) => {}
                }
                if field.required {
                    return Err(invalid(format!(
                        "choice member {} cannot be individually required",
                        field.name
                    )));
                }
            }
        }

        let mut groups = HashSet::new();
        for group in &self.choices {
            if !groups.insert(group.name.as_str()) {
                return Err(invalid(format!("choice group {} is declared twice", group.name)));
            }
            if group.members.is_empty() {
                return Err(invalid(format!("choice group {} has no members", group.name)));
            }
            let mut listed = HashSet::new();
            for member in &group.members {
                if !listed.insert(member.as_str()) {
                    return Err(invalid(format!(
                        "choice group {} lists {member} more than once",
                        group.name
                    )));
                }
                match self.field(member) {
                    Some(field) if field.choice_of.as_deref() == Some(group.name.as_str()) => {}
                    Some(_) => {
                        return Err(invalid(format!(
                            "field {member} is listed in choice group {} but not marked as its member",
                            group.name
                        )));
                    }
                    None => {
                        return Err(invalid(format!(
                            "choice group {} lists undeclared field {member}",
                            group.name
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeDescriptor({})", self.name)?;
        if let Some(discriminator) = &self.discriminator {
            write!(f, " [{}={}]", discriminator.field, discriminator.value)?;
        }
        Ok(())
    }
}
