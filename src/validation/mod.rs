//! Structural validation engine.
//!
//! Walks a [`ResourceTree`] depth-first, pre-order, against the descriptors
//! held by a [`SchemaRegistry`]. Structural findings are collected as
//! [`Violation`]s; only configuration and producer errors (unknown type,
//! shape mismatch, depth limit) abort the walk with an `Err`.

use serde_json::Value as JsonValue;
use std::ops::ControlFlow;

use crate::config::{ValidationMode, ValidatorConfig};
use crate::error::{FhirConformanceError, Result};
use crate::registry::SchemaRegistry;
use crate::types::{
    ChoiceGroup, DEFAULT_DISCRIMINATOR_FIELD, ElementPath, FieldDescriptor, FieldKind,
    ResourceTree, Scalar, TypeDescriptor, ValidationResult, Value, Violation,
};

/// Outcome of one walk step: keep going, or stop because fail-fast mode
/// has recorded its violation.
type Flow = ControlFlow<()>;

/// Validates resource trees against a schema registry.
///
/// Cheap to construct and holds no state between calls; a single instance
/// can be shared across threads.
#[derive(Debug, Clone)]
pub struct Validator<'r> {
    registry: &'r SchemaRegistry,
    config: ValidatorConfig,
}

impl<'r> Validator<'r> {
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self::with_config(registry, ValidatorConfig::default())
    }

    pub fn with_config(registry: &'r SchemaRegistry, config: ValidatorConfig) -> Self {
        Self { registry, config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn registry(&self) -> &'r SchemaRegistry {
        self.registry
    }

    /// Validates `tree` as an instance of `type_name`.
    ///
    /// # Errors
    /// `UnknownType` when the registry has no descriptor for a type the walk
    /// needs, `ShapeMismatch` when a value's shape contradicts its field kind,
    /// and `DepthLimitExceeded` past the configured nesting limit.
    ///
    /// Exceeding the depth limit aborts the call with no partial result.
    /// [`FhirConformanceError::is_configuration_error`] is false for it, so
    /// callers can tell a rejected document from a broken schema.
    pub fn validate(&self, tree: &ResourceTree, type_name: &str) -> Result<ValidationResult> {
        let descriptor = self.registry.lookup(type_name)?;
        tracing::debug!("Validating {} in {:?} mode", type_name, self.config.mode);

        let mut walk = Walk {
            registry: self.registry,
            config: &self.config,
            path: ElementPath::root(type_name),
            depth: 0,
            violations: Vec::new(),
        };
        walk.node(tree, descriptor)?;

        let result = ValidationResult::from_violations(walk.violations);
        tracing::debug!(
            "Validated {}: {} violation(s)",
            type_name,
            result.violations.len()
        );
        Ok(result)
    }

    /// Converts a JSON document and validates it. Without an explicit type
    /// the document's `resourceType` names it.
    pub fn validate_json(
        &self,
        document: &JsonValue,
        type_name: Option<&str>,
    ) -> Result<ValidationResult> {
        let type_name = match type_name {
            Some(name) => name,
            None => document
                .get(DEFAULT_DISCRIMINATOR_FIELD)
                .and_then(JsonValue::as_str)
                .ok_or_else(|| {
                    FhirConformanceError::invalid_document(
                        "document has no resourceType and no type was given",
                    )
                })?,
        };
        let tree = ResourceTree::from_json(document)?;
        self.validate(&tree, type_name)
    }
}

/// Mutable state of a single validation call.
struct Walk<'a> {
    registry: &'a SchemaRegistry,
    config: &'a ValidatorConfig,
    path: ElementPath,
    depth: usize,
    violations: Vec<Violation>,
}

impl<'a> Walk<'a> {
    fn record(&mut self, violation: Violation) -> Flow {
        tracing::trace!("{}", violation);
        self.violations.push(violation);
        match self.config.mode {
            ValidationMode::FailFast => ControlFlow::Break(()),
            ValidationMode::CollectAll => ControlFlow::Continue(()),
        }
    }

    fn node(&mut self, tree: &ResourceTree, descriptor: &'a TypeDescriptor) -> Result<Flow> {
        if self.depth > self.config.max_depth {
            return Err(FhirConformanceError::depth_limit_exceeded(
                self.path.to_string(),
                self.config.max_depth,
            ));
        }

        // A wrong tag invalidates the whole node; nothing beneath it is checked.
        if let Some(discriminator) = &descriptor.discriminator {
            let tag = tree.get(&discriminator.field);
            let matches = tag
                .and_then(Value::as_scalar)
                .and_then(Scalar::as_str)
                .is_some_and(|value| value.as_bytes() == discriminator.value.as_bytes());
            if !matches {
                let got = tag.map(|value| match value {
                    Value::Scalar(scalar) => scalar.to_string(),
                    other => format!("<{}>", other.shape_name()),
                });
                let violation = Violation::discriminator_mismatch(
                    self.path.clone(),
                    &discriminator.field,
                    &discriminator.value,
                    got.as_deref(),
                );
                return Ok(self.record(violation));
            }
        }

        // Choice groups are checked where their first member is declared.
        let mut visited_groups: Vec<&str> = Vec::new();
        for field in &descriptor.elements {
            let flow = match field.choice_of.as_deref() {
                None => self.field(tree, field)?,
                Some(group_name) if visited_groups.contains(&group_name) => continue,
                Some(group_name) => {
                    visited_groups.push(group_name);
                    match descriptor.choice_group(group_name) {
                        Some(group) => self.choice(tree, descriptor, group)?,
                        None => continue,
                    }
                }
            };
            if flow.is_break() {
                return Ok(flow);
            }
        }

        if self.config.reject_unknown_fields && self.unknown_fields(tree, descriptor).is_break() {
            return Ok(ControlFlow::Break(()));
        }

        Ok(ControlFlow::Continue(()))
    }

    fn field(&mut self, tree: &ResourceTree, field: &FieldDescriptor) -> Result<Flow> {
        match tree.get(&field.name).filter(|value| value.is_populated()) {
            Some(value) => self.value(field, value),
            None if field.is_required() => Ok(self.record(Violation::missing_required_field(
                self.path.child(&field.name),
                &field.name,
            ))),
            None if field.has_minimum() => Ok(self.record(Violation::cardinality(
                self.path.child(&field.name),
                &field.name,
                field.min,
                field.max,
                0,
            ))),
            None => Ok(ControlFlow::Continue(())),
        }
    }

    fn choice(
        &mut self,
        tree: &ResourceTree,
        descriptor: &'a TypeDescriptor,
        group: &ChoiceGroup,
    ) -> Result<Flow> {
        let populated: Vec<&String> = group
            .members
            .iter()
            .filter(|member| tree.is_populated(member))
            .collect();

        match populated.as_slice() {
            [] if group.required => Ok(self.record(Violation::missing_required_choice(
                self.path.child(&group.name),
                &group.name,
                &group.members,
            ))),
            [] => Ok(ControlFlow::Continue(())),
            [member] => match (descriptor.field(member), tree.get(member)) {
                (Some(field), Some(value)) => self.value(field, value),
                _ => Ok(ControlFlow::Continue(())),
            },
            _ => Ok(self.record(Violation::ambiguous_choice(
                self.path.child(&group.name),
                &group.name,
                populated.into_iter().cloned().collect(),
            ))),
        }
    }

    /// Checks a populated value against its field descriptor and descends
    /// into nested nodes.
    fn value(&mut self, field: &FieldDescriptor, value: &Value) -> Result<Flow> {
        match (field.kind, value) {
            (FieldKind::Scalar, Value::Scalar(_)) => Ok(ControlFlow::Continue(())),
            (FieldKind::Object, Value::Node(node)) => {
                self.path.push_field(&field.name);
                let flow = self.descend(node, field);
                self.path.pop();
                flow
            }
            (FieldKind::ScalarList | FieldKind::ObjectList, Value::List(items)) => {
                self.list(field, items)
            }
            (kind, other) => Err(FhirConformanceError::shape_mismatch(
                self.path.child(&field.name).to_string(),
                kind.as_str(),
                other.shape_name(),
            )),
        }
    }

    fn list(&mut self, field: &FieldDescriptor, items: &[Value]) -> Result<Flow> {
        let count = items.len();
        let too_few = count < field.min as usize;
        let too_many = field.max.is_some_and(|max| count > max as usize);
        if (too_few || too_many)
            && self
                .record(Violation::cardinality(
                    self.path.child(&field.name),
                    &field.name,
                    field.min,
                    field.max,
                    count,
                ))
                .is_break()
        {
            return Ok(ControlFlow::Break(()));
        }

        self.path.push_field(&field.name);
        let flow = self.items(field, items);
        self.path.pop();
        flow
    }

    fn items(&mut self, field: &FieldDescriptor, items: &[Value]) -> Result<Flow> {
        for (index, item) in items.iter().enumerate() {
            self.path.push_index(index);
            let flow = match (field.kind, item) {
                (FieldKind::ScalarList, Value::Scalar(_)) => Ok(ControlFlow::Continue(())),
                (FieldKind::ObjectList, Value::Node(node)) => self.descend(node, field),
                (FieldKind::ScalarList, other) => Err(FhirConformanceError::shape_mismatch(
                    self.path.to_string(),
                    "scalar",
                    other.shape_name(),
                )),
                (_, other) => Err(FhirConformanceError::shape_mismatch(
                    self.path.to_string(),
                    "object",
                    other.shape_name(),
                )),
            };
            self.path.pop();
            if flow?.is_break() {
                return Ok(ControlFlow::Break(()));
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    fn descend(&mut self, node: &ResourceTree, field: &FieldDescriptor) -> Result<Flow> {
        let type_name = field.type_name.as_deref().ok_or_else(|| {
            FhirConformanceError::invalid_descriptor(&field.name, "object field without a type")
        })?;
        let descriptor = self.registry.lookup(type_name)?;
        tracing::trace!("Descending into {} as {}", self.path, type_name);

        self.depth += 1;
        let flow = self.node(node, descriptor);
        self.depth -= 1;
        flow
    }

    fn unknown_fields(&mut self, tree: &ResourceTree, descriptor: &TypeDescriptor) -> Flow {
        let discriminator = descriptor.discriminator.as_ref().map(|d| d.field.as_str());
        for (name, _) in tree.fields() {
            if Some(name) == discriminator || descriptor.declares(name) {
                continue;
            }
            // Primitive extensions (`_birthDate`) accompany a declared field.
            if name
                .strip_prefix('_')
                .is_some_and(|base| descriptor.declares(base))
            {
                continue;
            }
            if self
                .record(Violation::unknown_field(self.path.child(name), name))
                .is_break()
            {
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }
}
