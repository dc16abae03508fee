//! Schema model: the registry of type descriptors.
//!
//! Descriptors are registered into a [`SchemaRegistryBuilder`] during
//! initialization. [`SchemaRegistryBuilder::build`] checks cross-type
//! references and freezes the set into an immutable [`SchemaRegistry`]
//! that can be shared across threads without locking.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{FhirConformanceError, Result};
use crate::types::TypeDescriptor;

#[derive(Debug, Default, Clone)]
pub struct SchemaRegistryBuilder {
    types: HashMap<String, TypeDescriptor>,
}

impl SchemaRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a descriptor. Fails on a duplicate name or a malformed descriptor.
    pub fn register(&mut self, descriptor: TypeDescriptor) -> Result<()> {
        descriptor.validate_structure()?;
        if self.types.contains_key(&descriptor.name) {
            return Err(FhirConformanceError::duplicate_type(&descriptor.name));
        }
        tracing::debug!(
            "Registered type {} with {} fields",
            descriptor.name,
            descriptor.elements.len()
        );
        self.types.insert(descriptor.name.clone(), descriptor);
        Ok(())
    }

    pub fn register_all<I>(&mut self, descriptors: I) -> Result<()>
    where
        I: IntoIterator<Item = TypeDescriptor>,
    {
        for descriptor in descriptors {
            self.register(descriptor)?;
        }
        Ok(())
    }

    pub fn with_type(mut self, descriptor: TypeDescriptor) -> Result<Self> {
        self.register(descriptor)?;
        Ok(self)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Freezes the registry. Every nested type reference must resolve.
    pub fn build(self) -> Result<SchemaRegistry> {
        let mut names: Vec<&String> = self.types.keys().collect();
        names.sort();
        for name in names {
            let descriptor = &self.types[name];
            for (field, target) in descriptor.referenced_types() {
                if !self.types.contains_key(target) {
                    return Err(FhirConformanceError::dangling_type_reference(
                        descriptor.name.as_str(),
                        field,
                        target,
                    ));
                }
            }
        }

        let registry = SchemaRegistry { types: self.types };
        let stats = registry.stats();
        tracing::info!(
            "Schema registry ready: {} types ({} resources, {} complex types, {} choice groups)",
            stats.total_types,
            stats.resource_count,
            stats.complex_count,
            stats.choice_groups
        );
        Ok(registry)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RegistryStats {
    pub total_types: usize,
    pub resource_count: usize,
    pub complex_count: usize,
    pub choice_groups: usize,
}

/// Immutable, process-wide set of type descriptors keyed by type name.
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    types: HashMap<String, TypeDescriptor>,
}

impl SchemaRegistry {
    pub fn builder() -> SchemaRegistryBuilder {
        SchemaRegistryBuilder::new()
    }

    pub fn from_descriptors<I>(descriptors: I) -> Result<Self>
    where
        I: IntoIterator<Item = TypeDescriptor>,
    {
        let mut builder = SchemaRegistryBuilder::new();
        builder.register_all(descriptors)?;
        builder.build()
    }

    /// Loads a JSON array of type descriptors.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let descriptors: Vec<TypeDescriptor> = serde_json::from_str(json)?;
        Self::from_descriptors(descriptors)
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let descriptors: Vec<TypeDescriptor> = serde_json::from_slice(bytes)?;
        Self::from_descriptors(descriptors)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Loading type descriptors from {}", path.display());
        let bytes = fs::read(path)?;
        Self::from_json_slice(&bytes)
    }

    /// Resolves a type name. An unknown name is a configuration error.
    pub fn lookup(&self, type_name: &str) -> Result<&TypeDescriptor> {
        self.types
            .get(type_name)
            .ok_or_else(|| FhirConformanceError::unknown_type(type_name))
    }

    pub fn get(&self, type_name: &str) -> Option<&TypeDescriptor> {
        self.types.get(type_name)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.values()
    }

    /// All registered type names, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Names of types carrying a fixed discriminator, sorted.
    pub fn resource_types(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .types
            .values()
            .filter(|d| d.discriminator.is_some())
            .map(|d| d.name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    pub fn stats(&self) -> RegistryStats {
        let resource_count = self
            .types
            .values()
            .filter(|d| d.discriminator.is_some())
            .count();
        RegistryStats {
            total_types: self.types.len(),
            resource_count,
            complex_count: self.types.len() - resource_count,
            choice_groups: self.types.values().map(|d| d.choices.len()).sum(),
        }
    }
}
