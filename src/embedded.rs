//! Precompiled type descriptors for the FHIR R4 core types the crate ships
//! with. The bundle is decoded once, on first use, into a process-wide
//! read-only registry.

use crate::registry::SchemaRegistry;
use crate::types::TypeDescriptor;
use once_cell::sync::Lazy;

pub static R4_CORE_SCHEMAS: &[u8] = include_bytes!("../precompiled_schemas/r4_core.json");

static R4_CORE_REGISTRY: Lazy<SchemaRegistry> = Lazy::new(|| {
    SchemaRegistry::from_json_slice(R4_CORE_SCHEMAS).unwrap_or_else(|e| {
        tracing::error!("Failed to load embedded R4 core schemas: {e}");
        SchemaRegistry::default()
    })
});

/// Registry of the bundled R4 core descriptors.
pub fn core_registry() -> &'static SchemaRegistry {
    &R4_CORE_REGISTRY
}

pub fn get_descriptor(type_name: &str) -> Option<&'static TypeDescriptor> {
    core_registry().get(type_name)
}

pub fn has_type(type_name: &str) -> bool {
    core_registry().contains(type_name)
}

/// Names of the bundled resource types, sorted.
pub fn list_resources() -> Vec<&'static str> {
    core_registry().resource_types()
}

/// Raw descriptors, for callers that want to extend the bundled set with
/// their own types before freezing a registry.
pub fn core_descriptors() -> crate::error::Result<Vec<TypeDescriptor>> {
    Ok(serde_json::from_slice(R4_CORE_SCHEMAS)?)
}
