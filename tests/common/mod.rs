//! Common test utilities for conformance tests.
//!
//! Provides fixture loading and a small hand-built schema registry.

#![allow(dead_code)]

use fhir_conformance::{
    ChoiceGroup, FieldDescriptor, ResourceTree, SchemaRegistry, TypeDescriptor, Value,
};
use serde_json::Value as JsonValue;
use std::fs;
use std::path::{Path, PathBuf};

/// Load all JSON fixtures from a directory.
///
/// # Arguments
/// * `dir` - Relative path to directory from fixtures (e.g., "r4/valid")
///
/// # Returns
/// Vec of (filename, parsed JSON) tuples, sorted by filename
pub fn load_all_fixtures(dir: &str) -> Vec<(String, JsonValue)> {
    let full_path = get_fixtures_dir().join(dir);
    let Ok(entries) = fs::read_dir(&full_path) else {
        return Vec::new();
    };

    let mut fixtures: Vec<(String, JsonValue)> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .filter_map(|path| {
            let content = fs::read_to_string(&path).ok()?;
            let value = serde_json::from_str(&content).ok()?;
            let name = path.file_stem()?.to_str()?.to_string();
            Some((name, value))
        })
        .collect();
    fixtures.sort_by(|a, b| a.0.cmp(&b.0));
    fixtures
}

pub fn get_fixtures_dir() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    Path::new(manifest_dir).join("tests").join("fixtures")
}

/// Registry with a minimal resource exercising every descriptor feature:
///
/// `Order` (resource): `status` required scalar, `Effect` required choice of
/// `EffectDateTime` / `EffectPeriod`, `item` object-list of `OrderItem`
/// with 1..3 entries, `note` optional scalar-list, `dose` optional
/// object `Quantity`.
pub fn order_registry() -> SchemaRegistry {
    SchemaRegistry::from_descriptors([
        TypeDescriptor::new("Period")
            .with_field(FieldDescriptor::scalar("start").required())
            .with_field(FieldDescriptor::scalar("end")),
        TypeDescriptor::new("Quantity")
            .with_field(FieldDescriptor::scalar("value").required())
            .with_field(FieldDescriptor::scalar("unit")),
        TypeDescriptor::new("OrderItem")
            .with_field(FieldDescriptor::scalar("code").required())
            .with_field(FieldDescriptor::scalar("count")),
        TypeDescriptor::resource("Order")
            .with_field(FieldDescriptor::scalar("status").required())
            .with_field(FieldDescriptor::scalar("EffectDateTime").with_choice_of("Effect"))
            .with_field(FieldDescriptor::object("EffectPeriod", "Period").with_choice_of("Effect"))
            .with_field(FieldDescriptor::object_list("item", "OrderItem").with_cardinality(1, Some(3)))
            .with_field(FieldDescriptor::scalar_list("note"))
            .with_field(FieldDescriptor::object("dose", "Quantity"))
            .with_choice(ChoiceGroup::new("Effect", ["EffectDateTime", "EffectPeriod"]).required()),
    ])
    .expect("order registry is well formed")
}

pub fn order_item(code: &str) -> ResourceTree {
    ResourceTree::new().with("code", code).with("count", 1)
}

/// An `Order` conforming exactly to [`order_registry`].
pub fn valid_order() -> ResourceTree {
    ResourceTree::resource("Order")
        .with("status", "active")
        .with("EffectDateTime", "2024-03-01T10:00:00Z")
        .with_list("item", [order_item("A-1"), order_item("B-2")])
        .with_list("note", [Value::from("first"), Value::from("second")])
        .with(
            "dose",
            ResourceTree::new().with("value", 5).with("unit", "mg"),
        )
}

/// A chain of `Extension` nodes nested `depth` levels below the root.
pub fn nested_extensions(depth: usize) -> JsonValue {
    let mut node = serde_json::json!({ "url": "http://example.org/leaf", "valueString": "leaf" });
    for level in 0..depth {
        node = serde_json::json!({
            "url": format!("http://example.org/level-{level}"),
            "extension": [node],
        });
    }
    node
}
