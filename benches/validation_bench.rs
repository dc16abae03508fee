use criterion::{Criterion, criterion_group, criterion_main};
use fhir_conformance::*;
use serde_json::json;
use std::hint::black_box;

fn create_large_schema() -> TypeDescriptor {
    let mut descriptor = TypeDescriptor::resource("Basic");
    for i in 0..100 {
        let mut field = FieldDescriptor::scalar(format!("field{i}"));
        if i % 10 == 0 {
            field = field.required();
        }
        descriptor = descriptor.with_field(field);
    }
    descriptor
}

fn create_large_tree() -> ResourceTree {
    (0..100).fold(ResourceTree::resource("Basic"), |tree, i| {
        tree.with(format!("field{i}"), i)
    })
}

fn blood_pressure(components: usize) -> serde_json::Value {
    let component: Vec<_> = (0..components)
        .map(|i| {
            json!({
                "code": { "coding": [{ "system": "http://loinc.org", "code": format!("8480-{i}") }] },
                "valueQuantity": { "value": 100 + i, "unit": "mmHg" }
            })
        })
        .collect();
    json!({
        "resourceType": "Observation",
        "status": "final",
        "code": { "coding": [{ "system": "http://loinc.org", "code": "85354-9" }] },
        "subject": { "reference": "Patient/example" },
        "effectiveDateTime": "2024-03-01T10:00:00Z",
        "component": component
    })
}

fn bench_registry_build(c: &mut Criterion) {
    c.bench_function("registry_build_embedded", |b| {
        b.iter(|| {
            black_box(SchemaRegistry::from_json_slice(embedded::R4_CORE_SCHEMAS)).unwrap()
        })
    });
}

fn bench_flat_validation(c: &mut Criterion) {
    let registry = SchemaRegistry::from_descriptors([create_large_schema()]).unwrap();
    let tree = create_large_tree();
    let validator = Validator::new(&registry);

    c.bench_function("validate_flat_100_fields", |b| {
        b.iter(|| black_box(validator.validate(&tree, "Basic")).unwrap())
    });
}

fn bench_nested_validation(c: &mut Criterion) {
    let validator = Validator::new(embedded::core_registry());
    let document = blood_pressure(50);
    let tree = ResourceTree::from_json(&document).unwrap();

    c.bench_function("validate_observation_50_components", |b| {
        b.iter(|| black_box(validator.validate(&tree, "Observation")).unwrap())
    });

    c.bench_function("validate_json_observation_50_components", |b| {
        b.iter(|| black_box(validator.validate_json(&document, None)).unwrap())
    });
}

fn bench_fail_fast(c: &mut Criterion) {
    let registry = embedded::core_registry();
    let mut document = blood_pressure(50);
    document["status"] = serde_json::Value::Null;
    let tree = ResourceTree::from_json(&document).unwrap();

    let collect_all = Validator::new(registry);
    let fail_fast = Validator::with_config(registry, ValidatorConfig::fail_fast());

    c.bench_function("validate_invalid_collect_all", |b| {
        b.iter(|| black_box(collect_all.validate(&tree, "Observation")).unwrap())
    });
    c.bench_function("validate_invalid_fail_fast", |b| {
        b.iter(|| black_box(fail_fast.validate(&tree, "Observation")).unwrap())
    });
}

criterion_group!(
    benches,
    bench_registry_build,
    bench_flat_validation,
    bench_nested_validation,
    bench_fail_fast
);
criterion_main!(benches);
