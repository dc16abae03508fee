mod common;

use common::{order_item, order_registry, valid_order};
use fhir_conformance::*;
use proptest::prelude::*;

/// Order fields that may be removed one at a time, with the violation each
/// removal must produce (`None` when the field is optional).
const REMOVABLE: &[(&str, Option<(ViolationKind, &str)>)] = &[
    ("status", Some((ViolationKind::MissingRequiredField, "Order.status"))),
    ("EffectDateTime", Some((ViolationKind::MissingRequiredChoice, "Order.Effect"))),
    ("item", Some((ViolationKind::CardinalityViolation, "Order.item"))),
    ("note", None),
    ("dose", None),
];

fn order_with_items(count: usize) -> ResourceTree {
    valid_order().with_list(
        "item",
        (0..count).map(|i| order_item(&format!("C-{i}"))),
    )
}

proptest! {
    #[test]
    fn removing_one_field_yields_exactly_its_violation(index in 0..REMOVABLE.len()) {
        let registry = order_registry();
        let (field, expected) = REMOVABLE[index];
        let mut order = valid_order();
        order.remove(field);

        let result = Validator::new(&registry).validate(&order, "Order").unwrap();
        match expected {
            None => prop_assert!(result.is_valid()),
            Some((kind, path)) => {
                prop_assert_eq!(result.len(), 1);
                prop_assert_eq!(result.violations[0].kind, kind);
                prop_assert_eq!(result.violations[0].path.to_string(), path);
            }
        }
    }

    #[test]
    fn item_count_outside_bounds_is_a_cardinality_violation(count in 1usize..8) {
        let registry = order_registry();
        let result = Validator::new(&registry)
            .validate(&order_with_items(count), "Order")
            .unwrap();

        if count <= 3 {
            prop_assert!(result.is_valid());
        } else {
            prop_assert_eq!(result.len(), 1);
            prop_assert_eq!(result.violations[0].kind, ViolationKind::CardinalityViolation);
            prop_assert_eq!(result.violations[0].got.clone(), Some(serde_json::json!(count)));
        }
    }

    #[test]
    fn any_wrong_tag_is_a_single_mismatch(tag in "[A-Za-z]{1,12}") {
        prop_assume!(tag != "Order");
        let registry = order_registry();
        let order = valid_order().with("resourceType", tag.as_str());

        let result = Validator::new(&registry).validate(&order, "Order").unwrap();
        prop_assert_eq!(result.len(), 1);
        prop_assert_eq!(result.violations[0].kind, ViolationKind::DiscriminatorMismatch);
        prop_assert_eq!(result.violations[0].path.to_string(), "Order");
    }

    #[test]
    fn fail_fast_is_a_prefix_of_collect_all(
        drop_status in any::<bool>(),
        both_effects in any::<bool>(),
        blank_items in 0usize..3,
    ) {
        let registry = order_registry();
        let mut order = valid_order().with_list(
            "item",
            (0..blank_items.max(1)).map(|i| {
                if i < blank_items { ResourceTree::new() } else { order_item("A") }
            }),
        );
        if drop_status {
            order.remove("status");
        }
        if both_effects {
            order.insert("EffectPeriod", ResourceTree::new().with("start", "2024"));
        }

        let all = Validator::new(&registry).validate(&order, "Order").unwrap();
        let fast = Validator::with_config(&registry, ValidatorConfig::fail_fast())
            .validate(&order, "Order")
            .unwrap();

        let expected = usize::from(drop_status) + usize::from(both_effects) + blank_items;
        prop_assert_eq!(all.len(), expected);
        prop_assert_eq!(fast.violations.as_slice(), &all.violations[..expected.min(1)]);
        prop_assert_eq!(fast.is_valid(), all.is_valid());
    }

    #[test]
    fn validation_is_deterministic(drop_status in any::<bool>(), count in 0usize..6) {
        let registry = order_registry();
        let mut order = order_with_items(count);
        if drop_status {
            order.remove("status");
        }
        let validator = Validator::new(&registry);

        let first = validator.validate(&order, "Order").unwrap();
        let second = validator.validate(&order, "Order").unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn element_path_display_parses_back(
        fields in prop::collection::vec("[a-z][A-Za-z]{0,8}", 1..5),
        index in prop::option::of(0usize..20),
    ) {
        let mut path = ElementPath::root("Patient");
        for field in &fields {
            path.push_field(field.as_str());
        }
        if let Some(index) = index {
            path.push_index(index);
        }

        let parsed: ElementPath = path.to_string().parse().unwrap();
        prop_assert_eq!(parsed, path);
    }
}
