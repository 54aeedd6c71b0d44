//! Integration test: exported JSON Schema documents agree with the record
//! engine.
//!
//! Every exported document must compile under draft 2020-12, accept the
//! serialized form of instances the engine creates, and reject data the
//! engine rejects for structural reasons (missing fields, wrong base types,
//! enum non-members, null in non-nullable fields).

use jsonschema::{Draft, Validator};
use nomen_core::{
    register_builtins, FieldDescriptor, RecordDefinition, RecordOptions, RecordSchema, Registry,
};
use nomen_schema::{to_json_schema, to_zod_schema};
use proptest::prelude::*;
use serde_json::{json, Value};

fn compile(definition: &RecordDefinition) -> Validator {
    let schema = to_json_schema(definition);
    jsonschema::options()
        .with_draft(Draft::Draft202012)
        .should_validate_formats(true)
        .build(&schema)
        .unwrap_or_else(|e| panic!("exported schema for {} does not compile: {e}", definition.label()))
}

fn order_definition(registry: &Registry) -> RecordDefinition {
    register_builtins(registry).unwrap();
    registry
        .define_enum("OrderStatus", ["pending", "shipped", "delivered"])
        .unwrap();
    registry
        .define_record(
            "Order",
            RecordSchema::new()
                .field("id", FieldDescriptor::primitive_ref("Uuid"))
                .field("contact", FieldDescriptor::primitive_ref("Email"))
                .field("status", FieldDescriptor::enum_ref("OrderStatus"))
                .field("total", FieldDescriptor::number())
                .field("gift", FieldDescriptor::boolean().optional())
                .field("note", FieldDescriptor::string().nullable())
                .field("lines", FieldDescriptor::array().with_items(FieldDescriptor::object())),
            RecordOptions::default(),
        )
        .unwrap()
}

fn valid_order() -> Value {
    json!({
        "id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
        "contact": "buyer@example.com",
        "status": "shipped",
        "total": 42.5,
        "note": null,
        "lines": [{"sku": "A-1", "qty": 2}]
    })
}

#[test]
fn test_created_instances_conform() {
    let registry = Registry::new();
    let order = order_definition(&registry);
    let validator = compile(&order);

    let instance = order.create(&valid_order()).unwrap();
    let serialized = serde_json::to_value(&instance).unwrap();
    assert!(validator.is_valid(&serialized));

    let mut with_gift = valid_order();
    with_gift["gift"] = json!(true);
    let instance = order.create(&with_gift).unwrap();
    assert!(validator.is_valid(&instance.to_value()));
}

#[test]
fn test_structural_rejections_agree() {
    let registry = Registry::new();
    let order = order_definition(&registry);
    let validator = compile(&order);

    let mutations: [(&str, fn(&mut Value)); 6] = [
        ("missing required", |v: &mut Value| {
            v.as_object_mut().map(|o| o.remove("total"));
        }),
        ("wrong base type", |v: &mut Value| v["total"] = json!("42")),
        ("enum non-member", |v: &mut Value| v["status"] = json!("lost")),
        ("null in non-nullable", |v: &mut Value| v["status"] = Value::Null),
        ("bad email format", |v: &mut Value| v["contact"] = json!("not-an-email")),
        ("array item type", |v: &mut Value| v["lines"] = json!(["A-1"])),
    ];

    for (case, mutate) in mutations {
        let mut data = valid_order();
        mutate(&mut data);
        assert!(!order.validate(&data), "engine accepted: {case}");
        assert!(!validator.is_valid(&data), "schema accepted: {case}");
    }
}

#[test]
fn test_nested_record_reference_compiles() {
    let registry = Registry::new();
    registry
        .define_record(
            "Address",
            RecordSchema::new().field("city", FieldDescriptor::string()),
            RecordOptions::default(),
        )
        .unwrap();
    let customer = registry
        .define_record(
            "Customer",
            RecordSchema::new()
                .field("address", FieldDescriptor::record_ref("Address"))
                .field("previous", FieldDescriptor::record_ref("Address").nullable().optional()),
            RecordOptions::default(),
        )
        .unwrap();
    let validator = compile(&customer);
    let instance = customer
        .create(&json!({"address": {"city": "Lagos"}, "previous": null}))
        .unwrap();
    assert!(validator.is_valid(&instance.to_value()));
    assert!(!validator.is_valid(&json!({"address": "Lagos"})));
}

fn descriptor_strategy() -> impl Strategy<Value = FieldDescriptor> {
    (0..5u8, any::<bool>(), any::<bool>()).prop_map(|(kind, optional, nullable)| {
        let mut descriptor = match kind {
            0 => FieldDescriptor::string(),
            1 => FieldDescriptor::number(),
            2 => FieldDescriptor::boolean(),
            3 => FieldDescriptor::enum_ref("Color"),
            _ => FieldDescriptor::primitive_ref("Email"),
        };
        if optional {
            descriptor = descriptor.optional();
        }
        if nullable {
            descriptor = descriptor.nullable();
        }
        descriptor
    })
}

proptest! {
    #[test]
    fn exports_independent_of_declaration_order(
        fields in prop::collection::btree_map("[a-z]{1,8}", descriptor_strategy(), 1..8),
    ) {
        let forward = Registry::new();
        let backward = Registry::new();
        for registry in [&forward, &backward] {
            register_builtins(registry).unwrap();
            registry.define_enum("Color", ["red", "green"]).unwrap();
        }

        let mut schema_forward = RecordSchema::new();
        for (name, descriptor) in fields.iter() {
            schema_forward.insert(name.clone(), descriptor.clone());
        }
        let mut schema_backward = RecordSchema::new();
        for (name, descriptor) in fields.iter().rev() {
            schema_backward.insert(name.clone(), descriptor.clone());
        }

        let a = forward
            .define_record("Shape", schema_forward, RecordOptions::default())
            .unwrap();
        let b = backward
            .define_record("Shape", schema_backward, RecordOptions::default())
            .unwrap();

        prop_assert_eq!(to_json_schema(&a), to_json_schema(&b));
        prop_assert_eq!(to_zod_schema(&a), to_zod_schema(&b));
        prop_assert_eq!(to_zod_schema(&a).render(), to_zod_schema(&b).render());
    }

    #[test]
    fn required_lists_exactly_non_optional_fields(
        fields in prop::collection::btree_map("[a-z]{1,8}", descriptor_strategy(), 0..8),
    ) {
        let registry = Registry::new();
        let schema: RecordSchema = fields.clone().into_iter().collect();
        let def = registry
            .define_record("Shape", schema, RecordOptions::default())
            .unwrap();

        let exported = to_json_schema(&def);
        let required: Vec<&str> = exported["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        let expected: Vec<&str> = fields
            .iter()
            .filter(|(_, d)| !d.is_optional())
            .map(|(n, _)| n.as_str())
            .collect();
        prop_assert_eq!(required, expected);
    }
}
