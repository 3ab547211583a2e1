//! Property tests across the engine.

use proptest::prelude::*;
use shapecheck::*;

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(Value::from),
        (-1.0e6..1.0e6f64).prop_map(Value::Number),
        "[a-z0-9 ]{0,8}".prop_map(Value::String),
        prop::sample::select(vec!["admin", "member", "circle", "square", "1", "true"])
            .prop_map(Value::from),
    ]
}

/// JSON-like values. Keys are drawn from a small pool so that objects often
/// line up with the fixture schemas, plus a few that need pointer escaping.
fn value() -> impl Strategy<Value = Value> {
    let key = prop::sample::select(vec![
        "name", "age", "role", "kind", "size", "radius", "tags", "x", "a/b", "~", "",
    ]);
    leaf().prop_recursive(4, 48, 6, move |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::array),
            prop::collection::vec((key.clone(), inner), 0..6).prop_map(Value::from_entries),
        ]
    })
}

fn schemas() -> Vec<Schema> {
    let user = Schema::object([
        ("name", Property::new(Schema::string())),
        (
            "age",
            Property::new(Schema::Integer(NumberSchema {
                minimum: Some(0.0),
                ..Default::default()
            })),
        ),
        ("role", Property::optional(Schema::union(vec![Schema::literal("admin"), Schema::literal("member")]))),
        ("tags", Property::optional(Schema::array(Schema::string()))),
    ]);
    let shape = Schema::union(vec![
        Schema::object([
            ("kind", Property::new(Schema::literal("circle"))),
            ("radius", Property::new(Schema::number())),
        ]),
        Schema::object([
            ("kind", Property::new(Schema::literal("square"))),
            ("size", Property::new(Schema::number())),
        ]),
    ]);
    let mut unique = ArraySchema::new(Schema::union(vec![Schema::number(), Schema::string()]));
    unique.unique_items = true;
    unique.max_items = Some(4);
    let tree = Schema::object([
        ("name", Property::new(Schema::string())),
        ("tags", Property::new(Schema::array(Schema::this("Tree")))),
    ])
    .with_id("Tree");
    let mut open = ObjectSchema::new([("x", Property::new(Schema::number()))]);
    open.additional_properties = AdditionalProperties::Allow;
    let mut other = ObjectSchema::new([("name", Property::optional(Schema::string()))]);
    other.additional_properties = AdditionalProperties::Allow;
    vec![
        Schema::any(),
        Schema::number(),
        Schema::boolean(),
        Schema::union(vec![Schema::null(), Schema::string()]),
        Schema::tuple(vec![Schema::number(), Schema::string()]),
        Schema::record(Schema::string(), Schema::number()),
        Schema::Array(unique),
        Schema::intersect(vec![Schema::Object(open), Schema::Object(other)]),
        user,
        shape,
        tree,
    ]
}

proptest! {
    #[test]
    fn diff_of_identical_values_is_empty(v in value()) {
        prop_assert!(diff(&v, &clone_deep(&v)).unwrap().is_empty());
    }

    #[test]
    fn patch_of_diff_reaches_target(current in value(), next in value()) {
        let edits = diff(&current, &next).unwrap();
        let patched = patch(&current, &edits).unwrap();
        prop_assert!(equal(&patched, &next), "{:?} != {:?}", patched, next);
    }

    #[test]
    fn empty_patch_is_a_copy(v in value()) {
        prop_assert_eq!(patch(&v, &[]).unwrap(), v);
    }

    #[test]
    fn compiled_check_matches_interpreter(v in value()) {
        for schema in schemas() {
            let compiled = TypeCompiler::compile(&[], &schema).unwrap();
            let interpreted = TypeCompiler::compile_with(
                &[],
                &schema,
                CompileOptions { mode: CompileMode::Interpreted, emit_code: false },
            )
            .unwrap();
            let expected = check(&schema, &[], &v).unwrap();
            prop_assert_eq!(compiled.check(&v), expected, "{}", schema);
            prop_assert_eq!(interpreted.check(&v), expected, "{}", schema);
        }
    }

    #[test]
    fn errors_are_empty_exactly_when_check_passes(v in value()) {
        for schema in schemas() {
            let ok = check(&schema, &[], &v).unwrap();
            let count = errors(&schema, &[], &v).unwrap().count();
            prop_assert_eq!(ok, count == 0, "{}", schema);
        }
    }

    #[test]
    fn cast_output_checks(v in value()) {
        for schema in schemas() {
            if let Ok(out) = cast(&schema, &[], &v) {
                prop_assert!(check(&schema, &[], &out).unwrap(), "{} {:?}", schema, out);
            }
        }
    }

    #[test]
    fn union_and_intersect_compose_checks(v in value()) {
        let parts = schemas();
        for pair in parts.windows(2) {
            let a = check(&pair[0], &[], &v).unwrap();
            let b = check(&pair[1], &[], &v).unwrap();
            let union = Schema::union(pair.to_vec());
            let intersect = Schema::intersect(pair.to_vec());
            prop_assert_eq!(check(&union, &[], &v).unwrap(), a || b);
            prop_assert_eq!(check(&intersect, &[], &v).unwrap(), a && b);
        }
    }

    #[test]
    fn clean_then_default_never_invents_errors(v in value()) {
        for schema in schemas() {
            if check(&schema, &[], &v).unwrap() {
                let cleaned = clean(&schema, &[], &v).unwrap();
                prop_assert!(check(&schema, &[], &cleaned).unwrap());
                let filled = default(&schema, &[], &cleaned).unwrap();
                prop_assert!(check(&schema, &[], &filled).unwrap());
            }
        }
    }
}
