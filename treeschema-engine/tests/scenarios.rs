//! End-to-end scenarios (S1-S6) and the quantified properties from the
//! testable-properties section: determinism, schema-absence neutrality,
//! literal-over-pattern, cycle safety, `not` duality, `allOf`
//! associativity, the shape wildcard, and round-trip (via a schema-from-tree
//! helper scoped to this test suite).

use treeschema_engine::{validate, ErrorKind};
use treeschema_model::{AttrValue, Dtype, MemoryTree, NodeKind, Tree};
use treeschema_schema::Schema;

fn load(schema: serde_json::Value, tree: &str) -> (Schema, MemoryTree) {
    (Schema::load(&schema).unwrap(), MemoryTree::from_json(tree).unwrap())
}

/// Generates the most specific schema that exactly matches `tree` at
/// `node`: every literal child, dtype, shape, and attribute the tree
/// actually carries becomes a required/matching schema entry. This is the
/// test-only stand-in for the out-of-scope `generate_schema` collaborator
/// (§9), just enough of one to exercise property 7.
fn generate_schema_value(tree: &MemoryTree, node: usize) -> serde_json::Value {
    let attrs = attrs_to_schema(tree.attrs(node));
    match tree.kind(node) {
        NodeKind::Group => {
            let children = tree.children(node);
            let members: serde_json::Map<String, serde_json::Value> = children
                .iter()
                .map(|(name, child)| (name.clone(), generate_schema_value(tree, *child)))
                .collect();
            let required: Vec<_> = children.iter().map(|(name, _)| name.clone()).collect();
            serde_json::json!({
                "type": "group",
                "members": members,
                "required": required,
                "attrs": attrs,
            })
        }
        NodeKind::Dataset => {
            serde_json::json!({
                "type": "dataset",
                "dtype": dtype_to_schema(&tree.dtype(node)),
                "shape": tree.shape(node),
                "attrs": attrs,
            })
        }
    }
}

fn attrs_to_schema(attrs: Vec<(String, AttrValue)>) -> Vec<serde_json::Value> {
    attrs
        .into_iter()
        .map(|(name, value)| {
            serde_json::json!({
                "name": name,
                "dtype": dtype_to_schema(&value.dtype),
                "required": true,
            })
        })
        .collect()
}

fn dtype_to_schema(dtype: &Dtype) -> serde_json::Value {
    match dtype {
        Dtype::Simple(simple) => serde_json::Value::String(simple.to_string()),
        Dtype::Compound(compound) => serde_json::json!({
            "formats": compound.fields.iter().map(|f| serde_json::json!({
                "name": f.name,
                "format": f.format.to_string(),
                "offset": f.offset,
            })).collect::<Vec<_>>(),
            "itemsize": compound.itemsize,
        }),
    }
}

/// S1 - a dataset's dtype and shape both match.
#[test]
fn s1_simple_dataset_type_match() {
    let (schema, tree) = load(
        serde_json::json!({
            "type": "group",
            "required": ["data"],
            "members": { "data": { "type": "dataset", "dtype": "<f8", "shape": [100, 50] } }
        }),
        r#"{"kind":"group","children":{"data":{"kind":"dataset","dtype":"<f8","shape":[100,50]}}}"#,
    );
    let errors = validate(&tree, &schema).unwrap();
    assert!(errors.is_empty(), "expected no errors, got {errors:?}");
}

/// S2 - a shape mismatch is reported at the dataset's path.
#[test]
fn s2_shape_mismatch() {
    let (schema, tree) = load(
        serde_json::json!({
            "type": "group",
            "required": ["data"],
            "members": { "data": { "type": "dataset", "dtype": "<f8", "shape": [100, 3] } }
        }),
        r#"{"kind":"group","children":{"data":{"kind":"dataset","dtype":"<f8","shape":[100,50]}}}"#,
    );
    let errors = validate(&tree, &schema).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path.to_string(), "/data");
    assert!(matches!(errors[0].kind, ErrorKind::ShapeMismatch { .. }));
}

/// S3 - a patternMembers schema applies to every matching child; an
/// unrelated child is left unconstrained.
#[test]
fn s3_pattern_members() {
    let (schema, tree) = load(
        serde_json::json!({
            "type": "group",
            "patternMembers": {
                "^sensor_[0-9]+$": {
                    "type": "group",
                    "required": ["readings"],
                    "members": { "readings": { "type": "dataset", "dtype": "<f4", "shape": [-1] } }
                }
            }
        }),
        r#"{
            "kind": "group",
            "children": {
                "sensor_1": { "kind": "group", "children": { "readings": { "kind": "dataset", "dtype": "<f8", "shape": [3] } } },
                "sensor_2": { "kind": "group", "children": { "readings": { "kind": "dataset", "dtype": "<f4", "shape": [3] } } },
                "other": { "kind": "group" }
            }
        }"#,
    );
    let errors = validate(&tree, &schema).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path.to_string(), "/sensor_1/readings");
    assert!(matches!(errors[0].kind, ErrorKind::DtypeMismatch { .. }));
}

/// S4 - a self-referential `$ref` terminates once the data runs out.
#[test]
fn s4_recursive_ref_terminates() {
    let (schema, tree) = load(
        serde_json::json!({
            "$defs": {
                "observables": {
                    "type": "group",
                    "members": { "observables": { "$ref": "#/$defs/observables" } }
                }
            },
            "$ref": "#/$defs/observables"
        }),
        r#"{
            "kind": "group",
            "children": { "observables": { "kind": "group", "children": { "observables": { "kind": "group", "children": { "observables": { "kind": "group" } } } } } }
        }"#,
    );
    let errors = validate(&tree, &schema).unwrap();
    assert!(errors.is_empty(), "expected no errors, got {errors:?}");
}

/// S5 - both `oneOf` branches can independently be satisfied by an
/// open-world group, yielding `OneOfMultipleMatched`.
#[test]
fn s5_one_of_mutual_exclusion() {
    let (schema, tree) = load(
        serde_json::json!({
            "type": "group",
            "oneOf": [
                { "type": "group", "required": ["raw_data"] },
                { "type": "group", "required": ["processed_data"] }
            ]
        }),
        r#"{
            "kind": "group",
            "children": {
                "raw_data": { "kind": "dataset", "dtype": "<f8", "shape": [1] },
                "processed_data": { "kind": "dataset", "dtype": "<f8", "shape": [1] }
            }
        }"#,
    );
    let errors = validate(&tree, &schema).unwrap();
    assert_eq!(errors.len(), 1);
    match &errors[0].kind {
        ErrorKind::OneOfMultipleMatched { matched } => assert_eq!(matched, &vec![0, 1]),
        other => panic!("expected OneOfMultipleMatched, got {other:?}"),
    }
}

/// S6 - `then` applies when the `if` branch is satisfied, and its own
/// missing-attribute error is merged into the main stream.
#[test]
fn s6_if_then_else() {
    let (schema, tree) = load(
        serde_json::json!({
            "type": "dataset",
            "dtype": "<f8",
            "if": {
                "type": "dataset",
                "attrs": [{ "name": "sensor_type", "dtype": "S", "const": "temperature" }]
            },
            "then": {
                "type": "dataset",
                "attrs": [{ "name": "units", "dtype": "S", "required": true }]
            }
        }),
        r#"{
            "kind": "dataset",
            "dtype": "<f8",
            "shape": [1],
            "attrs": { "sensor_type": { "dtype": "S", "value": "temperature" } }
        }"#,
    );
    let errors = validate(&tree, &schema).unwrap();
    assert_eq!(errors.len(), 1);
    match &errors[0].kind {
        ErrorKind::MissingAttribute { name } => assert_eq!(name, "units"),
        other => panic!("expected MissingAttribute, got {other:?}"),
    }
}

/// Property 1: determinism. Two runs over the same immutable inputs
/// produce identical, identically-ordered error lists.
#[test]
fn property_determinism() {
    let (schema, tree) = load(
        serde_json::json!({
            "type": "group",
            "required": ["data"],
            "members": { "data": { "type": "dataset", "dtype": "<f8", "shape": [2] } }
        }),
        r#"{"kind":"group","children":{"data":{"kind":"dataset","dtype":"<i4","shape":[3]}}}"#,
    );
    let first = validate(&tree, &schema).unwrap();
    let second = validate(&tree, &schema).unwrap();
    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.to_string(), b.to_string());
    }
}

/// Property 2: a node whose schema declares none of the checked keys
/// contributes zero errors.
#[test]
fn property_schema_absence_neutrality() {
    let (schema, tree) = load(
        serde_json::json!({ "type": "group" }),
        r#"{"kind":"group","children":{"anything":{"kind":"dataset","dtype":"<f8","shape":[9]}}}"#,
    );
    let errors = validate(&tree, &schema).unwrap();
    assert!(errors.is_empty());
}

/// Property 3: a literal `members` match suppresses any `patternMembers`
/// schema that would also match, even when the pattern-matched schema
/// would have flagged an error.
#[test]
fn property_literal_over_pattern() {
    let (schema, tree) = load(
        serde_json::json!({
            "type": "group",
            "members": { "sensor_1": { "type": "dataset", "dtype": "<f8" } },
            "patternMembers": { "^sensor_.*$": { "type": "dataset", "dtype": "<i4" } }
        }),
        r#"{"kind":"group","children":{"sensor_1":{"kind":"dataset","dtype":"<f8","shape":[1]}}}"#,
    );
    let errors = validate(&tree, &schema).unwrap();
    assert!(errors.is_empty(), "literal match should have won cleanly, got {errors:?}");
}

/// Property 4: a `$ref` cycle with no intervening data never loops
/// forever; `validate` still returns (and reports the unresolved-chain
/// condition as a schema error rather than hanging).
#[test]
fn property_cycle_safety_on_pure_ref_cycle() {
    let schema = Schema::load(&serde_json::json!({
        "$defs": { "a": { "$ref": "#/$defs/b" }, "b": { "$ref": "#/$defs/a" } },
        "$ref": "#/$defs/a"
    }))
    .unwrap();
    let tree = MemoryTree::from_json(r#"{"kind":"group"}"#).unwrap();
    assert!(validate(&tree, &schema).is_err());
}

/// Property 5: `not` succeeds iff the negated schema itself fails.
#[test]
fn property_not_duality() {
    let tree = MemoryTree::from_json(r#"{"kind":"dataset","dtype":"<f8","shape":[1]}"#).unwrap();

    let matches = Schema::load(&serde_json::json!({ "type": "dataset", "dtype": "<f8" })).unwrap();
    assert!(validate(&tree, &matches).unwrap().is_empty());

    let negated = Schema::load(&serde_json::json!({
        "type": "dataset",
        "not": { "type": "dataset", "dtype": "<f8" }
    }))
    .unwrap();
    let errors = validate(&tree, &negated).unwrap();
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors[0].kind, ErrorKind::NotFailed));
}

/// Property 6: `allOf` is associative: a flat list and a nested grouping
/// of the same branches produce the same error set.
#[test]
fn property_all_of_associativity() {
    let tree = MemoryTree::from_json(r#"{"kind":"dataset","dtype":"<i4","shape":[1]}"#).unwrap();

    let flat = Schema::load(&serde_json::json!({
        "type": "dataset",
        "allOf": [
            { "type": "dataset", "dtype": "<f8" },
            { "type": "dataset", "shape": [2] },
            { "type": "dataset", "attrs": [{ "name": "units", "dtype": "S", "required": true }] }
        ]
    }))
    .unwrap();
    let nested = Schema::load(&serde_json::json!({
        "type": "dataset",
        "allOf": [
            { "type": "dataset", "dtype": "<f8" },
            {
                "type": "dataset",
                "allOf": [
                    { "type": "dataset", "shape": [2] },
                    { "type": "dataset", "attrs": [{ "name": "units", "dtype": "S", "required": true }] }
                ]
            }
        ]
    }))
    .unwrap();

    let flat_errors = validate(&tree, &flat).unwrap();
    let nested_errors = validate(&tree, &nested).unwrap();
    assert_eq!(flat_errors.len(), nested_errors.len());
    let mut flat_msgs: Vec<_> = flat_errors.iter().map(ToString::to_string).collect();
    let mut nested_msgs: Vec<_> = nested_errors.iter().map(ToString::to_string).collect();
    flat_msgs.sort();
    nested_msgs.sort();
    assert_eq!(flat_msgs, nested_msgs);
}

/// Property 8: a schema shape of `[-1, -1, -1]` matches any rank-3
/// dataset regardless of extent.
#[test]
fn property_shape_wildcard() {
    let schema = Schema::load(&serde_json::json!({ "type": "dataset", "shape": [-1, -1, -1] })).unwrap();
    let tree = MemoryTree::from_json(r#"{"kind":"dataset","dtype":"<f8","shape":[7,1,42]}"#).unwrap();
    assert!(validate(&tree, &schema).unwrap().is_empty());
}

/// Property 7: `validate(T, generate_schema(T))` reports zero errors, for
/// `generate_schema` the test-only helper above. Exercised over a handful
/// of differently-shaped trees: a flat dataset, a nested group tree with
/// pattern-shaped names, attributes on both groups and datasets, and a
/// compound dtype.
#[test]
fn property_round_trip() {
    let fixtures = [
        r#"{"kind":"dataset","dtype":"<f8","shape":[3,4]}"#,
        r#"{
            "kind": "group",
            "attrs": { "site": { "dtype": "S", "value": "alpha" } },
            "children": {
                "sensor_1": {
                    "kind": "group",
                    "children": {
                        "readings": { "kind": "dataset", "dtype": "<f4", "shape": [10] }
                    }
                },
                "metadata": {
                    "kind": "dataset",
                    "dtype": "|b1",
                    "shape": [],
                    "attrs": { "units": { "dtype": "S", "value": "volts" } }
                }
            }
        }"#,
        r#"{
            "kind": "dataset",
            "dtype": { "formats": [
                { "name": "x", "format": "<f8", "offset": 0 },
                { "name": "y", "format": "<f8", "offset": 8 }
            ], "itemsize": 16 },
            "shape": [5]
        }"#,
    ];
    for fixture in fixtures {
        let tree = MemoryTree::from_json(fixture).unwrap();
        let generated = generate_schema_value(&tree, tree.root());
        let schema = Schema::load(&generated).unwrap();
        let errors = validate(&tree, &schema).unwrap();
        assert!(errors.is_empty(), "round-trip failed for {fixture}: {errors:?}");
    }
}
