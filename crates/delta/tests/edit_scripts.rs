//! Integration tests for diff/patch and the edit wire format.

use serde_json::json;
use shapecheck_delta::{diff, equal, patch, patch_in_place, Edit};
use shapecheck_value::Value;

fn v(json: serde_json::Value) -> Value {
    Value::from(json)
}

// ── Ordering ──────────────────────────────────────────────────────────────────

#[test]
fn scenario_updates_in_key_order() {
    let edits = diff(&v(json!({"x": 1, "y": 1, "z": 1})), &v(json!({"x": 2, "y": 2, "z": 2}))).unwrap();
    let wire = serde_json::to_value(&edits).unwrap();
    assert_eq!(
        wire,
        json!([
            {"type": "update", "path": "/x", "value": 2},
            {"type": "update", "path": "/y", "value": 2},
            {"type": "update", "path": "/z", "value": 2}
        ])
    );
}

#[test]
fn scenario_descending_array_deletes() {
    let edits = diff(&v(json!([1, 2, 3, 4])), &v(json!([1, 2]))).unwrap();
    let wire = serde_json::to_value(&edits).unwrap();
    assert_eq!(
        wire,
        json!([{"type": "delete", "path": "/3"}, {"type": "delete", "path": "/2"}])
    );
}

#[test]
fn scenario_inserts_precede_deletes() {
    let edits = diff(&v(json!({"x": 1, "y": 1})), &v(json!({"a": 2, "b": 2}))).unwrap();
    let kinds: Vec<_> = edits.iter().map(|e| (e.kind(), e.path())).collect();
    assert_eq!(
        kinds,
        vec![("insert", "/a"), ("insert", "/b"), ("delete", "/x"), ("delete", "/y")]
    );
}

// ── Wire round trip ───────────────────────────────────────────────────────────

#[test]
fn scripts_survive_json_text() {
    let current = v(json!({"user": {"name": "ada", "tags": ["a", "b", "c"]}, "v": 1}));
    let next = v(json!({"user": {"name": "grace", "tags": ["a"]}, "v": 2, "new": true}));
    let edits = diff(&current, &next).unwrap();
    let text = serde_json::to_string(&edits).unwrap();
    let decoded: Vec<Edit> = serde_json::from_str(&text).unwrap();
    assert_eq!(decoded, edits);
    assert!(equal(&patch(&current, &decoded).unwrap(), &next));
}

#[test]
fn patch_in_place_mutates_target() {
    let mut doc = v(json!({"count": 1}));
    patch_in_place(&mut doc, &[Edit::update("/count", 2), Edit::insert("/flag", true)]).unwrap();
    assert_eq!(doc, v(json!({"count": 2, "flag": true})));
}

#[test]
fn shared_substructure_is_not_written_through() {
    let shared = v(json!({"n": 1}));
    let current = Value::from_entries([("a", shared.clone()), ("b", shared.clone())]);
    let out = patch(&current, &[Edit::update("/a/n", 2)]).unwrap();
    assert_eq!(out, v(json!({"a": {"n": 2}, "b": {"n": 1}})));
    assert_eq!(shared, v(json!({"n": 1})));
}
