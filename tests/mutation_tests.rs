// tests/mutation_tests.rs

use jsonq::{Document, Key, QueryError, Value, value_to_json};
use serde_json::json;

fn document(json: serde_json::Value) -> Document {
    Document::from_json(&json.to_string()).unwrap()
}

fn as_json(doc: &Document) -> serde_json::Value {
    value_to_json(doc.value())
}

// ============================================================================
// Objects
// ============================================================================

#[test]
fn test_put_replaces_member() {
    let doc = document(json!({"store": {"name": "old", "open": true}}));
    doc.put("store.name", "new").unwrap();
    assert_eq!(as_json(&doc), json!({"store": {"name": "new", "open": true}}));
}

#[test]
fn test_put_adds_member_at_end() {
    let doc = document(json!({"store": {"name": "shop"}}));
    doc.put("$.store.city", "Nairobi").unwrap();
    assert_eq!(as_json(&doc), json!({"store": {"name": "shop", "city": "Nairobi"}}));
}

#[test]
fn test_put_at_root() {
    let doc = document(json!({"a": 1}));
    doc.put("b", 2i64).unwrap();
    assert_eq!(as_json(&doc), json!({"a": 1, "b": 2}));
}

#[test]
fn test_put_null_removes_member() {
    let doc = document(json!({"a": 1, "b": 2, "c": 3}));
    doc.put("b", Value::Null).unwrap();
    assert_eq!(as_json(&doc), json!({"a": 1, "c": 3}));
}

#[test]
fn test_put_all_without_override_keeps_existing() {
    let doc = document(json!({"cfg": {"mode": "fast"}}));
    doc.put_all(
        "cfg",
        false,
        vec![
            (Key::from("mode"), Value::from("slow")),
            (Key::from("level"), Value::Integer(3)),
        ],
    )
    .unwrap();
    assert_eq!(as_json(&doc), json!({"cfg": {"mode": "fast", "level": 3}}));
}

#[test]
fn test_put_into_every_match() {
    let doc = document(json!({"items": [{"id": 1}, {"id": 2}]}));
    doc.put("items[*].seen", true).unwrap();
    assert_eq!(
        as_json(&doc),
        json!({"items": [{"id": 1, "seen": true}, {"id": 2, "seen": true}]})
    );
}

#[test]
fn test_put_through_filter() {
    let doc = document(json!({"items": [{"id": 1}, {"id": 2}]}));
    doc.put("items[?(@.id == 2)].flag", "x").unwrap();
    assert_eq!(as_json(&doc), json!({"items": [{"id": 1}, {"id": 2, "flag": "x"}]}));
}

#[test]
fn test_put_missing_parent_is_a_no_op() {
    let doc = document(json!({"a": 1}));
    doc.put("missing.key", 1i64).unwrap();
    assert_eq!(as_json(&doc), json!({"a": 1}));
}

// ============================================================================
// Arrays
// ============================================================================

#[test]
fn test_put_appends_with_placeholder() {
    let doc = document(json!({"tags": ["a", "b"]}));
    doc.put("tags.$", "c").unwrap();
    assert_eq!(as_json(&doc), json!({"tags": ["a", "b", "c"]}));
}

#[test]
fn test_put_inserts_at_index() {
    let doc = document(json!({"tags": ["a", "b"]}));
    doc.put("tags.0", "z").unwrap();
    assert_eq!(as_json(&doc), json!({"tags": ["z", "a", "b"]}));
}

#[test]
fn test_put_past_end_appends() {
    let doc = document(json!({"tags": ["a"]}));
    doc.put("tags.9", "b").unwrap();
    assert_eq!(as_json(&doc), json!({"tags": ["a", "b"]}));
}

#[test]
fn test_put_all_index_without_override_appends() {
    let doc = document(json!({"n": [1, 2]}));
    doc.put_all("n", false, vec![(Key::Index(0), Value::Integer(0))]).unwrap();
    assert_eq!(as_json(&doc), json!({"n": [1, 2, 0]}));
}

#[test]
fn test_null_into_array_is_ignored() {
    let doc = document(json!({"n": [1]}));
    doc.put("n.$", Value::Null).unwrap();
    assert_eq!(as_json(&doc), json!({"n": [1]}));
}

#[test]
fn test_add_appends_to_root_array() {
    let doc = document(json!([1]));
    doc.add(2i64).unwrap();
    doc.add(Value::object([("k", Value::from("v"))])).unwrap();
    assert_eq!(as_json(&doc), json!([1, 2, {"k": "v"}]));
}

// ============================================================================
// Invalid Targets
// ============================================================================

#[test]
fn test_name_into_array_is_invalid() {
    let doc = document(json!({"tags": ["a"]}));
    let err = doc.put("tags.first", "x").unwrap_err();
    assert!(matches!(err, QueryError::InvalidMutationTarget(_)));
}

#[test]
fn test_append_into_object_is_invalid() {
    let doc = document(json!({"a": 1}));
    assert!(matches!(doc.add(1i64), Err(QueryError::InvalidMutationTarget(_))));
    assert!(matches!(
        doc.put_all("", true, vec![(Key::Index(0), Value::Integer(1))]),
        Err(QueryError::InvalidMutationTarget(_))
    ));
}

#[test]
fn test_write_into_scalar_is_invalid() {
    let doc = document(json!({"a": 1}));
    assert!(matches!(
        doc.put("a.b", 2i64),
        Err(QueryError::InvalidMutationTarget(_))
    ));
}

// ============================================================================
// Shared Containers
// ============================================================================

#[test]
fn test_write_is_visible_through_every_alias() {
    let shared = Value::object([("v", Value::Integer(1))]);
    let root = Value::object([("left", shared.clone()), ("right", shared)]);
    let doc = Document::from_value(root);

    doc.put("left.v", 2i64).unwrap();
    assert_eq!(doc.text("right.v").unwrap(), "2");
}

#[test]
fn test_write_through_derived_document() {
    let doc = document(json!({"user": {"name": "Ada"}}));
    let user = doc.get("user").unwrap();
    user.put("email", "ada@example.com").unwrap();
    assert_eq!(doc.text("user.email").unwrap(), "ada@example.com");
}
