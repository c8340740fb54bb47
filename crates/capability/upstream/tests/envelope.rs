use fleet_upstream::{extract_rows, extract_token};
use serde_json::json;

#[test]
fn token_read_from_known_locations() {
    assert_eq!(extract_token(&json!({ "token": "a" })).as_deref(), Some("a"));
    assert_eq!(
        extract_token(&json!({ "data": { "token": "b" } })).as_deref(),
        Some("b")
    );
    assert_eq!(
        extract_token(&json!({ "result": { "token": "c" } })).as_deref(),
        Some("c")
    );
    assert_eq!(
        extract_token(&json!({ "token": "", "data": { "token": "d" } })).as_deref(),
        Some("d")
    );
    assert!(extract_token(&json!({ "message": "bad credentials" })).is_none());
}

#[test]
fn rows_read_from_envelope_keys() {
    assert_eq!(extract_rows(json!({ "data": [{ "HWID": "1" }] })).len(), 1);
    assert_eq!(
        extract_rows(json!({ "data": null, "result": [{ "HWID": "1" }, { "HWID": "2" }] })).len(),
        2
    );
    assert_eq!(extract_rows(json!([{ "HWID": "1" }])).len(), 1);
    assert_eq!(
        extract_rows(json!({ "data": { "data": [{ "HWID": "1" }], "total": 1 } })).len(),
        1
    );
    assert!(extract_rows(json!({ "message": "ok" })).is_empty());
    assert!(extract_rows(json!("unexpected")).is_empty());
}
