//! Integration Tests - the text surface an outer harness parses
//!
//! A rendered failure is one header line, a newline, then exactly one JSON
//! block. These tests parse it the way a harness would: split once, parse
//! the rest, compare structurally.

use mustexist::{
    must_exist, must_exist_all, Expectations, FailurePayload, MustExistError, PropertyMatcher,
    SimConfig, SimDocumentStore, SimKeyValueStore, StoreAdapter,
};
use serde_json::{json, Value};

fn parse_block(text: &str) -> Value {
    let (header, block) = text.split_once('\n').expect("header line");
    assert!(!header.is_empty());
    serde_json::from_str(block).expect("JSON block")
}

#[tokio::test]
async fn test_single_store_text_parses_to_flat_shape() {
    let store = SimDocumentStore::new("persons", SimConfig::with_seed(1));
    let expectations = Expectations::new()
        .with_ids([1, 2])
        .with_props(PropertyMatcher::new().with("lname", "Malcowitch").with("age", 42));

    let err = must_exist(&expectations, &store).await.unwrap_err();
    let text = err.to_string();

    assert!(text.starts_with("MustExist: store 'persons' is missing 3 mandatory entries\n"));
    assert_eq!(
        parse_block(&text),
        json!({
            "message": "mustExist assertion - missing mandatory entries in db",
            "expected": {"byId": [], "byProps": []},
            "actual": {"byId": [1, 2], "byProps": [{"lname": "Malcowitch", "age": 42}]}
        })
    );
    assert_eq!(Some(parse_block(&text)), err.to_json());
}

#[tokio::test]
async fn test_multi_store_text_parses_to_nested_shape() {
    let mongo = SimDocumentStore::new("mongo", SimConfig::with_seed(2));
    mongo.insert(json!({"id": "a"}));
    let redis = SimKeyValueStore::new("redis", SimConfig::with_seed(3)).with_prefix("pers:");

    let stores: Vec<&dyn StoreAdapter> = vec![&mongo, &redis];
    let expectations = Expectations::new().with_ids(["a", "b"]);

    let err = must_exist_all(&expectations, &stores).await.unwrap_err();
    let text = err.to_string();

    assert_eq!(
        text.lines().next().unwrap(),
        "MustExist: 2 stores are missing mandatory entries (mongo, redis)"
    );
    assert_eq!(
        parse_block(&text),
        json!({
            "message": "one or more stores setup failed",
            "errors": [
                {"expected": {"byId": [], "byProps": []}, "actual": {"byId": ["b"], "byProps": []}},
                {"expected": {"byId": [], "byProps": []}, "actual": {"byId": ["a", "b"], "byProps": []}}
            ]
        })
    );
}

#[tokio::test]
async fn test_payload_parse_round_trips_typed_value() {
    let store = SimDocumentStore::new("persons", SimConfig::with_seed(4));
    let err = must_exist(&Expectations::new().with_id(9), &store)
        .await
        .unwrap_err();

    let parsed = FailurePayload::parse(&err.to_string()).unwrap();
    let typed = err.payload().unwrap();

    // The store name lives only in the header.
    match (parsed, typed) {
        (FailurePayload::Single(parsed), FailurePayload::Single(typed)) => {
            assert_eq!(parsed.message, typed.message);
            assert_eq!(parsed.expected, typed.expected);
            assert_eq!(parsed.actual, typed.actual);
            assert!(parsed.store.is_empty());
            assert_eq!(typed.store, "persons");
        }
        other => panic!("expected single-store payloads, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unavailable_store_renders_header_only() {
    let store = SimDocumentStore::new("persons", SimConfig::with_seed(5)).with_faults(
        mustexist::FaultConfig::new(mustexist::FaultType::ConnectionRefused, 1.0),
    );

    let err = must_exist(&Expectations::new().with_id(1), &store)
        .await
        .unwrap_err();

    assert!(matches!(err, MustExistError::StoreUnavailable { .. }));
    let text = err.to_string();
    assert!(!text.contains('\n'));
    assert!(text.starts_with("MustExist: store 'persons' unavailable:"));
    assert!(FailurePayload::parse(&text).is_err());
}
