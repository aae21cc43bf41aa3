//! Expectations - what every store must contain
//!
//! `TigerStyle`: plain declarative values, order preserved, no dedup.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

// =============================================================================
// Errors
// =============================================================================

/// Errors building expectations from untyped input.
#[derive(Debug, Error)]
pub enum ExpectationError {
    /// A property matcher was given something other than a JSON object
    #[error("property matcher must be a JSON object, got {found}")]
    NotAnObject {
        /// JSON type that was found instead
        found: &'static str,
    },

    /// Expectations document could not be parsed
    #[error("invalid expectations document: {0}")]
    Parse(#[from] serde_json::Error),
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// EntityId
// =============================================================================

/// Opaque scalar key of a record in a store's primary key space.
///
/// Serializes as a bare JSON scalar, so `EntityId::from(1)` is `1` and
/// `EntityId::from("john")` is `"john"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    /// Integer key
    Int(i64),
    /// String key
    Str(String),
}

impl EntityId {
    /// The identifier as a JSON value, for comparison against stored fields.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Int(n) => Value::from(*n),
            Self::Str(s) => Value::from(s.as_str()),
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for EntityId {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for EntityId {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<u32> for EntityId {
    fn from(value: u32) -> Self {
        Self::Int(value.into())
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

// =============================================================================
// PropertyMatcher
// =============================================================================

/// Field/value pairs a record must carry, used to find records by content.
///
/// A record matches when it is a JSON object holding every field of the
/// matcher with an equal value. Nested values compare by JSON equality.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyMatcher(Map<String, Value>);

impl PropertyMatcher {
    /// Create an empty matcher (matches any object record).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to equal `value`.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Check whether a record satisfies every pair of this matcher.
    #[must_use]
    pub fn matches(&self, record: &Value) -> bool {
        let Some(fields) = record.as_object() else {
            return false;
        };

        self.0
            .iter()
            .all(|(field, expected)| fields.get(field) == Some(expected))
    }

    /// Iterate over the required field/value pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Number of required fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the matcher has no required fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The matcher as a JSON object.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl TryFrom<Value> for PropertyMatcher {
    type Error = ExpectationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(ExpectationError::NotAnObject {
                found: json_type_name(&other),
            }),
        }
    }
}

// =============================================================================
// Expectations
// =============================================================================

/// Required entities, split by how a store looks them up.
///
/// Order is preserved and duplicates are kept: failures are reported
/// positionally, so a duplicated missing id shows up twice.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expectations {
    /// Entities looked up by primary key
    #[serde(default)]
    pub by_id: Vec<EntityId>,
    /// Entities looked up by property match
    #[serde(default)]
    pub by_props: Vec<PropertyMatcher>,
}

impl Expectations {
    /// Create an empty expectation set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a fixture document such as `{"byId": [1], "byProps": [{"lname": "x"}]}`.
    ///
    /// Both keys are optional.
    ///
    /// # Errors
    /// Returns `ExpectationError::Parse` on malformed JSON or wrong shapes.
    pub fn from_json_str(document: &str) -> Result<Self, ExpectationError> {
        Ok(serde_json::from_str(document)?)
    }

    /// Require an entity by identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<EntityId>) -> Self {
        self.by_id.push(id.into());
        self
    }

    /// Require several entities by identifier, in order.
    #[must_use]
    pub fn with_ids<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<EntityId>,
    {
        self.by_id.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Require an entity matching `matcher`.
    #[must_use]
    pub fn with_props(mut self, matcher: PropertyMatcher) -> Self {
        self.by_props.push(matcher);
        self
    }

    /// Total number of probes a validation run will dispatch per store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len() + self.by_props.len()
    }

    /// Whether nothing is required (validation is vacuously true).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty() && self.by_props.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entity_id_serializes_as_scalar() {
        assert_eq!(serde_json::to_value(EntityId::from(1)).unwrap(), json!(1));
        assert_eq!(
            serde_json::to_value(EntityId::from("johnMalcowitch")).unwrap(),
            json!("johnMalcowitch")
        );
    }

    #[test]
    fn test_entity_id_deserializes_by_json_type() {
        let ids: Vec<EntityId> = serde_json::from_value(json!([7, "7"])).unwrap();
        assert_eq!(ids, vec![EntityId::Int(7), EntityId::Str("7".into())]);
        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn test_entity_id_display() {
        assert_eq!(EntityId::from(42).to_string(), "42");
        assert_eq!(EntityId::from("abc").to_string(), "abc");
    }

    #[test]
    fn test_matcher_requires_every_field() {
        let matcher = PropertyMatcher::new()
            .with("fname", "John")
            .with("lname", "Malcowitch");

        assert!(matcher.matches(&json!({"fname": "John", "lname": "Malcowitch", "age": 40})));
        assert!(!matcher.matches(&json!({"fname": "John"})));
        assert!(!matcher.matches(&json!({"fname": "John", "lname": "Malcowich"})));
    }

    #[test]
    fn test_matcher_uses_strict_json_equality() {
        let matcher = PropertyMatcher::new().with("id", 1);

        assert!(matcher.matches(&json!({"id": 1})));
        assert!(!matcher.matches(&json!({"id": "1"})));

        let nested = PropertyMatcher::new().with("tags", json!(["a", "b"]));
        assert!(nested.matches(&json!({"tags": ["a", "b"]})));
        assert!(!nested.matches(&json!({"tags": ["a"]})));
    }

    #[test]
    fn test_matcher_never_matches_non_objects() {
        let empty = PropertyMatcher::new();
        assert!(empty.matches(&json!({})));
        assert!(!empty.matches(&json!("plain string")));
        assert!(!empty.matches(&json!([1, 2])));
    }

    #[test]
    fn test_matcher_try_from_value() {
        let matcher = PropertyMatcher::try_from(json!({"lname": "Malcowitch"})).unwrap();
        assert_eq!(matcher.len(), 1);
        assert_eq!(matcher.to_json(), json!({"lname": "Malcowitch"}));

        let err = PropertyMatcher::try_from(json!([1])).unwrap_err();
        assert!(matches!(err, ExpectationError::NotAnObject { found: "array" }));
    }

    #[test]
    fn test_expectations_builder_keeps_order_and_duplicates() {
        let expectations = Expectations::new().with_ids([3, 1, 3]).with_id("x");

        assert_eq!(
            expectations.by_id,
            vec![
                EntityId::Int(3),
                EntityId::Int(1),
                EntityId::Int(3),
                EntityId::Str("x".into())
            ]
        );
        assert_eq!(expectations.len(), 4);
    }

    #[test]
    fn test_expectations_wire_shape() {
        let expectations = Expectations::new()
            .with_id(1)
            .with_props(PropertyMatcher::new().with("lname", "Malcowitch"));

        assert_eq!(
            serde_json::to_value(&expectations).unwrap(),
            json!({"byId": [1], "byProps": [{"lname": "Malcowitch"}]})
        );
    }

    #[test]
    fn test_expectations_from_json_defaults_missing_keys() {
        let expectations = Expectations::from_json_str(r#"{"byId": ["a"]}"#).unwrap();
        assert_eq!(expectations.by_id, vec![EntityId::from("a")]);
        assert!(expectations.by_props.is_empty());

        assert!(Expectations::from_json_str("{}").unwrap().is_empty());
        assert!(Expectations::from_json_str(r#"{"byProps": [1]}"#).is_err());
    }
}
