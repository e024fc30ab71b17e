//! Item records: a store-assigned integer id plus caller-defined fields.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ModelError;

/// Caller-defined payload of an item. Field names and value types are not
/// constrained beyond being a JSON object.
pub type ItemFields = Map<String, Value>;

pub const ID_FIELD: &str = "id";

/// A stored item. Serializes flat, e.g. `{"id": 2, "name": "b"}`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub id: u64,
    #[serde(flatten)]
    pub fields: ItemFields,
}

impl Item {
    /// Build a record; an `id` key inside `fields` is dropped.
    pub fn new(id: u64, mut fields: ItemFields) -> Self {
        fields.remove(ID_FIELD);
        Self { id, fields }
    }

    /// Shallow merge: keys in `patch` replace or extend the current fields.
    /// The id is immutable, so a patched `id` is ignored.
    pub fn merge(&mut self, patch: ItemFields) {
        for (key, value) in patch {
            if key == ID_FIELD {
                continue;
            }
            self.fields.insert(key, value);
        }
    }
}

/// Accept a request body as item fields; only JSON objects qualify.
pub fn fields_from_value(value: Value) -> Result<ItemFields, ModelError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(ModelError::Validation(format!(
            "item body must be a JSON object, got {}",
            kind_of(&other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Check a loaded collection: every id positive and unique.
pub fn validate_collection(items: &[Item]) -> Result<(), ModelError> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if item.id == 0 {
            return Err(ModelError::Integrity("item id 0 is not a positive integer".into()));
        }
        if !seen.insert(item.id) {
            return Err(ModelError::Integrity(format!("duplicate item id {}", item.id)));
        }
    }
    Ok(())
}

/// One greater than the largest id present; 1 for an empty collection.
///
/// Derived from the records on disk, not a stored counter: once the highest
/// id is deleted, the next create issues it again.
pub fn next_id(items: &[Item]) -> Result<u64, ModelError> {
    let max = items.iter().map(|i| i.id).max().unwrap_or(0);
    max.checked_add(1)
        .ok_or_else(|| ModelError::Validation("item id space exhausted".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(v: Value) -> ItemFields {
        fields_from_value(v).unwrap()
    }

    #[test]
    fn serializes_flat_with_id() {
        let item = Item::new(3, fields(json!({"name": "c", "quantity": 2})));
        let v = serde_json::to_value(&item).unwrap();
        assert_eq!(v, json!({"id": 3, "name": "c", "quantity": 2}));
    }

    #[test]
    fn deserializes_flat_record() {
        let item: Item = serde_json::from_value(json!({"id": 7, "name": "x", "tags": ["a"]})).unwrap();
        assert_eq!(item.id, 7);
        assert_eq!(item.fields.get("name"), Some(&json!("x")));
        assert!(!item.fields.contains_key("id"));
    }

    #[test]
    fn negative_or_missing_id_does_not_parse() {
        assert!(serde_json::from_value::<Item>(json!({"id": -1})).is_err());
        assert!(serde_json::from_value::<Item>(json!({"name": "no id"})).is_err());
        assert!(serde_json::from_value::<Item>(json!({"id": "1"})).is_err());
    }

    #[test]
    fn new_drops_caller_id() {
        let item = Item::new(1, fields(json!({"id": 99, "name": "a"})));
        assert_eq!(item.id, 1);
        assert!(!item.fields.contains_key("id"));
    }

    #[test]
    fn merge_overwrites_adds_and_keeps_id() {
        let mut item = Item::new(5, fields(json!({"name": "a", "quantity": 1})));
        item.merge(fields(json!({"quantity": 4, "color": "red", "id": 42})));
        assert_eq!(item.id, 5);
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!({"id": 5, "name": "a", "quantity": 4, "color": "red"})
        );
    }

    #[test]
    fn merge_replaces_nested_objects() {
        let mut item = Item::new(1, fields(json!({"meta": {"a": 1, "b": 2}})));
        item.merge(fields(json!({"meta": {"a": 3}})));
        assert_eq!(item.fields["meta"], json!({"a": 3}));
    }

    #[test]
    fn non_object_bodies_rejected() {
        for v in [json!([1, 2]), json!("s"), json!(1), json!(null), json!(true)] {
            assert!(matches!(fields_from_value(v), Err(ModelError::Validation(_))));
        }
    }

    #[test]
    fn next_id_uses_max_not_count() {
        assert_eq!(next_id(&[]).unwrap(), 1);
        let items = vec![Item::new(2, ItemFields::new()), Item::new(9, ItemFields::new())];
        assert_eq!(next_id(&items).unwrap(), 10);
        let full = vec![Item::new(u64::MAX, ItemFields::new())];
        assert!(next_id(&full).is_err());
    }

    #[test]
    fn collection_validation() {
        let ok = vec![Item::new(1, ItemFields::new()), Item::new(3, ItemFields::new())];
        assert!(validate_collection(&ok).is_ok());
        let dup = vec![Item::new(1, ItemFields::new()), Item::new(1, ItemFields::new())];
        assert!(matches!(validate_collection(&dup), Err(ModelError::Integrity(_))));
        let zero = vec![Item::new(0, ItemFields::new())];
        assert!(matches!(validate_collection(&zero), Err(ModelError::Integrity(_))));
    }
}
