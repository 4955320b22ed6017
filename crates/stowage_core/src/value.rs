//! Record field values.
//!
//! Records arrive from the persistence layer as arbitrary nested data. They are
//! modelled as a tagged variant so identifier flattening can match on shape
//! instead of guessing from key patterns.

use serde_json::Value;

/// A single field value in a record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldValue {
    /// Absent or null value
    #[default]
    Null,
    /// Leaf value in string form
    Scalar(String),
    /// Associative data, in insertion order
    Mapping(Vec<(String, FieldValue)>),
    /// List-like data
    Sequence(Vec<FieldValue>),
}

impl FieldValue {
    /// Build a mapping from key/value pairs.
    pub fn mapping<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Mapping(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Returns the scalar string, if this is a scalar.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the entries, if this is a mapping.
    pub fn as_mapping(&self) -> Option<&[(String, FieldValue)]> {
        match self {
            Self::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    /// Looks up a key in a mapping. Returns `None` for non-mappings.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.as_mapping()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Whether the value counts as empty for identifier purposes.
    ///
    /// Null, the empty string and `"0"` are empty, as are empty mappings and
    /// sequences.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Scalar(s) => s.is_empty() || s == "0",
            Self::Mapping(entries) => entries.is_empty(),
            Self::Sequence(items) => items.is_empty(),
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Scalar(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        // Same string forms a template author sees from the web layer.
        Self::Scalar(if value { "1" } else { "" }.to_string())
    }
}

impl From<Vec<FieldValue>> for FieldValue {
    fn from(items: Vec<FieldValue>) -> Self {
        Self::Sequence(items)
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => b.into(),
            Value::Number(n) => Self::Scalar(n.to_string()),
            Value::String(s) => Self::Scalar(s),
            Value::Array(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            Value::Object(map) => {
                if is_index_keyed(map.keys().map(String::as_str)) {
                    let mut items: Vec<(usize, Value)> = map
                        .into_iter()
                        .filter_map(|(k, v)| k.parse().ok().map(|i| (i, v)))
                        .collect();
                    items.sort_by_key(|(i, _)| *i);
                    Self::Sequence(items.into_iter().map(|(_, v)| Self::from(v)).collect())
                } else {
                    Self::Mapping(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
                }
            }
        }
    }
}

/// True when the keys are exactly the indices `0..n` in some order.
fn is_index_keyed<'a>(keys: impl Iterator<Item = &'a str>) -> bool {
    let mut indices = Vec::new();
    for key in keys {
        // "01" is a string key, not an index
        if key.len() > 1 && key.starts_with('0') {
            return false;
        }
        match key.parse::<usize>() {
            Ok(i) => indices.push(i),
            Err(_) => return false,
        }
    }
    indices.sort_unstable();
    !indices.is_empty() && indices.iter().enumerate().all(|(expected, i)| expected == *i)
}

/// The record's field values at save time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordSnapshot {
    fields: Vec<(String, FieldValue)>,
}

impl RecordSnapshot {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from key/value pairs.
    pub fn from_pairs<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut snapshot = Self::new();
        for (k, v) in entries {
            snapshot.insert(k, v);
        }
        snapshot
    }

    /// Builds a snapshot from a JSON object. Returns `None` for other JSON shapes.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self {
                fields: map
                    .into_iter()
                    .map(|(k, v)| (k, FieldValue::from(v)))
                    .collect(),
            }),
            _ => None,
        }
    }

    /// Returns the value for `key`.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Sets `key`, replacing an existing value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        let index = self.fields.iter().position(|(k, _)| k == key)?;
        Some(self.fields.remove(index).1)
    }

    /// Iterates fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of top-level fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the snapshot has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dense_object_keys_become_sequence() {
        let value = FieldValue::from(json!({"0": "a", "1": "b"}));
        assert!(matches!(value, FieldValue::Sequence(ref items) if items.len() == 2));
    }

    #[test]
    fn test_sparse_object_keys_stay_mapping() {
        let value = FieldValue::from(json!({"1": "a", "2": "b"}));
        assert!(value.as_mapping().is_some());
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut snapshot = RecordSnapshot::from_pairs([("id", "1"), ("name", "a")]);
        snapshot.insert("id", "2");
        let keys: Vec<_> = snapshot.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["id", "name"]);
        assert_eq!(snapshot.get("id"), Some(&FieldValue::from("2")));
    }
}
