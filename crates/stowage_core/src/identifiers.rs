//! Placeholder identifiers for path templates.
//!
//! Identifiers available to every template:
//!
//! | Token  | Value                                              |
//! |--------|----------------------------------------------------|
//! | `:id`  | the record's `id` field, or `id` when it has none  |
//! | `:md5` | 32 random hex characters, unique per upload         |
//! | `:y`   | current year                                       |
//! | `:m`   | current month, zero-padded                         |
//! | `:d`   | current day, zero-padded                           |
//!
//! With field identifiers enabled, every scalar in the record is also
//! available. Nested mappings use dotted tokens, so an article with a
//! `creator` mapping exposes `:creator.name`. Lists are never flattened.

use crate::{FieldValue, RecordSnapshot, sanitize};
use chrono::{Datelike, Local, NaiveDate};
use std::collections::BTreeMap;
use stowage_error::{IdentifierError, IdentifierErrorKind, StowageResult};
use tracing::{debug, instrument, trace};
use uuid::Uuid;

/// Deepest mapping nesting that will be flattened.
pub const MAX_DEPTH: usize = 32;

/// Placeholder tokens mapped to their path values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdentifierMap {
    entries: BTreeMap<String, String>,
}

impl IdentifierMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `token` unless it is already present.
    ///
    /// Returns `true` if the value was inserted.
    pub fn insert_if_absent(&mut self, token: impl Into<String>, value: impl Into<String>) -> bool {
        let token = token.into();
        if self.entries.contains_key(&token) {
            return false;
        }
        self.entries.insert(token, value.into());
        true
    }

    /// Returns the value for `token`.
    pub fn get(&self, token: &str) -> Option<&str> {
        self.entries.get(token).map(String::as_str)
    }

    /// Iterates tokens and values in token order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of identifiers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no identifiers.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for IdentifierMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert_if_absent(k, v);
        }
        map
    }
}

/// Values of the time and random built-in identifiers.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct Builtins {
    /// Value of `:md5`
    token: String,
    /// Date behind `:y`, `:m` and `:d`
    date: NaiveDate,
}

impl Builtins {
    /// Creates built-ins from a fixed date and token.
    pub fn new(date: NaiveDate, token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            date,
        }
    }

    /// Captures today's local date and a fresh unique token.
    ///
    /// The token is a time-ordered UUID in simple form: 32 lowercase hex
    /// characters mixing the clock with process randomness.
    pub fn capture() -> Self {
        Self::new(
            Local::now().date_naive(),
            Uuid::now_v7().simple().to_string(),
        )
    }
}

/// Builds the identifier map for a record using the current date and a fresh
/// unique token.
///
/// # Errors
///
/// Returns [`IdentifierError`] if the record contains an empty key or nests
/// mappings deeper than [`MAX_DEPTH`].
///
/// # Example
///
/// ```
/// use stowage_core::{FieldValue, RecordSnapshot, build_identifiers};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let record = RecordSnapshot::from_pairs([
///     ("id", FieldValue::from("7")),
///     ("creator", FieldValue::mapping([("name", "Ada")])),
/// ]);
/// let identifiers = build_identifiers(&record, true)?;
/// assert_eq!(identifiers.get(":id"), Some("7"));
/// assert_eq!(identifiers.get(":creator.name"), Some("Ada"));
/// assert_eq!(identifiers.get(":md5").map(str::len), Some(32));
/// # Ok(())
/// # }
/// ```
pub fn build_identifiers(
    record: &RecordSnapshot,
    field_identifiers: bool,
) -> StowageResult<IdentifierMap> {
    build_identifiers_at(record, field_identifiers, &Builtins::capture())
}

/// Builds the identifier map with explicit built-in values.
///
/// Built-ins are inserted first; a record field can never replace them.
#[instrument(skip(record, builtins), fields(fields = record.len()))]
pub fn build_identifiers_at(
    record: &RecordSnapshot,
    field_identifiers: bool,
    builtins: &Builtins,
) -> StowageResult<IdentifierMap> {
    let id = match record.get("id").and_then(FieldValue::as_scalar) {
        Some(id) if !id.is_empty() => sanitize(id),
        _ => "id".to_string(),
    };

    let mut identifiers = IdentifierMap::new();
    identifiers.insert_if_absent(":id", id);
    identifiers.insert_if_absent(":md5", builtins.token.clone());
    identifiers.insert_if_absent(":y", format!("{:04}", builtins.date.year()));
    identifiers.insert_if_absent(":m", format!("{:02}", builtins.date.month()));
    identifiers.insert_if_absent(":d", format!("{:02}", builtins.date.day()));

    if field_identifiers {
        let mut flattened = Vec::new();
        for (key, value) in record.iter() {
            flatten(key, value, "", 0, &mut flattened)?;
        }
        for (token, value) in flattened {
            if !identifiers.insert_if_absent(token.as_str(), value) {
                trace!(token = %token, "Field identifier shadowed by built-in");
            }
        }
    }

    debug!(count = identifiers.len(), "Built identifiers");
    Ok(identifiers)
}

/// Appends `(token, value)` pairs for every scalar under `key`.
fn flatten(
    key: &str,
    value: &FieldValue,
    parent: &str,
    depth: usize,
    out: &mut Vec<(String, String)>,
) -> StowageResult<()> {
    if key.is_empty() {
        let at = if parent.is_empty() { "<root>" } else { parent };
        return Err(IdentifierError::new(IdentifierErrorKind::EmptyKey(at.to_string())).into());
    }

    let path = if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    };

    match value {
        FieldValue::Mapping(entries) => {
            if depth >= MAX_DEPTH {
                return Err(IdentifierError::new(IdentifierErrorKind::DepthExceeded {
                    path,
                    limit: MAX_DEPTH,
                })
                .into());
            }
            for (child_key, child) in entries {
                flatten(child_key, child, &path, depth + 1, out)?;
            }
        }
        FieldValue::Sequence(_) => {
            trace!(path = %path, "Skipping list value");
        }
        FieldValue::Null | FieldValue::Scalar(_) => {
            let resolved = match value.as_scalar() {
                Some(s) if !value.is_blank() => sanitize(s),
                _ => sanitize(key),
            };
            out.push((format!(":{}", path), resolved));
        }
    }

    Ok(())
}
