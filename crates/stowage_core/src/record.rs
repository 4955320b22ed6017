//! Typed access to the record being saved.

use crate::{FieldValue, RecordSnapshot};

/// Field access on whatever record type the persistence layer provides.
///
/// The upload processor only ever reads and writes fields through this trait,
/// so it is independent of any particular entity shape.
///
/// # Example
///
/// ```
/// use stowage_core::{FieldValue, Record, RecordSnapshot};
///
/// let mut record = RecordSnapshot::from_pairs([("id", "7")]);
/// record.set("avatar", FieldValue::from("uploads/7/a.jpg"));
/// assert_eq!(
///     Record::get(&record, "avatar"),
///     Some(FieldValue::from("uploads/7/a.jpg"))
/// );
/// record.unset("avatar");
/// assert!(Record::get(&record, "avatar").is_none());
/// ```
pub trait Record {
    /// Returns the current value of `field`.
    fn get(&self, field: &str) -> Option<FieldValue>;

    /// Sets `field` to `value`.
    fn set(&mut self, field: &str, value: FieldValue);

    /// Removes `field`.
    fn unset(&mut self, field: &str);

    /// Returns all field values, used to build path identifiers.
    fn snapshot(&self) -> RecordSnapshot;
}

impl Record for RecordSnapshot {
    fn get(&self, field: &str) -> Option<FieldValue> {
        RecordSnapshot::get(self, field).cloned()
    }

    fn set(&mut self, field: &str, value: FieldValue) {
        self.insert(field, value);
    }

    fn unset(&mut self, field: &str) {
        self.remove(field);
    }

    fn snapshot(&self) -> RecordSnapshot {
        self.clone()
    }
}
