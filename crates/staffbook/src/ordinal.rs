//! Ordinal addressing for listed records.
//!
//! The console shows records numbered 1..N in the order the store returned
//! them, and the operator picks a record by that number. [`OrdinalMap`]
//! translates the number back to the persistent identifier. It reflects the
//! most recent list fetch only: after an insert or delete the owner must call
//! [`OrdinalMap::rebuild`] again before resolving.

use crate::employee::{Employee, RecordId};

/// Session-local table from display numbers to record identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrdinalMap {
    slots: Vec<Option<RecordId>>,
}

impl OrdinalMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the mapping with `1..=N` over `records` in iteration order.
    pub fn rebuild<'a>(&mut self, records: impl IntoIterator<Item = &'a Employee>) {
        self.slots.clear();
        self.slots
            .extend(records.into_iter().map(|record| record.id().cloned()));
    }

    /// Look up the identifier shown as `ordinal`.
    ///
    /// Returns `None` for 0, for numbers past the end, and for a slot whose
    /// record had no identifier.
    #[must_use]
    pub fn resolve(&self, ordinal: usize) -> Option<&RecordId> {
        let index = ordinal.checked_sub(1)?;
        self.slots.get(index)?.as_ref()
    }

    /// Number of slots from the last rebuild.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if the last rebuild saw no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Drop every mapping.
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}
