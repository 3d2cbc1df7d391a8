//! Order identifier → location lookup.
//!
//! An id is present if and only if the order currently rests in some price
//! level. Entries are written and removed in the same step that links or
//! unlinks the order, so the index never drifts from the side books.

use std::collections::HashMap;

use pricetime_types::{OrderId, Side};
use rust_decimal::Decimal;

use crate::arena::SlotId;

/// Where a resting order lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub side: Side,
    pub price: Decimal,
    pub slot: SlotId,
}

#[derive(Debug, Clone, Default)]
pub struct OrderIndex {
    entries: HashMap<OrderId, IndexEntry>,
}

impl OrderIndex {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
        }
    }

    /// Record a newly rested order. Returns the previous entry, which the
    /// caller must treat as a broken invariant.
    pub fn insert(&mut self, id: OrderId, entry: IndexEntry) -> Option<IndexEntry> {
        self.entries.insert(id, entry)
    }

    #[must_use]
    pub fn get(&self, id: OrderId) -> Option<&IndexEntry> {
        self.entries.get(&id)
    }

    pub fn remove(&mut self, id: OrderId) -> Option<IndexEntry> {
        self.entries.remove(&id)
    }

    /// Point an existing entry at a new price. Slot and side are unchanged.
    pub fn relocate(&mut self, id: OrderId, price: Decimal) -> bool {
        match self.entries.get_mut(&id) {
            Some(entry) => {
                entry.price = price;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn contains(&self, id: OrderId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OrderId, &IndexEntry)> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
