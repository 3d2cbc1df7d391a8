//! A single price level in the order book.
//!
//! Orders at the same price form a FIFO (time priority). The queue is an
//! intrusive doubly-linked list threaded through [`OrderArena`] slots, so
//! appending, popping the front, and detaching an arbitrary order are all
//! O(1).

use pricetime_types::{Order, Quantity};
use rust_decimal::Decimal;

use crate::arena::{OrderArena, SlotId};

/// A single price level containing all resting orders at that price.
///
/// `head` is the oldest order (highest time priority, filled first).
#[derive(Debug, Clone)]
pub struct PriceLevel {
    /// The price at this level.
    pub price: Decimal,
    head: Option<SlotId>,
    tail: Option<SlotId>,
    len: usize,
}

impl PriceLevel {
    /// Create a new empty price level.
    #[must_use]
    pub fn new(price: Decimal) -> Self {
        Self {
            price,
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Link an arena slot at the back of this level (lowest time priority).
    pub fn push_back(&mut self, arena: &mut OrderArena, slot: SlotId) {
        let old_tail = self.tail;
        if let Some(node) = arena.node_mut(slot) {
            node.prev = old_tail;
            node.next = None;
        }
        match old_tail {
            Some(tail) => {
                if let Some(node) = arena.node_mut(tail) {
                    node.next = Some(slot);
                }
            }
            None => self.head = Some(slot),
        }
        self.tail = Some(slot);
        self.len += 1;
    }

    /// Detach `slot` from this level's queue. The slot stays occupied in
    /// the arena; releasing it is the caller's job.
    pub fn unlink(&mut self, arena: &mut OrderArena, slot: SlotId) {
        let Some(node) = arena.node_mut(slot) else {
            return;
        };
        let (prev, next) = (node.prev.take(), node.next.take());

        match prev {
            Some(p) => {
                if let Some(prev_node) = arena.node_mut(p) {
                    prev_node.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(next_node) = arena.node_mut(n) {
                    next_node.prev = prev;
                }
            }
            None => self.tail = prev,
        }
        self.len -= 1;
    }

    /// Slot of the oldest order at this level.
    #[must_use]
    pub fn front(&self) -> Option<SlotId> {
        self.head
    }

    /// Orders in time-priority order.
    pub fn iter<'a>(&self, arena: &'a OrderArena) -> LevelIter<'a> {
        LevelIter {
            arena,
            cursor: self.head,
        }
    }

    /// Total remaining quantity across all orders at this level, saturating
    /// at `Quantity::MAX`.
    #[must_use]
    pub fn total_quantity(&self, arena: &OrderArena) -> Quantity {
        self.iter(arena)
            .fold(0, |total: Quantity, (_, o)| total.saturating_add(o.remaining))
    }

    /// Returns `true` if there are no orders at this level.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of orders at this level.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }
}

/// Front-to-back walk over one level's queue.
pub struct LevelIter<'a> {
    arena: &'a OrderArena,
    cursor: Option<SlotId>,
}

impl<'a> Iterator for LevelIter<'a> {
    type Item = (SlotId, &'a Order);

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.cursor?;
        let node = self.arena.node(slot)?;
        self.cursor = node.next;
        Some((slot, &node.order))
    }
}
