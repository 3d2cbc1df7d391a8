//! Slot storage for resting orders.
//!
//! Every resting order lives in exactly one arena slot. Slots carry the
//! intrusive `prev`/`next` links of their price level's FIFO, so an order
//! can be detached from the middle of a level in O(1). Freed slots are
//! chained into a free list and reused.

use pricetime_types::Order;

/// Handle to an occupied arena slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(usize);

/// A resting order plus its position in the level queue.
#[derive(Debug, Clone)]
pub struct OrderNode {
    pub order: Order,
    pub(crate) prev: Option<SlotId>,
    pub(crate) next: Option<SlotId>,
}

#[derive(Debug, Clone)]
enum Slot {
    Occupied(OrderNode),
    /// Next free slot.
    Free(Option<usize>),
}

#[derive(Debug, Clone, Default)]
pub struct OrderArena {
    slots: Vec<Slot>,
    free_head: Option<usize>,
    len: usize,
}

impl OrderArena {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: None,
            len: 0,
        }
    }

    /// Store an unlinked order and return its slot.
    pub fn insert(&mut self, order: Order) -> SlotId {
        let node = Slot::Occupied(OrderNode {
            order,
            prev: None,
            next: None,
        });
        self.len += 1;
        if let Some(idx) = self.free_head {
            if let Slot::Free(next_free) = self.slots[idx] {
                self.free_head = next_free;
            }
            self.slots[idx] = node;
            SlotId(idx)
        } else {
            self.slots.push(node);
            SlotId(self.slots.len() - 1)
        }
    }

    /// Release a slot and return its order. The caller must unlink it first.
    pub fn remove(&mut self, slot: SlotId) -> Option<Order> {
        let entry = self.slots.get_mut(slot.0)?;
        if matches!(entry, Slot::Free(_)) {
            return None;
        }
        let Slot::Occupied(node) = std::mem::replace(entry, Slot::Free(self.free_head)) else {
            return None;
        };
        self.free_head = Some(slot.0);
        self.len -= 1;
        Some(node.order)
    }

    #[must_use]
    pub fn node(&self, slot: SlotId) -> Option<&OrderNode> {
        match self.slots.get(slot.0) {
            Some(Slot::Occupied(node)) => Some(node),
            _ => None,
        }
    }

    pub fn node_mut(&mut self, slot: SlotId) -> Option<&mut OrderNode> {
        match self.slots.get_mut(slot.0) {
            Some(Slot::Occupied(node)) => Some(node),
            _ => None,
        }
    }

    #[must_use]
    pub fn get(&self, slot: SlotId) -> Option<&Order> {
        self.node(slot).map(|n| &n.order)
    }

    pub fn get_mut(&mut self, slot: SlotId) -> Option<&mut Order> {
        self.node_mut(slot).map(|n| &mut n.order)
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
