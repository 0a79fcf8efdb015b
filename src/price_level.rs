//! One price point on one side of the book.
//!
//! A level is a small descriptor over the pool: it records the queue
//! boundaries (oldest and newest order) and running totals, while the queue
//! linkage itself lives in the orders' own `prev`/`next` slots. Splicing an
//! order out is O(1) from any position because the order knows its
//! neighbors.

use crate::pool::{OrderPool, SlotIndex, NULL_INDEX};
use crate::types::Quantity;

/// Time-priority queue of all resting orders at one price.
///
/// `total_qty` is the sum of `remaining` over the queue, not of original
/// quantities: partial fills against a queued order must be mirrored here
/// via [`reduce_total`](Self::reduce_total).
#[derive(Clone, Copy, Debug)]
pub struct PriceLevel {
    /// Oldest order (first to match)
    pub head: SlotIndex,
    /// Newest order (last to match)
    pub tail: SlotIndex,
    /// Sum of `remaining` across the queue
    pub total_qty: u64,
    /// Number of queued orders
    pub count: u32,
}

impl PriceLevel {
    pub const fn new() -> Self {
        Self {
            head: NULL_INDEX,
            tail: NULL_INDEX,
            total_qty: 0,
            count: 0,
        }
    }

    /// A level with no head has no orders at all.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.head == NULL_INDEX
    }

    /// Oldest order at this price, or `NULL_INDEX` when the level is empty.
    #[inline]
    pub const fn front(&self) -> SlotIndex {
        self.head
    }

    /// Queue an order behind everything already at this price.
    ///
    /// Counts the order's `remaining` toward the level total, so an order
    /// that took fills before resting adds only what is left of it.
    ///
    /// # Complexity
    /// O(1)
    #[inline]
    pub fn push_back(&mut self, pool: &mut OrderPool, index: SlotIndex) {
        let order = pool.get_mut(index);
        order.next = NULL_INDEX;
        order.prev = self.tail;
        let arriving = order.remaining as u64;

        if self.tail == NULL_INDEX {
            self.head = index;
        } else {
            pool.get_mut(self.tail).next = index;
        }
        self.tail = index;

        self.count += 1;
        self.total_qty += arriving;
    }

    /// Dequeue the oldest order.
    ///
    /// Its current `remaining` leaves the level total; the slot itself
    /// stays live until the engine releases it.
    ///
    /// # Complexity
    /// O(1)
    #[inline]
    pub fn pop_front(&mut self, pool: &mut OrderPool) -> Option<SlotIndex> {
        let index = self.head;
        if index == NULL_INDEX {
            return None;
        }
        self.unlink(pool, index);
        Some(index)
    }

    /// Splice an order out of the queue, wherever it sits.
    ///
    /// Each end is patched independently: a missing neighbor on one side
    /// means the order was the head (or tail), and the level boundary moves
    /// instead of a link. The slot stays live until the engine releases it.
    ///
    /// # Returns
    /// `true` when this was the last order at the price, so the caller can
    /// drop the level from its ladder.
    ///
    /// # Complexity
    /// O(1)
    #[inline]
    pub fn unlink(&mut self, pool: &mut OrderPool, index: SlotIndex) -> bool {
        let order = pool.get_mut(index);
        let prev = order.prev;
        let next = order.next;
        let departing = order.remaining as u64;
        order.prev = NULL_INDEX;
        order.next = NULL_INDEX;

        if prev == NULL_INDEX {
            debug_assert!(self.head == index, "Unlinking an order from a foreign level");
            self.head = next;
        } else {
            pool.get_mut(prev).next = next;
        }

        if next == NULL_INDEX {
            debug_assert!(self.tail == index, "Unlinking an order from a foreign level");
            self.tail = prev;
        } else {
            pool.get_mut(next).prev = prev;
        }

        self.count -= 1;
        self.total_qty -= departing;

        self.head == NULL_INDEX
    }

    /// Mirror a partial fill against one of this level's queued orders.
    ///
    /// Call after decrementing the order's `remaining` in place.
    #[inline]
    pub fn reduce_total(&mut self, qty: Quantity) {
        debug_assert!(self.total_qty >= qty as u64);
        self.total_qty -= qty as u64;
    }
}

impl Default for PriceLevel {
    fn default() -> Self {
        Self::new()
    }
}
