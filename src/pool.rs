//! Order pool - O(1) slab allocator with cache-line aligned order slots.
//!
//! The pool pre-allocates a contiguous block of order slots at startup,
//! eliminating heap allocation in the hot path. A free list threaded through
//! the slots' intrusive `next` links gives O(1) acquire and release.

use std::fmt;

use crate::types::{now, OrderId, OrderType, Price, Quantity, Side, Timestamp};

/// Sentinel value representing a null/invalid slot index (like nullptr)
pub const NULL_INDEX: u32 = u32::MAX;

/// Type alias for pool slot indices - our "compressed pointers".
/// u32 instead of 64-bit pointers halves linkage metadata, doubling cache
/// efficiency.
pub type SlotIndex = u32;

/// A single order - exactly 64 bytes (one cache line).
///
/// # Memory Layout
///
/// | Field      | Type    | Offset | Size |
/// |------------|---------|--------|------|
/// | price      | i64     | 0      | 8    |
/// | id         | u64     | 8      | 8    |
/// | timestamp  | u64     | 16     | 8    |
/// | quantity   | u32     | 24     | 4    |
/// | remaining  | u32     | 28     | 4    |
/// | next       | u32     | 32     | 4    |
/// | prev       | u32     | 36     | 4    |
/// | side       | u8      | 40     | 1    |
/// | order_type | u8      | 41     | 1    |
/// | _reserved  | [u8;22] | 42     | 22   |
/// | **Total**  |         |        | 64   |
#[repr(C)]
#[repr(align(64))]
#[derive(Clone, Copy)]
pub struct Order {
    // === Hot data (read on every fill) ===

    /// Limit price in ticks (ignored for market orders)
    pub price: Price,

    /// External order id (client-assigned)
    pub id: OrderId,

    /// Monotonic construction time, diagnostic only
    pub timestamp: Timestamp,

    /// Original quantity
    pub quantity: Quantity,

    /// Quantity left to fill
    pub remaining: Quantity,

    // === Linkage (FIFO queue position within a PriceLevel) ===

    /// Next order at the same price level; free-list link while unallocated
    pub next: SlotIndex,

    /// Previous order at the same price level (enables O(1) cancel)
    pub prev: SlotIndex,

    // === Cold data ===

    pub side: Side,
    pub order_type: OrderType,

    pub _reserved: [u8; 22],
}

// Compile-time assertion: Order must be exactly 64 bytes
const _: () = assert!(
    std::mem::size_of::<Order>() == 64,
    "Order must be exactly 64 bytes (one cache line)"
);

// Compile-time assertion: Order must be 64-byte aligned
const _: () = assert!(
    std::mem::align_of::<Order>() == 64,
    "Order must be 64-byte aligned"
);

impl Order {
    /// Create an empty/uninitialized order (free-list filler)
    #[inline]
    pub const fn empty() -> Self {
        Self {
            price: 0,
            id: 0,
            timestamp: 0,
            quantity: 0,
            remaining: 0,
            next: NULL_INDEX,
            prev: NULL_INDEX,
            side: Side::Buy,
            order_type: OrderType::Limit,
            _reserved: [0u8; 22],
        }
    }

    /// Fill up to `qty` units; returns how much was actually filled.
    #[inline]
    pub fn fill(&mut self, qty: Quantity) -> Quantity {
        let filled = qty.min(self.remaining);
        self.remaining -= filled;
        filled
    }

    /// Is this order fully filled?
    #[inline]
    pub const fn is_filled(&self) -> bool {
        self.remaining == 0
    }

    /// Reset the slot for reuse (when returning to the free list)
    #[inline]
    fn reset(&mut self) {
        self.price = 0;
        self.id = 0;
        self.timestamp = 0;
        self.quantity = 0;
        self.remaining = 0;
        self.next = NULL_INDEX;
        self.prev = NULL_INDEX;
    }
}

impl fmt::Debug for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Order")
            .field("id", &self.id)
            .field("side", &self.side)
            .field("order_type", &self.order_type)
            .field("price", &self.price)
            .field("quantity", &self.quantity)
            .field("remaining", &self.remaining)
            .field("prev", &self.prev)
            .field("next", &self.next)
            .finish()
    }
}

/// Pre-allocated order storage with O(1) acquire and release.
///
/// The free list is a stack of slot indices threaded through the `next`
/// field of unallocated slots; slot 0 is dispensed first. No system calls,
/// no locks, no reallocation after construction.
pub struct OrderPool {
    /// Contiguous block of pre-allocated slots
    slots: Vec<Order>,

    /// Head of the free list (top of the stack)
    free_head: SlotIndex,

    /// Number of currently live orders
    allocated_count: u32,

    /// Total capacity
    capacity: u32,
}

impl OrderPool {
    /// Create a new pool with the specified capacity.
    ///
    /// # Panics
    /// Panics if capacity exceeds u32::MAX - 1 (MAX is reserved for NULL_INDEX)
    pub fn new(capacity: u32) -> Self {
        assert!(capacity < NULL_INDEX, "Capacity must be less than NULL_INDEX");

        let mut slots = vec![Order::empty(); capacity as usize];

        // Thread the free list so slot 0 is at the top of the stack
        for i in 0..capacity.saturating_sub(1) {
            slots[i as usize].next = i + 1;
        }
        if capacity > 0 {
            slots[(capacity - 1) as usize].next = NULL_INDEX;
        }

        Self {
            slots,
            free_head: if capacity > 0 { 0 } else { NULL_INDEX },
            allocated_count: 0,
            capacity,
        }
    }

    /// Acquire a slot and construct an order in it.
    ///
    /// Returns `None` when the pool is exhausted.
    ///
    /// # Complexity
    /// O(1) - pops from the head of the free list
    #[inline]
    pub fn acquire(
        &mut self,
        id: OrderId,
        side: Side,
        order_type: OrderType,
        price: Price,
        quantity: Quantity,
    ) -> Option<SlotIndex> {
        if self.free_head == NULL_INDEX {
            return None;
        }

        let index = self.free_head;
        self.free_head = self.slots[index as usize].next;
        self.allocated_count += 1;

        let slot = &mut self.slots[index as usize];
        slot.price = price;
        slot.id = id;
        slot.timestamp = now();
        slot.quantity = quantity;
        slot.remaining = quantity;
        slot.next = NULL_INDEX;
        slot.prev = NULL_INDEX;
        slot.side = side;
        slot.order_type = order_type;

        Some(index)
    }

    /// Release a slot back to the pool.
    ///
    /// The caller must ensure the index was previously acquired and has not
    /// already been released, and that no book structure still references it.
    ///
    /// # Complexity
    /// O(1) - pushes onto the head of the free list
    #[inline]
    pub fn release(&mut self, index: SlotIndex) {
        debug_assert!(index < self.capacity, "Index out of bounds");
        debug_assert!(self.allocated_count > 0, "Double release detected");

        self.slots[index as usize].reset();
        self.slots[index as usize].next = self.free_head;
        self.free_head = index;
        self.allocated_count -= 1;
    }

    /// Get an immutable reference to an order.
    #[inline]
    pub fn get(&self, index: SlotIndex) -> &Order {
        debug_assert!(index < self.capacity, "Index out of bounds");
        &self.slots[index as usize]
    }

    /// Get a mutable reference to an order.
    #[inline]
    pub fn get_mut(&mut self, index: SlotIndex) -> &mut Order {
        debug_assert!(index < self.capacity, "Index out of bounds");
        &mut self.slots[index as usize]
    }

    /// Number of currently live orders.
    #[inline]
    pub fn allocated(&self) -> u32 {
        self.allocated_count
    }

    /// Total capacity of the pool.
    #[inline]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Number of free slots remaining.
    #[inline]
    pub fn available(&self) -> u32 {
        self.capacity - self.allocated_count
    }

    /// Returns true if no orders are live.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.allocated_count == 0
    }

    /// Returns true if the pool has no free slots.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.free_head == NULL_INDEX
    }

    /// Pre-fault all memory pages (warm-up routine).
    ///
    /// Walks every slot to force the OS to map virtual pages to physical
    /// RAM, preventing page faults in the hot path.
    pub fn warm_up(&mut self) {
        for slot in &mut self.slots {
            // Volatile write to prevent the touch being optimized away
            unsafe {
                std::ptr::write_volatile(&mut slot._reserved[0], 0);
            }
        }
    }
}

impl fmt::Debug for OrderPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderPool")
            .field("capacity", &self.capacity)
            .field("allocated", &self.allocated_count)
            .field("free_head", &self.free_head)
            .finish()
    }
}
