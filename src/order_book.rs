//! Order book - the central limit order book data structure.
//!
//! Maintains bid and ask price ladders with O(log L) best-price access,
//! O(1) order lookup for cancellation, and the price-time priority matching
//! algorithm.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use crate::pool::{OrderPool, SlotIndex, NULL_INDEX};
use crate::price_level::PriceLevel;
use crate::types::{EngineError, OrderId, OrderType, Price, Side, Trade};

/// Mapping from OrderId to pool slot for O(1) cancel lookup.
/// An id is present iff the order is currently resting on a ladder.
pub type OrderMap = FxHashMap<OrderId, SlotIndex>;

/// Outcome of matching one incoming order.
///
/// `filled_resting` holds the slots of resting orders this match fully
/// consumed; they are already unlinked from their level and from the ID
/// index, and the caller must release them back to the pool.
#[derive(Debug, Default)]
pub struct MatchResult {
    /// Executed trades, in execution order (outermost price first, FIFO
    /// within a level)
    pub trades: Vec<Trade>,
    /// Fully consumed resting orders, awaiting release by the caller
    pub filled_resting: Vec<SlotIndex>,
}

/// The limit order book for a single instrument.
///
/// Ladders are ordered maps keyed by price: the best bid is the bids' last
/// key (highest), the best ask is the asks' first key (lowest). Each level
/// holds an intrusive FIFO over pool slots. The book stores only slot
/// indices; the pool owns the orders and the engine owns every release.
pub struct OrderBook {
    /// Bid price levels (buy orders), best = highest price
    pub bids: BTreeMap<Price, PriceLevel>,
    /// Ask price levels (sell orders), best = lowest price
    pub asks: BTreeMap<Price, PriceLevel>,
    /// Order lookup map: OrderId -> pool slot
    order_map: OrderMap,
}

impl OrderBook {
    /// Create a new empty order book
    pub fn new() -> Self {
        Self {
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            order_map: OrderMap::default(),
        }
    }

    /// Create a new order book with a pre-reserved ID index
    pub fn with_capacity(orders: usize) -> Self {
        Self {
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            order_map: OrderMap::with_capacity_and_hasher(orders, Default::default()),
        }
    }

    // ========================================================================
    // Best Price Access
    // ========================================================================

    /// Get the best bid price (highest buy price)
    #[inline]
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.last_key_value().map(|(price, _)| *price)
    }

    /// Get the best ask price (lowest sell price)
    #[inline]
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.first_key_value().map(|(price, _)| *price)
    }

    /// Get the best price an incoming order on `side` would match against
    #[inline]
    pub fn best_opposite_price(&self, side: Side) -> Option<Price> {
        match side {
            Side::Buy => self.best_ask(),  // Buyer matches the lowest ask
            Side::Sell => self.best_bid(), // Seller matches the highest bid
        }
    }

    /// Spread (best ask - best bid) when both sides have liquidity
    #[inline]
    pub fn spread(&self) -> Option<Price> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }

    // ========================================================================
    // Level Access
    // ========================================================================

    /// Get a price level (immutable)
    #[inline]
    pub fn get_level(&self, side: Side, price: Price) -> Option<&PriceLevel> {
        match side {
            Side::Buy => self.bids.get(&price),
            Side::Sell => self.asks.get(&price),
        }
    }

    /// Resting depth at a price: (total remaining qty, order count)
    pub fn depth_at(&self, side: Side, price: Price) -> (u64, u32) {
        self.get_level(side, price)
            .map(|level| (level.total_qty, level.count))
            .unwrap_or((0, 0))
    }

    // ========================================================================
    // Order Management
    // ========================================================================

    /// Insert a resting order into the book.
    ///
    /// Precondition: `remaining > 0` and the slot is not already linked into
    /// any level. Rejects a duplicate live id without touching the ladders;
    /// the caller still owns the slot in that case.
    ///
    /// O(log L) on first insertion at a new price, O(1) enqueue thereafter.
    pub fn add_order(&mut self, pool: &mut OrderPool, slot: SlotIndex) -> Result<(), EngineError> {
        let (id, side, price) = {
            let order = pool.get(slot);
            debug_assert!(order.remaining > 0, "Resting order must have quantity left");
            debug_assert!(
                order.next == NULL_INDEX && order.prev == NULL_INDEX,
                "Order is already linked into a level"
            );
            (order.id, order.side, order.price)
        };

        if self.order_map.contains_key(&id) {
            return Err(EngineError::DuplicateOrderId);
        }
        self.order_map.insert(id, slot);

        let level = match side {
            Side::Buy => self.bids.entry(price).or_insert_with(PriceLevel::new),
            Side::Sell => self.asks.entry(price).or_insert_with(PriceLevel::new),
        };
        level.push_back(pool, slot);

        Ok(())
    }

    /// Remove a resting order from the book by id.
    ///
    /// Unlinks the order from its level in O(1) via the stored links,
    /// erases the level if it became empty, and removes the ID entry.
    ///
    /// # Returns
    /// The order's slot for the caller to release, or `None` if the id is
    /// not resting. The book never releases pool slots itself.
    pub fn cancel_order(&mut self, pool: &mut OrderPool, id: OrderId) -> Option<SlotIndex> {
        let slot = self.order_map.remove(&id)?;

        let (side, price) = {
            let order = pool.get(slot);
            (order.side, order.price)
        };

        let ladder = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        if let Some(level) = ladder.get_mut(&price) {
            let now_empty = level.unlink(pool, slot);
            if now_empty {
                ladder.remove(&price);
            }
        }

        Some(slot)
    }

    /// Look up the pool slot of a resting order.
    #[inline]
    pub fn lookup(&self, id: OrderId) -> Option<SlotIndex> {
        self.order_map.get(&id).copied()
    }

    /// Check if an order is resting in the book.
    #[inline]
    pub fn contains(&self, id: OrderId) -> bool {
        self.order_map.contains_key(&id)
    }

    // ========================================================================
    // Matching (price-time priority)
    // ========================================================================

    /// Match an incoming order against the opposite side of the book.
    ///
    /// Sweeps best-first across opposite levels while the cross condition
    /// holds (market orders cross any level; limit buys cross while
    /// `price >= best ask`, limit sells while `price <= best bid`), consuming
    /// each level in FIFO order. Trades print at the resting order's price.
    ///
    /// The incoming order's `remaining` is decremented in place; the caller
    /// decides whether the residual rests (limit) or is dropped (market).
    pub fn match_order(&mut self, pool: &mut OrderPool, incoming: SlotIndex) -> MatchResult {
        let mut result = MatchResult::default();

        let (side, order_type, limit_price) = {
            let order = pool.get(incoming);
            (order.side, order.order_type, order.price)
        };

        while pool.get(incoming).remaining > 0 {
            let best_price = match self.best_opposite_price(side) {
                Some(price) => price,
                None => break, // opposite ladder is empty
            };

            let crosses = match (order_type, side) {
                (OrderType::Market, _) => true,
                (OrderType::Limit, Side::Buy) => limit_price >= best_price,
                (OrderType::Limit, Side::Sell) => limit_price <= best_price,
            };
            if !crosses {
                break;
            }

            self.match_at_level(pool, incoming, side, best_price, &mut result);

            // Erase the level if the sweep emptied it, exposing the next best
            let ladder = match side {
                Side::Buy => &mut self.asks,
                Side::Sell => &mut self.bids,
            };
            if ladder.get(&best_price).map_or(false, |level| level.is_empty()) {
                ladder.remove(&best_price);
            }
        }

        result
    }

    /// Consume resting orders at one opposite level in FIFO order.
    fn match_at_level(
        &mut self,
        pool: &mut OrderPool,
        incoming: SlotIndex,
        taker_side: Side,
        level_price: Price,
        result: &mut MatchResult,
    ) {
        let taker_id = pool.get(incoming).id;

        loop {
            if pool.get(incoming).remaining == 0 {
                return;
            }

            let ladder = match taker_side {
                Side::Buy => &mut self.asks,
                Side::Sell => &mut self.bids,
            };
            let level = match ladder.get_mut(&level_price) {
                Some(level) => level,
                None => return,
            };

            let maker_slot = level.front();
            if maker_slot == NULL_INDEX {
                return;
            }

            let (maker_id, maker_remaining) = {
                let maker = pool.get(maker_slot);
                (maker.id, maker.remaining)
            };

            let fill_qty = pool.get(incoming).remaining.min(maker_remaining);

            pool.get_mut(incoming).fill(fill_qty);
            pool.get_mut(maker_slot).fill(fill_qty);
            level.reduce_total(fill_qty);

            // Buy/sell participants keep their roles regardless of who was
            // resting; the trade prints at the resting order's price
            let (buy_id, sell_id) = match taker_side {
                Side::Buy => (taker_id, maker_id),
                Side::Sell => (maker_id, taker_id),
            };
            result.trades.push(Trade::new(buy_id, sell_id, level_price, fill_qty));

            if pool.get(maker_slot).is_filled() {
                let ladder = match taker_side {
                    Side::Buy => &mut self.asks,
                    Side::Sell => &mut self.bids,
                };
                if let Some(level) = ladder.get_mut(&level_price) {
                    level.pop_front(pool);
                }
                self.order_map.remove(&maker_id);
                result.filled_resting.push(maker_slot);
            }
        }
    }

    // ========================================================================
    // Utility Methods
    // ========================================================================

    /// Number of orders resting in the book
    pub fn order_count(&self) -> usize {
        self.order_map.len()
    }

    /// Number of bid price levels
    pub fn bid_level_count(&self) -> usize {
        self.bids.len()
    }

    /// Number of ask price levels
    pub fn ask_level_count(&self) -> usize {
        self.asks.len()
    }

    /// Check if the book is empty
    pub fn is_empty(&self) -> bool {
        self.order_map.is_empty()
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for OrderBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderBook")
            .field("best_bid", &self.best_bid())
            .field("best_ask", &self.best_ask())
            .field("bid_levels", &self.bids.len())
            .field("ask_levels", &self.asks.len())
            .field("order_count", &self.order_map.len())
            .finish()
    }
}
