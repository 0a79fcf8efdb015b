//! Matching engine facade - owns the pool and the book.
//!
//! Mediates order lifetime: every pool slot is acquired here on submission
//! and released here exactly once - when the incoming order fully fills,
//! when a market residual is dropped, when a resting order is consumed by a
//! counter-match, or on cancellation. Also hosts the command loop with CPU
//! pinning and warm-up.

use tracing::{debug, trace, warn};

use crate::command::{
    CancelOrder, Command, EngineEvent, ModifyOrder, OrderAccepted, OrderCanceled, OrderRejected,
    SubmitLimit, SubmitMarket,
};
use crate::order_book::{MatchResult, OrderBook};
use crate::pool::OrderPool;
use crate::types::{EngineError, OrderId, OrderType, Price, Quantity, Side, Trade};

/// The matching engine core: one pool, one book, one instrument, one thread.
pub struct MatchingEngine {
    /// Order storage; the engine is the sole caller of `release`
    pool: OrderPool,
    /// The limit order book
    book: OrderBook,
    /// Total orders accepted into matching
    orders_submitted: u64,
    /// Total trades emitted
    trades_executed: u64,
}

impl MatchingEngine {
    /// Create a new engine with the specified order capacity.
    pub fn new(capacity: u32) -> Self {
        debug!(capacity, "matching engine created");
        Self {
            pool: OrderPool::new(capacity),
            book: OrderBook::with_capacity(capacity as usize),
            orders_submitted: 0,
            trades_executed: 0,
        }
    }

    /// Submit a limit order.
    ///
    /// Matches against the opposite side first; any residual quantity rests
    /// in the book. Returns the trades in execution order.
    pub fn submit_limit(
        &mut self,
        id: OrderId,
        side: Side,
        price: Price,
        qty: Quantity,
    ) -> Result<Vec<Trade>, EngineError> {
        self.validate(id, qty)?;

        let slot = self
            .pool
            .acquire(id, side, OrderType::Limit, price, qty)
            .ok_or_else(|| {
                warn!(id, "submission rejected: pool exhausted");
                EngineError::PoolExhausted
            })?;
        self.orders_submitted += 1;

        let MatchResult {
            trades,
            filled_resting,
        } = self.book.match_order(&mut self.pool, slot);
        self.trades_executed += trades.len() as u64;

        for filled in filled_resting {
            self.pool.release(filled);
        }

        let remaining = self.pool.get(slot).remaining;
        if remaining > 0 {
            if let Err(err) = self.book.add_order(&mut self.pool, slot) {
                self.pool.release(slot);
                return Err(err);
            }
            trace!(id, ?side, price, remaining, "limit order resting");
        } else {
            self.pool.release(slot);
            trace!(id, ?side, price, "limit order fully filled");
        }

        Ok(trades)
    }

    /// Submit a market order.
    ///
    /// Matches against whatever opposite liquidity exists; any unfilled
    /// remainder is dropped silently (observable as requested minus traded
    /// quantity). Market orders never rest.
    pub fn submit_market(
        &mut self,
        id: OrderId,
        side: Side,
        qty: Quantity,
    ) -> Result<Vec<Trade>, EngineError> {
        self.validate(id, qty)?;

        let slot = self
            .pool
            .acquire(id, side, OrderType::Market, 0, qty)
            .ok_or_else(|| {
                warn!(id, "submission rejected: pool exhausted");
                EngineError::PoolExhausted
            })?;
        self.orders_submitted += 1;

        let MatchResult {
            trades,
            filled_resting,
        } = self.book.match_order(&mut self.pool, slot);
        self.trades_executed += trades.len() as u64;

        for filled in filled_resting {
            self.pool.release(filled);
        }

        let dropped = self.pool.get(slot).remaining;
        if dropped > 0 {
            trace!(id, ?side, dropped, "market order residual dropped");
        }
        self.pool.release(slot);

        Ok(trades)
    }

    /// Cancel a resting order.
    ///
    /// Returns `true` if the order was found and removed. An unknown or
    /// already-matched id returns `false`; that is not an error.
    pub fn cancel(&mut self, id: OrderId) -> bool {
        match self.book.cancel_order(&mut self.pool, id) {
            Some(slot) => {
                self.pool.release(slot);
                trace!(id, "order cancelled");
                true
            }
            None => false,
        }
    }

    #[inline]
    fn validate(&self, id: OrderId, qty: Quantity) -> Result<(), EngineError> {
        if qty == 0 {
            return Err(EngineError::InvalidQuantity);
        }
        // Checked before acquiring so a duplicate can never partially match
        if self.book.contains(id) {
            return Err(EngineError::DuplicateOrderId);
        }
        Ok(())
    }

    // ========================================================================
    // Command processing
    // ========================================================================

    /// Process a single command and return the resulting events.
    ///
    /// This is the entry point for synchronous usage (testing, benchmarks)
    /// and for the ring-buffer loop in [`run`](Self::run).
    pub fn process_command(&mut self, cmd: Command) -> Vec<EngineEvent> {
        match cmd {
            Command::Limit(order) => self.process_limit(order),
            Command::Market(order) => self.process_market(order),
            Command::Cancel(cancel) => self.process_cancel(cancel),
            Command::Modify(modify) => self.process_modify(modify),
        }
    }

    fn process_limit(&mut self, order: SubmitLimit) -> Vec<EngineEvent> {
        match self.submit_limit(order.order_id, order.side, order.price, order.qty) {
            Ok(trades) => {
                let mut events: Vec<EngineEvent> =
                    trades.into_iter().map(EngineEvent::Trade).collect();
                if let Some(slot) = self.book.lookup(order.order_id) {
                    events.push(EngineEvent::Accepted(OrderAccepted {
                        order_id: order.order_id,
                        side: order.side,
                        price: order.price,
                        remaining: self.pool.get(slot).remaining,
                    }));
                }
                events
            }
            Err(reason) => vec![EngineEvent::Rejected(OrderRejected {
                order_id: order.order_id,
                reason,
            })],
        }
    }

    fn process_market(&mut self, order: SubmitMarket) -> Vec<EngineEvent> {
        match self.submit_market(order.order_id, order.side, order.qty) {
            Ok(trades) => trades.into_iter().map(EngineEvent::Trade).collect(),
            Err(reason) => vec![EngineEvent::Rejected(OrderRejected {
                order_id: order.order_id,
                reason,
            })],
        }
    }

    fn process_cancel(&mut self, cancel: CancelOrder) -> Vec<EngineEvent> {
        let canceled_qty = self
            .book
            .lookup(cancel.order_id)
            .map(|slot| self.pool.get(slot).remaining);

        if self.cancel(cancel.order_id) {
            vec![EngineEvent::Canceled(OrderCanceled {
                order_id: cancel.order_id,
                canceled_qty: canceled_qty.unwrap_or(0),
            })]
        } else {
            vec![EngineEvent::Rejected(OrderRejected {
                order_id: cancel.order_id,
                reason: EngineError::OrderNotFound,
            })]
        }
    }

    /// Modify = cancel + replace. The replacement is a fresh limit order and
    /// re-queues at the back of its level.
    fn process_modify(&mut self, modify: ModifyOrder) -> Vec<EngineEvent> {
        let side = match self.book.lookup(modify.order_id) {
            Some(slot) => self.pool.get(slot).side,
            None => {
                return vec![EngineEvent::Rejected(OrderRejected {
                    order_id: modify.order_id,
                    reason: EngineError::OrderNotFound,
                })]
            }
        };

        let mut events = self.process_cancel(CancelOrder {
            order_id: modify.order_id,
        });
        events.extend(self.process_limit(SubmitLimit {
            order_id: modify.new_order_id,
            side,
            price: modify.new_price,
            qty: modify.new_qty,
        }));
        events
    }

    /// Run the engine event loop.
    ///
    /// Drains commands from an SPSC ring buffer and pushes events out,
    /// busy-waiting between batches. Runs until the program terminates.
    #[cfg(feature = "runtime")]
    pub fn run(
        &mut self,
        input: &mut rtrb::Consumer<Command>,
        output: &mut rtrb::Producer<EngineEvent>,
        pin_to_core: bool,
    ) {
        if pin_to_core {
            self.pin_to_core();
        }

        self.warm_up();

        loop {
            while let Ok(cmd) = input.pop() {
                let events = self.process_command(cmd);
                for event in events {
                    // Best effort - drop if the consumer lags
                    let _ = output.push(event);
                }
            }
            std::hint::spin_loop();
        }
    }

    /// Pin the engine thread to the highest-numbered CPU core.
    ///
    /// The run loop busy-waits between command batches; interrupt handlers
    /// and kernel housekeeping gravitate toward the low cores, so the
    /// matching thread parks on the opposite end of the topology.
    pub fn pin_to_core(&self) {
        let last_core = core_affinity::get_core_ids().and_then(|ids| ids.into_iter().last());
        if let Some(core) = last_core {
            core_affinity::set_for_current(core);
        }
    }

    /// Warm up the engine by pre-faulting the pool's memory pages.
    pub fn warm_up(&mut self) {
        self.pool.warm_up();
    }

    // ========================================================================
    // Stats & market data reads
    // ========================================================================

    /// Total orders accepted into matching since construction
    #[inline]
    pub fn total_orders(&self) -> u64 {
        self.orders_submitted
    }

    /// Total trades emitted since construction
    #[inline]
    pub fn total_trades(&self) -> u64 {
        self.trades_executed
    }

    /// Read-only access to the book (market data, diagnostics)
    #[inline]
    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    /// Read-only access to the pool (capacity/occupancy stats)
    #[inline]
    pub fn pool(&self) -> &OrderPool {
        &self.pool
    }

    /// Best bid price
    #[inline]
    pub fn best_bid(&self) -> Option<Price> {
        self.book.best_bid()
    }

    /// Best ask price
    #[inline]
    pub fn best_ask(&self) -> Option<Price> {
        self.book.best_ask()
    }

    /// Spread (best ask - best bid)
    #[inline]
    pub fn spread(&self) -> Option<Price> {
        self.book.spread()
    }

    /// Number of orders resting in the book
    #[inline]
    pub fn order_count(&self) -> usize {
        self.book.order_count()
    }

    /// Compute a hash of the current state (for determinism testing)
    pub fn state_hash(&self) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();

        self.book.best_bid().hash(&mut hasher);
        self.book.best_ask().hash(&mut hasher);
        self.book.order_count().hash(&mut hasher);
        self.pool.allocated().hash(&mut hasher);
        self.orders_submitted.hash(&mut hasher);
        self.trades_executed.hash(&mut hasher);

        hasher.finish()
    }
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new(1_000_000) // 1M orders default capacity
    }
}
