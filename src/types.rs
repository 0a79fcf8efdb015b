//! Scalar types, the trade record, and the engine error type.
//!
//! Prices are signed integers in ticks (fixed-point): with a tick size of
//! 0.01, $100.50 is stored as 10050. Integer comparison is price comparison.

use std::fmt;
use std::sync::OnceLock;
use std::time::Instant;

/// Price in ticks. Signed so spreads and price arithmetic never wrap.
pub type Price = i64;

/// Order quantity in units.
pub type Quantity = u32;

/// Client-assigned order identifier, unique among live orders.
pub type OrderId = u64;

/// Monotonic nanoseconds since the process clock epoch. Diagnostic only:
/// FIFO position in the book is the time-priority source of truth.
pub type Timestamp = u64;

static CLOCK_EPOCH: OnceLock<Instant> = OnceLock::new();

/// Current reading of the process-local monotonic clock.
#[inline]
pub fn now() -> Timestamp {
    CLOCK_EPOCH.get_or_init(Instant::now).elapsed().as_nanos() as Timestamp
}

/// Order side
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Side {
    /// Buy side (bids)
    Buy = 0,
    /// Sell side (asks)
    Sell = 1,
}

impl Side {
    /// Returns the opposite side
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Order type determines the cross condition during matching
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum OrderType {
    /// Limit order - rests in the book if not fully matched (default)
    #[default]
    Limit = 0,
    /// Market order - matches against any opposite liquidity, never rests
    Market = 1,
}

/// An executed trade.
///
/// `price` is always the resting (passive) order's limit price. The buy and
/// sell ids identify orders that were live at the moment of execution; the
/// resting one may have been fully filled by this very trade.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Trade {
    /// Buy-side participant
    pub buy_order_id: OrderId,
    /// Sell-side participant
    pub sell_order_id: OrderId,
    /// Execution price (resting order's price, in ticks)
    pub price: Price,
    /// Executed quantity
    pub quantity: Quantity,
    /// Execution time
    pub timestamp: Timestamp,
}

impl Trade {
    #[inline]
    pub fn new(buy_order_id: OrderId, sell_order_id: OrderId, price: Price, quantity: Quantity) -> Self {
        Self {
            buy_order_id,
            sell_order_id,
            price,
            quantity,
            timestamp: now(),
        }
    }
}

impl fmt::Display for Trade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Trade: buyer={} seller={} price={} qty={}",
            self.buy_order_id, self.sell_order_id, self.price, self.quantity
        )
    }
}

/// Reasons a submission is refused. `cancel` on an unknown id is not an
/// error; it returns `false`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[repr(u8)]
pub enum EngineError {
    /// The order pool has no free slots
    #[error("order pool exhausted")]
    PoolExhausted,
    /// An order with this id is already resting in the book
    #[error("duplicate live order id")]
    DuplicateOrderId,
    /// Zero quantity
    #[error("invalid quantity")]
    InvalidQuantity,
    /// Referenced order is not in the book (cancel/modify via command seam)
    #[error("order not found")]
    OrderNotFound,
}
