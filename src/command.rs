//! Command and event types for the matching engine.
//!
//! Commands are inputs from the ingress thread; events are outputs for
//! market data consumers. Everything is `Copy` and small so both directions
//! move through SPSC ring buffers without allocation.

use crate::types::{EngineError, OrderId, Price, Quantity, Side, Trade};

// ============================================================================
// Input Commands
// ============================================================================

/// Submit a new limit order
#[derive(Clone, Copy, Debug)]
pub struct SubmitLimit {
    /// External order id (client-assigned)
    pub order_id: OrderId,
    pub side: Side,
    /// Limit price in ticks
    pub price: Price,
    pub qty: Quantity,
}

/// Submit a new market order
#[derive(Clone, Copy, Debug)]
pub struct SubmitMarket {
    pub order_id: OrderId,
    pub side: Side,
    pub qty: Quantity,
}

/// Cancel an existing order
#[derive(Clone, Copy, Debug)]
pub struct CancelOrder {
    /// Order id to cancel
    pub order_id: OrderId,
}

/// Modify an existing order (cancel + replace; loses queue priority)
#[derive(Clone, Copy, Debug)]
pub struct ModifyOrder {
    /// Original order id
    pub order_id: OrderId,
    /// Replacement order id (may equal the original)
    pub new_order_id: OrderId,
    /// New limit price
    pub new_price: Price,
    /// New quantity
    pub new_qty: Quantity,
}

/// Input commands from the ingress thread
#[derive(Clone, Copy, Debug)]
pub enum Command {
    /// Submit a limit order
    Limit(SubmitLimit),
    /// Submit a market order
    Market(SubmitMarket),
    /// Cancel an existing order
    Cancel(CancelOrder),
    /// Modify an existing order
    Modify(ModifyOrder),
}

// ============================================================================
// Output Events
// ============================================================================

/// Order was accepted and is resting in the book
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderAccepted {
    pub order_id: OrderId,
    pub side: Side,
    pub price: Price,
    /// Quantity resting after any immediate fills
    pub remaining: Quantity,
}

/// Order was cancelled
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderCanceled {
    pub order_id: OrderId,
    /// Remaining quantity that was cancelled
    pub canceled_qty: Quantity,
}

/// Order was rejected
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderRejected {
    pub order_id: OrderId,
    pub reason: EngineError,
}

/// Output events from the matching engine
#[derive(Clone, Copy, Debug)]
pub enum EngineEvent {
    /// Trade executed
    Trade(Trade),
    /// Order accepted and resting
    Accepted(OrderAccepted),
    /// Order cancelled
    Canceled(OrderCanceled),
    /// Order rejected
    Rejected(OrderRejected),
}
