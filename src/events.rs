//! Order sides, trade events, and the trade sink boundary.
//!
//! The engine reports fills through a caller-supplied [`TradeSink`]; it
//! knows nothing about threads, queues, or serialization. Tests capture
//! trades into a `Vec`, benchmarks use a no-op closure, real deployments
//! forward to an emitter.

use serde::{Deserialize, Serialize};

/// Order side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
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

    /// Whether an incoming order at `limit` can trade against a resting
    /// level at `resting`: buys cross at or above, sells at or below.
    #[inline]
    pub const fn crosses(self, limit: u32, resting: u32) -> bool {
        match self {
            Side::Buy => limit >= resting,
            Side::Sell => limit <= resting,
        }
    }
}

/// A single fill between one buy order and one sell order.
///
/// Trades always execute at the resting order's price; price improvement
/// flows to the aggressor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Trade {
    /// Identifier of the buy-side order in this fill
    pub buy_order_id: u64,
    /// Identifier of the sell-side order in this fill
    pub sell_order_id: u64,
    /// Resting order's price
    pub price: u32,
    /// Filled quantity, always > 0
    pub quantity: u32,
}

/// Read-only snapshot of one price level.
///
/// Returned by value; a view taken before a mutating call stays internally
/// consistent but describes stale state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelView {
    /// Level price
    pub price: u32,
    /// Sum of remaining quantity over the level's FIFO
    pub total_qty: u64,
    /// Number of resting orders at this level
    pub order_count: u32,
}

/// Consumer of trade events.
///
/// Invoked inline, synchronously, in exact fill order. The sink must not
/// reenter the engine.
pub trait TradeSink {
    /// Called once per fill, while the triggering `add_limit_order` is
    /// still on the stack.
    fn on_trade(&mut self, trade: Trade);
}

impl<F: FnMut(Trade)> TradeSink for F {
    #[inline]
    fn on_trade(&mut self, trade: Trade) {
        self(trade)
    }
}
