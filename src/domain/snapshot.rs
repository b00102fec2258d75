// ============================================================================
// Order Book Snapshot
// ============================================================================

use crate::numeric::Price;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Aggregated view of one price level: the price and the sum of remaining
/// quantities resting there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LevelInfo {
    pub price: Price,
    pub quantity: u64,
}

impl LevelInfo {
    pub fn new(price: Price, quantity: u64) -> Self {
        Self { price, quantity }
    }
}

/// Immutable per-side view of the book, best price first on each side.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderBookSnapshot {
    /// Bid levels, highest price first.
    pub bids: Vec<LevelInfo>,
    /// Ask levels, lowest price first.
    pub asks: Vec<LevelInfo>,
}

impl OrderBookSnapshot {
    pub fn new(bids: Vec<LevelInfo>, asks: Vec<LevelInfo>) -> Self {
        Self { bids, asks }
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.first().map(|level| level.price)
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.first().map(|level| level.price)
    }

    /// Best-ask minus best-bid, in ticks.
    pub fn spread(&self) -> Option<i64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(i64::from(ask.ticks()) - i64::from(bid.ticks())),
            _ => None,
        }
    }

    pub fn total_bid_quantity(&self) -> u64 {
        self.bids.iter().map(|level| level.quantity).sum()
    }

    pub fn total_ask_quantity(&self) -> u64 {
        self.asks.iter().map(|level| level.quantity).sum()
    }
}
