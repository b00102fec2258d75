// ============================================================================
// Trade Domain Model
// ============================================================================

use crate::domain::order::OrderId;
use crate::numeric::{Price, Quantity};
use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One side of an execution: which order traded, at its own resting price,
/// for how much.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TradeLeg {
    pub order_id: OrderId,
    pub price: Price,
    pub quantity: Quantity,
}

impl TradeLeg {
    pub fn new(order_id: OrderId, price: Price, quantity: Quantity) -> Self {
        Self {
            order_id,
            price,
            quantity,
        }
    }

    /// Tick-denominated value of this leg.
    pub fn notional(&self) -> i64 {
        i64::from(self.price.ticks()) * i64::from(self.quantity.units())
    }
}

/// A matched execution between a resting bid and a resting ask.
///
/// Both legs always carry the same quantity; each leg records its own
/// order's limit price, so the two prices differ whenever the aggressor
/// crossed the spread.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Trade {
    pub bid: TradeLeg,
    pub ask: TradeLeg,
    pub executed_at: DateTime<Utc>,
}

impl Trade {
    pub fn new(bid: TradeLeg, ask: TradeLeg) -> Self {
        Self {
            bid,
            ask,
            executed_at: Utc::now(),
        }
    }

    /// The matched quantity (identical on both legs).
    #[inline]
    pub fn quantity(&self) -> Quantity {
        self.bid.quantity
    }
}
