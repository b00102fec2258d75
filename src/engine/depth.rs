// ============================================================================
// Depth Index
// Aggregated per-price order count and quantity
// ============================================================================
//
// Redundant with the side maps, maintained so fill-or-kill admission can
// walk level totals instead of individual orders. One map covers both
// sides: in an uncrossed book a price never carries resting orders on both
// sides at once, except transiently inside the matching loop, and the loop
// only ever adjusts entries through the events below.

use crate::domain::Side;
use crate::numeric::{Price, Quantity};
use std::collections::BTreeMap;

/// How a mutation affects its price level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DepthAction {
    /// New resting order: count +1, quantity +initial.
    Add,
    /// Order leaves the level (cancel or full fill): count -1, quantity -q.
    Remove,
    /// Partial fill: count unchanged, quantity -matched.
    Match,
}

/// Aggregate totals for one price level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct LevelDepth {
    pub count: usize,
    pub quantity: u64,
}

/// Aggregated level index, keyed by price across both sides.
#[derive(Debug, Default)]
pub(crate) struct DepthIndex {
    levels: BTreeMap<Price, LevelDepth>,
}

impl DepthIndex {
    pub fn new() -> Self {
        Self {
            levels: BTreeMap::new(),
        }
    }

    pub fn on_order_added(&mut self, price: Price, initial: Quantity) {
        self.update(price, initial, DepthAction::Add);
    }

    /// Fired with the remaining quantity at cancel time.
    pub fn on_order_cancelled(&mut self, price: Price, remaining: Quantity) {
        self.update(price, remaining, DepthAction::Remove);
    }

    /// Fired once per matched leg, before the leg is removed from its side.
    pub fn on_order_matched(&mut self, price: Price, matched: Quantity, fully_filled: bool) {
        let action = if fully_filled {
            DepthAction::Remove
        } else {
            DepthAction::Match
        };
        self.update(price, matched, action);
    }

    fn update(&mut self, price: Price, quantity: Quantity, action: DepthAction) {
        let depth = self.levels.entry(price).or_default();

        match action {
            DepthAction::Add => {
                depth.count += 1;
                depth.quantity += u64::from(quantity);
            }
            DepthAction::Remove => {
                depth.count = depth.count.saturating_sub(1);
                depth.quantity = depth.quantity.saturating_sub(u64::from(quantity));
            }
            DepthAction::Match => {
                depth.quantity = depth.quantity.saturating_sub(u64::from(quantity));
            }
        }

        if depth.count == 0 {
            self.levels.remove(&price);
        }
    }

    /// Whether resting levels between the opposite best (`threshold`) and the
    /// order's `limit` hold at least `quantity` in aggregate.
    ///
    /// Walks level totals in crossing order: ascending for a buy, descending
    /// for a sell. O(L) in the number of candidate levels.
    pub fn can_absorb(
        &self,
        side: Side,
        threshold: Price,
        limit: Price,
        quantity: Quantity,
    ) -> bool {
        let mut outstanding = u64::from(quantity);

        match side {
            Side::Buy => {
                for depth in self.levels.range(threshold..=limit).map(|(_, d)| d) {
                    if depth.quantity >= outstanding {
                        return true;
                    }
                    outstanding -= depth.quantity;
                }
            }
            Side::Sell => {
                for depth in self.levels.range(limit..=threshold).rev().map(|(_, d)| d) {
                    if depth.quantity >= outstanding {
                        return true;
                    }
                    outstanding -= depth.quantity;
                }
            }
        }

        false
    }

    #[cfg(test)]
    pub fn level(&self, price: Price) -> Option<LevelDepth> {
        self.levels.get(&price).copied()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.levels.len()
    }
}
