// ============================================================================
// Book Side
// One price-sorted half of the book
// ============================================================================

use crate::domain::Side;
use crate::engine::queue::{Handle, LevelQueue, OrderArena};
use crate::numeric::Price;
use std::collections::BTreeMap;

/// One side of the order book: price levels in a sorted map, each holding a
/// FIFO queue of arena handles.
///
/// Both sides share the same map type; best/worst accessors dispatch on the
/// side so the matching engine never needs side-specific comparators. For
/// bids the best price is the highest (last in sorted order), for asks the
/// lowest (first).
#[derive(Debug)]
pub(crate) struct BookSide {
    side: Side,
    levels: BTreeMap<Price, LevelQueue>,
}

impl BookSide {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
        }
    }

    /// The most aggressive resting price: highest bid or lowest ask.
    pub fn best_price(&self) -> Option<Price> {
        match self.side {
            Side::Buy => self.levels.keys().next_back().copied(),
            Side::Sell => self.levels.keys().next().copied(),
        }
    }

    /// The least aggressive resting price; where a market order reprices to.
    pub fn worst_price(&self) -> Option<Price> {
        match self.side {
            Side::Buy => self.levels.keys().next().copied(),
            Side::Sell => self.levels.keys().next_back().copied(),
        }
    }

    /// Append an order at the tail of its price level, creating the level if
    /// this is the first order there.
    pub fn push_order(&mut self, arena: &mut OrderArena, price: Price, handle: Handle) {
        self.levels
            .entry(price)
            .or_default()
            .push_back(arena, handle);
    }

    /// Detach an order from its level without touching the (possibly now
    /// empty) level itself.
    pub fn unlink_order(&mut self, arena: &mut OrderArena, price: Price, handle: Handle) {
        if let Some(queue) = self.levels.get_mut(&price) {
            queue.unlink(arena, handle);
        }
    }

    /// Drop the level if it holds no orders. Returns true when removed.
    pub fn remove_level_if_empty(&mut self, price: Price) -> bool {
        match self.levels.get(&price) {
            Some(queue) if queue.is_empty() => {
                self.levels.remove(&price);
                true
            }
            _ => false,
        }
    }

    /// Front (oldest) order of the level at `price`, if any.
    pub fn front_at(&self, price: Price) -> Option<Handle> {
        self.level(price).and_then(LevelQueue::front)
    }

    pub fn level(&self, price: Price) -> Option<&LevelQueue> {
        self.levels.get(&price)
    }

    /// Levels in best-first order: descending for bids, ascending for asks.
    pub fn iter_best_first(&self) -> Box<dyn Iterator<Item = (Price, &LevelQueue)> + '_> {
        match self.side {
            Side::Buy => Box::new(self.levels.iter().rev().map(|(price, queue)| (*price, queue))),
            Side::Sell => Box::new(self.levels.iter().map(|(price, queue)| (*price, queue))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Order, OrderId, OrderType};
    use crate::numeric::Quantity;

    fn push(book_side: &mut BookSide, arena: &mut OrderArena, id: u64, price: i32) -> Handle {
        let handle = arena.insert(Order::new(
            OrderType::GoodTillCancel,
            OrderId::new(id),
            book_side.side,
            Price::new(price),
            Quantity::new(1),
        ));
        book_side.push_order(arena, Price::new(price), handle);
        handle
    }

    #[test]
    fn bid_side_best_is_highest() {
        let mut arena = OrderArena::new();
        let mut bids = BookSide::new(Side::Buy);
        push(&mut bids, &mut arena, 1, 100);
        push(&mut bids, &mut arena, 2, 101);
        push(&mut bids, &mut arena, 3, 99);

        assert_eq!(bids.best_price(), Some(Price::new(101)));
        assert_eq!(bids.worst_price(), Some(Price::new(99)));
    }

    #[test]
    fn ask_side_best_is_lowest() {
        let mut arena = OrderArena::new();
        let mut asks = BookSide::new(Side::Sell);
        push(&mut asks, &mut arena, 1, 100);
        push(&mut asks, &mut arena, 2, 101);
        push(&mut asks, &mut arena, 3, 99);

        assert_eq!(asks.best_price(), Some(Price::new(99)));
        assert_eq!(asks.worst_price(), Some(Price::new(101)));
    }

    #[test]
    fn empty_level_is_removed_only_on_request() {
        let mut arena = OrderArena::new();
        let mut bids = BookSide::new(Side::Buy);
        let handle = push(&mut bids, &mut arena, 1, 100);

        bids.unlink_order(&mut arena, Price::new(100), handle);
        arena.remove(handle);
        assert!(bids.level(Price::new(100)).is_some());

        assert!(bids.remove_level_if_empty(Price::new(100)));
        assert!(bids.best_price().is_none());
        assert!(!bids.remove_level_if_empty(Price::new(100)));
    }

    #[test]
    fn iter_best_first_ordering() {
        let mut arena = OrderArena::new();
        let mut bids = BookSide::new(Side::Buy);
        for (id, price) in [(1, 100), (2, 102), (3, 101)] {
            push(&mut bids, &mut arena, id, price);
        }

        let prices: Vec<i32> = bids.iter_best_first().map(|(p, _)| p.ticks()).collect();
        assert_eq!(prices, vec![102, 101, 100]);
    }
}
