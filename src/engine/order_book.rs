// ============================================================================
// Order Book
// Admission, mutation and price-time matching under one lock
// ============================================================================

use crate::domain::{
    BookResult, LevelInfo, Order, OrderBookSnapshot, OrderId, OrderModify, OrderState, OrderType,
    Side, Trade, TradeLeg,
};
use crate::engine::book_side::BookSide;
use crate::engine::depth::DepthIndex;
use crate::engine::pruner;
use crate::engine::queue::{Handle, OrderArena};
use crate::interfaces::{Clock, SystemClock};
use crate::numeric::{Price, Quantity};
use parking_lot::{Condvar, Mutex};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

// ============================================================================
// Book Core
// ============================================================================

/// The book state guarded by the single lock: two sorted sides, the id
/// index, the order arena and the aggregated depth index.
pub(crate) struct BookCore {
    bids: BookSide,
    asks: BookSide,
    orders: HashMap<OrderId, Handle>,
    arena: OrderArena,
    depth: DepthIndex,
}

impl BookCore {
    fn new() -> Self {
        Self {
            bids: BookSide::new(Side::Buy),
            asks: BookSide::new(Side::Sell),
            orders: HashMap::new(),
            arena: OrderArena::new(),
            depth: DepthIndex::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.orders.len()
    }

    fn book_side(&self, side: Side) -> &BookSide {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    /// A prospective order at `price` could trade immediately: the opposite
    /// side is non-empty and the price is marketable against its best.
    fn can_match(&self, side: Side, price: Price) -> bool {
        let Some(best) = self.book_side(side.opposite()).best_price() else {
            return false;
        };
        match side {
            Side::Buy => price >= best,
            Side::Sell => price <= best,
        }
    }

    /// Fill-or-kill admission gate: enough aggregate liquidity rests at or
    /// better than `price` to satisfy the whole quantity.
    fn can_fully_fill(&self, side: Side, price: Price, quantity: Quantity) -> bool {
        if !self.can_match(side, price) {
            return false;
        }
        self.book_side(side.opposite())
            .best_price()
            .is_some_and(|threshold| self.depth.can_absorb(side, threshold, price, quantity))
    }

    /// Per-type admission checks. Returns the (possibly repriced) order, or
    /// `None` when the order is rejected without entering the book.
    fn admit(&mut self, mut order: Order) -> Option<Order> {
        if self.orders.contains_key(&order.id()) {
            tracing::debug!(order_id = order.id().value(), "duplicate order id ignored");
            return None;
        }

        if order.order_type() == OrderType::Market {
            let worst_opposite = self.book_side(order.side().opposite()).worst_price();
            match worst_opposite {
                Some(price) => order.reprice_to_good_till_cancel(price),
                None => {
                    order.set_state(OrderState::Rejected);
                    tracing::debug!(
                        order_id = order.id().value(),
                        side = %order.side(),
                        "market order rejected: opposite side empty"
                    );
                    return None;
                }
            }
        }

        if order.order_type() == OrderType::FillAndKill
            && !self.can_match(order.side(), order.price())
        {
            order.set_state(OrderState::Rejected);
            tracing::debug!(
                order_id = order.id().value(),
                "fill-and-kill rejected: not immediately marketable"
            );
            return None;
        }

        if order.order_type() == OrderType::FillOrKill
            && !self.can_fully_fill(order.side(), order.price(), order.initial_quantity())
        {
            order.set_state(OrderState::Rejected);
            tracing::debug!(
                order_id = order.id().value(),
                "fill-or-kill rejected: insufficient resting liquidity"
            );
            return None;
        }

        Some(order)
    }

    /// Rest the order at the tail of its price level and index it.
    fn insert(&mut self, mut order: Order) {
        order.set_state(OrderState::Resting);
        let (id, side, price, initial) = (
            order.id(),
            order.side(),
            order.price(),
            order.initial_quantity(),
        );

        let handle = self.arena.insert(order);
        let book_side = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        book_side.push_order(&mut self.arena, price, handle);
        self.orders.insert(id, handle);
        self.depth.on_order_added(price, initial);
    }

    /// Admission, insertion and matching for one incoming order.
    pub(crate) fn submit(&mut self, order: Order) -> BookResult<Vec<Trade>> {
        let Some(order) = self.admit(order) else {
            return Ok(Vec::new());
        };
        self.insert(order);
        self.match_orders()
    }

    /// The crossing loop: while the best bid meets the best ask, trade the
    /// front orders of both top levels in FIFO order.
    fn match_orders(&mut self) -> BookResult<Vec<Trade>> {
        let mut trades = Vec::new();

        loop {
            let (Some(bid_price), Some(ask_price)) =
                (self.bids.best_price(), self.asks.best_price())
            else {
                break;
            };
            if bid_price < ask_price {
                break;
            }

            while let (Some(bid_handle), Some(ask_handle)) =
                (self.bids.front_at(bid_price), self.asks.front_at(ask_price))
            {
                let quantity = self
                    .arena
                    .get(bid_handle)
                    .remaining_quantity()
                    .min(self.arena.get(ask_handle).remaining_quantity());

                let (bid_leg, bid_filled) = {
                    let order = self.arena.get_mut(bid_handle);
                    order.fill(quantity)?;
                    let leg = TradeLeg::new(order.id(), order.price(), quantity);
                    (leg, order.is_filled())
                };
                let (ask_leg, ask_filled) = {
                    let order = self.arena.get_mut(ask_handle);
                    order.fill(quantity)?;
                    let leg = TradeLeg::new(order.id(), order.price(), quantity);
                    (leg, order.is_filled())
                };

                trades.push(Trade::new(bid_leg, ask_leg));

                // Depth updates fire before either leg leaves its side map.
                self.depth.on_order_matched(bid_leg.price, quantity, bid_filled);
                self.depth.on_order_matched(ask_leg.price, quantity, ask_filled);

                if bid_filled {
                    self.orders.remove(&bid_leg.order_id);
                    self.bids.unlink_order(&mut self.arena, bid_price, bid_handle);
                    self.arena.remove(bid_handle);
                }
                if ask_filled {
                    self.orders.remove(&ask_leg.order_id);
                    self.asks.unlink_order(&mut self.arena, ask_price, ask_handle);
                    self.arena.remove(ask_handle);
                }
            }

            self.bids.remove_level_if_empty(bid_price);
            self.asks.remove_level_if_empty(ask_price);
        }

        // A fill-and-kill left at the front of a top level either had no
        // liquidity beyond what already matched or holds a partial fill; its
        // type forbids residency either way.
        self.cancel_front_fill_and_kill(Side::Buy);
        self.cancel_front_fill_and_kill(Side::Sell);

        Ok(trades)
    }

    fn cancel_front_fill_and_kill(&mut self, side: Side) {
        let book_side = self.book_side(side);
        let front = book_side
            .best_price()
            .and_then(|price| book_side.front_at(price));

        if let Some(handle) = front {
            let order = self.arena.get(handle);
            if order.order_type() == OrderType::FillAndKill {
                let id = order.id();
                self.remove_order(id, OrderState::Cancelled);
            }
        }
    }

    /// Take an order out of the book: id index, level queue, arena and depth
    /// index, in that order. No-op when the id is unknown.
    pub(crate) fn remove_order(&mut self, id: OrderId, terminal: OrderState) -> Option<Order> {
        let handle = self.orders.remove(&id)?;
        let (side, price, remaining) = {
            let order = self.arena.get(handle);
            (order.side(), order.price(), order.remaining_quantity())
        };

        let book_side = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        book_side.unlink_order(&mut self.arena, price, handle);
        book_side.remove_level_if_empty(price);

        let mut order = self.arena.remove(handle);
        order.set_state(terminal);
        self.depth.on_order_cancelled(price, remaining);

        tracing::trace!(order_id = id.value(), state = ?terminal, "order removed");
        Some(order)
    }

    fn order_type_of(&self, id: OrderId) -> Option<OrderType> {
        self.orders
            .get(&id)
            .map(|&handle| self.arena.get(handle).order_type())
    }

    /// Ids of every resting good-for-day order, for the daily cutoff batch.
    pub(crate) fn resting_good_for_day_ids(&self) -> Vec<OrderId> {
        self.orders
            .iter()
            .filter(|(_, &handle)| self.arena.get(handle).order_type() == OrderType::GoodForDay)
            .map(|(&id, _)| id)
            .collect()
    }

    fn snapshot(&self) -> OrderBookSnapshot {
        let levels = |book_side: &BookSide| -> Vec<LevelInfo> {
            book_side
                .iter_best_first()
                .map(|(price, queue)| {
                    let quantity = queue
                        .iter(&self.arena)
                        .map(|handle| u64::from(self.arena.get(handle).remaining_quantity()))
                        .sum();
                    LevelInfo::new(price, quantity)
                })
                .collect()
        };

        OrderBookSnapshot::new(levels(&self.bids), levels(&self.asks))
    }

    /// Recompute every derived structure from the side maps and assert it
    /// matches the maintained state.
    #[cfg(test)]
    pub(crate) fn audit(&self) {
        use std::collections::HashSet;

        let mut seen = HashSet::new();
        let mut side_levels = 0usize;

        for (book_side, side) in [(&self.bids, Side::Buy), (&self.asks, Side::Sell)] {
            for (price, queue) in book_side.iter_best_first() {
                assert!(!queue.is_empty(), "empty level in side map at {price}");
                side_levels += 1;

                let mut quantity = 0u64;
                for handle in queue.iter(&self.arena) {
                    let order = self.arena.get(handle);
                    assert_eq!(order.side(), side, "order on wrong side");
                    assert_eq!(order.price(), price, "order filed under wrong level");
                    assert!(!order.is_filled(), "filled order resting at {price}");
                    assert!(seen.insert(order.id()), "order appears twice");
                    assert_eq!(
                        self.orders.get(&order.id()),
                        Some(&handle),
                        "id index disagrees with side map"
                    );
                    quantity += u64::from(order.remaining_quantity());
                }

                let depth = self
                    .depth
                    .level(price)
                    .unwrap_or_else(|| panic!("missing depth entry at {price}"));
                assert_eq!(depth.count, queue.len(), "depth count mismatch at {price}");
                assert_eq!(depth.quantity, quantity, "depth quantity mismatch at {price}");
            }
        }

        assert_eq!(seen.len(), self.orders.len(), "id index has unknown ids");
        assert_eq!(self.arena.len(), self.orders.len(), "arena leaks slots");
        assert_eq!(self.depth.len(), side_levels, "stale depth levels");

        if let (Some(best_bid), Some(best_ask)) = (self.bids.best_price(), self.asks.best_price())
        {
            assert!(best_bid < best_ask, "book is crossed");
        }
    }
}

// ============================================================================
// Shared State and Public Handle
// ============================================================================

/// State shared between caller threads and the pruner thread.
pub(crate) struct BookShared {
    pub(crate) core: Mutex<BookCore>,
    pub(crate) prune_signal: Condvar,
    pub(crate) shutdown: AtomicBool,
}

/// A single-instrument limit order book with price-time priority matching.
///
/// All public operations acquire one exclusive lock for their entire
/// duration, so sequenced calls observe each other's full effects. A
/// background thread cancels resting good-for-day orders at the daily
/// cutoff; dropping the book signals that thread and joins it.
///
/// # Example
/// ```
/// use orderbook_engine::prelude::*;
///
/// let book = OrderBook::new();
/// book.add_order(Order::new(
///     OrderType::GoodTillCancel,
///     OrderId::new(1),
///     Side::Buy,
///     Price::new(100),
///     Quantity::new(10),
/// ))
/// .unwrap();
///
/// let trades = book
///     .add_order(Order::new(
///         OrderType::GoodTillCancel,
///         OrderId::new(2),
///         Side::Sell,
///         Price::new(100),
///         Quantity::new(10),
///     ))
///     .unwrap();
///
/// assert_eq!(trades.len(), 1);
/// assert!(book.is_empty());
/// ```
pub struct OrderBook {
    shared: Arc<BookShared>,
    pruner: Option<JoinHandle<()>>,
}

impl OrderBook {
    /// A book pruning good-for-day orders against the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// A book with an injected clock; tests use this to pin the cutoff.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let shared = Arc::new(BookShared {
            core: Mutex::new(BookCore::new()),
            prune_signal: Condvar::new(),
            shutdown: AtomicBool::new(false),
        });

        let pruner = {
            let shared = Arc::clone(&shared);
            std::thread::spawn(move || pruner::run(shared, clock))
        };

        Self {
            shared,
            pruner: Some(pruner),
        }
    }

    /// Admit an order and match it against resting liquidity.
    ///
    /// Returns the trades generated, in execution order. Rejections
    /// (duplicate id, unmarketable fill-and-kill, short fill-or-kill
    /// liquidity, market order against an empty side) return an empty vec
    /// and leave the book untouched.
    pub fn add_order(&self, order: Order) -> BookResult<Vec<Trade>> {
        self.shared.core.lock().submit(order)
    }

    /// Cancel a resting order; unknown ids are a no-op.
    pub fn cancel_order(&self, id: OrderId) {
        self.shared
            .core
            .lock()
            .remove_order(id, OrderState::Cancelled);
    }

    /// Cancel a batch of orders under a single lock acquisition.
    pub fn cancel_orders(&self, ids: &[OrderId]) {
        let mut core = self.shared.core.lock();
        for &id in ids {
            core.remove_order(id, OrderState::Cancelled);
        }
    }

    /// Replace an existing order with new parameters, preserving its order
    /// type but forfeiting time priority. Unknown ids return an empty vec.
    pub fn modify_order(&self, request: OrderModify) -> BookResult<Vec<Trade>> {
        let mut core = self.shared.core.lock();
        let Some(order_type) = core.order_type_of(request.order_id()) else {
            return Ok(Vec::new());
        };
        core.remove_order(request.order_id(), OrderState::Cancelled);
        core.submit(request.to_order(order_type))
    }

    /// Number of resting orders.
    pub fn len(&self) -> usize {
        self.shared.core.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Per-side price levels with total remaining quantity, best first.
    pub fn snapshot(&self) -> OrderBookSnapshot {
        self.shared.core.lock().snapshot()
    }

    #[cfg(test)]
    pub(crate) fn audit(&self) {
        self.shared.core.lock().audit();
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for OrderBook {
    fn drop(&mut self) {
        // Flip the flag under the book lock so the pruner cannot slip
        // between its shutdown check and the condvar wait.
        {
            let _core = self.shared.core.lock();
            self.shared.shutdown.store(true, Ordering::Release);
        }
        self.shared.prune_signal.notify_one();
        if let Some(handle) = self.pruner.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(order_type: OrderType, id: u64, side: Side, price: i32, quantity: u32) -> Order {
        Order::new(
            order_type,
            OrderId::new(id),
            side,
            Price::new(price),
            Quantity::new(quantity),
        )
    }

    fn gtc(id: u64, side: Side, price: i32, quantity: u32) -> Order {
        order(OrderType::GoodTillCancel, id, side, price, quantity)
    }

    #[test]
    fn cross_keeps_state_consistent() {
        let book = OrderBook::new();
        book.add_order(gtc(1, Side::Buy, 100, 10)).unwrap();
        book.audit();

        let trades = book.add_order(gtc(2, Side::Sell, 100, 4)).unwrap();
        assert_eq!(trades.len(), 1);
        book.audit();
        assert_eq!(book.len(), 1);

        book.cancel_order(OrderId::new(1));
        book.audit();
        assert!(book.is_empty());
    }

    #[test]
    fn duplicate_id_is_ignored() {
        let book = OrderBook::new();
        book.add_order(gtc(1, Side::Buy, 100, 10)).unwrap();
        let trades = book.add_order(gtc(1, Side::Sell, 100, 10)).unwrap();
        assert!(trades.is_empty());
        assert_eq!(book.len(), 1);
        book.audit();
    }

    #[test]
    fn cancel_unknown_id_is_noop() {
        let book = OrderBook::new();
        book.add_order(gtc(1, Side::Buy, 100, 10)).unwrap();
        book.cancel_order(OrderId::new(42));
        assert_eq!(book.len(), 1);
        book.audit();
    }

    // A repriced market order can rest at the same price as the level it
    // just consumed; the depth index must survive the transient overlap.
    #[test]
    fn market_residual_resting_at_worst_ask_price() {
        let book = OrderBook::new();
        book.add_order(gtc(1, Side::Sell, 100, 4)).unwrap();
        book.add_order(gtc(2, Side::Sell, 105, 6)).unwrap();

        let trades = book
            .add_order(Order::market(OrderId::new(3), Side::Buy, Quantity::new(11)))
            .unwrap();

        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].bid.price, Price::new(105));
        assert_eq!(trades[0].ask.price, Price::new(100));
        assert_eq!(trades[1].ask.price, Price::new(105));

        // Residual unit rests as a good-till-cancel bid at the worst ask.
        book.audit();
        let snapshot = book.snapshot();
        assert_eq!(snapshot.bids, vec![LevelInfo::new(Price::new(105), 1)]);
        assert!(snapshot.asks.is_empty());
    }

    // The bid level at the repriced price empties through fills while the
    // ask level at the same price keeps a partially filled order.
    #[test]
    fn market_exact_fill_leaves_opposite_level_depth_intact() {
        let book = OrderBook::new();
        book.add_order(gtc(1, Side::Sell, 100, 4)).unwrap();
        book.add_order(gtc(2, Side::Sell, 105, 6)).unwrap();

        let trades = book
            .add_order(Order::market(OrderId::new(3), Side::Buy, Quantity::new(7)))
            .unwrap();

        assert_eq!(trades.len(), 2);
        book.audit();
        assert_eq!(book.len(), 1);
        assert_eq!(
            book.snapshot().asks,
            vec![LevelInfo::new(Price::new(105), 3)]
        );
    }

    #[test]
    fn fill_and_kill_residue_is_cancelled_after_matching() {
        let book = OrderBook::new();
        book.add_order(gtc(1, Side::Sell, 100, 4)).unwrap();

        let trades = book
            .add_order(order(OrderType::FillAndKill, 2, Side::Buy, 100, 10))
            .unwrap();

        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].quantity(), Quantity::new(4));
        assert!(book.is_empty());
        book.audit();
    }

    #[test]
    fn modify_preserves_good_for_day_type() {
        let book = OrderBook::new();
        book.add_order(order(OrderType::GoodForDay, 1, Side::Buy, 100, 10))
            .unwrap();

        book.modify_order(OrderModify::new(
            OrderId::new(1),
            Side::Buy,
            Price::new(101),
            Quantity::new(5),
        ))
        .unwrap();

        let core = book.shared.core.lock();
        assert_eq!(core.resting_good_for_day_ids(), vec![OrderId::new(1)]);
        drop(core);
        book.audit();
    }

    #[test]
    fn fill_or_kill_gate_counts_aggregate_depth() {
        let book = OrderBook::new();
        book.add_order(gtc(1, Side::Sell, 100, 3)).unwrap();
        book.add_order(gtc(2, Side::Sell, 101, 3)).unwrap();

        // Limit 100 sees only the first level.
        let trades = book
            .add_order(order(OrderType::FillOrKill, 3, Side::Buy, 100, 5))
            .unwrap();
        assert!(trades.is_empty());
        assert_eq!(book.len(), 2);

        // Limit 101 sees both levels and fills across them.
        let trades = book
            .add_order(order(OrderType::FillOrKill, 4, Side::Buy, 101, 5))
            .unwrap();
        assert_eq!(trades.len(), 2);
        assert_eq!(book.len(), 1);
        book.audit();
    }

    #[test]
    fn sequence_of_mixed_operations_stays_consistent() {
        let book = OrderBook::new();
        book.add_order(gtc(1, Side::Buy, 100, 5)).unwrap();
        book.add_order(gtc(2, Side::Buy, 100, 5)).unwrap();
        book.add_order(gtc(3, Side::Buy, 101, 3)).unwrap();
        book.add_order(gtc(4, Side::Sell, 103, 7)).unwrap();
        book.audit();

        book.add_order(gtc(5, Side::Sell, 99, 6)).unwrap();
        book.audit();

        book.modify_order(OrderModify::new(
            OrderId::new(2),
            Side::Buy,
            Price::new(102),
            Quantity::new(4),
        ))
        .unwrap();
        book.audit();

        book.cancel_orders(&[OrderId::new(1), OrderId::new(2), OrderId::new(99)]);
        book.audit();
    }
}
