// ============================================================================
// Order Domain Model
// ============================================================================

use crate::domain::errors::{BookError, BookResult};
use crate::numeric::{Price, Quantity};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Value Objects
// ============================================================================

/// Unique order identifier, assigned by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(transparent)]
pub struct OrderId(u64);

impl OrderId {
    #[inline]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for OrderId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The side an incoming order matches against.
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

/// Execution discipline of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OrderType {
    /// Rests until filled or explicitly cancelled.
    GoodTillCancel,
    /// Executes whatever is immediately available; any residue is cancelled.
    FillAndKill,
    /// Executes the entire quantity immediately or rejects; never rests.
    FillOrKill,
    /// Good-till-cancel, plus automatic cancellation at the daily cutoff.
    GoodForDay,
    /// Price-insensitive; repriced to the worst opposite resting price on
    /// admission and converted to good-till-cancel.
    Market,
}

// ============================================================================
// Order Lifecycle
// ============================================================================

pub mod state {
    #[cfg(feature = "serde")]
    use serde::{Deserialize, Serialize};

    /// Lifecycle tag of an order.
    ///
    /// Transitions are driven exclusively by the matching engine (fill),
    /// public cancel, the pruner, or admission rejection.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    pub enum OrderState {
        /// Created and accepted for admission checks; not yet in the book.
        Admitted,
        /// Resting in a side map awaiting matches.
        Resting,
        /// Remaining quantity reached zero through matching.
        Filled,
        /// Removed by an explicit cancel (or the fill-and-kill cleanup).
        Cancelled,
        /// Removed by the good-for-day cutoff task.
        Pruned,
        /// Refused at admission; never rested.
        Rejected,
    }

    impl OrderState {
        pub fn is_terminal(self) -> bool {
            matches!(
                self,
                OrderState::Filled
                    | OrderState::Cancelled
                    | OrderState::Pruned
                    | OrderState::Rejected
            )
        }

        pub fn can_be_cancelled(self) -> bool {
            matches!(self, OrderState::Resting)
        }
    }
}

use state::OrderState;

// ============================================================================
// Order Entity
// ============================================================================

/// A limit (or pre-admission market) order with fill accounting.
///
/// Once added to a book the order is owned by it; the engine is the only
/// mutator. `filled = initial - remaining` at all times, and an order is
/// filled exactly when `remaining` is zero.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Order {
    order_type: OrderType,
    id: OrderId,
    side: Side,
    price: Price,
    initial_quantity: Quantity,
    remaining_quantity: Quantity,
    state: OrderState,
}

impl Order {
    pub fn new(
        order_type: OrderType,
        id: OrderId,
        side: Side,
        price: Price,
        quantity: Quantity,
    ) -> Self {
        Self {
            order_type,
            id,
            side,
            price,
            initial_quantity: quantity,
            remaining_quantity: quantity,
            state: OrderState::Admitted,
        }
    }

    /// A market order carries the invalid-price sentinel until admission
    /// reprices it against the opposite side.
    pub fn market(id: OrderId, side: Side, quantity: Quantity) -> Self {
        Self::new(OrderType::Market, id, side, Price::INVALID, quantity)
    }

    #[inline]
    pub fn order_type(&self) -> OrderType {
        self.order_type
    }

    #[inline]
    pub fn id(&self) -> OrderId {
        self.id
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    #[inline]
    pub fn price(&self) -> Price {
        self.price
    }

    #[inline]
    pub fn initial_quantity(&self) -> Quantity {
        self.initial_quantity
    }

    #[inline]
    pub fn remaining_quantity(&self) -> Quantity {
        self.remaining_quantity
    }

    #[inline]
    pub fn filled_quantity(&self) -> Quantity {
        Quantity::new(self.initial_quantity.units() - self.remaining_quantity.units())
    }

    #[inline]
    pub fn is_filled(&self) -> bool {
        self.remaining_quantity.is_zero()
    }

    #[inline]
    pub fn state(&self) -> OrderState {
        self.state
    }

    /// Reduce the remaining quantity by a matched amount.
    ///
    /// # Errors
    /// Returns [`BookError::FillExceedsRemaining`] if `quantity` exceeds the
    /// remaining quantity. The matching loop clamps fills to the minimum of
    /// both remainders, so this is unreachable through the public API.
    pub fn fill(&mut self, quantity: Quantity) -> BookResult<()> {
        let remaining = self
            .remaining_quantity
            .checked_sub(quantity)
            .ok_or(BookError::FillExceedsRemaining {
                order_id: self.id,
                requested: quantity,
                remaining: self.remaining_quantity,
            })?;

        self.remaining_quantity = remaining;
        if self.is_filled() {
            self.state = OrderState::Filled;
        }
        Ok(())
    }

    /// Convert a market order into a good-till-cancel order at the given
    /// price (the worst opposite resting price at admission time).
    pub fn reprice_to_good_till_cancel(&mut self, price: Price) {
        self.price = price;
        self.order_type = OrderType::GoodTillCancel;
    }

    pub(crate) fn set_state(&mut self, state: OrderState) {
        self.state = state;
    }
}

// ============================================================================
// Modify Request
// ============================================================================

/// Replacement parameters for an existing order.
///
/// Modification is cancel-plus-re-add: the original order type is preserved
/// but time priority is lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderModify {
    order_id: OrderId,
    side: Side,
    price: Price,
    quantity: Quantity,
}

impl OrderModify {
    pub fn new(order_id: OrderId, side: Side, price: Price, quantity: Quantity) -> Self {
        Self {
            order_id,
            side,
            price,
            quantity,
        }
    }

    #[inline]
    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    #[inline]
    pub fn price(&self) -> Price {
        self.price
    }

    #[inline]
    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// Build the replacement order, carrying the preserved order type.
    pub fn to_order(&self, order_type: OrderType) -> Order {
        Order::new(order_type, self.order_id, self.side, self.price, self.quantity)
    }
}
