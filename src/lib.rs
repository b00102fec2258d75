// ============================================================================
// Order Book Engine Library
// Single-instrument limit order book with price-time priority matching
// ============================================================================

//! # Order Book Engine
//!
//! An in-memory limit order book for a single instrument.
//!
//! ## Features
//!
//! - **Price-time priority matching** with strict FIFO inside each level
//! - **Order disciplines**: good-till-cancel, fill-and-kill, fill-or-kill,
//!   good-for-day and market (repriced to the worst opposite price)
//! - **O(log P) level access, O(1) order lookup and O(1) removal** via a
//!   slab arena with intrusive per-level FIFO links
//! - **Aggregated depth index** so fill-or-kill admission walks level
//!   totals instead of individual orders
//! - **Daily good-for-day pruning** on a background thread with an
//!   injectable clock
//!
//! ## Example
//!
//! ```rust
//! use orderbook_engine::prelude::*;
//!
//! let book = OrderBook::new();
//!
//! // Rest a bid, then cross it with an ask.
//! book.add_order(Order::new(
//!     OrderType::GoodTillCancel,
//!     OrderId::new(1),
//!     Side::Buy,
//!     Price::new(100),
//!     Quantity::new(10),
//! ))
//! .unwrap();
//!
//! let trades = book
//!     .add_order(Order::new(
//!         OrderType::GoodTillCancel,
//!         OrderId::new(2),
//!         Side::Sell,
//!         Price::new(100),
//!         Quantity::new(4),
//!     ))
//!     .unwrap();
//!
//! assert_eq!(trades.len(), 1);
//! assert_eq!(trades[0].quantity(), Quantity::new(4));
//!
//! let snapshot = book.snapshot();
//! assert_eq!(snapshot.best_bid(), Some(Price::new(100)));
//! assert_eq!(snapshot.total_bid_quantity(), 6);
//! ```

pub mod domain;
pub mod engine;
pub mod interfaces;
pub mod numeric;

// Re-exports for convenience
pub mod prelude {
    pub use crate::domain::{
        BookError, BookResult, LevelInfo, Order, OrderBookSnapshot, OrderId, OrderModify,
        OrderState, OrderType, Side, Trade, TradeLeg,
    };
    pub use crate::engine::OrderBook;
    pub use crate::interfaces::{Clock, SystemClock};
    pub use crate::numeric::{Price, Quantity};
}
