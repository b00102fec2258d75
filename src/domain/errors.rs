// ============================================================================
// Book Errors
// Error types for order book operations
// ============================================================================

use crate::domain::order::OrderId;
use crate::numeric::Quantity;
use std::fmt;

/// Fatal errors surfaced by order book operations.
///
/// Expected rejections (duplicate id, unmarketable fill-and-kill, short
/// fill-or-kill liquidity, market order against an empty side, modify of an
/// unknown id) are not errors; they are reported as an empty trade list.
/// A `BookError` means an internal invariant was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookError {
    /// A fill was requested for more than the order's remaining quantity.
    /// The matching loop never produces such a call; reaching it is a bug.
    FillExceedsRemaining {
        order_id: OrderId,
        requested: Quantity,
        remaining: Quantity,
    },
}

impl fmt::Display for BookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookError::FillExceedsRemaining {
                order_id,
                requested,
                remaining,
            } => write!(
                f,
                "order {order_id} cannot be filled for {requested}: only {remaining} remaining"
            ),
        }
    }
}

impl std::error::Error for BookError {}

/// Result type alias for order book operations.
pub type BookResult<T> = Result<T, BookError>;
