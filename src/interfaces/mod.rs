// ============================================================================
// Interfaces Module
// Traits at the book's external seams
// ============================================================================

pub mod clock;

pub use clock::{Clock, SystemClock};
