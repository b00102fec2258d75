// ============================================================================
// Clock Interface
// Injectable wall-clock source for the good-for-day pruner
// ============================================================================

use chrono::{DateTime, Local};

/// Source of local wall-clock time.
///
/// The book's only environmental input; the pruner derives the daily
/// good-for-day cutoff from it. Injecting the clock lets tests pin the time
/// instead of waiting for a real 16:00.
pub trait Clock: Send + Sync {
    fn local_now(&self) -> DateTime<Local>;
}

/// System clock, the default for production books.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn local_now(&self) -> DateTime<Local> {
        Local::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_does_not_run_backwards() {
        let clock = SystemClock;
        let first = clock.local_now();
        let second = clock.local_now();
        assert!(second >= first);
    }
}
