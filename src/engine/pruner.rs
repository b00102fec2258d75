// ============================================================================
// Good-For-Day Pruner
// Background task cancelling good-for-day orders at the daily cutoff
// ============================================================================

use crate::domain::OrderState;
use crate::engine::order_book::BookShared;
use crate::interfaces::Clock;
use chrono::{DateTime, Local, TimeZone, Timelike};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

/// Local hour at which good-for-day orders expire.
pub(crate) const CUTOFF_HOUR: u32 = 16;

/// Slack past the cutoff so a wake-up never lands just before it.
const CUTOFF_SLACK: Duration = Duration::from_millis(100);

/// The next cutoff instant strictly ahead of `now`: today at 16:00 local,
/// or tomorrow's if the current hour is already at or past it. Minutes and
/// seconds are zeroed.
pub(crate) fn next_cutoff(now: DateTime<Local>) -> DateTime<Local> {
    let mut date = now.date_naive();
    if now.hour() >= CUTOFF_HOUR {
        date = date.succ_opt().unwrap_or(date);
    }
    date.and_hms_opt(CUTOFF_HOUR, 0, 0)
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .unwrap_or_else(|| now + chrono::Duration::hours(24))
}

fn sleep_budget(now: DateTime<Local>) -> Duration {
    let until = (next_cutoff(now) - now).to_std().unwrap_or_default();
    until + CUTOFF_SLACK
}

/// Pruner thread body. Sleeps until the next cutoff on the shutdown
/// condvar, then cancels every resting good-for-day order. Exits as soon as
/// shutdown is flagged or the condvar is notified.
pub(crate) fn run(shared: Arc<BookShared>, clock: Arc<dyn Clock>) {
    loop {
        let timeout = sleep_budget(clock.local_now());

        {
            let mut core = shared.core.lock();
            if shared.shutdown.load(Ordering::Acquire) {
                return;
            }
            let wait = shared.prune_signal.wait_for(&mut core, timeout);
            if shared.shutdown.load(Ordering::Acquire) || !wait.timed_out() {
                return;
            }
        }

        // Two-phase cancellation: snapshot the ids under the lock, release,
        // then cancel in one locked batch. Keeps the hold time bounded and
        // never removes from the index while iterating it.
        let expired = shared.core.lock().resting_good_for_day_ids();
        if expired.is_empty() {
            continue;
        }

        let mut core = shared.core.lock();
        for &id in &expired {
            core.remove_order(id, OrderState::Pruned);
        }
        tracing::debug!(
            count = expired.len(),
            "good-for-day orders pruned at daily cutoff"
        );
    }
}
