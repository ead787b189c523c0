//! Fixed post-load delay before capture.

use std::time::Duration;

/// Post-load grace period for late layout work (webfonts, deferred scripts).
/// Runs to completion; a zero duration returns without touching the timer.
pub async fn settle(duration: Duration) {
    if duration.is_zero() {
        return;
    }
    tokio::time::sleep(duration).await;
}
