//! Request pacing for nar.netkeiba.com
//!
//! Keeps fetches under a requests-per-minute ceiling with a little jitter
//! so batch runs do not hit the site on a fixed beat.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use tokio::sync::Mutex;

pub struct RateLimiter {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Create a limiter allowing `requests_per_minute` fetches.
    pub fn new(requests_per_minute: u32) -> Self {
        let rpm = requests_per_minute.max(1);
        Self {
            min_interval: Duration::from_millis(60_000 / rpm as u64),
            last_request: Mutex::new(None),
        }
    }

    /// Wait until the next request is allowed.
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            let wait = self.min_interval + jitter();
            if elapsed < wait {
                tokio::time::sleep(wait - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// Up to 500ms of pseudo-random jitter from the clock's nanoseconds
fn jitter() -> Duration {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    Duration::from_millis((nanos % 500) as u64)
}
