use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

/// Spaces outbound requests to a fixed cadence.
///
/// The whole read-compute-sleep-write sequence runs under one async mutex, so
/// concurrent callers sharing an instance are granted one at a time and never
/// closer together than `min_interval`.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    last_request: Arc<Mutex<Option<Instant>>>,
    requests_per_minute: u32,
    min_interval: Duration,
}

impl RateLimiter {
    pub fn new(requests_per_minute: u32) -> Self {
        let requests_per_minute = requests_per_minute.max(1);
        let min_interval = Duration::from_millis(60_000 / requests_per_minute as u64);
        Self {
            last_request: Arc::new(Mutex::new(None)),
            requests_per_minute,
            min_interval,
        }
    }

    pub fn requests_per_minute(&self) -> u32 {
        self.requests_per_minute
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    pub async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                log::trace!("Rate limiter sleeping for {:?}", wait_time);
                sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(10)
    }
}
