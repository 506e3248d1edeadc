// Drops expired cache entries so stale query results don't sit in memory
// until the next LRU eviction.

use crate::utils::cache::cleanup_expired_cache;
use tokio::time::{interval, Duration};

const JANITOR_PERIOD: Duration = Duration::from_secs(60);

pub fn start_cache_janitor() {
    tokio::spawn(async move {
        let mut ticker = interval(JANITOR_PERIOD);
        loop {
            ticker.tick().await;
            let removed = cleanup_expired_cache();
            if removed > 0 {
                log::debug!("🧹 Cache janitor removed {} expired entries", removed);
            }
        }
    });
    log::info!("🧹 Cache janitor started (every {}s)", JANITOR_PERIOD.as_secs());
}
