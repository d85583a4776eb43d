// Search throttle — spaces hashtag searches by the configured feed delay.
//
// Post search is throttled hard on ordinary accounts. The first search goes
// out immediately; each later one waits until the delay has passed since the
// previous search started. Every wait is logged with the tag it holds back.

use tokio::time::{Duration, Instant};
use tracing::info;

/// Paces the hashtag searches of one pull.
#[derive(Debug)]
pub struct SearchThrottle {
    delay: Duration,
    last_search: Option<Instant>,
    searches: usize,
}

impl SearchThrottle {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_search: None,
            searches: 0,
        }
    }

    /// Wait until the search for `tag` may go out. Returns the time waited.
    pub async fn wait_turn(&mut self, tag: &str) -> Duration {
        let wait = match self.last_search {
            Some(last) => self.delay.saturating_sub(last.elapsed()),
            None => Duration::ZERO,
        };
        if !wait.is_zero() {
            info!(
                tag,
                wait_secs = wait.as_secs_f64(),
                searches_done = self.searches,
                "Waiting before next hashtag search"
            );
            tokio::time::sleep(wait).await;
        }
        self.last_search = Some(Instant::now());
        self.searches += 1;
        wait
    }

    /// Searches let through so far.
    pub fn searches(&self) -> usize {
        self.searches
    }
}
