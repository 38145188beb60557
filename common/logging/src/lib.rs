use std::sync::Once;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// The minimum interval between log messages indicating that a recurring condition (a full
/// queue, a dropped gossip message, ...) is still happening.
const LOG_DEBOUNCE_INTERVAL: Duration = Duration::from_secs(30);

static INIT_TEST_LOGGER: Once = Once::new();

/// Provides de-bounce functionality for logging: a recurring condition should be logged once,
/// then silenced until `LOG_DEBOUNCE_INTERVAL` has elapsed.
#[derive(Default)]
pub struct TimeLatch(Option<Instant>);

impl TimeLatch {
    /// Only returns true once every `LOG_DEBOUNCE_INTERVAL`.
    pub fn elapsed(&mut self) -> bool {
        let now = Instant::now();

        let is_elapsed = self.0.is_some_and(|elapse_time| now > elapse_time);

        if is_elapsed || self.0.is_none() {
            self.0 = Some(now + LOG_DEBOUNCE_INTERVAL);
        }

        is_elapsed
    }
}

/// Installs a `tracing` subscriber that reads its filter from `RUST_LOG` (default `info`).
///
/// Binaries embedding the state-transition core call this once at start-up; the core crates
/// themselves never install a subscriber, they only emit events.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

/// Installs a tracing subscriber exactly once, intended for use at the top of `#[test]` fns
/// gated behind the `test_logger` feature. A no-op if the feature is disabled.
pub fn init_test_logger() {
    if cfg!(feature = "test_logger") {
        INIT_TEST_LOGGER.call_once(|| init_tracing("debug"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_latch_debounces() {
        let mut latch = TimeLatch::default();
        assert!(!latch.elapsed(), "first call primes the latch");
        assert!(!latch.elapsed(), "second call is still within the debounce interval");
    }
}
