//! Exponential backoff with jitter.

use std::time::Duration;
use rand::Rng;

/// Delay before the retry that follows failed attempt `attempt` (0-based).
///
/// `min(base_ms * 2^attempt, max_ms)` plus a uniform jitter in `0..=max_jitter_ms`.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_jitter_ms: u64, max_ms: u64) -> Duration {
    let exponential_base = 2u64.saturating_pow(attempt);
    let delay_ms = base_ms.saturating_mul(exponential_base);
    let capped_delay = delay_ms.min(max_ms);

    let jitter = if max_jitter_ms > 0 {
        rand::thread_rng().gen_range(0..=max_jitter_ms)
    } else {
        0
    };

    Duration::from_millis(capped_delay.saturating_add(jitter))
}
