//! Delay before retrying a backend read.

use std::time::Duration;

use rand::Rng;

use crate::config::RetryConfig;

/// Delay after failed attempt number `attempt` (1-based).
///
/// Doubles from `base_delay_ms` up to `max_delay_ms`, then picks a point in
/// the upper half of that window so concurrent retries spread out.
pub fn retry_delay(attempt: u32, retries: &RetryConfig) -> Duration {
    if attempt == 0 || retries.base_delay_ms == 0 {
        return Duration::ZERO;
    }

    let ceiling = retries
        .base_delay_ms
        .saturating_mul(1u64 << (attempt - 1).min(20))
        .min(retries.max_delay_ms.max(retries.base_delay_ms));
    let floor = ceiling / 2;

    Duration::from_millis(rand::thread_rng().gen_range(floor..=ceiling))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn retries(base: u64, max: u64) -> RetryConfig {
        RetryConfig {
            base_delay_ms: base,
            max_delay_ms: max,
            ..Default::default()
        }
    }

    #[test]
    fn test_delay_doubles_within_window() {
        let config = retries(100, 2000);
        assert_eq!(retry_delay(0, &config), Duration::ZERO);

        let first = retry_delay(1, &config).as_millis();
        assert!((50..=100).contains(&first));

        let third = retry_delay(3, &config).as_millis();
        assert!((200..=400).contains(&third));
    }

    #[test]
    fn test_delay_is_capped() {
        let config = retries(100, 1000);
        for attempt in [5, 30, u32::MAX] {
            let delay = retry_delay(attempt, &config).as_millis();
            assert!((500..=1000).contains(&delay), "attempt {}", attempt);
        }
    }

    #[test]
    fn test_zero_base_disables_waiting() {
        assert_eq!(retry_delay(2, &retries(0, 1000)), Duration::ZERO);
    }
}
