//! Metrics hooks and TTL policy for the typed facade.

use std::time::Duration;

/// Receives per-lookup outcomes from [`CacheFacade`](crate::facade::CacheFacade).
///
/// All methods default to no-ops; implement the ones you need.
pub trait CacheMetrics: Send + Sync {
    fn record_hit(&self, _key: &str, _duration: Duration) {}

    fn record_miss(&self, _key: &str, _duration: Duration) {}

    fn record_set(&self, _key: &str, _stored: bool, _duration: Duration) {}

    fn record_error(&self, _key: &str, _error: &str) {}
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpMetrics;

impl CacheMetrics for NoOpMetrics {}

/// Expiry applied by the facade's `*_default` writes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TtlPolicy {
    /// Never expire.
    #[default]
    Default,
    /// Same expiry for every entry.
    Fixed(Duration),
}

impl TtlPolicy {
    pub fn get_ttl(&self) -> Option<Duration> {
        match self {
            TtlPolicy::Default => None,
            TtlPolicy::Fixed(ttl) => Some(*ttl),
        }
    }

    /// Whole seconds for the store, `0` meaning no expiry.
    ///
    /// Sub-second remainders round up, so a non-zero duration never becomes
    /// "never expire".
    pub fn ttl_seconds(&self) -> u64 {
        self.get_ttl().map_or(0, duration_to_ttl)
    }
}

/// Round `duration` up to whole seconds.
pub fn duration_to_ttl(duration: Duration) -> u64 {
    let secs = duration.as_secs();
    if duration.subsec_nanos() > 0 {
        secs.saturating_add(1)
    } else {
        secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_policy_seconds() {
        assert_eq!(TtlPolicy::Default.ttl_seconds(), 0);
        assert_eq!(TtlPolicy::Fixed(Duration::from_secs(300)).ttl_seconds(), 300);
        assert_eq!(TtlPolicy::Fixed(Duration::from_millis(1500)).ttl_seconds(), 2);
        assert_eq!(TtlPolicy::Fixed(Duration::from_millis(1)).ttl_seconds(), 1);
        assert_eq!(TtlPolicy::Fixed(Duration::ZERO).ttl_seconds(), 0);
    }

    #[test]
    fn test_duration_to_ttl_saturates() {
        assert_eq!(duration_to_ttl(Duration::MAX), u64::MAX);
        assert_eq!(TtlPolicy::Fixed(Duration::MAX).ttl_seconds(), u64::MAX);
    }

    #[test]
    fn test_noop_metrics() {
        let metrics = NoOpMetrics;
        metrics.record_hit("k", Duration::from_millis(1));
        metrics.record_error("k", "boom");
    }
}
