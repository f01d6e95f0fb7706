//! Client metrics.
//!
//! Counters are plain atomics under the hood, so concurrent callers increment
//! them without coordination.

use prometheus::{IntCounter, Registry};

/// Name of the timeout retry counter.
pub const TIMEOUT_RETRY_COUNTER: &str = "datastore_client_timeout_retry_total";

/// Name of the retry limit counter.
pub const RETRY_LIMIT_REACHED_COUNTER: &str = "datastore_client_timeout_retry_limit_reached_total";

/// Counters recorded by the request executor.
///
/// # Examples
///
/// ```
/// use datastore_client::ClientMetrics;
/// use prometheus::Registry;
///
/// let registry = Registry::new();
/// let metrics = ClientMetrics::new().unwrap();
/// metrics.register(&registry).unwrap();
///
/// assert_eq!(metrics.timeout_retry_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct ClientMetrics {
    timeout_retry: IntCounter,
    retry_limit_reached: IntCounter,
}

impl ClientMetrics {
    /// Create unregistered counters.
    pub fn new() -> Result<Self, prometheus::Error> {
        Ok(Self {
            timeout_retry: IntCounter::new(
                TIMEOUT_RETRY_COUNTER,
                "Engine requests that timed out and were considered for retry",
            )?,
            retry_limit_reached: IntCounter::new(
                RETRY_LIMIT_REACHED_COUNTER,
                "Engine requests abandoned after exhausting every retry",
            )?,
        })
    }

    /// Expose the counters through a registry.
    pub fn register(&self, registry: &Registry) -> Result<(), prometheus::Error> {
        registry.register(Box::new(self.timeout_retry.clone()))?;
        registry.register(Box::new(self.retry_limit_reached.clone()))?;
        Ok(())
    }

    /// Number of timed-out attempts so far.
    pub fn timeout_retry_count(&self) -> u64 {
        self.timeout_retry.get()
    }

    /// Number of calls that exhausted their retries.
    pub fn retry_limit_reached_count(&self) -> u64 {
        self.retry_limit_reached.get()
    }

    pub(crate) fn record_timeout_retry(&self) {
        self.timeout_retry.inc();
    }

    pub(crate) fn record_retry_limit_reached(&self) {
        self.retry_limit_reached.inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_register_exposes_counters() {
        let registry = Registry::new();
        let metrics = ClientMetrics::new().unwrap();
        metrics.register(&registry).unwrap();

        metrics.record_timeout_retry();
        metrics.record_retry_limit_reached();

        assert_eq!(registry.gather().len(), 2);
        assert_eq!(metrics.timeout_retry_count(), 1);
        assert_eq!(metrics.retry_limit_reached_count(), 1);
    }

    #[test]
    fn test_double_registration_fails() {
        let registry = Registry::new();
        let metrics = ClientMetrics::new().unwrap();
        metrics.register(&registry).unwrap();
        assert!(metrics.register(&registry).is_err());
    }

    #[test]
    fn test_concurrent_increments() {
        let metrics = ClientMetrics::new().unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let metrics = metrics.clone();
                thread::spawn(move || {
                    for _ in 0..1_000 {
                        metrics.record_timeout_retry();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(metrics.timeout_retry_count(), 8_000);
        assert_eq!(metrics.retry_limit_reached_count(), 0);
    }
}
