//! Request execution with timeout retry.

use crate::{
    error::{ClientError, Result},
    metrics::ClientMetrics,
};
use datastore_transport::{RawResponse, RetryConfig, TransportError};
use std::future::Future;
use tracing::{debug, warn};

/// Runs one logical operation, retrying round trips that time out.
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    retry: RetryConfig,
    metrics: ClientMetrics,
}

impl RequestExecutor {
    /// Create a new executor.
    pub fn new(retry: RetryConfig, metrics: ClientMetrics) -> Self {
        Self { retry, metrics }
    }

    /// Get the retry configuration.
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Get the metrics recorded by this executor.
    pub fn metrics(&self) -> &ClientMetrics {
        &self.metrics
    }

    /// Execute `action`, which must perform exactly one round trip per call.
    ///
    /// Timeouts are retried up to `max_attempts` more times with a jittered
    /// sleep between early attempts. A structured error response from the
    /// transport is returned for classification, never retried. Any other
    /// transport failure ends the call.
    pub async fn execute<F, Fut>(
        &self,
        mut action: F,
        index: &str,
        operation: &str,
    ) -> Result<RawResponse>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = datastore_transport::Result<RawResponse>>,
    {
        let mut attempt: u32 = 0;

        loop {
            match action().await {
                Ok(response) => return Ok(response),
                Err(TransportError::Status(response)) => {
                    warn!(
                        status = %response.status_label(),
                        index,
                        operation,
                        "Engine responded with an error status"
                    );
                    return Ok(response);
                }
                Err(e) if e.is_transient() => {
                    self.metrics.record_timeout_retry();
                    debug!(attempt = attempt + 1, index, operation, error = %e, "Request timed out");

                    if self.retry.should_wait_after(attempt) {
                        let delay = self.retry.backoff_delay();
                        debug!(?delay, index, operation, "Backing off before retry");
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(e) => {
                    return Err(ClientError::Transport {
                        operation: operation.to_string(),
                        source: e,
                    });
                }
            }

            if !self.retry.has_attempt_after(attempt) {
                break;
            }
            attempt += 1;
        }

        self.metrics.record_retry_limit_reached();
        warn!(attempts = attempt + 1, index, operation, "Retry limit reached");

        Err(ClientError::Communication {
            operation: operation.to_string(),
            index: index.to_string(),
            attempts: attempt + 1,
        })
    }
}
