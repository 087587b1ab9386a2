//! Configurable retry mechanism for transient chain and network failures.

use std::time::Duration;

/// A type used for retrying transient failures in operations.
#[derive(Debug, Clone)]
pub struct Retry {
    /// Maximum number of retry attempts. None means infinite retries
    pub max_retries: Option<usize>,
    /// Initial delay between retries in milliseconds
    pub initial_delay_ms: u64,
    /// Whether to use exponential backoff
    pub exponential_backoff: bool,
}

impl Default for Retry {
    fn default() -> Self {
        Self { max_retries: None, initial_delay_ms: 50, exponential_backoff: false }
    }
}

impl Retry {
    /// Creates a new [`Retry`] with the specified parameters.
    pub const fn new(
        max_retries: Option<usize>,
        initial_delay_ms: u64,
        exponential_backoff: bool,
    ) -> Self {
        Self { max_retries, initial_delay_ms, exponential_backoff }
    }

    /// Retry an asynchronous operation with the configured retry strategy.
    pub async fn retry<F, Fut, T, E>(&self, operation_name: &str, operation: F) -> Result<T, E>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
        E: std::fmt::Debug,
    {
        self.retry_if(operation_name, operation, |_| true).await
    }

    /// Retry an asynchronous operation with the configured retry strategy,
    /// only for errors the predicate classifies as retryable. A non-retryable
    /// error is returned immediately.
    pub async fn retry_if<F, Fut, T, E, P>(
        &self,
        operation_name: &str,
        operation: F,
        is_retryable: P,
    ) -> Result<T, E>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
        E: std::fmt::Debug,
        P: Fn(&E) -> bool,
    {
        let mut attempt: usize = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(error) => {
                    if !is_retryable(&error) {
                        return Err(error);
                    }
                    if let Some(max_retries) = self.max_retries {
                        if attempt >= max_retries {
                            return Err(error);
                        }
                    }

                    attempt += 1;
                    tracing::debug!(
                        target: "bridge::orchestrator",
                        operation = operation_name,
                        error = ?error,
                        attempt = attempt,
                        "Retrying operation"
                    );

                    // Calculate delay for next retry
                    let delay_ms = if self.exponential_backoff {
                        self.initial_delay_ms * 2_u64.pow(attempt as u32 - 1)
                    } else {
                        self.initial_delay_ms
                    };

                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }
}
