//! Text-generation backend clients.
//!
//! Defines the `TextBackend` trait, the retry driver with exponential
//! backoff and jitter, and a mock backend for tests. The concrete Grok
//! client lives in `grok`.

pub mod grok;

use crate::config::RetryConfig;
use crate::error::BackendError;
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

pub use grok::GrokClient;

/// Prefix marking a generation result that is actually a backend failure.
///
/// The retry driver never raises for backend failures; it resolves every
/// failure mode to a sentinel string so report assembly can detect and
/// surface it without crashing.
pub const BACKEND_ERROR_PREFIX: &str = "[Backend Error]: ";

/// Whether a generation result is a backend-failure sentinel.
pub fn is_backend_error(text: &str) -> bool {
    text.starts_with(BACKEND_ERROR_PREFIX)
}

/// Options for a single generation call.
#[derive(Debug, Clone, Default)]
pub struct GenerationOptions {
    /// Model override; the client's configured model when `None`.
    pub model: Option<String>,
    /// Temperature override.
    pub temperature: Option<f32>,
    /// Max-tokens override.
    pub max_tokens: Option<usize>,
}

/// Trait for text-generation backends.
///
/// `complete` is a single attempt; retries are the driver's concern.
#[async_trait]
pub trait TextBackend: Send + Sync {
    /// Perform one completion attempt.
    async fn complete(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, BackendError>;

    /// The configured model identifier.
    fn model_name(&self) -> &str;
}

/// Disposition of one call attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallDisposition {
    Success,
    RetryableError,
    FatalError,
}

/// Outcome of one call attempt. Ephemeral: surfaced through logging only,
/// never retained across calls.
#[derive(Debug, Clone)]
pub struct CallOutcome {
    pub attempt: u32,
    pub delay: Duration,
    pub outcome: CallDisposition,
}

/// Compute the backoff delay after `completed_attempts` failed attempts.
///
/// Classic exponential backoff with jitter: the delay before attempt n
/// (n >= 2) is `base_delay * 2^(n-2)` plus up to one second of random
/// jitter, so synchronized clients fan out instead of retrying in lockstep.
pub fn backoff_delay(policy: &RetryConfig, completed_attempts: u32) -> Duration {
    let exponent = completed_attempts.saturating_sub(1).min(16);
    let base_ms = policy.base_delay_ms.saturating_mul(1u64 << exponent);
    let jitter_ms = if policy.jitter {
        rand::thread_rng().gen_range(0..1_000u64)
    } else {
        0
    };
    Duration::from_millis(base_ms + jitter_ms)
}

/// Execute a generation call with bounded retries on transient errors.
///
/// Rate limits (429), server errors (5xx), and network failures are retried
/// up to `policy.max_attempts` total attempts; other HTTP errors and
/// malformed responses fail immediately. Every failure mode resolves to a
/// `[Backend Error]:`-prefixed string rather than an error value.
pub async fn generate_with_retry(
    backend: &dyn TextBackend,
    prompt: &str,
    options: &GenerationOptions,
    policy: &RetryConfig,
) -> String {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1u32;
    loop {
        match backend.complete(prompt, options).await {
            Ok(text) => {
                let outcome = CallOutcome {
                    attempt,
                    delay: Duration::ZERO,
                    outcome: CallDisposition::Success,
                };
                tracing::debug!(attempt = outcome.attempt, "Backend call succeeded");
                return text;
            }
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                let delay = backoff_delay(policy, attempt);
                let outcome = CallOutcome {
                    attempt,
                    delay,
                    outcome: CallDisposition::RetryableError,
                };
                tracing::warn!(
                    attempt = outcome.attempt,
                    max = max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Retrying after transient backend error"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) if e.is_retryable() => {
                tracing::error!(attempts = max_attempts, error = %e, "Backend retries exhausted");
                let detail = match e {
                    BackendError::Connection { .. } | BackendError::Timeout { .. } => {
                        format!("Network error after {} attempts - {}", max_attempts, e)
                    }
                    _ => format!("Failed after {} attempts - {}", max_attempts, e),
                };
                return format!("{}{}", BACKEND_ERROR_PREFIX, detail);
            }
            Err(e) => {
                let outcome = CallOutcome {
                    attempt,
                    delay: Duration::ZERO,
                    outcome: CallDisposition::FatalError,
                };
                tracing::error!(attempt = outcome.attempt, error = %e, "Fatal backend error");
                return format!("{}{}", BACKEND_ERROR_PREFIX, e);
            }
        }
    }
}

/// A scripted backend for tests: pops queued responses in order.
pub struct MockBackend {
    model: String,
    responses: std::sync::Mutex<std::collections::VecDeque<Result<String, BackendError>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            model: "mock-model".to_string(),
            responses: std::sync::Mutex::new(std::collections::VecDeque::new()),
        }
    }

    /// A backend that always answers with the given text.
    pub fn with_response(text: &str) -> Self {
        let backend = Self::new();
        for _ in 0..20 {
            backend.queue(Ok(text.to_string()));
        }
        backend
    }

    /// Queue the result of the next `complete` call.
    pub fn queue(&self, response: Result<String, BackendError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// Number of queued responses consumed so far is not tracked; this
    /// returns how many remain.
    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextBackend for MockBackend {
    async fn complete(
        &self,
        _prompt: &str,
        _options: &GenerationOptions,
    ) -> Result<String, BackendError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("Mock backend: no queued responses.".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_jitter_policy() -> RetryConfig {
        RetryConfig {
            max_attempts: 5,
            base_delay_ms: 1_000,
            jitter: false,
        }
    }

    fn fast_policy() -> RetryConfig {
        RetryConfig {
            max_attempts: 5,
            base_delay_ms: 1,
            jitter: false,
        }
    }

    #[test]
    fn test_backoff_schedule_doubles_from_base() {
        let policy = no_jitter_policy();
        assert_eq!(backoff_delay(&policy, 1), Duration::from_millis(1_000));
        assert_eq!(backoff_delay(&policy, 2), Duration::from_millis(2_000));
        assert_eq!(backoff_delay(&policy, 3), Duration::from_millis(4_000));
        assert_eq!(backoff_delay(&policy, 4), Duration::from_millis(8_000));
    }

    #[test]
    fn test_backoff_total_meets_retry_budget() {
        // Four failures before the fifth attempt wait 1+2+4+8 seconds in
        // total, jitter aside.
        let policy = no_jitter_policy();
        let total: Duration = (1..=4).map(|n| backoff_delay(&policy, n)).sum();
        assert!(total >= Duration::from_secs(15));
    }

    #[test]
    fn test_backoff_jitter_stays_under_one_second() {
        let policy = RetryConfig {
            max_attempts: 5,
            base_delay_ms: 1_000,
            jitter: true,
        };
        for _ in 0..50 {
            let delay = backoff_delay(&policy, 1);
            assert!(delay >= Duration::from_millis(1_000));
            assert!(delay < Duration::from_millis(2_000));
        }
    }

    #[tokio::test]
    async fn test_retry_succeeds_on_fifth_attempt() {
        let backend = MockBackend::new();
        for _ in 0..4 {
            backend.queue(Err(BackendError::RateLimited));
        }
        backend.queue(Ok("analysis complete".to_string()));

        let result = generate_with_retry(
            &backend,
            "prompt",
            &GenerationOptions::default(),
            &fast_policy(),
        )
        .await;

        assert_eq!(result, "analysis complete");
        assert_eq!(backend.remaining(), 0);
    }

    #[tokio::test]
    async fn test_retryable_errors_exhaust_to_sentinel() {
        let backend = MockBackend::new();
        for _ in 0..5 {
            backend.queue(Err(BackendError::Server { status: 503 }));
        }

        let result = generate_with_retry(
            &backend,
            "prompt",
            &GenerationOptions::default(),
            &fast_policy(),
        )
        .await;

        assert!(is_backend_error(&result));
        assert!(result.contains("Failed after 5 attempts"));
        assert_eq!(backend.remaining(), 0);
    }

    #[tokio::test]
    async fn test_network_exhaustion_sentinel_mentions_network() {
        let backend = MockBackend::new();
        for _ in 0..5 {
            backend.queue(Err(BackendError::Connection {
                message: "connection reset".into(),
            }));
        }

        let result = generate_with_retry(
            &backend,
            "prompt",
            &GenerationOptions::default(),
            &fast_policy(),
        )
        .await;

        assert!(result.starts_with(BACKEND_ERROR_PREFIX));
        assert!(result.contains("Network error after 5 attempts"));
    }

    #[tokio::test]
    async fn test_fatal_error_makes_exactly_one_attempt() {
        let backend = MockBackend::new();
        backend.queue(Err(BackendError::Http {
            status: 401,
            message: "unauthorized".into(),
        }));
        // Would succeed if a second attempt were (incorrectly) made.
        backend.queue(Ok("should never be reached".to_string()));

        let result = generate_with_retry(
            &backend,
            "prompt",
            &GenerationOptions::default(),
            &fast_policy(),
        )
        .await;

        assert!(is_backend_error(&result));
        assert!(result.contains("Unrecoverable HTTP error"));
        assert_eq!(backend.remaining(), 1);
    }

    #[tokio::test]
    async fn test_malformed_response_is_fatal() {
        let backend = MockBackend::new();
        backend.queue(Err(BackendError::MalformedResponse {
            message: "no choices in response".into(),
        }));

        let result = generate_with_retry(
            &backend,
            "prompt",
            &GenerationOptions::default(),
            &fast_policy(),
        )
        .await;

        assert!(result.contains("Invalid response structure"));
    }

    #[test]
    fn test_is_backend_error_detection() {
        assert!(is_backend_error("[Backend Error]: anything"));
        assert!(!is_backend_error("a normal analysis"));
    }
}
