use std::time::Duration;

use tracing::warn;

use super::{BackendError, GenerativeBackend};

/// Exponential backoff applied to quota errors.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Wait before retry number `attempt + 1`: base, 2x base, 4x base, ...
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Call `backend.generate`, sleeping and retrying while the provider
    /// reports quota exhaustion. Other errors, and the last quota error once
    /// retries run out, are returned as-is.
    pub async fn generate(
        &self,
        backend: &dyn GenerativeBackend,
        model: &str,
        prompt: &str,
        temperature: f64,
    ) -> Result<Option<String>, BackendError> {
        let mut attempt = 0;
        loop {
            match backend.generate(model, prompt, temperature).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_quota_exhausted() && attempt < self.max_retries => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        backend = backend.name(),
                        model,
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        delay_secs = delay.as_secs_f64(),
                        error = %e,
                        "quota exceeded, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::{quota_error, FakeBackend};

    #[test]
    fn test_delay_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_secs(2));
        assert_eq!(policy.delay_for(1), Duration::from_secs(4));
        assert_eq!(policy.delay_for(2), Duration::from_secs(8));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_quota_then_succeeds() {
        let backend = FakeBackend::with_replies(vec![
            Err(quota_error()),
            Err(quota_error()),
            Err(quota_error()),
            Ok("done".into()),
        ]);

        let text = RetryPolicy::default()
            .generate(&backend, "gemini-2.5-flash", "hi", 0.1)
            .await
            .unwrap();

        assert_eq!(text.as_deref(), Some("done"));
        assert_eq!(
            backend.waits(),
            vec![
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(8)
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_ceiling() {
        let backend = FakeBackend::with_replies((0..4).map(|_| Err(quota_error())).collect());

        let err = RetryPolicy::default()
            .generate(&backend, "gemini-2.5-flash", "hi", 0.1)
            .await
            .unwrap_err();

        assert!(err.is_quota_exhausted());
        assert_eq!(backend.calls().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_errors_are_not_retried() {
        let backend = FakeBackend::with_replies(vec![Err(BackendError::Api {
            status: 400,
            message: "400 INVALID_ARGUMENT. model not found".into(),
        })]);

        let err = RetryPolicy::default()
            .generate(&backend, "nope", "hi", 0.1)
            .await
            .unwrap_err();

        assert!(!err.is_quota_exhausted());
        assert_eq!(backend.calls().len(), 1);
    }
}
