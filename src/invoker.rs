use crate::{
    error::{EnhanceError, Result},
    provider::{
        extract_retry_after_seconds, GenerationBackend, GenerationRequest, ProviderError,
        ProviderErrorKind,
    },
};
use rand::Rng;
use std::time::Duration;

const TEXT_SCHEDULE_MS: [u64; 6] = [0, 500, 1200, 2500, 4500, 8000];
const IMAGE_SCHEDULE_MS: [u64; 6] = [0, 700, 1500, 3000, 5500, 9000];
const MAX_JITTER_MS: u64 = 250;

/// Per-model attempt schedule. `delays[i]` is waited before attempt `i`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub delays: Vec<Duration>,
    pub max_jitter: Duration,
}

impl RetryPolicy {
    pub fn text() -> Self {
        Self::from_millis(&TEXT_SCHEDULE_MS, MAX_JITTER_MS)
    }

    pub fn image() -> Self {
        Self::from_millis(&IMAGE_SCHEDULE_MS, MAX_JITTER_MS)
    }

    pub fn from_millis(schedule: &[u64], max_jitter_ms: u64) -> Self {
        Self {
            delays: schedule.iter().copied().map(Duration::from_millis).collect(),
            max_jitter: Duration::from_millis(max_jitter_ms),
        }
    }

    pub fn attempts(&self) -> usize {
        self.delays.len()
    }

    fn wait_before(&self, attempt: usize) -> Duration {
        let base = self.delays.get(attempt).copied().unwrap_or_default();
        if base.is_zero() || self.max_jitter.is_zero() {
            return base;
        }
        let jitter_ms = rand::thread_rng().gen_range(0..=self.max_jitter.as_millis() as u64);
        base + Duration::from_millis(jitter_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub model: String,
    pub text: String,
}

/// Tries each model in order. Overload is retried on the same model per
/// `policy`; quota moves on to the next model; anything else is returned
/// immediately.
pub async fn invoke_with_fallback(
    backend: &dyn GenerationBackend,
    models: &[String],
    policy: &RetryPolicy,
    request: &GenerationRequest,
) -> Result<Generated> {
    let mut last_error: Option<ProviderError> = None;

    for model in models {
        for attempt in 0..policy.attempts() {
            let wait = policy.wait_before(attempt);
            if !wait.is_zero() {
                tokio::time::sleep(wait).await;
            }

            match backend.generate(model, request).await {
                Ok(text) => {
                    log::info!("Model {} answered on attempt {}", model, attempt + 1);
                    return Ok(Generated {
                        model: model.clone(),
                        text,
                    });
                }
                Err(error) => match error.kind {
                    ProviderErrorKind::Overloaded => {
                        log::warn!(
                            "Model {} overloaded (attempt {}/{}): {}",
                            model,
                            attempt + 1,
                            policy.attempts(),
                            error.message
                        );
                        last_error = Some(error);
                    }
                    ProviderErrorKind::QuotaExceeded => {
                        log::warn!(
                            "Quota exceeded on {}, falling back to next model: {}",
                            model,
                            error.message
                        );
                        last_error = Some(error);
                        break;
                    }
                    ProviderErrorKind::Other => {
                        log::error!("Model {} failed: {}", model, error.message);
                        return Err(EnhanceError::Provider(error.message));
                    }
                },
            }
        }
    }

    match last_error {
        Some(error) if error.kind == ProviderErrorKind::QuotaExceeded => {
            Err(EnhanceError::QuotaExceeded {
                retry_after_seconds: extract_retry_after_seconds(&error),
                detail: error.message,
            })
        }
        Some(error) => Err(EnhanceError::Overloaded(error.message)),
        None => Err(EnhanceError::Internal(
            "No generation models configured".into(),
        )),
    }
}
