use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static RETRY_IN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)retry in\s+(\d+(?:\.\d+)?)\s*s").unwrap());
static DELAY_SECONDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+(?:\.\d+)?)\s*s?\s*$").unwrap());

/// The only distinctions the retry loop cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// Transient 503 / UNAVAILABLE. Retried on the same model.
    Overloaded,
    /// 429 / RESOURCE_EXHAUSTED. Moves on to the next model.
    QuotaExceeded,
    Other,
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub status: Option<u16>,
    pub message: String,
    /// `error.details` from the provider body, if any.
    pub details: Vec<Value>,
}

impl ProviderError {
    /// Classifies at construction so callers never look at message text.
    pub fn new(
        status: Option<u16>,
        code: Option<&str>,
        message: impl Into<String>,
        details: Vec<Value>,
    ) -> Self {
        let message = message.into();
        let kind = classify(status, code, &message);
        Self {
            kind,
            status,
            message,
            details,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Other,
            status: None,
            message: message.into(),
            details: Vec::new(),
        }
    }

    /// Parses a provider error body of the form
    /// `{"error": {"code", "message", "status", "details"}}`.
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed: Option<Value> = serde_json::from_str(body).ok();
        let error = parsed.as_ref().and_then(|value| value.get("error"));

        let message = error
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
            .map(String::from)
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    format!("HTTP {}", status)
                } else {
                    body.trim().to_string()
                }
            });
        let code = error.and_then(|e| e.get("status")).and_then(Value::as_str);
        let details = error
            .and_then(|e| e.get("details"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        Self::new(Some(status), code, message, details)
    }
}

pub fn classify(status: Option<u16>, code: Option<&str>, message: &str) -> ProviderErrorKind {
    let code = code.unwrap_or_default().to_ascii_uppercase();
    let message = message.to_ascii_lowercase();

    if status == Some(429)
        || code == "RESOURCE_EXHAUSTED"
        || message.contains("resource_exhausted")
        || message.contains("quota")
    {
        ProviderErrorKind::QuotaExceeded
    } else if status == Some(503)
        || code == "UNAVAILABLE"
        || message.contains("overloaded")
        || message.contains("unavailable")
    {
        ProviderErrorKind::Overloaded
    } else {
        ProviderErrorKind::Other
    }
}

/// Best-effort retry hint, rounded up to whole seconds. The "retry in Ns"
/// phrase wins over a structured `RetryInfo.retryDelay`.
pub fn extract_retry_after_seconds(error: &ProviderError) -> Option<u64> {
    if let Some(seconds) = RETRY_IN
        .captures(&error.message)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
    {
        return Some(seconds.ceil() as u64);
    }

    error
        .details
        .iter()
        .filter_map(|detail| detail.get("retryDelay").and_then(Value::as_str))
        .find_map(|delay| {
            DELAY_SECONDS
                .captures(delay)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse::<f64>().ok())
        })
        .map(|seconds| seconds.ceil() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classifies_by_status_code_and_message() {
        assert_eq!(classify(Some(429), None, ""), ProviderErrorKind::QuotaExceeded);
        assert_eq!(
            classify(Some(400), Some("RESOURCE_EXHAUSTED"), ""),
            ProviderErrorKind::QuotaExceeded
        );
        assert_eq!(classify(Some(503), None, ""), ProviderErrorKind::Overloaded);
        assert_eq!(
            classify(None, None, "The model is overloaded. Please try again later."),
            ProviderErrorKind::Overloaded
        );
        assert_eq!(classify(Some(400), Some("INVALID_ARGUMENT"), "bad"), ProviderErrorKind::Other);
    }

    #[test]
    fn retry_phrase_is_rounded_up() {
        let err = ProviderError::new(
            Some(429),
            None,
            "You exceeded your current quota. Please retry in 12.3s.",
            Vec::new(),
        );
        assert_eq!(extract_retry_after_seconds(&err), Some(13));
    }

    #[test]
    fn retry_phrase_wins_over_retry_info() {
        let err = ProviderError::new(
            Some(429),
            None,
            "Please retry in 4s",
            vec![json!({"@type": "type.googleapis.com/google.rpc.RetryInfo", "retryDelay": "30s"})],
        );
        assert_eq!(extract_retry_after_seconds(&err), Some(4));
    }

    #[test]
    fn falls_back_to_retry_info_then_none() {
        let err = ProviderError::new(
            Some(429),
            None,
            "quota",
            vec![
                json!({"@type": "type.googleapis.com/google.rpc.QuotaFailure"}),
                json!({"@type": "type.googleapis.com/google.rpc.RetryInfo", "retryDelay": "7.2s"}),
            ],
        );
        assert_eq!(extract_retry_after_seconds(&err), Some(8));

        let bare = ProviderError::new(Some(429), None, "quota", Vec::new());
        assert_eq!(extract_retry_after_seconds(&bare), None);
    }

    #[test]
    fn parses_google_error_body() {
        let body = json!({
            "error": {
                "code": 429,
                "message": "Resource has been exhausted",
                "status": "RESOURCE_EXHAUSTED",
                "details": [{"retryDelay": "21s"}]
            }
        })
        .to_string();
        let err = ProviderError::from_response(429, &body);
        assert_eq!(err.kind, ProviderErrorKind::QuotaExceeded);
        assert_eq!(err.message, "Resource has been exhausted");
        assert_eq!(extract_retry_after_seconds(&err), Some(21));

        let plain = ProviderError::from_response(503, "");
        assert_eq!(plain.kind, ProviderErrorKind::Overloaded);
        assert_eq!(plain.message, "HTTP 503");
    }
}
