use actix_web::{
    http::{header, StatusCode},
    HttpResponse, ResponseError,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum EnhanceError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Image too large: {size} bytes (limit {limit})")]
    ImageTooLarge { size: usize, limit: usize },
    #[error("Missing GEMINI_API_KEY")]
    MissingApiKey,
    #[error("Model is overloaded: {0}")]
    Overloaded(String),
    #[error("Quota exceeded: {detail}")]
    QuotaExceeded {
        detail: String,
        retry_after_seconds: Option<u64>,
    },
    #[error("Model returned non-JSON output: {0}")]
    InvalidModelOutput(String),
    #[error("Provider error: {0}")]
    Provider(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, EnhanceError>;

impl EnhanceError {
    /// Short, stable summary used as the `error` field of the JSON body.
    pub fn summary(&self) -> &'static str {
        match self {
            EnhanceError::InvalidRequest(_) => "Invalid request",
            EnhanceError::ImageTooLarge { .. } => "Image too large",
            EnhanceError::MissingApiKey => "Missing GEMINI_API_KEY",
            EnhanceError::Overloaded(_) => "Model is overloaded, please try again shortly",
            EnhanceError::QuotaExceeded { .. } => "Quota exceeded for all configured models",
            EnhanceError::InvalidModelOutput(_) => "Model did not return valid JSON",
            EnhanceError::Provider(_) | EnhanceError::Internal(_) => "Enhancement failed",
        }
    }

    fn detail(&self) -> Option<&str> {
        match self {
            EnhanceError::InvalidRequest(detail)
            | EnhanceError::Overloaded(detail)
            | EnhanceError::InvalidModelOutput(detail)
            | EnhanceError::Provider(detail)
            | EnhanceError::Internal(detail)
            | EnhanceError::QuotaExceeded { detail, .. } => Some(detail.as_str()),
            EnhanceError::ImageTooLarge { .. } | EnhanceError::MissingApiKey => None,
        }
    }
}

impl ResponseError for EnhanceError {
    fn status_code(&self) -> StatusCode {
        match self {
            EnhanceError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            EnhanceError::ImageTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            EnhanceError::Overloaded(_) => StatusCode::SERVICE_UNAVAILABLE,
            EnhanceError::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            EnhanceError::InvalidModelOutput(_) => StatusCode::BAD_GATEWAY,
            EnhanceError::MissingApiKey | EnhanceError::Provider(_) | EnhanceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut body = json!({ "error": self.summary() });
        if let Some(detail) = self.detail() {
            body["detail"] = json!(detail);
        }
        if let EnhanceError::ImageTooLarge { size, limit } = self {
            body["detail"] = json!(format!("{} bytes exceeds the {} byte limit", size, limit));
        }

        let mut response = HttpResponse::build(self.status_code());
        if let EnhanceError::QuotaExceeded {
            retry_after_seconds,
            ..
        } = self
        {
            body["retryAfterSeconds"] = json!(retry_after_seconds);
            if let Some(seconds) = retry_after_seconds {
                response.insert_header((header::RETRY_AFTER, seconds.to_string()));
            }
        }
        response.json(body)
    }
}
