pub mod error;
pub mod gemini;

use async_trait::async_trait;

pub use error::{classify, extract_retry_after_seconds, ProviderError, ProviderErrorKind};
pub use gemini::GeminiClient;

#[derive(Debug, Clone)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// One call to the generative-language API.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub image: Option<InlineImage>,
}

impl GenerationRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image: None,
        }
    }

    pub fn with_image(mut self, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        self.image = Some(InlineImage {
            mime_type: mime_type.into(),
            data,
        });
        self
    }
}

#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Returns the raw text the model produced for `model`.
    async fn generate(
        &self,
        model: &str,
        request: &GenerationRequest,
    ) -> Result<String, ProviderError>;
}
