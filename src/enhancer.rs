use crate::{
    cache::{fingerprint, ResponseCache},
    config::Config,
    error::{EnhanceError, Result},
    invoker::{invoke_with_fallback, RetryPolicy},
    models::{EnhanceResult, ImageEnhanceRequest, TextEnhanceRequest},
    normalize::{normalize, RawOutput},
    prompts,
    provider::{GenerationBackend, GenerationRequest},
};
use std::sync::Arc;

const MAX_DETAIL_CHARS: usize = 500;

/// The shared pipeline: assemble prompt, invoke with retry/fallback, parse,
/// normalize and, for the image flow, cache.
pub struct Enhancer {
    backend: Option<Arc<dyn GenerationBackend>>,
    models: Vec<String>,
    text_policy: RetryPolicy,
    image_policy: RetryPolicy,
    cache: ResponseCache,
}

impl Enhancer {
    pub fn new(config: &Config, backend: Option<Arc<dyn GenerationBackend>>) -> Self {
        Self {
            backend,
            models: config.gemini.models.clone(),
            text_policy: RetryPolicy::text(),
            image_policy: RetryPolicy::image(),
            cache: ResponseCache::new(config.cache_capacity, config.cache_ttl),
        }
    }

    pub fn with_policies(mut self, text: RetryPolicy, image: RetryPolicy) -> Self {
        self.text_policy = text;
        self.image_policy = image;
        self
    }

    pub fn with_cache(mut self, cache: ResponseCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    fn backend(&self) -> Result<&dyn GenerationBackend> {
        self.backend.as_deref().ok_or(EnhanceError::MissingApiKey)
    }

    pub async fn enhance_text(&self, request: &TextEnhanceRequest) -> Result<EnhanceResult> {
        let backend = self.backend()?;
        let prompt = prompts::build_text_prompt(request.target, request.art_style, &request.idea);

        let generated = invoke_with_fallback(
            backend,
            &self.models,
            &self.text_policy,
            &GenerationRequest::text(prompt),
        )
        .await?;

        let raw = parse_model_output(&generated.text)?;
        Ok(normalize(&raw, request.art_style))
    }

    pub async fn enhance_image(&self, request: &ImageEnhanceRequest) -> Result<EnhanceResult> {
        let backend = self.backend()?;
        let key = fingerprint(
            request.mode,
            request.target,
            request.art_style,
            request.idea.as_deref().unwrap_or_default(),
            &request.image.mime_type,
            &request.image.bytes,
        );

        if let Some(hit) = self.cache.get(&key) {
            log::info!("Response cache hit for {} image", request.mode.as_str());
            return Ok(hit);
        }

        let prompt = prompts::build_image_prompt(
            request.target,
            request.art_style,
            request.mode,
            request.idea.as_deref(),
        );
        let generation = GenerationRequest::text(prompt)
            .with_image(request.image.mime_type.clone(), request.image.bytes.clone());

        let generated =
            invoke_with_fallback(backend, &self.models, &self.image_policy, &generation).await?;

        let raw = parse_model_output(&generated.text)?;
        let result = normalize(&raw, request.art_style);
        self.cache.put(key, result.clone());
        Ok(result)
    }
}

/// Parses model text as JSON, tolerating a surrounding Markdown code fence.
/// Text that is not JSON at all is reported; any JSON shape is accepted.
pub fn parse_model_output(text: &str) -> Result<RawOutput> {
    let body = strip_code_fence(text);
    serde_json::from_str(body)
        .map(RawOutput::from_value)
        .map_err(|_| EnhanceError::InvalidModelOutput(truncate(text, MAX_DETAIL_CHARS)))
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    // Drop an info string such as `json` on the opening fence line.
    match rest.split_once('\n') {
        Some((info, body)) if !info.trim_start().starts_with(['{', '[']) => body.trim(),
        _ => rest.trim(),
    }
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let truncated: String = text.chars().take(limit).collect();
    format!("{}...", truncated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnalyzeMode, ArtStyle, ReferenceImage, TargetTool};
    use crate::provider::ProviderError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        reply: String,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl GenerationBackend for Fixed {
        async fn generate(
            &self,
            _model: &str,
            _request: &GenerationRequest,
        ) -> std::result::Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    fn enhancer(reply: &str) -> (Enhancer, Arc<Fixed>) {
        let backend = Arc::new(Fixed {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
        });
        let instant = RetryPolicy::from_millis(&[0], 0);
        let enhancer = Enhancer::new(
            &Config::default(),
            Some(backend.clone() as Arc<dyn GenerationBackend>),
        )
        .with_policies(instant.clone(), instant);
        (enhancer, backend)
    }

    fn image_request() -> ImageEnhanceRequest {
        ImageEnhanceRequest {
            idea: None,
            target: TargetTool::Generic,
            art_style: ArtStyle::Watercolor,
            mode: AnalyzeMode::Recreate,
            image: ReferenceImage {
                mime_type: "image/png".into(),
                bytes: vec![0x89, 0x50, 0x4e, 0x47],
            },
        }
    }

    #[test]
    fn code_fences_are_tolerated() {
        let raw = parse_model_output("```json\n{\"clean\": \"a fox\"}\n```").unwrap();
        assert!(matches!(raw, RawOutput::Shaped(ref map) if map["clean"] == "a fox"));

        let bare = parse_model_output("```{\"clean\": \"x\"}```").unwrap();
        assert!(matches!(bare, RawOutput::Shaped(_)));
    }

    #[test]
    fn non_json_text_is_reported() {
        let err = parse_model_output("Sure! Here are your prompts:").unwrap_err();
        assert!(matches!(err, EnhanceError::InvalidModelOutput(ref d) if d.starts_with("Sure!")));
    }

    #[test]
    fn wrong_shape_json_is_accepted() {
        assert!(matches!(parse_model_output("[1, 2]").unwrap(), RawOutput::Opaque));
    }

    #[tokio::test]
    async fn missing_backend_is_a_config_error() {
        let enhancer = Enhancer::new(&Config::default(), None);
        let request = TextEnhanceRequest {
            idea: "a fox".into(),
            target: TargetTool::Generic,
            art_style: ArtStyle::None,
        };
        let err = enhancer.enhance_text(&request).await.unwrap_err();
        assert!(matches!(err, EnhanceError::MissingApiKey));
    }

    #[tokio::test]
    async fn image_results_are_cached() {
        let (enhancer, backend) = enhancer(r#"{"clean": "a fox in the snow"}"#);
        let first = enhancer.enhance_image(&image_request()).await.unwrap();
        let second = enhancer.enhance_image(&image_request()).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        assert_eq!(enhancer.cache().len(), 1);
    }

    #[tokio::test]
    async fn text_results_are_not_cached() {
        let (enhancer, backend) = enhancer(r#"{"clean": "a fox"}"#);
        let request = TextEnhanceRequest {
            idea: "a fox".into(),
            target: TargetTool::Generic,
            art_style: ArtStyle::None,
        };
        enhancer.enhance_text(&request).await.unwrap();
        enhancer.enhance_text(&request).await.unwrap();
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
        assert!(enhancer.cache().is_empty());
    }
}
