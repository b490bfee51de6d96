pub mod handlers;
pub mod multipart;
pub mod validate;

use crate::{
    config::Config,
    enhancer::Enhancer,
    error::{EnhanceError, Result},
    provider::{GeminiClient, GenerationBackend},
};
use actix_web::web;
use std::sync::Arc;

pub struct AppState {
    pub enhancer: Enhancer,
    pub max_image_bytes: usize,
}

impl AppState {
    pub fn new(config: &Config, backend: Option<Arc<dyn GenerationBackend>>) -> Self {
        Self {
            enhancer: Enhancer::new(config, backend),
            max_image_bytes: config.max_image_bytes,
        }
    }

    /// Builds the Gemini client when a key is configured. Without a key the
    /// server still starts and every generation request answers 500.
    pub fn from_config(config: &Config) -> Result<Self> {
        let backend: Option<Arc<dyn GenerationBackend>> = match GeminiClient::new(&config.gemini) {
            Ok(client) => Some(Arc::new(client)),
            Err(EnhanceError::MissingApiKey) => {
                log::warn!("GEMINI_API_KEY is not set, enhancement requests will fail");
                None
            }
            Err(e) => return Err(e),
        };
        Ok(Self::new(config, backend))
    }

    pub fn with_enhancer(mut self, enhancer: Enhancer) -> Self {
        self.enhancer = enhancer;
        self
    }
}

/// Malformed JSON bodies answer with the same JSON error shape as every
/// other client error.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| EnhanceError::InvalidRequest(err.to_string()).into())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config()).service(
        web::scope("/api")
            .route("/enhance", web::post().to(handlers::enhance))
            .route("/analyze", web::post().to(handlers::analyze))
            .route("/health", web::get().to(handlers::health)),
    );
}
