pub mod cache;
pub mod config;
pub mod enhancer;
pub mod error;
pub mod invoker;
pub mod logger;
pub mod models;
pub mod normalize;
pub mod prompts;
pub mod provider;
pub mod server;

pub use cache::{fingerprint, Clock, ResponseCache, SystemClock};
pub use config::{Config, GeminiConfig};
pub use enhancer::Enhancer;
pub use error::{EnhanceError, Result};
pub use invoker::{invoke_with_fallback, RetryPolicy};
pub use models::*;
pub use normalize::{normalize, normalize_value, RawOutput};
pub use provider::{
    extract_retry_after_seconds, GeminiClient, GenerationBackend, GenerationRequest, ProviderError,
    ProviderErrorKind,
};
pub use server::AppState;
