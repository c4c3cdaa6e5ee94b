use std::sync::Arc;

use crate::config::Config;

use cache::{MemoryCache, QuizCache, RedisCache};
use content_service::{ContentProvider, HttpContentProvider};
use generator_service::{LlmQuestionGenerator, QuestionGenerator};

/// Shared application state. The cache, content provider and question
/// generator are trait objects so tests and Redis-less dev runs can inject
/// in-process substitutes.
pub struct AppState {
    pub config: Config,
    pub cache: Arc<dyn QuizCache>,
    pub content: Arc<dyn ContentProvider>,
    pub generator: Arc<dyn QuestionGenerator>,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let cache: Arc<dyn QuizCache> = match config.cache_backend.as_str() {
            "memory" => {
                tracing::warn!("Using in-process memory cache; entries do not survive restarts");
                Arc::new(MemoryCache::new())
            }
            _ => Arc::new(RedisCache::connect(&config.redis_uri).await?),
        };

        let content: Arc<dyn ContentProvider> = Arc::new(HttpContentProvider::new(
            config.content_api_url.clone(),
            config.content_api_timeout_seconds,
        ));

        let generator: Arc<dyn QuestionGenerator> = Arc::new(LlmQuestionGenerator::new(&config));

        Ok(Self {
            config,
            cache,
            content,
            generator,
        })
    }
}

pub mod cache;
pub mod cache_key;
pub mod content_service;
pub mod difficulty;
pub mod generator_service;
pub mod grade_service;
pub mod normalize;
pub mod quiz_service;
