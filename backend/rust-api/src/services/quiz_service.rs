use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use validator::Validate;

use crate::metrics::{record_cache_hit, record_cache_miss, record_generation, GENERATOR_FAILURES_TOTAL};
use crate::models::quiz::{GenerateQuizRequest, GenerateQuizResponse, Question, QuizData};
use crate::models::Difficulty;
use crate::services::cache::QuizCache;
use crate::services::cache_key::build_key;
use crate::services::content_service::{clean_content, ContentProvider, ProviderError};
use crate::services::difficulty::adapt;
use crate::services::generator_service::{GeneratorError, GeneratorRequest, QuestionGenerator};
use crate::services::normalize::{fallback_questions, normalize_questions};
use crate::services::AppState;

#[derive(Debug, Error)]
pub enum QuizError {
    /// Carries every violated field so the caller can fix them all at once.
    #[error("request validation failed")]
    Validation(#[from] validator::ValidationErrors),
    #[error("tutorial {0} not found")]
    TutorialNotFound(String),
}

pub struct QuizService {
    cache: Arc<dyn QuizCache>,
    content: Arc<dyn ContentProvider>,
    generator: Arc<dyn QuestionGenerator>,
    cache_ttl_seconds: u64,
}

impl QuizService {
    pub fn new(state: &AppState) -> Self {
        Self {
            cache: state.cache.clone(),
            content: state.content.clone(),
            generator: state.generator.clone(),
            cache_ttl_seconds: state.config.cache_ttl_seconds,
        }
    }

    /// The attempt orchestrator: resolve content, adapt difficulty, consult
    /// the cache, generate on miss, fall back on any generator failure. Only
    /// validation problems and a missing tutorial surface as errors; every
    /// upstream failure degrades to a usable question set.
    pub async fn generate(
        &self,
        mut request: GenerateQuizRequest,
    ) -> Result<GenerateQuizResponse, QuizError> {
        if request.content.trim().is_empty() {
            if let Some(tutorial_id) = request.tutorial_id.clone() {
                match self.content.fetch_tutorial(&tutorial_id).await {
                    Ok(tutorial) => {
                        request.content = clean_content(&tutorial.content);
                        if request.tutorial_title.is_none() {
                            request.tutorial_title = Some(tutorial.title);
                        }
                    }
                    Err(ProviderError::NotFound(id)) => {
                        return Err(QuizError::TutorialNotFound(id));
                    }
                    Err(e) => {
                        // Provider outage is not the learner's problem
                        tracing::warn!(
                            "Content provider failed for tutorial {}: {}, serving fallback quiz",
                            tutorial_id,
                            e
                        );
                        let adjusted = adapt(
                            request.difficulty,
                            request.previous_score,
                            request.attempt_number,
                        );
                        record_generation("fallback");
                        return Ok(self.fallback_response(&request, adjusted));
                    }
                }
            }
        }

        request.validate()?;

        let adjusted_difficulty = adapt(
            request.difficulty,
            request.previous_score,
            request.attempt_number,
        );

        let key = build_key(
            &request.content,
            adjusted_difficulty,
            request.question_count,
            request.attempt_number,
            request.user_id.as_deref(),
        );

        if let Some(questions) = self.cached_questions(&key).await {
            record_cache_hit();
            record_generation("cache");
            tracing::debug!("Returning cached quiz for key={}", key);
            return Ok(self.success_response(&request, adjusted_difficulty, questions, true));
        }
        record_cache_miss();

        let generator_request = GeneratorRequest {
            content: request.content.clone(),
            count: request.question_count,
            difficulty: adjusted_difficulty,
            language: request.language,
            attempt_number: request.attempt_number,
            tutorial_title: request.tutorial_title.clone(),
        };

        match self.generator.generate(&generator_request).await {
            Ok(raw) => {
                let questions =
                    normalize_questions(raw, request.question_count, request.language);
                self.store_questions(&key, &questions).await;
                record_generation("generator");
                Ok(self.success_response(&request, adjusted_difficulty, questions, false))
            }
            Err(e) => {
                GENERATOR_FAILURES_TOTAL
                    .with_label_values(&[failure_kind(&e)])
                    .inc();
                tracing::warn!("Question generator failed: {}, serving fallback quiz", e);
                record_generation("fallback");
                Ok(self.fallback_response(&request, adjusted_difficulty))
            }
        }
    }

    async fn cached_questions(&self, key: &str) -> Option<Vec<Question>> {
        match self.cache.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Question>>(&raw) {
                Ok(questions) => Some(questions),
                Err(e) => {
                    tracing::warn!("Dropping corrupt cache entry {}: {}", key, e);
                    self.cache.delete(key).await.ok();
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                // Cache trouble degrades to a miss, never to a failed request
                tracing::warn!("Cache read failed for {}: {}", key, e);
                None
            }
        }
    }

    async fn store_questions(&self, key: &str, questions: &[Question]) {
        match serde_json::to_string(questions) {
            Ok(serialized) => {
                if let Err(e) = self.cache.set(key, &serialized, self.cache_ttl_seconds).await {
                    tracing::warn!("Cache write failed for {}: {}", key, e);
                }
            }
            Err(e) => tracing::error!("Failed to serialize questions for cache: {}", e),
        }
    }

    fn success_response(
        &self,
        request: &GenerateQuizRequest,
        difficulty: Difficulty,
        questions: Vec<Question>,
        cached: bool,
    ) -> GenerateQuizResponse {
        GenerateQuizResponse {
            success: true,
            data: QuizData { questions },
            cached,
            fallback: false,
            difficulty,
            attempt_number: request.attempt_number,
            generated_at: Utc::now(),
        }
    }

    fn fallback_response(
        &self,
        request: &GenerateQuizRequest,
        difficulty: Difficulty,
    ) -> GenerateQuizResponse {
        GenerateQuizResponse {
            success: true,
            data: QuizData {
                questions: fallback_questions(request.question_count, request.language),
            },
            cached: false,
            fallback: true,
            difficulty,
            attempt_number: request.attempt_number,
            generated_at: Utc::now(),
        }
    }
}

fn failure_kind(error: &GeneratorError) -> &'static str {
    match error {
        GeneratorError::Http(_) => "http",
        GeneratorError::BadStatus(_) => "bad_status",
        GeneratorError::Unparseable => "unparseable",
        GeneratorError::Empty => "empty",
    }
}
