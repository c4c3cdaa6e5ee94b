use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::config::Config;
use crate::models::{Difficulty, Language};

/// Longest cleaned-content prefix that goes into a prompt.
const MAX_PROMPT_CONTENT_CHARS: usize = 6000;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("generator request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("generator returned status {0}")]
    BadStatus(u16),
    #[error("generator output could not be parsed as a question array")]
    Unparseable,
    #[error("generator returned no questions")]
    Empty,
}

/// Question-shaped object as the generator emits it. Every field is
/// untrusted; normalization fills the gaps.
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuestion {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub options: Vec<RawOption>,
    #[serde(default, alias = "correctAnswer")]
    pub correct_answer: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawOption {
    Labeled {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        text: Option<String>,
    },
    Bare(String),
    Other(serde_json::Value),
}

#[derive(Debug, Clone)]
pub struct GeneratorRequest {
    pub content: String,
    pub count: u8,
    pub difficulty: Difficulty,
    pub language: Language,
    pub attempt_number: u32,
    pub tutorial_title: Option<String>,
}

#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    async fn generate(&self, request: &GeneratorRequest) -> Result<Vec<RawQuestion>, GeneratorError>;
}

/// Live implementation against an OpenAI-style chat completions endpoint.
pub struct LlmQuestionGenerator {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl LlmQuestionGenerator {
    pub fn new(config: &Config) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.generator_timeout_seconds))
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_url: config.generator_api_url.clone(),
            api_key: config.generator_api_key.clone(),
            model: config.generator_model.clone(),
        }
    }
}

#[async_trait]
impl QuestionGenerator for LlmQuestionGenerator {
    async fn generate(&self, request: &GeneratorRequest) -> Result<Vec<RawQuestion>, GeneratorError> {
        let payload = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_prompt(request.language)},
                {"role": "user", "content": build_prompt(request)}
            ],
            "temperature": 0.7
        });

        let mut builder = self.client.post(&self.api_url).json(&payload);
        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }

        let response = builder.send().await?;

        if !response.status().is_success() {
            return Err(GeneratorError::BadStatus(response.status().as_u16()));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|_| GeneratorError::Unparseable)?;

        let text = body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(GeneratorError::Unparseable)?;

        let questions = parse_question_payload(text)?;
        if questions.is_empty() {
            return Err(GeneratorError::Empty);
        }

        Ok(questions)
    }
}

fn system_prompt(language: Language) -> &'static str {
    match language {
        Language::Id => {
            "You are a tutor creating multiple-choice quiz questions from learning material. \
             All question text, options and explanations MUST be in Indonesian. \
             Respond with a JSON array only, no prose."
        }
        Language::En => {
            "You are a tutor creating multiple-choice quiz questions from learning material. \
             All question text, options and explanations MUST be in English. \
             Respond with a JSON array only, no prose."
        }
    }
}

fn build_prompt(request: &GeneratorRequest) -> String {
    let difficulty_guidance = match request.difficulty {
        Difficulty::Easy => "Ask about facts stated directly in the material.",
        Difficulty::Medium => "Ask questions that require understanding relations in the material.",
        Difficulty::Hard => "Ask questions that require applying the material to new situations.",
    };

    let mut prompt = String::new();
    if let Some(title) = &request.tutorial_title {
        prompt.push_str(&format!("Tutorial: {}\n\n", title));
    }
    prompt.push_str(&format!(
        "Create exactly {} multiple-choice questions at {} difficulty. {}\n",
        request.count,
        request.difficulty.as_str(),
        difficulty_guidance
    ));
    if request.attempt_number > 0 {
        // Regeneration: steer the model away from repeating earlier attempts
        prompt.push_str(&format!(
            "This is regeneration attempt {}; the questions must differ from earlier sets.\n",
            request.attempt_number
        ));
    }
    prompt.push_str(
        "Each element must have: \"question\", \"options\" (array of four objects with \"id\" \
         \"A\"-\"D\" and \"text\"), \"correctAnswer\" (one of the option ids, varied across \
         questions), \"explanation\".\n\nMaterial:\n",
    );
    prompt.push_str(&truncate_chars(&request.content, MAX_PROMPT_CONTENT_CHARS));
    prompt
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}

/// Parses generator output into question-shaped objects: strip code-fence
/// markers, take the outermost bracketed span, parse as a JSON array.
/// Anything else is a generation failure, never a partial result.
pub fn parse_question_payload(text: &str) -> Result<Vec<RawQuestion>, GeneratorError> {
    let stripped = text.replace("```json", "").replace("```", "");

    let start = stripped.find('[').ok_or(GeneratorError::Unparseable)?;
    let end = stripped.rfind(']').ok_or(GeneratorError::Unparseable)?;
    if end < start {
        return Err(GeneratorError::Unparseable);
    }

    serde_json::from_str::<Vec<RawQuestion>>(&stripped[start..=end])
        .map_err(|_| GeneratorError::Unparseable)
}
