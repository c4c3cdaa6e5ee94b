use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

use super::{Difficulty, Language};

/// The four option identifiers every question carries.
pub const OPTION_IDS: [&str; 4] = ["A", "B", "C", "D"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: String,
    pub text: String,
}

/// A normalized multiple-choice question. Invariants: exactly four options,
/// `correct_answer` equals one of the option ids, ids numbered 1..N by position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: u32,
    pub question: String,
    pub options: Vec<QuestionOption>,
    pub correct_answer: String,
    pub explanation: String,
}

fn default_question_count() -> u8 {
    3
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuizRequest {
    /// Tutorial body text. May arrive empty when `tutorial_id` is set; the
    /// orchestrator resolves it before validation runs.
    #[serde(default)]
    #[validate(length(min = 100, max = 50000, message = "content must be 100-50000 characters"))]
    pub content: String,

    #[serde(default)]
    pub tutorial_id: Option<String>,

    pub difficulty: Difficulty,

    #[serde(default = "default_question_count")]
    #[validate(range(min = 1, max = 10, message = "questionCount must be 1-10"))]
    pub question_count: u8,

    #[serde(default)]
    pub language: Language,

    #[serde(default)]
    pub tutorial_title: Option<String>,

    /// Zero-based regeneration counter for the same tutorial in one session.
    #[serde(default)]
    pub attempt_number: u32,

    #[validate(range(min = 0, max = 100, message = "previousScore must be 0-100"))]
    #[serde(default)]
    pub previous_score: Option<u8>,

    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizData {
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuizResponse {
    pub success: bool,
    pub data: QuizData,
    pub cached: bool,
    pub fallback: bool,
    pub difficulty: Difficulty,
    pub attempt_number: u32,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GradeQuizRequest {
    #[validate(length(min = 1, message = "questions must not be empty"))]
    pub questions: Vec<Question>,

    /// Learner answers keyed by question id.
    pub answers: HashMap<u32, String>,

    pub difficulty: Difficulty,

    #[serde(default)]
    pub attempt_number: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeQuizResponse {
    pub success: bool,
    pub score: u32,
    pub total: u32,
    pub percentage: u8,
    pub next_difficulty: Difficulty,
    pub graded_at: DateTime<Utc>,
}
