// Grading endpoint tests: scoring, the shared difficulty rule, validation.
use axum::http::StatusCode;
use serde_json::json;
use std::sync::Arc;

mod common;

use common::{create_test_app, post_json, ScriptedGenerator, StaticContentProvider, THREE_QUESTION_PAYLOAD};

fn question(id: u32, correct: &str) -> serde_json::Value {
    json!({
        "id": id,
        "question": format!("Question {}", id),
        "options": [
            {"id": "A", "text": "Option A"},
            {"id": "B", "text": "Option B"},
            {"id": "C", "text": "Option C"},
            {"id": "D", "text": "Option D"}
        ],
        "correctAnswer": correct,
        "explanation": "Because."
    })
}

fn app() -> axum::Router {
    create_test_app(
        Arc::new(StaticContentProvider),
        Arc::new(ScriptedGenerator::new(THREE_QUESTION_PAYLOAD)),
    )
}

#[tokio::test]
async fn perfect_attempt_recommends_stepping_up() {
    let (status, body) = post_json(
        &app(),
        "/api/v1/quiz/grade",
        json!({
            "questions": [question(1, "A"), question(2, "B"), question(3, "C")],
            "answers": {"1": "A", "2": "B", "3": "C"},
            "difficulty": "medium",
            "attemptNumber": 0
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["score"], 3);
    assert_eq!(body["total"], 3);
    assert_eq!(body["percentage"], 100);
    assert_eq!(body["nextDifficulty"], "hard");
}

#[tokio::test]
async fn weak_attempt_recommends_stepping_down() {
    let (_, body) = post_json(
        &app(),
        "/api/v1/quiz/grade",
        json!({
            "questions": [question(1, "A"), question(2, "B"), question(3, "C")],
            "answers": {"1": "A", "2": "D", "3": "D"},
            "difficulty": "medium",
            "attemptNumber": 1
        }),
    )
    .await;

    assert_eq!(body["score"], 1);
    assert_eq!(body["percentage"], 33);
    assert_eq!(body["nextDifficulty"], "easy");
}

#[tokio::test]
async fn middle_band_keeps_the_difficulty() {
    let (_, body) = post_json(
        &app(),
        "/api/v1/quiz/grade",
        json!({
            "questions": [question(1, "A"), question(2, "B"), question(3, "C")],
            "answers": {"1": "A", "2": "B", "3": "D"},
            "difficulty": "medium",
            "attemptNumber": 0
        }),
    )
    .await;

    assert_eq!(body["percentage"], 67);
    assert_eq!(body["nextDifficulty"], "medium");
}

#[tokio::test]
async fn missing_answers_count_as_wrong() {
    let (_, body) = post_json(
        &app(),
        "/api/v1/quiz/grade",
        json!({
            "questions": [question(1, "A"), question(2, "B")],
            "answers": {"1": "A"},
            "difficulty": "hard",
            "attemptNumber": 0
        }),
    )
    .await;

    assert_eq!(body["score"], 1);
    assert_eq!(body["total"], 2);
    assert_eq!(body["percentage"], 50);
}

#[tokio::test]
async fn empty_question_set_is_rejected() {
    let (status, body) = post_json(
        &app(),
        "/api/v1/quiz/grade",
        json!({
            "questions": [],
            "answers": {},
            "difficulty": "easy",
            "attemptNumber": 0
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}
