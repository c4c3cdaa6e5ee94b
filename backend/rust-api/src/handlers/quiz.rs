use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::{
    extractors::AppJson,
    models::quiz::{GenerateQuizRequest, GradeQuizRequest},
    services::{
        grade_service,
        quiz_service::{QuizError, QuizService},
        AppState,
    },
};

pub async fn generate_quiz(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<GenerateQuizRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    tracing::info!(
        "Generating quiz: difficulty={}, count={}, attempt={}",
        req.difficulty.as_str(),
        req.question_count,
        req.attempt_number
    );

    let service = QuizService::new(&state);

    match service.generate(req).await {
        Ok(response) => Ok((StatusCode::OK, Json(response))),
        Err(QuizError::Validation(errors)) => {
            tracing::warn!("Quiz request rejected: {}", errors);
            Err((
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "success": false,
                    "error": "Validation failed",
                    "details": errors,
                })),
            ))
        }
        Err(QuizError::TutorialNotFound(id)) => Err((
            StatusCode::NOT_FOUND,
            Json(json!({
                "success": false,
                "error": format!("Tutorial {} not found", id),
            })),
        )),
    }
}

pub async fn grade_quiz(
    AppJson(req): AppJson<GradeQuizRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    if let Err(errors) = req.validate() {
        tracing::warn!("Grade request rejected: {}", errors);
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "error": "Validation failed",
                "details": errors,
            })),
        ));
    }

    tracing::info!(
        "Grading attempt {}: {} questions",
        req.attempt_number,
        req.questions.len()
    );

    Ok((StatusCode::OK, Json(grade_service::grade(&req))))
}
