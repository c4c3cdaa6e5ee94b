use chrono::Utc;

use crate::metrics::QUIZZES_GRADED_TOTAL;
use crate::models::quiz::{GradeQuizRequest, GradeQuizResponse};
use crate::services::difficulty::adapt;

/// Grades one attempt and recommends the next difficulty through the same
/// adaptation rule the orchestrator uses. Stateless: attempt history stays
/// with the client.
pub fn grade(request: &GradeQuizRequest) -> GradeQuizResponse {
    let total = request.questions.len() as u32;

    let score = request
        .questions
        .iter()
        .filter(|question| {
            request
                .answers
                .get(&question.id)
                .map(|answer| answer.trim().eq_ignore_ascii_case(&question.correct_answer))
                .unwrap_or(false)
        })
        .count() as u32;

    let percentage = if total == 0 {
        0
    } else {
        ((score as f64 / total as f64) * 100.0).round() as u8
    };

    // The grade belongs to the attempt that was just answered; the next
    // attempt is the one the difficulty recommendation is for.
    let next_difficulty = adapt(
        request.difficulty,
        Some(percentage),
        request.attempt_number + 1,
    );

    QUIZZES_GRADED_TOTAL
        .with_label_values(&[next_difficulty.as_str()])
        .inc();

    GradeQuizResponse {
        success: true,
        score,
        total,
        percentage,
        next_difficulty,
        graded_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quiz::{Question, QuestionOption, OPTION_IDS};
    use crate::models::Difficulty;
    use std::collections::HashMap;

    fn question(id: u32, correct: &str) -> Question {
        Question {
            id,
            question: format!("Question {}", id),
            options: OPTION_IDS
                .iter()
                .map(|option_id| QuestionOption {
                    id: option_id.to_string(),
                    text: format!("Option {}", option_id),
                })
                .collect(),
            correct_answer: correct.to_string(),
            explanation: "Because.".to_string(),
        }
    }

    fn request(answers: &[(u32, &str)]) -> GradeQuizRequest {
        GradeQuizRequest {
            questions: vec![question(1, "A"), question(2, "B"), question(3, "C")],
            answers: answers
                .iter()
                .map(|(id, answer)| (*id, answer.to_string()))
                .collect::<HashMap<_, _>>(),
            difficulty: Difficulty::Medium,
            attempt_number: 0,
        }
    }

    #[test]
    fn perfect_score_steps_difficulty_up() {
        let graded = grade(&request(&[(1, "A"), (2, "B"), (3, "C")]));
        assert_eq!(graded.score, 3);
        assert_eq!(graded.total, 3);
        assert_eq!(graded.percentage, 100);
        assert_eq!(graded.next_difficulty, Difficulty::Hard);
    }

    #[test]
    fn weak_score_steps_difficulty_down() {
        let graded = grade(&request(&[(1, "A"), (2, "D"), (3, "D")]));
        assert_eq!(graded.score, 1);
        assert_eq!(graded.percentage, 33);
        assert_eq!(graded.next_difficulty, Difficulty::Easy);
    }

    #[test]
    fn middle_score_keeps_difficulty() {
        let graded = grade(&request(&[(1, "A"), (2, "B"), (3, "D")]));
        assert_eq!(graded.percentage, 67);
        assert_eq!(graded.next_difficulty, Difficulty::Medium);
    }

    #[test]
    fn unanswered_questions_count_as_wrong() {
        let graded = grade(&request(&[(1, "A")]));
        assert_eq!(graded.score, 1);
        assert_eq!(graded.total, 3);
    }

    #[test]
    fn answers_match_case_insensitively() {
        let graded = grade(&request(&[(1, "a"), (2, "b"), (3, "c")]));
        assert_eq!(graded.score, 3);
    }
}
