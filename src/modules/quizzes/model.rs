//! Quiz, question and answer entities plus the nested composer DTOs.
//!
//! Two read shapes exist: the staff view carries `is_correct` on every
//! answer, the student view never does. The student shape is derived from
//! the staff shape so the two can never drift apart.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Quiz {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub course_id: i32,
    pub module_id: i32,
    pub lesson_id: i32,
    pub batch_id: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Question {
    pub id: i32,
    pub quiz_id: i32,
    pub text: String,
}

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Answer {
    pub id: i32,
    pub question_id: i32,
    pub text: String,
    pub is_correct: bool,
}

#[derive(Deserialize, Debug, Clone, ToSchema)]
pub struct NewAnswerDto {
    pub text: String,
    pub is_correct: bool,
}

#[derive(Deserialize, Debug, Clone, ToSchema)]
pub struct NewQuestionDto {
    pub text: String,
    #[serde(default)]
    pub answers: Vec<NewAnswerDto>,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateQuizDto {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub questions: Vec<NewQuestionDto>,
}

/// Composer entry: an existing question id updates in place (answers, when
/// supplied, are replaced wholesale); a missing id creates a new question.
#[derive(Deserialize, Debug, Clone, ToSchema)]
pub struct QuestionUpsertDto {
    pub id: Option<i32>,
    pub text: Option<String>,
    pub answers: Option<Vec<NewAnswerDto>>,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct UpdateQuizDto {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub questions: Option<Vec<QuestionUpsertDto>>,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateQuestionDto {
    #[validate(length(min = 1, message = "text is required"))]
    pub text: String,
    #[serde(default)]
    pub answers: Vec<NewAnswerDto>,
}

#[derive(Deserialize, Debug, Clone, ToSchema)]
pub struct UpdateQuestionDto {
    pub text: Option<String>,
    pub answers: Option<Vec<NewAnswerDto>>,
}

#[derive(Deserialize, Debug, Clone, ToSchema)]
pub struct SubmitAnswerDto {
    pub selected_answer_id: i32,
}

#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct QuestionWithAnswers {
    pub id: i32,
    pub text: String,
    pub answers: Vec<Answer>,
}

/// Staff view: full quiz with correctness flags.
#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct QuizDetail {
    #[serde(flatten)]
    pub quiz: Quiz,
    pub questions: Vec<QuestionWithAnswers>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct StudentAnswer {
    pub id: i32,
    pub text: String,
}

#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct StudentQuestion {
    pub id: i32,
    pub text: String,
    pub answers: Vec<StudentAnswer>,
}

/// Student view: correctness flags are stripped before serialization.
#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct StudentQuizView {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub lesson_id: i32,
    pub questions: Vec<StudentQuestion>,
}

impl StudentQuizView {
    pub fn from_detail(detail: QuizDetail) -> Self {
        Self {
            id: detail.quiz.id,
            name: detail.quiz.name,
            description: detail.quiz.description,
            lesson_id: detail.quiz.lesson_id,
            questions: detail
                .questions
                .into_iter()
                .map(|q| StudentQuestion {
                    id: q.id,
                    text: q.text,
                    answers: q
                        .answers
                        .into_iter()
                        .map(|a| StudentAnswer {
                            id: a.id,
                            text: a.text,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

#[derive(Serialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct QuizResult {
    pub id: i32,
    pub student_id: i32,
    pub quiz_id: i32,
    pub score: i32,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct AnswerResult {
    pub message: String,
    pub score: i32,
    pub is_correct: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_detail() -> QuizDetail {
        QuizDetail {
            quiz: Quiz {
                id: 1,
                name: "Fractions".to_string(),
                description: Some("Basics".to_string()),
                course_id: 1,
                module_id: 1,
                lesson_id: 7,
                batch_id: 2,
                created_at: chrono::Utc::now(),
                updated_at: chrono::Utc::now(),
            },
            questions: vec![QuestionWithAnswers {
                id: 10,
                text: "1/2 + 1/2 = ?".to_string(),
                answers: vec![
                    Answer {
                        id: 100,
                        question_id: 10,
                        text: "1".to_string(),
                        is_correct: true,
                    },
                    Answer {
                        id: 101,
                        question_id: 10,
                        text: "2".to_string(),
                        is_correct: false,
                    },
                ],
            }],
        }
    }

    #[test]
    fn test_student_view_keeps_structure() {
        let view = StudentQuizView::from_detail(sample_detail());
        assert_eq!(view.id, 1);
        assert_eq!(view.lesson_id, 7);
        assert_eq!(view.questions.len(), 1);
        assert_eq!(view.questions[0].answers.len(), 2);
    }

    #[test]
    fn test_student_view_never_serializes_correctness() {
        let view = StudentQuizView::from_detail(sample_detail());
        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("is_correct"));
        assert!(json.contains("\"answers\""));
    }
}
