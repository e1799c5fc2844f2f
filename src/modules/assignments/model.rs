use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, ToSchema)]
pub struct Assignment {
    pub id: i32,
    pub course_id: i32,
    pub module_id: i32,
    pub lesson_id: i32,
    pub batch_id: i32,
    pub title: String,
    pub description: String,
    pub due_date: chrono::DateTime<chrono::Utc>,
    pub submission_link: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateAssignmentDto {
    pub course_id: i32,
    pub module_id: i32,
    pub lesson_id: i32,
    pub batch_id: i32,
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    pub due_date: chrono::DateTime<chrono::Utc>,
    #[validate(length(min = 1, message = "A valid submission link is required"))]
    pub submission_link: String,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct UpdateAssignmentDto {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "description must not be empty"))]
    pub description: Option<String>,
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,
    #[validate(length(min = 1, message = "submission link must not be empty"))]
    pub submission_link: Option<String>,
}

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, ToSchema)]
pub struct AssignmentSubmission {
    pub id: i32,
    pub assignment_id: i32,
    pub student_id: i32,
    pub content: Option<String>,
    pub file_path: Option<String>,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    pub feedback: Option<String>,
    pub feedback_by: Option<i32>,
    pub feedback_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct PostFeedbackDto {
    #[validate(length(min = 1, message = "feedback is required"))]
    pub feedback: String,
}
