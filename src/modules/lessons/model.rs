//! Lesson entities and the moderation workflow.
//!
//! Teacher-authored lessons enter the `pending` state and only become
//! visible to students once a staff member approves them. Staff-authored
//! lessons are approved implicitly on create.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Moderation state, stored as the `lesson_status` Postgres enum.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "lesson_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LessonStatus {
    Pending,
    Approved,
    Rejected,
}

impl LessonStatus {
    /// The only legal review transitions are `pending -> approved` and
    /// `pending -> rejected`.
    pub fn review(self, approve: bool) -> Result<LessonStatus, &'static str> {
        match self {
            LessonStatus::Pending => Ok(if approve {
                LessonStatus::Approved
            } else {
                LessonStatus::Rejected
            }),
            _ => Err("This lesson request is not in a pending state"),
        }
    }
}

impl std::fmt::Display for LessonStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LessonStatus::Pending => "pending",
            LessonStatus::Approved => "approved",
            LessonStatus::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Lesson {
    pub id: i32,
    pub module_id: i32,
    pub course_id: i32,
    pub title: String,
    pub content: String,
    pub video_link: Option<String>,
    pub file_path: Option<String>,
    pub status: LessonStatus,
    pub created_by: Option<i32>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateLessonDto {
    pub course_id: i32,
    pub module_id: i32,
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
    pub video_link: Option<String>,
}

/// Updates carry the full containment chain in the body.
#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct UpdateLessonDto {
    pub course_id: i32,
    pub module_id: i32,
    pub lesson_id: i32,
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "content must not be empty"))]
    pub content: Option<String>,
    pub video_link: Option<String>,
}

/// Marks a lesson complete for the calling student; the single gate that
/// unlocks quiz viewing/answering and assignment submission.
#[derive(Deserialize, Debug, Clone, ToSchema)]
pub struct CompleteLessonDto {
    pub lesson_id: i32,
    pub course_id: Option<i32>,
    pub module_id: Option<i32>,
}

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct LessonFeedback {
    pub id: i32,
    pub lesson_id: i32,
    pub student_id: i32,
    pub feedback: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct SubmitFeedbackDto {
    pub lesson_id: i32,
    #[validate(length(min = 1, message = "feedback is required"))]
    pub feedback: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_reviews_to_approved_or_rejected() {
        assert_eq!(
            LessonStatus::Pending.review(true),
            Ok(LessonStatus::Approved)
        );
        assert_eq!(
            LessonStatus::Pending.review(false),
            Ok(LessonStatus::Rejected)
        );
    }

    #[test]
    fn test_non_pending_states_cannot_be_reviewed() {
        assert!(LessonStatus::Approved.review(true).is_err());
        assert!(LessonStatus::Approved.review(false).is_err());
        assert!(LessonStatus::Rejected.review(true).is_err());
        assert!(LessonStatus::Rejected.review(false).is_err());
    }

    #[test]
    fn test_status_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&LessonStatus::Pending).unwrap(),
            "\"pending\""
        );
        let parsed: LessonStatus = serde_json::from_str("\"rejected\"").unwrap();
        assert_eq!(parsed, LessonStatus::Rejected);
    }
}
