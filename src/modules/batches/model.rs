use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, ToSchema)]
pub struct Batch {
    pub id: i32,
    pub course_id: i32,
    pub name: String,
    pub start_date: Option<chrono::DateTime<chrono::Utc>>,
    pub end_date: Option<chrono::DateTime<chrono::Utc>>,
    pub live_link: Option<String>,
    pub live_start_time: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateBatchDto {
    pub course_id: i32,
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: chrono::DateTime<chrono::Utc>,
}

/// Updates carry the batch id in the body.
#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct UpdateBatchDto {
    pub batch_id: i32,
    pub course_id: Option<i32>,
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    pub start_time: Option<chrono::DateTime<chrono::Utc>>,
    pub end_time: Option<chrono::DateTime<chrono::Utc>>,
}

/// Enrollment request; the target user's stored role decides which join
/// table is touched.
#[derive(Deserialize, Debug, Clone, ToSchema)]
pub struct AssignUserDto {
    pub course_id: i32,
    pub batch_id: i32,
    pub user_id: i32,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct PostLiveLinkDto {
    #[validate(length(min = 1, message = "live_link is required"))]
    pub live_link: String,
    pub live_start_time: chrono::DateTime<chrono::Utc>,
}

#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct LiveSessionResponse {
    pub message: String,
    pub live_link: String,
    pub live_start_time: chrono::DateTime<chrono::Utc>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct RosterStudent {
    pub id: i32,
    pub name: String,
    pub email: String,
}

/// One batch a teacher serves, with its course and enrolled students.
#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct TeacherRosterEntry {
    pub course_id: i32,
    pub course_name: String,
    pub course_description: String,
    pub batch_id: i32,
    pub batch_name: String,
    pub students: Vec<RosterStudent>,
}

/// A course a student is enrolled in, through their batch.
#[derive(Serialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct StudentCourse {
    pub course_id: i32,
    pub course_name: String,
    pub course_description: String,
    pub batch_id: i32,
    pub batch_name: String,
}
