use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct CourseModule {
    pub id: i32,
    pub course_id: i32,
    pub title: String,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateModuleDto {
    pub course_id: i32,
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// Updates carry both ids in the body; the pair is re-validated before any
/// write.
#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct UpdateModuleDto {
    pub course_id: i32,
    pub module_id: i32,
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    pub content: Option<String>,
}
