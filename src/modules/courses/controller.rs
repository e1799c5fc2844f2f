use axum::extract::{Path, State};
use axum::{Json, http::StatusCode};
use tracing::instrument;

use crate::modules::auth::controller::ErrorResponse;
use crate::modules::courses::model::{Course, CreateCourseDto, UpdateCourseDto};
use crate::modules::courses::service::CourseService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

/// Create a course
#[utoipa::path(
    post,
    path = "/api/courses",
    request_body = CreateCourseDto,
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 403, description = "Role not permitted", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, dto))]
pub async fn create_course(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateCourseDto>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    let course = CourseService::create_course(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

/// Update a course (id in the body)
#[utoipa::path(
    put,
    path = "/api/courses",
    request_body = UpdateCourseDto,
    responses(
        (status = 200, description = "Course updated", body = Course),
        (status = 404, description = "Course not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, dto))]
pub async fn update_course(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<UpdateCourseDto>,
) -> Result<Json<Course>, AppError> {
    let course = CourseService::update_course(&state.db, dto).await?;
    Ok(Json(course))
}

/// Delete a course
#[utoipa::path(
    delete,
    path = "/api/courses/{course_id}",
    params(("course_id" = i32, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course deleted"),
        (status = 404, description = "Course not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state))]
pub async fn delete_course(
    State(state): State<AppState>,
    Path(course_id): Path<i32>,
) -> Result<Json<serde_json::Value>, AppError> {
    CourseService::delete_course(&state.db, course_id).await?;
    Ok(Json(
        serde_json::json!({ "message": "Course deleted successfully" }),
    ))
}

/// List all courses
#[utoipa::path(
    get,
    path = "/api/courses",
    responses(
        (status = 200, description = "Courses", body = Vec<Course>),
        (status = 404, description = "No courses found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state))]
pub async fn list_courses(
    State(state): State<AppState>,
) -> Result<Json<Vec<Course>>, AppError> {
    let courses = CourseService::list_courses(&state.db).await?;
    Ok(Json(courses))
}
