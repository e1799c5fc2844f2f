use axum::extract::{Path, State};
use axum::{Json, http::StatusCode};
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::{STAFF, check_any_role};
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::batches::model::{
    AssignUserDto, Batch, CreateBatchDto, LiveSessionResponse, PostLiveLinkDto, StudentCourse,
    TeacherRosterEntry, UpdateBatchDto,
};
use crate::modules::batches::service::BatchService;
use crate::modules::users::model::Role;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

/// Create a batch under a course
#[utoipa::path(
    post,
    path = "/api/batches",
    request_body = CreateBatchDto,
    responses(
        (status = 201, description = "Batch created", body = Batch),
        (status = 400, description = "Invalid dates", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Batches"
)]
#[instrument(skip(state, dto))]
pub async fn create_batch(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateBatchDto>,
) -> Result<(StatusCode, Json<Batch>), AppError> {
    let batch = BatchService::create_batch(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(batch)))
}

/// Update a batch (id in the body)
#[utoipa::path(
    put,
    path = "/api/batches",
    request_body = UpdateBatchDto,
    responses(
        (status = 200, description = "Batch updated", body = Batch),
        (status = 404, description = "Batch or course not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Batches"
)]
#[instrument(skip(state, dto))]
pub async fn update_batch(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<UpdateBatchDto>,
) -> Result<Json<Batch>, AppError> {
    let batch = BatchService::update_batch(&state.db, dto).await?;
    Ok(Json(batch))
}

/// Delete a batch within its course
#[utoipa::path(
    delete,
    path = "/api/batches/{course_id}/{batch_id}",
    params(
        ("course_id" = i32, Path, description = "Course id"),
        ("batch_id" = i32, Path, description = "Batch id"),
    ),
    responses(
        (status = 200, description = "Batch deleted"),
        (status = 404, description = "Batch not found in the course", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Batches"
)]
#[instrument(skip(state))]
pub async fn delete_batch(
    State(state): State<AppState>,
    Path((course_id, batch_id)): Path<(i32, i32)>,
) -> Result<Json<serde_json::Value>, AppError> {
    BatchService::delete_batch(&state.db, course_id, batch_id).await?;
    Ok(Json(
        serde_json::json!({ "message": "Batch deleted successfully" }),
    ))
}

/// Assign a student or teacher to a batch
#[utoipa::path(
    post,
    path = "/api/batches/assign",
    request_body = AssignUserDto,
    responses(
        (status = 200, description = "User assigned"),
        (status = 400, description = "User role not enrollable", body = ErrorResponse),
        (status = 404, description = "Course, batch or user not found", body = ErrorResponse),
        (status = 409, description = "Duplicate enrollment", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Batches"
)]
#[instrument(skip(state))]
pub async fn assign_user_to_batch(
    State(state): State<AppState>,
    Json(dto): Json<AssignUserDto>,
) -> Result<Json<serde_json::Value>, AppError> {
    let role = BatchService::assign_user_to_batch(&state.db, dto).await?;
    Ok(Json(serde_json::json!({
        "message": format!("{} assigned to batch successfully", capitalize(role))
    })))
}

/// Remove a student or teacher from a batch
#[utoipa::path(
    delete,
    path = "/api/batches/unassign",
    request_body = AssignUserDto,
    responses(
        (status = 200, description = "User removed"),
        (status = 400, description = "User not assigned to the batch", body = ErrorResponse),
        (status = 404, description = "Course, batch or user not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Batches"
)]
#[instrument(skip(state))]
pub async fn remove_user_from_batch(
    State(state): State<AppState>,
    Json(dto): Json<AssignUserDto>,
) -> Result<Json<serde_json::Value>, AppError> {
    let role = BatchService::remove_user_from_batch(&state.db, dto).await?;
    Ok(Json(serde_json::json!({
        "message": format!("{} removed from batch successfully", capitalize(role))
    })))
}

/// Post a live-session link for a batch (notifies enrolled students)
#[utoipa::path(
    post,
    path = "/api/batches/{course_id}/{batch_id}/live-link",
    params(
        ("course_id" = i32, Path, description = "Course id"),
        ("batch_id" = i32, Path, description = "Batch id"),
    ),
    request_body = PostLiveLinkDto,
    responses(
        (status = 200, description = "Live link posted", body = Batch),
        (status = 404, description = "Batch not found in the course", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Batches"
)]
#[instrument(skip(state, dto))]
pub async fn post_live_link(
    State(state): State<AppState>,
    Path((course_id, batch_id)): Path<(i32, i32)>,
    ValidatedJson(dto): ValidatedJson<PostLiveLinkDto>,
) -> Result<Json<Batch>, AppError> {
    let batch = BatchService::post_live_link(&state.db, course_id, batch_id, dto).await?;
    Ok(Json(batch))
}

/// Fetch the live-session details for a batch
#[utoipa::path(
    get,
    path = "/api/batches/live-link/{course_id}/{batch_id}",
    params(
        ("course_id" = i32, Path, description = "Course id"),
        ("batch_id" = i32, Path, description = "Batch id"),
    ),
    responses(
        (status = 200, description = "Live session details", body = LiveSessionResponse),
        (status = 404, description = "No live session scheduled", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Batches"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_live_link(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((course_id, batch_id)): Path<(i32, i32)>,
) -> Result<Json<LiveSessionResponse>, AppError> {
    let user_id = auth_user.user_id()?;
    let response = BatchService::get_live_link(&state.db, user_id, course_id, batch_id).await?;
    Ok(Json(response))
}

/// A teacher's batches with courses and enrolled students
#[utoipa::path(
    get,
    path = "/api/batches/teacher/roster",
    responses(
        (status = 200, description = "Roster", body = Vec<TeacherRosterEntry>),
    ),
    security(("bearer_auth" = [])),
    tag = "Batches"
)]
#[instrument(skip(state, auth_user))]
pub async fn teacher_roster(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<TeacherRosterEntry>>, AppError> {
    let teacher_id = auth_user.user_id()?;
    let roster = BatchService::teacher_roster(&state.db, teacher_id).await?;
    Ok(Json(roster))
}

/// Courses the calling student is enrolled in
#[utoipa::path(
    get,
    path = "/api/batches/student/courses",
    responses(
        (status = 200, description = "Enrolled courses", body = Vec<StudentCourse>),
    ),
    security(("bearer_auth" = [])),
    tag = "Batches"
)]
#[instrument(skip(state, auth_user))]
pub async fn student_courses(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<StudentCourse>>, AppError> {
    let student_id = auth_user.user_id()?;
    let courses = BatchService::student_courses(&state.db, student_id).await?;
    Ok(Json(courses))
}

/// Courses assigned to a student (staff, or the student themself)
#[utoipa::path(
    get,
    path = "/api/batches/student/{student_id}/courses",
    params(("student_id" = i32, Path, description = "Student id")),
    responses(
        (status = 200, description = "Assigned courses", body = Vec<StudentCourse>),
        (status = 403, description = "Not the student and not staff", body = ErrorResponse),
        (status = 404, description = "No courses found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Batches"
)]
#[instrument(skip(state, auth_user))]
pub async fn assigned_courses(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(student_id): Path<i32>,
) -> Result<Json<Vec<StudentCourse>>, AppError> {
    // staff may look up anyone; a student only themself
    if check_any_role(&auth_user, STAFF).is_err() && auth_user.0.sub != Some(student_id) {
        return Err(AppError::forbidden(anyhow::anyhow!("Access denied")));
    }

    let courses = BatchService::assigned_courses(&state.db, student_id).await?;
    Ok(Json(courses))
}

fn capitalize(role: Role) -> String {
    let s = role.as_str();
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
