use axum::extract::{Multipart, Path, State};
use axum::{Json, http::StatusCode};
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::{STUDENT_ONLY, check_any_role};
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::lessons::model::{
    CompleteLessonDto, CreateLessonDto, Lesson, LessonFeedback, SubmitFeedbackDto, UpdateLessonDto,
};
use crate::modules::lessons::service::LessonService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::file_storage::{LocalFileStorage, PDF_MIME_TYPES};
use crate::validator::ValidatedJson;

/// Create a lesson (staff; published immediately)
#[utoipa::path(
    post,
    path = "/api/lessons",
    request_body = CreateLessonDto,
    responses(
        (status = 201, description = "Lesson created", body = Lesson),
        (status = 404, description = "Course or module not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Lessons"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_lesson(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateLessonDto>,
) -> Result<(StatusCode, Json<Lesson>), AppError> {
    let lesson = LessonService::create_lesson_staff(&state.db, dto, auth_user.0.sub).await?;
    Ok((StatusCode::CREATED, Json(lesson)))
}

/// Update a lesson (staff; ids in the body)
#[utoipa::path(
    put,
    path = "/api/lessons",
    request_body = UpdateLessonDto,
    responses(
        (status = 200, description = "Lesson updated", body = Lesson),
        (status = 404, description = "Lesson not found or invalid chain", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Lessons"
)]
#[instrument(skip(state, dto))]
pub async fn update_lesson(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<UpdateLessonDto>,
) -> Result<Json<Lesson>, AppError> {
    let lesson = LessonService::update_lesson_staff(&state.db, dto).await?;
    Ok(Json(lesson))
}

/// Delete a lesson (staff)
#[utoipa::path(
    delete,
    path = "/api/lessons/{course_id}/{module_id}/{lesson_id}",
    params(
        ("course_id" = i32, Path, description = "Course id"),
        ("module_id" = i32, Path, description = "Module id"),
        ("lesson_id" = i32, Path, description = "Lesson id"),
    ),
    responses(
        (status = 200, description = "Lesson deleted"),
        (status = 404, description = "Lesson not found or invalid chain", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Lessons"
)]
#[instrument(skip(state))]
pub async fn delete_lesson(
    State(state): State<AppState>,
    Path((course_id, module_id, lesson_id)): Path<(i32, i32, i32)>,
) -> Result<Json<serde_json::Value>, AppError> {
    LessonService::delete_lesson_staff(&state.db, course_id, module_id, lesson_id).await?;
    Ok(Json(
        serde_json::json!({ "message": "Lesson deleted successfully" }),
    ))
}

/// Attach a PDF to a lesson
#[utoipa::path(
    post,
    path = "/api/lessons/{course_id}/{module_id}/{lesson_id}/file",
    params(
        ("course_id" = i32, Path, description = "Course id"),
        ("module_id" = i32, Path, description = "Module id"),
        ("lesson_id" = i32, Path, description = "Lesson id"),
    ),
    responses(
        (status = 200, description = "File uploaded", body = Lesson),
        (status = 400, description = "Missing file or wrong type", body = ErrorResponse),
        (status = 404, description = "Lesson not found or invalid chain", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Lessons"
)]
#[instrument(skip(state, multipart))]
pub async fn upload_lesson_file(
    State(state): State<AppState>,
    Path((course_id, module_id, lesson_id)): Path<(i32, i32, i32)>,
    mut multipart: Multipart,
) -> Result<Json<Lesson>, AppError> {
    let mut stored_key: Option<String> = None;
    let storage = LocalFileStorage::new(&state.upload_config);

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(anyhow::anyhow!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        LocalFileStorage::validate_mime(&content_type, PDF_MIME_TYPES)
            .map_err(|e| AppError::bad_request(anyhow::anyhow!("{}", e)))?;

        let file_name = field.file_name().unwrap_or("lesson.pdf").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::bad_request(anyhow::anyhow!("Failed to read upload: {}", e)))?;

        let key = format!("lessons/{}", LocalFileStorage::timestamped_key(&file_name));
        let key = storage
            .save(&key, &bytes)
            .await
            .map_err(|e| AppError::bad_request(anyhow::anyhow!("{}", e)))?;
        stored_key = Some(key);
    }

    let stored_key =
        stored_key.ok_or_else(|| AppError::bad_request(anyhow::anyhow!("No file uploaded")))?;

    let lesson =
        LessonService::attach_file(&state.db, course_id, module_id, lesson_id, &stored_key).await?;
    Ok(Json(lesson))
}

/// Submit a lesson creation request (teacher; lands in moderation)
#[utoipa::path(
    post,
    path = "/api/lessons/requests",
    request_body = CreateLessonDto,
    responses(
        (status = 201, description = "Lesson request submitted", body = Lesson),
        (status = 404, description = "Course or module not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Lessons"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_lesson_request(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateLessonDto>,
) -> Result<(StatusCode, Json<Lesson>), AppError> {
    let teacher_id = auth_user.user_id()?;
    let lesson = LessonService::create_lesson_teacher(&state.db, dto, teacher_id).await?;
    Ok((StatusCode::CREATED, Json(lesson)))
}

/// Submit a lesson update request (teacher; re-enters moderation)
#[utoipa::path(
    put,
    path = "/api/lessons/requests",
    request_body = UpdateLessonDto,
    responses(
        (status = 200, description = "Lesson update request submitted", body = Lesson),
        (status = 404, description = "Lesson not found or invalid chain", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Lessons"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_lesson_request(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<UpdateLessonDto>,
) -> Result<Json<Lesson>, AppError> {
    let teacher_id = auth_user.user_id()?;
    let lesson = LessonService::update_lesson_teacher(&state.db, dto, teacher_id).await?;
    Ok(Json(lesson))
}

/// Request lesson deletion (teacher; modeled as a drop back to pending)
#[utoipa::path(
    delete,
    path = "/api/lessons/requests/{course_id}/{module_id}/{lesson_id}",
    params(
        ("course_id" = i32, Path, description = "Course id"),
        ("module_id" = i32, Path, description = "Module id"),
        ("lesson_id" = i32, Path, description = "Lesson id"),
    ),
    responses(
        (status = 200, description = "Deletion request submitted", body = Lesson),
        (status = 404, description = "Lesson not found or invalid chain", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Lessons"
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_lesson_request(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((course_id, module_id, lesson_id)): Path<(i32, i32, i32)>,
) -> Result<Json<Lesson>, AppError> {
    let teacher_id = auth_user.user_id()?;
    let lesson = LessonService::request_lesson_deletion(
        &state.db, course_id, module_id, lesson_id, teacher_id,
    )
    .await?;
    Ok(Json(lesson))
}

/// Approve a pending lesson
#[utoipa::path(
    post,
    path = "/api/lessons/approve/{lesson_id}",
    params(("lesson_id" = i32, Path, description = "Lesson id")),
    responses(
        (status = 200, description = "Lesson approved", body = Lesson),
        (status = 400, description = "Lesson is not pending", body = ErrorResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Lessons"
)]
#[instrument(skip(state))]
pub async fn approve_lesson(
    State(state): State<AppState>,
    Path(lesson_id): Path<i32>,
) -> Result<Json<Lesson>, AppError> {
    let lesson = LessonService::review_lesson(&state.db, lesson_id, true).await?;
    Ok(Json(lesson))
}

/// Reject a pending lesson
#[utoipa::path(
    post,
    path = "/api/lessons/reject/{lesson_id}",
    params(("lesson_id" = i32, Path, description = "Lesson id")),
    responses(
        (status = 200, description = "Lesson rejected", body = Lesson),
        (status = 400, description = "Lesson is not pending", body = ErrorResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Lessons"
)]
#[instrument(skip(state))]
pub async fn reject_lesson(
    State(state): State<AppState>,
    Path(lesson_id): Path<i32>,
) -> Result<Json<Lesson>, AppError> {
    let lesson = LessonService::review_lesson(&state.db, lesson_id, false).await?;
    Ok(Json(lesson))
}

/// List pending lesson requests (moderation queue)
#[utoipa::path(
    get,
    path = "/api/lessons/pending",
    responses(
        (status = 200, description = "Pending lessons", body = Vec<Lesson>),
        (status = 404, description = "No pending lessons", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Lessons"
)]
#[instrument(skip(state))]
pub async fn list_pending_lessons(
    State(state): State<AppState>,
) -> Result<Json<Vec<Lesson>>, AppError> {
    let lessons = LessonService::list_pending_lessons(&state.db).await?;
    Ok(Json(lessons))
}

/// List all lessons in a module (staff; any status)
#[utoipa::path(
    get,
    path = "/api/lessons/all/{course_id}/{module_id}",
    params(
        ("course_id" = i32, Path, description = "Course id"),
        ("module_id" = i32, Path, description = "Module id"),
    ),
    responses(
        (status = 200, description = "Lessons", body = Vec<Lesson>),
        (status = 404, description = "No lessons found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Lessons"
)]
#[instrument(skip(state))]
pub async fn list_lessons(
    State(state): State<AppState>,
    Path((course_id, module_id)): Path<(i32, i32)>,
) -> Result<Json<Vec<Lesson>>, AppError> {
    let lessons = LessonService::list_lessons(&state.db, course_id, module_id).await?;
    Ok(Json(lessons))
}

/// List approved lessons in a module (student view)
#[utoipa::path(
    get,
    path = "/api/lessons/student/{course_id}/{module_id}",
    params(
        ("course_id" = i32, Path, description = "Course id"),
        ("module_id" = i32, Path, description = "Module id"),
    ),
    responses(
        (status = 200, description = "Approved lessons", body = Vec<Lesson>),
        (status = 404, description = "No approved lessons found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Lessons"
)]
#[instrument(skip(state))]
pub async fn list_approved_lessons(
    State(state): State<AppState>,
    Path((course_id, module_id)): Path<(i32, i32)>,
) -> Result<Json<Vec<Lesson>>, AppError> {
    let lessons = LessonService::list_approved_lessons(&state.db, course_id, module_id).await?;
    Ok(Json(lessons))
}

/// Mark a lesson complete (idempotent upsert)
#[utoipa::path(
    post,
    path = "/api/lessons/complete",
    request_body = CompleteLessonDto,
    responses(
        (status = 200, description = "Lesson marked as completed"),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Lessons"
)]
#[instrument(skip(state, auth_user))]
pub async fn complete_lesson(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(dto): Json<CompleteLessonDto>,
) -> Result<Json<serde_json::Value>, AppError> {
    let student_id = auth_user.user_id()?;
    LessonService::complete_lesson(&state.db, student_id, dto).await?;
    Ok(Json(
        serde_json::json!({ "message": "Lesson marked as completed" }),
    ))
}

/// Submit feedback about a lesson (student)
#[utoipa::path(
    post,
    path = "/api/lessons/feedback",
    request_body = SubmitFeedbackDto,
    responses(
        (status = 200, description = "Feedback submitted", body = LessonFeedback),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Lessons"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn submit_feedback(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<SubmitFeedbackDto>,
) -> Result<Json<LessonFeedback>, AppError> {
    check_any_role(&auth_user, STUDENT_ONLY)?;
    let student_id = auth_user.user_id()?;
    let feedback = LessonService::submit_feedback(&state.db, student_id, dto).await?;
    Ok(Json(feedback))
}

/// List lesson feedback (visibility depends on the caller's role)
#[utoipa::path(
    get,
    path = "/api/lessons/feedback",
    responses(
        (status = 200, description = "Feedback", body = Vec<LessonFeedback>),
        (status = 403, description = "Role not permitted", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Lessons"
)]
#[instrument(skip(state, auth_user))]
pub async fn list_feedback(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<LessonFeedback>>, AppError> {
    let feedback =
        LessonService::list_feedback(&state.db, auth_user.role()?, auth_user.0.sub).await?;
    Ok(Json(feedback))
}
