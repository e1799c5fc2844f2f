use axum::extract::{Multipart, Path, State};
use axum::{Json, http::StatusCode};
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::assignments::model::{
    Assignment, AssignmentSubmission, CreateAssignmentDto, PostFeedbackDto, UpdateAssignmentDto,
};
use crate::modules::assignments::service::AssignmentService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::file_storage::{LocalFileStorage, PDF_MIME_TYPES};
use crate::validator::ValidatedJson;

/// Create an assignment for a lesson and batch
#[utoipa::path(
    post,
    path = "/api/assignments",
    request_body = CreateAssignmentDto,
    responses(
        (status = 201, description = "Assignment created", body = Assignment),
        (status = 404, description = "Broken containment chain", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Assignments"
)]
#[instrument(skip(state, dto))]
pub async fn create_assignment(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateAssignmentDto>,
) -> Result<(StatusCode, Json<Assignment>), AppError> {
    let assignment = AssignmentService::create_assignment(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

/// Update an assignment
#[utoipa::path(
    put,
    path = "/api/assignments/{assignment_id}",
    params(("assignment_id" = i32, Path, description = "Assignment id")),
    request_body = UpdateAssignmentDto,
    responses(
        (status = 200, description = "Assignment updated", body = Assignment),
        (status = 404, description = "Assignment not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Assignments"
)]
#[instrument(skip(state, dto))]
pub async fn update_assignment(
    State(state): State<AppState>,
    Path(assignment_id): Path<i32>,
    ValidatedJson(dto): ValidatedJson<UpdateAssignmentDto>,
) -> Result<Json<Assignment>, AppError> {
    let assignment = AssignmentService::update_assignment(&state.db, assignment_id, dto).await?;
    Ok(Json(assignment))
}

/// Delete an assignment
#[utoipa::path(
    delete,
    path = "/api/assignments/{assignment_id}",
    params(("assignment_id" = i32, Path, description = "Assignment id")),
    responses(
        (status = 200, description = "Assignment deleted"),
        (status = 404, description = "Assignment not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Assignments"
)]
#[instrument(skip(state))]
pub async fn delete_assignment(
    State(state): State<AppState>,
    Path(assignment_id): Path<i32>,
) -> Result<Json<serde_json::Value>, AppError> {
    AssignmentService::delete_assignment(&state.db, assignment_id).await?;
    Ok(Json(
        serde_json::json!({ "message": "Assignment deleted successfully" }),
    ))
}

/// Submit an assignment (student; optional text content and/or PDF file)
#[utoipa::path(
    post,
    path = "/api/assignments/{assignment_id}/submissions/{student_id}",
    params(
        ("assignment_id" = i32, Path, description = "Assignment id"),
        ("student_id" = i32, Path, description = "Student id; must match the token subject"),
    ),
    responses(
        (status = 201, description = "Submission recorded", body = AssignmentSubmission),
        (status = 403, description = "Identity mismatch or lesson not completed", body = ErrorResponse),
        (status = 404, description = "Assignment not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Assignments"
)]
#[instrument(skip(state, auth_user, multipart))]
pub async fn submit_assignment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((assignment_id, student_id)): Path<(i32, i32)>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<AssignmentSubmission>), AppError> {
    // the URL-embedded student must be the caller
    if auth_user.user_id()? != student_id {
        return Err(AppError::forbidden(anyhow::anyhow!("Unauthorized user")));
    }

    let storage = LocalFileStorage::new(&state.upload_config);
    let mut content: Option<String> = None;
    let mut file_path: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(anyhow::anyhow!("Invalid multipart body: {}", e)))?
    {
        match field.name() {
            Some("content") => {
                let text = field.text().await.map_err(|e| {
                    AppError::bad_request(anyhow::anyhow!("Failed to read content field: {}", e))
                })?;
                if !text.is_empty() {
                    content = Some(text);
                }
            }
            Some("file") => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                LocalFileStorage::validate_mime(&content_type, PDF_MIME_TYPES)
                    .map_err(|e| AppError::bad_request(anyhow::anyhow!("{}", e)))?;

                let file_name = field.file_name().unwrap_or("submission.pdf").to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    AppError::bad_request(anyhow::anyhow!("Failed to read upload: {}", e))
                })?;

                let key = format!(
                    "submissions/{}",
                    LocalFileStorage::timestamped_key(&file_name)
                );
                let key = storage
                    .save(&key, &bytes)
                    .await
                    .map_err(|e| AppError::bad_request(anyhow::anyhow!("{}", e)))?;
                file_path = Some(key);
            }
            _ => {}
        }
    }

    let submission = AssignmentService::submit_assignment(
        &state.db,
        assignment_id,
        student_id,
        content,
        file_path,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(submission)))
}

/// Attach grading feedback to a submission
#[utoipa::path(
    post,
    path = "/api/assignments/submissions/{submission_id}/feedback",
    params(("submission_id" = i32, Path, description = "Submission id")),
    request_body = PostFeedbackDto,
    responses(
        (status = 200, description = "Feedback recorded", body = AssignmentSubmission),
        (status = 404, description = "Submission not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Assignments"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn post_submission_feedback(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(submission_id): Path<i32>,
    ValidatedJson(dto): ValidatedJson<PostFeedbackDto>,
) -> Result<Json<AssignmentSubmission>, AppError> {
    let submission =
        AssignmentService::post_feedback(&state.db, submission_id, auth_user.0.sub, dto).await?;
    Ok(Json(submission))
}

/// Read a submission's feedback (students only see their own)
#[utoipa::path(
    get,
    path = "/api/assignments/submissions/{submission_id}/feedback",
    params(("submission_id" = i32, Path, description = "Submission id")),
    responses(
        (status = 200, description = "Submission with feedback", body = AssignmentSubmission),
        (status = 403, description = "Not the submitting student", body = ErrorResponse),
        (status = 404, description = "Submission not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Assignments"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_submission_feedback(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(submission_id): Path<i32>,
) -> Result<Json<AssignmentSubmission>, AppError> {
    let submission = AssignmentService::get_feedback(
        &state.db,
        submission_id,
        auth_user.role()?,
        auth_user.0.sub,
    )
    .await?;
    Ok(Json(submission))
}
