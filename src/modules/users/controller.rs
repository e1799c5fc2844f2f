use axum::extract::{Multipart, Path, State};
use axum::{Json, http::StatusCode};
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::users::model::{
    ApproveUserDto, BulkImportResponse, CreateUserDto, UpdateUserDto, User,
};
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::file_storage::{LocalFileStorage, SPREADSHEET_MIME_TYPES};
use crate::utils::spreadsheet::parse_user_rows;
use crate::validator::ValidatedJson;

/// List users for the dashboard (scoped by the caller's role)
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "List of users", body = Vec<User>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Role not permitted", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, auth_user))]
pub async fn list_users(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<User>>, AppError> {
    let users = UserService::list_users(&state.db, auth_user.role()?).await?;
    Ok(Json(users))
}

/// Approve a user into a role
#[utoipa::path(
    post,
    path = "/api/users/approve",
    request_body = ApproveUserDto,
    responses(
        (status = 200, description = "User approved", body = User),
        (status = 400, description = "Invalid role", body = ErrorResponse),
        (status = 403, description = "Approver lacks capability for the role", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, auth_user))]
pub async fn approve_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(dto): Json<ApproveUserDto>,
) -> Result<Json<User>, AppError> {
    let user = UserService::approve_user(&state.db, auth_user.role()?, dto).await?;
    Ok(Json(user))
}

/// Create a user (optionally pre-approved)
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Duplicate email or bad input", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, dto))]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateUserDto>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = UserService::create_user(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Update a user
#[utoipa::path(
    put,
    path = "/api/users/{user_id}",
    params(("user_id" = i32, Path, description = "User id")),
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 404, description = "User not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, dto))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
    ValidatedJson(dto): ValidatedJson<UpdateUserDto>,
) -> Result<Json<User>, AppError> {
    let user = UserService::update_user(&state.db, user_id, dto).await?;
    Ok(Json(user))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/api/users/{user_id}",
    params(("user_id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 404, description = "User not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<Json<serde_json::Value>, AppError> {
    UserService::delete_user(&state.db, user_id).await?;
    Ok(Json(
        serde_json::json!({ "message": "User deleted successfully" }),
    ))
}

/// Bulk-register users from an uploaded spreadsheet
#[utoipa::path(
    post,
    path = "/api/users/bulk-import",
    responses(
        (status = 200, description = "Per-row import results", body = BulkImportResponse),
        (status = 400, description = "Missing file or unreadable spreadsheet", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, multipart))]
pub async fn bulk_import_users(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<BulkImportResponse>, AppError> {
    let mut file_bytes: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(anyhow::anyhow!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        LocalFileStorage::validate_mime(&content_type, SPREADSHEET_MIME_TYPES)
            .map_err(|e| AppError::bad_request(anyhow::anyhow!("{}", e)))?;

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::bad_request(anyhow::anyhow!("Failed to read upload: {}", e)))?;
        file_bytes = Some(bytes.to_vec());
    }

    let file_bytes =
        file_bytes.ok_or_else(|| AppError::bad_request(anyhow::anyhow!("No file uploaded")))?;

    let rows = parse_user_rows(&file_bytes)?;
    let results = UserService::bulk_import(&state.db, rows).await;

    Ok(Json(BulkImportResponse {
        message: "Bulk user registration completed".to_string(),
        results,
    }))
}
