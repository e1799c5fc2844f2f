use axum::Json;
use axum::extract::{Path, State};
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::notifications::model::Notification;
use crate::modules::notifications::service::NotificationService;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Unread notifications for the current user, newest first
#[utoipa::path(
    get,
    path = "/api/notifications",
    responses(
        (status = 200, description = "Unread notifications", body = Vec<Notification>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
#[instrument(skip(state, auth_user))]
pub async fn list_notifications(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<Notification>>, AppError> {
    let user_id = auth_user.user_id()?;
    let notifications = NotificationService::list_unread(&state.db, user_id).await?;
    Ok(Json(notifications))
}

/// Mark a notification as read
#[utoipa::path(
    post,
    path = "/api/notifications/{notification_id}/read",
    params(("notification_id" = i32, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Notification marked read", body = Notification),
        (status = 404, description = "Notification not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
#[instrument(skip(state, auth_user))]
pub async fn mark_notification_read(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(notification_id): Path<i32>,
) -> Result<Json<Notification>, AppError> {
    let user_id = auth_user.user_id()?;
    let notification =
        NotificationService::mark_read(&state.db, user_id, notification_id).await?;
    Ok(Json(notification))
}
