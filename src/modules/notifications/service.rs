use sqlx::PgPool;
use tracing::instrument;

use crate::modules::notifications::model::Notification;
use crate::utils::errors::AppError;

const NOTIFICATION_COLUMNS: &str =
    "id, user_id, batch_id, message, live_start_time, is_read, created_at";

pub struct NotificationService;

impl NotificationService {
    #[instrument(skip(db))]
    pub async fn list_unread(db: &PgPool, user_id: i32) -> Result<Vec<Notification>, AppError> {
        let notifications = sqlx::query_as::<_, Notification>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications
             WHERE user_id = $1 AND NOT is_read
             ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(db)
        .await
        .map_err(AppError::database)?;

        Ok(notifications)
    }

    /// Mark one of the caller's notifications read. Rows belonging to other
    /// users are invisible here.
    #[instrument(skip(db))]
    pub async fn mark_read(
        db: &PgPool,
        user_id: i32,
        notification_id: i32,
    ) -> Result<Notification, AppError> {
        sqlx::query_as::<_, Notification>(&format!(
            "UPDATE notifications SET is_read = TRUE
             WHERE id = $1 AND user_id = $2
             RETURNING {NOTIFICATION_COLUMNS}"
        ))
        .bind(notification_id)
        .bind(user_id)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Notification not found")))
    }
}
