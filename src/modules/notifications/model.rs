use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct Notification {
    pub id: i32,
    pub user_id: i32,
    pub batch_id: i32,
    pub message: String,
    pub live_start_time: chrono::DateTime<chrono::Utc>,
    pub is_read: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
