use axum::{
    Router,
    routing::{get, post},
};

use crate::modules::notifications::controller::{list_notifications, mark_notification_read};
use crate::state::AppState;

pub fn init_notifications_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/{notification_id}/read", post(mark_notification_read))
}
