use axum::{
    Router,
    routing::{get, post, put},
};

use crate::modules::users::controller::{
    approve_user, bulk_import_users, create_user, delete_user, list_users, update_user,
};
use crate::state::AppState;

pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/approve", post(approve_user))
        .route("/bulk-import", post(bulk_import_users))
        .route("/{user_id}", put(update_user).delete(delete_user))
}
