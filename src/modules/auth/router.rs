use axum::{Router, routing::post};

use crate::modules::auth::controller::{
    forgot_password, login_user, logout_user, register_user, reset_password, superadmin_login,
};
use crate::state::AppState;

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register_user))
        .route("/login", post(login_user))
        .route("/superadmin/login", post(superadmin_login))
        .route("/logout", post(logout_user))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
}
