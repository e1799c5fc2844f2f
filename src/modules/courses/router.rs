use axum::{
    Router,
    routing::{delete, get},
};

use crate::modules::courses::controller::{
    create_course, delete_course, list_courses, update_course,
};
use crate::state::AppState;

pub fn init_courses_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_courses).post(create_course).put(update_course))
        .route("/{course_id}", delete(delete_course))
}
