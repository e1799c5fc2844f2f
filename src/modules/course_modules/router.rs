use axum::{
    Router,
    middleware,
    routing::{delete, get, post},
};

use crate::middleware::role::{require_staff, require_student};
use crate::modules::course_modules::controller::{
    create_module, delete_module, list_modules_for_student, list_modules_in_course, update_module,
};
use crate::state::AppState;

pub fn init_modules_router(state: AppState) -> Router<AppState> {
    let staff_routes = Router::new()
        .route("/", post(create_module).put(update_module))
        .route("/{course_id}/{module_id}", delete(delete_module))
        .route("/course/{course_id}", get(list_modules_in_course))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_staff));

    let student_routes = Router::new()
        .route("/student/{course_id}", get(list_modules_for_student))
        .route_layer(middleware::from_fn_with_state(state, require_student));

    staff_routes.merge(student_routes)
}
