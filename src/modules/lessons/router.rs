use axum::{
    Router,
    middleware,
    routing::{delete, get, post},
};

use crate::middleware::role::{require_staff, require_student, require_teacher};
use crate::modules::lessons::controller::{
    approve_lesson, complete_lesson, create_lesson, create_lesson_request, delete_lesson,
    delete_lesson_request, list_approved_lessons, list_feedback, list_lessons,
    list_pending_lessons, reject_lesson, submit_feedback, update_lesson, update_lesson_request,
    upload_lesson_file,
};
use crate::state::AppState;

pub fn init_lessons_router(state: AppState) -> Router<AppState> {
    let staff_routes = Router::new()
        .route("/", post(create_lesson).put(update_lesson))
        .route("/{course_id}/{module_id}/{lesson_id}", delete(delete_lesson))
        .route(
            "/{course_id}/{module_id}/{lesson_id}/file",
            post(upload_lesson_file),
        )
        .route("/approve/{lesson_id}", post(approve_lesson))
        .route("/reject/{lesson_id}", post(reject_lesson))
        .route("/pending", get(list_pending_lessons))
        .route("/all/{course_id}/{module_id}", get(list_lessons))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_staff));

    let teacher_routes = Router::new()
        .route("/requests", post(create_lesson_request).put(update_lesson_request))
        .route(
            "/requests/{course_id}/{module_id}/{lesson_id}",
            delete(delete_lesson_request),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_teacher));

    let student_routes = Router::new()
        .route("/student/{course_id}/{module_id}", get(list_approved_lessons))
        .route("/complete", post(complete_lesson))
        .route_layer(middleware::from_fn_with_state(state, require_student));

    // feedback visibility branches on the caller's role inside the handlers
    let shared_routes = Router::new().route("/feedback", get(list_feedback).post(submit_feedback));

    staff_routes
        .merge(teacher_routes)
        .merge(student_routes)
        .merge(shared_routes)
}
