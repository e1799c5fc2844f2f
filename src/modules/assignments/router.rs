use axum::{
    Router,
    middleware,
    routing::{get, post, put},
};

use crate::middleware::role::{require_student, require_teaching_staff};
use crate::modules::assignments::controller::{
    create_assignment, delete_assignment, get_submission_feedback, post_submission_feedback,
    submit_assignment, update_assignment,
};
use crate::state::AppState;

pub fn init_assignments_router(state: AppState) -> Router<AppState> {
    let teaching_routes = Router::new()
        .route("/", post(create_assignment))
        .route(
            "/{assignment_id}",
            put(update_assignment).delete(delete_assignment),
        )
        .route(
            "/submissions/{submission_id}/feedback",
            post(post_submission_feedback),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_teaching_staff,
        ));

    let student_routes = Router::new()
        .route(
            "/{assignment_id}/submissions/{student_id}",
            post(submit_assignment),
        )
        .route_layer(middleware::from_fn_with_state(state, require_student));

    // feedback read is role-scoped in the handler
    let shared_routes = Router::new().route(
        "/submissions/{submission_id}/feedback",
        get(get_submission_feedback),
    );

    teaching_routes.merge(student_routes).merge(shared_routes)
}
