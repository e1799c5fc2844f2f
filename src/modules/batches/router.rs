use axum::{
    Router,
    middleware,
    routing::{delete, get, post},
};

use crate::middleware::role::{
    require_staff, require_student, require_teacher, require_teaching_staff,
};
use crate::modules::batches::controller::{
    assign_user_to_batch, assigned_courses, create_batch, delete_batch, get_live_link,
    post_live_link, remove_user_from_batch, student_courses, teacher_roster, update_batch,
};
use crate::state::AppState;

pub fn init_batches_router(state: AppState) -> Router<AppState> {
    let staff_routes = Router::new()
        .route("/", post(create_batch).put(update_batch))
        .route("/{course_id}/{batch_id}", delete(delete_batch))
        .route("/assign", post(assign_user_to_batch))
        .route("/unassign", delete(remove_user_from_batch))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_staff));

    let teaching_routes = Router::new()
        .route("/{course_id}/{batch_id}/live-link", post(post_live_link))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_teaching_staff,
        ))
        .merge(
            Router::new()
                .route("/teacher/roster", get(teacher_roster))
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    require_teacher,
                )),
        );

    let student_routes = Router::new()
        .route("/live-link/{course_id}/{batch_id}", get(get_live_link))
        .route("/student/courses", get(student_courses))
        .route_layer(middleware::from_fn_with_state(state, require_student));

    // staff or the student themself; checked in the handler
    let shared_routes = Router::new().route("/student/{student_id}/courses", get(assigned_courses));

    staff_routes
        .merge(teaching_routes)
        .merge(student_routes)
        .merge(shared_routes)
}
