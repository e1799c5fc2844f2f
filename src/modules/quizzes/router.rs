use axum::{
    Router,
    middleware,
    routing::{get, post, put},
};

use crate::middleware::role::{require_student, require_teaching_staff};
use crate::modules::quizzes::controller::{
    create_question, create_quiz, delete_question, delete_quiz, quiz_result, submit_answer,
    update_question, update_quiz, view_quiz, view_quiz_student,
};
use crate::state::AppState;

pub fn init_quizzes_router(state: AppState) -> Router<AppState> {
    let teaching_routes = Router::new()
        .route(
            "/course/{course_id}/batch/{batch_id}/module/{module_id}/lesson/{lesson_id}",
            post(create_quiz),
        )
        .route(
            "/{quiz_id}",
            get(view_quiz).put(update_quiz).delete(delete_quiz),
        )
        .route("/{quiz_id}/questions", post(create_question))
        .route(
            "/{quiz_id}/questions/{question_id}",
            put(update_question).delete(delete_question),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_teaching_staff,
        ));

    let student_routes = Router::new()
        .route("/student/{quiz_id}", get(view_quiz_student))
        .route("/student/{quiz_id}/result", get(quiz_result))
        .route(
            "/student/{quiz_id}/questions/{question_id}/answer",
            post(submit_answer),
        )
        .route_layer(middleware::from_fn_with_state(state, require_student));

    teaching_routes.merge(student_routes)
}
