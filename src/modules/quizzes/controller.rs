use axum::extract::{Path, State};
use axum::{Json, http::StatusCode};
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::quizzes::model::{
    AnswerResult, CreateQuestionDto, CreateQuizDto, Question, Quiz, QuizDetail, QuizResult,
    StudentQuizView, SubmitAnswerDto, UpdateQuestionDto, UpdateQuizDto,
};
use crate::modules::quizzes::service::QuizService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

/// Create a quiz with nested questions and answers
#[utoipa::path(
    post,
    path = "/api/quizzes/course/{course_id}/batch/{batch_id}/module/{module_id}/lesson/{lesson_id}",
    params(
        ("course_id" = i32, Path, description = "Course id"),
        ("batch_id" = i32, Path, description = "Batch id"),
        ("module_id" = i32, Path, description = "Module id"),
        ("lesson_id" = i32, Path, description = "Lesson id"),
    ),
    request_body = CreateQuizDto,
    responses(
        (status = 201, description = "Quiz created", body = Quiz),
        (status = 403, description = "Teacher not assigned to the batch", body = ErrorResponse),
        (status = 404, description = "Broken containment chain", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Quizzes"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_quiz(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((course_id, batch_id, module_id, lesson_id)): Path<(i32, i32, i32, i32)>,
    ValidatedJson(dto): ValidatedJson<CreateQuizDto>,
) -> Result<(StatusCode, Json<Quiz>), AppError> {
    let quiz = QuizService::create_quiz(
        &state.db,
        course_id,
        batch_id,
        module_id,
        lesson_id,
        auth_user.role()?,
        auth_user.0.sub,
        dto,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(quiz)))
}

/// Update a quiz (mixed update/create question list)
#[utoipa::path(
    put,
    path = "/api/quizzes/{quiz_id}",
    params(("quiz_id" = i32, Path, description = "Quiz id")),
    request_body = UpdateQuizDto,
    responses(
        (status = 200, description = "Quiz updated", body = Quiz),
        (status = 403, description = "Teacher not assigned to the batch", body = ErrorResponse),
        (status = 404, description = "Quiz or question not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Quizzes"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_quiz(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(quiz_id): Path<i32>,
    ValidatedJson(dto): ValidatedJson<UpdateQuizDto>,
) -> Result<Json<Quiz>, AppError> {
    let quiz =
        QuizService::update_quiz(&state.db, quiz_id, auth_user.role()?, auth_user.0.sub, dto)
            .await?;
    Ok(Json(quiz))
}

/// Delete a quiz and everything under it
#[utoipa::path(
    delete,
    path = "/api/quizzes/{quiz_id}",
    params(("quiz_id" = i32, Path, description = "Quiz id")),
    responses(
        (status = 200, description = "Quiz deleted"),
        (status = 403, description = "Teacher not assigned to the batch", body = ErrorResponse),
        (status = 404, description = "Quiz not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Quizzes"
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_quiz(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(quiz_id): Path<i32>,
) -> Result<Json<serde_json::Value>, AppError> {
    QuizService::delete_quiz(&state.db, quiz_id, auth_user.role()?, auth_user.0.sub).await?;
    Ok(Json(serde_json::json!({
        "message": "Quiz and its associated questions deleted successfully"
    })))
}

/// View a quiz with correctness flags (staff/teacher)
#[utoipa::path(
    get,
    path = "/api/quizzes/{quiz_id}",
    params(("quiz_id" = i32, Path, description = "Quiz id")),
    responses(
        (status = 200, description = "Quiz detail", body = QuizDetail),
        (status = 403, description = "Teacher not assigned to the batch", body = ErrorResponse),
        (status = 404, description = "Quiz not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Quizzes"
)]
#[instrument(skip(state, auth_user))]
pub async fn view_quiz(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(quiz_id): Path<i32>,
) -> Result<Json<QuizDetail>, AppError> {
    let detail =
        QuizService::staff_view(&state.db, quiz_id, auth_user.role()?, auth_user.0.sub).await?;
    Ok(Json(detail))
}

/// Add a question to a quiz
#[utoipa::path(
    post,
    path = "/api/quizzes/{quiz_id}/questions",
    params(("quiz_id" = i32, Path, description = "Quiz id")),
    request_body = CreateQuestionDto,
    responses(
        (status = 201, description = "Question created", body = Question),
        (status = 403, description = "Teacher not assigned to the batch", body = ErrorResponse),
        (status = 404, description = "Quiz not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Quizzes"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_question(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(quiz_id): Path<i32>,
    ValidatedJson(dto): ValidatedJson<CreateQuestionDto>,
) -> Result<(StatusCode, Json<Question>), AppError> {
    let question =
        QuizService::create_question(&state.db, quiz_id, auth_user.role()?, auth_user.0.sub, dto)
            .await?;
    Ok((StatusCode::CREATED, Json(question)))
}

/// Update a question (supplied answers replace the old set)
#[utoipa::path(
    put,
    path = "/api/quizzes/{quiz_id}/questions/{question_id}",
    params(
        ("quiz_id" = i32, Path, description = "Quiz id"),
        ("question_id" = i32, Path, description = "Question id"),
    ),
    request_body = UpdateQuestionDto,
    responses(
        (status = 200, description = "Question updated", body = Question),
        (status = 403, description = "Teacher not assigned to the batch", body = ErrorResponse),
        (status = 404, description = "Question not found in the quiz", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Quizzes"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_question(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((quiz_id, question_id)): Path<(i32, i32)>,
    Json(dto): Json<UpdateQuestionDto>,
) -> Result<Json<Question>, AppError> {
    let question = QuizService::update_question(
        &state.db,
        quiz_id,
        question_id,
        auth_user.role()?,
        auth_user.0.sub,
        dto,
    )
    .await?;
    Ok(Json(question))
}

/// Delete a question and its answers
#[utoipa::path(
    delete,
    path = "/api/quizzes/{quiz_id}/questions/{question_id}",
    params(
        ("quiz_id" = i32, Path, description = "Quiz id"),
        ("question_id" = i32, Path, description = "Question id"),
    ),
    responses(
        (status = 200, description = "Question deleted"),
        (status = 403, description = "Teacher not assigned to the batch", body = ErrorResponse),
        (status = 404, description = "Question not found in the quiz", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Quizzes"
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_question(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((quiz_id, question_id)): Path<(i32, i32)>,
) -> Result<Json<serde_json::Value>, AppError> {
    QuizService::delete_question(
        &state.db,
        quiz_id,
        question_id,
        auth_user.role()?,
        auth_user.0.sub,
    )
    .await?;
    Ok(Json(
        serde_json::json!({ "message": "Question deleted successfully" }),
    ))
}

/// View a quiz as a student (no correctness flags; completion-gated)
#[utoipa::path(
    get,
    path = "/api/quizzes/student/{quiz_id}",
    params(("quiz_id" = i32, Path, description = "Quiz id")),
    responses(
        (status = 200, description = "Quiz without correctness flags", body = StudentQuizView),
        (status = 403, description = "Lesson not completed", body = ErrorResponse),
        (status = 404, description = "Quiz not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Quizzes"
)]
#[instrument(skip(state, auth_user))]
pub async fn view_quiz_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(quiz_id): Path<i32>,
) -> Result<Json<StudentQuizView>, AppError> {
    let student_id = auth_user.user_id()?;
    let view = QuizService::student_view(&state.db, quiz_id, student_id).await?;
    Ok(Json(view))
}

/// The calling student's running result for a quiz
#[utoipa::path(
    get,
    path = "/api/quizzes/student/{quiz_id}/result",
    params(("quiz_id" = i32, Path, description = "Quiz id")),
    responses(
        (status = 200, description = "Running score", body = QuizResult),
        (status = 404, description = "Quiz not found or no result yet", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Quizzes"
)]
#[instrument(skip(state, auth_user))]
pub async fn quiz_result(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(quiz_id): Path<i32>,
) -> Result<Json<QuizResult>, AppError> {
    let student_id = auth_user.user_id()?;
    let result = QuizService::quiz_result(&state.db, quiz_id, student_id).await?;
    Ok(Json(result))
}

/// Submit an answer to a quiz question
#[utoipa::path(
    post,
    path = "/api/quizzes/student/{quiz_id}/questions/{question_id}/answer",
    params(
        ("quiz_id" = i32, Path, description = "Quiz id"),
        ("question_id" = i32, Path, description = "Question id"),
    ),
    request_body = SubmitAnswerDto,
    responses(
        (status = 200, description = "Graded answer with running score", body = AnswerResult),
        (status = 400, description = "Answer does not belong to the question", body = ErrorResponse),
        (status = 403, description = "Lesson not completed", body = ErrorResponse),
        (status = 404, description = "Quiz or question not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Quizzes"
)]
#[instrument(skip(state, auth_user))]
pub async fn submit_answer(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((quiz_id, question_id)): Path<(i32, i32)>,
    Json(dto): Json<SubmitAnswerDto>,
) -> Result<Json<AnswerResult>, AppError> {
    let student_id = auth_user.user_id()?;
    let result =
        QuizService::submit_answer(&state.db, quiz_id, question_id, student_id, dto).await?;
    Ok(Json(result))
}
