use axum::extract::{Path, State};
use axum::{Json, http::StatusCode};
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::course_modules::model::{CourseModule, CreateModuleDto, UpdateModuleDto};
use crate::modules::course_modules::service::ModuleService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

/// Create a module in a course
#[utoipa::path(
    post,
    path = "/api/modules",
    request_body = CreateModuleDto,
    responses(
        (status = 201, description = "Module created", body = CourseModule),
        (status = 404, description = "Course not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Modules"
)]
#[instrument(skip(state, dto))]
pub async fn create_module(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateModuleDto>,
) -> Result<(StatusCode, Json<CourseModule>), AppError> {
    let module = ModuleService::create_module(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(module)))
}

/// Update a module within its course (ids in the body)
#[utoipa::path(
    put,
    path = "/api/modules",
    request_body = UpdateModuleDto,
    responses(
        (status = 200, description = "Module updated", body = CourseModule),
        (status = 404, description = "Course or module not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Modules"
)]
#[instrument(skip(state, dto))]
pub async fn update_module(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<UpdateModuleDto>,
) -> Result<Json<CourseModule>, AppError> {
    let module = ModuleService::update_module(&state.db, dto).await?;
    Ok(Json(module))
}

/// Delete a module within its course
#[utoipa::path(
    delete,
    path = "/api/modules/{course_id}/{module_id}",
    params(
        ("course_id" = i32, Path, description = "Course id"),
        ("module_id" = i32, Path, description = "Module id"),
    ),
    responses(
        (status = 200, description = "Module deleted"),
        (status = 404, description = "Course or module not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Modules"
)]
#[instrument(skip(state))]
pub async fn delete_module(
    State(state): State<AppState>,
    Path((course_id, module_id)): Path<(i32, i32)>,
) -> Result<Json<serde_json::Value>, AppError> {
    ModuleService::delete_module(&state.db, course_id, module_id).await?;
    Ok(Json(
        serde_json::json!({ "message": "Module deleted successfully" }),
    ))
}

/// List modules in a course
#[utoipa::path(
    get,
    path = "/api/modules/course/{course_id}",
    params(("course_id" = i32, Path, description = "Course id")),
    responses(
        (status = 200, description = "Modules", body = Vec<CourseModule>),
        (status = 404, description = "Course not found or no modules", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Modules"
)]
#[instrument(skip(state))]
pub async fn list_modules_in_course(
    State(state): State<AppState>,
    Path(course_id): Path<i32>,
) -> Result<Json<Vec<CourseModule>>, AppError> {
    let modules = ModuleService::list_modules_in_course(&state.db, course_id).await?;
    Ok(Json(modules))
}

/// List modules of a course the calling student is enrolled in
#[utoipa::path(
    get,
    path = "/api/modules/student/{course_id}",
    params(("course_id" = i32, Path, description = "Course id")),
    responses(
        (status = 200, description = "Modules", body = Vec<CourseModule>),
        (status = 403, description = "Not enrolled in this course", body = ErrorResponse),
        (status = 404, description = "No modules found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "Modules"
)]
#[instrument(skip(state, auth_user))]
pub async fn list_modules_for_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(course_id): Path<i32>,
) -> Result<Json<Vec<CourseModule>>, AppError> {
    let student_id = auth_user.user_id()?;
    let modules =
        ModuleService::list_modules_for_student(&state.db, student_id, course_id).await?;
    Ok(Json(modules))
}
