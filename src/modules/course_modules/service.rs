use sqlx::PgPool;
use tracing::instrument;

use crate::modules::course_modules::model::{CourseModule, CreateModuleDto, UpdateModuleDto};
use crate::modules::courses::service::CourseService;
use crate::utils::errors::AppError;

const MODULE_COLUMNS: &str = "id, course_id, title, content, created_at, updated_at";

pub struct ModuleService;

impl ModuleService {
    /// Containment-chain lookup: the module must belong to the named course,
    /// checked in a single compound query.
    pub async fn find_module_in_course(
        db: &PgPool,
        module_id: i32,
        course_id: i32,
    ) -> Result<CourseModule, AppError> {
        sqlx::query_as::<_, CourseModule>(&format!(
            "SELECT {MODULE_COLUMNS} FROM modules WHERE id = $1 AND course_id = $2"
        ))
        .bind(module_id)
        .bind(course_id)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| {
            AppError::not_found(anyhow::anyhow!(
                "Module not found or does not belong to the specified course"
            ))
        })
    }

    #[instrument(skip(db, dto))]
    pub async fn create_module(db: &PgPool, dto: CreateModuleDto) -> Result<CourseModule, AppError> {
        CourseService::ensure_course_exists(db, dto.course_id).await?;

        let module = sqlx::query_as::<_, CourseModule>(&format!(
            "INSERT INTO modules (course_id, title, content)
             VALUES ($1, $2, $3)
             RETURNING {MODULE_COLUMNS}"
        ))
        .bind(dto.course_id)
        .bind(&dto.title)
        .bind(&dto.content)
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        Ok(module)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_module(db: &PgPool, dto: UpdateModuleDto) -> Result<CourseModule, AppError> {
        CourseService::ensure_course_exists(db, dto.course_id).await?;
        Self::find_module_in_course(db, dto.module_id, dto.course_id).await?;

        let module = sqlx::query_as::<_, CourseModule>(&format!(
            "UPDATE modules SET
                title = COALESCE($1, title),
                content = COALESCE($2, content),
                updated_at = NOW()
             WHERE id = $3 AND course_id = $4
             RETURNING {MODULE_COLUMNS}"
        ))
        .bind(&dto.title)
        .bind(&dto.content)
        .bind(dto.module_id)
        .bind(dto.course_id)
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        Ok(module)
    }

    #[instrument(skip(db))]
    pub async fn delete_module(db: &PgPool, course_id: i32, module_id: i32) -> Result<(), AppError> {
        CourseService::ensure_course_exists(db, course_id).await?;
        Self::find_module_in_course(db, module_id, course_id).await?;

        sqlx::query("DELETE FROM modules WHERE id = $1 AND course_id = $2")
            .bind(module_id)
            .bind(course_id)
            .execute(db)
            .await
            .map_err(AppError::database)?;

        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn list_modules_in_course(
        db: &PgPool,
        course_id: i32,
    ) -> Result<Vec<CourseModule>, AppError> {
        CourseService::ensure_course_exists(db, course_id).await?;

        let modules = sqlx::query_as::<_, CourseModule>(&format!(
            "SELECT {MODULE_COLUMNS} FROM modules WHERE course_id = $1 ORDER BY id"
        ))
        .bind(course_id)
        .fetch_all(db)
        .await
        .map_err(AppError::database)?;

        if modules.is_empty() {
            return Err(AppError::not_found(anyhow::anyhow!(
                "No modules found for the specified course"
            )));
        }

        Ok(modules)
    }

    /// Student listing: the caller must be enrolled (via their batch) in the
    /// course before its modules are visible.
    #[instrument(skip(db))]
    pub async fn list_modules_for_student(
        db: &PgPool,
        student_id: i32,
        course_id: i32,
    ) -> Result<Vec<CourseModule>, AppError> {
        let enrollment: Option<(i32,)> = sqlx::query_as(
            "SELECT sb.id FROM student_batches sb
             JOIN batches b ON b.id = sb.batch_id
             WHERE sb.student_id = $1 AND b.course_id = $2",
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?;

        if enrollment.is_none() {
            return Err(AppError::forbidden(anyhow::anyhow!(
                "Access denied: you are not enrolled in this course"
            )));
        }

        let modules = sqlx::query_as::<_, CourseModule>(&format!(
            "SELECT {MODULE_COLUMNS} FROM modules WHERE course_id = $1 ORDER BY id"
        ))
        .bind(course_id)
        .fetch_all(db)
        .await
        .map_err(AppError::database)?;

        if modules.is_empty() {
            return Err(AppError::not_found(anyhow::anyhow!(
                "No modules found for this course"
            )));
        }

        Ok(modules)
    }
}
