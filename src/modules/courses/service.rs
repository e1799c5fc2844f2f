use sqlx::PgPool;
use tracing::instrument;

use crate::modules::courses::model::{Course, CreateCourseDto, UpdateCourseDto};
use crate::utils::errors::AppError;

const COURSE_COLUMNS: &str =
    "id, name, description, start_date, end_date, created_at, updated_at";

pub struct CourseService;

impl CourseService {
    /// Relationship-validator helper used by every module that references a
    /// course.
    pub async fn ensure_course_exists(db: &PgPool, course_id: i32) -> Result<(), AppError> {
        let found: Option<(i32,)> = sqlx::query_as("SELECT id FROM courses WHERE id = $1")
            .bind(course_id)
            .fetch_optional(db)
            .await
            .map_err(AppError::database)?;

        if found.is_none() {
            return Err(AppError::not_found(anyhow::anyhow!("Course not found")));
        }

        Ok(())
    }

    #[instrument(skip(db, dto))]
    pub async fn create_course(db: &PgPool, dto: CreateCourseDto) -> Result<Course, AppError> {
        let course = sqlx::query_as::<_, Course>(&format!(
            "INSERT INTO courses (name, description, start_date, end_date)
             VALUES ($1, $2, $3, $4)
             RETURNING {COURSE_COLUMNS}"
        ))
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(dto.start_date)
        .bind(dto.end_date)
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        Ok(course)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_course(db: &PgPool, dto: UpdateCourseDto) -> Result<Course, AppError> {
        Self::ensure_course_exists(db, dto.id).await?;

        let course = sqlx::query_as::<_, Course>(&format!(
            "UPDATE courses SET
                name = COALESCE($1, name),
                description = COALESCE($2, description),
                start_date = COALESCE($3, start_date),
                end_date = COALESCE($4, end_date),
                updated_at = NOW()
             WHERE id = $5
             RETURNING {COURSE_COLUMNS}"
        ))
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(dto.start_date)
        .bind(dto.end_date)
        .bind(dto.id)
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        Ok(course)
    }

    #[instrument(skip(db))]
    pub async fn delete_course(db: &PgPool, course_id: i32) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(course_id)
            .execute(db)
            .await
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Course not found")));
        }

        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn list_courses(db: &PgPool) -> Result<Vec<Course>, AppError> {
        let courses = sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses ORDER BY id"
        ))
        .fetch_all(db)
        .await
        .map_err(AppError::database)?;

        if courses.is_empty() {
            return Err(AppError::not_found(anyhow::anyhow!("No courses found")));
        }

        Ok(courses)
    }
}
