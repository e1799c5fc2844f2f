use sqlx::PgPool;
use tracing::instrument;

use crate::modules::assignments::model::{
    Assignment, AssignmentSubmission, CreateAssignmentDto, PostFeedbackDto, UpdateAssignmentDto,
};
use crate::modules::batches::service::BatchService;
use crate::modules::course_modules::service::ModuleService;
use crate::modules::courses::service::CourseService;
use crate::modules::lessons::service::LessonService;
use crate::modules::users::model::Role;
use crate::utils::errors::AppError;

const ASSIGNMENT_COLUMNS: &str = "id, course_id, module_id, lesson_id, batch_id, title, \
                                  description, due_date, submission_link, created_at, updated_at";

const SUBMISSION_COLUMNS: &str = "id, assignment_id, student_id, content, file_path, \
                                  submitted_at, feedback, feedback_by, feedback_at";

pub struct AssignmentService;

impl AssignmentService {
    async fn find_assignment(db: &PgPool, assignment_id: i32) -> Result<Assignment, AppError> {
        sqlx::query_as::<_, Assignment>(&format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM assignments WHERE id = $1"
        ))
        .bind(assignment_id)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Assignment not found")))
    }

    async fn find_submission(
        db: &PgPool,
        submission_id: i32,
    ) -> Result<AssignmentSubmission, AppError> {
        sqlx::query_as::<_, AssignmentSubmission>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM assignment_submissions WHERE id = $1"
        ))
        .bind(submission_id)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Assignment submission not found")))
    }

    #[instrument(skip(db, dto))]
    pub async fn create_assignment(
        db: &PgPool,
        dto: CreateAssignmentDto,
    ) -> Result<Assignment, AppError> {
        CourseService::ensure_course_exists(db, dto.course_id).await?;
        ModuleService::find_module_in_course(db, dto.module_id, dto.course_id).await?;
        LessonService::find_lesson_in_chain(db, dto.lesson_id, dto.module_id, dto.course_id)
            .await?;
        BatchService::find_batch(db, dto.batch_id).await?;

        let assignment = sqlx::query_as::<_, Assignment>(&format!(
            "INSERT INTO assignments
                (course_id, module_id, lesson_id, batch_id, title, description, due_date, submission_link)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {ASSIGNMENT_COLUMNS}"
        ))
        .bind(dto.course_id)
        .bind(dto.module_id)
        .bind(dto.lesson_id)
        .bind(dto.batch_id)
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(dto.due_date)
        .bind(&dto.submission_link)
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        Ok(assignment)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_assignment(
        db: &PgPool,
        assignment_id: i32,
        dto: UpdateAssignmentDto,
    ) -> Result<Assignment, AppError> {
        Self::find_assignment(db, assignment_id).await?;

        let assignment = sqlx::query_as::<_, Assignment>(&format!(
            "UPDATE assignments SET
                title = COALESCE($1, title),
                description = COALESCE($2, description),
                due_date = COALESCE($3, due_date),
                submission_link = COALESCE($4, submission_link),
                updated_at = NOW()
             WHERE id = $5
             RETURNING {ASSIGNMENT_COLUMNS}"
        ))
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(dto.due_date)
        .bind(&dto.submission_link)
        .bind(assignment_id)
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        Ok(assignment)
    }

    #[instrument(skip(db))]
    pub async fn delete_assignment(db: &PgPool, assignment_id: i32) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM assignments WHERE id = $1")
            .bind(assignment_id)
            .execute(db)
            .await
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Assignment not found")));
        }

        Ok(())
    }

    /// Student submission, gated on completion of the assignment's lesson.
    /// Resubmission appends a new row; there is no per-student uniqueness.
    #[instrument(skip(db, content))]
    pub async fn submit_assignment(
        db: &PgPool,
        assignment_id: i32,
        student_id: i32,
        content: Option<String>,
        file_path: Option<String>,
    ) -> Result<AssignmentSubmission, AppError> {
        let assignment = Self::find_assignment(db, assignment_id).await?;

        let completed =
            LessonService::is_lesson_completed(db, assignment.lesson_id, student_id).await?;
        if !completed {
            return Err(AppError::forbidden(anyhow::anyhow!(
                "You must complete the lesson before submitting the assignment"
            )));
        }

        let submission = sqlx::query_as::<_, AssignmentSubmission>(&format!(
            "INSERT INTO assignment_submissions (assignment_id, student_id, content, file_path)
             VALUES ($1, $2, $3, $4)
             RETURNING {SUBMISSION_COLUMNS}"
        ))
        .bind(assignment_id)
        .bind(student_id)
        .bind(&content)
        .bind(&file_path)
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        Ok(submission)
    }

    /// Grading feedback on an existing submission. The grader id is absent
    /// for the configured superadmin.
    #[instrument(skip(db, dto))]
    pub async fn post_feedback(
        db: &PgPool,
        submission_id: i32,
        grader_id: Option<i32>,
        dto: PostFeedbackDto,
    ) -> Result<AssignmentSubmission, AppError> {
        Self::find_submission(db, submission_id).await?;

        let submission = sqlx::query_as::<_, AssignmentSubmission>(&format!(
            "UPDATE assignment_submissions
             SET feedback = $1, feedback_by = $2, feedback_at = NOW()
             WHERE id = $3
             RETURNING {SUBMISSION_COLUMNS}"
        ))
        .bind(&dto.feedback)
        .bind(grader_id)
        .bind(submission_id)
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        Ok(submission)
    }

    /// Feedback read: a student may only see their own submission.
    #[instrument(skip(db))]
    pub async fn get_feedback(
        db: &PgPool,
        submission_id: i32,
        role: Role,
        user_id: Option<i32>,
    ) -> Result<AssignmentSubmission, AppError> {
        let submission = Self::find_submission(db, submission_id).await?;

        if role == Role::Student && user_id != Some(submission.student_id) {
            return Err(AppError::forbidden(anyhow::anyhow!(
                "Unauthorized access to feedback"
            )));
        }

        Ok(submission)
    }
}
