use sqlx::PgPool;
use tracing::instrument;

use crate::modules::course_modules::service::ModuleService;
use crate::modules::courses::service::CourseService;
use crate::modules::lessons::model::{
    CompleteLessonDto, CreateLessonDto, Lesson, LessonFeedback, LessonStatus, SubmitFeedbackDto,
    UpdateLessonDto,
};
use crate::modules::users::model::Role;
use crate::utils::errors::AppError;

const LESSON_COLUMNS: &str = "id, module_id, course_id, title, content, video_link, file_path, \
                              status, created_by, created_at, updated_at";

pub struct LessonService;

impl LessonService {
    /// Containment-chain lookup: lesson within module within course, in one
    /// compound query.
    pub async fn find_lesson_in_chain(
        db: &PgPool,
        lesson_id: i32,
        module_id: i32,
        course_id: i32,
    ) -> Result<Lesson, AppError> {
        sqlx::query_as::<_, Lesson>(&format!(
            "SELECT {LESSON_COLUMNS} FROM lessons
             WHERE id = $1 AND module_id = $2 AND course_id = $3"
        ))
        .bind(lesson_id)
        .bind(module_id)
        .bind(course_id)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| {
            AppError::not_found(anyhow::anyhow!(
                "Lesson not found or invalid course/module combination"
            ))
        })
    }

    async fn find_lesson(db: &PgPool, lesson_id: i32) -> Result<Lesson, AppError> {
        sqlx::query_as::<_, Lesson>(&format!(
            "SELECT {LESSON_COLUMNS} FROM lessons WHERE id = $1"
        ))
        .bind(lesson_id)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Lesson not found")))
    }

    async fn insert_lesson(
        db: &PgPool,
        dto: &CreateLessonDto,
        status: LessonStatus,
        created_by: Option<i32>,
    ) -> Result<Lesson, AppError> {
        CourseService::ensure_course_exists(db, dto.course_id).await?;
        ModuleService::find_module_in_course(db, dto.module_id, dto.course_id).await?;

        let lesson = sqlx::query_as::<_, Lesson>(&format!(
            "INSERT INTO lessons (module_id, course_id, title, content, video_link, status, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {LESSON_COLUMNS}"
        ))
        .bind(dto.module_id)
        .bind(dto.course_id)
        .bind(&dto.title)
        .bind(&dto.content)
        .bind(&dto.video_link)
        .bind(status)
        .bind(created_by)
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        Ok(lesson)
    }

    /// Staff lessons go live immediately.
    #[instrument(skip(db, dto))]
    pub async fn create_lesson_staff(
        db: &PgPool,
        dto: CreateLessonDto,
        created_by: Option<i32>,
    ) -> Result<Lesson, AppError> {
        Self::insert_lesson(db, &dto, LessonStatus::Approved, created_by).await
    }

    /// Teacher lessons enter the moderation queue.
    #[instrument(skip(db, dto))]
    pub async fn create_lesson_teacher(
        db: &PgPool,
        dto: CreateLessonDto,
        teacher_id: i32,
    ) -> Result<Lesson, AppError> {
        Self::insert_lesson(db, &dto, LessonStatus::Pending, Some(teacher_id)).await
    }

    #[instrument(skip(db, dto))]
    pub async fn update_lesson_staff(
        db: &PgPool,
        dto: UpdateLessonDto,
    ) -> Result<Lesson, AppError> {
        Self::find_lesson_in_chain(db, dto.lesson_id, dto.module_id, dto.course_id).await?;

        let lesson = sqlx::query_as::<_, Lesson>(&format!(
            "UPDATE lessons SET
                title = COALESCE($1, title),
                content = COALESCE($2, content),
                video_link = COALESCE($3, video_link),
                updated_at = NOW()
             WHERE id = $4
             RETURNING {LESSON_COLUMNS}"
        ))
        .bind(&dto.title)
        .bind(&dto.content)
        .bind(&dto.video_link)
        .bind(dto.lesson_id)
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        Ok(lesson)
    }

    /// A teacher edit re-enters moderation regardless of the prior status.
    #[instrument(skip(db, dto))]
    pub async fn update_lesson_teacher(
        db: &PgPool,
        dto: UpdateLessonDto,
        teacher_id: i32,
    ) -> Result<Lesson, AppError> {
        Self::find_lesson_in_chain(db, dto.lesson_id, dto.module_id, dto.course_id).await?;

        let lesson = sqlx::query_as::<_, Lesson>(&format!(
            "UPDATE lessons SET
                title = COALESCE($1, title),
                content = COALESCE($2, content),
                video_link = COALESCE($3, video_link),
                status = 'pending',
                created_by = $4,
                updated_at = NOW()
             WHERE id = $5
             RETURNING {LESSON_COLUMNS}"
        ))
        .bind(&dto.title)
        .bind(&dto.content)
        .bind(&dto.video_link)
        .bind(teacher_id)
        .bind(dto.lesson_id)
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        Ok(lesson)
    }

    #[instrument(skip(db))]
    pub async fn delete_lesson_staff(
        db: &PgPool,
        course_id: i32,
        module_id: i32,
        lesson_id: i32,
    ) -> Result<(), AppError> {
        Self::find_lesson_in_chain(db, lesson_id, module_id, course_id).await?;

        sqlx::query("DELETE FROM lessons WHERE id = $1")
            .bind(lesson_id)
            .execute(db)
            .await
            .map_err(AppError::database)?;

        Ok(())
    }

    /// Teacher deletion is a request, not a removal: the lesson drops back
    /// to `pending` for a staff decision.
    #[instrument(skip(db))]
    pub async fn request_lesson_deletion(
        db: &PgPool,
        course_id: i32,
        module_id: i32,
        lesson_id: i32,
        teacher_id: i32,
    ) -> Result<Lesson, AppError> {
        Self::find_lesson_in_chain(db, lesson_id, module_id, course_id).await?;

        let lesson = sqlx::query_as::<_, Lesson>(&format!(
            "UPDATE lessons SET status = 'pending', created_by = $1, updated_at = NOW()
             WHERE id = $2
             RETURNING {LESSON_COLUMNS}"
        ))
        .bind(teacher_id)
        .bind(lesson_id)
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        Ok(lesson)
    }

    #[instrument(skip(db))]
    pub async fn review_lesson(
        db: &PgPool,
        lesson_id: i32,
        approve: bool,
    ) -> Result<Lesson, AppError> {
        let lesson = Self::find_lesson(db, lesson_id).await?;

        let next_status = lesson
            .status
            .review(approve)
            .map_err(|msg| AppError::bad_request(anyhow::anyhow!(msg)))?;

        let lesson = sqlx::query_as::<_, Lesson>(&format!(
            "UPDATE lessons SET status = $1, updated_at = NOW()
             WHERE id = $2
             RETURNING {LESSON_COLUMNS}"
        ))
        .bind(next_status)
        .bind(lesson_id)
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        Ok(lesson)
    }

    #[instrument(skip(db))]
    pub async fn list_pending_lessons(db: &PgPool) -> Result<Vec<Lesson>, AppError> {
        let lessons = sqlx::query_as::<_, Lesson>(&format!(
            "SELECT {LESSON_COLUMNS} FROM lessons WHERE status = 'pending' ORDER BY id"
        ))
        .fetch_all(db)
        .await
        .map_err(AppError::database)?;

        if lessons.is_empty() {
            return Err(AppError::not_found(anyhow::anyhow!(
                "No pending lesson requests found"
            )));
        }

        Ok(lessons)
    }

    #[instrument(skip(db))]
    pub async fn list_lessons(
        db: &PgPool,
        course_id: i32,
        module_id: i32,
    ) -> Result<Vec<Lesson>, AppError> {
        let lessons = sqlx::query_as::<_, Lesson>(&format!(
            "SELECT {LESSON_COLUMNS} FROM lessons
             WHERE course_id = $1 AND module_id = $2 ORDER BY id"
        ))
        .bind(course_id)
        .bind(module_id)
        .fetch_all(db)
        .await
        .map_err(AppError::database)?;

        if lessons.is_empty() {
            return Err(AppError::not_found(anyhow::anyhow!(
                "No lessons found for the given course and module"
            )));
        }

        Ok(lessons)
    }

    /// Students only see approved lessons.
    #[instrument(skip(db))]
    pub async fn list_approved_lessons(
        db: &PgPool,
        course_id: i32,
        module_id: i32,
    ) -> Result<Vec<Lesson>, AppError> {
        let lessons = sqlx::query_as::<_, Lesson>(&format!(
            "SELECT {LESSON_COLUMNS} FROM lessons
             WHERE course_id = $1 AND module_id = $2 AND status = 'approved' ORDER BY id"
        ))
        .bind(course_id)
        .bind(module_id)
        .fetch_all(db)
        .await
        .map_err(AppError::database)?;

        if lessons.is_empty() {
            return Err(AppError::not_found(anyhow::anyhow!(
                "No approved lessons found for the given course and module"
            )));
        }

        Ok(lessons)
    }

    #[instrument(skip(db))]
    pub async fn attach_file(
        db: &PgPool,
        course_id: i32,
        module_id: i32,
        lesson_id: i32,
        file_path: &str,
    ) -> Result<Lesson, AppError> {
        Self::find_lesson_in_chain(db, lesson_id, module_id, course_id).await?;

        let lesson = sqlx::query_as::<_, Lesson>(&format!(
            "UPDATE lessons SET file_path = $1, updated_at = NOW()
             WHERE id = $2
             RETURNING {LESSON_COLUMNS}"
        ))
        .bind(file_path)
        .bind(lesson_id)
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        Ok(lesson)
    }

    /// Upsert keyed on (lesson_id, student_id); completing twice leaves one
    /// row with `completed = true`.
    #[instrument(skip(db, dto))]
    pub async fn complete_lesson(
        db: &PgPool,
        student_id: i32,
        dto: CompleteLessonDto,
    ) -> Result<(), AppError> {
        Self::find_lesson(db, dto.lesson_id).await?;

        sqlx::query(
            "INSERT INTO lesson_completions (lesson_id, student_id, course_id, module_id, completed)
             VALUES ($1, $2, $3, $4, TRUE)
             ON CONFLICT (lesson_id, student_id)
             DO UPDATE SET completed = TRUE, course_id = EXCLUDED.course_id,
                           module_id = EXCLUDED.module_id, updated_at = NOW()",
        )
        .bind(dto.lesson_id)
        .bind(student_id)
        .bind(dto.course_id)
        .bind(dto.module_id)
        .execute(db)
        .await
        .map_err(AppError::database)?;

        Ok(())
    }

    /// The completion gate shared by quiz viewing/answering and assignment
    /// submission.
    pub async fn is_lesson_completed(
        db: &PgPool,
        lesson_id: i32,
        student_id: i32,
    ) -> Result<bool, AppError> {
        let completed: Option<(bool,)> = sqlx::query_as(
            "SELECT completed FROM lesson_completions
             WHERE lesson_id = $1 AND student_id = $2",
        )
        .bind(lesson_id)
        .bind(student_id)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?;

        Ok(completed.map(|(c,)| c).unwrap_or(false))
    }

    #[instrument(skip(db, dto))]
    pub async fn submit_feedback(
        db: &PgPool,
        student_id: i32,
        dto: SubmitFeedbackDto,
    ) -> Result<LessonFeedback, AppError> {
        Self::find_lesson(db, dto.lesson_id).await?;

        let feedback = sqlx::query_as::<_, LessonFeedback>(
            "INSERT INTO lesson_feedback (lesson_id, student_id, feedback)
             VALUES ($1, $2, $3)
             RETURNING id, lesson_id, student_id, feedback, created_at",
        )
        .bind(dto.lesson_id)
        .bind(student_id)
        .bind(&dto.feedback)
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        Ok(feedback)
    }

    /// Feedback visibility: students read their own, teachers read feedback
    /// on lessons they authored, superadmins read everything.
    #[instrument(skip(db))]
    pub async fn list_feedback(
        db: &PgPool,
        role: Role,
        user_id: Option<i32>,
    ) -> Result<Vec<LessonFeedback>, AppError> {
        const FEEDBACK_COLUMNS: &str = "id, lesson_id, student_id, feedback, created_at";

        let feedback = match role {
            Role::Student => {
                let student_id = user_id.ok_or_else(|| {
                    AppError::forbidden(anyhow::anyhow!("Token does not carry a user id"))
                })?;
                sqlx::query_as::<_, LessonFeedback>(&format!(
                    "SELECT {FEEDBACK_COLUMNS} FROM lesson_feedback
                     WHERE student_id = $1 ORDER BY id"
                ))
                .bind(student_id)
                .fetch_all(db)
                .await
            }
            Role::Teacher => {
                let teacher_id = user_id.ok_or_else(|| {
                    AppError::forbidden(anyhow::anyhow!("Token does not carry a user id"))
                })?;
                sqlx::query_as::<_, LessonFeedback>(&format!(
                    "SELECT f.id, f.lesson_id, f.student_id, f.feedback, f.created_at
                     FROM lesson_feedback f
                     JOIN lessons l ON l.id = f.lesson_id
                     WHERE l.created_by = $1 ORDER BY f.id"
                ))
                .bind(teacher_id)
                .fetch_all(db)
                .await
            }
            Role::Superadmin => {
                sqlx::query_as::<_, LessonFeedback>(&format!(
                    "SELECT {FEEDBACK_COLUMNS} FROM lesson_feedback ORDER BY id"
                ))
                .fetch_all(db)
                .await
            }
            _ => {
                return Err(AppError::forbidden(anyhow::anyhow!(
                    "You are not authorized to view feedback"
                )));
            }
        }
        .map_err(AppError::database)?;

        Ok(feedback)
    }
}
