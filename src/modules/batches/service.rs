use sqlx::PgPool;
use tracing::instrument;

use crate::modules::batches::model::{
    AssignUserDto, Batch, CreateBatchDto, LiveSessionResponse, PostLiveLinkDto, RosterStudent,
    StudentCourse, TeacherRosterEntry, UpdateBatchDto,
};
use crate::modules::courses::service::CourseService;
use crate::modules::users::model::Role;
use crate::utils::errors::{AppError, conflict_on_unique};

const BATCH_COLUMNS: &str = "id, course_id, name, start_date, end_date, live_link, \
                             live_start_time, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct RosterRow {
    batch_id: i32,
    batch_name: String,
    course_id: i32,
    course_name: String,
    course_description: String,
    student_id: Option<i32>,
    student_name: Option<String>,
    student_email: Option<String>,
}

pub struct BatchService;

impl BatchService {
    /// Containment-chain lookup: the batch must belong to the named course.
    pub async fn find_batch_in_course(
        db: &PgPool,
        batch_id: i32,
        course_id: i32,
    ) -> Result<Batch, AppError> {
        sqlx::query_as::<_, Batch>(&format!(
            "SELECT {BATCH_COLUMNS} FROM batches WHERE id = $1 AND course_id = $2"
        ))
        .bind(batch_id)
        .bind(course_id)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| {
            AppError::not_found(anyhow::anyhow!(
                "Batch not found or does not belong to the specified course"
            ))
        })
    }

    pub async fn find_batch(db: &PgPool, batch_id: i32) -> Result<Batch, AppError> {
        sqlx::query_as::<_, Batch>(&format!(
            "SELECT {BATCH_COLUMNS} FROM batches WHERE id = $1"
        ))
        .bind(batch_id)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Batch not found")))
    }

    #[instrument(skip(db, dto))]
    pub async fn create_batch(db: &PgPool, dto: CreateBatchDto) -> Result<Batch, AppError> {
        CourseService::ensure_course_exists(db, dto.course_id).await?;

        if dto.end_time <= dto.start_time {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Invalid start or end date"
            )));
        }

        let batch = sqlx::query_as::<_, Batch>(&format!(
            "INSERT INTO batches (course_id, name, start_date, end_date)
             VALUES ($1, $2, $3, $4)
             RETURNING {BATCH_COLUMNS}"
        ))
        .bind(dto.course_id)
        .bind(&dto.name)
        .bind(dto.start_time)
        .bind(dto.end_time)
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        Ok(batch)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_batch(db: &PgPool, dto: UpdateBatchDto) -> Result<Batch, AppError> {
        Self::find_batch(db, dto.batch_id).await?;

        if let Some(course_id) = dto.course_id {
            CourseService::ensure_course_exists(db, course_id).await?;
        }

        let batch = sqlx::query_as::<_, Batch>(&format!(
            "UPDATE batches SET
                name = COALESCE($1, name),
                start_date = COALESCE($2, start_date),
                end_date = COALESCE($3, end_date),
                course_id = COALESCE($4, course_id),
                updated_at = NOW()
             WHERE id = $5
             RETURNING {BATCH_COLUMNS}"
        ))
        .bind(&dto.name)
        .bind(dto.start_time)
        .bind(dto.end_time)
        .bind(dto.course_id)
        .bind(dto.batch_id)
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        Ok(batch)
    }

    #[instrument(skip(db))]
    pub async fn delete_batch(db: &PgPool, course_id: i32, batch_id: i32) -> Result<(), AppError> {
        CourseService::ensure_course_exists(db, course_id).await?;
        Self::find_batch_in_course(db, batch_id, course_id).await?;

        sqlx::query("DELETE FROM batches WHERE id = $1 AND course_id = $2")
            .bind(batch_id)
            .bind(course_id)
            .execute(db)
            .await
            .map_err(AppError::database)?;

        Ok(())
    }

    /// Enrollment rule engine. The target's stored role decides the path:
    /// students may hold one batch system-wide, teachers one row per batch.
    #[instrument(skip(db))]
    pub async fn assign_user_to_batch(db: &PgPool, dto: AssignUserDto) -> Result<Role, AppError> {
        CourseService::ensure_course_exists(db, dto.course_id).await?;
        Self::find_batch_in_course(db, dto.batch_id, dto.course_id).await?;

        let user: Option<(Role,)> = sqlx::query_as("SELECT role FROM users WHERE id = $1")
            .bind(dto.user_id)
            .fetch_optional(db)
            .await
            .map_err(AppError::database)?;

        let (role,) =
            user.ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))?;

        if !role.is_enrollable() {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "User's role must be either 'student' or 'teacher'"
            )));
        }

        match role {
            Role::Student => {
                let existing: Option<(i32,)> =
                    sqlx::query_as("SELECT id FROM student_batches WHERE student_id = $1")
                        .bind(dto.user_id)
                        .fetch_optional(db)
                        .await
                        .map_err(AppError::database)?;

                if existing.is_some() {
                    return Err(AppError::conflict(anyhow::anyhow!(
                        "Student is already assigned to a batch"
                    )));
                }

                sqlx::query("INSERT INTO student_batches (student_id, batch_id) VALUES ($1, $2)")
                    .bind(dto.user_id)
                    .bind(dto.batch_id)
                    .execute(db)
                    .await
                    .map_err(|e| {
                        conflict_on_unique(e, "Student is already assigned to a batch")
                    })?;
            }
            Role::Teacher => {
                let existing: Option<(i32,)> = sqlx::query_as(
                    "SELECT id FROM teacher_batches WHERE teacher_id = $1 AND batch_id = $2",
                )
                .bind(dto.user_id)
                .bind(dto.batch_id)
                .fetch_optional(db)
                .await
                .map_err(AppError::database)?;

                if existing.is_some() {
                    return Err(AppError::conflict(anyhow::anyhow!(
                        "Teacher is already assigned to this batch"
                    )));
                }

                sqlx::query("INSERT INTO teacher_batches (teacher_id, batch_id) VALUES ($1, $2)")
                    .bind(dto.user_id)
                    .bind(dto.batch_id)
                    .execute(db)
                    .await
                    .map_err(|e| {
                        conflict_on_unique(e, "Teacher is already assigned to this batch")
                    })?;
            }
            _ => unreachable!("non-enrollable roles rejected above"),
        }

        crate::metrics::track_enrollment(role.as_str());

        Ok(role)
    }

    /// Removal mirrors assignment: exactly the named pairing is deleted.
    #[instrument(skip(db))]
    pub async fn remove_user_from_batch(db: &PgPool, dto: AssignUserDto) -> Result<Role, AppError> {
        CourseService::ensure_course_exists(db, dto.course_id).await?;
        Self::find_batch_in_course(db, dto.batch_id, dto.course_id).await?;

        let user: Option<(Role,)> = sqlx::query_as("SELECT role FROM users WHERE id = $1")
            .bind(dto.user_id)
            .fetch_optional(db)
            .await
            .map_err(AppError::database)?;

        let (role,) =
            user.ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))?;

        if !role.is_enrollable() {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "User's role must be either 'student' or 'teacher'"
            )));
        }

        let (table, id_column, missing_message) = match role {
            Role::Student => (
                "student_batches",
                "student_id",
                "Student is not assigned to this batch",
            ),
            Role::Teacher => (
                "teacher_batches",
                "teacher_id",
                "Teacher is not assigned to this batch",
            ),
            _ => unreachable!("non-enrollable roles rejected above"),
        };

        let result = sqlx::query(&format!(
            "DELETE FROM {table} WHERE {id_column} = $1 AND batch_id = $2"
        ))
        .bind(dto.user_id)
        .bind(dto.batch_id)
        .execute(db)
        .await
        .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::bad_request(anyhow::anyhow!(missing_message)));
        }

        Ok(role)
    }

    /// Post a live-session link and immediately notify enrolled students.
    /// Batch update and fan-out run in one transaction.
    #[instrument(skip(db, dto))]
    pub async fn post_live_link(
        db: &PgPool,
        course_id: i32,
        batch_id: i32,
        dto: PostLiveLinkDto,
    ) -> Result<Batch, AppError> {
        Self::find_batch_in_course(db, batch_id, course_id).await?;

        let mut tx = db.begin().await.map_err(AppError::database)?;

        let batch = sqlx::query_as::<_, Batch>(&format!(
            "UPDATE batches SET live_link = $1, live_start_time = $2, updated_at = NOW()
             WHERE id = $3
             RETURNING {BATCH_COLUMNS}"
        ))
        .bind(&dto.live_link)
        .bind(dto.live_start_time)
        .bind(batch_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::database)?;

        let message = format!(
            "Your live session will start in 1 hour. Link: {}",
            dto.live_link
        );

        sqlx::query(
            "INSERT INTO notifications (user_id, batch_id, message, live_start_time)
             SELECT sb.student_id, $1, $2, $3
             FROM student_batches sb
             WHERE sb.batch_id = $1",
        )
        .bind(batch_id)
        .bind(&message)
        .bind(dto.live_start_time)
        .execute(&mut *tx)
        .await
        .map_err(AppError::database)?;

        tx.commit().await.map_err(AppError::database)?;

        Ok(batch)
    }

    #[instrument(skip(db))]
    pub async fn get_live_link(
        db: &PgPool,
        user_id: i32,
        course_id: i32,
        batch_id: i32,
    ) -> Result<LiveSessionResponse, AppError> {
        let user: Option<(i32,)> = sqlx::query_as("SELECT id FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(db)
            .await
            .map_err(AppError::database)?;

        if user.is_none() {
            return Err(AppError::not_found(anyhow::anyhow!("Student not found")));
        }

        let batch = Self::find_batch_in_course(db, batch_id, course_id).await?;

        match (batch.live_link, batch.live_start_time) {
            (Some(live_link), Some(live_start_time)) => Ok(LiveSessionResponse {
                message: "Live session details retrieved successfully".to_string(),
                live_link,
                live_start_time,
            }),
            _ => Err(AppError::not_found(anyhow::anyhow!(
                "No live session scheduled for this batch"
            ))),
        }
    }

    /// A teacher's batches with their courses and enrolled students.
    #[instrument(skip(db))]
    pub async fn teacher_roster(
        db: &PgPool,
        teacher_id: i32,
    ) -> Result<Vec<TeacherRosterEntry>, AppError> {
        let rows = sqlx::query_as::<_, RosterRow>(
            "SELECT b.id AS batch_id, b.name AS batch_name,
                    c.id AS course_id, c.name AS course_name,
                    c.description AS course_description,
                    u.id AS student_id, u.name AS student_name, u.email AS student_email
             FROM teacher_batches tb
             JOIN batches b ON b.id = tb.batch_id
             JOIN courses c ON c.id = b.course_id
             LEFT JOIN student_batches sb ON sb.batch_id = b.id
             LEFT JOIN users u ON u.id = sb.student_id
             WHERE tb.teacher_id = $1
             ORDER BY b.id, u.id",
        )
        .bind(teacher_id)
        .fetch_all(db)
        .await
        .map_err(AppError::database)?;

        let mut entries: Vec<TeacherRosterEntry> = Vec::new();

        for row in rows {
            if entries.last().map(|e| e.batch_id) != Some(row.batch_id) {
                entries.push(TeacherRosterEntry {
                    course_id: row.course_id,
                    course_name: row.course_name.clone(),
                    course_description: row.course_description.clone(),
                    batch_id: row.batch_id,
                    batch_name: row.batch_name.clone(),
                    students: Vec::new(),
                });
            }

            if let (Some(id), Some(name), Some(email)) =
                (row.student_id, row.student_name, row.student_email)
            {
                if let Some(entry) = entries.last_mut() {
                    entry.students.push(RosterStudent { id, name, email });
                }
            }
        }

        Ok(entries)
    }

    /// Courses a student reaches through their batch enrollment.
    #[instrument(skip(db))]
    pub async fn student_courses(
        db: &PgPool,
        student_id: i32,
    ) -> Result<Vec<StudentCourse>, AppError> {
        let courses = sqlx::query_as::<_, StudentCourse>(
            "SELECT c.id AS course_id, c.name AS course_name,
                    c.description AS course_description,
                    b.id AS batch_id, b.name AS batch_name
             FROM student_batches sb
             JOIN batches b ON b.id = sb.batch_id
             JOIN courses c ON c.id = b.course_id
             WHERE sb.student_id = $1
             ORDER BY c.id",
        )
        .bind(student_id)
        .fetch_all(db)
        .await
        .map_err(AppError::database)?;

        Ok(courses)
    }

    /// Same lookup for the admin-or-self view; empty is a 404 here.
    #[instrument(skip(db))]
    pub async fn assigned_courses(
        db: &PgPool,
        student_id: i32,
    ) -> Result<Vec<StudentCourse>, AppError> {
        let courses = Self::student_courses(db, student_id).await?;

        if courses.is_empty() {
            return Err(AppError::not_found(anyhow::anyhow!(
                "No courses found for this student"
            )));
        }

        Ok(courses)
    }
}
