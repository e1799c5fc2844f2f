use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;

use crate::modules::batches::service::BatchService;
use crate::modules::lessons::service::LessonService;
use crate::modules::quizzes::model::{
    Answer, AnswerResult, CreateQuestionDto, CreateQuizDto, NewAnswerDto, Question,
    QuestionWithAnswers, Quiz, QuizDetail, QuizResult, StudentQuizView, SubmitAnswerDto,
    UpdateQuestionDto, UpdateQuizDto,
};
use crate::modules::users::model::Role;
use crate::utils::errors::AppError;

const QUIZ_COLUMNS: &str =
    "id, name, description, course_id, module_id, lesson_id, batch_id, created_at, updated_at";

pub struct QuizService;

impl QuizService {
    pub async fn find_quiz(db: &PgPool, quiz_id: i32) -> Result<Quiz, AppError> {
        sqlx::query_as::<_, Quiz>(&format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = $1"))
            .bind(quiz_id)
            .fetch_optional(db)
            .await
            .map_err(AppError::database)?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Quiz not found")))
    }

    /// Teachers may only touch quizzes of batches they serve; staff bypass.
    pub async fn authorize_quiz_access(
        db: &PgPool,
        role: Role,
        user_id: Option<i32>,
        batch_id: i32,
    ) -> Result<(), AppError> {
        if role != Role::Teacher {
            return Ok(());
        }

        let teacher_id = user_id
            .ok_or_else(|| AppError::forbidden(anyhow::anyhow!("Token does not carry a user id")))?;

        let assignment: Option<(i32,)> = sqlx::query_as(
            "SELECT id FROM teacher_batches WHERE teacher_id = $1 AND batch_id = $2",
        )
        .bind(teacher_id)
        .bind(batch_id)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?;

        if assignment.is_none() {
            return Err(AppError::forbidden(anyhow::anyhow!(
                "Teacher not assigned to this batch"
            )));
        }

        Ok(())
    }

    async fn find_question_in_quiz(
        db: &PgPool,
        question_id: i32,
        quiz_id: i32,
    ) -> Result<Question, AppError> {
        sqlx::query_as::<_, Question>(
            "SELECT id, quiz_id, text FROM questions WHERE id = $1 AND quiz_id = $2",
        )
        .bind(question_id)
        .bind(quiz_id)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| {
            AppError::not_found(anyhow::anyhow!("Question not found in the specified quiz"))
        })
    }

    async fn insert_answers(
        tx: &mut Transaction<'_, Postgres>,
        question_id: i32,
        answers: &[NewAnswerDto],
    ) -> Result<(), AppError> {
        for answer in answers {
            sqlx::query("INSERT INTO answers (question_id, text, is_correct) VALUES ($1, $2, $3)")
                .bind(question_id)
                .bind(&answer.text)
                .bind(answer.is_correct)
                .execute(&mut **tx)
                .await
                .map_err(AppError::database)?;
        }
        Ok(())
    }

    #[instrument(skip(db, dto))]
    #[allow(clippy::too_many_arguments)]
    pub async fn create_quiz(
        db: &PgPool,
        course_id: i32,
        batch_id: i32,
        module_id: i32,
        lesson_id: i32,
        role: Role,
        user_id: Option<i32>,
        dto: CreateQuizDto,
    ) -> Result<Quiz, AppError> {
        Self::authorize_quiz_access(db, role, user_id, batch_id).await?;
        LessonService::find_lesson_in_chain(db, lesson_id, module_id, course_id).await?;
        BatchService::find_batch_in_course(db, batch_id, course_id).await?;

        let mut tx = db.begin().await.map_err(AppError::database)?;

        let quiz = sqlx::query_as::<_, Quiz>(&format!(
            "INSERT INTO quizzes (name, description, course_id, module_id, lesson_id, batch_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {QUIZ_COLUMNS}"
        ))
        .bind(&dto.name)
        .bind(&dto.description)
        .bind(course_id)
        .bind(module_id)
        .bind(lesson_id)
        .bind(batch_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::database)?;

        for question in &dto.questions {
            let (question_id,): (i32,) =
                sqlx::query_as("INSERT INTO questions (quiz_id, text) VALUES ($1, $2) RETURNING id")
                    .bind(quiz.id)
                    .bind(&question.text)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(AppError::database)?;

            Self::insert_answers(&mut tx, question_id, &question.answers).await?;
        }

        tx.commit().await.map_err(AppError::database)?;

        Ok(quiz)
    }

    /// Composer update. Existing questions update in place; when an answer
    /// list is supplied, prior answers are replaced wholesale, never merged.
    #[instrument(skip(db, dto))]
    pub async fn update_quiz(
        db: &PgPool,
        quiz_id: i32,
        role: Role,
        user_id: Option<i32>,
        dto: UpdateQuizDto,
    ) -> Result<Quiz, AppError> {
        let quiz = Self::find_quiz(db, quiz_id).await?;
        Self::authorize_quiz_access(db, role, user_id, quiz.batch_id).await?;

        let mut tx = db.begin().await.map_err(AppError::database)?;

        let quiz = sqlx::query_as::<_, Quiz>(&format!(
            "UPDATE quizzes SET
                name = COALESCE($1, name),
                description = COALESCE($2, description),
                updated_at = NOW()
             WHERE id = $3
             RETURNING {QUIZ_COLUMNS}"
        ))
        .bind(&dto.name)
        .bind(&dto.description)
        .bind(quiz_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::database)?;

        for entry in dto.questions.unwrap_or_default() {
            match entry.id {
                Some(question_id) => {
                    let existing: Option<(i32,)> = sqlx::query_as(
                        "SELECT id FROM questions WHERE id = $1 AND quiz_id = $2",
                    )
                    .bind(question_id)
                    .bind(quiz_id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(AppError::database)?;

                    if existing.is_none() {
                        return Err(AppError::not_found(anyhow::anyhow!(
                            "Question not found in the specified quiz"
                        )));
                    }

                    sqlx::query("UPDATE questions SET text = COALESCE($1, text) WHERE id = $2")
                        .bind(&entry.text)
                        .bind(question_id)
                        .execute(&mut *tx)
                        .await
                        .map_err(AppError::database)?;

                    if let Some(answers) = &entry.answers {
                        sqlx::query("DELETE FROM answers WHERE question_id = $1")
                            .bind(question_id)
                            .execute(&mut *tx)
                            .await
                            .map_err(AppError::database)?;

                        Self::insert_answers(&mut tx, question_id, answers).await?;
                    }
                }
                None => {
                    let text = entry.text.clone().ok_or_else(|| {
                        AppError::bad_request(anyhow::anyhow!("New questions require text"))
                    })?;

                    let (question_id,): (i32,) = sqlx::query_as(
                        "INSERT INTO questions (quiz_id, text) VALUES ($1, $2) RETURNING id",
                    )
                    .bind(quiz_id)
                    .bind(&text)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(AppError::database)?;

                    if let Some(answers) = &entry.answers {
                        Self::insert_answers(&mut tx, question_id, answers).await?;
                    }
                }
            }
        }

        tx.commit().await.map_err(AppError::database)?;

        Ok(quiz)
    }

    /// Explicit cascade: answers, then questions, then the quiz, atomically.
    #[instrument(skip(db))]
    pub async fn delete_quiz(
        db: &PgPool,
        quiz_id: i32,
        role: Role,
        user_id: Option<i32>,
    ) -> Result<(), AppError> {
        let quiz = Self::find_quiz(db, quiz_id).await?;
        Self::authorize_quiz_access(db, role, user_id, quiz.batch_id).await?;

        let mut tx = db.begin().await.map_err(AppError::database)?;

        sqlx::query(
            "DELETE FROM answers WHERE question_id IN (SELECT id FROM questions WHERE quiz_id = $1)",
        )
        .bind(quiz_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::database)?;

        sqlx::query("DELETE FROM questions WHERE quiz_id = $1")
            .bind(quiz_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::database)?;

        sqlx::query("DELETE FROM quizzes WHERE id = $1")
            .bind(quiz_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::database)?;

        tx.commit().await.map_err(AppError::database)?;

        Ok(())
    }

    #[instrument(skip(db, dto))]
    pub async fn create_question(
        db: &PgPool,
        quiz_id: i32,
        role: Role,
        user_id: Option<i32>,
        dto: CreateQuestionDto,
    ) -> Result<Question, AppError> {
        let quiz = Self::find_quiz(db, quiz_id).await?;
        Self::authorize_quiz_access(db, role, user_id, quiz.batch_id).await?;

        let mut tx = db.begin().await.map_err(AppError::database)?;

        let question = sqlx::query_as::<_, Question>(
            "INSERT INTO questions (quiz_id, text) VALUES ($1, $2) RETURNING id, quiz_id, text",
        )
        .bind(quiz_id)
        .bind(&dto.text)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::database)?;

        Self::insert_answers(&mut tx, question.id, &dto.answers).await?;

        tx.commit().await.map_err(AppError::database)?;

        Ok(question)
    }

    /// Question update with wholesale answer replacement.
    #[instrument(skip(db, dto))]
    pub async fn update_question(
        db: &PgPool,
        quiz_id: i32,
        question_id: i32,
        role: Role,
        user_id: Option<i32>,
        dto: UpdateQuestionDto,
    ) -> Result<Question, AppError> {
        let question = Self::find_question_in_quiz(db, question_id, quiz_id).await?;
        let quiz = Self::find_quiz(db, quiz_id).await?;
        Self::authorize_quiz_access(db, role, user_id, quiz.batch_id).await?;

        let mut tx = db.begin().await.map_err(AppError::database)?;

        let question = sqlx::query_as::<_, Question>(
            "UPDATE questions SET text = COALESCE($1, text)
             WHERE id = $2
             RETURNING id, quiz_id, text",
        )
        .bind(&dto.text)
        .bind(question.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::database)?;

        if let Some(answers) = &dto.answers {
            sqlx::query("DELETE FROM answers WHERE question_id = $1")
                .bind(question.id)
                .execute(&mut *tx)
                .await
                .map_err(AppError::database)?;

            Self::insert_answers(&mut tx, question.id, answers).await?;
        }

        tx.commit().await.map_err(AppError::database)?;

        Ok(question)
    }

    #[instrument(skip(db))]
    pub async fn delete_question(
        db: &PgPool,
        quiz_id: i32,
        question_id: i32,
        role: Role,
        user_id: Option<i32>,
    ) -> Result<(), AppError> {
        let question = Self::find_question_in_quiz(db, question_id, quiz_id).await?;
        let quiz = Self::find_quiz(db, quiz_id).await?;
        Self::authorize_quiz_access(db, role, user_id, quiz.batch_id).await?;

        let mut tx = db.begin().await.map_err(AppError::database)?;

        sqlx::query("DELETE FROM answers WHERE question_id = $1")
            .bind(question.id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::database)?;

        sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(question.id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::database)?;

        tx.commit().await.map_err(AppError::database)?;

        Ok(())
    }

    async fn load_detail(db: &PgPool, quiz: Quiz) -> Result<QuizDetail, AppError> {
        let questions = sqlx::query_as::<_, Question>(
            "SELECT id, quiz_id, text FROM questions WHERE quiz_id = $1 ORDER BY id",
        )
        .bind(quiz.id)
        .fetch_all(db)
        .await
        .map_err(AppError::database)?;

        let answers = sqlx::query_as::<_, Answer>(
            "SELECT id, question_id, text, is_correct FROM answers
             WHERE question_id IN (SELECT id FROM questions WHERE quiz_id = $1)
             ORDER BY id",
        )
        .bind(quiz.id)
        .fetch_all(db)
        .await
        .map_err(AppError::database)?;

        let questions = questions
            .into_iter()
            .map(|q| {
                let answers = answers
                    .iter()
                    .filter(|a| a.question_id == q.id)
                    .cloned()
                    .collect();
                QuestionWithAnswers {
                    id: q.id,
                    text: q.text,
                    answers,
                }
            })
            .collect();

        Ok(QuizDetail { quiz, questions })
    }

    /// Staff view with correctness flags.
    #[instrument(skip(db))]
    pub async fn staff_view(
        db: &PgPool,
        quiz_id: i32,
        role: Role,
        user_id: Option<i32>,
    ) -> Result<QuizDetail, AppError> {
        let quiz = Self::find_quiz(db, quiz_id).await?;
        Self::authorize_quiz_access(db, role, user_id, quiz.batch_id).await?;
        Self::load_detail(db, quiz).await
    }

    /// Student view: completion-gated and stripped of correctness flags.
    #[instrument(skip(db))]
    pub async fn student_view(
        db: &PgPool,
        quiz_id: i32,
        student_id: i32,
    ) -> Result<StudentQuizView, AppError> {
        let quiz = Self::find_quiz(db, quiz_id).await?;

        let completed = LessonService::is_lesson_completed(db, quiz.lesson_id, student_id).await?;
        if !completed {
            return Err(AppError::forbidden(anyhow::anyhow!(
                "You must complete the lesson before viewing the quiz"
            )));
        }

        let detail = Self::load_detail(db, quiz).await?;
        Ok(StudentQuizView::from_detail(detail))
    }

    /// A student's running result for a quiz. Absent until the first answer
    /// is submitted.
    #[instrument(skip(db))]
    pub async fn quiz_result(
        db: &PgPool,
        quiz_id: i32,
        student_id: i32,
    ) -> Result<QuizResult, AppError> {
        Self::find_quiz(db, quiz_id).await?;

        sqlx::query_as::<_, QuizResult>(
            "SELECT id, student_id, quiz_id, score, submitted_at FROM quiz_results
             WHERE student_id = $1 AND quiz_id = $2",
        )
        .bind(student_id)
        .bind(quiz_id)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| {
            AppError::not_found(anyhow::anyhow!("No result recorded for this quiz yet"))
        })
    }

    /// Answer submission. Correct answers add one point to the running
    /// per-(student, quiz) score; resubmitting the same question scores
    /// again by design (documented accumulation semantics).
    #[instrument(skip(db, dto))]
    pub async fn submit_answer(
        db: &PgPool,
        quiz_id: i32,
        question_id: i32,
        student_id: i32,
        dto: SubmitAnswerDto,
    ) -> Result<AnswerResult, AppError> {
        let quiz = Self::find_quiz(db, quiz_id).await?;

        let completed = LessonService::is_lesson_completed(db, quiz.lesson_id, student_id).await?;
        if !completed {
            return Err(AppError::forbidden(anyhow::anyhow!(
                "You must complete the lesson before submitting answers"
            )));
        }

        Self::find_question_in_quiz(db, question_id, quiz_id).await?;

        let answer = sqlx::query_as::<_, Answer>(
            "SELECT id, question_id, text, is_correct FROM answers WHERE id = $1",
        )
        .bind(dto.selected_answer_id)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::bad_request(anyhow::anyhow!("Answer not found")))?;

        if answer.question_id != question_id {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Selected answer does not belong to the given question"
            )));
        }

        // lazily create the result row at score 0
        sqlx::query(
            "INSERT INTO quiz_results (student_id, quiz_id, score) VALUES ($1, $2, 0)
             ON CONFLICT (student_id, quiz_id) DO NOTHING",
        )
        .bind(student_id)
        .bind(quiz_id)
        .execute(db)
        .await
        .map_err(AppError::database)?;

        let (score,): (i32,) = if answer.is_correct {
            sqlx::query_as(
                "UPDATE quiz_results SET score = score + 1, submitted_at = NOW()
                 WHERE student_id = $1 AND quiz_id = $2
                 RETURNING score",
            )
            .bind(student_id)
            .bind(quiz_id)
            .fetch_one(db)
            .await
            .map_err(AppError::database)?
        } else {
            sqlx::query_as(
                "SELECT score FROM quiz_results WHERE student_id = $1 AND quiz_id = $2",
            )
            .bind(student_id)
            .bind(quiz_id)
            .fetch_one(db)
            .await
            .map_err(AppError::database)?
        };

        crate::metrics::track_quiz_answer(answer.is_correct);

        Ok(AnswerResult {
            message: if answer.is_correct {
                "Correct answer!".to_string()
            } else {
                "Incorrect answer!".to_string()
            },
            score,
            is_correct: answer.is_correct,
        })
    }
}

/// Pure scoring rule: correct answers accumulate with no per-question dedup.
pub fn apply_answer_to_score(score: i32, is_correct: bool) -> i32 {
    if is_correct { score + 1 } else { score }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_answers_accumulate() {
        let score = apply_answer_to_score(0, true);
        assert_eq!(score, 1);
        // the same correct answer submitted twice scores twice
        let score = apply_answer_to_score(score, true);
        assert_eq!(score, 2);
    }

    #[test]
    fn test_incorrect_answers_do_not_change_score() {
        assert_eq!(apply_answer_to_score(3, false), 3);
        assert_eq!(apply_answer_to_score(0, false), 0);
    }
}
