//! Development seeder: fake courses, modules, lessons, batches and users.
//!
//! Seeded accounts all share the password `password123` so they can be used
//! against the login endpoint directly.

use fake::Fake;
use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::{Paragraph, Sentence};
use fake::faker::name::en::Name;
use rand::Rng;
use rand::seq::SliceRandom;
use sqlx::PgPool;

use crate::utils::password::hash_password;

pub const SEED_PASSWORD: &str = "password123";

#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub courses: usize,
    pub modules_per_course: usize,
    pub lessons_per_module: usize,
    pub batches_per_course: usize,
    pub teachers: usize,
    pub students: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            courses: 3,
            modules_per_course: 4,
            lessons_per_module: 3,
            batches_per_course: 2,
            teachers: 5,
            students: 40,
        }
    }
}

pub async fn seed_all(pool: &PgPool, config: SeedConfig) -> Result<(), sqlx::Error> {
    let password = hash_password(SEED_PASSWORD).expect("Failed to hash seed password");

    let mut batch_ids: Vec<i32> = Vec::new();

    for c in 0..config.courses {
        let course_name: String = Sentence(2..4).fake();
        let (course_id,): (i32,) = sqlx::query_as(
            "INSERT INTO courses (name, description) VALUES ($1, $2) RETURNING id",
        )
        .bind(course_name.trim_end_matches('.'))
        .bind(Paragraph(1..3).fake::<String>())
        .fetch_one(pool)
        .await?;

        for m in 0..config.modules_per_course {
            let (module_id,): (i32,) = sqlx::query_as(
                "INSERT INTO modules (course_id, title, content) VALUES ($1, $2, $3) RETURNING id",
            )
            .bind(course_id)
            .bind(format!("Module {}", m + 1))
            .bind(Paragraph(2..4).fake::<String>())
            .fetch_one(pool)
            .await?;

            for l in 0..config.lessons_per_module {
                sqlx::query(
                    "INSERT INTO lessons (module_id, course_id, title, content, status)
                     VALUES ($1, $2, $3, $4, 'approved')",
                )
                .bind(module_id)
                .bind(course_id)
                .bind(format!("Lesson {}.{}", m + 1, l + 1))
                .bind(Paragraph(3..6).fake::<String>())
                .execute(pool)
                .await?;
            }
        }

        for b in 0..config.batches_per_course {
            let (batch_id,): (i32,) = sqlx::query_as(
                "INSERT INTO batches (course_id, name, start_date, end_date)
                 VALUES ($1, $2, NOW(), NOW() + INTERVAL '90 days')
                 RETURNING id",
            )
            .bind(course_id)
            .bind(format!("Course {} Batch {}", c + 1, b + 1))
            .fetch_one(pool)
            .await?;
            batch_ids.push(batch_id);
        }
    }

    let mut rng = rand::thread_rng();

    for i in 0..config.teachers {
        let (teacher_id,): (i32,) = sqlx::query_as(
            "INSERT INTO users (name, email, password, role, approved)
             VALUES ($1, $2, $3, 'teacher', TRUE)
             RETURNING id",
        )
        .bind(Name().fake::<String>())
        .bind(format!("teacher{}-{}", i + 1, SafeEmail().fake::<String>()))
        .bind(&password)
        .fetch_one(pool)
        .await?;

        // teachers may serve several batches
        let assignments = if batch_ids.len() < 2 {
            batch_ids.len()
        } else {
            rng.gen_range(1..=2)
        };
        for batch_id in batch_ids.choose_multiple(&mut rng, assignments) {
            sqlx::query(
                "INSERT INTO teacher_batches (teacher_id, batch_id) VALUES ($1, $2)
                 ON CONFLICT (teacher_id, batch_id) DO NOTHING",
            )
            .bind(teacher_id)
            .bind(batch_id)
            .execute(pool)
            .await?;
        }
    }

    for i in 0..config.students {
        let (student_id,): (i32,) = sqlx::query_as(
            "INSERT INTO users (name, email, password, role, approved)
             VALUES ($1, $2, $3, 'student', TRUE)
             RETURNING id",
        )
        .bind(Name().fake::<String>())
        .bind(format!("student{}-{}", i + 1, SafeEmail().fake::<String>()))
        .bind(&password)
        .fetch_one(pool)
        .await?;

        // one batch per student, system-wide
        if let Some(batch_id) = batch_ids.choose(&mut rng) {
            sqlx::query(
                "INSERT INTO student_batches (student_id, batch_id) VALUES ($1, $2)
                 ON CONFLICT (student_id) DO NOTHING",
            )
            .bind(student_id)
            .bind(batch_id)
            .execute(pool)
            .await?;
        }
    }

    println!(
        "✅ Seeded {} courses, {} batches, {} teachers, {} students (password: {})",
        config.courses,
        batch_ids.len(),
        config.teachers,
        config.students,
        SEED_PASSWORD
    );

    Ok(())
}

/// Remove everything the seeder created. Ordering follows the foreign keys.
pub async fn clear_all(pool: &PgPool) -> Result<(), sqlx::Error> {
    for table in [
        "notifications",
        "quiz_results",
        "answers",
        "questions",
        "quizzes",
        "assignment_submissions",
        "assignments",
        "lesson_feedback",
        "lesson_completions",
        "student_batches",
        "teacher_batches",
        "lessons",
        "modules",
        "batches",
        "courses",
        "users",
    ] {
        sqlx::query(&format!("DELETE FROM {table}"))
            .execute(pool)
            .await?;
    }

    println!("✅ Cleared seeded data");
    Ok(())
}
