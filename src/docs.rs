use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::modules::assignments::controller as assignments;
use crate::modules::auth::controller as auth;
use crate::modules::batches::controller as batches;
use crate::modules::course_modules::controller as course_modules;
use crate::modules::courses::controller as courses;
use crate::modules::lessons::controller as lessons;
use crate::modules::notifications::controller as notifications;
use crate::modules::quizzes::controller as quizzes;
use crate::modules::users::controller as users;

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register_user,
        auth::login_user,
        auth::superadmin_login,
        auth::logout_user,
        auth::forgot_password,
        auth::reset_password,
        users::list_users,
        users::approve_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        users::bulk_import_users,
        courses::create_course,
        courses::update_course,
        courses::delete_course,
        courses::list_courses,
        course_modules::create_module,
        course_modules::update_module,
        course_modules::delete_module,
        course_modules::list_modules_in_course,
        course_modules::list_modules_for_student,
        lessons::create_lesson,
        lessons::update_lesson,
        lessons::delete_lesson,
        lessons::upload_lesson_file,
        lessons::create_lesson_request,
        lessons::update_lesson_request,
        lessons::delete_lesson_request,
        lessons::approve_lesson,
        lessons::reject_lesson,
        lessons::list_pending_lessons,
        lessons::list_lessons,
        lessons::list_approved_lessons,
        lessons::complete_lesson,
        lessons::submit_feedback,
        lessons::list_feedback,
        batches::create_batch,
        batches::update_batch,
        batches::delete_batch,
        batches::assign_user_to_batch,
        batches::remove_user_from_batch,
        batches::post_live_link,
        batches::get_live_link,
        batches::teacher_roster,
        batches::student_courses,
        batches::assigned_courses,
        assignments::create_assignment,
        assignments::update_assignment,
        assignments::delete_assignment,
        assignments::submit_assignment,
        assignments::post_submission_feedback,
        assignments::get_submission_feedback,
        quizzes::create_quiz,
        quizzes::update_quiz,
        quizzes::delete_quiz,
        quizzes::view_quiz,
        quizzes::create_question,
        quizzes::update_question,
        quizzes::delete_question,
        quizzes::view_quiz_student,
        quizzes::quiz_result,
        quizzes::submit_answer,
        notifications::list_notifications,
        notifications::mark_notification_read,
    ),
    components(schemas(
        crate::modules::auth::controller::ErrorResponse,
        crate::modules::auth::model::RegisterRequest,
        crate::modules::auth::model::LoginRequest,
        crate::modules::auth::model::LoginResponse,
        crate::modules::auth::model::ForgotPasswordRequest,
        crate::modules::auth::model::ResetPasswordRequest,
        crate::modules::auth::model::MessageResponse,
        crate::modules::users::model::Role,
        crate::modules::users::model::User,
        crate::modules::users::model::CreateUserDto,
        crate::modules::users::model::UpdateUserDto,
        crate::modules::users::model::ApproveUserDto,
        crate::modules::users::model::ImportRowResult,
        crate::modules::users::model::ImportRowStatus,
        crate::modules::users::model::BulkImportResponse,
        crate::modules::courses::model::Course,
        crate::modules::courses::model::CreateCourseDto,
        crate::modules::courses::model::UpdateCourseDto,
        crate::modules::course_modules::model::CourseModule,
        crate::modules::course_modules::model::CreateModuleDto,
        crate::modules::course_modules::model::UpdateModuleDto,
        crate::modules::lessons::model::LessonStatus,
        crate::modules::lessons::model::Lesson,
        crate::modules::lessons::model::CreateLessonDto,
        crate::modules::lessons::model::UpdateLessonDto,
        crate::modules::lessons::model::CompleteLessonDto,
        crate::modules::lessons::model::LessonFeedback,
        crate::modules::lessons::model::SubmitFeedbackDto,
        crate::modules::batches::model::Batch,
        crate::modules::batches::model::CreateBatchDto,
        crate::modules::batches::model::UpdateBatchDto,
        crate::modules::batches::model::AssignUserDto,
        crate::modules::batches::model::PostLiveLinkDto,
        crate::modules::batches::model::LiveSessionResponse,
        crate::modules::batches::model::RosterStudent,
        crate::modules::batches::model::TeacherRosterEntry,
        crate::modules::batches::model::StudentCourse,
        crate::modules::assignments::model::Assignment,
        crate::modules::assignments::model::CreateAssignmentDto,
        crate::modules::assignments::model::UpdateAssignmentDto,
        crate::modules::assignments::model::AssignmentSubmission,
        crate::modules::assignments::model::PostFeedbackDto,
        crate::modules::quizzes::model::Quiz,
        crate::modules::quizzes::model::Question,
        crate::modules::quizzes::model::Answer,
        crate::modules::quizzes::model::NewAnswerDto,
        crate::modules::quizzes::model::NewQuestionDto,
        crate::modules::quizzes::model::CreateQuizDto,
        crate::modules::quizzes::model::QuestionUpsertDto,
        crate::modules::quizzes::model::UpdateQuizDto,
        crate::modules::quizzes::model::CreateQuestionDto,
        crate::modules::quizzes::model::UpdateQuestionDto,
        crate::modules::quizzes::model::SubmitAnswerDto,
        crate::modules::quizzes::model::QuestionWithAnswers,
        crate::modules::quizzes::model::QuizDetail,
        crate::modules::quizzes::model::StudentAnswer,
        crate::modules::quizzes::model::StudentQuestion,
        crate::modules::quizzes::model::StudentQuizView,
        crate::modules::quizzes::model::QuizResult,
        crate::modules::quizzes::model::AnswerResult,
        crate::modules::notifications::model::Notification,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and password reset"),
        (name = "Users", description = "User management and approval"),
        (name = "Courses", description = "Course management"),
        (name = "Modules", description = "Course module management"),
        (name = "Lessons", description = "Lesson authoring, moderation and completion"),
        (name = "Batches", description = "Batches, enrollment and live sessions"),
        (name = "Assignments", description = "Assignments, submissions and grading"),
        (name = "Quizzes", description = "Quizzes, questions and scoring"),
        (name = "Notifications", description = "Live session reminders"),
    ),
    info(
        title = "Cohortly API",
        description = "Role-based learning management backend",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
