pub mod assignments;
pub mod auth;
pub mod batches;
pub mod course_modules;
pub mod courses;
pub mod lessons;
pub mod notifications;
pub mod quizzes;
pub mod users;

pub use self::auth::model::Claims;
pub use self::users::model::{Role, User};
