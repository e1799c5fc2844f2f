//! User data models and DTOs.
//!
//! The [`Role`] enum is the backbone of the authorization layer: every
//! protected operation declares the set of roles it accepts, and the single
//! gate in `middleware::role` checks the authenticated role against it.
//!
//! # Roles
//!
//! | Role | Scope |
//! |------|-------|
//! | Superadmin | Configured identity (env), full access |
//! | Admin | Content/course/user management |
//! | Teacher | Lesson authoring, quizzes, grading |
//! | Student | Consumption and submission |

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// System role, stored as the `user_role` Postgres enum.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Superadmin,
    Admin,
    Teacher,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Superadmin => "superadmin",
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "superadmin" => Some(Role::Superadmin),
            "admin" => Some(Role::Admin),
            "teacher" => Some(Role::Teacher),
            "student" => Some(Role::Student),
            _ => None,
        }
    }

    /// Approval capability: superadmins may approve a user into any
    /// non-superadmin role, admins only into teacher/student.
    pub fn can_approve_into(&self, target: Role) -> bool {
        match self {
            Role::Superadmin => matches!(target, Role::Admin | Role::Teacher | Role::Student),
            Role::Admin => matches!(target, Role::Teacher | Role::Student),
            _ => false,
        }
    }

    /// Roles that can be placed into a batch.
    pub fn is_enrollable(&self) -> bool {
        matches!(self, Role::Teacher | Role::Student)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user row, without the password hash.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub role: Role,
    pub approved: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// DTO for staff-created users. Staff may pre-approve the account.
#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateUserDto {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "a valid email is required"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    pub phone_number: Option<String>,
    pub role: Option<Role>,
    pub approved: Option<bool>,
}

/// DTO for partial user updates. Password changes are re-hashed.
#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct UpdateUserDto {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "a valid email is required"))]
    pub email: Option<String>,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: Option<String>,
    pub phone_number: Option<String>,
    pub role: Option<Role>,
    pub approved: Option<bool>,
}

/// Approval request: the target user id and the role they are approved into.
#[derive(Deserialize, Debug, Clone, ToSchema)]
pub struct ApproveUserDto {
    pub id: i32,
    pub role: Role,
}

/// Per-row outcome of a bulk import. One bad row never aborts the batch.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct ImportRowResult {
    pub email: String,
    pub status: ImportRowStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ImportRowStatus {
    Success,
    Skipped,
    Failed,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct BulkImportResponse {
    pub message: String,
    pub results: Vec<ImportRowResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_round_trip() {
        for role in [Role::Superadmin, Role::Admin, Role::Teacher, Role::Student] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("principal"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn test_approval_capability_matrix() {
        // superadmin approves any non-superadmin role
        assert!(Role::Superadmin.can_approve_into(Role::Admin));
        assert!(Role::Superadmin.can_approve_into(Role::Teacher));
        assert!(Role::Superadmin.can_approve_into(Role::Student));
        assert!(!Role::Superadmin.can_approve_into(Role::Superadmin));

        // admin approves only teacher/student
        assert!(!Role::Admin.can_approve_into(Role::Admin));
        assert!(Role::Admin.can_approve_into(Role::Teacher));
        assert!(Role::Admin.can_approve_into(Role::Student));

        // nobody else approves anyone
        for target in [Role::Superadmin, Role::Admin, Role::Teacher, Role::Student] {
            assert!(!Role::Teacher.can_approve_into(target));
            assert!(!Role::Student.can_approve_into(target));
        }
    }

    #[test]
    fn test_enrollable_roles() {
        assert!(Role::Student.is_enrollable());
        assert!(Role::Teacher.is_enrollable());
        assert!(!Role::Admin.is_enrollable());
        assert!(!Role::Superadmin.is_enrollable());
    }

    #[test]
    fn test_role_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Teacher).unwrap(), "\"teacher\"");
        let parsed: Role = serde_json::from_str("\"superadmin\"").unwrap();
        assert_eq!(parsed, Role::Superadmin);
    }
}
