//! Declarative role gate.
//!
//! Every protected sub-router is layered with one of the named wrappers
//! below; each wrapper is just [`require_roles`] with a static allowed set.
//! Handlers that need finer checks (ownership, approval capability) resolve
//! the role once via [`check_any_role`] instead of comparing strings inline.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::middleware::auth::AuthUser;
use crate::modules::users::model::Role;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub const STAFF: &[Role] = &[Role::Superadmin, Role::Admin];
pub const TEACHING_STAFF: &[Role] = &[Role::Superadmin, Role::Admin, Role::Teacher];
pub const TEACHER_ONLY: &[Role] = &[Role::Teacher];
pub const STUDENT_ONLY: &[Role] = &[Role::Student];

/// Checks that the authenticated caller holds one of `allowed_roles`.
pub async fn require_roles(
    State(state): State<AppState>,
    req: Request,
    next: Next,
    allowed_roles: &'static [Role],
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await?;
    let user_role = auth_user.role()?;

    if !allowed_roles.contains(&user_role) {
        return Err(AppError::forbidden(anyhow::anyhow!(
            "Access denied. Required roles: {:?}, but user has role: {}",
            allowed_roles,
            user_role
        )));
    }

    let req = Request::from_parts(parts, body);
    Ok(next.run(req).await)
}

/// Superadmin or admin routes (course, module, batch and user management).
pub async fn require_staff(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(State(state), req, next, STAFF).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Routes open to superadmin, admin and teacher (quizzes, assignments,
/// live links).
pub async fn require_teaching_staff(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    match require_roles(State(state), req, next, TEACHING_STAFF).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Teacher-only routes (lesson authoring requests, rosters).
pub async fn require_teacher(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(State(state), req, next, TEACHER_ONLY).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Student-only routes (consumption, submission).
pub async fn require_student(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(State(state), req, next, STUDENT_ONLY).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// In-handler role check; returns the resolved role so callers can branch
/// on it without re-parsing.
pub fn check_any_role(auth_user: &AuthUser, allowed_roles: &[Role]) -> Result<Role, AppError> {
    let user_role = auth_user.role()?;

    if !allowed_roles.contains(&user_role) {
        return Err(AppError::forbidden(anyhow::anyhow!(
            "Access denied. Required roles: {:?}, but user has role: {}",
            allowed_roles,
            user_role
        )));
    }

    Ok(user_role)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::auth::model::Claims;

    fn auth_user(role: &str) -> AuthUser {
        AuthUser(Claims {
            sub: Some(1),
            role: role.to_string(),
            exp: 9999999999,
            iat: 1234567890,
        })
    }

    #[test]
    fn test_check_any_role_allows_members() {
        assert_eq!(
            check_any_role(&auth_user("admin"), STAFF).unwrap(),
            Role::Admin
        );
        assert_eq!(
            check_any_role(&auth_user("superadmin"), STAFF).unwrap(),
            Role::Superadmin
        );
        assert_eq!(
            check_any_role(&auth_user("teacher"), TEACHING_STAFF).unwrap(),
            Role::Teacher
        );
    }

    #[test]
    fn test_check_any_role_rejects_outsiders() {
        assert!(check_any_role(&auth_user("student"), STAFF).is_err());
        assert!(check_any_role(&auth_user("teacher"), STAFF).is_err());
        assert!(check_any_role(&auth_user("student"), TEACHING_STAFF).is_err());
        assert!(check_any_role(&auth_user("admin"), STUDENT_ONLY).is_err());
    }

    #[test]
    fn test_check_any_role_rejects_unknown_role() {
        assert!(check_any_role(&auth_user("janitor"), TEACHING_STAFF).is_err());
    }

    #[test]
    fn test_empty_allowed_set_rejects_everyone() {
        assert!(check_any_role(&auth_user("superadmin"), &[]).is_err());
    }
}
