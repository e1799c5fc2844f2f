use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::modules::auth::model::Claims;
use crate::modules::users::model::Role;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::verify_token;

/// Extractor that validates the bearer token and exposes the caller's claims.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// The caller's role, parsed from the token.
    pub fn role(&self) -> Result<Role, AppError> {
        Role::parse(&self.0.role)
            .ok_or_else(|| AppError::unauthorized(anyhow::anyhow!("Invalid role in token")))
    }

    /// The caller's user id. Superadmin tokens carry none, so operations
    /// that need a stored subject reject them here.
    pub fn user_id(&self) -> Result<i32, AppError> {
        self.0
            .sub
            .ok_or_else(|| AppError::forbidden(anyhow::anyhow!("Token does not carry a user id")))
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    AppError::unauthorized(anyhow::anyhow!("Authorization token required"))
                })?;

        let claims = verify_token(bearer.token(), &state.jwt_config)?;

        Ok(AuthUser(claims))
    }
}
