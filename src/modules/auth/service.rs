use sqlx::PgPool;
use tracing::instrument;

use crate::config::jwt::JwtConfig;
use crate::config::superadmin::SuperadminConfig;
use crate::modules::users::model::Role;
use crate::utils::errors::AppError;
use crate::utils::jwt::{create_access_token, create_reset_token, verify_reset_token};
use crate::utils::password::{hash_password, verify_password};

use super::model::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, RegisterRequest, ResetPasswordRequest,
};

#[derive(sqlx::FromRow)]
struct UserCredentials {
    id: i32,
    password: String,
    role: Role,
    approved: bool,
}

pub struct AuthService;

impl AuthService {
    #[instrument(skip(db, dto))]
    pub async fn register_user(db: &PgPool, dto: RegisterRequest) -> Result<(), AppError> {
        let role = match &dto.role {
            Some(raw) => Role::parse(raw)
                .ok_or_else(|| AppError::bad_request(anyhow::anyhow!("Invalid role")))?,
            None => Role::Student,
        };

        let existing: Option<(i32,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
            .bind(&dto.email)
            .fetch_optional(db)
            .await
            .map_err(AppError::database)?;

        if existing.is_some() {
            return Err(AppError::conflict(anyhow::anyhow!("User already registered")));
        }

        let hashed_password = hash_password(&dto.password)?;

        // Self-registered accounts stay unusable until approval.
        sqlx::query(
            "INSERT INTO users (name, email, password, phone_number, role, approved)
             VALUES ($1, $2, $3, $4, $5, FALSE)",
        )
        .bind(&dto.name)
        .bind(&dto.email)
        .bind(&hashed_password)
        .bind(&dto.phone_number)
        .bind(role)
        .execute(db)
        .await
        .map_err(AppError::database)?;

        crate::metrics::track_user_registered(role.as_str());

        Ok(())
    }

    #[instrument(skip(db, dto, jwt_config))]
    pub async fn login_user(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let user = sqlx::query_as::<_, UserCredentials>(
            "SELECT id, password, role, approved FROM users WHERE email = $1",
        )
        .bind(&dto.email)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))?;

        if !user.approved {
            return Err(AppError::forbidden(anyhow::anyhow!(
                "Account not approved by an administrator"
            )));
        }

        let is_valid = verify_password(&dto.password, &user.password)?;
        if !is_valid {
            crate::metrics::track_user_login(user.role.as_str(), false);
            return Err(AppError::unauthorized(anyhow::anyhow!("Invalid credentials")));
        }

        let token = create_access_token(Some(user.id), user.role, jwt_config)?;
        crate::metrics::track_user_login(user.role.as_str(), true);

        Ok(LoginResponse {
            message: "Login successful".to_string(),
            token,
        })
    }

    #[instrument(skip(dto, superadmin_config, jwt_config))]
    pub async fn superadmin_login(
        dto: LoginRequest,
        superadmin_config: &SuperadminConfig,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        if dto.email != superadmin_config.email {
            return Err(AppError::not_found(anyhow::anyhow!("User not found")));
        }

        if superadmin_config.password_hash.is_empty() {
            return Err(AppError::internal(anyhow::anyhow!(
                "SUPERADMIN_PASSWORD_HASH is not configured"
            )));
        }

        let is_valid = verify_password(&dto.password, &superadmin_config.password_hash)?;
        if !is_valid {
            return Err(AppError::unauthorized(anyhow::anyhow!("Invalid credentials")));
        }

        // Configured identity: role-only token, no subject.
        let token = create_access_token(None, Role::Superadmin, jwt_config)?;
        crate::metrics::track_user_login(Role::Superadmin.as_str(), true);

        Ok(LoginResponse {
            message: "Login successful".to_string(),
            token,
        })
    }

    #[instrument(skip(db, dto, jwt_config, email_service))]
    pub async fn forgot_password(
        db: &PgPool,
        dto: ForgotPasswordRequest,
        jwt_config: &JwtConfig,
        email_service: &crate::utils::email::EmailService,
        email_enabled: bool,
    ) -> Result<(), AppError> {
        let user: Option<(i32, String)> =
            sqlx::query_as("SELECT id, name FROM users WHERE email = $1")
                .bind(&dto.email)
                .fetch_optional(db)
                .await
                .map_err(AppError::database)?;

        let (user_id, name) = user
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User with this email not found")))?;

        let reset_token = create_reset_token(user_id, jwt_config)?;

        if email_enabled {
            email_service
                .send_password_reset_email(&dto.email, &name, &reset_token)
                .await?;
        } else {
            tracing::warn!(email = %dto.email, "SMTP disabled; skipping password reset email");
        }

        Ok(())
    }

    #[instrument(skip(db, dto, jwt_config))]
    pub async fn reset_password(
        db: &PgPool,
        dto: ResetPasswordRequest,
        jwt_config: &JwtConfig,
    ) -> Result<(), AppError> {
        let claims = verify_reset_token(&dto.token, jwt_config)?;

        let existing: Option<(i32,)> = sqlx::query_as("SELECT id FROM users WHERE id = $1")
            .bind(claims.sub)
            .fetch_optional(db)
            .await
            .map_err(AppError::database)?;

        if existing.is_none() {
            return Err(AppError::not_found(anyhow::anyhow!("User not found")));
        }

        let hashed_password = hash_password(&dto.new_password)?;

        sqlx::query("UPDATE users SET password = $1, updated_at = NOW() WHERE id = $2")
            .bind(&hashed_password)
            .bind(claims.sub)
            .execute(db)
            .await
            .map_err(AppError::database)?;

        Ok(())
    }
}
