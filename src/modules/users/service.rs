use sqlx::PgPool;
use tracing::instrument;

use crate::modules::users::model::{
    ApproveUserDto, CreateUserDto, ImportRowResult, ImportRowStatus, Role, UpdateUserDto, User,
};
use crate::utils::errors::AppError;
use crate::utils::password::hash_password;
use crate::utils::spreadsheet::ImportRow;

const USER_COLUMNS: &str =
    "id, name, email, phone_number, role, approved, created_at, updated_at";

pub struct UserService;

impl UserService {
    /// Dashboard listing: superadmins see everyone, admins see students
    /// and teachers only.
    #[instrument(skip(db))]
    pub async fn list_users(db: &PgPool, viewer_role: Role) -> Result<Vec<User>, AppError> {
        let users = match viewer_role {
            Role::Superadmin => {
                sqlx::query_as::<_, User>(&format!(
                    "SELECT {USER_COLUMNS} FROM users ORDER BY id"
                ))
                .fetch_all(db)
                .await
            }
            Role::Admin => {
                sqlx::query_as::<_, User>(&format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE role IN ('student', 'teacher') ORDER BY id"
                ))
                .fetch_all(db)
                .await
            }
            _ => {
                return Err(AppError::forbidden(anyhow::anyhow!(
                    "Only superadmins or admins can view the dashboard"
                )));
            }
        }
        .map_err(AppError::database)?;

        Ok(users)
    }

    /// Approve a user into a role, subject to the approver's capability.
    #[instrument(skip(db))]
    pub async fn approve_user(
        db: &PgPool,
        approver_role: Role,
        dto: ApproveUserDto,
    ) -> Result<User, AppError> {
        if dto.role == Role::Superadmin {
            return Err(AppError::bad_request(anyhow::anyhow!("Invalid role provided")));
        }

        if !approver_role.can_approve_into(dto.role) {
            return Err(AppError::forbidden(anyhow::anyhow!(
                "{}s cannot approve users into the {} role",
                approver_role,
                dto.role
            )));
        }

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET approved = TRUE, role = $1, updated_at = NOW()
             WHERE id = $2
             RETURNING {USER_COLUMNS}"
        ))
        .bind(dto.role)
        .bind(dto.id)
        .fetch_optional(db)
        .await
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))?;

        Ok(user)
    }

    #[instrument(skip(db, dto))]
    pub async fn create_user(db: &PgPool, dto: CreateUserDto) -> Result<User, AppError> {
        let existing: Option<(i32,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
            .bind(&dto.email)
            .fetch_optional(db)
            .await
            .map_err(AppError::database)?;

        if existing.is_some() {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "User with this email already exists"
            )));
        }

        let hashed_password = hash_password(&dto.password)?;
        let role = dto.role.unwrap_or(Role::Student);
        let approved = dto.approved.unwrap_or(false);

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, email, password, phone_number, role, approved)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&dto.name)
        .bind(&dto.email)
        .bind(&hashed_password)
        .bind(&dto.phone_number)
        .bind(role)
        .bind(approved)
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        Ok(user)
    }

    #[instrument(skip(db, dto))]
    pub async fn update_user(
        db: &PgPool,
        user_id: i32,
        dto: UpdateUserDto,
    ) -> Result<User, AppError> {
        let existing: Option<(i32,)> = sqlx::query_as("SELECT id FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(db)
            .await
            .map_err(AppError::database)?;

        if existing.is_none() {
            return Err(AppError::not_found(anyhow::anyhow!("User not found")));
        }

        let hashed_password = match &dto.password {
            Some(password) => Some(hash_password(password)?),
            None => None,
        };

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET
                name = COALESCE($1, name),
                email = COALESCE($2, email),
                password = COALESCE($3, password),
                phone_number = COALESCE($4, phone_number),
                role = COALESCE($5, role),
                approved = COALESCE($6, approved),
                updated_at = NOW()
             WHERE id = $7
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&dto.name)
        .bind(&dto.email)
        .bind(&hashed_password)
        .bind(&dto.phone_number)
        .bind(dto.role)
        .bind(dto.approved)
        .bind(user_id)
        .fetch_one(db)
        .await
        .map_err(AppError::database)?;

        Ok(user)
    }

    #[instrument(skip(db))]
    pub async fn delete_user(db: &PgPool, user_id: i32) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(db)
            .await
            .map_err(AppError::database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("User not found")));
        }

        Ok(())
    }

    /// Import spreadsheet rows one at a time; each row gets its own outcome
    /// and a failure never aborts the rest of the batch.
    #[instrument(skip(db, rows))]
    pub async fn bulk_import(db: &PgPool, rows: Vec<ImportRow>) -> Vec<ImportRowResult> {
        let mut results = Vec::with_capacity(rows.len());

        for row in rows {
            let email = row.email.clone().unwrap_or_default();

            let (name, email_value, password, role) = match validate_import_row(&row) {
                Ok(validated) => validated,
                Err(reason) => {
                    results.push(ImportRowResult {
                        email,
                        status: ImportRowStatus::Skipped,
                        reason: Some(reason),
                    });
                    continue;
                }
            };

            match Self::import_row(db, name, email_value, password, role, row.phone_number.clone())
                .await
            {
                Ok(outcome) => results.push(outcome),
                Err(err) => results.push(ImportRowResult {
                    email,
                    status: ImportRowStatus::Failed,
                    reason: Some(err.error.to_string()),
                }),
            }
        }

        results
    }

    async fn import_row(
        db: &PgPool,
        name: String,
        email: String,
        password: String,
        role: Role,
        phone_number: Option<String>,
    ) -> Result<ImportRowResult, AppError> {
        let existing: Option<(i32,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
            .bind(&email)
            .fetch_optional(db)
            .await
            .map_err(AppError::database)?;

        if existing.is_some() {
            return Ok(ImportRowResult {
                email,
                status: ImportRowStatus::Skipped,
                reason: Some("User already exists".to_string()),
            });
        }

        let hashed_password = hash_password(&password)?;

        // Bulk-imported accounts are usable immediately.
        sqlx::query(
            "INSERT INTO users (name, email, password, phone_number, role, approved)
             VALUES ($1, $2, $3, $4, $5, TRUE)",
        )
        .bind(&name)
        .bind(&email)
        .bind(&hashed_password)
        .bind(&phone_number)
        .bind(role)
        .execute(db)
        .await
        .map_err(AppError::database)?;

        Ok(ImportRowResult {
            email,
            status: ImportRowStatus::Success,
            reason: None,
        })
    }
}

/// Row-level validation for the bulk import: name, email and a non-blank
/// password are required; the role must be a known role when present.
fn validate_import_row(row: &ImportRow) -> Result<(String, String, String, Role), String> {
    let name = row
        .name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "Invalid input".to_string())?;

    let email = row
        .email
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "Invalid input".to_string())?;

    let password = row
        .password
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| "Invalid input".to_string())?;

    let role = match row.role.as_deref() {
        Some(raw) => Role::parse(raw).ok_or_else(|| "Invalid role".to_string())?,
        None => Role::Student,
    };

    Ok((
        name.to_string(),
        email.to_string(),
        password.to_string(),
        role,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, email: &str, password: &str, role: Option<&str>) -> ImportRow {
        ImportRow {
            name: (!name.is_empty()).then(|| name.to_string()),
            email: (!email.is_empty()).then(|| email.to_string()),
            password: (!password.is_empty()).then(|| password.to_string()),
            role: role.map(str::to_string),
            phone_number: None,
        }
    }

    #[test]
    fn test_valid_row_defaults_to_student() {
        let (_, _, _, role) =
            validate_import_row(&row("Ada", "ada@example.com", "secret123", None)).unwrap();
        assert_eq!(role, Role::Student);
    }

    #[test]
    fn test_blank_password_is_skipped() {
        assert_eq!(
            validate_import_row(&row("Ada", "ada@example.com", "", None)),
            Err("Invalid input".to_string())
        );

        let mut blank = row("Ada", "ada@example.com", "x", None);
        blank.password = Some("   ".to_string());
        assert_eq!(validate_import_row(&blank), Err("Invalid input".to_string()));
    }

    #[test]
    fn test_missing_name_or_email_is_skipped() {
        assert!(validate_import_row(&row("", "ada@example.com", "secret123", None)).is_err());
        assert!(validate_import_row(&row("Ada", "", "secret123", None)).is_err());
    }

    #[test]
    fn test_unknown_role_is_skipped() {
        assert_eq!(
            validate_import_row(&row("Ada", "ada@example.com", "secret123", Some("wizard"))),
            Err("Invalid role".to_string())
        );
    }

    #[test]
    fn test_explicit_role_is_honored() {
        let (_, _, _, role) =
            validate_import_row(&row("Ada", "ada@example.com", "secret123", Some("teacher")))
                .unwrap();
        assert_eq!(role, Role::Teacher);
    }
}
