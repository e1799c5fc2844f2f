use std::env;

/// The superadmin is a configured identity, not a stored user row.
///
/// `SUPERADMIN_PASSWORD_HASH` holds a bcrypt hash (generate one with
/// `cohortly-cli hash-password`). Tokens minted for this identity carry the
/// `superadmin` role and no subject id.
#[derive(Clone, Debug)]
pub struct SuperadminConfig {
    pub email: String,
    pub password_hash: String,
}

impl SuperadminConfig {
    pub fn from_env() -> Self {
        Self {
            email: env::var("SUPERADMIN_EMAIL")
                .unwrap_or_else(|_| "superadmin@cohortly.app".to_string()),
            password_hash: env::var("SUPERADMIN_PASSWORD_HASH").unwrap_or_else(|_| "".to_string()),
        }
    }
}
