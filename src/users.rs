use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::auth::password;
use crate::models::{NewUser, User};
use crate::schema::users;

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("username must not be empty")]
    EmptyUsername,
    #[error("username '{0}' is already taken")]
    UsernameTaken(String),
    #[error("a superuser must have both staff and superuser flags set")]
    InvalidSuperuserFlags,
    #[error("failed to hash password: {0}")]
    Hash(String),
    #[error(transparent)]
    Database(#[from] diesel::result::Error),
}

#[derive(Debug, Clone, Copy)]
pub struct AccountFlags {
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl AccountFlags {
    pub fn regular() -> Self {
        Self {
            is_staff: false,
            is_superuser: false,
        }
    }

    pub fn superuser() -> Self {
        Self {
            is_staff: true,
            is_superuser: true,
        }
    }
}

/// Create a regular account: not staff, not superuser, active.
pub fn create_user(
    conn: &mut PgConnection,
    username: &str,
    person_id: Option<Uuid>,
    password: &str,
) -> Result<User, ProvisionError> {
    provision(conn, username, person_id, password, AccountFlags::regular())
}

pub fn create_superuser(
    conn: &mut PgConnection,
    username: &str,
    person_id: Option<Uuid>,
    password: &str,
) -> Result<User, ProvisionError> {
    create_superuser_with_flags(conn, username, person_id, password, AccountFlags::superuser())
}

/// Callers may pass explicit flags, but a superuser with either flag
/// cleared is rejected rather than silently corrected.
pub fn create_superuser_with_flags(
    conn: &mut PgConnection,
    username: &str,
    person_id: Option<Uuid>,
    password: &str,
    flags: AccountFlags,
) -> Result<User, ProvisionError> {
    if !flags.is_staff || !flags.is_superuser {
        return Err(ProvisionError::InvalidSuperuserFlags);
    }
    provision(conn, username, person_id, password, flags)
}

fn provision(
    conn: &mut PgConnection,
    username: &str,
    person_id: Option<Uuid>,
    password: &str,
    flags: AccountFlags,
) -> Result<User, ProvisionError> {
    let username = normalize_username(username);
    if username.is_empty() {
        return Err(ProvisionError::EmptyUsername);
    }

    let password_hash =
        password::hash_password(password).map_err(|err| ProvisionError::Hash(err.to_string()))?;

    let new_user = NewUser {
        id: Uuid::new_v4(),
        username: username.clone(),
        password_hash,
        is_staff: flags.is_staff,
        is_superuser: flags.is_superuser,
        is_active: true,
        person_id,
    };

    match diesel::insert_into(users::table)
        .values(&new_user)
        .execute(conn)
    {
        Ok(_) => {}
        Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            return Err(ProvisionError::UsernameTaken(username));
        }
        Err(err) => return Err(ProvisionError::Database(err)),
    }

    let user = users::table.find(new_user.id).first(conn)?;
    Ok(user)
}

/// NFKC-fold and trim, the platform normalization the original user
/// manager applied before insertion.
pub fn normalize_username(raw: &str) -> String {
    raw.trim().nfkc().collect()
}

#[cfg(test)]
mod tests {
    use super::{normalize_username, AccountFlags};

    #[test]
    fn normalization_trims_whitespace() {
        assert_eq!(normalize_username("  alice \n"), "alice");
    }

    #[test]
    fn normalization_folds_compatibility_forms() {
        // fullwidth latin letters compose to their ASCII equivalents
        assert_eq!(normalize_username("ａｌｉｃｅ"), "alice");
    }

    #[test]
    fn whitespace_only_normalizes_to_empty() {
        assert_eq!(normalize_username(" \t "), "");
    }

    #[test]
    fn superuser_flags_default_to_both_set() {
        let flags = AccountFlags::superuser();
        assert!(flags.is_staff && flags.is_superuser);
    }
}
