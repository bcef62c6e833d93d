//! User store: creation and credential rules for accounts.
//!
//! Emails are stored lowercased so lookups can be a plain equality match;
//! passwords are argon2-hashed before they ever touch the database.

use crate::auth::hash_password;
use crate::models::{NewUser, User};
use crate::schema::users;
use diesel::prelude::*;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CreateUserError {
    #[error("Email cannot be empty")]
    EmptyEmail,
    #[error("Email already registered")]
    EmailTaken,
    #[error("Failed to hash password")]
    Hash,
    #[error("Database error: {0}")]
    Database(diesel::result::Error),
}

/// Lowercases the full address. Domains are case-insensitive anyway and
/// normalizing the local part too means one canonical row per mailbox.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn create_user(
    conn: &mut PgConnection,
    email: &str,
    password: &str,
    name: &str,
) -> Result<User, CreateUserError> {
    insert_user(conn, email, password, name, false)
}

/// Same as create_user but with the staff and superuser flags set.
pub fn create_superuser(
    conn: &mut PgConnection,
    email: &str,
    password: &str,
) -> Result<User, CreateUserError> {
    insert_user(conn, email, password, "", true)
}

fn insert_user(
    conn: &mut PgConnection,
    email: &str,
    password: &str,
    name: &str,
    superuser: bool,
) -> Result<User, CreateUserError> {
    let email = normalize_email(email);
    if email.is_empty() {
        return Err(CreateUserError::EmptyEmail);
    }

    let password_hash = hash_password(password).map_err(|_| CreateUserError::Hash)?;

    let new_user = NewUser {
        email: &email,
        password_hash: &password_hash,
        name,
        is_staff: superuser,
        is_superuser: superuser,
    };

    diesel::insert_into(users::table)
        .values(&new_user)
        .returning(User::as_returning())
        .get_result(conn)
        .map_err(|e| match e {
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            ) => CreateUserError::EmailTaken,
            other => CreateUserError::Database(other),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_whole_address() {
        assert_eq!(normalize_email("Test@EXAMPLE.com"), "test@example.com");
        assert_eq!(normalize_email("USER@COMPANY.COM"), "user@company.com");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(normalize_email("  a@b.com "), "a@b.com");
    }

    #[test]
    fn empty_email_normalizes_to_empty() {
        assert_eq!(normalize_email("   "), "");
    }
}
