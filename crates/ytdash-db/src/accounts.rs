//! Credential store: account creation and password verification over the
//! `users` table.
//!
//! Passwords never reach the database in clear text. Verification compares
//! digests in constant time (see [`ytdash_core::credentials::verify_secret`]).
//! Both directions of the iterated digest run on tokio's blocking pool so a
//! signup or login never stalls the async workers.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;
use ytdash_core::credentials::{
    check_password_strength, hash_secret, normalize_email, verify_secret,
};
use ytdash_core::ValidationError;

use crate::DbError;

/// A row from the `users` table.
#[derive(Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub public_id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for UserRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRow")
            .field("id", &self.id)
            .field("public_id", &self.public_id)
            .field("email", &self.email)
            .field("password_hash", &"[redacted]")
            .field("created_at", &self.created_at)
            .field("last_login_at", &self.last_login_at)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("an account for {0} already exists")]
    AlreadyExists(String),
    #[error("no account found for {0}")]
    NotFound(String),
    #[error("incorrect password")]
    MismatchedSecret,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("password hashing task failed: {0}")]
    Hashing(#[from] tokio::task::JoinError),
}

impl From<sqlx::Error> for AccountError {
    fn from(e: sqlx::Error) -> Self {
        Self::Db(DbError::Sqlx(e))
    }
}

const USER_COLUMNS: &str = "id, public_id, email, password_hash, created_at, last_login_at";

async fn hash_off_runtime(password: &str) -> Result<String, AccountError> {
    let password = password.to_owned();
    Ok(tokio::task::spawn_blocking(move || hash_secret(&password)).await?)
}

async fn verify_off_runtime(password: &str, stored: &str) -> Result<bool, AccountError> {
    let password = password.to_owned();
    let stored = stored.to_owned();
    Ok(tokio::task::spawn_blocking(move || verify_secret(&password, &stored)).await?)
}

/// Validates signup input and hashes the password.
///
/// Returns the normalized email and the stored hash string. No database
/// access happens here, so rejected input never reaches the pool.
///
/// # Errors
///
/// Returns [`AccountError::Validation`] for a malformed email, a disallowed
/// domain or a weak password, and [`AccountError::Hashing`] if the hashing
/// task panics.
pub async fn prepare_credentials(
    email: &str,
    password: &str,
    allowed_domains: &[String],
) -> Result<(String, String), AccountError> {
    let email = normalize_email(email, allowed_domains)?;
    check_password_strength(password)?;
    let password_hash = hash_off_runtime(password).await?;
    Ok((email, password_hash))
}

/// Creates an account.
///
/// # Errors
///
/// Returns [`AccountError::Validation`] for rejected input,
/// [`AccountError::AlreadyExists`] if the email is taken, or
/// [`AccountError::Db`] on any other database failure.
pub async fn create_account(
    pool: &PgPool,
    email: &str,
    password: &str,
    allowed_domains: &[String],
) -> Result<UserRow, AccountError> {
    let (email, password_hash) = prepare_credentials(email, password, allowed_domains).await?;

    let result = sqlx::query_as::<_, UserRow>(&format!(
        "INSERT INTO users (public_id, email, password_hash) VALUES ($1, $2, $3) \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(&email)
    .bind(&password_hash)
    .fetch_one(pool)
    .await;

    match result {
        Ok(row) => {
            tracing::info!(user = %row.public_id, "account created");
            Ok(row)
        }
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            Err(AccountError::AlreadyExists(email))
        }
        Err(e) => Err(e.into()),
    }
}

/// Fetches a user by normalized email.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_user_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRow>, DbError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Checks `password` against the stored hash and stamps `last_login_at` on
/// success.
///
/// The domain allow-list is not applied here: it gates signup only.
///
/// # Errors
///
/// Returns [`AccountError::NotFound`] for an unknown email,
/// [`AccountError::MismatchedSecret`] for a wrong password, or
/// [`AccountError::Validation`] if the email is malformed.
pub async fn verify_account(
    pool: &PgPool,
    email: &str,
    password: &str,
) -> Result<UserRow, AccountError> {
    let email = normalize_email(email, &[])?;
    let user = get_user_by_email(pool, &email)
        .await?
        .ok_or_else(|| AccountError::NotFound(email.clone()))?;

    if !verify_off_runtime(password, &user.password_hash).await? {
        tracing::info!(user = %user.public_id, "login rejected");
        return Err(AccountError::MismatchedSecret);
    }

    let user = sqlx::query_as::<_, UserRow>(&format!(
        "UPDATE users SET last_login_at = NOW() WHERE id = $1 RETURNING {USER_COLUMNS}"
    ))
    .bind(user.id)
    .fetch_one(pool)
    .await?;

    Ok(user)
}
