//! Live integration tests for ytdash-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database from the sqlx test
//! harness. They need `DATABASE_URL` pointing at a server that allows
//! database creation, so they are ignored by default:
//!
//! ```text
//! cargo test -p ytdash-db -- --ignored
//! ```

use sqlx::PgPool;
use ytdash_db::{create_account, get_user_by_email, verify_account, AccountError};

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn create_then_verify_account(pool: PgPool) {
    let created = create_account(&pool, "Viewer@Example.com", "password123", &[])
        .await
        .expect("create_account failed");
    assert_eq!(created.email, "viewer@example.com");
    assert!(created.last_login_at.is_none());

    let verified = verify_account(&pool, "viewer@example.com", "password123")
        .await
        .expect("verify_account failed");
    assert_eq!(verified.id, created.id);
    assert!(verified.last_login_at.is_some());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn duplicate_email_is_already_exists(pool: PgPool) {
    create_account(&pool, "dup@example.com", "password123", &[])
        .await
        .expect("first create failed");

    let err = create_account(&pool, "DUP@example.com", "password456", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, AccountError::AlreadyExists(ref e) if e == "dup@example.com"));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn unknown_email_is_not_found(pool: PgPool) {
    let err = verify_account(&pool, "ghost@example.com", "password123")
        .await
        .unwrap_err();
    assert!(matches!(err, AccountError::NotFound(_)));
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn wrong_password_is_mismatched_secret(pool: PgPool) {
    create_account(&pool, "viewer@example.com", "password123", &[])
        .await
        .expect("create_account failed");

    let err = verify_account(&pool, "viewer@example.com", "password999")
        .await
        .unwrap_err();
    assert!(matches!(err, AccountError::MismatchedSecret));

    let stored = get_user_by_email(&pool, "viewer@example.com")
        .await
        .expect("lookup failed")
        .expect("user missing");
    assert!(stored.last_login_at.is_none());
    assert_ne!(stored.password_hash, "password123");
}
