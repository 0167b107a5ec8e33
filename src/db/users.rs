//! Credential store: user lookup and creation.
//!
//! Email uniqueness lives in the schema (UNIQUE constraint), so two
//! concurrent signups with the same address race at the database and one of
//! them surfaces as a constraint violation rather than both succeeding.

use chrono::Utc;

use crate::db::{DbPool, User};

pub async fn find_by_email(pool: &DbPool, email: &str) -> sqlx::Result<Option<User>> {
    sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn create(pool: &DbPool, email: &str, password_hash: &str) -> sqlx::Result<User> {
    let now = Utc::now().to_rfc3339();
    let result =
        sqlx::query("INSERT INTO users (email, password_hash, created_at) VALUES (?, ?, ?)")
            .bind(email)
            .bind(password_hash)
            .bind(&now)
            .execute(pool)
            .await?;

    sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(result.last_insert_rowid())
        .fetch_one(pool)
        .await
}
