//! Session management.
//!
//! Sessions are opaque 32-byte hex tokens stored in `sessions` with a
//! 30-day expiry. The same token is accepted as a bearer token and as the
//! `session_token` cookie.

use std::fmt::Write;

use rand::Rng;
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

/// User row returned from session validation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    pub email_confirmed: bool,
}

/// Create a session for the given user, returning the token.
///
/// # Errors
///
/// Returns the database error if the insert fails.
pub async fn create_session(pool: &PgPool, user_id: Uuid) -> Result<String, sqlx::Error> {
    let token = generate_token();
    sqlx::query("INSERT INTO sessions (token, user_id) VALUES ($1, $2)")
        .bind(&token)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(token)
}

/// Resolve a live session token to its user.
///
/// # Errors
///
/// Returns the database error if the lookup fails.
pub async fn validate_session(pool: &PgPool, token: &str) -> Result<Option<SessionUser>, sqlx::Error> {
    let row = sqlx::query(
        r"SELECT u.id, u.email, u.email_confirmed_at IS NOT NULL AS email_confirmed
          FROM sessions s
          JOIN users u ON u.id = s.user_id
          WHERE s.token = $1 AND s.expires_at > now()",
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| SessionUser { id: r.get("id"), email: r.get("email"), email_confirmed: r.get("email_confirmed") }))
}

/// Delete a session by token.
///
/// # Errors
///
/// Returns the database error if the delete fails.
pub async fn delete_session(pool: &PgPool, token: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM sessions WHERE token = $1")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}

/// Delete every session belonging to a user, returning how many were removed.
///
/// # Errors
///
/// Returns the database error if the delete fails.
pub async fn delete_user_sessions<'e, E>(executor: E, user_id: Uuid) -> Result<u64, sqlx::Error>
where
    E: sqlx::PgExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

/// Extract the token from an `Authorization` header value: the second
/// whitespace-separated part, as in `Bearer <token>`.
#[must_use]
pub fn bearer_token(header: &str) -> Option<&str> {
    header
        .split_whitespace()
        .nth(1)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
