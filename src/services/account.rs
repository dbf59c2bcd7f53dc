//! Account service: email/password signup, confirmation codes, sign-in and
//! password reset.
//!
//! DESIGN
//! ======
//! Passwords are stored as Argon2id PHC strings. Confirmation and reset codes
//! are six characters from an unambiguous alphabet, stored as SHA-256 hex
//! digests in `auth_codes` with a one-hour expiry. Only the newest unconsumed
//! code per (user, purpose) is live; issuing a new one deletes older ones.
//! Each wrong guess bumps `attempts`, and the fifth consumes the code.

use argon2::Argon2;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::{PgConnection, PgPool, Row};
use uuid::Uuid;

use super::session::{self, SessionUser};

pub const MIN_PASSWORD_LEN: usize = 8;
const CODE_LEN: usize = 6;
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const MAX_FAILED_ATTEMPTS: i32 = 5;

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Password must be at least {MIN_PASSWORD_LEN} characters")]
    WeakPassword,
    #[error("An account with this email already exists")]
    EmailTaken,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Please confirm your email before signing in")]
    EmailNotConfirmed,
    #[error("Invalid code")]
    InvalidCode,
    #[error("Expired or incorrect code")]
    VerificationFailed,
    #[error("password hashing failed: {0}")]
    PasswordHash(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// What an auth code unlocks. Stored in `auth_codes.purpose`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodePurpose {
    EmailConfirmation,
    PasswordReset,
}

impl CodePurpose {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmailConfirmation => "email_confirmation",
            Self::PasswordReset => "password_reset",
        }
    }
}

/// A freshly issued code, returned so the caller can deliver it.
#[derive(Debug, Clone)]
pub struct IssuedCode {
    pub user_id: Uuid,
    pub email: String,
    pub purpose: CodePurpose,
    pub code: String,
}

#[derive(Debug, Clone)]
pub struct SignedIn {
    pub token: String,
    pub user: SessionUser,
}

// =============================================================================
// NORMALIZATION & CODES
// =============================================================================

#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    let (local, domain) = normalized.split_once('@')?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') || normalized.contains(char::is_whitespace) {
        return None;
    }
    Some(normalized)
}

#[must_use]
pub fn normalize_code(code: &str) -> Option<String> {
    let normalized = code.trim().to_ascii_uppercase();
    if normalized.len() != CODE_LEN || !normalized.bytes().all(|c| CODE_ALPHABET.contains(&c)) {
        return None;
    }
    Some(normalized)
}

#[must_use]
pub fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LEN)
        .map(|_| char::from(CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())]))
        .collect()
}

#[must_use]
pub fn hash_code(code: &str) -> String {
    session::bytes_to_hex(&Sha256::digest(code.as_bytes()))
}

// =============================================================================
// PASSWORDS
// =============================================================================

fn check_password_strength(password: &str) -> Result<(), AccountError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AccountError::WeakPassword);
    }
    Ok(())
}

/// Hash a password into an Argon2id PHC string.
///
/// # Errors
///
/// Returns [`AccountError::PasswordHash`] if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AccountError> {
    let salt_bytes: [u8; 16] = rand::rng().random();
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| AccountError::PasswordHash(e.to_string()))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AccountError::PasswordHash(e.to_string()))
}

/// Check a password against a stored PHC string. A malformed stored hash
/// never verifies.
#[must_use]
pub fn verify_password(password: &str, stored: &str) -> bool {
    PasswordHash::new(stored).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

// =============================================================================
// CODE STORAGE
// =============================================================================

async fn issue_code(conn: &mut PgConnection, user_id: Uuid, purpose: CodePurpose) -> Result<String, sqlx::Error> {
    sqlx::query("DELETE FROM auth_codes WHERE user_id = $1 AND purpose = $2 AND consumed_at IS NULL")
        .bind(user_id)
        .bind(purpose.as_str())
        .execute(&mut *conn)
        .await?;

    let code = generate_code();
    sqlx::query("INSERT INTO auth_codes (user_id, purpose, code_hash) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(purpose.as_str())
        .bind(hash_code(&code))
        .execute(&mut *conn)
        .await?;
    Ok(code)
}

/// Consume the live code for `email` if it matches. On mismatch the attempt
/// is recorded and `None` returned; callers must commit either way.
async fn consume_code(
    conn: &mut PgConnection,
    email: &str,
    purpose: CodePurpose,
    code: &str,
) -> Result<Option<Uuid>, sqlx::Error> {
    const LIVE_CODE: &str = r"SELECT c.id
          FROM auth_codes c
          JOIN users u ON u.id = c.user_id
          WHERE u.email = $1
            AND c.purpose = $2
            AND c.consumed_at IS NULL
            AND c.expires_at > now()
          ORDER BY c.created_at DESC
          LIMIT 1";

    let consumed = sqlx::query(&format!(
        "UPDATE auth_codes
         SET consumed_at = now()
         WHERE id = ({LIVE_CODE}) AND code_hash = $3
         RETURNING user_id"
    ))
    .bind(email)
    .bind(purpose.as_str())
    .bind(hash_code(code))
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(row) = consumed {
        return Ok(Some(row.get("user_id")));
    }

    sqlx::query(&format!(
        "UPDATE auth_codes
         SET attempts = attempts + 1,
             consumed_at = CASE WHEN attempts + 1 >= $3 THEN now() ELSE consumed_at END
         WHERE id = ({LIVE_CODE})"
    ))
    .bind(email)
    .bind(purpose.as_str())
    .bind(MAX_FAILED_ATTEMPTS)
    .execute(&mut *conn)
    .await?;
    Ok(None)
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Create an unconfirmed account and issue its confirmation code.
///
/// # Errors
///
/// `InvalidEmail`, `WeakPassword`, `EmailTaken`, or a database/hash failure.
pub async fn sign_up(pool: &PgPool, email: &str, password: &str) -> Result<IssuedCode, AccountError> {
    let email = normalize_email(email).ok_or(AccountError::InvalidEmail)?;
    check_password_strength(password)?;
    let password_hash = hash_password(password)?;

    let mut tx = pool.begin().await?;
    let user_id: Uuid = sqlx::query_scalar(
        "INSERT INTO users (email, password_hash) VALUES ($1, $2)
         ON CONFLICT (email) DO NOTHING
         RETURNING id",
    )
    .bind(&email)
    .bind(&password_hash)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(AccountError::EmailTaken)?;

    let code = issue_code(&mut tx, user_id, CodePurpose::EmailConfirmation).await?;
    tx.commit().await?;

    tracing::info!(%user_id, "account: signed up");
    Ok(IssuedCode { user_id, email, purpose: CodePurpose::EmailConfirmation, code })
}

/// Issue a fresh confirmation code for an account that is still unconfirmed.
/// Returns `None` when there is nothing to confirm.
///
/// # Errors
///
/// `InvalidEmail` or a database failure.
pub async fn resend_confirmation(pool: &PgPool, email: &str) -> Result<Option<IssuedCode>, AccountError> {
    let email = normalize_email(email).ok_or(AccountError::InvalidEmail)?;
    let mut tx = pool.begin().await?;
    let user_id: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM users WHERE email = $1 AND email_confirmed_at IS NULL")
            .bind(&email)
            .fetch_optional(&mut *tx)
            .await?;
    let Some(user_id) = user_id else {
        return Ok(None);
    };
    let code = issue_code(&mut tx, user_id, CodePurpose::EmailConfirmation).await?;
    tx.commit().await?;
    Ok(Some(IssuedCode { user_id, email, purpose: CodePurpose::EmailConfirmation, code }))
}

/// Consume a confirmation code and mark the email confirmed.
///
/// # Errors
///
/// `InvalidEmail`, `InvalidCode`, `VerificationFailed`, or a database failure.
pub async fn confirm_email(pool: &PgPool, email: &str, code: &str) -> Result<Uuid, AccountError> {
    let email = normalize_email(email).ok_or(AccountError::InvalidEmail)?;
    let code = normalize_code(code).ok_or(AccountError::InvalidCode)?;

    let mut tx = pool.begin().await?;
    let user_id = consume_code(&mut tx, &email, CodePurpose::EmailConfirmation, &code).await?;
    if let Some(user_id) = user_id {
        sqlx::query("UPDATE users SET email_confirmed_at = COALESCE(email_confirmed_at, now()) WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    let user_id = user_id.ok_or(AccountError::VerificationFailed)?;
    tracing::info!(%user_id, "account: email confirmed");
    Ok(user_id)
}

/// Verify credentials and open a session.
///
/// # Errors
///
/// `InvalidCredentials` for an unknown email or wrong password,
/// `EmailNotConfirmed` for a correct password on an unconfirmed account.
pub async fn sign_in(pool: &PgPool, email: &str, password: &str) -> Result<SignedIn, AccountError> {
    let email = normalize_email(email).ok_or(AccountError::InvalidCredentials)?;
    let row = sqlx::query(
        "SELECT id, password_hash, email_confirmed_at IS NOT NULL AS email_confirmed FROM users WHERE email = $1",
    )
    .bind(&email)
    .fetch_optional(pool)
    .await?
    .ok_or(AccountError::InvalidCredentials)?;

    let stored: String = row.get("password_hash");
    if !verify_password(password, &stored) {
        return Err(AccountError::InvalidCredentials);
    }
    let email_confirmed: bool = row.get("email_confirmed");
    if !email_confirmed {
        return Err(AccountError::EmailNotConfirmed);
    }

    let user_id: Uuid = row.get("id");
    let token = session::create_session(pool, user_id).await?;
    tracing::info!(%user_id, "account: signed in");
    Ok(SignedIn { token, user: SessionUser { id: user_id, email, email_confirmed } })
}

/// Issue a password reset code when the account exists. Unknown emails
/// yield `None` so callers can answer identically either way.
///
/// # Errors
///
/// Database failure only; malformed emails are treated as unknown.
pub async fn request_password_reset(pool: &PgPool, email: &str) -> Result<Option<IssuedCode>, AccountError> {
    let Some(email) = normalize_email(email) else {
        return Ok(None);
    };
    let mut tx = pool.begin().await?;
    let user_id: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&mut *tx)
        .await?;
    let Some(user_id) = user_id else {
        return Ok(None);
    };
    let code = issue_code(&mut tx, user_id, CodePurpose::PasswordReset).await?;
    tx.commit().await?;
    Ok(Some(IssuedCode { user_id, email, purpose: CodePurpose::PasswordReset, code }))
}

/// Consume a reset code, set the new password and end every session.
/// A successful reset also confirms the email, since the code proved
/// ownership of the inbox.
///
/// # Errors
///
/// `InvalidEmail`, `InvalidCode`, `WeakPassword`, `VerificationFailed`, or a
/// database/hash failure.
pub async fn reset_password(pool: &PgPool, email: &str, code: &str, new_password: &str) -> Result<Uuid, AccountError> {
    let email = normalize_email(email).ok_or(AccountError::InvalidEmail)?;
    let code = normalize_code(code).ok_or(AccountError::InvalidCode)?;
    check_password_strength(new_password)?;
    let password_hash = hash_password(new_password)?;

    let mut tx = pool.begin().await?;
    let user_id = consume_code(&mut tx, &email, CodePurpose::PasswordReset, &code).await?;
    if let Some(user_id) = user_id {
        sqlx::query(
            "UPDATE users
             SET password_hash = $2, email_confirmed_at = COALESCE(email_confirmed_at, now())
             WHERE id = $1",
        )
        .bind(user_id)
        .bind(&password_hash)
        .execute(&mut *tx)
        .await?;
        let ended = session::delete_user_sessions(&mut *tx, user_id).await?;
        tracing::info!(%user_id, sessions_ended = ended, "account: password reset");
    }
    tx.commit().await?;

    user_id.ok_or(AccountError::VerificationFailed)
}

#[cfg(test)]
#[path = "account_test.rs"]
mod tests;
