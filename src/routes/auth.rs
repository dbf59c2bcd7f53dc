//! Auth routes: email/password accounts, confirmation and reset codes,
//! session cookie management.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRef, FromRequestParts, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use serde_json::json;
use time::Duration;

use super::error::ApiError;
use crate::services::account::{self, IssuedCode};
use crate::services::session::{self, SessionUser};
use crate::state::AppState;

pub(crate) const COOKIE_NAME: &str = "session_token";
const SESSION_DAYS: i64 = 30;

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated user, from an `Authorization: Bearer` header or else the
/// session cookie. Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub user: SessionUser,
    pub token: String,
}

/// Session token carried by the request, bearer header first.
pub(crate) fn request_token(parts: &Parts) -> Option<String> {
    let bearer = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(session::bearer_token);
    if let Some(token) = bearer {
        return Some(token.to_owned());
    }
    let jar = CookieJar::from_headers(&parts.headers);
    jar.get(COOKIE_NAME)
        .map(Cookie::value)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = request_token(parts).ok_or_else(ApiError::unauthorized)?;
        let app_state = AppState::from_ref(state);
        let user = session::validate_session(&app_state.pool, &token)
            .await?
            .ok_or_else(ApiError::unauthorized)?;
        Ok(Self { user, token })
    }
}

fn session_cookie(token: String, secure: bool, max_age: Duration) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(max_age)
        .build()
}

/// Deliver an issued code by email, or log it when no mailer is configured.
/// Delivery failures are logged and never fail the request.
async fn deliver_code(state: &AppState, issued: &IssuedCode) {
    let Some(mailer) = &state.mailer else {
        tracing::debug!(
            user_id = %issued.user_id,
            purpose = issued.purpose.as_str(),
            code = %issued.code,
            "mailer not configured; code not sent"
        );
        return;
    };
    if let Err(e) = mailer.send_code(&issued.email, issued.purpose, &issued.code).await {
        tracing::warn!(user_id = %issued.user_id, purpose = issued.purpose.as_str(), error = %e, "code delivery failed");
    }
}

// =============================================================================
// REQUEST BODIES
// =============================================================================

#[derive(Deserialize)]
pub struct CredentialsBody {
    email: String,
    password: String,
}

#[derive(Deserialize)]
pub struct EmailBody {
    email: String,
}

#[derive(Deserialize)]
pub struct CodeBody {
    email: String,
    code: String,
}

#[derive(Deserialize)]
pub struct ResetBody {
    email: String,
    code: String,
    password: String,
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `POST /api/auth/signup`: create an account and send its confirmation code.
pub async fn signup(
    State(state): State<AppState>,
    body: Result<Json<CredentialsBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body?;
    let issued = account::sign_up(&state.pool, &body.email, &body.password).await?;
    deliver_code(&state, &issued).await;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "email": issued.email,
            "message": "Check your email for a confirmation code",
        })),
    ))
}

/// `POST /api/auth/confirm`: consume a confirmation code.
pub async fn confirm(
    State(state): State<AppState>,
    body: Result<Json<CodeBody>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(body) = body?;
    account::confirm_email(&state.pool, &body.email, &body.code).await?;
    Ok(Json(json!({ "confirmed": true })))
}

/// `POST /api/auth/resend-confirmation`: issue a fresh code for an
/// unconfirmed account. Answers the same whether or not one exists.
pub async fn resend_confirmation(
    State(state): State<AppState>,
    body: Result<Json<EmailBody>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(body) = body?;
    match account::resend_confirmation(&state.pool, &body.email).await {
        Ok(Some(issued)) => deliver_code(&state, &issued).await,
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "resend confirmation failed"),
    }
    Ok(Json(json!({ "message": "If the account needs confirming, a new code has been sent" })))
}

/// `POST /api/auth/signin`: verify credentials, set the session cookie.
pub async fn signin(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Result<Json<CredentialsBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body?;
    let signed_in = account::sign_in(&state.pool, &body.email, &body.password).await?;
    let cookie = session_cookie(signed_in.token.clone(), state.config.cookie_secure, Duration::days(SESSION_DAYS));
    Ok((jar.add(cookie), Json(json!({ "token": signed_in.token, "user": signed_in.user }))))
}

/// `POST /api/auth/signout`: delete session, clear cookie.
pub async fn signout(State(state): State<AppState>, jar: CookieJar, auth: AuthUser) -> impl IntoResponse {
    if let Err(e) = session::delete_session(&state.pool, &auth.token).await {
        tracing::warn!(user_id = %auth.user.id, error = %e, "session delete failed");
    }
    let cookie = session_cookie(String::new(), state.config.cookie_secure, Duration::ZERO);
    (jar.add(cookie), StatusCode::NO_CONTENT)
}

/// `POST /api/auth/forgot-password`: issue a reset code if the account exists.
pub async fn forgot_password(
    State(state): State<AppState>,
    body: Result<Json<EmailBody>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(body) = body?;
    match account::request_password_reset(&state.pool, &body.email).await {
        Ok(Some(issued)) => deliver_code(&state, &issued).await,
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "password reset request failed"),
    }
    Ok(Json(json!({ "message": "If an account exists for that email, a reset code has been sent" })))
}

/// `POST /api/auth/reset-password`: consume a reset code and set a new password.
pub async fn reset_password(
    State(state): State<AppState>,
    body: Result<Json<ResetBody>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Json(body) = body?;
    account::reset_password(&state.pool, &body.email, &body.code, &body.password).await?;
    Ok(Json(json!({ "reset": true })))
}

/// `GET /api/auth/me`: return current user.
pub async fn me(auth: AuthUser) -> Json<SessionUser> {
    Json(auth.user)
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
