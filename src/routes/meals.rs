//! Meal routes: LLM analysis and the caller's analyzed-meal history.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use serde::Deserialize;
use serde_json::json;

use super::auth::AuthUser;
use super::error::ApiError;
use crate::services::meal::{self as meal_svc, AnalyzedMeal, MealOrder};
use crate::services::session;
use crate::state::AppState;

const MISSING_CONFIG: &str = "Server configuration error. Missing environment variables.";
const MEAL_REQUIRED: &str = "Meal description is required";

#[derive(Deserialize)]
pub struct AnalyzeMealBody {
    #[serde(default)]
    meal: String,
}

/// `POST /api/analyze-meal`
///
/// Checks run in a fixed order so a misconfigured server, an empty form and
/// an anonymous caller are each reported before any external call is made.
pub async fn analyze_meal(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<AnalyzeMealBody>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Some(llm) = state.llm.clone() else {
        tracing::error!("analyze-meal: LLM client is not configured");
        return Err(ApiError::internal(MISSING_CONFIG));
    };

    let meal = body.map(|Json(b)| b.meal).unwrap_or_default();
    let meal = meal.trim();
    if meal.is_empty() {
        return Err(ApiError::bad_request(MEAL_REQUIRED));
    }

    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(session::bearer_token)
        .ok_or_else(ApiError::unauthorized)?;
    let user = session::validate_session(&state.pool, token)
        .await?
        .ok_or_else(ApiError::unauthorized)?;

    state.rate_limiter.check_and_record(user.id)?;

    let result = meal_svc::analyze_meal(llm.as_ref(), meal).await?;

    if let Err(e) = meal_svc::save_meal(&state.pool, user.id, meal, &result).await {
        tracing::error!(user_id = %user.id, error = %e, "analyze-meal: failed to save analysis");
    }

    Ok(Json(json!({ "analysis": result.analysis })))
}

#[derive(Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    order: MealOrder,
}

/// `GET /api/meals?order=rating|recent`
pub async fn list_meals(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<AnalyzedMeal>>, ApiError> {
    let meals = meal_svc::list_meals(&state.pool, auth.user.id, query.order).await?;
    Ok(Json(meals))
}

/// `GET /api/meals/{id}`
pub async fn get_meal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<AnalyzedMeal>, ApiError> {
    meal_svc::get_meal(&state.pool, auth.user.id, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Meal not found"))
}

/// `DELETE /api/meals/{id}`
pub async fn delete_meal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if meal_svc::delete_meal(&state.pool, auth.user.id, id).await? {
        tracing::info!(user_id = %auth.user.id, meal_id = id, "meal deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Meal not found"))
    }
}

#[derive(Deserialize)]
pub struct SuggestionsQuery {
    #[serde(default)]
    q: String,
}

/// `GET /api/meals/suggestions?q=`
pub async fn suggestions(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<SuggestionsQuery>,
) -> Result<Json<Vec<String>>, ApiError> {
    let meals = meal_svc::suggest_meals(&state.pool, auth.user.id, &query.q).await?;
    Ok(Json(meals))
}

#[derive(Deserialize)]
pub struct LookupQuery {
    meal: String,
}

/// `GET /api/meals/lookup?meal=`: a previous analysis of the same meal text.
pub async fn lookup(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<LookupQuery>,
) -> Result<Json<AnalyzedMeal>, ApiError> {
    meal_svc::lookup_meal(&state.pool, auth.user.id, query.meal.trim())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Meal not found"))
}
