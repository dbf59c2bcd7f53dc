//! Meal analysis service: LLM scoring and the analyzed-meal history.
//!
//! DESIGN
//! ======
//! `analyze_meal` is the only path that reaches the completion provider: one
//! fixed system prompt, one user message, no tools, no retry. The reply is
//! returned verbatim; the numeric rating is parsed from its leading
//! `***Rating: NN/100***` token and stored alongside it. Persistence is a
//! separate step so a storage failure never hides a completed analysis.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::llm::{CompletionRequest, LlmChat, LlmError};

const SYSTEM_PROMPT: &str = include_str!("../../templates/meal_analysis_prompt.txt");
pub const MAX_TOKENS: u32 = 300;
pub const TEMPERATURE: f32 = 0.7;
const SUGGESTION_LIMIT: i64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealAnalysis {
    pub analysis: String,
    pub rating: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyzedMeal {
    pub id: i64,
    pub meal: String,
    pub analysis: String,
    pub rating: i32,
    pub created_at: String,
}

/// Sort order for a user's meal history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealOrder {
    #[default]
    Rating,
    Recent,
}

// =============================================================================
// ANALYSIS
// =============================================================================

/// The fixed rubric sent as the system message.
#[must_use]
pub fn system_prompt() -> &'static str {
    SYSTEM_PROMPT.trim_end()
}

/// Parse the leading `***Rating: NN/100***` token. Anything else, including
/// a number too large to represent, yields 0.
#[must_use]
pub fn extract_rating(analysis: &str) -> i32 {
    rating_regex()
        .captures(analysis)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<i32>().ok())
        .unwrap_or(0)
}

fn rating_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\*\*\*Rating:\s*(\d+)/100\*\*\*").expect("rating pattern is valid"))
}

/// Ask the completion provider to rate `meal`.
///
/// # Errors
///
/// Propagates the provider error unchanged so the caller can surface its
/// status and message.
pub async fn analyze_meal(llm: &dyn LlmChat, meal: &str) -> Result<MealAnalysis, LlmError> {
    let user = format!("Analyze this meal: {meal}");
    let request = CompletionRequest { system: system_prompt(), user: &user, max_tokens: MAX_TOKENS, temperature: TEMPERATURE };
    let completion = llm.complete(&request).await?;
    let rating = extract_rating(&completion.text);
    info!(
        rating,
        model = %completion.model,
        input_tokens = completion.input_tokens,
        output_tokens = completion.output_tokens,
        "meal: analyzed"
    );
    Ok(MealAnalysis { analysis: completion.text, rating })
}

// =============================================================================
// HISTORY
// =============================================================================

const MEAL_COLUMNS: &str =
    r#"id, meal, analysis, rating, to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at"#;

fn meal_from_row(r: &PgRow) -> AnalyzedMeal {
    AnalyzedMeal {
        id: r.get("id"),
        meal: r.get("meal"),
        analysis: r.get("analysis"),
        rating: r.get("rating"),
        created_at: r.get("created_at"),
    }
}

/// Store an analyzed meal for `user_id`, returning its id.
///
/// # Errors
///
/// Returns the database error if the insert fails.
pub async fn save_meal(pool: &PgPool, user_id: Uuid, meal: &str, analysis: &MealAnalysis) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("INSERT INTO analyzed_meals (user_id, meal, analysis, rating) VALUES ($1, $2, $3, $4) RETURNING id")
        .bind(user_id)
        .bind(meal)
        .bind(&analysis.analysis)
        .bind(analysis.rating)
        .fetch_one(pool)
        .await
}

/// All of a user's analyzed meals in the requested order.
///
/// # Errors
///
/// Returns the database error if the query fails.
pub async fn list_meals(pool: &PgPool, user_id: Uuid, order: MealOrder) -> Result<Vec<AnalyzedMeal>, sqlx::Error> {
    let order_by = match order {
        MealOrder::Rating => "rating DESC, created_at DESC",
        MealOrder::Recent => "created_at DESC",
    };
    let rows = sqlx::query(&format!(
        "SELECT {MEAL_COLUMNS} FROM analyzed_meals WHERE user_id = $1 ORDER BY {order_by}, id DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(meal_from_row).collect())
}

/// One of a user's meals; other users' meals are invisible.
///
/// # Errors
///
/// Returns the database error if the query fails.
pub async fn get_meal(pool: &PgPool, user_id: Uuid, id: i64) -> Result<Option<AnalyzedMeal>, sqlx::Error> {
    let row = sqlx::query(&format!("SELECT {MEAL_COLUMNS} FROM analyzed_meals WHERE id = $1 AND user_id = $2"))
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.as_ref().map(meal_from_row))
}

/// Delete one of a user's meals. Returns whether a row was removed.
///
/// # Errors
///
/// Returns the database error if the delete fails.
pub async fn delete_meal(pool: &PgPool, user_id: Uuid, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM analyzed_meals WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Distinct meal texts the user has analyzed before that contain `query`,
/// most recent first. A blank query suggests nothing.
///
/// # Errors
///
/// Returns the database error if the query fails.
pub async fn suggest_meals(pool: &PgPool, user_id: Uuid, query: &str) -> Result<Vec<String>, sqlx::Error> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }
    sqlx::query_scalar(
        "SELECT meal FROM analyzed_meals
         WHERE user_id = $1 AND strpos(lower(meal), lower($2)) > 0
         GROUP BY meal
         ORDER BY max(created_at) DESC
         LIMIT $3",
    )
    .bind(user_id)
    .bind(query)
    .bind(SUGGESTION_LIMIT)
    .fetch_all(pool)
    .await
}

/// The user's most recent analysis of exactly this meal text, compared
/// case-insensitively.
///
/// # Errors
///
/// Returns the database error if the query fails.
pub async fn lookup_meal(pool: &PgPool, user_id: Uuid, meal: &str) -> Result<Option<AnalyzedMeal>, sqlx::Error> {
    let row = sqlx::query(&format!(
        "SELECT {MEAL_COLUMNS} FROM analyzed_meals
         WHERE user_id = $1 AND lower(meal) = lower($2)
         ORDER BY created_at DESC, id DESC
         LIMIT 1"
    ))
    .bind(user_id)
    .bind(meal.trim())
    .fetch_optional(pool)
    .await?;
    Ok(row.as_ref().map(meal_from_row))
}

#[cfg(test)]
#[path = "meal_test.rs"]
mod tests;
