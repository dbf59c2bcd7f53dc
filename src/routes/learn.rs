//! Learn routes: glossary, vitamins, symptoms, articles, quick facts and
//! inspirations.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;

use super::error::ApiError;
use crate::services::content::{
    self, Article, ArticleCondition, GlossaryTerm, Inspiration, QuickFact, Symptom, ThyroidCondition, Vitamin,
};
use crate::state::AppState;

const DEFAULT_QUICK_FACTS: usize = 3;

/// Parse a `condition` parameter; absent means hypothyroidism.
pub(crate) fn thyroid_condition(raw: Option<&str>) -> Result<ThyroidCondition, ApiError> {
    match raw {
        None => Ok(ThyroidCondition::default()),
        Some(raw) => ThyroidCondition::parse(raw).ok_or_else(|| invalid_condition(raw)),
    }
}

pub(crate) fn invalid_condition(raw: &str) -> ApiError {
    ApiError::bad_request(format!("Invalid condition: {raw}"))
}

#[derive(Deserialize)]
pub struct ConditionQuery {
    condition: Option<String>,
    search: Option<String>,
}

// =============================================================================
// GLOSSARY
// =============================================================================

/// `GET /api/glossary?condition=&search=`
pub async fn glossary(
    State(state): State<AppState>,
    Query(query): Query<ConditionQuery>,
) -> Result<Json<Vec<GlossaryTerm>>, ApiError> {
    let condition = thyroid_condition(query.condition.as_deref())?;
    let mut terms = content::list_glossary(&state.pool, condition).await?;
    terms.retain(|t| content::matches_search(&t.term, query.search.as_deref()));
    Ok(Json(terms))
}

/// `GET /api/glossary/terms/{slug}`
pub async fn glossary_term(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<GlossaryTerm>, ApiError> {
    content::find_glossary_term(&state.pool, &slug)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Term not found"))
}

// =============================================================================
// VITAMINS
// =============================================================================

/// `GET /api/vitamins?condition=&search=`
pub async fn vitamins(
    State(state): State<AppState>,
    Query(query): Query<ConditionQuery>,
) -> Result<Json<Vec<Vitamin>>, ApiError> {
    let condition = thyroid_condition(query.condition.as_deref())?;
    let mut vitamins = content::list_vitamins(&state.pool, condition).await?;
    vitamins.retain(|v| content::matches_search(&v.name, query.search.as_deref()));
    Ok(Json(vitamins))
}

#[derive(Deserialize)]
pub struct VitaminQuery {
    condition: Option<String>,
}

/// `GET /api/vitamins/{id_or_key}`: sources come back sorted by amount.
pub async fn vitamin(
    State(state): State<AppState>,
    Path(id_or_key): Path<String>,
    Query(query): Query<VitaminQuery>,
) -> Result<Json<Vitamin>, ApiError> {
    let condition = query
        .condition
        .as_deref()
        .map(|raw| ThyroidCondition::parse(raw).ok_or_else(|| invalid_condition(raw)))
        .transpose()?;
    content::get_vitamin(&state.pool, &id_or_key, condition)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Vitamin not found"))
}

// =============================================================================
// SYMPTOMS
// =============================================================================

/// `GET /api/symptoms?condition=`
pub async fn symptoms(
    State(state): State<AppState>,
    Query(query): Query<ConditionQuery>,
) -> Result<Json<Vec<Symptom>>, ApiError> {
    let condition = thyroid_condition(query.condition.as_deref())?;
    let mut symptoms = content::list_symptoms(&state.pool, condition).await?;
    symptoms.retain(|s| content::matches_search(&s.name, query.search.as_deref()));
    Ok(Json(symptoms))
}

/// `GET /api/symptoms/{condition}/{slug}`
pub async fn symptom(
    State(state): State<AppState>,
    Path((condition, slug)): Path<(String, String)>,
) -> Result<Json<Symptom>, ApiError> {
    let condition = thyroid_condition(Some(&condition))?;
    content::get_symptom(&state.pool, condition, &slug)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Symptom not found"))
}

// =============================================================================
// ARTICLES
// =============================================================================

#[derive(Deserialize)]
pub struct ArticleQuery {
    condition: Option<String>,
}

/// `GET /api/articles?condition=`: newest first; no condition lists all.
pub async fn articles(
    State(state): State<AppState>,
    Query(query): Query<ArticleQuery>,
) -> Result<Json<Vec<Article>>, ApiError> {
    let condition = query
        .condition
        .as_deref()
        .map(|raw| ArticleCondition::parse(raw).ok_or_else(|| invalid_condition(raw)))
        .transpose()?;
    Ok(Json(content::list_articles(&state.pool, condition).await?))
}

/// `GET /api/articles/{id}`
pub async fn article(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Article>, ApiError> {
    content::get_article(&state.pool, &id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Article not found"))
}

// =============================================================================
// QUICK FACTS & INSPIRATIONS
// =============================================================================

#[derive(Deserialize)]
pub struct QuickFactsQuery {
    condition: Option<String>,
    limit: Option<usize>,
}

/// `GET /api/quick-facts?condition=&limit=`: a random sample.
pub async fn quick_facts(
    State(state): State<AppState>,
    Query(query): Query<QuickFactsQuery>,
) -> Result<Json<Vec<QuickFact>>, ApiError> {
    let condition = thyroid_condition(query.condition.as_deref())?;
    let facts = content::list_quick_facts(&state.pool, condition).await?;
    Ok(Json(content::sample(facts, query.limit.unwrap_or(DEFAULT_QUICK_FACTS))))
}

/// `GET /api/inspirations`
pub async fn inspirations(State(state): State<AppState>) -> Result<Json<Vec<Inspiration>>, ApiError> {
    Ok(Json(content::list_inspirations(&state.pool).await?))
}

/// `GET /api/inspirations/random`
pub async fn random_inspiration(State(state): State<AppState>) -> Result<Json<Inspiration>, ApiError> {
    content::random_inspiration(&state.pool)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("No inspirations available"))
}
