//! Nourish routes: thyroid-friendly recipes and the menu scanner.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use uuid::Uuid;

use super::error::ApiError;
use super::learn::invalid_condition;
use crate::services::content::{self, Recipe, RecipeCondition};
use crate::services::menu_scan::{self, MenuItemScore};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RecipeQuery {
    condition: Option<String>,
    search: Option<String>,
}

/// `GET /api/recipes?condition=&search=`: `both` (the default) lists every
/// recipe; any other condition matches exactly.
pub async fn recipes(
    State(state): State<AppState>,
    Query(query): Query<RecipeQuery>,
) -> Result<Json<Vec<Recipe>>, ApiError> {
    let condition = match query.condition.as_deref() {
        None => RecipeCondition::default(),
        Some(raw) => RecipeCondition::parse(raw).ok_or_else(|| invalid_condition(raw))?,
    };
    let mut recipes = content::list_recipes(&state.pool, condition).await?;
    recipes.retain(|r| content::matches_search(&r.title, query.search.as_deref()));
    Ok(Json(recipes))
}

/// `GET /api/recipes/{id}`
pub async fn recipe(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Recipe>, ApiError> {
    content::get_recipe(&state.pool, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Recipe not found"))
}

#[derive(Deserialize)]
pub struct MenuScanBody {
    #[serde(default)]
    text: String,
}

/// `POST /api/menu/scan`: score each line of extracted menu text.
pub async fn scan_menu(body: Result<Json<MenuScanBody>, JsonRejection>) -> Result<Json<Vec<MenuItemScore>>, ApiError> {
    let Json(body) = body?;
    let scored = menu_scan::scan_menu(&body.text);
    if scored.is_empty() {
        return Err(ApiError::bad_request("Menu text is required"));
    }
    tracing::info!(items = scored.len(), "menu scanned");
    Ok(Json(scored))
}
