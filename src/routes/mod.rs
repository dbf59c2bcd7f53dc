//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the JSON API consumed by the ThyroidCloud front-end.
//! Every failing route answers `{ "error": string }` (see [`error`]).
//! The browser view layer is served elsewhere; nothing here renders HTML.

pub mod auth;
pub mod error;
pub mod learn;
pub mod meals;
pub mod nourish;
pub mod workouts;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Full API router with CORS, request tracing and gzip compression.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/confirm", post(auth::confirm))
        .route("/api/auth/resend-confirmation", post(auth::resend_confirmation))
        .route("/api/auth/signin", post(auth::signin))
        .route("/api/auth/signout", post(auth::signout))
        .route("/api/auth/forgot-password", post(auth::forgot_password))
        .route("/api/auth/reset-password", post(auth::reset_password))
        .route("/api/auth/me", get(auth::me))
        .route("/api/analyze-meal", post(meals::analyze_meal))
        .route("/api/meals", get(meals::list_meals))
        .route("/api/meals/suggestions", get(meals::suggestions))
        .route("/api/meals/lookup", get(meals::lookup))
        .route("/api/meals/{id}", get(meals::get_meal).delete(meals::delete_meal))
        .route("/api/glossary", get(learn::glossary))
        .route("/api/glossary/terms/{slug}", get(learn::glossary_term))
        .route("/api/vitamins", get(learn::vitamins))
        .route("/api/vitamins/{id_or_key}", get(learn::vitamin))
        .route("/api/symptoms", get(learn::symptoms))
        .route("/api/symptoms/{condition}/{slug}", get(learn::symptom))
        .route("/api/articles", get(learn::articles))
        .route("/api/articles/{id}", get(learn::article))
        .route("/api/quick-facts", get(learn::quick_facts))
        .route("/api/inspirations", get(learn::inspirations))
        .route("/api/inspirations/random", get(learn::random_inspiration))
        .route("/api/recipes", get(nourish::recipes))
        .route("/api/recipes/{id}", get(nourish::recipe))
        .route("/api/menu/scan", post(nourish::scan_menu))
        .route("/api/workouts", get(workouts::workout_types))
        .route("/api/workouts/strength", get(workouts::strength_categories))
        .route("/api/workouts/{kind}", get(workouts::exercises))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
