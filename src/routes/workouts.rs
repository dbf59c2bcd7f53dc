//! Workout routes, served from the static catalog.

use axum::Json;
use axum::extract::{Path, Query};
use serde::Deserialize;

use super::error::ApiError;
use crate::services::workouts::{self, Exercise, ExerciseKind, StrengthCategory, WorkoutType};

/// `GET /api/workouts`
pub async fn workout_types() -> Json<&'static [WorkoutType]> {
    Json(workouts::WORKOUT_TYPES)
}

/// `GET /api/workouts/strength`
pub async fn strength_categories() -> Json<&'static [StrengthCategory]> {
    Json(workouts::STRENGTH_CATEGORIES)
}

#[derive(Deserialize)]
pub struct ExerciseQuery {
    search: Option<String>,
    difficulty: Option<u8>,
}

/// `GET /api/workouts/{kind}?search=&difficulty=` for `cardio` or `yoga`.
pub async fn exercises(
    Path(kind): Path<String>,
    Query(query): Query<ExerciseQuery>,
) -> Result<Json<Vec<Exercise>>, ApiError> {
    let kind = ExerciseKind::parse(&kind).ok_or_else(|| ApiError::not_found("Workout type not found"))?;
    Ok(Json(workouts::find_exercises(kind, query.search.as_deref(), query.difficulty)))
}
