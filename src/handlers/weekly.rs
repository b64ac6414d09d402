use axum::{extract::State, Json};

use crate::dto::WeekResponse;
use crate::error::AppResult;
use crate::handlers::today;
use crate::services::weekly::weekly_view;
use crate::AppState;

/// Monday-first week around today, recomputed on every request.
pub async fn get_week(State(state): State<AppState>) -> AppResult<Json<WeekResponse>> {
    let today = today();
    let store = state.store.read().await;
    let days = weekly_view(today, &store.reminders, &store.medications, &store.tracker)?;
    Ok(Json(WeekResponse { today, days }))
}
