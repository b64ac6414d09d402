use axum::{extract::State, Json};

use crate::models::user::UserProfile;
use crate::AppState;

pub async fn me(State(state): State<AppState>) -> Json<UserProfile> {
    Json(state.store.read().await.profile.clone())
}
