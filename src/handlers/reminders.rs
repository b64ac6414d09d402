use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::{
    validate_days, CreateReminderRequest, DeleteResponse, UpcomingQuery, UpdateReminderRequest,
};
use crate::error::{AppError, AppResult};
use crate::handlers::today;
use crate::models::reminder::Reminder;
use crate::services::schedule::{upcoming, UpcomingDose};
use crate::AppState;

pub async fn list_reminders(State(state): State<AppState>) -> AppResult<Json<Vec<Reminder>>> {
    let store = state.store.read().await;
    Ok(Json(store.sorted_reminders()))
}

pub async fn create_reminder(
    State(state): State<AppState>,
    Json(body): Json<CreateReminderRequest>,
) -> AppResult<Json<Reminder>> {
    body.validate()?;
    validate_days(&body.days).map_err(AppError::Validation)?;

    let mut store = state.store.write().await;
    let medication_name = store.medication_name_for_reminder(&body.medication_id)?;

    let reminder = Reminder {
        id: Uuid::new_v4().to_string(),
        medication_id: body.medication_id,
        medication_name: Some(medication_name),
        time: body.time,
        days: body.days,
        is_enabled: body.is_enabled,
    };
    store.insert_reminder(reminder.clone());
    tracing::info!(
        reminder_id = %reminder.id,
        medication_id = %reminder.medication_id,
        time = %reminder.time,
        "Reminder created"
    );

    Ok(Json(reminder))
}

pub async fn update_reminder(
    State(state): State<AppState>,
    Path(reminder_id): Path<String>,
    Json(body): Json<UpdateReminderRequest>,
) -> AppResult<Json<Reminder>> {
    body.validate()?;
    if let Some(days) = body.days.as_ref() {
        validate_days(days).map_err(AppError::Validation)?;
    }

    let mut store = state.store.write().await;
    let medication_name = match body.medication_id.as_deref() {
        Some(id) => Some(store.medication_name_for_reminder(id)?),
        None => None,
    };

    let reminder = store.reminder_mut(&reminder_id)?;
    if let Some(medication_id) = body.medication_id {
        reminder.medication_id = medication_id;
        reminder.medication_name = medication_name;
    }
    if let Some(time) = body.time {
        reminder.time = time;
    }
    if let Some(days) = body.days {
        reminder.days = days;
    }
    if let Some(is_enabled) = body.is_enabled {
        reminder.is_enabled = is_enabled;
    }
    let updated = reminder.clone();
    tracing::info!(reminder_id = %reminder_id, "Reminder updated");

    Ok(Json(updated))
}

/// Taken markers recorded for the reminder stay in the day records.
pub async fn delete_reminder(
    State(state): State<AppState>,
    Path(reminder_id): Path<String>,
) -> AppResult<Json<DeleteResponse>> {
    let removed = state.store.write().await.remove_reminder(&reminder_id)?;
    tracing::info!(reminder_id = %removed.id, "Reminder deleted");

    Ok(Json(DeleteResponse {
        deleted: true,
        id: removed.id,
    }))
}

/// Next doses of the day for the dashboard card.
pub async fn upcoming_reminders(
    State(state): State<AppState>,
    Query(query): Query<UpcomingQuery>,
) -> AppResult<Json<Vec<UpcomingDose>>> {
    let date = query.date.unwrap_or_else(today);
    let store = state.store.read().await;
    let doses = upcoming(
        date,
        &store.reminders,
        &store.medications,
        store.tracker.day(date),
        query.limit(),
    )?;
    Ok(Json(doses))
}
