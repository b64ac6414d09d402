use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{Duration, NaiveDate};
use serde_json::json;
use validator::Validate;

use crate::dto::{
    DailyLogResponse, DoseView, MoodListResponse, MoodQuery, MoodRequest, MoodResponse,
    SetDoseRequest, SetDoseResponse, SlotToggleResponse, SlotView,
};
use crate::error::{AppError, AppResult};
use crate::handlers::{broadcast, today};
use crate::models::status::DoseStatus;
use crate::services::motivator::{EventKind, MotivatorEvent};
use crate::services::slots::TimeSlot;
use crate::store::StoreData;
use crate::AppState;

/// Default mood list window, in days including `end_date`.
const MOOD_LIST_DAYS: i64 = 30;

fn build_log(store: &StoreData, date: NaiveDate) -> AppResult<DailyLogResponse> {
    let schedule = store.schedule_for(date)?;
    let record = store.tracker.day(date);

    let slots = schedule
        .slots
        .iter()
        .map(|group| SlotView {
            slot: group.slot,
            state: schedule.slot_state(group.slot, record),
            doses: group
                .doses
                .iter()
                .map(|dose| DoseView {
                    dose: dose.clone(),
                    status: store.tracker.get_status(date, &dose.reminder_id),
                })
                .collect(),
        })
        .collect();

    Ok(DailyLogResponse {
        date,
        slots,
        mood: record.and_then(|r| r.mood),
        notes: record.and_then(|r| r.notes.clone()),
    })
}

fn broadcast_status(state: &AppState, date: NaiveDate, changed: &[String]) {
    broadcast(
        state,
        json!({
            "type": "status_changed",
            "date": date,
            "reminder_ids": changed,
        }),
    );
}

/// Schedule for the date with each dose's status and the day's mood.
pub async fn get_daily_log(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
) -> AppResult<Json<DailyLogResponse>> {
    let store = state.store.read().await;
    Ok(Json(build_log(&store, date)?))
}

/// Marks one dose taken or pending. Repeating the same value is a no-op and
/// does not notify the motivator.
pub async fn set_dose_status(
    State(state): State<AppState>,
    Path((date, reminder_id)): Path<(NaiveDate, String)>,
    Json(body): Json<SetDoseRequest>,
) -> AppResult<Json<SetDoseResponse>> {
    let (changed, medication_name) = {
        let mut store = state.store.write().await;
        let schedule = store.schedule_for(date)?;
        let medication_name = schedule
            .doses()
            .into_iter()
            .find(|d| d.reminder_id == reminder_id)
            .map(|d| d.medication_name.clone())
            .ok_or_else(|| {
                AppError::NotFound(format!("Reminder {} is not scheduled on {}", reminder_id, date))
            })?;
        let changed = store.tracker.set_taken(date, &reminder_id, body.taken);
        (changed, medication_name)
    };

    if changed {
        tracing::info!(date = %date, reminder_id = %reminder_id, taken = body.taken, "Dose status changed");
        broadcast_status(&state, date, std::slice::from_ref(&reminder_id));
        let event = if body.taken {
            MotivatorEvent::new(
                EventKind::MedicationTaken,
                format!("{} marked as taken on {}.", medication_name, date),
            )
        } else {
            MotivatorEvent::new(
                EventKind::StatusSaved,
                format!("{} un-marked on {}.", medication_name, date),
            )
        };
        state.motivator.notify(event).await;
    }

    Ok(Json(SetDoseResponse {
        date,
        reminder_id,
        status: DoseStatus::from_taken(body.taken),
        changed,
    }))
}

/// The slot's single toggle button: mark all taken unless all already are.
pub async fn toggle_slot(
    State(state): State<AppState>,
    Path((date, slot)): Path<(NaiveDate, String)>,
) -> AppResult<Json<SlotToggleResponse>> {
    let slot = TimeSlot::parse(&slot)
        .ok_or_else(|| AppError::NotFound(format!("Unknown time slot '{}'", slot)))?;

    let (update, log) = {
        let mut store = state.store.write().await;
        let schedule = store.schedule_for(date)?;
        let update = store.tracker.toggle_slot(&schedule, slot);
        (update, build_log(&store, date)?)
    };

    let Some(update) = update else {
        return Ok(Json(SlotToggleResponse {
            action: "empty".into(),
            changed: Vec::new(),
            log,
        }));
    };

    tracing::info!(
        date = %date,
        slot = slot.label(),
        taken = update.taken,
        changed = update.changed.len(),
        "Slot toggled"
    );
    if let Some(event) = update.event() {
        broadcast_status(&state, date, &update.changed);
        state.motivator.notify(event).await;
    }

    Ok(Json(SlotToggleResponse {
        action: if update.taken { "marked" } else { "unmarked" }.into(),
        changed: update.changed,
        log,
    }))
}

/// Upserts the mood entry for the date; a null mood with blank notes
/// removes it.
pub async fn set_mood(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
    Json(body): Json<MoodRequest>,
) -> AppResult<Json<MoodResponse>> {
    body.validate()?;

    let change = state
        .store
        .write()
        .await
        .tracker
        .set_mood(date, body.mood, body.notes);

    if let Some(event) = change.event(date) {
        tracing::info!(date = %date, event = event.kind.tag(), "Mood log changed");
        broadcast(&state, json!({ "type": "mood_changed", "date": date }));
        state.motivator.notify(event).await;
    }

    Ok(Json(MoodResponse::new(date, change)))
}

/// Mood entries, newest first. Defaults to the 30 days ending today.
pub async fn list_moods(
    State(state): State<AppState>,
    Query(query): Query<MoodQuery>,
) -> AppResult<Json<MoodListResponse>> {
    let end = query.end_date.unwrap_or_else(today);
    let start = match query.start_date {
        Some(start) => start,
        None => end
            .checked_sub_signed(Duration::days(MOOD_LIST_DAYS - 1))
            .ok_or_else(|| AppError::Validation("end_date is out of range".into()))?,
    };
    if start > end {
        return Err(AppError::Validation(
            "start_date must not be after end_date".into(),
        ));
    }

    let store = state.store.read().await;
    Ok(Json(MoodListResponse {
        entries: store.tracker.mood_entries(start, end),
    }))
}
