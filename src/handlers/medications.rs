use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::{CreateMedicationRequest, DeleteResponse, UpdateMedicationRequest};
use crate::error::AppResult;
use crate::models::medication::Medication;
use crate::AppState;

pub async fn list_medications(State(state): State<AppState>) -> AppResult<Json<Vec<Medication>>> {
    let store = state.store.read().await;
    Ok(Json(store.medications.clone()))
}

pub async fn get_medication(
    State(state): State<AppState>,
    Path(medication_id): Path<String>,
) -> AppResult<Json<Medication>> {
    let store = state.store.read().await;
    let medication = store.medication(&medication_id)?.clone();
    Ok(Json(medication))
}

pub async fn create_medication(
    State(state): State<AppState>,
    Json(body): Json<CreateMedicationRequest>,
) -> AppResult<Json<Medication>> {
    let body = body.normalize();
    body.validate()?;

    let medication = Medication {
        id: Uuid::new_v4().to_string(),
        name: body.name,
        dosage: body.dosage,
        schedule: body.schedule,
        notes: body.notes,
        image_url: body.image_url,
    };

    state.store.write().await.insert_medication(medication.clone());
    tracing::info!(medication_id = %medication.id, name = %medication.name, "Medication created");

    Ok(Json(medication))
}

/// Partial update. An empty `notes` or `image_url` clears the field.
pub async fn update_medication(
    State(state): State<AppState>,
    Path(medication_id): Path<String>,
    Json(body): Json<UpdateMedicationRequest>,
) -> AppResult<Json<Medication>> {
    let mut body = body.normalize();
    let clear_notes = is_blank(body.notes.as_deref());
    let clear_image = is_blank(body.image_url.as_deref());
    if clear_notes {
        body.notes = None;
    }
    if clear_image {
        body.image_url = None;
    }
    body.validate()?;

    let mut store = state.store.write().await;
    let medication = store.medication_mut(&medication_id)?;
    let renamed = body.name.is_some();

    if let Some(name) = body.name {
        medication.name = name;
    }
    if let Some(dosage) = body.dosage {
        medication.dosage = dosage;
    }
    if let Some(schedule) = body.schedule {
        medication.schedule = schedule;
    }
    if clear_notes {
        medication.notes = None;
    } else if let Some(notes) = body.notes {
        medication.notes = Some(notes);
    }
    if clear_image {
        medication.image_url = None;
    } else if let Some(image_url) = body.image_url {
        medication.image_url = Some(image_url);
    }

    let updated = medication.clone();
    if renamed {
        store.sync_reminder_names(&medication_id);
    }
    tracing::info!(medication_id = %medication_id, "Medication updated");

    Ok(Json(updated))
}

/// Reminders for the medication are left in place and keep showing its
/// last known name.
pub async fn delete_medication(
    State(state): State<AppState>,
    Path(medication_id): Path<String>,
) -> AppResult<Json<DeleteResponse>> {
    let removed = state.store.write().await.remove_medication(&medication_id)?;
    tracing::info!(medication_id = %removed.id, name = %removed.name, "Medication deleted");

    Ok(Json(DeleteResponse {
        deleted: true,
        id: removed.id,
    }))
}

fn is_blank(value: Option<&str>) -> bool {
    matches!(value, Some(v) if v.trim().is_empty())
}
