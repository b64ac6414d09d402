//! # PillPal: Request/Response DTOs
//!
//! Conventions:
//! - `*Request`  → deserialized from client JSON body or query params
//! - `*Response` → serialized to client JSON
//! - Field validation uses `validator` derive macros; cross-field rules live
//!   in `validate_*` helpers below

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::chat::ChatMessage;
use crate::models::mood::{Mood, MoodEntry};
use crate::models::reminder::DaySet;
use crate::models::status::DoseStatus;
use crate::services::assistant::ReplySource;
use crate::services::schedule::{ScheduledDose, SlotState};
use crate::services::slots::TimeSlot;
use crate::services::tracker::MoodChange;
use crate::services::weekly::WeekDay;

// ============================================================================
// Common
// ============================================================================

/// Standard delete confirmation
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
    pub id: String,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn trimmed(value: String) -> String {
    value.trim().to_string()
}

// ============================================================================
// Medications
// ============================================================================

/// POST /api/medications
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMedicationRequest {
    #[validate(length(min = 2, max = 200, message = "Medication name must be at least 2 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 100, message = "Dosage is required"))]
    pub dosage: String,

    /// Free-text schedule, e.g. "Twice daily with meals"
    #[validate(length(min = 5, max = 500, message = "Schedule details are required"))]
    pub schedule: String,

    #[validate(length(max = 2000))]
    pub notes: Option<String>,

    /// Empty string is treated as "no image"
    #[validate(url(message = "Please enter a valid image URL"))]
    pub image_url: Option<String>,
}

impl CreateMedicationRequest {
    /// Trims the text fields so length rules apply to what gets stored.
    pub fn normalize(mut self) -> Self {
        self.name = trimmed(self.name);
        self.dosage = trimmed(self.dosage);
        self.schedule = trimmed(self.schedule);
        self.notes = blank_to_none(self.notes);
        self.image_url = blank_to_none(self.image_url);
        self
    }
}

/// PUT /api/medications/{id}, partial update
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMedicationRequest {
    #[validate(length(min = 2, max = 200, message = "Medication name must be at least 2 characters"))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Dosage is required"))]
    pub dosage: Option<String>,

    #[validate(length(min = 5, max = 500, message = "Schedule details are required"))]
    pub schedule: Option<String>,

    #[validate(length(max = 2000))]
    pub notes: Option<String>,

    #[validate(url(message = "Please enter a valid image URL"))]
    pub image_url: Option<String>,
}

impl UpdateMedicationRequest {
    /// Trims the fields being changed. Blank `notes`/`image_url` are left
    /// as-is so the handler can treat them as "clear".
    pub fn normalize(mut self) -> Self {
        self.name = self.name.map(trimmed);
        self.dosage = self.dosage.map(trimmed);
        self.schedule = self.schedule.map(trimmed);
        self
    }
}

// ============================================================================
// Reminders
// ============================================================================

/// POST /api/reminders
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReminderRequest {
    #[validate(length(min = 1, message = "Please select a medication"))]
    pub medication_id: String,

    /// 24-hour "HH:MM"
    #[validate(custom = "crate::services::slots::validate_clock_time")]
    pub time: String,

    /// `["Daily"]` or a subset of `["Mon", ..., "Sun"]`
    pub days: DaySet,

    #[serde(default = "default_enabled")]
    pub is_enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// PUT /api/reminders/{id}, partial update
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateReminderRequest {
    #[validate(length(min = 1, message = "Please select a medication"))]
    pub medication_id: Option<String>,

    #[validate(custom = "crate::services::slots::validate_clock_time")]
    pub time: Option<String>,

    pub days: Option<DaySet>,

    pub is_enabled: Option<bool>,
}

pub fn validate_days(days: &DaySet) -> Result<(), String> {
    if days.is_empty() {
        return Err("Select at least one day or 'Daily'".into());
    }
    Ok(())
}

/// GET /api/reminders/upcoming query params
#[derive(Debug, Deserialize)]
pub struct UpcomingQuery {
    /// Default: today
    pub date: Option<NaiveDate>,
    /// Default: 3, max: 20
    pub limit: Option<usize>,
}

impl UpcomingQuery {
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(3).clamp(1, 20)
    }
}

// ============================================================================
// Daily log
// ============================================================================

/// A scheduled dose with its current status
#[derive(Debug, Serialize)]
pub struct DoseView {
    #[serde(flatten)]
    pub dose: ScheduledDose,
    pub status: DoseStatus,
}

#[derive(Debug, Serialize)]
pub struct SlotView {
    pub slot: TimeSlot,
    pub state: SlotState,
    pub doses: Vec<DoseView>,
}

/// GET /api/daily-logs/{date}
#[derive(Debug, Serialize)]
pub struct DailyLogResponse {
    pub date: NaiveDate,
    pub slots: Vec<SlotView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<Mood>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// PUT /api/daily-logs/{date}/doses/{reminder_id}
#[derive(Debug, Deserialize)]
pub struct SetDoseRequest {
    pub taken: bool,
}

#[derive(Debug, Serialize)]
pub struct SetDoseResponse {
    pub date: NaiveDate,
    pub reminder_id: String,
    pub status: DoseStatus,
    pub changed: bool,
}

/// Response for POST /api/daily-logs/{date}/slots/{slot}/toggle
#[derive(Debug, Serialize)]
pub struct SlotToggleResponse {
    /// "marked", "unmarked" or "empty"
    pub action: String,
    pub changed: Vec<String>,
    pub log: DailyLogResponse,
}

/// PUT /api/daily-logs/{date}/mood
#[derive(Debug, Deserialize, Validate)]
pub struct MoodRequest {
    /// null clears the mood
    pub mood: Option<Mood>,

    #[validate(length(max = 5000, message = "Notes must be under 5000 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MoodResponse {
    pub date: NaiveDate,
    /// "upserted", "removed" or "unchanged"
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<MoodEntry>,
}

impl MoodResponse {
    pub fn new(date: NaiveDate, change: MoodChange) -> Self {
        let (action, entry) = match change {
            MoodChange::Upserted(entry) => ("upserted", Some(entry)),
            MoodChange::Removed => ("removed", None),
            MoodChange::Unchanged => ("unchanged", None),
        };
        Self {
            date,
            action: action.to_string(),
            entry,
        }
    }
}

/// GET /api/mood query params
#[derive(Debug, Deserialize)]
pub struct MoodQuery {
    /// Default: 30 days before end_date
    pub start_date: Option<NaiveDate>,
    /// Default: today
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct MoodListResponse {
    pub entries: Vec<MoodEntry>,
}

// ============================================================================
// Weekly view
// ============================================================================

/// GET /api/week
#[derive(Debug, Serialize)]
pub struct WeekResponse {
    pub today: NaiveDate,
    pub days: Vec<WeekDay>,
}

// ============================================================================
// Assistant
// ============================================================================

/// POST /api/assistant/ask
#[derive(Debug, Deserialize, Validate)]
pub struct AskRequest {
    #[validate(length(min = 1, max = 2000, message = "Please type your question for Phil"))]
    pub question: String,

    /// Default: "General Health"
    pub medication_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
    pub source: ReplySource,
}

/// POST /api/assistant/schedule-chat
#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1, max = 2000, message = "Message must not be empty"))]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatTranscriptResponse {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct ChatReplyResponse {
    pub reply: ChatMessage,
    pub source: ReplySource,
    pub messages: Vec<ChatMessage>,
}

/// POST /api/assistant/summary
#[derive(Debug, Default, Deserialize, Validate)]
pub struct SummaryRequest {
    #[validate(length(max = 5000))]
    pub additional_context: Option<String>,

    /// Days of mood diary to include. Default: 30, max: 90
    pub mood_days: Option<i64>,
}

impl SummaryRequest {
    pub fn mood_days(&self) -> i64 {
        self.mood_days.unwrap_or(30).clamp(1, 90)
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
    pub source: ReplySource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_medication_validation() {
        let req: CreateMedicationRequest = serde_json::from_str(
            r#"{"name":"L","dosage":"","schedule":"day","image_url":"not a url"}"#,
        )
        .unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("dosage"));
        assert!(fields.contains_key("schedule"));
        assert!(fields.contains_key("image_url"));
    }

    #[test]
    fn test_empty_image_url_normalized_away() {
        let req: CreateMedicationRequest = serde_json::from_str(
            r#"{"name":"Lisinopril","dosage":"10mg","schedule":"Once daily","image_url":"","notes":"  "}"#,
        )
        .unwrap();
        let req = req.normalize();
        assert!(req.image_url.is_none());
        assert!(req.notes.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_padded_fields_trimmed_before_validation() {
        let req: CreateMedicationRequest = serde_json::from_str(
            r#"{"name":" L ","dosage":" ","schedule":"     "}"#,
        )
        .unwrap();
        let errors = req.normalize().validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("dosage"));
        assert!(fields.contains_key("schedule"));

        let req: UpdateMedicationRequest =
            serde_json::from_str(r#"{"name":"  Lisinopril  ","schedule":"   day   "}"#).unwrap();
        let req = req.normalize();
        assert_eq!(req.name.as_deref(), Some("Lisinopril"));
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_reminder_time_validation() {
        let ok: CreateReminderRequest =
            serde_json::from_str(r#"{"medication_id":"1","time":"08:00","days":["Daily"]}"#).unwrap();
        assert!(ok.validate().is_ok());
        assert!(ok.is_enabled);

        let bad: CreateReminderRequest =
            serde_json::from_str(r#"{"medication_id":"1","time":"8:00","days":["Mon"]}"#).unwrap();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_reminder_days_must_not_be_empty() {
        let req: CreateReminderRequest =
            serde_json::from_str(r#"{"medication_id":"1","time":"08:00","days":[]}"#).unwrap();
        assert!(validate_days(&req.days).is_err());
    }

    #[test]
    fn test_reminder_unknown_day_fails_to_parse() {
        let result = serde_json::from_str::<CreateReminderRequest>(
            r#"{"medication_id":"1","time":"08:00","days":["Funday"]}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_mood_request_null_mood() {
        let req: MoodRequest = serde_json::from_str(r#"{"mood":null,"notes":""}"#).unwrap();
        assert!(req.mood.is_none());
        assert!(serde_json::from_str::<MoodRequest>(r#"{"mood":"ecstatic"}"#).is_err());
    }

    #[test]
    fn test_query_limits_clamped() {
        let q = UpcomingQuery { date: None, limit: Some(500) };
        assert_eq!(q.limit(), 20);
        let q = UpcomingQuery { date: None, limit: None };
        assert_eq!(q.limit(), 3);
        let s = SummaryRequest { additional_context: None, mood_days: Some(0) };
        assert_eq!(s.mood_days(), 1);
    }

    #[test]
    fn test_ask_requires_question() {
        let req: AskRequest = serde_json::from_str(r#"{"question":""}"#).unwrap();
        assert!(req.validate().is_err());
    }
}
