//! In-process application state.
//!
//! Everything lives behind one `RwLock`. Handlers hold the lock only for
//! synchronous derivations and mutations, never across a model call.

pub mod seed;

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::chat::{ChatMessage, ChatSender};
use crate::models::medication::Medication;
use crate::models::reminder::{weekday_abbreviation, DaySet, Reminder, DAILY};
use crate::models::user::UserProfile;
use crate::services::assistant::{SummaryInput, CHAT_INTRO};
use crate::services::schedule::{build_daily_schedule, DailySchedule};
use crate::services::tracker::StatusTracker;

#[derive(Debug, Default)]
pub struct StoreData {
    pub medications: Vec<Medication>,
    pub reminders: Vec<Reminder>,
    pub tracker: StatusTracker,
    pub profile: UserProfile,
    pub chat: Vec<ChatMessage>,
}

impl StoreData {
    /// An empty store with the chat transcript opened by Phil.
    pub fn empty() -> Self {
        let mut data = Self::default();
        data.push_chat(ChatSender::Phil, CHAT_INTRO);
        data
    }

    // ---- Medications ----

    pub fn medication(&self, id: &str) -> AppResult<&Medication> {
        self.medications
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| AppError::NotFound("Medication not found".into()))
    }

    pub fn medication_mut(&mut self, id: &str) -> AppResult<&mut Medication> {
        self.medications
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| AppError::NotFound("Medication not found".into()))
    }

    pub fn insert_medication(&mut self, medication: Medication) {
        self.medications.push(medication);
    }

    /// Keeps the display name stored on reminders in step with a rename.
    pub fn sync_reminder_names(&mut self, medication_id: &str) {
        let Some(name) = self
            .medications
            .iter()
            .find(|m| m.id == medication_id)
            .map(|m| m.name.clone())
        else {
            return;
        };
        for reminder in self
            .reminders
            .iter_mut()
            .filter(|r| r.medication_id == medication_id)
        {
            reminder.medication_name = Some(name.clone());
        }
    }

    /// Removes the medication. Reminders pointing at it are kept and fall
    /// back to their stored display name.
    pub fn remove_medication(&mut self, id: &str) -> AppResult<Medication> {
        let index = self
            .medications
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| AppError::NotFound("Medication not found".into()))?;
        Ok(self.medications.remove(index))
    }

    // ---- Reminders ----

    pub fn reminder_mut(&mut self, id: &str) -> AppResult<&mut Reminder> {
        self.reminders
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound("Reminder not found".into()))
    }

    /// Display name for a reminder about to be written. The medication must
    /// exist at write time.
    pub fn medication_name_for_reminder(&self, medication_id: &str) -> AppResult<String> {
        self.medications
            .iter()
            .find(|m| m.id == medication_id)
            .map(|m| m.name.clone())
            .ok_or_else(|| {
                AppError::Validation(format!("Medication '{}' does not exist", medication_id))
            })
    }

    pub fn insert_reminder(&mut self, reminder: Reminder) {
        self.reminders.push(reminder);
    }

    pub fn remove_reminder(&mut self, id: &str) -> AppResult<Reminder> {
        let index = self
            .reminders
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound("Reminder not found".into()))?;
        Ok(self.reminders.remove(index))
    }

    /// Reminders sorted for display: by time, then id.
    pub fn sorted_reminders(&self) -> Vec<Reminder> {
        let mut reminders = self.reminders.clone();
        reminders.sort_by(|a, b| a.time.cmp(&b.time).then_with(|| a.id.cmp(&b.id)));
        reminders
    }

    // ---- Derived views ----

    pub fn schedule_for(&self, date: NaiveDate) -> AppResult<DailySchedule> {
        build_daily_schedule(date, &self.reminders, &self.medications)
    }

    /// Material for the doctor-visit summary: the medication list, enabled
    /// reminders and the mood diary for the last `mood_days` days.
    pub fn summary_input(
        &self,
        today: NaiveDate,
        mood_days: i64,
        additional_context: Option<String>,
    ) -> SummaryInput {
        let medication_list = self.medications.iter().map(Medication::label).collect();
        let dosage_details = self
            .medications
            .iter()
            .map(|m| format!("{}: {}, {}", m.name, m.dosage, m.schedule))
            .collect();

        let schedule = self
            .sorted_reminders()
            .iter()
            .filter(|r| r.is_enabled)
            .map(|r| {
                let name = self
                    .medications
                    .iter()
                    .find(|m| m.id == r.medication_id)
                    .map(|m| m.name.clone())
                    .or_else(|| r.medication_name.clone())
                    .unwrap_or_else(|| crate::services::schedule::UNKNOWN_MEDICATION.to_string());
                format!("{} at {} ({})", name, r.time, describe_days(&r.days))
            })
            .collect();

        let start = today - Duration::days(mood_days.max(1) - 1);
        let mut entries = self.tracker.mood_entries(start, today);
        entries.reverse();
        let mood_diary = entries
            .iter()
            .map(|e| {
                let mood = e.mood.map(|m| m.as_str()).unwrap_or("no mood");
                match e.notes.as_deref() {
                    Some(notes) => format!("{}: {} ({})", e.date, mood, notes),
                    None => format!("{}: {}", e.date, mood),
                }
            })
            .collect();

        SummaryInput {
            medication_list,
            dosage_details,
            schedule,
            mood_diary,
            additional_context,
        }
    }

    // ---- Chat ----

    pub fn push_chat(&mut self, sender: ChatSender, text: impl Into<String>) -> ChatMessage {
        let message = ChatMessage {
            id: Uuid::new_v4().to_string(),
            sender,
            text: text.into(),
        };
        self.chat.push(message.clone());
        message
    }
}

fn describe_days(days: &DaySet) -> String {
    match days {
        DaySet::Daily => DAILY.to_string(),
        DaySet::Days(days) => days
            .iter()
            .map(|d| weekday_abbreviation(*d))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

#[derive(Clone)]
pub struct Store {
    inner: Arc<RwLock<StoreData>>,
}

impl Store {
    pub fn new(data: StoreData) -> Self {
        Self {
            inner: Arc::new(RwLock::new(data)),
        }
    }

    /// Builds the startup store, optionally loaded with the sample data.
    pub fn bootstrap(seed_demo_data: bool, today: NaiveDate) -> Self {
        let data = if seed_demo_data {
            seed::demo_data(today)
        } else {
            StoreData::empty()
        };
        tracing::info!(
            medications = data.medications.len(),
            reminders = data.reminders.len(),
            seeded = seed_demo_data,
            "Store initialized"
        );
        Self::new(data)
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, StoreData> {
        self.inner.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, StoreData> {
        self.inner.write().await
    }
}
