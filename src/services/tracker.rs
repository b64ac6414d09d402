//! Per-date taken/pending markers and mood entries.
//!
//! Day records are created on first write and never pruned. Mood entries are
//! unique per date; the mood and notes are mirrored onto the day record.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::models::mood::{Mood, MoodEntry};
use crate::models::status::{DayRecord, DoseStatus};
use crate::services::motivator::{EventKind, MotivatorEvent};
use crate::services::schedule::DailySchedule;
use crate::services::slots::TimeSlot;

#[derive(Debug, Default)]
pub struct StatusTracker {
    days: HashMap<NaiveDate, DayRecord>,
    moods: BTreeMap<NaiveDate, MoodEntry>,
}

/// Result of a slot-wide mark.
#[derive(Debug, Clone, Serialize)]
pub struct SlotUpdate {
    pub date: NaiveDate,
    pub slot: TimeSlot,
    pub taken: bool,
    /// Reminders whose state actually changed
    pub changed: Vec<String>,
}

impl SlotUpdate {
    pub fn event(&self) -> Option<MotivatorEvent> {
        if self.changed.is_empty() {
            return None;
        }
        let label = self.slot.label();
        Some(if self.taken {
            MotivatorEvent::new(
                EventKind::MedicationTaken,
                format!("All {} medications marked as taken on {}.", label, self.date),
            )
        } else {
            MotivatorEvent::new(
                EventKind::StatusSaved,
                format!("{} medications un-marked on {}.", label, self.date),
            )
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MoodChange {
    Upserted(MoodEntry),
    Removed,
    Unchanged,
}

impl MoodChange {
    pub fn event(&self, date: NaiveDate) -> Option<MotivatorEvent> {
        match self {
            MoodChange::Upserted(entry) => {
                let context = match entry.mood {
                    Some(mood) => format!("Feeling {} on {}.", mood.as_str(), date),
                    None => format!("Added notes for {}.", date),
                };
                Some(MotivatorEvent::new(EventKind::MoodLogged, context))
            }
            MoodChange::Removed => Some(MotivatorEvent::new(
                EventKind::MoodCleared,
                format!("Cleared the mood log for {}.", date),
            )),
            MoodChange::Unchanged => None,
        }
    }
}

fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}

impl StatusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DayRecord> {
        self.days.get(&date)
    }

    pub fn get_status(&self, date: NaiveDate, reminder_id: &str) -> DoseStatus {
        self.days
            .get(&date)
            .map(|r| r.status(reminder_id))
            .unwrap_or_default()
    }

    /// Returns true if the stored state changed.
    pub fn set_taken(&mut self, date: NaiveDate, reminder_id: &str, taken: bool) -> bool {
        let record = self.days.entry(date).or_default();
        let before = record.status(reminder_id);
        if taken {
            record.doses.insert(reminder_id.to_string(), DoseStatus::Taken);
        } else {
            record.doses.remove(reminder_id);
        }
        before != DoseStatus::from_taken(taken)
    }

    pub fn mark_all_in_slot(
        &mut self,
        schedule: &DailySchedule,
        slot: TimeSlot,
        taken: bool,
    ) -> SlotUpdate {
        let date = schedule.date;
        let changed = schedule
            .slot(slot)
            .iter()
            .filter(|dose| self.set_taken(date, &dose.reminder_id, taken))
            .map(|dose| dose.reminder_id.clone())
            .collect();
        SlotUpdate {
            date,
            slot,
            taken,
            changed,
        }
    }

    /// Marks the whole slot taken unless every dose in it already is, in which
    /// case it un-marks them all. Empty slots are left alone.
    pub fn toggle_slot(&mut self, schedule: &DailySchedule, slot: TimeSlot) -> Option<SlotUpdate> {
        let doses = schedule.slot(slot);
        if doses.is_empty() {
            return None;
        }
        let all_taken = doses
            .iter()
            .all(|d| self.get_status(schedule.date, &d.reminder_id).is_taken());
        Some(self.mark_all_in_slot(schedule, slot, !all_taken))
    }

    pub fn mood_entry(&self, date: NaiveDate) -> Option<&MoodEntry> {
        self.moods.get(&date)
    }

    /// Mood entries in the inclusive range, newest first.
    pub fn mood_entries(&self, start: NaiveDate, end: NaiveDate) -> Vec<MoodEntry> {
        if start > end {
            return Vec::new();
        }
        self.moods
            .range(start..=end)
            .rev()
            .map(|(_, entry)| entry.clone())
            .collect()
    }

    /// Upserts the entry for `date`, or removes it when both mood and notes
    /// are empty.
    pub fn set_mood(&mut self, date: NaiveDate, mood: Option<Mood>, notes: Option<String>) -> MoodChange {
        let notes = normalize_notes(notes);

        let change = if mood.is_none() && notes.is_none() {
            match self.moods.remove(&date) {
                Some(_) => MoodChange::Removed,
                None => MoodChange::Unchanged,
            }
        } else {
            match self.moods.get_mut(&date) {
                Some(existing) if existing.mood == mood && existing.notes == notes => {
                    MoodChange::Unchanged
                }
                Some(existing) => {
                    existing.mood = mood;
                    existing.notes = notes.clone();
                    MoodChange::Upserted(existing.clone())
                }
                None => {
                    let entry = MoodEntry {
                        id: Uuid::new_v4().to_string(),
                        date,
                        mood,
                        notes: notes.clone(),
                    };
                    self.moods.insert(date, entry.clone());
                    MoodChange::Upserted(entry)
                }
            }
        };

        if change != MoodChange::Unchanged {
            let record = self.days.entry(date).or_default();
            record.mood = mood;
            record.notes = notes;
        }
        change
    }

    /// Inserts a pre-built entry, replacing any entry for the same date.
    pub fn insert_mood_entry(&mut self, entry: MoodEntry) {
        let record = self.days.entry(entry.date).or_default();
        record.mood = entry.mood;
        record.notes = entry.notes.clone();
        self.moods.insert(entry.date, entry);
    }
}
