use chrono::NaiveDate;
use serde::Serialize;

use crate::error::AppResult;
use crate::models::medication::Medication;
use crate::models::reminder::Reminder;
use crate::models::status::{DayRecord, DoseStatus};
use crate::services::slots::{classify_slot, TimeSlot};

pub const UNKNOWN_MEDICATION: &str = "Unknown medication";

/// One reminder due on a given day, joined with its medication.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScheduledDose {
    pub reminder_id: String,
    pub medication_id: String,
    pub medication_name: String,
    pub dosage: Option<String>,
    pub image_url: Option<String>,
    pub time: String,
    pub slot: TimeSlot,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotGroup {
    pub slot: TimeSlot,
    pub doses: Vec<ScheduledDose>,
}

/// The doses due on one date, always holding all four slots in display order.
#[derive(Debug, Clone, Serialize)]
pub struct DailySchedule {
    pub date: NaiveDate,
    pub slots: Vec<SlotGroup>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SlotState {
    /// Nothing scheduled in this slot
    Empty,
    Pending,
    AllTaken,
}

impl DailySchedule {
    pub fn slot(&self, slot: TimeSlot) -> &[ScheduledDose] {
        self.slots
            .iter()
            .find(|g| g.slot == slot)
            .map(|g| g.doses.as_slice())
            .unwrap_or(&[])
    }

    /// All doses of the day in time order.
    pub fn doses(&self) -> Vec<&ScheduledDose> {
        let mut doses: Vec<&ScheduledDose> = self.slots.iter().flat_map(|g| g.doses.iter()).collect();
        doses.sort_by(|a, b| a.time.cmp(&b.time).then_with(|| a.reminder_id.cmp(&b.reminder_id)));
        doses
    }

    pub fn len(&self) -> usize {
        self.slots.iter().map(|g| g.doses.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn slot_state(&self, slot: TimeSlot, record: Option<&DayRecord>) -> SlotState {
        let doses = self.slot(slot);
        if doses.is_empty() {
            return SlotState::Empty;
        }
        let all_taken = doses.iter().all(|d| {
            record
                .map(|r| r.status(&d.reminder_id))
                .unwrap_or_default()
                .is_taken()
        });
        if all_taken {
            SlotState::AllTaken
        } else {
            SlotState::Pending
        }
    }
}

/// Resolves the name shown for a reminder. Dangling references fall back to
/// the name stored on the reminder.
fn join_medication<'a>(reminder: &Reminder, medications: &'a [Medication]) -> (String, Option<&'a Medication>) {
    match medications.iter().find(|m| m.id == reminder.medication_id) {
        Some(med) => (med.name.clone(), Some(med)),
        None => {
            tracing::debug!(
                reminder_id = %reminder.id,
                medication_id = %reminder.medication_id,
                "Reminder references a missing medication"
            );
            let name = reminder
                .medication_name
                .clone()
                .unwrap_or_else(|| UNKNOWN_MEDICATION.to_string());
            (name, None)
        }
    }
}

pub fn build_daily_schedule(
    date: NaiveDate,
    reminders: &[Reminder],
    medications: &[Medication],
) -> AppResult<DailySchedule> {
    let mut active: Vec<&Reminder> = reminders.iter().filter(|r| r.is_active_on(date)).collect();
    active.sort_by(|a, b| a.time.cmp(&b.time).then_with(|| a.id.cmp(&b.id)));

    let mut slots: Vec<SlotGroup> = TimeSlot::ALL
        .iter()
        .map(|&slot| SlotGroup { slot, doses: Vec::new() })
        .collect();

    for reminder in active {
        let slot = classify_slot(&reminder.time)?;
        let (medication_name, medication) = join_medication(reminder, medications);
        let dose = ScheduledDose {
            reminder_id: reminder.id.clone(),
            medication_id: reminder.medication_id.clone(),
            medication_name,
            dosage: medication.map(|m| m.dosage.clone()),
            image_url: medication.and_then(|m| m.image_url.clone()),
            time: reminder.time.clone(),
            slot,
        };
        if let Some(group) = slots.iter_mut().find(|g| g.slot == slot) {
            group.doses.push(dose);
        }
    }

    Ok(DailySchedule { date, slots })
}

#[derive(Debug, Clone, Serialize)]
pub struct UpcomingDose {
    #[serde(flatten)]
    pub dose: ScheduledDose,
    pub status: DoseStatus,
}

/// The first `limit` doses of the day, earliest first.
pub fn upcoming(
    date: NaiveDate,
    reminders: &[Reminder],
    medications: &[Medication],
    record: Option<&DayRecord>,
    limit: usize,
) -> AppResult<Vec<UpcomingDose>> {
    let schedule = build_daily_schedule(date, reminders, medications)?;
    Ok(schedule
        .doses()
        .into_iter()
        .take(limit)
        .map(|dose| UpcomingDose {
            status: record.map(|r| r.status(&dose.reminder_id)).unwrap_or_default(),
            dose: dose.clone(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::reminder::DaySet;
    use chrono::Weekday;

    fn med(id: &str, name: &str) -> Medication {
        Medication {
            id: id.into(),
            name: name.into(),
            dosage: "10mg".into(),
            schedule: "Once daily".into(),
            notes: None,
            image_url: None,
        }
    }

    fn reminder(id: &str, medication_id: &str, time: &str, days: DaySet, enabled: bool) -> Reminder {
        Reminder {
            id: id.into(),
            medication_id: medication_id.into(),
            medication_name: Some(format!("Stored {}", medication_id)),
            time: time.into(),
            days,
            is_enabled: enabled,
        }
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 9).unwrap()
    }

    #[test]
    fn test_groups_by_slot_in_time_order() {
        let meds = vec![med("1", "Lisinopril"), med("2", "Metformin")];
        let reminders = vec![
            reminder("r3", "2", "18:00", DaySet::Daily, true),
            reminder("r2", "2", "09:00", DaySet::Daily, true),
            reminder("r1", "1", "08:00", DaySet::Daily, true),
        ];
        let schedule = build_daily_schedule(monday(), &reminders, &meds).unwrap();

        assert_eq!(schedule.slots.len(), 4);
        let morning: Vec<&str> = schedule
            .slot(TimeSlot::Morning)
            .iter()
            .map(|d| d.reminder_id.as_str())
            .collect();
        assert_eq!(morning, vec!["r1", "r2"]);
        assert_eq!(schedule.slot(TimeSlot::Dinner)[0].medication_name, "Metformin");
        assert!(schedule.slot(TimeSlot::Lunch).is_empty());
        assert_eq!(schedule.len(), 3);
    }

    #[test]
    fn test_activity_rule_filters_days_and_disabled() {
        let meds = vec![med("3", "Vitamin D3")];
        let reminders = vec![
            reminder("a", "3", "08:30", DaySet::days([Weekday::Mon, Weekday::Fri]), true),
            reminder("b", "3", "08:30", DaySet::days([Weekday::Tue]), true),
            reminder("c", "3", "08:30", DaySet::Daily, false),
        ];
        for offset in 0..7 {
            let date = monday() + chrono::Duration::days(offset);
            let schedule = build_daily_schedule(date, &reminders, &meds).unwrap();
            let ids: Vec<String> = schedule.doses().iter().map(|d| d.reminder_id.clone()).collect();
            for r in &reminders {
                assert_eq!(ids.contains(&r.id), r.is_active_on(date), "{} on {}", r.id, date);
            }
        }
    }

    #[test]
    fn test_dangling_reference_uses_stored_name() {
        let reminders = vec![reminder("r1", "gone", "08:00", DaySet::Daily, true)];
        let schedule = build_daily_schedule(monday(), &reminders, &[]).unwrap();
        let dose = &schedule.slot(TimeSlot::Morning)[0];
        assert_eq!(dose.medication_name, "Stored gone");
        assert!(dose.dosage.is_none());
    }

    #[test]
    fn test_dangling_reference_without_stored_name() {
        let mut r = reminder("r1", "gone", "08:00", DaySet::Daily, true);
        r.medication_name = None;
        let schedule = build_daily_schedule(monday(), &[r], &[]).unwrap();
        assert_eq!(schedule.slot(TimeSlot::Morning)[0].medication_name, UNKNOWN_MEDICATION);
    }

    #[test]
    fn test_malformed_time_fails_build() {
        let reminders = vec![reminder("r1", "1", "8am", DaySet::Daily, true)];
        let result = build_daily_schedule(monday(), &reminders, &[med("1", "Lisinopril")]);
        assert!(matches!(result, Err(AppError::InvalidTimeFormat(_))));
    }

    #[test]
    fn test_malformed_time_on_inactive_reminder_ignored() {
        let reminders = vec![reminder("r1", "1", "8am", DaySet::Daily, false)];
        let schedule = build_daily_schedule(monday(), &reminders, &[]).unwrap();
        assert!(schedule.is_empty());
    }

    #[test]
    fn test_slot_state_distinguishes_empty_from_taken() {
        let meds = vec![med("1", "Lisinopril")];
        let reminders = vec![reminder("r1", "1", "08:00", DaySet::Daily, true)];
        let schedule = build_daily_schedule(monday(), &reminders, &meds).unwrap();

        let mut record = DayRecord::default();
        assert_eq!(schedule.slot_state(TimeSlot::Morning, Some(&record)), SlotState::Pending);
        record.doses.insert("r1".into(), DoseStatus::Taken);
        assert_eq!(schedule.slot_state(TimeSlot::Morning, Some(&record)), SlotState::AllTaken);
        assert_eq!(schedule.slot_state(TimeSlot::Lunch, Some(&record)), SlotState::Empty);
        assert_eq!(schedule.slot_state(TimeSlot::Lunch, None), SlotState::Empty);
    }

    #[test]
    fn test_upcoming_limits_and_reports_status() {
        let meds = vec![med("1", "Lisinopril"), med("2", "Metformin")];
        let reminders = vec![
            reminder("r1", "1", "08:00", DaySet::Daily, true),
            reminder("r2", "2", "09:00", DaySet::Daily, true),
            reminder("r3", "2", "18:00", DaySet::Daily, true),
            reminder("r4", "2", "22:00", DaySet::Daily, true),
        ];
        let mut record = DayRecord::default();
        record.doses.insert("r2".into(), DoseStatus::Taken);

        let next = upcoming(monday(), &reminders, &meds, Some(&record), 3).unwrap();
        let ids: Vec<&str> = next.iter().map(|u| u.dose.reminder_id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r2", "r3"]);
        assert_eq!(next[1].status, DoseStatus::Taken);
        assert_eq!(next[0].status, DoseStatus::Pending);
    }
}
