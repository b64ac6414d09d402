//! Sample data loaded at startup when `SEED_DEMO_DATA` is on.

use chrono::{Duration, NaiveDate, Utc, Weekday};

use crate::models::medication::Medication;
use crate::models::mood::{Mood, MoodEntry};
use crate::models::reminder::{DaySet, Reminder};
use crate::models::user::{SubscriptionTier, UserProfile};

use super::StoreData;

const MEDICATION_IMAGE: &str = "https://placehold.co/40x40.png";

fn medication(id: &str, name: &str, dosage: &str, schedule: &str, notes: Option<&str>) -> Medication {
    Medication {
        id: id.into(),
        name: name.into(),
        dosage: dosage.into(),
        schedule: schedule.into(),
        notes: notes.map(String::from),
        image_url: Some(MEDICATION_IMAGE.into()),
    }
}

fn reminder(id: &str, medication: &Medication, time: &str, days: DaySet, is_enabled: bool) -> Reminder {
    Reminder {
        id: id.into(),
        medication_id: medication.id.clone(),
        medication_name: Some(medication.name.clone()),
        time: time.into(),
        days,
        is_enabled,
    }
}

fn mood_entry(id: &str, date: NaiveDate, mood: Mood, notes: &str) -> MoodEntry {
    MoodEntry {
        id: id.into(),
        date,
        mood: Some(mood),
        notes: Some(notes.into()),
    }
}

/// Three medications, four reminders (one disabled) and mood entries for
/// the two days before `today` and `today` itself.
pub fn demo_data(today: NaiveDate) -> StoreData {
    let mut data = StoreData::empty();

    data.profile = UserProfile {
        name: "Alex Doe".into(),
        email: "alex.doe@example.com".into(),
        avatar_url: Some("https://placehold.co/100x100.png".into()),
        subscription_tier: SubscriptionTier::Trial,
        trial_ends: Some(Utc::now() + Duration::days(30)),
    };

    let lisinopril = medication(
        "1",
        "Lisinopril",
        "10mg",
        "Once daily in the morning",
        Some("For blood pressure"),
    );
    let metformin = medication(
        "2",
        "Metformin",
        "500mg",
        "Twice daily with meals",
        Some("For diabetes"),
    );
    let vitamin_d = medication("3", "Vitamin D3", "2000 IU", "Once daily with breakfast", None);

    data.reminders = vec![
        reminder("r1", &lisinopril, "08:00", DaySet::Daily, true),
        reminder("r2", &metformin, "09:00", DaySet::Daily, true),
        reminder("r3", &metformin, "18:00", DaySet::Daily, true),
        reminder(
            "r4",
            &vitamin_d,
            "08:30",
            DaySet::days([Weekday::Mon, Weekday::Wed, Weekday::Fri]),
            false,
        ),
    ];
    data.medications = vec![lisinopril, metformin, vitamin_d];

    for entry in [
        mood_entry("m1", today - Duration::days(2), Mood::Good, "Felt energetic."),
        mood_entry("m2", today - Duration::days(1), Mood::Okay, "A bit tired."),
        mood_entry("m3", today, Mood::Great, "Productive day!"),
    ] {
        data.tracker.insert_mood_entry(entry);
    }

    data
}
