use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::error::AppResult;
use crate::models::medication::Medication;
use crate::models::reminder::Reminder;
use crate::services::schedule::build_daily_schedule;
use crate::services::tracker::StatusTracker;

const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Background category of a day card on the weekly view.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DayCategory {
    Future,
    Today,
    /// Past day with a great/good/okay mood
    Good,
    /// Past day with a bad/terrible mood or no mood at all
    Bad,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeekDay {
    pub date: NaiveDate,
    pub day_name: &'static str,
    pub medication_count: usize,
    pub category: DayCategory,
}

/// Monday of the ISO week containing `date`.
pub fn find_monday(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

pub fn day_category(date: NaiveDate, today: NaiveDate, tracker: &StatusTracker) -> DayCategory {
    if date > today {
        return DayCategory::Future;
    }
    if date == today {
        return DayCategory::Today;
    }
    let positive = tracker
        .mood_entry(date)
        .and_then(|e| e.mood)
        .map(|m| m.is_positive())
        .unwrap_or(false);
    if positive {
        DayCategory::Good
    } else {
        DayCategory::Bad
    }
}

/// The Monday-first week around `today`. Derived fresh on every call.
pub fn weekly_view(
    today: NaiveDate,
    reminders: &[Reminder],
    medications: &[Medication],
    tracker: &StatusTracker,
) -> AppResult<Vec<WeekDay>> {
    let monday = find_monday(today);
    DAY_NAMES
        .iter()
        .enumerate()
        .map(|(i, &day_name)| {
            let date = monday + Duration::days(i as i64);
            let schedule = build_daily_schedule(date, reminders, medications)?;
            Ok(WeekDay {
                date,
                day_name,
                medication_count: schedule.len(),
                category: day_category(date, today, tracker),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::mood::Mood;
    use crate::models::reminder::DaySet;
    use chrono::Weekday;

    // Wednesday
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 11).unwrap()
    }

    #[test]
    fn test_find_monday() {
        assert_eq!(find_monday(today()), NaiveDate::from_ymd_opt(2026, 2, 9).unwrap());
        let sunday = NaiveDate::from_ymd_opt(2026, 2, 15).unwrap();
        assert_eq!(find_monday(sunday), NaiveDate::from_ymd_opt(2026, 2, 9).unwrap());
        let monday = NaiveDate::from_ymd_opt(2026, 2, 9).unwrap();
        assert_eq!(find_monday(monday), monday);
    }

    #[test]
    fn test_past_day_categories() {
        let mut tracker = StatusTracker::new();
        let monday = today() - Duration::days(2);
        let tuesday = today() - Duration::days(1);
        let last_week = today() - Duration::days(7);
        tracker.set_mood(monday, Some(Mood::Bad), None);
        tracker.set_mood(last_week, Some(Mood::Good), None);

        assert_eq!(day_category(monday, today(), &tracker), DayCategory::Bad);
        assert_eq!(day_category(tuesday, today(), &tracker), DayCategory::Bad);
        assert_eq!(day_category(last_week, today(), &tracker), DayCategory::Good);
    }

    #[test]
    fn test_okay_counts_as_good_and_terrible_as_bad() {
        let mut tracker = StatusTracker::new();
        let a = today() - Duration::days(1);
        let b = today() - Duration::days(2);
        tracker.set_mood(a, Some(Mood::Okay), None);
        tracker.set_mood(b, Some(Mood::Terrible), None);
        assert_eq!(day_category(a, today(), &tracker), DayCategory::Good);
        assert_eq!(day_category(b, today(), &tracker), DayCategory::Bad);
    }

    #[test]
    fn test_notes_only_past_day_is_bad() {
        let mut tracker = StatusTracker::new();
        let yesterday = today() - Duration::days(1);
        tracker.set_mood(yesterday, None, Some("No mood picked".into()));
        assert_eq!(day_category(yesterday, today(), &tracker), DayCategory::Bad);
    }

    #[test]
    fn test_today_and_future_ignore_mood() {
        let mut tracker = StatusTracker::new();
        tracker.set_mood(today(), Some(Mood::Terrible), None);
        let next_week = today() + Duration::days(7);
        tracker.set_mood(next_week, Some(Mood::Great), None);

        assert_eq!(day_category(today(), today(), &tracker), DayCategory::Today);
        assert_eq!(day_category(next_week, today(), &tracker), DayCategory::Future);
    }

    #[test]
    fn test_weekly_view_counts_and_order() {
        let reminders = vec![
            Reminder {
                id: "r1".into(),
                medication_id: "1".into(),
                medication_name: Some("Lisinopril".into()),
                time: "08:00".into(),
                days: DaySet::Daily,
                is_enabled: true,
            },
            Reminder {
                id: "r4".into(),
                medication_id: "3".into(),
                medication_name: Some("Vitamin D3".into()),
                time: "08:30".into(),
                days: DaySet::days([Weekday::Mon, Weekday::Wed, Weekday::Fri]),
                is_enabled: true,
            },
        ];
        let tracker = StatusTracker::new();
        let week = weekly_view(today(), &reminders, &[], &tracker).unwrap();

        assert_eq!(week.len(), 7);
        assert_eq!(week[0].day_name, "Monday");
        assert_eq!(week[0].date, NaiveDate::from_ymd_opt(2026, 2, 9).unwrap());
        let counts: Vec<usize> = week.iter().map(|d| d.medication_count).collect();
        assert_eq!(counts, vec![2, 1, 2, 1, 2, 1, 1]);
        let categories: Vec<DayCategory> = week.iter().map(|d| d.category).collect();
        assert_eq!(
            categories,
            vec![
                DayCategory::Bad,
                DayCategory::Bad,
                DayCategory::Today,
                DayCategory::Future,
                DayCategory::Future,
                DayCategory::Future,
                DayCategory::Future,
            ]
        );
    }
}
