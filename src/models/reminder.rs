use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

pub const DAILY: &str = "Daily";

/// Weekday abbreviations in Monday-first order, as they appear in day lists.
pub const WEEKDAY_ABBREVIATIONS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reminder {
    pub id: String,
    pub medication_id: String,
    /// Name captured when the reminder was written; shown if the medication is gone.
    pub medication_name: Option<String>,
    /// Clock time, "HH:MM"
    pub time: String,
    pub days: DaySet,
    pub is_enabled: bool,
}

impl Reminder {
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.is_enabled && self.days.contains(date.weekday())
    }
}

/// Days a reminder applies to. Serialized as a list of strings: `["Daily"]`
/// or a subset of `["Mon", ..., "Sun"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub enum DaySet {
    Daily,
    Days(Vec<Weekday>),
}

impl DaySet {
    /// Builds an explicit day set, sorted Monday-first with duplicates removed.
    pub fn days(days: impl IntoIterator<Item = Weekday>) -> Self {
        let mut days: Vec<Weekday> = days.into_iter().collect();
        days.sort_by_key(|d| d.num_days_from_monday());
        days.dedup();
        DaySet::Days(days)
    }

    pub fn contains(&self, day: Weekday) -> bool {
        match self {
            DaySet::Daily => true,
            DaySet::Days(days) => days.contains(&day),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, DaySet::Days(days) if days.is_empty())
    }
}

pub fn weekday_abbreviation(day: Weekday) -> &'static str {
    WEEKDAY_ABBREVIATIONS[day.num_days_from_monday() as usize]
}

fn parse_weekday(label: &str) -> Option<Weekday> {
    match label {
        "Mon" => Some(Weekday::Mon),
        "Tue" => Some(Weekday::Tue),
        "Wed" => Some(Weekday::Wed),
        "Thu" => Some(Weekday::Thu),
        "Fri" => Some(Weekday::Fri),
        "Sat" => Some(Weekday::Sat),
        "Sun" => Some(Weekday::Sun),
        _ => None,
    }
}

impl TryFrom<Vec<String>> for DaySet {
    type Error = String;

    /// Any list containing "Daily" collapses to `Daily`.
    fn try_from(labels: Vec<String>) -> Result<Self, Self::Error> {
        if labels.iter().any(|l| l == DAILY) {
            return Ok(DaySet::Daily);
        }
        let days = labels
            .iter()
            .map(|l| parse_weekday(l).ok_or_else(|| format!("Unknown day '{}'", l)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DaySet::days(days))
    }
}

impl From<DaySet> for Vec<String> {
    fn from(set: DaySet) -> Self {
        match set {
            DaySet::Daily => vec![DAILY.to_string()],
            DaySet::Days(days) => days
                .into_iter()
                .map(|d| weekday_abbreviation(d).to_string())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reminder(days: DaySet, is_enabled: bool) -> Reminder {
        Reminder {
            id: "r1".into(),
            medication_id: "1".into(),
            medication_name: Some("Lisinopril".into()),
            time: "08:00".into(),
            days,
            is_enabled,
        }
    }

    #[test]
    fn test_daily_collapses_other_days() {
        let set = DaySet::try_from(vec!["Mon".to_string(), "Daily".to_string()]).unwrap();
        assert_eq!(set, DaySet::Daily);
    }

    #[test]
    fn test_days_sorted_and_deduplicated() {
        let set = DaySet::try_from(vec![
            "Fri".to_string(),
            "Mon".to_string(),
            "Fri".to_string(),
        ])
        .unwrap();
        assert_eq!(set, DaySet::Days(vec![Weekday::Mon, Weekday::Fri]));
    }

    #[test]
    fn test_unknown_day_rejected() {
        assert!(DaySet::try_from(vec!["Monday".to_string()]).is_err());
    }

    #[test]
    fn test_day_set_serializes_as_strings() {
        let json = serde_json::to_value(DaySet::days([Weekday::Wed, Weekday::Mon])).unwrap();
        assert_eq!(json, serde_json::json!(["Mon", "Wed"]));
        let json = serde_json::to_value(DaySet::Daily).unwrap();
        assert_eq!(json, serde_json::json!(["Daily"]));
    }

    #[test]
    fn test_active_on_matching_weekday_only() {
        let r = reminder(DaySet::days([Weekday::Mon, Weekday::Wed]), true);
        let monday = NaiveDate::from_ymd_opt(2026, 2, 9).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2026, 2, 10).unwrap();
        assert!(r.is_active_on(monday));
        assert!(!r.is_active_on(tuesday));
    }

    #[test]
    fn test_disabled_reminder_never_active() {
        let r = reminder(DaySet::Daily, false);
        let date = NaiveDate::from_ymd_opt(2026, 2, 9).unwrap();
        assert!(!r.is_active_on(date));
    }
}
