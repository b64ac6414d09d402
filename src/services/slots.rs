//! Time-of-day buckets used to group a day's doses.
//!
//! Hour ranges are half-open and cover the whole day:
//! Morning [5,12), Lunch [12,17), Dinner [17,21), Night [21,24) and [0,5).

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TimeSlot {
    Morning,
    Lunch,
    Dinner,
    Night,
}

impl TimeSlot {
    /// Display order on the daily log.
    pub const ALL: [TimeSlot; 4] = [
        TimeSlot::Morning,
        TimeSlot::Lunch,
        TimeSlot::Dinner,
        TimeSlot::Night,
    ];

    pub fn for_hour(hour: u32) -> TimeSlot {
        match hour {
            5..=11 => TimeSlot::Morning,
            12..=16 => TimeSlot::Lunch,
            17..=20 => TimeSlot::Dinner,
            _ => TimeSlot::Night,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeSlot::Morning => "Morning",
            TimeSlot::Lunch => "Lunch",
            TimeSlot::Dinner => "Dinner",
            TimeSlot::Night => "Night",
        }
    }

    pub fn parse(s: &str) -> Option<TimeSlot> {
        match s.to_ascii_lowercase().as_str() {
            "morning" => Some(TimeSlot::Morning),
            "lunch" => Some(TimeSlot::Lunch),
            "dinner" => Some(TimeSlot::Dinner),
            "night" => Some(TimeSlot::Night),
            _ => None,
        }
    }
}

/// Parses a strict 24-hour "HH:MM" string into (hour, minute).
pub fn parse_clock_time(time: &str) -> AppResult<(u32, u32)> {
    let invalid = || AppError::InvalidTimeFormat(time.to_string());

    let bytes = time.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return Err(invalid());
    }
    let digits_ok = [0, 1, 3, 4].iter().all(|&i| bytes[i].is_ascii_digit());
    if !digits_ok {
        return Err(invalid());
    }

    let hour: u32 = time[..2].parse().map_err(|_| invalid())?;
    let minute: u32 = time[3..].parse().map_err(|_| invalid())?;
    if hour > 23 || minute > 59 {
        return Err(invalid());
    }
    Ok((hour, minute))
}

pub fn classify_slot(time: &str) -> AppResult<TimeSlot> {
    let (hour, _) = parse_clock_time(time)?;
    Ok(TimeSlot::for_hour(hour))
}

/// `validator` hook for request bodies carrying a reminder time.
pub fn validate_clock_time(time: &str) -> Result<(), validator::ValidationError> {
    parse_clock_time(time)
        .map(|_| ())
        .map_err(|_| validator::ValidationError::new("invalid_time_format"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_hour_maps_to_one_slot() {
        let mut counts = std::collections::HashMap::new();
        for hour in 0..24 {
            let slot = classify_slot(&format!("{:02}:00", hour)).unwrap();
            *counts.entry(slot).or_insert(0) += 1;
        }
        assert_eq!(counts[&TimeSlot::Morning], 7);
        assert_eq!(counts[&TimeSlot::Lunch], 5);
        assert_eq!(counts[&TimeSlot::Dinner], 4);
        assert_eq!(counts[&TimeSlot::Night], 8);
    }

    #[test]
    fn test_slot_boundaries() {
        assert_eq!(classify_slot("04:59").unwrap(), TimeSlot::Night);
        assert_eq!(classify_slot("05:00").unwrap(), TimeSlot::Morning);
        assert_eq!(classify_slot("11:59").unwrap(), TimeSlot::Morning);
        assert_eq!(classify_slot("12:00").unwrap(), TimeSlot::Lunch);
        assert_eq!(classify_slot("16:59").unwrap(), TimeSlot::Lunch);
        assert_eq!(classify_slot("17:00").unwrap(), TimeSlot::Dinner);
        assert_eq!(classify_slot("20:59").unwrap(), TimeSlot::Dinner);
        assert_eq!(classify_slot("21:00").unwrap(), TimeSlot::Night);
    }

    #[test]
    fn test_midnight_wraps_to_night() {
        assert_eq!(classify_slot("23:59").unwrap(), TimeSlot::Night);
        assert_eq!(classify_slot("00:00").unwrap(), TimeSlot::Night);
    }

    #[test]
    fn test_malformed_times_rejected() {
        for bad in ["", "8:00", "08:0", "24:00", "12:60", "ab:cd", "08-00", "08:00:00", " 8:00"] {
            assert!(
                matches!(classify_slot(bad), Err(AppError::InvalidTimeFormat(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_slot_parse_case_insensitive() {
        assert_eq!(TimeSlot::parse("Morning"), Some(TimeSlot::Morning));
        assert_eq!(TimeSlot::parse("night"), Some(TimeSlot::Night));
        assert_eq!(TimeSlot::parse("brunch"), None);
    }
}
