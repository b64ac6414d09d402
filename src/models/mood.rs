use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Great,
    Good,
    Okay,
    Bad,
    Terrible,
}

impl Mood {
    /// Great, good and okay count as a good day on the weekly view.
    pub fn is_positive(self) -> bool {
        matches!(self, Mood::Great | Mood::Good | Mood::Okay)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Great => "great",
            Mood::Good => "good",
            Mood::Okay => "okay",
            Mood::Bad => "bad",
            Mood::Terrible => "terrible",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoodEntry {
    pub id: String,
    pub date: NaiveDate,
    /// None when only notes were written for the day
    pub mood: Option<Mood>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_moods() {
        let all = [Mood::Great, Mood::Good, Mood::Okay, Mood::Bad, Mood::Terrible];
        let positive: Vec<Mood> = all.into_iter().filter(|m| m.is_positive()).collect();
        assert_eq!(positive, vec![Mood::Great, Mood::Good, Mood::Okay]);
    }

    #[test]
    fn test_mood_serde_lowercase() {
        assert_eq!(serde_json::to_value(Mood::Terrible).unwrap(), "terrible");
        let mood: Mood = serde_json::from_str("\"okay\"").unwrap();
        assert_eq!(mood, Mood::Okay);
        assert!(serde_json::from_str::<Mood>("\"meh\"").is_err());
    }
}
