use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::mood::Mood;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DoseStatus {
    Taken,
    #[default]
    Pending,
}

impl DoseStatus {
    pub fn from_taken(taken: bool) -> Self {
        if taken {
            Self::Taken
        } else {
            Self::Pending
        }
    }

    pub fn is_taken(self) -> bool {
        self == Self::Taken
    }
}

/// Everything recorded for one calendar date. Only `taken` markers are kept in
/// `doses`; a reminder missing from the map is pending.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DayRecord {
    pub doses: HashMap<String, DoseStatus>,
    pub mood: Option<Mood>,
    pub notes: Option<String>,
}

impl DayRecord {
    pub fn status(&self, reminder_id: &str) -> DoseStatus {
        self.doses.get(reminder_id).copied().unwrap_or_default()
    }
}
