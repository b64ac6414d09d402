use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Medication {
    pub id: String,
    pub name: String,
    pub dosage: String,
    /// Free-text description, e.g. "Twice daily with meals"
    pub schedule: String,
    pub notes: Option<String>,
    pub image_url: Option<String>,
}

impl Medication {
    /// Display label used in summaries and prompts, e.g. "Lisinopril (10mg)".
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.dosage)
    }
}
