use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A medication embedded in a customer record.
///
/// Has no identity of its own; it is addressed by its position in the
/// owning customer's list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub medicine_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,
    /// e.g. "Once a day", "Twice a day"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    /// e.g. "Morning", "Afternoon", "Night"
    #[serde(default)]
    pub timings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub reminder_enabled: bool,
}

impl Medication {
    pub fn new(medicine_name: impl Into<String>) -> Self {
        Self {
            medicine_name: medicine_name.into(),
            dosage: None,
            frequency: None,
            timings: Vec::new(),
            start_date: None,
            end_date: None,
            reminder_enabled: false,
        }
    }

    /// Check the fields the store requires.
    pub fn validate(&self) -> Result<(), String> {
        if self.medicine_name.trim().is_empty() {
            return Err("Medicine name is required".into());
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err("End date cannot be before start date".into());
            }
        }
        Ok(())
    }
}
