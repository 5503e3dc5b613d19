use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata for a report file held by external storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// e.g. "Blood Test", "MRI", "Prescription"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_type: Option<String>,
    pub file_url: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Report as submitted by a client; `uploadedAt` is stamped by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_type: Option<String>,
    pub file_url: String,
}

impl NewReport {
    pub fn validate(&self) -> Result<(), String> {
        if self.file_url.trim().is_empty() {
            return Err("File URL is required".into());
        }
        Ok(())
    }

    /// Stamp the upload time.
    pub fn into_report(self, uploaded_at: DateTime<Utc>) -> Report {
        Report {
            report_type: self.report_type,
            file_url: self.file_url,
            uploaded_at,
        }
    }
}
