use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::Gender;
use super::medication::Medication;
use super::report::Report;

/// The persisted customer aggregate as exposed to clients.
///
/// The password hash lives only in the store and never appears here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub email: String,
    #[serde(rename = "med_id")]
    pub med_id: String,
    #[serde(flatten)]
    pub medical: MedicalProfile,
    #[serde(default)]
    pub medications: Vec<Medication>,
    #[serde(default)]
    pub reports: Vec<Report>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Optional medical profile, filled after signup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalProfile {
    #[serde(default)]
    pub blood_group: Option<String>,
    /// Centimeters.
    #[serde(default)]
    pub height: Option<f64>,
    /// Kilograms.
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub chronic_diseases: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
}

/// Identity fields captured at registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub email: String,
    pub med_id: String,
    pub password_hash: String,
}

/// Partial profile update; absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chronic_diseases: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergies: Option<Vec<String>>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.blood_group.is_none()
            && self.height.is_none()
            && self.weight.is_none()
            && self.chronic_diseases.is_none()
            && self.allergies.is_none()
    }

    /// Reject measurements that cannot describe a person.
    pub fn validate(&self) -> Result<(), String> {
        for (label, value) in [("Height", self.height), ("Weight", self.weight)] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(format!("{label} must be a non-negative number"));
                }
            }
        }
        Ok(())
    }

    /// Overlay the present fields onto an existing profile.
    pub fn apply_to(self, profile: &mut MedicalProfile) {
        if let Some(blood_group) = self.blood_group {
            profile.blood_group = Some(blood_group);
        }
        if let Some(height) = self.height {
            profile.height = Some(height);
        }
        if let Some(weight) = self.weight {
            profile.weight = Some(weight);
        }
        if let Some(diseases) = self.chronic_diseases {
            profile.chronic_diseases = diseases;
        }
        if let Some(allergies) = self.allergies {
            profile.allergies = allergies;
        }
    }
}

/// Generate a platform identifier: `MED-` and ten uppercase hex digits.
pub fn generate_med_id() -> String {
    let simple = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("MED-{}", &simple[..10])
}
