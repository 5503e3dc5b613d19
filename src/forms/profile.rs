use crate::forms::{parse_number, FormError};
use crate::models::{Customer, ProfileUpdate};

/// Medical-profile form. Measurements are kept as typed text until submit.
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub blood_group: String,
    pub height: String,
    pub weight: String,
    pub chronic_diseases: Vec<String>,
    pub allergies: Vec<String>,
}

impl ProfileForm {
    /// Pre-fill from a stored profile.
    pub fn from_customer(customer: &Customer) -> Self {
        let medical = &customer.medical;
        Self {
            blood_group: medical.blood_group.clone().unwrap_or_default(),
            height: medical.height.map(|h| h.to_string()).unwrap_or_default(),
            weight: medical.weight.map(|w| w.to_string()).unwrap_or_default(),
            chronic_diseases: medical.chronic_diseases.clone(),
            allergies: medical.allergies.clone(),
        }
    }

    /// Returns `false` when the trimmed input is blank.
    pub fn add_chronic_disease(&mut self, value: &str) -> bool {
        push_trimmed(&mut self.chronic_diseases, value)
    }

    pub fn remove_chronic_disease(&mut self, index: usize) -> Option<String> {
        remove_at(&mut self.chronic_diseases, index)
    }

    /// Returns `false` when the trimmed input is blank.
    pub fn add_allergy(&mut self, value: &str) -> bool {
        push_trimmed(&mut self.allergies, value)
    }

    pub fn remove_allergy(&mut self, index: usize) -> Option<String> {
        remove_at(&mut self.allergies, index)
    }

    /// Build the PATCH body. Height and weight go out as numbers.
    pub fn to_update(&self) -> Result<ProfileUpdate, FormError> {
        let height = parse_number("Height", &self.height)?;
        let weight = parse_number("Weight", &self.weight)?;
        for (field, value) in [("Height", height), ("Weight", weight)] {
            if matches!(value, Some(v) if v < 0.0) {
                return Err(FormError::Negative(field));
            }
        }

        let blood_group = self.blood_group.trim();
        Ok(ProfileUpdate {
            blood_group: (!blood_group.is_empty()).then(|| blood_group.to_string()),
            height,
            weight,
            chronic_diseases: Some(self.chronic_diseases.clone()),
            allergies: Some(self.allergies.clone()),
        })
    }
}

fn push_trimmed(list: &mut Vec<String>, value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return false;
    }
    list.push(value.to_string());
    true
}

fn remove_at(list: &mut Vec<String>, index: usize) -> Option<String> {
    (index < list.len()).then(|| list.remove(index))
}
