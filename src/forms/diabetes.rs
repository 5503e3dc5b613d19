use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::forms::{parse_number, FormError};
use crate::models::enums::{ActivityLevel, BiologicalSex, YesNo};

/// The fourteen risk factors posted to `/predict/diabetes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiabetesRiskFactors {
    pub age: f64,
    pub bmi: f64,
    pub blood_pressure: f64,
    pub insulin_level: f64,
    pub cholesterol_level: f64,
    pub triglycerides_level: f64,
    pub daily_calorie_intake: f64,
    pub sugar_intake_grams_per_day: f64,
    pub sleep_hours: f64,
    pub stress_level: f64,
    pub waist_circumference_cm: f64,
    pub gender: BiologicalSex,
    pub physical_activity_level: ActivityLevel,
    pub family_history_diabetes: YesNo,
}

/// Raw text inputs of the risk assessment form.
#[derive(Debug, Clone, Default)]
pub struct DiabetesForm {
    pub age: String,
    pub bmi: String,
    pub blood_pressure: String,
    pub insulin_level: String,
    pub cholesterol_level: String,
    pub triglycerides_level: String,
    pub daily_calorie_intake: String,
    pub sugar_intake_grams_per_day: String,
    pub sleep_hours: String,
    pub stress_level: String,
    pub waist_circumference_cm: String,
    pub gender: String,
    pub physical_activity_level: String,
    pub family_history_diabetes: String,
}

/// Accepted input ranges, inclusive.
struct Range {
    label: &'static str,
    min: f64,
    max: f64,
}

const AGE: Range = Range { label: "Age", min: 0.0, max: 100.0 };
const BMI: Range = Range { label: "BMI", min: 0.0, max: 50.0 };
const WAIST: Range = Range { label: "Waist circumference", min: 0.0, max: 200.0 };
const BLOOD_PRESSURE: Range = Range { label: "Blood pressure", min: 0.0, max: 300.0 };
const INSULIN: Range = Range { label: "Insulin level", min: 0.0, max: 100.0 };
const CHOLESTEROL: Range = Range { label: "Cholesterol level", min: 0.0, max: 300.0 };
const TRIGLYCERIDES: Range = Range { label: "Triglycerides level", min: 0.0, max: 300.0 };
const CALORIES: Range = Range { label: "Daily calorie intake", min: 0.0, max: 10_000.0 };
const SUGAR: Range = Range { label: "Sugar intake", min: 0.0, max: 500.0 };
const SLEEP: Range = Range { label: "Sleep hours", min: 0.0, max: 24.0 };
const STRESS: Range = Range { label: "Stress level", min: 1.0, max: 10.0 };

impl DiabetesForm {
    pub fn validate(&self) -> Result<DiabetesRiskFactors, FormError> {
        Ok(DiabetesRiskFactors {
            age: ranged(&AGE, &self.age)?,
            bmi: ranged(&BMI, &self.bmi)?,
            blood_pressure: ranged(&BLOOD_PRESSURE, &self.blood_pressure)?,
            insulin_level: ranged(&INSULIN, &self.insulin_level)?,
            cholesterol_level: ranged(&CHOLESTEROL, &self.cholesterol_level)?,
            triglycerides_level: ranged(&TRIGLYCERIDES, &self.triglycerides_level)?,
            daily_calorie_intake: ranged(&CALORIES, &self.daily_calorie_intake)?,
            sugar_intake_grams_per_day: ranged(&SUGAR, &self.sugar_intake_grams_per_day)?,
            sleep_hours: ranged(&SLEEP, &self.sleep_hours)?,
            stress_level: ranged(&STRESS, &self.stress_level)?,
            waist_circumference_cm: ranged(&WAIST, &self.waist_circumference_cm)?,
            gender: choice("Gender", &self.gender)?,
            physical_activity_level: choice("Physical activity", &self.physical_activity_level)?,
            family_history_diabetes: choice("Family history", &self.family_history_diabetes)?,
        })
    }

    /// Clear every input back to the initial blank state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn ranged(range: &Range, raw: &str) -> Result<f64, FormError> {
    let value = parse_number(range.label, raw)?.ok_or(FormError::Required(range.label))?;
    if value < range.min || value > range.max {
        return Err(FormError::OutOfRange {
            field: range.label,
            min: range.min,
            max: range.max,
        });
    }
    Ok(value)
}

fn choice<T: FromStr>(label: &'static str, raw: &str) -> Result<T, FormError> {
    T::from_str(raw.trim()).map_err(|_| FormError::InvalidChoice(label))
}
