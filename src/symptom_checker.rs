//! Symptom checker: autocomplete, selection, and urgency routing.
//!
//! Predictions come from the symptom network service (see
//! [`crate::inference::bbn`]); everything here is local state.

use serde::{Deserialize, Serialize};

use crate::inference::Prediction;

/// A top prediction at or above this probability routes to the urgent view.
pub const URGENCY_THRESHOLD: f64 = 0.5;

/// Autocomplete shows at most this many suggestions.
pub const MAX_SUGGESTIONS: usize = 6;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SymptomCheckError {
    #[error("Empty prediction")]
    EmptyPrediction,
}

/// A doctor the patient can be referred to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub name: String,
    pub specialization: String,
}

/// The symptom names known to the prediction service, in service order.
#[derive(Debug, Clone, Default)]
pub struct SymptomVocabulary {
    symptoms: Vec<String>,
}

impl SymptomVocabulary {
    pub fn new(symptoms: Vec<String>) -> Self {
        Self { symptoms }
    }

    pub fn len(&self) -> usize {
        self.symptoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symptoms.is_empty()
    }

    pub fn contains(&self, symptom: &str) -> bool {
        self.symptoms.iter().any(|s| s == symptom)
    }

    /// Suggestions for a search term, excluding what is already selected.
    ///
    /// Whitespace runs in the search map to `_` so "joint pain" finds
    /// `joint_pain`.
    pub fn suggest(&self, search: &str, selected: &[String]) -> Vec<String> {
        if search.is_empty() {
            return Vec::new();
        }
        let needle = normalize_search(search);
        self.symptoms
            .iter()
            .filter(|s| s.to_lowercase().contains(&needle))
            .filter(|s| !selected.contains(*s))
            .take(MAX_SUGGESTIONS)
            .cloned()
            .collect()
    }
}

fn normalize_search(search: &str) -> String {
    let lowered = search.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut in_space = false;
    for c in lowered.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push('_');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Which view the checker is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flow {
    #[default]
    Select,
    Results,
    Urgent,
}

/// Outcome of a prediction, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub enum Assessment {
    Urgent { top: Prediction },
    Results { top: Prediction, doctors: Vec<Doctor> },
}

impl Assessment {
    /// Route on the top prediction. Doctors are matched by exact
    /// specialization.
    pub fn route(predictions: &[Prediction], doctors: &[Doctor]) -> Result<Self, SymptomCheckError> {
        let top = predictions
            .first()
            .cloned()
            .ok_or(SymptomCheckError::EmptyPrediction)?;
        if top.probability >= URGENCY_THRESHOLD {
            return Ok(Assessment::Urgent { top });
        }
        let doctors = doctors
            .iter()
            .filter(|d| d.specialization == top.specialization)
            .cloned()
            .collect();
        Ok(Assessment::Results { top, doctors })
    }

    pub fn flow(&self) -> Flow {
        match self {
            Assessment::Urgent { .. } => Flow::Urgent,
            Assessment::Results { .. } => Flow::Results,
        }
    }

    pub fn top(&self) -> &Prediction {
        match self {
            Assessment::Urgent { top } | Assessment::Results { top, .. } => top,
        }
    }
}

/// Interactive checker state.
#[derive(Debug, Clone, Default)]
pub struct SymptomChecker {
    vocabulary: SymptomVocabulary,
    selected: Vec<String>,
    search: String,
    flow: Flow,
    predictions: Vec<Prediction>,
}

impl SymptomChecker {
    pub fn new(vocabulary: SymptomVocabulary) -> Self {
        Self {
            vocabulary,
            ..Default::default()
        }
    }

    pub fn flow(&self) -> Flow {
        self.flow
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn predictions(&self) -> &[Prediction] {
        &self.predictions
    }

    /// The search box only accepts input while selecting.
    pub fn search_enabled(&self) -> bool {
        self.flow == Flow::Select
    }

    pub fn set_search(&mut self, search: &str) {
        if self.search_enabled() {
            self.search = search.to_string();
        }
    }

    pub fn suggestions(&self) -> Vec<String> {
        self.vocabulary.suggest(&self.search, &self.selected)
    }

    /// Add a symptom and clear the search. Returns `false` if nothing was
    /// added.
    pub fn add_symptom(&mut self, symptom: &str) -> bool {
        if !self.search_enabled() || self.selected.iter().any(|s| s == symptom) {
            return false;
        }
        self.selected.push(symptom.to_string());
        self.search.clear();
        true
    }

    /// Remove a symptom. Any removal returns to selection.
    pub fn remove_symptom(&mut self, symptom: &str) {
        self.selected.retain(|s| s != symptom);
        self.flow = Flow::Select;
    }

    pub fn can_predict(&self) -> bool {
        !self.selected.is_empty()
    }

    /// Record a prediction response and move to the routed view.
    pub fn apply_predictions(
        &mut self,
        predictions: Vec<Prediction>,
        doctors: &[Doctor],
    ) -> Result<Assessment, SymptomCheckError> {
        let assessment = Assessment::route(&predictions, doctors)?;
        self.predictions = predictions;
        self.flow = assessment.flow();
        Ok(assessment)
    }
}

/// `joint_pain` → `Joint Pain`.
///
/// Underscores become spaces and the first character after every word
/// boundary is capitalized, so `pain(left)` reads `Pain(Left)`. Word
/// characters are ASCII letters and digits.
pub fn format_label(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut in_word = false;
    for c in label.chars() {
        let c = if c == '_' { ' ' } else { c };
        let is_word = c.is_ascii_alphanumeric();
        if is_word && !in_word {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
        in_word = is_word;
    }
    out
}
