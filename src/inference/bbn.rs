//! Symptom-to-disease Bayesian network service.

use serde::{Deserialize, Serialize};

use super::{InferenceClient, InferenceError};
use crate::config::join_url;

/// One ranked disease hypothesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub disease: String,
    pub probability: f64,
    pub specialization: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymptomsResponse {
    #[serde(default)]
    pub symptoms: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymptomPredictionResponse {
    #[serde(default)]
    pub top_predictions: Vec<Prediction>,
}

#[derive(Serialize)]
struct SymptomPredictionRequest<'a> {
    symptoms: &'a [String],
}

impl InferenceClient {
    /// The symptom vocabulary. A missing list is treated as empty.
    pub async fn fetch_symptoms(&self) -> Result<Vec<String>, InferenceError> {
        let url = join_url(&self.bbn_base, "/symptoms");
        let response = self.http.get(&url).send().await.map_err(|e| {
            tracing::warn!(error = %e, "Symptom vocabulary unavailable");
            InferenceError::MlServiceUnavailable
        })?;
        if !response.status().is_success() {
            return Err(InferenceError::MlServiceUnavailable);
        }
        let body: SymptomsResponse = response
            .json()
            .await
            .map_err(|_| InferenceError::MlServiceUnavailable)?;
        Ok(body.symptoms)
    }

    /// Ranked predictions for the selected symptoms, most likely first.
    pub async fn predict_symptoms(
        &self,
        symptoms: &[String],
    ) -> Result<Vec<Prediction>, InferenceError> {
        let url = join_url(&self.bbn_base, "/predict");
        let response = self
            .http
            .post(&url)
            .json(&SymptomPredictionRequest { symptoms })
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Symptom prediction request failed");
                InferenceError::MlServiceUnavailable
            })?;
        if !response.status().is_success() {
            tracing::warn!(status = response.status().as_u16(), "Symptom prediction rejected");
            return Err(InferenceError::MlServiceUnavailable);
        }
        let body: SymptomPredictionResponse = response
            .json()
            .await
            .map_err(|_| InferenceError::MlServiceUnavailable)?;
        Ok(body.top_predictions)
    }
}
