use serde_json::Value;

use super::{InferenceClient, InferenceError};
use crate::config::join_url;
use crate::forms::DiabetesRiskFactors;

impl InferenceClient {
    /// Score diabetes risk. The response body is returned as-is; the
    /// service does not commit to a shape.
    pub async fn predict_diabetes(
        &self,
        factors: &DiabetesRiskFactors,
    ) -> Result<Value, InferenceError> {
        let url = join_url(&self.diabetes_base, "/predict/diabetes");
        let response = self
            .http
            .post(&url)
            .json(factors)
            .send()
            .await
            .map_err(InferenceError::from_transport)?;

        if !response.status().is_success() {
            tracing::warn!(status = response.status().as_u16(), "Diabetes prediction rejected");
            return Err(InferenceError::PredictionFailed);
        }

        response
            .json::<Value>()
            .await
            .map_err(|_| InferenceError::UnexpectedResponse)
    }
}
