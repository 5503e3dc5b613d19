//! HTTP clients for the external ML services.
//!
//! The services themselves are opaque; only request and response shapes
//! are fixed here.

pub mod bbn;
pub mod diabetes;
pub mod images;

pub use bbn::{Prediction, SymptomPredictionResponse, SymptomsResponse};
pub use images::{Classification, ImageModel};

use std::time::Duration;

use crate::config::{PortalConfig, ServiceEndpoints, DEFAULT_UPLOAD_TIMEOUT_SECS};
use crate::forms::FormError;

/// Errors surfaced by inference calls. `Display` is the inline message.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error(transparent)]
    Validation(#[from] FormError),
    #[error("Request timed out. The server may be busy; try again.")]
    Timeout,
    #[error("Unable to reach the server. Ensure the backend is running.")]
    Unreachable,
    #[error("Server error {status}: {detail}")]
    Server { status: u16, detail: String },
    #[error("Unexpected response from server")]
    UnexpectedResponse,
    #[error("Prediction request failed")]
    PredictionFailed,
    #[error("Unable to reach ML service.")]
    MlServiceUnavailable,
    #[error("HTTP client error: {0}")]
    Http(String),
}

impl InferenceError {
    /// Classify a transport failure as timeout, unreachable, or other.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            InferenceError::Timeout
        } else if err.is_connect() {
            InferenceError::Unreachable
        } else {
            InferenceError::Http(err.to_string())
        }
    }
}

/// Client for the image, diabetes, and symptom-network services.
#[derive(Debug, Clone)]
pub struct InferenceClient {
    http: reqwest::Client,
    image_base: String,
    diabetes_base: String,
    bbn_base: String,
    upload_timeout: Duration,
}

impl InferenceClient {
    pub fn new(endpoints: &ServiceEndpoints, upload_timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            image_base: endpoints.image_inference.trim_end_matches('/').to_string(),
            diabetes_base: endpoints.diabetes.trim_end_matches('/').to_string(),
            bbn_base: endpoints.bbn.trim_end_matches('/').to_string(),
            upload_timeout,
        }
    }

    /// Services and upload timeout as resolved from `MEDPORTAL_*`.
    pub fn from_config(config: &PortalConfig) -> Self {
        Self::new(&config.endpoints, config.upload_timeout)
    }

    /// Local services with the default upload timeout.
    pub fn default_local() -> Self {
        Self::new(
            &ServiceEndpoints::default(),
            Duration::from_secs(DEFAULT_UPLOAD_TIMEOUT_SECS),
        )
    }

    pub fn upload_timeout(&self) -> Duration {
        self.upload_timeout
    }
}
