use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{InferenceClient, InferenceError};
use crate::config::join_url;
use crate::forms::ImageUpload;

/// The image classifiers served by the inference service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageModel {
    BrainTumor,
    OralCancer,
    SkinDisease,
}

impl ImageModel {
    pub fn all() -> &'static [ImageModel] {
        &[Self::BrainTumor, Self::OralCancer, Self::SkinDisease]
    }

    pub fn path(&self) -> &'static str {
        match self {
            Self::BrainTumor => "/predict",
            Self::OralCancer => "/predict/oral",
            Self::SkinDisease => "/predict/skin",
        }
    }

    /// Labels the service is known to return for this model.
    pub fn labels(&self) -> &'static [&'static str] {
        match self {
            Self::BrainTumor => &["glioma", "meningioma", "notumor", "pituitary"],
            Self::OralCancer => &["CANCER", "NON CANCER"],
            Self::SkinDisease => &["Acne", "Eczema", "Psoriasis", "Melanoma", "BCC", "Nevus"],
        }
    }
}

/// Classifier output. `confidence` is a percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: String,
    pub confidence: f64,
}

impl Classification {
    /// Check the response shape: `label` must be a string, `confidence` is
    /// coerced to a number and falls back to 0.
    pub fn from_json(value: &Value) -> Result<Self, InferenceError> {
        let label = value
            .get("label")
            .and_then(Value::as_str)
            .ok_or(InferenceError::UnexpectedResponse)?;
        let confidence = match value.get("confidence") {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0),
            Some(Value::Bool(b)) => f64::from(u8::from(*b)),
            _ => 0.0,
        };
        Ok(Self {
            label: label.to_string(),
            confidence,
        })
    }
}

impl InferenceClient {
    /// Upload an image to one of the classifiers.
    ///
    /// The upload is validated first; an invalid file never reaches the
    /// network.
    pub async fn classify_image(
        &self,
        model: ImageModel,
        upload: &ImageUpload,
    ) -> Result<Classification, InferenceError> {
        upload.validate()?;

        let part = Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.mime_type())
            .map_err(|e| InferenceError::Http(e.to_string()))?;
        let form = Form::new().part("file", part);

        let url = join_url(&self.image_base, model.path());
        tracing::debug!(?model, %url, bytes = upload.len(), "Submitting image for classification");

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .timeout(self.upload_timeout)
            .send()
            .await
            .map_err(InferenceError::from_transport)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(InferenceError::from_transport)?;

        if !status.is_success() {
            let detail = server_error_detail(&body, status.canonical_reason());
            tracing::warn!(?model, status = status.as_u16(), %detail, "Classifier returned error");
            return Err(InferenceError::Server {
                status: status.as_u16(),
                detail,
            });
        }

        let value: Value =
            serde_json::from_str(&body).map_err(|_| InferenceError::UnexpectedResponse)?;
        Classification::from_json(&value)
    }
}

/// Best available description of a failed classification response.
fn server_error_detail(body: &str, reason: Option<&str>) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return match value.get("error") {
            Some(Value::String(msg)) => msg.clone(),
            Some(other) if !other.is_null() => other.to_string(),
            _ => value.to_string(),
        };
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    reason.unwrap_or("Unknown error").to_string()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use axum::extract::Multipart;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;

    use super::*;
    use crate::config::ServiceEndpoints;
    use crate::forms::{FormError, MAX_UPLOAD_BYTES};
    use crate::test_support::spawn_router;

    fn client_for(base: &str, timeout: Duration) -> InferenceClient {
        let endpoints = ServiceEndpoints {
            image_inference: base.to_string(),
            ..Default::default()
        };
        InferenceClient::new(&endpoints, timeout)
    }

    fn png(size: usize) -> ImageUpload {
        ImageUpload::new("scan.png", "image/png", vec![7u8; size])
    }

    async fn echo_upload(mut multipart: Multipart) -> Json<Value> {
        let mut label = "missing".to_string();
        let mut size = 0usize;
        while let Ok(Some(field)) = multipart.next_field().await {
            if field.name() == Some("file") {
                label = field.file_name().unwrap_or("unnamed").to_string();
                size = field.bytes().await.map(|b| b.len()).unwrap_or(0);
            }
        }
        Json(json!({ "label": label, "confidence": size as f64 }))
    }

    #[test]
    fn model_paths() {
        assert_eq!(ImageModel::BrainTumor.path(), "/predict");
        assert_eq!(ImageModel::OralCancer.path(), "/predict/oral");
        assert_eq!(ImageModel::SkinDisease.path(), "/predict/skin");
        assert_eq!(ImageModel::all().len(), 3);
        assert!(ImageModel::OralCancer.labels().contains(&"NON CANCER"));
    }

    #[test]
    fn confidence_coercion() {
        let c = Classification::from_json(&json!({"label": "glioma", "confidence": 97.31})).unwrap();
        assert_eq!(c.confidence, 97.31);

        let c = Classification::from_json(&json!({"label": "Acne", "confidence": "88.5"})).unwrap();
        assert_eq!(c.confidence, 88.5);

        let c = Classification::from_json(&json!({"label": "Acne", "confidence": "high"})).unwrap();
        assert_eq!(c.confidence, 0.0);

        let c = Classification::from_json(&json!({"label": "Acne"})).unwrap();
        assert_eq!(c.confidence, 0.0);
    }

    #[test]
    fn non_string_label_is_unexpected() {
        for body in [json!({"label": 3, "confidence": 1}), json!({"confidence": 1}), json!([])] {
            assert!(matches!(
                Classification::from_json(&body),
                Err(InferenceError::UnexpectedResponse)
            ));
        }
    }

    #[test]
    fn error_detail_preference() {
        assert_eq!(server_error_detail(r#"{"error":"bad image"}"#, Some("Bad Request")), "bad image");
        assert_eq!(server_error_detail(r#"{"detail":"x"}"#, None), r#"{"detail":"x"}"#);
        assert_eq!(server_error_detail("upstream crashed", None), "upstream crashed");
        assert_eq!(server_error_detail("", Some("Internal Server Error")), "Internal Server Error");
    }

    #[tokio::test]
    async fn classify_sends_multipart_file_field() {
        let app = Router::new()
            .route("/predict", post(echo_upload))
            .route("/predict/skin", post(echo_upload));
        let base = spawn_router(app).await;
        let client = client_for(&base, Duration::from_secs(5));

        let result = client.classify_image(ImageModel::SkinDisease, &png(1024)).await.unwrap();
        assert_eq!(result.label, "scan.png");
        assert_eq!(result.confidence, 1024.0);
    }

    #[tokio::test]
    async fn padded_content_type_still_uploads() {
        let app = Router::new().route("/predict", post(echo_upload));
        let base = spawn_router(app).await;
        let client = client_for(&base, Duration::from_secs(5));

        let upload = ImageUpload::new("mri.png", " image/png", vec![3u8; 16]);
        let result = client.classify_image(ImageModel::BrainTumor, &upload).await.unwrap();
        assert_eq!(result.label, "mri.png");
        assert_eq!(result.confidence, 16.0);
    }

    #[tokio::test]
    async fn server_error_surfaces_status_and_detail() {
        let app = Router::new().route(
            "/predict/oral",
            post(|| async { (StatusCode::BAD_REQUEST, Json(json!({"error": "No file uploaded"}))) }),
        );
        let base = spawn_router(app).await;
        let client = client_for(&base, Duration::from_secs(5));

        let err = client.classify_image(ImageModel::OralCancer, &png(10)).await.unwrap_err();
        assert_eq!(err.to_string(), "Server error 400: No file uploaded");
    }

    #[tokio::test]
    async fn slow_service_times_out() {
        let app = Router::new().route(
            "/predict",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Json(json!({"label": "glioma", "confidence": 1.0}))
            }),
        );
        let base = spawn_router(app).await;
        let client = client_for(&base, Duration::from_millis(200));

        let err = client.classify_image(ImageModel::BrainTumor, &png(10)).await.unwrap_err();
        assert!(matches!(err, InferenceError::Timeout), "got {err:?}");
    }

    #[tokio::test]
    async fn unreachable_service() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = client_for(&format!("http://{addr}"), Duration::from_secs(5));

        let err = client.classify_image(ImageModel::BrainTumor, &png(10)).await.unwrap_err();
        assert!(matches!(err, InferenceError::Unreachable), "got {err:?}");
    }

    #[tokio::test]
    async fn invalid_upload_never_hits_network() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let app = Router::new().route(
            "/predict",
            post(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Json(json!({"label": "glioma", "confidence": 1.0}))
                }
            }),
        );
        let base = spawn_router(app).await;
        let client = client_for(&base, Duration::from_secs(5));

        let pdf = ImageUpload::new("notes.pdf", "application/pdf", vec![1, 2, 3]);
        let err = client.classify_image(ImageModel::BrainTumor, &pdf).await.unwrap_err();
        assert!(matches!(err, InferenceError::Validation(FormError::NotAnImage)));

        let big = png(MAX_UPLOAD_BYTES);
        let err = client.classify_image(ImageModel::BrainTumor, &big).await.unwrap_err();
        assert!(matches!(err, InferenceError::Validation(FormError::FileTooLarge { .. })));

        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
