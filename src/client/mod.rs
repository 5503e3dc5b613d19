//! Typed HTTP client for the portal API.
//!
//! Mirrors the browser client: forms are validated locally before any
//! request, the bearer token from login is kept for later calls, and
//! failures carry the server's `msg` or a per-operation fallback.

use std::sync::RwLock;

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::{join_url, ServiceEndpoints};
use crate::forms::{FormError, ProfileForm, SignupForm};
use crate::models::{
    Customer, LoginRequest, LoginResponse, Medication, MessageResponse, NewReport,
    RegisterResponse, Report,
};

const SIGNUP_FAILED: &str = "Signup failed";
const LOGIN_FAILED: &str = "Login failed";
const LOGOUT_FAILED: &str = "Logout failed";
const FETCH_PROFILE_FAILED: &str = "Failed to fetch profile";
const UPDATE_FAILED: &str = "Update failed";
const MEDICATION_FAILED: &str = "Failed to update medications";
const REPORT_FAILED: &str = "Failed to update reports";

/// Errors from portal calls. `Display` is the message to show the user.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] FormError),
    #[error("Please log in to continue.")]
    NotAuthenticated,
    /// Non-2xx response.
    #[error("{msg}")]
    Rejected { status: u16, msg: String },
    /// No usable response: connection failure or unreadable body.
    #[error("{msg}")]
    Transport { msg: String, detail: String },
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct ServerMessage {
    msg: Option<String>,
}

#[derive(Deserialize)]
struct MedicationsBody {
    medications: Vec<Medication>,
}

#[derive(Deserialize)]
struct ReportsBody {
    reports: Vec<Report>,
}

/// Client for one portal API origin.
#[derive(Debug)]
pub struct PortalClient {
    http: reqwest::Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl PortalClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        }
    }

    /// Client for the configured portal API origin.
    pub fn from_endpoints(endpoints: &ServiceEndpoints) -> Self {
        Self::new(&endpoints.portal_api)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().ok().and_then(|t| t.clone())
    }

    pub fn set_token(&self, token: Option<String>) {
        if let Ok(mut slot) = self.token.write() {
            *slot = token;
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    fn bearer(&self) -> Result<String, ClientError> {
        self.token().ok_or(ClientError::NotAuthenticated)
    }

    /// `POST /api/auth/customer/register`
    pub async fn register(&self, form: &SignupForm) -> Result<RegisterResponse, ClientError> {
        let body = form.validate()?;
        let request = self
            .http
            .post(self.url("/api/auth/customer/register"))
            .json(&body);
        send(request, SIGNUP_FAILED).await
    }

    /// `POST /api/auth/customer/login`. The returned token is kept for
    /// authenticated calls.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
        if email.trim().is_empty() {
            return Err(FormError::Required("Email address").into());
        }
        if password.is_empty() {
            return Err(FormError::Required("Password").into());
        }
        let request = self
            .http
            .post(self.url("/api/auth/customer/login"))
            .json(&LoginRequest {
                email: email.trim().to_string(),
                password: password.to_string(),
            });
        let response: LoginResponse = send(request, LOGIN_FAILED).await?;
        self.set_token(Some(response.token.clone()));
        tracing::debug!(med_id = %response.med_id, "Logged in");
        Ok(response)
    }

    /// `POST /api/auth/customer/logout`. The local token is dropped even
    /// when the server call fails.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let token = self.bearer()?;
        self.set_token(None);
        let request = self
            .http
            .post(self.url("/api/auth/customer/logout"))
            .bearer_auth(token);
        send::<MessageResponse>(request, LOGOUT_FAILED).await?;
        Ok(())
    }

    /// `GET /api/customer/profile`
    pub async fn fetch_profile(&self) -> Result<Customer, ClientError> {
        let request = self
            .http
            .get(self.url("/api/customer/profile"))
            .bearer_auth(self.bearer()?);
        send(request, FETCH_PROFILE_FAILED).await
    }

    /// `PATCH /api/customer/profile`. Returns the server's message.
    pub async fn update_profile(&self, form: &ProfileForm) -> Result<String, ClientError> {
        let update = form.to_update()?;
        let request = self
            .http
            .patch(self.url("/api/customer/profile"))
            .bearer_auth(self.bearer()?)
            .json(&update);
        let response: MessageResponse = send(request, UPDATE_FAILED).await?;
        Ok(response.msg)
    }

    /// `POST /api/customer/medications`
    pub async fn add_medication(&self, med: &Medication) -> Result<Vec<Medication>, ClientError> {
        if med.medicine_name.trim().is_empty() {
            return Err(FormError::Required("Medicine name").into());
        }
        let request = self
            .http
            .post(self.url("/api/customer/medications"))
            .bearer_auth(self.bearer()?)
            .json(med);
        let body: MedicationsBody = send(request, MEDICATION_FAILED).await?;
        Ok(body.medications)
    }

    /// `DELETE /api/customer/medications/:index`
    pub async fn remove_medication(&self, index: usize) -> Result<Vec<Medication>, ClientError> {
        let request = self
            .http
            .delete(self.url(&format!("/api/customer/medications/{index}")))
            .bearer_auth(self.bearer()?);
        let body: MedicationsBody = send(request, MEDICATION_FAILED).await?;
        Ok(body.medications)
    }

    /// `POST /api/customer/reports`
    pub async fn add_report(&self, report: &NewReport) -> Result<Vec<Report>, ClientError> {
        if report.file_url.trim().is_empty() {
            return Err(FormError::Required("File URL").into());
        }
        let request = self
            .http
            .post(self.url("/api/customer/reports"))
            .bearer_auth(self.bearer()?)
            .json(report);
        let body: ReportsBody = send(request, REPORT_FAILED).await?;
        Ok(body.reports)
    }

    /// `DELETE /api/customer/reports/:index`
    pub async fn remove_report(&self, index: usize) -> Result<Vec<Report>, ClientError> {
        let request = self
            .http
            .delete(self.url(&format!("/api/customer/reports/{index}")))
            .bearer_auth(self.bearer()?);
        let body: ReportsBody = send(request, REPORT_FAILED).await?;
        Ok(body.reports)
    }
}

/// Send a request and decode a 2xx JSON body. Failures carry the server
/// `msg` when present, else `fallback`.
async fn send<T: DeserializeOwned>(
    request: RequestBuilder,
    fallback: &'static str,
) -> Result<T, ClientError> {
    let response = request.send().await.map_err(|e| ClientError::Transport {
        msg: fallback.to_string(),
        detail: e.to_string(),
    })?;

    let status = response.status();
    if !status.is_success() {
        let msg = rejection_message(response, fallback).await;
        tracing::debug!(status = status.as_u16(), %msg, "Portal request rejected");
        return Err(ClientError::Rejected {
            status: status.as_u16(),
            msg,
        });
    }

    response.json::<T>().await.map_err(|e| ClientError::Transport {
        msg: fallback.to_string(),
        detail: e.to_string(),
    })
}

async fn rejection_message(response: reqwest::Response, fallback: &str) -> String {
    response
        .json::<ServerMessage>()
        .await
        .ok()
        .and_then(|body| body.msg)
        .filter(|msg| !msg.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}
