use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "MedPortal";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default bind address for the portal API.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

/// Client timeout for image classification uploads.
pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 30;

/// Get the application data directory.
/// Falls back to the working directory when no home directory is known.
pub fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default location of the customer database.
pub fn database_path() -> PathBuf {
    app_data_dir().join("portal.db")
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "medportal=info,tower_http=warn"
}

/// Base URLs of every service the portal talks to.
///
/// One value per service instead of per-screen origins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoints {
    /// Portal REST API (auth + customer profile).
    pub portal_api: String,
    /// Image classifiers (`/predict`, `/predict/oral`, `/predict/skin`).
    pub image_inference: String,
    /// Diabetes risk model (`/predict/diabetes`).
    pub diabetes: String,
    /// Symptom-to-disease network, including the `/bbn-api` prefix.
    pub bbn: String,
}

impl Default for ServiceEndpoints {
    fn default() -> Self {
        Self {
            portal_api: "http://localhost:5000".into(),
            image_inference: "http://localhost:4000".into(),
            diabetes: "http://localhost:8000".into(),
            bbn: "http://localhost:8000/bbn-api".into(),
        }
    }
}

/// Runtime configuration, resolved from `MEDPORTAL_*` environment variables.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    pub endpoints: ServiceEndpoints,
    pub upload_timeout: Duration,
}

/// Errors while resolving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

impl PortalConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ServiceEndpoints::default();

        let bind_raw = lookup("MEDPORTAL_BIND").unwrap_or_else(|| DEFAULT_BIND_ADDR.into());
        let bind_addr = bind_raw.parse().map_err(|_| ConfigError::InvalidValue {
            var: "MEDPORTAL_BIND",
            value: bind_raw.clone(),
        })?;

        let timeout_secs = match lookup("MEDPORTAL_UPLOAD_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                var: "MEDPORTAL_UPLOAD_TIMEOUT_SECS",
                value: raw,
            })?,
            None => DEFAULT_UPLOAD_TIMEOUT_SECS,
        };

        Ok(Self {
            bind_addr,
            database_path: lookup("MEDPORTAL_DB")
                .map(PathBuf::from)
                .unwrap_or_else(database_path),
            endpoints: ServiceEndpoints {
                portal_api: lookup("MEDPORTAL_API_URL").unwrap_or(defaults.portal_api),
                image_inference: lookup("MEDPORTAL_INFERENCE_URL")
                    .unwrap_or(defaults.image_inference),
                diabetes: lookup("MEDPORTAL_DIABETES_URL").unwrap_or(defaults.diabetes),
                bbn: lookup("MEDPORTAL_BBN_URL").unwrap_or(defaults.bbn),
            },
            upload_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

/// Join a base URL and a path without doubling the slash.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
