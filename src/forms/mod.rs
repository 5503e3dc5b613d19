//! Client-side form state and validation.
//!
//! Every form validates locally and produces the exact wire body for its
//! endpoint. A validation error means no request is sent.

pub mod diabetes;
pub mod profile;
pub mod signup;
pub mod upload;

pub use diabetes::{DiabetesForm, DiabetesRiskFactors};
pub use profile::ProfileForm;
pub use signup::SignupForm;
pub use upload::{ImageUpload, MAX_UPLOAD_BYTES};

/// Validation failures, worded for inline display.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormError {
    #[error("You must agree to the terms and conditions.")]
    ConsentRequired,
    #[error("Passwords do not match.")]
    PasswordMismatch,
    #[error("{0} is required.")]
    Required(&'static str),
    #[error("Please enter a valid email address.")]
    InvalidEmail,
    #[error("Age must be a whole number.")]
    InvalidAge,
    #[error("Please select a gender.")]
    InvalidGender,
    #[error("{0} must be a number.")]
    NotANumber(&'static str),
    #[error("{field} must be between {min} and {max}.")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
    },
    #[error("{0} cannot be negative.")]
    Negative(&'static str),
    #[error("Please select a value for {0}.")]
    InvalidChoice(&'static str),
    #[error("Please upload a valid image file (PNG/JPG).")]
    NotAnImage,
    #[error("File too large. Maximum allowed is 10MB.")]
    FileTooLarge { size: usize },
    #[error("Could not read file: {0}")]
    Unreadable(String),
}

/// Parse a numeric text input. Blank counts as missing.
pub(crate) fn parse_number(field: &'static str, raw: &str) -> Result<Option<f64>, FormError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value: f64 = trimmed.parse().map_err(|_| FormError::NotANumber(field))?;
    if !value.is_finite() {
        return Err(FormError::NotANumber(field));
    }
    Ok(Some(value))
}
