use std::str::FromStr;

use crate::forms::FormError;
use crate::models::enums::Gender;
use crate::models::RegisterRequest;

/// Registration form as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub name: String,
    pub age: String,
    pub gender: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub consent: bool,
}

impl SignupForm {
    /// Validate and build the registration body.
    ///
    /// Required fields are checked first, then consent, then the password
    /// confirmation.
    pub fn validate(&self) -> Result<RegisterRequest, FormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormError::Required("Full name"));
        }
        if self.age.trim().is_empty() {
            return Err(FormError::Required("Age"));
        }
        if self.gender.trim().is_empty() {
            return Err(FormError::InvalidGender);
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Err(FormError::Required("Email address"));
        }
        if self.password.is_empty() {
            return Err(FormError::Required("Password"));
        }

        if !self.consent {
            return Err(FormError::ConsentRequired);
        }
        if self.password != self.confirm_password {
            return Err(FormError::PasswordMismatch);
        }

        let age: u32 = self
            .age
            .trim()
            .parse()
            .map_err(|_| FormError::InvalidAge)?;
        let gender = Gender::from_str(self.gender.trim()).map_err(|_| FormError::InvalidGender)?;
        if !looks_like_email(email) {
            return Err(FormError::InvalidEmail);
        }

        Ok(RegisterRequest {
            name: name.to_string(),
            age,
            gender,
            email: email.to_string(),
            password: self.password.clone(),
        })
    }
}

/// Same bar as a browser `type="email"` input: `local@domain`.
pub(crate) fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> SignupForm {
        SignupForm {
            name: "Priya Shah".into(),
            age: "34".into(),
            gender: "Female".into(),
            email: "priya@example.com".into(),
            password: "s3cret-pass".into(),
            confirm_password: "s3cret-pass".into(),
            consent: true,
        }
    }

    #[test]
    fn valid_form_builds_request_with_numeric_age() {
        let req = filled().validate().unwrap();
        assert_eq!(req.age, 34);
        assert_eq!(req.gender, Gender::Female);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["age"], 34);
        assert_eq!(json["gender"], "Female");
        assert!(json.get("confirmPassword").is_none());
        assert!(json.get("consent").is_none());
    }

    #[test]
    fn mismatched_passwords_rejected() {
        let form = SignupForm {
            confirm_password: "different".into(),
            ..filled()
        };
        let err = form.validate().unwrap_err();
        assert_eq!(err, FormError::PasswordMismatch);
        assert_eq!(err.to_string(), "Passwords do not match.");
    }

    #[test]
    fn consent_required() {
        let form = SignupForm {
            consent: false,
            ..filled()
        };
        assert_eq!(form.validate().unwrap_err(), FormError::ConsentRequired);
    }

    #[test]
    fn consent_checked_before_password_match() {
        let form = SignupForm {
            consent: false,
            confirm_password: "nope".into(),
            ..filled()
        };
        assert_eq!(form.validate().unwrap_err(), FormError::ConsentRequired);
    }

    #[test]
    fn blank_required_fields_rejected() {
        let form = SignupForm {
            name: "   ".into(),
            ..filled()
        };
        assert_eq!(form.validate().unwrap_err(), FormError::Required("Full name"));
    }

    #[test]
    fn age_must_be_whole_non_negative() {
        for bad in ["-3", "twelve", "3.5"] {
            let form = SignupForm {
                age: bad.into(),
                ..filled()
            };
            assert_eq!(form.validate().unwrap_err(), FormError::InvalidAge, "{bad}");
        }
    }

    #[test]
    fn gender_must_be_listed_option() {
        let form = SignupForm {
            gender: "Unknown".into(),
            ..filled()
        };
        assert_eq!(form.validate().unwrap_err(), FormError::InvalidGender);
    }

    #[test]
    fn email_shape_checked() {
        assert!(looks_like_email("a@b.co"));
        assert!(!looks_like_email("no-at-sign"));
        assert!(!looks_like_email("@domain"));
        assert!(!looks_like_email("a@b@c"));
        let form = SignupForm {
            email: "not an email".into(),
            ..filled()
        };
        assert_eq!(form.validate().unwrap_err(), FormError::InvalidEmail);
    }
}
