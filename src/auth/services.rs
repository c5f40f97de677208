use lazy_static::lazy_static;
use regex::Regex;

use crate::api::ApiError;

pub const MIN_PASSWORD_LEN: usize = 6;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Trims the address and rejects obviously malformed ones before they reach
/// the server. Case is preserved: the backend matches emails verbatim.
pub fn normalize_email(raw: &str) -> Result<String, ApiError> {
    let email = raw.trim().to_string();
    if email.is_empty() {
        return Err(ApiError::Validation("Email is required".into()));
    }
    if !is_valid_email(&email) {
        return Err(ApiError::Validation("Invalid email".into()));
    }
    Ok(email)
}

pub fn validate_new_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(format!(
            "New password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_password_change(new_password: &str, confirm: &str) -> Result<(), ApiError> {
    if new_password != confirm {
        return Err(ApiError::Validation("New passwords do not match".into()));
    }
    validate_new_password(new_password)
}

pub fn validate_registration_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_trimmed_and_checked() {
        assert_eq!(normalize_email("  Ann@Acme.io ").unwrap(), "Ann@Acme.io");
        assert_eq!(
            normalize_email("ann@acme").unwrap_err(),
            ApiError::Validation("Invalid email".into())
        );
        assert_eq!(
            normalize_email("   ").unwrap_err(),
            ApiError::Validation("Email is required".into())
        );
    }

    #[test]
    fn mismatch_is_reported_before_length() {
        assert_eq!(
            validate_password_change("abc", "abd").unwrap_err(),
            ApiError::Validation("New passwords do not match".into())
        );
        assert_eq!(
            validate_password_change("abc", "abc").unwrap_err(),
            ApiError::Validation("New password must be at least 6 characters".into())
        );
        assert!(validate_password_change("abcdef", "abcdef").is_ok());
    }

    #[test]
    fn registration_requires_six_characters() {
        assert!(validate_registration_password("12345").is_err());
        assert!(validate_registration_password("123456").is_ok());
    }
}
