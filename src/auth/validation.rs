use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use super::dto::RegisterRequest;

/// Symbols accepted by the password policy.
pub const PASSWORD_SYMBOLS: &str = "@#$%^&+=!";
pub const PASSWORD_MIN_LEN: usize = 8;

/// One rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[A-Za-z0-9+_.-]+@(.+)$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Only `[ \t\n\x0B\f\r]` counts as whitespace; other Unicode spaces are
/// ordinary password characters.
fn is_policy_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}

/// Letter and digit classes are ASCII only: `é` is neither lower nor upper case here.
pub fn is_valid_password(password: &str) -> bool {
    password.chars().count() >= PASSWORD_MIN_LEN
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| PASSWORD_SYMBOLS.contains(c))
        && !password.chars().any(is_policy_whitespace)
}

/// Check a registration body, collecting every violation.
/// Expects the email to be normalized already.
pub fn validate_registration(req: &RegisterRequest) -> Result<(), Vec<FieldViolation>> {
    let mut errors = Vec::new();

    if req.name.trim().is_empty() {
        errors.push(FieldViolation::new("name", "name is required"));
    }

    if req.email.is_empty() {
        errors.push(FieldViolation::new("email", "email is required"));
    } else if !is_valid_email(&req.email) {
        errors.push(FieldViolation::new("email", "email must be a valid address"));
    }

    if req.password.is_empty() {
        errors.push(FieldViolation::new("password", "password is required"));
    } else if !is_valid_password(&req.password) {
        errors.push(FieldViolation::new(
            "password",
            format!(
                "password needs at least {PASSWORD_MIN_LEN} characters, an uppercase letter, \
                 a lowercase letter, a digit and one of {PASSWORD_SYMBOLS}, without spaces"
            ),
        ));
    }

    for (i, phone) in req.phones.iter().enumerate() {
        for (name, value) in [
            ("number", &phone.number),
            ("citycode", &phone.citycode),
            ("contrycode", &phone.contrycode),
        ] {
            if value.trim().is_empty() {
                errors.push(FieldViolation::new(
                    format!("phones[{i}].{name}"),
                    format!("{name} is required"),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
