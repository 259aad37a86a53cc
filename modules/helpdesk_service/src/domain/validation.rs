//! Field validation applied before anything reaches storage

use crate::contract::HelpdeskError;

/// Longest accepted name/title, in characters
pub const MAX_NAME_LEN: usize = 200;

/// Trim a required text field and reject it when blank or oversized
pub fn require_text(field: &str, value: &str) -> Result<String, HelpdeskError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(HelpdeskError::validation(format!("{} is required", field)));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(HelpdeskError::validation(format!(
            "{} must be at most {} characters",
            field, MAX_NAME_LEN
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional text field; blank becomes `None`
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Normalize an email address (trimmed, lowercase) and check its shape
pub fn normalize_email(email: &str) -> Result<String, HelpdeskError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(HelpdeskError::validation("Email is required"));
    }

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if !valid {
        return Err(HelpdeskError::validation(format!(
            "'{}' is not a valid email address",
            email
        )));
    }
    Ok(email)
}

/// Roles are free-form but must be a single non-empty token
pub fn normalize_role(role: &str) -> Result<String, HelpdeskError> {
    let role = role.trim().to_lowercase();
    if role.is_empty() {
        return Err(HelpdeskError::validation("role is required"));
    }
    if role.chars().any(char::is_whitespace) {
        return Err(HelpdeskError::validation(format!(
            "role '{}' must not contain whitespace",
            role
        )));
    }
    Ok(role)
}

/// Reject patch columns that only the service itself may write
pub fn reject_immutable(present: &[(&str, bool)]) -> Result<(), HelpdeskError> {
    let fixed: Vec<&str> = present
        .iter()
        .filter(|(_, is_set)| *is_set)
        .map(|(name, _)| *name)
        .collect();
    if fixed.is_empty() {
        Ok(())
    } else {
        Err(HelpdeskError::validation(format!(
            "cannot update column(s): {}",
            fixed.join(", ")
        )))
    }
}
