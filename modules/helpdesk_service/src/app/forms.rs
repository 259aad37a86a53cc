//! Screen form state and the checks run before any remote call

use crate::contract::schema::ProfileUpdate;
use crate::contract::HelpdeskError;

pub const PASSWORD_MISMATCH: &str = "Passwords do not match";

/// Registration form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub full_name: Option<String>,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(), HelpdeskError> {
        if self.email.trim().is_empty() {
            return Err(HelpdeskError::validation("Email is required"));
        }
        if self.password.is_empty() {
            return Err(HelpdeskError::validation("Password is required"));
        }
        if self.password != self.confirm_password {
            return Err(HelpdeskError::validation(PASSWORD_MISMATCH));
        }
        Ok(())
    }

    pub fn email(&self) -> &str {
        self.email.trim()
    }
}

/// Login form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), HelpdeskError> {
        if self.email.trim().is_empty() {
            return Err(HelpdeskError::validation("Email is required"));
        }
        if self.password.is_empty() {
            return Err(HelpdeskError::validation("Password is required"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateOrganizationForm {
    pub name: String,
}

impl CreateOrganizationForm {
    /// Trimmed name, or a validation error when blank
    pub fn validate(&self) -> Result<&str, HelpdeskError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(HelpdeskError::validation("Organization name is required"));
        }
        Ok(name)
    }
}

/// Profile editor; a blank field clears the column
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub full_name: String,
    pub avatar_url: String,
}

impl ProfileForm {
    pub fn to_update(&self) -> ProfileUpdate {
        ProfileUpdate {
            full_name: Some(non_blank(&self.full_name)),
            avatar_url: Some(non_blank(&self.avatar_url)),
            ..ProfileUpdate::default()
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(password: &str, confirm: &str) -> RegisterForm {
        RegisterForm {
            email: "ada@example.com".to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
            full_name: None,
        }
    }

    #[test]
    fn mismatched_passwords_are_rejected() {
        let err = register("hunter22", "hunter23").validate().unwrap_err();
        assert_eq!(err.message(), PASSWORD_MISMATCH);
    }

    #[test]
    fn matching_passwords_pass() {
        register("hunter22", "hunter22").validate().unwrap();
    }

    #[test]
    fn empty_login_fields_are_rejected() {
        let form = LoginForm {
            email: "  ".to_string(),
            password: "x".to_string(),
        };
        assert_eq!(form.validate().unwrap_err().message(), "Email is required");
    }

    #[test]
    fn organization_name_is_trimmed() {
        let form = CreateOrganizationForm {
            name: "  Acme ".to_string(),
        };
        assert_eq!(form.validate().unwrap(), "Acme");
        assert!(CreateOrganizationForm::default().validate().is_err());
    }

    #[test]
    fn blank_profile_fields_clear_columns() {
        let form = ProfileForm {
            full_name: "Ada Lovelace".to_string(),
            avatar_url: " ".to_string(),
        };
        let update = form.to_update();
        assert_eq!(update.full_name, Some(Some("Ada Lovelace".to_string())));
        assert_eq!(update.avatar_url, Some(None));
        assert_eq!(update.id, None);
    }
}
