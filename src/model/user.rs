use crate::core::{Validate, ValidationErrors};
use crate::model::looks_like_email;
use serde::{Deserialize, Serialize};

/// Public profile of a signed-in user. Never carries a password.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub email: String,
    #[serde(default, alias = "first_name")]
    pub first_name: String,
    #[serde(default, alias = "last_name")]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub role: String,
}

impl UserProfile {
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_string()
        }
    }
}

/// Lower-cased, trimmed email used as the directory key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Entry in the local user directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredUser {
    pub id: u64,
    #[serde(flatten)]
    pub profile: UserProfile,
    /// bcrypt hash of the password.
    pub password_hash: String,
    pub created_at: String,
}

/// Sign-up form input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterForm {
    pub fn new(profile: UserProfile, password: impl Into<String>) -> Self {
        let password = password.into();
        Self {
            profile,
            confirm_password: password.clone(),
            password,
        }
    }
}

impl Validate for RegisterForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("firstName", &self.profile.first_name, "First name");
        errors.require("lastName", &self.profile.last_name, "Last name");
        errors.require("email", &self.profile.email, "Email");
        if !self.profile.email.trim().is_empty() && !looks_like_email(&self.profile.email) {
            errors.add("email", "Email is invalid");
        }
        errors.require("phone", &self.profile.phone, "Phone");
        if self.password.is_empty() {
            errors.add("password", "Password is required");
        }
        if self.password != self.confirm_password {
            errors.add("confirmPassword", "Passwords do not match");
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        UserProfile {
            email: "jane@x.com".into(),
            first_name: "Jane".into(),
            last_name: "Cooper".into(),
            phone: "078 5432 8505".into(),
            ..UserProfile::default()
        }
    }

    #[test]
    fn test_register_form_validation() {
        assert!(RegisterForm::new(profile(), "secret").validate().is_ok());

        let mismatch = RegisterForm {
            confirm_password: "other".into(),
            ..RegisterForm::new(profile(), "secret")
        };
        assert_eq!(
            mismatch.validate().unwrap_err().get("confirmPassword"),
            Some("Passwords do not match")
        );

        let empty = RegisterForm::default().validate().unwrap_err();
        assert!(empty.contains("firstName"));
        assert!(empty.contains("password"));
    }

    #[test]
    fn test_profile_accepts_snake_case_payloads() {
        let profile: UserProfile = serde_json::from_value(serde_json::json!({
            "email": "jane@x.com",
            "first_name": "Jane",
            "last_name": "Cooper"
        }))
        .unwrap();
        assert_eq!(profile.display_name(), "Jane Cooper");
    }

    #[test]
    fn test_stored_user_never_leaks_into_profile_json() {
        let stored = StoredUser {
            id: 1,
            profile: profile(),
            password_hash: "$2b$04$hash".into(),
            created_at: "2025-04-08T00:00:00Z".into(),
        };
        let profile_json = serde_json::to_value(&stored.profile).unwrap();
        assert!(profile_json.get("password").is_none());
        assert!(profile_json.get("passwordHash").is_none());
    }
}
