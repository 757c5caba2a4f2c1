use super::{ApiAck, ApiResult, reject_explicit_failure, transport_failure, validation_failure};
use crate::core::{CrmError, Validate, ValidationErrors};
use crate::interaction::SubmitGate;
use crate::model::user::normalize_email;
use crate::transport::{ApiFailure, ApiRequest, Transport};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordForm {
    pub email: String,
    pub otp: String,
    pub password: String,
    pub confirm_password: String,
}

impl Validate for ResetPasswordForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("email", &self.email, "Email");
        errors.require("otp", &self.otp, "OTP");
        if self.password.is_empty() || self.confirm_password.is_empty() {
            errors.add("password", "Please fill in all fields");
        } else if self.password != self.confirm_password {
            errors.add("confirmPassword", "Passwords do not match");
        }
        errors.into_result()
    }
}

/// Three-step password recovery: request an OTP, verify it, set a new
/// password.
///
/// The steps share one form, so only one request runs at a time.
pub struct PasswordRecovery {
    transport: Arc<dyn Transport>,
    form: SubmitGate,
}

impl PasswordRecovery {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            form: SubmitGate::new(),
        }
    }

    pub async fn forgot_password(&self, email: &str) -> ApiResult<ApiAck> {
        if email.trim().is_empty() {
            return Err(ApiFailure::new("Please enter your email"));
        }
        let body = json!({ "email": normalize_email(email) });
        self.post("/auth/forgot-password", body, "Failed to send OTP")
            .await
    }

    pub async fn verify_otp(&self, email: &str, otp: &str) -> ApiResult<ApiAck> {
        if otp.trim().is_empty() {
            return Err(ApiFailure::new("Please enter the OTP"));
        }
        let body = json!({ "email": normalize_email(email), "otp": otp.trim() });
        self.post("/auth/verify-otp", body, "Invalid OTP").await
    }

    pub async fn reset_password(&self, form: &ResetPasswordForm) -> ApiResult<ApiAck> {
        form.validate().map_err(validation_failure)?;
        let body = json!({
            "email": normalize_email(&form.email),
            "otp": form.otp.trim(),
            "new_password": form.password,
        });
        let ack = self
            .post("/auth/reset-password", body, "Failed to reset password")
            .await?;
        info!(email = %normalize_email(&form.email), "Password reset");
        Ok(ack)
    }

    async fn post(
        &self,
        path: &str,
        body: serde_json::Value,
        fallback: &str,
    ) -> ApiResult<ApiAck> {
        let Some(_pending) = self.form.try_begin() else {
            return Err(ApiFailure::new(CrmError::SubmissionInFlight.to_string()));
        };
        let response = self
            .transport
            .send(ApiRequest::post(path).json_value(body))
            .await
            .map_err(transport_failure)?;
        reject_explicit_failure(&response, fallback)?;
        Ok(ApiAck::from_response(&response))
    }
}
