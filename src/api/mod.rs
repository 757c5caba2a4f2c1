//! Thin clients over the CRM REST endpoints that sit outside entity CRUD.
//!
//! Every call returns either the decoded payload or an [`ApiFailure`]
//! carrying one normalised message.

pub mod auth;
pub mod dashboard;
pub mod email;

pub use auth::{PasswordRecovery, ResetPasswordForm};
pub use dashboard::{DashboardApi, DashboardSummary, StatCard};
pub use email::{EmailApi, EmailMessage};

use crate::core::ValidationErrors;
use crate::transport::{ApiFailure, ApiResponse, TransportError, normalize};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type ApiResult<T> = std::result::Result<T, ApiFailure>;

/// Acknowledgement returned by action endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiAck {
    pub success: bool,
    pub message: Option<String>,
}

impl ApiAck {
    fn from_response(response: &ApiResponse) -> Self {
        Self {
            success: true,
            message: response
                .body
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

fn transport_failure(err: TransportError) -> ApiFailure {
    normalize(&err)
}

/// First message of a failed form check, as shown above the form.
fn validation_failure(errors: ValidationErrors) -> ApiFailure {
    let message = errors
        .iter()
        .next()
        .map(|(_, message)| message.to_string())
        .unwrap_or_else(|| "Please fill in all fields".to_string());
    ApiFailure::new(message)
}

/// Reads an explicit `success: false` answer as a failure carrying the
/// server's message, or `fallback` when it sent none.
fn reject_explicit_failure(response: &ApiResponse, fallback: &str) -> ApiResult<()> {
    if response.body.get("success").and_then(Value::as_bool) == Some(false) {
        let message = response
            .body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or(fallback);
        return Err(ApiFailure::new(message));
    }
    Ok(())
}
