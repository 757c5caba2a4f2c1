use super::{ApiAck, ApiResult, transport_failure, validation_failure};
use crate::core::{CrmError, RecordId, Validate, ValidationErrors};
use crate::interaction::SubmitGate;
use crate::transport::{ApiFailure, ApiRequest, Transport};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Outbound email about a lead. Delivery happens on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub lead_id: RecordId,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Validate for EmailMessage {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.subject.trim().is_empty() || self.body.trim().is_empty() {
            errors.add("subject", "Subject and Message are required");
        }
        errors.require("to", &self.to, "Recipient");
        errors.into_result()
    }
}

pub struct EmailApi {
    transport: Arc<dyn Transport>,
    compose: SubmitGate,
}

impl EmailApi {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            compose: SubmitGate::new(),
        }
    }

    /// Refuses a second send while one is still in flight.
    pub async fn send(&self, message: &EmailMessage) -> ApiResult<ApiAck> {
        message.validate().map_err(validation_failure)?;
        let Some(_sending) = self.compose.try_begin() else {
            return Err(ApiFailure::new(CrmError::SubmissionInFlight.to_string()));
        };

        let request = ApiRequest::post("/core/send-email/")
            .json(message)
            .map_err(transport_failure)?;
        let response = self
            .transport
            .send(request)
            .await
            .map_err(transport_failure)?;

        let accepted = response.body.get("success").and_then(Value::as_bool) == Some(true)
            || response.status == 200;
        if !accepted {
            return Err(ApiFailure::new("Failed to send email"));
        }

        info!(lead_id = %message.lead_id, "Email sent");
        Ok(ApiAck::from_response(&response))
    }
}
