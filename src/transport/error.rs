use crate::core::CrmError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const NETWORK_ERROR_MESSAGE: &str = "Network error";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    /// No response arrived (connection refused, DNS, reset).
    #[error("network error: {0}")]
    Network(String),

    /// The client-side timeout elapsed before a response arrived.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The server answered with a non-success status.
    #[error("Request failed with status code {status}")]
    Status { status: u16, body: Value },

    /// The response body did not have the expected shape.
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl TransportError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// The uniform failure shape every API helper returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiFailure {
    pub success: bool,
    pub message: String,
}

impl ApiFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Collapses a transport failure into a single user-facing message.
///
/// Server error bodies are read in this order: a `detail` list of field
/// errors (their `msg` values joined with ", "), a `detail` string, a
/// `detail` object (stringified), a top-level `message` string.
pub fn normalize(err: &TransportError) -> ApiFailure {
    match err {
        TransportError::Network(_) | TransportError::Timeout(_) => {
            ApiFailure::new(NETWORK_ERROR_MESSAGE)
        }
        TransportError::Status { body, .. } => {
            ApiFailure::new(server_message(body).unwrap_or_else(|| err.to_string()))
        }
        TransportError::Decode(message) => ApiFailure::new(message.clone()),
    }
}

fn server_message(body: &Value) -> Option<String> {
    match body.get("detail") {
        Some(Value::Array(items)) => {
            let messages = items
                .iter()
                .map(|item| match item.get("msg") {
                    Some(Value::String(msg)) => msg.clone(),
                    Some(other) => other.to_string(),
                    None => match item {
                        Value::String(text) => text.clone(),
                        other => other.to_string(),
                    },
                })
                .collect::<Vec<_>>();
            Some(messages.join(", "))
        }
        Some(Value::String(detail)) => Some(detail.clone()),
        Some(Value::Null) | None => body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        Some(other) => Some(other.to_string()),
    }
}

impl From<TransportError> for CrmError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Network(message) => CrmError::Network(message),
            TransportError::Timeout(secs) => {
                CrmError::Network(format!("request timed out after {}s", secs))
            }
            TransportError::Status { status: 401, .. } => CrmError::Unauthenticated,
            other => CrmError::RemoteValidation(normalize(&other).message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn status(body: Value) -> TransportError {
        TransportError::Status { status: 422, body }
    }

    #[test]
    fn test_detail_list_is_joined() {
        let err = status(json!({"detail": [
            {"loc": ["body", "email"], "msg": "field required"},
            {"loc": ["body", "password"], "msg": "too short"}
        ]}));
        assert_eq!(normalize(&err).message, "field required, too short");
        assert!(!normalize(&err).success);
    }

    #[test]
    fn test_detail_object_is_stringified() {
        let err = status(json!({"detail": {"code": "E1"}}));
        assert_eq!(normalize(&err).message, r#"{"code":"E1"}"#);
    }

    #[test]
    fn test_detail_string_and_fallbacks() {
        assert_eq!(
            normalize(&status(json!({"detail": "Email already registered"}))).message,
            "Email already registered"
        );
        assert_eq!(
            normalize(&status(json!({"message": "Nope"}))).message,
            "Nope"
        );
        assert_eq!(
            normalize(&status(Value::Null)).message,
            "Request failed with status code 422"
        );
    }

    #[test]
    fn test_no_response_is_network_error() {
        let failure = normalize(&TransportError::Network("connection refused".into()));
        assert_eq!(failure.message, NETWORK_ERROR_MESSAGE);
        assert_eq!(normalize(&TransportError::Timeout(30)).message, NETWORK_ERROR_MESSAGE);
    }

    #[test]
    fn test_conversion_into_crm_error() {
        let err: CrmError = TransportError::Timeout(30).into();
        assert!(err.is_retryable());

        let err: CrmError = status(json!({"detail": "bad"})).into();
        assert_eq!(err, CrmError::RemoteValidation("bad".into()));
    }
}
