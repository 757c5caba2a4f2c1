use super::{ApiRequest, ApiResponse, Method, RequestBody, Transport, TransportError};
use crate::session::storage::{KeyValueStorage, TOKEN_SLOT};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// `reqwest` transport rooted at a base URL such as
/// `http://localhost:8000/api`.
///
/// When a credential store is attached, the bearer token slot is read on
/// every request so a login or logout takes effect immediately.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    credentials: Option<Arc<dyn KeyValueStorage>>,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|err| TransportError::Network(err.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            credentials: None,
        })
    }

    pub fn with_credentials(mut self, storage: Arc<dyn KeyValueStorage>) -> Self {
        self.credentials = Some(storage);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn bearer_token(&self) -> Option<String> {
        let storage = self.credentials.as_ref()?;
        match storage.get(TOKEN_SLOT) {
            Ok(token) => token.filter(|token| !token.trim().is_empty()),
            Err(err) => {
                warn!(error = %err, "Failed to read bearer token; sending request without it");
                None
            }
        }
    }

    fn classify(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(self.timeout.as_secs())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.url(&request.path);
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };
        debug!(method = %method, url = %url, "Sending request");

        let mut builder = self.client.request(method, &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = self.bearer_token() {
            builder = builder.bearer_auth(token);
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Form(pairs) => builder.form(&pairs),
        };

        let response = builder.send().await.map_err(|err| self.classify(err))?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|err| self.classify(err))?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        debug!(status, url = %url, "Received response");
        if (200..300).contains(&status) {
            Ok(ApiResponse { status, body })
        } else {
            Err(TransportError::Status { status, body })
        }
    }
}
