use super::storage::{KeyValueStorage, PROFILE_SLOT, TOKEN_SLOT};
use super::{Authenticator, Session};
use crate::core::{CrmError, Result};
use crate::model::user::normalize_email;
use crate::model::{RegisterForm, UserProfile};
use crate::transport::{ApiRequest, Transport, TransportError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
    #[serde(default)]
    user: Option<UserProfile>,
}

/// Authentication against the CRM REST service.
///
/// The bearer token and a profile projection are kept in client storage;
/// the transport reads the token slot on each request.
pub struct RemoteAuthenticator {
    transport: Arc<dyn Transport>,
    storage: Arc<dyn KeyValueStorage>,
}

impl RemoteAuthenticator {
    pub fn new(transport: Arc<dyn Transport>, storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { transport, storage }
    }

    fn token(&self) -> Option<String> {
        self.storage
            .get(TOKEN_SLOT)
            .ok()
            .flatten()
            .filter(|token| !token.trim().is_empty())
    }
}

#[async_trait]
impl Authenticator for RemoteAuthenticator {
    async fn register(&self, form: &RegisterForm) -> Result<()> {
        let profile = &form.profile;
        let body = json!({
            "email": normalize_email(&profile.email),
            "password": form.password,
            "first_name": profile.first_name,
            "last_name": profile.last_name,
            "phone": profile.phone,
            "company": profile.company,
            "industry": profile.industry,
            "country": profile.country,
        });
        self.transport
            .send(ApiRequest::post("/auth/register").json_value(body))
            .await?;
        info!(email = %normalize_email(&profile.email), "Registered remote user");
        Ok(())
    }

    async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let email = normalize_email(email);
        let request = ApiRequest::post("/auth/login")
            .form(&[("username", email.as_str()), ("password", password)]);

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(TransportError::Status {
                status: 400 | 401 | 403,
                ..
            }) => return Err(CrmError::InvalidCredentials),
            Err(err) => return Err(err.into()),
        };
        let login: LoginResponse = response.decode()?;
        if login.access_token.trim().is_empty() {
            return Err(CrmError::InvalidCredentials);
        }

        let mut user = login.user.unwrap_or_default();
        if user.email.trim().is_empty() {
            user.email = email.clone();
        }
        self.storage.set(TOKEN_SLOT, &login.access_token)?;
        self.storage
            .set(PROFILE_SLOT, &serde_json::to_string(&user)?)?;

        info!(email = %email, "Logged in");
        Ok(Session {
            token: login.access_token,
            user,
        })
    }

    fn logout(&self) {
        for slot in [TOKEN_SLOT, PROFILE_SLOT] {
            if let Err(err) = self.storage.remove(slot) {
                warn!(slot, error = %err, "Failed to clear session slot");
            }
        }
    }

    fn current_user(&self) -> Option<Session> {
        let token = self.token()?;
        let raw = self.storage.get(PROFILE_SLOT).ok().flatten()?;
        let user = serde_json::from_str(&raw).ok()?;
        Some(Session { token, user })
    }

    fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}
