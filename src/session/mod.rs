//! Authentication and session state.
//!
//! Two generations share one surface: [`LocalDirectory`] keeps users in
//! client storage, [`RemoteAuthenticator`] exchanges credentials with the
//! REST service for a bearer token. [`SessionStore`] validates forms at the
//! boundary and delegates to whichever backend is configured.

pub mod guard;
pub mod local;
pub mod remote;
pub mod storage;

pub use guard::{LOGIN_ROUTE, RouteDecision, guard_route};
pub use local::LocalDirectory;
pub use remote::RemoteAuthenticator;
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};

use crate::core::{CrmError, Result, Validate};
use crate::interaction::SubmitGate;
use crate::model::{RegisterForm, UserProfile};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// A signed-in user. The profile never carries password material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
}

#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn register(&self, form: &RegisterForm) -> Result<()>;

    async fn login(&self, email: &str, password: &str) -> Result<Session>;

    /// Clears session state. Never fails.
    fn logout(&self);

    /// The persisted session; `None` when absent or unreadable.
    fn current_user(&self) -> Option<Session>;

    fn is_authenticated(&self) -> bool {
        self.current_user()
            .is_some_and(|session| !session.token.trim().is_empty())
    }
}

/// Clones share the backend and the in-flight state of each form.
#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn Authenticator>,
    login_form: SubmitGate,
    register_form: SubmitGate,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn Authenticator>) -> Self {
        Self {
            backend,
            login_form: SubmitGate::new(),
            register_form: SubmitGate::new(),
        }
    }

    /// Fails with `SubmissionInFlight` while another registration is running.
    pub async fn register(&self, form: &RegisterForm) -> Result<()> {
        form.validate()?;
        self.register_form
            .submit(self.backend.register(form))
            .await
    }

    /// Fails with `SubmissionInFlight` while another login is running.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(CrmError::InvalidCredentials);
        }
        self.login_form
            .submit(self.backend.login(email, password))
            .await
    }

    pub fn logout(&self) {
        self.backend.logout();
        info!("Logged out");
    }

    pub fn current_user(&self) -> Option<Session> {
        let session = self.backend.current_user();
        debug!(present = session.is_some(), "Read current session");
        session
    }

    pub fn is_authenticated(&self) -> bool {
        self.backend.is_authenticated()
    }

    /// The current session, or `Unauthenticated`.
    pub fn require(&self) -> Result<Session> {
        if !self.is_authenticated() {
            return Err(CrmError::Unauthenticated);
        }
        self.current_user().ok_or(CrmError::Unauthenticated)
    }
}
