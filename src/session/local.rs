use super::storage::{KeyValueStorage, LOGGED_USER_SLOT, USERS_SLOT};
use super::{Authenticator, Session};
use crate::core::{CrmError, Result};
use crate::model::user::normalize_email;
use crate::model::{RegisterForm, StoredUser};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// User directory kept entirely in client storage.
///
/// Passwords are stored as bcrypt hashes; the session slot holds the
/// profile and an opaque token, never the hash.
pub struct LocalDirectory {
    storage: Arc<dyn KeyValueStorage>,
    password_cost: u32,
    // serialises read-modify-write of the users slot
    write_lock: Mutex<()>,
}

impl LocalDirectory {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self::with_cost(storage, bcrypt::DEFAULT_COST)
    }

    pub fn with_cost(storage: Arc<dyn KeyValueStorage>, password_cost: u32) -> Self {
        Self {
            storage,
            password_cost,
            write_lock: Mutex::new(()),
        }
    }

    /// Registered users. A missing or unreadable slot reads as empty.
    pub fn users(&self) -> Vec<StoredUser> {
        let raw = match self.storage.get(USERS_SLOT) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(error = %err, "Failed to read user directory");
                return Vec::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!(error = %err, "User directory is corrupt; treating it as empty");
            Vec::new()
        })
    }

    fn save_users(&self, users: &[StoredUser]) -> Result<()> {
        let raw = serde_json::to_string(users)?;
        self.storage.set(USERS_SLOT, &raw)
    }

    fn hash_password(&self, password: &str) -> Result<String> {
        bcrypt::hash(password, self.password_cost).map_err(|err| CrmError::Storage(err.to_string()))
    }

    fn verify_password(password: &str, hash: &str) -> bool {
        bcrypt::verify(password, hash).unwrap_or(false)
    }
}

#[async_trait]
impl Authenticator for LocalDirectory {
    async fn register(&self, form: &RegisterForm) -> Result<()> {
        let email = normalize_email(&form.profile.email);
        let _guard = self.write_lock.lock()?;

        let mut users = self.users();
        if users.iter().any(|user| user.profile.email == email) {
            return Err(CrmError::DuplicateEmail(email));
        }

        let mut profile = form.profile.clone();
        profile.email = email.clone();
        let id = users.iter().map(|user| user.id).max().unwrap_or(0) + 1;
        users.push(StoredUser {
            id,
            profile,
            password_hash: self.hash_password(&form.password)?,
            created_at: chrono::Utc::now().to_rfc3339(),
        });
        self.save_users(&users)?;

        info!(user_id = id, email = %email, "Registered local user");
        Ok(())
    }

    async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let email = normalize_email(email);
        let user = self
            .users()
            .into_iter()
            .find(|user| user.profile.email == email)
            .filter(|user| Self::verify_password(password, &user.password_hash))
            .ok_or(CrmError::InvalidCredentials)?;

        let session = Session {
            token: uuid::Uuid::new_v4().to_string(),
            user: user.profile,
        };
        self.storage
            .set(LOGGED_USER_SLOT, &serde_json::to_string(&session)?)?;

        info!(email = %email, "Logged in");
        Ok(session)
    }

    fn logout(&self) {
        if let Err(err) = self.storage.remove(LOGGED_USER_SLOT) {
            warn!(error = %err, "Failed to clear session slot");
        }
    }

    fn current_user(&self) -> Option<Session> {
        let raw = self.storage.get(LOGGED_USER_SLOT).ok().flatten()?;
        serde_json::from_str(&raw).ok()
    }
}
