//! Durable client state: a flat string key/value store with named slots.

use crate::core::{CrmError, Result};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, warn};

/// Local user directory (JSON array of stored users).
pub const USERS_SLOT: &str = "crm_users";
/// Local session (JSON profile of the signed-in user).
pub const LOGGED_USER_SLOT: &str = "crm_logged_user";
/// REST bearer token.
pub const TOKEN_SLOT: &str = "crm_user_token";
/// REST user-profile projection.
pub const PROFILE_SLOT: &str = "crm_user_profile";

pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    fn remove(&self, key: &str) -> Result<()>;
}

/// Process-lifetime storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: RwLock<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.read()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.slots
            .write()?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.slots.write()?.remove(key);
        Ok(())
    }
}

/// Storage persisted as one JSON object on disk.
///
/// Every write replaces the file atomically (temp file + rename), so a crash
/// mid-write leaves the previous contents intact. An unreadable file is
/// treated as empty and overwritten on the next write.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    slots: RwLock<BTreeMap<String, String>>,
}

impl FileStorage {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let slots = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(slots) => slots,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "Ignoring unreadable storage file");
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        debug!(path = %path.display(), slots = slots.len(), "Opened storage file");
        Ok(Self {
            path,
            slots: RwLock::new(slots),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, slots: &BTreeMap<String, String>) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let payload = serde_json::to_vec_pretty(slots)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(&payload)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .map_err(|err| CrmError::Storage(err.error.to_string()))?;
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.read()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut slots = self.slots.write()?;
        let previous = slots.insert(key.to_string(), value.to_string());
        if let Err(err) = self.persist(&slots) {
            match previous {
                Some(previous) => slots.insert(key.to_string(), previous),
                None => slots.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut slots = self.slots.write()?;
        if let Some(previous) = slots.remove(key) {
            if let Err(err) = self.persist(&slots) {
                slots.insert(key.to_string(), previous);
                return Err(err);
            }
        }
        Ok(())
    }
}
