use crate::core::{CrmError, Result};
use crate::store::DEFAULT_PAGE_SIZE;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Which authentication generation the workspace runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// Users and session kept in client storage.
    #[default]
    Local,
    /// Bearer tokens issued by the REST service.
    Remote,
}

impl AuthMode {
    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "remote" | "rest" => Ok(Self::Remote),
            other => Err(CrmError::Config(format!(
                "CRMDESK_AUTH_MODE must be one of: local, remote (got '{}')",
                other
            ))),
        }
    }
}

/// Workspace configuration.
#[derive(Debug, Clone)]
pub struct CrmConfig {
    /// Base URL of the REST service.
    pub api_url: String,

    /// Client-side request timeout.
    pub timeout: Duration,

    pub auth_mode: AuthMode,

    /// JSON file for durable client state; in-memory when `None`.
    pub storage_path: Option<PathBuf>,

    /// Rows per list page.
    pub page_size: usize,

    /// bcrypt cost for locally stored passwords.
    pub password_cost: u32,

    /// Load the demo fixtures into empty stores.
    pub seed: bool,

    /// Sync entity stores with the REST service.
    pub remote_entities: bool,
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl CrmConfig {
    pub fn new() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(30),
            auth_mode: AuthMode::Local,
            storage_path: None,
            page_size: DEFAULT_PAGE_SIZE,
            password_cost: bcrypt::DEFAULT_COST,
            seed: true,
            remote_entities: false,
        }
    }

    pub fn api_url(mut self, url: &str) -> Self {
        self.api_url = url.to_string();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn auth_mode(mut self, mode: AuthMode) -> Self {
        self.auth_mode = mode;
        self
    }

    pub fn storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path = Some(path.into());
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn password_cost(mut self, cost: u32) -> Self {
        self.password_cost = cost;
        self
    }

    pub fn seed(mut self, seed: bool) -> Self {
        self.seed = seed;
        self
    }

    pub fn remote_entities(mut self, enabled: bool) -> Self {
        self.remote_entities = enabled;
        self
    }

    /// Reads `CRMDESK_*` variables, after loading a `.env` file if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source; unset keys keep
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::new();

        if let Some(url) = lookup("CRMDESK_API_URL").filter(|url| !url.trim().is_empty()) {
            config.api_url = url.trim().to_string();
        }
        if let Some(raw) = lookup("CRMDESK_TIMEOUT_SECS") {
            config.timeout = Duration::from_secs(parse_number(&raw, "CRMDESK_TIMEOUT_SECS")?);
        }
        if let Some(raw) = lookup("CRMDESK_AUTH_MODE") {
            config.auth_mode = AuthMode::parse(&raw)?;
        }
        if let Some(path) = lookup("CRMDESK_STORAGE_PATH").filter(|path| !path.trim().is_empty()) {
            config.storage_path = Some(PathBuf::from(path.trim()));
        }
        if let Some(raw) = lookup("CRMDESK_PAGE_SIZE") {
            let page_size: usize = parse_number(&raw, "CRMDESK_PAGE_SIZE")?;
            if page_size == 0 {
                return Err(CrmError::Config("CRMDESK_PAGE_SIZE must be at least 1".into()));
            }
            config.page_size = page_size;
        }
        if let Some(raw) = lookup("CRMDESK_PASSWORD_COST") {
            config.password_cost = parse_number(&raw, "CRMDESK_PASSWORD_COST")?;
        }
        if let Some(raw) = lookup("CRMDESK_SEED") {
            config.seed = parse_flag(&raw, "CRMDESK_SEED")?;
        }
        if let Some(raw) = lookup("CRMDESK_REMOTE_ENTITIES") {
            config.remote_entities = parse_flag(&raw, "CRMDESK_REMOTE_ENTITIES")?;
        }

        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(raw: &str, key: &str) -> Result<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| CrmError::Config(format!("{} must be a non-negative integer", key)))
}

fn parse_flag(raw: &str, key: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(CrmError::Config(format!("{} must be true or false", key))),
    }
}
