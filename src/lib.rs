// ============================================================================
// crmdesk Library
// ============================================================================

extern crate self as crmdesk;

pub mod api;
pub mod config;
pub mod core;
pub mod interaction;
pub mod model;
pub mod record;
pub mod rules;
pub mod seed;
pub mod session;
pub mod store;
pub mod transport;

// Re-export main types for convenience
pub use config::{AuthMode, CrmConfig};
pub use core::{CrmError, EntityKind, RecordId, Result, Validate, ValidationErrors};
pub use crmdesk_derive::RecordFields;
pub use record::{FieldText, Record, RecordFields};
pub use rules::{StageGuard, Transition};
pub use session::{Session, SessionStore};
pub use store::{EntityStore, ListPreset, ListQuery, Page};

use crate::api::{DashboardApi, EmailApi, PasswordRecovery};
use crate::core::{Clock, SystemClock};
use crate::interaction::SubmitGate;
use crate::model::{
    Activity, ActivityDraft, Company, Deal, DealPatch, DealStage, Lead, ParentRef, Ticket,
};
use crate::session::{
    Authenticator, FileStorage, KeyValueStorage, LocalDirectory, MemoryStorage,
    RemoteAuthenticator,
};
use crate::store::{Notifier, RemoteCollection, TracingNotifier};
use crate::transport::{HttpTransport, Transport};
use std::sync::Arc;
use tracing::info;

// ============================================================================
// Workspace
// ============================================================================

/// Every store and service of one CRM client, built once and passed by
/// reference.
///
/// ```no_run
/// use crmdesk::{Crm, CrmConfig};
///
/// # async fn demo() -> crmdesk::Result<()> {
/// let crm = Crm::open(CrmConfig::new())?;
/// let page = crm.leads.query(&crm.list_query(crmdesk::ListPreset::LEADS).search("jane"))?;
/// println!("{} of {} leads", page.rows.len(), page.total);
/// # Ok(())
/// # }
/// ```
pub struct Crm {
    pub config: CrmConfig,
    pub storage: Arc<dyn KeyValueStorage>,
    pub transport: Arc<dyn Transport>,
    pub sessions: SessionStore,
    pub leads: EntityStore<Lead>,
    pub companies: EntityStore<Company>,
    pub deals: EntityStore<Deal>,
    pub tickets: EntityStore<Ticket>,
    pub activities: Arc<EntityStore<Activity>>,
    pub dashboard: DashboardApi,
    pub email: EmailApi,
    pub recovery: PasswordRecovery,
    stage_form: SubmitGate,
}

impl Crm {
    /// Builds a workspace from `config` with default collaborators.
    pub fn open(config: CrmConfig) -> Result<Self> {
        CrmBuilder::new(config).build()
    }

    pub fn builder(config: CrmConfig) -> CrmBuilder {
        CrmBuilder::new(config)
    }

    /// Empty query for a list screen, using the configured page size.
    pub fn list_query(&self, preset: ListPreset) -> ListQuery {
        preset.query().page_size(self.config.page_size)
    }

    /// Moves a deal to `stage`; gated stages need a logged activity. One
    /// move at a time, like the stage picker it backs.
    pub async fn move_deal(&self, id: RecordId, stage: DealStage) -> Result<Deal> {
        self.stage_form
            .submit(self.deals.update(id, DealPatch::default().stage(stage)))
            .await
    }

    /// Records an activity under its parent. The parent must exist.
    pub async fn log_activity(&self, draft: ActivityDraft) -> Result<Activity> {
        if !self.parent_exists(draft.parent)? {
            return Err(CrmError::not_found(draft.parent.kind.label(), draft.parent.id));
        }
        self.activities.create(draft).await
    }

    fn parent_exists(&self, parent: ParentRef) -> Result<bool> {
        Ok(match parent.kind {
            EntityKind::Lead => self.leads.get(&parent.id)?.is_some(),
            EntityKind::Company => self.companies.get(&parent.id)?.is_some(),
            EntityKind::Deal => self.deals.get(&parent.id)?.is_some(),
            EntityKind::Ticket => self.tickets.get(&parent.id)?.is_some(),
            EntityKind::Activity => false,
        })
    }

    /// Reloads every entity store from the server. No-op for local stores.
    pub async fn refresh_all(&self) -> Result<()> {
        self.leads.refresh().await?;
        self.companies.refresh().await?;
        self.deals.refresh().await?;
        self.tickets.refresh().await?;
        self.activities.refresh().await?;
        Ok(())
    }
}

/// Assembles a [`Crm`], letting tests and embedders swap collaborators.
pub struct CrmBuilder {
    config: CrmConfig,
    storage: Option<Arc<dyn KeyValueStorage>>,
    transport: Option<Arc<dyn Transport>>,
    notifier: Option<Arc<dyn Notifier>>,
    clock: Option<Arc<dyn Clock>>,
}

impl CrmBuilder {
    pub fn new(config: CrmConfig) -> Self {
        Self {
            config,
            storage: None,
            transport: None,
            notifier: None,
            clock: None,
        }
    }

    pub fn storage(mut self, storage: Arc<dyn KeyValueStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Result<Crm> {
        let config = self.config;

        let storage: Arc<dyn KeyValueStorage> = match (self.storage, &config.storage_path) {
            (Some(storage), _) => storage,
            (None, Some(path)) => Arc::new(FileStorage::open(path)?),
            (None, None) => Arc::new(MemoryStorage::new()),
        };

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(
                HttpTransport::new(&config.api_url, config.timeout)?
                    .with_credentials(Arc::clone(&storage)),
            ),
        };

        let notifier = self.notifier.unwrap_or_else(|| Arc::new(TracingNotifier));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        let backend: Arc<dyn Authenticator> = match config.auth_mode {
            AuthMode::Local => Arc::new(LocalDirectory::with_cost(
                Arc::clone(&storage),
                config.password_cost,
            )),
            AuthMode::Remote => Arc::new(RemoteAuthenticator::new(
                Arc::clone(&transport),
                Arc::clone(&storage),
            )),
        };

        let seed = config.seed && !config.remote_entities;
        let parts = StoreParts {
            config: &config,
            storage: &storage,
            transport: &transport,
            notifier: &notifier,
            clock: &clock,
        };

        let activities = Arc::new(parts.store::<Activity>(Vec::new())?);
        let deals = parts
            .store(fixtures(seed, seed::deals))?
            .with_guard(Arc::new(StageGuard::new(Arc::clone(&activities))));
        let leads = parts.store(fixtures(seed, seed::leads))?;
        let companies = parts.store(fixtures(seed, seed::companies))?;
        let tickets = parts.store(fixtures(seed, seed::tickets))?;

        let crm = Crm {
            sessions: SessionStore::new(backend),
            leads,
            companies,
            deals,
            tickets,
            activities,
            dashboard: DashboardApi::new(Arc::clone(&transport)),
            email: EmailApi::new(Arc::clone(&transport)),
            recovery: PasswordRecovery::new(Arc::clone(&transport)),
            stage_form: SubmitGate::new(),
            storage,
            transport,
            config,
        };

        info!(
            auth_mode = ?crm.config.auth_mode,
            remote_entities = crm.config.remote_entities,
            seeded = seed,
            "CRM workspace ready"
        );
        Ok(crm)
    }
}

fn fixtures<R>(enabled: bool, rows: fn() -> Vec<R>) -> Vec<R> {
    if enabled { rows() } else { Vec::new() }
}

/// Shared collaborators every entity store is built with.
struct StoreParts<'a> {
    config: &'a CrmConfig,
    storage: &'a Arc<dyn KeyValueStorage>,
    transport: &'a Arc<dyn Transport>,
    notifier: &'a Arc<dyn Notifier>,
    clock: &'a Arc<dyn Clock>,
}

impl StoreParts<'_> {
    /// REST-backed stores sync through the server; local ones persist to
    /// client storage, where stored rows take precedence over `seed`.
    fn store<R: Record>(&self, seed: Vec<R>) -> Result<EntityStore<R>> {
        let store = EntityStore::new()
            .with_clock(Arc::clone(self.clock))
            .with_notifier(Arc::clone(self.notifier))
            .seeded(seed);
        if self.config.remote_entities {
            Ok(store.with_remote(Arc::new(RemoteCollection::<R>::new(Arc::clone(
                self.transport,
            )))))
        } else {
            store.with_storage(Arc::clone(self.storage))
        }
    }
}
