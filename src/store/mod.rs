//! In-memory entity collections.
//!
//! An [`EntityStore`] exclusively owns the records of one kind, newest
//! first. Mutations are applied locally first; when a [`RemoteSync`] is
//! attached the server call follows and a failed call rewinds the local
//! change, so the caller sees the error and the prior state. With client
//! storage attached, every committed change is also written to the store's
//! slot (`crm_<collection>`).

pub mod activity_log;
pub mod notify;
pub mod query;
pub mod remote;

pub use notify::{Notification, NotificationLevel, Notifier, RecordingNotifier, TracingNotifier};
pub use query::{
    DEFAULT_PAGE_SIZE, FieldFilter, ListPreset, ListQuery, MatchMode, Page, project,
};
pub use remote::{RemoteCollection, RemoteSync};

use crate::core::{
    Clock, CrmError, IdSequence, RecordId, Result, SystemClock, Validate, format_created,
};
use crate::interaction::SubmitGate;
use crate::record::{Record, RecordFields};
use crate::session::KeyValueStorage;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// Veto hook consulted before an update is committed.
pub trait UpdateGuard<R: Record>: Send + Sync {
    fn check(&self, current: &R, patch: &<R as RecordFields>::Patch) -> Result<()>;
}

pub struct EntityStore<R: Record> {
    records: RwLock<Vec<R>>,
    ids: IdSequence,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    remote: Option<Arc<dyn RemoteSync<R>>>,
    guard: Option<Arc<dyn UpdateGuard<R>>>,
    storage: Option<Arc<dyn KeyValueStorage>>,
    create_form: SubmitGate,
}

impl<R: Record> Default for EntityStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> EntityStore<R> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            ids: IdSequence::default(),
            clock: Arc::new(SystemClock),
            notifier: Arc::new(TracingNotifier),
            remote: None,
            guard: None,
            storage: None,
            create_form: SubmitGate::new(),
        }
    }

    /// Replaces the contents with `records` (already newest first) and moves
    /// the id counter past the largest id among them.
    pub fn seeded(self, records: Vec<R>) -> Self {
        for record in &records {
            self.ids.observe(record.id());
        }
        Self {
            records: RwLock::new(records),
            ..self
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_remote(mut self, remote: Arc<dyn RemoteSync<R>>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn with_guard(mut self, guard: Arc<dyn UpdateGuard<R>>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Makes the store durable in `storage`.
    ///
    /// A readable slot replaces the current contents (seeded rows included);
    /// a missing slot is written from them. An unreadable slot is logged and
    /// overwritten.
    pub fn with_storage(mut self, storage: Arc<dyn KeyValueStorage>) -> Result<Self> {
        let slot = Self::storage_slot();
        if let Some(raw) = storage.get(&slot)? {
            match serde_json::from_str::<Vec<R>>(&raw) {
                Ok(records) => {
                    for record in &records {
                        self.ids.observe(record.id());
                    }
                    debug!(slot = %slot, count = records.len(), "Loaded stored records");
                    self.records = RwLock::new(records);
                }
                Err(err) => {
                    warn!(slot = %slot, error = %err, "Stored records unreadable; replacing them");
                }
            }
        }
        self.storage = Some(storage);
        self.persist()?;
        Ok(self)
    }

    /// Client storage slot holding this kind's records.
    pub fn storage_slot() -> String {
        format!("crm_{}", R::KIND.collection())
    }

    fn label() -> &'static str {
        R::KIND.label()
    }

    /// All records, newest first.
    pub fn list(&self) -> Result<Vec<R>> {
        Ok(self.records.read()?.clone())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.records.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Looks a record up by id, comparing the textual forms so route
    /// parameters such as `"3"` match numeric ids.
    pub fn get<K: ToString + ?Sized>(&self, id: &K) -> Result<Option<R>> {
        let wanted = id.to_string();
        let wanted = wanted.trim();
        let found = self
            .records
            .read()?
            .iter()
            .find(|record| record.id().to_string() == wanted)
            .cloned();
        debug!(kind = Self::label(), id = wanted, found = found.is_some(), "Record lookup");
        Ok(found)
    }

    /// Runs `query` over the current records.
    pub fn query(&self, query: &ListQuery) -> Result<Page<R>> {
        let records = self.records.read()?;
        Ok(project(records.as_slice(), query))
    }

    /// Like `list`, restricted to records matching `predicate`.
    pub fn filter_by(&self, predicate: impl Fn(&R) -> bool) -> Result<Vec<R>> {
        Ok(self
            .records
            .read()?
            .iter()
            .filter(|record| predicate(*record))
            .cloned()
            .collect())
    }

    /// Validates `draft`, assigns an id and inserts the record at the top.
    ///
    /// Fails with `SubmissionInFlight` while another create on this store
    /// is still running.
    pub async fn create(&self, draft: R::Draft) -> Result<R> {
        self.create_form.submit(self.insert_new(draft)).await
    }

    async fn insert_new(&self, draft: R::Draft) -> Result<R> {
        draft.validate()?;

        let local_id = self.ids.next_id();
        let mut record = R::from_draft(local_id, format_created(self.clock.now()), draft);
        self.records.write()?.insert(0, record.clone());

        if let Err(err) = self.commit_create(&mut record).await {
            warn!(kind = Self::label(), id = %record.id(), error = %err, "Create not committed; rewinding");
            let id = record.id();
            self.records.write()?.retain(|existing| existing.id() != id);
            self.notify_failure(&err);
            return Err(err);
        }

        info!(kind = Self::label(), id = %record.id(), "Record created");
        self.notify_success("created");
        Ok(record)
    }

    /// Pushes a fresh record and adopts the server's id when it differs.
    async fn commit_create(&self, record: &mut R) -> Result<()> {
        if let Some(remote) = &self.remote {
            let local_id = record.id();
            if let Some(assigned) = remote.push_create(record).await? {
                if assigned != local_id {
                    self.ids.observe(assigned);
                    record.assign_id(assigned);
                    let mut records = self.records.write()?;
                    if let Some(slot) = records.iter_mut().find(|existing| existing.id() == local_id) {
                        slot.assign_id(assigned);
                    }
                    debug!(kind = Self::label(), local = %local_id, server = %assigned, "Adopted server id");
                }
            }
        }
        self.persist()
    }

    /// Merges the fields present in `patch` into the record with `id`.
    pub async fn update(&self, id: RecordId, patch: <R as RecordFields>::Patch) -> Result<R> {
        let current = self
            .records
            .read()?
            .iter()
            .find(|record| record.id() == id)
            .cloned()
            .ok_or_else(|| CrmError::not_found(Self::label(), id))?;

        if let Some(guard) = &self.guard {
            if let Err(err) = guard.check(&current, &patch) {
                self.notify_failure(&err);
                return Err(err);
            }
        }

        let (previous, updated) = {
            let mut records = self.records.write()?;
            let record = records
                .iter_mut()
                .find(|record| record.id() == id)
                .ok_or_else(|| CrmError::not_found(Self::label(), id))?;
            let previous = record.clone();
            record.apply_patch(patch.clone());
            (previous, record.clone())
        };

        if let Err(err) = self.commit_update(id, &patch).await {
            warn!(kind = Self::label(), id = %id, error = %err, "Update not committed; rewinding");
            self.restore(previous)?;
            self.notify_failure(&err);
            return Err(err);
        }

        info!(kind = Self::label(), id = %id, "Record updated");
        self.notify_success("updated");
        Ok(updated)
    }

    async fn commit_update(&self, id: RecordId, patch: &<R as RecordFields>::Patch) -> Result<()> {
        if let Some(remote) = &self.remote {
            remote.push_update(id, patch).await?;
        }
        self.persist()
    }

    /// Removes the record with `id`. Unknown ids are a no-op.
    pub async fn remove(&self, id: RecordId) -> Result<()> {
        let removed = {
            let mut records = self.records.write()?;
            let position = records.iter().position(|record| record.id() == id);
            position.map(|index| (index, records.remove(index)))
        };
        let Some((index, record)) = removed else {
            debug!(kind = Self::label(), id = %id, "Remove of unknown id ignored");
            return Ok(());
        };

        if let Err(err) = self.commit_delete(id).await {
            warn!(kind = Self::label(), id = %id, error = %err, "Delete not committed; rewinding");
            let mut records = self.records.write()?;
            let index = index.min(records.len());
            records.insert(index, record);
            drop(records);
            self.notify_failure(&err);
            return Err(err);
        }

        info!(kind = Self::label(), id = %id, "Record deleted");
        self.notify_success("deleted");
        Ok(())
    }

    async fn commit_delete(&self, id: RecordId) -> Result<()> {
        if let Some(remote) = &self.remote {
            remote.push_delete(id).await?;
        }
        self.persist()
    }

    /// Replaces the contents with the server's list.
    pub async fn refresh(&self) -> Result<usize> {
        let Some(remote) = &self.remote else {
            return self.len();
        };
        let fetched = remote.fetch_all().await?;
        for record in &fetched {
            self.ids.observe(record.id());
        }
        let count = fetched.len();
        *self.records.write()? = fetched;
        self.persist()?;
        info!(kind = Self::label(), count, "Store refreshed from server");
        Ok(count)
    }

    /// Writes the current records to the storage slot, if one is attached.
    fn persist(&self) -> Result<()> {
        let Some(storage) = &self.storage else {
            return Ok(());
        };
        let raw = serde_json::to_string(&*self.records.read()?)?;
        storage.set(&Self::storage_slot(), &raw)
    }

    fn restore(&self, previous: R) -> Result<()> {
        let mut records = self.records.write()?;
        if let Some(slot) = records.iter_mut().find(|record| record.id() == previous.id()) {
            *slot = previous;
        }
        Ok(())
    }

    fn notify_success(&self, verb: &str) {
        self.notifier.notify(Notification::success(format!(
            "{} {} successfully",
            Self::label(),
            verb
        )));
    }

    fn notify_failure(&self, err: &CrmError) {
        self.notifier.notify(Notification::error(err.to_string()));
    }
}
