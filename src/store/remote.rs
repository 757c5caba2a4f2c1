use crate::core::{RecordId, Result};
use crate::record::{Record, RecordFields};
use crate::transport::{ApiRequest, Transport};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

/// Server side of a REST-backed store. Calls happen after the local change
/// is applied; an error makes the store rewind it.
#[async_trait]
pub trait RemoteSync<R: Record>: Send + Sync {
    /// Returns the id the server assigned, if it reported one.
    async fn push_create(&self, record: &R) -> Result<Option<RecordId>>;

    async fn push_update(&self, id: RecordId, patch: &<R as RecordFields>::Patch) -> Result<()>;

    async fn push_delete(&self, id: RecordId) -> Result<()>;

    async fn fetch_all(&self) -> Result<Vec<R>>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListBody<R> {
    Plain(Vec<R>),
    Paginated { results: Vec<R> },
}

/// `RemoteSync` over `/{collection}/` and `/{collection}/{id}/`.
pub struct RemoteCollection<R> {
    transport: Arc<dyn Transport>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> RemoteCollection<R> {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            _record: PhantomData,
        }
    }

    pub fn collection_path() -> String {
        format!("/{}/", R::KIND.collection())
    }

    pub fn item_path(id: RecordId) -> String {
        format!("/{}/{}/", R::KIND.collection(), id)
    }
}

#[async_trait]
impl<R: Record> RemoteSync<R> for RemoteCollection<R> {
    async fn push_create(&self, record: &R) -> Result<Option<RecordId>> {
        let request = ApiRequest::post(Self::collection_path()).json(record)?;
        let response = self.transport.send(request).await?;
        Ok(assigned_id(&response.body))
    }

    async fn push_update(&self, id: RecordId, patch: &<R as RecordFields>::Patch) -> Result<()> {
        let request = ApiRequest::patch(Self::item_path(id)).json(patch)?;
        self.transport.send(request).await?;
        Ok(())
    }

    async fn push_delete(&self, id: RecordId) -> Result<()> {
        self.transport
            .send(ApiRequest::delete(Self::item_path(id)))
            .await?;
        Ok(())
    }

    async fn fetch_all(&self) -> Result<Vec<R>> {
        let response = self
            .transport
            .send(ApiRequest::get(Self::collection_path()))
            .await?;
        if response.body == Value::Null {
            return Ok(Vec::new());
        }
        let body: ListBody<R> = response.decode()?;
        Ok(match body {
            ListBody::Plain(records) => records,
            ListBody::Paginated { results } => results,
        })
    }
}

/// Reads `id` from a create response; numeric strings are accepted.
fn assigned_id(body: &Value) -> Option<RecordId> {
    match body.get("id")? {
        Value::Number(number) => number.as_u64().map(RecordId),
        Value::String(text) => text.trim().parse().ok().map(RecordId),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_assigned_id_shapes() {
        assert_eq!(assigned_id(&json!({"id": 100})), Some(RecordId(100)));
        assert_eq!(assigned_id(&json!({"id": "42"})), Some(RecordId(42)));
        assert_eq!(assigned_id(&json!({"id": "abc"})), None);
        assert_eq!(assigned_id(&json!({})), None);
        assert_eq!(assigned_id(&Value::Null), None);
    }
}
