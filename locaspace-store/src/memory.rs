use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use locaspace_core::{CoreResult, DraftStore};
use locaspace_shared::{draft_key, ListingId, ReservationDraft};

/// Process-local draft store, used when no Redis URL is configured.
///
/// Drafts are kept as JSON so what comes back out is exactly what a
/// persistent store would return. Clones share the same entries.
#[derive(Clone, Default)]
pub struct InMemoryDraftStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
    namespace: Option<String>,
}

impl InMemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    fn key(&self, listing_id: &ListingId) -> String {
        match &self.namespace {
            Some(ns) => format!("{}:{}", ns, draft_key(listing_id)),
            None => draft_key(listing_id),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl DraftStore for InMemoryDraftStore {
    async fn load_draft(&self, listing_id: &ListingId) -> CoreResult<Option<ReservationDraft>> {
        let entries = self.entries.read().await;
        match entries.get(&self.key(listing_id)) {
            Some(json) => Ok(Some(
                serde_json::from_str(json).map_err(crate::StoreError::from)?,
            )),
            None => Ok(None),
        }
    }

    async fn save_draft(&self, listing_id: &ListingId, draft: &ReservationDraft) -> CoreResult<()> {
        let json = serde_json::to_string(draft).map_err(crate::StoreError::from)?;
        self.entries.write().await.insert(self.key(listing_id), json);
        Ok(())
    }

    async fn delete_draft(&self, listing_id: &ListingId) -> CoreResult<()> {
        self.entries.write().await.remove(&self.key(listing_id));
        Ok(())
    }
}
