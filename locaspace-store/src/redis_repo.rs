use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::{debug, info};

use locaspace_core::{CoreResult, DraftStore};
use locaspace_shared::{draft_key, ListingId, ReservationDraft};

use crate::error::StoreError;

/// Reservation drafts kept in Redis as JSON strings.
#[derive(Clone)]
pub struct RedisDraftStore {
    client: redis::Client,
    namespace: Option<String>,
    ttl_seconds: u64,
}

impl RedisDraftStore {
    pub fn new(connection_string: &str, ttl_seconds: u64) -> Result<Self, StoreError> {
        let client = redis::Client::open(connection_string)?;
        info!("Redis draft store configured (ttl {}s)", ttl_seconds);
        Ok(Self {
            client,
            namespace: None,
            ttl_seconds,
        })
    }

    /// Prefix every key, e.g. one namespace per signed-in user.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn key(&self, listing_id: &ListingId) -> String {
        match &self.namespace {
            Some(ns) => format!("{}:{}", ns, draft_key(listing_id)),
            None => draft_key(listing_id),
        }
    }

    async fn get(&self, listing_id: &ListingId) -> Result<Option<ReservationDraft>, StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let raw: Option<String> = conn.get(self.key(listing_id)).await?;
        raw.map(|json| serde_json::from_str(&json).map_err(StoreError::from))
            .transpose()
    }

    async fn set(&self, listing_id: &ListingId, draft: &ReservationDraft) -> Result<(), StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let json = serde_json::to_string(draft)?;
        let key = self.key(listing_id);
        if self.ttl_seconds > 0 {
            conn.set_ex::<_, _, ()>(&key, json, self.ttl_seconds).await?;
        } else {
            conn.set::<_, _, ()>(&key, json).await?;
        }
        debug!("Draft stored: {}", key);
        Ok(())
    }

    async fn del(&self, listing_id: &ListingId) -> Result<(), StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.del::<_, ()>(self.key(listing_id)).await?;
        Ok(())
    }
}

#[async_trait]
impl DraftStore for RedisDraftStore {
    async fn load_draft(&self, listing_id: &ListingId) -> CoreResult<Option<ReservationDraft>> {
        Ok(self.get(listing_id).await?)
    }

    async fn save_draft(&self, listing_id: &ListingId, draft: &ReservationDraft) -> CoreResult<()> {
        Ok(self.set(listing_id, draft).await?)
    }

    async fn delete_draft(&self, listing_id: &ListingId) -> CoreResult<()> {
        Ok(self.del(listing_id).await?)
    }
}
