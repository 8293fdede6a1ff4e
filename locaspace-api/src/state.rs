use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{info, warn};

use locaspace_booking::{BackendPaymentAdapter, SimulatedPaymentGateway, WizardController, WizardSettings};
use locaspace_core::{BackendConnector, BackendHandle, BroadcastNotifier, DraftStore, PaymentAdapter, SessionContext};
use locaspace_shared::ListingId;
use locaspace_store::{InMemoryDraftStore, RedisDraftStore};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

/// Where reservation drafts are written. Keys are namespaced per user.
#[derive(Clone)]
pub enum DraftBackend {
    /// Single process, lost on restart.
    Memory(InMemoryDraftStore),
    Redis(RedisDraftStore),
}

impl DraftBackend {
    pub fn for_session(&self, session: &SessionContext) -> Arc<dyn DraftStore> {
        let namespace = format!("user:{}", session.user_id);
        match self {
            DraftBackend::Memory(store) => Arc::new(store.clone().with_namespace(namespace)),
            DraftBackend::Redis(store) => Arc::new(store.clone().with_namespace(namespace)),
        }
    }
}

/// How the wizard's payment step is confirmed.
#[derive(Clone)]
pub enum PaymentMode {
    Simulated { delay: Duration },
    Backend,
}

impl PaymentMode {
    pub fn adapter(&self, backend: &BackendHandle) -> Arc<dyn PaymentAdapter> {
        match self {
            PaymentMode::Simulated { delay } => Arc::new(SimulatedPaymentGateway::new(*delay)),
            PaymentMode::Backend => Arc::new(BackendPaymentAdapter::new(backend.listings.clone())),
        }
    }
}

type WizardKey = (String, ListingId);

struct MountedWizard {
    controller: Arc<WizardController>,
    last_used: Instant,
}

/// Mounted wizards, one per (user, listing).
///
/// A wizard nobody touched for `idle_ttl` is unmounted, and so is the least
/// recently used one when a mount would exceed `capacity`.
#[derive(Clone)]
pub struct WizardRegistry {
    inner: Arc<RwLock<HashMap<WizardKey, MountedWizard>>>,
    idle_ttl: Duration,
    capacity: usize,
}

impl Default for WizardRegistry {
    fn default() -> Self {
        Self::new(Duration::from_secs(30 * 60), 10_000)
    }
}

impl WizardRegistry {
    pub fn new(idle_ttl: Duration, capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            idle_ttl,
            capacity: capacity.max(1),
        }
    }

    /// Look up a wizard and mark it as used. An expired entry is unmounted
    /// and reported as absent.
    pub async fn get(&self, session: &SessionContext, listing_id: &ListingId) -> Option<Arc<WizardController>> {
        let key = (session.user_id.clone(), listing_id.clone());
        let mut inner = self.inner.write().await;
        let now = Instant::now();

        let entry = inner.get_mut(&key)?;
        if now.duration_since(entry.last_used) >= self.idle_ttl {
            if let Some(expired) = inner.remove(&key) {
                expired.controller.unmount();
            }
            return None;
        }
        entry.last_used = now;
        Some(entry.controller.clone())
    }

    /// Keep the first controller registered for a key; a concurrent mount
    /// of the same wizard gets the existing one back.
    pub async fn insert(
        &self,
        session: &SessionContext,
        listing_id: &ListingId,
        controller: Arc<WizardController>,
    ) -> Arc<WizardController> {
        let key = (session.user_id.clone(), listing_id.clone());
        let mut inner = self.inner.write().await;
        let now = Instant::now();

        if let Some(existing) = inner.get_mut(&key) {
            existing.last_used = now;
            controller.unmount();
            return existing.controller.clone();
        }

        if inner.len() >= self.capacity {
            Self::evict_expired(&mut inner, self.idle_ttl, now);
        }
        if inner.len() >= self.capacity {
            let oldest = inner
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest.and_then(|key| inner.remove(&key)) {
                warn!(capacity = self.capacity, "Wizard registry full, unmounting least recently used wizard");
                oldest.controller.unmount();
            }
        }

        inner.insert(
            key,
            MountedWizard {
                controller: controller.clone(),
                last_used: now,
            },
        );
        controller
    }

    pub async fn remove(&self, session: &SessionContext, listing_id: &ListingId) -> Option<Arc<WizardController>> {
        self.inner
            .write()
            .await
            .remove(&(session.user_id.clone(), listing_id.clone()))
            .map(|entry| entry.controller)
    }

    /// Unmount every wizard idle for longer than the TTL.
    pub async fn evict_idle(&self) -> usize {
        let mut inner = self.inner.write().await;
        let evicted = Self::evict_expired(&mut inner, self.idle_ttl, Instant::now());
        if evicted > 0 {
            info!(evicted, remaining = inner.len(), "Unmounted idle wizards");
        }
        evicted
    }

    fn evict_expired(inner: &mut HashMap<WizardKey, MountedWizard>, idle_ttl: Duration, now: Instant) -> usize {
        let before = inner.len();
        inner.retain(|_, entry| {
            let alive = now.duration_since(entry.last_used) < idle_ttl;
            if !alive {
                entry.controller.unmount();
            }
            alive
        });
        before - inner.len()
    }

    /// Sweep idle wizards every `period` until the handle is aborted.
    pub fn spawn_sweeper(&self, period: Duration) -> JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                registry.evict_idle().await;
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn BackendConnector>,
    pub drafts: DraftBackend,
    pub payments: PaymentMode,
    pub notifier: BroadcastNotifier,
    pub wizards: WizardRegistry,
    pub wizard_settings: WizardSettings,
    pub page_size: usize,
    pub auth: AuthConfig,
}
