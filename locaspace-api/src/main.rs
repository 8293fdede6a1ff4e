use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use locaspace_api::{
    app,
    state::{AppState, AuthConfig, DraftBackend, PaymentMode, WizardRegistry},
};
use locaspace_booking::WizardSettings;
use locaspace_catalog::PricingConfig;
use locaspace_client::HttpConnector;
use locaspace_core::BroadcastNotifier;
use locaspace_store::{Config, InMemoryDraftStore, RedisDraftStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "locaspace_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting LocaSpace API on port {}", config.server.port);

    let drafts = match &config.redis.url {
        Some(url) => DraftBackend::Redis(
            RedisDraftStore::new(url, config.redis.draft_ttl_seconds).context("Invalid Redis URL")?,
        ),
        None => {
            tracing::warn!("No Redis URL configured, drafts are kept in memory");
            DraftBackend::Memory(InMemoryDraftStore::new())
        }
    };

    let backend = HttpConnector::new(&config.backend.base_url, config.backend.timeout())
        .context("Failed to build backend HTTP client")?;

    let payments = if config.wizard.confirm_with_backend {
        PaymentMode::Backend
    } else {
        PaymentMode::Simulated {
            delay: config.wizard.payment_delay(),
        }
    };

    let wizards = WizardRegistry::new(config.wizard.idle_timeout(), config.wizard.max_mounted);
    let _sweeper = wizards.spawn_sweeper(Duration::from_secs(60));

    let app_state = AppState {
        backend: Arc::new(backend),
        drafts,
        payments,
        notifier: BroadcastNotifier::new(100),
        wizards,
        wizard_settings: WizardSettings {
            autosave_interval: config.wizard.autosave_interval(),
            pricing: PricingConfig {
                service_fee_rate: config.wizard.service_fee_rate,
                tax_rate: config.wizard.tax_rate,
            },
            reject_empty_stays: config.wizard.reject_empty_stays,
        },
        page_size: config.table.page_size,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
