use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub wizard: WizardConfig,
    #[serde(default)]
    pub table: TableSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_timeout_ms() -> u64 { 10_000 }

/// Draft storage. Without a URL drafts are kept in process memory.
#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: Option<String>,
    #[serde(default = "default_draft_ttl")]
    pub draft_ttl_seconds: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: None,
            draft_ttl_seconds: default_draft_ttl(),
        }
    }
}

// A week; drafts of abandoned reservations expire on their own.
fn default_draft_ttl() -> u64 { 7 * 24 * 3600 }

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_jwt_expiration")]
    pub jwt_expiration_seconds: u64,
}

fn default_jwt_expiration() -> u64 { 24 * 3600 }

#[derive(Debug, Deserialize, Clone)]
pub struct WizardConfig {
    #[serde(default = "default_autosave_interval")]
    pub autosave_interval_seconds: u64,
    #[serde(default = "default_payment_delay")]
    pub payment_delay_ms: u64,
    #[serde(default = "default_service_fee_rate")]
    pub service_fee_rate: f64,
    #[serde(default = "default_tax_rate")]
    pub tax_rate: f64,
    #[serde(default)]
    pub reject_empty_stays: bool,
    /// Confirm through the backend `POST /bookings` instead of the
    /// simulated gateway.
    #[serde(default)]
    pub confirm_with_backend: bool,
    /// Mounted wizards untouched for this long are unmounted.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
    #[serde(default = "default_max_mounted")]
    pub max_mounted: usize,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            autosave_interval_seconds: default_autosave_interval(),
            payment_delay_ms: default_payment_delay(),
            service_fee_rate: default_service_fee_rate(),
            tax_rate: default_tax_rate(),
            reject_empty_stays: false,
            confirm_with_backend: false,
            idle_timeout_seconds: default_idle_timeout(),
            max_mounted: default_max_mounted(),
        }
    }
}

impl WizardConfig {
    pub fn autosave_interval(&self) -> Duration {
        Duration::from_secs(self.autosave_interval_seconds)
    }

    pub fn payment_delay(&self) -> Duration {
        Duration::from_millis(self.payment_delay_ms)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_seconds)
    }
}

fn default_autosave_interval() -> u64 { 30 }
fn default_payment_delay() -> u64 { 2000 }
fn default_service_fee_rate() -> f64 { 0.10 }
fn default_tax_rate() -> f64 { 0.05 }
fn default_idle_timeout() -> u64 { 30 * 60 }
fn default_max_mounted() -> usize { 10_000 }

#[derive(Debug, Deserialize, Clone)]
pub struct TableSettings {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> usize { 10 }

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Developer overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `LOCASPACE__BACKEND__BASE_URL=http://api:8080`
            .add_source(config::Environment::with_prefix("LOCASPACE").separator("__"))
            .build()?;

        let config: Self = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.wizard.max_mounted == 0 {
            return Err(config::ConfigError::Message("wizard.max_mounted must be at least 1".to_string()));
        }
        if self.table.page_size == 0 {
            return Err(config::ConfigError::Message("table.page_size must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    fn parse(toml: &str) -> Config {
        config::Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = parse(
            r#"
            [server]
            port = 3000
            [backend]
            base_url = "http://localhost:8080/api"
            [auth]
            jwt_secret = "secret"
            "#,
        );

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.backend.timeout(), Duration::from_secs(10));
        assert!(config.redis.url.is_none());
        assert_eq!(config.wizard.autosave_interval(), Duration::from_secs(30));
        assert_eq!(config.wizard.payment_delay(), Duration::from_millis(2000));
        assert_eq!(config.wizard.service_fee_rate, 0.10);
        assert!(!config.wizard.reject_empty_stays);
        assert!(!config.wizard.confirm_with_backend);
        assert_eq!(config.wizard.idle_timeout(), Duration::from_secs(1800));
        assert_eq!(config.wizard.max_mounted, 10_000);
        assert_eq!(config.table.page_size, 10);
    }

    #[test]
    fn test_overrides() {
        let config = parse(
            r#"
            [server]
            port = 3000
            [backend]
            base_url = "http://backend"
            timeout_ms = 500
            [redis]
            url = "redis://127.0.0.1/"
            draft_ttl_seconds = 60
            [auth]
            jwt_secret = "secret"
            [wizard]
            autosave_interval_seconds = 5
            reject_empty_stays = true
            [table]
            page_size = 25
            "#,
        );

        assert_eq!(config.redis.url.as_deref(), Some("redis://127.0.0.1/"));
        assert_eq!(config.redis.draft_ttl_seconds, 60);
        assert_eq!(config.wizard.autosave_interval_seconds, 5);
        assert!(config.wizard.reject_empty_stays);
        assert_eq!(config.table.page_size, 25);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        let config = parse(
            r#"
            [server]
            port = 3000
            [backend]
            base_url = "http://backend"
            [auth]
            jwt_secret = "secret"
            [table]
            page_size = 0
            "#,
        );

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("page_size"));
    }
}
