use std::time::Duration;
use tracing::info;

use locaspace_core::{BackendConnector, BackendHandle, SessionContext};

use crate::client::ApiClient;
use crate::error::ClientError;

/// Hands out per-session [`ApiClient`]s sharing one connection pool.
#[derive(Clone)]
pub struct HttpConnector {
    http: reqwest::Client,
    base_url: String,
}

impl HttpConnector {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        info!("Backend API at {}", base_url);
        Ok(Self {
            http,
            base_url: base_url.to_string(),
        })
    }
}

impl BackendConnector for HttpConnector {
    fn connect(&self, session: &SessionContext) -> BackendHandle {
        BackendHandle::from_client(ApiClient::with_client(self.http.clone(), &self.base_url, session.clone()))
    }
}
