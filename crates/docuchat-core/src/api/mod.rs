//! Document QA API data sources.
//!
//! [`DocumentApi`] is the single seam between the actions and the outside world. The gateway
//! picks one implementation at startup: [`LiveApi`] talks to the configured base URL over HTTP,
//! [`MockApi`] returns canned data for offline development.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::GatewayConfig;
use crate::error::ActionError;
use crate::session::SessionToken;
use crate::types::{Answer, Document, DocumentId, FileUpload, QaPair};
use crate::validation::Credentials;

mod live;
mod mock;

pub use live::LiveApi;
pub use mock::MockApi;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMode {
    Live,
    Mock,
}

/// Upstream operations, with their endpoint and the message used when a failed response
/// carries no `detail`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Login,
    Signup,
    History,
    Upload,
    Ask,
}

impl Operation {
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/token",
            Self::Signup => "/signup",
            Self::History => "/history",
            Self::Upload => "/upload",
            Self::Ask => "/ask",
        }
    }

    pub fn fallback_error(self) -> &'static str {
        match self {
            Self::Login => "Login failed.",
            Self::Signup => "Signup failed.",
            Self::History => "Failed to load history",
            Self::Upload => "Upload failed",
            Self::Ask => "Failed to get answer",
        }
    }
}

/// Calls made on behalf of a session. Inputs are already validated by the actions layer.
#[async_trait]
pub trait DocumentApi: Send + Sync {
    fn mode(&self) -> ApiMode;

    async fn history(&self, token: &SessionToken) -> Result<Vec<QaPair>, ActionError>;

    async fn upload(&self, token: &SessionToken, file: FileUpload) -> Result<Document, ActionError>;

    async fn ask(
        &self,
        token: &SessionToken,
        document_id: DocumentId,
        question: &str,
    ) -> Result<Answer, ActionError>;

    /// Exchanges credentials for a bearer token.
    async fn login(&self, credentials: &Credentials) -> Result<SessionToken, ActionError>;

    async fn signup(&self, credentials: &Credentials) -> Result<SessionToken, ActionError>;
}

/// Selects the data source once, from `api_mocking`.
pub fn build_api(config: &GatewayConfig) -> Arc<dyn DocumentApi> {
    let api: Arc<dyn DocumentApi> = if config.api_mocking {
        Arc::new(MockApi::new(Duration::from_millis(config.mock_latency_ms)))
    } else {
        Arc::new(LiveApi::new(&config.api_base_url))
    };
    match api.mode() {
        ApiMode::Mock => tracing::info!(
            latency_ms = config.mock_latency_ms,
            "API mocking enabled, serving canned data"
        ),
        ApiMode::Live => tracing::info!(base_url = %config.api_base_url, "Using live Document QA API"),
    }
    api
}
