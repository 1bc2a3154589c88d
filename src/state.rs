//! Shared application state and the background expiry sweeper.

use log::debug;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::mcp::tools::ToolRegistry;
use crate::mcp::McpService;
use crate::provider::JobPoller;
use crate::store::session::SessionRegistry;
use crate::store::{ArtifactStore, SWEEP_INTERVAL};

pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<ArtifactStore>,
    pub sessions: Arc<SessionRegistry>,
    pub service: McpService,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let poller = JobPoller::new(
            build_http_client(),
            config.api_base.clone(),
            config.api_key.clone(),
        );
        Self::with_poller(config, poller)
    }

    /// Build state around a caller-supplied poller. Tests point this at a
    /// loopback mock provider with a shortened poll cadence.
    pub fn with_poller(config: AppConfig, poller: JobPoller) -> Self {
        let store = Arc::new(ArtifactStore::new());
        let sessions = Arc::new(SessionRegistry::new());
        let registry = ToolRegistry::new(poller, store.clone(), config.public_base_url.clone());
        let service = McpService::new(registry);

        let state = Self {
            config,
            store,
            sessions,
            service,
        };
        state.spawn_sweeper();
        state
    }

    /// The sweeper is the only component that evicts entries; everything
    /// else only adds or reads.
    fn spawn_sweeper(&self) {
        let store = self.store.clone();
        let sessions = self.sessions.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
            ticker.tick().await; // first tick fires immediately
            loop {
                ticker.tick().await;
                let evicted = store.sweep() + sessions.sweep();
                if evicted > 0 {
                    debug!("expiry sweep evicted {evicted} stale entrie(s)");
                }
            }
        });
    }
}

fn build_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(concat!("napkin-mcp-server/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("Failed to create reqwest client")
}
