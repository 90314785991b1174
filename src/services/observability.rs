use crate::domain::{ContainerId, Credential, Engine, StatsSnapshot};
use crate::error::Result;
use crate::services::{Notifier, SessionState};
use std::sync::Arc;
use tracing::{debug, warn};

const LOGS_UNAVAILABLE: &str = "Could not load logs.";

/// On-demand logs and stats for one container at a time. Results are cached
/// per container until the next fetch for the same id.
#[derive(Debug)]
pub struct ObservabilityFetcher {
    engine: Arc<dyn Engine>,
    state: Arc<SessionState>,
    notifier: Arc<Notifier>,
}

impl ObservabilityFetcher {
    pub fn new(engine: Arc<dyn Engine>, state: Arc<SessionState>, notifier: Arc<Notifier>) -> Self {
        Self {
            engine,
            state,
            notifier,
        }
    }

    pub async fn fetch_logs(&self, id: &ContainerId, credential: &Credential) -> Result<String> {
        match self.engine.container_logs(credential, id).await {
            Ok(ack) => {
                let logs = ack.logs.unwrap_or_else(|| LOGS_UNAVAILABLE.to_string());
                debug!(%id, bytes = logs.len(), "logs fetched");
                self.state.cache_logs(id, logs.clone());
                Ok(logs)
            }
            Err(err) => {
                warn!(%id, "log fetch failed: {err}");
                self.notifier.error(format!("Error fetching logs ({err})"));
                Err(err)
            }
        }
    }

    pub async fn fetch_stats(
        &self,
        id: &ContainerId,
        credential: &Credential,
    ) -> Result<StatsSnapshot> {
        match self.engine.container_stats(credential, id).await {
            Ok(raw) => {
                let stats = StatsSnapshot::normalize(&raw);
                if stats.is_empty() {
                    debug!(%id, "stats payload had no recognizable fields");
                }
                self.state.cache_stats(id, stats.clone());
                Ok(stats)
            }
            Err(err) => {
                warn!(%id, "stats fetch failed: {err}");
                self.notifier.error(format!("Error fetching stats ({err})"));
                Err(err)
            }
        }
    }
}
