use crate::domain::{Credential, Engine};
use crate::error::Result;
use crate::services::{Notifier, SessionState};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Lists and creates the networks new containers can join.
#[derive(Debug)]
pub struct NetworkManager {
    engine: Arc<dyn Engine>,
    state: Arc<SessionState>,
    notifier: Arc<Notifier>,
}

impl NetworkManager {
    pub fn new(engine: Arc<dyn Engine>, state: Arc<SessionState>, notifier: Arc<Notifier>) -> Self {
        Self {
            engine,
            state,
            notifier,
        }
    }

    /// Re-lists networks, replacing the selection set.
    pub async fn list(&self, credential: &Credential) -> Result<Vec<String>> {
        let networks = self.engine.list_networks(credential).await?;
        debug!(count = networks.len(), "networks refreshed");
        self.state.replace_networks(networks);
        Ok(self.state.networks())
    }

    /// Returns `Ok(false)` when the name is blank and nothing was sent.
    pub async fn create(&self, name: &str, credential: &Credential) -> Result<bool> {
        let name = name.trim();
        if name.is_empty() {
            debug!("ignoring network create with empty name");
            return Ok(false);
        }

        info!(network = name, "creating network");
        let outcome = self
            .engine
            .create_network(credential, name)
            .await
            .and_then(|ack| ack.require("create network"));

        let result = match outcome {
            Ok(message) => {
                self.notifier.success(message);
                Ok(true)
            }
            Err(err) => {
                warn!(network = name, "network create failed: {err}");
                self.notifier
                    .error(format!("Error creating network ({err})"));
                Err(err)
            }
        };

        if let Err(err) = self.list(credential).await {
            warn!("network refresh failed: {err}");
        }
        result
    }

    /// Only names from the current listing can be selected.
    pub fn select(&self, name: &str) -> bool {
        self.state.select_network(name)
    }

    pub fn selected(&self) -> String {
        self.state.selected_network()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::state::DEFAULT_NETWORK;
    use crate::test_support::MockEngine;

    fn create_test_manager() -> (NetworkManager, Arc<MockEngine>, Arc<Notifier>) {
        let mock = Arc::new(MockEngine::new());
        let notifier = Arc::new(Notifier::default());
        let manager = NetworkManager::new(
            mock.clone(),
            Arc::new(SessionState::default()),
            notifier.clone(),
        );
        (manager, mock, notifier)
    }

    #[tokio::test]
    async fn test_empty_name_is_noop() {
        let (manager, mock, notifier) = create_test_manager();

        assert!(!manager.create("   ", &MockEngine::credential()).await.unwrap());
        assert!(mock.get_commands().is_empty());
        assert!(notifier.active().is_none());
    }

    #[tokio::test]
    async fn test_created_network_becomes_selectable() {
        let (manager, mock, notifier) = create_test_manager();
        mock.add_network("bridge");

        assert!(manager.create("backend", &MockEngine::credential()).await.unwrap());

        assert_eq!(
            mock.get_commands(),
            vec!["create_network:backend".to_string(), "list_networks".to_string()]
        );
        assert!(manager.select("backend"));
        assert_eq!(manager.selected(), "backend");
        assert!(notifier.active().unwrap().message.contains("backend"));
    }

    #[tokio::test]
    async fn test_selection_kept_across_create() {
        let (manager, mock, _) = create_test_manager();
        mock.add_network("frontend");
        manager.list(&MockEngine::credential()).await.unwrap();
        assert!(manager.select("frontend"));

        manager.create("backend", &MockEngine::credential()).await.unwrap();
        assert_eq!(manager.selected(), "frontend");
    }

    #[tokio::test]
    async fn test_selection_falls_back_when_network_disappears() {
        let (manager, mock, _) = create_test_manager();
        mock.add_network("frontend");
        manager.list(&MockEngine::credential()).await.unwrap();
        assert!(manager.select("frontend"));

        mock.remove_network("frontend");
        manager.list(&MockEngine::credential()).await.unwrap();
        assert_eq!(manager.selected(), DEFAULT_NETWORK);
    }

    #[tokio::test]
    async fn test_failed_create_still_relists() {
        let (manager, mock, notifier) = create_test_manager();
        mock.set_fail_on("create_network");

        assert!(manager.create("backend", &MockEngine::credential()).await.is_err());
        assert!(mock.get_commands().contains(&"list_networks".to_string()));
        assert!(notifier.active().unwrap().message.starts_with("Error creating network"));
    }
}
