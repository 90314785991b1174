use crate::domain::{ContainerId, ManagedContainer, ManagedNetwork, Notification, StatsSnapshot};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

pub const DEFAULT_NETWORK: &str = "dockernest-net";

/// Read model handed to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub containers: Vec<ManagedContainer>,
    pub networks: Vec<String>,
    pub selected_network: String,
    pub notification: Option<Notification>,
    pub load_error: Option<String>,
}

#[derive(Debug, Default)]
struct Inner {
    containers: Vec<ManagedContainer>,
    networks: Vec<ManagedNetwork>,
    selected_network: String,
    logs: HashMap<ContainerId, String>,
    stats: HashMap<ContainerId, StatsSnapshot>,
    load_error: Option<String>,
}

/// Owns the session's view model. Lists change only by full replacement;
/// the per-container caches change only through explicit fetches.
#[derive(Debug)]
pub struct SessionState {
    default_network: String,
    inner: RwLock<Inner>,
}

impl SessionState {
    pub fn new(default_network: impl Into<String>) -> Self {
        let default_network = default_network.into();
        Self {
            inner: RwLock::new(Inner {
                selected_network: default_network.clone(),
                ..Default::default()
            }),
            default_network,
        }
    }

    pub fn replace_containers(&self, mut containers: Vec<ManagedContainer>) {
        let mut inner = self.inner.write();

        inner
            .logs
            .retain(|id, _| containers.iter().any(|c| &c.id == id));
        inner
            .stats
            .retain(|id, _| containers.iter().any(|c| &c.id == id));

        for container in &mut containers {
            container.logs = inner.logs.get(&container.id).cloned();
            container.stats = inner.stats.get(&container.id).cloned();
        }

        debug!(count = containers.len(), "container list replaced");
        inner.containers = containers;
        inner.load_error = None;
    }

    /// A failed listing empties the list rather than leaving stale entries.
    pub fn fail_containers(&self, message: impl Into<String>) {
        let mut inner = self.inner.write();
        inner.containers.clear();
        inner.load_error = Some(message.into());
    }

    /// Keeps the current selection when it survives the refresh, otherwise
    /// falls back to the default network.
    pub fn replace_networks(&self, networks: Vec<ManagedNetwork>) {
        let mut inner = self.inner.write();
        if !networks.iter().any(|n| n.name == inner.selected_network) {
            debug!(
                previous = %inner.selected_network,
                fallback = %self.default_network,
                "selected network vanished"
            );
            inner.selected_network = self.default_network.clone();
        }
        inner.networks = networks;
    }

    pub fn select_network(&self, name: &str) -> bool {
        let mut inner = self.inner.write();
        if inner.networks.iter().any(|n| n.name == name) {
            inner.selected_network = name.to_string();
            true
        } else {
            false
        }
    }

    pub fn selected_network(&self) -> String {
        self.inner.read().selected_network.clone()
    }

    pub fn cache_logs(&self, id: &ContainerId, logs: String) {
        let mut inner = self.inner.write();
        if let Some(container) = inner.containers.iter_mut().find(|c| &c.id == id) {
            container.logs = Some(logs.clone());
        }
        inner.logs.insert(id.clone(), logs);
    }

    pub fn cache_stats(&self, id: &ContainerId, stats: StatsSnapshot) {
        let mut inner = self.inner.write();
        if let Some(container) = inner.containers.iter_mut().find(|c| &c.id == id) {
            container.stats = Some(stats.clone());
        }
        inner.stats.insert(id.clone(), stats);
    }

    pub fn containers(&self) -> Vec<ManagedContainer> {
        self.inner.read().containers.clone()
    }

    pub fn networks(&self) -> Vec<String> {
        self.inner
            .read()
            .networks
            .iter()
            .map(|n| n.name.clone())
            .collect()
    }

    pub fn logs(&self, id: &ContainerId) -> Option<String> {
        self.inner.read().logs.get(id).cloned()
    }

    pub fn stats(&self, id: &ContainerId) -> Option<StatsSnapshot> {
        self.inner.read().stats.get(id).cloned()
    }

    pub fn load_error(&self) -> Option<String> {
        self.inner.read().load_error.clone()
    }

    pub fn view(&self, notification: Option<Notification>) -> DashboardView {
        let inner = self.inner.read();
        DashboardView {
            containers: inner.containers.clone(),
            networks: inner.networks.iter().map(|n| n.name.clone()).collect(),
            selected_network: inner.selected_network.clone(),
            notification,
            load_error: inner.load_error.clone(),
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(DEFAULT_NETWORK)
    }
}
