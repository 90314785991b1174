use crate::domain::{
    ContainerId, ContainerSpec, CreatedContainer, Credential, Engine, StatsSnapshot,
};
use crate::error::Result;
use crate::services::notifier::DEFAULT_NOTIFICATION_DURATION;
use crate::services::planner::{DEFAULT_FALLBACK_HOST_PORT, DEFAULT_SETTLE_DELAY};
use crate::services::state::DEFAULT_NETWORK;
use crate::services::{
    DashboardView, Deployer, LifecycleController, NetworkManager, Notifier,
    ObservabilityFetcher, Planner, ReadinessProbe, SessionState,
};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub settle_delay: Duration,
    pub readiness: ReadinessProbe,
    pub fallback_host_port: u16,
    pub default_network: String,
    pub notification_duration: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            settle_delay: DEFAULT_SETTLE_DELAY,
            readiness: ReadinessProbe::disabled(),
            fallback_host_port: DEFAULT_FALLBACK_HOST_PORT,
            default_network: DEFAULT_NETWORK.to_string(),
            notification_duration: DEFAULT_NOTIFICATION_DURATION,
        }
    }
}

/// One user's dashboard: the state container plus the handlers that are
/// allowed to write to it, all bound to a single credential.
#[derive(Debug)]
pub struct Session {
    credential: Credential,
    state: Arc<SessionState>,
    notifier: Arc<Notifier>,
    lifecycle: LifecycleController,
    networks: NetworkManager,
    observability: ObservabilityFetcher,
}

impl Session {
    pub fn new(engine: Arc<dyn Engine>, credential: Credential, settings: SessionSettings) -> Self {
        let state = Arc::new(SessionState::new(settings.default_network));
        let notifier = Arc::new(Notifier::new(settings.notification_duration));
        let planner = Planner::new(settings.settle_delay, settings.fallback_host_port);
        let deployer = Deployer::new(engine.clone(), settings.readiness);

        Self {
            lifecycle: LifecycleController::new(
                engine.clone(),
                state.clone(),
                notifier.clone(),
                planner,
                deployer,
            ),
            networks: NetworkManager::new(engine.clone(), state.clone(), notifier.clone()),
            observability: ObservabilityFetcher::new(engine, state.clone(), notifier.clone()),
            credential,
            state,
            notifier,
        }
    }

    /// Initial load: containers and networks. Both failures are recorded in
    /// the view; the first error is returned.
    pub async fn load(&self) -> Result<()> {
        let containers = self.lifecycle.refresh(&self.credential).await;
        let networks = self.networks.list(&self.credential).await.map(|_| ());
        containers.and(networks)
    }

    pub async fn create(&self, spec: &ContainerSpec) -> Result<Vec<CreatedContainer>> {
        self.lifecycle.create(spec, &self.credential).await
    }

    pub async fn start(&self, id: &ContainerId) -> Result<()> {
        self.lifecycle.start(id, &self.credential).await
    }

    pub async fn stop(&self, id: &ContainerId) -> Result<()> {
        self.lifecycle.stop(id, &self.credential).await
    }

    pub async fn restart(&self, id: &ContainerId) -> Result<()> {
        self.lifecycle.restart(id, &self.credential).await
    }

    pub async fn delete(&self, id: &ContainerId) -> Result<()> {
        self.lifecycle.delete(id, &self.credential).await
    }

    pub async fn refresh(&self) -> Result<()> {
        self.lifecycle.refresh(&self.credential).await
    }

    pub async fn fetch_logs(&self, id: &ContainerId) -> Result<String> {
        self.observability.fetch_logs(id, &self.credential).await
    }

    pub async fn fetch_stats(&self, id: &ContainerId) -> Result<StatsSnapshot> {
        self.observability.fetch_stats(id, &self.credential).await
    }

    pub async fn list_networks(&self) -> Result<Vec<String>> {
        self.networks.list(&self.credential).await
    }

    pub async fn create_network(&self, name: &str) -> Result<bool> {
        self.networks.create(name, &self.credential).await
    }

    pub fn select_network(&self, name: &str) -> bool {
        self.networks.select(name)
    }

    pub fn dismiss_notification(&self) {
        self.notifier.dismiss();
    }

    pub fn view(&self) -> DashboardView {
        self.state.view(self.notifier.active())
    }
}
