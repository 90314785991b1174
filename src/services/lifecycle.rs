use crate::domain::{
    ContainerId, ContainerSpec, CreatedContainer, Credential, Engine, MessageAck,
};
use crate::error::{Error, Result};
use crate::services::{Deployer, Notifier, Planner, SessionState};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    Delete,
    Start,
    Stop,
    Restart,
}

impl Verb {
    fn operation(self) -> &'static str {
        match self {
            Self::Delete => "delete container",
            Self::Start => "start container",
            Self::Stop => "stop container",
            Self::Restart => "restart container",
        }
    }

    fn success_message(self) -> &'static str {
        match self {
            Self::Delete => "Container deleted",
            Self::Start => "Container started",
            Self::Stop => "Container stopped",
            Self::Restart => "Container restarted",
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            Self::Delete => "Error deleting container",
            Self::Start => "Error starting container",
            Self::Stop => "Error stopping container",
            Self::Restart => "Error restarting container",
        }
    }
}

/// Issues lifecycle operations and reconciles the container list with the
/// engine after each one. The cached list is never patched locally.
#[derive(Debug)]
pub struct LifecycleController {
    engine: Arc<dyn Engine>,
    state: Arc<SessionState>,
    notifier: Arc<Notifier>,
    planner: Planner,
    deployer: Deployer,
}

impl LifecycleController {
    pub fn new(
        engine: Arc<dyn Engine>,
        state: Arc<SessionState>,
        notifier: Arc<Notifier>,
        planner: Planner,
        deployer: Deployer,
    ) -> Self {
        Self {
            engine,
            state,
            notifier,
            planner,
            deployer,
        }
    }

    /// Plans and deploys `spec`. A spec without a network joins the
    /// session's selected one.
    pub async fn create(
        &self,
        spec: &ContainerSpec,
        credential: &Credential,
    ) -> Result<Vec<CreatedContainer>> {
        let mut spec = spec.clone();
        if spec.network.is_none() {
            spec.network = Some(self.state.selected_network());
        }

        let plan = match self.planner.plan(&spec) {
            Ok(plan) => plan,
            Err(err) => {
                self.notifier
                    .error("Please fill in the container name and image.");
                return Err(err);
            }
        };

        if plan.is_composite() {
            self.notifier
                .info(format!("Deploying {} with its database...", spec.image));
        }

        let outcome = self.deployer.execute(&plan, credential).await;
        match &outcome {
            Ok(created) if plan.is_composite() => {
                info!(
                    name = %spec.name,
                    containers = created.len(),
                    "composite deployment finished"
                );
                self.notifier.success(format!("{} deployed", spec.name));
            }
            Ok(_) => self.notifier.success("Container created"),
            Err(Error::PartialDeployment { label, source, .. }) => {
                self.notifier
                    .error(format!("Error creating {label} container ({source})"));
            }
            Err(err) => self
                .notifier
                .error(format!("Error creating container ({err})")),
        }

        self.reconcile(credential).await;
        outcome
    }

    pub async fn delete(&self, id: &ContainerId, credential: &Credential) -> Result<()> {
        self.acknowledge(Verb::Delete, id, credential).await
    }

    pub async fn start(&self, id: &ContainerId, credential: &Credential) -> Result<()> {
        self.acknowledge(Verb::Start, id, credential).await
    }

    pub async fn stop(&self, id: &ContainerId, credential: &Credential) -> Result<()> {
        self.acknowledge(Verb::Stop, id, credential).await
    }

    pub async fn restart(&self, id: &ContainerId, credential: &Credential) -> Result<()> {
        self.acknowledge(Verb::Restart, id, credential).await
    }

    /// Replaces the cached list with the engine's current listing.
    pub async fn refresh(&self, credential: &Credential) -> Result<()> {
        match self.engine.list_containers(credential).await {
            Ok(containers) => {
                debug!(count = containers.len(), "containers refreshed");
                self.state.replace_containers(containers);
                Ok(())
            }
            Err(err) => {
                warn!("container refresh failed: {err}");
                self.state
                    .fail_containers(format!("Could not load containers: {err}"));
                Err(err)
            }
        }
    }

    async fn acknowledge(
        &self,
        verb: Verb,
        id: &ContainerId,
        credential: &Credential,
    ) -> Result<()> {
        info!(%id, operation = verb.operation(), "issuing");

        let response = match verb {
            Verb::Delete => self.engine.delete_container(credential, id).await,
            Verb::Start => self.engine.start_container(credential, id).await,
            Verb::Stop => self.engine.stop_container(credential, id).await,
            Verb::Restart => self.engine.restart_container(credential, id).await,
        };
        let outcome = response.and_then(|ack: MessageAck| ack.require(verb.operation()));

        let result = match outcome {
            Ok(message) => {
                debug!(%id, %message, "engine acknowledged");
                self.notifier.success(verb.success_message());
                Ok(())
            }
            Err(err) => {
                warn!(%id, operation = verb.operation(), "failed: {err}");
                self.notifier
                    .error(format!("{} ({err})", verb.failure_message()));
                Err(err)
            }
        };

        // The engine's actual state is unknown after a failure, so reconcile
        // either way.
        self.reconcile(credential).await;
        result
    }

    async fn reconcile(&self, credential: &Credential) {
        let _ = self.refresh(credential).await;
    }
}
