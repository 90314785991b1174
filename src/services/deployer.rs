use crate::domain::{
    ContainerStatus, CreatedContainer, Credential, Dependency, DeploymentPlan, DeploymentStep,
    Engine,
};
use crate::error::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

/// Bounded poll against a dependency before its dependent step is issued.
/// Zero attempts leaves only the settle delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessProbe {
    pub attempts: u32,
    pub interval: Duration,
}

impl ReadinessProbe {
    pub fn disabled() -> Self {
        Self {
            attempts: 0,
            interval: Duration::from_secs(1),
        }
    }
}

impl Default for ReadinessProbe {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Runs deployment plans against the engine, one step at a time.
#[derive(Debug)]
pub struct Deployer {
    engine: Arc<dyn Engine>,
    readiness: ReadinessProbe,
}

impl Deployer {
    pub fn new(engine: Arc<dyn Engine>, readiness: ReadinessProbe) -> Self {
        Self { engine, readiness }
    }

    /// Executes every step in order. Stops at the first failure and leaves
    /// whatever earlier steps created in place.
    pub async fn execute(
        &self,
        plan: &DeploymentPlan,
        credential: &Credential,
    ) -> Result<Vec<CreatedContainer>> {
        let mut created: Vec<CreatedContainer> = Vec::with_capacity(plan.len());
        let mut previous_finished: Option<Instant> = None;

        for (index, step) in plan.steps().iter().enumerate() {
            let number = index + 1;
            info!(step = number, total = plan.len(), label = %step.label, "deploying");

            let outcome = self
                .run_step(step, created.last(), previous_finished, credential)
                .await;

            match outcome {
                Ok(container) => {
                    debug!(step = number, id = %container.id, "step created container");
                    previous_finished = Some(Instant::now());
                    created.push(container);
                }
                Err(err) if plan.is_composite() => {
                    warn!(
                        step = number,
                        label = %step.label,
                        left_behind = created.len(),
                        "composite deployment halted: {err}"
                    );
                    return Err(Error::PartialDeployment {
                        step: number,
                        label: step.label.clone(),
                        created,
                        source: Box::new(err),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        Ok(created)
    }

    async fn run_step(
        &self,
        step: &DeploymentStep,
        previous: Option<&CreatedContainer>,
        previous_finished: Option<Instant>,
        credential: &Credential,
    ) -> Result<CreatedContainer> {
        let request = step.resolve(previous)?;

        if let (Some(dependency), Some(previous)) = (&step.dependency, previous) {
            let since = previous_finished.unwrap_or_else(Instant::now);
            self.wait_for(previous, dependency, since, credential).await;
        }

        self.engine
            .create_container(credential, &request)
            .await?
            .into_created()
    }

    /// Polls the dependency (if enabled) and then sleeps out the remainder
    /// of the settle delay. The probe can only add waiting.
    async fn wait_for(
        &self,
        previous: &CreatedContainer,
        dependency: &Dependency,
        since: Instant,
        credential: &Credential,
    ) {
        for attempt in 1..=self.readiness.attempts {
            match self.engine.list_containers(credential).await {
                Ok(containers) => {
                    let status = containers
                        .iter()
                        .find(|c| c.id == previous.id)
                        .map(|c| c.status);
                    if status == Some(ContainerStatus::Running) {
                        info!(id = %previous.id, attempt, "dependency is running");
                        break;
                    }
                    debug!(id = %previous.id, attempt, ?status, "dependency not running yet");
                }
                Err(err) => warn!(id = %previous.id, attempt, "readiness probe failed: {err}"),
            }

            if attempt == self.readiness.attempts {
                warn!(id = %previous.id, "dependency never reported running");
            } else {
                sleep(self.readiness.interval).await;
            }
        }

        let remaining = dependency.settle_delay.saturating_sub(since.elapsed());
        if !remaining.is_zero() {
            debug!(?remaining, "waiting for dependency to settle");
            sleep(remaining).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ContainerSpec;
    use crate::services::Planner;
    use crate::test_support::MockEngine;

    fn create_test_deployer(readiness: ReadinessProbe) -> (Deployer, Arc<MockEngine>) {
        let mock = Arc::new(MockEngine::new());
        let deployer = Deployer::new(mock.clone(), readiness);
        (deployer, mock)
    }

    fn wordpress_plan() -> DeploymentPlan {
        Planner::default()
            .plan(&ContainerSpec::new("web1", "wordpress:latest"))
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_composite_steps_run_in_order_with_settle_delay() {
        let (deployer, mock) = create_test_deployer(ReadinessProbe::disabled());

        let created = deployer
            .execute(&wordpress_plan(), &MockEngine::credential())
            .await
            .unwrap();
        assert_eq!(created.len(), 2);

        let commands = mock.get_timed_commands();
        let db = commands.iter().find(|(c, _)| c == "create:web1_db").unwrap();
        let app = commands.iter().find(|(c, _)| c == "create:web1").unwrap();
        assert!(app.1 - db.1 >= Duration::from_secs(4));

        let requests = mock.created_requests();
        assert_eq!(requests[0].name, "web1_db");
        assert_eq!(
            requests[1].env.get("WORDPRESS_DB_HOST"),
            created[0].docker_name.as_ref()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_polls_until_dependency_runs() {
        let readiness = ReadinessProbe {
            attempts: 10,
            interval: Duration::from_millis(500),
        };
        let (deployer, mock) = create_test_deployer(readiness);
        mock.set_created_status(ContainerStatus::Created);

        let mock_clone = mock.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(1_200)).await;
            mock_clone.set_status_by_name("web1_db", ContainerStatus::Running);
        });

        let started = Instant::now();
        deployer
            .execute(&wordpress_plan(), &MockEngine::credential())
            .await
            .unwrap();

        let polls = mock
            .get_commands()
            .iter()
            .filter(|c| c.as_str() == "list_containers")
            .count();
        assert!((2..10).contains(&polls), "polled {polls} times");
        // Probe finished early, but the settle delay still holds.
        assert!(started.elapsed() >= Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_running_dependency_keeps_settle_delay() {
        let readiness = ReadinessProbe {
            attempts: 5,
            interval: Duration::from_secs(1),
        };
        let (deployer, mock) = create_test_deployer(readiness);

        deployer
            .execute(&wordpress_plan(), &MockEngine::credential())
            .await
            .unwrap();

        let commands = mock.get_timed_commands();
        let db = commands.iter().find(|(c, _)| c == "create:web1_db").unwrap();
        let app = commands.iter().find(|(c, _)| c == "create:web1").unwrap();
        assert!(app.1 - db.1 >= Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_exhaustion_still_deploys() {
        let readiness = ReadinessProbe {
            attempts: 3,
            interval: Duration::from_secs(1),
        };
        let (deployer, mock) = create_test_deployer(readiness);
        mock.set_created_status(ContainerStatus::Created);

        let created = deployer
            .execute(&wordpress_plan(), &MockEngine::credential())
            .await
            .unwrap();

        assert_eq!(created.len(), 2);
        let polls = mock
            .get_commands()
            .iter()
            .filter(|c| c.as_str() == "list_containers")
            .count();
        assert_eq!(polls, 3);

        let commands = mock.get_timed_commands();
        let db = commands.iter().find(|(c, _)| c == "create:web1_db").unwrap();
        let app = commands.iter().find(|(c, _)| c == "create:web1").unwrap();
        assert!(app.1 - db.1 >= Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_step_failure_never_issues_second() {
        let (deployer, mock) = create_test_deployer(ReadinessProbe::disabled());
        mock.set_missing_ack("create:web1_db");

        let err = deployer
            .execute(&wordpress_plan(), &MockEngine::credential())
            .await
            .unwrap_err();

        match err {
            Error::PartialDeployment {
                step,
                label,
                created,
                ..
            } => {
                assert_eq!(step, 1);
                assert!(label.contains("database"));
                assert!(created.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!mock.get_commands().contains(&"create:web1".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_step_failure_leaves_first_in_place() {
        let (deployer, mock) = create_test_deployer(ReadinessProbe::disabled());
        mock.set_fail_on("create:web1");

        let err = deployer
            .execute(&wordpress_plan(), &MockEngine::credential())
            .await
            .unwrap_err();

        let Error::PartialDeployment { step, created, .. } = err else {
            panic!("expected partial deployment");
        };
        assert_eq!(step, 2);
        assert_eq!(created.len(), 1);
        assert!(mock.container_exists("web1_db"));
        assert!(!mock.get_commands().iter().any(|c| c.starts_with("delete:")));
    }

    #[tokio::test]
    async fn test_single_step_failure_is_not_wrapped() {
        let (deployer, mock) = create_test_deployer(ReadinessProbe::disabled());
        mock.set_fail_on("create");

        let plan = Planner::default()
            .plan(&ContainerSpec::new("cache", "redis:latest"))
            .unwrap();
        let err = deployer
            .execute(&plan, &MockEngine::credential())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EngineCall(_)));
    }
}
