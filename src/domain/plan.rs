use crate::domain::{AccessMode, ContainerId};
use crate::error::{Error, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VolumeMount {
    pub bind: String,
    pub mode: AccessMode,
}

/// Body of `POST /containers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateRequest {
    pub name: String,
    pub image: String,
    pub command: Option<String>,
    pub env: BTreeMap<String, String>,
    pub ports: BTreeMap<String, u16>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub volumes: BTreeMap<String, VolumeMount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
}

impl CreateRequest {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            command: None,
            env: BTreeMap::new(),
            ports: BTreeMap::new(),
            volumes: BTreeMap::new(),
            network: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedContainer {
    pub id: ContainerId,
    /// Host-resolvable name the engine generated. Dependent steps link to
    /// this rather than the raw identifier.
    pub docker_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepRole {
    Database,
    Application,
}

/// Field of the previous step's result that feeds a dependent step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultField {
    DockerName,
    Id,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Minimum time between the previous creation returning and this step
    /// being issued.
    pub settle_delay: Duration,
    pub inject_env: Vec<(String, ResultField)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentStep {
    pub label: String,
    pub role: StepRole,
    pub request: CreateRequest,
    pub dependency: Option<Dependency>,
}

impl DeploymentStep {
    pub fn immediate(label: impl Into<String>, role: StepRole, request: CreateRequest) -> Self {
        Self {
            label: label.into(),
            role,
            request,
            dependency: None,
        }
    }

    pub fn dependent(
        label: impl Into<String>,
        role: StepRole,
        request: CreateRequest,
        dependency: Dependency,
    ) -> Self {
        Self {
            label: label.into(),
            role,
            request,
            dependency: Some(dependency),
        }
    }

    /// Final creation request, with values from the previous step's result
    /// injected into the environment.
    pub fn resolve(&self, previous: Option<&CreatedContainer>) -> Result<CreateRequest> {
        let Some(dependency) = &self.dependency else {
            return Ok(self.request.clone());
        };
        // Only reachable if a plan lists a dependent step first.
        let previous = previous.ok_or(Error::UnexpectedResponseShape {
            operation: "create container",
            field: "id",
        })?;

        let mut request = self.request.clone();
        for (key, field) in &dependency.inject_env {
            let value = match field {
                ResultField::DockerName => previous.docker_name.clone().ok_or(
                    Error::UnexpectedResponseShape {
                        operation: "create container",
                        field: "docker_name",
                    },
                )?,
                ResultField::Id => previous.id.to_string(),
            };
            request.env.insert(key.clone(), value);
        }
        Ok(request)
    }
}

/// Ordered steps for one create action. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentPlan {
    steps: Vec<DeploymentStep>,
}

impl DeploymentPlan {
    pub fn single(step: DeploymentStep) -> Self {
        Self { steps: vec![step] }
    }

    pub fn chain(first: DeploymentStep, rest: impl IntoIterator<Item = DeploymentStep>) -> Self {
        let mut steps = vec![first];
        steps.extend(rest);
        Self { steps }
    }

    pub fn steps(&self) -> &[DeploymentStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn is_composite(&self) -> bool {
        self.steps.len() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dependent_step() -> DeploymentStep {
        DeploymentStep::dependent(
            "app",
            StepRole::Application,
            CreateRequest::new("app", "app:latest"),
            Dependency {
                settle_delay: Duration::from_secs(1),
                inject_env: vec![
                    ("DB_HOST".into(), ResultField::DockerName),
                    ("DB_ID".into(), ResultField::Id),
                ],
            },
        )
    }

    #[test]
    fn test_resolve_injects_previous_result() {
        let previous = CreatedContainer {
            id: ContainerId::new("41"),
            docker_name: Some("app_db-1".into()),
        };

        let request = dependent_step().resolve(Some(&previous)).unwrap();
        assert_eq!(request.env.get("DB_HOST").map(String::as_str), Some("app_db-1"));
        assert_eq!(request.env.get("DB_ID").map(String::as_str), Some("41"));
    }

    #[test]
    fn test_resolve_fails_without_docker_name() {
        let previous = CreatedContainer {
            id: ContainerId::new("41"),
            docker_name: None,
        };

        let err = dependent_step().resolve(Some(&previous)).unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedResponseShape {
                field: "docker_name",
                ..
            }
        ));
    }

    #[test]
    fn test_resolve_requires_previous_result() {
        assert!(matches!(
            dependent_step().resolve(None),
            Err(Error::UnexpectedResponseShape { field: "id", .. })
        ));
    }

    #[test]
    fn test_create_request_omits_empty_optionals() {
        let body = serde_json::to_value(CreateRequest::new("web", "nginx")).unwrap();
        assert!(body.get("volumes").is_none());
        assert!(body.get("network").is_none());
        assert!(body.get("command").unwrap().is_null());
        assert!(body.get("env").unwrap().as_object().unwrap().is_empty());
    }
}
