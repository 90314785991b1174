use super::{ContainerId, CreateRequest, CreatedContainer, ManagedContainer, ManagedNetwork};
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::fmt::{self, Debug};

/// Opaque bearer token obtained out of band.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn token(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateAck {
    #[serde(default)]
    pub id: Option<ContainerId>,
    #[serde(default)]
    pub docker_name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl CreateAck {
    /// A creation counts only if the engine handed back an identifier.
    pub fn into_created(self) -> Result<CreatedContainer> {
        let id = self.id.ok_or(Error::UnexpectedResponseShape {
            operation: "create container",
            field: "id",
        })?;
        Ok(CreatedContainer {
            id,
            docker_name: self.docker_name,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageAck {
    #[serde(default)]
    pub message: Option<String>,
}

impl MessageAck {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    pub fn require(self, operation: &'static str) -> Result<String> {
        self.message.ok_or(Error::UnexpectedResponseShape {
            operation,
            field: "message",
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogsAck {
    #[serde(default)]
    pub logs: Option<String>,
}

/// The remote container engine, reached over its HTTP API.
#[async_trait]
pub trait Engine: Send + Sync + Debug {
    /// Exchange credentials for a bearer token
    async fn login(&self, username: &str, password: &str) -> Result<Credential>;

    /// Create an account; no token is issued
    async fn register(&self, username: &str, password: &str) -> Result<MessageAck>;

    /// Full listing of the caller's containers
    async fn list_containers(&self, credential: &Credential) -> Result<Vec<ManagedContainer>>;

    /// Create and run a container from a resolved request
    async fn create_container(
        &self,
        credential: &Credential,
        request: &CreateRequest,
    ) -> Result<CreateAck>;

    /// Start a stopped container
    async fn start_container(
        &self,
        credential: &Credential,
        id: &ContainerId,
    ) -> Result<MessageAck>;

    /// Stop a running container
    async fn stop_container(
        &self,
        credential: &Credential,
        id: &ContainerId,
    ) -> Result<MessageAck>;

    /// Stop and start again
    async fn restart_container(
        &self,
        credential: &Credential,
        id: &ContainerId,
    ) -> Result<MessageAck>;

    /// Remove a container and its engine record
    async fn delete_container(
        &self,
        credential: &Credential,
        id: &ContainerId,
    ) -> Result<MessageAck>;

    /// Latest log output
    async fn container_logs(&self, credential: &Credential, id: &ContainerId) -> Result<LogsAck>;

    /// Raw stats payload; its shape varies between engine versions
    async fn container_stats(&self, credential: &Credential, id: &ContainerId) -> Result<Value>;

    /// Networks visible to the caller
    async fn list_networks(&self, credential: &Credential) -> Result<Vec<ManagedNetwork>>;

    /// Create a user-defined network
    async fn create_network(&self, credential: &Credential, name: &str) -> Result<MessageAck>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ack_requires_id() {
        let ack: CreateAck = serde_json::from_str(r#"{"message": "Faltan campos"}"#).unwrap();
        assert!(matches!(
            ack.into_created(),
            Err(Error::UnexpectedResponseShape { field: "id", .. })
        ));

        let ack: CreateAck = serde_json::from_str(r#"{"id": 12, "docker_name": "web-3"}"#).unwrap();
        let created = ack.into_created().unwrap();
        assert_eq!(created.id, ContainerId::new("12"));
        assert_eq!(created.docker_name.as_deref(), Some("web-3"));
    }

    #[test]
    fn test_message_ack_requires_message() {
        assert!(MessageAck::default().require("stop container").is_err());
        assert_eq!(
            MessageAck::new("Contenedor detenido")
                .require("stop container")
                .unwrap(),
            "Contenedor detenido"
        );
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = Credential::bearer("secret-token");
        assert_eq!(format!("{credential:?}"), "Credential(***)");
        assert!(Credential::bearer("  ").is_empty());
    }
}
