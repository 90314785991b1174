use crate::domain::{
    ContainerId, ContainerStatus, CreateAck, CreateRequest, Credential, Engine, LogsAck,
    ManagedContainer, ManagedNetwork, MessageAck,
};
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::RwLock;
use tokio::time::Instant;

const MOCK_TOKEN: &str = "mock-token";
const MOCK_OWNER: &str = "tester";

/// In-memory engine that records every call it receives.
///
/// Commands are recorded as `op` or `op:target` (`create:web1`, `stop:3`).
/// `set_fail_on` and `set_missing_ack` accept either form.
#[derive(Debug)]
pub struct MockEngine {
    containers: RwLock<BTreeMap<u64, ManagedContainer>>,
    next_id: RwLock<u64>,
    networks: RwLock<Vec<String>>,
    commands: RwLock<Vec<(String, Instant)>>,
    requests: RwLock<Vec<CreateRequest>>,
    fail_on: RwLock<HashSet<String>>,
    missing_ack: RwLock<HashSet<String>>,
    created_status: RwLock<ContainerStatus>,
    logs: RwLock<HashMap<ContainerId, String>>,
    stats: RwLock<HashMap<ContainerId, Value>>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            containers: RwLock::new(BTreeMap::new()),
            next_id: RwLock::new(1),
            networks: RwLock::new(Vec::new()),
            commands: RwLock::new(Vec::new()),
            requests: RwLock::new(Vec::new()),
            fail_on: RwLock::new(HashSet::new()),
            missing_ack: RwLock::new(HashSet::new()),
            created_status: RwLock::new(ContainerStatus::Running),
            logs: RwLock::new(HashMap::new()),
            stats: RwLock::new(HashMap::new()),
        }
    }

    /// The token every mock call accepts.
    pub fn credential() -> Credential {
        Credential::bearer(MOCK_TOKEN)
    }

    pub fn add_container(&self, name: &str, status: ContainerStatus) -> ContainerId {
        let id = self.allocate_id();
        let mut container = ManagedContainer::new(id.to_string(), name, status);
        container.owner = Some(MOCK_OWNER.to_string());
        let container_id = container.id.clone();
        self.containers.write().unwrap().insert(id, container);
        container_id
    }

    pub fn add_network(&self, name: &str) {
        let mut networks = self.networks.write().unwrap();
        if !networks.iter().any(|n| n == name) {
            networks.push(name.to_string());
        }
    }

    pub fn remove_network(&self, name: &str) {
        self.networks.write().unwrap().retain(|n| n != name);
    }

    pub fn set_fail_on(&self, operation: &str) {
        self.fail_on.write().unwrap().insert(operation.to_string());
    }

    /// Makes the matching call succeed without its acknowledgment field.
    pub fn set_missing_ack(&self, operation: &str) {
        self.missing_ack.write().unwrap().insert(operation.to_string());
    }

    /// Status given to containers created from now on.
    pub fn set_created_status(&self, status: ContainerStatus) {
        *self.created_status.write().unwrap() = status;
    }

    pub fn set_status_by_name(&self, name: &str, status: ContainerStatus) {
        let mut containers = self.containers.write().unwrap();
        if let Some(container) = containers.values_mut().find(|c| c.name == name) {
            container.status = status;
        }
    }

    pub fn set_logs(&self, id: &ContainerId, logs: &str) {
        self.logs.write().unwrap().insert(id.clone(), logs.to_string());
    }

    pub fn set_stats(&self, id: &ContainerId, stats: Value) {
        self.stats.write().unwrap().insert(id.clone(), stats);
    }

    pub fn get_commands(&self) -> Vec<String> {
        self.commands
            .read()
            .unwrap()
            .iter()
            .map(|(command, _)| command.clone())
            .collect()
    }

    pub fn get_timed_commands(&self) -> Vec<(String, Instant)> {
        self.commands.read().unwrap().clone()
    }

    pub fn created_requests(&self) -> Vec<CreateRequest> {
        self.requests.read().unwrap().clone()
    }

    pub fn container_exists(&self, name: &str) -> bool {
        self.containers
            .read()
            .unwrap()
            .values()
            .any(|c| c.name == name)
    }

    pub fn get_state(&self, name: &str) -> Option<ContainerStatus> {
        self.containers
            .read()
            .unwrap()
            .values()
            .find(|c| c.name == name)
            .map(|c| c.status)
    }

    fn allocate_id(&self) -> u64 {
        let mut next = self.next_id.write().unwrap();
        let id = *next;
        *next += 1;
        id
    }

    fn record_command(&self, op: &str, target: Option<&str>) {
        let command = match target {
            Some(target) => format!("{op}:{target}"),
            None => op.to_string(),
        };
        self.commands.write().unwrap().push((command, Instant::now()));
    }

    fn matches(set: &RwLock<HashSet<String>>, op: &str, target: Option<&str>) -> bool {
        let set = set.read().unwrap();
        set.contains(op) || target.is_some_and(|t| set.contains(&format!("{op}:{t}")))
    }

    fn check_call(&self, credential: &Credential, op: &str, target: Option<&str>) -> Result<()> {
        self.record_command(op, target);
        if credential.token() != MOCK_TOKEN {
            return Err(Error::Authentication("invalid or missing token".into()));
        }
        if Self::matches(&self.fail_on, op, target) {
            return Err(Error::EngineCall(format!("Mock failure on: {op}")));
        }
        Ok(())
    }

    fn ack_missing(&self, op: &str, target: Option<&str>) -> bool {
        Self::matches(&self.missing_ack, op, target)
    }

    fn key(id: &ContainerId) -> Result<u64> {
        id.as_str()
            .parse()
            .map_err(|_| Error::EngineCall(format!("404 Not Found: container {id}")))
    }

    fn with_container<T>(
        &self,
        id: &ContainerId,
        f: impl FnOnce(&mut BTreeMap<u64, ManagedContainer>, u64) -> T,
    ) -> Result<T> {
        let key = Self::key(id)?;
        let mut containers = self.containers.write().unwrap();
        if !containers.contains_key(&key) {
            return Err(Error::EngineCall(format!("404 Not Found: container {id}")));
        }
        Ok(f(&mut containers, key))
    }

    fn transition(
        &self,
        credential: &Credential,
        op: &str,
        id: &ContainerId,
        status: Option<ContainerStatus>,
        message: &str,
    ) -> Result<MessageAck> {
        self.check_call(credential, op, Some(id.as_str()))?;
        self.with_container(id, |containers, key| match status {
            Some(status) => {
                if let Some(container) = containers.get_mut(&key) {
                    container.status = status;
                }
            }
            None => {
                containers.remove(&key);
            }
        })?;

        if self.ack_missing(op, Some(id.as_str())) {
            return Ok(MessageAck::default());
        }
        Ok(MessageAck::new(message))
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Engine for MockEngine {
    async fn login(&self, username: &str, password: &str) -> Result<Credential> {
        self.record_command("login", Some(username));
        if username != MOCK_OWNER || password.is_empty() {
            return Err(Error::Authentication("bad credentials".into()));
        }
        Ok(Self::credential())
    }

    async fn register(&self, username: &str, _password: &str) -> Result<MessageAck> {
        self.record_command("register", Some(username));
        if Self::matches(&self.fail_on, "register", Some(username)) {
            return Err(Error::EngineCall("Mock failure on: register".into()));
        }
        Ok(MessageAck::new(format!("User {username} registered")))
    }

    async fn list_containers(&self, credential: &Credential) -> Result<Vec<ManagedContainer>> {
        self.check_call(credential, "list_containers", None)?;
        Ok(self.containers.read().unwrap().values().cloned().collect())
    }

    async fn create_container(
        &self,
        credential: &Credential,
        request: &CreateRequest,
    ) -> Result<CreateAck> {
        self.check_call(credential, "create", Some(&request.name))?;
        self.requests.write().unwrap().push(request.clone());

        let id = self.allocate_id();
        let docker_name = format!("{}-1", request.name);
        let mut container = ManagedContainer::new(
            id.to_string(),
            request.name.clone(),
            *self.created_status.read().unwrap(),
        );
        container.image = request.image.clone();
        container.owner = Some(MOCK_OWNER.to_string());
        container.network = request.network.clone();
        container.ports = request
            .ports
            .iter()
            .map(|(port, host)| (port.clone(), Some(host.to_string())))
            .collect();
        self.containers.write().unwrap().insert(id, container);

        if self.ack_missing("create", Some(&request.name)) {
            return Ok(CreateAck {
                message: Some("Missing fields".into()),
                ..CreateAck::default()
            });
        }
        Ok(CreateAck {
            id: Some(ContainerId::new(id.to_string())),
            docker_name: Some(docker_name),
            message: Some("Container created".into()),
        })
    }

    async fn start_container(
        &self,
        credential: &Credential,
        id: &ContainerId,
    ) -> Result<MessageAck> {
        self.transition(
            credential,
            "start",
            id,
            Some(ContainerStatus::Running),
            "Container started",
        )
    }

    async fn stop_container(
        &self,
        credential: &Credential,
        id: &ContainerId,
    ) -> Result<MessageAck> {
        self.transition(
            credential,
            "stop",
            id,
            Some(ContainerStatus::Stopped),
            "Container stopped",
        )
    }

    async fn restart_container(
        &self,
        credential: &Credential,
        id: &ContainerId,
    ) -> Result<MessageAck> {
        self.transition(
            credential,
            "restart",
            id,
            Some(ContainerStatus::Running),
            "Container restarted",
        )
    }

    async fn delete_container(
        &self,
        credential: &Credential,
        id: &ContainerId,
    ) -> Result<MessageAck> {
        self.transition(credential, "delete", id, None, "Container deleted")
    }

    async fn container_logs(&self, credential: &Credential, id: &ContainerId) -> Result<LogsAck> {
        self.check_call(credential, "logs", Some(id.as_str()))?;
        self.with_container(id, |_, _| ())?;
        Ok(LogsAck {
            logs: self.logs.read().unwrap().get(id).cloned(),
        })
    }

    async fn container_stats(&self, credential: &Credential, id: &ContainerId) -> Result<Value> {
        self.check_call(credential, "stats", Some(id.as_str()))?;
        self.with_container(id, |_, _| ())?;
        Ok(self
            .stats
            .read()
            .unwrap()
            .get(id)
            .cloned()
            .unwrap_or_else(|| json!({})))
    }

    async fn list_networks(&self, credential: &Credential) -> Result<Vec<ManagedNetwork>> {
        self.check_call(credential, "list_networks", None)?;
        Ok(self
            .networks
            .read()
            .unwrap()
            .iter()
            .map(ManagedNetwork::new)
            .collect())
    }

    async fn create_network(&self, credential: &Credential, name: &str) -> Result<MessageAck> {
        self.check_call(credential, "create_network", Some(name))?;
        self.add_network(name);
        if self.ack_missing("create_network", Some(name)) {
            return Ok(MessageAck::default());
        }
        Ok(MessageAck::new(format!("Network {name} created")))
    }
}
