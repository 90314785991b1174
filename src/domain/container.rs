use crate::domain::StatsSnapshot;
use crate::domain::template::TemplateDefault;
use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Engine-assigned identifier. Arrives as a JSON number or string and is
/// carried as text either way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ContainerId(String);

impl ContainerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContainerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for ContainerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self(Text::deserialize(deserializer)?.into_string()))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Text {
    Number(serde_json::Number),
    Str(String),
}

impl Text {
    fn into_string(self) -> String {
        match self {
            Text::Number(n) => n.to_string(),
            Text::Str(s) => s,
        }
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Text>::deserialize(deserializer)?.map(Text::into_string))
}

fn lenient_port_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Option<Text>>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(port, host)| (port, host.map(Text::into_string)))
        .collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContainerStatus {
    Created,
    Running,
    Stopped,
    #[default]
    Unknown,
}

impl ContainerStatus {
    /// Maps the engine's free-form status string onto the lifecycle states
    /// the dashboard tracks.
    pub fn from_engine(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "created" => Self::Created,
            "running" | "restarting" => Self::Running,
            "exited" | "stopped" | "paused" | "dead" => Self::Stopped,
            _ => Self::Unknown,
        }
    }
}

impl From<String> for ContainerStatus {
    fn from(value: String) -> Self {
        Self::from_engine(&value)
    }
}

impl<'de> Deserialize<'de> for ContainerStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<String>::deserialize(deserializer)?
            .map(Self::from)
            .unwrap_or_default())
    }
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// A container as the engine reports it in a full listing.
///
/// Only `logs` and `stats` are ever written locally, and only on an explicit
/// fetch. Everything else comes from the most recent refresh.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ManagedContainer {
    pub id: ContainerId,
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub status: ContainerStatus,
    #[serde(default, rename = "usuario", deserialize_with = "lenient_text")]
    pub owner: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
    /// Container port ("80/tcp") to realized host port.
    #[serde(default, deserialize_with = "lenient_port_map")]
    pub ports: BTreeMap<String, Option<String>>,
    #[serde(skip)]
    pub logs: Option<String>,
    #[serde(skip)]
    pub stats: Option<StatsSnapshot>,
}

impl ManagedContainer {
    pub fn new(id: impl Into<String>, name: impl Into<String>, status: ContainerStatus) -> Self {
        Self {
            id: ContainerId::new(id),
            name: name.into(),
            image: String::new(),
            status,
            owner: None,
            network: None,
            ports: BTreeMap::new(),
            logs: None,
            stats: None,
        }
    }

    /// Browser address for the first published port, if any.
    pub fn access_url(&self) -> Option<String> {
        self.ports
            .values()
            .next()
            .and_then(|host| host.as_deref())
            .map(|host| format!("http://localhost:{host}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManagedNetwork {
    pub name: String,
}

impl ManagedNetwork {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
    Sctp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Tcp => "tcp",
            Self::Udp => "udp",
            Self::Sctp => "sctp",
        })
    }
}

impl FromStr for Protocol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tcp" => Ok(Self::Tcp),
            "udp" => Ok(Self::Udp),
            "sctp" => Ok(Self::Sctp),
            other => Err(Error::Validation(format!("unknown protocol '{other}'"))),
        }
    }
}

/// One requested port publication. Either side may be missing in raw input;
/// only complete pairs reach the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PortBinding {
    pub host_port: Option<u16>,
    pub container_port: Option<u16>,
    pub protocol: Protocol,
}

impl PortBinding {
    pub fn new(host_port: u16, container_port: u16) -> Self {
        Self {
            host_port: Some(host_port),
            container_port: Some(container_port),
            protocol: Protocol::Tcp,
        }
    }

    /// Engine key ("80/tcp") and host port, when both sides are present.
    pub fn entry(&self) -> Option<(String, u16)> {
        let container = self.container_port?;
        let host = self.host_port?;
        Some((format!("{container}/{}", self.protocol), host))
    }
}

fn parse_port(raw: &str, input: &str) -> Result<Option<u16>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<u16>()
        .map(Some)
        .map_err(|_| Error::Validation(format!("invalid port '{raw}' in '{input}'")))
}

impl FromStr for PortBinding {
    type Err = Error;

    /// Accepts `HOST:CONTAINER[/proto]`, `HOST` or `:CONTAINER[/proto]`.
    fn from_str(s: &str) -> Result<Self> {
        let (ports, protocol) = match s.split_once('/') {
            Some((ports, proto)) => (ports, proto.parse()?),
            None => (s, Protocol::Tcp),
        };
        let (host, container) = match ports.split_once(':') {
            Some((host, container)) => (host, container),
            None => (ports, ""),
        };

        let binding = Self {
            host_port: parse_port(host, s)?,
            container_port: parse_port(container, s)?,
            protocol,
        };
        if binding.host_port.is_none() && binding.container_port.is_none() {
            return Err(Error::Validation(format!("empty port binding '{s}'")));
        }
        Ok(binding)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum AccessMode {
    #[default]
    #[serde(rename = "rw")]
    ReadWrite,
    #[serde(rename = "ro")]
    ReadOnly,
}

impl FromStr for AccessMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "rw" => Ok(Self::ReadWrite),
            "ro" => Ok(Self::ReadOnly),
            other => Err(Error::Validation(format!("unknown volume mode '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeBinding {
    pub host_path: String,
    pub container_path: String,
    pub mode: AccessMode,
}

impl VolumeBinding {
    pub fn new(host_path: impl Into<String>, container_path: impl Into<String>) -> Self {
        Self {
            host_path: host_path.into(),
            container_path: container_path.into(),
            mode: AccessMode::ReadWrite,
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.host_path.trim().is_empty() && !self.container_path.trim().is_empty()
    }
}

impl FromStr for VolumeBinding {
    type Err = Error;

    /// `HOST:CONTAINER[:rw|ro]`
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.splitn(3, ':');
        let host = parts.next().unwrap_or_default();
        let container = parts
            .next()
            .ok_or_else(|| Error::Validation(format!("volume '{s}' must be HOST:CONTAINER")))?;
        let mode = match parts.next() {
            Some(mode) => mode.parse()?,
            None => AccessMode::ReadWrite,
        };
        Ok(Self {
            host_path: host.to_string(),
            container_path: container.to_string(),
            mode,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvVar {
    pub key: String,
    pub value: String,
}

impl EnvVar {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Rows with a blank key or value are dropped before reaching the engine.
    pub fn is_complete(&self) -> bool {
        !self.key.is_empty() && !self.value.is_empty()
    }
}

impl FromStr for EnvVar {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (key, value) = s.split_once('=').ok_or_else(|| {
            Error::Validation(format!("environment entry '{s}' must be KEY=VALUE"))
        })?;
        Ok(Self::new(key.trim(), value))
    }
}

/// What the user asked for. Consumed once by the planner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    pub command: Option<String>,
    pub env: Vec<EnvVar>,
    pub ports: Vec<PortBinding>,
    pub volumes: Vec<VolumeBinding>,
    pub network: Option<String>,
}

impl ContainerSpec {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            ..Default::default()
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push(EnvVar::new(key, value));
        self
    }

    pub fn with_port(mut self, port: PortBinding) -> Self {
        self.ports.push(port);
        self
    }

    pub fn with_volume(mut self, volume: VolumeBinding) -> Self {
        self.volumes.push(volume);
        self
    }

    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.network = Some(network.into());
        self
    }

    pub fn with_template(mut self, template: &TemplateDefault) -> Self {
        self.apply_template(template);
        self
    }

    /// Overwrites every field the template defines. A template without a
    /// port or env clears them so the user starts from a blank row.
    pub fn apply_template(&mut self, template: &TemplateDefault) {
        self.image = template.image.to_string();
        self.command = (!template.command.is_empty()).then(|| template.command.to_string());
        self.ports = template
            .port
            .map(|p| vec![PortBinding::new(p.host_port, p.container_port)])
            .unwrap_or_default();
        self.env = template
            .env
            .iter()
            .map(|(key, value)| EnvVar::new(*key, *value))
            .collect();
    }

    pub fn first_host_port(&self) -> Option<u16> {
        self.ports.iter().find_map(|p| p.host_port)
    }
}
