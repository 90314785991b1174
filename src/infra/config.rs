use crate::infra::http_engine::{DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT};
use crate::services::{ReadinessProbe, SessionSettings};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_NAME: &str = "dockernest.toml";
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../config/dockernest.toml");

pub fn default_config_dir() -> PathBuf {
    PathBuf::from(shellexpand::tilde("~/.config/dockernest").into_owned())
}

pub fn ensure_config_dir(config_dir: &Path) -> Result<()> {
    fs::create_dir_all(config_dir).with_context(|| format!("creating {:?}", config_dir))
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
pub struct EngineConfig {
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
pub struct DeployConfig {
    pub settle_delay_secs: Option<u64>,
    pub readiness_probe_attempts: Option<u32>,
    pub readiness_probe_interval_ms: Option<u64>,
    pub fallback_host_port: Option<u16>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
pub struct NetworkConfig {
    pub default: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
pub struct NotificationConfig {
    pub duration_secs: Option<u64>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub deploy: DeployConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
}

impl AppConfig {
    /// Merges another AppConfig into self.
    /// Values from `other` overwrite values in `self` if present.
    pub fn merge(&mut self, other: AppConfig) {
        if let Some(url) = other.engine.base_url {
            self.engine.base_url = Some(url);
        }
        if let Some(timeout) = other.engine.request_timeout_secs {
            self.engine.request_timeout_secs = Some(timeout);
        }
        if let Some(delay) = other.deploy.settle_delay_secs {
            self.deploy.settle_delay_secs = Some(delay);
        }
        if let Some(attempts) = other.deploy.readiness_probe_attempts {
            self.deploy.readiness_probe_attempts = Some(attempts);
        }
        if let Some(interval) = other.deploy.readiness_probe_interval_ms {
            self.deploy.readiness_probe_interval_ms = Some(interval);
        }
        if let Some(port) = other.deploy.fallback_host_port {
            self.deploy.fallback_host_port = Some(port);
        }
        if let Some(network) = other.network.default {
            self.network.default = Some(network);
        }
        if let Some(duration) = other.notifications.duration_secs {
            self.notifications.duration_secs = Some(duration);
        }
    }

    pub fn base_url(&self) -> String {
        self.engine
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        self.engine
            .request_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT)
    }

    /// Session settings with any unset value left at its default.
    pub fn session_settings(&self) -> SessionSettings {
        let defaults = SessionSettings::default();
        let probe_defaults = ReadinessProbe::disabled();

        SessionSettings {
            settle_delay: self
                .deploy
                .settle_delay_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.settle_delay),
            readiness: ReadinessProbe {
                attempts: self
                    .deploy
                    .readiness_probe_attempts
                    .unwrap_or(probe_defaults.attempts),
                interval: self
                    .deploy
                    .readiness_probe_interval_ms
                    .map(Duration::from_millis)
                    .unwrap_or(probe_defaults.interval),
            },
            fallback_host_port: self
                .deploy
                .fallback_host_port
                .unwrap_or(defaults.fallback_host_port),
            default_network: self
                .network
                .default
                .clone()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or(defaults.default_network),
            notification_duration: self
                .notifications
                .duration_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.notification_duration),
        }
    }
}

pub fn install_default_config(target_dir: &Path) -> Result<bool> {
    ensure_config_dir(target_dir)?;

    let target = target_dir.join(DEFAULT_CONFIG_NAME);
    if target.exists() {
        return Ok(false);
    }

    fs::write(&target, DEFAULT_CONFIG_TOML)
        .with_context(|| format!("writing default config to {:?}", target))?;
    Ok(true)
}

pub fn load_app_config(config_dir: &Path) -> Result<AppConfig> {
    let config_path = config_dir.join(DEFAULT_CONFIG_NAME);
    let mut app_config = AppConfig::default();

    if config_path.exists() {
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("reading config at {:?}", config_path))?;
        let file_config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("parsing config at {:?}", config_path))?;
        app_config.merge(file_config);
    }

    Ok(app_config)
}
