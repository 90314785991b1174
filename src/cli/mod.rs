pub mod auth;
pub mod containers;
pub mod network;
pub mod render;
pub mod setup;

use crate::domain::{Credential, Engine};
use crate::infra::HttpEngine;
use crate::infra::config::{AppConfig, default_config_dir, load_app_config};
use crate::services::Session;
use anyhow::{Context, Result};
use auth::AuthCommand;
use clap::{Parser, Subcommand};
use containers::CreateArgs;
use network::NetworkCommand;
use setup::ConfigCommand;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "dockernest",
    version,
    about = "Deploy and manage containers on a remote engine"
)]
pub struct Cli {
    /// Configuration directory (default: ~/.config/dockernest)
    #[arg(long, env = "DOCKERNEST_CONFIG_DIR", default_value_os_t = default_config_dir())]
    pub config_dir: PathBuf,

    /// Engine API base URL; overrides engine.base_url
    #[arg(long, env = "DOCKERNEST_API_URL")]
    pub api_url: Option<String>,

    /// Bearer token from `dockernest auth login`
    #[arg(long, env = "DOCKERNEST_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Debug-level logging
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in or register against the engine
    Auth(AuthCommand),
    /// List containers
    Ps,
    /// Create a container (wordpress images also get a database)
    Create(CreateArgs),
    Start { id: String },
    Stop { id: String },
    Restart { id: String },
    /// Delete a container
    Rm { id: String },
    /// Show a container's logs
    Logs { id: String },
    /// Show a container's resource usage
    Stats { id: String },
    Network(NetworkCommand),
    /// List built-in image templates
    Templates,
    Config(ConfigCommand),
}

/// Everything a command needs to talk to the engine.
pub struct CliContext {
    pub config: AppConfig,
    pub engine: Arc<dyn Engine>,
    pub credential: Credential,
}

impl CliContext {
    pub fn new(cli: &Cli) -> Result<Self> {
        let mut config = load_app_config(&cli.config_dir)?;
        if let Some(url) = &cli.api_url {
            config.engine.base_url = Some(url.clone());
        }

        let engine = HttpEngine::with_timeout(config.base_url(), config.request_timeout())
            .context("building HTTP client")?;
        debug!(base_url = engine.base_url(), "using engine");

        Ok(Self {
            engine: Arc::new(engine),
            credential: Credential::bearer(cli.token.clone().unwrap_or_default()),
            config,
        })
    }

    pub fn session(&self) -> Session {
        Session::new(
            self.engine.clone(),
            self.credential.clone(),
            self.config.session_settings(),
        )
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    // Config init must work even when the existing file does not parse.
    if let Commands::Config(cmd) = &cli.command {
        return setup::run(cmd, &cli.config_dir);
    }

    let context = CliContext::new(&cli)?;
    dispatch(cli.command, &context, &cli.config_dir).await
}

async fn dispatch(command: Commands, context: &CliContext, config_dir: &Path) -> Result<()> {
    match command {
        Commands::Auth(cmd) => auth::run(cmd, context).await,
        Commands::Ps => containers::list(context).await,
        Commands::Create(args) => containers::create(args, context).await,
        Commands::Start { id } => containers::start(&id, context).await,
        Commands::Stop { id } => containers::stop(&id, context).await,
        Commands::Restart { id } => containers::restart(&id, context).await,
        Commands::Rm { id } => containers::delete(&id, context).await,
        Commands::Logs { id } => containers::logs(&id, context).await,
        Commands::Stats { id } => containers::stats(&id, context).await,
        Commands::Network(cmd) => network::run(cmd, context).await,
        Commands::Templates => {
            print!("{}", render::templates());
            Ok(())
        }
        Commands::Config(cmd) => setup::run(&cmd, config_dir),
    }
}
