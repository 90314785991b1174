use crate::infra::config::{DEFAULT_CONFIG_NAME, ensure_config_dir, install_default_config};
use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::Path;
use tracing::info;

#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write the default dockernest.toml (existing files are kept)
    Init,
}

pub fn run(cmd: &ConfigCommand, config_dir: &Path) -> Result<()> {
    match cmd.action {
        ConfigAction::Init => install(config_dir),
    }
}

pub fn install(config_dir: &Path) -> Result<()> {
    info!("Preparing config in {:?}", config_dir);

    ensure_config_dir(config_dir)?;
    if install_default_config(config_dir)? {
        println!("Wrote {:?}", config_dir.join(DEFAULT_CONFIG_NAME));
    } else {
        println!(
            "{:?} already exists; left untouched",
            config_dir.join(DEFAULT_CONFIG_NAME)
        );
    }

    Ok(())
}
