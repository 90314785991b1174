use super::CliContext;
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tracing::info;

#[derive(Args, Debug)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub action: AuthAction,
}

#[derive(Subcommand, Debug)]
pub enum AuthAction {
    /// Obtain an access token
    Login(Credentials),
    /// Create an account
    Register(Credentials),
}

#[derive(Args, Debug)]
pub struct Credentials {
    pub username: String,

    #[arg(long, env = "DOCKERNEST_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(cmd: AuthCommand, context: &CliContext) -> Result<()> {
    match cmd.action {
        AuthAction::Login(creds) => {
            let credential = context
                .engine
                .login(&creds.username, &creds.password)
                .await
                .with_context(|| format!("logging in as {}", creds.username))?;
            info!(user = %creds.username, "logged in");
            println!("export DOCKERNEST_TOKEN={}", credential.token());
        }
        AuthAction::Register(creds) => {
            let ack = context
                .engine
                .register(&creds.username, &creds.password)
                .await
                .with_context(|| format!("registering {}", creds.username))?;
            let message = ack.require("register")?;
            println!("{message}");
        }
    }
    Ok(())
}
