use super::CliContext;
use super::render;
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Args, Debug)]
pub struct NetworkCommand {
    #[command(subcommand)]
    pub action: NetworkAction,
}

#[derive(Subcommand, Debug)]
pub enum NetworkAction {
    /// List networks
    Ls,
    /// Create a network
    Create { name: String },
}

pub async fn run(cmd: NetworkCommand, context: &CliContext) -> Result<()> {
    let session = context.session();

    match cmd.action {
        NetworkAction::Ls => {
            session.list_networks().await?;
            print!("{}", render::networks(&session.view()));
        }
        NetworkAction::Create { name } => {
            let outcome = session.create_network(&name).await;
            let view = session.view();
            print!("{}", render::notification(&view));
            if !outcome? {
                println!("Network name is empty; nothing created.");
                return Ok(());
            }
            print!("{}", render::networks(&view));
        }
    }
    Ok(())
}
