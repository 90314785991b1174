use super::CliContext;
use super::render;
use crate::domain::{ContainerId, ContainerSpec, EnvVar, PortBinding, VolumeBinding, template};
use crate::services::Session;
use anyhow::{Result, bail};
use clap::Args;
use tracing::info;

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Container name
    pub name: String,

    /// Image reference; may be omitted with --template
    pub image: Option<String>,

    /// Prefill image, command, port and env from a built-in template
    #[arg(long, short = 't')]
    pub template: Option<String>,

    #[arg(long)]
    pub command: Option<String>,

    /// KEY=VALUE, repeatable
    #[arg(short = 'e', long = "env")]
    pub env: Vec<EnvVar>,

    /// HOST:CONTAINER[/proto], repeatable
    #[arg(short = 'p', long = "port")]
    pub ports: Vec<PortBinding>,

    /// HOST:CONTAINER[:ro|rw], repeatable
    #[arg(short = 'v', long = "volume")]
    pub volumes: Vec<VolumeBinding>,

    /// Network to join (default: the configured default network)
    #[arg(long)]
    pub network: Option<String>,
}

impl CreateArgs {
    /// Template values first, then anything given explicitly on top.
    pub fn into_spec(self) -> Result<ContainerSpec> {
        let mut spec = ContainerSpec::new(self.name, String::new());

        if let Some(id) = &self.template {
            let Some(defaults) = template::resolve(id) else {
                bail!("unknown template '{id}' (see `dockernest templates`)");
            };
            spec.apply_template(defaults);
        }

        if let Some(image) = self.image {
            spec.image = image;
        }
        if let Some(command) = self.command {
            spec.command = Some(command);
        }
        spec.env.extend(self.env);
        spec.ports.extend(self.ports);
        spec.volumes = self.volumes;
        spec.network = self.network;

        Ok(spec)
    }
}

pub async fn list(context: &CliContext) -> Result<()> {
    let session = context.session();
    session.refresh().await?;
    print!("{}", render::containers(&session.view()));
    Ok(())
}

pub async fn create(args: CreateArgs, context: &CliContext) -> Result<()> {
    let spec = args.into_spec()?;
    info!(name = %spec.name, image = %spec.image, "create requested");

    let session = context.session();
    let outcome = session.create(&spec).await;
    let view = session.view();
    print!("{}", render::notification(&view));

    let created = outcome?;
    for container in &created {
        println!(
            "  {} {}",
            container.id,
            container.docker_name.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

pub async fn start(id: &str, context: &CliContext) -> Result<()> {
    let session = context.session();
    let outcome = session.start(&ContainerId::new(id)).await;
    finish(&session, outcome)
}

pub async fn stop(id: &str, context: &CliContext) -> Result<()> {
    let session = context.session();
    let outcome = session.stop(&ContainerId::new(id)).await;
    finish(&session, outcome)
}

pub async fn restart(id: &str, context: &CliContext) -> Result<()> {
    let session = context.session();
    let outcome = session.restart(&ContainerId::new(id)).await;
    finish(&session, outcome)
}

pub async fn delete(id: &str, context: &CliContext) -> Result<()> {
    let session = context.session();
    let outcome = session.delete(&ContainerId::new(id)).await;
    finish(&session, outcome)
}

pub async fn logs(id: &str, context: &CliContext) -> Result<()> {
    let session = context.session();
    let logs = session.fetch_logs(&ContainerId::new(id)).await?;
    println!("{logs}");
    Ok(())
}

pub async fn stats(id: &str, context: &CliContext) -> Result<()> {
    let session = context.session();
    let stats = session.fetch_stats(&ContainerId::new(id)).await?;
    print!("{}", render::stats(&stats));
    Ok(())
}

fn finish(session: &Session, outcome: crate::error::Result<()>) -> Result<()> {
    let view = session.view();
    print!("{}", render::notification(&view));
    outcome?;
    print!("{}", render::containers(&view));
    Ok(())
}
