use crate::domain::{
    ContainerSpec, CreateRequest, Dependency, DeploymentPlan, DeploymentStep, ResultField,
    StepRole, VolumeMount,
};
use crate::error::{Error, Result};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(4);
pub const DEFAULT_FALLBACK_HOST_PORT: u16 = 8081;

const COMPOSITE_REPOSITORY: &str = "wordpress";
const DATABASE_IMAGE: &str = "mysql:5.7";
const DATABASE_SUFFIX: &str = "_db";
const DATABASE_ROOT_PASSWORD: &str = "example";
const DATABASE_NAME: &str = "wordpress";
const DATABASE_USER: &str = "wp_user";
const DATABASE_PASSWORD: &str = "wp_pass";
const APPLICATION_PORT: &str = "80/tcp";

/// Turns a `ContainerSpec` into an ordered deployment plan.
#[derive(Debug, Clone)]
pub struct Planner {
    settle_delay: Duration,
    fallback_host_port: u16,
}

impl Planner {
    pub fn new(settle_delay: Duration, fallback_host_port: u16) -> Self {
        Self {
            settle_delay,
            fallback_host_port,
        }
    }

    pub fn plan(&self, spec: &ContainerSpec) -> Result<DeploymentPlan> {
        let name = spec.name.trim();
        let image = spec.image.trim();
        if name.is_empty() || image.is_empty() {
            return Err(Error::Validation(
                "container name and image are required".into(),
            ));
        }

        if is_composite_trigger(image) {
            debug!(name, image, "planning composite deployment");
            return Ok(self.composite_plan(spec, name, image));
        }

        let request = creation_request(spec, name, image);
        Ok(DeploymentPlan::single(DeploymentStep::immediate(
            name,
            StepRole::Application,
            request,
        )))
    }

    /// Database first, then the application linked to it by the database's
    /// generated container name.
    fn composite_plan(&self, spec: &ContainerSpec, name: &str, image: &str) -> DeploymentPlan {
        let mut database = CreateRequest::new(format!("{name}{DATABASE_SUFFIX}"), DATABASE_IMAGE);
        database.network = spec.network.clone();
        database.env.extend(
            [
                ("MYSQL_ROOT_PASSWORD", DATABASE_ROOT_PASSWORD),
                ("MYSQL_DATABASE", DATABASE_NAME),
                ("MYSQL_USER", DATABASE_USER),
                ("MYSQL_PASSWORD", DATABASE_PASSWORD),
            ]
            .map(|(k, v)| (k.to_string(), v.to_string())),
        );

        let mut application = CreateRequest::new(name, image);
        application.command = command(spec);
        application.network = spec.network.clone();
        application.env.extend(
            [
                ("WORDPRESS_DB_USER", DATABASE_USER),
                ("WORDPRESS_DB_PASSWORD", DATABASE_PASSWORD),
                ("WORDPRESS_DB_NAME", DATABASE_NAME),
            ]
            .map(|(k, v)| (k.to_string(), v.to_string())),
        );
        application.ports.insert(
            APPLICATION_PORT.to_string(),
            spec.first_host_port().unwrap_or(self.fallback_host_port),
        );

        DeploymentPlan::chain(
            DeploymentStep::immediate("MySQL database", StepRole::Database, database),
            [DeploymentStep::dependent(
                "WordPress",
                StepRole::Application,
                application,
                Dependency {
                    settle_delay: self.settle_delay,
                    inject_env: vec![("WORDPRESS_DB_HOST".to_string(), ResultField::DockerName)],
                },
            )],
        )
    }
}

impl Default for Planner {
    fn default() -> Self {
        Self::new(DEFAULT_SETTLE_DELAY, DEFAULT_FALLBACK_HOST_PORT)
    }
}

/// Images that expand into a multi-container deployment. Matches on the
/// repository name so any tag or registry prefix triggers it.
pub fn is_composite_trigger(image: &str) -> bool {
    repository(image).eq_ignore_ascii_case(COMPOSITE_REPOSITORY)
}

fn repository(image: &str) -> &str {
    let without_digest = image.split('@').next().unwrap_or(image);
    let last_segment = without_digest.rsplit('/').next().unwrap_or(without_digest);
    last_segment.split(':').next().unwrap_or(last_segment)
}

fn command(spec: &ContainerSpec) -> Option<String> {
    spec.command
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

/// List-of-pairs to mapping form; later duplicates overwrite earlier ones.
fn creation_request(spec: &ContainerSpec, name: &str, image: &str) -> CreateRequest {
    let mut request = CreateRequest::new(name, image);
    request.command = command(spec);
    request.network = spec.network.clone();

    for var in spec.env.iter().filter(|v| v.is_complete()) {
        request.env.insert(var.key.clone(), var.value.clone());
    }
    for (key, host) in spec.ports.iter().filter_map(|p| p.entry()) {
        request.ports.insert(key, host);
    }
    for volume in spec.volumes.iter().filter(|v| v.is_complete()) {
        request.volumes.insert(
            volume.host_path.clone(),
            VolumeMount {
                bind: volume.container_path.clone(),
                mode: volume.mode,
            },
        );
    }
    request
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccessMode, PortBinding, VolumeBinding};

    #[test]
    fn test_single_plan_transforms_lists_into_mappings() {
        let spec = ContainerSpec::new("api", "node:20")
            .with_command("npm start")
            .with_env("NODE_ENV", "development")
            .with_env("NODE_ENV", "production")
            .with_env("EMPTY", "")
            .with_port(PortBinding::new(3000, 3000))
            .with_port(PortBinding {
                host_port: Some(9229),
                container_port: None,
                ..Default::default()
            })
            .with_volume(VolumeBinding::new("/srv/app", "/app"))
            .with_volume(VolumeBinding {
                host_path: "/srv/app".into(),
                container_path: "/code".into(),
                mode: AccessMode::ReadOnly,
            })
            .with_network("backend");

        let plan = Planner::default().plan(&spec).unwrap();
        assert_eq!(plan.len(), 1);

        let request = &plan.steps()[0].request;
        assert_eq!(request.command.as_deref(), Some("npm start"));
        assert_eq!(request.env.len(), 1);
        assert_eq!(request.env["NODE_ENV"], "production");
        assert_eq!(request.ports.len(), 1);
        assert_eq!(request.ports["3000/tcp"], 3000);
        assert_eq!(request.volumes["/srv/app"].bind, "/code");
        assert_eq!(request.volumes["/srv/app"].mode, AccessMode::ReadOnly);
        assert_eq!(request.network.as_deref(), Some("backend"));
    }

    #[test]
    fn test_blank_command_means_image_default() {
        let spec = ContainerSpec::new("web", "nginx:latest").with_command("   ");
        let plan = Planner::default().plan(&spec).unwrap();
        assert_eq!(plan.steps()[0].request.command, None);
    }

    #[test]
    fn test_missing_name_or_image_is_rejected() {
        let planner = Planner::default();
        assert!(matches!(
            planner.plan(&ContainerSpec::new("", "nginx")),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            planner.plan(&ContainerSpec::new("web", "  ")),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_composite_plan_shape() {
        let spec = ContainerSpec::new("web1", "wordpress:latest")
            .with_port(PortBinding::new(8085, 80))
            .with_env("IGNORED", "yes")
            .with_network("sites");

        let plan = Planner::default().plan(&spec).unwrap();
        assert!(plan.is_composite());

        let [database, application] = plan.steps() else {
            panic!("expected two steps");
        };

        assert_eq!(database.role, StepRole::Database);
        assert!(database.dependency.is_none());
        assert_eq!(database.request.name, "web1_db");
        assert_eq!(database.request.image, "mysql:5.7");
        assert_eq!(database.request.env["MYSQL_DATABASE"], "wordpress");
        assert_eq!(database.request.env["MYSQL_USER"], "wp_user");
        assert!(database.request.ports.is_empty());
        assert_eq!(database.request.network.as_deref(), Some("sites"));

        assert_eq!(application.request.name, "web1");
        assert_eq!(application.request.image, "wordpress:latest");
        assert_eq!(application.request.ports["80/tcp"], 8085);
        assert_eq!(application.request.env["WORDPRESS_DB_PASSWORD"], "wp_pass");
        assert!(!application.request.env.contains_key("IGNORED"));
        assert!(!application.request.env.contains_key("WORDPRESS_DB_HOST"));

        let dependency = application.dependency.as_ref().unwrap();
        assert_eq!(dependency.settle_delay, Duration::from_secs(4));
        assert_eq!(
            dependency.inject_env,
            vec![("WORDPRESS_DB_HOST".to_string(), ResultField::DockerName)]
        );
    }

    #[test]
    fn test_composite_plan_uses_fallback_port() {
        let plan = Planner::new(Duration::from_secs(1), 9999)
            .plan(&ContainerSpec::new("blog", "wordpress"))
            .unwrap();
        assert_eq!(plan.steps()[1].request.ports["80/tcp"], 9999);
    }

    #[test]
    fn test_composite_trigger_matching() {
        assert!(is_composite_trigger("wordpress:latest"));
        assert!(is_composite_trigger("wordpress"));
        assert!(is_composite_trigger("docker.io/library/wordpress:6.5"));
        assert!(!is_composite_trigger("wordpress-cli:latest"));
        assert!(!is_composite_trigger("nginx:latest"));
        assert!(!is_composite_trigger("localhost:5000/nginx"));
    }
}
