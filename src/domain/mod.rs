mod container;
mod notification;
mod plan;
mod stats;
pub mod template;
pub mod traits;

pub use container::{
    AccessMode, ContainerId, ContainerSpec, ContainerStatus, EnvVar, ManagedContainer,
    ManagedNetwork, PortBinding, Protocol, VolumeBinding,
};
pub use notification::{Notification, Severity};
pub use plan::{
    CreateRequest, CreatedContainer, Dependency, DeploymentPlan, DeploymentStep, ResultField,
    StepRole, VolumeMount,
};
pub use stats::{CpuReading, StatsSnapshot};
pub use template::{TemplateDefault, TemplatePort};
pub use traits::{CreateAck, Credential, Engine, LogsAck, MessageAck};
