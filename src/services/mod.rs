mod deployer;
mod lifecycle;
mod network_service;
pub mod notifier;
mod observability;
pub mod planner;
mod session;
pub mod state;

pub use deployer::{Deployer, ReadinessProbe};
pub use lifecycle::LifecycleController;
pub use network_service::NetworkManager;
pub use notifier::Notifier;
pub use observability::ObservabilityFetcher;
pub use planner::{Planner, is_composite_trigger};
pub use session::{Session, SessionSettings};
pub use state::{DashboardView, SessionState};
