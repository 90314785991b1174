pub mod cli;
pub mod domain;
pub mod error;
pub mod infra;
pub mod services;

// Make test_support available for integration tests
pub mod test_support;

pub use domain::{ContainerId, ContainerSpec, ContainerStatus, Credential, Engine};
pub use error::{Error, Result};
pub use infra::HttpEngine;
pub use services::{DashboardView, Session, SessionSettings};
