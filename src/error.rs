use crate::domain::CreatedContainer;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// Rejected locally, before any engine call.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Transport failure or non-2xx response.
    #[error("engine call failed: {0}")]
    EngineCall(String),

    /// The call succeeded but the acknowledgment field was absent.
    #[error("unexpected response from {operation}: missing `{field}`")]
    UnexpectedResponseShape {
        operation: &'static str,
        field: &'static str,
    },

    /// A composite deployment stopped part-way. `created` lists what the
    /// earlier steps left behind; nothing is rolled back.
    #[error("deployment stopped at step {step} ({label}): {source}")]
    PartialDeployment {
        step: usize,
        label: String,
        created: Vec<CreatedContainer>,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub fn is_authentication(&self) -> bool {
        match self {
            Self::Authentication(_) => true,
            Self::PartialDeployment { source, .. } => source.is_authentication(),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::EngineCall(err.to_string())
    }
}
