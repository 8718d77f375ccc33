use ledger_adapters::ContractArtifactError;
use ledger_core::{DeploymentError, ServiceError};
use ledger_persistence::PersistenceError;
use thiserror::Error;

use super::ConfigError;

/// Error de nivel superior de una corrida. Cualquier variante termina el
/// proceso con código 1.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    ContractArtifact(#[from] ContractArtifactError),
    #[error("ledger service unavailable: {0}")]
    Service(#[from] ServiceError),
    #[error("deployment failed: {0}")]
    Deployment(#[from] DeploymentError),
    /// El servicio quedó desplegado pero nadie podrá encontrarlo.
    #[error("deployment succeeded but artifact could not be persisted: {0}")]
    Persistence(#[from] PersistenceError),
    #[error("smoke test failed at {}: {reason}", step.as_deref().unwrap_or("?"))]
    SmokeTest { step: Option<String>, reason: String },
    #[error("interrupted after {completed_steps} completed steps")]
    Interrupted { completed_steps: usize },
}
