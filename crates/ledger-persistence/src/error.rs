//! Errores de persistencia del descriptor.
//! Un `IoFailure` después de un despliegue exitoso es fatal: el servicio
//! existe pero nadie podrá encontrarlo.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("artifact IO failure at {}: {source}", path.display())]
    IoFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("artifact serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("no artifact recorded for environment '{0}'")]
    NotFound(String),
    #[error("invalid environment label '{0}'")]
    InvalidLabel(String),
}

impl PersistenceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoFailure { path: path.into(),
                          source }
    }
}
