//! Errores del core.
//!
//! Todos son fatales para la corrida: el harness nunca reintenta. Los mensajes
//! deben bastar para diagnosticar sin volver a ejecutar (qué step, qué
//! contador, esperado vs. observado).

use std::time::Duration;

use thiserror::Error;

use crate::model::CounterKind;

/// Falla de una llamada individual al `LedgerService`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("request rejected by service: {0}")]
    Rejected(String),
    #[error("mutation {id} reverted")]
    Reverted { id: String },
    #[error("confirmation of {id} not observed within {waited:?}")]
    ConfirmationTimeout { id: String, waited: Duration },
    #[error("operation '{0}' not present in interface schema")]
    UnknownOperation(String),
    #[error("malformed response: {0}")]
    Decode(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeploymentError {
    /// La solicitud de instanciación fue rechazada (definición inválida,
    /// recursos insuficientes, creación revertida).
    #[error("instantiation submission failed: {0}")]
    SubmissionFailed(String),
    #[error("instantiation not confirmed within {0:?}")]
    ConfirmationTimeout(Duration),
    /// El canal de confirmación falló mientras se esperaba.
    #[error("instantiation confirmation failed: {0}")]
    ConfirmationFailed(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("step {position} '{step}': {counter} expected {expected}, observed {actual}")]
    CounterMismatch {
        position: usize,
        step: String,
        counter: CounterKind,
        expected: u64,
        actual: u64,
    },
    #[error("step {position} '{step}' failed: {source}")]
    OperationFailed {
        position: usize,
        step: String,
        #[source]
        source: ServiceError,
    },
}

impl VerificationError {
    pub fn step(&self) -> &str {
        match self {
            Self::CounterMismatch { step, .. } | Self::OperationFailed { step, .. } => step,
        }
    }

    pub fn position(&self) -> usize {
        match self {
            Self::CounterMismatch { position, .. } | Self::OperationFailed { position, .. } => *position,
        }
    }
}

/// Corrida detenida por una señal externa. `completed_steps` indica cuántos
/// steps alcanzaron a confirmarse; el estado del ledger más allá de eso es
/// desconocido para el harness.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("interrupted")]
pub struct InterruptedError {
    pub completed_steps: usize,
}

/// Motivo por el que un `SmokeTestRunner` terminó en `Failed`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RunFailure {
    #[error(transparent)]
    Verification(#[from] VerificationError),
    #[error(transparent)]
    Interrupted(#[from] InterruptedError),
}
