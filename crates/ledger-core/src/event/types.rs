//! Tipos de evento de una corrida y estructura `RunEvent`.
//!
//! Rol en el flujo:
//! - `Deployer`, `SmokeTestRunner` y el binario emiten eventos a través de
//!   `Progress`, que asigna `seq` y timestamp.
//! - Los eventos sólo informan; nunca alteran el control de flujo.
//! - El orden de `seq` refleja el orden real de suspensiones de la corrida, y
//!   los tests lo usan para verificar serialidad.
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::model::LedgerCounters;
use crate::step::LedgerOperation;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEventKind {
    DeploymentRequested { service: String },
    DeploymentSubmitted { service: String, request_id: String },
    DeploymentConfirmed { service: String, address: String },
    DeploymentFailed { service: String, reason: String },
    /// Descriptor persistido; `location` es la ruta (o clave) final.
    ArtifactWritten { label: String, location: String },
    RunStarted { address: String, step_count: usize },
    BaselineRead { counters: LedgerCounters },
    StepStarted { position: usize, operation: LedgerOperation },
    MutationSubmitted { position: usize, step: String, mutation_id: String },
    MutationConfirmed { position: usize, step: String, mutation_id: String },
    CountersRead { position: usize, counters: LedgerCounters },
    StepVerified { position: usize, step: String },
    RunCompleted { counters: LedgerCounters },
    RunFailed { step: Option<String>, reason: String },
    HarnessSucceeded { address: String, artifact: String },
    HarnessFailed { reason: String },
}

impl RunEventKind {
    /// Etiqueta corta, útil para comparar secuencias en tests.
    pub fn tag(&self) -> &'static str {
        match self {
            RunEventKind::DeploymentRequested { .. } => "deploy_requested",
            RunEventKind::DeploymentSubmitted { .. } => "deploy_submitted",
            RunEventKind::DeploymentConfirmed { .. } => "deploy_confirmed",
            RunEventKind::DeploymentFailed { .. } => "deploy_failed",
            RunEventKind::ArtifactWritten { .. } => "artifact_written",
            RunEventKind::RunStarted { .. } => "run_started",
            RunEventKind::BaselineRead { .. } => "baseline",
            RunEventKind::StepStarted { .. } => "step_started",
            RunEventKind::MutationSubmitted { .. } => "submitted",
            RunEventKind::MutationConfirmed { .. } => "confirmed",
            RunEventKind::CountersRead { .. } => "counters",
            RunEventKind::StepVerified { .. } => "verified",
            RunEventKind::RunCompleted { .. } => "completed",
            RunEventKind::RunFailed { .. } => "failed",
            RunEventKind::HarnessSucceeded { .. } => "harness_ok",
            RunEventKind::HarnessFailed { .. } => "harness_failed",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self,
                 RunEventKind::DeploymentFailed { .. }
                 | RunEventKind::RunFailed { .. }
                 | RunEventKind::HarnessFailed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunEvent {
    pub seq: u64, // asignado por `Progress` (orden de emisión)
    pub run_id: Uuid,
    pub kind: RunEventKind,
    pub ts: DateTime<Utc>, // metadato
}
