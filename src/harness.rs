//! Orquestación de una corrida completa:
//! despliegue → descriptor persistido → smoke test.
//!
//! El descriptor se escribe antes del smoke test: si la verificación falla,
//! la instancia igual existe y el artifact permite inspeccionarla.
use chrono::Utc;
use ledger_core::{medicine_smoke_sequence, Deployer, DeployerConfig, DeploymentDescriptor, DeploymentHandle,
                  ExecutionEnvironment, InterruptSignal, LedgerService, Progress, RunEventKind, RunResult,
                  ServiceDefinition, ServiceError, SmokeTestRunner};
use ledger_persistence::ArtifactStore;
use log::{error, info};

use crate::errors::HarnessError;

/// Parámetros de una corrida que no dependen del entorno concreto.
#[derive(Debug, Clone)]
pub struct HarnessSettings {
    pub environment_label: String,
    pub deployer: DeployerConfig,
    /// Contraparte de `placeOrder`.
    pub counterparty: String,
}

#[derive(Debug)]
pub struct HarnessOutcome {
    pub descriptor: DeploymentDescriptor,
    pub artifact_location: String,
    pub run: RunResult,
}

/// Despliega, persiste y verifica. `attach` construye el `LedgerService` a
/// partir del handle confirmado.
pub async fn run_harness<E, S, F>(environment: &E,
                                  definition: &ServiceDefinition,
                                  store: &dyn ArtifactStore,
                                  settings: &HarnessSettings,
                                  progress: &Progress,
                                  interrupt: Option<InterruptSignal>,
                                  attach: F)
                                  -> Result<HarnessOutcome, HarnessError>
    where E: ExecutionEnvironment + ?Sized,
          S: LedgerService,
          F: FnOnce(&DeploymentHandle) -> Result<S, ServiceError>
{
    let result = run_inner(environment, definition, store, settings, progress, interrupt, attach).await;
    match &result {
        Ok(outcome) => {
            progress.emit(RunEventKind::HarnessSucceeded { address: outcome.descriptor.address.clone(),
                                                           artifact: outcome.artifact_location.clone() });
        }
        Err(e) => {
            error!("harness failed: {e}");
            progress.emit(RunEventKind::HarnessFailed { reason: e.to_string() });
        }
    }
    result
}

async fn run_inner<E, S, F>(environment: &E,
                            definition: &ServiceDefinition,
                            store: &dyn ArtifactStore,
                            settings: &HarnessSettings,
                            progress: &Progress,
                            interrupt: Option<InterruptSignal>,
                            attach: F)
                            -> Result<HarnessOutcome, HarnessError>
    where E: ExecutionEnvironment + ?Sized,
          S: LedgerService,
          F: FnOnce(&DeploymentHandle) -> Result<S, ServiceError>
{
    let handle = Deployer::new(environment, settings.deployer, progress.clone()).deploy(definition)
                                                                                 .await?;

    let descriptor = DeploymentDescriptor::from_handle(&handle,
                                                       definition.name.clone(),
                                                       settings.environment_label.clone(),
                                                       Utc::now());
    store.write(&descriptor)?;
    let artifact_location = store.location(&descriptor.environment_label)?;
    progress.emit(RunEventKind::ArtifactWritten { label: descriptor.environment_label.clone(),
                                                  location: artifact_location.clone() });

    let service = attach(&handle)?;
    let mut runner = SmokeTestRunner::new(progress.clone());
    if let Some(signal) = interrupt {
        runner = runner.with_interrupt(signal);
    }
    let run = runner.run(&service, &medicine_smoke_sequence(settings.counterparty.clone()))
                    .await;

    if run.is_interrupted() {
        return Err(HarnessError::Interrupted { completed_steps: run.steps_completed });
    }
    if !run.success {
        return Err(HarnessError::SmokeTest { step: run.failed_step.clone(),
                                             reason: run.failure_reason.clone().unwrap_or_default() });
    }
    info!("{} verified at {}", definition.name, descriptor.address);
    Ok(HarnessOutcome { descriptor,
                        artifact_location,
                        run })
}
