//! Instanciación del servicio.
//!
//! Invariantes:
//! - Exactamente una solicitud de instanciación por llamada a `deploy`. Un
//!   fallo nunca se reintenta: un reintento podría crear instancias duplicadas
//!   e indistinguibles.
//! - La espera de confirmación es un sondeo del entorno, no un sleep fijo. Sin
//!   límite por defecto; con `confirmation_timeout` degrada a
//!   `DeploymentError::ConfirmationTimeout`.
use std::time::Duration;

use log::{debug, info, warn};
use tokio::time::{self, MissedTickBehavior};

use crate::constants::DEFAULT_POLL_INTERVAL_MS;
use crate::errors::DeploymentError;
use crate::event::{Progress, RunEventKind};
use crate::model::{DeploymentHandle, ServiceDefinition};
use crate::service::{ExecutionEnvironment, InstantiationStatus, PendingDeployment};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeployerConfig {
    pub poll_interval: Duration,
    pub confirmation_timeout: Option<Duration>,
}

impl Default for DeployerConfig {
    fn default() -> Self {
        Self { poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
               confirmation_timeout: None }
    }
}

pub struct Deployer<'e, E>
    where E: ExecutionEnvironment + ?Sized
{
    environment: &'e E,
    config: DeployerConfig,
    progress: Progress,
}

impl<'e, E> Deployer<'e, E> where E: ExecutionEnvironment + ?Sized
{
    pub fn new(environment: &'e E, config: DeployerConfig, progress: Progress) -> Self {
        Self { environment,
               config,
               progress }
    }

    /// Solicita la instanciación y suspende hasta que quede confirmada.
    pub async fn deploy(&self, definition: &ServiceDefinition) -> Result<DeploymentHandle, DeploymentError> {
        self.progress
            .emit(RunEventKind::DeploymentRequested { service: definition.name.clone() });
        let result = self.deploy_inner(definition).await;
        match &result {
            Ok(handle) => {
                info!("{} deployed at {} (tx {})", definition.name, handle.address, handle.transaction_id);
                self.progress.emit(RunEventKind::DeploymentConfirmed { service: definition.name.clone(),
                                                                       address: handle.address.clone() });
            }
            Err(e) => {
                warn!("{} deployment failed: {e}", definition.name);
                self.progress.emit(RunEventKind::DeploymentFailed { service: definition.name.clone(),
                                                                    reason: e.to_string() });
            }
        }
        result
    }

    async fn deploy_inner(&self, definition: &ServiceDefinition) -> Result<DeploymentHandle, DeploymentError> {
        let pending = self.environment.submit_instantiation(definition).await?;
        self.progress.emit(RunEventKind::DeploymentSubmitted { service: definition.name.clone(),
                                                               request_id: pending.id.clone() });

        let address = match self.config.confirmation_timeout {
            Some(limit) => time::timeout(limit, self.await_confirmation(&pending))
                .await
                .map_err(|_| DeploymentError::ConfirmationTimeout(limit))??,
            None => self.await_confirmation(&pending).await?,
        };

        Ok(DeploymentHandle { address,
                              interface_schema: definition.interface_schema.clone(),
                              transaction_id: pending.id })
    }

    async fn await_confirmation(&self, pending: &PendingDeployment) -> Result<String, DeploymentError> {
        let mut ticker = time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut polls: u64 = 0;
        loop {
            ticker.tick().await;
            polls += 1;
            let status = self.environment
                             .instantiation_status(pending)
                             .await
                             .map_err(|e| DeploymentError::ConfirmationFailed(e.to_string()))?;
            match status {
                InstantiationStatus::Pending => debug!("instantiation {} still pending (poll #{polls})", pending.id),
                InstantiationStatus::Confirmed { address } => return Ok(address),
                InstantiationStatus::Rejected { reason } => return Err(DeploymentError::SubmissionFailed(reason)),
            }
        }
    }
}
