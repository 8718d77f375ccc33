//! Fronteras externas: el servicio de ledger y el entorno que lo instancia.
//!
//! Toda mutación devuelve un `PendingMutation` que el llamador debe esperar
//! con `await_confirmation` antes de asumir que el efecto es visible para
//! lecturas posteriores. No hay fire-and-forget.
use async_trait::async_trait;

use crate::errors::{DeploymentError, ServiceError};
use crate::model::{InterfaceSchema, ServiceDefinition};

/// Mutación enviada pero aún no confirmada.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMutation {
    pub id: String,
    pub operation: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub id: String,
    /// Altura/bloque en que quedó incluida, si el servicio lo informa.
    pub block: Option<u64>,
}

#[async_trait]
pub trait LedgerService: Send + Sync {
    fn address(&self) -> &str;
    fn interface_schema(&self) -> &InterfaceSchema;

    async fn add_stock_record(&self,
                              owner: &str,
                              name: &str,
                              quantity: u64,
                              unit_price: u64)
                              -> Result<PendingMutation, ServiceError>;
    async fn report_shortage(&self, name: &str, location: &str) -> Result<PendingMutation, ServiceError>;
    async fn place_order(&self, name: &str, quantity: u64, counterparty: &str) -> Result<PendingMutation, ServiceError>;
    async fn update_retailer_stock(&self, name: &str, quantity: u64) -> Result<PendingMutation, ServiceError>;

    /// Suspende hasta que la mutación quede confirmada (o falle).
    async fn await_confirmation(&self, pending: PendingMutation) -> Result<Confirmation, ServiceError>;

    async fn stock_count(&self) -> Result<u64, ServiceError>;
    async fn shortage_count(&self) -> Result<u64, ServiceError>;
    async fn order_count(&self) -> Result<u64, ServiceError>;
}

/// Solicitud de instanciación aceptada por el entorno.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDeployment {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstantiationStatus {
    Pending,
    Confirmed { address: String },
    Rejected { reason: String },
}

/// Entorno de ejecución capaz de instanciar un servicio a partir de su
/// definición compilada.
#[async_trait]
pub trait ExecutionEnvironment: Send + Sync {
    async fn submit_instantiation(&self, definition: &ServiceDefinition) -> Result<PendingDeployment, DeploymentError>;

    /// Estado actual de la instanciación; no bloquea.
    async fn instantiation_status(&self, pending: &PendingDeployment) -> Result<InstantiationStatus, ServiceError>;
}
