//! Implementaciones EVM de `ExecutionEnvironment` y `LedgerService`.
//!
//! Las transacciones se envían con `eth_sendTransaction` (el nodo firma con
//! la cuenta desbloqueada) y su confirmación se observa sondeando
//! `eth_getTransactionReceipt`. Las lecturas son `eth_call` sobre `latest`.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ledger_core::constants::DEFAULT_POLL_INTERVAL_MS;
use ledger_core::{Confirmation, DeploymentError, DeploymentHandle, ExecutionEnvironment, InstantiationStatus,
                  InterfaceSchema, LedgerService, PendingDeployment, PendingMutation, ServiceDefinition, ServiceError};
use log::{debug, trace};
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::abi::{self, parse_quantity, to_hex, Token};
use crate::rpc::JsonRpcClient;

// Funciones del contrato MedicineLedger.
pub const ADD_STOCK_FN: &str = "addMedicineStock";
pub const REPORT_SHORTAGE_FN: &str = "reportShortage";
pub const PLACE_ORDER_FN: &str = "placeOrder";
pub const UPDATE_RETAILER_STOCK_FN: &str = "updateRetailerStock";
pub const STOCK_COUNT_FN: &str = "getStockCount";
pub const SHORTAGE_COUNT_FN: &str = "getShortageCount";
pub const ORDER_COUNT_FN: &str = "getOrderCount";

pub const REQUIRED_FUNCTIONS: [&str; 7] = [ADD_STOCK_FN,
                                           REPORT_SHORTAGE_FN,
                                           PLACE_ORDER_FN,
                                           UPDATE_RETAILER_STOCK_FN,
                                           STOCK_COUNT_FN,
                                           SHORTAGE_COUNT_FN,
                                           ORDER_COUNT_FN];

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

pub struct EvmEnvironment {
    rpc: Arc<JsonRpcClient>,
    from: String,
}

impl EvmEnvironment {
    pub fn new(rpc: Arc<JsonRpcClient>, from: impl Into<String>) -> Self {
        Self { rpc,
               from: from.into() }
    }
}

#[async_trait]
impl ExecutionEnvironment for EvmEnvironment {
    async fn submit_instantiation(&self, definition: &ServiceDefinition) -> Result<PendingDeployment, DeploymentError> {
        let hash = self.rpc
                       .send_transaction(&self.from, None, &to_hex(&definition.code))
                       .await
                       .map_err(|e| DeploymentError::SubmissionFailed(e.to_string()))?;
        debug!("creation of {} submitted in tx {hash}", definition.name);
        Ok(PendingDeployment { id: hash })
    }

    async fn instantiation_status(&self, pending: &PendingDeployment) -> Result<InstantiationStatus, ServiceError> {
        let Some(receipt) = self.rpc.transaction_receipt(&pending.id).await? else {
            return Ok(InstantiationStatus::Pending);
        };
        if !receipt.succeeded() {
            return Ok(InstantiationStatus::Rejected { reason: format!("creation tx {} reverted", pending.id) });
        }
        receipt.contract_address
               .map(|address| InstantiationStatus::Confirmed { address })
               .ok_or_else(|| ServiceError::Decode(format!("receipt of {} has no contractAddress", pending.id)))
    }
}

// ---------------------------------------------------------------------------
// Ledger service
// ---------------------------------------------------------------------------

/// Cómo esperar la confirmación de cada mutación.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    pub poll_interval: Duration,
    /// `None`: esperar indefinidamente.
    pub timeout: Option<Duration>,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self { poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
               timeout: None }
    }
}

pub struct EvmLedgerService {
    rpc: Arc<JsonRpcClient>,
    address: String,
    schema: InterfaceSchema,
    from: String,
    policy: ConfirmationPolicy,
}

impl EvmLedgerService {
    /// Se engancha a una instancia desplegada. Falla si el ABI no expone
    /// alguna de las funciones que usa el harness.
    pub fn attach(rpc: Arc<JsonRpcClient>,
                  handle: &DeploymentHandle,
                  from: impl Into<String>,
                  policy: ConfirmationPolicy)
                  -> Result<Self, ServiceError> {
        if let Some(missing) = REQUIRED_FUNCTIONS.iter().find(|f| !handle.interface_schema.has_operation(f)) {
            return Err(ServiceError::UnknownOperation(missing.to_string()));
        }
        Ok(Self { rpc,
                  address: handle.address.clone(),
                  schema: handle.interface_schema.clone(),
                  from: from.into(),
                  policy })
    }

    async fn send(&self,
                  operation: &'static str,
                  function: &str,
                  args: &[Token])
                  -> Result<PendingMutation, ServiceError> {
        let data = abi::encode_call(&self.schema, function, args)?;
        let id = self.rpc
                     .send_transaction(&self.from, Some(&self.address), &to_hex(&data))
                     .await?;
        trace!("{operation} -> {function} in tx {id}");
        Ok(PendingMutation { id, operation })
    }

    async fn read_uint(&self, function: &str) -> Result<u64, ServiceError> {
        let data = abi::encode_call(&self.schema, function, &[])?;
        let output = self.rpc.call(&self.address, &to_hex(&data)).await?;
        Ok(abi::decode_uint(&output)?)
    }

    async fn poll_receipt(&self, pending: &PendingMutation) -> Result<Confirmation, ServiceError> {
        let mut ticker = time::interval(self.policy.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let Some(receipt) = self.rpc.transaction_receipt(&pending.id).await? else {
                continue;
            };
            if !receipt.succeeded() {
                return Err(ServiceError::Reverted { id: pending.id.clone() });
            }
            let block = receipt.block_number.as_deref().map(parse_quantity).transpose()?;
            return Ok(Confirmation { id: pending.id.clone(),
                                     block });
        }
    }
}

#[async_trait]
impl LedgerService for EvmLedgerService {
    fn address(&self) -> &str {
        &self.address
    }

    fn interface_schema(&self) -> &InterfaceSchema {
        &self.schema
    }

    async fn add_stock_record(&self,
                              owner: &str,
                              name: &str,
                              quantity: u64,
                              unit_price: u64)
                              -> Result<PendingMutation, ServiceError> {
        self.send("addStockRecord",
                  ADD_STOCK_FN,
                  &[Token::String(owner.into()),
                    Token::String(name.into()),
                    Token::Uint(quantity),
                    Token::Uint(unit_price)])
            .await
    }

    async fn report_shortage(&self, name: &str, location: &str) -> Result<PendingMutation, ServiceError> {
        self.send("reportShortage",
                  REPORT_SHORTAGE_FN,
                  &[Token::String(name.into()), Token::String(location.into())])
            .await
    }

    async fn place_order(&self, name: &str, quantity: u64, counterparty: &str) -> Result<PendingMutation, ServiceError> {
        self.send("placeOrder",
                  PLACE_ORDER_FN,
                  &[Token::String(name.into()), Token::Uint(quantity), Token::Address(counterparty.into())])
            .await
    }

    async fn update_retailer_stock(&self, name: &str, quantity: u64) -> Result<PendingMutation, ServiceError> {
        self.send("updateRetailerStock",
                  UPDATE_RETAILER_STOCK_FN,
                  &[Token::String(name.into()), Token::Uint(quantity)])
            .await
    }

    async fn await_confirmation(&self, pending: PendingMutation) -> Result<Confirmation, ServiceError> {
        let started = Instant::now();
        match self.policy.timeout {
            Some(limit) => time::timeout(limit, self.poll_receipt(&pending))
                .await
                .map_err(|_| ServiceError::ConfirmationTimeout { id: pending.id.clone(),
                                                                 waited: started.elapsed() })?,
            None => self.poll_receipt(&pending).await,
        }
    }

    async fn stock_count(&self) -> Result<u64, ServiceError> {
        self.read_uint(STOCK_COUNT_FN).await
    }

    async fn shortage_count(&self) -> Result<u64, ServiceError> {
        self.read_uint(SHORTAGE_COUNT_FN).await
    }

    async fn order_count(&self) -> Result<u64, ServiceError> {
        self.read_uint(ORDER_COUNT_FN).await
    }
}
