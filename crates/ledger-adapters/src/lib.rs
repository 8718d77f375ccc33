//! ledger-adapters: implementación EVM de los traits del core.
//!
//! - `rpc`: cliente JSON-RPC mínimo sobre reqwest.
//! - `abi`: codificación de llamadas (selector keccak + head/tail) y
//!   decodificación de enteros.
//! - `contract`: lectura del artifact de compilación de Hardhat como
//!   `ServiceDefinition`.
//! - `accounts`: resolución de cuentas desbloqueadas del nodo.
//! - `evm`: `EvmEnvironment` (instanciación) y `EvmLedgerService`
//!   (operaciones del ledger).

pub mod abi;
pub mod accounts;
pub mod contract;
pub mod evm;
pub mod rpc;

pub use abi::{AbiError, Token};
pub use accounts::{resolve_accounts, NodeAccounts};
pub use contract::{load_service_definition, ContractArtifactError, HardhatArtifact};
pub use evm::{ConfirmationPolicy, EvmEnvironment, EvmLedgerService};
pub use rpc::{JsonRpcClient, RpcError, TransactionReceipt};
