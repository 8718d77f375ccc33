//! MedLedger harness
//!
//! Despliega el contrato `MedicineLedger`, publica su descriptor para los
//! clientes y ejecuta un smoke test de contadores contra la instancia nueva.
//! - `config`: configuración desde variables de entorno.
//! - `errors`: `ConfigError` y el `HarnessError` de nivel superior.
//! - `harness`: `run_harness`, la corrida completa.
//! - `signals`: Ctrl-C ordenado y aborto con el segundo aviso.
//!
//! El binario `deploy-ledger` (main.rs) arma las piezas EVM reales.

pub mod config;
pub mod errors;
pub mod harness;
pub mod signals;

pub use config::HarnessConfig;
pub use errors::{ConfigError, HarnessError};
pub use harness::{run_harness, HarnessOutcome, HarnessSettings};
pub use signals::{watch_interrupts, InterruptOutcome};
