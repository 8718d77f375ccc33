//! Modelos del harness (definición del servicio, handle, descriptor,
//! contadores, resultado de corrida).

pub mod counters;
pub mod definition;
pub mod descriptor;
pub mod run_result;

pub use counters::{CounterKind, LedgerCounters};
pub use definition::{DeploymentHandle, InterfaceSchema, ServiceDefinition};
pub use descriptor::DeploymentDescriptor;
pub use run_result::RunResult;
