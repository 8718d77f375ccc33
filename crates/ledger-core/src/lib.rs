//! ledger-core: harness lineal de despliegue y verificación.
//!
//! El core no conoce la cadena ni el contrato: habla con un `LedgerService`
//! opaco y con un `ExecutionEnvironment` capaz de instanciarlo. Aquí viven el
//! modelo (descriptor, contadores, resultado), la secuencia de steps como
//! lista de variantes, el `Deployer`, el `SmokeTestRunner` y los eventos de
//! progreso.
pub mod constants;
pub mod engine;
pub mod errors;
pub mod event;
pub mod model;
pub mod service;
pub mod step;

pub use engine::{Deployer, DeployerConfig, InterruptHandle, InterruptSignal, SmokeTestRunner};
pub use errors::{DeploymentError, InterruptedError, RunFailure, ServiceError, VerificationError};
pub use event::{ConsoleReporter, InMemoryEventLog, Progress, ProgressReporter, RunEvent, RunEventKind};
pub use model::{CounterKind, DeploymentDescriptor, DeploymentHandle, InterfaceSchema, LedgerCounters, RunResult,
                ServiceDefinition};
pub use service::{Confirmation, ExecutionEnvironment, InstantiationStatus, LedgerService, PendingDeployment,
                  PendingMutation};
pub use step::{medicine_smoke_sequence, Expectation, LedgerOperation, RunnerState, SmokeTestStep};
