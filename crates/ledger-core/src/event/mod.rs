//! Eventos de progreso y el trait `ProgressReporter`.

mod reporter;
mod types;

pub use reporter::{ConsoleReporter, InMemoryEventLog, Progress, ProgressReporter};
pub use types::{RunEvent, RunEventKind};
