//! Steps del smoke test.
//!
//! La secuencia es una lista ordenada de variantes (`LedgerOperation`) con su
//! expectativa sobre contadores. El runner la recorre sin conocer qué hace
//! cada operación en el ledger.

pub mod definition;
pub mod sequence;
mod status;

pub use definition::{CounterDiscrepancy, Expectation, LedgerOperation, SmokeTestStep};
pub use sequence::medicine_smoke_sequence;
pub use status::RunnerState;
