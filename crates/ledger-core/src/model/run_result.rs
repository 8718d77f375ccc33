use serde::Serialize;

use super::LedgerCounters;
use crate::errors::RunFailure;

/// Resultado de una corrida del `SmokeTestRunner`. No existe éxito parcial:
/// o todos los steps verifican, o la corrida falla completa.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub success: bool,
    pub failure_reason: Option<String>,
    /// Último snapshot conocido (el final si la corrida completó).
    pub final_counters: LedgerCounters,
    pub steps_completed: usize,
    pub failed_step: Option<String>,
    #[serde(skip)]
    pub failure: Option<RunFailure>,
}

impl RunResult {
    pub fn completed(final_counters: LedgerCounters, steps_completed: usize) -> Self {
        Self { success: true,
               failure_reason: None,
               final_counters,
               steps_completed,
               failed_step: None,
               failure: None }
    }

    pub fn failed(failure: RunFailure, last_counters: LedgerCounters, steps_completed: usize) -> Self {
        let failed_step = match &failure {
            RunFailure::Verification(v) => Some(v.step().to_string()),
            RunFailure::Interrupted(_) => None,
        };
        Self { success: false,
               failure_reason: Some(failure.to_string()),
               final_counters: last_counters,
               steps_completed,
               failed_step,
               failure: Some(failure) }
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self.failure, Some(RunFailure::Interrupted(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::INTERRUPTED_REASON;
    use crate::errors::{InterruptedError, ServiceError, VerificationError};

    #[test]
    fn interrupted_run_reports_fixed_reason() {
        let r = RunResult::failed(InterruptedError { completed_steps: 1 }.into(), LedgerCounters::default(), 1);
        assert!(!r.success);
        assert!(r.is_interrupted());
        assert_eq!(r.failure_reason.as_deref(), Some(INTERRUPTED_REASON));
        assert_eq!(r.failed_step, None);
    }

    #[test]
    fn verification_failure_names_step() {
        let failure = VerificationError::OperationFailed { position: 2,
                                                           step: "reportShortage".into(),
                                                           source: ServiceError::Transport("boom".into()) };
        let r = RunResult::failed(failure.into(), LedgerCounters::new(1, 0, 0), 1);
        assert_eq!(r.failed_step.as_deref(), Some("reportShortage"));
        assert!(r.failure_reason.unwrap().contains("reportShortage"));
    }
}
