//! SmokeTestRunner: ejecuta la secuencia de steps contra un `LedgerService`.
//!
//! Invariantes:
//! - Estrictamente serial: cada mutación se confirma antes de leer contadores
//!   o de enviar la siguiente. Nunca hay dos mutaciones en vuelo.
//! - Stop-on-failure: el primer fallo (operación o verificación) termina la
//!   corrida; los steps restantes no se ejecutan.
//! - Sin reintentos. Los errores transitorios del servicio se reportan tal cual.
//! - Al completar, los contadores finales deben ser baseline + suma de deltas
//!   declarados.
use log::{debug, info, warn};

use crate::constants::{BASELINE_STEP, FINAL_TOTALS_STEP};
use crate::engine::InterruptSignal;
use crate::errors::{InterruptedError, RunFailure, ServiceError, VerificationError};
use crate::event::{Progress, RunEventKind};
use crate::model::{CounterKind, LedgerCounters, RunResult};
use crate::service::LedgerService;
use crate::step::{LedgerOperation, RunnerState, SmokeTestStep};

pub struct SmokeTestRunner {
    progress: Progress,
    interrupt: Option<InterruptSignal>,
}

impl SmokeTestRunner {
    pub fn new(progress: Progress) -> Self {
        Self { progress,
               interrupt: None }
    }

    /// La señal se consulta entre steps; una mutación en vuelo siempre
    /// termina de confirmarse.
    pub fn with_interrupt(mut self, signal: InterruptSignal) -> Self {
        self.interrupt = Some(signal);
        self
    }

    fn interrupted(&self) -> bool {
        self.interrupt.as_ref().is_some_and(InterruptSignal::is_raised)
    }

    pub async fn run<S>(&self, service: &S, steps: &[SmokeTestStep]) -> RunResult
        where S: LedgerService + ?Sized
    {
        self.progress.emit(RunEventKind::RunStarted { address: service.address().to_string(),
                                                      step_count: steps.len() });
        let mut state = RunnerState::Baseline;

        let baseline = match LedgerCounters::read_from(service).await {
            Ok(c) => c,
            Err(source) => {
                let failure = VerificationError::OperationFailed { position: 0,
                                                                   step: BASELINE_STEP.to_string(),
                                                                   source };
                return self.fail(&mut state, failure.into(), LedgerCounters::default(), 0);
            }
        };
        self.progress.emit(RunEventKind::BaselineRead { counters: baseline });
        info!("baseline counters: {baseline}");

        let mut last = baseline;
        let mut expected_total = baseline;

        for (index, step) in steps.iter().enumerate() {
            let position = index + 1;
            if self.interrupted() {
                return self.fail(&mut state, InterruptedError { completed_steps: index }.into(), last, index);
            }

            self.transition(&mut state, RunnerState::Executing(position));
            self.progress.emit(RunEventKind::StepStarted { position,
                                                           operation: step.operation.clone() });
            if let Err(source) = self.execute(service, position, step).await {
                let failure = VerificationError::OperationFailed { position,
                                                                   step: step.name().to_string(),
                                                                   source };
                return self.fail(&mut state, failure.into(), last, index);
            }

            self.transition(&mut state, RunnerState::Verifying(position));
            if step.expectation.requires_read() {
                let observed = match LedgerCounters::read_from(service).await {
                    Ok(c) => c,
                    Err(source) => {
                        let failure = VerificationError::OperationFailed { position,
                                                                           step: step.name().to_string(),
                                                                           source };
                        return self.fail(&mut state, failure.into(), last, index);
                    }
                };
                self.progress.emit(RunEventKind::CountersRead { position,
                                                                counters: observed });
                if let Err(d) = step.expectation.verify(last, observed) {
                    let failure = VerificationError::CounterMismatch { position,
                                                                       step: step.name().to_string(),
                                                                       counter: d.counter,
                                                                       expected: d.expected,
                                                                       actual: d.actual };
                    return self.fail(&mut state, failure.into(), observed, index);
                }
                last = observed;
            }
            expected_total = step.expectation.expected_after(expected_total);
            self.progress.emit(RunEventKind::StepVerified { position,
                                                            step: step.name().to_string() });
        }

        if self.interrupted() {
            return self.fail(&mut state, InterruptedError { completed_steps: steps.len() }.into(), last, steps.len());
        }

        // Chequeo de totales contra el baseline.
        let position = steps.len() + 1;
        let final_counters = match LedgerCounters::read_from(service).await {
            Ok(c) => c,
            Err(source) => {
                let failure = VerificationError::OperationFailed { position,
                                                                   step: FINAL_TOTALS_STEP.to_string(),
                                                                   source };
                return self.fail(&mut state, failure.into(), last, steps.len());
            }
        };
        if let Some(counter) = CounterKind::ALL.into_iter()
                                               .find(|k| final_counters.get(*k) != expected_total.get(*k))
        {
            let failure = VerificationError::CounterMismatch { position,
                                                               step: FINAL_TOTALS_STEP.to_string(),
                                                               counter,
                                                               expected: expected_total.get(counter),
                                                               actual: final_counters.get(counter) };
            return self.fail(&mut state, failure.into(), final_counters, steps.len());
        }

        self.transition(&mut state, RunnerState::Completed);
        self.progress.emit(RunEventKind::RunCompleted { counters: final_counters });
        info!("smoke test completed: {final_counters}");
        RunResult::completed(final_counters, steps.len())
    }

    /// Emite la operación y, si muta, espera su confirmación (una única
    /// suspensión por mutación).
    async fn execute<S>(&self, service: &S, position: usize, step: &SmokeTestStep) -> Result<(), ServiceError>
        where S: LedgerService + ?Sized
    {
        let pending = match &step.operation {
            LedgerOperation::AddStockRecord { owner, name, quantity, unit_price } => {
                service.add_stock_record(owner, name, *quantity, *unit_price).await?
            }
            LedgerOperation::ReportShortage { name, location } => service.report_shortage(name, location).await?,
            LedgerOperation::PlaceOrder { name, quantity, counterparty } => {
                service.place_order(name, *quantity, counterparty).await?
            }
            LedgerOperation::UpdateRetailerStock { name, quantity } => {
                service.update_retailer_stock(name, *quantity).await?
            }
            LedgerOperation::ReadCounters => {
                let counters = LedgerCounters::read_from(service).await?;
                self.progress.emit(RunEventKind::CountersRead { position, counters });
                return Ok(());
            }
        };

        let mutation_id = pending.id.clone();
        self.progress.emit(RunEventKind::MutationSubmitted { position,
                                                             step: step.name().to_string(),
                                                             mutation_id: mutation_id.clone() });
        let confirmation = service.await_confirmation(pending).await?;
        debug!("step {position} {} confirmed (block {:?})", step.name(), confirmation.block);
        self.progress.emit(RunEventKind::MutationConfirmed { position,
                                                             step: step.name().to_string(),
                                                             mutation_id });
        Ok(())
    }

    fn transition(&self, state: &mut RunnerState, next: RunnerState) {
        debug_assert!(!state.is_terminal(), "runner already terminal: {state:?}");
        debug!("runner {state:?} -> {next:?}");
        *state = next;
    }

    fn fail(&self,
            state: &mut RunnerState,
            failure: RunFailure,
            last_counters: LedgerCounters,
            steps_completed: usize)
            -> RunResult {
        self.transition(state, RunnerState::Failed);
        warn!("smoke test failed: {failure}");
        let result = RunResult::failed(failure, last_counters, steps_completed);
        self.progress.emit(RunEventKind::RunFailed { step: result.failed_step.clone(),
                                                     reason: result.failure_reason.clone().unwrap_or_default() });
        result
    }
}
