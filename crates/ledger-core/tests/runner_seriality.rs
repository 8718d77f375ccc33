
use std::time::Duration;

use ledger_core::{medicine_smoke_sequence, LedgerCounters, RunEventKind, SmokeTestRunner};
use test_support::{recording_progress, FakeLedger, COUNTERPARTY};

/// Con confirmaciones lentas, ninguna lectura ni envío puede ocurrir antes de
/// que la mutación anterior se confirme.
#[tokio::test(start_paused = true)]
async fn slow_confirmations_are_awaited_before_anything_else() {
    let mut ledger = FakeLedger::new();
    ledger.confirm_delay = Duration::from_millis(500);
    let (log, progress) = recording_progress();

    let result = SmokeTestRunner::new(progress.clone()).run(&ledger, &medicine_smoke_sequence(COUNTERPARTY))
                                                       .await;

    assert!(result.success, "{:?}", result.failure_reason);
    assert_eq!(result.final_counters, LedgerCounters::new(1, 1, 1));
    assert_eq!(ledger.max_in_flight(), 1);

    // Después de cada submit, la siguiente llamada al ledger es su confirm.
    let calls = ledger.calls();
    for (i, call) in calls.iter().enumerate() {
        if let Some(op) = call.strip_prefix("submit:") {
            assert_eq!(calls.get(i + 1).map(String::as_str),
                       Some(format!("confirm:{op}").as_str()),
                       "call after {call} was not its confirmation: {calls:?}");
        }
    }

    // En el log de eventos: submitted -> confirmed -> counters para cada step.
    let events = log.list(progress.run_id());
    let mut last_confirmed: Option<usize> = None;
    for e in &events {
        match &e.kind {
            RunEventKind::MutationSubmitted { position, .. } => {
                assert_eq!(last_confirmed.unwrap_or(0), *position - 1,
                           "step {position} submitted before previous confirmation");
            }
            RunEventKind::MutationConfirmed { position, .. } => last_confirmed = Some(*position),
            RunEventKind::CountersRead { position, .. } => {
                assert_eq!(last_confirmed, Some(*position), "counters of step {position} read before its confirmation");
            }
            _ => {}
        }
    }
    assert_eq!(last_confirmed, Some(4));
}

#[tokio::test(start_paused = true)]
async fn seq_numbers_follow_emission_order() {
    let mut ledger = FakeLedger::new();
    ledger.confirm_delay = Duration::from_millis(20);
    let (log, progress) = recording_progress();

    SmokeTestRunner::new(progress.clone()).run(&ledger, &medicine_smoke_sequence(COUNTERPARTY))
                                          .await;

    let events = log.list(progress.run_id());
    assert!(events.windows(2).all(|w| w[0].seq + 1 == w[1].seq));
    assert!(events.windows(2).all(|w| w[0].ts <= w[1].ts));
}
