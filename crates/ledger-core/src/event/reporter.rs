use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use super::{RunEvent, RunEventKind};

/// Sumidero de progreso. Nunca falla ni decide nada: sólo escribe.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: &RunEvent);
}

/// Emisor compartido por todos los componentes de una corrida. Asigna `seq`
/// monótono y el `run_id` común.
#[derive(Clone)]
pub struct Progress {
    run_id: Uuid,
    seq: Arc<AtomicU64>,
    reporter: Arc<dyn ProgressReporter>,
}

impl Progress {
    pub fn new(reporter: Arc<dyn ProgressReporter>) -> Self {
        Self::with_run_id(Uuid::new_v4(), reporter)
    }

    pub fn with_run_id(run_id: Uuid, reporter: Arc<dyn ProgressReporter>) -> Self {
        Self { run_id,
               seq: Arc::new(AtomicU64::new(0)),
               reporter }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn emit(&self, kind: RunEventKind) {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        let event = RunEvent { seq,
                               run_id: self.run_id,
                               kind,
                               ts: Utc::now() };
        self.reporter.report(&event);
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").field("run_id", &self.run_id).finish_non_exhaustive()
    }
}

/// Líneas legibles en stdout; los fallos van a stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn render(kind: &RunEventKind) -> String {
        match kind {
            RunEventKind::DeploymentRequested { service } => format!("[deploy] deploying {service}..."),
            RunEventKind::DeploymentSubmitted { service, request_id } => {
                format!("[deploy] {service} submitted as {request_id}, waiting for confirmation")
            }
            RunEventKind::DeploymentConfirmed { service, address } => format!("[deploy] {service} deployed to {address}"),
            RunEventKind::DeploymentFailed { service, reason } => format!("[deploy] {service} deployment failed: {reason}"),
            RunEventKind::ArtifactWritten { label, location } => {
                format!("[artifact] address and interface saved to {location} ({label})")
            }
            RunEventKind::RunStarted { address, step_count } => {
                format!("[smoke] testing {address} with {step_count} steps")
            }
            RunEventKind::BaselineRead { counters } => format!("[smoke] baseline {counters}"),
            RunEventKind::StepStarted { position, operation } => format!("[smoke] #{position} {operation}"),
            RunEventKind::MutationSubmitted { position, mutation_id, .. } => {
                format!("[smoke] #{position} submitted {mutation_id}")
            }
            RunEventKind::MutationConfirmed { position, step, .. } => format!("[smoke] #{position} {step} confirmed"),
            RunEventKind::CountersRead { position, counters } => format!("[smoke] #{position} counters {counters}"),
            RunEventKind::StepVerified { position, step } => format!("[smoke] #{position} {step} ok"),
            RunEventKind::RunCompleted { counters } => format!("[smoke] all steps passed, final {counters}"),
            RunEventKind::RunFailed { step: Some(step), reason } => format!("[smoke] failed at {step}: {reason}"),
            RunEventKind::RunFailed { step: None, reason } => format!("[smoke] failed: {reason}"),
            RunEventKind::HarnessSucceeded { address, artifact } => {
                format!("[done] ledger ready at {address}; clients should read {artifact}")
            }
            RunEventKind::HarnessFailed { reason } => format!("[done] harness failed: {reason}"),
        }
    }
}

impl ProgressReporter for ConsoleReporter {
    fn report(&self, event: &RunEvent) {
        let line = Self::render(&event.kind);
        if event.kind.is_failure() {
            write_line(&mut io::stderr().lock(), &line);
        } else {
            write_line(&mut io::stdout().lock(), &line);
        }
    }
}

/// Escribe una línea descartando errores de E/S (pipe cerrado, disco lleno):
/// el reporte nunca interrumpe la corrida.
fn write_line<W>(out: &mut W, line: &str)
    where W: Write + ?Sized
{
    let _ = writeln!(out, "{line}").and_then(|()| out.flush());
}

/// Registro append-only en memoria, indexado por `run_id`.
#[derive(Debug, Default)]
pub struct InMemoryEventLog {
    inner: Mutex<HashMap<Uuid, Vec<RunEvent>>>,
}

impl InMemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Eventos de una corrida en orden de `seq`.
    pub fn list(&self, run_id: Uuid) -> Vec<RunEvent> {
        let guard = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        let mut events = guard.get(&run_id).cloned().unwrap_or_default();
        events.sort_by_key(|e| e.seq);
        events
    }

    pub fn tags(&self, run_id: Uuid) -> Vec<&'static str> {
        self.list(run_id).iter().map(|e| e.kind.tag()).collect()
    }
}

impl ProgressReporter for InMemoryEventLog {
    fn report(&self, event: &RunEvent) {
        let mut guard = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        guard.entry(event.run_id).or_default().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LedgerCounters;

    #[test]
    fn progress_assigns_increasing_seq() {
        let log = Arc::new(InMemoryEventLog::new());
        let progress = Progress::new(log.clone());
        progress.emit(RunEventKind::BaselineRead { counters: LedgerCounters::default() });
        progress.emit(RunEventKind::RunCompleted { counters: LedgerCounters::default() });

        let events = log.list(progress.run_id());
        assert_eq!(events.iter().map(|e| e.seq).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(log.tags(progress.run_id()), vec!["baseline", "completed"]);
        assert!(log.list(Uuid::new_v4()).is_empty());
    }

    #[test]
    fn console_lines_name_failing_step() {
        let line = ConsoleReporter::render(&RunEventKind::RunFailed { step: Some("placeOrder".into()),
                                                                       reason: "orderCount expected 1, observed 0".into() });
        assert_eq!(line, "[smoke] failed at placeOrder: orderCount expected 1, observed 0");
        assert!(RunEventKind::HarnessFailed { reason: String::new() }.is_failure());
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "reader went away"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "reader went away"))
        }
    }

    #[test]
    fn closed_output_does_not_panic() {
        let mut out = ClosedPipe;
        for position in 0..64 {
            let line = ConsoleReporter::render(&RunEventKind::CountersRead { position,
                                                                             counters: LedgerCounters::default() });
            write_line(&mut out, &line);
        }
    }

    #[test]
    fn lines_end_with_newline() {
        let mut buf = Vec::new();
        write_line(&mut buf, "[smoke] baseline");
        write_line(&mut buf, "[smoke] #1 addStockRecord");
        assert_eq!(String::from_utf8(buf).unwrap(), "[smoke] baseline\n[smoke] #1 addStockRecord\n");
    }
}
