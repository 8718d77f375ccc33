//! Manejo de Ctrl-C para el binario.
//!
//! El primer aviso pide una parada ordenada: la mutación en vuelo termina de
//! confirmarse y el runner corta entre steps. Un segundo aviso aborta.
use std::future::Future;
use std::io;

use ledger_core::InterruptHandle;
use log::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptOutcome {
    /// Llegó un segundo aviso; el proceso debe salir ya con código 1.
    Forced,
    /// La fuente de señales dejó de estar disponible.
    SourceUnavailable,
}

/// Escucha avisos de `next_signal` hasta el segundo. El primero levanta
/// `interrupt`; el segundo devuelve `Forced`.
pub async fn watch_interrupts<F, Fut>(mut next_signal: F, interrupt: InterruptHandle) -> InterruptOutcome
    where F: FnMut() -> Fut,
          Fut: Future<Output = io::Result<()>>
{
    if let Err(e) = next_signal().await {
        warn!("cannot listen for interrupts: {e}");
        return InterruptOutcome::SourceUnavailable;
    }
    warn!("interrupt requested; waiting for in-flight confirmation (press Ctrl-C again to abort)");
    interrupt.raise();

    match next_signal().await {
        Ok(()) => {
            warn!("second interrupt; aborting without waiting");
            InterruptOutcome::Forced
        }
        Err(e) => {
            warn!("cannot listen for a second interrupt: {e}");
            InterruptOutcome::SourceUnavailable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_core::InterruptSignal;
    use std::future::ready;

    /// Fuente que entrega los resultados dados en orden.
    fn scripted(results: Vec<io::Result<()>>) -> impl FnMut() -> std::future::Ready<io::Result<()>> {
        let mut results = results.into_iter();
        move || ready(results.next().unwrap_or_else(|| Err(io::Error::other("exhausted"))))
    }

    #[tokio::test]
    async fn second_interrupt_forces_exit() {
        let (handle, signal) = InterruptSignal::channel();
        let outcome = watch_interrupts(scripted(vec![Ok(()), Ok(())]), handle).await;
        assert_eq!(outcome, InterruptOutcome::Forced);
        assert!(signal.is_raised());
    }

    #[tokio::test]
    async fn first_interrupt_only_raises_the_signal() {
        let (handle, signal) = InterruptSignal::channel();
        let outcome = watch_interrupts(scripted(vec![Ok(())]), handle).await;
        assert_eq!(outcome, InterruptOutcome::SourceUnavailable);
        assert!(signal.is_raised());
    }

    #[tokio::test]
    async fn unavailable_source_leaves_run_untouched() {
        let (handle, signal) = InterruptSignal::channel();
        let outcome = watch_interrupts(scripted(vec![]), handle).await;
        assert_eq!(outcome, InterruptOutcome::SourceUnavailable);
        assert!(!signal.is_raised());
    }
}
