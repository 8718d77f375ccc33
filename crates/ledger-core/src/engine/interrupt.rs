//! Señal de interrupción cooperativa.
//!
//! El runner nunca cancela una suspensión en curso: consulta la señal entre
//! steps, de modo que una mutación ya enviada termina de confirmarse antes de
//! que la corrida se reporte como interrumpida.
use tokio::sync::watch;

#[derive(Debug)]
pub struct InterruptHandle {
    tx: watch::Sender<bool>,
}

#[derive(Debug, Clone)]
pub struct InterruptSignal {
    rx: watch::Receiver<bool>,
}

impl InterruptSignal {
    pub fn channel() -> (InterruptHandle, InterruptSignal) {
        let (tx, rx) = watch::channel(false);
        (InterruptHandle { tx }, InterruptSignal { rx })
    }

    pub fn is_raised(&self) -> bool {
        *self.rx.borrow()
    }
}

impl InterruptHandle {
    pub fn raise(&self) {
        // sin receptores no hay nada que interrumpir
        let _ = self.tx.send(true);
    }
}
