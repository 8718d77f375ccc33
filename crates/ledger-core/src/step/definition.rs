use std::fmt;

use serde::Serialize;

use crate::model::{CounterKind, LedgerCounters};

/// Operación del `LedgerService` que un step invoca, con sus argumentos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum LedgerOperation {
    #[serde(rename_all = "camelCase")]
    AddStockRecord {
        owner: String,
        name: String,
        quantity: u64,
        unit_price: u64,
    },
    ReportShortage {
        name: String,
        location: String,
    },
    PlaceOrder {
        name: String,
        quantity: u64,
        counterparty: String,
    },
    UpdateRetailerStock {
        name: String,
        quantity: u64,
    },
    /// Lectura de los tres contadores; no muta.
    ReadCounters,
}

impl LedgerOperation {
    /// Nombre estable usado en eventos y mensajes de error.
    pub fn name(&self) -> &'static str {
        match self {
            LedgerOperation::AddStockRecord { .. } => "addStockRecord",
            LedgerOperation::ReportShortage { .. } => "reportShortage",
            LedgerOperation::PlaceOrder { .. } => "placeOrder",
            LedgerOperation::UpdateRetailerStock { .. } => "updateRetailerStock",
            LedgerOperation::ReadCounters => "readCounters",
        }
    }

    pub fn is_mutating(&self) -> bool {
        !matches!(self, LedgerOperation::ReadCounters)
    }
}

impl fmt::Display for LedgerOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerOperation::AddStockRecord { owner, name, quantity, unit_price } => {
                write!(f, "addStockRecord({owner:?}, {name:?}, {quantity}, {unit_price})")
            }
            LedgerOperation::ReportShortage { name, location } => write!(f, "reportShortage({name:?}, {location:?})"),
            LedgerOperation::PlaceOrder { name, quantity, counterparty } => {
                write!(f, "placeOrder({name:?}, {quantity}, {counterparty})")
            }
            LedgerOperation::UpdateRetailerStock { name, quantity } => {
                write!(f, "updateRetailerStock({name:?}, {quantity})")
            }
            LedgerOperation::ReadCounters => f.write_str("readCounters()"),
        }
    }
}

/// Qué debe observarse en los contadores después de un step, relativo al
/// último snapshot conocido.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Expectation {
    /// Sin relectura ni chequeo.
    Unchecked,
    /// Ningún contador cambia.
    Unchanged,
    /// `counter` sube exactamente `by`; el resto no cambia.
    Increment { counter: CounterKind, by: u64 },
}

/// Primera diferencia encontrada entre lo esperado y lo observado.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterDiscrepancy {
    pub counter: CounterKind,
    pub expected: u64,
    pub actual: u64,
}

impl Expectation {
    pub fn requires_read(&self) -> bool {
        !matches!(self, Expectation::Unchecked)
    }

    /// Contadores que deberían observarse si `before` era el estado previo.
    pub fn expected_after(&self, before: LedgerCounters) -> LedgerCounters {
        match self {
            Expectation::Increment { counter, by } => before.incremented(*counter, *by),
            Expectation::Unchecked | Expectation::Unchanged => before,
        }
    }

    /// Compara `after` contra lo esperado. El contador declarado se revisa
    /// primero para que el error nombre la causa más probable.
    pub fn verify(&self, before: LedgerCounters, after: LedgerCounters) -> Result<(), CounterDiscrepancy> {
        if !self.requires_read() {
            return Ok(());
        }
        let expected = self.expected_after(before);
        let declared = match self {
            Expectation::Increment { counter, .. } => Some(*counter),
            Expectation::Unchecked | Expectation::Unchanged => None,
        };
        let mut order = declared.into_iter()
                                .chain(CounterKind::ALL.into_iter().filter(|k| Some(*k) != declared));
        match order.find(|k| expected.get(*k) != after.get(*k)) {
            Some(counter) => Err(CounterDiscrepancy { counter,
                                                      expected: expected.get(counter),
                                                      actual: after.get(counter) }),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmokeTestStep {
    pub operation: LedgerOperation,
    pub expectation: Expectation,
}

impl SmokeTestStep {
    pub fn new(operation: LedgerOperation, expectation: Expectation) -> Self {
        Self { operation, expectation }
    }

    /// Step que debe incrementar `counter` en uno.
    pub fn incrementing(operation: LedgerOperation, counter: CounterKind) -> Self {
        Self::new(operation, Expectation::Increment { counter, by: 1 })
    }

    pub fn name(&self) -> &'static str {
        self.operation.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increment_checks_declared_counter_first() {
        let exp = Expectation::Increment { counter: CounterKind::Order, by: 1 };
        let before = LedgerCounters::new(1, 1, 0);
        // order no cambió y stock cambió: debe reportarse order
        let after = LedgerCounters::new(2, 1, 0);
        let d = exp.verify(before, after).unwrap_err();
        assert_eq!(d, CounterDiscrepancy { counter: CounterKind::Order, expected: 1, actual: 0 });
    }

    #[test]
    fn increment_rejects_unrelated_change() {
        let exp = Expectation::Increment { counter: CounterKind::Stock, by: 1 };
        let d = exp.verify(LedgerCounters::new(0, 0, 0), LedgerCounters::new(1, 1, 0)).unwrap_err();
        assert_eq!(d.counter, CounterKind::Shortage);
        assert_eq!((d.expected, d.actual), (0, 1));
    }

    #[test]
    fn increment_on_middle_counter_passes_when_only_it_moves() {
        let exp = Expectation::Increment { counter: CounterKind::Shortage, by: 1 };
        assert!(exp.verify(LedgerCounters::new(1, 0, 0), LedgerCounters::new(1, 1, 0)).is_ok());
        // shortage sin cambio y order movido: se nombra shortage, después el resto en orden fijo
        let d = exp.verify(LedgerCounters::new(1, 0, 0), LedgerCounters::new(1, 0, 1)).unwrap_err();
        assert_eq!(d, CounterDiscrepancy { counter: CounterKind::Shortage, expected: 1, actual: 0 });
        let d = exp.verify(LedgerCounters::new(1, 0, 0), LedgerCounters::new(2, 1, 1)).unwrap_err();
        assert_eq!(d.counter, CounterKind::Stock);
    }

    #[test]
    fn unchanged_reports_counters_in_fixed_order() {
        let d = Expectation::Unchanged.verify(LedgerCounters::new(0, 0, 0), LedgerCounters::new(0, 2, 3))
                                      .unwrap_err();
        assert_eq!(d, CounterDiscrepancy { counter: CounterKind::Shortage, expected: 0, actual: 2 });
    }

    #[test]
    fn increment_rejects_overshoot_and_decrease() {
        let exp = Expectation::Increment { counter: CounterKind::Stock, by: 1 };
        assert!(exp.verify(LedgerCounters::new(0, 0, 0), LedgerCounters::new(2, 0, 0)).is_err());
        assert!(Expectation::Unchanged.verify(LedgerCounters::new(3, 0, 0), LedgerCounters::new(2, 0, 0)).is_err());
    }

    #[test]
    fn unchecked_never_fails() {
        assert!(Expectation::Unchecked.verify(LedgerCounters::new(5, 5, 5), LedgerCounters::default()).is_ok());
        assert!(!Expectation::Unchecked.requires_read());
    }

    #[test]
    fn operation_display_includes_arguments() {
        let op = LedgerOperation::ReportShortage { name: "Aspirin".into(),
                                                   location: "Mumbai".into() };
        assert_eq!(op.to_string(), "reportShortage(\"Aspirin\", \"Mumbai\")");
        assert!(op.is_mutating());
        assert!(!LedgerOperation::ReadCounters.is_mutating());
    }

    #[test]
    fn operation_serializes_tagged() {
        let op = LedgerOperation::AddStockRecord { owner: "Test Pharmacy".into(),
                                                   name: "Paracetamol".into(),
                                                   quantity: 100,
                                                   unit_price: 500 };
        let v = serde_json::to_value(&op).unwrap();
        assert_eq!(v["operation"], "addStockRecord");
        assert_eq!(v["unitPrice"], 500);
    }
}
