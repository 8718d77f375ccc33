//! Secuencia fija de smoke test para el ledger de medicamentos.
use super::{Expectation, LedgerOperation, SmokeTestStep};
use crate::model::CounterKind;

pub const TEST_PHARMACY: &str = "Test Pharmacy";
pub const STOCKED_MEDICINE: &str = "Paracetamol";
pub const SHORT_MEDICINE: &str = "Aspirin";
pub const SHORTAGE_LOCATION: &str = "Mumbai";
pub const ORDERED_MEDICINE: &str = "Amoxicillin";

/// Precio unitario en paise (5.00).
pub const UNIT_PRICE_PAISE: u64 = 500;

/// Construye la secuencia: alta de stock, reporte de faltante, pedido al
/// `counterparty` (el fabricante) y actualización de stock del minorista.
/// La última sólo actualiza un valor, por lo que ningún contador cambia.
pub fn medicine_smoke_sequence(counterparty: impl Into<String>) -> Vec<SmokeTestStep> {
    vec![
        SmokeTestStep::incrementing(LedgerOperation::AddStockRecord { owner: TEST_PHARMACY.into(),
                                                                      name: STOCKED_MEDICINE.into(),
                                                                      quantity: 100,
                                                                      unit_price: UNIT_PRICE_PAISE },
                                    CounterKind::Stock),
        SmokeTestStep::incrementing(LedgerOperation::ReportShortage { name: SHORT_MEDICINE.into(),
                                                                      location: SHORTAGE_LOCATION.into() },
                                    CounterKind::Shortage),
        SmokeTestStep::incrementing(LedgerOperation::PlaceOrder { name: ORDERED_MEDICINE.into(),
                                                                  quantity: 50,
                                                                  counterparty: counterparty.into() },
                                    CounterKind::Order),
        SmokeTestStep::new(LedgerOperation::UpdateRetailerStock { name: STOCKED_MEDICINE.into(),
                                                                  quantity: 75 },
                           Expectation::Unchanged),
    ]
}
