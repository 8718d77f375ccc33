//! Snapshot de contadores agregados del ledger.
//!
//! Los contadores no pertenecen al harness: son lecturas prestadas del
//! servicio que pueden quedar obsoletas apenas se leen. Dentro de una corrida
//! se asume acceso exclusivo, por lo que sólo deben crecer.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;
use crate::service::LedgerService;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CounterKind {
    Stock,
    Shortage,
    Order,
}

impl CounterKind {
    pub const ALL: [CounterKind; 3] = [CounterKind::Stock, CounterKind::Shortage, CounterKind::Order];

    /// Nombre de la operación de lectura que expone el servicio.
    pub fn as_str(&self) -> &'static str {
        match self {
            CounterKind::Stock => "stockCount",
            CounterKind::Shortage => "shortageCount",
            CounterKind::Order => "orderCount",
        }
    }
}

impl fmt::Display for CounterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerCounters {
    pub stock_count: u64,
    pub shortage_count: u64,
    pub order_count: u64,
}

impl LedgerCounters {
    pub fn new(stock_count: u64, shortage_count: u64, order_count: u64) -> Self {
        Self { stock_count,
               shortage_count,
               order_count }
    }

    pub fn get(&self, kind: CounterKind) -> u64 {
        match kind {
            CounterKind::Stock => self.stock_count,
            CounterKind::Shortage => self.shortage_count,
            CounterKind::Order => self.order_count,
        }
    }

    /// Copia con `kind` incrementado en `by` (saturando).
    pub fn incremented(mut self, kind: CounterKind, by: u64) -> Self {
        let slot = match kind {
            CounterKind::Stock => &mut self.stock_count,
            CounterKind::Shortage => &mut self.shortage_count,
            CounterKind::Order => &mut self.order_count,
        };
        *slot = slot.saturating_add(by);
        self
    }

    /// `true` si ningún contador retrocedió respecto de `earlier`.
    pub fn dominates(&self, earlier: &LedgerCounters) -> bool {
        CounterKind::ALL.iter().all(|k| self.get(*k) >= earlier.get(*k))
    }

    /// Lee los tres contadores en orden fijo (stock, shortage, order).
    pub async fn read_from<S>(service: &S) -> Result<Self, ServiceError>
        where S: LedgerService + ?Sized
    {
        let stock_count = service.stock_count().await?;
        let shortage_count = service.shortage_count().await?;
        let order_count = service.order_count().await?;
        Ok(Self { stock_count,
                  shortage_count,
                  order_count })
    }
}

impl fmt::Display for LedgerCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f,
               "stock={} shortage={} order={}",
               self.stock_count, self.shortage_count, self.order_count)
    }
}
