//! Constantes del harness.

/// Intervalo por defecto entre consultas de confirmación (despliegue y
/// transacciones).
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

/// Nombre con el que se identifica la lectura inicial de contadores en los
/// errores y eventos. Ocupa la posición 0.
pub const BASELINE_STEP: &str = "baseline";

/// Nombre del chequeo de totales que cierra una corrida exitosa.
pub const FINAL_TOTALS_STEP: &str = "finalTotals";

/// Texto exacto que se reporta como `failure_reason` de una corrida
/// interrumpida.
pub const INTERRUPTED_REASON: &str = "interrupted";
