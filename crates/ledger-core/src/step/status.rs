/// Estado del `SmokeTestRunner`.
///
/// Transiciones válidas:
/// - `Baseline` -> `Executing(1)` (o `Completed` si no hay steps)
/// - `Executing(i)` -> `Verifying(i)`
/// - `Verifying(i)` -> `Executing(i + 1)` | `Completed`
/// - cualquier estado no terminal -> `Failed`
///
/// Las posiciones son 1-based; la 0 corresponde al baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Baseline,
    Executing(usize),
    Verifying(usize),
    Completed,
    Failed,
}

impl RunnerState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunnerState::Completed | RunnerState::Failed)
    }
}
