//! Orquestación: `Deployer` (instanciación + espera de confirmación) y
//! `SmokeTestRunner` (secuencia serial con verificación de contadores).

pub mod deployer;
pub mod interrupt;
pub mod runner;

pub use deployer::{Deployer, DeployerConfig};
pub use interrupt::{InterruptHandle, InterruptSignal};
pub use runner::SmokeTestRunner;
