pub mod config_error;
pub mod harness_error;

pub use config_error::ConfigError;
pub use harness_error::HarnessError;
