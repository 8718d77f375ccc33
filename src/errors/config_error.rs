use thiserror::Error;

/// Errores al leer la configuración del entorno.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Configuración inválida: {var}={value:?} ({reason})")]
    Invalid { var: &'static str, value: String, reason: String },
    #[error("Configuración vacía: {0}")]
    Empty(&'static str),
}
