//! Artifact de compilación de Hardhat → `ServiceDefinition`.
//!
//! Sólo se leen `contractName`, `abi` y `bytecode`; el resto del archivo
//! (linkReferences, deployedBytecode, ...) se ignora.
use std::fs;
use std::path::{Path, PathBuf};

use ledger_core::{InterfaceSchema, ServiceDefinition};
use log::debug;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::abi::from_hex;

#[derive(Debug, Error)]
pub enum ContractArtifactError {
    #[error("cannot read contract artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed contract artifact: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("contract artifact has invalid bytecode: {0}")]
    InvalidBytecode(String),
    #[error("contract artifact for {0} has no creation bytecode (abstract contract or interface?)")]
    EmptyBytecode(String),
    #[error("contract artifact is for '{found}', expected '{expected}'")]
    NameMismatch { expected: String, found: String },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardhatArtifact {
    pub contract_name: String,
    pub abi: Value,
    pub bytecode: String,
}

impl HardhatArtifact {
    pub fn into_definition(self) -> Result<ServiceDefinition, ContractArtifactError> {
        let code = from_hex(&self.bytecode).map_err(|e| ContractArtifactError::InvalidBytecode(e.to_string()))?;
        if code.is_empty() {
            return Err(ContractArtifactError::EmptyBytecode(self.contract_name));
        }
        Ok(ServiceDefinition { name: self.contract_name,
                               interface_schema: InterfaceSchema::new(self.abi),
                               code })
    }
}

/// Carga el artifact y verifica que corresponda al contrato esperado.
pub fn load_service_definition(path: &Path, expected_name: &str) -> Result<ServiceDefinition, ContractArtifactError> {
    let raw = fs::read(path).map_err(|source| ContractArtifactError::Io { path: path.to_path_buf(),
                                                                         source })?;
    let artifact: HardhatArtifact = serde_json::from_slice(&raw)?;
    if artifact.contract_name != expected_name {
        return Err(ContractArtifactError::NameMismatch { expected: expected_name.to_string(),
                                                         found: artifact.contract_name });
    }
    let definition = artifact.into_definition()?;
    debug!("loaded {} ({} bytes of bytecode, {} functions)",
           definition.name,
           definition.code.len(),
           definition.interface_schema.operations().len());
    Ok(definition)
}
