//! Definición compilada del servicio y handle del despliegue.
//!
//! El core trata el esquema de interfaz como JSON opaco: sólo sabe listar los
//! nombres de operaciones para validar que el servicio desplegado expone lo
//! que la secuencia de smoke test va a invocar.
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Esquema de interfaz serializado (p.ej. un ABI de Solidity).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InterfaceSchema(Value);

impl InterfaceSchema {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Entradas del esquema con `"type": "function"` (en orden de aparición).
    pub fn operations(&self) -> Vec<&str> {
        self.0
            .as_array()
            .map(|entries| {
                entries.iter()
                       .filter(|e| e.get("type").and_then(Value::as_str) == Some("function"))
                       .filter_map(|e| e.get("name").and_then(Value::as_str))
                       .collect()
            })
            .unwrap_or_default()
    }

    pub fn has_operation(&self, name: &str) -> bool {
        self.operations().iter().any(|op| *op == name)
    }

    /// Entrada completa de una operación por nombre.
    pub fn operation(&self, name: &str) -> Option<&Value> {
        self.0.as_array()?.iter().find(|e| {
                                     e.get("type").and_then(Value::as_str) == Some("function")
                                     && e.get("name").and_then(Value::as_str) == Some(name)
                                 })
    }
}

/// Definición compilada que el `Deployer` entrega al entorno de ejecución.
/// `code` es opaco para el core (bytecode de creación en el adaptador EVM).
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDefinition {
    pub name: String,
    pub interface_schema: InterfaceSchema,
    pub code: Vec<u8>,
}

/// Resultado de un despliegue confirmado.
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentHandle {
    /// Dirección estable de la instancia; inmutable una vez asignada.
    pub address: String,
    pub interface_schema: InterfaceSchema,
    /// Identificador de la solicitud de instanciación (hash de tx en EVM).
    pub transaction_id: String,
}
