//! Descriptor persistido de un despliegue.
//!
//! Se crea una vez por corrida y no se muta. El formato serializado es el que
//! consumen los clientes externos (`address`, `abi`, `deployedAt`, `network`,
//! `contractName`).
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DeploymentHandle, InterfaceSchema};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentDescriptor {
    pub address: String,
    #[serde(rename = "abi")]
    pub interface_schema: InterfaceSchema,
    #[serde(rename = "deployedAt")]
    pub deployed_at: DateTime<Utc>,
    #[serde(rename = "network")]
    pub environment_label: String,
    #[serde(rename = "contractName")]
    pub service_name: String,
}

impl DeploymentDescriptor {
    pub fn from_handle(handle: &DeploymentHandle,
                       service_name: impl Into<String>,
                       environment_label: impl Into<String>,
                       deployed_at: DateTime<Utc>)
                       -> Self {
        Self { address: handle.address.clone(),
               interface_schema: handle.interface_schema.clone(),
               deployed_at,
               environment_label: environment_label.into(),
               service_name: service_name.into() }
    }
}
