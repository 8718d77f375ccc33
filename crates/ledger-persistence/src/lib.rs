//! ledger-persistence
//!
//! Persistencia del descriptor de despliegue que consumen los clientes.
//!
//! Módulos:
//! - `artifact_store`: trait `ArtifactStore` e implementaciones en disco
//!   (escritura atómica temp + rename) y en memoria.
//! - `config`: carga de configuración desde .env.
//! - `error`: `PersistenceError`.

pub mod artifact_store;
pub mod config;
pub mod error;

pub use artifact_store::{ArtifactStore, FsArtifactStore, InMemoryArtifactStore, StagedArtifact};
pub use config::{init_dotenv, ARTIFACT_DIR_VAR};
pub use error::PersistenceError;
