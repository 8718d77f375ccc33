//! Almacén del descriptor de despliegue.
//!
//! Un descriptor por etiqueta de entorno. En disco la ruta es
//! `{root}/{label}/{service}.json`; la escritura serializa a un archivo
//! temporal del mismo directorio, hace flush + sync y luego lo renombra sobre
//! la ruta final. Un lector ve el descriptor anterior completo o el nuevo
//! completo, nunca uno parcial.
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use ledger_core::DeploymentDescriptor;
use log::{debug, info};
use tempfile::NamedTempFile;

use crate::error::PersistenceError;

pub trait ArtifactStore: Send + Sync {
    /// Reemplaza por completo cualquier descriptor previo con la misma
    /// etiqueta.
    fn write(&self, descriptor: &DeploymentDescriptor) -> Result<(), PersistenceError>;

    fn read(&self, label: &str) -> Result<DeploymentDescriptor, PersistenceError>;

    /// Ubicación legible del descriptor de `label` (ruta o clave).
    fn location(&self, label: &str) -> Result<String, PersistenceError>;
}

/// Las etiquetas se usan como nombre de directorio: no vacías, sin
/// separadores ni componentes relativos.
pub(crate) fn validate_label(label: &str) -> Result<(), PersistenceError> {
    let bad = label.is_empty()
              || label.starts_with('.')
              || label.chars().any(|c| matches!(c, '/' | '\\' | '\0') || c.is_whitespace());
    if bad {
        return Err(PersistenceError::InvalidLabel(label.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Filesystem
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
    service_name: String,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>, service_name: impl Into<String>) -> Self {
        Self { root: root.into(),
               service_name: service_name.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `{root}/{label}/{service}.json`. Con la raíz por defecto queda un
    /// nivel por debajo del `./{service}.json` que algunos clientes esperan.
    pub fn path_for(&self, label: &str) -> Result<PathBuf, PersistenceError> {
        validate_label(label)?;
        Ok(self.root.join(label).join(format!("{}.json", self.service_name)))
    }

    /// Primera mitad de la escritura: deja el descriptor completo y
    /// sincronizado en un temporal junto al destino. Si el `StagedArtifact`
    /// se descarta sin `commit`, el temporal se borra y el destino no cambia.
    pub fn stage(&self, descriptor: &DeploymentDescriptor) -> Result<StagedArtifact, PersistenceError> {
        let target = self.path_for(&descriptor.environment_label)?;
        let dir = target.parent()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.root.clone());
        fs::create_dir_all(&dir).map_err(|e| PersistenceError::io(&dir, e))?;

        let mut body = serde_json::to_vec_pretty(descriptor)?;
        body.push(b'\n');

        let mut temp = tempfile::Builder::new().prefix(".artifact-")
                                               .suffix(".tmp")
                                               .tempfile_in(&dir)
                                               .map_err(|e| PersistenceError::io(&dir, e))?;
        temp.write_all(&body).map_err(|e| PersistenceError::io(temp.path(), e))?;
        temp.flush().map_err(|e| PersistenceError::io(temp.path(), e))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| PersistenceError::io(temp.path(), e))?;
        debug!("staged artifact for '{}' at {}", descriptor.environment_label, temp.path().display());

        Ok(StagedArtifact { temp,
                            target,
                            dir })
    }
}

/// Descriptor escrito en un temporal, pendiente de rename.
#[derive(Debug)]
pub struct StagedArtifact {
    temp: NamedTempFile,
    target: PathBuf,
    dir: PathBuf,
}

impl StagedArtifact {
    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    pub fn commit(self) -> Result<PathBuf, PersistenceError> {
        let target = self.target;
        self.temp
            .persist(&target)
            .map_err(|e| PersistenceError::io(&target, e.error))?;
        sync_dir(&self.dir)?;
        Ok(target)
    }
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<(), PersistenceError> {
    fs::File::open(dir).and_then(|d| d.sync_all())
                       .map_err(|e| PersistenceError::io(dir, e))
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<(), PersistenceError> {
    Ok(())
}

impl ArtifactStore for FsArtifactStore {
    fn write(&self, descriptor: &DeploymentDescriptor) -> Result<(), PersistenceError> {
        let path = self.stage(descriptor)?.commit()?;
        info!("artifact for '{}' written to {}", descriptor.environment_label, path.display());
        Ok(())
    }

    fn read(&self, label: &str) -> Result<DeploymentDescriptor, PersistenceError> {
        let path = self.path_for(label)?;
        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PersistenceError::NotFound(label.to_string()))
            }
            Err(e) => return Err(PersistenceError::io(&path, e)),
        };
        Ok(serde_json::from_slice(&raw)?)
    }

    fn location(&self, label: &str) -> Result<String, PersistenceError> {
        Ok(self.path_for(label)?.display().to_string())
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Implementación en memoria para tests del harness.
#[derive(Debug, Default)]
pub struct InMemoryArtifactStore {
    inner: Mutex<HashMap<String, DeploymentDescriptor>>,
    writes: Mutex<usize>,
}

impl InMemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cantidad de llamadas a `write` exitosas.
    pub fn write_count(&self) -> usize {
        *self.writes.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl ArtifactStore for InMemoryArtifactStore {
    fn write(&self, descriptor: &DeploymentDescriptor) -> Result<(), PersistenceError> {
        validate_label(&descriptor.environment_label)?;
        let mut map = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        map.insert(descriptor.environment_label.clone(), descriptor.clone());
        *self.writes.lock().unwrap_or_else(|p| p.into_inner()) += 1;
        Ok(())
    }

    fn read(&self, label: &str) -> Result<DeploymentDescriptor, PersistenceError> {
        validate_label(label)?;
        let map = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        map.get(label)
           .cloned()
           .ok_or_else(|| PersistenceError::NotFound(label.to_string()))
    }

    fn location(&self, label: &str) -> Result<String, PersistenceError> {
        validate_label(label)?;
        Ok(format!("memory://{label}"))
    }
}
