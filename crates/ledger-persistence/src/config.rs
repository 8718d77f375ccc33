//! Bootstrap de variables de entorno desde .env.
//! El directorio del descriptor se configura con `LEDGER_ARTIFACT_DIR`.

use dotenvy::dotenv;
use once_cell::sync::Lazy;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

/// Raíz de los descriptores (por defecto `.`). Cada entorno tiene su
/// subdirectorio: el descriptor queda en
/// `{LEDGER_ARTIFACT_DIR}/{network}/{contractName}.json`, p. ej.
/// `./hardhat/MedicineLedger.json`. Un cliente que lea un
/// `./MedicineLedger.json` plano debe apuntar al subdirectorio del entorno;
/// la ruta exacta se imprime al final de cada corrida.
pub const ARTIFACT_DIR_VAR: &str = "LEDGER_ARTIFACT_DIR";

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}
