//! Cuentas usadas por el harness: la primera cuenta del nodo firma todas las
//! transacciones; la segunda es la contraparte de las órdenes.
use ledger_core::ServiceError;
use log::debug;

use crate::rpc::JsonRpcClient;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeAccounts {
    pub sender: String,
    pub counterparty: String,
}

/// Los overrides explícitos tienen prioridad; sólo se consulta
/// `eth_accounts` si falta alguno.
pub async fn resolve_accounts(rpc: &JsonRpcClient,
                              sender: Option<&str>,
                              counterparty: Option<&str>)
                              -> Result<NodeAccounts, ServiceError> {
    if let (Some(s), Some(c)) = (sender, counterparty) {
        return Ok(NodeAccounts { sender: s.to_string(),
                                 counterparty: c.to_string() });
    }

    let accounts = rpc.accounts().await?;
    debug!("node exposes {} unlocked accounts", accounts.len());
    let sender = match sender {
        Some(s) => s.to_string(),
        None => accounts.first()
                        .cloned()
                        .ok_or_else(|| ServiceError::Rejected("node exposes no unlocked accounts".into()))?,
    };
    let counterparty = match counterparty {
        Some(c) => c.to_string(),
        None => accounts.get(1).cloned().ok_or_else(|| {
                                             ServiceError::Rejected("node exposes a single account; set LEDGER_COUNTERPARTY".into())
                                         })?,
    };
    Ok(NodeAccounts { sender,
                      counterparty })
}
