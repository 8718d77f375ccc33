//! Cliente JSON-RPC 2.0 del nodo (Hardhat u otro nodo con cuentas
//! desbloqueadas).
use std::sync::atomic::{AtomicU64, Ordering};

use ledger_core::ServiceError;
use log::trace;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status: {status} body={body}")]
    UnexpectedStatus { status: reqwest::StatusCode, body: String },
    #[error("node error {code}: {message}")]
    Node { code: i64, message: String },
    #[error("cannot decode {method} result: {reason}")]
    Decode { method: String, reason: String },
}

impl From<RpcError> for ServiceError {
    fn from(e: RpcError) -> Self {
        match e {
            RpcError::Http(_) | RpcError::UnexpectedStatus { .. } => ServiceError::Transport(e.to_string()),
            RpcError::Node { message, .. } => ServiceError::Rejected(message),
            RpcError::Decode { .. } => ServiceError::Decode(e.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<ErrorObject>,
}

/// Recibo de transacción. `status` es `0x1` (éxito) o `0x0` (revertida).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub contract_address: Option<String>,
    #[serde(default)]
    pub block_number: Option<String>,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        self.status.as_deref() == Some("0x1")
    }
}

pub struct JsonRpcClient {
    http: Client,
    url: String,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self { http: Client::new(),
               url: url.into(),
               next_id: AtomicU64::new(1) }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Una llamada. `result: null` se decodifica como `T` (útil con `Option`).
    pub async fn request<T>(&self, method: &str, params: Value) -> Result<T, RpcError>
        where T: DeserializeOwned
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });
        trace!("rpc -> {body}");
        let res = self.http.post(&self.url).json(&body).send().await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(RpcError::UnexpectedStatus { status, body });
        }

        let response: Response = res.json().await?;
        if let Some(err) = response.error {
            return Err(RpcError::Node { code: err.code,
                                        message: err.message });
        }
        let result = response.result.unwrap_or(Value::Null);
        trace!("rpc <- {method}: {result}");
        serde_json::from_value(result).map_err(|e| RpcError::Decode { method: method.to_string(),
                                                                      reason: e.to_string() })
    }

    pub async fn accounts(&self) -> Result<Vec<String>, RpcError> {
        self.request("eth_accounts", json!([])).await
    }

    /// Envía una transacción firmada por el nodo. Sin `to` es una creación de
    /// contrato. Devuelve el hash.
    pub async fn send_transaction(&self, from: &str, to: Option<&str>, data: &str) -> Result<String, RpcError> {
        let mut tx = json!({ "from": from, "data": data });
        if let Some(to) = to {
            tx["to"] = Value::String(to.to_string());
        }
        self.request("eth_sendTransaction", json!([tx])).await
    }

    /// `None` mientras la transacción no fue minada.
    pub async fn transaction_receipt(&self, hash: &str) -> Result<Option<TransactionReceipt>, RpcError> {
        self.request("eth_getTransactionReceipt", json!([hash])).await
    }

    pub async fn call(&self, to: &str, data: &str) -> Result<String, RpcError> {
        self.request("eth_call", json!([{ "to": to, "data": data }, "latest"])).await
    }
}
