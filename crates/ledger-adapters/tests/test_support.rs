#![allow(dead_code)]
//! Nodo JSON-RPC falso sobre axum.
//!
//! Mina cada transacción después de `receipt_delay` consultas de recibo; el
//! efecto sobre los contadores sólo es visible desde ese momento.
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use ledger_adapters::abi::{function_signature, selector};
use ledger_adapters::evm::REQUIRED_FUNCTIONS;
use ledger_core::InterfaceSchema;
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const CONTRACT_ADDRESS: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";
pub const ACCOUNT_0: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";
pub const ACCOUNT_1: &str = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8";

pub fn medicine_ledger_abi() -> Value {
    let s = |n: &str| json!({"name": n, "type": "string", "internalType": "string"});
    let u = |n: &str| json!({"name": n, "type": "uint256", "internalType": "uint256"});
    let count = |n: &str| {
        json!({"type": "function", "name": n, "stateMutability": "view", "inputs": [],
               "outputs": [{"name": "", "type": "uint256", "internalType": "uint256"}]})
    };
    json!([
        {"type": "constructor", "inputs": [], "stateMutability": "nonpayable"},
        {"type": "function", "name": "addMedicineStock", "stateMutability": "nonpayable", "outputs": [],
         "inputs": [s("pharmacyName"), s("medicineName"), u("quantity"), u("price")]},
        {"type": "function", "name": "reportShortage", "stateMutability": "nonpayable", "outputs": [],
         "inputs": [s("medicineName"), s("location")]},
        {"type": "function", "name": "placeOrder", "stateMutability": "nonpayable", "outputs": [],
         "inputs": [s("medicineName"), u("quantity"),
                    {"name": "supplier", "type": "address", "internalType": "address"}]},
        {"type": "function", "name": "updateRetailerStock", "stateMutability": "nonpayable", "outputs": [],
         "inputs": [s("medicineName"), u("quantity")]},
        count("getStockCount"),
        count("getShortageCount"),
        count("getOrderCount"),
        {"type": "event", "name": "ShortageReported", "anonymous": false,
         "inputs": [{"name": "medicineName", "type": "string", "indexed": false}]}
    ])
}

struct Mined {
    remaining_polls: u32,
    receipt: Value,
    effect: Option<usize>,
    applied: bool,
}

#[derive(Default)]
struct NodeState {
    txs: HashMap<String, Mined>,
    counters: [u64; 3],
    next_tx: u64,
    sent: Vec<String>,
    send_data: Vec<String>,
    receipt_polls: u64,
}

pub struct FakeNode {
    state: Mutex<NodeState>,
    selectors: HashMap<String, &'static str>,
    pub accounts: Vec<String>,
    pub receipt_delay: u32,
    /// Función cuyo recibo sale con status 0x0.
    pub revert_function: Option<&'static str>,
    /// Función que el nodo rechaza con un error JSON-RPC.
    pub reject_function: Option<&'static str>,
    /// Las transacciones nunca se minan.
    pub never_mine: bool,
}

impl FakeNode {
    pub fn new() -> Self {
        let schema = InterfaceSchema::new(medicine_ledger_abi());
        let selectors = REQUIRED_FUNCTIONS.iter()
                                          .map(|f| {
                                              let sig = function_signature(&schema, f).unwrap();
                                              (hex::encode(selector(&sig)), *f)
                                          })
                                          .collect();
        Self { state: Mutex::new(NodeState::default()),
               selectors,
               accounts: vec![ACCOUNT_0.to_string(), ACCOUNT_1.to_string()],
               receipt_delay: 2,
               revert_function: None,
               reject_function: None,
               never_mine: false }
    }

    pub fn counters(&self) -> [u64; 3] {
        self.state.lock().unwrap().counters
    }

    /// Funciones invocadas por `eth_sendTransaction` ("<create>" para despliegues).
    pub fn sent(&self) -> Vec<String> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn send_data(&self) -> Vec<String> {
        self.state.lock().unwrap().send_data.clone()
    }

    pub fn receipt_polls(&self) -> u64 {
        self.state.lock().unwrap().receipt_polls
    }

    fn function_for(&self, data: &str) -> Option<&'static str> {
        let raw = data.strip_prefix("0x").unwrap_or(data);
        raw.get(..8).and_then(|sel| self.selectors.get(sel).copied())
    }

    fn handle(&self, method: &str, params: &Value) -> Result<Value, (i64, String)> {
        match method {
            "eth_accounts" => Ok(json!(self.accounts)),
            "eth_sendTransaction" => self.send_transaction(&params[0]),
            "eth_getTransactionReceipt" => Ok(self.receipt(params[0].as_str().unwrap_or_default())),
            "eth_call" => self.call(&params[0]),
            other => Err((-32601, format!("method {other} not found"))),
        }
    }

    fn send_transaction(&self, tx: &Value) -> Result<Value, (i64, String)> {
        let data = tx["data"].as_str().unwrap_or_default().to_string();
        let mut st = self.state.lock().unwrap();
        st.next_tx += 1;
        let hash = format!("0x{:064x}", st.next_tx);

        let (name, effect, contract_address) = if tx.get("to").is_none() {
            ("<create>", None, Some(CONTRACT_ADDRESS))
        } else {
            let name = self.function_for(&data)
                           .ok_or((-32000, "execution reverted: unknown selector".to_string()))?;
            let effect = match name {
                "addMedicineStock" => Some(0),
                "reportShortage" => Some(1),
                "placeOrder" => Some(2),
                _ => None,
            };
            (name, effect, None)
        };
        st.sent.push(name.to_string());
        st.send_data.push(data);
        if self.reject_function == Some(name) {
            return Err((-32000, format!("sender doesn't have enough funds to send {name}")));
        }

        let status = if self.revert_function == Some(name) { "0x0" } else { "0x1" };
        let block = st.next_tx;
        let receipt = json!({
            "transactionHash": hash,
            "status": status,
            "contractAddress": contract_address,
            "blockNumber": format!("0x{block:x}"),
            "gasUsed": "0x5208"
        });
        st.txs.insert(hash.clone(),
                      Mined { remaining_polls: if self.never_mine { u32::MAX } else { self.receipt_delay },
                              receipt,
                              effect: if status == "0x1" { effect } else { None },
                              applied: false });
        Ok(json!(hash))
    }

    fn receipt(&self, hash: &str) -> Value {
        let mut st = self.state.lock().unwrap();
        st.receipt_polls += 1;
        let NodeState { txs, counters, .. } = &mut *st;
        let Some(tx) = txs.get_mut(hash) else {
            return Value::Null;
        };
        if tx.remaining_polls > 0 {
            tx.remaining_polls -= 1;
            return Value::Null;
        }
        if let (Some(i), false) = (tx.effect, tx.applied) {
            counters[i] += 1;
            tx.applied = true;
        }
        tx.receipt.clone()
    }

    fn call(&self, tx: &Value) -> Result<Value, (i64, String)> {
        let data = tx["data"].as_str().unwrap_or_default();
        let index = match self.function_for(data) {
            Some("getStockCount") => 0,
            Some("getShortageCount") => 1,
            Some("getOrderCount") => 2,
            _ => return Err((-32000, "execution reverted".to_string())),
        };
        let value = self.state.lock().unwrap().counters[index];
        Ok(json!(format!("0x{value:064x}")))
    }
}

async fn rpc(State(node): State<Arc<FakeNode>>, Json(req): Json<Value>) -> Json<Value> {
    let id = req["id"].clone();
    let method = req["method"].as_str().unwrap_or_default();
    match node.handle(method, &req["params"]) {
        Ok(result) => Json(json!({"jsonrpc": "2.0", "id": id, "result": result})),
        Err((code, message)) => Json(json!({"jsonrpc": "2.0", "id": id, "error": {"code": code, "message": message}})),
    }
}

/// Levanta el nodo en un puerto efímero y devuelve su URL.
pub async fn spawn_node(node: Arc<FakeNode>) -> String {
    let router = Router::new().route("/", post(rpc)).with_state(node);
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind fake node");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    format!("http://{addr}")
}
