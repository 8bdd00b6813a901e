//! Ethereum JSON-RPC chain client.
//!
//! Simulation is an `eth_call` against the public RPC endpoint. Submission
//! is an `eth_sendTransaction` to the signer endpoint, which holds the agent
//! key; this process never handles private key material.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use bioverify_core::abi;
use bioverify_core::{AdapterError, ChainClient, ContractCall};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::http::{ensure_success, json_body, transport};

pub struct JsonRpcChain {
    rpc_url: String,
    signer_url: String,
    client: reqwest::Client,
    next_id: AtomicU64,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

impl JsonRpcChain {
    pub fn new(rpc_url: impl Into<String>, signer_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            signer_url: signer_url.into(),
            client,
            next_id: AtomicU64::new(1),
        }
    }

    async fn call(&self, url: &str, method: &str, params: Value) -> Result<Value, AdapterError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params});
        debug!(method, id, "json-rpc request");

        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport(method, e))?;
        let body: RpcResponse = json_body(method, ensure_success(method, response)?).await?;
        into_result(body)
    }
}

fn into_result(body: RpcResponse) -> Result<Value, AdapterError> {
    if let Some(err) = body.error {
        return Err(AdapterError::Rpc {
            code: err.code,
            message: err.message,
        });
    }
    body.result.ok_or_else(|| AdapterError::Rpc {
        code: -32603,
        message: "response has neither result nor error".into(),
    })
}

/// Transaction object shared by `eth_call` and `eth_sendTransaction`.
pub fn transaction_object(call: &ContractCall) -> Value {
    json!({
        "from": call.from.as_str(),
        "to": call.to.as_str(),
        "data": format!("0x{}", hex::encode(&call.data)),
    })
}

fn hex_result(method: &str, value: &Value) -> Result<String, AdapterError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| AdapterError::Decode {
            target: method.to_string(),
            message: format!("expected a hex string, got {value}"),
        })
}

#[async_trait]
impl ChainClient for JsonRpcChain {
    async fn simulate(&self, call: &ContractCall) -> Result<Vec<u8>, AdapterError> {
        let result = self
            .call(&self.rpc_url, "eth_call", json!([transaction_object(call), "latest"]))
            .await?;
        let raw = hex_result("eth_call", &result)?;
        abi::decode_hex(&raw).map_err(|e| AdapterError::Decode {
            target: "eth_call".into(),
            message: e.to_string(),
        })
    }

    async fn submit(&self, call: &ContractCall) -> Result<String, AdapterError> {
        let result = self
            .call(&self.signer_url, "eth_sendTransaction", json!([transaction_object(call)]))
            .await?;
        hex_result("eth_sendTransaction", &result)
    }
}
