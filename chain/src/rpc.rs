//! JSON-RPC adapter for the chain node.
//!
//! Speaks bitcoin-style JSON-RPC 1.0 over HTTP with basic auth. Multi-word
//! commands such as `gobject list` are sent as method `gobject` with the
//! remaining words as string parameters, matching the node's CLI.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use sentinel_types::{GovHash, GovernanceObject};

use crate::parse::{parse_masternode, parse_vin, testnet_flag};
use crate::{ChainClient, ChainError, MasternodeEntry, RemoteObject, VoteOutcome, VoteSignal};

/// Connection settings for the node's RPC interface.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Base URL, e.g. `http://127.0.0.1:19998`.
    pub url: String,
    pub user: String,
    pub password: String,
    pub timeout_secs: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:9998".to_string(),
            user: String::new(),
            password: String::new(),
            timeout_secs: 30,
        }
    }
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: &'static str,
    method: &'a str,
    params: Vec<Value>,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// One entry of `gobject list`.
#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GobjectRecord {
    #[serde(default)]
    name: String,
    data_hex: String,
    hash: String,
    #[serde(default)]
    collateral_hash: String,
    #[serde(default)]
    absolute_yes_count: i64,
    #[serde(default)]
    yes_count: i64,
    #[serde(default)]
    no_count: i64,
}

/// HTTP client for the chain node.
#[derive(Clone)]
pub struct RpcChainClient {
    http: reqwest::Client,
    config: RpcConfig,
}

impl RpcChainClient {
    pub fn new(config: RpcConfig) -> Result<Self, ChainError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ChainError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Run a node command and return its `result` field.
    async fn rpc_call(&self, command: &str, args: Vec<Value>) -> Result<Value, ChainError> {
        let mut words = command.split_whitespace();
        let method = words
            .next()
            .ok_or_else(|| ChainError::InvalidResponse("empty RPC command".into()))?;
        let mut params: Vec<Value> = words.map(|w| Value::String(w.to_string())).collect();
        params.extend(args);

        let request = RpcRequest {
            jsonrpc: "1.0",
            id: "sentinel",
            method,
            params,
        };
        tracing::trace!(command, "rpc call");

        let response = self
            .http
            .post(&self.config.url)
            .basic_auth(&self.config.user, Some(&self.config.password))
            .json(&request)
            .send()
            .await
            .map_err(|e| ChainError::Transport(format!("request failed: {e}")))?;

        // The node reports command errors as HTTP 500 with a JSON body.
        let status = response.status();
        let body: RpcResponse = match response.json().await {
            Ok(body) => body,
            Err(e) if status.is_success() => {
                return Err(ChainError::InvalidResponse(format!("invalid JSON response: {e}")))
            }
            Err(_) => return Err(ChainError::Transport(format!("node returned HTTP {status}"))),
        };

        if let Some(err) = body.error {
            return Err(ChainError::Rejected(format!("{} (code {})", err.message, err.code)));
        }
        Ok(body.result)
    }

    async fn text_call(&self, command: &str, args: Vec<Value>) -> Result<String, ChainError> {
        Ok(reply_text(self.rpc_call(command, args).await?))
    }
}

/// Render an RPC result the way the node's CLI prints it.
fn reply_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Arguments shared by `gobject prepare` and `gobject submit`.
fn object_args(object: &GovernanceObject) -> Vec<Value> {
    let parent = if object.parent_hash.is_zero() {
        "0".to_string()
    } else {
        object.parent_hash.to_string()
    };
    vec![
        Value::String(parent),
        Value::String(object.revision.to_string()),
        Value::String(object.creation_time.as_secs().to_string()),
        Value::String(object.name.clone()),
        Value::String(object.data_hex.clone()),
    ]
}

fn decode_gobject(record: GobjectRecord) -> Option<RemoteObject> {
    let hash = match GovHash::from_hex(&record.hash) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::warn!(hash = %record.hash, error = %e, "skipping object with malformed hash");
            return None;
        }
    };
    Some(RemoteObject {
        name: record.name,
        hash,
        collateral_hash: GovHash::from_hex(&record.collateral_hash).ok(),
        data_hex: record.data_hex,
        absolute_yes_count: record.absolute_yes_count,
        yes_count: record.yes_count,
        no_count: record.no_count,
    })
}

impl ChainClient for RpcChainClient {
    async fn block_count(&self) -> Result<u64, ChainError> {
        let value = self.rpc_call("getblockcount", Vec::new()).await?;
        value
            .as_u64()
            .ok_or_else(|| ChainError::InvalidResponse(format!("block count {value}")))
    }

    async fn block_hash(&self, height: u64) -> Result<String, ChainError> {
        self.text_call("getblockhash", vec![Value::from(height)]).await
    }

    async fn masternodes(&self) -> Result<Vec<MasternodeEntry>, ChainError> {
        let value = self.rpc_call("masternodelist full", Vec::new()).await?;
        let roster: BTreeMap<String, String> = serde_json::from_value(value)
            .map_err(|e| ChainError::InvalidResponse(format!("masternode list: {e}")))?;
        Ok(roster
            .iter()
            .map(|(identity, line)| parse_masternode(identity, line))
            .collect())
    }

    async fn self_identity(&self) -> Result<Option<String>, ChainError> {
        let value = match self.rpc_call("masternode status", Vec::new()).await {
            Ok(value) => value,
            // A plain node answers with "not a masternode".
            Err(ChainError::Rejected(msg)) => {
                tracing::debug!(reason = %msg, "node has no masternode identity");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        Ok(value.get("vin").and_then(Value::as_str).and_then(parse_vin))
    }

    async fn governance_objects(&self) -> Result<Vec<RemoteObject>, ChainError> {
        let value = self.rpc_call("gobject list", Vec::new()).await?;
        let records: BTreeMap<String, GobjectRecord> = serde_json::from_value(value)
            .map_err(|e| ChainError::InvalidResponse(format!("gobject list: {e}")))?;
        Ok(records.into_values().filter_map(decode_gobject).collect())
    }

    async fn prepare(&self, object: &GovernanceObject) -> Result<String, ChainError> {
        self.text_call("gobject prepare", object_args(object)).await
    }

    async fn submit(&self, fee_tx: &GovHash, object: &GovernanceObject) -> Result<String, ChainError> {
        let mut args = vec![Value::String(fee_tx.to_string())];
        args.extend(object_args(object));
        self.text_call("gobject submit", args).await
    }

    async fn vote(
        &self,
        hash: &GovHash,
        signal: VoteSignal,
        outcome: VoteOutcome,
    ) -> Result<String, ChainError> {
        let args = vec![
            Value::String(hash.to_string()),
            Value::String(signal.to_string()),
            Value::String(outcome.to_string()),
        ];
        self.text_call("gobject vote-conf", args).await
    }

    async fn is_testnet(&self) -> Result<Option<bool>, ChainError> {
        let value = self.rpc_call("getinfo", Vec::new()).await?;
        Ok(match &value {
            Value::Object(map) => map.get("testnet").and_then(Value::as_bool),
            Value::String(text) => testnet_flag(text),
            _ => None,
        })
    }
}
