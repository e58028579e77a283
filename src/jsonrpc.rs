use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{FallbackError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Value,
    pub id: u64
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            method: method.into(),
            params,
            id,
        }
    }

    pub fn block_number(id: u64) -> Self {
        Self::new(id, "eth_blockNumber", Value::Array(vec![]))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse<T> {
    pub jsonrpc: String,
    pub result: Option<T>,
    pub error: Option<JsonRpcError>,
    pub id: Option<u64>
}

impl JsonRpcResponse<Value> {
    /// Collapse the envelope into the result or the server-reported error.
    pub fn into_result(self) -> Result<Value> {
        if let Some(err) = self.error {
            return Err(FallbackError::JsonRpc { code: err.code, message: err.message });
        }
        self.result.ok_or(FallbackError::MissingResult)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    pub data: Option<Value>,
}

/// Block reference appended to read calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockTag {
    Latest,
    Earliest,
    Pending,
    Safe,
    Finalized,
    Number(u64),
    Hash(String),
}

impl BlockTag {
    pub fn to_value(&self) -> Value {
        match self {
            BlockTag::Latest => Value::from("latest"),
            BlockTag::Earliest => Value::from("earliest"),
            BlockTag::Pending => Value::from("pending"),
            BlockTag::Safe => Value::from("safe"),
            BlockTag::Finalized => Value::from("finalized"),
            BlockTag::Number(n) => Value::from(format!("{n:#x}")),
            BlockTag::Hash(h) => Value::from(h.clone()),
        }
    }
}

/// A read-only call. It has no side effects, so any endpoint may run it any
/// number of times.
#[derive(Debug, Clone)]
pub struct CallRequest {
    pub method: String,
    pub params: Value,
    pub block: Option<BlockTag>,
}

impl CallRequest {
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self { method: method.into(), params, block: None }
    }

    /// `eth_call` with a transaction object such as `{"to": .., "data": ..}`.
    pub fn eth_call(transaction: Value, block: Option<BlockTag>) -> Self {
        Self {
            method: "eth_call".to_string(),
            params: Value::Array(vec![transaction]),
            block,
        }
    }

    pub fn with_block(mut self, block: BlockTag) -> Self {
        self.block = Some(block);
        self
    }

    pub fn to_jsonrpc(&self, id: u64) -> JsonRpcRequest {
        let params = match (&self.params, &self.block) {
            (Value::Array(items), Some(block)) => {
                let mut items = items.clone();
                items.push(block.to_value());
                Value::Array(items)
            }
            (params, _) => params.clone(),
        };
        JsonRpcRequest::new(id, self.method.clone(), params)
    }
}

/// Parse a `0x`-prefixed JSON-RPC quantity such as an `eth_blockNumber` result.
pub fn parse_quantity(value: &Value) -> Result<u64> {
    let raw = value
        .as_str()
        .ok_or_else(|| FallbackError::InvalidQuantity(value.to_string()))?;
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .ok_or_else(|| FallbackError::InvalidQuantity(raw.to_string()))?;
    if digits.is_empty() {
        return Err(FallbackError::InvalidQuantity(raw.to_string()));
    }
    u64::from_str_radix(digits, 16).map_err(|_| FallbackError::InvalidQuantity(raw.to_string()))
}
