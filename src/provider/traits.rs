use async_trait::async_trait;
use serde_json::Value;

use crate::{BlockTag, CallRequest, FallbackError, NetworkId, Result};

/// Read surface handed to the rest of the application, or to a decorator such
/// as a multicall aggregator sitting in front of it.
///
/// Only `call` and `get_block_number` are served. Every other operation fails
/// immediately with [`FallbackError::NotImplemented`] and never touches the
/// network.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn call(&self, request: CallRequest) -> Result<Value>;

    async fn get_block_number(&self) -> Result<u64>;

    async fn get_network(&self) -> Result<NetworkId> {
        Err(FallbackError::NotImplemented { operation: "get_network" })
    }

    async fn get_gas_price(&self) -> Result<u128> {
        Err(FallbackError::NotImplemented { operation: "get_gas_price" })
    }

    async fn get_balance(&self, _address: &str, _block: Option<BlockTag>) -> Result<u128> {
        Err(FallbackError::NotImplemented { operation: "get_balance" })
    }

    async fn get_transaction_count(&self, _address: &str, _block: Option<BlockTag>) -> Result<u64> {
        Err(FallbackError::NotImplemented { operation: "get_transaction_count" })
    }

    async fn get_code(&self, _address: &str, _block: Option<BlockTag>) -> Result<String> {
        Err(FallbackError::NotImplemented { operation: "get_code" })
    }

    async fn get_storage_at(&self, _address: &str, _slot: &str, _block: Option<BlockTag>) -> Result<String> {
        Err(FallbackError::NotImplemented { operation: "get_storage_at" })
    }

    async fn send_transaction(&self, _signed: &str) -> Result<String> {
        Err(FallbackError::NotImplemented { operation: "send_transaction" })
    }

    async fn estimate_gas(&self, _transaction: Value) -> Result<u64> {
        Err(FallbackError::NotImplemented { operation: "estimate_gas" })
    }

    async fn get_block(&self, _block: BlockTag) -> Result<Value> {
        Err(FallbackError::NotImplemented { operation: "get_block" })
    }

    async fn get_transaction(&self, _hash: &str) -> Result<Value> {
        Err(FallbackError::NotImplemented { operation: "get_transaction" })
    }

    async fn get_transaction_receipt(&self, _hash: &str) -> Result<Value> {
        Err(FallbackError::NotImplemented { operation: "get_transaction_receipt" })
    }

    async fn get_logs(&self, _filter: Value) -> Result<Vec<Value>> {
        Err(FallbackError::NotImplemented { operation: "get_logs" })
    }

    async fn resolve_name(&self, _name: &str) -> Result<String> {
        Err(FallbackError::NotImplemented { operation: "resolve_name" })
    }

    async fn lookup_address(&self, _address: &str) -> Result<String> {
        Err(FallbackError::NotImplemented { operation: "lookup_address" })
    }
}
