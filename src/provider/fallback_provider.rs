use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::dispatch::BoundedFallbackDispatcher;
use crate::provider::Provider;
use crate::{CallRequest, Result};

/// [`Provider`] backed by a [`BoundedFallbackDispatcher`].
///
/// `call` goes through admission, retry and settle-delayed release.
/// `get_block_number` goes straight to the fastest endpoint with none of that.
#[derive(Debug, Clone)]
pub struct FallbackProvider {
    dispatcher: Arc<BoundedFallbackDispatcher>,
}

impl FallbackProvider {
    pub fn new(dispatcher: Arc<BoundedFallbackDispatcher>) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Arc<BoundedFallbackDispatcher> {
        &self.dispatcher
    }

    pub fn network_name(&self) -> &str {
        self.dispatcher.network_name()
    }
}

#[async_trait]
impl Provider for FallbackProvider {
    async fn call(&self, request: CallRequest) -> Result<Value> {
        self.dispatcher.dispatch(request).await
    }

    async fn get_block_number(&self) -> Result<u64> {
        self.dispatcher.fastest_block_number().await
    }
}
