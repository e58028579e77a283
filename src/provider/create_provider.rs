use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::timeout;
use url::Url;

use crate::{JsonRpcRequest, JsonRpcResponse, FallbackError, Result};

/// Carries one JSON-RPC request to one endpoint and returns its `result`.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    fn url(&self) -> &str;

    async fn send(&self, request: &JsonRpcRequest) -> Result<Value>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    url: Url,
    call_timeout: Duration,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(url: Url, call_timeout: Duration) -> Self {
        Self::with_client(url, call_timeout, reqwest::Client::new())
    }

    /// Share one connection pool between every endpoint of a network.
    pub fn with_client(url: Url, call_timeout: Duration, client: reqwest::Client) -> Self {
        Self { url, call_timeout, client }
    }

    async fn exchange(&self, request: &JsonRpcRequest) -> Result<Value> {
        let response = self.client.post(self.url.clone()).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FallbackError::HttpStatus {
                url: self.url.to_string(),
                status: status.as_u16(),
            });
        }

        let body: JsonRpcResponse<Value> = response.json().await?;
        body.into_result()
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    /// The call timeout covers the whole exchange, body included.
    async fn send(&self, request: &JsonRpcRequest) -> Result<Value> {
        timeout(self.call_timeout, self.exchange(request))
            .await
            .map_err(|_| FallbackError::Timeout {
                duration_ms: self.call_timeout.as_millis() as u64,
            })?
    }
}
