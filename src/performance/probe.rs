use std::future::Future;

use async_trait::async_trait;
use url::Url;

use crate::jsonrpc::{parse_quantity, JsonRpcRequest, JsonRpcResponse};

/// Liveness check used when racing endpoints.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn is_live(&self, url: &Url) -> bool;
}

/// Asks the endpoint for the current chain height. The endpoint is live when
/// it answers 2xx with a well-formed block number.
#[derive(Debug, Clone, Default)]
pub struct BlockNumberProbe {
    client: reqwest::Client,
}

impl BlockNumberProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Probe for BlockNumberProbe {
    async fn is_live(&self, url: &Url) -> bool {
        let request = JsonRpcRequest::block_number(1);

        let response = match self.client.post(url.clone()).json(&request).send().await {
            Ok(resp) if resp.status().is_success() => resp,
            Ok(resp) => {
                tracing::debug!(url = %url, status = resp.status().as_u16(), "probe rejected");
                return false;
            }
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "probe request failed");
                return false;
            }
        };

        match response.json::<JsonRpcResponse<serde_json::Value>>().await {
            Ok(body) => body
                .into_result()
                .and_then(|height| parse_quantity(&height))
                .is_ok(),
            Err(_) => false,
        }
    }
}

/// Adapts an async closure into a [`Probe`].
pub struct FnProbe<F>(pub F);

#[async_trait]
impl<F, Fut> Probe for FnProbe<F>
where
    F: Fn(Url) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = bool> + Send + 'static,
{
    async fn is_live(&self, url: &Url) -> bool {
        (self.0)(url.clone()).await
    }
}
