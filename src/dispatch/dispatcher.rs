use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Instant,
};

use futures::future::select_all;
use serde_json::Value;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use crate::config::DispatchConfig;
use crate::dispatch::{Endpoint, EndpointLease, EndpointSet};
use crate::jsonrpc::parse_quantity;
use crate::{CallRequest, FallbackError, JsonRpcRequest, Result};

/// Which endpoint a single try of a dispatch landed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchAttempt {
    pub endpoint: usize,
    pub url: String,
    /// 1-based.
    pub attempt: u32,
}

/// Runs read calls against the fastest endpoint with spare capacity, retrying
/// failures on whatever endpoint is available next.
///
/// Selection always scans the first `use_top_n` endpoints in rank order, with
/// demoted endpoints moved behind the rest. When all of them are saturated the
/// call parks on their semaphores until one frees a slot. A dispatch holds at
/// most one slot at a time and every slot is released after the settle delay.
#[derive(Debug)]
pub struct BoundedFallbackDispatcher {
    network_name: String,
    endpoints: EndpointSet,
    config: DispatchConfig,
    next_id: AtomicU64,
}

impl BoundedFallbackDispatcher {
    pub fn new(endpoints: EndpointSet, config: DispatchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            network_name: String::from("unnamed"),
            endpoints,
            config,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn with_network_name(mut self, network_name: impl Into<String>) -> Self {
        self.network_name = network_name.into();
        self
    }

    pub fn network_name(&self) -> &str {
        &self.network_name
    }

    pub fn endpoints(&self) -> &EndpointSet {
        &self.endpoints
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub async fn dispatch(&self, request: CallRequest) -> Result<Value> {
        let Some(deadline) = self.config.deadline else {
            return self.run(&request).await;
        };

        let started = Instant::now();
        match timeout(deadline, self.run(&request)).await {
            Ok(result) => result,
            Err(_) => {
                let elapsed_ms = started.elapsed().as_millis() as u64;
                tracing::warn!(
                    network = %self.network_name,
                    method = %request.method,
                    elapsed_ms,
                    "dispatch deadline exceeded"
                );
                Err(FallbackError::DeadlineExceeded { elapsed_ms })
            }
        }
    }

    /// Like [`dispatch`](Self::dispatch) but gives up as soon as `cancel`
    /// fires. A slot held at that moment is still released after the settle
    /// delay.
    pub async fn dispatch_with_cancel(&self, request: CallRequest, cancel: CancellationToken) -> Result<Value> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(FallbackError::Cancelled),
            result = self.dispatch(request) => result,
        }
    }

    /// Chain height from the fastest endpoint, without admission or retry.
    pub async fn fastest_block_number(&self) -> Result<u64> {
        let request = JsonRpcRequest::block_number(self.next_request_id());
        let height = self.endpoints.first().transport().send(&request).await?;
        parse_quantity(&height)
    }

    async fn run(&self, request: &CallRequest) -> Result<Value> {
        let mut attempt = 0u32;

        loop {
            let (index, endpoint, lease) = self.admit().await?;
            let current = DispatchAttempt {
                endpoint: index,
                url: endpoint.url().to_string(),
                attempt: attempt + 1,
            };

            let payload = request.to_jsonrpc(self.next_request_id());
            let result = endpoint.transport().send(&payload).await;
            drop(lease);

            match result {
                Ok(value) => {
                    endpoint.health().record_success();
                    tracing::debug!(
                        network = %self.network_name,
                        url = %current.url,
                        endpoint = current.endpoint,
                        attempt = current.attempt,
                        "call succeeded"
                    );
                    return Ok(value);
                }
                Err(e) => {
                    let demoted = endpoint
                        .health()
                        .record_failure(self.config.degrade_after_failures, self.config.degraded_cooldown);
                    tracing::warn!(
                        network = %self.network_name,
                        url = %current.url,
                        endpoint = current.endpoint,
                        attempt = current.attempt,
                        demoted,
                        error = %e,
                        "endpoint call failed"
                    );

                    let failed = FallbackError::EndpointCallFailed {
                        url: current.url,
                        attempt: current.attempt,
                        source: Box::new(e),
                    };

                    if attempt < self.config.max_attempts {
                        attempt += 1;
                        continue;
                    }

                    return Err(FallbackError::AllAttemptsExhausted {
                        attempts: attempt + 1,
                        source: Box::new(failed),
                    });
                }
            }
        }
    }

    /// Rank order within the top N, demoted endpoints last.
    fn admission_order(&self) -> Vec<usize> {
        let top = self.endpoints.candidates(self.config.use_top_n);
        let (mut order, demoted): (Vec<usize>, Vec<usize>) =
            (0..top.len()).partition(|&i| !top[i].health().is_degraded());
        order.extend(demoted);
        order
    }

    async fn admit(&self) -> Result<(usize, &Arc<Endpoint>, EndpointLease)> {
        let top = self.endpoints.candidates(self.config.use_top_n);
        let order = self.admission_order();
        let release_delay = self.config.release_delay;

        for &index in &order {
            if let Some(lease) = top[index].try_lease(release_delay)? {
                return Ok((index, &top[index], lease));
            }
        }

        tracing::trace!(
            network = %self.network_name,
            candidates = order.len(),
            "all candidates saturated, waiting for a slot"
        );

        let waits = order.iter().map(|&index| {
            let endpoint = &top[index];
            Box::pin(async move { (index, endpoint.lease(release_delay).await) })
        });
        let ((index, lease), _, _) = select_all(waits).await;
        Ok((index, &top[index], lease?))
    }

    fn next_request_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}
