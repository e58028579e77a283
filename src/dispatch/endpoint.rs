use std::{sync::Arc, time::Duration};

use tokio::sync::{Semaphore, TryAcquireError};

use crate::dispatch::{EndpointHealth, EndpointLease};
use crate::provider::RpcTransport;
use crate::{FallbackError, Result};

/// One RPC server with its own concurrency budget.
///
/// Capacity lives in a semaphore holding `max_concurrency` permits, so the
/// in-flight count can never go below zero or above the budget.
pub struct Endpoint {
    transport: Arc<dyn RpcTransport>,
    max_concurrency: usize,
    permits: Arc<Semaphore>,
    health: EndpointHealth,
}

impl Endpoint {
    pub fn new(transport: Arc<dyn RpcTransport>, max_concurrency: usize) -> Result<Self> {
        if max_concurrency == 0 {
            return Err(FallbackError::InvalidConfig(format!(
                "endpoint {} needs a concurrency budget of at least 1",
                transport.url()
            )));
        }

        Ok(Self {
            transport,
            max_concurrency,
            permits: Arc::new(Semaphore::new(max_concurrency)),
            health: EndpointHealth::default(),
        })
    }

    pub fn url(&self) -> &str {
        self.transport.url()
    }

    pub fn transport(&self) -> &Arc<dyn RpcTransport> {
        &self.transport
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Slots currently held, including those waiting out their settle delay.
    pub fn in_flight(&self) -> usize {
        self.max_concurrency.saturating_sub(self.permits.available_permits())
    }

    pub fn has_capacity(&self) -> bool {
        self.permits.available_permits() > 0
    }

    pub fn health(&self) -> &EndpointHealth {
        &self.health
    }

    pub fn try_lease(&self, release_delay: Duration) -> Result<Option<EndpointLease>> {
        match Arc::clone(&self.permits).try_acquire_owned() {
            Ok(permit) => Ok(Some(EndpointLease::new(permit, release_delay))),
            Err(TryAcquireError::NoPermits) => Ok(None),
            Err(TryAcquireError::Closed) => Err(self.closed()),
        }
    }

    /// Wait for a slot. Cancel-safe: dropping the future gives up its place
    /// in the queue without consuming a permit.
    pub async fn lease(&self, release_delay: Duration) -> Result<EndpointLease> {
        Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map(|permit| EndpointLease::new(permit, release_delay))
            .map_err(|_| self.closed())
    }

    /// Fail every current and future wait for a slot on this endpoint.
    pub fn close(&self) {
        self.permits.close();
    }

    pub fn is_closed(&self) -> bool {
        self.permits.is_closed()
    }

    fn closed(&self) -> FallbackError {
        FallbackError::EndpointClosed { url: self.url().to_string() }
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("url", &self.url())
            .field("max_concurrency", &self.max_concurrency)
            .field("in_flight", &self.in_flight())
            .field("health", &self.health.state())
            .finish()
    }
}
