use std::sync::Arc;

use serde::Serialize;

use crate::dispatch::Endpoint;
use crate::{FallbackError, HealthState, Result};

/// Point-in-time view of one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointSnapshot {
    pub url: String,
    pub max_concurrency: usize,
    pub in_flight: usize,
    pub health: HealthState,
}

/// Endpoints in fastest-first order. The order is fixed for the lifetime of
/// the set.
#[derive(Debug, Clone)]
pub struct EndpointSet {
    endpoints: Vec<Arc<Endpoint>>,
}

impl EndpointSet {
    pub fn new(endpoints: Vec<Endpoint>) -> Result<Self> {
        if endpoints.is_empty() {
            return Err(FallbackError::InvalidConfig("endpoint set is empty".into()));
        }
        Ok(Self {
            endpoints: endpoints.into_iter().map(Arc::new).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Endpoint>> {
        self.endpoints.get(index)
    }

    /// The fastest endpoint. A set is never empty.
    pub fn first(&self) -> &Arc<Endpoint> {
        &self.endpoints[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Endpoint>> {
        self.endpoints.iter()
    }

    /// The `top_n` fastest endpoints; nothing ranked below them is ever used.
    pub fn candidates(&self, top_n: usize) -> &[Arc<Endpoint>] {
        &self.endpoints[..top_n.min(self.endpoints.len())]
    }

    pub fn snapshot(&self) -> Vec<EndpointSnapshot> {
        self.endpoints
            .iter()
            .map(|endpoint| EndpointSnapshot {
                url: endpoint.url().to_string(),
                max_concurrency: endpoint.max_concurrency(),
                in_flight: endpoint.in_flight(),
                health: endpoint.health().state(),
            })
            .collect()
    }

    pub fn close(&self) {
        for endpoint in &self.endpoints {
            endpoint.close();
        }
    }
}
