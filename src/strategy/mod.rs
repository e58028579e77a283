pub mod race_fastest;
pub mod rank_fastest;

pub use race_fastest::race_fastest;
pub use rank_fastest::rank_fastest;

use std::{
    sync::Arc,
    time::{Duration, Instant, SystemTime},
};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{performance::Probe, LatencyRecord, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Keep only the first endpoint to answer its probe.
    Fastest,
    /// Keep every live endpoint, fastest first.
    #[default]
    Ranked,
}

/// Turns a list of candidate URLs into the fastest-first order a dispatcher
/// is built over.
#[derive(Clone)]
pub struct EndpointRacer {
    strategy: Strategy,
    probe_timeout: Duration,
    probe: Arc<dyn Probe>,
}

impl EndpointRacer {
    pub fn new(strategy: Strategy, probe_timeout: Duration, probe: Arc<dyn Probe>) -> Self {
        Self { strategy, probe_timeout, probe }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub async fn race(&self, urls: &[Url]) -> Result<Vec<(Url, LatencyRecord)>> {
        match self.strategy {
            Strategy::Fastest => {
                let start = Instant::now();
                let winner = race_fastest(urls, self.probe.as_ref(), self.probe_timeout).await?;
                let record = LatencyRecord {
                    latency_ms: start.elapsed().as_millis() as u64,
                    last_tested: SystemTime::now(),
                    failure_count: 0,
                };
                Ok(vec![(winner, record)])
            }
            Strategy::Ranked => rank_fastest(urls, self.probe.as_ref(), self.probe_timeout).await,
        }
    }
}

impl std::fmt::Debug for EndpointRacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointRacer")
            .field("strategy", &self.strategy)
            .field("probe_timeout", &self.probe_timeout)
            .finish()
    }
}
