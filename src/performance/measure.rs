use std::time::{Duration, Instant, SystemTime};

use tokio::time::timeout;
use url::Url;

use crate::performance::Probe;
use crate::{FallbackError, LatencyRecord, Result};

/// Run one probe under `limit` and time it.
pub async fn measure_probe(probe: &dyn Probe, url: &Url, limit: Duration) -> Result<LatencyRecord> {
    let start = Instant::now();

    match timeout(limit, probe.is_live(url)).await {
        Ok(true) => Ok(LatencyRecord {
            latency_ms: start.elapsed().as_millis() as u64,
            last_tested: SystemTime::now(),
            failure_count: 0,
        }),
        Ok(false) => Err(FallbackError::ProbeFailed { url: url.to_string() }),
        Err(_) => Err(FallbackError::Timeout {
            duration_ms: limit.as_millis() as u64,
        }),
    }
}
