use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use url::Url;

use crate::performance::{measure_probe, Probe};
use crate::{FallbackError, Result};

/// Probe every candidate at once and return the first one to prove itself live.
///
/// A failed or timed-out probe never wins and never ends the race early; the
/// race only fails once every probe has failed. Probes still running when a
/// winner is found are dropped.
pub async fn race_fastest(urls: &[Url], probe: &dyn Probe, timeout_per_probe: Duration) -> Result<Url> {
    let mut pending: FuturesUnordered<_> = urls
        .iter()
        .map(|url| async move { (url, measure_probe(probe, url, timeout_per_probe).await) })
        .collect();

    while let Some((url, result)) = pending.next().await {
        match result {
            Ok(record) => {
                tracing::debug!(url = %url, latency_ms = record.latency_ms, "race won");
                return Ok(url.clone());
            }
            Err(e) => tracing::debug!(url = %url, error = %e, "probe lost"),
        }
    }

    Err(FallbackError::NoLiveEndpoint { candidates: urls.len() })
}
