use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use url::Url;

use crate::performance::{measure_probe, order_fastest, Probe};
use crate::{FallbackError, LatencyRecord, Result};

/// Probe every candidate and return the live ones, fastest first.
pub async fn rank_fastest(
    urls: &[Url],
    probe: &dyn Probe,
    timeout_per_probe: Duration,
) -> Result<Vec<(Url, LatencyRecord)>> {
    let mut pending: FuturesUnordered<_> = urls
        .iter()
        .map(|url| async move { (url, measure_probe(probe, url, timeout_per_probe).await) })
        .collect();

    let mut live = Vec::with_capacity(urls.len());
    while let Some((url, result)) = pending.next().await {
        match result {
            Ok(record) => live.push((url.clone(), record)),
            Err(e) => tracing::debug!(url = %url, error = %e, "dropping endpoint from ranking"),
        }
    }

    if live.is_empty() {
        return Err(FallbackError::NoLiveEndpoint { candidates: urls.len() });
    }

    order_fastest(&mut live);
    Ok(live)
}
