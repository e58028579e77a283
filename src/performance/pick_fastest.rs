use url::Url;

use crate::LatencyRecord;

pub fn pick_fastest(latencies: &[(Url, LatencyRecord)]) -> Option<Url> {
    latencies
        .iter()
        .min_by_key(|(_, record)| record.latency_ms)
        .map(|(url, _)| url.clone())
}

/// Stable sort so equal latencies keep their completion order.
pub fn order_fastest(latencies: &mut [(Url, LatencyRecord)]) {
    latencies.sort_by_key(|(_, record)| record.latency_ms);
}
