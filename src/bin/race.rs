use std::{fs, sync::Arc, time::Instant};

use anyhow::Context;
use chrono::Utc;
use fallback_rpc::{BlockNumberProbe, CallRequest, NetworkConfig, NetworkHandler, Provider};
use futures::future::join_all;
use serde::Serialize;

#[derive(Serialize, Clone)]
struct Sample { ms: f64, ok: bool }

fn now_ms(start: Instant) -> f64 { start.elapsed().as_secs_f64() * 1000.0 }

fn stats(samples: &[Sample]) -> serde_json::Value {
    let count = samples.len();
    let success = samples.iter().filter(|s| s.ok).count();
    let mut ok_vals: Vec<f64> = samples.iter().filter(|s| s.ok).map(|s| s.ms).collect();
    if ok_vals.is_empty() {
        return serde_json::json!({"mean": null, "p95": null, "count": count, "success": success});
    }
    ok_vals.sort_by(|a, b| a.total_cmp(b));
    let mean = ok_vals.iter().sum::<f64>() / ok_vals.len() as f64;
    let p95_idx = ((ok_vals.len() as f64) * 0.95).floor() as usize;
    let p95 = ok_vals[p95_idx.min(ok_vals.len() - 1)];
    serde_json::json!({"mean": mean, "p95": p95, "count": count, "success": success})
}

/// Races the endpoints of one network config, then pushes a burst of
/// `eth_chainId` calls through the dispatcher and prints a JSON report.
///
/// Usage: `race <config.json>` (or `NETWORK_CONFIG`), burst size from `BURST`.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("NETWORK_CONFIG").ok())
        .context("pass a network config path or set NETWORK_CONFIG")?;
    let burst: usize = std::env::var("BURST").ok().and_then(|v| v.parse().ok()).unwrap_or(10);

    let raw = fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let config = NetworkConfig::from_json_str(&raw)?;

    let t0 = Instant::now();
    let handler = NetworkHandler::connect(config, Arc::new(BlockNumberProbe::new())).await?;
    let race_ms = now_ms(t0);

    let block_number = handler.provider().get_block_number().await.ok();

    let calls = (0..burst).map(|_| {
        let provider = handler.provider().clone();
        async move {
            let start = Instant::now();
            let result = provider.call(CallRequest::new("eth_chainId", serde_json::json!([]))).await;
            Sample { ms: now_ms(start), ok: result.is_ok() }
        }
    });
    let samples = join_all(calls).await;

    let ranking: Vec<_> = handler
        .latencies()
        .iter()
        .map(|(url, record)| serde_json::json!({"url": url.as_str(), "latency_ms": record.latency_ms}))
        .collect();

    let out = serde_json::json!({
        "generated_at": Utc::now().to_rfc3339(),
        "network_id": handler.network_id(),
        "network": handler.network_name(),
        "race_ms": race_ms,
        "ranking": ranking,
        "block_number": block_number,
        "burst": stats(&samples),
        "endpoints": handler.dispatcher().endpoints().snapshot(),
    });

    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
