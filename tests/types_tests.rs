use fallback_rpc::*;
use serde_json::json;
use std::time::Duration;

fn url(s: &str) -> url::Url { s.parse().unwrap() }

#[test]
fn test_dispatch_settings_default() {
    let d = DispatchSettings::default();
    assert_eq!(d.max_attempts, 2);
    assert_eq!(d.use_top_n, 3);
    assert_eq!(d.release_delay_ms, 1000);
    assert_eq!(d.dispatch_deadline_ms, 30000);
    assert_eq!(d.degrade_after_failures, 3);
}

#[test]
fn test_log_level_defaults_to_info() {
    assert_eq!(LogLevel::default(), LogLevel::Info);
    let parsed: LogLevel = serde_json::from_value(json!("warn")).unwrap();
    assert_eq!(parsed, LogLevel::Warn);
}

#[test]
fn test_network_config_from_json_fills_defaults() {
    let raw = json!({
        "network_id": 250,
        "network_name": "Fantom Opera",
        "rpc_urls": ["https://rpc.ankr.com/fantom", "https://rpc.ftm.tools"],
        "strategy": "fastest",
        "dispatch": { "max_attempts": 4 }
    })
    .to_string();

    let cfg = NetworkConfig::from_json_str(&raw).unwrap();
    assert_eq!(cfg.network_id, 250);
    assert_eq!(cfg.rpc_urls.len(), 2);
    assert_eq!(cfg.strategy, Strategy::Fastest);
    assert_eq!(cfg.log_level, LogLevel::Info);
    assert_eq!(cfg.max_concurrency, 4);
    assert_eq!(cfg.dispatch.max_attempts, 4);
    assert_eq!(cfg.dispatch.use_top_n, 3);
}

#[test]
fn test_malformed_config_is_serialization_error() {
    let err = NetworkConfig::from_json_str("{\"network_id\": 1}").unwrap_err();
    assert!(matches!(err, FallbackError::SerializationError(_)));
}

#[test]
fn test_resolve_config_converts_and_dedupes() {
    let mut cfg = NetworkConfig::new(1, vec![url("https://a.example"), url("https://b.example"), url("https://a.example")]);
    cfg.dispatch.dispatch_deadline_ms = 0;
    cfg.dispatch.degrade_after_failures = 0;
    cfg.dispatch.release_delay_ms = 250;

    let normalized = resolve_config(cfg).unwrap();
    assert_eq!(normalized.rpc_urls, vec![url("https://a.example"), url("https://b.example")]);
    assert_eq!(normalized.network_name, "network-1");
    assert_eq!(normalized.dispatch.deadline, None);
    assert_eq!(normalized.dispatch.degrade_after_failures, None);
    assert_eq!(normalized.dispatch.release_delay, Duration::from_millis(250));
    assert_eq!(normalized.timeouts.probe, Duration::from_millis(3000));
}

#[test]
fn test_resolve_config_rejects_bad_budgets() {
    assert!(matches!(resolve_config(NetworkConfig::new(1, vec![])), Err(FallbackError::InvalidConfig(_))));

    let mut zero_concurrency = NetworkConfig::new(1, vec![url("https://a.example")]);
    zero_concurrency.max_concurrency = 0;
    assert!(matches!(resolve_config(zero_concurrency), Err(FallbackError::InvalidConfig(_))));

    let mut zero_top_n = NetworkConfig::new(1, vec![url("https://a.example")]);
    zero_top_n.dispatch.use_top_n = 0;
    assert!(matches!(resolve_config(zero_top_n), Err(FallbackError::InvalidConfig(_))));
}

#[test]
fn test_latency_record_serialization_roundtrip() {
    let record = LatencyRecord { latency_ms: 42, last_tested: std::time::SystemTime::now(), failure_count: 1 };
    let json = serde_json::to_string(&record).unwrap();
    let deser: LatencyRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(deser.latency_ms, 42);
    assert_eq!(deser.failure_count, 1);
}

#[test]
fn test_root_cause_unwraps_attempt_errors() {
    let err = FallbackError::AllAttemptsExhausted {
        attempts: 3,
        source: Box::new(FallbackError::EndpointCallFailed {
            url: "https://a.example/".into(),
            attempt: 2,
            source: Box::new(FallbackError::HttpStatus { url: "https://a.example/".into(), status: 429 }),
        }),
    };
    assert!(matches!(err.root_cause(), FallbackError::HttpStatus { status: 429, .. }));
}
