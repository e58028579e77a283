use serde::{Deserialize, Serialize};
use url::Url;

use crate::strategy::Strategy;

pub type NetworkId = u64;
pub type NetworkName = String;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace
}

/// Health of a single endpoint as seen by the dispatcher.
///
/// `Unknown` until the first call completes. `Degraded` endpoints are tried
/// after every non-degraded candidate but are never excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum HealthState {
    Healthy,
    Degraded,
    Unknown
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LatencyRecord {
    pub latency_ms: u64,
    #[serde(with = "system_time_serde")]
    pub last_tested: std::time::SystemTime,
    pub failure_count: u32
}

/// Static per-network configuration: the candidate endpoints and the budgets
/// the dispatcher enforces over them.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
    pub network_id: NetworkId,
    #[serde(default)]
    pub network_name: NetworkName,
    pub rpc_urls: Vec<Url>,
    #[serde(default = "defaults::max_concurrency")]
    pub max_concurrency: usize,
    #[serde(default = "defaults::probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    #[serde(default = "defaults::call_timeout_ms")]
    pub call_timeout_ms: u64,
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default)]
    pub log_level: LogLevel,
    #[serde(default)]
    pub dispatch: DispatchSettings,
}

impl NetworkConfig {
    pub fn new(network_id: NetworkId, rpc_urls: Vec<Url>) -> Self {
        Self {
            network_id,
            network_name: String::new(),
            rpc_urls,
            max_concurrency: defaults::max_concurrency(),
            probe_timeout_ms: defaults::probe_timeout_ms(),
            call_timeout_ms: defaults::call_timeout_ms(),
            strategy: Strategy::default(),
            log_level: LogLevel::default(),
            dispatch: DispatchSettings::default(),
        }
    }

    pub fn from_json_str(raw: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DispatchSettings {
    /// Retries after the first try, so a call runs at most `max_attempts + 1` times.
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "defaults::use_top_n")]
    pub use_top_n: usize,
    /// Settle delay between a call finishing and its slot being released.
    #[serde(default = "defaults::release_delay_ms")]
    pub release_delay_ms: u64,
    /// Zero disables the deadline.
    #[serde(default = "defaults::dispatch_deadline_ms")]
    pub dispatch_deadline_ms: u64,
    /// Zero disables demotion.
    #[serde(default = "defaults::degrade_after_failures")]
    pub degrade_after_failures: u32,
    #[serde(default = "defaults::degraded_cooldown_ms")]
    pub degraded_cooldown_ms: u64,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            max_attempts: defaults::max_attempts(),
            use_top_n: defaults::use_top_n(),
            release_delay_ms: defaults::release_delay_ms(),
            dispatch_deadline_ms: defaults::dispatch_deadline_ms(),
            degrade_after_failures: defaults::degrade_after_failures(),
            degraded_cooldown_ms: defaults::degraded_cooldown_ms(),
        }
    }
}

mod defaults {
    pub fn max_concurrency() -> usize { 4 }
    pub fn probe_timeout_ms() -> u64 { 3000 }
    pub fn call_timeout_ms() -> u64 { 10000 }
    pub fn max_attempts() -> u32 { 2 }
    pub fn use_top_n() -> usize { 3 }
    pub fn release_delay_ms() -> u64 { 1000 }
    pub fn dispatch_deadline_ms() -> u64 { 30000 }
    pub fn degrade_after_failures() -> u32 { 3 }
    pub fn degraded_cooldown_ms() -> u64 { 30000 }
}

/**
 * SystemTime has no serde impl, so latency records carry it as whole
 * seconds since the Unix epoch.
 */

mod system_time_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::{SystemTime, UNIX_EPOCH};

    pub fn serialize<S: Serializer>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error> {
        let duration = time
            .duration_since(UNIX_EPOCH)
            .map_err(serde::ser::Error::custom)?;
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SystemTime, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok(UNIX_EPOCH + std::time::Duration::from_secs(secs))
    }
}
