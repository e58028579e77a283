use std::time::Duration;
use url::Url;

use crate::strategy::Strategy;
use crate::types::{DispatchSettings, LogLevel, NetworkConfig, NetworkId};
use crate::{FallbackError, Result};

#[derive(Debug, Clone)]
pub struct NormalizedConfig {
    /// The network these endpoints serve
    pub network_id: NetworkId,
    /// Human readable name used in log fields
    pub network_name: String,
    /// Candidate endpoints, deduplicated, in configured order
    pub rpc_urls: Vec<Url>,
    /// How endpoints are raced at setup
    pub strategy: Strategy,
    /// Per-endpoint in-flight budget
    pub max_concurrency: usize,
    /// Level used for handler lifecycle events
    pub log_level: LogLevel,
    /// Timeouts for probing and calling endpoints
    pub timeouts: TimeoutConfig,
    /// Retry, admission and release policy
    pub dispatch: DispatchConfig,
}

#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Bound on a single liveness probe
    pub probe: Duration,
    /// Bound on a single RPC call
    pub call: Duration,
}

#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub max_attempts: u32,
    pub use_top_n: usize,
    pub release_delay: Duration,
    /// `None` waits without bound
    pub deadline: Option<Duration>,
    /// `None` never demotes a failing endpoint
    pub degrade_after_failures: Option<u32>,
    pub degraded_cooldown: Duration,
}

impl From<&DispatchSettings> for DispatchConfig {
    fn from(settings: &DispatchSettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            use_top_n: settings.use_top_n,
            release_delay: Duration::from_millis(settings.release_delay_ms),
            deadline: (settings.dispatch_deadline_ms > 0)
                .then(|| Duration::from_millis(settings.dispatch_deadline_ms)),
            degrade_after_failures: (settings.degrade_after_failures > 0)
                .then_some(settings.degrade_after_failures),
            degraded_cooldown: Duration::from_millis(settings.degraded_cooldown_ms),
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self::from(&DispatchSettings::default())
    }
}

impl DispatchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.use_top_n == 0 {
            return Err(FallbackError::InvalidConfig("use_top_n must be at least 1".into()));
        }
        Ok(())
    }
}

pub fn resolve_config(config: NetworkConfig) -> Result<NormalizedConfig> {
    if config.rpc_urls.is_empty() {
        return Err(FallbackError::InvalidConfig(format!(
            "network {} has no rpc urls",
            config.network_id
        )));
    }
    if config.max_concurrency == 0 {
        return Err(FallbackError::InvalidConfig("max_concurrency must be at least 1".into()));
    }
    if config.probe_timeout_ms == 0 || config.call_timeout_ms == 0 {
        return Err(FallbackError::InvalidConfig("timeouts must be non-zero".into()));
    }

    let dispatch = DispatchConfig::from(&config.dispatch);
    dispatch.validate()?;

    let mut rpc_urls: Vec<Url> = Vec::with_capacity(config.rpc_urls.len());
    for url in config.rpc_urls {
        if !rpc_urls.contains(&url) {
            rpc_urls.push(url);
        }
    }

    let network_name = if config.network_name.is_empty() {
        format!("network-{}", config.network_id)
    } else {
        config.network_name
    };

    Ok(NormalizedConfig {
        network_id: config.network_id,
        network_name,
        rpc_urls,
        strategy: config.strategy,
        max_concurrency: config.max_concurrency,
        log_level: config.log_level,
        timeouts: TimeoutConfig {
            probe: Duration::from_millis(config.probe_timeout_ms),
            call: Duration::from_millis(config.call_timeout_ms),
        },
        dispatch,
    })
}
