use std::sync::Arc;

use dashmap::DashMap;
use url::Url;

use crate::{
    config::{resolve_config, NormalizedConfig},
    dispatch::{BoundedFallbackDispatcher, Endpoint, EndpointSet},
    performance::{pick_fastest, Probe},
    provider::{FallbackProvider, HttpTransport},
    strategy::EndpointRacer,
    LatencyRecord, LogLevel, NetworkConfig, NetworkId, Result,
};

/// Everything one network needs: its raced endpoints and the provider built
/// over them.
pub struct NetworkHandler {
    source: NetworkConfig,
    config: NormalizedConfig,
    latencies: Vec<(Url, LatencyRecord)>,
    provider: FallbackProvider,
}

impl NetworkHandler {
    /// Race the configured URLs and build a dispatcher over the winners.
    pub async fn connect(source: NetworkConfig, probe: Arc<dyn Probe>) -> Result<Self> {
        let config = resolve_config(source.clone())?;
        let racer = EndpointRacer::new(config.strategy, config.timeouts.probe, probe);

        let ranked = match racer.race(&config.rpc_urls).await {
            Ok(ranked) => ranked,
            Err(e) => {
                log(config.log_level, &config.network_name, "-", "no live endpoint, network unavailable");
                return Err(e);
            }
        };

        let client = reqwest::Client::new();
        let endpoints = ranked
            .iter()
            .map(|(url, _)| {
                let transport = HttpTransport::with_client(url.clone(), config.timeouts.call, client.clone());
                Endpoint::new(Arc::new(transport), config.max_concurrency)
            })
            .collect::<Result<Vec<_>>>()?;

        let handler = Self::assemble(source, config, endpoints, ranked)?;
        if let Some(fastest) = handler.fastest_rpc() {
            log(
                handler.config.log_level,
                &handler.config.network_name,
                fastest.as_str(),
                "network ready",
            );
        }
        Ok(handler)
    }

    /// Build over endpoints that were chosen elsewhere, skipping the race.
    pub fn from_endpoints(source: NetworkConfig, endpoints: Vec<Endpoint>) -> Result<Self> {
        let config = resolve_config(source.clone())?;
        Self::assemble(source, config, endpoints, Vec::new())
    }

    fn assemble(
        source: NetworkConfig,
        config: NormalizedConfig,
        endpoints: Vec<Endpoint>,
        latencies: Vec<(Url, LatencyRecord)>,
    ) -> Result<Self> {
        let dispatcher = BoundedFallbackDispatcher::new(EndpointSet::new(endpoints)?, config.dispatch.clone())?
            .with_network_name(config.network_name.clone());

        Ok(Self {
            source,
            config,
            latencies,
            provider: FallbackProvider::new(Arc::new(dispatcher)),
        })
    }

    pub fn network_id(&self) -> NetworkId {
        self.config.network_id
    }

    pub fn network_name(&self) -> &str {
        &self.config.network_name
    }

    pub fn config(&self) -> &NormalizedConfig {
        &self.config
    }

    pub fn provider(&self) -> &FallbackProvider {
        &self.provider
    }

    pub fn dispatcher(&self) -> &Arc<BoundedFallbackDispatcher> {
        self.provider.dispatcher()
    }

    /// Probe results from setup, fastest first. Empty when built without racing.
    pub fn latencies(&self) -> &[(Url, LatencyRecord)] {
        &self.latencies
    }

    pub fn fastest_rpc(&self) -> Option<Url> {
        pick_fastest(&self.latencies)
    }

    /// Fail any dispatch still waiting for a slot. Calls already running finish.
    pub fn shutdown(&self) {
        self.dispatcher().endpoints().close();
    }
}

impl std::fmt::Debug for NetworkHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkHandler")
            .field("network_id", &self.config.network_id)
            .field("network_name", &self.config.network_name)
            .field("endpoints", &self.dispatcher().endpoints().len())
            .finish()
    }
}

/// Handlers keyed by network, each replaceable on reconfiguration.
pub struct NetworkRegistry {
    handlers: DashMap<NetworkId, Arc<NetworkHandler>>,
    probe: Arc<dyn Probe>,
}

impl NetworkRegistry {
    pub fn new(probe: Arc<dyn Probe>) -> Self {
        Self {
            handlers: DashMap::new(),
            probe,
        }
    }

    pub async fn connect(&self, config: NetworkConfig) -> Result<Arc<NetworkHandler>> {
        let handler = Arc::new(NetworkHandler::connect(config, Arc::clone(&self.probe)).await?);
        self.insert(Arc::clone(&handler));
        Ok(handler)
    }

    /// Re-race a known network from the configuration it was built with. The old
    /// handler keeps serving until the new one is in place.
    pub async fn reconfigure(&self, network_id: NetworkId) -> Result<Option<Arc<NetworkHandler>>> {
        let Some(source) = self.handlers.get(&network_id).map(|h| h.source.clone()) else {
            return Ok(None);
        };
        self.connect(source).await.map(Some)
    }

    pub fn insert(&self, handler: Arc<NetworkHandler>) {
        if let Some(previous) = self.handlers.insert(handler.network_id(), handler) {
            previous.shutdown();
        }
    }

    pub fn get(&self, network_id: NetworkId) -> Option<Arc<NetworkHandler>> {
        self.handlers.get(&network_id).map(|h| Arc::clone(h.value()))
    }

    pub fn remove(&self, network_id: NetworkId) -> Option<Arc<NetworkHandler>> {
        let (_, handler) = self.handlers.remove(&network_id)?;
        handler.shutdown();
        Some(handler)
    }

    pub fn network_ids(&self) -> Vec<NetworkId> {
        let mut ids: Vec<NetworkId> = self.handlers.iter().map(|entry| *entry.key()).collect();
        ids.sort_unstable();
        ids
    }
}

fn log(level: LogLevel, network: &str, url: &str, msg: &str) {
    match level {
        LogLevel::Info => tracing::info!(network = %network, url = %url, "{msg}"),
        LogLevel::Error => tracing::error!(network = %network, url = %url, "{msg}"),
        LogLevel::Debug => tracing::debug!(network = %network, url = %url, "{msg}"),
        LogLevel::Trace => tracing::trace!(network = %network, url = %url, "{msg}"),
        LogLevel::Warn => tracing::warn!(network = %network, url = %url, "{msg}"),
    }
}
