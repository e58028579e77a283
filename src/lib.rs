pub mod config;
pub mod dispatch;
pub mod error;
pub mod handler;
pub mod jsonrpc;
pub mod performance;
pub mod provider;
pub mod strategy;
pub mod types;

pub use error::{FallbackError, Result};
pub use handler::{NetworkHandler, NetworkRegistry};
pub use jsonrpc::{BlockTag, CallRequest, JsonRpcRequest, JsonRpcResponse, JsonRpcError};
pub use types::{
    NetworkId, NetworkName, LogLevel, HealthState,
    LatencyRecord, NetworkConfig, DispatchSettings
};

// Re-export commonly used items
pub use config::{NormalizedConfig, DispatchConfig, resolve_config};
pub use dispatch::{BoundedFallbackDispatcher, Endpoint, EndpointSet, EndpointSnapshot};
pub use performance::{BlockNumberProbe, FnProbe, Probe};
pub use provider::{FallbackProvider, HttpTransport, Provider, RpcTransport};
pub use strategy::{EndpointRacer, Strategy, race_fastest, rank_fastest};
