pub mod dispatcher;
pub mod endpoint;
pub mod endpoint_set;
pub mod health;
pub mod lease;

pub use dispatcher::{BoundedFallbackDispatcher, DispatchAttempt};
pub use endpoint::Endpoint;
pub use endpoint_set::{EndpointSet, EndpointSnapshot};
pub use health::EndpointHealth;
pub use lease::EndpointLease;
