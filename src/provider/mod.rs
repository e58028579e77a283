pub mod create_provider;
pub mod fallback_provider;
pub mod traits;

pub use create_provider::{HttpTransport, RpcTransport};
pub use fallback_provider::FallbackProvider;
pub use traits::Provider;
