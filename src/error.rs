#[derive(Debug, thiserror::Error)]
pub enum FallbackError {
    #[error("None of {candidates} candidate endpoints is live")]
    NoLiveEndpoint { candidates: usize },

    #[error("Liveness probe failed for {url}")]
    ProbeFailed { url: String },

    #[error("Call to {url} failed on attempt {attempt}: {source}")]
    EndpointCallFailed {
        url: String,
        attempt: u32,
        #[source]
        source: Box<FallbackError>,
    },

    #[error("All {attempts} attempts failed: {source}")]
    AllAttemptsExhausted {
        attempts: u32,
        #[source]
        source: Box<FallbackError>,
    },

    #[error("{operation} is not implemented by this provider")]
    NotImplemented { operation: &'static str },

    #[error("Dispatch deadline exceeded after {elapsed_ms}ms")]
    DeadlineExceeded { elapsed_ms: u64 },

    #[error("Endpoint {url} was closed")]
    EndpointClosed { url: String },

    #[error("Dispatch cancelled")]
    Cancelled,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON-RPC error {code}: {message}")]
    JsonRpc { code: i64, message: String },

    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("JSON-RPC response carried neither result nor error")]
    MissingResult,

    #[error("Invalid hex quantity: {0}")]
    InvalidQuantity(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },
}

impl FallbackError {
    /// The innermost error, looking through attempt and exhaustion wrappers.
    pub fn root_cause(&self) -> &FallbackError {
        match self {
            FallbackError::EndpointCallFailed { source, .. }
            | FallbackError::AllAttemptsExhausted { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

impl From<serde_json::Error> for FallbackError {
    fn from(e: serde_json::Error) -> Self {
        FallbackError::SerializationError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FallbackError>;
