use thiserror::Error;

/// A central error enum for failures while reaching a cloud endpoint.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("invalid endpoint URL '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    /// DNS, TCP, TLS and timeout failures all land here.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("authentication rejected with status {status}: {body}")]
    Unauthorized { status: u16, body: String },

    #[error("identity service answered with status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("unexpected response from identity service: {0}")]
    UnexpectedResponse(String),

    #[error("region '{0}' not found in service catalog")]
    RegionNotFound(String),
}
