use async_trait::async_trait;

use super::errors::ConnectionError;

/// Connection parameters that already passed the required-field checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub region: Option<String>,
    pub endpoint_url: String,
    pub identity: String,
    pub credential: String,
    pub project: String,
    pub domain: String,
}

/// A client able to prove that a cloud accepts a set of credentials.
///
/// `probe` makes exactly one attempt and never retries.
#[async_trait]
pub trait CloudClient: Send + Sync {
    async fn probe(&self, params: &ConnectionParams) -> Result<(), ConnectionError>;
}
