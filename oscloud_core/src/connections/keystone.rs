use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::json;

use super::cloud_client::{CloudClient, ConnectionParams};
use super::errors::ConnectionError;

const SUBJECT_TOKEN_HEADER: &str = "X-Subject-Token";
const MAX_BODY_IN_ERROR: usize = 200;

/// Bounds for the single probe request so a stalled cloud cannot hang the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeTimeouts {
    pub connect: Duration,
    pub total: Duration,
}

impl Default for ProbeTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(5),
            total: Duration::from_secs(20),
        }
    }
}

/// Talks to the OpenStack Identity v3 API.
///
/// A probe succeeds when Keystone issues a project-scoped token for the given
/// user and, if a region was requested, the returned service catalog has at
/// least one endpoint in that region.
#[derive(Debug, Clone)]
pub struct KeystoneClient {
    client: Client,
}

impl KeystoneClient {
    pub fn new(timeouts: ProbeTimeouts) -> Result<Self, ConnectionError> {
        let client = Client::builder()
            .connect_timeout(timeouts.connect)
            .timeout(timeouts.total)
            .build()?;
        Ok(Self { client })
    }

    /// Resolves `<endpoint>/v3/auth/tokens`, tolerating endpoints that
    /// already carry the `/v3` suffix or a trailing slash.
    pub fn token_url(endpoint: &str) -> Result<Url, ConnectionError> {
        let trimmed = endpoint.trim().trim_end_matches('/');
        let invalid = |reason: String| ConnectionError::InvalidEndpoint {
            url: endpoint.to_string(),
            reason,
        };

        let mut url = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }

        let base = url.path().trim_end_matches('/').to_string();
        let path = if base.ends_with("/v3") {
            format!("{base}/auth/tokens")
        } else {
            format!("{base}/v3/auth/tokens")
        };
        url.set_path(&path);
        Ok(url)
    }

    fn auth_body(params: &ConnectionParams) -> serde_json::Value {
        json!({
            "auth": {
                "identity": {
                    "methods": ["password"],
                    "password": {
                        "user": {
                            "name": params.identity,
                            "domain": { "name": params.domain },
                            "password": params.credential,
                        }
                    }
                },
                "scope": {
                    "project": {
                        "name": params.project,
                        "domain": { "name": params.domain },
                    }
                }
            }
        })
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: Token,
}

#[derive(Debug, Deserialize)]
struct Token {
    #[serde(default)]
    catalog: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    #[serde(default)]
    endpoints: Vec<CatalogEndpoint>,
}

#[derive(Debug, Deserialize)]
struct CatalogEndpoint {
    region: Option<String>,
    region_id: Option<String>,
}

impl Token {
    fn has_region(&self, region: &str) -> bool {
        self.catalog
            .iter()
            .flat_map(|entry| entry.endpoints.iter())
            .any(|ep| {
                ep.region.as_deref() == Some(region) || ep.region_id.as_deref() == Some(region)
            })
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_BODY_IN_ERROR).collect()
}

#[async_trait]
impl CloudClient for KeystoneClient {
    async fn probe(&self, params: &ConnectionParams) -> Result<(), ConnectionError> {
        let url = Self::token_url(&params.endpoint_url)?;
        info!(
            "Requesting token from {} for user '{}' in project '{}'",
            url, params.identity, params.project
        );

        let resp = self
            .client
            .post(url.clone())
            .json(&Self::auth_body(params))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = truncate(&resp.text().await.unwrap_or_default());
            warn!("Token request to {} failed with status {}", url, status);
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ConnectionError::Unauthorized {
                    status: status.as_u16(),
                    body,
                },
                _ => ConnectionError::HttpStatus {
                    status: status.as_u16(),
                    body,
                },
            });
        }

        if !resp.headers().contains_key(SUBJECT_TOKEN_HEADER) {
            return Err(ConnectionError::UnexpectedResponse(format!(
                "missing {SUBJECT_TOKEN_HEADER} header"
            )));
        }

        let token = resp
            .json::<TokenResponse>()
            .await
            .map_err(|e| ConnectionError::UnexpectedResponse(e.to_string()))?
            .token;
        debug!("Token issued with {} catalog entries", token.catalog.len());

        if let Some(region) = params.region.as_deref() {
            if !token.has_region(region) {
                return Err(ConnectionError::RegionNotFound(region.to_string()));
            }
        }
        Ok(())
    }
}
