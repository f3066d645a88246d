use std::fmt::{self, Display};
use std::sync::Arc;

use log::{debug, info, warn};
use thiserror::Error;

use crate::connections::{CloudClient, ConnectionParams};
use crate::storage::profile::CloudProfile;

pub const CONNECTION_FAILED_PREFIX: &str = "Cannot connect to specified cloud";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictKind {
    Ok,
    Error,
}

/// Outcome of a single "Test Connection" request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationVerdict {
    kind: VerdictKind,
    message: String,
}

impl ValidationVerdict {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            kind: VerdictKind::Ok,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: VerdictKind::Error,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> VerdictKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_ok(&self) -> bool {
        self.kind == VerdictKind::Ok
    }
}

impl Display for ValidationVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            VerdictKind::Ok => write!(f, "OK: {}", self.message),
            VerdictKind::Error => write!(f, "ERROR: {}", self.message),
        }
    }
}

/// Required connection parameters, in the order they are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MissingField {
    #[error("Endpoint URL is required")]
    EndpointUrl,
    #[error("Identity is required")]
    Identity,
    #[error("Credential is required")]
    Credential,
    #[error("Project is required")]
    Project,
    #[error("Domain is required")]
    Domain,
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Checks the required fields, first failure wins. Region is optional.
pub fn require_params(
    region: Option<&str>,
    endpoint_url: Option<&str>,
    identity: Option<&str>,
    credential: Option<&str>,
    project: Option<&str>,
    domain: Option<&str>,
) -> Result<ConnectionParams, MissingField> {
    let endpoint_url = present(endpoint_url).ok_or(MissingField::EndpointUrl)?;
    let identity = present(identity).ok_or(MissingField::Identity)?;
    let credential = present(credential).ok_or(MissingField::Credential)?;
    let project = present(project).ok_or(MissingField::Project)?;
    let domain = present(domain).ok_or(MissingField::Domain)?;

    Ok(ConnectionParams {
        region: present(region).map(str::to_string),
        endpoint_url: endpoint_url.to_string(),
        identity: identity.to_string(),
        credential: credential.to_string(),
        project: project.to_string(),
        domain: domain.to_string(),
    })
}

/// Backs the "Test Connection" action.
///
/// Cloning is cheap; the underlying client is shared.
#[derive(Clone)]
pub struct ConnectionValidator {
    client: Arc<dyn CloudClient>,
}

impl ConnectionValidator {
    pub fn new(client: Arc<dyn CloudClient>) -> Self {
        Self { client }
    }

    /// Validates the parameters and, if they are complete, probes the cloud once.
    pub async fn validate(
        &self,
        region: Option<&str>,
        endpoint_url: Option<&str>,
        identity: Option<&str>,
        credential: Option<&str>,
        project: Option<&str>,
        domain: Option<&str>,
    ) -> ValidationVerdict {
        let required = require_params(region, endpoint_url, identity, credential, project, domain);
        let params = match required {
            Ok(params) => params,
            Err(missing) => {
                debug!("Rejecting test connection: {missing}");
                return ValidationVerdict::error(missing.to_string());
            }
        };

        info!("Testing connection to {}", params.endpoint_url);
        match self.client.probe(&params).await {
            Ok(()) => {
                info!("Connection to {} succeeded", params.endpoint_url);
                ValidationVerdict::ok("Connection succeeded!")
            }
            Err(e) => {
                warn!("Connection to {} failed: {}", params.endpoint_url, e);
                ValidationVerdict::error(format!(
                    "{CONNECTION_FAILED_PREFIX}, please check the identity and credentials: {e}"
                ))
            }
        }
    }

    /// Validates the connection fields of a stored profile, using its zone as region.
    pub async fn validate_profile(&self, profile: &CloudProfile) -> ValidationVerdict {
        self.validate(
            profile.zone.as_deref(),
            Some(&profile.end_point_url),
            Some(&profile.identity),
            Some(&profile.credential),
            Some(&profile.project),
            Some(&profile.domain),
        )
        .await
    }
}
