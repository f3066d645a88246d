//! The editable face of a [`CloudProfile`].
//!
//! A `CloudForm` carries the fields exactly as a configuration page submits
//! them: everything is text, numbers included. `From<&CloudProfile>` fills a
//! form for editing and [`CloudForm::submit`] turns the edited form back into
//! a whole new profile.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::profile::{
    CloudProfile, SlaveTemplate, DEFAULT_INSTANCE_RETENTION_TIME_IN_MINUTES,
    DEFAULT_SCRIPT_TIMEOUT_MS, DEFAULT_START_TIMEOUT_MS, UNLIMITED_INSTANCES,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{field} must be a non-negative whole number, got '{value}'")]
    InvalidNumber { field: &'static str, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CloudForm {
    pub name: String,
    pub identity: String,
    pub credential: String,
    pub end_point_url: String,
    pub project: String,
    pub domain: String,
    pub zone: String,
    pub instance_cap: String,
    pub retention_time: String,
    pub script_timeout: String,
    pub start_timeout: String,
    pub floating_ip_pool: String,
    pub floating_ips: bool,
}

impl From<&CloudProfile> for CloudForm {
    fn from(p: &CloudProfile) -> Self {
        CloudForm {
            name: p.name.clone(),
            identity: p.identity.clone(),
            credential: p.credential.clone(),
            end_point_url: p.end_point_url.clone(),
            project: p.project.clone(),
            domain: p.domain.clone(),
            zone: p.zone.clone().unwrap_or_default(),
            // an unlimited cap shows up as an empty box
            instance_cap: if p.is_unlimited() {
                String::new()
            } else {
                p.instance_cap.to_string()
            },
            retention_time: p.retention_time.to_string(),
            script_timeout: p.script_timeout.to_string(),
            start_timeout: p.start_timeout.to_string(),
            floating_ip_pool: p.floating_ip_pool.clone().unwrap_or_default(),
            floating_ips: p.floating_ips,
        }
    }
}

fn parse_or<T: std::str::FromStr>(
    field: &'static str,
    value: &str,
    default: T,
) -> Result<T, FormError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(default);
    }
    value.parse().map_err(|_| FormError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

fn optional(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl CloudForm {
    /// Builds the profile this form describes.
    ///
    /// Templates are edited on their own page, so the caller passes the list to
    /// keep. Blank numeric fields fall back to their defaults.
    pub fn submit(self, templates: Vec<SlaveTemplate>) -> Result<CloudProfile, FormError> {
        Ok(CloudProfile {
            instance_cap: parse_or("instanceCap", &self.instance_cap, UNLIMITED_INSTANCES)?,
            retention_time: parse_or(
                "retentionTime",
                &self.retention_time,
                DEFAULT_INSTANCE_RETENTION_TIME_IN_MINUTES,
            )?,
            script_timeout: parse_or(
                "scriptTimeout",
                &self.script_timeout,
                DEFAULT_SCRIPT_TIMEOUT_MS,
            )?,
            start_timeout: parse_or(
                "startTimeout",
                &self.start_timeout,
                DEFAULT_START_TIMEOUT_MS,
            )?,
            name: self.name.trim().to_string(),
            identity: self.identity,
            credential: self.credential,
            end_point_url: self.end_point_url.trim().to_string(),
            project: self.project,
            domain: self.domain,
            zone: optional(self.zone),
            floating_ip_pool: optional(self.floating_ip_pool),
            templates,
            floating_ips: self.floating_ips,
        })
    }
}
