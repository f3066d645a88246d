use serde::{Deserialize, Serialize};

pub const DEFAULT_INSTANCE_RETENTION_TIME_IN_MINUTES: u32 = 30;
pub const DEFAULT_SCRIPT_TIMEOUT_MS: u64 = 600 * 1000;
pub const DEFAULT_START_TIMEOUT_MS: u64 = 600 * 1000;
/// `0` lifts the limit.
pub const UNLIMITED_INSTANCES: u32 = 0;

/// A named OpenStack account plus the limits used when provisioning agents on it.
///
/// Field names serialize in camelCase so the JSON matches the form field
/// names (`endPointUrl`, `instanceCap`, ...):
/// `{ "name":"openstack-profile", "identity":"user", "endPointUrl":"https://...", ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudProfile {
    pub name: String,
    pub identity: String,
    pub credential: String,
    pub end_point_url: String,
    pub project: String,
    pub domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    pub instance_cap: u32,
    pub retention_time: u32,
    pub script_timeout: u64,
    pub start_timeout: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floating_ip_pool: Option<String>,
    #[serde(default)]
    pub templates: Vec<SlaveTemplate>,
    pub floating_ips: bool,
}

impl CloudProfile {
    /// Returns the unique, human-readable identifier.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_unlimited(&self) -> bool {
        self.instance_cap == UNLIMITED_INSTANCES
    }

    /// First template name that occurs more than once, if any.
    pub(crate) fn duplicate_template(&self) -> Option<&str> {
        self.templates.iter().enumerate().find_map(|(i, t)| {
            self.templates[..i]
                .iter()
                .any(|earlier| earlier.name == t.name)
                .then_some(t.name.as_str())
        })
    }
}

/// Describes one kind of agent a cloud can boot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlaveTemplate {
    pub name: String,
    /// Space separated.
    #[serde(default)]
    pub labels: String,
    pub image_id: String,
    pub hardware_id: String,
    #[serde(default)]
    pub network_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_pair_name: Option<String>,
    #[serde(default = "default_executors")]
    pub num_executors: u32,
    #[serde(default)]
    pub instance_cap: u32,
}

fn default_executors() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(name: &str, labels: &str) -> SlaveTemplate {
        SlaveTemplate {
            name: name.into(),
            labels: labels.into(),
            image_id: "ubuntu-22.04".into(),
            hardware_id: "m1.small".into(),
            network_id: String::new(),
            key_pair_name: None,
            num_executors: 1,
            instance_cap: 0,
        }
    }

    fn profile(templates: Vec<SlaveTemplate>) -> CloudProfile {
        CloudProfile {
            name: "os".into(),
            identity: "user".into(),
            credential: "secret".into(),
            end_point_url: "https://keystone.test:5000/v3".into(),
            project: "ci".into(),
            domain: "Default".into(),
            zone: None,
            instance_cap: 2,
            retention_time: DEFAULT_INSTANCE_RETENTION_TIME_IN_MINUTES,
            script_timeout: DEFAULT_SCRIPT_TIMEOUT_MS,
            start_timeout: DEFAULT_START_TIMEOUT_MS,
            floating_ip_pool: None,
            templates,
            floating_ips: false,
        }
    }

    #[test]
    fn detects_duplicate_template_names() {
        let distinct = profile(vec![template("a", ""), template("b", "")]);
        assert_eq!(distinct.duplicate_template(), None);

        let repeated = profile(vec![template("a", ""), template("b", ""), template("a", "x")]);
        assert_eq!(repeated.duplicate_template(), Some("a"));
    }

    #[test]
    fn zero_cap_is_unlimited() {
        let mut p = profile(vec![]);
        assert!(!p.is_unlimited());
        p.instance_cap = UNLIMITED_INSTANCES;
        assert!(p.is_unlimited());
    }

    #[test]
    fn json_uses_form_field_names() {
        let json = serde_json::to_value(profile(vec![])).unwrap();
        assert_eq!(json["endPointUrl"], "https://keystone.test:5000/v3");
        assert_eq!(json["instanceCap"], 2);
        assert_eq!(json["retentionTime"], 30);
        assert_eq!(json["floatingIps"], false);
        assert!(json.get("zone").is_none());
    }
}
