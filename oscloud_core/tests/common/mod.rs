#![allow(dead_code)]

pub mod fake_client;

use log::LevelFilter;
use oscloud_core::storage::profile::DEFAULT_INSTANCE_RETENTION_TIME_IN_MINUTES;
use oscloud_core::CloudProfile;

/// Logs will appear only when you run with `-- --nocapture`
/// or when the test fails.
pub fn init_test_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

/// The profile every round-trip test starts from.
pub fn openstack_profile() -> CloudProfile {
    CloudProfile {
        name: "openstack-profile".into(),
        identity: "identity".into(),
        credential: "credential".into(),
        end_point_url: "endPointUrl".into(),
        project: "project".into(),
        domain: "domain".into(),
        zone: None,
        instance_cap: 1,
        retention_time: DEFAULT_INSTANCE_RETENTION_TIME_IN_MINUTES,
        script_timeout: 600 * 1000,
        start_timeout: 600 * 1000,
        floating_ip_pool: None,
        templates: Vec::new(),
        floating_ips: true,
    }
}

/// Compares the settings a configuration round trip must preserve.
pub fn assert_same_settings(expected: &CloudProfile, actual: &CloudProfile) {
    assert_eq!(expected.identity, actual.identity, "identity");
    assert_eq!(expected.credential, actual.credential, "credential");
    assert_eq!(expected.end_point_url, actual.end_point_url, "endPointUrl");
    assert_eq!(expected.instance_cap, actual.instance_cap, "instanceCap");
    assert_eq!(expected.retention_time, actual.retention_time, "retentionTime");
    assert_eq!(expected.floating_ips, actual.floating_ips, "floatingIps");
}
