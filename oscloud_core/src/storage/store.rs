use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, info};
use thiserror::Error;

use super::profile::CloudProfile;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("no cloud named '{0}'")]
    NotFound(String),
    #[error("a cloud named '{0}' already exists")]
    DuplicateName(String),
    #[error("cloud name must not be empty")]
    EmptyName,
    #[error("cloud name '{0}' must not start or end with whitespace")]
    UntrimmedName(String),
    #[error("cloud '{cloud}' declares template '{template}' more than once")]
    DuplicateTemplate { cloud: String, template: String },
}

/// Keeps the configured clouds in insertion order, keyed by name.
///
/// Profiles go in and come out by value, so a stored record can only change by
/// being replaced as a whole. Every operation holds the lock for its full
/// duration: readers never see a half-written profile. Cloning the store only
/// bumps the reference count, so it can be handed to every component that
/// needs profile lookup.
#[derive(Debug, Clone, Default)]
pub struct CloudProfileStore {
    inner: Arc<RwLock<Vec<CloudProfile>>>,
}

impl CloudProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<CloudProfile>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<CloudProfile>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn check(profile: &CloudProfile) -> Result<(), StoreError> {
        let trimmed = profile.name.trim();
        if trimmed.is_empty() {
            return Err(StoreError::EmptyName);
        }
        if trimmed.len() != profile.name.len() {
            return Err(StoreError::UntrimmedName(profile.name.clone()));
        }
        if let Some(template) = profile.duplicate_template() {
            return Err(StoreError::DuplicateTemplate {
                cloud: profile.name.clone(),
                template: template.to_string(),
            });
        }
        Ok(())
    }

    /// Insert, or replace the profile with the same name in place.
    ///
    /// Returns the replaced profile, if any.
    pub fn add(&self, profile: CloudProfile) -> Result<Option<CloudProfile>, StoreError> {
        Self::check(&profile)?;
        let mut clouds = self.write();
        match clouds.iter_mut().find(|p| p.name == profile.name) {
            Some(slot) => {
                debug!("Replacing cloud '{}'", profile.name);
                Ok(Some(std::mem::replace(slot, profile)))
            }
            None => {
                info!("Adding cloud '{}'", profile.name);
                clouds.push(profile);
                Ok(None)
            }
        }
    }

    /// Insert a profile whose name is not taken yet.
    pub fn create(&self, profile: CloudProfile) -> Result<(), StoreError> {
        Self::check(&profile)?;
        let mut clouds = self.write();
        if clouds.iter().any(|p| p.name == profile.name) {
            return Err(StoreError::DuplicateName(profile.name));
        }
        info!("Creating cloud '{}'", profile.name);
        clouds.push(profile);
        Ok(())
    }

    pub fn get_by_name(&self, name: &str) -> Result<CloudProfile, StoreError> {
        self.read()
            .iter()
            .find(|p| p.name == name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().iter().any(|p| p.name == name)
    }

    /// Returns every profile in insertion order.
    pub fn list_all(&self) -> Vec<CloudProfile> {
        self.read().clone()
    }

    /// Delete a cloud (`true` if removed, `false` if it didn’t exist).
    pub fn remove(&self, name: &str) -> bool {
        let mut clouds = self.write();
        let before = clouds.len();
        clouds.retain(|p| p.name != name);
        let removed = clouds.len() != before;
        if removed {
            info!("Removed cloud '{}'", name);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::profile::{SlaveTemplate, DEFAULT_INSTANCE_RETENTION_TIME_IN_MINUTES};
    use std::thread;

    fn profile(name: &str, identity: &str) -> CloudProfile {
        CloudProfile {
            name: name.into(),
            identity: identity.into(),
            credential: "credential".into(),
            end_point_url: "https://keystone.test/v3".into(),
            project: "project".into(),
            domain: "domain".into(),
            zone: None,
            instance_cap: 1,
            retention_time: DEFAULT_INSTANCE_RETENTION_TIME_IN_MINUTES,
            script_timeout: 600_000,
            start_timeout: 600_000,
            floating_ip_pool: None,
            templates: vec![],
            floating_ips: true,
        }
    }

    #[test]
    fn add_replaces_in_place_and_keeps_order() {
        let store = CloudProfileStore::new();
        assert_eq!(store.add(profile("a", "one")), Ok(None));
        assert_eq!(store.add(profile("b", "two")), Ok(None));

        let replaced = store.add(profile("a", "three")).unwrap();
        assert_eq!(replaced.map(|p| p.identity), Some("one".to_string()));

        let all = store.list_all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "a");
        assert_eq!(all[0].identity, "three");
        assert_eq!(all[1].name, "b");
    }

    #[test]
    fn create_rejects_duplicates() {
        let store = CloudProfileStore::new();
        store.create(profile("a", "one")).unwrap();
        assert_eq!(
            store.create(profile("a", "two")),
            Err(StoreError::DuplicateName("a".into()))
        );
        assert_eq!(store.get_by_name("a").unwrap().identity, "one");
    }

    #[test]
    fn rejects_empty_names_and_duplicate_templates() {
        let store = CloudProfileStore::new();
        assert_eq!(store.add(profile("  ", "x")), Err(StoreError::EmptyName));
        assert_eq!(
            store.add(profile(" x ", "x")),
            Err(StoreError::UntrimmedName(" x ".into()))
        );
        assert_eq!(
            store.create(profile("x\t", "x")),
            Err(StoreError::UntrimmedName("x\t".into()))
        );

        let template = SlaveTemplate {
            name: "t".into(),
            labels: String::new(),
            image_id: "img".into(),
            hardware_id: "flavor".into(),
            network_id: String::new(),
            key_pair_name: None,
            num_executors: 1,
            instance_cap: 0,
        };
        let mut p = profile("a", "x");
        p.templates = vec![template.clone(), template];
        assert!(matches!(
            store.create(p),
            Err(StoreError::DuplicateTemplate { .. })
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn lookup_miss_and_remove() {
        let store = CloudProfileStore::new();
        store.add(profile("a", "one")).unwrap();
        assert_eq!(
            store.get_by_name("missing"),
            Err(StoreError::NotFound("missing".into()))
        );
        assert!(store.remove("a"));
        assert!(!store.remove("a"));
        assert!(!store.contains("a"));
    }

    #[test]
    fn concurrent_readers_see_whole_profiles() {
        let store = CloudProfileStore::new();
        store.add(profile("shared", "v0")).unwrap();

        let writer = {
            let store = store.clone();
            thread::spawn(move || {
                for i in 1..200 {
                    let mut p = profile("shared", &format!("v{i}"));
                    p.credential = format!("c{i}");
                    store.add(p).unwrap();
                }
            })
        };

        for _ in 0..200 {
            let p = store.get_by_name("shared").unwrap();
            if p.identity != "v0" {
                // identity and credential are always written together
                assert_eq!(p.identity[1..], p.credential[1..]);
            }
        }
        writer.join().unwrap();
        assert_eq!(store.len(), 1);
    }
}
