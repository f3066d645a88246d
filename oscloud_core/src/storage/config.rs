use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::profile::CloudProfile;
use super::store::{CloudProfileStore, StoreError};

const CONFIG_FILE: &str = "clouds.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed cloud configuration in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unable to locate config dir")]
    NoConfigDir,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The persisted list of clouds, in the order they were configured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudConfig {
    #[serde(default)]
    pub clouds: Vec<CloudProfile>,
}

impl CloudConfig {
    /// `~/.config/oscloud/clouds.json` on Linux,
    /// `%APPDATA%\oscloud\config\clouds.json` on Windows, etc.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let proj = ProjectDirs::from("", "", "oscloud").ok_or(ConfigError::NoConfigDir)?;
        Ok(proj.config_dir().join(CONFIG_FILE))
    }

    /// Reads the config; a file that does not exist yet is an empty config.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = match fs::File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No cloud config at {:?}, starting empty", path);
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config: Self =
            serde_json::from_reader(io::BufReader::new(file)).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("Loaded {} clouds from {:?}", config.clouds.len(), path);
        Ok(config)
    }

    /// Writes the whole config, creating parent directories as needed.
    ///
    /// The file is written next to the target and renamed over it; the previous
    /// config stays intact if writing fails.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source: io::Error| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let tmp = path.with_extension("json.tmp");
        if let Err(e) = self.write_then_rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        info!("Saved {} clouds to {:?}", self.clouds.len(), path);
        Ok(())
    }

    fn write_then_rename(&self, tmp: &Path, path: &Path) -> Result<(), ConfigError> {
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source: io::Error| ConfigError::Io { path, source }
        };
        let mut writer = io::BufWriter::new(fs::File::create(tmp).map_err(io_err(tmp))?);
        serde_json::to_writer_pretty(&mut writer, self).map_err(|source| ConfigError::Json {
            path: tmp.to_path_buf(),
            source,
        })?;
        writer.flush().map_err(io_err(tmp))?;
        drop(writer);
        fs::rename(tmp, path).map_err(io_err(path))
    }

    /// Snapshot of the store, in its order.
    pub fn from_store(store: &CloudProfileStore) -> Self {
        Self {
            clouds: store.list_all(),
        }
    }

    /// Builds a store; names must be unique within the file.
    pub fn into_store(self) -> Result<CloudProfileStore, ConfigError> {
        let store = CloudProfileStore::new();
        for profile in self.clouds {
            store.create(profile)?;
        }
        Ok(store)
    }
}

/// Loads the store kept at `path`.
pub fn load_store(path: &Path) -> Result<CloudProfileStore, ConfigError> {
    CloudConfig::load(path)?.into_store()
}

/// Saves every profile of `store` to `path`.
pub fn save_store(store: &CloudProfileStore, path: &Path) -> Result<(), ConfigError> {
    CloudConfig::from_store(store).save(path)
}
