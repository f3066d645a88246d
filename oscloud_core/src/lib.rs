pub mod connections;
pub mod core;
pub mod storage;
pub mod utils;

// re‑export ergonomic entry points
pub use crate::core::validator::{
    ConnectionValidator, MissingField, ValidationVerdict, VerdictKind,
};
pub use connections::{
    CloudClient, ConnectionError, ConnectionParams, KeystoneClient, ProbeTimeouts,
};
pub use storage::config::{CloudConfig, ConfigError};
pub use storage::form::{CloudForm, FormError};
pub use storage::profile::{CloudProfile, SlaveTemplate};
pub use storage::store::{CloudProfileStore, StoreError};
