pub mod cloud_client;
pub mod errors;
pub mod keystone;

pub use cloud_client::{CloudClient, ConnectionParams};
pub use errors::ConnectionError;
pub use keystone::{KeystoneClient, ProbeTimeouts};
