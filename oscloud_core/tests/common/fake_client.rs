//! A deterministic **in‑process stand‑in** for any type that implements
//! `oscloud_core::CloudClient`.
//!
//! Configure the outcome up front, run the validator, then inspect
//! `probes()` to see what (if anything) reached the "network".

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use oscloud_core::{CloudClient, ConnectionError, ConnectionParams};

#[derive(Debug, Clone)]
pub enum Outcome {
    Accept,
    Reject { status: u16 },
    Unavailable,
}

#[derive(Clone)]
pub struct FakeCloudClient {
    outcome: Outcome,
    probes: Arc<Mutex<Vec<ConnectionParams>>>,
}

impl FakeCloudClient {
    pub fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            probes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every parameter set that was probed, oldest first.
    pub fn probes(&self) -> Vec<ConnectionParams> {
        self.probes.lock().unwrap().clone()
    }
}

#[async_trait]
impl CloudClient for FakeCloudClient {
    async fn probe(&self, params: &ConnectionParams) -> Result<(), ConnectionError> {
        self.probes.lock().unwrap().push(params.clone());
        match self.outcome {
            Outcome::Accept => Ok(()),
            Outcome::Reject { status } => Err(ConnectionError::Unauthorized {
                status,
                body: "The request you have made requires authentication.".into(),
            }),
            Outcome::Unavailable => Err(ConnectionError::HttpStatus {
                status: 503,
                body: "Service Unavailable".into(),
            }),
        }
    }
}
