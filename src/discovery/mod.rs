//! Host discovery and service fingerprinting.
//!
//! The pipeline only depends on [`DiscoveryEngine`]; [`nmap::NmapEngine`] is
//! the production implementation.

pub mod nmap;
pub mod xml;

use crate::core::errors::GrinderError;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

pub use nmap::NmapEngine;

/// Script id whose output carries certificate details.
pub const SSL_CERT_SCRIPT: &str = "ssl-cert";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanTarget {
    pub address: String,
    pub port: Option<u16>,
}

impl ScanTarget {
    pub fn host(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            port: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ServiceRecord {
    pub state: String,
    pub name: Option<String>,
    pub product: Option<String>,
    pub version: Option<String>,
    /// Script id to its (unescaped) output.
    pub scripts: BTreeMap<String, String>,
}

impl ServiceRecord {
    pub fn ssl_cert(&self) -> Option<&str> {
        self.scripts.get(SSL_CERT_SCRIPT).map(String::as_str)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HostScan {
    pub status: String,
    pub tcp: BTreeMap<u16, ServiceRecord>,
}

impl HostScan {
    pub fn is_up(&self) -> bool {
        self.status == "up"
    }
}

/// Per-address results of one discovery submission.
pub type DiscoveryReport = HashMap<String, HostScan>;

#[async_trait]
pub trait DiscoveryEngine: Send + Sync {
    fn name(&self) -> &'static str;

    /// Scans `targets` with `arguments`, using up to `workers` concurrent
    /// engine invocations. Hosts the engine produced nothing for are absent
    /// from the report.
    async fn scan(
        &self,
        targets: &[ScanTarget],
        arguments: &str,
        workers: usize,
    ) -> Result<DiscoveryReport, GrinderError>;
}
