//! In-memory collaborators for stage tests.

use crate::core::errors::GrinderError;
use crate::discovery::{
    DiscoveryEngine, DiscoveryReport, HostScan, SSL_CERT_SCRIPT, ScanTarget, ServiceRecord,
};
use crate::executors::TlsAssessor;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

type EngineCall = (Vec<String>, String, usize);

#[derive(Default)]
pub struct FakeEngine {
    up: HashSet<String>,
    ports: HashMap<String, BTreeMap<u16, ServiceRecord>>,
    fail: bool,
    calls: Mutex<Vec<EngineCall>>,
}

impl FakeEngine {
    pub fn up(mut self, addresses: &[&str]) -> Self {
        self.up.extend(addresses.iter().map(|a| a.to_string()));
        self
    }

    pub fn port(mut self, address: &str, port: u16, ssl_cert: Option<&str>) -> Self {
        let mut record = ServiceRecord {
            state: "open".to_string(),
            ..ServiceRecord::default()
        };
        if let Some(cert) = ssl_cert {
            record
                .scripts
                .insert(SSL_CERT_SCRIPT.to_string(), cert.to_string());
        }
        self.ports
            .entry(address.to_string())
            .or_default()
            .insert(port, record);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DiscoveryEngine for FakeEngine {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn scan(
        &self,
        targets: &[ScanTarget],
        arguments: &str,
        workers: usize,
    ) -> Result<DiscoveryReport, GrinderError> {
        self.calls.lock().unwrap().push((
            targets.iter().map(|t| t.address.clone()).collect(),
            arguments.to_string(),
            workers,
        ));

        if self.fail {
            return Err(GrinderError::Discovery("engine unavailable".to_string()));
        }

        let mut report = DiscoveryReport::new();
        for target in targets {
            if let Some(tcp) = self.ports.get(&target.address) {
                report.insert(
                    target.address.clone(),
                    HostScan {
                        status: "up".to_string(),
                        tcp: tcp.clone(),
                    },
                );
            } else if self.up.contains(&target.address) {
                report.insert(
                    target.address.clone(),
                    HostScan {
                        status: "up".to_string(),
                        tcp: BTreeMap::new(),
                    },
                );
            }
        }
        Ok(report)
    }
}

pub enum FakeAssessment {
    Report(&'static str),
    Timeout,
    Crash,
}

#[derive(Default)]
pub struct FakeAssessor {
    answers: HashMap<String, FakeAssessment>,
    calls: Mutex<Vec<(String, u16)>>,
}

impl FakeAssessor {
    pub fn answer(mut self, host: &str, answer: FakeAssessment) -> Self {
        self.answers.insert(host.to_string(), answer);
        self
    }

    pub fn calls(&self) -> Vec<(String, u16)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TlsAssessor for FakeAssessor {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn assess(&self, host: &str, port: u16) -> Result<String, GrinderError> {
        self.calls.lock().unwrap().push((host.to_string(), port));
        match self.answers.get(host) {
            Some(FakeAssessment::Report(text)) => Ok(text.to_string()),
            Some(FakeAssessment::Timeout) => Err(GrinderError::Timeout {
                tool: "java".to_string(),
                timeout_ms: 10,
            }),
            Some(FakeAssessment::Crash) => Err(GrinderError::Spawn {
                tool: "java".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no java"),
            }),
            None => Ok(String::new()),
        }
    }
}
