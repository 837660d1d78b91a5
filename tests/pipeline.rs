use async_trait::async_trait;
use pretty_assertions::assert_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::sync::Mutex;
use tlsgrinder::discovery::{DiscoveryEngine, DiscoveryReport, HostScan, ScanTarget, ServiceRecord};
use tlsgrinder::executors::TlsAssessor;
use tlsgrinder::{GlobalConfig, GrinderError, HostInput, Pipeline, Reachability};

/// Every target is up; `tls` hosts answer with a certificate on 443 and 993.
struct LabEngine {
    down: HashSet<&'static str>,
    tls: HashSet<&'static str>,
}

#[async_trait]
impl DiscoveryEngine for LabEngine {
    fn name(&self) -> &'static str {
        "lab"
    }

    async fn scan(
        &self,
        targets: &[ScanTarget],
        _arguments: &str,
        _workers: usize,
    ) -> Result<DiscoveryReport, GrinderError> {
        let mut report = DiscoveryReport::new();
        for target in targets {
            if self.down.contains(target.address.as_str()) {
                continue;
            }
            let mut tcp = BTreeMap::new();
            if self.tls.contains(target.address.as_str()) {
                for port in [443u16, 993] {
                    let mut service = ServiceRecord {
                        state: "open".to_string(),
                        ..ServiceRecord::default()
                    };
                    service.scripts.insert(
                        "ssl-cert".to_string(),
                        format!("Subject: commonName={}\nIssuer: commonName=Lab CA", port),
                    );
                    tcp.insert(port, service);
                }
            }
            report.insert(
                target.address.clone(),
                HostScan {
                    status: "up".to_string(),
                    tcp,
                },
            );
        }
        Ok(report)
    }
}

struct ScriptedAssessor {
    calls: Mutex<Vec<String>>,
}

#[async_trait]
impl TlsAssessor for ScriptedAssessor {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn assess(&self, host: &str, port: u16) -> Result<String, GrinderError> {
        self.calls.lock().unwrap().push(format!("{}:{}", host, port));
        match host {
            "192.0.2.1" => Err(GrinderError::Timeout {
                tool: "java".to_string(),
                timeout_ms: 5,
            }),
            "192.0.2.2" => Err(GrinderError::Exec(tlsgrinder::core::errors::ExecError {
                tool: "java".to_string(),
                args: Vec::new(),
                exit_code: Some(1),
                stderr_tail: "Exception in thread main".to_string(),
                duration_ms: 3,
            })),
            _ => Ok(format!("\x1b[1;32mReport for {}:{}\x1b[0m\n", host, port)),
        }
    }
}

#[tokio::test]
async fn failed_hosts_do_not_block_later_reports() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = GlobalConfig::default();
    config.output.results_root = dir.path().join("results");
    config.liveness.group_size = 2;

    let engine = LabEngine {
        down: HashSet::from(["192.0.2.9"]),
        tls: HashSet::from(["192.0.2.3"]),
    };
    let assessor = ScriptedAssessor {
        calls: Mutex::new(Vec::new()),
    };

    let hosts = vec![
        HostInput::bare("192.0.2.1"),
        HostInput::bare("192.0.2.2"),
        HostInput {
            ip: "192.0.2.3".to_string(),
            vendor: Some("Acme Co".to_string()),
            product: Some("Edge Router".to_string()),
        },
        HostInput::bare("192.0.2.9"),
    ];

    let summary = Pipeline::new(&engine, &assessor, &config)
        .run(hosts, &mut StdRng::seed_from_u64(3))
        .await
        .unwrap();

    assert_eq!(
        *assessor.calls.lock().unwrap(),
        vec!["192.0.2.1:443", "192.0.2.2:443", "192.0.2.3:443"]
    );
    assert_eq!(
        summary.registry.get("192.0.2.9").unwrap().reachability,
        Reachability::Offline
    );

    let tls_dir = dir.path().join("results").join("tls_scanner");
    let files: Vec<String> = fs::read_dir(&tls_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(files, vec!["192.0.2.3-443-Acme_Co-Edge_Router.txt"]);

    let content = fs::read_to_string(tls_dir.join(&files[0])).unwrap();
    assert_eq!(content, "Report for 192.0.2.3:443\n");
    assert!(!content.contains('\x1b'));

    let record = summary.registry.get("192.0.2.3").unwrap();
    assert!(record.tls_ports.is_subset(&record.open_ports));
    assert_eq!(record.certificate.as_ref().unwrap().port, 993);

    let registry_json = fs::read_to_string(dir.path().join("results").join("hosts.json")).unwrap();
    assert!(registry_json.contains("\"tls_status\": \"offline\""));
}
