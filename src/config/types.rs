use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct GlobalConfig {
    pub liveness: LivenessConfig,
    pub detection: DetectionConfig,
    pub nmap: NmapConfig,
    pub tls_scanner: TlsScannerConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LivenessConfig {
    /// Hosts per reachability batch.
    pub group_size: usize,
    pub ping_args: String,
    pub workers: usize,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            group_size: 100,
            ping_args: "-n -sn".to_string(),
            workers: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DetectionConfig {
    pub base_args: String,
    /// Certificate-probing NSE script, either a script name or a path.
    pub script: String,
    pub host_timeout_secs: u64,
    pub workers: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            base_args: "-T4 -F -sC -sV --version-intensity 1 --open".to_string(),
            script: "ssl-cert".to_string(),
            host_timeout_secs: 120,
            workers: 10,
        }
    }
}

impl DetectionConfig {
    pub fn scan_arguments(&self) -> String {
        format!(
            "{} --script={} --host-timeout={}s",
            self.base_args, self.script, self.host_timeout_secs
        )
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct NmapConfig {
    pub command: String,
}

impl Default for NmapConfig {
    fn default() -> Self {
        Self {
            command: "nmap".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TlsScannerConfig {
    pub java: String,
    pub jar: PathBuf,
    pub report_detail: String,
    pub scan_detail: String,
    pub threads: usize,
    pub timeout_secs: u64,
}

impl Default for TlsScannerConfig {
    fn default() -> Self {
        Self {
            java: "java".to_string(),
            jar: PathBuf::from("TLS-Scanner.jar"),
            report_detail: "NORMAL".to_string(),
            scan_detail: "NORMAL".to_string(),
            threads: 4,
            timeout_secs: 1200,
        }
    }
}

impl TlsScannerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub results_root: PathBuf,
    pub tls_subdir: String,
    /// Also dump the host registry as `hosts.json` under the results root.
    pub write_registry: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_root: PathBuf::from("results"),
            tls_subdir: "tls_scanner".to_string(),
            write_registry: true,
        }
    }
}
