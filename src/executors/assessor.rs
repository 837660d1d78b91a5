use super::command::execute;
use crate::config::TlsScannerConfig;
use crate::core::errors::GrinderError;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

/// Deep TLS assessment of a single endpoint, returning the raw text report.
#[async_trait]
pub trait TlsAssessor: Send + Sync {
    fn name(&self) -> &'static str;

    async fn assess(&self, host: &str, port: u16) -> Result<String, GrinderError>;
}

/// Runs the TLS-Scanner jar through the JVM.
#[derive(Clone, Debug)]
pub struct TlsScannerCli {
    java: String,
    jar: PathBuf,
    report_detail: String,
    scan_detail: String,
    threads: usize,
    timeout: Duration,
}

impl TlsScannerCli {
    pub fn from_config(config: &TlsScannerConfig) -> Self {
        Self {
            java: config.java.clone(),
            jar: config.jar.clone(),
            report_detail: config.report_detail.clone(),
            scan_detail: config.scan_detail.clone(),
            threads: config.threads,
            timeout: config.timeout(),
        }
    }

    pub fn build_args(&self, host: &str, port: u16) -> Vec<String> {
        let threads = self.threads.to_string();
        vec![
            "-jar".to_string(),
            self.jar.display().to_string(),
            "-connect".to_string(),
            format!("{}:{}", host, port),
            "-noColor".to_string(),
            "-implementation".to_string(),
            "-reportDetail".to_string(),
            self.report_detail.clone(),
            "-scanDetail".to_string(),
            self.scan_detail.clone(),
            "-overallThreads".to_string(),
            threads.clone(),
            "-parallelProbes".to_string(),
            threads,
        ]
    }
}

#[async_trait]
impl TlsAssessor for TlsScannerCli {
    fn name(&self) -> &'static str {
        "tls-scanner"
    }

    async fn assess(&self, host: &str, port: u16) -> Result<String, GrinderError> {
        let args = self.build_args(host, port);
        let result = execute(&self.java, &args, Some(self.timeout)).await?;
        Ok(result.stdout)
    }
}
