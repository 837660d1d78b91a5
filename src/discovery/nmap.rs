use super::xml::NmapXmlParser;
use super::{DiscoveryEngine, DiscoveryReport, ScanTarget};
use crate::core::errors::GrinderError;
use crate::executors::command::execute;
use async_trait::async_trait;
use futures::future::try_join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Drives the `nmap` binary and parses its XML report from stdout.
pub struct NmapEngine {
    command: String,
    parser: Arc<NmapXmlParser>,
}

impl NmapEngine {
    pub fn new(command: impl Into<String>) -> Result<Self, GrinderError> {
        Ok(Self {
            command: command.into(),
            parser: Arc::new(NmapXmlParser::new()?),
        })
    }

    fn build_args(arguments: &str, targets: &[ScanTarget]) -> Vec<String> {
        let mut args: Vec<String> = arguments.split_whitespace().map(String::from).collect();

        let ports: Vec<String> = targets
            .iter()
            .filter_map(|t| t.port)
            .map(|p| p.to_string())
            .collect();
        if !ports.is_empty() {
            args.push("-p".to_string());
            args.push(ports.join(","));
        }

        args.extend(["-oX".to_string(), "-".to_string()]);
        args.extend(targets.iter().map(|t| t.address.clone()));
        args
    }

    async fn run_once(
        command: &str,
        parser: &NmapXmlParser,
        targets: &[ScanTarget],
        arguments: &str,
    ) -> Result<DiscoveryReport, GrinderError> {
        let args = Self::build_args(arguments, targets);
        let output = execute(command, &args, None).await?;
        tracing::debug!(
            "nmap finished for {} target(s) in {:?}",
            targets.len(),
            output.duration
        );
        parser.parse(&output.stdout)
    }
}

#[async_trait]
impl DiscoveryEngine for NmapEngine {
    fn name(&self) -> &'static str {
        "nmap"
    }

    async fn scan(
        &self,
        targets: &[ScanTarget],
        arguments: &str,
        workers: usize,
    ) -> Result<DiscoveryReport, GrinderError> {
        if targets.is_empty() {
            return Ok(DiscoveryReport::new());
        }

        if workers <= 1 || targets.len() == 1 {
            return Self::run_once(&self.command, &self.parser, targets, arguments).await;
        }

        // One nmap process per target, at most `workers` alive at once. A
        // target whose process fails just contributes nothing.
        let semaphore = Arc::new(Semaphore::new(workers));
        let mut tasks = Vec::with_capacity(targets.len());

        for target in targets {
            let semaphore = Arc::clone(&semaphore);
            let parser = Arc::clone(&self.parser);
            let command = self.command.clone();
            let arguments = arguments.to_string();
            let target = target.clone();

            tasks.push(tokio::spawn(async move {
                run_pooled(&command, &parser, &semaphore, target, &arguments).await
            }));
        }

        let joined = try_join_all(tasks)
            .await
            .map_err(|e| GrinderError::Discovery(format!("worker task panicked: {}", e)))?;

        let mut report = DiscoveryReport::new();
        for partial in joined {
            report.extend(partial?);
        }
        Ok(report)
    }
}

/// One pooled target. Engine failures are logged and yield an empty report.
async fn run_pooled(
    command: &str,
    parser: &NmapXmlParser,
    semaphore: &Semaphore,
    target: ScanTarget,
    arguments: &str,
) -> Result<DiscoveryReport, GrinderError> {
    let _permit = semaphore
        .acquire()
        .await
        .map_err(|e| GrinderError::Discovery(format!("worker pool closed: {}", e)))?;

    match NmapEngine::run_once(command, parser, std::slice::from_ref(&target), arguments).await {
        Ok(report) => Ok(report),
        Err(e) => {
            tracing::warn!("Discovery for {} failed: {}", target.address, e);
            Ok(DiscoveryReport::new())
        }
    }
}
