use crate::config::GlobalConfig;
use crate::core::errors::GrinderError;
use crate::core::models::{HostInput, TargetSelection};
use crate::core::registry::HostRegistry;
use crate::discovery::DiscoveryEngine;
use crate::executors::TlsAssessor;
use crate::reporters::ResultWriter;
use crate::stages::deep_scan::{self, DeepScanReport};
use crate::stages::tls_ports::{self, DetectionSummary};
use crate::stages::{liveness, selector};
use crate::ui::progress::StageProgress;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::path::PathBuf;

/// Everything a finished run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub registry: HostRegistry,
    pub selection: TargetSelection,
    pub detection: DetectionSummary,
    pub deep_scan: DeepScanReport,
    pub registry_file: Option<PathBuf>,
}

pub struct Pipeline<'a> {
    engine: &'a dyn DiscoveryEngine,
    assessor: &'a dyn TlsAssessor,
    config: &'a GlobalConfig,
    writer: ResultWriter,
    show_progress: bool,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        engine: &'a dyn DiscoveryEngine,
        assessor: &'a dyn TlsAssessor,
        config: &'a GlobalConfig,
    ) -> Self {
        Self {
            engine,
            assessor,
            config,
            writer: ResultWriter::new(
                config.output.results_root.clone(),
                config.output.tls_subdir.clone(),
            ),
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    fn progress(&self, stage: &str, total: usize) -> StageProgress {
        if self.show_progress {
            StageProgress::new(stage, total)
        } else {
            StageProgress::hidden(total)
        }
    }

    /// Liveness, TLS port detection, port selection, deep scan and
    /// persistence, once, in that order. Only discovery failures and an
    /// empty host list abort the run.
    pub async fn run<R: Rng + ?Sized>(
        &self,
        hosts: Vec<HostInput>,
        rng: &mut R,
    ) -> Result<RunSummary, GrinderError> {
        let started_at = Utc::now();
        let mut registry = HostRegistry::new(hosts);
        if registry.is_empty() {
            return Err(GrinderError::Input("no hosts to scan".to_string()));
        }

        let batches = registry.len().div_ceil(self.config.liveness.group_size.max(1));
        let progress = self.progress("pingscan", batches);
        liveness::run(&mut registry, self.engine, &self.config.liveness, &progress).await?;

        let online = registry.online_addresses();
        let detection =
            tls_ports::detect(&mut registry, self.engine, &online, &self.config.detection).await?;

        let selection = selector::select_targets(&registry, rng);

        let progress = self.progress("tls scan", selection.len());
        let deep_scan =
            deep_scan::run(&registry, &selection, self.assessor, &self.writer, &progress).await;

        let registry_file = if self.config.output.write_registry {
            Some(self.writer.write_registry(&registry)?)
        } else {
            None
        };

        Ok(RunSummary {
            started_at,
            registry,
            selection,
            detection,
            deep_scan,
            registry_file,
        })
    }
}
