use crate::core::errors::GrinderError;
use crate::core::models::{self, TargetSelection};
use crate::core::registry::HostRegistry;
use crate::executors::TlsAssessor;
use crate::reporters::ResultWriter;
use crate::ui::progress::StageProgress;
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::{Duration, Instant};

static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1B\[[0-?]*[ -/]*[@-~]").expect("valid ANSI pattern"));

/// Removes CSI terminal escape sequences.
pub fn strip_ansi(text: &str) -> String {
    ANSI_ESCAPE.replace_all(text, "").into_owned()
}

/// What happened to one host's assessment. Every variant lets the run continue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Cleaned, non-empty report.
    Report(String),
    /// The tool finished but printed nothing useful.
    Empty,
    Timeout,
    Error(String),
}

impl ScanOutcome {
    pub fn from_result(result: Result<String, GrinderError>) -> Self {
        match result {
            Ok(raw) => {
                let cleaned = strip_ansi(&raw);
                if cleaned.is_empty() {
                    ScanOutcome::Empty
                } else {
                    ScanOutcome::Report(cleaned)
                }
            }
            Err(e) if e.is_timeout() => ScanOutcome::Timeout,
            Err(e) => ScanOutcome::Error(e.to_string()),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScanOutcome::Report(_) => "report",
            ScanOutcome::Empty => "empty",
            ScanOutcome::Timeout => "timeout",
            ScanOutcome::Error(_) => "error",
        }
    }
}

#[derive(Clone, Debug)]
pub struct HostScanResult {
    pub host: String,
    pub port: u16,
    pub outcome: ScanOutcome,
    pub saved_to: Option<PathBuf>,
    pub elapsed: Duration,
}

#[derive(Clone, Debug, Default)]
pub struct DeepScanReport {
    pub results: Vec<HostScanResult>,
    pub elapsed: Duration,
}

impl DeepScanReport {
    pub fn saved(&self) -> usize {
        self.results.iter().filter(|r| r.saved_to.is_some()).count()
    }

    /// Number of hosts whose outcome satisfies `predicate`.
    pub fn count(&self, predicate: impl Fn(&ScanOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| predicate(&r.outcome)).count()
    }
}

/// Assesses each selected endpoint one after another and persists the
/// non-empty reports. A host that times out or fails is logged and skipped,
/// never retried, and never stops the loop.
pub async fn run(
    registry: &HostRegistry,
    selection: &TargetSelection,
    assessor: &dyn TlsAssessor,
    writer: &ResultWriter,
    progress: &StageProgress,
) -> DeepScanReport {
    let started = Instant::now();
    let total = selection.len();
    let mut results = Vec::with_capacity(total);
    if selection.is_empty() {
        tracing::info!("No hosts selected for TLS scanning");
    } else {
        tracing::info!("TLS scanning {} hosts with {}", total, assessor.name());
    }

    for (index, (host, port)) in selection.iter().enumerate() {
        progress.message(format!("{}:{}", host, port));
        tracing::info!(
            "Start TLS scan for {} of {} hosts: {}:{}",
            index + 1,
            total,
            host,
            port
        );

        let host_started = Instant::now();
        let mut outcome = ScanOutcome::from_result(assessor.assess(host, port).await);
        let elapsed = host_started.elapsed();

        let mut saved_to = None;
        let mut write_error = None;
        match &outcome {
            ScanOutcome::Report(text) => {
                let stem = match registry.get(host) {
                    Some(record) => record.result_file_stem(port),
                    None => models::result_file_stem(host, port, None, None),
                };
                match writer.write(&stem, text) {
                    Ok(path) => {
                        tracing::info!(
                            "{}:{} scanned in {:.1?}, saved to {:?}",
                            host,
                            port,
                            elapsed,
                            path
                        );
                        saved_to = Some(path);
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to save TLS report for {}:{}: {}",
                            host,
                            port,
                            e
                        );
                        write_error = Some(e.to_string());
                    }
                }
            }
            ScanOutcome::Empty => {
                tracing::info!("{}:{} produced no report after {:.1?}", host, port, elapsed);
            }
            ScanOutcome::Timeout => {
                tracing::warn!("Timeout expired for {}:{} after {:.1?}", host, port, elapsed);
            }
            ScanOutcome::Error(message) => {
                tracing::error!("TLS scanning error for {}:{} ({})", host, port, message);
            }
        }
        if let Some(message) = write_error {
            outcome = ScanOutcome::Error(message);
        }

        progress.advance(format!("{}:{} {}", host, port, outcome.label()));
        results.push(HostScanResult {
            host: host.to_string(),
            port,
            outcome,
            saved_to,
            elapsed,
        });
    }

    let elapsed = started.elapsed();
    progress.finish(format!("TLS scan for {} hosts done", total));
    tracing::info!("TLS scan for {} hosts finished in {:.1?}", total, elapsed);

    DeepScanReport { results, elapsed }
}
