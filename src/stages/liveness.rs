use crate::config::LivenessConfig;
use crate::core::errors::GrinderError;
use crate::core::registry::HostRegistry;
use crate::discovery::{DiscoveryEngine, ScanTarget};
use crate::ui::progress::StageProgress;
use std::collections::HashSet;

/// A fixed-size slice of the host list. The last batch is padded up to
/// the group size; padding is only counted and never reaches the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Batch {
    addresses: Vec<String>,
    padding: usize,
}

impl Batch {
    pub fn capacity(&self) -> usize {
        self.addresses.len() + self.padding
    }

    pub fn targets(&self) -> Vec<ScanTarget> {
        self.addresses.iter().map(ScanTarget::host).collect()
    }
}

/// Splits `hosts` into `ceil(len / group_size)` contiguous batches.
pub fn partition(hosts: &[String], group_size: usize) -> Vec<Batch> {
    let group_size = group_size.max(1);
    hosts
        .chunks(group_size)
        .map(|chunk| Batch {
            addresses: chunk.to_vec(),
            padding: group_size - chunk.len(),
        })
        .collect()
}

/// Reachability-only scan of `hosts`, batch by batch in input order.
/// Returns the addresses reported up. Engine failures propagate.
pub async fn probe(
    engine: &dyn DiscoveryEngine,
    hosts: &[String],
    config: &LivenessConfig,
    progress: &StageProgress,
) -> Result<HashSet<String>, GrinderError> {
    let batches = partition(hosts, config.group_size);
    let total = batches.len();
    let mut alive = HashSet::new();

    for (index, batch) in batches.iter().enumerate() {
        let targets = batch.targets();
        progress.message(format!("pingscan for {} hosts", targets.len()));
        tracing::info!(
            "Ping scan batch {}/{} ({} hosts)",
            index + 1,
            total,
            targets.len()
        );

        let report = engine
            .scan(&targets, &config.ping_args, config.workers)
            .await?;

        alive.extend(
            report
                .into_iter()
                .filter(|(_, host)| host.is_up())
                .map(|(address, _)| address),
        );
        progress.advance(format!("{} up so far", alive.len()));
    }

    progress.finish(format!("pingscan done for {} hosts", hosts.len()));
    Ok(alive)
}

/// Probes every registered host and tags each one online or offline.
pub async fn run(
    registry: &mut HostRegistry,
    engine: &dyn DiscoveryEngine,
    config: &LivenessConfig,
    progress: &StageProgress,
) -> Result<HashSet<String>, GrinderError> {
    let hosts = registry.addresses();
    let alive = probe(engine, &hosts, config, progress).await?;
    registry.apply_liveness(&alive);
    tracing::info!("{} of {} hosts are online", alive.len(), hosts.len());
    Ok(alive)
}
