use crate::config::DetectionConfig;
use crate::core::errors::GrinderError;
use crate::core::models::CertificateMetadata;
use crate::core::registry::HostRegistry;
use crate::discovery::{DiscoveryEngine, ScanTarget};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DetectionSummary {
    pub hosts_with_ports: usize,
    pub hosts_with_tls: usize,
}

/// Service scan of the online hosts with the certificate script enabled.
/// Fills `open_ports`, `tls_ports` and `certificate` on each reported host.
/// When several ports present a certificate the last one processed is kept.
pub async fn detect(
    registry: &mut HostRegistry,
    engine: &dyn DiscoveryEngine,
    online: &[String],
    config: &DetectionConfig,
) -> Result<DetectionSummary, GrinderError> {
    let mut summary = DetectionSummary::default();
    if online.is_empty() {
        tracing::info!("No online hosts, skipping TLS port detection");
        return Ok(summary);
    }

    let targets: Vec<ScanTarget> = online.iter().map(ScanTarget::host).collect();
    let arguments = config.scan_arguments();
    tracing::info!(
        "Detecting TLS ports on {} hosts with {} ({} workers)",
        targets.len(),
        engine.name(),
        config.workers
    );

    let report = engine.scan(&targets, &arguments, config.workers).await?;

    for (address, scan) in report {
        if scan.tcp.is_empty() {
            continue;
        }
        let Some(host) = registry.get_mut(&address) else {
            tracing::debug!("Engine reported unknown host {}", address);
            continue;
        };

        for (port, service) in &scan.tcp {
            host.record_open_port(*port);
            let Some(cert) = service.ssl_cert() else {
                continue;
            };
            if CertificateMetadata::looks_like_certificate(cert) {
                let certificate = CertificateMetadata::new(*port, cert);
                tracing::debug!(
                    "{}:{} presents a certificate (subject: {}, issuer: {})",
                    address,
                    port,
                    certificate.subject().unwrap_or("-"),
                    certificate.issuer().unwrap_or("-")
                );
                host.record_tls_port(certificate);
            }
        }

        summary.hosts_with_ports += 1;
        if !host.tls_ports.is_empty() {
            summary.hosts_with_tls += 1;
        }
    }

    tracing::info!(
        "{} hosts with open ports, {} with TLS",
        summary.hosts_with_ports,
        summary.hosts_with_tls
    );
    Ok(summary)
}
