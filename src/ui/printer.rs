use crate::core::models::Reachability;
use crate::pipeline::RunSummary;
use crate::stages::deep_scan::{HostScanResult, ScanOutcome};
use colored::*;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};

pub fn print_summary(summary: &RunSummary) {
    println!("\n{}", "═══════════════════════════════════════".green().bold());
    println!("{}", "tlsgrinder Run Complete".green().bold());
    println!("{}", "═══════════════════════════════════════".green().bold());

    println!(
        "{}",
        format!("Started {}", summary.started_at.format("%Y-%m-%d %H:%M:%S UTC")).dimmed()
    );

    let registry = &summary.registry;
    println!("\n{}", "Hosts:".yellow().bold());
    println!("  Total: {}", registry.len().to_string().bold());
    println!(
        "  Online: {}",
        registry.count(Reachability::Online).to_string().green().bold()
    );
    println!(
        "  Offline: {}",
        registry.count(Reachability::Offline).to_string().red()
    );
    println!(
        "  With open ports: {} (TLS: {})",
        summary.detection.hosts_with_ports, summary.detection.hosts_with_tls
    );

    let deep_scan = &summary.deep_scan;
    if !deep_scan.results.is_empty() {
        println!("\n{}", "TLS scans:".yellow().bold());
        println!("{}", results_table(&deep_scan.results));
    }

    println!(
        "\n  Saved: {}  Empty: {}  Timeout: {}  Errors: {}  ({:.1?})",
        deep_scan.saved().to_string().green().bold(),
        deep_scan.count(|o| matches!(o, ScanOutcome::Empty)),
        deep_scan.count(|o| matches!(o, ScanOutcome::Timeout)).to_string().yellow(),
        deep_scan.count(|o| matches!(o, ScanOutcome::Error(_))).to_string().red(),
        deep_scan.elapsed
    );

    if let Some(path) = &summary.registry_file {
        println!("{}", format!("\nHost registry written to {}", path.display()).dimmed());
    }
}

fn results_table(results: &[HostScanResult]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Host", "Port", "Outcome", "Duration", "Report"]);

    for result in results {
        let outcome = match &result.outcome {
            ScanOutcome::Error(message) => format!("error: {}", message),
            other => other.label().to_string(),
        };
        table.add_row(vec![
            Cell::new(&result.host),
            Cell::new(result.port),
            Cell::new(outcome),
            Cell::new(format!("{:.1?}", result.elapsed)),
            Cell::new(
                result
                    .saved_to
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]);
    }
    table
}
