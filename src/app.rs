use crate::{
    cli::args::Cli,
    config::ConfigLoader,
    core::{input, models::HostInput},
    discovery::NmapEngine,
    executors::{TlsScannerCli, toolchain},
    pipeline::Pipeline,
    ui::printer,
    utils::logging,
};
use anyhow::{Context, Result, bail};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::IsTerminal;

pub async fn run(cli: Cli) -> Result<()> {
    let level = logging::level_from_flags(cli.verbose, cli.debug);
    logging::init(level)?;

    let mut config = ConfigLoader::load_with_custom_path(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    ConfigLoader::validate_config(&config)?;

    let hosts = collect_hosts(&cli)?;
    tracing::info!("Starting tlsgrinder for {} hosts", hosts.len());

    if cli.skip_checks {
        tracing::warn!("Skipping tool checks");
    } else {
        toolchain::verify_or_bail(&[
            config.nmap.command.as_str(),
            config.tls_scanner.java.as_str(),
        ])?;
        if !config.tls_scanner.jar.exists() {
            bail!(
                "TLS scanner jar not found at {:?}; set tls_scanner.jar or pass --scanner-jar",
                config.tls_scanner.jar
            );
        }
    }

    let engine = NmapEngine::new(config.nmap.command.clone())?;
    let assessor = TlsScannerCli::from_config(&config.tls_scanner);
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    // Bars and log lines fight over the terminal, so only draw bars when quiet.
    let show_progress = std::io::stderr().is_terminal() && !cli.verbose && !cli.debug;

    let summary = Pipeline::new(&engine, &assessor, &config)
        .with_progress(show_progress)
        .run(hosts, &mut rng)
        .await
        .context("scan pipeline failed")?;

    printer::print_summary(&summary);
    Ok(())
}

fn collect_hosts(cli: &Cli) -> Result<Vec<HostInput>> {
    let mut hosts = Vec::new();
    if let Some(path) = &cli.hosts_file {
        hosts.extend(
            input::load_hosts_file(path)
                .with_context(|| format!("Failed to read hosts from {:?}", path))?,
        );
    }
    let positional = cli.hosts.join("\n");
    hosts.extend(input::parse_lines(&positional)?);

    if hosts.is_empty() {
        bail!("No hosts given; pass addresses or --hosts-file");
    }
    Ok(hosts)
}
