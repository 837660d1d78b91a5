use anyhow::{Context, Result};
use std::io::IsTerminal;
use tracing::Level;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// `-d` beats `-v`; without either only warnings and errors are shown.
pub fn level_from_flags(verbose: bool, debug: bool) -> Level {
    match (verbose, debug) {
        (_, true) => Level::DEBUG,
        (true, false) => Level::INFO,
        (false, false) => Level::WARN,
    }
}

/// Our own events at `level`, everything else at warn. `RUST_LOG` replaces
/// both when set.
fn filter(level: Level) -> Result<EnvFilter> {
    if let Ok(env) = std::env::var(EnvFilter::DEFAULT_ENV) {
        return EnvFilter::try_new(&env).with_context(|| format!("invalid RUST_LOG {:?}", env));
    }
    EnvFilter::try_new(format!("warn,tlsgrinder={}", level))
        .context("invalid default log directive")
}

/// Installs the stderr subscriber. Colors are dropped when stderr is not a
/// terminal so redirected logs stay free of escape sequences.
pub fn init(level: Level) -> Result<()> {
    tracing_subscriber::registry()
        .with(filter(level)?)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .with_target(level == Level::DEBUG),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}
