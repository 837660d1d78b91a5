use crate::config::GlobalConfig;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "tlsgrinder", version, about = "Staged TLS reconnaissance over a host list")]
pub struct Cli {
    /// Host addresses to scan
    #[arg(value_name = "HOST")]
    pub hosts: Vec<String>,

    /// File with hosts: JSON array of {ip, vendor, product} or `address[,vendor[,product]]` lines
    #[arg(short = 'f', long = "hosts-file", value_name = "FILE")]
    pub hosts_file: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Hosts per ping-scan batch
    #[arg(long = "group-size", value_name = "N")]
    pub group_size: Option<usize>,

    /// TLS scanner thread count
    #[arg(long = "threads", value_name = "N")]
    pub threads: Option<usize>,

    /// TLS scanner timeout per host, in seconds
    #[arg(long = "timeout", value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Results root directory
    #[arg(short = 'o', long = "results-dir", value_name = "DIR")]
    pub results_dir: Option<PathBuf>,

    /// Path to the TLS-Scanner jar
    #[arg(long = "scanner-jar", value_name = "JAR")]
    pub scanner_jar: Option<PathBuf>,

    /// Seed for the random TLS port choice
    #[arg(long = "seed", value_name = "SEED")]
    pub seed: Option<u64>,

    /// Verbose human output
    #[arg(short = 'v', long = "verbose", action = ArgAction::SetTrue)]
    pub verbose: bool,

    /// Debug logs (implies verbose)
    #[arg(short = 'd', long = "debug", action = ArgAction::SetTrue)]
    pub debug: bool,

    /// Skip checking that nmap and java are installed
    #[arg(long = "skip-checks", action = ArgAction::SetTrue)]
    pub skip_checks: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut GlobalConfig) {
        if let Some(group_size) = self.group_size {
            config.liveness.group_size = group_size;
        }
        if let Some(threads) = self.threads {
            config.tls_scanner.threads = threads;
        }
        if let Some(timeout) = self.timeout {
            config.tls_scanner.timeout_secs = timeout;
        }
        if let Some(dir) = &self.results_dir {
            config.output.results_root = dir.clone();
        }
        if let Some(jar) = &self.scanner_jar {
            config.tls_scanner.jar = jar.clone();
        }
    }
}
