use super::types::GlobalConfig;
use crate::core::errors::GrinderError;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_PATHS: &[&str] = &["./tlsgrinder.toml", "./config/tlsgrinder.toml"];

pub struct ConfigLoader;

impl ConfigLoader {
    /// An explicit path must exist and parse. Without one the default
    /// locations are searched best effort, falling back to defaults.
    pub fn load_with_custom_path(custom_path: Option<&Path>) -> Result<GlobalConfig> {
        if let Some(path) = custom_path {
            return Self::load_from_file(path)
                .with_context(|| format!("Failed to load config from custom path: {:?}", path));
        }

        for path in Self::search_paths() {
            if !path.exists() {
                continue;
            }
            match Self::load_from_file(&path) {
                Ok(config) => {
                    tracing::info!("Loaded configuration from: {:?}", path);
                    return Ok(config);
                }
                Err(e) => {
                    tracing::warn!("Failed to load config from {:?}: {:#}", path, e);
                }
            }
        }

        tracing::info!("No configuration file found, using default settings");
        Ok(GlobalConfig::default())
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = DEFAULT_CONFIG_PATHS.iter().map(PathBuf::from).collect();
        if let Some(dirs) = ProjectDirs::from("", "", "tlsgrinder") {
            paths.push(dirs.config_dir().join("tlsgrinder.toml"));
        }
        paths
    }

    fn load_from_file(path: &Path) -> Result<GlobalConfig> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: GlobalConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {:?}", path))?;

        Self::validate_config(&config)?;
        Ok(config)
    }

    pub fn validate_config(config: &GlobalConfig) -> Result<(), GrinderError> {
        let invalid = |msg: &str| Err(GrinderError::Config(msg.to_string()));

        if config.liveness.group_size == 0 {
            return invalid("liveness.group_size must be greater than 0");
        }
        if config.liveness.ping_args.trim().is_empty() {
            return invalid("liveness.ping_args cannot be empty");
        }
        if config.detection.workers == 0 {
            return invalid("detection.workers must be greater than 0");
        }
        if config.detection.host_timeout_secs == 0 {
            return invalid("detection.host_timeout_secs must be greater than 0");
        }
        if config.detection.script.trim().is_empty() {
            return invalid("detection.script cannot be empty");
        }
        if config.nmap.command.is_empty() {
            return invalid("nmap command cannot be empty");
        }
        if config.tls_scanner.java.is_empty() {
            return invalid("tls_scanner.java cannot be empty");
        }
        if config.tls_scanner.threads == 0 {
            return invalid("tls_scanner.threads must be greater than 0");
        }
        if config.tls_scanner.timeout_secs == 0 {
            return invalid("tls_scanner.timeout_secs must be greater than 0");
        }
        if config.output.tls_subdir.is_empty() || config.output.tls_subdir.contains(['/', '\\']) {
            return invalid("output.tls_subdir must be a single directory name");
        }

        Ok(())
    }
}
