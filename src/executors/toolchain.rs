use anyhow::{bail, Result};
use which::which;

/// Fails when any of `tools` cannot be resolved on `PATH` (or as a path).
pub fn verify_or_bail(tools: &[&str]) -> Result<()> {
    let mut missing = Vec::new();

    for tool in tools {
        match which(tool) {
            Ok(path) => {
                tracing::debug!("Found {}: {:?}", tool, path);
            }
            Err(_) => {
                missing.push(*tool);
            }
        }
    }

    if !missing.is_empty() {
        bail!(
            "Missing required tools: {}. Install them or rerun with --skip-checks",
            missing.join(", ")
        );
    }

    tracing::info!("All required tools found");
    Ok(())
}
