use crate::core::errors::GrinderError;
use crate::core::registry::HostRegistry;
use crate::utils::fs::atomic_write;
use std::fs;
use std::path::{Component, Path, PathBuf};

pub const REPORT_EXTENSION: &str = "txt";
pub const REGISTRY_FILE: &str = "hosts.json";

/// Writes `content` to `<results_root>/<subdirectory>/<filename>.txt`,
/// creating both directories if needed and replacing any earlier file.
/// `filename` must be a single path component.
pub fn write(
    results_root: &Path,
    subdirectory: &str,
    filename: &str,
    content: &str,
) -> Result<PathBuf, GrinderError> {
    let dir = results_root.join(subdirectory);
    let path = dir.join(format!("{}.{}", filename, REPORT_EXTENSION));
    if !is_plain_file_name(filename) || path.parent() != Some(dir.as_path()) {
        return Err(GrinderError::Input(format!(
            "report name {:?} would leave {:?}",
            filename, dir
        )));
    }

    fs::create_dir_all(&dir)?;
    atomic_write(&path, content.as_bytes())?;
    tracing::debug!("Wrote {} bytes to {:?}", content.len(), path);
    Ok(path)
}

fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    !name.contains(['/', '\\'])
        && matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        )
}

/// Report sink bound to one results location.
#[derive(Clone, Debug)]
pub struct ResultWriter {
    root: PathBuf,
    subdirectory: String,
}

impl ResultWriter {
    pub fn new(root: impl Into<PathBuf>, subdirectory: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            subdirectory: subdirectory.into(),
        }
    }

    pub fn report_dir(&self) -> PathBuf {
        self.root.join(&self.subdirectory)
    }

    pub fn write(&self, filename: &str, content: &str) -> Result<PathBuf, GrinderError> {
        write(&self.root, &self.subdirectory, filename, content)
    }

    /// Dumps the host registry next to the report directory.
    pub fn write_registry(&self, registry: &HostRegistry) -> Result<PathBuf, GrinderError> {
        fs::create_dir_all(&self.root)?;
        let json = serde_json::to_string_pretty(registry)
            .map_err(|e| GrinderError::Io(std::io::Error::other(e)))?;
        let path = self.root.join(REGISTRY_FILE);
        atomic_write(&path, json.as_bytes())?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::HostInput;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    #[test]
    fn creates_directories_and_writes_txt() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("results");

        let path = write(&root, "tls", "10.0.0.1-443-Acme_Co-Widget", "report").unwrap();

        assert_eq!(path, root.join("tls").join("10.0.0.1-443-Acme_Co-Widget.txt"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "report");
    }

    #[test]
    fn rewriting_keeps_a_single_file_with_latest_content() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ResultWriter::new(dir.path(), "tls");

        writer.write("host-443-None-None", "old").unwrap();
        let path = writer.write("host-443-None-None", "new").unwrap();

        let entries: Vec<_> = fs::read_dir(writer.report_dir()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(fs::read_to_string(path).unwrap(), "new");
    }

    #[test]
    fn names_that_leave_the_report_dir_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ResultWriter::new(dir.path().join("results"), "tls");

        for name in ["x/../../../outside", "../outside", "..", "a\\b", "nested/report"] {
            let result = writer.write(name, "report");
            assert!(
                matches!(result, Err(GrinderError::Input(_))),
                "{name} was accepted"
            );
        }
        assert!(!dir.path().join("outside.txt").exists());
        assert!(!writer.report_dir().exists());
    }

    #[test]
    fn registry_dump_uses_original_field_names() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ResultWriter::new(dir.path(), "tls");
        let mut registry = HostRegistry::new(vec![HostInput::bare("10.0.0.1")]);
        registry.apply_liveness(&HashSet::from(["10.0.0.1".to_string()]));

        let path = writer.write_registry(&registry).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();

        assert_eq!(json["hosts"][0]["address"], "10.0.0.1");
        assert_eq!(json["hosts"][0]["tls_status"], "online");
        assert!(json["hosts"][0].get("ssl_cert").is_none());
    }
}
