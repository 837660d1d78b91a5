use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Writes `content` to a sibling temp file, syncs it and renames it over
/// `path`, creating the parent directory when needed. An existing file is
/// replaced.
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> io::Result<()> {
    let path = path.as_ref();
    let parent = path.parent().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid path {:?}: no parent directory", path),
        )
    })?;

    if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("tmp");

    let mut file = fs::File::create(&tmp_path)?;
    file.write_all(content)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp_path, path)
}
