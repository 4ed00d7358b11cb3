//! Input and output storage areas
//!
//! Both areas are plain directories keyed by filename. There is no index
//! and no metadata sidecar; writing a name that already exists replaces the
//! previous file.

use crate::error::{OptimizeError, Result};
use crate::optimizer::Optimizer;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default directory for raw uploads
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Default directory for optimized outputs
pub const DEFAULT_OUTPUT_DIR: &str = "compressed";

/// The pair of directories a deployment reads from and writes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Storage {
    upload_dir: PathBuf,
    output_dir: PathBuf,
}

impl Default for Storage {
    fn default() -> Self {
        Self::new(DEFAULT_UPLOAD_DIR, DEFAULT_OUTPUT_DIR)
    }
}

impl Storage {
    pub fn new(upload_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Both directories as siblings of `root`, using the default names.
    pub fn under(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self::new(root.join(DEFAULT_UPLOAD_DIR), root.join(DEFAULT_OUTPUT_DIR))
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Create both directories if they are absent.
    ///
    /// Fails when both resolve to the same directory, since an output would
    /// then replace the upload it was produced from.
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.upload_dir)?;
        fs::create_dir_all(&self.output_dir)?;
        let resolved = fs::canonicalize(&self.upload_dir)?;
        if resolved == fs::canonicalize(&self.output_dir)? {
            return Err(OptimizeError::SharedDirectory(resolved));
        }
        debug!(
            upload_dir = %self.upload_dir.display(),
            output_dir = %self.output_dir.display(),
            "Storage directories ready"
        );
        Ok(())
    }

    /// A dispatcher writing into this storage's output area
    pub fn optimizer(&self) -> Optimizer {
        Optimizer::new(&self.output_dir)
    }

    pub fn upload_path(&self, filename: &str) -> Result<PathBuf> {
        Ok(self.upload_dir.join(validate_filename(filename)?))
    }

    pub fn output_path(&self, filename: &str) -> Result<PathBuf> {
        Ok(self.output_dir.join(validate_filename(filename)?))
    }

    /// Write raw upload bytes under `filename`, replacing any earlier file.
    pub fn save_upload(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.upload_path(filename)?;
        fs::write(&path, bytes)?;
        debug!(path = %path.display(), size = bytes.len(), "Saved upload");
        Ok(path)
    }

    /// Read an optimized output, or `None` when nothing exists under that name.
    pub fn read_output(&self, filename: &str) -> Result<Option<Vec<u8>>> {
        let path = self.output_path(filename)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Accept only a single, plain path component.
///
/// Rejects empty names, `.` and `..`, anything containing a separator and
/// NUL bytes, so a name can never address a file outside its directory.
pub fn validate_filename(filename: &str) -> Result<&str> {
    let invalid = filename.is_empty()
        || filename == "."
        || filename == ".."
        || filename.contains(['/', '\\', '\0']);

    if invalid {
        return Err(OptimizeError::InvalidFilename(filename.to_string()));
    }
    Ok(filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_validate_filename() {
        assert!(validate_filename("report.pdf").is_ok());
        assert!(validate_filename("my notes..txt").is_ok());
        assert!(validate_filename(".hidden.txt").is_ok());

        for bad in ["", ".", "..", "../etc/passwd", "a/b.txt", "a\\b.txt", "nul\0.txt"] {
            assert!(
                matches!(validate_filename(bad), Err(OptimizeError::InvalidFilename(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_init_creates_directories() {
        let temp_dir = tempdir().unwrap();
        let storage = Storage::under(temp_dir.path().join("nested"));

        storage.init().unwrap();
        assert!(storage.upload_dir().is_dir());
        assert!(storage.output_dir().is_dir());

        // Idempotent
        storage.init().unwrap();
    }

    #[test]
    fn test_init_rejects_shared_directory() {
        let temp_dir = tempdir().unwrap();
        let data = temp_dir.path().join("data");

        let same = Storage::new(&data, &data);
        assert!(matches!(same.init(), Err(OptimizeError::SharedDirectory(_))));

        // Different spellings of one directory are caught too
        let aliased = Storage::new(&data, data.join("..").join("data"));
        assert!(matches!(aliased.init(), Err(OptimizeError::SharedDirectory(_))));
    }

    #[test]
    fn test_save_upload_overwrites() {
        let temp_dir = tempdir().unwrap();
        let storage = Storage::under(temp_dir.path());
        storage.init().unwrap();

        let first = storage.save_upload("a.txt", b"first").unwrap();
        let second = storage.save_upload("a.txt", b"second").unwrap();

        assert_eq!(first, second);
        assert_eq!(fs::read(&second).unwrap(), b"second");
    }

    #[test]
    fn test_read_output_missing() {
        let temp_dir = tempdir().unwrap();
        let storage = Storage::under(temp_dir.path());
        storage.init().unwrap();

        assert_eq!(storage.read_output("nothing.pdf").unwrap(), None);

        fs::write(storage.output_dir().join("present.txt"), b"hi").unwrap();
        assert_eq!(
            storage.read_output("present.txt").unwrap(),
            Some(b"hi".to_vec())
        );
    }

    #[test]
    fn test_traversal_never_leaves_directory() {
        let temp_dir = tempdir().unwrap();
        let storage = Storage::under(temp_dir.path());
        storage.init().unwrap();
        fs::write(temp_dir.path().join("secret.txt"), b"secret").unwrap();

        assert!(storage.read_output("../secret.txt").is_err());
        assert!(storage.save_upload("../escape.txt", b"x").is_err());
        assert!(!temp_dir.path().join("escape.txt").exists());
    }
}
