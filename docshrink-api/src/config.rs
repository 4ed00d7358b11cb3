use clap::Parser;
use docshrink::storage::{DEFAULT_OUTPUT_DIR, DEFAULT_UPLOAD_DIR};
use docshrink::{Storage, MAX_UPLOAD_SIZE};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Default listen address
pub const DEFAULT_BIND: &str = "0.0.0.0:8000";

/// Server configuration, read from flags with environment fallbacks
#[derive(Debug, Clone, Parser)]
#[command(
    name = "docshrink-api",
    about = "Upload a document, download its optimized copy",
    version
)]
pub struct ApiConfig {
    /// Address to listen on
    #[arg(long, env = "DOCSHRINK_BIND", default_value = DEFAULT_BIND)]
    pub bind: SocketAddr,

    /// Directory for raw uploads
    #[arg(long, env = "DOCSHRINK_UPLOAD_DIR", default_value = DEFAULT_UPLOAD_DIR)]
    pub upload_dir: PathBuf,

    /// Directory for optimized files served by /download
    #[arg(long, env = "DOCSHRINK_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Largest accepted upload, in bytes
    #[arg(long, env = "DOCSHRINK_MAX_UPLOAD_SIZE", default_value_t = MAX_UPLOAD_SIZE)]
    pub max_upload_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: ([0, 0, 0, 0], 8000).into(),
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            max_upload_size: MAX_UPLOAD_SIZE,
        }
    }
}

impl ApiConfig {
    /// Default configuration with both storage areas placed under `root`
    pub fn with_root(root: impl AsRef<Path>) -> Self {
        let storage = Storage::under(root);
        Self {
            upload_dir: storage.upload_dir().to_path_buf(),
            output_dir: storage.output_dir().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn storage(&self) -> Storage {
        Storage::new(&self.upload_dir, &self.output_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_matches_cli_defaults() {
        let parsed = ApiConfig::try_parse_from(["docshrink-api"]).unwrap();
        let default = ApiConfig::default();

        assert_eq!(parsed.bind, default.bind);
        assert_eq!(parsed.upload_dir, default.upload_dir);
        assert_eq!(parsed.output_dir, default.output_dir);
        assert_eq!(parsed.max_upload_size, default.max_upload_size);
        assert_eq!(default.bind.to_string(), DEFAULT_BIND);
    }

    #[test]
    fn test_flags_override_defaults() {
        let parsed = ApiConfig::try_parse_from([
            "docshrink-api",
            "--bind",
            "127.0.0.1:9090",
            "--upload-dir",
            "/tmp/in",
            "--output-dir",
            "/tmp/out",
            "--max-upload-size",
            "1024",
        ])
        .unwrap();

        assert_eq!(parsed.bind.port(), 9090);
        assert_eq!(parsed.storage(), Storage::new("/tmp/in", "/tmp/out"));
        assert_eq!(parsed.max_upload_size, 1024);
    }

    #[test]
    fn test_invalid_bind_rejected() {
        assert!(ApiConfig::try_parse_from(["docshrink-api", "--bind", "not-an-addr"]).is_err());
    }

    #[test]
    fn test_shared_storage_directory_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let shared = temp_dir.path().join("files");
        let parsed = ApiConfig::try_parse_from([
            "docshrink-api",
            "--upload-dir",
            shared.to_str().unwrap(),
            "--output-dir",
            shared.to_str().unwrap(),
        ])
        .unwrap();

        let err = parsed.storage().init().unwrap_err();
        assert!(err.to_string().starts_with("Upload and output directories must differ"));

        assert!(ApiConfig::with_root(temp_dir.path()).storage().init().is_ok());
    }

    #[test]
    fn test_with_root() {
        let config = ApiConfig::with_root("/srv/docshrink");
        assert_eq!(config.upload_dir, PathBuf::from("/srv/docshrink/uploads"));
        assert_eq!(config.output_dir, PathBuf::from("/srv/docshrink/compressed"));
    }
}
