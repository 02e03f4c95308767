use anyhow::{Result, bail};
use std::env;
use std::path::{Path, PathBuf};

const MIB: usize = 1024 * 1024;

/// Directories and size limits for the transfer endpoints
#[derive(Debug, Clone)]
pub struct TransferConfig {
    /// Destination of single-file uploads (default: "./demo")
    pub upload_dir: PathBuf,

    /// Destination of multi-file uploads (default: "./uploads")
    pub uploads_dir: PathBuf,

    /// Directory downloads are read from (default: "demo")
    pub download_source_dir: PathBuf,

    /// Directory downloads are copied into (default: "test/download")
    pub download_dest_dir: PathBuf,

    /// Ceiling for a single-file upload in bytes (default: 10 MB)
    pub max_single_upload_bytes: usize,

    /// Ceiling for a whole multipart request body in bytes (default: 32 MB)
    pub max_total_multipart_bytes: usize,

    /// Ceiling for each file of a multi-file upload in bytes (default: 10 MB)
    pub max_per_file_multipart_bytes: usize,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("./demo"),
            uploads_dir: PathBuf::from("./uploads"),
            download_source_dir: PathBuf::from("demo"),
            download_dest_dir: PathBuf::from("test/download"),
            max_single_upload_bytes: 10 * MIB,
            max_total_multipart_bytes: 32 * MIB,
            max_per_file_multipart_bytes: 10 * MIB,
        }
    }
}

impl TransferConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup, falling back to defaults
    /// for missing or unparseable values.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();
        let size = |key: &str, fallback: usize| {
            lookup(key)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(fallback)
        };

        Self {
            upload_dir: lookup("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.upload_dir),

            uploads_dir: lookup("UPLOADS_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.uploads_dir),

            download_source_dir: lookup("DOWNLOAD_SOURCE_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.download_source_dir),

            download_dest_dir: lookup("DOWNLOAD_DEST_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.download_dest_dir),

            max_single_upload_bytes: size(
                "MAX_SINGLE_UPLOAD_BYTES",
                default.max_single_upload_bytes,
            ),

            max_total_multipart_bytes: size(
                "MAX_TOTAL_MULTIPART_BYTES",
                default.max_total_multipart_bytes,
            ),

            max_per_file_multipart_bytes: size(
                "MAX_PER_FILE_MULTIPART_BYTES",
                default.max_per_file_multipart_bytes,
            ),
        }
    }

    /// Same limits as the default, with every directory placed under `base`.
    /// Handy for tests and throwaway instances.
    pub fn rooted_at(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        Self {
            upload_dir: base.join("demo"),
            uploads_dir: base.join("uploads"),
            download_source_dir: base.join("demo"),
            download_dest_dir: base.join("test").join("download"),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        let limits = [
            ("max_single_upload_bytes", self.max_single_upload_bytes),
            ("max_total_multipart_bytes", self.max_total_multipart_bytes),
            (
                "max_per_file_multipart_bytes",
                self.max_per_file_multipart_bytes,
            ),
        ];
        for (name, value) in limits {
            if value == 0 {
                bail!("{} must be greater than zero", name);
            }
        }

        if self.max_single_upload_bytes > self.max_total_multipart_bytes {
            tracing::warn!(
                "max_single_upload_bytes ({}) exceeds max_total_multipart_bytes ({}); the body limit wins",
                self.max_single_upload_bytes,
                self.max_total_multipart_bytes
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = TransferConfig::default();
        assert_eq!(config.upload_dir, PathBuf::from("./demo"));
        assert_eq!(config.uploads_dir, PathBuf::from("./uploads"));
        assert_eq!(config.download_source_dir, PathBuf::from("demo"));
        assert_eq!(config.download_dest_dir, PathBuf::from("test/download"));
        assert_eq!(config.max_single_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(config.max_total_multipart_bytes, 32 * 1024 * 1024);
        assert_eq!(config.max_per_file_multipart_bytes, 10 * 1024 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_lookup_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("UPLOAD_DIR", "/srv/in"),
            ("MAX_SINGLE_UPLOAD_BYTES", "2097152"),
            ("MAX_PER_FILE_MULTIPART_BYTES", "not-a-number"),
        ]);
        let config = TransferConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.upload_dir, PathBuf::from("/srv/in"));
        assert_eq!(config.max_single_upload_bytes, 2 * 1024 * 1024);
        // Garbage falls back to the default
        assert_eq!(config.max_per_file_multipart_bytes, 10 * 1024 * 1024);
        assert_eq!(config.uploads_dir, PathBuf::from("./uploads"));
    }

    #[test]
    fn test_rooted_at() {
        let config = TransferConfig::rooted_at("/tmp/x");
        assert_eq!(config.upload_dir, PathBuf::from("/tmp/x/demo"));
        assert_eq!(config.download_source_dir, config.upload_dir);
        assert_eq!(
            config.download_dest_dir,
            PathBuf::from("/tmp/x/test/download")
        );
    }

    #[test]
    fn test_zero_limit_rejected() {
        let config = TransferConfig {
            max_per_file_multipart_bytes: 0,
            ..TransferConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
