use crate::services::progress::Progress;
use crate::utils::naming::NamingScheme;
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, warn};

const CHUNK_SIZE: usize = 64 * 1024;

/// Fresh names tried before giving up on a directory
const MAX_NAME_ATTEMPTS: usize = 8;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("no unused file name left in {0}")]
    NamesExhausted(PathBuf),

    #[error("source {path} is not available: {source}")]
    SourceUnavailable { path: PathBuf, source: io::Error },

    #[error("failed to create {path}: {source}")]
    CreateDestination { path: PathBuf, source: io::Error },

    #[error("failed to copy into {path}: {source}")]
    Copy { path: PathBuf, source: io::Error },
}

#[derive(Debug, Clone)]
pub struct StoredFile {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
}

#[async_trait]
pub trait StorageService: Send + Sync {
    /// Writes `data` into `dir` under a name drawn from `naming`.
    /// Existing files are never replaced.
    async fn store_new(
        &self,
        dir: &Path,
        naming: &NamingScheme,
        data: &[u8],
    ) -> Result<StoredFile, StorageError>;

    /// Copies `source` to `destination`, truncating the destination.
    /// The source is checked before the destination is touched.
    async fn copy_file(&self, source: &Path, destination: &Path) -> Result<u64, StorageError>;
}

/// Flat directories on the local filesystem
#[derive(Debug, Clone, Default)]
pub struct LocalStorageService;

impl LocalStorageService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StorageService for LocalStorageService {
    async fn store_new(
        &self,
        dir: &Path,
        naming: &NamingScheme,
        data: &[u8],
    ) -> Result<StoredFile, StorageError> {
        create_dir(dir).await.map_err(|source| StorageError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;

        for _ in 0..MAX_NAME_ATTEMPTS {
            let name = naming.next_name();
            let path = dir.join(&name);

            let file = match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    debug!("Name {} already taken, drawing another", name);
                    continue;
                }
                Err(source) => return Err(StorageError::Write { path, source }),
            };

            let mut progress = Progress::new(format!("write {}", name), data.len() as u64);
            if let Err(source) = write_chunks(file, data, &mut progress).await {
                if let Err(e) = fs::remove_file(&path).await {
                    warn!("Could not remove partial file {}: {}", path.display(), e);
                }
                return Err(StorageError::Write { path, source });
            }

            return Ok(StoredFile {
                name,
                path,
                size: progress.finish(),
            });
        }

        Err(StorageError::NamesExhausted(dir.to_path_buf()))
    }

    async fn copy_file(&self, source: &Path, destination: &Path) -> Result<u64, StorageError> {
        let unavailable = |e: io::Error| StorageError::SourceUnavailable {
            path: source.to_path_buf(),
            source: e,
        };
        let cannot_create = |e: io::Error| StorageError::CreateDestination {
            path: destination.to_path_buf(),
            source: e,
        };

        let mut reader = File::open(source).await.map_err(unavailable)?;
        let metadata = reader.metadata().await.map_err(unavailable)?;
        if !metadata.is_file() {
            return Err(unavailable(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a regular file",
            )));
        }

        if let Some(parent) = destination.parent() {
            create_dir(parent).await.map_err(cannot_create)?;
        }

        if same_file(source, destination).await {
            return Err(cannot_create(io::Error::new(
                io::ErrorKind::InvalidInput,
                "source and destination are the same file",
            )));
        }

        let mut writer = File::create(destination).await.map_err(cannot_create)?;
        let mut progress = Progress::new(
            format!("copy {}", destination.display()),
            metadata.len(),
        );

        let copied = async {
            let mut buffer = vec![0u8; CHUNK_SIZE];
            loop {
                let n = reader.read(&mut buffer).await?;
                if n == 0 {
                    break;
                }
                writer.write_all(&buffer[..n]).await?;
                progress.advance(n);
            }
            writer.flush().await
        }
        .await;

        if let Err(e) = copied {
            drop(writer);
            if let Err(rm) = fs::remove_file(destination).await {
                warn!(
                    "Could not remove partial copy {}: {}",
                    destination.display(),
                    rm
                );
            }
            return Err(StorageError::Copy {
                path: destination.to_path_buf(),
                source: e,
            });
        }

        Ok(progress.finish())
    }
}

async fn create_dir(dir: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(0o777);
    builder.create(dir).await
}

async fn write_chunks(mut file: File, data: &[u8], progress: &mut Progress) -> io::Result<()> {
    for chunk in data.chunks(CHUNK_SIZE) {
        file.write_all(chunk).await?;
        progress.advance(chunk.len());
    }
    file.flush().await
}

async fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a).await, fs::canonicalize(b).await) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
