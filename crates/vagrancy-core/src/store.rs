//! # PathStore: Root-Confined Filesystem Storage
//!
//! Maps a storage root plus a root-relative logical path (`/`-separated)
//! onto filesystem operations. The [`PathStore`] trait is the seam the
//! rest of the crate talks to; [`FsStore`] is the local-disk backend.
//!
//! ## Security Invariant
//!
//! Every operation resolves its relative path through [`resolve`] before
//! touching the filesystem. A path is accepted only if its lexical
//! canonical form is a strict descendant of the root: parent-directory
//! components, absolute paths, drive prefixes, NUL bytes and the empty path
//! are all rejected with [`StoreError::InvalidPath`]. This is the only
//! boundary protecting the host filesystem from crafted identity segments.
//!
//! ## Concurrency
//!
//! No locking. Concurrent writers to one path race and the last completed
//! write wins. A write creates missing parent directories and then the
//! file; a failure part-way leaves the directories behind.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;

use crate::error::StoreError;

/// A boxed stream of bytes, used for both uploads and downloads.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Wrap an in-memory buffer as a single-chunk [`ByteStream`].
pub fn byte_stream(data: impl Into<Bytes>) -> ByteStream {
    let data = data.into();
    Box::pin(futures::stream::once(async move { Ok(data) }))
}

/// A stored payload opened for reading.
pub struct StoredObject {
    /// Size of the payload in bytes at open time.
    pub len: u64,
    /// The payload contents.
    pub body: ByteStream,
}

impl fmt::Debug for StoredObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredObject")
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

impl StoredObject {
    /// Drain the body into memory.
    pub async fn into_vec(mut self) -> Result<Vec<u8>, StoreError> {
        let mut out = Vec::with_capacity(usize::try_from(self.len).unwrap_or(0));
        while let Some(chunk) = self.body.next().await {
            out.extend_from_slice(&chunk?);
        }
        Ok(out)
    }
}

/// Storage backend addressed by root-relative logical paths.
#[async_trait]
pub trait PathStore: Send + Sync {
    /// Whether anything (file or directory) exists at the path.
    async fn exists(&self, relative: &str) -> Result<bool, StoreError>;

    /// Open the file at the path. Fails with `NotFound` if absent.
    async fn read(&self, relative: &str) -> Result<StoredObject, StoreError>;

    /// Write the stream to the path, creating parent directories as needed
    /// and replacing any previous content. Returns the number of bytes written.
    async fn write(&self, relative: &str, data: ByteStream) -> Result<u64, StoreError>;

    /// Remove the file at the path. Fails with `NotFound` if absent.
    /// Emptied parent directories are left in place.
    async fn delete(&self, relative: &str) -> Result<(), StoreError>;

    /// Sorted names of the immediate sub-directories of the path.
    /// Empty when the path does not exist.
    async fn list_dirs(&self, relative: &str) -> Result<Vec<String>, StoreError>;

    /// Check that the storage root is reachable.
    async fn health(&self) -> Result<(), StoreError>;
}

/// Resolve `relative` against `root`, rejecting anything that is not a
/// strict descendant of the root. Performs no filesystem access.
pub fn resolve(root: &Path, relative: &str) -> Result<PathBuf, StoreError> {
    if relative.contains('\0') {
        return Err(StoreError::InvalidPath(format!(
            "{relative:?}: contains a NUL byte"
        )));
    }

    let mut resolved = root.to_path_buf();
    let mut depth = 0usize;
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => {
                resolved.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                return Err(StoreError::InvalidPath(format!(
                    "{relative:?}: parent directory traversal is not allowed"
                )));
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(StoreError::InvalidPath(format!(
                    "{relative:?}: absolute paths are not allowed"
                )));
            }
        }
    }

    if depth == 0 {
        return Err(StoreError::InvalidPath(format!(
            "{relative:?}: does not name anything below the storage root"
        )));
    }
    Ok(resolved)
}

/// Map an I/O error to `NotFound` when it signals absence.
fn absent_or_io(relative: &str, err: std::io::Error) -> StoreError {
    if err.kind() == std::io::ErrorKind::NotFound {
        StoreError::NotFound(relative.to_string())
    } else {
        StoreError::Io(err)
    }
}

/// A [`PathStore`] over a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Create a store rooted at the given directory.
    ///
    /// The directory does not need to exist yet; the first write creates it.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Return the storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, relative: &str) -> Result<PathBuf, StoreError> {
        resolve(&self.root, relative).inspect_err(|err| {
            tracing::warn!(error = %err, "rejected storage path");
        })
    }
}

#[async_trait]
impl PathStore for FsStore {
    async fn exists(&self, relative: &str) -> Result<bool, StoreError> {
        let path = self.resolve(relative)?;
        Ok(fs::try_exists(&path).await?)
    }

    async fn read(&self, relative: &str) -> Result<StoredObject, StoreError> {
        let path = self.resolve(relative)?;
        let file = fs::File::open(&path)
            .await
            .map_err(|e| absent_or_io(relative, e))?;
        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Err(StoreError::NotFound(relative.to_string()));
        }
        Ok(StoredObject {
            len: metadata.len(),
            body: Box::pin(ReaderStream::new(file)),
        })
    }

    async fn write(&self, relative: &str, mut data: ByteStream) -> Result<u64, StoreError> {
        let path = self.resolve(relative)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&path).await?;
        let mut written = 0u64;
        while let Some(chunk) = data.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        tracing::debug!(path = relative, bytes = written, "stored payload");
        Ok(written)
    }

    async fn delete(&self, relative: &str) -> Result<(), StoreError> {
        let path = self.resolve(relative)?;
        fs::remove_file(&path)
            .await
            .map_err(|e| absent_or_io(relative, e))?;
        tracing::debug!(path = relative, "removed payload");
        Ok(())
    }

    async fn list_dirs(&self, relative: &str) -> Result<Vec<String>, StoreError> {
        let path = self.resolve(relative)?;
        let mut entries = match fs::read_dir(&path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            // Non-UTF-8 names cannot have been produced by an identity.
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    async fn health(&self) -> Result<(), StoreError> {
        let metadata = fs::metadata(&self.root).await?;
        if metadata.is_dir() {
            Ok(())
        } else {
            Err(StoreError::Io(std::io::Error::other(format!(
                "storage root {} is not a directory",
                self.root.display()
            ))))
        }
    }
}
