//! Media fetcher port: resolves a storage reference to a scannable path.
//!
//! Local references are borrowed in place. Remote references are downloaded
//! into a scratch directory; the `ScratchFile` guard removes both file and
//! directory when the source is dropped, on every exit path of the scan.

use crate::models::StorageRef;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

#[cfg(test)]
use mockall::automock;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Download error: {0}")]
    DownloadError(#[from] reqwest::Error),
    #[error("Scratch file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Object store returned status {0} for key '{1}'")]
    NotRetrievable(u16, String),
    #[error("No object store configured for remote media")]
    NoObjectStore,
}

/// A downloaded file inside a temporary directory. Dropping the guard
/// deletes the directory and everything in it.
#[derive(Debug)]
pub struct ScratchFile {
    _dir: TempDir,
    path: PathBuf,
}

impl ScratchFile {
    pub fn new(dir: TempDir, path: PathBuf) -> Self {
        Self { _dir: dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A local path a scanner can read, either borrowed from local storage or
/// owned scratch space holding a downloaded object.
#[derive(Debug)]
pub enum LocalSource {
    Borrowed(PathBuf),
    Scratch(ScratchFile),
}

impl LocalSource {
    pub fn path(&self) -> &Path {
        match self {
            LocalSource::Borrowed(path) => path,
            LocalSource::Scratch(scratch) => scratch.path(),
        }
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    async fn fetch(&self, storage: &StorageRef) -> Result<LocalSource, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ObjectStoreFetcher {
    client: Client,
    base_url: Option<String>,
}

impl ObjectStoreFetcher {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    async fn download(&self, key: &str) -> Result<ScratchFile, FetchError> {
        let base_url = self.base_url.as_ref().ok_or(FetchError::NoObjectStore)?;
        let url = format!("{}/{}", base_url.trim_end_matches('/'), key);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::NotRetrievable(
                response.status().as_u16(),
                key.to_string(),
            ));
        }

        let dir = TempDir::new()?;
        let path = dir.path().join("download");
        let mut file = tokio::fs::File::create(&path).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            file.write_all(&chunk?).await?;
        }
        file.flush().await?;

        Ok(ScratchFile::new(dir, path))
    }
}

#[async_trait]
impl MediaFetcher for ObjectStoreFetcher {
    async fn fetch(&self, storage: &StorageRef) -> Result<LocalSource, FetchError> {
        match storage {
            StorageRef::Local { path } => Ok(LocalSource::Borrowed(PathBuf::from(path))),
            StorageRef::Remote { key } => Ok(LocalSource::Scratch(self.download(key).await?)),
        }
    }
}
