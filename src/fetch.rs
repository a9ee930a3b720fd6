// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Remote content retrieval.
//!
//! The master copy of a CodeBit is always downloaded into a temporary file
//! that lives next to its final destination. Keeping both in the same
//! directory means that committing the download is a rename on one volume,
//! which is as close to atomic as the file system allows.
//!
//! # Temporary File Ownership
//!
//! A [`Download`] exclusively owns its temporary file. The file disappears
//! when the download is dropped, unless it was committed through
//! [`Download::replace`] or [`Download::place`] first. Thus, early returns,
//! errors, and declined updates all converge on the same cleanup path.
//!
//! # See Also
//!
//! - [`http`] for the default transport.

pub mod http;

pub use http::HttpTransport;

use async_trait::async_trait;
use std::{
    fs::{metadata, read, set_permissions},
    io::Write,
    path::{Path, PathBuf},
};
use tempfile::{Builder, NamedTempFile};
use tracing::{debug, instrument};

const TEMP_PREFIX: &str = ".codebit-";
const TEMP_SUFFIX: &str = ".tmp";

/// Layer of indirection for fetching remote content.
///
/// Implementations must never serve cached content, because master copies
/// are mutable.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Write full body found at URL into sink.
    ///
    /// Returns number of bytes written.
    async fn get(&self, url: &str, sink: &mut (dyn Write + Send)) -> Result<u64, TransportError>;
}

/// Transport failed to deliver content.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    /// Status code of response if any was received.
    pub status: Option<u16>,

    /// Human readable reason.
    pub message: String,
}

impl TransportError {
    /// Construct new transport error.
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// Fetch remote content into temporary files.
#[derive(Debug, Clone)]
pub struct Fetcher<T>
where
    T: Transport,
{
    transport: T,
}

impl<T> Fetcher<T>
where
    T: Transport,
{
    /// Construct new fetcher over a transport.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Download URL into fresh temporary file inside working directory.
    ///
    /// # Errors
    ///
    /// - Return [`FetchError::TempFile`] if temporary file cannot be created.
    /// - Return [`FetchError::Transport`] if transport fails.
    /// - Return [`FetchError::Write`] if downloaded content cannot be flushed.
    ///
    /// No temporary file is left behind upon error.
    #[instrument(skip(self, working_dir), level = "debug")]
    pub async fn fetch(&self, url: &str, working_dir: impl AsRef<Path>) -> Result<Download> {
        let working_dir = working_dir.as_ref();
        let mut file = Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(working_dir)
            .map_err(|source| FetchError::TempFile {
                source,
                dir: working_dir.to_path_buf(),
            })?;
        debug!("download {url} into {:?}", file.path().display());

        let size = self
            .transport
            .get(url, file.as_file_mut())
            .await
            .map_err(|err| FetchError::Transport {
                url: url.to_string(),
                status: err.status,
                message: err.message,
            })?;

        file.as_file()
            .sync_all()
            .map_err(|source| FetchError::Write {
                source,
                path: file.path().to_path_buf(),
            })?;
        debug!("downloaded {size} bytes from {url}");

        Ok(Download {
            file,
            url: url.to_string(),
        })
    }
}

/// Downloaded content held in an exclusively owned temporary file.
///
/// Dropping a download deletes its temporary file.
#[derive(Debug)]
pub struct Download {
    file: NamedTempFile,
    url: String,
}

impl Download {
    /// Path to temporary file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// URL the content came from.
    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Read downloaded content as text.
    ///
    /// Invalid UTF-8 is replaced rather than rejected, because only the
    /// metadata block needs to be readable.
    ///
    /// # Errors
    ///
    /// - Return [`FetchError::Read`] if temporary file cannot be read.
    pub fn read_to_string(&self) -> Result<String> {
        read(self.path())
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .map_err(|source| FetchError::Read {
                source,
                path: self.path().to_path_buf(),
            })
    }

    /// Commit download by atomically replacing existing destination.
    ///
    /// Permissions of the destination are carried over to the new content.
    /// The original content stays untouched if anything fails.
    ///
    /// # Errors
    ///
    /// - Return [`FetchError::Commit`] if destination cannot be replaced.
    #[instrument(skip(self, dest), level = "debug")]
    pub fn replace(self, dest: impl AsRef<Path>) -> Result<PathBuf> {
        let dest = dest.as_ref();
        let commit_error = |source| FetchError::Commit {
            source,
            dest: dest.to_path_buf(),
        };

        let permissions = metadata(dest).map_err(commit_error)?.permissions();
        set_permissions(self.file.path(), permissions).map_err(commit_error)?;
        self.file
            .persist(dest)
            .map_err(|err| commit_error(err.error))?;
        debug!("replaced {:?}", dest.display());

        Ok(dest.to_path_buf())
    }

    /// Commit download to destination that must not exist yet.
    ///
    /// Never overwrites anything. The temporary file is deleted if the
    /// destination turns out to exist.
    ///
    /// # Errors
    ///
    /// - Return [`FetchError::Commit`] if destination cannot be created. The
    ///   error kind is [`std::io::ErrorKind::AlreadyExists`] if something is
    ///   already there.
    #[instrument(skip(self, dest), level = "debug")]
    pub fn place(self, dest: impl AsRef<Path>) -> Result<PathBuf> {
        let dest = dest.as_ref();
        self.file
            .persist_noclobber(dest)
            .map_err(|err| FetchError::Commit {
                source: err.error,
                dest: dest.to_path_buf(),
            })?;
        debug!("placed {:?}", dest.display());

        Ok(dest.to_path_buf())
    }
}

/// Fetch adapter error types.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// HTTP client cannot be constructed.
    #[error("failed to construct HTTP client")]
    Client(#[from] reqwest::Error),

    /// Transport failed to retrieve content.
    #[error("failed to fetch {url}: {message}{}", status.map(|code| format!(" (status {code})")).unwrap_or_default())]
    Transport {
        url: String,
        status: Option<u16>,
        message: String,
    },

    /// Temporary file cannot be created.
    #[error("failed to create temporary file in {:?}", dir.display())]
    TempFile {
        #[source]
        source: std::io::Error,
        dir: PathBuf,
    },

    /// Temporary file cannot be written to.
    #[error("failed to write temporary file {:?}", path.display())]
    Write {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Temporary file cannot be read from.
    #[error("failed to read temporary file {:?}", path.display())]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Temporary file cannot be moved into place.
    #[error("failed to move download into {:?}", dest.display())]
    Commit {
        #[source]
        source: std::io::Error,
        dest: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = FetchError> = std::result::Result<T, E>;
