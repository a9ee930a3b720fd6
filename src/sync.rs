// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! CodeBit synchronization.
//!
//! The [`Syncer`] brings local CodeBits in line with their master copies. It
//! knows two operations:
//!
//! 1. __Update__ a local file. Its metadata names the URL of the master copy.
//!    The master copy is downloaded, validated, and compared by version. A
//!    newer master copy replaces the local file only after the user agrees.
//! 2. __Retrieve__ a CodeBit for the first time from a URL. The master copy's
//!    name becomes the local file name. Existing files are never overwritten.
//!
//! # Transactions
//!
//! Every file or URL is processed as an independent transaction. A
//! transaction owns at most one [`Download`], and never touches the local file
//! until the download has been fully received and validated. All exit paths,
//! including errors and declined updates, drop the download, which deletes its
//! temporary file.
//!
//! # Failure Handling
//!
//! Batch operations like [`Syncer::update_all`] never stop at a failing item.
//! Each failure is reported on its own, and processing continues with the next
//! item. There is no retry. The user is expected to simply run codebit again.

pub mod retrieve;
pub mod update;

pub use retrieve::RetrieveOutcome;
pub use update::{CheckOutcome, Comparison, UpdateOutcome};

use crate::{
    fetch::{Download, FetchError, Fetcher, Transport},
    metadata::{decode, CodeBitDescriptor, SyntaxError, ValidationError},
    prompt::{PromptError, Prompter},
};

use std::{
    error::Error as StdError,
    fmt::{Display, Formatter, Result as FmtResult},
    fs::read,
    path::{Path, PathBuf},
};
use tracing::{error, instrument, warn};

/// Synchronize local CodeBits with their master copies.
#[derive(Debug)]
pub struct Syncer<T, P>
where
    T: Transport,
    P: Prompter,
{
    pub(crate) fetcher: Fetcher<T>,
    pub(crate) prompter: P,
}

impl<T, P> Syncer<T, P>
where
    T: Transport,
    P: Prompter,
{
    /// Construct new syncer.
    pub fn new(fetcher: Fetcher<T>, prompter: P) -> Self {
        Self { fetcher, prompter }
    }

    /// Prompter used to confirm updates.
    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    /// Update every file in listing one after another.
    ///
    /// Files that turn out to not be CodeBits at all are skipped, because
    /// wildcard patterns commonly select plain source files too.
    #[instrument(skip(self, paths), level = "debug")]
    pub async fn update_all(
        &mut self,
        paths: impl IntoIterator<Item = impl AsRef<Path>>,
    ) -> Summary {
        let mut summary = Summary::default();
        for path in paths {
            let path = path.as_ref();
            match self.update(path).await {
                Ok(outcome) => {
                    outcome.report(path);
                    summary.record_update(&outcome);
                }
                Err(err) => summary.record_failure(path.display(), &err),
            }
        }

        summary
    }

    /// Check every file in listing one after another.
    #[instrument(skip(self, paths), level = "debug")]
    pub async fn check_all(&self, paths: impl IntoIterator<Item = impl AsRef<Path>>) -> Summary {
        let mut summary = Summary::default();
        for path in paths {
            let path = path.as_ref();
            match self.check(path).await {
                Ok(outcome) => {
                    outcome.report(path);
                    summary.record_check(&outcome);
                }
                Err(err) => summary.record_failure(path.display(), &err),
            }
        }

        summary
    }

    /// Retrieve every URL in listing into target directory one after another.
    #[instrument(skip(self, urls, dest_dir), level = "debug")]
    pub async fn retrieve_all(
        &self,
        urls: impl IntoIterator<Item = impl AsRef<str>>,
        dest_dir: impl AsRef<Path>,
    ) -> Summary {
        let mut summary = Summary::default();
        for url in urls {
            let url = url.as_ref();
            match self.retrieve(url, dest_dir.as_ref()).await {
                Ok(outcome) => {
                    outcome.report(url);
                    summary.record_retrieve(&outcome);
                }
                Err(err) => summary.record_failure(url, &err),
            }
        }

        summary
    }
}

/// Load and validate metadata of local file.
///
/// # Errors
///
/// - Return [`SyncError::ReadLocal`] if file cannot be read.
/// - Return [`SyncError::Syntax`] if metadata block is malformed.
/// - Return [`SyncError::Validation`] if metadata does not describe a CodeBit.
pub fn read_local(path: impl AsRef<Path>) -> Result<CodeBitDescriptor> {
    let path = path.as_ref();
    let bytes = read(path).map_err(|source| SyncError::ReadLocal {
        source,
        path: path.to_path_buf(),
    })?;

    describe(
        &String::from_utf8_lossy(&bytes),
        Origin::Local(path.to_path_buf()),
    )
}

/// Load and validate metadata of downloaded master copy.
pub(crate) fn read_remote(download: &Download) -> Result<CodeBitDescriptor> {
    describe(
        &download.read_to_string()?,
        Origin::Remote(download.url().to_string()),
    )
}

fn describe(text: &str, origin: Origin) -> Result<CodeBitDescriptor> {
    let mapping = match decode(text) {
        Ok(mapping) => mapping,
        Err(source) => return Err(SyncError::Syntax { source, origin }),
    };

    CodeBitDescriptor::extract(&mapping).map_err(|source| SyncError::Validation { source, origin })
}

/// Where a piece of metadata came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Local copy at path.
    Local(PathBuf),

    /// Master copy at URL.
    Remote(String),
}

impl Display for Origin {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Local(path) => write!(fmt, "local copy {:?}", path.display()),
            Self::Remote(url) => write!(fmt, "master copy at {url}"),
        }
    }
}

/// Tally of batch results.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// CodeBits retrieved for the first time.
    pub retrieved: usize,

    /// Local copies replaced by newer master copies.
    pub updated: usize,

    /// Local copies with a newer master copy that were left alone.
    pub outdated: usize,

    /// Local copies equal to their master copy.
    pub up_to_date: usize,

    /// Local copies newer than their master copy.
    pub local_newer: usize,

    /// Items skipped, because they are not CodeBits or already exist.
    pub skipped: usize,

    /// Items that failed.
    pub failed: usize,
}

impl Summary {
    fn record_update(&mut self, outcome: &UpdateOutcome) {
        match outcome {
            UpdateOutcome::Updated { .. } => self.updated += 1,
            UpdateOutcome::Declined { .. } => self.outdated += 1,
            UpdateOutcome::UpToDate { .. } => self.up_to_date += 1,
            UpdateOutcome::LocalNewer { .. } => self.local_newer += 1,
        }
    }

    fn record_check(&mut self, outcome: &CheckOutcome) {
        match outcome.comparison {
            Comparison::RemoteNewer => self.outdated += 1,
            Comparison::Equal => self.up_to_date += 1,
            Comparison::LocalNewer => self.local_newer += 1,
        }
    }

    fn record_retrieve(&mut self, outcome: &RetrieveOutcome) {
        match outcome {
            RetrieveOutcome::Retrieved { .. } => self.retrieved += 1,
            RetrieveOutcome::DestinationExists { .. } => self.skipped += 1,
        }
    }

    fn record_failure(&mut self, item: impl Display, err: &SyncError) {
        if err.is_not_a_codebit() {
            warn!("skip {item}: {err}");
            self.skipped += 1;
            return;
        }

        error!("{item}: {}", chain(err));
        self.failed += 1;
    }
}

impl Display for Summary {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        let tally = [
            (self.retrieved, "retrieved"),
            (self.updated, "updated"),
            (self.outdated, "outdated"),
            (self.up_to_date, "up to date"),
            (self.local_newer, "newer than master"),
            (self.skipped, "skipped"),
            (self.failed, "failed"),
        ]
        .into_iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, label)| format!("{count} {label}"))
        .collect::<Vec<_>>();

        if tally.is_empty() {
            return fmt.write_str("nothing to do");
        }

        fmt.write_str(&tally.join(", "))
    }
}

fn chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    message
}

/// All possible per-item failures during synchronization.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Local file cannot be read.
    #[error("failed to read {:?}", path.display())]
    ReadLocal {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Metadata block is malformed.
    #[error("bad metadata in {origin}")]
    Syntax {
        #[source]
        source: SyntaxError,
        origin: Origin,
    },

    /// Metadata does not describe a usable CodeBit.
    #[error("invalid metadata in {origin}")]
    Validation {
        #[source]
        source: ValidationError,
        origin: Origin,
    },

    /// Master copy cannot be fetched or committed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Name of master copy cannot safely be used as file name.
    #[error("refusing to use {0:?} as file name")]
    UnsafeName(String),

    /// User cannot be asked for confirmation.
    #[error(transparent)]
    Prompt(#[from] PromptError),
}

impl SyncError {
    /// Validation failure kind, if any.
    pub fn validation(&self) -> Option<ValidationError> {
        match self {
            Self::Validation { source, .. } => Some(*source),
            _ => None,
        }
    }

    /// Local file is simply not a CodeBit.
    pub fn is_not_a_codebit(&self) -> bool {
        matches!(
            self,
            Self::Validation {
                source: ValidationError::NotACodeBit,
                origin: Origin::Local(_),
            }
        )
    }
}

/// Friendly result alias :3
pub type Result<T, E = SyncError> = std::result::Result<T, E>;
