// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Update local CodeBits.
//!
//! An update walks through the following states:
//!
//! ```text
//! Start -> LocalLoaded -> LocalValidated -> RemoteFetched -> RemoteValidated
//!       -> Compared -> UpToDate | LocalNewer | PendingConfirmation
//!       PendingConfirmation -> Applied | Declined
//! ```
//!
//! Any state can bail out with a [`SyncError`]. Everything up to `Compared`
//! is shared with [`Syncer::check`], which simply stops there.

use crate::{
    fetch::{Download, Transport},
    metadata::CodeBitDescriptor,
    prompt::Prompter,
    sync::{read_local, read_remote, Result, Syncer},
    version::Version,
};

use std::{
    cmp::Ordering,
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument, warn};

/// Result of comparing the master copy's version against the local one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Local copy is newer than its master copy.
    LocalNewer,

    /// Both copies have the same version.
    Equal,

    /// Master copy is newer than local copy.
    RemoteNewer,
}

impl Comparison {
    /// Compare remote version against local version.
    pub fn of(remote: &Version, local: &Version) -> Self {
        match remote.cmp(local) {
            Ordering::Less => Self::LocalNewer,
            Ordering::Equal => Self::Equal,
            Ordering::Greater => Self::RemoteNewer,
        }
    }
}

/// Outcome of updating a local CodeBit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Local copy matches master copy. Nothing changed.
    UpToDate { version: Version },

    /// Local copy is newer than master copy. Nothing changed.
    LocalNewer { local: Version, remote: Version },

    /// Local copy was replaced by master copy.
    Updated { from: Version, to: Version },

    /// User declined to replace local copy. Nothing changed.
    Declined { local: Version, remote: Version },
}

impl UpdateOutcome {
    pub(crate) fn report(&self, path: &Path) {
        let path = path.display();
        match self {
            Self::UpToDate { version } => info!("{path} is up to date at version {version}"),
            Self::LocalNewer { local, remote } => warn!(
                "{path} has version {local}, which is newer than master copy version {remote}"
            ),
            Self::Updated { from, to } => info!("{path} updated from version {from} to {to}"),
            Self::Declined { local, remote } => {
                warn!("{path} left at version {local}, master copy has version {remote}")
            }
        }
    }
}

/// Outcome of checking a local CodeBit without changing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    /// Version of local copy.
    pub local: Version,

    /// Version of master copy.
    pub remote: Version,

    /// How the two relate.
    pub comparison: Comparison,
}

impl CheckOutcome {
    pub(crate) fn report(&self, path: &Path) {
        let path = path.display();
        let (local, remote) = (&self.local, &self.remote);
        match self.comparison {
            Comparison::Equal => info!("{path} is up to date at version {local}"),
            Comparison::RemoteNewer => {
                info!("{path} can be updated from version {local} to {remote}")
            }
            Comparison::LocalNewer => warn!(
                "{path} has version {local}, which is newer than master copy version {remote}"
            ),
        }
    }
}

/// One local file and its freshly downloaded master copy.
///
/// Owns the download, so dropping the transaction at any point deletes the
/// temporary file.
#[derive(Debug)]
struct Transaction {
    path: PathBuf,
    local: CodeBitDescriptor,
    remote: CodeBitDescriptor,
    download: Download,
}

impl Transaction {
    fn comparison(&self) -> Comparison {
        Comparison::of(&self.remote.version, &self.local.version)
    }

    fn apply(self) -> Result<UpdateOutcome> {
        self.download.replace(&self.path)?;

        Ok(UpdateOutcome::Updated {
            from: self.local.version,
            to: self.remote.version,
        })
    }
}

impl<T, P> Syncer<T, P>
where
    T: Transport,
    P: Prompter,
{
    /// Update local CodeBit at target path.
    ///
    /// Asks for confirmation before replacing the local copy with a newer
    /// master copy. The local copy is never touched otherwise.
    ///
    /// # Errors
    ///
    /// - Return [`SyncError::ReadLocal`](crate::sync::SyncError::ReadLocal)
    ///   if local copy cannot be read.
    /// - Return [`SyncError::Syntax`](crate::sync::SyncError::Syntax) or
    ///   [`SyncError::Validation`](crate::sync::SyncError::Validation) if
    ///   either copy has bad metadata.
    /// - Return [`SyncError::Fetch`](crate::sync::SyncError::Fetch) if master
    ///   copy cannot be fetched or moved into place.
    /// - Return [`SyncError::Prompt`](crate::sync::SyncError::Prompt) if
    ///   confirmation cannot be obtained.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()), level = "debug")]
    pub async fn update(&mut self, path: impl AsRef<Path>) -> Result<UpdateOutcome> {
        let transaction = self.prepare(path.as_ref()).await?;
        let comparison = transaction.comparison();
        debug!("compared: {comparison:?}");

        let local = transaction.local.version.clone();
        let remote = transaction.remote.version.clone();
        match comparison {
            Comparison::Equal => Ok(UpdateOutcome::UpToDate { version: local }),
            Comparison::LocalNewer => Ok(UpdateOutcome::LocalNewer { local, remote }),
            Comparison::RemoteNewer => {
                let question = format!(
                    "Update {:?} from version {local} to {remote}?",
                    transaction.path.display()
                );
                if !self.prompter.confirm(&question)? {
                    debug!("declined");
                    return Ok(UpdateOutcome::Declined { local, remote });
                }

                transaction.apply()
            }
        }
    }

    /// Compare local CodeBit at target path against its master copy.
    ///
    /// Never prompts, and never changes anything.
    ///
    /// # Errors
    ///
    /// - Same as [`Syncer::update`], minus prompt failures.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()), level = "debug")]
    pub async fn check(&self, path: impl AsRef<Path>) -> Result<CheckOutcome> {
        let transaction = self.prepare(path.as_ref()).await?;

        Ok(CheckOutcome {
            comparison: transaction.comparison(),
            local: transaction.local.version,
            remote: transaction.remote.version,
        })
    }

    async fn prepare(&self, path: &Path) -> Result<Transaction> {
        let local = read_local(path)?;
        debug!("local validated at version {}", local.version);

        // INVARIANT: Download next to the local copy so replacing it is a
        //   rename on the same volume.
        let working_dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let download = self.fetcher.fetch(&local.url, working_dir).await?;
        debug!("remote fetched into {:?}", download.path().display());

        let remote = read_remote(&download)?;
        debug!("remote validated at version {}", remote.version);
        if remote.url != local.url {
            warn!(
                "master copy of {:?} moved from {} to {}",
                path.display(),
                local.url,
                remote.url
            );
        }

        Ok(Transaction {
            path: path.to_path_buf(),
            local,
            remote,
            download,
        })
    }
}
