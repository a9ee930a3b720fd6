// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Retrieve CodeBits for the first time.

use crate::{
    fetch::{FetchError, Transport},
    prompt::Prompter,
    sync::{read_remote, Origin, Result, SyncError, Syncer},
    version::Version,
};

use std::{
    ffi::OsStr,
    io::ErrorKind,
    path::{Component, Path, PathBuf},
};
use tracing::{debug, info, instrument, warn};

/// Outcome of retrieving a CodeBit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrieveOutcome {
    /// CodeBit was placed at path.
    Retrieved { path: PathBuf, version: Version },

    /// Something already exists at path. Nothing changed.
    DestinationExists { path: PathBuf },
}

impl RetrieveOutcome {
    pub(crate) fn report(&self, url: &str) {
        match self {
            Self::Retrieved { path, version } => {
                info!("retrieved {:?} at version {version} from {url}", path.display())
            }
            Self::DestinationExists { path } => warn!(
                "{:?} already exists, use 'codebit update' to update it instead",
                path.display()
            ),
        }
    }
}

impl<T, P> Syncer<T, P>
where
    T: Transport,
    P: Prompter,
{
    /// Retrieve CodeBit at URL into target directory.
    ///
    /// The name of the master copy becomes the file name. Nothing is ever
    /// overwritten.
    ///
    /// # Errors
    ///
    /// - Return [`SyncError::Fetch`] if master copy cannot be fetched or moved
    ///   into place.
    /// - Return [`SyncError::Syntax`] or [`SyncError::Validation`] if master
    ///   copy has bad metadata, including a missing name.
    /// - Return [`SyncError::UnsafeName`] if name is not a plain file name.
    #[instrument(skip(self, dest_dir), level = "debug")]
    pub async fn retrieve(&self, url: &str, dest_dir: impl AsRef<Path>) -> Result<RetrieveOutcome> {
        let dest_dir = dest_dir.as_ref();
        let download = self.fetcher.fetch(url, dest_dir).await?;
        debug!("remote fetched into {:?}", download.path().display());

        let remote = read_remote(&download)?;
        let name = remote
            .require_name()
            .map_err(|source| SyncError::Validation {
                source,
                origin: Origin::Remote(url.to_string()),
            })?;
        let dest = dest_dir.join(plain_file_name(name)?);
        debug!("remote validated at version {}", remote.version);

        if dest.exists() {
            return Ok(RetrieveOutcome::DestinationExists { path: dest });
        }

        match download.place(&dest) {
            Ok(path) => Ok(RetrieveOutcome::Retrieved {
                path,
                version: remote.version,
            }),
            // INVARIANT: Something appeared at destination after the existence
            //   check. Still never overwrite it.
            Err(FetchError::Commit { source, .. }) if source.kind() == ErrorKind::AlreadyExists => {
                Ok(RetrieveOutcome::DestinationExists { path: dest })
            }
            Err(err) => Err(err.into()),
        }
    }
}

fn plain_file_name(name: &str) -> Result<&OsStr> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(file_name)), None) if !name.contains(['/', '\\']) => {
            Ok(file_name)
        }
        _ => Err(SyncError::UnsafeName(name.to_string())),
    }
}
