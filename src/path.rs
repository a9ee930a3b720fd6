// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine relevent path information for external files that need to be
//! interacted with, e.g., the configuration file, or the local CodeBits that
//! a file pattern selects.

use glob::{glob_with, MatchOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Determine default absolute path to configuration file.
///
/// Uses XDG Base Directory path `$XDG_CONFIG_HOME/codebit/config.toml` as the
/// default. Does not check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`PathError::NoConfigDir`] if configuration directory cannot be
///   determined.
///
/// # See Also
///
/// - [XDG Base Directory](https://wiki.archlinux.org/title/XDG_Base_Directory)
pub fn default_config_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|path| path.join("codebit").join("config.toml"))
        .ok_or(PathError::NoConfigDir)
}

/// Expand file pattern into listing of matching files.
///
/// The pattern is shell expanded first, so "~/src/*.cs" works even when the
/// shell did not expand it. Wildcards follow glob syntax. Hidden entries only
/// match when the pattern names them explicitly, which keeps leftover
/// temporary downloads out of the listing.
///
/// If `recursive` is set, then the file name portion of the pattern is
/// matched in the pattern's directory, and every directory below it.
///
/// Directories and unreadable entries are skipped. Results are sorted.
///
/// # Errors
///
/// - Return [`PathError::ShellExpansion`] if shell expansion fails.
/// - Return [`PathError::Pattern`] if pattern is not valid glob syntax.
pub fn matching_files(pattern: &str, recursive: bool) -> Result<Vec<PathBuf>> {
    let expanded = shellexpand::full(pattern)?;
    let pattern = if recursive {
        descend(Path::new(expanded.as_ref()))
    } else {
        expanded.into_owned()
    };
    debug!("match files against {pattern:?}");

    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };

    let mut files = Vec::new();
    for entry in glob_with(&pattern, options)? {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(path) => debug!("skip non-file {:?}", path.display()),
            Err(err) => warn!("skip unreadable entry: {err}"),
        }
    }
    files.sort();

    Ok(files)
}

// INVARIANT: "dir/*.cs" becomes "dir/**/*.cs", where "**" also matches "dir"
//   itself.
fn descend(pattern: &Path) -> String {
    match (pattern.parent(), pattern.file_name()) {
        (Some(parent), Some(file_name)) => parent
            .join("**")
            .join(file_name)
            .to_string_lossy()
            .into_owned(),
        _ => pattern.to_string_lossy().into_owned(),
    }
}

/// Path resolution error types.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// Configuration directory cannot be determined.
    #[error("cannot determine absolute path to user's configuration directory")]
    NoConfigDir,

    /// Failed to perform shell expansion on pattern.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),

    /// Pattern is not valid glob syntax.
    #[error(transparent)]
    Pattern(#[from] glob::PatternError),
}

/// Friendly result alias :3
pub type Result<T, E = PathError> = std::result::Result<T, E>;
