// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout of the configuration file that codebit uses to simplify
//! the process of serialization and deserialization. The configuration file
//! is optional. Every setting has a sensible default, so a missing file and
//! an empty file behave the same.
//!
//! # General Layout
//!
//! ```toml
//! [fetch]
//! user_agent = "codebit/0.1.0"
//! timeout_secs = 60
//!
//! [update]
//! assume_yes = false
//! recursive = false
//! ```
//!
//! Settings are handed explicitly to whatever needs them. Nothing in here is
//! global state.

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    fs::read_to_string,
    io::ErrorKind,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

/// Full configuration of codebit.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Settings for retrieving master copies.
    pub fetch: FetchSettings,

    /// Settings for updating local copies.
    pub update: UpdateSettings,
}

impl Settings {
    /// Load settings from file at target path.
    ///
    /// Returns default settings if file does not exist.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Read`] if file exists, but cannot be read.
    /// - Return [`ConfigError::Deserialize`] if file content is invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match read_to_string(path) {
            Ok(data) => data.parse(),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("no configuration at {:?}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                source,
                path: path.to_path_buf(),
            }),
        }
    }
}

impl FromStr for Settings {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut settings: Settings = toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Perform shell expansion on user agent so it can carry
        //   things like "$USER".
        settings.fetch.user_agent = shellexpand::full(settings.fetch.user_agent.as_str())
            .map_err(ConfigError::ShellExpansion)?
            .into_owned();

        Ok(settings)
    }
}

impl Display for Settings {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// Settings used to construct the transport.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FetchSettings {
    /// User agent sent along with every request.
    pub user_agent: String,

    /// Give up on a request after this many seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            timeout_secs: None,
        }
    }
}

/// Settings used when updating local copies.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpdateSettings {
    /// Apply newer master copies without asking.
    pub assume_yes: bool,

    /// Descend into subdirectories when matching file patterns.
    pub recursive: bool,
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file cannot be read.
    #[error("failed to read configuration at {:?}", path.display())]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;
