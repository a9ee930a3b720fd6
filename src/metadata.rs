// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! CodeBit metadata.
//!
//! A __CodeBit__ is a single source file that carries a metadata block naming
//! its canonical master copy and its version. Local and remote copies of a
//! CodeBit are both untrusted text, so their metadata is always validated into
//! a [`CodeBitDescriptor`] before anything else happens to them.
//!
//! # Recognition Rules
//!
//! A metadata mapping describes a CodeBit if and only if:
//!
//! 1. The `keywords` entry contains the token "CodeBit". Keywords are split on
//!    `,` or `;`, each token is trimmed of spaces, tabs, and a leading `#`,
//!    and compared without regard to case.
//! 2. The `version` entry is present.
//! 3. The `url` entry is present.
//!
//! Checks happen in that order, so a file that is not a CodeBit at all is
//! never reported as missing a version.

pub mod decode;

pub use decode::{decode, MetadataMap, SyntaxError};

use crate::version::Version;

use std::fmt::{Display, Formatter, Result as FmtResult};

const CODEBIT_KEYWORD: &str = "CodeBit";

/// Validated view of CodeBit metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBitDescriptor {
    /// Display name, also used as file name upon retrieval.
    pub name: Option<String>,

    /// Brief description of the CodeBit.
    pub description: Option<String>,

    /// Keyword listing in source order.
    pub keywords: Vec<String>,

    /// Opaque version string.
    pub version: Version,

    /// Location of canonical master copy.
    pub url: String,
}

impl CodeBitDescriptor {
    /// Validate metadata mapping into a descriptor.
    ///
    /// Values that are empty after trimming count as absent.
    ///
    /// # Errors
    ///
    /// - Return [`ValidationError::NotACodeBit`] if keywords lack "CodeBit".
    /// - Return [`ValidationError::MissingVersion`] if version is absent.
    /// - Return [`ValidationError::MissingUrl`] if url is absent.
    pub fn extract(mapping: &MetadataMap) -> Result<Self> {
        let keywords = field(mapping, "keywords")
            .map(split_keywords)
            .unwrap_or_default();
        if !keywords
            .iter()
            .any(|keyword| keyword.eq_ignore_ascii_case(CODEBIT_KEYWORD))
        {
            return Err(ValidationError::NotACodeBit);
        }

        let version = field(mapping, "version").ok_or(ValidationError::MissingVersion)?;
        let url = field(mapping, "url").ok_or(ValidationError::MissingUrl)?;

        Ok(Self {
            name: mapping.get("name").cloned(),
            description: mapping.get("description").cloned(),
            keywords,
            version: Version::new(version),
            url: url.to_string(),
        })
    }

    /// Name of CodeBit, which must exist.
    ///
    /// # Errors
    ///
    /// - Return [`ValidationError::MissingName`] if name is absent.
    pub fn require_name(&self) -> Result<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or(ValidationError::MissingName)
    }
}

impl Display for CodeBitDescriptor {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        writeln!(fmt, "name: {}", self.name.as_deref().unwrap_or("<unnamed>"))?;
        if let Some(description) = &self.description {
            writeln!(fmt, "description: {description}")?;
        }
        writeln!(fmt, "version: {}", self.version)?;
        writeln!(fmt, "url: {}", self.url)?;
        write!(fmt, "keywords: {}", self.keywords.join(", "))
    }
}

fn field<'a>(mapping: &'a MetadataMap, key: &str) -> Option<&'a str> {
    mapping
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn split_keywords(keywords: &str) -> Vec<String> {
    keywords
        .split([',', ';'])
        .map(|keyword| {
            keyword
                .trim_matches([' ', '\t'])
                .trim_start_matches('#')
                .to_string()
        })
        .filter(|keyword| !keyword.is_empty())
        .collect()
}

/// Metadata does not describe a usable CodeBit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Keywords do not list "CodeBit".
    #[error("not a CodeBit: keywords do not include 'CodeBit'")]
    NotACodeBit,

    /// Version entry is absent.
    #[error("CodeBit metadata has no 'version'")]
    MissingVersion,

    /// URL entry is absent.
    #[error("CodeBit metadata has no 'url'")]
    MissingUrl,

    /// Name entry is absent, so no file name can be chosen.
    #[error("CodeBit metadata has no 'name' to use as file name")]
    MissingName,
}

/// Friendly result alias :3
type Result<T, E = ValidationError> = std::result::Result<T, E>;
