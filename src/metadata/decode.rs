// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Metadata block decoding.
//!
//! A CodeBit embeds its metadata in a comment that suits the language of the
//! file. The block itself is a tiny subset of YAML:
//!
//! ```text
//! ---
//! name: Example.cs
//! version: 1.4
//! url: https://example.org/Example.cs
//! keywords: CodeBit, #sync
//! ...
//! ```
//!
//! Only flat `key: value` pairs are supported. A full YAML parser is not used
//! on purpose, because `#` starts a YAML comment, and keywords commonly look
//! like hashtags. Plain values would also lose their text, e.g., "1.10" would
//! come back as the float 1.1.
//!
//! Everything outside of the block is ignored. Marker lines are compared after
//! trimming surrounding whitespace so that indented comment blocks still work.

use std::collections::BTreeMap;

/// Flat mapping of metadata keys to their raw values.
pub type MetadataMap = BTreeMap<String, String>;

const BLOCK_START: &str = "---";
const BLOCK_END: &str = "...";

/// Decode metadata block from surrounding text.
///
/// Values can be wrapped in single or double quotes, which get removed. The
/// first `:` of a line separates key from value. Blank lines inside the block
/// are skipped.
///
/// # Errors
///
/// - Return [`SyntaxError::MissingBlock`] if no start marker exists.
/// - Return [`SyntaxError::Unterminated`] if start marker is never closed.
/// - Return [`SyntaxError::MalformedLine`] if a line is not a `key: value`
///   pair.
pub fn decode(text: &str) -> Result<MetadataMap> {
    // INVARIANT: A byte order mark is not whitespace, so trimming keeps it.
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text
        .lines()
        .enumerate()
        .skip_while(|(_, line)| line.trim() != BLOCK_START);

    if lines.next().is_none() {
        return Err(SyntaxError::MissingBlock);
    }

    let mut mapping = MetadataMap::new();
    for (index, line) in lines {
        let line = line.trim();
        if line == BLOCK_END {
            return Ok(mapping);
        }

        if line.is_empty() {
            continue;
        }

        let (key, value) = line.split_once(':').ok_or_else(|| SyntaxError::MalformedLine {
            line: index + 1,
            content: line.to_string(),
        })?;

        let key = key.trim();
        if key.is_empty() {
            return Err(SyntaxError::MalformedLine {
                line: index + 1,
                content: line.to_string(),
            });
        }

        mapping.insert(key.to_string(), unquote(value.trim()).to_string());
    }

    Err(SyntaxError::Unterminated)
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }

    value
}

/// Metadata block is malformed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    /// No line consisting of "---" was found.
    #[error("no metadata block found")]
    MissingBlock,

    /// Start marker has no matching "..." line.
    #[error("metadata block is never terminated with '...'")]
    Unterminated,

    /// Line inside of block is not a key-value pair.
    #[error("malformed metadata at line {line}: {content:?}")]
    MalformedLine { line: usize, content: String },
}

/// Friendly result alias :3
type Result<T, E = SyntaxError> = std::result::Result<T, E>;
