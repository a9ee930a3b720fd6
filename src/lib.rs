// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Keep individually shared source files in sync with their master copy.
//!
//! A __CodeBit__ is a single source file that is shared on its own, rather
//! than as part of a package. It carries a small metadata block inside of a
//! comment:
//!
//! ```text
//! /*
//! ---
//! name: Example.cs
//! description: Example CodeBit
//! url: https://example.org/Example.cs
//! version: 1.4
//! keywords: CodeBit
//! ...
//! */
//! ```
//!
//! The `url` entry points to the canonical master copy of the file. Codebit
//! compares the version of a local copy against the version of its master
//! copy, and replaces the local copy when the master copy is newer. CodeBits
//! can also be retrieved for the first time straight from their URL.
//!
//! # See Also
//!
//! 1. [`metadata`] for recognition rules.
//! 2. [`version`] for version ordering.
//! 3. [`sync`] for update and retrieval.

pub mod config;
pub mod fetch;
pub mod metadata;
pub mod path;
pub mod prompt;
pub mod sync;
pub mod version;
