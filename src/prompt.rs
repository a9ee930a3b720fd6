// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Interactive confirmation.

use inquire::{Confirm, InquireError};
use tracing::debug;

/// Ask a yes or no question.
pub trait Prompter {
    /// Block until the user answers.
    ///
    /// # Errors
    ///
    /// - Return [`PromptError`] if an answer cannot be obtained.
    fn confirm(&mut self, question: &str) -> Result<bool>;
}

/// Prompter reading answers from the terminal through inquire.
#[derive(Debug, Default, Clone, Copy)]
pub struct InquirePrompter;

impl Prompter for InquirePrompter {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        match Confirm::new(question).with_default(false).prompt() {
            Ok(answer) => Ok(answer),
            // INVARIANT: Escaping out of the prompt counts as "no".
            Err(InquireError::OperationCanceled) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

/// Prompter that always answers yes.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Prompter for AssumeYes {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        debug!("{question} yes (assumed)");
        Ok(true)
    }
}

impl<P> Prompter for Box<P>
where
    P: Prompter + ?Sized,
{
    fn confirm(&mut self, question: &str) -> Result<bool> {
        (**self).confirm(question)
    }
}

/// Answer to a prompt cannot be obtained.
#[derive(Debug, thiserror::Error)]
#[error("failed to prompt for confirmation")]
pub struct PromptError(#[from] InquireError);

/// Friendly result alias :3
pub type Result<T, E = PromptError> = std::result::Result<T, E>;
