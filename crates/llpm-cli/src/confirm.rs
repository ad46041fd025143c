//! Terminal confirmation prompts.

use dialoguer::Confirm as Prompt;
use llpm_core::traits::Confirm;
use llpm_core::{Error, Result};
use std::io;

/// Asks on the terminal via `dialoguer`, defaulting to "no".
#[derive(Debug, Default, Clone, Copy)]
pub struct DialoguerConfirm;

impl Confirm for DialoguerConfirm {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        Prompt::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(|e| Error::Io(io::Error::other(e.to_string())))
    }
}
