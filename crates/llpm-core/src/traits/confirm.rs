//! Confirmation capability.

use crate::Result;

/// Gates a mutation on a yes/no answer.
///
/// # Examples
///
/// ```
/// use llpm_core::traits::{Confirm, FixedAnswer};
///
/// let yes = FixedAnswer(true);
/// assert!(yes.confirm("Remove lite_tools@1.0.0?").unwrap());
/// ```
pub trait Confirm: Send + Sync {
    /// Asks the question and returns the answer.
    ///
    /// # Errors
    ///
    /// Returns an error if no answer could be obtained (e.g. the terminal
    /// is gone).
    fn confirm(&self, prompt: &str) -> Result<bool>;
}

/// Answers every prompt the same way.
///
/// Backs `--yes` and test fixtures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedAnswer(pub bool);

impl Confirm for FixedAnswer {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        tracing::debug!(prompt, answer = self.0, "auto-answered confirmation");
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_answer() {
        assert!(FixedAnswer(true).confirm("proceed?").unwrap());
        assert!(!FixedAnswer(false).confirm("proceed?").unwrap());
    }

    #[test]
    fn test_object_safe() {
        let boxed: Box<dyn Confirm> = Box::new(FixedAnswer(true));
        assert!(boxed.confirm("proceed?").unwrap());
    }
}
