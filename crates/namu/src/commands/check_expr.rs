//! `namu check-expr` command implementation.

use std::io::Read;

use clap::Args;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check-expr command.
#[derive(Args)]
pub(crate) struct CheckExprArgs {
    /// Snippet to check; `-` reads it from stdin.
    snippet: String,
}

impl CheckExprArgs {
    /// Execute the check-expr command.
    ///
    /// # Errors
    ///
    /// Returns an error when the snippet is not in the safe subset.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let snippet = if self.snippet == "-" {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        } else {
            self.snippet
        };

        namu_expr::check(&snippet)?;
        output.success("Snippet is safe");
        Ok(())
    }
}
