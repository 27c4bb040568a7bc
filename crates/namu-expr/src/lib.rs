//! Static gate for admin-authored guard expressions.
//!
//! Snippets are parsed as a script and rejected when they define callable
//! code (functions, arrows, methods, accessors, classes) or contain `while`
//! and `do ... while` loops. Nothing is ever evaluated.
//!
//! This blocks node kinds, not behaviour. It keeps cooperative admins from
//! writing runaway guard conditions and is not a sandbox for untrusted
//! input.
//!
//! # Example
//!
//! ```
//! assert!(namu_expr::is_safe("a && b.includes(c)"));
//! assert!(!namu_expr::is_safe("function f(){}"));
//! assert!(!namu_expr::is_safe("while(true){}"));
//! ```

mod ast;
mod error;
mod lexer;
mod parser;
mod validate;

pub use error::{Construct, ExprError};

/// Check a snippet, returning the reason it was rejected.
///
/// A snippet that fails to parse is rejected with [`ExprError::Syntax`].
pub fn check(snippet: &str) -> Result<(), ExprError> {
    let program = parser::parse(snippet)?;
    validate::validate(&program)
}

/// Whether a snippet passes [`check`].
pub fn is_safe(snippet: &str) -> bool {
    match check(snippet) {
        Ok(()) => true,
        Err(err) => {
            tracing::debug!(error = %err, "Rejected expression");
            false
        }
    }
}
