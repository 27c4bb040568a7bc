//! Validation errors.

use std::fmt;

/// Reason a snippet was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExprError {
    /// The snippet does not parse.
    #[error("syntax error at byte {offset}: {message}")]
    Syntax {
        /// Byte offset into the snippet.
        offset: usize,
        /// What the parser expected or found.
        message: String,
    },
    /// The snippet parses but contains a forbidden construct.
    #[error("{construct} is not allowed (at byte {offset})")]
    Forbidden {
        /// The offending construct.
        construct: Construct,
        /// Byte offset of the construct.
        offset: usize,
    },
}

impl ExprError {
    pub(crate) fn syntax(offset: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            offset,
            message: message.into(),
        }
    }
}

/// Constructs that define callable code or loop without a bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Construct {
    FunctionDeclaration,
    FunctionExpression,
    ArrowFunction,
    Method,
    Accessor,
    ClassDeclaration,
    ClassExpression,
    While,
    DoWhile,
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FunctionDeclaration => "function declaration",
            Self::FunctionExpression => "function expression",
            Self::ArrowFunction => "arrow function",
            Self::Method => "method",
            Self::Accessor => "getter or setter",
            Self::ClassDeclaration => "class declaration",
            Self::ClassExpression => "class expression",
            Self::While => "while loop",
            Self::DoWhile => "do-while loop",
        })
    }
}
