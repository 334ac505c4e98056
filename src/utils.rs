use std::io;
use thiserror::Error;

use crate::grammar::Grammar;
use crate::lexer::State;

/// The cause of a malformed rule, as reported by the rule lexer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("expected {expected:?} but got {found:?}")]
    Expected {
        expected: char,
        found: char,
        state: State,
    },

    #[error("unexpected {found:?} while reading {state}")]
    Unexpected { found: char, state: State },

    #[error("empty option for rule")]
    EmptyOption,

    #[error("empty rule name")]
    EmptyName,

    #[error("empty rule reference")]
    EmptyReference,

    #[error("malformed escape sequence: {0}")]
    MalformedEscape(String),

    #[error("newline in string literal")]
    NewlineInLiteral,

    #[error("unexpected end of input")]
    UnexpectedEof,
}

/// Custom error types for reading and sampling grammars
#[derive(Error, Debug)]
pub enum GrammarError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: {cause}")]
    Syntax {
        line: usize,
        #[source]
        cause: SyntaxError,
    },

    #[error("rule {0:?} not found")]
    UnresolvedReference(String),

    #[error("no expansions for rule {0:?}")]
    NoExpansions(String),

    #[error("grammar has no rules")]
    EmptyGrammar,

    #[error("expansion of rule {rule:?} exceeds maximum depth {limit}")]
    DepthExceeded { rule: String, limit: usize },
}

impl GrammarError {
    /// The 1-based source line of a syntax error, if this is one
    pub fn line(&self) -> Option<usize> {
        match self {
            GrammarError::Syntax { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// Result type for grammar operations
pub type Result<T> = std::result::Result<T, GrammarError>;

/// A failed grammar read.
///
/// Reading stops at the first error, but the rules parsed before it are kept
/// in `partial` so callers can still inspect them.
#[derive(Error, Debug)]
#[error("read BNF grammar: {error}")]
pub struct ReadError {
    #[source]
    pub error: GrammarError,
    pub partial: Grammar,
}

impl ReadError {
    /// Split into the underlying error and the grammar read so far
    pub fn into_parts(self) -> (GrammarError, Grammar) {
        (self.error, self.partial)
    }
}

impl From<ReadError> for GrammarError {
    fn from(err: ReadError) -> Self {
        err.error
    }
}

/// Trait extension for Option<T> to convert a failed rule lookup into a GrammarError
pub trait OptionExt<T> {
    fn or_unresolved(self, name: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_unresolved(self, name: &str) -> Result<T> {
        self.ok_or_else(|| GrammarError::UnresolvedReference(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_message() {
        let err = GrammarError::Syntax {
            line: 3,
            cause: SyntaxError::Unexpected {
                found: '%',
                state: State::ExprSpace,
            },
        };
        assert_eq!(err.to_string(), "line 3: unexpected '%' while reading expression");
        assert_eq!(err.line(), Some(3));

        let err = SyntaxError::Expected {
            expected: '=',
            found: '\n',
            state: State::Equal,
        };
        assert_eq!(err.to_string(), r"expected '=' but got '\n'");
    }

    #[test]
    fn test_option_ext() {
        let found: Option<u8> = Some(1);
        assert_eq!(found.or_unresolved("a").unwrap(), 1);

        let missing: Option<u8> = None;
        let err = missing.or_unresolved("nope").unwrap_err();
        assert!(matches!(err, GrammarError::UnresolvedReference(ref n) if n == "nope"));
        assert_eq!(err.to_string(), "rule \"nope\" not found");
        assert_eq!(err.line(), None);
    }

    #[test]
    fn test_read_error_keeps_partial() {
        let partial: Grammar = "<a> ::= \"x\"".parse().unwrap();
        let err = ReadError {
            error: GrammarError::Syntax {
                line: 2,
                cause: SyntaxError::EmptyOption,
            },
            partial,
        };
        assert_eq!(err.to_string(), "read BNF grammar: line 2: empty option for rule");

        let (error, partial) = err.into_parts();
        assert_eq!(error.line(), Some(2));
        assert_eq!(partial.len(), 1);
    }
}
