//! Error types for selection parsing and evaluation
//!
//! Provides error types for all failure modes in the selection system.

use thiserror::Error;

/// Broad classification of a [`ParseError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unrecognized character or token
    Lexical,
    /// Unexpected token, unbalanced parentheses, misplaced operator
    Syntax,
    /// Well-formed but meaningless input (bad radius, inverted range)
    Semantic,
}

/// Errors that can occur during selection parsing
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    /// Character the lexer cannot start a token with
    #[error("unrecognized input at position {position}: '{fragment}'")]
    Lexical { position: usize, fragment: String },

    /// Token found where something else was expected
    #[error("expected {expected} at position {position}, found '{found}'")]
    Syntax {
        position: usize,
        found: String,
        expected: String,
    },

    /// Word in predicate position that is not a keyword
    #[error("unknown keyword at position {position}: '{word}'")]
    UnknownKeyword { position: usize, word: String },

    /// Parenthesis without a partner
    #[error("unbalanced parenthesis at position {position}")]
    UnbalancedParen { position: usize },

    /// Input ended while more was expected
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },

    /// Syntactically valid but semantically invalid value
    #[error("invalid value at position {position}: '{fragment}' ({reason})")]
    Semantic {
        position: usize,
        fragment: String,
        reason: String,
    },
}

impl ParseError {
    /// Semantic error for a value rejected by node construction
    pub fn semantic(position: usize, fragment: impl Into<String>, cause: BuildError) -> Self {
        ParseError::Semantic {
            position,
            fragment: fragment.into(),
            reason: cause.to_string(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::Lexical { .. } => ErrorKind::Lexical,
            ParseError::Semantic { .. } => ErrorKind::Semantic,
            ParseError::Syntax { .. }
            | ParseError::UnknownKeyword { .. }
            | ParseError::UnbalancedParen { .. }
            | ParseError::UnexpectedEof { .. } => ErrorKind::Syntax,
        }
    }

    /// Byte offset of the offending input, when known
    pub fn position(&self) -> Option<usize> {
        match self {
            ParseError::Lexical { position, .. }
            | ParseError::Syntax { position, .. }
            | ParseError::UnknownKeyword { position, .. }
            | ParseError::UnbalancedParen { position }
            | ParseError::Semantic { position, .. } => Some(*position),
            ParseError::UnexpectedEof { .. } => None,
        }
    }
}

/// Errors from parsing a `NAME:NUMBER:ICODE:CHAIN` residue selector
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SelectorError {
    /// Not exactly four `:`-separated fields
    #[error("invalid selector '{input}': expected NAME:NUMBER:ICODE:CHAIN, found {found} field(s)")]
    FieldCount { input: String, found: usize },

    /// Residue number field is not a base-10 integer
    #[error("invalid residue number '{field}' in selector '{input}'")]
    ResidueNumber { input: String, field: String },
}

/// Errors from constructing expression nodes directly
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BuildError {
    /// Distance modifier with a radius that is not strictly positive
    #[error("radius must be positive, got {0}")]
    NonPositiveRadius(f32),

    /// Numeric range whose lower bound exceeds its upper bound
    #[error("range minimum {min} exceeds maximum {max}")]
    InvertedRange { min: f64, max: f64 },

    /// Text value containing both `"` and `'`, which no quoting can spell
    #[error("value {0:?} contains both quote characters")]
    MixedQuotes(String),

    /// Value spec that the predicate kind cannot take
    #[error("'{kind}' does not accept {value}")]
    ValueMismatch { kind: &'static str, value: &'static str },
}

/// Errors that can occur during selection evaluation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    /// Atom index the molecule does not have
    #[error("atom index {index} is out of range (atom count: {count})")]
    AtomOutOfRange { index: u32, count: usize },
}

/// Combined error type for selection operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SelectError {
    /// Parse error
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Selector format error
    #[error("selector error: {0}")]
    Selector(#[from] SelectorError),

    /// Expression construction error
    #[error("build error: {0}")]
    Build(#[from] BuildError),

    /// Evaluation error
    #[error("evaluation error: {0}")]
    Eval(#[from] EvalError),
}

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type for evaluation operations
pub type EvalResult<T> = Result<T, EvalError>;

/// Result type for general selection operations
pub type SelectResult<T> = Result<T, SelectError>;
