//! Error types for molecule adapters
//!
//! Provides errors raised while assembling an in-memory molecule.

use thiserror::Error;

/// Errors that can occur when building or reading molecular data
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MolError {
    /// Atom index is out of bounds
    #[error("atom index {index} is out of bounds (atom count: {count})")]
    AtomOutOfRange { index: u32, count: usize },

    /// An atom references a residue slot that was never added
    #[error("atom {atom} references unknown residue slot {residue}")]
    UnknownResidue { atom: u32, residue: usize },

    /// Invalid element symbol
    #[error("invalid element symbol: {0}")]
    InvalidElement(String),
}

/// Result type for molecule operations
pub type MolResult<T> = Result<T, MolError>;
