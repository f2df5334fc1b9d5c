//! Secondary structure types
//!
//! Provides secondary structure classification for protein residues.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Secondary structure class of the residue an atom belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum SecondaryStructure {
    /// Loop or coil (no regular secondary structure)
    #[default]
    Loop = 0,
    /// Alpha helix
    Helix = 1,
    /// Beta sheet/strand
    Sheet = 2,
    /// Turn
    Turn = 3,
}

impl SecondaryStructure {
    /// Create from single character code (as used in PDB/DSSP output)
    ///
    /// - 'H', 'G', 'I' = Helix
    /// - 'S', 'E', 'B' = Sheet
    /// - 'T' = Turn
    /// - anything else = Loop
    pub fn from_char(c: char) -> Self {
        match c.to_ascii_uppercase() {
            'H' | 'G' | 'I' => SecondaryStructure::Helix,
            'S' | 'E' | 'B' => SecondaryStructure::Sheet,
            'T' => SecondaryStructure::Turn,
            _ => SecondaryStructure::Loop,
        }
    }

    /// Convert to single character code
    pub fn to_char(&self) -> char {
        match self {
            SecondaryStructure::Loop => 'L',
            SecondaryStructure::Helix => 'H',
            SecondaryStructure::Sheet => 'S',
            SecondaryStructure::Turn => 'T',
        }
    }

    /// Check whether `code` names this class
    ///
    /// Sheet answers to both `S` and `E`.
    pub fn matches_code(&self, code: &str) -> bool {
        let mut chars = code.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => SecondaryStructure::from_char(c) == *self && is_known_code(c),
            _ => false,
        }
    }
}

fn is_known_code(c: char) -> bool {
    matches!(
        c.to_ascii_uppercase(),
        'H' | 'G' | 'I' | 'S' | 'E' | 'B' | 'T' | 'L'
    )
}

impl fmt::Display for SecondaryStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}
