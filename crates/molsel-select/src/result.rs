//! Atom sets produced by evaluation
//!
//! A [`SelectionResult`] is a fixed-width bitset over the atoms of the
//! molecule it was evaluated against. The logical operators of the language
//! map onto `&`, `|`, `^` and `!` on results of the same width.

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, Not};

use bitvec::prelude::*;
use molsel_mol::AtomIndex;

type AtomBits = BitVec<u64, Lsb0>;

/// The set of atoms a selection matched
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionResult {
    bits: AtomBits,
}

impl SelectionResult {
    /// No atom of an `atom_count`-atom molecule
    pub fn new(atom_count: usize) -> Self {
        SelectionResult {
            bits: bitvec![u64, Lsb0; 0; atom_count],
        }
    }

    /// Every atom of an `atom_count`-atom molecule
    pub fn all(atom_count: usize) -> Self {
        SelectionResult {
            bits: bitvec![u64, Lsb0; 1; atom_count],
        }
    }

    /// Atoms for which `pred` holds
    pub fn from_fn(atom_count: usize, mut pred: impl FnMut(AtomIndex) -> bool) -> Self {
        SelectionResult {
            bits: (0..atom_count).map(|i| pred(AtomIndex(i as u32))).collect(),
        }
    }

    /// The given atoms; indices past the end are dropped
    pub fn from_indices(atom_count: usize, indices: impl IntoIterator<Item = AtomIndex>) -> Self {
        let mut result = Self::new(atom_count);
        indices.into_iter().for_each(|idx| result.set(idx));
        result
    }

    /// Width of the set, i.e. the atom count of the molecule
    #[inline]
    pub fn atom_count(&self) -> usize {
        self.bits.len()
    }

    #[inline]
    pub fn contains(&self, idx: AtomIndex) -> bool {
        self.bits.get(idx.as_usize()).is_some_and(|bit| *bit)
    }

    /// Add an atom; out-of-range indices are ignored
    #[inline]
    pub fn set(&mut self, idx: AtomIndex) {
        if let Some(mut bit) = self.bits.get_mut(idx.as_usize()) {
            *bit = true;
        }
    }

    /// Remove an atom; out-of-range indices are ignored
    #[inline]
    pub fn unset(&mut self, idx: AtomIndex) {
        if let Some(mut bit) = self.bits.get_mut(idx.as_usize()) {
            *bit = false;
        }
    }

    /// Number of selected atoms
    pub fn count(&self) -> usize {
        self.bits.count_ones()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    /// Selected atoms in ascending index order
    pub fn indices(&self) -> impl Iterator<Item = AtomIndex> + '_ {
        self.bits.iter_ones().map(|i| AtomIndex(i as u32))
    }

    pub fn to_vec(&self) -> Vec<AtomIndex> {
        self.indices().collect()
    }

    /// Remove every atom of `other` from this set
    pub fn subtract(&mut self, other: &Self) {
        debug_assert_eq!(self.atom_count(), other.atom_count());
        other.bits.iter_ones().for_each(|i| self.bits.set(i, false));
    }
}

// ============================================================================
// Set algebra
// ============================================================================

impl BitAndAssign<&SelectionResult> for SelectionResult {
    fn bitand_assign(&mut self, rhs: &SelectionResult) {
        debug_assert_eq!(self.atom_count(), rhs.atom_count());
        self.bits &= &rhs.bits;
    }
}

impl BitOrAssign<&SelectionResult> for SelectionResult {
    fn bitor_assign(&mut self, rhs: &SelectionResult) {
        debug_assert_eq!(self.atom_count(), rhs.atom_count());
        self.bits |= &rhs.bits;
    }
}

impl BitAnd for &SelectionResult {
    type Output = SelectionResult;

    fn bitand(self, rhs: &SelectionResult) -> SelectionResult {
        let mut out = self.clone();
        out &= rhs;
        out
    }
}

impl BitOr for &SelectionResult {
    type Output = SelectionResult;

    fn bitor(self, rhs: &SelectionResult) -> SelectionResult {
        let mut out = self.clone();
        out |= rhs;
        out
    }
}

impl BitXor for &SelectionResult {
    type Output = SelectionResult;

    fn bitxor(self, rhs: &SelectionResult) -> SelectionResult {
        debug_assert_eq!(self.atom_count(), rhs.atom_count());
        let mut out = self.clone();
        out.bits ^= &rhs.bits;
        out
    }
}

/// Complement against every atom of the molecule
impl Not for &SelectionResult {
    type Output = SelectionResult;

    fn not(self) -> SelectionResult {
        SelectionResult {
            bits: !self.bits.clone(),
        }
    }
}

impl Not for SelectionResult {
    type Output = SelectionResult;

    fn not(self) -> SelectionResult {
        SelectionResult { bits: !self.bits }
    }
}

impl fmt::Display for SelectionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} atoms", self.count(), self.atom_count())
    }
}
