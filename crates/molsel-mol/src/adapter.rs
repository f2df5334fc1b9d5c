//! Molecule adapter trait
//!
//! The narrow, read-only view of a host molecule that selection evaluation
//! needs. Host toolkits implement [`MoleculeView`] over their own atom and
//! residue storage; nothing here assumes a particular data model.

use std::ops::Range;

use lin_alg::f32::Vec3;

use crate::element;
use crate::flags::ComponentFlags;
use crate::index::AtomIndex;
use crate::secondary::SecondaryStructure;

/// Residue identity of an atom, borrowed from the host molecule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResidueInfo<'a> {
    /// Residue name (e.g. `ALA`, `HOH`)
    pub name: &'a str,
    /// Residue sequence number
    pub number: i32,
    /// Insertion code (space when absent)
    pub insert_code: char,
    /// Chain identifier
    pub chain: &'a str,
}

/// Iterator over every atom index of a molecule, in ascending order
#[derive(Debug, Clone)]
pub struct AtomIndices(Range<u32>);

impl AtomIndices {
    /// Iterate `0..count`
    pub fn new(count: usize) -> Self {
        AtomIndices(0..count as u32)
    }
}

impl Iterator for AtomIndices {
    type Item = AtomIndex;

    #[inline]
    fn next(&mut self) -> Option<AtomIndex> {
        self.0.next().map(AtomIndex)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl ExactSizeIterator for AtomIndices {}

/// Read-only accessors the selection engine consumes from a molecule
///
/// Every per-atom accessor returns `None` when the host cannot supply the
/// field (or the index is out of range); the evaluator treats a missing
/// field as a non-match rather than an error.
pub trait MoleculeView {
    /// Total number of atoms
    fn atom_count(&self) -> usize;

    /// All atom indices in ascending order
    fn atoms(&self) -> AtomIndices {
        AtomIndices::new(self.atom_count())
    }

    /// Check whether `atom` addresses an atom of this molecule
    #[inline]
    fn contains(&self, atom: AtomIndex) -> bool {
        atom.as_usize() < self.atom_count()
    }

    /// Atom name (e.g. `CA`)
    fn atom_name(&self, atom: AtomIndex) -> Option<&str>;

    /// Atomic number
    fn atomic_number(&self, atom: AtomIndex) -> Option<u8>;

    /// Element symbol, derived from the atomic number by default
    fn element_symbol(&self, atom: AtomIndex) -> Option<&str> {
        self.atomic_number(atom).and_then(element::symbol)
    }

    /// Cartesian coordinate in Angstroms
    fn coord(&self, atom: AtomIndex) -> Option<Vec3>;

    /// Temperature factor
    fn b_factor(&self, atom: AtomIndex) -> Option<f32>;

    /// Serial number as written in the source file
    fn serial(&self, atom: AtomIndex) -> Option<i32>;

    /// Covalently connected fragment identifier
    fn fragment_id(&self, atom: AtomIndex) -> Option<i32>;

    /// Alternate location code
    fn alt_loc(&self, atom: AtomIndex) -> Option<char>;

    /// Residue identity
    fn residue(&self, atom: AtomIndex) -> Option<ResidueInfo<'_>>;

    /// Secondary structure of the owning residue
    fn secondary_structure(&self, atom: AtomIndex) -> Option<SecondaryStructure>;

    /// Classification flags
    fn flags(&self, atom: AtomIndex) -> Option<ComponentFlags>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atom_indices() {
        let indices: Vec<AtomIndex> = AtomIndices::new(3).collect();
        assert_eq!(indices, vec![AtomIndex(0), AtomIndex(1), AtomIndex(2)]);
        assert_eq!(AtomIndices::new(5).len(), 5);
        assert_eq!(AtomIndices::new(0).next(), None);
    }
}
