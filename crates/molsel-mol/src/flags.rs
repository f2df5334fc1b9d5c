//! Atom classification flags
//!
//! The selection engine consumes chemical classification rather than
//! deriving it; a molecule adapter reports these bits per atom.

use bitflags::bitflags;

bitflags! {
    /// Component and atom-type classification for a single atom
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[derive(serde::Serialize, serde::Deserialize)]
    pub struct ComponentFlags: u32 {
        /// Atom belongs to a protein residue
        const PROTEIN = 0x0000_0001;
        /// Atom belongs to a small-molecule ligand
        const LIGAND = 0x0000_0004;
        /// Atom belongs to a water molecule
        const WATER = 0x0000_0008;
        /// Atom belongs to a solvent molecule (water included)
        const SOLVENT = 0x0000_0010;
        /// Atom belongs to an organic small molecule
        const ORGANIC = 0x0000_0020;
        /// Atom is a metal ion
        const METAL = 0x0000_0040;
        /// Protein backbone atom (N, CA, C, O)
        const BACKBONE = 0x0000_0100;
        /// Protein side-chain atom
        const SIDECHAIN = 0x0000_0200;
        /// Hydrogen atom
        const HYDROGEN = 0x0000_1000;
        /// Hydrogen bonded to N, O or S
        const POLAR_HYDROGEN = 0x0000_2000;
        /// Hydrogen not bonded to N, O or S
        const NONPOLAR_HYDROGEN = 0x0000_4000;

        /// Hydrogen type bits
        const HYDROGEN_TYPE = 0x0000_F000;
    }
}

impl ComponentFlags {
    /// Check if this atom is a hydrogen of any kind
    #[inline]
    pub fn is_hydrogen(&self) -> bool {
        self.intersects(ComponentFlags::HYDROGEN_TYPE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_operations() {
        let flags = ComponentFlags::PROTEIN | ComponentFlags::BACKBONE;
        assert!(flags.contains(ComponentFlags::PROTEIN));
        assert!(!flags.contains(ComponentFlags::SIDECHAIN));
        assert!(!flags.is_hydrogen());
    }

    #[test]
    fn test_hydrogen_type() {
        let flags = ComponentFlags::POLAR_HYDROGEN;
        assert!(flags.is_hydrogen());
        assert!(ComponentFlags::default().is_empty());
    }
}
