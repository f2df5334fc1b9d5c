//! In-memory reference molecule
//!
//! `TableMolecule` stores atoms and residues in plain vectors and implements
//! [`MoleculeView`]. It is what the test suites build fixtures from, and it
//! serves hosts that have no structure model of their own.

use lin_alg::f32::Vec3;

use crate::adapter::{MoleculeView, ResidueInfo};
use crate::element;
use crate::error::{MolError, MolResult};
use crate::flags::ComponentFlags;
use crate::index::AtomIndex;
use crate::secondary::SecondaryStructure;

/// A residue slot shared by the atoms that reference it
#[derive(Debug, Clone, PartialEq)]
pub struct ResidueRecord {
    pub name: String,
    pub number: i32,
    pub insert_code: char,
    pub chain: String,
    pub secondary_structure: Option<SecondaryStructure>,
}

impl ResidueRecord {
    /// Create a residue with no insertion code and unassigned secondary structure
    pub fn new(chain: impl Into<String>, name: impl Into<String>, number: i32) -> Self {
        ResidueRecord {
            name: name.into(),
            number,
            insert_code: ' ',
            chain: chain.into(),
            secondary_structure: None,
        }
    }

    /// Set the insertion code
    pub fn with_insert_code(mut self, code: char) -> Self {
        self.insert_code = code;
        self
    }

    /// Set the secondary structure class
    pub fn with_secondary_structure(mut self, ss: SecondaryStructure) -> Self {
        self.secondary_structure = Some(ss);
        self
    }
}

/// One atom row
#[derive(Debug, Clone, PartialEq)]
pub struct AtomRecord {
    pub name: String,
    pub atomic_number: Option<u8>,
    pub coord: Option<[f32; 3]>,
    pub b_factor: Option<f32>,
    pub serial: Option<i32>,
    pub fragment_id: Option<i32>,
    pub alt_loc: Option<char>,
    pub residue: Option<usize>,
    pub flags: ComponentFlags,
}

impl AtomRecord {
    /// Create an atom with the given name and atomic number
    ///
    /// Hydrogen and metal bits are seeded from the atomic number; every
    /// other classification bit is left for the caller.
    pub fn new(name: impl Into<String>, atomic_number: u8) -> Self {
        let mut flags = ComponentFlags::empty();
        if atomic_number == 1 {
            flags |= ComponentFlags::HYDROGEN;
        }
        if element::is_metal(atomic_number) {
            flags |= ComponentFlags::METAL;
        }
        AtomRecord {
            name: name.into(),
            atomic_number: Some(atomic_number),
            coord: None,
            b_factor: None,
            serial: None,
            fragment_id: None,
            alt_loc: None,
            residue: None,
            flags,
        }
    }

    /// Create an atom from an element symbol
    pub fn with_symbol(name: impl Into<String>, symbol: &str) -> MolResult<Self> {
        let n = element::atomic_number(symbol)
            .ok_or_else(|| MolError::InvalidElement(symbol.to_string()))?;
        Ok(Self::new(name, n))
    }

    /// Set the coordinate
    pub fn at(mut self, x: f32, y: f32, z: f32) -> Self {
        self.coord = Some([x, y, z]);
        self
    }

    /// Set the temperature factor
    pub fn with_b_factor(mut self, b: f32) -> Self {
        self.b_factor = Some(b);
        self
    }

    /// Set the serial number
    pub fn with_serial(mut self, serial: i32) -> Self {
        self.serial = Some(serial);
        self
    }

    /// Set the fragment identifier
    pub fn with_fragment(mut self, fragment: i32) -> Self {
        self.fragment_id = Some(fragment);
        self
    }

    /// Set the alternate location code
    pub fn with_alt_loc(mut self, alt: char) -> Self {
        self.alt_loc = Some(alt);
        self
    }

    /// Attach the atom to a residue slot returned by [`TableMolecule::add_residue`]
    pub fn in_residue(mut self, slot: usize) -> Self {
        self.residue = Some(slot);
        self
    }

    /// Add classification bits
    pub fn with_flags(mut self, flags: ComponentFlags) -> Self {
        self.flags |= flags;
        self
    }
}

/// Vector-backed molecule implementing [`MoleculeView`]
#[derive(Debug, Clone, Default)]
pub struct TableMolecule {
    atoms: Vec<AtomRecord>,
    residues: Vec<ResidueRecord>,
}

impl TableMolecule {
    /// Create an empty molecule
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a residue slot and return its position
    pub fn add_residue(&mut self, residue: ResidueRecord) -> usize {
        self.residues.push(residue);
        self.residues.len() - 1
    }

    /// Append an atom
    ///
    /// Fails if the atom references a residue slot that does not exist.
    pub fn add_atom(&mut self, atom: AtomRecord) -> MolResult<AtomIndex> {
        let index = AtomIndex(self.atoms.len() as u32);
        if let Some(slot) = atom.residue {
            if slot >= self.residues.len() {
                return Err(MolError::UnknownResidue {
                    atom: index.as_u32(),
                    residue: slot,
                });
            }
        }
        self.atoms.push(atom);
        Ok(index)
    }

    /// Get an atom record
    pub fn atom(&self, atom: AtomIndex) -> MolResult<&AtomRecord> {
        self.atoms
            .get(atom.as_usize())
            .ok_or(MolError::AtomOutOfRange {
                index: atom.as_u32(),
                count: self.atoms.len(),
            })
    }

    /// Number of residue slots
    pub fn residue_count(&self) -> usize {
        self.residues.len()
    }

    #[inline]
    fn record(&self, atom: AtomIndex) -> Option<&AtomRecord> {
        self.atoms.get(atom.as_usize())
    }

    #[inline]
    fn residue_record(&self, atom: AtomIndex) -> Option<&ResidueRecord> {
        self.record(atom)
            .and_then(|a| a.residue)
            .and_then(|slot| self.residues.get(slot))
    }
}

impl MoleculeView for TableMolecule {
    fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    fn atom_name(&self, atom: AtomIndex) -> Option<&str> {
        self.record(atom).map(|a| a.name.as_str())
    }

    fn atomic_number(&self, atom: AtomIndex) -> Option<u8> {
        self.record(atom).and_then(|a| a.atomic_number)
    }

    fn coord(&self, atom: AtomIndex) -> Option<Vec3> {
        self.record(atom)
            .and_then(|a| a.coord)
            .map(|[x, y, z]| Vec3::new(x, y, z))
    }

    fn b_factor(&self, atom: AtomIndex) -> Option<f32> {
        self.record(atom).and_then(|a| a.b_factor)
    }

    fn serial(&self, atom: AtomIndex) -> Option<i32> {
        self.record(atom).and_then(|a| a.serial)
    }

    fn fragment_id(&self, atom: AtomIndex) -> Option<i32> {
        self.record(atom).and_then(|a| a.fragment_id)
    }

    fn alt_loc(&self, atom: AtomIndex) -> Option<char> {
        self.record(atom).and_then(|a| a.alt_loc)
    }

    fn residue(&self, atom: AtomIndex) -> Option<ResidueInfo<'_>> {
        self.residue_record(atom).map(|r| ResidueInfo {
            name: &r.name,
            number: r.number,
            insert_code: r.insert_code,
            chain: &r.chain,
        })
    }

    fn secondary_structure(&self, atom: AtomIndex) -> Option<SecondaryStructure> {
        self.residue_record(atom).and_then(|r| r.secondary_structure)
    }

    fn flags(&self, atom: AtomIndex) -> Option<ComponentFlags> {
        self.record(atom).map(|a| a.flags)
    }
}
