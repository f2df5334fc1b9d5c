//! Molecule-side support for atom selections
//!
//! This crate defines what the selection engine needs from a molecule and
//! nothing more:
//!
//! - [`MoleculeView`]: the read-only adapter trait a host toolkit implements
//! - [`AtomIndex`], [`ComponentFlags`], [`SecondaryStructure`]: the value types
//!   flowing across that trait
//! - [`SpatialGrid`]: a uniform grid for exact radius queries
//! - [`TableMolecule`]: a vector-backed reference implementation
//!
//! # Example
//!
//! ```rust,ignore
//! use molsel_mol::{AtomRecord, MoleculeView, ResidueRecord, TableMolecule};
//!
//! let mut mol = TableMolecule::new();
//! let ala = mol.add_residue(ResidueRecord::new("A", "ALA", 1));
//! mol.add_atom(AtomRecord::new("CA", 6).in_residue(ala).at(0.0, 0.0, 0.0))?;
//! assert_eq!(mol.atom_count(), 1);
//! ```

mod adapter;
pub mod element;
mod error;
mod flags;
mod index;
mod secondary;
mod spatial;
mod table;

pub use adapter::{AtomIndices, MoleculeView, ResidueInfo};
pub use error::{MolError, MolResult};
pub use flags::ComponentFlags;
pub use index::AtomIndex;
pub use secondary::SecondaryStructure;
pub use spatial::SpatialGrid;
pub use table::{AtomRecord, ResidueRecord, TableMolecule};
