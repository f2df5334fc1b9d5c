//! Shared test fixtures

use molsel_mol::{AtomRecord, ComponentFlags, ResidueRecord, SecondaryStructure, TableMolecule};

/// Two-residue peptide on chain A
///
/// | index | name | residue | ss    |
/// |-------|------|---------|-------|
/// | 0-4   | N CA C O CB | ALA 1 | helix |
/// | 5-8   | N CA C O    | GLY 2 | sheet |
///
/// Atom `i` sits at `(1.5 * i, 0, 0)` with B-factor `10 * (i + 1)` and
/// serial `i + 1`; every atom is in fragment 1.
pub fn create_test_molecule() -> TableMolecule {
    let mut mol = TableMolecule::new();
    let ala = mol.add_residue(
        ResidueRecord::new("A", "ALA", 1).with_secondary_structure(SecondaryStructure::Helix),
    );
    let gly = mol.add_residue(
        ResidueRecord::new("A", "GLY", 2).with_secondary_structure(SecondaryStructure::Sheet),
    );

    let atoms = [
        ("N", 7, ala),
        ("CA", 6, ala),
        ("C", 6, ala),
        ("O", 8, ala),
        ("CB", 6, ala),
        ("N", 7, gly),
        ("CA", 6, gly),
        ("C", 6, gly),
        ("O", 8, gly),
    ];
    for (i, (name, z, slot)) in atoms.into_iter().enumerate() {
        let part = if name == "CB" {
            ComponentFlags::SIDECHAIN
        } else {
            ComponentFlags::BACKBONE
        };
        let record = AtomRecord::new(name, z)
            .at(1.5 * i as f32, 0.0, 0.0)
            .with_b_factor(10.0 * (i + 1) as f32)
            .with_serial(i as i32 + 1)
            .with_fragment(1)
            .in_residue(slot)
            .with_flags(ComponentFlags::PROTEIN | part);
        mol.add_atom(record).unwrap();
    }
    mol
}

/// Protein, ligand, water and ion spread over two chains
///
/// | index | name | residue      | notes                      |
/// |-------|------|--------------|----------------------------|
/// | 0     | N    | A ALA 1      | backbone, helix            |
/// | 1     | CA   | A ALA 1      | backbone, helix            |
/// | 2     | CB   | A ALA 1      | sidechain, helix           |
/// | 3     | H    | A ALA 1      | polar hydrogen             |
/// | 4     | N    | A GLY 2A     | backbone, insertion code A |
/// | 5     | CA   | A GLY 2A     | backbone                   |
/// | 6     | HA2  | A GLY 2A     | nonpolar hydrogen          |
/// | 7     | C1   | B LIG 10     | ligand, organic            |
/// | 8     | O1   | B LIG 10     | ligand, organic, alt B     |
/// | 9     | ZN   | B ZN 20      | metal                      |
/// | 10    | O    | W HOH 100    | water, b = 55              |
/// | 11    | C    | none         | no residue, no coordinate  |
pub fn create_mixed_molecule() -> TableMolecule {
    let mut mol = TableMolecule::new();
    let ala = mol.add_residue(
        ResidueRecord::new("A", "ALA", 1).with_secondary_structure(SecondaryStructure::Helix),
    );
    let gly = mol.add_residue(
        ResidueRecord::new("A", "GLY", 2)
            .with_insert_code('A')
            .with_secondary_structure(SecondaryStructure::Loop),
    );
    let lig = mol.add_residue(ResidueRecord::new("B", "LIG", 10));
    let zn = mol.add_residue(ResidueRecord::new("B", "ZN", 20));
    let hoh = mol.add_residue(ResidueRecord::new("W", "HOH", 100));

    let protein = ComponentFlags::PROTEIN;
    let records = [
        AtomRecord::new("N", 7)
            .at(0.0, 0.0, 0.0)
            .in_residue(ala)
            .with_flags(protein | ComponentFlags::BACKBONE),
        AtomRecord::new("CA", 6)
            .at(1.5, 0.0, 0.0)
            .in_residue(ala)
            .with_flags(protein | ComponentFlags::BACKBONE),
        AtomRecord::new("CB", 6)
            .at(1.5, 1.5, 0.0)
            .in_residue(ala)
            .with_flags(protein | ComponentFlags::SIDECHAIN),
        AtomRecord::new("H", 1)
            .at(-1.0, 0.0, 0.0)
            .in_residue(ala)
            .with_flags(protein | ComponentFlags::POLAR_HYDROGEN),
        AtomRecord::new("N", 7)
            .at(3.0, 0.0, 0.0)
            .in_residue(gly)
            .with_flags(protein | ComponentFlags::BACKBONE),
        AtomRecord::new("CA", 6)
            .at(4.5, 0.0, 0.0)
            .in_residue(gly)
            .with_flags(protein | ComponentFlags::BACKBONE),
        AtomRecord::new("HA2", 1)
            .at(4.5, 1.0, 0.0)
            .in_residue(gly)
            .with_flags(protein | ComponentFlags::NONPOLAR_HYDROGEN),
        AtomRecord::new("C1", 6)
            .at(10.0, 0.0, 0.0)
            .in_residue(lig)
            .with_flags(ComponentFlags::LIGAND | ComponentFlags::ORGANIC),
        AtomRecord::new("O1", 8)
            .at(11.2, 0.0, 0.0)
            .with_alt_loc('B')
            .in_residue(lig)
            .with_flags(ComponentFlags::LIGAND | ComponentFlags::ORGANIC),
        AtomRecord::new("ZN", 30).at(12.0, 1.0, 0.0).in_residue(zn),
        AtomRecord::new("O", 8)
            .at(20.0, 0.0, 0.0)
            .with_b_factor(55.0)
            .in_residue(hoh)
            .with_flags(ComponentFlags::WATER | ComponentFlags::SOLVENT),
        AtomRecord::new("C", 6),
    ];
    for record in records {
        mol.add_atom(record).unwrap();
    }
    mol
}
