//! Residue selectors
//!
//! A [`Selector`] names one residue in the compact `NAME:NUMBER:ICODE:CHAIN`
//! form, e.g. `ALA:123: :A`. Fields are kept verbatim, so an insertion code
//! written as a single space survives a round trip.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use molsel_mol::{AtomIndex, MoleculeView};
use serde::{Deserialize, Serialize};

use crate::error::SelectorError;
use crate::result::SelectionResult;

/// Residue identity: name, sequence number, insertion code and chain
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selector {
    pub name: String,
    pub residue_number: i32,
    pub insert_code: String,
    pub chain: String,
}

impl Selector {
    pub fn new(
        name: impl Into<String>,
        residue_number: i32,
        insert_code: impl Into<String>,
        chain: impl Into<String>,
    ) -> Self {
        Selector {
            name: name.into(),
            residue_number,
            insert_code: insert_code.into(),
            chain: chain.into(),
        }
    }

    /// Selector of the residue owning `atom`, if the molecule knows it
    pub fn from_atom<M: MoleculeView + ?Sized>(mol: &M, atom: AtomIndex) -> Option<Self> {
        let res = mol.residue(atom)?;
        Some(Selector {
            name: res.name.to_string(),
            residue_number: res.number,
            insert_code: res.insert_code.to_string(),
            chain: res.chain.to_string(),
        })
    }

    /// Check whether `atom` sits in the residue this selector names
    ///
    /// Only chain, number and insertion code take part; the residue name
    /// is informational.
    pub fn matches_atom<M: MoleculeView + ?Sized>(&self, mol: &M, atom: AtomIndex) -> bool {
        match mol.residue(atom) {
            Some(res) => {
                res.number == self.residue_number
                    && res.chain == self.chain
                    && self.insert_code.chars().eq(std::iter::once(res.insert_code))
            }
            None => false,
        }
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(':').collect();
        let [name, number, icode, chain] = fields[..] else {
            return Err(SelectorError::FieldCount {
                input: s.to_string(),
                found: fields.len(),
            });
        };
        let residue_number =
            number
                .trim()
                .parse::<i32>()
                .map_err(|_| SelectorError::ResidueNumber {
                    input: s.to_string(),
                    field: number.to_string(),
                })?;
        Ok(Selector::new(name, residue_number, icode, chain))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.name, self.residue_number, self.insert_code, self.chain
        )
    }
}

impl Ord for Selector {
    fn cmp(&self, other: &Self) -> Ordering {
        self.chain
            .cmp(&other.chain)
            .then(self.residue_number.cmp(&other.residue_number))
            .then_with(|| self.insert_code.cmp(&other.insert_code))
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for Selector {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn is_set_separator(c: char) -> bool {
    matches!(c, ',' | ';' | '&' | '\t' | '\n')
}

/// Parse a list of selectors separated by `,` `;` `&` tabs or newlines
pub fn parse_selector_set(text: &str) -> Result<BTreeSet<Selector>, SelectorError> {
    text.split(is_set_separator)
        .filter(|piece| !piece.is_empty())
        .map(str::parse)
        .collect()
}

/// Selectors of every residue that owns at least one atom
pub fn molecule_selectors<M: MoleculeView + ?Sized>(mol: &M) -> BTreeSet<Selector> {
    mol.atoms()
        .filter_map(|atom| Selector::from_atom(mol, atom))
        .collect()
}

/// Selector strings of the residues touched by `selection`, in selector order
pub fn selector_strings<M: MoleculeView + ?Sized>(
    mol: &M,
    selection: &SelectionResult,
) -> Vec<String> {
    let selectors: BTreeSet<Selector> = selection
        .indices()
        .filter_map(|atom| Selector::from_atom(mol, atom))
        .collect();
    selectors.iter().map(Selector::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use molsel_mol::{AtomRecord, ResidueRecord, TableMolecule};

    #[test]
    fn test_round_trip() {
        let sel: Selector = "ALA:123: :A".parse().unwrap();
        assert_eq!(sel.name, "ALA");
        assert_eq!(sel.residue_number, 123);
        assert_eq!(sel.insert_code, " ");
        assert_eq!(sel.chain, "A");
        assert_eq!(sel.to_string(), "ALA:123: :A");

        let sel: Selector = "GLY:-4:B:H".parse().unwrap();
        assert_eq!(sel.residue_number, -4);
        assert_eq!(sel.to_string().parse::<Selector>().unwrap(), sel);
    }

    #[test]
    fn test_invalid_field_count() {
        assert_eq!(
            "invalid".parse::<Selector>(),
            Err(SelectorError::FieldCount {
                input: "invalid".to_string(),
                found: 1
            })
        );
        assert!(matches!(
            "ALA:1: :A:extra".parse::<Selector>(),
            Err(SelectorError::FieldCount { found: 5, .. })
        ));
    }

    #[test]
    fn test_invalid_residue_number() {
        assert!(matches!(
            "ALA:x1: :A".parse::<Selector>(),
            Err(SelectorError::ResidueNumber { .. })
        ));
        assert!(matches!(
            "ALA:: :A".parse::<Selector>(),
            Err(SelectorError::ResidueNumber { .. })
        ));
    }

    #[test]
    fn test_ordering() {
        let a: Selector = "GLY:10: :A".parse().unwrap();
        let b: Selector = "ALA:2: :B".parse().unwrap();
        let c: Selector = "ALA:10:A:A".parse().unwrap();
        let mut v = vec![b.clone(), c.clone(), a.clone()];
        v.sort();
        assert_eq!(v, vec![a.clone(), c, b]);

        // Same residue key, different names: distinct but adjacent
        let d: Selector = "SER:10: :A".parse().unwrap();
        assert_ne!(a, d);
        assert_eq!(a.cmp(&d), Ordering::Less);
    }

    #[test]
    fn test_parse_selector_set() {
        let set = parse_selector_set("ALA:1: :A,GLY:2: :A;;ALA:1: :A\tSER:3: :B&").unwrap();
        let strings: Vec<String> = set.iter().map(Selector::to_string).collect();
        assert_eq!(strings, vec!["ALA:1: :A", "GLY:2: :A", "SER:3: :B"]);

        assert!(parse_selector_set("").unwrap().is_empty());
        assert!(parse_selector_set("ALA:1").is_err());
    }

    #[test]
    fn test_molecule_selectors() {
        let mut mol = TableMolecule::new();
        let ala = mol.add_residue(ResidueRecord::new("A", "ALA", 1));
        let gly = mol.add_residue(ResidueRecord::new("A", "GLY", 2).with_insert_code('B'));
        mol.add_atom(AtomRecord::new("N", 7).in_residue(ala)).unwrap();
        mol.add_atom(AtomRecord::new("CA", 6).in_residue(ala)).unwrap();
        mol.add_atom(AtomRecord::new("CA", 6).in_residue(gly)).unwrap();
        mol.add_atom(AtomRecord::new("ZN", 30)).unwrap();

        let sels = molecule_selectors(&mol);
        let strings: Vec<String> = sels.iter().map(Selector::to_string).collect();
        assert_eq!(strings, vec!["ALA:1: :A", "GLY:2:B:A"]);

        let first = Selector::from_atom(&mol, AtomIndex(0)).unwrap();
        assert!(first.matches_atom(&mol, AtomIndex(1)));
        assert!(!first.matches_atom(&mol, AtomIndex(2)));
        assert!(!first.matches_atom(&mol, AtomIndex(3)));
        assert_eq!(Selector::from_atom(&mol, AtomIndex(3)), None);

        let mut sel = SelectionResult::new(4);
        sel.set(AtomIndex(2));
        sel.set(AtomIndex(3));
        assert_eq!(selector_strings(&mol, &sel), vec!["GLY:2:B:A"]);
    }
}
