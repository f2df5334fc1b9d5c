//! Residue and chain membership maps
//!
//! Built once per evaluation with a single pass over the molecule and used
//! by `byres` / `bychain` to promote matched atoms to their complete
//! residues or chains.

use ahash::AHashMap;
use molsel_mol::{AtomIndex, MoleculeView};
use smallvec::SmallVec;

use crate::result::SelectionResult;
use crate::selector::Selector;

/// Member list of one residue; most residues fit inline
type ResidueMembers = SmallVec<[AtomIndex; 16]>;

/// What makes two atoms part of the same residue
///
/// The residue name is left out: alternate residue types at one position
/// (microheterogeneity) form a single residue.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ResidueKey {
    chain: String,
    number: i32,
    insert_code: char,
}

impl ResidueKey {
    fn of_selector(selector: &Selector) -> Option<Self> {
        let mut icode = selector.insert_code.chars();
        match (icode.next(), icode.next()) {
            (Some(insert_code), None) => Some(ResidueKey {
                chain: selector.chain.clone(),
                number: selector.residue_number,
                insert_code,
            }),
            _ => None,
        }
    }
}

/// Residue-keyed and chain-keyed atom membership of a molecule
#[derive(Debug, Clone, Default)]
pub struct Grouping {
    residue_ids: AHashMap<ResidueKey, usize>,
    residues: Vec<ResidueMembers>,
    chain_ids: AHashMap<String, usize>,
    chains: Vec<Vec<AtomIndex>>,
    /// Residue slot of each atom, `None` when the molecule has no residue data
    atom_residue: Vec<Option<usize>>,
    atom_chain: Vec<Option<usize>>,
}

impl Grouping {
    /// Build the maps from the molecule's residue accessors
    pub fn build<M: MoleculeView + ?Sized>(mol: &M) -> Self {
        let n = mol.atom_count();
        let mut grouping = Grouping {
            atom_residue: Vec::with_capacity(n),
            atom_chain: Vec::with_capacity(n),
            ..Default::default()
        };

        for atom in mol.atoms() {
            let Some(res) = mol.residue(atom) else {
                grouping.atom_residue.push(None);
                grouping.atom_chain.push(None);
                continue;
            };

            let chain_slot = match grouping.chain_ids.get(res.chain) {
                Some(&slot) => slot,
                None => {
                    let slot = grouping.chains.len();
                    grouping.chain_ids.insert(res.chain.to_string(), slot);
                    grouping.chains.push(Vec::new());
                    slot
                }
            };
            grouping.chains[chain_slot].push(atom);

            let key = ResidueKey {
                chain: res.chain.to_string(),
                number: res.number,
                insert_code: res.insert_code,
            };
            let next = grouping.residues.len();
            let residue_slot = *grouping.residue_ids.entry(key).or_insert(next);
            if residue_slot == next {
                grouping.residues.push(ResidueMembers::new());
            }
            grouping.residues[residue_slot].push(atom);

            grouping.atom_residue.push(Some(residue_slot));
            grouping.atom_chain.push(Some(chain_slot));
        }

        log::debug!(
            "Built grouping: {} residues, {} chains over {} atoms",
            grouping.residues.len(),
            grouping.chains.len(),
            n
        );
        grouping
    }

    /// Number of distinct residues
    pub fn residue_count(&self) -> usize {
        self.residues.len()
    }

    /// Number of distinct chains
    pub fn chain_count(&self) -> usize {
        self.chains.len()
    }

    /// Atoms of the residue `selector` names
    ///
    /// Matches on chain, number and insertion code, like the `residue`
    /// predicate; the selector's residue name is not consulted.
    pub fn residue_members(&self, selector: &Selector) -> Option<&[AtomIndex]> {
        let key = ResidueKey::of_selector(selector)?;
        self.residue_ids
            .get(&key)
            .map(|&slot| self.residues[slot].as_slice())
    }

    /// Atoms of chain `chain`
    pub fn chain_members(&self, chain: &str) -> Option<&[AtomIndex]> {
        self.chain_ids
            .get(chain)
            .map(|&slot| self.chains[slot].as_slice())
    }

    /// Promote every matched atom to its complete residue
    ///
    /// Atoms without residue data stay selected on their own.
    pub fn expand_residues(&self, selected: &SelectionResult) -> SelectionResult {
        Self::expand(selected, &self.atom_residue, |slot| self.residues[slot].as_slice())
    }

    /// Promote every matched atom to its complete chain
    pub fn expand_chains(&self, selected: &SelectionResult) -> SelectionResult {
        Self::expand(selected, &self.atom_chain, |slot| self.chains[slot].as_slice())
    }

    fn expand<'a>(
        selected: &SelectionResult,
        atom_group: &[Option<usize>],
        members: impl Fn(usize) -> &'a [AtomIndex],
    ) -> SelectionResult {
        let mut result = selected.clone();
        let mut seen = vec![false; atom_group.len()];
        for atom in selected.indices() {
            let Some(Some(slot)) = atom_group.get(atom.as_usize()).copied() else {
                continue;
            };
            if std::mem::replace(&mut seen[slot], true) {
                continue;
            }
            for &member in members(slot) {
                result.set(member);
            }
        }
        result
    }
}
