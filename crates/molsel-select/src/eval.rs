//! Selection expression evaluator
//!
//! Two modes share one leaf matcher:
//!
//! - [`evaluate`] computes the full set of matching atoms bottom-up, with
//!   subtree results memoized by tree structure for the duration of the call.
//! - [`test`] answers for a single atom by walking the tree, and falls back
//!   to bulk evaluation only for subtrees that need the whole molecule
//!   (distance and expansion modifiers).
//!
//! Spatial grids (one per distinct radius) and residue/chain groupings are
//! built on first use and discarded with the call.

use std::hash::{Hash, Hasher};

use ahash::AHashMap;
use molsel_mol::{AtomIndex, ComponentFlags, MoleculeView, SpatialGrid};

use crate::ast::{DistanceKind, Expr, PredicateKind, ValueSpec};
use crate::context::{EvalContext, SelectionOptions};
use crate::error::{EvalError, EvalResult};
use crate::grouping::Grouping;
use crate::pattern::{CompareOp, NumericSpec, Pattern};
use crate::result::SelectionResult;

/// Evaluate a selection expression against every atom of the context's molecule
pub fn evaluate<M: MoleculeView + ?Sized>(
    expr: &Expr,
    ctx: &EvalContext<'_, M>,
) -> EvalResult<SelectionResult> {
    Ok(Evaluator::new(ctx).eval(expr))
}

/// Test whether a single atom satisfies a selection expression
///
/// Fails only if `atom` is not an atom of the context's molecule.
pub fn test<M: MoleculeView + ?Sized>(
    expr: &Expr,
    ctx: &EvalContext<'_, M>,
    atom: AtomIndex,
) -> EvalResult<bool> {
    if !ctx.molecule().contains(atom) {
        return Err(EvalError::AtomOutOfRange {
            index: atom.as_u32(),
            count: ctx.atom_count(),
        });
    }
    Ok(Evaluator::new(ctx).test_atom(expr, atom))
}

// ============================================================================
// Evaluator
// ============================================================================

/// Per-call evaluation state
pub(crate) struct Evaluator<'c, 'a, 'e, M: MoleculeView + ?Sized> {
    ctx: &'c EvalContext<'a, M>,
    /// Subtree results keyed by structure, so equal subtrees share one entry
    memo: AHashMap<NodeKey<'e>, SelectionResult>,
    /// Spatial grids keyed by radius bits
    grids: AHashMap<u32, SpatialGrid>,
    grouping: Option<Grouping>,
}

impl<'c, 'a, 'e, M: MoleculeView + ?Sized> Evaluator<'c, 'a, 'e, M> {
    pub(crate) fn new(ctx: &'c EvalContext<'a, M>) -> Self {
        Evaluator {
            ctx,
            memo: AHashMap::new(),
            grids: AHashMap::new(),
            grouping: None,
        }
    }

    /// Bulk-evaluate `expr`, reusing the result of any identical subtree
    pub(crate) fn eval(&mut self, expr: &'e Expr) -> SelectionResult {
        let n = self.ctx.atom_count();
        match expr {
            Expr::True => return SelectionResult::all(n),
            Expr::False => return SelectionResult::new(n),
            _ => {}
        }

        let key = NodeKey(expr);
        if let Some(hit) = self.memo.get(&key) {
            log::trace!("Selection cache hit: {}", expr);
            return hit.clone();
        }
        let result = self.compute(expr);
        self.memo.insert(key, result.clone());
        result
    }

    fn compute(&mut self, expr: &'e Expr) -> SelectionResult {
        let n = self.ctx.atom_count();
        match expr {
            Expr::True => SelectionResult::all(n),
            Expr::False => SelectionResult::new(n),
            Expr::Leaf { kind, value } => self.eval_leaf(*kind, value),

            Expr::Not(inner) => !self.eval(inner),
            Expr::And(left, right) => {
                let mut result = self.eval(left);
                if !result.is_empty() {
                    result &= &self.eval(right);
                }
                result
            }
            Expr::Or(left, right) => {
                let mut result = self.eval(left);
                result |= &self.eval(right);
                result
            }
            Expr::Xor(left, right) => {
                let left = self.eval(left);
                &left ^ &self.eval(right)
            }

            Expr::Distance {
                kind,
                radius,
                child,
            } => {
                let reference = self.eval(child);
                self.eval_distance(*kind, *radius, &reference)
            }
            Expr::ByRes(inner) => {
                let matched = self.eval(inner);
                self.grouping().expand_residues(&matched)
            }
            Expr::ByChain(inner) => {
                let matched = self.eval(inner);
                self.grouping().expand_chains(&matched)
            }
        }
    }

    /// Test one atom, evaluating aggregate subtrees in bulk on demand
    pub(crate) fn test_atom(&mut self, expr: &'e Expr, atom: AtomIndex) -> bool {
        match expr {
            Expr::True => true,
            Expr::False => false,
            Expr::Leaf { kind, value } => leaf_matches(self.ctx, *kind, value, atom),
            Expr::Not(inner) => !self.test_atom(inner, atom),
            Expr::And(left, right) => self.test_atom(left, atom) && self.test_atom(right, atom),
            Expr::Or(left, right) => self.test_atom(left, atom) || self.test_atom(right, atom),
            Expr::Xor(left, right) => self.test_atom(left, atom) != self.test_atom(right, atom),
            Expr::Distance { .. } | Expr::ByRes(_) | Expr::ByChain(_) => {
                self.eval(expr).contains(atom)
            }
        }
    }

    fn grouping(&mut self) -> &Grouping {
        let mol = self.ctx.molecule();
        self.grouping.get_or_insert_with(|| Grouping::build(mol))
    }

    fn eval_leaf(&self, kind: PredicateKind, value: &ValueSpec) -> SelectionResult {
        SelectionResult::from_fn(self.ctx.atom_count(), |atom| {
            leaf_matches(self.ctx, kind, value, atom)
        })
    }

    /// Apply a distance modifier to an evaluated reference set
    ///
    /// Atoms without coordinates are never within reach of anything, so they
    /// only appear in an `expand` result as members of the reference.
    fn eval_distance(
        &mut self,
        kind: DistanceKind,
        radius: f32,
        reference: &SelectionResult,
    ) -> SelectionResult {
        let mol = self.ctx.molecule();
        let mut within = SelectionResult::new(mol.atom_count());

        // Trees built through the checked constructors never get here with
        // a non-positive radius; a hand-built one reaches nothing.
        if radius > 0.0 {
            let grid = self
                .grids
                .entry(radius.to_bits())
                .or_insert_with(|| SpatialGrid::from_molecule(mol, radius));
            let mut hits = Vec::new();
            for atom in reference.indices() {
                let Some(pos) = mol.coord(atom) else {
                    continue;
                };
                grid.query_within_radius(pos, radius, &mut hits);
                for &hit in &hits {
                    within.set(hit);
                }
            }
        }

        match kind {
            DistanceKind::Around => {
                within.subtract(reference);
                within
            }
            DistanceKind::Expand => {
                within |= reference;
                within
            }
            DistanceKind::Beyond => SelectionResult::from_fn(mol.atom_count(), |atom| {
                !within.contains(atom) && mol.coord(atom).is_some()
            }),
        }
    }
}

// ============================================================================
// Memo keys
// ============================================================================

/// A borrowed subtree compared by structure
///
/// Radii and numeric operands compare by bit pattern, keeping equality
/// reflexive and consistent with the hash.
#[derive(Clone, Copy)]
struct NodeKey<'e>(&'e Expr);

impl PartialEq for NodeKey<'_> {
    fn eq(&self, other: &Self) -> bool {
        same_tree(self.0, other.0)
    }
}

impl Eq for NodeKey<'_> {}

impl Hash for NodeKey<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_tree(self.0, state);
    }
}

fn same_tree(a: &Expr, b: &Expr) -> bool {
    if std::ptr::eq(a, b) {
        return true;
    }
    match (a, b) {
        (Expr::True, Expr::True) | (Expr::False, Expr::False) => true,
        (Expr::Leaf { kind: ka, value: va }, Expr::Leaf { kind: kb, value: vb }) => {
            ka == kb && same_value(va, vb)
        }
        (Expr::Not(a), Expr::Not(b))
        | (Expr::ByRes(a), Expr::ByRes(b))
        | (Expr::ByChain(a), Expr::ByChain(b)) => same_tree(a, b),
        (Expr::And(la, ra), Expr::And(lb, rb))
        | (Expr::Or(la, ra), Expr::Or(lb, rb))
        | (Expr::Xor(la, ra), Expr::Xor(lb, rb)) => same_tree(la, lb) && same_tree(ra, rb),
        (
            Expr::Distance { kind: ka, radius: ra, child: ca },
            Expr::Distance { kind: kb, radius: rb, child: cb },
        ) => ka == kb && ra.to_bits() == rb.to_bits() && same_tree(ca, cb),
        _ => false,
    }
}

fn same_value(a: &ValueSpec, b: &ValueSpec) -> bool {
    match (a, b) {
        (ValueSpec::None, ValueSpec::None) => true,
        (ValueSpec::Pattern(a), ValueSpec::Pattern(b)) => a == b,
        (ValueSpec::Residue(a), ValueSpec::Residue(b)) => a == b,
        (ValueSpec::Numeric(a), ValueSpec::Numeric(b)) => numeric_bits(a) == numeric_bits(b),
        _ => false,
    }
}

fn numeric_bits(spec: &NumericSpec) -> (Option<CompareOp>, u64, u64) {
    match *spec {
        NumericSpec::Compare(op, n) => (Some(op), n.to_bits(), 0),
        NumericSpec::Range(lo, hi) => (None, lo.to_bits(), hi.to_bits()),
    }
}

fn hash_tree<H: Hasher>(expr: &Expr, state: &mut H) {
    std::mem::discriminant(expr).hash(state);
    match expr {
        Expr::True | Expr::False => {}
        Expr::Leaf { kind, value } => {
            kind.hash(state);
            std::mem::discriminant(value).hash(state);
            match value {
                ValueSpec::None => {}
                ValueSpec::Pattern(pattern) => pattern.hash(state),
                ValueSpec::Residue(selector) => selector.hash(state),
                ValueSpec::Numeric(spec) => numeric_bits(spec).hash(state),
            }
        }
        Expr::Not(child) | Expr::ByRes(child) | Expr::ByChain(child) => hash_tree(child, state),
        Expr::And(left, right) | Expr::Or(left, right) | Expr::Xor(left, right) => {
            hash_tree(left, state);
            hash_tree(right, state);
        }
        Expr::Distance {
            kind,
            radius,
            child,
        } => {
            kind.hash(state);
            radius.to_bits().hash(state);
            hash_tree(child, state);
        }
    }
}

// ============================================================================
// Leaf matching
// ============================================================================

/// Check one atom against a leaf predicate
///
/// A field the molecule cannot supply never matches.
fn leaf_matches<M: MoleculeView + ?Sized>(
    ctx: &EvalContext<'_, M>,
    kind: PredicateKind,
    value: &ValueSpec,
    atom: AtomIndex,
) -> bool {
    let mol = ctx.molecule();
    match value {
        ValueSpec::None => class_matches(mol, kind, atom),
        ValueSpec::Pattern(pattern) => text_matches(mol, ctx.options(), kind, pattern, atom),
        ValueSpec::Numeric(spec) => numeric_matches(mol, kind, spec, atom),
        ValueSpec::Residue(selector) => selector.matches_atom(mol, atom),
    }
}

fn text_matches<M: MoleculeView + ?Sized>(
    mol: &M,
    options: &SelectionOptions,
    kind: PredicateKind,
    pattern: &Pattern,
    atom: AtomIndex,
) -> bool {
    let case_sensitive = options.case_sensitive;
    let test = |field: &str| pattern.matches(options.prepare(field), case_sensitive);

    match kind {
        PredicateKind::Name => mol.atom_name(atom).is_some_and(test),
        PredicateKind::Resn => mol.residue(atom).is_some_and(|res| test(res.name)),
        PredicateKind::Chain => mol.residue(atom).is_some_and(|res| test(res.chain)),
        // Element symbols ignore case regardless of options
        PredicateKind::Elem => mol
            .element_symbol(atom)
            .is_some_and(|symbol| pattern.matches(symbol, false)),
        PredicateKind::AltLoc => mol.alt_loc(atom).is_some_and(|alt| {
            let mut buf = [0u8; 4];
            test(alt.encode_utf8(&mut buf))
        }),
        PredicateKind::SecondaryStructure => {
            mol.secondary_structure(atom).is_some_and(|ss| match pattern.literal() {
                Some(code) => {
                    let code = options.prepare(code);
                    ss.matches_code(code)
                        && (!case_sensitive || code.chars().all(|c| c.is_ascii_uppercase()))
                }
                None => {
                    let mut buf = [0u8; 4];
                    pattern.matches(ss.to_char().encode_utf8(&mut buf), case_sensitive)
                }
            })
        }
        _ => false,
    }
}

fn numeric_matches<M: MoleculeView + ?Sized>(
    mol: &M,
    kind: PredicateKind,
    spec: &NumericSpec,
    atom: AtomIndex,
) -> bool {
    match kind {
        PredicateKind::Resi => mol.residue(atom).is_some_and(|res| spec.matches_int(res.number)),
        PredicateKind::Index => i32::try_from(atom.as_u32()).is_ok_and(|i| spec.matches_int(i)),
        PredicateKind::Serial => mol.serial(atom).is_some_and(|s| spec.matches_int(s)),
        PredicateKind::Fragment => mol.fragment_id(atom).is_some_and(|f| spec.matches_int(f)),
        PredicateKind::BFactor => mol.b_factor(atom).is_some_and(|b| spec.matches_f32(b)),
        _ => false,
    }
}

fn class_matches<M: MoleculeView + ?Sized>(mol: &M, kind: PredicateKind, atom: AtomIndex) -> bool {
    use molsel_mol::SecondaryStructure as Ss;

    let flag = match kind {
        PredicateKind::Protein => ComponentFlags::PROTEIN,
        PredicateKind::Ligand => ComponentFlags::LIGAND,
        PredicateKind::Water => ComponentFlags::WATER,
        PredicateKind::Solvent => ComponentFlags::SOLVENT,
        PredicateKind::Organic => ComponentFlags::ORGANIC,
        PredicateKind::Backbone => ComponentFlags::BACKBONE,
        PredicateKind::Sidechain => ComponentFlags::SIDECHAIN,
        PredicateKind::Metal => ComponentFlags::METAL,
        PredicateKind::PolarHydrogen => ComponentFlags::POLAR_HYDROGEN,
        PredicateKind::NonpolarHydrogen => ComponentFlags::NONPOLAR_HYDROGEN,
        PredicateKind::Hydrogen => return mol.flags(atom).is_some_and(|f| f.is_hydrogen()),
        PredicateKind::Heavy => return mol.flags(atom).is_some_and(|f| !f.is_hydrogen()),
        PredicateKind::Helix => return mol.secondary_structure(atom) == Some(Ss::Helix),
        PredicateKind::Sheet => return mol.secondary_structure(atom) == Some(Ss::Sheet),
        PredicateKind::Turn => return mol.secondary_structure(atom) == Some(Ss::Turn),
        PredicateKind::Loop => return mol.secondary_structure(atom) == Some(Ss::Loop),
        _ => return false,
    };
    mol.flags(atom).is_some_and(|f| f.contains(flag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_selection;
    use crate::testing::{create_mixed_molecule, create_test_molecule};
    use molsel_mol::{AtomRecord, ResidueRecord, TableMolecule};

    fn select_in<M: MoleculeView>(mol: &M, input: &str) -> Vec<u32> {
        let expr = parse_selection(input).unwrap();
        let ctx = EvalContext::new(mol);
        evaluate(&expr, &ctx)
            .unwrap()
            .indices()
            .map(|i| i.as_u32())
            .collect()
    }

    fn select_indices<M: MoleculeView>(expr: &Expr, ctx: &EvalContext<'_, M>) -> Vec<u32> {
        evaluate(expr, ctx)
            .unwrap()
            .indices()
            .map(|i| i.as_u32())
            .collect()
    }

    fn count_in<M: MoleculeView>(mol: &M, input: &str) -> usize {
        select_in(mol, input).len()
    }

    #[test]
    fn test_eval_all_none() {
        let mol = create_test_molecule();
        assert_eq!(count_in(&mol, "all"), 9);
        assert_eq!(count_in(&mol, ""), 9);
        assert_eq!(count_in(&mol, "none"), 0);
    }

    #[test]
    fn test_eval_name() {
        let mol = create_test_molecule();
        assert_eq!(select_in(&mol, "name CA"), vec![1, 6]);
        assert_eq!(select_in(&mol, "name C*"), vec![1, 2, 4, 6, 7]);
        assert_eq!(select_in(&mol, "name ?"), vec![0, 2, 3, 5, 7, 8]);
    }

    #[test]
    fn test_eval_residue_fields() {
        let mol = create_test_molecule();
        assert_eq!(select_in(&mol, "resn ALA"), vec![0, 1, 2, 3, 4]);
        assert_eq!(select_in(&mol, "resi 2"), vec![5, 6, 7, 8]);
        assert_eq!(count_in(&mol, "resi 1-2"), 9);
        assert_eq!(count_in(&mol, "chain A"), 9);
        assert_eq!(count_in(&mol, "chain B"), 0);
        assert_eq!(select_in(&mol, "residue 'GLY:2: :A'"), vec![5, 6, 7, 8]);
    }

    #[test]
    fn test_eval_numeric_fields() {
        let mol = create_test_molecule();
        assert_eq!(select_in(&mol, "index < 5"), vec![0, 1, 2, 3, 4]);
        assert_eq!(select_in(&mol, "index >= 7"), vec![7, 8]);
        assert_eq!(select_in(&mol, "serial 1-3"), vec![0, 1, 2]);
        assert_eq!(count_in(&mol, "fragment 1"), 9);
        assert_eq!(select_in(&mol, "b > 50"), vec![5, 6, 7, 8]);
        assert_eq!(select_in(&mol, "b 30"), vec![2]);
        assert_eq!(select_in(&mol, "b 20.0-40"), vec![1, 2, 3]);
    }

    #[test]
    fn test_eval_classes() {
        let mol = create_test_molecule();
        assert_eq!(count_in(&mol, "protein"), 9);
        assert_eq!(count_in(&mol, "backbone"), 8);
        assert_eq!(select_in(&mol, "sidechain"), vec![4]);
        assert_eq!(count_in(&mol, "helix"), 5);
        assert_eq!(count_in(&mol, "sheet"), 4);
        assert_eq!(count_in(&mol, "ss H"), 5);
        assert_eq!(count_in(&mol, "ss E+S"), 4);
        assert_eq!(count_in(&mol, "turn or loop"), 0);

        let mol = create_mixed_molecule();
        assert_eq!(select_in(&mol, "hydrogen"), vec![3, 6]);
        assert_eq!(select_in(&mol, "polar_hydrogen"), vec![3]);
        assert_eq!(select_in(&mol, "nonpolar_hydrogen"), vec![6]);
        assert_eq!(count_in(&mol, "heavy"), 10);
        assert_eq!(select_in(&mol, "metal"), vec![9]);
        assert_eq!(select_in(&mol, "water"), vec![10]);
        assert_eq!(select_in(&mol, "solvent"), vec![10]);
        assert_eq!(select_in(&mol, "ligand and organic"), vec![7, 8]);
        assert_eq!(select_in(&mol, "loop"), vec![4, 5, 6]);
    }

    #[test]
    fn test_eval_elem_ignores_case() {
        let mol = create_test_molecule();
        assert_eq!(count_in(&mol, "elem C"), 5);
        assert_eq!(count_in(&mol, "elem c"), 5);

        let expr = parse_selection("elem c").unwrap();
        let ctx = EvalContext::new(&mol)
            .with_options(SelectionOptions::default().with_case_sensitive(true));
        assert_eq!(evaluate(&expr, &ctx).unwrap().count(), 5);
    }

    #[test]
    fn test_eval_case_sensitivity() {
        let mol = create_test_molecule();
        assert_eq!(count_in(&mol, "name ca"), 2);
        assert_eq!(count_in(&mol, "resn ala"), 5);

        let ctx = EvalContext::new(&mol)
            .with_options(SelectionOptions::default().with_case_sensitive(true));
        for (input, expected) in [("name ca", 0), ("name CA", 2), ("resn ala", 0), ("ss h", 0), ("ss H", 5)] {
            let expr = parse_selection(input).unwrap();
            assert_eq!(evaluate(&expr, &ctx).unwrap().count(), expected, "{input}");
        }
    }

    #[test]
    fn test_eval_whitespace() {
        let mut mol = TableMolecule::new();
        let res = mol.add_residue(ResidueRecord::new("A", "ALA ", 1));
        mol.add_atom(AtomRecord::new(" CA ", 6).in_residue(res)).unwrap();

        assert_eq!(count_in(&mol, "name CA and resn ALA"), 1);

        let expr = parse_selection("name CA").unwrap();
        let ctx = EvalContext::new(&mol)
            .with_options(SelectionOptions::default().with_ignore_whitespace(false));
        assert_eq!(evaluate(&expr, &ctx).unwrap().count(), 0);
    }

    #[test]
    fn test_eval_missing_fields() {
        let mol = create_mixed_molecule();
        // Atom 11 has no residue and no coordinate
        assert_eq!(count_in(&mol, "resn *"), 11);
        assert_eq!(count_in(&mol, "not resn *"), 1);
        assert_eq!(select_in(&mol, "b > 0"), vec![10]);
        assert_eq!(select_in(&mol, "alt B"), vec![8]);
        assert_eq!(count_in(&mol, "serial 1-100"), 0);
    }

    #[test]
    fn test_eval_logic() {
        let mol = create_test_molecule();
        assert_eq!(select_in(&mol, "name CA and resn ALA"), vec![1]);
        assert_eq!(count_in(&mol, "name CA or name N"), 4);
        assert_eq!(count_in(&mol, "not name CA"), 7);
        assert_eq!(count_in(&mol, "backbone xor name CA"), 6);
        assert_eq!(count_in(&mol, "none and name CA"), 0);
    }

    #[test]
    fn test_eval_distance() {
        let mol = create_test_molecule();
        // Atoms are spaced 1.5 apart along x; CB is atom 4
        assert_eq!(select_in(&mol, "name CB around 2"), vec![3, 5]);
        assert_eq!(select_in(&mol, "name CB expand 2"), vec![3, 4, 5]);
        assert_eq!(select_in(&mol, "name CB around 1.5"), vec![3, 5]);
        assert_eq!(select_in(&mol, "index 0 beyond 4"), vec![3, 4, 5, 6, 7, 8]);
        assert_eq!(select_in(&mol, "around 2 name CB"), vec![3, 5]);
        assert_eq!(count_in(&mol, "none around 5"), 0);

        let mol = create_mixed_molecule();
        assert_eq!(select_in(&mol, "ligand around 2.5"), vec![9]);
        // Atom 11 has no coordinate
        assert_eq!(count_in(&mol, "none beyond 5"), 11);
        assert_eq!(count_in(&mol, "all expand 1"), 12);
        assert_eq!(select_in(&mol, "index 11 expand 2"), vec![11]);
        assert!(select_in(&mol, "index 11 around 50").is_empty());
    }

    #[test]
    fn test_eval_sub_angstrom_radius() {
        let mol = create_test_molecule();
        assert!(select_in(&mol, "name CA around 0.0000000001").is_empty());
        assert_eq!(select_in(&mol, "name CA expand 0.0000000001"), vec![1, 6]);
        assert_eq!(count_in(&mol, "name CA beyond 0.0000000001"), 7);
    }

    #[test]
    fn test_eval_expansion() {
        let mol = create_test_molecule();
        assert_eq!(count_in(&mol, "byres name CA"), 9);
        assert_eq!(select_in(&mol, "byres index 6"), vec![5, 6, 7, 8]);
        assert_eq!(count_in(&mol, "bychain index 0"), 9);

        let mol = create_mixed_molecule();
        assert_eq!(select_in(&mol, "byres (ligand around 2.5)"), vec![9]);
        assert_eq!(select_in(&mol, "bychain (ligand around 2.5)"), vec![7, 8, 9]);
        assert_eq!(select_in(&mol, "byres name N and resi 2"), vec![4, 5, 6]);
        assert_eq!(select_in(&mol, "byres index 11"), vec![11]);
    }

    #[test]
    fn test_caches() {
        let mol = create_test_molecule();
        let ctx = EvalContext::new(&mol);
        let expr = parse_selection("(name CA around 2) or (name CB around 2) xor (name CA around 2)").unwrap();

        let mut evaluator = Evaluator::new(&ctx);
        let result = evaluator.eval(&expr);
        assert_eq!(result, evaluate(&expr, &ctx).unwrap());
        assert_eq!(evaluator.grids.len(), 1);
        // Both `name CA around 2` subtrees share one entry
        let repeated = parse_selection("name CA around 2").unwrap();
        assert!(evaluator.memo.contains_key(&NodeKey(&*repeated)));
        assert_eq!(evaluator.memo.len(), 6);
        assert!(evaluator.grouping.is_none());
    }

    #[test]
    fn test_memo_separates_distinct_leaves() {
        let mol = create_test_molecule();
        let ctx = EvalContext::new(&mol);
        let glob = Expr::text(PredicateKind::Name, "C*").unwrap();
        let exact = Expr::text(PredicateKind::Name, "CA").unwrap();
        let close = Expr::around(exact.clone(), 1.5).unwrap();
        let far = Expr::around(exact.clone(), 1.5000001).unwrap();

        let expr = Expr::xor(exact.clone(), glob);
        assert_eq!(select_indices(&expr, &ctx), vec![2, 4, 7]);

        let expr = Expr::xor(close, far);
        assert!(select_indices(&expr, &ctx).is_empty());

        let negative_zero = Expr::leaf(
            PredicateKind::BFactor,
            ValueSpec::Numeric(NumericSpec::Compare(CompareOp::Ge, -0.0)),
        )
        .unwrap();
        let zero = Expr::leaf(
            PredicateKind::BFactor,
            ValueSpec::Numeric(NumericSpec::Compare(CompareOp::Ge, 0.0)),
        )
        .unwrap();
        assert!(NodeKey(&*negative_zero) != NodeKey(&*zero));
        assert_eq!(select_indices(&Expr::and(negative_zero, zero), &ctx).len(), 9);
    }

    #[test]
    fn test_single_atom_agrees_with_bulk() {
        let mol = create_mixed_molecule();
        let ctx = EvalContext::new(&mol);
        for input in [
            "all",
            "none",
            "name CA+N",
            "hydrogen or metal",
            "protein xor helix",
            "not (resn * and chain A)",
            "ligand around 2.5",
            "byres index 5",
            "chain A and bychain ligand",
            "water beyond 8",
        ] {
            let expr = parse_selection(input).unwrap();
            let bulk = evaluate(&expr, &ctx).unwrap();
            for atom in mol.atoms() {
                assert_eq!(
                    test(&expr, &ctx, atom).unwrap(),
                    bulk.contains(atom),
                    "{input} disagrees on atom {atom}"
                );
            }
        }
    }

    #[test]
    fn test_atom_out_of_range() {
        let mol = create_test_molecule();
        let ctx = EvalContext::new(&mol);
        let expr = parse_selection("all").unwrap();
        assert_eq!(
            test(&expr, &ctx, AtomIndex(99)),
            Err(EvalError::AtomOutOfRange { index: 99, count: 9 })
        );
    }
}
