//! The public selection handle
//!
//! A [`Selection`] owns the root of an immutable expression tree. It is
//! created by parsing text or by composing existing selections, and is
//! never modified afterwards; composition shares subtrees.

use std::fmt;
use std::str::FromStr;

use molsel_mol::{AtomIndex, MoleculeView};

use crate::ast::{Expr, ExprRef, PredicateKind};
use crate::canonical::to_canonical;
use crate::context::{EvalContext, SelectionOptions};
use crate::error::{EvalResult, ParseError, ParseResult};
use crate::eval;
use crate::parser::parse_selection;
use crate::result::SelectionResult;

/// A parsed selection expression
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    root: ExprRef,
}

impl Selection {
    /// Parse a selection string
    ///
    /// An empty or all-whitespace string selects every atom.
    pub fn parse(input: &str) -> ParseResult<Self> {
        let selection = Selection {
            root: parse_selection(input)?,
        };
        log::debug!("Parsed selection {:?} as {:?}", input, selection.to_canonical());
        Ok(selection)
    }

    /// Wrap an expression tree built in code
    pub fn from_expr(root: ExprRef) -> Self {
        Selection { root }
    }

    /// The selection matching every atom
    pub fn all() -> Self {
        Self::from_expr(Expr::all())
    }

    /// The selection matching no atom
    pub fn none() -> Self {
        Self::from_expr(Expr::none())
    }

    /// Root of the expression tree
    pub fn root(&self) -> &ExprRef {
        &self.root
    }

    /// Check whether this is the unrestricted selection (`all` or empty input)
    pub fn is_empty(&self) -> bool {
        matches!(*self.root, Expr::True)
    }

    /// Canonical string form; reparsing it selects the same atoms
    pub fn to_canonical(&self) -> String {
        to_canonical(&self.root)
    }

    /// Check whether any node of the tree has the given kind
    pub fn contains_predicate(&self, kind: PredicateKind) -> bool {
        self.root.contains_predicate(kind)
    }

    // =========================================================================
    // Composition
    // =========================================================================

    /// Atoms in both selections
    pub fn and(&self, other: &Selection) -> Selection {
        Self::from_expr(Expr::and(self.root.clone(), other.root.clone()))
    }

    /// Atoms in either selection
    pub fn or(&self, other: &Selection) -> Selection {
        Self::from_expr(Expr::or(self.root.clone(), other.root.clone()))
    }

    /// Atoms in exactly one of the selections
    pub fn xor(&self, other: &Selection) -> Selection {
        Self::from_expr(Expr::xor(self.root.clone(), other.root.clone()))
    }

    /// Atoms not in this selection
    pub fn not(&self) -> Selection {
        Self::from_expr(Expr::not(self.root.clone()))
    }

    // =========================================================================
    // Evaluation
    // =========================================================================

    /// Evaluate against every atom of `mol` with default options
    pub fn evaluate<M: MoleculeView + ?Sized>(&self, mol: &M) -> EvalResult<SelectionResult> {
        self.evaluate_with(&EvalContext::new(mol))
    }

    /// Evaluate within an explicit context
    pub fn evaluate_with<M: MoleculeView + ?Sized>(
        &self,
        ctx: &EvalContext<'_, M>,
    ) -> EvalResult<SelectionResult> {
        eval::evaluate(&self.root, ctx)
    }

    /// Test a single atom of `mol` with default options
    pub fn test<M: MoleculeView + ?Sized>(&self, mol: &M, atom: AtomIndex) -> EvalResult<bool> {
        self.test_with(&EvalContext::new(mol), atom)
    }

    /// Test a single atom within an explicit context
    pub fn test_with<M: MoleculeView + ?Sized>(
        &self,
        ctx: &EvalContext<'_, M>,
        atom: AtomIndex,
    ) -> EvalResult<bool> {
        eval::test(&self.root, ctx, atom)
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::all()
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.root, f)
    }
}

impl FromStr for Selection {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ============================================================================
// AtomMatcher
// ============================================================================

/// A selection bound to one molecule, answering per-atom membership
///
/// Evaluates once in bulk on construction; every [`matches`](Self::matches)
/// is a bitset lookup afterwards.
#[derive(Debug, Clone)]
pub struct AtomMatcher {
    selection: Selection,
    matched: SelectionResult,
}

impl AtomMatcher {
    /// Bind `selection` to `mol` with default options
    pub fn new<M: MoleculeView + ?Sized>(selection: Selection, mol: &M) -> EvalResult<Self> {
        Self::with_options(selection, mol, SelectionOptions::default())
    }

    /// Bind `selection` to `mol` with explicit matching options
    pub fn with_options<M: MoleculeView + ?Sized>(
        selection: Selection,
        mol: &M,
        options: SelectionOptions,
    ) -> EvalResult<Self> {
        let ctx = EvalContext::new(mol).with_options(options);
        let matched = selection.evaluate_with(&ctx)?;
        Ok(AtomMatcher { selection, matched })
    }

    /// Check whether `atom` is selected; atoms outside the molecule never are
    #[inline]
    pub fn matches(&self, atom: AtomIndex) -> bool {
        self.matched.contains(atom)
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The precomputed result
    pub fn result(&self) -> &SelectionResult {
        &self.matched
    }

    /// Number of selected atoms
    pub fn count(&self) -> usize {
        self.matched.count()
    }
}
