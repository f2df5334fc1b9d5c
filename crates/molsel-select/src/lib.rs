//! PyMOL-style Atom Selection Language
//!
//! Compiles selection strings such as `protein and chain A` or
//! `name CA+CB+N around 5` into an immutable expression tree and evaluates
//! that tree against any molecule implementing [`MoleculeView`].
//!
//! # Overview
//!
//! The selection language supports:
//! - Field predicates: `name`, `resn`, `resi`, `chain`, `elem`, `index`,
//!   `serial`, `alt`, `b`, `fragment`, `ss`, `residue`
//! - Numeric comparisons and ranges: `b > 50`, `index < 5`, `resi 10-20`
//! - Classes: `protein`, `ligand`, `water`, `solvent`, `organic`, `backbone`,
//!   `sidechain`, `metal`, `heavy`, `hydrogen`, `helix`, `sheet`, `turn`, `loop`
//! - Logical operators: `and`, `or`, `xor`, `not` (and `&`, `|`, `^`, `!`)
//! - Distance modifiers: `around`, `expand`, `beyond`
//! - Expansion modifiers: `byres`, `bychain`
//! - Multi-value lists: `name CA+CB+N`
//! - Hierarchical macros: `//chain/resi/name`
//!
//! # Example
//!
//! ```rust,ignore
//! use molsel_select::{select, Selection};
//!
//! // Select all C-alpha atoms in chain A
//! let result = select(&mol, "name CA and chain A")?;
//!
//! // Atoms within 5 Angstroms of any ligand atom, promoted to whole residues
//! let result = select(&mol, "byres (ligand around 5)")?;
//!
//! // Canonical form
//! assert_eq!(Selection::parse("NAME ca OR name cb")?.to_canonical(), "name ca+cb");
//! ```

mod ast;
mod canonical;
mod context;
mod error;
mod eval;
mod grouping;
mod keywords;
mod lexer;
mod parser;
mod pattern;
mod result;
mod selection;
mod selector;

#[cfg(test)]
mod testing;

// Re-export main types
pub use ast::{DistanceKind, Expr, ExprRef, PredicateKind, ValueSpec, ValueType};
pub use canonical::to_canonical;
pub use context::{EvalContext, SelectionOptions};
pub use error::{
    BuildError, ErrorKind, EvalError, EvalResult, ParseError, ParseResult, SelectError,
    SelectResult, SelectorError,
};
pub use grouping::Grouping;
pub use keywords::{Keyword, KeywordType};
pub use lexer::{tokenize, Spanned, Token};
pub use pattern::{CompareOp, NumericSpec, Pattern};
pub use result::SelectionResult;
pub use selection::{AtomMatcher, Selection};
pub use selector::{molecule_selectors, parse_selector_set, selector_strings, Selector};

// Re-export molsel-mol types for convenience
pub use molsel_mol::{AtomIndex, MoleculeView};

/// Parse a selection string
///
/// # Example
/// ```rust,ignore
/// let sel = parse("name CA and chain A")?;
/// assert_eq!(sel.to_canonical(), "name CA and chain A");
/// ```
pub fn parse(input: &str) -> ParseResult<Selection> {
    Selection::parse(input)
}

/// Select atoms from a molecule using a selection string
///
/// This is the main entry point for most selection operations.
///
/// # Example
/// ```rust,ignore
/// let result = select(&mol, "name CA")?;
/// println!("Selected {} atoms", result.count());
/// ```
pub fn select<M: MoleculeView + ?Sized>(mol: &M, selection: &str) -> SelectResult<SelectionResult> {
    let selection = parse(selection)?;
    selection.evaluate(mol).map_err(SelectError::from)
}

/// Select atoms and return their indices in ascending order
pub fn select_atoms<M: MoleculeView + ?Sized>(
    mol: &M,
    selection: &str,
) -> SelectResult<Vec<AtomIndex>> {
    let result = select(mol, selection)?;
    Ok(result.indices().collect())
}

/// Evaluate a pre-parsed expression with an explicit context
///
/// Use this to reuse a parsed expression or to control matching options.
pub fn evaluate<M: MoleculeView + ?Sized>(
    expr: &Expr,
    ctx: &EvalContext<'_, M>,
) -> EvalResult<SelectionResult> {
    eval::evaluate(expr, ctx)
}

/// Test a single atom against a pre-parsed expression
///
/// Leaf and logical nodes are answered for the atom alone; distance and
/// expansion subtrees are evaluated over the molecule on demand.
pub fn test_atom<M: MoleculeView + ?Sized>(
    expr: &Expr,
    ctx: &EvalContext<'_, M>,
    atom: AtomIndex,
) -> EvalResult<bool> {
    eval::test(expr, ctx, atom)
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ast::{Expr, PredicateKind};
    pub use crate::context::{EvalContext, SelectionOptions};
    pub use crate::error::{ParseError, SelectError, SelectResult};
    pub use crate::result::SelectionResult;
    pub use crate::selection::{AtomMatcher, Selection};
    pub use crate::selector::Selector;
    pub use crate::{evaluate, parse, select, select_atoms, test_atom};
}
