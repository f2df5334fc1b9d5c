//! Evaluation context for selections
//!
//! [`EvalContext`] binds the molecule being queried to the
//! [`SelectionOptions`] that govern string matching.

use molsel_mol::MoleculeView;
use serde::{Deserialize, Serialize};

/// Options controlling how string values are matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionOptions {
    /// Match names, residue names, chains, alt codes and secondary
    /// structure codes case-sensitively. Element symbols always ignore case.
    pub case_sensitive: bool,
    /// Trim surrounding whitespace from molecule strings before matching
    pub ignore_whitespace: bool,
}

impl Default for SelectionOptions {
    fn default() -> Self {
        SelectionOptions {
            case_sensitive: false,
            ignore_whitespace: true,
        }
    }
}

impl SelectionOptions {
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_ignore_whitespace(mut self, ignore_whitespace: bool) -> Self {
        self.ignore_whitespace = ignore_whitespace;
        self
    }

    /// Apply the whitespace policy to a molecule-supplied string
    #[inline]
    pub fn prepare<'s>(&self, value: &'s str) -> &'s str {
        if self.ignore_whitespace {
            value.trim()
        } else {
            value
        }
    }
}

/// Context for evaluating selection expressions against one molecule
pub struct EvalContext<'a, M: MoleculeView + ?Sized> {
    molecule: &'a M,
    options: SelectionOptions,
}

impl<'a, M: MoleculeView + ?Sized> EvalContext<'a, M> {
    /// Create a context with default options
    pub fn new(molecule: &'a M) -> Self {
        EvalContext {
            molecule,
            options: SelectionOptions::default(),
        }
    }

    /// Replace the matching options
    pub fn with_options(mut self, options: SelectionOptions) -> Self {
        self.options = options;
        self
    }

    /// The molecule being queried
    #[inline]
    pub fn molecule(&self) -> &'a M {
        self.molecule
    }

    #[inline]
    pub fn options(&self) -> &SelectionOptions {
        &self.options
    }

    /// Number of atoms in the molecule
    #[inline]
    pub fn atom_count(&self) -> usize {
        self.molecule.atom_count()
    }
}

impl<M: MoleculeView + ?Sized> Clone for EvalContext<'_, M> {
    fn clone(&self) -> Self {
        EvalContext {
            molecule: self.molecule,
            options: self.options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::create_test_molecule;

    #[test]
    fn test_default_options() {
        let opts = SelectionOptions::default();
        assert!(!opts.case_sensitive);
        assert!(opts.ignore_whitespace);
        assert_eq!(opts.prepare(" CA "), "CA");
        assert_eq!(opts.with_ignore_whitespace(false).prepare(" CA "), " CA ");
    }

    #[test]
    fn test_context() {
        let mol = create_test_molecule();
        let ctx = EvalContext::new(&mol).with_options(SelectionOptions::default().with_case_sensitive(true));
        assert_eq!(ctx.atom_count(), 9);
        assert!(ctx.options().case_sensitive);
        assert_eq!(ctx.clone().molecule().atom_count(), 9);
    }
}
