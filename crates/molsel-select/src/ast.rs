//! Selection Abstract Syntax Tree
//!
//! Defines the expression tree for parsed selections. Nodes are immutable
//! and children are reference counted, so composing new selections from
//! existing ones shares subtrees instead of copying them.

use std::borrow::Cow;
use std::sync::Arc;

use molsel_mol::element;

use crate::error::BuildError;
use crate::keywords::Keyword;
use crate::pattern::{NumericSpec, Pattern};
use crate::selector::Selector;

/// Shared reference to an expression node
pub type ExprRef = Arc<Expr>;

// ============================================================================
// Predicate kinds
// ============================================================================

/// Tag identifying what a node tests or how it combines its children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PredicateKind {
    // Logical combinators
    And,
    Or,
    Not,
    Xor,

    // Field predicates
    Name,
    Resn,
    Resi,
    Chain,
    Elem,
    Index,
    Serial,
    AltLoc,
    BFactor,
    Fragment,
    SecondaryStructure,
    Residue,

    // Classification predicates
    Protein,
    Ligand,
    Water,
    Solvent,
    Organic,
    Backbone,
    Sidechain,
    Metal,
    Heavy,
    Hydrogen,
    PolarHydrogen,
    NonpolarHydrogen,
    Helix,
    Sheet,
    Turn,
    Loop,

    // Modifiers
    ByRes,
    ByChain,
    Around,
    Expand,
    Beyond,

    // Constants
    True,
    False,
}

/// Kind of value a leaf predicate takes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Parameterless (`protein`, `helix`)
    None,
    /// String patterns (`name CA`)
    Text,
    /// Numeric comparison or range (`resi 10-20`)
    Numeric,
    /// Residue selector (`residue "ALA:1: :A"`)
    Residue,
}

impl PredicateKind {
    /// Value type taken by a leaf predicate, `None` for non-leaf kinds
    pub fn value_type(self) -> Option<ValueType> {
        use PredicateKind::*;
        match self {
            Name | Resn | Chain | Elem | AltLoc | SecondaryStructure => Some(ValueType::Text),
            Resi | Index | Serial | BFactor | Fragment => Some(ValueType::Numeric),
            Residue => Some(ValueType::Residue),
            Protein | Ligand | Water | Solvent | Organic | Backbone | Sidechain | Metal
            | Heavy | Hydrogen | PolarHydrogen | NonpolarHydrogen | Helix | Sheet | Turn
            | Loop => Some(ValueType::None),
            And | Or | Not | Xor | ByRes | ByChain | Around | Expand | Beyond | True | False => {
                None
            }
        }
    }

    /// Check if this kind is a leaf predicate
    pub fn is_leaf(self) -> bool {
        self.value_type().is_some()
    }

    /// Canonical keyword
    pub fn keyword(self) -> &'static str {
        use PredicateKind::*;
        let kw = match self {
            And => Keyword::And,
            Or => Keyword::Or,
            Not => Keyword::Not,
            Xor => Keyword::Xor,
            Name => Keyword::Name,
            Resn => Keyword::Resn,
            Resi => Keyword::Resi,
            Chain => Keyword::Chain,
            Elem => Keyword::Elem,
            Index => Keyword::Index,
            Serial => Keyword::Serial,
            AltLoc => Keyword::AltLoc,
            BFactor => Keyword::BFactor,
            Fragment => Keyword::Fragment,
            SecondaryStructure => Keyword::SecondaryStructure,
            Residue => Keyword::Residue,
            Protein => Keyword::Protein,
            Ligand => Keyword::Ligand,
            Water => Keyword::Water,
            Solvent => Keyword::Solvent,
            Organic => Keyword::Organic,
            Backbone => Keyword::Backbone,
            Sidechain => Keyword::Sidechain,
            Metal => Keyword::Metal,
            Heavy => Keyword::Heavy,
            Hydrogen => Keyword::Hydrogen,
            PolarHydrogen => Keyword::PolarHydrogen,
            NonpolarHydrogen => Keyword::NonpolarHydrogen,
            Helix => Keyword::Helix,
            Sheet => Keyword::Sheet,
            Turn => Keyword::Turn,
            Loop => Keyword::Loop,
            ByRes => Keyword::ByRes,
            ByChain => Keyword::ByChain,
            Around => Keyword::Around,
            Expand => Keyword::Expand,
            Beyond => Keyword::Beyond,
            True => Keyword::All,
            False => Keyword::None,
        };
        kw.as_str()
    }

    /// Leaf predicate introduced by a property or class keyword
    pub fn from_keyword(kw: Keyword) -> Option<Self> {
        use PredicateKind::*;
        Some(match kw {
            Keyword::Name => Name,
            Keyword::Resn => Resn,
            Keyword::Resi => Resi,
            Keyword::Chain => Chain,
            Keyword::Elem => Elem,
            Keyword::Index => Index,
            Keyword::Serial => Serial,
            Keyword::AltLoc => AltLoc,
            Keyword::BFactor => BFactor,
            Keyword::Fragment => Fragment,
            Keyword::SecondaryStructure => SecondaryStructure,
            Keyword::Residue => Residue,
            Keyword::Protein => Protein,
            Keyword::Ligand => Ligand,
            Keyword::Water => Water,
            Keyword::Solvent => Solvent,
            Keyword::Organic => Organic,
            Keyword::Backbone => Backbone,
            Keyword::Sidechain => Sidechain,
            Keyword::Metal => Metal,
            Keyword::Heavy => Heavy,
            Keyword::Hydrogen => Hydrogen,
            Keyword::PolarHydrogen => PolarHydrogen,
            Keyword::NonpolarHydrogen => NonpolarHydrogen,
            Keyword::Helix => Helix,
            Keyword::Sheet => Sheet,
            Keyword::Turn => Turn,
            Keyword::Loop => Loop,
            _ => return None,
        })
    }
}

impl std::fmt::Display for PredicateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

// ============================================================================
// Values
// ============================================================================

/// Value a leaf predicate is tested against
#[derive(Debug, Clone, PartialEq)]
pub enum ValueSpec {
    /// No value
    None,
    /// String pattern
    Pattern(Pattern),
    /// Numeric comparison or inclusive range
    Numeric(NumericSpec),
    /// Residue identity
    Residue(Selector),
}

impl ValueSpec {
    /// The value type of this spec
    pub fn value_type(&self) -> ValueType {
        match self {
            ValueSpec::None => ValueType::None,
            ValueSpec::Pattern(_) => ValueType::Text,
            ValueSpec::Numeric(_) => ValueType::Numeric,
            ValueSpec::Residue(_) => ValueType::Residue,
        }
    }

    /// Text this value is written as, for text and residue values
    pub fn text(&self) -> Option<Cow<'_, str>> {
        match self {
            ValueSpec::Pattern(pattern) => Some(Cow::Borrowed(pattern.as_str())),
            ValueSpec::Residue(selector) => Some(Cow::Owned(selector.to_string())),
            ValueSpec::None | ValueSpec::Numeric(_) => None,
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            ValueSpec::None => "no value",
            ValueSpec::Pattern(_) => "a text pattern",
            ValueSpec::Numeric(_) => "a numeric value",
            ValueSpec::Residue(_) => "a residue selector",
        }
    }
}

/// Distance modifier flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistanceKind {
    /// Atoms within the radius, excluding the reference atoms
    Around,
    /// Atoms within the radius, including the reference atoms
    Expand,
    /// Atoms farther than the radius from every reference atom
    Beyond,
}

impl DistanceKind {
    pub fn predicate_kind(self) -> PredicateKind {
        match self {
            DistanceKind::Around => PredicateKind::Around,
            DistanceKind::Expand => PredicateKind::Expand,
            DistanceKind::Beyond => PredicateKind::Beyond,
        }
    }
}

// ============================================================================
// Expressions
// ============================================================================

/// A node of the selection expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Every atom (`all`, empty input)
    True,
    /// No atom (`none`)
    False,

    /// Field or classification test
    Leaf { kind: PredicateKind, value: ValueSpec },

    /// Complement
    Not(ExprRef),
    /// Intersection
    And(ExprRef, ExprRef),
    /// Union
    Or(ExprRef, ExprRef),
    /// Symmetric difference
    Xor(ExprRef, ExprRef),

    /// `child around/expand/beyond radius`
    Distance {
        kind: DistanceKind,
        radius: f32,
        child: ExprRef,
    },

    /// Complete residues of the child's atoms
    ByRes(ExprRef),
    /// Complete chains of the child's atoms
    ByChain(ExprRef),
}

impl Expr {
    /// The constant selecting every atom
    pub fn all() -> ExprRef {
        Arc::new(Expr::True)
    }

    /// The constant selecting nothing
    pub fn none() -> ExprRef {
        Arc::new(Expr::False)
    }

    /// Create a leaf predicate, checking that `value` suits `kind`
    ///
    /// Exact element symbols are normalized to title case.
    pub fn leaf(kind: PredicateKind, value: ValueSpec) -> Result<ExprRef, BuildError> {
        if kind.value_type() != Some(value.value_type()) {
            return Err(BuildError::ValueMismatch {
                kind: kind.keyword(),
                value: value.describe(),
            });
        }
        if let Some(text) = value.text().filter(|t| t.contains('"') && t.contains('\'')) {
            return Err(BuildError::MixedQuotes(text.into_owned()));
        }
        let value = match value {
            ValueSpec::Numeric(NumericSpec::Range(min, max)) if min > max => {
                return Err(BuildError::InvertedRange { min, max });
            }
            ValueSpec::Pattern(pattern) if kind == PredicateKind::Elem => {
                match pattern.literal() {
                    Some(sym) => ValueSpec::Pattern(Pattern::new(element::normalize_symbol(sym))),
                    None => ValueSpec::Pattern(pattern),
                }
            }
            other => other,
        };
        Ok(Arc::new(Expr::Leaf { kind, value }))
    }

    /// Create a parameterless classification predicate
    pub fn class(kind: PredicateKind) -> Result<ExprRef, BuildError> {
        Self::leaf(kind, ValueSpec::None)
    }

    /// Create a string-pattern predicate (`name CA`)
    pub fn text(kind: PredicateKind, value: &str) -> Result<ExprRef, BuildError> {
        Self::leaf(kind, ValueSpec::Pattern(Pattern::new(value)))
    }

    /// Create an AND expression
    pub fn and(left: ExprRef, right: ExprRef) -> ExprRef {
        Arc::new(Expr::And(left, right))
    }

    /// Create an OR expression
    pub fn or(left: ExprRef, right: ExprRef) -> ExprRef {
        Arc::new(Expr::Or(left, right))
    }

    /// Create an XOR expression
    pub fn xor(left: ExprRef, right: ExprRef) -> ExprRef {
        Arc::new(Expr::Xor(left, right))
    }

    /// Create a NOT expression
    pub fn not(inner: ExprRef) -> ExprRef {
        Arc::new(Expr::Not(inner))
    }

    /// Create a distance modifier; the radius must be strictly positive
    pub fn distance(kind: DistanceKind, radius: f32, child: ExprRef) -> Result<ExprRef, BuildError> {
        // Also rejects NaN
        if !(radius > 0.0) {
            return Err(BuildError::NonPositiveRadius(radius));
        }
        Ok(Arc::new(Expr::Distance {
            kind,
            radius,
            child,
        }))
    }

    /// Create `child around radius`
    pub fn around(child: ExprRef, radius: f32) -> Result<ExprRef, BuildError> {
        Self::distance(DistanceKind::Around, radius, child)
    }

    /// Create `child expand radius`
    pub fn expand(child: ExprRef, radius: f32) -> Result<ExprRef, BuildError> {
        Self::distance(DistanceKind::Expand, radius, child)
    }

    /// Create `child beyond radius`
    pub fn beyond(child: ExprRef, radius: f32) -> Result<ExprRef, BuildError> {
        Self::distance(DistanceKind::Beyond, radius, child)
    }

    /// Create `byres child`
    pub fn by_res(child: ExprRef) -> ExprRef {
        Arc::new(Expr::ByRes(child))
    }

    /// Create `bychain child`
    pub fn by_chain(child: ExprRef) -> ExprRef {
        Arc::new(Expr::ByChain(child))
    }

    /// Tag of this node
    pub fn kind(&self) -> PredicateKind {
        match self {
            Expr::True => PredicateKind::True,
            Expr::False => PredicateKind::False,
            Expr::Leaf { kind, .. } => *kind,
            Expr::Not(_) => PredicateKind::Not,
            Expr::And(..) => PredicateKind::And,
            Expr::Or(..) => PredicateKind::Or,
            Expr::Xor(..) => PredicateKind::Xor,
            Expr::Distance { kind, .. } => kind.predicate_kind(),
            Expr::ByRes(_) => PredicateKind::ByRes,
            Expr::ByChain(_) => PredicateKind::ByChain,
        }
    }

    /// Check whether any node of this tree has the given kind
    pub fn contains_predicate(&self, kind: PredicateKind) -> bool {
        if self.kind() == kind {
            return true;
        }
        match self {
            Expr::And(l, r) | Expr::Or(l, r) | Expr::Xor(l, r) => {
                l.contains_predicate(kind) || r.contains_predicate(kind)
            }
            Expr::Not(inner)
            | Expr::ByRes(inner)
            | Expr::ByChain(inner)
            | Expr::Distance { child: inner, .. } => inner.contains_predicate(kind),
            Expr::True | Expr::False | Expr::Leaf { .. } => false,
        }
    }

    /// Check whether evaluating this tree needs the whole molecule
    ///
    /// True when a distance or expansion modifier appears anywhere.
    pub fn is_aggregate(&self) -> bool {
        match self {
            Expr::Distance { .. } | Expr::ByRes(_) | Expr::ByChain(_) => true,
            Expr::And(l, r) | Expr::Or(l, r) | Expr::Xor(l, r) => {
                l.is_aggregate() || r.is_aggregate()
            }
            Expr::Not(inner) => inner.is_aggregate(),
            Expr::True | Expr::False | Expr::Leaf { .. } => false,
        }
    }

    /// Check if this is a leaf or constant (no children)
    pub fn is_simple(&self) -> bool {
        matches!(self, Expr::True | Expr::False | Expr::Leaf { .. })
    }
}
