//! Canonical rendering of expression trees
//!
//! `Display` for [`Expr`] produces the normalized selection string:
//! lowercase keywords, postfix distance modifiers, parentheses only where
//! the parser's precedence would otherwise regroup the tree, and `+` lists
//! for disjunctions of one predicate kind. Parsing the canonical form
//! yields a tree that selects the same atoms.

use std::fmt;

use crate::ast::{Expr, PredicateKind, ValueSpec};
use crate::keywords::{self, KeywordType};
use crate::lexer::is_word_char;
use crate::pattern::{CompareOp, NumericSpec};

// Binding strength of each node shape, loosest first
const PREC_OR: u8 = 1;
const PREC_AND: u8 = 2;
const PREC_NOT: u8 = 3;
const PREC_DISTANCE: u8 = 4;
const PREC_PREFIX: u8 = 5;
const PREC_ATOM: u8 = 6;

/// Render an expression tree in canonical form
pub fn to_canonical(expr: &Expr) -> String {
    expr.to_string()
}

fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Or(..) if collapse(expr).is_some() => PREC_ATOM,
        Expr::Or(..) | Expr::Xor(..) => PREC_OR,
        Expr::And(..) => PREC_AND,
        Expr::Not(_) => PREC_NOT,
        Expr::Distance { .. } => PREC_DISTANCE,
        Expr::ByRes(_) | Expr::ByChain(_) => PREC_PREFIX,
        Expr::True | Expr::False | Expr::Leaf { .. } => PREC_ATOM,
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::True => f.write_str("all"),
            Expr::False => f.write_str("none"),
            Expr::Leaf { kind, value } => write_leaf(f, *kind, &[value]),
            Expr::Or(left, right) => match collapse(self) {
                Some((kind, values)) => write_leaf(f, kind, &values),
                None => write_binary(f, self, left, right),
            },
            Expr::And(left, right) | Expr::Xor(left, right) => {
                write_binary(f, self, left, right)
            }
            Expr::Not(inner) => {
                f.write_str("not ")?;
                write_child(f, inner, precedence(inner) < PREC_NOT)
            }
            Expr::Distance {
                kind,
                radius,
                child,
            } => {
                write_child(f, child, precedence(child) < PREC_DISTANCE)?;
                write!(f, " {} {}", kind.predicate_kind().keyword(), radius)
            }
            Expr::ByRes(inner) | Expr::ByChain(inner) => {
                write!(f, "{} ", self.kind().keyword())?;
                write_child(f, inner, precedence(inner) < PREC_PREFIX)
            }
        }
    }
}

fn write_child(f: &mut fmt::Formatter<'_>, child: &Expr, parens: bool) -> fmt::Result {
    if parens {
        write!(f, "({})", child)
    } else {
        write!(f, "{}", child)
    }
}

/// Left-associative binary rendering
///
/// A right operand of equal precedence keeps its parentheses unless it is
/// the same operator, since and/or/xor are each associative on their own.
fn write_binary(f: &mut fmt::Formatter<'_>, node: &Expr, left: &Expr, right: &Expr) -> fmt::Result {
    let prec = precedence(node);
    write_child(f, left, precedence(left) < prec)?;
    write!(f, " {} ", node.kind().keyword())?;
    let right_prec = precedence(right);
    write_child(
        f,
        right,
        right_prec < prec || (right_prec == prec && right.kind() != node.kind()),
    )
}

fn collect_or_operands<'a>(expr: &'a Expr, out: &mut Vec<&'a Expr>) {
    match expr {
        Expr::Or(left, right) => {
            collect_or_operands(left, out);
            collect_or_operands(right, out);
        }
        other => out.push(other),
    }
}

/// Values of an OR chain whose operands are all valued leaves of one kind
fn collapse(expr: &Expr) -> Option<(PredicateKind, Vec<&ValueSpec>)> {
    let mut operands = Vec::new();
    collect_or_operands(expr, &mut operands);

    let mut kind = None;
    let mut values = Vec::with_capacity(operands.len());
    for operand in operands {
        let Expr::Leaf { kind: k, value } = operand else {
            return None;
        };
        if *kind.get_or_insert(*k) != *k || !listable(value) {
            return None;
        }
        values.push(value);
    }
    kind.map(|k| (k, values))
}

/// Check whether a value can appear in a `+` list
fn listable(value: &ValueSpec) -> bool {
    match value {
        ValueSpec::None => false,
        ValueSpec::Numeric(NumericSpec::Compare(op, _)) => *op == CompareOp::Eq,
        ValueSpec::Numeric(NumericSpec::Range(..))
        | ValueSpec::Pattern(_)
        | ValueSpec::Residue(_) => true,
    }
}

fn write_leaf(f: &mut fmt::Formatter<'_>, kind: PredicateKind, values: &[&ValueSpec]) -> fmt::Result {
    f.write_str(kind.keyword())?;
    for (i, value) in values.iter().enumerate() {
        if matches!(value, ValueSpec::None) {
            continue;
        }
        f.write_str(if i == 0 { " " } else { "+" })?;
        write_value(f, value)?;
    }
    Ok(())
}

fn write_value(f: &mut fmt::Formatter<'_>, value: &ValueSpec) -> fmt::Result {
    match value {
        ValueSpec::None => Ok(()),
        ValueSpec::Pattern(pattern) => write_text(f, pattern.as_str()),
        ValueSpec::Numeric(NumericSpec::Compare(CompareOp::Eq, n)) => write!(f, "{}", n),
        ValueSpec::Numeric(NumericSpec::Compare(op, n)) => write!(f, "{} {}", op, n),
        ValueSpec::Numeric(NumericSpec::Range(lo, hi)) => write!(f, "{}-{}", lo, hi),
        ValueSpec::Residue(selector) => write_quoted(f, &selector.to_string()),
    }
}

/// Write a text value bare when it lexes back as a single value token
fn write_text(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    let bare = !text.is_empty()
        && text.chars().all(is_word_char)
        && !text.starts_with('\'')
        && !matches!(
            keywords::lookup(text).map(|kw| kw.keyword_type()),
            Some(KeywordType::Logic)
        );
    if bare {
        f.write_str(text)
    } else {
        write_quoted(f, text)
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, text: &str) -> fmt::Result {
    if text.contains('"') {
        write!(f, "'{}'", text)
    } else {
        write!(f, "\"{}\"", text)
    }
}
