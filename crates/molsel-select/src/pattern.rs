//! Pattern matching for selection values
//!
//! String-valued predicates (`name`, `resn`, `chain`, ...) match through
//! [`Pattern`], which supports `*` (any run of characters) and `?` (exactly
//! one character). Numeric predicates (`resi`, `index`, `b`, ...) match
//! through [`NumericSpec`].

use smallvec::SmallVec;

/// A pattern for matching one string value
///
/// Whether a pattern globs is decided by its text alone: any `*` or `?`
/// makes it a wildcard. Two patterns with the same text are the same pattern.
/// - `C*` matches CA, CB, C
/// - `?H` matches any two-character name ending in H
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    text: String,
    glob: bool,
}

impl Pattern {
    /// Build a pattern from a literal value, detecting wildcards
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let glob = text.contains(['*', '?']);
        Pattern { text, glob }
    }

    /// The pattern text as written
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The text when the pattern has no wildcards
    pub fn literal(&self) -> Option<&str> {
        (!self.glob).then_some(self.text.as_str())
    }

    /// Check if a value matches this pattern
    pub fn matches(&self, value: &str, case_sensitive: bool) -> bool {
        if self.glob {
            match_wildcard(&self.text, value, case_sensitive)
        } else if case_sensitive {
            value == self.text
        } else {
            value.eq_ignore_ascii_case(&self.text)
        }
    }

    /// Check if this pattern contains wildcards
    pub fn has_wildcards(&self) -> bool {
        self.glob
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Glob match with single-star backtracking
fn match_wildcard(pattern: &str, value: &str, case_sensitive: bool) -> bool {
    let p: SmallVec<[char; 16]> = pattern.chars().collect();
    let v: SmallVec<[char; 16]> = value.chars().collect();
    let same = |a: char, b: char| {
        if case_sensitive {
            a == b
        } else {
            a.eq_ignore_ascii_case(&b)
        }
    };

    let (mut pi, mut vi) = (0usize, 0usize);
    // Position of the last `*` and the value index it is currently absorbing up to
    let mut star: Option<(usize, usize)> = None;

    while vi < v.len() {
        if pi < p.len() && p[pi] != '*' && (p[pi] == '?' || same(p[pi], v[vi])) {
            pi += 1;
            vi += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some((pi, vi));
            pi += 1;
        } else if let Some((sp, sv)) = star {
            pi = sp + 1;
            vi = sv + 1;
            star = Some((sp, sv + 1));
        } else {
            return false;
        }
    }

    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }
    pi == p.len()
}

/// Comparison operators for numeric properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// Equal to
    Eq,
    /// Less than
    Lt,
    /// Less than or equal to
    Le,
    /// Greater than
    Gt,
    /// Greater than or equal to
    Ge,
}

impl CompareOp {
    /// Apply the comparison to two f32 values
    #[inline]
    pub fn compare_f32(self, a: f32, b: f32) -> bool {
        match self {
            CompareOp::Eq => (a - b).abs() < f32::EPSILON,
            CompareOp::Lt => a < b,
            CompareOp::Le => a <= b,
            CompareOp::Gt => a > b,
            CompareOp::Ge => a >= b,
        }
    }

    /// Apply the comparison to two f64 values
    #[inline]
    pub fn compare_f64(self, a: f64, b: f64) -> bool {
        match self {
            CompareOp::Eq => a == b,
            CompareOp::Lt => a < b,
            CompareOp::Le => a <= b,
            CompareOp::Gt => a > b,
            CompareOp::Ge => a >= b,
        }
    }
}

impl std::fmt::Display for CompareOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "="),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Le => write!(f, "<="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Ge => write!(f, ">="),
        }
    }
}

/// Specification for numeric values (resi, index, serial, b, fragment)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericSpec {
    /// `resi 10`, `index < 5`, `b >= 20.5`
    Compare(CompareOp, f64),
    /// Inclusive range `a-b`
    Range(f64, f64),
}

impl NumericSpec {
    /// Match an integer-valued field
    pub fn matches_int(&self, value: i32) -> bool {
        let value = f64::from(value);
        match *self {
            NumericSpec::Compare(op, operand) => op.compare_f64(value, operand),
            NumericSpec::Range(lo, hi) => value >= lo && value <= hi,
        }
    }

    /// Match a single-precision field, comparing at single precision
    pub fn matches_f32(&self, value: f32) -> bool {
        match *self {
            NumericSpec::Compare(op, operand) => op.compare_f32(value, operand as f32),
            NumericSpec::Range(lo, hi) => value >= lo as f32 && value <= hi as f32,
        }
    }
}
