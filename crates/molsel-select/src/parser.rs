//! Parser for the selection language
//!
//! Converts a token stream into an expression tree using recursive descent
//! with precedence climbing for the binary operators. From tightest to
//! loosest binding:
//!
//! 1. parenthesized groups, leaf predicates (`name CA+CB` expands to an OR)
//!    and the `//chain/resi/name` macro
//! 2. prefix `byres` / `bychain` (and the prefix distance form `around R sel`)
//! 3. postfix `around R` / `xaround R` / `expand R` / `beyond R`
//! 4. `not` / `!`
//! 5. `and` / `&`
//! 6. `or` / `|` and `xor` / `^`, equal precedence, left-associative

use crate::ast::{DistanceKind, Expr, ExprRef, PredicateKind, ValueSpec, ValueType};
use crate::error::{BuildError, ParseError, ParseResult};
use crate::keywords::{Keyword, KeywordType};
use crate::lexer::{Spanned, Token, TokenStream};
use crate::pattern::{CompareOp, NumericSpec, Pattern};
use crate::selector::Selector;

/// Parse a selection string into an expression tree
///
/// Empty (or all-whitespace) input parses to the `all` constant.
pub fn parse_selection(input: &str) -> ParseResult<ExprRef> {
    let mut stream = TokenStream::from_str(input)?;
    if stream.is_eof() {
        return Ok(Expr::all());
    }

    let expr = parse_expr(&mut stream, 0)?;

    // Ensure we consumed all input
    if !stream.is_eof() {
        let tok = stream.peek_spanned();
        return Err(match tok.token {
            Token::RParen => ParseError::UnbalancedParen {
                position: tok.offset,
            },
            _ => unexpected(tok, "operator or end of input"),
        });
    }

    Ok(expr)
}

/// Binary operator recognized during expression parsing
#[derive(Debug, Clone, Copy)]
enum BinOp {
    And,
    Or,
    Xor,
}

impl BinOp {
    fn from_token(tok: &Token) -> Option<Self> {
        match tok {
            Token::Keyword(Keyword::And) => Some(BinOp::And),
            Token::Keyword(Keyword::Or) => Some(BinOp::Or),
            Token::Keyword(Keyword::Xor) => Some(BinOp::Xor),
            _ => None,
        }
    }

    fn precedence(self) -> u8 {
        match self {
            BinOp::And => Keyword::And.precedence(),
            BinOp::Or => Keyword::Or.precedence(),
            BinOp::Xor => Keyword::Xor.precedence(),
        }
    }

    fn build(self, left: ExprRef, right: ExprRef) -> ExprRef {
        match self {
            BinOp::And => Expr::and(left, right),
            BinOp::Or => Expr::or(left, right),
            BinOp::Xor => Expr::xor(left, right),
        }
    }
}

/// Error for a token that does not fit here
fn unexpected(tok: &Spanned, expected: &str) -> ParseError {
    match tok.token {
        Token::Eof => ParseError::UnexpectedEof {
            expected: expected.to_string(),
        },
        _ => ParseError::Syntax {
            position: tok.offset,
            found: tok.text.clone(),
            expected: expected.to_string(),
        },
    }
}

/// Parse an expression with minimum precedence
fn parse_expr(stream: &mut TokenStream, min_prec: u8) -> ParseResult<ExprRef> {
    let mut left = parse_unary(stream)?;

    while let Some(op) = BinOp::from_token(stream.peek()) {
        if op.precedence() < min_prec {
            break;
        }
        stream.next();
        let right = parse_expr(stream, op.precedence() + 1)?;
        left = op.build(left, right);
    }

    Ok(left)
}

/// Parse `not` chains
fn parse_unary(stream: &mut TokenStream) -> ParseResult<ExprRef> {
    if matches!(stream.peek(), Token::Keyword(Keyword::Not)) {
        stream.next();
        let inner = parse_unary(stream)?;
        return Ok(Expr::not(inner));
    }
    parse_postfix(stream)
}

/// Parse a prefixed term followed by any number of postfix distance modifiers
fn parse_postfix(stream: &mut TokenStream) -> ParseResult<ExprRef> {
    let mut expr = parse_prefix(stream)?;

    while let Token::Keyword(kw) = *stream.peek() {
        let Some(kind) = distance_kind(kw) else {
            break;
        };
        stream.next();
        let (radius, at) = parse_radius(stream)?;
        expr = Expr::distance(kind, radius, expr).map_err(|e| semantic(&at, e))?;
    }

    Ok(expr)
}

fn distance_kind(kw: Keyword) -> Option<DistanceKind> {
    match kw {
        Keyword::Around | Keyword::XAround => Some(DistanceKind::Around),
        Keyword::Expand => Some(DistanceKind::Expand),
        Keyword::Beyond => Some(DistanceKind::Beyond),
        _ => None,
    }
}

/// Parse prefix modifiers (byres, bychain, prefix distance form)
fn parse_prefix(stream: &mut TokenStream) -> ParseResult<ExprRef> {
    let Token::Keyword(kw) = *stream.peek() else {
        return parse_primary(stream);
    };

    match kw {
        Keyword::ByRes => {
            stream.next();
            Ok(Expr::by_res(parse_prefix(stream)?))
        }
        Keyword::ByChain => {
            stream.next();
            Ok(Expr::by_chain(parse_prefix(stream)?))
        }
        _ => match distance_kind(kw) {
            Some(kind) => {
                stream.next();
                let (radius, at) = parse_radius(stream)?;
                let inner = parse_prefix(stream)?;
                Expr::distance(kind, radius, inner).map_err(|e| semantic(&at, e))
            }
            None => parse_primary(stream),
        },
    }
}

/// Parse a primary expression (constant, predicate, parenthesized group, macro)
fn parse_primary(stream: &mut TokenStream) -> ParseResult<ExprRef> {
    let tok = stream.peek_spanned().clone();

    match tok.token {
        Token::LParen => {
            stream.next();
            let inner = parse_expr(stream, 0)?;
            let close = stream.next();
            match close.token {
                Token::RParen => Ok(inner),
                Token::Eof => Err(ParseError::UnbalancedParen {
                    position: tok.offset,
                }),
                _ => Err(unexpected(&close, "')'")),
            }
        }
        Token::Macro(ref fields) => {
            stream.next();
            parse_macro(fields, &tok)
        }
        Token::Keyword(kw) => match kw.keyword_type() {
            KeywordType::Constant => {
                stream.next();
                Ok(match kw {
                    Keyword::None => Expr::none(),
                    _ => Expr::all(),
                })
            }
            KeywordType::Property | KeywordType::Class => parse_predicate(stream, kw),
            KeywordType::Logic | KeywordType::Expansion | KeywordType::Distance => {
                Err(unexpected(&tok, "selection"))
            }
        },
        Token::Word(ref word) => Err(ParseError::UnknownKeyword {
            position: tok.offset,
            word: word.clone(),
        }),
        _ => Err(unexpected(&tok, "selection")),
    }
}

/// Parse a leaf predicate and its values
fn parse_predicate(stream: &mut TokenStream, kw: Keyword) -> ParseResult<ExprRef> {
    let kw_tok = stream.next();
    let Some(kind) = PredicateKind::from_keyword(kw) else {
        return Err(unexpected(&kw_tok, "selection"));
    };

    match kind.value_type() {
        Some(ValueType::Text) => {
            let values = parse_value_list(stream, &kw_tok)?;
            or_chain(values, |tok| {
                Expr::leaf(kind, ValueSpec::Pattern(Pattern::new(value_text(tok))))
                    .map_err(|e| semantic(tok, e))
            })
        }
        Some(ValueType::Numeric) => parse_numeric(stream, kind, &kw_tok),
        Some(ValueType::Residue) => {
            let values = parse_value_list(stream, &kw_tok)?;
            or_chain(values, |tok| {
                let selector =
                    value_text(tok)
                        .parse::<Selector>()
                        .map_err(|e| ParseError::Semantic {
                            position: tok.offset,
                            fragment: tok.text.clone(),
                            reason: e.to_string(),
                        })?;
                Expr::leaf(kind, ValueSpec::Residue(selector)).map_err(|e| semantic(tok, e))
            })
        }
        Some(ValueType::None) => Expr::class(kind).map_err(|e| semantic(&kw_tok, e)),
        None => Err(unexpected(&kw_tok, "selection")),
    }
}

/// Text of a value token, without quotes
fn value_text(tok: &Spanned) -> &str {
    match &tok.token {
        Token::Quoted(s) => s,
        _ => &tok.text,
    }
}

/// Check whether a token can serve as a string value
fn is_text_value(tok: &Token) -> bool {
    match tok {
        Token::Keyword(kw) => kw.keyword_type() != KeywordType::Logic,
        other => other.is_value(),
    }
}

/// Parse `value(+value)*`
fn parse_value_list(stream: &mut TokenStream, kw_tok: &Spanned) -> ParseResult<Vec<Spanned>> {
    let expected = format!("value for '{}'", kw_tok.text);
    let mut values = Vec::new();
    loop {
        let tok = stream.next();
        if !is_text_value(&tok.token) {
            return Err(unexpected(&tok, &expected));
        }
        values.push(tok);
        if !matches!(stream.peek(), Token::Plus) {
            break;
        }
        stream.next();
    }
    Ok(values)
}

/// Parse a numeric value: `< 5`, `10`, `10-20`, `1+3+5-7`
fn parse_numeric(
    stream: &mut TokenStream,
    kind: PredicateKind,
    kw_tok: &Spanned,
) -> ParseResult<ExprRef> {
    let expected = format!("number or range for '{}'", kw_tok.text);

    if let Token::Compare(op) = *stream.peek() {
        stream.next();
        let tok = stream.next();
        let Token::Number(n) = tok.token else {
            return Err(unexpected(&tok, &expected));
        };
        return Expr::leaf(kind, ValueSpec::Numeric(NumericSpec::Compare(op, n)))
            .map_err(|e| semantic(&tok, e));
    }

    let mut values = Vec::new();
    loop {
        let tok = stream.next();
        if !matches!(tok.token, Token::Number(_) | Token::Range(..)) {
            return Err(unexpected(&tok, &expected));
        }
        values.push(tok);
        if !matches!(stream.peek(), Token::Plus) {
            break;
        }
        stream.next();
    }

    or_chain(values, |tok| {
        let spec = match tok.token {
            Token::Range(lo, hi) => NumericSpec::Range(lo, hi),
            Token::Number(n) => NumericSpec::Compare(CompareOp::Eq, n),
            _ => return Err(unexpected(tok, &expected)),
        };
        Expr::leaf(kind, ValueSpec::Numeric(spec)).map_err(|e| semantic(tok, e))
    })
}

/// Parse a distance radius
fn parse_radius(stream: &mut TokenStream) -> ParseResult<(f32, Spanned)> {
    let tok = stream.next();
    match tok.token {
        Token::Number(n) => Ok((n as f32, tok)),
        _ => Err(unexpected(&tok, "radius")),
    }
}

/// Build a left-to-right OR of one leaf per value
fn or_chain<T>(
    values: Vec<T>,
    mut leaf: impl FnMut(&T) -> ParseResult<ExprRef>,
) -> ParseResult<ExprRef> {
    let mut iter = values.iter();
    let Some(first) = iter.next() else {
        return Ok(Expr::none());
    };
    let mut expr = leaf(first)?;
    for value in iter {
        expr = Expr::or(expr, leaf(value)?);
    }
    Ok(expr)
}

fn semantic(tok: &Spanned, cause: BuildError) -> ParseError {
    ParseError::semantic(tok.offset, tok.text.clone(), cause)
}

// ============================================================================
// Hierarchical macro
// ============================================================================

/// Expand `//chain/resi/name` into an AND of the non-empty fields
fn parse_macro(fields: &[String], tok: &Spanned) -> ParseResult<ExprRef> {
    if fields.len() > 3 {
        return Err(ParseError::Syntax {
            position: tok.offset,
            found: tok.text.clone(),
            expected: "at most three macro fields (//chain/resi/name)".to_string(),
        });
    }

    let field_error = |field: &str, expected: &str| ParseError::Syntax {
        position: tok.offset,
        found: field.to_string(),
        expected: expected.to_string(),
    };
    let mut parts: Vec<ExprRef> = Vec::new();

    for (slot, field) in fields.iter().enumerate() {
        if field.is_empty() {
            continue;
        }
        let items: Vec<&str> = field.split('+').collect();
        if items.iter().any(|item| item.is_empty()) {
            return Err(field_error(field.as_str(), "macro field value"));
        }

        let expr = match slot {
            0 | 2 => {
                let kind = if slot == 0 {
                    PredicateKind::Chain
                } else {
                    PredicateKind::Name
                };
                or_chain(items, |item| {
                    Expr::leaf(kind, ValueSpec::Pattern(Pattern::new(*item)))
                        .map_err(|e| semantic(tok, e))
                })?
            }
            _ => or_chain(items, |item| {
                let spec = parse_resi_item(item)
                    .ok_or_else(|| field_error(*item, "residue number or range"))?;
                Expr::leaf(PredicateKind::Resi, ValueSpec::Numeric(spec))
                    .map_err(|e| semantic(tok, e))
            })?,
        };
        parts.push(expr);
    }

    let mut iter = parts.into_iter();
    let Some(first) = iter.next() else {
        return Ok(Expr::all());
    };
    Ok(iter.fold(first, Expr::and))
}

/// Parse a residue number (`12`, `-3`) or inclusive range (`10-20`, `-5--2`)
fn parse_resi_item(item: &str) -> Option<NumericSpec> {
    if let Ok(n) = item.parse::<i32>() {
        return Some(NumericSpec::Compare(CompareOp::Eq, f64::from(n)));
    }
    // Skip a leading sign when looking for the separating dash
    let split = item
        .char_indices()
        .skip(1)
        .find(|&(_, c)| c == '-')
        .map(|(i, _)| i)?;
    let lo = item[..split].parse::<i32>().ok()?;
    let hi = item[split + 1..].parse::<i32>().ok()?;
    Some(NumericSpec::Range(f64::from(lo), f64::from(hi)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn parse(input: &str) -> ExprRef {
        parse_selection(input).unwrap()
    }

    fn name(value: &str) -> ExprRef {
        Expr::text(PredicateKind::Name, value).unwrap()
    }

    fn chain(value: &str) -> ExprRef {
        Expr::text(PredicateKind::Chain, value).unwrap()
    }

    fn class(kind: PredicateKind) -> ExprRef {
        Expr::class(kind).unwrap()
    }

    fn resi(n: f64) -> ExprRef {
        Expr::leaf(
            PredicateKind::Resi,
            ValueSpec::Numeric(NumericSpec::Compare(CompareOp::Eq, n)),
        )
        .unwrap()
    }

    #[test]
    fn test_parse_constants() {
        assert_eq!(*parse(""), Expr::True);
        assert_eq!(*parse("   "), Expr::True);
        assert_eq!(*parse("all"), Expr::True);
        assert_eq!(*parse("none"), Expr::False);
        assert_eq!(*parse("(ALL)"), Expr::True);
    }

    #[test]
    fn test_parse_name() {
        assert_eq!(parse("name CA"), name("CA"));
        assert_eq!(parse("n. C*"), name("C*"));
        assert_eq!(parse("name \"C A\""), name("C A"));
    }

    #[test]
    fn test_parse_keyword_text_as_value() {
        assert_eq!(parse("chain H"), chain("H"));
        assert_eq!(parse("name b"), name("b"));
    }

    #[test]
    fn test_parse_multi_value() {
        let expected = Expr::or(Expr::or(name("CA"), name("CB")), name("N"));
        assert_eq!(parse("name CA+CB+N"), expected);
        assert_eq!(parse("name CA or name CB or name N"), expected);
    }

    #[test]
    fn test_parse_numeric() {
        assert_eq!(
            parse("index < 5"),
            Expr::leaf(
                PredicateKind::Index,
                ValueSpec::Numeric(NumericSpec::Compare(CompareOp::Lt, 5.0))
            )
            .unwrap()
        );
        assert_eq!(
            parse("resi 10-20"),
            Expr::leaf(
                PredicateKind::Resi,
                ValueSpec::Numeric(NumericSpec::Range(10.0, 20.0))
            )
            .unwrap()
        );
        assert_eq!(parse("resi 1+3"), Expr::or(resi(1.0), resi(3.0)));
        assert!(parse_selection("b > 20.5").is_ok());
    }

    #[test]
    fn test_parse_and_or_precedence() {
        // a or b and c  =>  a or (b and c)
        assert_eq!(
            parse("protein or water and ligand"),
            Expr::or(
                class(PredicateKind::Protein),
                Expr::and(class(PredicateKind::Water), class(PredicateKind::Ligand))
            )
        );
    }

    #[test]
    fn test_parse_or_xor_left_associative() {
        assert_eq!(
            parse("protein or water xor ligand"),
            Expr::xor(
                Expr::or(class(PredicateKind::Protein), class(PredicateKind::Water)),
                class(PredicateKind::Ligand)
            )
        );
        assert_eq!(
            parse("protein ^ water | ligand"),
            Expr::or(
                Expr::xor(class(PredicateKind::Protein), class(PredicateKind::Water)),
                class(PredicateKind::Ligand)
            )
        );
    }

    #[test]
    fn test_parse_not() {
        assert_eq!(
            parse("not protein and water"),
            Expr::and(
                Expr::not(class(PredicateKind::Protein)),
                class(PredicateKind::Water)
            )
        );
        assert_eq!(
            parse("!!water"),
            Expr::not(Expr::not(class(PredicateKind::Water)))
        );
    }

    #[test]
    fn test_parse_around_binds_tighter_than_not() {
        assert_eq!(
            parse("not name CA around 5"),
            Expr::not(Expr::around(name("CA"), 5.0).unwrap())
        );
    }

    #[test]
    fn test_parse_prefix_distance_form() {
        assert_eq!(parse("around 5 name CA"), parse("name CA around 5"));
        assert_eq!(parse("xaround 5 name CA"), parse("name CA around 5"));
        assert_eq!(
            parse("ligand expand 3.5"),
            Expr::expand(class(PredicateKind::Ligand), 3.5).unwrap()
        );
    }

    #[test]
    fn test_parse_byres() {
        assert_eq!(
            parse("byres name CA around 5"),
            Expr::around(Expr::by_res(name("CA")), 5.0).unwrap()
        );
        assert_eq!(
            parse("byres (name CA around 5)"),
            Expr::by_res(Expr::around(name("CA"), 5.0).unwrap())
        );
        assert_eq!(
            parse("bychain byres ligand"),
            Expr::by_chain(Expr::by_res(class(PredicateKind::Ligand)))
        );
    }

    #[test]
    fn test_parse_macro() {
        assert_eq!(parse("//A//"), chain("A"));
        assert_eq!(parse("//A"), chain("A"));
        assert_eq!(parse("//A/1/"), Expr::and(chain("A"), resi(1.0)));
        assert_eq!(
            parse("//A/1/CA+CB"),
            Expr::and(
                Expr::and(chain("A"), resi(1.0)),
                Expr::or(name("CA"), name("CB"))
            )
        );
        assert_eq!(parse("////CA"), name("CA"));
        assert_eq!(*parse("//"), Expr::True);
        assert_eq!(
            parse("//B/10-12/"),
            Expr::and(
                chain("B"),
                Expr::leaf(
                    PredicateKind::Resi,
                    ValueSpec::Numeric(NumericSpec::Range(10.0, 12.0))
                )
                .unwrap()
            )
        );
    }

    #[test]
    fn test_parse_macro_errors() {
        assert!(matches!(
            parse_selection("//A/x/CA"),
            Err(ParseError::Syntax { .. })
        ));
        assert!(matches!(
            parse_selection("//A/1/CA/extra"),
            Err(ParseError::Syntax { position: 0, .. })
        ));
        assert_eq!(
            parse_selection("//A/20-10/").unwrap_err().kind(),
            ErrorKind::Semantic
        );
    }

    #[test]
    fn test_parse_residue() {
        let expected = Expr::leaf(
            PredicateKind::Residue,
            ValueSpec::Residue("ALA:12: :A".parse().unwrap()),
        )
        .unwrap();
        assert_eq!(parse("residue \"ALA:12: :A\""), expected);
        assert!(matches!(
            parse_selection("residue \"ALA:12\""),
            Err(ParseError::Semantic { position: 8, .. })
        ));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse_selection("invalid_keyword xyz"),
            Err(ParseError::UnknownKeyword {
                position: 0,
                word: "invalid_keyword".to_string()
            })
        );
        assert_eq!(
            parse_selection("(name CA"),
            Err(ParseError::UnbalancedParen { position: 0 })
        );
        assert_eq!(
            parse_selection("name CA)"),
            Err(ParseError::UnbalancedParen { position: 7 })
        );
        assert!(matches!(
            parse_selection("name CA and"),
            Err(ParseError::UnexpectedEof { .. })
        ));
        assert!(matches!(
            parse_selection("and name CA"),
            Err(ParseError::Syntax { position: 0, .. })
        ));
        assert!(matches!(
            parse_selection("name CA CB"),
            Err(ParseError::Syntax { position: 8, .. })
        ));
        assert!(matches!(
            parse_selection("name"),
            Err(ParseError::UnexpectedEof { .. })
        ));
        assert!(matches!(
            parse_selection("resi abc"),
            Err(ParseError::Syntax { position: 5, .. })
        ));
        assert!(matches!(
            parse_selection("name CA around"),
            Err(ParseError::UnexpectedEof { .. })
        ));
        assert!(matches!(
            parse_selection("()"),
            Err(ParseError::Syntax { position: 1, .. })
        ));
    }

    #[test]
    fn test_parse_semantic_errors() {
        let err = parse_selection("name CA around 0").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Semantic);
        assert_eq!(err.position(), Some(15));

        let err = parse_selection("ligand beyond -2").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Semantic);

        let err = parse_selection("resi 20-10").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Semantic);
        assert_eq!(err.position(), Some(5));
    }

    #[test]
    fn test_parse_resi_item() {
        assert_eq!(
            parse_resi_item("12"),
            Some(NumericSpec::Compare(CompareOp::Eq, 12.0))
        );
        assert_eq!(
            parse_resi_item("-5--2"),
            Some(NumericSpec::Range(-5.0, -2.0))
        );
        assert_eq!(parse_resi_item("12A"), None);
        assert_eq!(parse_resi_item("-"), None);
    }
}
