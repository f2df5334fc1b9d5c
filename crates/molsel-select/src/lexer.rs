//! Lexer/tokenizer for the selection language
//!
//! Converts selection strings into a stream of spanned tokens using nom
//! combinators. Keywords are resolved here; the original text of every
//! token is kept so the parser can reuse a keyword-looking word as a value
//! (`chain H`, `name b`).

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit1, multispace0},
    combinator::{opt, recognize, value},
    error::{Error as NomError, ErrorKind as NomErrorKind},
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

use crate::error::{ParseError, ParseResult};
use crate::keywords::{self, Keyword};
use crate::pattern::CompareOp;

/// Token types for the selection language
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Opening parenthesis
    LParen,
    /// Closing parenthesis
    RParen,
    /// Plus joining multi-value lists
    Plus,
    /// Keyword or logical operator (`&`, `|`, `^` and `!` resolve here too)
    Keyword(Keyword),
    /// Comparison operator
    Compare(CompareOp),
    /// Integer or decimal literal, optionally signed
    Number(f64),
    /// Inclusive numeric range `a-b`
    Range(f64, f64),
    /// Bare value (atom name, glob, chain id)
    Word(String),
    /// Quoted string
    Quoted(String),
    /// Hierarchical macro `//chain/resi/name`, split into raw fields
    Macro(Vec<String>),
    /// End of input
    Eof,
}

impl Token {
    /// Check if this token can stand as a predicate value
    pub fn is_value(&self) -> bool {
        matches!(
            self,
            Token::Word(_) | Token::Quoted(_) | Token::Number(_) | Token::Range(..)
        )
    }
}

/// A token together with its byte offset and source text
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub offset: usize,
    pub text: String,
}

/// Result of lexing
pub type LexResult<'a, T> = IResult<&'a str, T>;

/// Check if a character can be part of a bare word
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '*' | '?' | '\'' | '.' | '-')
}

/// Parse whitespace
fn ws(input: &str) -> LexResult<'_, ()> {
    value((), multispace0)(input)
}

/// Parse parentheses and plus
fn punct(input: &str) -> LexResult<'_, Token> {
    alt((
        value(Token::LParen, char('(')),
        value(Token::RParen, char(')')),
        value(Token::Plus, char('+')),
    ))(input)
}

/// Parse symbolic logical operators
fn symbol_op(input: &str) -> LexResult<'_, Token> {
    alt((
        value(Token::Keyword(Keyword::And), char('&')),
        value(Token::Keyword(Keyword::Or), char('|')),
        value(Token::Keyword(Keyword::Xor), char('^')),
        value(Token::Keyword(Keyword::Not), char('!')),
    ))(input)
}

/// Parse comparison operators
fn comparison(input: &str) -> LexResult<'_, Token> {
    alt((
        value(Token::Compare(CompareOp::Le), tag("<=")),
        value(Token::Compare(CompareOp::Ge), tag(">=")),
        value(Token::Compare(CompareOp::Eq), alt((tag("=="), tag("=")))),
        value(Token::Compare(CompareOp::Lt), char('<')),
        value(Token::Compare(CompareOp::Gt), char('>')),
    ))(input)
}

/// Recognize a signed decimal literal
fn decimal(input: &str) -> LexResult<'_, &str> {
    recognize(tuple((
        opt(char('-')),
        digit1,
        opt(pair(char('.'), digit1)),
    )))(input)
}

fn to_f64<'a>(input: &'a str, text: &str) -> Result<f64, nom::Err<NomError<&'a str>>> {
    text.parse::<f64>()
        .map_err(|_| nom::Err::Error(NomError::new(input, NomErrorKind::Float)))
}

/// Parse a number or an inclusive range; fails if it runs into a word (`1H`)
fn number_or_range(input: &str) -> LexResult<'_, Token> {
    let (rest, lo) = decimal(input)?;
    let (rest, hi) = opt(preceded(char('-'), decimal))(rest)?;

    if rest.starts_with(is_word_char) {
        return Err(nom::Err::Error(NomError::new(input, NomErrorKind::Verify)));
    }

    let lo = to_f64(input, lo)?;
    match hi {
        Some(hi) => Ok((rest, Token::Range(lo, to_f64(input, hi)?))),
        None => Ok((rest, Token::Number(lo))),
    }
}

/// Parse a bare word, resolving keywords
fn word(input: &str) -> LexResult<'_, Token> {
    let (rest, s) = take_while1(is_word_char)(input)?;
    match keywords::lookup(s) {
        Some(kw) => Ok((rest, Token::Keyword(kw))),
        None => Ok((rest, Token::Word(s.to_string()))),
    }
}

/// Parse a quoted string
fn quoted_string(input: &str) -> LexResult<'_, Token> {
    let (input, s) = alt((
        delimited(char('"'), take_while(|c| c != '"'), char('"')),
        delimited(char('\''), take_while(|c| c != '\''), char('\'')),
    ))(input)?;
    Ok((input, Token::Quoted(s.to_string())))
}

/// Parse a `//chain/resi/name` macro into its raw fields
fn macro_expr(input: &str) -> LexResult<'_, Token> {
    let (rest, body) = preceded(
        tag("//"),
        take_while(|c: char| !c.is_whitespace() && c != '(' && c != ')'),
    )(input)?;
    let fields = body.split('/').map(str::to_string).collect();
    Ok((rest, Token::Macro(fields)))
}

/// Parse a single token
fn token(input: &str) -> LexResult<'_, Token> {
    alt((
        macro_expr,
        comparison,
        punct,
        symbol_op,
        quoted_string,
        // Numbers before words so `10-20` is a range but `1H` stays a word
        number_or_range,
        word,
    ))(input)
}

/// Tokenize an entire selection string
///
/// The returned vector always ends with [`Token::Eof`].
pub fn tokenize(input: &str) -> ParseResult<Vec<Spanned>> {
    let mut tokens = Vec::new();
    let mut remaining = input;

    loop {
        let (rest, _) = ws(remaining).map_err(|_| ParseError::Lexical {
            position: input.len() - remaining.len(),
            fragment: remaining.chars().take(10).collect(),
        })?;
        remaining = rest;
        let offset = input.len() - remaining.len();

        if remaining.is_empty() {
            tokens.push(Spanned {
                token: Token::Eof,
                offset,
                text: String::new(),
            });
            break;
        }

        match token(remaining) {
            Ok((rest, tok)) => {
                let text = remaining[..remaining.len() - rest.len()].to_string();
                tokens.push(Spanned {
                    token: tok,
                    offset,
                    text,
                });
                remaining = rest;
            }
            Err(_) => {
                return Err(ParseError::Lexical {
                    position: offset,
                    fragment: remaining
                        .chars()
                        .take_while(|c| !c.is_whitespace())
                        .take(10)
                        .collect(),
                });
            }
        }
    }

    Ok(tokens)
}

/// A token stream for parsing
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<Spanned>,
    pos: usize,
    eof: Spanned,
}

impl TokenStream {
    /// Create a new token stream from a list of tokens
    pub fn new(tokens: Vec<Spanned>) -> Self {
        let end = tokens
            .last()
            .map(|t| t.offset + t.text.len())
            .unwrap_or(0);
        TokenStream {
            tokens,
            pos: 0,
            eof: Spanned {
                token: Token::Eof,
                offset: end,
                text: String::new(),
            },
        }
    }

    /// Create a token stream from a selection string
    pub fn from_str(input: &str) -> ParseResult<Self> {
        Ok(TokenStream::new(tokenize(input)?))
    }

    /// Peek at the current token without consuming it
    pub fn peek(&self) -> &Token {
        &self.peek_spanned().token
    }

    /// Peek at the current token with its span
    pub fn peek_spanned(&self) -> &Spanned {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    /// Peek at the nth token ahead
    pub fn peek_n(&self, n: usize) -> &Token {
        self.tokens
            .get(self.pos + n)
            .map(|t| &t.token)
            .unwrap_or(&self.eof.token)
    }

    /// Consume and return the current token
    pub fn next(&mut self) -> Spanned {
        match self.tokens.get(self.pos) {
            Some(tok) => {
                self.pos += 1;
                tok.clone()
            }
            None => self.eof.clone(),
        }
    }

    /// Byte offset of the current token
    pub fn offset(&self) -> usize {
        self.peek_spanned().offset
    }

    /// Check if we're at the end
    pub fn is_eof(&self) -> bool {
        matches!(self.peek(), Token::Eof)
    }

    /// Get the current position
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Set the position (for backtracking)
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos;
    }
}
