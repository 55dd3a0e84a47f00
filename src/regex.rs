//! Parser for the regular-expression dialect used by the scanner generator.
//!
//! Supported syntax: literals, `.` wildcard, `[..]` character classes with
//! ranges, grouping, union `|`, and the `?`/`*`/`+` quantifiers. Escapes
//! cover the metacharacters plus `\n`.

use crate::error::RegexError;
use crate::utf8::{self, Glyph};

const NEWLINE: Glyph = 0xA;

/// A parsed pattern. Trees are immutable once built; the NFA builder walks
/// them read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Literal(Glyph),
    Wildcard,
    /// Closed code-point range. `lo > hi` is accepted here and matches
    /// nothing once the alphabet is built.
    Range(Glyph, Glyph),
    Concat(Box<Node>, Box<Node>),
    Union(Box<Node>, Box<Node>),
    Maybe(Box<Node>),
    ZeroPlus(Box<Node>),
    OnePlus(Box<Node>),
}

impl Node {
    pub fn concat(left: Node, right: Node) -> Node {
        Node::Concat(Box::new(left), Box::new(right))
    }

    pub fn union(left: Node, right: Node) -> Node {
        Node::Union(Box::new(left), Box::new(right))
    }
}

/// Decodes the pattern glyph by glyph, tracking how many glyphs have been
/// consumed so errors can point at a position.
struct TokenStream<'a> {
    decoder: utf8::Decoder<std::iter::Copied<std::slice::Iter<'a, u8>>>,
    curr: Option<Glyph>,
    consumed: usize,
}

impl<'a> TokenStream<'a> {
    fn new(pattern: &'a str) -> Self {
        TokenStream {
            decoder: utf8::decode_str(pattern),
            curr: None,
            consumed: 0,
        }
    }

    fn current(&self) -> Option<Glyph> {
        self.curr
    }

    fn advance(&mut self) -> Result<bool, RegexError> {
        match self.decoder.next() {
            Some(g) => {
                self.curr = Some(g);
                self.consumed += 1;
                Ok(true)
            }
            None => {
                if self.decoder.err().is_some() {
                    return Err(self.error("invalid UTF-8 in pattern"));
                }
                self.curr = None;
                Ok(false)
            }
        }
    }

    fn error(&self, message: &str) -> RegexError {
        RegexError {
            position: self.consumed,
            message: message.to_string(),
        }
    }
}

/// Parse a pattern string into a regex tree.
pub fn parse(pattern: &str) -> Result<Node, RegexError> {
    let mut tokens = TokenStream::new(pattern);
    if !tokens.advance()? {
        return Err(tokens.error("empty pattern"));
    }

    let tree = r_union(&mut tokens)?;
    if tokens.current().is_some() {
        // A closing metacharacter with no matching opener ends up here.
        return Err(tokens.error("unexpected character"));
    }

    Ok(tree)
}

/// One or more concatenations separated by pipes. A single concatenation is
/// treated as a union set with one element and adds no node.
fn r_union(tokens: &mut TokenStream) -> Result<Node, RegexError> {
    let mut tree = r_concat(tokens)?;

    while tokens.current() == Some(Glyph::from(b'|')) {
        if !tokens.advance()? {
            return Err(tokens.error("unexpected end of input, malformed union"));
        }
        tree = Node::union(tree, r_concat(tokens)?);
    }

    Ok(tree)
}

/// Concatenation has no metacharacter; consecutive quantified atoms fold
/// into left-leaning concat nodes. A concatenation ends at the end of the
/// pattern, a union, or the end of a group.
fn r_concat(tokens: &mut TokenStream) -> Result<Node, RegexError> {
    let mut tree = r_quant(tokens)?;

    loop {
        match tokens.current() {
            None => break,
            Some(g) if g == Glyph::from(b'|') || g == Glyph::from(b')') => break,
            Some(_) => tree = Node::concat(tree, r_quant(tokens)?),
        }
    }

    Ok(tree)
}

/// An atom with an optional quantifier.
fn r_quant(tokens: &mut TokenStream) -> Result<Node, RegexError> {
    let tree = r_atom(tokens)?;

    let quantified = match tokens.current() {
        Some(g) if g == Glyph::from(b'?') => Node::Maybe(Box::new(tree)),
        Some(g) if g == Glyph::from(b'*') => Node::ZeroPlus(Box::new(tree)),
        Some(g) if g == Glyph::from(b'+') => Node::OnePlus(Box::new(tree)),
        _ => return Ok(tree),
    };

    tokens.advance()?;
    Ok(quantified)
}

/// Any singular expression that can be quantified: a literal, class,
/// wildcard, or group.
fn r_atom(tokens: &mut TokenStream) -> Result<Node, RegexError> {
    match tokens.current() {
        Some(g) if g == Glyph::from(b'(') => r_group(tokens),
        Some(g) if g == Glyph::from(b'[') => r_class(tokens),
        Some(g) if g == Glyph::from(b'.') => {
            tokens.advance()?;
            Ok(Node::Wildcard)
        }
        _ => r_lit(tokens),
    }
}

/// A parenthesized group. Shapes the tree through composition but adds no
/// node of its own.
fn r_group(tokens: &mut TokenStream) -> Result<Node, RegexError> {
    debug_assert_eq!(tokens.current(), Some(Glyph::from(b'(')));

    if !tokens.advance()? {
        return Err(tokens.error("unexpected end of input, unclosed group"));
    }

    let tree = r_union(tokens)?;

    if tokens.current() != Some(Glyph::from(b')')) {
        return Err(tokens.error("unclosed group"));
    }

    tokens.advance()?;
    Ok(tree)
}

/// A character class: a union of literals and ranges between brackets.
fn r_class(tokens: &mut TokenStream) -> Result<Node, RegexError> {
    debug_assert_eq!(tokens.current(), Some(Glyph::from(b'[')));

    if !tokens.advance()? {
        return Err(tokens.error("unclosed character class"));
    }

    let mut tree = r_range(tokens)?;

    loop {
        match tokens.current() {
            Some(g) if g == Glyph::from(b']') => break,
            Some(_) => tree = Node::union(tree, r_range(tokens)?),
            None => return Err(tokens.error("unclosed character class")),
        }
    }

    tokens.advance()?;
    Ok(tree)
}

/// A class member: a single literal or a `lo-hi` range. Range order is not
/// validated; a reversed range matches nothing.
fn r_range(tokens: &mut TokenStream) -> Result<Node, RegexError> {
    let lo = r_class_lit(tokens)?;

    if tokens.current() == Some(Glyph::from(b'-')) {
        if !tokens.advance()? {
            return Err(tokens.error("unterminated character range"));
        }
        let hi = r_class_lit(tokens)?;
        return Ok(Node::Range(lo, hi));
    }

    Ok(Node::Literal(lo))
}

/// A literal inside a character class, where the escape set differs from
/// literals outside of classes.
fn r_class_lit(tokens: &mut TokenStream) -> Result<Glyph, RegexError> {
    let glyph = match tokens.current() {
        None => return Err(tokens.error("unclosed character class")),
        Some(g) if g == Glyph::from(b'[') || g == Glyph::from(b']') || g == Glyph::from(b'-') => {
            return Err(tokens.error("illegal character"));
        }
        Some(g) if g == Glyph::from(b'\\') => {
            if !tokens.advance()? {
                return Err(tokens.error("unterminated escape sequence"));
            }
            match tokens.current() {
                Some(e)
                    if e == Glyph::from(b'\\')
                        || e == Glyph::from(b'[')
                        || e == Glyph::from(b']')
                        || e == Glyph::from(b'-') =>
                {
                    e
                }
                Some(e) if e == Glyph::from(b'n') => NEWLINE,
                _ => return Err(tokens.error("invalid escape sequence")),
            }
        }
        Some(g) => g,
    };

    tokens.advance()?;
    Ok(glyph)
}

/// A possibly escaped literal outside of a character class.
fn r_lit(tokens: &mut TokenStream) -> Result<Node, RegexError> {
    let glyph = match tokens.current() {
        None => return Err(tokens.error("expected literal")),
        Some(g)
            if g == Glyph::from(b'?')
                || g == Glyph::from(b'*')
                || g == Glyph::from(b'+')
                || g == Glyph::from(b'|')
                || g == Glyph::from(b')')
                || g == Glyph::from(b']') =>
        {
            return Err(tokens.error("illegal character"));
        }
        Some(g) if g == Glyph::from(b'\\') => {
            if !tokens.advance()? {
                return Err(tokens.error("unterminated escape sequence"));
            }
            match tokens.current() {
                Some(e)
                    if e == Glyph::from(b'\\')
                        || e == Glyph::from(b'?')
                        || e == Glyph::from(b'*')
                        || e == Glyph::from(b'+')
                        || e == Glyph::from(b'|')
                        || e == Glyph::from(b'(')
                        || e == Glyph::from(b')')
                        || e == Glyph::from(b'[')
                        || e == Glyph::from(b']')
                        || e == Glyph::from(b'.') =>
                {
                    e
                }
                Some(e) if e == Glyph::from(b'n') => NEWLINE,
                _ => return Err(tokens.error("invalid escape sequence")),
            }
        }
        Some(g) => g,
    };

    tokens.advance()?;
    Ok(Node::Literal(glyph))
}
