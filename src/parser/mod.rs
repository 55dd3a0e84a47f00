//! Recursive-descent parser for slim programs.
//!
//! The parser pulls tokens one at a time from any [`TokenSource`] and
//! builds the owned AST, assigning ordinals as it goes. Top-level items and
//! statements live here; the expression grammar is in [`expr`] behind the
//! [`ExprParsing`] trait.
//!
//! `require` is not a reserved word: it lexes as an identifier and is
//! recognized by spelling where a block may begin.

mod expr;

#[cfg(test)]
mod tests;

pub use expr::ExprParsing;

use crate::ast::{
    DeclStat, Expr, ExprStat, FeatureBlock, Item, Ordinals, Program, PropertyDecl, RequireBlock,
    ReturnStat, ShaderBlock, ShaderKind, SharedDecl, Stmt, StringLit, Tag,
};
use crate::error::{ParseError, ParseErrorKind};
use crate::intern::{Interner, Symbol};
use crate::lexer::{Token, TokenSource};
use crate::token::TokenKind;

pub(crate) type ParseResult<T> = Result<T, ParseError>;

pub struct Parser<'i, 'o, S: TokenSource> {
    pub(super) tokens: S,
    pub(super) current: Option<Token>,
    pub(super) interner: &'i mut Interner,
    pub(super) ordinals: &'o mut Ordinals,
}

impl<'i, 'o, S: TokenSource> Parser<'i, 'o, S> {
    pub fn new(
        tokens: S,
        interner: &'i mut Interner,
        ordinals: &'o mut Ordinals,
    ) -> ParseResult<Self> {
        let mut parser = Parser {
            tokens,
            current: None,
            interner,
            ordinals,
        };
        parser.bump()?;
        Ok(parser)
    }

    /// Consume and return the current token, pulling the next one in.
    pub(super) fn bump(&mut self) -> ParseResult<Option<Token>> {
        let next = self.tokens.next_token().map_err(|err| ParseError {
            kind: ParseErrorKind::Lex(err),
            token: None,
        })?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    pub(super) fn at(&self, kind: TokenKind) -> bool {
        self.current.as_ref().is_some_and(|t| t.kind == kind)
    }

    /// Consume the current token if it has the given kind.
    pub(super) fn eat(&mut self, kind: TokenKind) -> ParseResult<Option<Token>> {
        if self.at(kind) {
            return self.bump();
        }
        Ok(None)
    }

    pub(super) fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        match self.eat(kind)? {
            Some(token) => Ok(token),
            None => Err(self.error(ParseErrorKind::UnexpectedToken { expected: kind })),
        }
    }

    pub(super) fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError {
            kind,
            token: self.current.clone(),
        }
    }

    pub(super) fn intern_text(&mut self, token: &Token) -> Symbol {
        self.interner.intern(&token.text())
    }

    /// Whether the current token is the contextual `require` keyword.
    fn at_require(&self) -> bool {
        self.at(TokenKind::Identifier)
            && self.current.as_ref().is_some_and(|t| t.text() == "require")
    }

    /// Parse a whole source file.
    pub fn parse_program(&mut self) -> ParseResult<Program> {
        let first = self.current.clone();
        let mut items = Vec::new();

        while self.current.is_some() {
            items.push(self.parse_item()?);
        }

        Ok(Program {
            ordinal: self.ordinals.next(),
            token: first,
            items,
        })
    }

    fn parse_item(&mut self) -> ParseResult<Item> {
        match self.current.as_ref().map(|t| t.kind) {
            Some(TokenKind::TagIdentifier) | Some(TokenKind::KeywordProperty) => {
                Ok(Item::Property(self.parse_property_decl()?))
            }
            Some(TokenKind::KeywordShared) => Ok(Item::Shared(self.parse_shared_decl()?)),
            Some(TokenKind::KeywordFeature) => Ok(Item::Feature(self.parse_feature_block()?)),
            Some(TokenKind::KeywordShader) => Ok(Item::Shader(self.parse_shader_block()?)),
            Some(TokenKind::Identifier) if self.at_require() => {
                Ok(Item::Require(self.parse_require_block()?))
            }
            _ => Err(self.error(ParseErrorKind::ExpectedItem)),
        }
    }

    /// `#tag` or `#tag "meta"`, any number of times. Metadata is a bare
    /// string literal: the greedy string pattern eats through any glyph
    /// that follows a closing quote, so a delimiter after the string could
    /// never lex.
    fn parse_tags(&mut self) -> ParseResult<Vec<Tag>> {
        let mut tags = Vec::new();

        while let Some(token) = self.eat(TokenKind::TagIdentifier)? {
            // Strip the leading '#'.
            let name = self.interner.intern(&token.text()[1..]);

            let meta = match self.eat(TokenKind::StringLiteral)? {
                Some(lit) => Some(self.string_lit(lit)),
                None => None,
            };

            tags.push(Tag {
                ordinal: self.ordinals.next(),
                token,
                name,
                meta,
            });
        }

        Ok(tags)
    }

    fn string_lit(&mut self, token: Token) -> StringLit {
        // Drop the surrounding quotes; the pattern guarantees them.
        let text = token.text();
        let value = self.interner.intern(&text[1..text.len() - 1]);
        StringLit {
            ordinal: self.ordinals.next(),
            token,
            value,
        }
    }

    /// `DataType Identifier ('=' expr)? ';'` after any introducing keyword.
    fn parse_decl_tail(&mut self) -> ParseResult<(Symbol, Symbol, Option<Expr>)> {
        let ty_token = self.expect(TokenKind::DataType)?;
        let ty = self.intern_text(&ty_token);

        let name_token = self.expect(TokenKind::Identifier)?;
        let name = self.intern_text(&name_token);

        let init = if self.eat(TokenKind::OpAssign)?.is_some() {
            Some(self.parse_expression()?)
        } else {
            None
        };

        self.expect(TokenKind::Semicolon)?;
        Ok((ty, name, init))
    }

    fn parse_property_decl(&mut self) -> ParseResult<PropertyDecl> {
        let tags = self.parse_tags()?;
        let token = self.expect(TokenKind::KeywordProperty)?;
        let (ty, name, init) = self.parse_decl_tail()?;

        Ok(PropertyDecl {
            ordinal: self.ordinals.next(),
            token,
            tags,
            ty,
            name,
            init,
        })
    }

    fn parse_shared_decl(&mut self) -> ParseResult<SharedDecl> {
        let token = self.expect(TokenKind::KeywordShared)?;
        let (ty, name, init) = self.parse_decl_tail()?;

        Ok(SharedDecl {
            ordinal: self.ordinals.next(),
            token,
            ty,
            name,
            init,
        })
    }

    fn parse_feature_block(&mut self) -> ParseResult<FeatureBlock> {
        let token = self.expect(TokenKind::KeywordFeature)?;
        let name_token = self.expect(TokenKind::Identifier)?;
        let name = self.intern_text(&name_token);

        self.expect(TokenKind::OpenBrace)?;
        let mut decls = Vec::new();
        while !self.at(TokenKind::CloseBrace) {
            decls.push(self.parse_property_decl()?);
        }
        self.expect(TokenKind::CloseBrace)?;

        Ok(FeatureBlock {
            ordinal: self.ordinals.next(),
            token,
            name,
            decls,
        })
    }

    fn parse_shader_block(&mut self) -> ParseResult<ShaderBlock> {
        let token = self.expect(TokenKind::KeywordShader)?;
        let kind_token = self.expect(TokenKind::ShaderKind)?;
        let kind = if kind_token.text() == "vertex" {
            ShaderKind::Vertex
        } else {
            ShaderKind::Fragment
        };

        let stats = self.parse_block_stats()?;

        Ok(ShaderBlock {
            ordinal: self.ordinals.next(),
            token,
            kind,
            stats,
        })
    }

    fn parse_require_block(&mut self) -> ParseResult<RequireBlock> {
        let token = self.bump()?.expect("caller checked for 'require'");
        let feature_token = self.expect(TokenKind::Identifier)?;
        let feature = self.intern_text(&feature_token);

        let stats = self.parse_block_stats()?;

        Ok(RequireBlock {
            ordinal: self.ordinals.next(),
            token,
            feature,
            stats,
        })
    }

    fn parse_block_stats(&mut self) -> ParseResult<Vec<Stmt>> {
        self.expect(TokenKind::OpenBrace)?;
        let mut stats = Vec::new();
        while !self.at(TokenKind::CloseBrace) {
            if self.current.is_none() {
                return Err(self.error(ParseErrorKind::UnexpectedEndOfInput));
            }
            stats.push(self.parse_stmt()?);
        }
        self.expect(TokenKind::CloseBrace)?;
        Ok(stats)
    }

    fn parse_stmt(&mut self) -> ParseResult<Stmt> {
        match self.current.as_ref().map(|t| t.kind) {
            Some(TokenKind::DataType) => {
                let token = self.current.clone().expect("checked above");
                let (ty, name, init) = self.parse_decl_tail()?;
                Ok(Stmt::Decl(DeclStat {
                    ordinal: self.ordinals.next(),
                    token,
                    ty,
                    name,
                    init,
                }))
            }
            Some(TokenKind::KeywordReturn) => {
                let token = self.bump()?.expect("checked above");
                let expr = self.parse_expression()?;
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::Return(ReturnStat {
                    ordinal: self.ordinals.next(),
                    token,
                    expr,
                }))
            }
            Some(TokenKind::Identifier) if self.at_require() => {
                Ok(Stmt::Require(self.parse_require_block()?))
            }
            Some(_) => {
                let expr = self.parse_expression()?;
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::Expr(ExprStat {
                    ordinal: self.ordinals.next(),
                    token: expr.token.clone(),
                    expr,
                }))
            }
            None => Err(self.error(ParseErrorKind::ExpectedStatement)),
        }
    }
}
