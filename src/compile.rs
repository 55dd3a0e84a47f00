//! End-to-end pipeline entry points.
//!
//! Source bytes → tokens → AST → typecheck, wired the same way a host
//! embedding the front-end would do it. The returned [`Compilation`] keeps
//! the interner, registry, and annotated symbol table alive for a
//! downstream code generator.

use crate::ast::{Ordinals, Program};
use crate::error::CompileError;
use crate::intern::Interner;
use crate::lexer::{Lexer, Token};
use crate::parser::Parser;
use crate::symtab::SymbolTable;
use crate::typecheck;
use crate::types::{self, TypeRegistry};

/// A fully checked program together with everything resolved about it.
#[derive(Debug)]
pub struct Compilation {
    pub program: Program,
    pub interner: Interner,
    pub types: TypeRegistry,
    pub symbols: SymbolTable,
}

/// Lex an entire source with the slim pattern table.
pub fn tokenize(source: &[u8]) -> Result<Vec<Token>, CompileError> {
    let mut lexer = Lexer::slim(source.iter().copied());
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next()? {
        tokens.push(token);
    }
    Ok(tokens)
}

/// Lex and parse a source, stopping before the typecheck.
pub fn parse_source(source: &[u8]) -> Result<(Program, Interner), CompileError> {
    let mut interner = Interner::new();
    let mut ordinals = Ordinals::new();

    let lexer = Lexer::slim(source.iter().copied());
    let mut parser = Parser::new(lexer, &mut interner, &mut ordinals)?;
    let program = parser.parse_program()?;

    Ok((program, interner))
}

/// Run the whole front-end over a source.
pub fn check_source(source: &[u8]) -> Result<Compilation, CompileError> {
    let mut interner = Interner::new();
    let mut ordinals = Ordinals::new();

    let types = TypeRegistry::new();
    let mut symbols = SymbolTable::new();
    types::install_builtins(&types, &mut symbols, &mut interner, &mut ordinals);

    let lexer = Lexer::slim(source.iter().copied());
    let mut parser = Parser::new(lexer, &mut interner, &mut ordinals)?;
    let program = parser.parse_program()?;

    typecheck::check_program(&program, &mut symbols, &types, &interner)?;

    Ok(Compilation {
        program,
        interner,
        types,
        symbols,
    })
}
