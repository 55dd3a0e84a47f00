//! Front-end for the slim shading language.
//!
//! The pipeline is a straight line: a UTF-8 [`utf8::Decoder`] feeds a
//! scanner generated from the [`token::PATTERNS`] regular expressions
//! (regex → [`alphabet`] → [`nfa`] → [`dfa`]), the [`lexer`] drives that
//! machine in longest-match mode, the [`parser`] builds the [`ast`], and
//! [`typecheck`] resolves every expression against the interned
//! [`types::TypeRegistry`] through a scoped [`symtab::SymbolTable`].
//! [`compile`] wires the stages together for hosts.

pub mod alphabet;
pub mod ast;
#[cfg(feature = "cli")]
pub mod cli;
pub mod compile;
pub mod dfa;
pub mod error;
pub mod intern;
pub mod lexer;
pub mod nfa;
pub mod operators;
pub mod parser;
pub mod regex;
pub mod style;
pub mod symtab;
pub mod token;
pub mod typecheck;
pub mod types;
pub mod utf8;
pub mod visitor;

pub use compile::{check_source, parse_source, tokenize, Compilation};
pub use error::{CompileError, Diagnostic};
pub use intern::{Interner, Symbol};
pub use lexer::{Lexer, Token, TokenSource};
pub use parser::{ExprParsing, Parser};
pub use token::{TokenKind, PATTERNS};
pub use types::{TypeRef, TypeRegistry};
