//! The `slimc` command-line checker.

use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use crate::compile;

#[derive(Parser)]
#[command(name = "slimc")]
#[command(about = "Check slim shader sources", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Source file to check
    pub file: PathBuf,

    /// What to print on success
    #[arg(long, value_enum, default_value_t = Emit::Check)]
    pub emit: Emit,

    /// Print diagnostics as JSON instead of rendered source context
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Emit {
    /// Report success or the first diagnostic
    Check,
    /// Dump the token stream
    Tokens,
    /// Dump the parsed items
    Ast,
}

#[derive(Serialize)]
struct TokenDump {
    kind: crate::token::TokenKind,
    text: String,
    line: u32,
    column: u32,
}

pub fn run(cli: &Cli) -> i32 {
    let source = match fs::read(&cli.file) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("error: cannot read {}: {}", cli.file.display(), err);
            return 2;
        }
    };

    match cli.emit {
        Emit::Tokens => emit_tokens(cli, &source),
        Emit::Ast => emit_ast(cli, &source),
        Emit::Check => emit_check(cli, &source),
    }
}

fn report(cli: &Cli, source: &[u8], err: &crate::CompileError) -> i32 {
    if cli.json {
        let diag = err.diagnostic();
        println!("{}", serde_json::to_string_pretty(&diag).expect("diagnostics serialize"));
    } else {
        let text = String::from_utf8_lossy(source);
        eprintln!("{}", err.display_with_source(&text));
    }
    1
}

fn emit_tokens(cli: &Cli, source: &[u8]) -> i32 {
    match compile::tokenize(source) {
        Ok(tokens) => {
            let dump: Vec<TokenDump> = tokens
                .iter()
                .map(|t| TokenDump {
                    kind: t.kind,
                    text: t.text(),
                    line: t.line,
                    column: t.column,
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&dump).expect("tokens serialize"));
            0
        }
        Err(err) => report(cli, source, &err),
    }
}

fn emit_ast(cli: &Cli, source: &[u8]) -> i32 {
    match compile::parse_source(source) {
        Ok((program, interner)) => {
            use crate::ast::Item;
            for item in &program.items {
                match item {
                    Item::Property(p) => {
                        println!("property {}", interner.resolve(p.name));
                    }
                    Item::Shared(s) => {
                        println!("shared {}", interner.resolve(s.name));
                    }
                    Item::Feature(f) => {
                        println!("feature {} ({} properties)", interner.resolve(f.name), f.decls.len());
                    }
                    Item::Shader(s) => {
                        println!("shader {:?} ({} statements)", s.kind, s.stats.len());
                    }
                    Item::Require(r) => {
                        println!("require {} ({} statements)", interner.resolve(r.feature), r.stats.len());
                    }
                }
            }
            0
        }
        Err(err) => report(cli, source, &err),
    }
}

fn emit_check(cli: &Cli, source: &[u8]) -> i32 {
    match compile::check_source(source) {
        Ok(compilation) => {
            println!("ok: {} item(s)", compilation.program.items.len());
            0
        }
        Err(err) => report(cli, source, &err),
    }
}
