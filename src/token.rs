//! The slim token inventory.
//!
//! `PATTERNS` drives the scanner generator; its order defines the pattern
//! index of every token and therefore which pattern wins an ambiguous
//! match. Keywords sit above the identifier pattern for exactly that
//! reason. `TokenKind` mirrors the table one-to-one.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    KeywordProperty,
    KeywordShared,
    KeywordFeature,
    KeywordShader,
    KeywordReturn,
    OpAssign,
    OpOr,
    OpAnd,
    OpEq,
    OpNeq,
    OpGt,
    OpLt,
    OpGe,
    OpLe,
    OpAdd,
    OpSub,
    OpMul,
    OpDiv,
    OpMod,
    OpBang,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    OpenBrace,
    CloseBrace,
    Dot,
    Comma,
    Semicolon,
    ShaderKind,
    DataType,
    BoolLiteral,
    NumericLiteral,
    StringLiteral,
    Identifier,
    TagIdentifier,
}

const ALL: [TokenKind; 36] = [
    TokenKind::KeywordProperty,
    TokenKind::KeywordShared,
    TokenKind::KeywordFeature,
    TokenKind::KeywordShader,
    TokenKind::KeywordReturn,
    TokenKind::OpAssign,
    TokenKind::OpOr,
    TokenKind::OpAnd,
    TokenKind::OpEq,
    TokenKind::OpNeq,
    TokenKind::OpGt,
    TokenKind::OpLt,
    TokenKind::OpGe,
    TokenKind::OpLe,
    TokenKind::OpAdd,
    TokenKind::OpSub,
    TokenKind::OpMul,
    TokenKind::OpDiv,
    TokenKind::OpMod,
    TokenKind::OpBang,
    TokenKind::OpenParen,
    TokenKind::CloseParen,
    TokenKind::OpenBracket,
    TokenKind::CloseBracket,
    TokenKind::OpenBrace,
    TokenKind::CloseBrace,
    TokenKind::Dot,
    TokenKind::Comma,
    TokenKind::Semicolon,
    TokenKind::ShaderKind,
    TokenKind::DataType,
    TokenKind::BoolLiteral,
    TokenKind::NumericLiteral,
    TokenKind::StringLiteral,
    TokenKind::Identifier,
    TokenKind::TagIdentifier,
];

/// Lexer configuration for the slim language, in pattern-index order.
pub const PATTERNS: [&str; 36] = [
    "property",
    "shared",
    "feature",
    "shader",
    "return",
    "=",
    "\\|\\|",
    "&&",
    "==",
    "!=",
    ">",
    "<",
    ">=",
    "<=",
    "\\+",
    "-",
    "\\*",
    "/",
    "%",
    "!",
    "\\(",
    "\\)",
    "\\[",
    "\\]",
    "{",
    "}",
    "\\.",
    ",",
    ";",
    "(vertex|fragment)",
    "(bool|int|uint|float|bvec2|bvec3|bvec4|ivec2|ivec3|ivec4|uvec2|uvec3|uvec4|vec2|vec3|vec4|mat2|mat3|mat4|sampler2D)",
    "(true|false)",
    "[0-9]+(\\.[0-9]+)?",
    "\".*\"",
    "[a-zA-Z_][a-zA-Z0-9_]*",
    "#[a-z_]+",
];

impl TokenKind {
    /// The kind at a pattern index. Indices come from the DFA, which only
    /// knows indices into `PATTERNS`; anything out of range is a bug.
    pub fn from_index(i: usize) -> TokenKind {
        ALL[i]
    }

    pub fn index(self) -> usize {
        ALL.iter()
            .position(|&k| k == self)
            .expect("every kind appears in the table")
    }
}
