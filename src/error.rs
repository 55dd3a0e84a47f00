//! Stage-stratified diagnostics.
//!
//! Every stage reports failure with its own error type carrying enough
//! position to render a user-facing message: UTF-8 and pattern errors halt
//! their stage, lexer errors abort a single token, parser and typechecker
//! errors are fatal for their pass. Invariant violations (double
//! annotation, popping the root scope) panic instead of returning.

use serde::Serialize;

use crate::lexer::Token;
use crate::style::Style;
use crate::token::TokenKind;
use crate::utf8::Utf8Error;

/// A pattern string failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegexError {
    /// Glyph offset within the pattern.
    pub position: usize,
    pub message: String,
}

impl std::fmt::Display for RegexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pattern error at position {}: {}", self.position, self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    UnexpectedCharacter,
    UnexpectedEndOfInput,
    InvalidUtf8(Utf8Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub line: u32,
    pub column: u32,
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let what = match self.kind {
            LexErrorKind::UnexpectedCharacter => "unexpected character".to_string(),
            LexErrorKind::UnexpectedEndOfInput => "unexpected end of input".to_string(),
            LexErrorKind::InvalidUtf8(err) => err.to_string(),
        };
        write!(f, "error (line {}, col {}): {}", self.line, self.column, what)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    UnexpectedToken { expected: TokenKind },
    ExpectedItem,
    ExpectedStatement,
    ExpectedExpression,
    InvalidNumericLiteral,
    UnexpectedEndOfInput,
    Lex(LexError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// The offending token; `None` when the input ended instead.
    pub token: Option<Token>,
}

impl ParseError {
    pub fn position(&self) -> Option<(u32, u32)> {
        match (&self.kind, &self.token) {
            (ParseErrorKind::Lex(err), _) => Some((err.line, err.column)),
            (_, Some(token)) => Some((token.line, token.column)),
            _ => None,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let got = || -> String {
            match &self.token {
                Some(token) => format!("{:?} '{}'", token.kind, token.text()),
                None => "end of input".to_string(),
            }
        };
        match &self.kind {
            ParseErrorKind::UnexpectedToken { expected } => {
                write!(f, "expected {:?}, got {}", expected, got())
            }
            ParseErrorKind::ExpectedItem => {
                write!(f, "expected a declaration or block, got {}", got())
            }
            ParseErrorKind::ExpectedStatement => {
                write!(f, "expected a statement, got {}", got())
            }
            ParseErrorKind::ExpectedExpression => {
                write!(f, "expected an expression, got {}", got())
            }
            ParseErrorKind::InvalidNumericLiteral => {
                write!(f, "numeric literal out of range: {}", got())
            }
            ParseErrorKind::UnexpectedEndOfInput => write!(f, "unexpected end of input"),
            ParseErrorKind::Lex(err) => write!(f, "{}", err),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeErrorKind {
    UndefinedSymbol { name: String },
    RedeclaredSymbol { name: String },
    OperatorNotSupported { op: &'static str, operand: String },
    IncompatibleTypes { left: String, right: String, op: &'static str },
    NotCallable { name: String },
    WrongArgumentTypes { function: String },
    SwizzleInvalid { field: String, operand: String },
    ReturnOutsideFunction,
    ReturnTypeMismatch { expected: String, got: String },
    UnknownType { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeError {
    pub kind: TypeErrorKind,
    pub token: Token,
}

impl std::fmt::Display for TypeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            TypeErrorKind::UndefinedSymbol { name } => {
                write!(f, "symbol '{}' is not defined", name)
            }
            TypeErrorKind::RedeclaredSymbol { name } => {
                write!(f, "symbol '{}' has already been defined", name)
            }
            TypeErrorKind::OperatorNotSupported { op, operand } => write!(
                f,
                "cannot perform operation '{}' on a value of type '{}'",
                op, operand
            ),
            TypeErrorKind::IncompatibleTypes { left, right, op } => write!(
                f,
                "operands of '{}' have incompatible types '{}' and '{}'",
                op, left, right
            ),
            TypeErrorKind::NotCallable { name } => {
                write!(f, "symbol '{}' is not callable", name)
            }
            TypeErrorKind::WrongArgumentTypes { function } => {
                write!(f, "wrong argument types for function of type '{}'", function)
            }
            TypeErrorKind::SwizzleInvalid { field, operand } => write!(
                f,
                "field '{}' does not exist on type '{}'",
                field, operand
            ),
            TypeErrorKind::ReturnOutsideFunction => {
                write!(f, "return statement cannot appear outside of a function body")
            }
            TypeErrorKind::ReturnTypeMismatch { expected, got } => write!(
                f,
                "return type does not match definition, expecting '{}', got '{}'",
                expected, got
            ),
            TypeErrorKind::UnknownType { name } => {
                write!(f, "unknown type '{}'", name)
            }
        }
    }
}

/// Any failure the pipeline can report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    Pattern(RegexError),
    Lex(LexError),
    Parse(ParseError),
    Type(TypeError),
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::Pattern(err) => write!(f, "{}", err),
            CompileError::Lex(err) => write!(f, "{}", err),
            CompileError::Parse(err) => write!(f, "{}", err),
            CompileError::Type(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<RegexError> for CompileError {
    fn from(err: RegexError) -> Self {
        CompileError::Pattern(err)
    }
}

impl From<LexError> for CompileError {
    fn from(err: LexError) -> Self {
        CompileError::Lex(err)
    }
}

impl From<ParseError> for CompileError {
    fn from(err: ParseError) -> Self {
        CompileError::Parse(err)
    }
}

impl From<TypeError> for CompileError {
    fn from(err: TypeError) -> Self {
        CompileError::Type(err)
    }
}

/// Flat summary handed to diagnostic sinks; serializable for tools.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub stage: &'static str,
    pub message: String,
    pub line: Option<u32>,
    pub column: Option<u32>,
}

impl CompileError {
    pub fn position(&self) -> Option<(u32, u32)> {
        match self {
            CompileError::Pattern(_) => None,
            CompileError::Lex(err) => Some((err.line, err.column)),
            CompileError::Parse(err) => err.position(),
            CompileError::Type(err) => Some((err.token.line, err.token.column)),
        }
    }

    /// Glyph length of the offending token, for underline width.
    fn span_len(&self) -> usize {
        match self {
            CompileError::Parse(err) => err.token.as_ref().map_or(1, |t| t.lexeme.len().max(1)),
            CompileError::Type(err) => err.token.lexeme.len().max(1),
            _ => 1,
        }
    }

    pub fn diagnostic(&self) -> Diagnostic {
        let stage = match self {
            CompileError::Pattern(_) => "pattern",
            CompileError::Lex(_) => "lex",
            CompileError::Parse(_) => "parse",
            CompileError::Type(_) => "typecheck",
        };
        let (line, column) = match self.position() {
            Some((line, column)) => (Some(line), Some(column)),
            None => (None, None),
        };
        Diagnostic {
            stage,
            message: self.to_string(),
            line,
            column,
        }
    }

    /// Render the error against its source line with a caret underline.
    pub fn display_with_source(&self, source: &str) -> String {
        let error_label = Style::bold_red("error");

        let (line, column) = match self.position() {
            Some(pos) => pos,
            None => return format!("{}: {}", error_label, self),
        };

        let line_content = source.lines().nth(line as usize).unwrap_or("");
        let col = (column as usize).saturating_sub(1);
        let underline = format!("{}{}", " ".repeat(col), "^".repeat(self.span_len()));

        let line_num_str = Style::blue(&format!("{:4}", line));
        let pipe = Style::blue("|");

        format!(
            "{}: {}\n\n{} {} {}\n     {} {}",
            error_label,
            self,
            line_num_str,
            pipe,
            line_content,
            pipe,
            Style::red(&underline)
        )
    }
}
