//! Longest-match tokenizer driving the generated DFA.
//!
//! The lexer walks the machine until a transition fails; if the state it
//! failed from accepts, the buffered glyphs become a token and the failing
//! glyph is re-examined for the next one. Space, tab, and newline always
//! end the current token and are discarded, so no pattern can match across
//! whitespace.

use serde::Serialize;

use crate::alphabet::{Alphabet, Buffer};
use crate::dfa::Dfa;
use crate::error::{LexError, LexErrorKind, RegexError};
use crate::nfa::{Label, Nfa};
use crate::regex;
use crate::token::{TokenKind, PATTERNS};
use crate::utf8::{self, Glyph};

const NEWLINE: Glyph = '\n' as Glyph;
const SPACE: Glyph = ' ' as Glyph;
const TAB: Glyph = '\t' as Glyph;

/// Rough upper bound on typical token length, used to pre-size the lexeme
/// buffer.
const TOKEN_BUFFER_SIZE: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    /// The matched glyphs in the packed representation.
    pub lexeme: Vec<Glyph>,
    /// Position of the first glyph. Lines count from zero until the first
    /// newline; columns restart at one on every line.
    pub line: u32,
    pub column: u32,
}

impl Token {
    /// Pattern index of the matched pattern.
    pub fn index(&self) -> usize {
        self.kind.index()
    }

    pub fn text(&self) -> String {
        utf8::to_text(&self.lexeme)
    }
}

/// Anything that can feed tokens to the parser. Lets tests drive the parser
/// from hand-built token lists without a lexer behind them.
pub trait TokenSource {
    fn next_token(&mut self) -> Result<Option<Token>, LexError>;
}

pub struct Lexer<I: Iterator<Item = u8>> {
    alphabet: Alphabet,
    dfa: Dfa,
    input: utf8::Decoder<I>,
    curr: Glyph,
    /// When false, re-examine `curr` instead of consuming new input. Set
    /// after a failed transition ends a token so the failing glyph opens
    /// the next one.
    should_advance: bool,
    line: u32,
    column: u32,
    buf: Vec<Glyph>,
}

impl<I: Iterator<Item = u8>> Lexer<I> {
    /// Compile a pattern list into a scanner over `bytes`. Pattern order
    /// fixes each pattern's index in the emitted tokens and its precedence
    /// in ambiguous matches.
    pub fn new(patterns: &[&str], bytes: I) -> Result<Self, RegexError> {
        let mut exprs = Vec::with_capacity(patterns.len());
        for p in patterns {
            exprs.push(regex::parse(p)?);
        }

        let mut buf = Buffer::new();
        for expr in &exprs {
            buf.collect(expr);
        }

        let alphabet = Alphabet::new(&buf);
        let dfa = Dfa::new(&Nfa::new(&alphabet, &exprs));

        Ok(Lexer {
            alphabet,
            dfa,
            input: utf8::Decoder::new(bytes),
            curr: 0,
            should_advance: true,
            line: 0,
            column: 0,
            buf: Vec::with_capacity(TOKEN_BUFFER_SIZE),
        })
    }

    /// Scanner for the slim language itself.
    pub fn slim(bytes: I) -> Self {
        match Lexer::new(&PATTERNS, bytes) {
            Ok(lexer) => lexer,
            // The table is a compile-time constant exercised by tests.
            Err(err) => panic!("slim pattern table failed to compile: {}", err.message),
        }
    }

    /// Produce the next token, or `None` once the input is exhausted. A
    /// failed match reports its position and clears the in-progress lexeme,
    /// so callers may keep pulling tokens afterwards.
    pub fn next(&mut self) -> Result<Option<Token>, LexError> {
        let mut state = self.dfa.start();
        let mut start_pos = (self.line, self.column);
        let mut token_started = false;

        loop {
            if self.should_advance {
                match self.input.next() {
                    Some(g) => self.curr = g,
                    None => break,
                }
            }

            let g = self.curr;
            let newline = g == NEWLINE;
            let whitespace = g == SPACE || g == TAB;

            // Bookkeeping for error positions happens whether or not the
            // glyph ends up in a token.
            if newline {
                self.column = 0;
                self.line += 1;
            } else if self.should_advance {
                self.column += 1;
            }

            self.should_advance = true;

            if newline || whitespace {
                // Leading whitespace is discarded; trailing whitespace
                // finishes the token if the machine accepts here.
                if !token_started {
                    continue;
                }
                return match self.dfa.token(state) {
                    Some(i) => Ok(Some(self.produce(i, start_pos))),
                    None => Err(self.fail(LexErrorKind::UnexpectedCharacter)),
                };
            }

            if !token_started {
                token_started = true;
                start_pos = (self.line, self.column);
            }

            let label = match self.alphabet.index_of(g) {
                Some(cell) => Label::Cell(cell as u32),
                None => Label::Negative,
            };

            match self.dfa.go(state, label) {
                Some(next) => {
                    self.buf.push(g);
                    state = next;
                }
                None => {
                    // Longest match: only a failed transition ends a token,
                    // and the unmatched glyph belongs to the next one.
                    return match self.dfa.token(state) {
                        Some(i) => {
                            self.should_advance = false;
                            Ok(Some(self.produce(i, start_pos)))
                        }
                        None => Err(self.fail(LexErrorKind::UnexpectedCharacter)),
                    };
                }
            }
        }

        if let Some(err) = self.input.err() {
            return Err(self.fail(LexErrorKind::InvalidUtf8(err)));
        }

        if !self.buf.is_empty() {
            return match self.dfa.token(state) {
                Some(i) => Ok(Some(self.produce(i, start_pos))),
                None => Err(self.fail(LexErrorKind::UnexpectedEndOfInput)),
            };
        }

        Ok(None)
    }

    fn produce(&mut self, pattern: usize, start_pos: (u32, u32)) -> Token {
        debug_assert!(!self.buf.is_empty(), "produced an empty token");
        Token {
            kind: TokenKind::from_index(pattern),
            lexeme: std::mem::take(&mut self.buf),
            line: start_pos.0,
            column: start_pos.1,
        }
    }

    fn fail(&mut self, kind: LexErrorKind) -> LexError {
        // Drop the partial lexeme so the next call starts clean.
        self.buf.clear();
        LexError {
            kind,
            line: self.line,
            column: self.column,
        }
    }
}

impl<I: Iterator<Item = u8>> TokenSource for Lexer<I> {
    fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        self.next()
    }
}

/// Pre-lexed token list, mainly for parser tests and tools that already
/// hold tokens.
pub struct VecSource {
    tokens: std::vec::IntoIter<Token>,
}

impl VecSource {
    pub fn new(tokens: Vec<Token>) -> Self {
        VecSource {
            tokens: tokens.into_iter(),
        }
    }
}

impl TokenSource for VecSource {
    fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        Ok(self.tokens.next())
    }
}
