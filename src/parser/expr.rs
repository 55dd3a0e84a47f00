//! The expression grammar, lowest precedence first:
//!
//! ```text
//! expr         := orExpr ('=' expr)?
//! orExpr       := andExpr        ( '||' andExpr )*
//! andExpr      := equalityExpr   ( '&&' equalityExpr )*
//! equalityExpr := comparisonExpr ( ('=='|'!=') comparisonExpr )*
//! comparisonExpr := addExpr     ( ('>'|'<'|'>='|'<=') addExpr )*
//! addExpr      := mulExpr        ( ('+'|'-') mulExpr )*
//! mulExpr      := prefixExpr     ( ('*'|'/'|'%') prefixExpr )*
//! prefixExpr   := ('-'|'!')? postfixExpr
//! postfixExpr  := valueExpr ( '[' expr ']' | '(' argList? ')' | '.' ident )*
//! valueExpr    := boolLit | numericLit | identifier | '(' expr ')'
//! ```
//!
//! Repeated binary operators fold left, so `a + b + c` parses as
//! `(a + b) + c`; assignment alone nests to the right.

use super::{ParseResult, Parser};
use crate::ast::{Expr, ExprKind};
use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{Token, TokenSource};
use crate::operators::Operator;
use crate::token::TokenKind;

pub trait ExprParsing {
    fn parse_expression(&mut self) -> ParseResult<Expr>;
}

impl<S: TokenSource> ExprParsing for Parser<'_, '_, S> {
    fn parse_expression(&mut self) -> ParseResult<Expr> {
        let left = self.or_expr()?;

        // The right-hand side is parsed as a full expression, so chained
        // assignment nests to the right.
        if let Some(token) = self.eat(TokenKind::OpAssign)? {
            let right = self.parse_expression()?;
            return Ok(self.binary(token, Operator::Assign, left, right));
        }

        Ok(left)
    }
}

impl<S: TokenSource> Parser<'_, '_, S> {
    fn binary(&mut self, token: Token, op: Operator, left: Expr, right: Expr) -> Expr {
        Expr {
            ordinal: self.ordinals.next(),
            token,
            kind: ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
        }
    }

    /// Fold `(op operand)*` repetitions of the next tighter level into a
    /// left-leaning tree.
    fn binary_chain(
        &mut self,
        ops: &[(TokenKind, Operator)],
        next: fn(&mut Self) -> ParseResult<Expr>,
    ) -> ParseResult<Expr> {
        let mut tree = next(self)?;

        'fold: loop {
            for &(kind, op) in ops {
                if let Some(token) = self.eat(kind)? {
                    let right = next(self)?;
                    tree = self.binary(token, op, tree, right);
                    continue 'fold;
                }
            }
            return Ok(tree);
        }
    }

    fn or_expr(&mut self) -> ParseResult<Expr> {
        self.binary_chain(&[(TokenKind::OpOr, Operator::Or)], Self::and_expr)
    }

    fn and_expr(&mut self) -> ParseResult<Expr> {
        self.binary_chain(&[(TokenKind::OpAnd, Operator::And)], Self::equality_expr)
    }

    fn equality_expr(&mut self) -> ParseResult<Expr> {
        self.binary_chain(
            &[
                (TokenKind::OpEq, Operator::Eq),
                (TokenKind::OpNeq, Operator::Neq),
            ],
            Self::comparison_expr,
        )
    }

    fn comparison_expr(&mut self) -> ParseResult<Expr> {
        self.binary_chain(
            &[
                (TokenKind::OpGt, Operator::Gt),
                (TokenKind::OpLt, Operator::Lt),
                (TokenKind::OpGe, Operator::Ge),
                (TokenKind::OpLe, Operator::Le),
            ],
            Self::add_expr,
        )
    }

    fn add_expr(&mut self) -> ParseResult<Expr> {
        self.binary_chain(
            &[
                (TokenKind::OpAdd, Operator::Add),
                (TokenKind::OpSub, Operator::Sub),
            ],
            Self::mul_expr,
        )
    }

    fn mul_expr(&mut self) -> ParseResult<Expr> {
        self.binary_chain(
            &[
                (TokenKind::OpMul, Operator::Mul),
                (TokenKind::OpDiv, Operator::Div),
                (TokenKind::OpMod, Operator::Mod),
            ],
            Self::prefix_expr,
        )
    }

    fn prefix_expr(&mut self) -> ParseResult<Expr> {
        let prefix = if let Some(token) = self.eat(TokenKind::OpSub)? {
            Some((token, Operator::Sub))
        } else if let Some(token) = self.eat(TokenKind::OpBang)? {
            Some((token, Operator::Not))
        } else {
            None
        };

        let operand = self.postfix_expr()?;

        Ok(match prefix {
            Some((token, op)) => Expr {
                ordinal: self.ordinals.next(),
                token,
                kind: ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
            },
            None => operand,
        })
    }

    fn postfix_expr(&mut self) -> ParseResult<Expr> {
        let mut tree = self.value_expr()?;

        loop {
            if let Some(token) = self.eat(TokenKind::OpenBracket)? {
                let index = self.parse_expression()?;
                self.expect(TokenKind::CloseBracket)?;
                tree = self.binary(token, Operator::Index, tree, index);
            } else if let Some(token) = self.eat(TokenKind::OpenParen)? {
                let args = if self.at(TokenKind::CloseParen) {
                    Vec::new()
                } else {
                    self.arg_list()?
                };
                self.expect(TokenKind::CloseParen)?;
                tree = Expr {
                    ordinal: self.ordinals.next(),
                    token,
                    kind: ExprKind::Call {
                        callee: Box::new(tree),
                        args,
                    },
                };
            } else if let Some(token) = self.eat(TokenKind::Dot)? {
                let field_token = self.expect(TokenKind::Identifier)?;
                let field = self.intern_text(&field_token);
                tree = Expr {
                    ordinal: self.ordinals.next(),
                    token,
                    kind: ExprKind::Field {
                        target: Box::new(tree),
                        field,
                    },
                };
            } else {
                return Ok(tree);
            }
        }
    }

    fn arg_list(&mut self) -> ParseResult<Vec<Expr>> {
        let mut args = vec![self.parse_expression()?];
        while self.eat(TokenKind::Comma)?.is_some() {
            args.push(self.parse_expression()?);
        }
        Ok(args)
    }

    fn value_expr(&mut self) -> ParseResult<Expr> {
        if let Some(token) = self.eat(TokenKind::BoolLiteral)? {
            let value = token.text() == "true";
            return Ok(Expr {
                ordinal: self.ordinals.next(),
                token,
                kind: ExprKind::Bool { value },
            });
        }

        if let Some(token) = self.eat(TokenKind::NumericLiteral)? {
            return self.numeric_literal(token);
        }

        // Data-type keywords double as constructor names in call position.
        let ident = match self.eat(TokenKind::Identifier)? {
            Some(token) => Some(token),
            None => self.eat(TokenKind::DataType)?,
        };
        if let Some(token) = ident {
            let name = self.intern_text(&token);
            return Ok(Expr {
                ordinal: self.ordinals.next(),
                token,
                kind: ExprKind::Variable { name },
            });
        }

        if self.eat(TokenKind::OpenParen)?.is_some() {
            let tree = self.parse_expression()?;
            self.expect(TokenKind::CloseParen)?;
            return Ok(tree);
        }

        Err(self.error(ParseErrorKind::ExpectedExpression))
    }

    fn numeric_literal(&mut self, token: Token) -> ParseResult<Expr> {
        let text = token.text();
        let kind = if text.contains('.') {
            ExprKind::Float { value: text }
        } else {
            match text.parse::<i32>() {
                Ok(value) => ExprKind::Int { value },
                Err(_) => {
                    return Err(ParseError {
                        kind: ParseErrorKind::InvalidNumericLiteral,
                        token: Some(token),
                    })
                }
            }
        };

        Ok(Expr {
            ordinal: self.ordinals.next(),
            token,
            kind,
        })
    }
}
