//! Operators and their operand support table.
//!
//! Operators are closed: users cannot define new ones, so support is a
//! static relation between an operator and an operand type. The typechecker
//! consults the table for each side of an operation before it reasons about
//! compatibility, and never converts implicitly.

use crate::token::TokenKind;
use crate::types::{ScalarKind, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Assign,
    Or,
    And,
    Eq,
    Neq,
    Gt,
    Lt,
    Ge,
    Le,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Not,
    Index,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Assign => "=",
            Operator::Or => "||",
            Operator::And => "&&",
            Operator::Eq => "==",
            Operator::Neq => "!=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Ge => ">=",
            Operator::Le => "<=",
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Mod => "%",
            Operator::Not => "!",
            Operator::Index => "[]",
        }
    }

    /// The operator an operator token denotes, if any.
    pub fn from_token(kind: TokenKind) -> Option<Operator> {
        let op = match kind {
            TokenKind::OpAssign => Operator::Assign,
            TokenKind::OpOr => Operator::Or,
            TokenKind::OpAnd => Operator::And,
            TokenKind::OpEq => Operator::Eq,
            TokenKind::OpNeq => Operator::Neq,
            TokenKind::OpGt => Operator::Gt,
            TokenKind::OpLt => Operator::Lt,
            TokenKind::OpGe => Operator::Ge,
            TokenKind::OpLe => Operator::Le,
            TokenKind::OpAdd => Operator::Add,
            TokenKind::OpSub => Operator::Sub,
            TokenKind::OpMul => Operator::Mul,
            TokenKind::OpDiv => Operator::Div,
            TokenKind::OpMod => Operator::Mod,
            TokenKind::OpBang => Operator::Not,
            _ => return None,
        };
        Some(op)
    }
}

fn is_numeric_scalar(ty: &Type) -> bool {
    matches!(
        ty,
        Type::Scalar(ScalarKind::Int) | Type::Scalar(ScalarKind::UInt) | Type::Scalar(ScalarKind::Float)
    )
}

fn is_numeric_vector(ty: &Type) -> bool {
    matches!(ty, Type::Vector { elem, .. } if *elem != ScalarKind::Bool)
}

/// Whether `ty` may appear as the left operand of `op` (or the only
/// operand, for unary operators).
pub fn supports_left(op: Operator, ty: &Type) -> bool {
    match op {
        Operator::Or | Operator::And | Operator::Not => {
            matches!(ty, Type::Scalar(ScalarKind::Bool))
        }
        Operator::Eq | Operator::Neq | Operator::Assign => !matches!(ty, Type::Function(_)),
        Operator::Gt | Operator::Lt | Operator::Ge | Operator::Le => is_numeric_scalar(ty),
        Operator::Add | Operator::Sub | Operator::Div | Operator::Mul => {
            is_numeric_scalar(ty) || is_numeric_vector(ty) || matches!(ty, Type::Matrix { .. })
        }
        Operator::Mod => is_numeric_scalar(ty),
        Operator::Index => matches!(ty, Type::Vector { .. } | Type::Matrix { .. }),
    }
}

/// Whether `ty` may appear as the right operand of `op`.
pub fn supports_right(op: Operator, ty: &Type) -> bool {
    match op {
        // Indexing takes an integer subscript.
        Operator::Index => {
            matches!(ty, Type::Scalar(ScalarKind::Int) | Type::Scalar(ScalarKind::UInt))
        }
        _ => supports_left(op, ty),
    }
}
