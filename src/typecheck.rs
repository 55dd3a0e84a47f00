//! Type resolution and checking.
//!
//! A single depth-first walk drives everything: the pre-order half opens
//! scopes at shader and require blocks, the post-order half resolves each
//! expression from its already-resolved children and annotates the result
//! into the active scope. Declarations bind their name after the
//! initializer has been resolved, so an initializer cannot see the name it
//! is about to introduce.

use crate::ast::{DeclStat, Expr, ExprKind, Program};
use crate::error::{TypeError, TypeErrorKind};
use crate::intern::{Interner, Symbol};
use crate::lexer::Token;
use crate::operators::{self, Operator};
use crate::symtab::SymbolTable;
use crate::types::{ScalarKind, Type, TypeRef, TypeRegistry};
use crate::visitor::{traverse_program, NodeRef, Traverser};

/// Check a parsed program against a symbol table whose root scope already
/// holds the built-ins.
pub fn check_program(
    program: &Program,
    symbols: &mut SymbolTable,
    types: &TypeRegistry,
    interner: &Interner,
) -> Result<(), TypeError> {
    let mut checker = TypeChecker {
        symbols,
        types,
        interner,
    };
    traverse_program(&mut checker, program)
}

struct TypeChecker<'a> {
    symbols: &'a mut SymbolTable,
    types: &'a TypeRegistry,
    interner: &'a Interner,
}

impl TypeChecker<'_> {
    fn error(&self, token: &Token, kind: TypeErrorKind) -> TypeError {
        TypeError {
            kind,
            token: token.clone(),
        }
    }

    fn operand_error(&self, token: &Token, op: Operator, ty: &TypeRef) -> TypeError {
        self.error(
            token,
            TypeErrorKind::OperatorNotSupported {
                op: op.as_str(),
                operand: ty.name(),
            },
        )
    }

    fn incompatible(&self, token: &Token, op: Operator, left: &TypeRef, right: &TypeRef) -> TypeError {
        self.error(
            token,
            TypeErrorKind::IncompatibleTypes {
                left: left.name(),
                right: right.name(),
                op: op.as_str(),
            },
        )
    }

    /// Type of a child expression, resolved earlier in this post-order.
    fn child(&self, expr: &Expr) -> TypeRef {
        self.symbols
            .lookup_ordinal(expr.ordinal)
            .expect("child expression resolved before its parent")
    }

    /// Matrix-by-vector product in either order; the vector side decides
    /// the result.
    fn mat_vec(&self, matrix: &TypeRef, vector: &TypeRef) -> Option<TypeRef> {
        if let (Type::Matrix { size }, Type::Vector { len, .. }) = (&**matrix, &**vector) {
            if size == len {
                return Some(vector.clone());
            }
        }
        None
    }

    /// Resolve a binary operation. No implicit conversions: outside of the
    /// matrix forms of `*`, compatibility means identical interned types.
    fn resolve_binary(
        &self,
        token: &Token,
        op: Operator,
        left: &TypeRef,
        right: &TypeRef,
    ) -> Result<TypeRef, TypeError> {
        if !operators::supports_left(op, left) {
            return Err(self.operand_error(token, op, left));
        }
        if !operators::supports_right(op, right) {
            return Err(self.operand_error(token, op, right));
        }

        match op {
            Operator::Or
            | Operator::And
            | Operator::Eq
            | Operator::Neq
            | Operator::Gt
            | Operator::Lt
            | Operator::Ge
            | Operator::Le => {
                if left != right {
                    return Err(self.incompatible(token, op, left, right));
                }
                Ok(self.types.scalar(ScalarKind::Bool))
            }
            Operator::Assign
            | Operator::Add
            | Operator::Sub
            | Operator::Div
            | Operator::Mod => {
                if left != right {
                    return Err(self.incompatible(token, op, left, right));
                }
                Ok(left.clone())
            }
            Operator::Mul => {
                if left == right {
                    return Ok(left.clone());
                }
                // A vector is read as a column on the right of a matrix and
                // as a row on the left.
                if let Some(column) = self.mat_vec(left, right) {
                    return Ok(column);
                }
                if let Some(row) = self.mat_vec(right, left) {
                    return Ok(row);
                }
                Err(self.incompatible(token, op, left, right))
            }
            Operator::Index => match &**left {
                Type::Vector { elem, .. } => Ok(self.types.scalar(*elem)),
                Type::Matrix { size } => Ok(self.types.vector(ScalarKind::Float, *size)),
                // The support table only lets vectors and matrices through.
                _ => unreachable!("indexable operand was support-checked"),
            },
            Operator::Not => unreachable!("'!' never reaches binary resolution"),
        }
    }

    fn resolve_expr(&mut self, expr: &Expr) -> Result<TypeRef, TypeError> {
        match &expr.kind {
            ExprKind::Binary { op, left, right } => {
                let t_left = self.child(left);
                let t_right = self.child(right);
                self.resolve_binary(&expr.token, *op, &t_left, &t_right)
            }
            ExprKind::Unary { op, operand } => {
                let t_operand = self.child(operand);
                if !operators::supports_left(*op, &t_operand) {
                    return Err(self.operand_error(&expr.token, *op, &t_operand));
                }
                // Unary operators change the value, never the type.
                Ok(t_operand)
            }
            ExprKind::Variable { name } => {
                self.symbols.lookup_name(*name).ok_or_else(|| {
                    self.error(
                        &expr.token,
                        TypeErrorKind::UndefinedSymbol {
                            name: self.interner.resolve(*name).to_string(),
                        },
                    )
                })
            }
            ExprKind::Int { .. } => Ok(self.types.scalar(ScalarKind::Int)),
            ExprKind::Float { .. } => Ok(self.types.scalar(ScalarKind::Float)),
            ExprKind::Bool { .. } => Ok(self.types.scalar(ScalarKind::Bool)),
            ExprKind::Field { target, field } => {
                let t_target = self.child(target);
                let field_str = self.interner.resolve(*field);
                self.types.swizzle(&t_target, field_str).ok_or_else(|| {
                    self.error(
                        &expr.token,
                        TypeErrorKind::SwizzleInvalid {
                            field: field_str.to_string(),
                            operand: t_target.name(),
                        },
                    )
                })
            }
            ExprKind::Call { callee, args } => self.resolve_call(expr, callee, args),
        }
    }

    fn resolve_call(
        &mut self,
        expr: &Expr,
        callee: &Expr,
        args: &[Expr],
    ) -> Result<TypeRef, TypeError> {
        let not_callable = |token: &Token, name: String| TypeError {
            kind: TypeErrorKind::NotCallable { name },
            token: token.clone(),
        };

        // Only named functions are callable; the callee expression has
        // already resolved, so a plain reference is all that is needed.
        let name = match &callee.kind {
            ExprKind::Variable { name } => *name,
            _ => return Err(not_callable(&callee.token, callee.token.text())),
        };

        let f_type = self.child(callee);
        let Type::Function(f) = &*f_type else {
            return Err(not_callable(
                &expr.token,
                self.interner.resolve(name).to_string(),
            ));
        };

        // Types are interned, so matching a signature is a handful of
        // identity comparisons.
        let arg_types: Vec<TypeRef> = args.iter().map(|arg| self.child(arg)).collect();
        let matches = arg_types == f.params
            || f.overloads.iter().any(|overload| &arg_types == overload);

        if !matches {
            return Err(self.error(
                &expr.token,
                TypeErrorKind::WrongArgumentTypes {
                    function: f_type.name(),
                },
            ));
        }

        Ok(f.ret.clone())
    }

    /// Declare a name after its initializer resolved, then verify the
    /// initializer assigns cleanly.
    fn check_decl(
        &mut self,
        ordinal: u32,
        token: &Token,
        ty: Symbol,
        name: Symbol,
        init: Option<&Expr>,
    ) -> Result<(), TypeError> {
        let type_name = self.interner.resolve(ty);
        let t_left = self.types.get(type_name).ok_or_else(|| {
            self.error(
                token,
                TypeErrorKind::UnknownType {
                    name: type_name.to_string(),
                },
            )
        })?;

        self.symbols
            .declare(ordinal, name, t_left.clone())
            .map_err(|_| {
                self.error(
                    token,
                    TypeErrorKind::RedeclaredSymbol {
                        name: self.interner.resolve(name).to_string(),
                    },
                )
            })?;

        if let Some(init) = init {
            let t_right = self.child(init);
            self.resolve_binary(token, Operator::Assign, &t_left, &t_right)?;
        }

        Ok(())
    }
}

impl Traverser for TypeChecker<'_> {
    type Error = TypeError;

    fn pre(&mut self, node: NodeRef<'_>) -> Result<(), TypeError> {
        match node {
            // A shader body is the function the GPU calls; its statements
            // may return the stage output.
            NodeRef::Shader(_) => {
                let ret = self.types.vector(ScalarKind::Float, 4);
                self.symbols.begin_scope(Some(ret));
            }
            NodeRef::Require(_) => self.symbols.begin_scope(None),
            _ => {}
        }
        Ok(())
    }

    fn post(&mut self, node: NodeRef<'_>) -> Result<(), TypeError> {
        match node {
            NodeRef::Expr(expr) => {
                let ty = self.resolve_expr(expr)?;
                self.symbols.annotate(expr.ordinal, ty);
            }
            NodeRef::Decl(decl) => {
                let DeclStat {
                    ordinal,
                    token,
                    ty,
                    name,
                    init,
                } = decl;
                self.check_decl(*ordinal, token, *ty, *name, init.as_ref())?;
            }
            NodeRef::Property(decl) => {
                self.check_decl(
                    decl.ordinal,
                    &decl.token,
                    decl.ty,
                    decl.name,
                    decl.init.as_ref(),
                )?;
            }
            NodeRef::Shared(decl) => {
                self.check_decl(
                    decl.ordinal,
                    &decl.token,
                    decl.ty,
                    decl.name,
                    decl.init.as_ref(),
                )?;
            }
            NodeRef::Return(ret) => {
                let t_expr = self.child(&ret.expr);
                let t_return = self
                    .symbols
                    .return_type()
                    .ok_or_else(|| self.error(&ret.token, TypeErrorKind::ReturnOutsideFunction))?;
                if t_return != t_expr {
                    return Err(self.error(
                        &ret.token,
                        TypeErrorKind::ReturnTypeMismatch {
                            expected: t_return.name(),
                            got: t_expr.name(),
                        },
                    ));
                }
            }
            NodeRef::Shader(_) | NodeRef::Require(_) => self.symbols.end_scope(),
            NodeRef::Program(_)
            | NodeRef::Feature(_)
            | NodeRef::Tag(_)
            | NodeRef::StringLit(_)
            | NodeRef::ExprStat(_) => {}
        }
        Ok(())
    }
}
