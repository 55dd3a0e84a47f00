//! Traversal interfaces over the AST.
//!
//! Two styles are provided. [`Visitor`] dispatches one method per node
//! kind with `walk_*` defaults, for passes that pick out a few kinds and
//! recurse through the rest. [`Traverser`] delivers every node twice — once
//! before its children and once after — which is what the typechecker needs
//! to manage scopes on the way down and resolve types on the way up.

use crate::ast::{
    DeclStat, Expr, ExprKind, ExprStat, FeatureBlock, Item, Program, PropertyDecl, RequireBlock,
    ReturnStat, ShaderBlock, SharedDecl, Stmt, StringLit, Tag,
};

pub trait Visitor: Sized {
    fn visit_program(&mut self, node: &Program) {
        walk_program(self, node);
    }

    fn visit_property(&mut self, node: &PropertyDecl) {
        walk_property(self, node);
    }

    fn visit_shared(&mut self, node: &SharedDecl) {
        walk_shared(self, node);
    }

    fn visit_feature(&mut self, node: &FeatureBlock) {
        walk_feature(self, node);
    }

    fn visit_shader(&mut self, node: &ShaderBlock) {
        walk_shader(self, node);
    }

    fn visit_require(&mut self, node: &RequireBlock) {
        walk_require(self, node);
    }

    fn visit_decl(&mut self, node: &DeclStat) {
        walk_decl(self, node);
    }

    fn visit_expr_stat(&mut self, node: &ExprStat) {
        self.visit_expr(&node.expr);
    }

    fn visit_return(&mut self, node: &ReturnStat) {
        self.visit_expr(&node.expr);
    }

    fn visit_tag(&mut self, node: &Tag) {
        walk_tag(self, node);
    }

    fn visit_string(&mut self, _node: &StringLit) {}

    fn visit_expr(&mut self, node: &Expr) {
        walk_expr(self, node);
    }
}

pub fn walk_program<V: Visitor>(v: &mut V, node: &Program) {
    for item in &node.items {
        match item {
            Item::Property(p) => v.visit_property(p),
            Item::Shared(s) => v.visit_shared(s),
            Item::Feature(f) => v.visit_feature(f),
            Item::Shader(s) => v.visit_shader(s),
            Item::Require(r) => v.visit_require(r),
        }
    }
}

pub fn walk_property<V: Visitor>(v: &mut V, node: &PropertyDecl) {
    for tag in &node.tags {
        v.visit_tag(tag);
    }
    if let Some(init) = &node.init {
        v.visit_expr(init);
    }
}

pub fn walk_shared<V: Visitor>(v: &mut V, node: &SharedDecl) {
    if let Some(init) = &node.init {
        v.visit_expr(init);
    }
}

pub fn walk_feature<V: Visitor>(v: &mut V, node: &FeatureBlock) {
    for decl in &node.decls {
        v.visit_property(decl);
    }
}

pub fn walk_shader<V: Visitor>(v: &mut V, node: &ShaderBlock) {
    for stat in &node.stats {
        walk_stmt(v, stat);
    }
}

pub fn walk_require<V: Visitor>(v: &mut V, node: &RequireBlock) {
    for stat in &node.stats {
        walk_stmt(v, stat);
    }
}

pub fn walk_stmt<V: Visitor>(v: &mut V, node: &Stmt) {
    match node {
        Stmt::Decl(d) => v.visit_decl(d),
        Stmt::Expr(e) => v.visit_expr_stat(e),
        Stmt::Return(r) => v.visit_return(r),
        Stmt::Require(r) => v.visit_require(r),
    }
}

pub fn walk_decl<V: Visitor>(v: &mut V, node: &DeclStat) {
    if let Some(init) = &node.init {
        v.visit_expr(init);
    }
}

pub fn walk_tag<V: Visitor>(v: &mut V, node: &Tag) {
    if let Some(meta) = &node.meta {
        v.visit_string(meta);
    }
}

pub fn walk_expr<V: Visitor>(v: &mut V, node: &Expr) {
    match &node.kind {
        ExprKind::Binary { left, right, .. } => {
            v.visit_expr(left);
            v.visit_expr(right);
        }
        ExprKind::Unary { operand, .. } => {
            v.visit_expr(operand);
        }
        ExprKind::Field { target, .. } => {
            v.visit_expr(target);
        }
        ExprKind::Call { callee, args } => {
            v.visit_expr(callee);
            for arg in args {
                v.visit_expr(arg);
            }
        }
        ExprKind::Variable { .. }
        | ExprKind::Int { .. }
        | ExprKind::Float { .. }
        | ExprKind::Bool { .. } => {}
    }
}

/// Borrowed view of any node, handed to [`Traverser`] callbacks.
#[derive(Clone, Copy)]
pub enum NodeRef<'a> {
    Program(&'a Program),
    Property(&'a PropertyDecl),
    Shared(&'a SharedDecl),
    Feature(&'a FeatureBlock),
    Shader(&'a ShaderBlock),
    Require(&'a RequireBlock),
    Decl(&'a DeclStat),
    ExprStat(&'a ExprStat),
    Return(&'a ReturnStat),
    Tag(&'a Tag),
    StringLit(&'a StringLit),
    Expr(&'a Expr),
}

impl NodeRef<'_> {
    pub fn ordinal(&self) -> u32 {
        match self {
            NodeRef::Program(n) => n.ordinal,
            NodeRef::Property(n) => n.ordinal,
            NodeRef::Shared(n) => n.ordinal,
            NodeRef::Feature(n) => n.ordinal,
            NodeRef::Shader(n) => n.ordinal,
            NodeRef::Require(n) => n.ordinal,
            NodeRef::Decl(n) => n.ordinal,
            NodeRef::ExprStat(n) => n.ordinal,
            NodeRef::Return(n) => n.ordinal,
            NodeRef::Tag(n) => n.ordinal,
            NodeRef::StringLit(n) => n.ordinal,
            NodeRef::Expr(n) => n.ordinal,
        }
    }
}

/// Depth-first pre/post-order callbacks. Either callback may abort the
/// traversal by returning an error.
pub trait Traverser {
    type Error;

    fn pre(&mut self, node: NodeRef<'_>) -> Result<(), Self::Error>;
    fn post(&mut self, node: NodeRef<'_>) -> Result<(), Self::Error>;
}

pub fn traverse_program<T: Traverser>(t: &mut T, node: &Program) -> Result<(), T::Error> {
    t.pre(NodeRef::Program(node))?;
    for item in &node.items {
        traverse_item(t, item)?;
    }
    t.post(NodeRef::Program(node))
}

pub fn traverse_item<T: Traverser>(t: &mut T, node: &Item) -> Result<(), T::Error> {
    match node {
        Item::Property(p) => traverse_property(t, p),
        Item::Shared(s) => traverse_shared(t, s),
        Item::Feature(f) => traverse_feature(t, f),
        Item::Shader(s) => traverse_shader(t, s),
        Item::Require(r) => traverse_require(t, r),
    }
}

pub fn traverse_property<T: Traverser>(t: &mut T, node: &PropertyDecl) -> Result<(), T::Error> {
    t.pre(NodeRef::Property(node))?;
    for tag in &node.tags {
        traverse_tag(t, tag)?;
    }
    if let Some(init) = &node.init {
        traverse_expr(t, init)?;
    }
    t.post(NodeRef::Property(node))
}

pub fn traverse_shared<T: Traverser>(t: &mut T, node: &SharedDecl) -> Result<(), T::Error> {
    t.pre(NodeRef::Shared(node))?;
    if let Some(init) = &node.init {
        traverse_expr(t, init)?;
    }
    t.post(NodeRef::Shared(node))
}

pub fn traverse_feature<T: Traverser>(t: &mut T, node: &FeatureBlock) -> Result<(), T::Error> {
    t.pre(NodeRef::Feature(node))?;
    for decl in &node.decls {
        traverse_property(t, decl)?;
    }
    t.post(NodeRef::Feature(node))
}

pub fn traverse_shader<T: Traverser>(t: &mut T, node: &ShaderBlock) -> Result<(), T::Error> {
    t.pre(NodeRef::Shader(node))?;
    for stat in &node.stats {
        traverse_stmt(t, stat)?;
    }
    t.post(NodeRef::Shader(node))
}

pub fn traverse_require<T: Traverser>(t: &mut T, node: &RequireBlock) -> Result<(), T::Error> {
    t.pre(NodeRef::Require(node))?;
    for stat in &node.stats {
        traverse_stmt(t, stat)?;
    }
    t.post(NodeRef::Require(node))
}

pub fn traverse_stmt<T: Traverser>(t: &mut T, node: &Stmt) -> Result<(), T::Error> {
    match node {
        Stmt::Decl(d) => {
            t.pre(NodeRef::Decl(d))?;
            if let Some(init) = &d.init {
                traverse_expr(t, init)?;
            }
            t.post(NodeRef::Decl(d))
        }
        Stmt::Expr(e) => {
            t.pre(NodeRef::ExprStat(e))?;
            traverse_expr(t, &e.expr)?;
            t.post(NodeRef::ExprStat(e))
        }
        Stmt::Return(r) => {
            t.pre(NodeRef::Return(r))?;
            traverse_expr(t, &r.expr)?;
            t.post(NodeRef::Return(r))
        }
        Stmt::Require(r) => traverse_require(t, r),
    }
}

pub fn traverse_tag<T: Traverser>(t: &mut T, node: &Tag) -> Result<(), T::Error> {
    t.pre(NodeRef::Tag(node))?;
    if let Some(meta) = &node.meta {
        t.pre(NodeRef::StringLit(meta))?;
        t.post(NodeRef::StringLit(meta))?;
    }
    t.post(NodeRef::Tag(node))
}

pub fn traverse_expr<T: Traverser>(t: &mut T, node: &Expr) -> Result<(), T::Error> {
    t.pre(NodeRef::Expr(node))?;
    match &node.kind {
        ExprKind::Binary { left, right, .. } => {
            traverse_expr(t, left)?;
            traverse_expr(t, right)?;
        }
        ExprKind::Unary { operand, .. } => {
            traverse_expr(t, operand)?;
        }
        ExprKind::Field { target, .. } => {
            traverse_expr(t, target)?;
        }
        ExprKind::Call { callee, args } => {
            traverse_expr(t, callee)?;
            for arg in args {
                traverse_expr(t, arg)?;
            }
        }
        ExprKind::Variable { .. }
        | ExprKind::Int { .. }
        | ExprKind::Float { .. }
        | ExprKind::Bool { .. } => {}
    }
    t.post(NodeRef::Expr(node))
}
