//! Expression nodes.
//!
//! Boxed variants point into the arena so `Expr` stays `Copy`.

use stackc_core::Span;

use crate::{BinaryOp, Ident, PostfixOp, TypeExpr, UnaryOp};

/// An expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'ast> {
    /// Literal value
    Literal(LiteralExpr<'ast>),
    /// Identifier reference
    Ident(Ident<'ast>),
    /// Binary operation, including `&&` and `||`
    Binary(&'ast BinaryExpr<'ast>),
    /// Prefix unary operation
    Unary(&'ast UnaryExpr<'ast>),
    /// `x++` / `x--`
    Postfix(&'ast PostfixExpr<'ast>),
    /// `=` and compound assignment
    Assign(&'ast AssignExpr<'ast>),
    /// `c ? a : b`
    Ternary(&'ast TernaryExpr<'ast>),
    /// `f(args)`
    Call(&'ast CallExpr<'ast>),
    /// `obj.m(args)` / `ptr->m(args)`
    MethodCall(&'ast MethodCallExpr<'ast>),
    /// `obj.f` / `ptr->f`
    Member(&'ast MemberExpr<'ast>),
    /// `p[i]`
    Index(&'ast IndexExpr<'ast>),
    /// `(T) e`
    Cast(&'ast CastExpr<'ast>),
    /// `sizeof(T)`
    SizeOf(&'ast SizeOfExpr<'ast>),
}

impl<'ast> Expr<'ast> {
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal(e) => e.span,
            Expr::Ident(e) => e.span,
            Expr::Binary(e) => e.span,
            Expr::Unary(e) => e.span,
            Expr::Postfix(e) => e.span,
            Expr::Assign(e) => e.span,
            Expr::Ternary(e) => e.span,
            Expr::Call(e) => e.span,
            Expr::MethodCall(e) => e.span,
            Expr::Member(e) => e.span,
            Expr::Index(e) => e.span,
            Expr::Cast(e) => e.span,
            Expr::SizeOf(e) => e.span,
        }
    }

    /// Whether this is the integer literal `0` (a null pointer constant).
    pub fn is_zero_literal(&self) -> bool {
        matches!(
            self,
            Expr::Literal(LiteralExpr {
                kind: LiteralKind::Int(0),
                ..
            })
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiteralExpr<'ast> {
    pub kind: LiteralKind<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralKind<'ast> {
    Int(i64),
    Char(u8),
    Float(f64),
    /// Raw bytes, without the terminating NUL.
    String(&'ast [u8]),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryExpr<'ast> {
    pub op: BinaryOp,
    pub left: &'ast Expr<'ast>,
    pub right: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnaryExpr<'ast> {
    pub op: UnaryOp,
    pub operand: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostfixExpr<'ast> {
    pub op: PostfixOp,
    pub operand: &'ast Expr<'ast>,
    pub span: Span,
}

/// Assignment. `op` is `None` for plain `=` and the arithmetic operator for
/// compound forms such as `+=`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignExpr<'ast> {
    pub op: Option<BinaryOp>,
    pub target: &'ast Expr<'ast>,
    pub value: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TernaryExpr<'ast> {
    pub condition: &'ast Expr<'ast>,
    pub then_expr: &'ast Expr<'ast>,
    pub else_expr: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallExpr<'ast> {
    pub callee: Ident<'ast>,
    pub args: &'ast [&'ast Expr<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MethodCallExpr<'ast> {
    pub receiver: &'ast Expr<'ast>,
    /// `->` rather than `.`
    pub arrow: bool,
    pub method: Ident<'ast>,
    pub args: &'ast [&'ast Expr<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemberExpr<'ast> {
    pub base: &'ast Expr<'ast>,
    /// `->` rather than `.`
    pub arrow: bool,
    pub field: Ident<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexExpr<'ast> {
    pub base: &'ast Expr<'ast>,
    pub index: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CastExpr<'ast> {
    pub ty: TypeExpr<'ast>,
    pub expr: &'ast Expr<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeOfExpr<'ast> {
    pub ty: TypeExpr<'ast>,
    pub span: Span,
}
