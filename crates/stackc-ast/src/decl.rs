//! File-scope declarations.

use stackc_core::Span;

use crate::{Block, Expr, Ident, TypeExpr, VarDeclStmt};

/// A parsed translation unit: the ordered file-scope declarations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TranslationUnit<'ast> {
    pub items: &'ast [Item<'ast>],
    pub span: Span,
}

impl<'ast> TranslationUnit<'ast> {
    pub fn new(items: &'ast [Item<'ast>], span: Span) -> Self {
        Self { items, span }
    }

    pub fn items(&self) -> &'ast [Item<'ast>] {
        self.items
    }

    /// Function declarations, in source order.
    pub fn functions(&self) -> impl Iterator<Item = &'ast FunctionDecl<'ast>> {
        self.items.iter().filter_map(|item| match item {
            Item::Function(f) => Some(*f),
            _ => None,
        })
    }
}

/// A file-scope declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Item<'ast> {
    Function(&'ast FunctionDecl<'ast>),
    Struct(&'ast StructDecl<'ast>),
    Enum(&'ast EnumDecl<'ast>),
    Typedef(TypedefDecl<'ast>),
    Global(VarDeclStmt<'ast>),
}

impl<'ast> Item<'ast> {
    pub fn span(&self) -> Span {
        match self {
            Item::Function(f) => f.span,
            Item::Struct(s) => s.span,
            Item::Enum(e) => e.span,
            Item::Typedef(t) => t.span,
            Item::Global(g) => g.span,
        }
    }
}

/// A function prototype or definition.
///
/// `owner` is set for instance members written `Ret Owner::name(...)`; such
/// functions receive an implicit `this` pointer to the owning struct.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionDecl<'ast> {
    pub name: Ident<'ast>,
    pub owner: Option<Ident<'ast>>,
    pub return_type: TypeExpr<'ast>,
    pub params: &'ast [Param<'ast>],
    /// `None` for a prototype.
    pub body: Option<Block<'ast>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Param<'ast> {
    pub ty: TypeExpr<'ast>,
    pub name: Ident<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructDecl<'ast> {
    pub name: Ident<'ast>,
    pub fields: &'ast [FieldDecl<'ast>],
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDecl<'ast> {
    pub ty: TypeExpr<'ast>,
    pub name: Ident<'ast>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnumDecl<'ast> {
    pub name: Ident<'ast>,
    pub members: &'ast [EnumMember<'ast>],
    pub span: Span,
}

/// `NAME` or `NAME = constant-expression`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnumMember<'ast> {
    pub name: Ident<'ast>,
    pub value: Option<&'ast Expr<'ast>>,
    pub span: Span,
}

/// `typedef T Name;`, at file or block scope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypedefDecl<'ast> {
    pub name: Ident<'ast>,
    pub ty: TypeExpr<'ast>,
    pub span: Span,
}
