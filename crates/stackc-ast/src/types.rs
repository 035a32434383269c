//! Identifiers and type expressions.

use stackc_core::{PrimitiveKind, Span};

/// A name together with where it was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ident<'ast> {
    pub name: &'ast str,
    pub span: Span,
}

impl<'ast> Ident<'ast> {
    pub fn new(name: &'ast str, span: Span) -> Self {
        Self { name, span }
    }
}

/// A type as written in source.
///
/// Resolution of names (typedefs, struct and enum tags) happens in the
/// compiler through the resolver chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeExpr<'ast> {
    /// `int`, `double`, `void`, ...
    Primitive(PrimitiveKind, Span),
    /// A bare name: a typedef, or a tag used without its keyword.
    Named(Ident<'ast>),
    /// `struct Tag`
    Struct(Ident<'ast>),
    /// `enum Tag`
    Enum(Ident<'ast>),
    /// `T*`
    Pointer(&'ast TypeExpr<'ast>, Span),
}

impl<'ast> TypeExpr<'ast> {
    pub fn primitive(kind: PrimitiveKind, span: Span) -> Self {
        TypeExpr::Primitive(kind, span)
    }

    pub fn span(&self) -> Span {
        match self {
            TypeExpr::Primitive(_, span) | TypeExpr::Pointer(_, span) => *span,
            TypeExpr::Named(ident) | TypeExpr::Struct(ident) | TypeExpr::Enum(ident) => ident.span,
        }
    }
}
