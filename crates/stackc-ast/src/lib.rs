//! Syntax tree for the stackc C subset.
//!
//! Nodes are arena-allocated (`bumpalo`) and `Copy`; the lifetime `'ast`
//! ties every node to the arena it lives in. Parsing is out of scope for
//! this crate: producers build trees through [`AstBuilder`].

mod builder;
mod decl;
mod expr;
mod ops;
mod stmt;
mod types;

pub use builder::AstBuilder;
pub use decl::{
    EnumDecl, EnumMember, FieldDecl, FunctionDecl, Item, Param, StructDecl, TranslationUnit,
    TypedefDecl,
};
pub use expr::{
    AssignExpr, BinaryExpr, CallExpr, CastExpr, Expr, IndexExpr, LiteralExpr, LiteralKind,
    MemberExpr, MethodCallExpr, PostfixExpr, SizeOfExpr, TernaryExpr, UnaryExpr,
};
pub use ops::{BinaryOp, PostfixOp, UnaryOp};
pub use stmt::{
    Block, BreakStmt, ContinueStmt, DoWhileStmt, ExprStmt, ForInit, ForStmt, IfStmt, ReturnStmt,
    Stmt, SwitchCase, SwitchStmt, VarDeclStmt, VarDeclarator, WhileStmt,
};
pub use types::{Ident, TypeExpr};

pub use stackc_core::{PrimitiveKind, Span};
