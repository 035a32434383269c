//! Arena-backed construction helpers.
//!
//! [`AstBuilder`] is how a producer (the parser, or a test) assembles nodes
//! without spelling out every struct literal. Every node gets a point span
//! on the builder's current line; [`AstBuilder::at_line`] moves it.

use std::cell::Cell;

use bumpalo::Bump;
use stackc_core::{PrimitiveKind, Span};

use crate::{
    AssignExpr, BinaryExpr, BinaryOp, Block, BreakStmt, CallExpr, CastExpr, ContinueStmt,
    DoWhileStmt, EnumDecl, EnumMember, Expr, ExprStmt, FieldDecl, ForInit, ForStmt, FunctionDecl,
    Ident, IfStmt, IndexExpr, Item, LiteralExpr, LiteralKind, MemberExpr, MethodCallExpr, Param,
    PostfixExpr, PostfixOp, ReturnStmt, SizeOfExpr, Stmt, StructDecl, SwitchCase, SwitchStmt,
    TernaryExpr, TranslationUnit, TypeExpr, TypedefDecl, UnaryExpr, UnaryOp, VarDeclStmt,
    VarDeclarator, WhileStmt,
};

/// Builds AST nodes in a bump arena.
pub struct AstBuilder<'ast> {
    arena: &'ast Bump,
    line: Cell<u32>,
}

impl<'ast> AstBuilder<'ast> {
    pub fn new(arena: &'ast Bump) -> Self {
        Self {
            arena,
            line: Cell::new(1),
        }
    }

    /// Place subsequently built nodes on `line`.
    pub fn at_line(&self, line: u32) -> &Self {
        self.line.set(line);
        self
    }

    pub fn arena(&self) -> &'ast Bump {
        self.arena
    }

    fn span(&self) -> Span {
        Span::point(self.line.get(), 1)
    }

    fn expr(&self, expr: Expr<'ast>) -> &'ast Expr<'ast> {
        self.arena.alloc(expr)
    }

    pub fn ident(&self, name: &str) -> Ident<'ast> {
        Ident::new(self.arena.alloc_str(name), self.span())
    }

    // =========================================================================
    // Types
    // =========================================================================

    pub fn prim(&self, kind: PrimitiveKind) -> TypeExpr<'ast> {
        TypeExpr::Primitive(kind, self.span())
    }

    pub fn int_ty(&self) -> TypeExpr<'ast> {
        self.prim(PrimitiveKind::Int)
    }

    pub fn void_ty(&self) -> TypeExpr<'ast> {
        self.prim(PrimitiveKind::Void)
    }

    pub fn char_ty(&self) -> TypeExpr<'ast> {
        self.prim(PrimitiveKind::Char)
    }

    pub fn double_ty(&self) -> TypeExpr<'ast> {
        self.prim(PrimitiveKind::Double)
    }

    pub fn named_ty(&self, name: &str) -> TypeExpr<'ast> {
        TypeExpr::Named(self.ident(name))
    }

    pub fn struct_ty(&self, tag: &str) -> TypeExpr<'ast> {
        TypeExpr::Struct(self.ident(tag))
    }

    pub fn enum_ty(&self, tag: &str) -> TypeExpr<'ast> {
        TypeExpr::Enum(self.ident(tag))
    }

    pub fn ptr(&self, inner: TypeExpr<'ast>) -> TypeExpr<'ast> {
        TypeExpr::Pointer(self.arena.alloc(inner), self.span())
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn literal(&self, kind: LiteralKind<'ast>) -> &'ast Expr<'ast> {
        self.expr(Expr::Literal(LiteralExpr {
            kind,
            span: self.span(),
        }))
    }

    pub fn int(&self, value: i64) -> &'ast Expr<'ast> {
        self.literal(LiteralKind::Int(value))
    }

    pub fn chr(&self, value: u8) -> &'ast Expr<'ast> {
        self.literal(LiteralKind::Char(value))
    }

    pub fn float(&self, value: f64) -> &'ast Expr<'ast> {
        self.literal(LiteralKind::Float(value))
    }

    pub fn string(&self, value: &str) -> &'ast Expr<'ast> {
        let bytes = self.arena.alloc_slice_copy(value.as_bytes());
        self.literal(LiteralKind::String(bytes))
    }

    pub fn var(&self, name: &str) -> &'ast Expr<'ast> {
        self.expr(Expr::Ident(self.ident(name)))
    }

    pub fn binary(
        &self,
        op: BinaryOp,
        left: &'ast Expr<'ast>,
        right: &'ast Expr<'ast>,
    ) -> &'ast Expr<'ast> {
        let span = self.span();
        self.expr(Expr::Binary(self.arena.alloc(BinaryExpr {
            op,
            left,
            right,
            span,
        })))
    }

    pub fn unary(&self, op: UnaryOp, operand: &'ast Expr<'ast>) -> &'ast Expr<'ast> {
        let span = self.span();
        self.expr(Expr::Unary(self.arena.alloc(UnaryExpr { op, operand, span })))
    }

    pub fn postfix(&self, op: PostfixOp, operand: &'ast Expr<'ast>) -> &'ast Expr<'ast> {
        let span = self.span();
        self.expr(Expr::Postfix(
            self.arena.alloc(PostfixExpr { op, operand, span }),
        ))
    }

    pub fn assign(&self, target: &'ast Expr<'ast>, value: &'ast Expr<'ast>) -> &'ast Expr<'ast> {
        self.assign_op(None, target, value)
    }

    /// `target op= value`
    pub fn compound(
        &self,
        op: BinaryOp,
        target: &'ast Expr<'ast>,
        value: &'ast Expr<'ast>,
    ) -> &'ast Expr<'ast> {
        self.assign_op(Some(op), target, value)
    }

    fn assign_op(
        &self,
        op: Option<BinaryOp>,
        target: &'ast Expr<'ast>,
        value: &'ast Expr<'ast>,
    ) -> &'ast Expr<'ast> {
        let span = self.span();
        self.expr(Expr::Assign(self.arena.alloc(AssignExpr {
            op,
            target,
            value,
            span,
        })))
    }

    pub fn ternary(
        &self,
        condition: &'ast Expr<'ast>,
        then_expr: &'ast Expr<'ast>,
        else_expr: &'ast Expr<'ast>,
    ) -> &'ast Expr<'ast> {
        let span = self.span();
        self.expr(Expr::Ternary(self.arena.alloc(TernaryExpr {
            condition,
            then_expr,
            else_expr,
            span,
        })))
    }

    pub fn call(&self, callee: &str, args: &[&'ast Expr<'ast>]) -> &'ast Expr<'ast> {
        let callee = self.ident(callee);
        let args = self.arena.alloc_slice_copy(args);
        let span = self.span();
        self.expr(Expr::Call(self.arena.alloc(CallExpr { callee, args, span })))
    }

    /// `receiver.method(args)`
    pub fn method_call(
        &self,
        receiver: &'ast Expr<'ast>,
        method: &str,
        args: &[&'ast Expr<'ast>],
    ) -> &'ast Expr<'ast> {
        self.method_call_with(receiver, false, method, args)
    }

    /// `receiver->method(args)`
    pub fn arrow_call(
        &self,
        receiver: &'ast Expr<'ast>,
        method: &str,
        args: &[&'ast Expr<'ast>],
    ) -> &'ast Expr<'ast> {
        self.method_call_with(receiver, true, method, args)
    }

    fn method_call_with(
        &self,
        receiver: &'ast Expr<'ast>,
        arrow: bool,
        method: &str,
        args: &[&'ast Expr<'ast>],
    ) -> &'ast Expr<'ast> {
        let method = self.ident(method);
        let args = self.arena.alloc_slice_copy(args);
        let span = self.span();
        self.expr(Expr::MethodCall(self.arena.alloc(MethodCallExpr {
            receiver,
            arrow,
            method,
            args,
            span,
        })))
    }

    /// `base.field`
    pub fn member(&self, base: &'ast Expr<'ast>, field: &str) -> &'ast Expr<'ast> {
        self.member_with(base, false, field)
    }

    /// `base->field`
    pub fn arrow(&self, base: &'ast Expr<'ast>, field: &str) -> &'ast Expr<'ast> {
        self.member_with(base, true, field)
    }

    fn member_with(&self, base: &'ast Expr<'ast>, arrow: bool, field: &str) -> &'ast Expr<'ast> {
        let field = self.ident(field);
        let span = self.span();
        self.expr(Expr::Member(self.arena.alloc(MemberExpr {
            base,
            arrow,
            field,
            span,
        })))
    }

    pub fn index(&self, base: &'ast Expr<'ast>, index: &'ast Expr<'ast>) -> &'ast Expr<'ast> {
        let span = self.span();
        self.expr(Expr::Index(self.arena.alloc(IndexExpr { base, index, span })))
    }

    pub fn cast(&self, ty: TypeExpr<'ast>, expr: &'ast Expr<'ast>) -> &'ast Expr<'ast> {
        let span = self.span();
        self.expr(Expr::Cast(self.arena.alloc(CastExpr { ty, expr, span })))
    }

    pub fn size_of(&self, ty: TypeExpr<'ast>) -> &'ast Expr<'ast> {
        let span = self.span();
        self.expr(Expr::SizeOf(self.arena.alloc(SizeOfExpr { ty, span })))
    }

    // =========================================================================
    // Statements
    // =========================================================================

    pub fn expr_stmt(&self, expr: &'ast Expr<'ast>) -> Stmt<'ast> {
        Stmt::Expr(ExprStmt {
            expr,
            span: self.span(),
        })
    }

    /// `ty name = init;`
    pub fn decl(
        &self,
        ty: TypeExpr<'ast>,
        name: &str,
        init: Option<&'ast Expr<'ast>>,
    ) -> Stmt<'ast> {
        Stmt::VarDecl(self.var_decl(ty, &[(name, init)]))
    }

    /// `ty a = x, b, ...;`
    pub fn decl_many(
        &self,
        ty: TypeExpr<'ast>,
        vars: &[(&str, Option<&'ast Expr<'ast>>)],
    ) -> Stmt<'ast> {
        Stmt::VarDecl(self.var_decl(ty, vars))
    }

    pub fn var_decl(
        &self,
        ty: TypeExpr<'ast>,
        vars: &[(&str, Option<&'ast Expr<'ast>>)],
    ) -> VarDeclStmt<'ast> {
        let declarators: Vec<VarDeclarator<'ast>> = vars
            .iter()
            .map(|(name, init)| VarDeclarator {
                name: self.ident(name),
                init: *init,
                span: self.span(),
            })
            .collect();
        VarDeclStmt {
            ty,
            vars: self.arena.alloc_slice_copy(&declarators),
            span: self.span(),
        }
    }

    pub fn typedef_stmt(&self, name: &str, ty: TypeExpr<'ast>) -> Stmt<'ast> {
        Stmt::Typedef(self.typedef_decl(name, ty))
    }

    fn typedef_decl(&self, name: &str, ty: TypeExpr<'ast>) -> TypedefDecl<'ast> {
        TypedefDecl {
            name: self.ident(name),
            ty,
            span: self.span(),
        }
    }

    pub fn ret(&self, value: Option<&'ast Expr<'ast>>) -> Stmt<'ast> {
        Stmt::Return(ReturnStmt {
            value,
            span: self.span(),
        })
    }

    pub fn brk(&self) -> Stmt<'ast> {
        Stmt::Break(BreakStmt { span: self.span() })
    }

    pub fn cont(&self) -> Stmt<'ast> {
        Stmt::Continue(ContinueStmt { span: self.span() })
    }

    pub fn block(&self, stmts: &[Stmt<'ast>]) -> Block<'ast> {
        Block {
            stmts: self.arena.alloc_slice_copy(stmts),
            span: self.span(),
        }
    }

    pub fn block_stmt(&self, stmts: &[Stmt<'ast>]) -> Stmt<'ast> {
        Stmt::Block(self.block(stmts))
    }

    pub fn if_(
        &self,
        condition: &'ast Expr<'ast>,
        then_branch: Stmt<'ast>,
        else_branch: Option<Stmt<'ast>>,
    ) -> Stmt<'ast> {
        let then_branch = self.arena.alloc(then_branch);
        let else_branch = else_branch.map(|s| &*self.arena.alloc(s));
        Stmt::If(self.arena.alloc(IfStmt {
            condition,
            then_branch,
            else_branch,
            span: self.span(),
        }))
    }

    pub fn while_(&self, condition: &'ast Expr<'ast>, body: Stmt<'ast>) -> Stmt<'ast> {
        let body = self.arena.alloc(body);
        Stmt::While(self.arena.alloc(WhileStmt {
            condition,
            body,
            span: self.span(),
        }))
    }

    pub fn do_while(&self, body: Stmt<'ast>, condition: &'ast Expr<'ast>) -> Stmt<'ast> {
        let body = self.arena.alloc(body);
        Stmt::DoWhile(self.arena.alloc(DoWhileStmt {
            body,
            condition,
            span: self.span(),
        }))
    }

    pub fn for_(
        &self,
        init: Option<ForInit<'ast>>,
        condition: Option<&'ast Expr<'ast>>,
        update: Option<&'ast Expr<'ast>>,
        body: Stmt<'ast>,
    ) -> Stmt<'ast> {
        let body = self.arena.alloc(body);
        Stmt::For(self.arena.alloc(ForStmt {
            init,
            condition,
            update,
            body,
            span: self.span(),
        }))
    }

    /// `for (ty name = init; ...)`
    pub fn for_decl(
        &self,
        ty: TypeExpr<'ast>,
        name: &str,
        init: Option<&'ast Expr<'ast>>,
    ) -> ForInit<'ast> {
        ForInit::VarDecl(self.var_decl(ty, &[(name, init)]))
    }

    pub fn switch(&self, scrutinee: &'ast Expr<'ast>, cases: &[SwitchCase<'ast>]) -> Stmt<'ast> {
        Stmt::Switch(self.arena.alloc(SwitchStmt {
            scrutinee,
            cases: self.arena.alloc_slice_copy(cases),
            span: self.span(),
        }))
    }

    /// `case value:` followed by `stmts`; `None` builds `default:`.
    pub fn case(&self, value: Option<&'ast Expr<'ast>>, stmts: &[Stmt<'ast>]) -> SwitchCase<'ast> {
        SwitchCase {
            value,
            stmts: self.arena.alloc_slice_copy(stmts),
            span: self.span(),
        }
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn params(&self, params: &[(TypeExpr<'ast>, &str)]) -> &'ast [Param<'ast>] {
        let params: Vec<Param<'ast>> = params
            .iter()
            .map(|(ty, name)| Param {
                ty: *ty,
                name: self.ident(name),
                span: self.span(),
            })
            .collect();
        self.arena.alloc_slice_copy(&params)
    }

    fn function_decl(
        &self,
        owner: Option<&str>,
        return_type: TypeExpr<'ast>,
        name: &str,
        params: &[(TypeExpr<'ast>, &str)],
        body: Option<Block<'ast>>,
    ) -> Item<'ast> {
        Item::Function(self.arena.alloc(FunctionDecl {
            name: self.ident(name),
            owner: owner.map(|o| self.ident(o)),
            return_type,
            params: self.params(params),
            body,
            span: self.span(),
        }))
    }

    pub fn function(
        &self,
        return_type: TypeExpr<'ast>,
        name: &str,
        params: &[(TypeExpr<'ast>, &str)],
        body: Block<'ast>,
    ) -> Item<'ast> {
        self.function_decl(None, return_type, name, params, Some(body))
    }

    pub fn prototype(
        &self,
        return_type: TypeExpr<'ast>,
        name: &str,
        params: &[(TypeExpr<'ast>, &str)],
    ) -> Item<'ast> {
        self.function_decl(None, return_type, name, params, None)
    }

    /// `return_type Owner::name(params) body`
    pub fn method(
        &self,
        owner: &str,
        return_type: TypeExpr<'ast>,
        name: &str,
        params: &[(TypeExpr<'ast>, &str)],
        body: Block<'ast>,
    ) -> Item<'ast> {
        self.function_decl(Some(owner), return_type, name, params, Some(body))
    }

    pub fn struct_decl(&self, name: &str, fields: &[(TypeExpr<'ast>, &str)]) -> Item<'ast> {
        let fields: Vec<FieldDecl<'ast>> = fields
            .iter()
            .map(|(ty, field)| FieldDecl {
                ty: *ty,
                name: self.ident(field),
                span: self.span(),
            })
            .collect();
        Item::Struct(self.arena.alloc(StructDecl {
            name: self.ident(name),
            fields: self.arena.alloc_slice_copy(&fields),
            span: self.span(),
        }))
    }

    pub fn enum_decl(&self, name: &str, members: &[(&str, Option<&'ast Expr<'ast>>)]) -> Item<'ast> {
        let members: Vec<EnumMember<'ast>> = members
            .iter()
            .map(|(member, value)| EnumMember {
                name: self.ident(member),
                value: *value,
                span: self.span(),
            })
            .collect();
        Item::Enum(self.arena.alloc(EnumDecl {
            name: self.ident(name),
            members: self.arena.alloc_slice_copy(&members),
            span: self.span(),
        }))
    }

    pub fn typedef(&self, name: &str, ty: TypeExpr<'ast>) -> Item<'ast> {
        Item::Typedef(self.typedef_decl(name, ty))
    }

    pub fn global(
        &self,
        ty: TypeExpr<'ast>,
        name: &str,
        init: Option<&'ast Expr<'ast>>,
    ) -> Item<'ast> {
        Item::Global(self.var_decl(ty, &[(name, init)]))
    }

    pub fn unit(&self, items: &[Item<'ast>]) -> TranslationUnit<'ast> {
        TranslationUnit::new(self.arena.alloc_slice_copy(items), Span::point(1, 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nodes_take_current_line() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let first = b.var("x");
        let second = b.at_line(7).var("y");
        assert_eq!(first.span().line, 1);
        assert_eq!(second.span().line, 7);
    }

    #[test]
    fn builds_nested_function() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let body = b.block(&[
            b.decl(b.int_ty(), "y", Some(b.int(1))),
            b.ret(Some(b.binary(BinaryOp::Add, b.var("x"), b.var("y")))),
        ]);
        let unit = b.unit(&[b.function(b.int_ty(), "f", &[(b.int_ty(), "x")], body)]);

        let f = unit.functions().next().unwrap();
        assert_eq!(f.name.name, "f");
        assert_eq!(f.params.len(), 1);
        assert_eq!(f.body.unwrap().stmts.len(), 2);
        assert!(f.owner.is_none());
    }

    #[test]
    fn zero_literal_detection() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        assert!(b.int(0).is_zero_literal());
        assert!(!b.int(1).is_zero_literal());
        assert!(!b.chr(0).is_zero_literal());
    }
}
