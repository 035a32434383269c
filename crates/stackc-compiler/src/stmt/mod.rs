//! Statement compiler.
//!
//! The [`StmtCompiler`] lowers statements through the innermost node of the
//! resolver chain. Constructs that open a lexical scope push a node for the
//! duration of their body:
//! - blocks enter a [`BlockScope`](crate::scope::BlockScope) with the
//!   locals collected from their direct declarations
//! - loops push a [`LoopScope`](crate::scope::LoopScope) with break and
//!   continue targets
//! - `switch` pushes a break-only `LoopScope`
//!
//! User errors are reported per statement and compilation carries on with
//! the next one. Internal errors abort the function.
//!
//! # Example
//!
//! ```ignore
//! let mut compiler = StmtCompiler::new(&mut function_scope);
//! compiler.compile_block(&body)?;
//! ```

mod block;
mod do_while_stmt;
mod for_stmt;
mod if_stmt;
mod return_stmt;
mod switch_stmt;
mod var_decl;
mod while_stmt;

use stackc_ast::{BreakStmt, ContinueStmt, ExprStmt, Stmt};
use stackc_core::CompilationError;

use crate::bytecode::Instruction;
use crate::expr::ExprCompiler;
use crate::scope::Resolver;

pub(crate) use block::FrameCollector;

type Result<T> = std::result::Result<T, CompilationError>;

/// Compiles statements against a resolver chain.
pub struct StmtCompiler<'a> {
    scope: &'a mut dyn Resolver,
}

impl<'a> StmtCompiler<'a> {
    pub fn new(scope: &'a mut dyn Resolver) -> Self {
        Self { scope }
    }

    /// Compile one statement.
    pub fn compile(&mut self, stmt: &Stmt<'_>) -> Result<()> {
        self.scope.set_line(stmt.span().line);

        match stmt {
            Stmt::Expr(expr_stmt) => self.compile_expr_stmt(expr_stmt),
            Stmt::VarDecl(var_decl) => self.compile_var_decl(var_decl),
            // Collected on block entry; nothing to emit.
            Stmt::Typedef(_) => Ok(()),
            Stmt::Return(ret) => self.compile_return(ret),
            Stmt::Break(brk) => self.compile_break(brk),
            Stmt::Continue(cont) => self.compile_continue(cont),
            Stmt::Block(block) => self.compile_block(block),
            Stmt::If(if_stmt) => self.compile_if(if_stmt),
            Stmt::While(while_stmt) => self.compile_while(while_stmt),
            Stmt::DoWhile(do_while) => self.compile_do_while(do_while),
            Stmt::For(for_stmt) => self.compile_for(for_stmt),
            Stmt::Switch(switch) => self.compile_switch(switch),
        }
    }

    /// Compile a statement sequence, reporting user errors as they occur.
    ///
    /// Returns early only on an internal error.
    pub fn compile_statements(&mut self, stmts: &[Stmt<'_>]) -> Result<()> {
        for stmt in stmts {
            if let Err(error) = self.compile(stmt) {
                if error.is_internal() {
                    return Err(error);
                }
                self.scope.report(error);
            }
        }
        Ok(())
    }

    /// Compile the body of an `if`, loop or `for`.
    ///
    /// A declaration needs a block of its own to live in.
    fn compile_body(&mut self, body: &Stmt<'_>) -> Result<()> {
        if matches!(body, Stmt::VarDecl(_) | Stmt::Typedef(_)) {
            return Err(CompilationError::InvalidOperation {
                message: "a declaration cannot be the body of a control statement; use a block"
                    .to_string(),
                span: body.span(),
            });
        }
        self.compile_statements(std::slice::from_ref(body))
    }

    fn compile_expr_stmt(&mut self, expr_stmt: &ExprStmt<'_>) -> Result<()> {
        self.expr_compiler().discard(expr_stmt.expr)
    }

    fn compile_break(&mut self, brk: &BreakStmt) -> Result<()> {
        let label = self
            .scope
            .break_label()
            .ok_or(CompilationError::InvalidBreakOrContinue {
                keyword: "break",
                span: brk.span,
            })?;
        self.emit(Instruction::Jump(label))
    }

    fn compile_continue(&mut self, cont: &ContinueStmt) -> Result<()> {
        let label = self
            .scope
            .continue_label()
            .ok_or(CompilationError::InvalidBreakOrContinue {
                keyword: "continue",
                span: cont.span,
            })?;
        self.emit(Instruction::Jump(label))
    }

    fn expr_compiler(&mut self) -> ExprCompiler<'_> {
        ExprCompiler::new(&mut *self.scope)
    }

    fn emit(&mut self, instruction: Instruction) -> Result<()> {
        self.scope.emit(instruction).map(|_| ())
    }

    fn report_all(&mut self, errors: Vec<CompilationError>) {
        for error in errors {
            self.scope.report(error);
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! A function scope to compile statement lists in.

    use stackc_ast::{Block, Stmt};
    use stackc_core::{CompilationError, Span, TargetMachine, Type};

    use crate::bytecode::Instruction;
    use crate::executable::{CompiledFunction, Signature};
    use crate::scope::{FunctionScope, ProgramScope, UnitScope};

    use super::StmtCompiler;

    pub struct Outcome {
        /// The sealed function, when no errors were reported.
        pub function: Option<CompiledFunction>,
        pub code: Vec<Instruction>,
        pub errors: Vec<CompilationError>,
    }

    /// Compile `stmts` as the body of `int f(int x)`.
    pub fn compile_body(stmts: &[Stmt<'_>]) -> Outcome {
        compile_body_with(|_| {}, Type::INT, stmts)
    }

    /// Compile `stmts` as the body of `ret f(int x)`, after `setup` has made
    /// its file-scope declarations.
    pub fn compile_body_with(
        setup: impl FnOnce(&mut UnitScope<'_>),
        ret: Type,
        stmts: &[Stmt<'_>],
    ) -> Outcome {
        let mut program = ProgramScope::new(TargetMachine::LP64);
        let (code, function) = {
            let mut unit = UnitScope::new(&mut program);
            setup(&mut unit);
            let signature = Signature::new("f", ret, Span::default()).with_param("x", Type::INT);
            let mut function = FunctionScope::new(&mut unit, signature);
            let body = Block {
                stmts,
                span: Span::default(),
            };
            StmtCompiler::new(&mut function).compile_block(&body).unwrap();
            let code = function.emitter().code().to_vec();
            let sealed = (!function.has_errors()).then(|| function.finish().unwrap());
            (code, sealed)
        };
        Outcome {
            function,
            code,
            errors: program.diagnostics().iter().cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::compile_body;
    use super::*;
    use bumpalo::Bump;
    use stackc_ast::AstBuilder;

    #[test]
    fn expression_statements_pop_their_value() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let outcome = compile_body(&[b.expr_stmt(b.var("x"))]);
        assert_eq!(outcome.code, vec![Instruction::LoadParam(0), Instruction::Pop]);
    }

    #[test]
    fn errors_are_reported_and_compilation_continues() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let outcome = compile_body(&[
            b.expr_stmt(b.var("missing")),
            b.brk(),
            b.expr_stmt(b.var("x")),
        ]);
        assert_eq!(outcome.errors.len(), 2);
        assert!(matches!(
            outcome.errors[0],
            CompilationError::UnresolvedIdentifier { .. }
        ));
        assert!(matches!(
            outcome.errors[1],
            CompilationError::InvalidBreakOrContinue {
                keyword: "break",
                ..
            }
        ));
        assert!(outcome.function.is_none());
        assert_eq!(
            &outcome.code[outcome.code.len() - 2..],
            &[Instruction::LoadParam(0), Instruction::Pop]
        );
    }

    #[test]
    fn continue_outside_loop_is_rejected() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let outcome = compile_body(&[b.cont()]);
        assert!(matches!(
            outcome.errors.as_slice(),
            [CompilationError::InvalidBreakOrContinue {
                keyword: "continue",
                ..
            }]
        ));
    }

    #[test]
    fn declaration_as_if_body_is_rejected() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let outcome = compile_body(&[b.if_(
            b.var("x"),
            b.decl(b.int_ty(), "y", Some(b.int(1))),
            None,
        )]);
        assert!(matches!(
            outcome.errors.as_slice(),
            [CompilationError::InvalidOperation { .. }]
        ));
    }
}
