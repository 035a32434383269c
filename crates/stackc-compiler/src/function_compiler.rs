//! Function compiler for generating bytecode from function bodies.
//!
//! [`FunctionCompiler`] compiles one registered definition:
//!
//! - Opens a function node with the registered signature
//! - Collects the outermost block
//! - Compiles the body
//! - Reports a non-void body that can fall off its end, or appends the
//!   implicit `ReturnVoid` of a void one
//!
//! A function that reported any error is not sealed.

use stackc_core::{CompilationError, FunctionId};

use crate::bytecode::Instruction;
use crate::executable::CompiledFunction;
use crate::passes::PendingFunction;
use crate::returns::always_returns;
use crate::scope::{FunctionScope, Resolver};
use crate::stmt::{FrameCollector, StmtCompiler};

type Result<T> = std::result::Result<T, CompilationError>;

/// Compiles a single function body to bytecode.
pub struct FunctionCompiler<'a, 'ast> {
    scope: &'a mut dyn Resolver,
    id: FunctionId,
    decl: &'ast stackc_ast::FunctionDecl<'ast>,
}

impl<'a, 'ast> FunctionCompiler<'a, 'ast> {
    /// `scope` is the translation unit the function was registered in.
    pub fn new(scope: &'a mut dyn Resolver, pending: PendingFunction<'ast>) -> Self {
        Self {
            scope,
            id: pending.id,
            decl: pending.decl,
        }
    }

    /// Compile the body.
    ///
    /// Returns `Ok(None)` when user errors were reported; they are already
    /// in the diagnostic sink. An `Err` is an internal failure that
    /// abandoned the function midway.
    #[tracing::instrument(skip_all, fields(function = %self.decl.name.name, id = %self.id))]
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile(self) -> Result<Option<CompiledFunction>> {
        let Self { scope, id, decl } = self;
        let body = decl.body.ok_or_else(|| {
            CompilationError::internal(format!("'{}' has no body to compile", decl.name.name))
        })?;
        let signature = scope
            .function_signature(id)
            .cloned()
            .ok_or_else(|| CompilationError::internal(format!("unknown function {id}")))?;

        let mut function = FunctionScope::new(scope, signature);
        let (frame, errors) = {
            let mut collector = FrameCollector::new(&function);
            collector.collect(body.stmts);
            collector.finish()
        };
        for error in errors {
            function.report(error);
        }

        StmtCompiler::new(&mut function).compile_in_frame(frame, body.stmts)?;

        if !always_returns(body.stmts) {
            if function.signature().return_type.is_void() {
                function.emit(Instruction::ReturnVoid)?;
            } else {
                function.report(CompilationError::MissingReturn {
                    name: decl.name.name.to_string(),
                    span: decl.span,
                });
            }
        }

        if function.has_errors() {
            tracing::debug!("not sealed: errors reported");
            return Ok(None);
        }
        function.finish().map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::ArithOp;
    use crate::passes::RegistrationPass;
    use crate::scope::{ProgramScope, UnitScope};
    use bumpalo::Bump;
    use stackc_ast::{AstBuilder, BinaryOp, Item, TranslationUnit};
    use stackc_core::TargetMachine;

    struct Compiled {
        functions: Vec<Option<CompiledFunction>>,
        errors: Vec<CompilationError>,
    }

    fn compile_unit(items: &[Item<'_>]) -> Compiled {
        let tu = TranslationUnit::new(items, stackc_core::Span::default());
        let mut program = ProgramScope::new(TargetMachine::LP64);
        let functions = {
            let mut unit = UnitScope::new(&mut program);
            let output = RegistrationPass::new(&mut unit).run(&tu);
            output
                .pending
                .into_iter()
                .map(|pending| FunctionCompiler::new(&mut unit, pending).compile().unwrap())
                .collect()
        };
        Compiled {
            functions,
            errors: program.diagnostics().iter().cloned().collect(),
        }
    }

    #[test]
    fn parameters_and_locals() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let compiled = compile_unit(&[b.function(
            b.int_ty(),
            "add",
            &[(b.int_ty(), "a"), (b.int_ty(), "b")],
            b.block(&[
                b.decl(
                    b.int_ty(),
                    "t",
                    Some(b.binary(BinaryOp::Add, b.var("a"), b.var("b"))),
                ),
                b.ret(Some(b.var("t"))),
            ]),
        )]);
        assert!(compiled.errors.is_empty(), "{:?}", compiled.errors);

        let function = compiled.functions[0].as_ref().unwrap();
        assert_eq!(function.name(), "add");
        assert_eq!(function.frame_size, 4);
        assert_eq!(
            function.code,
            vec![
                Instruction::AddrLocal(0),
                Instruction::LoadParam(0),
                Instruction::LoadParam(1),
                Instruction::Binary(ArithOp::Add),
                Instruction::Store(4),
                Instruction::Pop,
                Instruction::LoadLocal {
                    offset: 0,
                    width: 4
                },
                Instruction::Return,
            ]
        );
    }

    #[test]
    fn void_function_gets_implicit_return() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let compiled = compile_unit(&[
            b.function(b.void_ty(), "noop", &[], b.block(&[])),
            b.function(b.void_ty(), "early", &[], b.block(&[b.ret(None)])),
        ]);
        assert!(compiled.errors.is_empty(), "{:?}", compiled.errors);
        assert_eq!(
            compiled.functions[0].as_ref().unwrap().code,
            vec![Instruction::ReturnVoid]
        );
        assert_eq!(
            compiled.functions[1].as_ref().unwrap().code,
            vec![Instruction::ReturnVoid]
        );
    }

    #[test]
    fn falling_off_a_value_function_is_reported() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let compiled = compile_unit(&[b.function(
            b.int_ty(),
            "maybe",
            &[(b.int_ty(), "x")],
            b.block(&[b.if_(b.var("x"), b.ret(Some(b.int(1))), None)]),
        )]);
        assert!(compiled.functions[0].is_none());
        assert!(matches!(
            compiled.errors.as_slice(),
            [CompilationError::MissingReturn { name, .. }] if name == "maybe"
        ));
    }

    #[test]
    fn local_reusing_a_parameter_name_is_reported() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let compiled = compile_unit(&[b.function(
            b.int_ty(),
            "f",
            &[(b.int_ty(), "x")],
            b.block(&[b.decl(b.int_ty(), "x", None), b.ret(Some(b.var("x")))]),
        )]);
        assert!(compiled.functions[0].is_none());
        assert!(matches!(
            compiled.errors.as_slice(),
            [CompilationError::DuplicateLocalDeclaration { name, .. }] if name == "x"
        ));
    }

    #[test]
    fn methods_reach_fields_through_the_receiver() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let compiled = compile_unit(&[
            b.struct_decl("Counter", &[(b.int_ty(), "step"), (b.int_ty(), "n")]),
            b.method(
                "Counter",
                b.int_ty(),
                "get",
                &[],
                b.block(&[b.ret(Some(b.arrow(b.var("this"), "n")))]),
            ),
        ]);
        assert!(compiled.errors.is_empty(), "{:?}", compiled.errors);
        let function = compiled.functions[0].as_ref().unwrap();
        assert!(function.code.contains(&Instruction::AddOffset(4)));
        assert_eq!(function.code.last(), Some(&Instruction::Return));
    }

    #[test]
    fn errors_in_one_statement_do_not_hide_the_next() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let compiled = compile_unit(&[b.function(
            b.void_ty(),
            "f",
            &[],
            b.block(&[
                b.expr_stmt(b.var("missing")),
                b.brk(),
                b.expr_stmt(b.call("nowhere", &[])),
            ]),
        )]);
        assert!(compiled.functions[0].is_none());
        assert!(matches!(
            compiled.errors.as_slice(),
            [
                CompilationError::UnresolvedIdentifier { .. },
                CompilationError::InvalidBreakOrContinue { keyword: "break", .. },
                CompilationError::UnresolvedIdentifier { .. },
            ]
        ));
    }
}
