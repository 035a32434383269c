//! Assignment and compound assignment.
//!
//! ```text
//! x = v:   [address x]  [v as T]  Store
//! x op= v: [address x]  Dup  Load  [v]  [op]  [result as T]  Store
//! ```
//!
//! `Store` leaves the stored value behind, so assignments are expressions.

use stackc_ast::AssignExpr;
use stackc_core::Type;

use crate::bytecode::Instruction;
use crate::types::find_conversion;

use super::binary::{Operand, apply_binary};
use super::{ExprCompiler, Result};

pub(super) fn compile_assign(compiler: &mut ExprCompiler<'_>, assign: &AssignExpr<'_>) -> Result<Type> {
    let target = compiler.address(assign.target)?;
    let width = compiler.value_width(&target, assign.span)?;

    match assign.op {
        None => compiler.check(assign.value, &target)?,
        Some(op) => {
            compiler.emit(Instruction::Dup)?;
            compiler.emit(Instruction::Load(width))?;
            let value = compiler.infer(assign.value)?;
            let result = apply_binary(
                compiler,
                op,
                Operand {
                    ty: &target,
                    null_constant: false,
                },
                Operand {
                    ty: &value,
                    null_constant: assign.value.is_zero_literal(),
                },
                assign.span,
            )?;
            // Narrowing back to the target is implied, as for a cast.
            let conversion = find_conversion(&result, &target, true, false).ok_or_else(|| {
                compiler.mismatch(
                    format!(
                        "cannot assign '{}' to '{}'",
                        compiler.scope.describe(&result),
                        compiler.scope.describe(&target)
                    ),
                    assign.span,
                )
            })?;
            compiler.emit_conversion(conversion, 0, assign.span)?;
        }
    }

    compiler.emit(Instruction::Store(width))?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::compile_in_function;
    use super::*;
    use crate::bytecode::ArithOp;
    use bumpalo::Bump;
    use stackc_ast::{AstBuilder, BinaryOp};
    use stackc_core::CompilationError;

    #[test]
    fn plain_assignment_converts_value() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let (code, _) = compile_in_function(|scope| {
            let ty = ExprCompiler::new(scope)
                .infer(b.assign(b.var("d"), b.var("i")))
                .unwrap();
            assert_eq!(ty, Type::DOUBLE);
        });
        assert_eq!(
            code,
            vec![
                Instruction::AddrParam(1),
                Instruction::LoadLocal {
                    offset: 0,
                    width: 4
                },
                Instruction::IntToFloat(0),
                Instruction::Store(8),
            ]
        );
    }

    #[test]
    fn compound_assignment_narrows_back() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let (code, _) = compile_in_function(|scope| {
            ExprCompiler::new(scope)
                .infer(b.compound(BinaryOp::Mul, b.var("i"), b.var("d")))
                .unwrap();
        });
        assert_eq!(
            code,
            vec![
                Instruction::AddrLocal(0),
                Instruction::Dup,
                Instruction::Load(4),
                Instruction::LoadParam(1),
                Instruction::IntToFloat(1),
                Instruction::FloatBinary(ArithOp::Mul),
                Instruction::FloatToInt(0),
                Instruction::Store(4),
            ]
        );
    }

    #[test]
    fn pointer_plus_equals_scales() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let (code, _) = compile_in_function(|scope| {
            ExprCompiler::new(scope)
                .infer(b.compound(BinaryOp::Add, b.var("s"), b.int(3)))
                .unwrap();
        });
        assert_eq!(&code[4..], &[Instruction::PtrAdd(1), Instruction::Store(8)]);
    }

    #[test]
    fn assigning_to_a_call_is_rejected() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        compile_in_function(|scope| {
            let err = ExprCompiler::new(scope)
                .infer(b.assign(b.call("f", &[]), b.int(1)))
                .unwrap_err();
            assert!(matches!(err, CompilationError::InvalidOperation { .. }));
        });
    }
}
