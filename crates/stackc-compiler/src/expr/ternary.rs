//! Conditional expressions.

use stackc_ast::TernaryExpr;
use stackc_core::Type;

use crate::bytecode::Instruction;
use crate::types::{Conversion, find_conversion};

use super::{ExprCompiler, Result};

/// `c ? a : b`.
///
/// Arithmetic arms meet at their common type, as for a binary operator. A
/// pointer arm fixes the result type, and the other arm must convert to it
/// (the literal `0` included). Each arm is converted on its own path:
///
/// ```text
/// [c]  JumpIfFalse -> else
/// [a]  Jump -> join
/// else: [b] [b as result]
///       Jump -> end              (only when a needs converting)
/// join: [a as result]
/// end:
/// ```
pub(super) fn compile_ternary(
    compiler: &mut ExprCompiler<'_>,
    ternary: &TernaryExpr<'_>,
) -> Result<Type> {
    let else_label = compiler.define_label()?;
    let join = compiler.define_label()?;

    compiler.condition(ternary.condition)?;
    compiler.emit(Instruction::JumpIfFalse(else_label))?;
    let then_ty = compiler.infer(ternary.then_expr)?;
    compiler.emit(Instruction::Jump(join))?;

    compiler.bind_label(else_label)?;
    let else_ty = compiler.infer(ternary.else_expr)?;
    let ty = result_type(&then_ty, &else_ty);
    compiler.convert(
        &else_ty,
        &ty,
        ternary.else_expr.is_zero_literal(),
        0,
        ternary.else_expr.span(),
    )?;

    let then_null = ternary.then_expr.is_zero_literal();
    match find_conversion(&then_ty, &ty, false, then_null) {
        Some(Conversion::Identity) => compiler.bind_label(join)?,
        _ => {
            let end = compiler.define_label()?;
            compiler.emit(Instruction::Jump(end))?;
            compiler.bind_label(join)?;
            compiler.convert(&then_ty, &ty, then_null, 0, ternary.then_expr.span())?;
            compiler.bind_label(end)?;
        }
    }
    Ok(ty)
}

fn result_type(then_ty: &Type, else_ty: &Type) -> Type {
    if let Some(common) = then_ty.common_arithmetic(else_ty) {
        return common;
    }
    if !then_ty.is_pointer() && else_ty.is_pointer() {
        return else_ty.clone();
    }
    then_ty.clone()
}
