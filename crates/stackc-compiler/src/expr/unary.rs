//! Prefix and postfix operators.

use stackc_ast::{Expr, PostfixExpr, PostfixOp, UnaryExpr, UnaryOp};
use stackc_core::{CompilationError, Span, Type};

use crate::bytecode::{ArithOp, Constant, Instruction};

use super::{ExprCompiler, Result};

pub(super) fn compile_unary(compiler: &mut ExprCompiler<'_>, unary: &UnaryExpr<'_>) -> Result<Type> {
    let span = unary.span;
    match unary.op {
        UnaryOp::Neg => {
            let ty = compiler.infer(unary.operand)?;
            let Some(promoted) = ty.common_arithmetic(&ty) else {
                return Err(bad_operand(compiler, unary.op, &ty, span));
            };
            compiler.emit(if promoted.is_floating() {
                Instruction::FloatNeg
            } else {
                Instruction::Neg
            })?;
            Ok(promoted)
        }
        UnaryOp::Not => {
            compiler.condition(unary.operand)?;
            compiler.emit(Instruction::Not)?;
            Ok(Type::INT)
        }
        UnaryOp::BitNot => {
            let ty = compiler.infer(unary.operand)?;
            if !ty.is_integer() {
                return Err(bad_operand(compiler, unary.op, &ty, span));
            }
            compiler.emit(Instruction::BitNot)?;
            Ok(ty.common_arithmetic(&ty).unwrap_or(Type::INT))
        }
        UnaryOp::Deref => {
            let pointee = address_of_deref(compiler, unary.operand, span)?;
            let width = compiler.value_width(&pointee, span)?;
            compiler.emit(Instruction::Load(width))?;
            Ok(pointee)
        }
        UnaryOp::AddrOf => Ok(compiler.address(unary.operand)?.pointer_to()),
        UnaryOp::PreInc => step_in_place(compiler, unary.operand, ArithOp::Add, false, span),
        UnaryOp::PreDec => step_in_place(compiler, unary.operand, ArithOp::Sub, false, span),
    }
}

pub(super) fn compile_postfix(
    compiler: &mut ExprCompiler<'_>,
    postfix: &PostfixExpr<'_>,
) -> Result<Type> {
    let op = match postfix.op {
        PostfixOp::Inc => ArithOp::Add,
        PostfixOp::Dec => ArithOp::Sub,
    };
    step_in_place(compiler, postfix.operand, op, true, postfix.span)
}

/// Push the pointer value of `operand`; the pointee is the lvalue's type.
pub(super) fn address_of_deref(
    compiler: &mut ExprCompiler<'_>,
    operand: &Expr<'_>,
    span: Span,
) -> Result<Type> {
    let ty = compiler.infer(operand)?;
    match ty.pointee() {
        Some(pointee) => Ok(pointee.clone()),
        None => Err(bad_operand(compiler, UnaryOp::Deref, &ty, span)),
    }
}

/// `++x` / `--x`, and the postfix forms when `postfix` is set.
///
/// ```text
/// [address]  Dup  Load  [step]  Store      -> new value
/// postfix:   [reverse step]                -> old value
/// ```
fn step_in_place(
    compiler: &mut ExprCompiler<'_>,
    operand: &Expr<'_>,
    op: ArithOp,
    postfix: bool,
    span: Span,
) -> Result<Type> {
    let ty = compiler.address(operand)?;
    let width = compiler.value_width(&ty, span)?;
    if !ty.is_scalar() {
        return Err(compiler.mismatch(
            format!("cannot increment or decrement '{}'", compiler.scope.describe(&ty)),
            span,
        ));
    }

    compiler.emit(Instruction::Dup)?;
    compiler.emit(Instruction::Load(width))?;
    emit_step(compiler, &ty, op, span)?;
    compiler.emit(Instruction::Store(width))?;
    if postfix {
        let reverse = match op {
            ArithOp::Add => ArithOp::Sub,
            _ => ArithOp::Add,
        };
        emit_step(compiler, &ty, reverse, span)?;
    }
    Ok(ty)
}

/// Add or subtract one unit of `ty` from the value on top of the stack.
fn emit_step(compiler: &mut ExprCompiler<'_>, ty: &Type, op: ArithOp, span: Span) -> Result<()> {
    if ty.is_pointer() {
        let scale = compiler.pointee_width(ty, span)?;
        let delta = if op == ArithOp::Add { 1 } else { -1 };
        compiler.emit(Instruction::PushInt(delta))?;
        compiler.emit(Instruction::PtrAdd(scale))
    } else if ty.is_floating() {
        let one = compiler.scope.intern(Constant::float(1.0))?;
        compiler.emit(Instruction::PushConst(one))?;
        compiler.emit(Instruction::FloatBinary(op))
    } else {
        compiler.emit(Instruction::PushInt(1))?;
        compiler.emit(Instruction::Binary(op))
    }
}

fn bad_operand(compiler: &ExprCompiler<'_>, op: UnaryOp, ty: &Type, span: Span) -> CompilationError {
    compiler.mismatch(
        format!(
            "invalid operand to unary '{op}': '{}'",
            compiler.scope.describe(ty)
        ),
        span,
    )
}
