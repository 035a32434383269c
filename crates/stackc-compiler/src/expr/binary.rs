//! Binary operators.
//!
//! Arithmetic follows the usual arithmetic conversions: both operands are
//! brought to their common type, converting the integer side when the
//! other is floating. Pointer arithmetic scales by the pointee's width.

use stackc_ast::{BinaryExpr, BinaryOp};
use stackc_core::{CompilationError, Span, Type};

use crate::bytecode::{ArithOp, CmpOp, Instruction};

use super::{ExprCompiler, Result};

/// An operand already on the stack.
#[derive(Debug, Clone, Copy)]
pub(super) struct Operand<'t> {
    pub ty: &'t Type,
    /// The literal `0`, which compares with any pointer.
    pub null_constant: bool,
}

pub(super) fn compile_binary(compiler: &mut ExprCompiler<'_>, binary: &BinaryExpr<'_>) -> Result<Type> {
    if binary.op.is_logical() {
        return compile_logical(compiler, binary);
    }

    let left = compiler.infer(binary.left)?;
    let right = compiler.infer(binary.right)?;
    apply_binary(
        compiler,
        binary.op,
        Operand {
            ty: &left,
            null_constant: binary.left.is_zero_literal(),
        },
        Operand {
            ty: &right,
            null_constant: binary.right.is_zero_literal(),
        },
        binary.span,
    )
}

/// `&&` and `||` with short-circuit evaluation; the result is 0 or 1.
///
/// ```text
/// [left]  JumpIfFalse/JumpIfTrue -> short
/// [right] JumpIfFalse/JumpIfTrue -> short
/// PushInt(!short_value)  Jump -> end
/// short: PushInt(short_value)
/// end:
/// ```
fn compile_logical(compiler: &mut ExprCompiler<'_>, binary: &BinaryExpr<'_>) -> Result<Type> {
    let is_and = binary.op == BinaryOp::LogicalAnd;
    let short = compiler.define_label()?;
    let end = compiler.define_label()?;
    let branch = |label| {
        if is_and {
            Instruction::JumpIfFalse(label)
        } else {
            Instruction::JumpIfTrue(label)
        }
    };

    compiler.condition(binary.left)?;
    compiler.emit(branch(short))?;
    compiler.condition(binary.right)?;
    compiler.emit(branch(short))?;
    compiler.emit(Instruction::PushInt(i64::from(is_and)))?;
    compiler.emit(Instruction::Jump(end))?;
    compiler.bind_label(short)?;
    compiler.emit(Instruction::PushInt(i64::from(!is_and)))?;
    compiler.bind_label(end)?;
    Ok(Type::INT)
}

/// Emit `op` for two operands already on the stack, left below right.
pub(super) fn apply_binary(
    compiler: &mut ExprCompiler<'_>,
    op: BinaryOp,
    left: Operand<'_>,
    right: Operand<'_>,
    span: Span,
) -> Result<Type> {
    let (l, r) = (left.ty, right.ty);

    if l.is_pointer() || r.is_pointer() {
        return apply_pointer(compiler, op, left, right, span);
    }

    let Some(common) = l.common_arithmetic(r) else {
        return Err(invalid_operands(compiler, op, l, r, span));
    };
    let floating = common.is_floating();
    if floating && op.is_integer_only() {
        return Err(CompilationError::InvalidOperation {
            message: format!("operator '{op}' requires integer operands"),
            span,
        });
    }
    if floating {
        if l.is_integer() {
            compiler.emit(Instruction::IntToFloat(1))?;
        }
        if r.is_integer() {
            compiler.emit(Instruction::IntToFloat(0))?;
        }
    }

    if let Some(cmp) = compare_op(op) {
        compiler.emit(if floating {
            Instruction::FloatCompare(cmp)
        } else {
            Instruction::Compare(cmp)
        })?;
        return Ok(Type::INT);
    }

    let arith = arith_op(op).ok_or_else(|| CompilationError::InvalidOperation {
        message: format!("operator '{op}' cannot be used here"),
        span,
    })?;
    compiler.emit(if floating {
        Instruction::FloatBinary(arith)
    } else {
        Instruction::Binary(arith)
    })?;
    Ok(common)
}

fn apply_pointer(
    compiler: &mut ExprCompiler<'_>,
    op: BinaryOp,
    left: Operand<'_>,
    right: Operand<'_>,
    span: Span,
) -> Result<Type> {
    let (l, r) = (left.ty, right.ty);
    match op {
        BinaryOp::Add if l.is_pointer() && r.is_integer() => {
            let scale = compiler.pointee_width(l, span)?;
            compiler.emit(Instruction::PtrAdd(scale))?;
            Ok(l.clone())
        }
        BinaryOp::Add if l.is_integer() && r.is_pointer() => {
            let scale = compiler.pointee_width(r, span)?;
            compiler.emit(Instruction::Swap)?;
            compiler.emit(Instruction::PtrAdd(scale))?;
            Ok(r.clone())
        }
        BinaryOp::Sub if l.is_pointer() && r.is_integer() => {
            let scale = compiler.pointee_width(l, span)?;
            compiler.emit(Instruction::Neg)?;
            compiler.emit(Instruction::PtrAdd(scale))?;
            Ok(l.clone())
        }
        BinaryOp::Sub if l.is_pointer() && l == r => {
            let scale = compiler.pointee_width(l, span)?;
            compiler.emit(Instruction::PtrDiff(scale))?;
            Ok(Type::LONG)
        }
        _ if op.is_comparison() => {
            let comparable = match (l.is_pointer(), r.is_pointer()) {
                (true, true) => l == r || l.is_void_pointer() || r.is_void_pointer(),
                (true, false) => right.null_constant,
                (false, true) => left.null_constant,
                (false, false) => false,
            };
            if !comparable {
                return Err(invalid_operands(compiler, op, l, r, span));
            }
            let cmp = compare_op(op).ok_or_else(|| CompilationError::internal("comparison"))?;
            compiler.emit(Instruction::Compare(cmp))?;
            Ok(Type::INT)
        }
        _ => Err(invalid_operands(compiler, op, l, r, span)),
    }
}

fn invalid_operands(
    compiler: &ExprCompiler<'_>,
    op: BinaryOp,
    l: &Type,
    r: &Type,
    span: Span,
) -> CompilationError {
    compiler.mismatch(
        format!(
            "invalid operands to '{op}': '{}' and '{}'",
            compiler.scope.describe(l),
            compiler.scope.describe(r)
        ),
        span,
    )
}

pub(super) fn arith_op(op: BinaryOp) -> Option<ArithOp> {
    Some(match op {
        BinaryOp::Add => ArithOp::Add,
        BinaryOp::Sub => ArithOp::Sub,
        BinaryOp::Mul => ArithOp::Mul,
        BinaryOp::Div => ArithOp::Div,
        BinaryOp::Rem => ArithOp::Rem,
        BinaryOp::BitAnd => ArithOp::BitAnd,
        BinaryOp::BitOr => ArithOp::BitOr,
        BinaryOp::BitXor => ArithOp::BitXor,
        BinaryOp::Shl => ArithOp::Shl,
        BinaryOp::Shr => ArithOp::Shr,
        _ => return None,
    })
}

fn compare_op(op: BinaryOp) -> Option<CmpOp> {
    Some(match op {
        BinaryOp::Eq => CmpOp::Eq,
        BinaryOp::Ne => CmpOp::Ne,
        BinaryOp::Lt => CmpOp::Lt,
        BinaryOp::Le => CmpOp::Le,
        BinaryOp::Gt => CmpOp::Gt,
        BinaryOp::Ge => CmpOp::Ge,
        _ => return None,
    })
}
