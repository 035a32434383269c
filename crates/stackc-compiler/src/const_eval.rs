//! Integer constant expressions.
//!
//! Used for enum member values, `case` labels and global initializers.
//! Names resolve through the resolver chain, so an enum-injection node
//! makes the enum's own members visible. Arithmetic wraps at 64 bits.

use stackc_ast::{BinaryOp, Expr, LiteralKind, UnaryOp};
use stackc_core::{CompilationError, Span, Type};

use crate::scope::{Resolver, Storage};
use crate::types::resolve_type;

type Result<T> = std::result::Result<T, CompilationError>;

/// Evaluate `expr` as an integer constant.
pub fn eval_int(scope: &dyn Resolver, expr: &Expr<'_>) -> Result<i64> {
    let span = expr.span();
    match expr {
        Expr::Literal(lit) => match lit.kind {
            LiteralKind::Int(value) => Ok(value),
            LiteralKind::Char(value) => Ok(i64::from(value)),
            LiteralKind::Float(_) | LiteralKind::String(_) => {
                Err(CompilationError::NotConstant { span })
            }
        },

        Expr::Ident(ident) => match scope.resolve_variable(ident.name, None) {
            Some(symbol) => match symbol.storage {
                Storage::EnumConstant(value) => Ok(value),
                _ => Err(CompilationError::NotConstant { span }),
            },
            None => Err(CompilationError::UnresolvedIdentifier {
                name: ident.name.to_string(),
                span: ident.span,
            }),
        },

        Expr::Unary(unary) => {
            let value = eval_int(scope, unary.operand)?;
            match unary.op {
                UnaryOp::Neg => Ok(value.wrapping_neg()),
                UnaryOp::Not => Ok(i64::from(value == 0)),
                UnaryOp::BitNot => Ok(!value),
                _ => Err(CompilationError::NotConstant { span }),
            }
        }

        Expr::Binary(binary) => {
            let left = eval_int(scope, binary.left)?;
            // Short-circuit like the generated code would.
            match binary.op {
                BinaryOp::LogicalAnd if left == 0 => return Ok(0),
                BinaryOp::LogicalOr if left != 0 => return Ok(1),
                _ => {}
            }
            let right = eval_int(scope, binary.right)?;
            apply_binary(binary.op, left, right, span)
        }

        Expr::Ternary(ternary) => {
            if eval_int(scope, ternary.condition)? != 0 {
                eval_int(scope, ternary.then_expr)
            } else {
                eval_int(scope, ternary.else_expr)
            }
        }

        Expr::Cast(cast) => {
            let target = resolve_type(scope, &cast.ty)?;
            if !target.is_integer() {
                return Err(CompilationError::NotConstant { span });
            }
            let value = eval_int(scope, cast.expr)?;
            let width = scope.width_of(&target).unwrap_or(8);
            Ok(truncate(value, width))
        }

        Expr::SizeOf(size_of) => {
            let ty = resolve_type(scope, &size_of.ty)?;
            size_of_type(scope, &ty, span).map(i64::from)
        }

        _ => Err(CompilationError::NotConstant { span }),
    }
}

/// Evaluate `expr` as a floating-point constant.
///
/// Accepts float literals, negated float constants, and anything
/// [`eval_int`] accepts.
pub fn eval_float(scope: &dyn Resolver, expr: &Expr<'_>) -> Result<f64> {
    match expr {
        Expr::Literal(lit) => match lit.kind {
            LiteralKind::Float(value) => Ok(value),
            _ => eval_int(scope, expr).map(|value| value as f64),
        },
        Expr::Unary(unary) if unary.op == UnaryOp::Neg => {
            eval_float(scope, unary.operand).map(|value| -value)
        }
        _ => eval_int(scope, expr).map(|value| value as f64),
    }
}

/// Width of `ty` for `sizeof`.
pub(crate) fn size_of_type(scope: &dyn Resolver, ty: &Type, span: Span) -> Result<u32> {
    if ty.is_void() {
        return Err(CompilationError::InvalidOperation {
            message: "sizeof applied to void".to_string(),
            span,
        });
    }
    scope
        .width_of(ty)
        .ok_or_else(|| CompilationError::IncompleteType {
            name: scope.describe(ty),
            span,
        })
}

fn apply_binary(op: BinaryOp, left: i64, right: i64, span: Span) -> Result<i64> {
    let invalid = |message: &str| CompilationError::InvalidOperation {
        message: message.to_string(),
        span,
    };
    Ok(match op {
        BinaryOp::Add => left.wrapping_add(right),
        BinaryOp::Sub => left.wrapping_sub(right),
        BinaryOp::Mul => left.wrapping_mul(right),
        BinaryOp::Div | BinaryOp::Rem if right == 0 => {
            return Err(invalid("division by zero in constant expression"));
        }
        BinaryOp::Div => left.wrapping_div(right),
        BinaryOp::Rem => left.wrapping_rem(right),
        BinaryOp::BitAnd => left & right,
        BinaryOp::BitOr => left | right,
        BinaryOp::BitXor => left ^ right,
        BinaryOp::Shl | BinaryOp::Shr if !(0..64).contains(&right) => {
            return Err(invalid("shift amount out of range in constant expression"));
        }
        BinaryOp::Shl => left.wrapping_shl(right as u32),
        BinaryOp::Shr => left.wrapping_shr(right as u32),
        BinaryOp::Eq => i64::from(left == right),
        BinaryOp::Ne => i64::from(left != right),
        BinaryOp::Lt => i64::from(left < right),
        BinaryOp::Le => i64::from(left <= right),
        BinaryOp::Gt => i64::from(left > right),
        BinaryOp::Ge => i64::from(left >= right),
        BinaryOp::LogicalAnd => i64::from(left != 0 && right != 0),
        BinaryOp::LogicalOr => i64::from(left != 0 || right != 0),
    })
}

/// Wrap `value` to a signed integer of `width` bytes.
pub(crate) fn truncate(value: i64, width: u32) -> i64 {
    match width {
        1 => i64::from(value as i8),
        2 => i64::from(value as i16),
        4 => i64::from(value as i32),
        _ => value,
    }
}
