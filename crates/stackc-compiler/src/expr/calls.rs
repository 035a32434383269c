//! Function and method calls.
//!
//! Arguments are pushed left to right and then converted in place to the
//! selected overload's parameter types, so argument `i` of `n` sits at
//! depth `n - 1 - i` when it is converted.
//!
//! ```text
//! f(a, b):    [a]  [b]  [conversions]  Call f, 2
//! r.m(a):     [address r]  [a]  [conversions]  CallMethod m, 1
//! p->m(a):    [p]  [a]  [conversions]  CallMethod m, 1
//! ```

use stackc_ast::{CallExpr, Expr, MethodCallExpr};
use stackc_core::{CompilationError, FunctionId, Span, StructId, Type};

use crate::bytecode::Instruction;
use crate::scope::Storage;

use super::{ExprCompiler, Result};

pub(super) fn compile_call(compiler: &mut ExprCompiler<'_>, call: &CallExpr<'_>) -> Result<Type> {
    let name = call.callee.name;
    match compiler.scope.resolve_variable(name, None) {
        Some(symbol) if matches!(symbol.storage, Storage::Function(_)) => {}
        Some(_) => {
            return Err(CompilationError::InvalidOperation {
                message: format!("'{name}' is not a function"),
                span: call.callee.span,
            });
        }
        None => {
            return Err(CompilationError::UnresolvedIdentifier {
                name: name.to_string(),
                span: call.callee.span,
            });
        }
    }

    let hints = push_args(compiler, call.args)?;
    let function = match compiler.scope.resolve_variable(name, Some(&hints)) {
        Some(symbol) => match symbol.storage {
            Storage::Function(id) => id,
            _ => return Err(CompilationError::internal("overload resolved to a non-function")),
        },
        None => return Err(no_overload(compiler, name, &hints, call.span)),
    };

    let return_type = convert_args(compiler, function, call.args, &hints)?;
    compiler.emit(Instruction::Call {
        function,
        argc: call.args.len() as u32,
    })?;
    Ok(return_type)
}

pub(super) fn compile_method_call(
    compiler: &mut ExprCompiler<'_>,
    call: &MethodCallExpr<'_>,
) -> Result<Type> {
    let owner = receiver_owner(compiler, call)?;
    let name = call.method.name;

    let hints = push_args(compiler, call.args)?;
    let Some(function) = compiler.scope.resolve_method(owner, name, Some(&hints)) else {
        if compiler.scope.resolve_method(owner, name, None).is_some() {
            return Err(no_overload(compiler, name, &hints, call.span));
        }
        let struct_name = compiler.scope.describe(&Type::Struct(owner));
        return Err(CompilationError::InvalidOperation {
            message: format!("{struct_name} has no method '{name}'"),
            span: call.method.span,
        });
    };

    let return_type = convert_args(compiler, function, call.args, &hints)?;
    compiler.emit(Instruction::CallMethod {
        function,
        argc: call.args.len() as u32,
    })?;
    Ok(return_type)
}

/// Push the receiver pointer and return the struct it points at.
fn receiver_owner(compiler: &mut ExprCompiler<'_>, call: &MethodCallExpr<'_>) -> Result<StructId> {
    let (ty, owner) = if call.arrow {
        let ty = compiler.infer(call.receiver)?;
        let owner = ty.pointee().and_then(Type::struct_id);
        (ty, owner)
    } else {
        let ty = compiler.address(call.receiver)?;
        let owner = ty.struct_id();
        (ty, owner)
    };

    owner.ok_or_else(|| {
        let operator = if call.arrow { "->" } else { "." };
        compiler.mismatch(
            format!(
                "method call through '{operator}' on '{}'",
                compiler.scope.describe(&ty)
            ),
            call.span,
        )
    })
}

fn push_args(compiler: &mut ExprCompiler<'_>, args: &[&Expr<'_>]) -> Result<Vec<Type>> {
    args.iter().map(|arg| compiler.infer(arg)).collect()
}

/// Convert the pushed arguments to the parameter types of `function` and
/// return its return type.
fn convert_args(
    compiler: &mut ExprCompiler<'_>,
    function: FunctionId,
    args: &[&Expr<'_>],
    arg_types: &[Type],
) -> Result<Type> {
    let signature = compiler
        .scope
        .function_signature(function)
        .cloned()
        .ok_or_else(|| CompilationError::internal(format!("no signature for {function}")))?;

    let argc = args.len();
    for (i, ((arg, ty), param)) in args.iter().zip(arg_types).zip(&signature.params).enumerate() {
        compiler.convert(ty, &param.ty, arg.is_zero_literal(), argc - 1 - i, arg.span())?;
    }
    Ok(signature.return_type)
}

fn no_overload(compiler: &ExprCompiler<'_>, name: &str, args: &[Type], span: Span) -> CompilationError {
    let args = args
        .iter()
        .map(|ty| compiler.scope.describe(ty))
        .collect::<Vec<_>>()
        .join(", ");
    CompilationError::NoMatchingOverload {
        name: name.to_string(),
        args,
        span,
    }
}
