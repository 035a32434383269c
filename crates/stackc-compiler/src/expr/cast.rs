//! Casts and `sizeof`.

use stackc_ast::{CastExpr, SizeOfExpr};
use stackc_core::Type;

use crate::bytecode::Instruction;
use crate::const_eval::size_of_type;
use crate::types::{find_conversion, resolve_type};

use super::{ExprCompiler, Result};

/// `(T)e`. Casting to `void` evaluates `e` and drops the value.
pub(super) fn compile_cast(compiler: &mut ExprCompiler<'_>, cast: &CastExpr<'_>) -> Result<Type> {
    let target = resolve_type(&*compiler.scope, &cast.ty)?;
    if target.is_void() {
        compiler.discard(cast.expr)?;
        return Ok(target);
    }

    let from = compiler.infer(cast.expr)?;
    let Some(conversion) = find_conversion(&from, &target, true, false) else {
        return Err(compiler.mismatch(
            format!(
                "cannot cast '{}' to '{}'",
                compiler.scope.describe(&from),
                compiler.scope.describe(&target)
            ),
            cast.span,
        ));
    };
    compiler.emit_conversion(conversion, 0, cast.span)?;
    Ok(target)
}

/// `sizeof(T)` pushes the logical width of `T` as a `long`.
pub(super) fn compile_sizeof(compiler: &mut ExprCompiler<'_>, size_of: &SizeOfExpr<'_>) -> Result<Type> {
    let ty = resolve_type(&*compiler.scope, &size_of.ty)?;
    let width = size_of_type(&*compiler.scope, &ty, size_of.span)?;
    compiler.emit(Instruction::PushInt(i64::from(width)))?;
    Ok(Type::LONG)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::compile_in_function;
    use super::*;
    use bumpalo::Bump;
    use stackc_ast::AstBuilder;
    use stackc_core::{CompilationError, PrimitiveKind};

    #[test]
    fn double_to_int_truncates() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let (code, _) = compile_in_function(|scope| {
            let ty = ExprCompiler::new(scope)
                .infer(b.cast(b.int_ty(), b.var("d")))
                .unwrap();
            assert_eq!(ty, Type::INT);
        });
        assert_eq!(code, vec![Instruction::LoadParam(1), Instruction::FloatToInt(0)]);
    }

    #[test]
    fn pointer_casts_are_explicit_only() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let (code, _) = compile_in_function(|scope| {
            let mut compiler = ExprCompiler::new(scope);
            assert_eq!(
                compiler.infer(b.cast(b.ptr(b.int_ty()), b.var("s"))),
                Ok(Type::INT.pointer_to())
            );
            assert_eq!(
                compiler.infer(b.cast(b.prim(PrimitiveKind::Long), b.var("s"))),
                Ok(Type::LONG)
            );
            assert!(matches!(
                compiler.infer(b.cast(b.ptr(b.int_ty()), b.var("d"))),
                Err(CompilationError::TypeMismatch { .. })
            ));
        });
        assert_eq!(&code[..2], &[Instruction::LoadParam(2), Instruction::LoadParam(2)]);
    }

    #[test]
    fn void_cast_discards() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let (code, _) = compile_in_function(|scope| {
            let ty = ExprCompiler::new(scope)
                .infer(b.cast(b.void_ty(), b.var("x")))
                .unwrap();
            assert!(ty.is_void());
        });
        assert_eq!(code, vec![Instruction::LoadParam(0), Instruction::Pop]);
    }

    #[test]
    fn sizeof_pushes_a_long() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let (code, _) = compile_in_function(|scope| {
            let mut compiler = ExprCompiler::new(scope);
            assert_eq!(compiler.infer(b.size_of(b.double_ty())), Ok(Type::LONG));
            assert!(matches!(
                compiler.infer(b.size_of(b.struct_ty("Missing"))),
                Err(CompilationError::UnresolvedTypeName { .. })
            ));
        });
        assert_eq!(code, vec![Instruction::PushInt(8)]);
    }
}
