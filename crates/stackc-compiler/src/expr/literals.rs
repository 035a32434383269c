//! Literal compilation.
//!
//! Integers and characters are immediates. Floats and string data go
//! through the constant pool, which deduplicates them program-wide.

use stackc_ast::{LiteralExpr, LiteralKind};
use stackc_core::Type;

use crate::bytecode::{Constant, Instruction};

use super::{ExprCompiler, Result};

pub(super) fn compile_literal(compiler: &mut ExprCompiler<'_>, lit: &LiteralExpr<'_>) -> Result<Type> {
    match lit.kind {
        LiteralKind::Int(value) => {
            compiler.emit(Instruction::PushInt(value))?;
            // Literals that do not fit an int are long.
            Ok(if i32::try_from(value).is_ok() {
                Type::INT
            } else {
                Type::LONG
            })
        }
        LiteralKind::Char(value) => {
            compiler.emit(Instruction::PushInt(i64::from(value)))?;
            Ok(Type::CHAR)
        }
        LiteralKind::Float(value) => {
            let slot = compiler.scope.intern(Constant::float(value))?;
            compiler.emit(Instruction::PushConst(slot))?;
            Ok(Type::DOUBLE)
        }
        LiteralKind::String(bytes) => {
            let slot = compiler.scope.intern(Constant::string(bytes))?;
            compiler.emit(Instruction::PushConst(slot))?;
            Ok(Type::CHAR.pointer_to())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::compile_in_function;
    use super::*;
    use bumpalo::Bump;
    use stackc_ast::AstBuilder;

    #[test]
    fn integer_literal_types() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        compile_in_function(|scope| {
            let mut compiler = ExprCompiler::new(scope);
            assert_eq!(compiler.infer(b.int(7)), Ok(Type::INT));
            assert_eq!(compiler.infer(b.int(1 << 40)), Ok(Type::LONG));
            assert_eq!(compiler.infer(b.chr(b'a')), Ok(Type::CHAR));
        });
    }

    #[test]
    fn identical_strings_share_a_slot() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let (code, program) = compile_in_function(|scope| {
            let mut compiler = ExprCompiler::new(scope);
            assert_eq!(compiler.infer(b.string("hi")), Ok(Type::CHAR.pointer_to()));
            compiler.infer(b.float(2.5)).unwrap();
            compiler.infer(b.string("hi")).unwrap();
        });
        assert_eq!(
            code,
            vec![
                Instruction::PushConst(0),
                Instruction::PushConst(1),
                Instruction::PushConst(0),
            ]
        );
        assert_eq!(program.constants().len(), 2);
        assert_eq!(
            program.constants().get(0),
            Some(&Constant::StringData(b"hi\0".to_vec()))
        );
    }
}
