//! If statement compilation.

use stackc_ast::IfStmt;

use crate::bytecode::Instruction;

use super::{Result, StmtCompiler};

impl StmtCompiler<'_> {
    /// Compile an if/else statement.
    ///
    /// Bytecode layout:
    /// ```text
    /// [condition]
    /// JumpIfFalse -> else
    /// [then]
    /// Jump -> end         (only with an else branch)
    /// else:
    /// [else]
    /// end:
    /// ```
    pub fn compile_if(&mut self, if_stmt: &IfStmt<'_>) -> Result<()> {
        let else_label = self.scope.define_label()?;

        self.expr_compiler().condition(if_stmt.condition)?;
        self.emit(Instruction::JumpIfFalse(else_label))?;
        self.compile_body(if_stmt.then_branch)?;

        match if_stmt.else_branch {
            Some(else_branch) => {
                let end = self.scope.define_label()?;
                self.emit(Instruction::Jump(end))?;
                self.scope.bind_label(else_label)?;
                self.compile_body(else_branch)?;
                self.scope.bind_label(end)
            }
            None => self.scope.bind_label(else_label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::compile_body;
    use super::*;
    use bumpalo::Bump;
    use stackc_ast::AstBuilder;

    #[test]
    fn if_without_else_falls_through() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let outcome = compile_body(&[
            b.if_(b.var("x"), b.ret(Some(b.int(1))), None),
            b.ret(Some(b.int(0))),
        ]);
        let function = outcome.function.unwrap();
        let Instruction::JumpIfFalse(skip) = function.code[1] else {
            panic!("expected a conditional branch, got {:?}", function.code[1]);
        };
        assert_eq!(function.jump_target(skip), Some(4));
        assert_eq!(function.code[4], Instruction::PushInt(0));
    }

    #[test]
    fn else_branch_is_skipped_after_then() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let outcome = compile_body(&[
            b.if_(
                b.var("x"),
                b.expr_stmt(b.int(1)),
                Some(b.expr_stmt(b.int(2))),
            ),
            b.ret(Some(b.int(0))),
        ]);
        let function = outcome.function.unwrap();
        // LoadParam, JumpIfFalse, PushInt 1, Pop, Jump, PushInt 2, Pop, ...
        let (Instruction::JumpIfFalse(else_label), Instruction::Jump(end)) =
            (function.code[1], function.code[4])
        else {
            panic!("unexpected layout: {:?}", function.code);
        };
        assert_eq!(function.jump_target(else_label), Some(5));
        assert_eq!(function.jump_target(end), Some(7));
    }
}
