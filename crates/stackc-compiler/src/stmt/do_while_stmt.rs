//! Do-while loop compilation.

use stackc_ast::DoWhileStmt;

use crate::bytecode::Instruction;
use crate::scope::LoopScope;

use super::{Result, StmtCompiler};

impl StmtCompiler<'_> {
    /// Compile a do-while loop. The body runs at least once; `continue`
    /// jumps to the condition.
    ///
    /// Bytecode layout:
    /// ```text
    /// start:
    /// [body]
    /// next:
    /// [condition]
    /// JumpIfTrue -> start
    /// exit:
    /// ```
    pub fn compile_do_while(&mut self, do_while: &DoWhileStmt<'_>) -> Result<()> {
        let start = self.scope.define_label()?;
        let next = self.scope.define_label()?;
        let exit = self.scope.define_label()?;

        self.scope.bind_label(start)?;
        {
            let mut looped = LoopScope::new(&mut *self.scope, exit, Some(next));
            StmtCompiler::new(&mut looped).compile_body(do_while.body)?;
        }

        self.scope.bind_label(next)?;
        self.expr_compiler().condition(do_while.condition)?;
        self.emit(Instruction::JumpIfTrue(start))?;
        self.scope.bind_label(exit)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::compile_body;
    use super::*;
    use bumpalo::Bump;
    use stackc_ast::AstBuilder;

    #[test]
    fn continue_targets_the_condition() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let outcome = compile_body(&[
            b.do_while(b.block_stmt(&[b.cont(), b.brk()]), b.var("x")),
            b.ret(Some(b.int(0))),
        ]);
        let function = outcome.function.unwrap();
        let code = &function.code;
        let (Instruction::Jump(cont), Instruction::Jump(brk), Instruction::JumpIfTrue(again)) =
            (code[0], code[1], code[3])
        else {
            panic!("unexpected layout: {code:?}");
        };
        assert_eq!(function.jump_target(cont), Some(2));
        assert_eq!(function.jump_target(again), Some(0));
        assert_eq!(function.jump_target(brk), Some(4));
    }
}
