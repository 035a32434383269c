//! While loop compilation.

use stackc_ast::WhileStmt;

use crate::bytecode::Instruction;
use crate::scope::LoopScope;

use super::{Result, StmtCompiler};

impl StmtCompiler<'_> {
    /// Compile a while loop.
    ///
    /// `break` leaves through `exit`; `continue` re-tests the condition.
    ///
    /// Bytecode layout:
    /// ```text
    /// start:
    /// [condition]
    /// JumpIfFalse -> exit
    /// [body]
    /// Jump -> start
    /// exit:
    /// ```
    pub fn compile_while(&mut self, while_stmt: &WhileStmt<'_>) -> Result<()> {
        let start = self.scope.define_label()?;
        let exit = self.scope.define_label()?;

        self.scope.bind_label(start)?;
        self.expr_compiler().condition(while_stmt.condition)?;
        self.emit(Instruction::JumpIfFalse(exit))?;

        {
            let mut looped = LoopScope::new(&mut *self.scope, exit, Some(start));
            StmtCompiler::new(&mut looped).compile_body(while_stmt.body)?;
        }

        self.emit(Instruction::Jump(start))?;
        self.scope.bind_label(exit)
    }
}
