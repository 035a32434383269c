//! For loop compilation.
//!
//! A declaration in the initializer lives in a block of its own that
//! wraps the whole loop.

use stackc_ast::{ForInit, ForStmt};

use crate::bytecode::Instruction;
use crate::scope::{BlockFrame, BlockScope, LoopScope};

use super::{FrameCollector, Result, StmtCompiler};

impl StmtCompiler<'_> {
    /// Compile a for loop.
    ///
    /// Bytecode layout:
    /// ```text
    /// [init]
    /// start:
    /// [condition]          (omitted when absent)
    /// JumpIfFalse -> exit
    /// [body]
    /// next:
    /// [update]
    /// Jump -> start
    /// exit:
    /// ```
    pub fn compile_for(&mut self, for_stmt: &ForStmt<'_>) -> Result<()> {
        let frame = match &for_stmt.init {
            Some(ForInit::VarDecl(decl)) => {
                let (frame, errors) = {
                    let mut collector = FrameCollector::new(&*self.scope);
                    collector.add_var_decl(decl);
                    collector.finish()
                };
                self.report_all(errors);
                frame
            }
            _ => BlockFrame::new(),
        };

        let mut block = BlockScope::enter(&mut *self.scope, frame)?;
        let result = StmtCompiler::new(&mut block).compile_for_loop(for_stmt);
        block.exit()?;
        result
    }

    fn compile_for_loop(&mut self, for_stmt: &ForStmt<'_>) -> Result<()> {
        match &for_stmt.init {
            Some(ForInit::VarDecl(decl)) => self.compile_var_decl(decl)?,
            Some(ForInit::Expr(expr)) => self.expr_compiler().discard(expr)?,
            None => {}
        }

        let start = self.scope.define_label()?;
        let next = self.scope.define_label()?;
        let exit = self.scope.define_label()?;

        self.scope.bind_label(start)?;
        if let Some(condition) = for_stmt.condition {
            self.expr_compiler().condition(condition)?;
            self.emit(Instruction::JumpIfFalse(exit))?;
        }

        {
            let mut looped = LoopScope::new(&mut *self.scope, exit, Some(next));
            StmtCompiler::new(&mut looped).compile_body(for_stmt.body)?;
        }

        self.scope.bind_label(next)?;
        if let Some(update) = for_stmt.update {
            self.expr_compiler().discard(update)?;
        }
        self.emit(Instruction::Jump(start))?;
        self.scope.bind_label(exit)
    }
}
