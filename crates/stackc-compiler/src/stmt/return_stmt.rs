//! Return statement compilation.

use stackc_ast::ReturnStmt;
use stackc_core::CompilationError;

use crate::bytecode::Instruction;

use super::{Result, StmtCompiler};

impl StmtCompiler<'_> {
    /// Compile a return statement.
    ///
    /// The value is converted to the function's return type. A void
    /// function returns with `ReturnVoid` and takes no value.
    pub fn compile_return(&mut self, ret: &ReturnStmt<'_>) -> Result<()> {
        let return_type = self
            .scope
            .return_type()
            .cloned()
            .ok_or_else(|| CompilationError::internal("return outside a function"))?;

        match (ret.value, return_type.is_void()) {
            (None, true) => self.emit(Instruction::ReturnVoid),
            (Some(value), true) => Err(CompilationError::TypeMismatch {
                message: "void function cannot return a value".to_string(),
                span: value.span(),
            }),
            (None, false) => Err(CompilationError::TypeMismatch {
                message: format!(
                    "function returning '{}' must return a value",
                    self.scope.describe(&return_type)
                ),
                span: ret.span,
            }),
            (Some(value), false) => {
                self.expr_compiler().check(value, &return_type)?;
                self.emit(Instruction::Return)
            }
        }
    }
}
