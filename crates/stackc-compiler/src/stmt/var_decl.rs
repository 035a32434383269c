//! Local variable initialization.
//!
//! Storage for a block's locals is laid out when the block is entered; a
//! declaration statement only emits its initializers, at the point the
//! statement executes.

use stackc_ast::VarDeclStmt;
use stackc_core::CompilationError;

use crate::bytecode::Instruction;
use crate::scope::Storage;

use super::{Result, StmtCompiler};

impl StmtCompiler<'_> {
    /// Compile the initializers of a declaration.
    ///
    /// ```text
    /// AddrLocal(offset)
    /// [init as declared type]
    /// Store(width)
    /// Pop
    /// ```
    pub fn compile_var_decl(&mut self, decl: &VarDeclStmt<'_>) -> Result<()> {
        for var in decl.vars {
            let Some(init) = var.init else {
                continue;
            };
            // Declarations that could not be laid out were reported when the
            // block was collected; a local hidden behind a parameter of the
            // same name was reported by the function node on block entry.
            let Some(symbol) = self.scope.resolve_variable(var.name.name, None) else {
                continue;
            };
            let Storage::Local(offset) = symbol.storage else {
                continue;
            };

            if symbol.ty.struct_id().is_some() {
                return Err(CompilationError::InvalidOperation {
                    message: format!(
                        "'{}' has type '{}', which cannot be initialized from a value",
                        var.name.name,
                        self.scope.describe(&symbol.ty)
                    ),
                    span: var.span,
                });
            }
            let width = self.scope.width_of(&symbol.ty).ok_or_else(|| {
                CompilationError::internal(format!("local '{}' has no width", var.name.name))
            })?;

            self.emit(Instruction::AddrLocal(offset))?;
            self.expr_compiler().check(init, &symbol.ty)?;
            self.emit(Instruction::Store(width))?;
            self.emit(Instruction::Pop)?;
        }
        Ok(())
    }
}
