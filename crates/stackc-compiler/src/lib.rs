//! stackc compiler
//!
//! Scope resolution and code generation for a C-like language targeting a
//! stack VM.
//!
//! ## Architecture
//!
//! - **Registration**: declare struct layouts, enums, typedefs, globals and
//!   function signatures of the whole translation unit
//! - **Compilation**: lower each function body to bytecode through a chain
//!   of resolver nodes (program, translation unit, function, blocks, loops)
//!
//! ## Modules
//!
//! - [`bytecode`]: instruction set and constant pool
//! - [`const_eval`]: integer constant expressions
//! - [`emit`]: instruction buffer with symbolic labels
//! - [`executable`]: the compiled artifact handed to the VM
//! - [`expr`]: expression compiler
//! - [`function_compiler`]: one function body from signature to sealed code
//! - [`options`]: compiler configuration
//! - [`passes`]: the registration pass
//! - [`returns`]: return path analysis
//! - [`scope`]: the resolver chain
//! - [`stmt`]: statement compiler
//! - [`types`]: struct and enum tables, type resolution and conversions

pub mod bytecode;
pub mod const_eval;
pub mod emit;
pub mod executable;
pub mod expr;
pub mod function_compiler;
pub mod options;
pub mod passes;
pub mod returns;
pub mod scope;
pub mod stmt;
pub mod types;

pub use bytecode::{ArithOp, CmpOp, Constant, ConstantPool, Instruction};
pub use emit::{Emitter, Label};
pub use executable::{CompiledFunction, Executable, GlobalVar, LocalInfo, ParamInfo, Signature};
pub use expr::ExprCompiler;
pub use function_compiler::FunctionCompiler;
pub use options::CompilerOptions;
pub use passes::{PendingFunction, RegistrationOutput, RegistrationPass};
pub use scope::{Resolver, Storage, StorageClass, Symbol};
pub use stmt::StmtCompiler;

// Re-export the shared vocabulary for convenience
pub use stackc_core::{CompilationError, Diagnostics, TargetMachine, Type};

use stackc_ast::TranslationUnit;

use crate::scope::{ProgramScope, UnitScope};

/// The main compiler entry point.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompilerOptions,
}

impl Compiler {
    pub fn new(options: CompilerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Compile one translation unit into an executable.
    ///
    /// Every diagnostic reported along the way is returned on failure, in
    /// the order it was found.
    pub fn compile(&self, translation_unit: &TranslationUnit<'_>) -> Result<Executable, Diagnostics> {
        let mut program = ProgramScope::new(self.options.target);
        {
            let mut unit = UnitScope::new(&mut program);
            let output = RegistrationPass::new(&mut unit).run(translation_unit);

            for pending in output.pending {
                if self.options.error_limit_reached(unit.error_count()) {
                    tracing::warn!(
                        errors = unit.error_count(),
                        "error limit reached; remaining functions skipped"
                    );
                    break;
                }
                let id = pending.id;
                match FunctionCompiler::new(&mut unit, pending).compile() {
                    Ok(Some(function)) => {
                        if let Err(error) = unit.program_mut().install(id, function) {
                            unit.report(error);
                        }
                    }
                    Ok(None) => {}
                    Err(error) => {
                        tracing::error!(%error, "function abandoned");
                        unit.report(error);
                    }
                }
            }
        }
        program.finish(&self.options)
    }
}
