//! stackc - code generation for a small C-like language on a stack VM.
//!
//! The parser lives elsewhere; this crate takes its syntax tree and
//! produces an [`Executable`]: a constant pool, a data segment for the
//! globals, and one bytecode function per definition.
//!
//! ```ignore
//! use stackc::prelude::*;
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena);
//! let unit = b.unit(&[b.function(b.int_ty(), "main", &[], b.block(&[b.ret(Some(b.int(0)))]))]);
//! let executable = stackc::compile(&unit)?;
//! println!("{executable}");
//! ```

pub use stackc_ast as ast;
pub use stackc_compiler as compiler;

pub use stackc_compiler::{
    CompiledFunction, Compiler, CompilerOptions, Constant, ConstantPool, Executable, GlobalVar,
    Instruction, LocalInfo, Signature,
};
pub use stackc_core::{
    CompilationError, Diagnostics, EnumId, FunctionId, PrimitiveKind, Span, StructId,
    TargetMachine, Type,
};

// Re-export main types
pub mod prelude {
    pub use bumpalo::Bump;
    pub use stackc_ast::{AstBuilder, BinaryOp, PostfixOp, TranslationUnit, UnaryOp};
    pub use stackc_compiler::{
        ArithOp, CmpOp, Compiler, CompilerOptions, Executable, Instruction,
    };
    pub use stackc_core::{CompilationError, Diagnostics, TargetMachine, Type};
}

/// Compile `unit` with the default options.
pub fn compile(unit: &stackc_ast::TranslationUnit<'_>) -> Result<Executable, Diagnostics> {
    Compiler::default().compile(unit)
}
