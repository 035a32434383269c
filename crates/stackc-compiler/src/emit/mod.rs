//! Instruction emitter for one function.
//!
//! The [`Emitter`] owns a function's append-only instruction stream, the
//! source line of every instruction, and the function's [`LabelTable`].
//! It is held by the function node of the resolver chain; every nested
//! block or loop node forwards emission requests to it.
//!
//! # Example
//!
//! ```ignore
//! let mut emitter = Emitter::new();
//! let exit = emitter.define_label();
//! emitter.emit(Instruction::JumpIfFalse(exit));
//! emitter.emit(Instruction::PushInt(1));
//! emitter.bind_label(exit)?;
//! let code = emitter.finish()?;
//! ```

mod labels;

use stackc_core::CompilationError;

use crate::bytecode::Instruction;

pub use labels::{Label, LabelTable};

/// The finished output of an [`Emitter`].
#[derive(Debug, Clone, PartialEq)]
pub struct EmittedCode {
    pub code: Vec<Instruction>,
    /// Source line of each instruction.
    pub lines: Vec<u32>,
    /// Bound index of each label, indexed by label id.
    pub labels: Vec<usize>,
}

/// Appends instructions and manages labels for a single function.
#[derive(Debug)]
pub struct Emitter {
    code: Vec<Instruction>,
    lines: Vec<u32>,
    labels: LabelTable,
    current_line: u32,
}

impl Emitter {
    pub fn new() -> Self {
        Self {
            code: Vec::new(),
            lines: Vec::new(),
            labels: LabelTable::new(),
            current_line: 1,
        }
    }

    /// Associate subsequent instructions with a source line.
    pub fn set_line(&mut self, line: u32) {
        self.current_line = line;
    }

    pub fn current_line(&self) -> u32 {
        self.current_line
    }

    /// Append an instruction and return its index.
    pub fn emit(&mut self, instruction: Instruction) -> usize {
        let index = self.code.len();
        self.code.push(instruction);
        self.lines.push(self.current_line);
        index
    }

    /// Index the next emitted instruction will occupy.
    pub fn current_offset(&self) -> usize {
        self.code.len()
    }

    pub fn define_label(&mut self) -> Label {
        let label = self.labels.define();
        tracing::trace!(%label, "define label");
        label
    }

    /// Bind `label` to the current end of the instruction stream.
    pub fn bind_label(&mut self, label: Label) -> Result<(), CompilationError> {
        let index = self.code.len();
        self.labels.bind(label, index)?;
        tracing::trace!(%label, index, "bind label");
        Ok(())
    }

    pub fn label_target(&self, label: Label) -> Option<usize> {
        self.labels.target(label)
    }

    pub fn code(&self) -> &[Instruction] {
        &self.code
    }

    /// Consume the emitter, requiring every label to be bound.
    pub fn finish(self) -> Result<EmittedCode, CompilationError> {
        // Referenced labels first, so the error names a label a branch uses.
        if let Some(label) = self
            .code
            .iter()
            .filter_map(Instruction::label)
            .find(|label| !self.labels.is_bound(*label))
        {
            return Err(CompilationError::UnboundLabel { label: label.id() });
        }

        Ok(EmittedCode {
            code: self.code,
            lines: self.lines,
            labels: self.labels.into_bound()?,
        })
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}
