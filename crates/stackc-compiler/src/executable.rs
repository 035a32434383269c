//! The compiled artifact handed to the VM.
//!
//! An [`Executable`] holds the constant pool, the data-segment layout of
//! the globals, and one [`CompiledFunction`] per function, indexed by
//! [`FunctionId`]. Every label of every function is bound; nothing in an
//! executable refers to compile-time state.

use std::fmt;

use stackc_core::{FunctionId, Span, StructId, Type};

use crate::bytecode::{Constant, ConstantPool, Instruction};
use crate::emit::Label;

/// One declared parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamInfo {
    pub name: String,
    pub ty: Type,
    /// Argument slot, numbered from 0 in declaration order.
    pub slot: i32,
}

/// A function's name, owner, parameters and return type.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub name: String,
    /// Set for instance functions, which receive a pointer to the owner.
    pub owner: Option<StructId>,
    pub params: Vec<ParamInfo>,
    pub return_type: Type,
    pub span: Span,
}

impl Signature {
    pub fn new(name: impl Into<String>, return_type: Type, span: Span) -> Self {
        Self {
            name: name.into(),
            owner: None,
            params: Vec::new(),
            return_type,
            span,
        }
    }

    pub fn with_owner(mut self, owner: StructId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Append a parameter in the next slot.
    pub fn with_param(mut self, name: impl Into<String>, ty: Type) -> Self {
        let slot = self.params.len() as i32;
        self.params.push(ParamInfo {
            name: name.into(),
            ty,
            slot,
        });
        self
    }

    pub fn is_method(&self) -> bool {
        self.owner.is_some()
    }

    /// Whether both signatures take the same parameter types.
    pub fn same_params(&self, other: &Signature) -> bool {
        self.params.len() == other.params.len()
            && self
                .params
                .iter()
                .zip(&other.params)
                .all(|(a, b)| a.ty == b.ty)
    }
}

/// A local as laid out in the frame, kept for debugging.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalInfo {
    pub name: String,
    pub ty: Type,
    pub offset: u32,
    pub width: u32,
}

/// A fully resolved function.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFunction {
    pub signature: Signature,
    /// Largest extent the active locals ever reached.
    pub frame_size: u32,
    pub code: Vec<Instruction>,
    /// Source line of each instruction.
    pub lines: Vec<u32>,
    /// Bound instruction index of each label, by label id.
    pub labels: Vec<usize>,
    /// Every local the function declared, in block-entry order.
    pub locals: Vec<LocalInfo>,
}

impl CompiledFunction {
    pub fn name(&self) -> &str {
        &self.signature.name
    }

    /// Instruction index a branch to `label` lands on.
    pub fn jump_target(&self, label: Label) -> Option<usize> {
        self.labels.get(label.index()).copied()
    }
}

/// A global variable in the data segment.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalVar {
    pub name: String,
    pub ty: Type,
    pub address: u32,
    pub width: u32,
    /// Constant initial value; the segment is zeroed otherwise.
    pub init: Option<Constant>,
}

/// The compiled translation unit.
#[derive(Debug, Clone)]
pub struct Executable {
    pub constants: ConstantPool,
    /// Indexed by [`FunctionId`].
    pub functions: Vec<CompiledFunction>,
    pub globals: Vec<GlobalVar>,
    /// Size of the data segment.
    pub global_size: u32,
    pub entry_point: Option<FunctionId>,
}

impl Executable {
    pub fn function(&self, id: FunctionId) -> Option<&CompiledFunction> {
        self.functions.get(id.index())
    }

    /// First function called `name`.
    pub fn function_by_name(&self, name: &str) -> Option<&CompiledFunction> {
        self.functions.iter().find(|f| f.name() == name)
    }

    pub fn global(&self, name: &str) -> Option<&GlobalVar> {
        self.globals.iter().find(|g| g.name == name)
    }
}

impl fmt::Display for Executable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (slot, constant) in self.constants.constants().iter().enumerate() {
            writeln!(f, "const #{slot} = {constant}")?;
        }
        for global in &self.globals {
            writeln!(
                f,
                "global {} @{} ({} bytes)",
                global.name, global.address, global.width
            )?;
        }
        for (index, function) in self.functions.iter().enumerate() {
            let marker = if self.entry_point == Some(FunctionId(index as u32)) {
                " [entry]"
            } else {
                ""
            };
            function.write_listing(f, marker)?;
        }
        Ok(())
    }
}

impl CompiledFunction {
    fn write_listing(&self, f: &mut fmt::Formatter<'_>, marker: &str) -> fmt::Result {
        let params: Vec<&str> = self
            .signature
            .params
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        writeln!(
            f,
            "function {}({}) frame={}{marker}",
            self.signature.name,
            params.join(", "),
            self.frame_size
        )?;
        for (index, instruction) in self.code.iter().enumerate() {
            for (id, _) in self.labels.iter().enumerate().filter(|(_, t)| **t == index) {
                writeln!(f, "  L{id}:")?;
            }
            writeln!(f, "    {index:4}  {instruction}")?;
        }
        // Labels bound past the last instruction.
        for (id, _) in self
            .labels
            .iter()
            .enumerate()
            .filter(|(_, t)| **t >= self.code.len())
        {
            writeln!(f, "  L{id}:")?;
        }
        Ok(())
    }
}

impl fmt::Display for CompiledFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_listing(f, "")
    }
}
