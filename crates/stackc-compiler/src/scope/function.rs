//! Function resolver node.
//!
//! The function node owns the signature, the emitter, and a flattened table
//! of the locals of every block currently active in the function body.
//! Entering a block appends its locals and renumbers the whole table, so at
//! any moment each local's offset is the sum of the widths declared before
//! it, outermost block first. Leaving a block truncates the table and
//! leaves the survivors' offsets untouched.

use stackc_core::{CompilationError, Type};

use crate::bytecode::Instruction;
use crate::emit::{Emitter, Label};
use crate::executable::{CompiledFunction, LocalInfo, Signature};

use super::{BlockFrame, Local, RECEIVER_NAME, RECEIVER_SLOT, Resolver, Result, Storage, Symbol};

/// Resolver node for the function being compiled.
pub struct FunctionScope<'p> {
    parent: &'p mut dyn Resolver,
    signature: Signature,
    /// Locals of all active blocks, outermost first.
    locals: Vec<Local>,
    /// Start index in `locals` of each active block.
    block_starts: Vec<usize>,
    /// Typedefs of each active block.
    typedefs: Vec<Vec<(String, Type)>>,
    frame_size: u32,
    debug_locals: Vec<LocalInfo>,
    emitter: Emitter,
    errors: usize,
}

impl<'p> FunctionScope<'p> {
    pub fn new(parent: &'p mut dyn Resolver, signature: Signature) -> Self {
        let mut emitter = Emitter::new();
        emitter.set_line(signature.span.line);
        Self {
            parent,
            signature,
            locals: Vec::new(),
            block_starts: Vec::new(),
            typedefs: Vec::new(),
            frame_size: 0,
            debug_locals: Vec::new(),
            emitter,
            errors: 0,
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Locals of the active blocks, outermost first.
    pub fn active_locals(&self) -> &[Local] {
        &self.locals
    }

    pub fn block_depth(&self) -> usize {
        self.block_starts.len()
    }

    /// Largest extent the active locals have reached so far.
    pub fn frame_size(&self) -> u32 {
        self.frame_size
    }

    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    /// Whether any error was reported through this node.
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    /// Assign every active local its offset; returns the total extent.
    fn recompute_offsets(&mut self) -> u32 {
        let mut offset = 0;
        for local in &mut self.locals {
            local.offset = offset;
            offset += local.width;
        }
        offset
    }

    /// Whether `name` is taken by a parameter or, in a method, the receiver.
    fn is_parameter_name(&self, name: &str) -> bool {
        self.signature.params.iter().any(|p| p.name == name)
            || (name == RECEIVER_NAME && self.signature.is_method())
    }

    fn find_local(&self, name: &str) -> Option<&Local> {
        self.locals.iter().rev().find(|local| local.name == name)
    }

    /// Seal the function. Every block must have been exited and every
    /// label bound.
    pub fn finish(self) -> Result<CompiledFunction> {
        if !self.block_starts.is_empty() {
            return Err(CompilationError::internal(format!(
                "'{}' finished with {} open blocks",
                self.signature.name,
                self.block_starts.len()
            )));
        }

        let code = self.emitter.finish()?;
        Ok(CompiledFunction {
            signature: self.signature,
            frame_size: self.frame_size,
            code: code.code,
            lines: code.lines,
            labels: code.labels,
            locals: self.debug_locals,
        })
    }
}

impl Resolver for FunctionScope<'_> {
    fn parent(&self) -> Option<&dyn Resolver> {
        Some(&*self.parent)
    }

    fn parent_mut(&mut self) -> Option<&mut dyn Resolver> {
        Some(&mut *self.parent)
    }

    fn resolve_variable(&self, name: &str, hints: Option<&[Type]>) -> Option<Symbol> {
        if let Some(param) = self.signature.params.iter().find(|p| p.name == name) {
            return Some(Symbol::new(
                name,
                param.ty.clone(),
                Storage::Parameter(param.slot),
            ));
        }

        if let Some(local) = self.find_local(name) {
            return Some(Symbol::new(
                name,
                local.ty.clone(),
                Storage::Local(local.offset),
            ));
        }

        if name == RECEIVER_NAME
            && let Some(owner) = self.signature.owner
        {
            return Some(Symbol::new(
                name,
                Type::Struct(owner).pointer_to(),
                Storage::Parameter(RECEIVER_SLOT),
            ));
        }

        self.parent.resolve_variable(name, hints)
    }

    fn resolve_type_name(&self, name: &str) -> Option<Type> {
        self.typedefs
            .iter()
            .rev()
            .flat_map(|block| block.iter().rev())
            .find(|(typedef, _)| typedef == name)
            .map(|(_, ty)| ty.clone())
            .or_else(|| self.parent.resolve_type_name(name))
    }

    fn return_type(&self) -> Option<&Type> {
        Some(&self.signature.return_type)
    }

    fn break_label(&self) -> Option<Label> {
        None
    }

    fn continue_label(&self) -> Option<Label> {
        None
    }

    fn define_label(&mut self) -> Result<Label> {
        Ok(self.emitter.define_label())
    }

    fn bind_label(&mut self, label: Label) -> Result<()> {
        self.emitter.bind_label(label)
    }

    fn emit(&mut self, instruction: Instruction) -> Result<usize> {
        Ok(self.emitter.emit(instruction))
    }

    fn set_line(&mut self, line: u32) {
        self.emitter.set_line(line);
    }

    fn begin_block(&mut self, frame: BlockFrame) -> Result<()> {
        // Parameters win lookups, so a local reusing one would never be reached.
        let hidden: Vec<CompilationError> = frame
            .locals
            .iter()
            .filter(|local| self.is_parameter_name(&local.name))
            .map(|local| CompilationError::DuplicateLocalDeclaration {
                name: local.name.clone(),
                original_span: self.signature.span,
                new_span: local.span,
            })
            .collect();
        for error in hidden {
            self.report(error);
        }

        let start = self.locals.len();
        self.block_starts.push(start);
        self.typedefs.push(frame.typedefs);
        self.locals.extend(frame.locals);

        let extent = self.recompute_offsets();
        self.frame_size = self.frame_size.max(extent);
        self.debug_locals
            .extend(self.locals[start..].iter().map(|local| LocalInfo {
                name: local.name.clone(),
                ty: local.ty.clone(),
                offset: local.offset,
                width: local.width,
            }));

        tracing::trace!(
            function = %self.signature.name,
            depth = self.block_starts.len(),
            extent,
            "begin block"
        );
        Ok(())
    }

    fn end_block(&mut self) -> Result<()> {
        let start = self.block_starts.pop().ok_or_else(|| {
            CompilationError::internal(format!(
                "block exit without entry in '{}'",
                self.signature.name
            ))
        })?;
        self.locals.truncate(start);
        self.typedefs.pop();
        tracing::trace!(
            function = %self.signature.name,
            depth = self.block_starts.len(),
            "end block"
        );
        Ok(())
    }

    fn report(&mut self, error: CompilationError) {
        self.errors += 1;
        self.parent.report(error);
    }
}
