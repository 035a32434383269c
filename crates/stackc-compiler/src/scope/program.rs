//! Root of the resolver chain.
//!
//! The program node owns everything that outlives a single function: the
//! constant pool, the data segment, the function table and the diagnostic
//! sink. Requests for these services travel up the chain to here.

use rustc_hash::FxHashMap;
use stackc_core::{
    CompilationError, Diagnostics, FunctionId, Span, StructId, TargetMachine, Type,
};

use crate::bytecode::{Constant, ConstantPool};
use crate::executable::{CompiledFunction, Executable, GlobalVar, Signature};
use crate::options::CompilerOptions;
use crate::types::is_implicitly_convertible;

use super::{Resolver, Result, Storage, Symbol};

#[derive(Debug)]
struct FunctionEntry {
    signature: Signature,
    defined: bool,
    body: Option<CompiledFunction>,
}

/// Executable-level resolver node.
#[derive(Debug)]
pub struct ProgramScope {
    target: TargetMachine,
    constants: ConstantPool,
    globals: Vec<GlobalVar>,
    global_index: FxHashMap<String, usize>,
    global_size: u32,
    functions: Vec<FunctionEntry>,
    /// Free functions by name.
    overloads: FxHashMap<String, Vec<FunctionId>>,
    /// Instance functions by owner and name.
    methods: FxHashMap<(StructId, String), Vec<FunctionId>>,
    diagnostics: Diagnostics,
}

impl ProgramScope {
    pub fn new(target: TargetMachine) -> Self {
        Self {
            target,
            constants: ConstantPool::new(),
            globals: Vec::new(),
            global_index: FxHashMap::default(),
            global_size: 0,
            functions: Vec::new(),
            overloads: FxHashMap::default(),
            methods: FxHashMap::default(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Allocate a global in the data segment and return its address.
    pub fn declare_global(
        &mut self,
        name: &str,
        ty: Type,
        width: u32,
        init: Option<Constant>,
        span: Span,
    ) -> Result<u32> {
        if self.global_index.contains_key(name) || self.overloads.contains_key(name) {
            return Err(CompilationError::DuplicateDefinition {
                name: name.to_string(),
                span,
            });
        }

        let address = self.global_size;
        self.global_size += width;
        self.global_index.insert(name.to_string(), self.globals.len());
        self.globals.push(GlobalVar {
            name: name.to_string(),
            ty,
            address,
            width,
            init,
        });
        tracing::debug!(name, address, width, "declared global");
        Ok(address)
    }

    /// Register a prototype or definition.
    ///
    /// A declaration with the same owner, name and parameter types as an
    /// earlier one refers to the same function; only one of them may have
    /// a body.
    pub fn declare_function(&mut self, signature: Signature, has_body: bool) -> Result<FunctionId> {
        let candidates = match signature.owner {
            None => self.overloads.get(&signature.name),
            Some(owner) => self.methods.get(&(owner, signature.name.clone())),
        };
        let existing = candidates.and_then(|ids| {
            ids.iter()
                .copied()
                .find(|id| self.functions[id.index()].signature.same_params(&signature))
        });

        if let Some(id) = existing {
            let entry = &mut self.functions[id.index()];
            if entry.signature.return_type != signature.return_type {
                return Err(CompilationError::TypeMismatch {
                    message: format!(
                        "conflicting return types in declarations of '{}'",
                        signature.name
                    ),
                    span: signature.span,
                });
            }
            if has_body {
                if entry.defined {
                    return Err(CompilationError::DuplicateDefinition {
                        name: signature.name,
                        span: signature.span,
                    });
                }
                entry.defined = true;
                entry.signature = signature;
            }
            return Ok(id);
        }

        if signature.owner.is_none() && self.global_index.contains_key(&signature.name) {
            return Err(CompilationError::DuplicateDefinition {
                name: signature.name,
                span: signature.span,
            });
        }

        let id = FunctionId(self.functions.len() as u32);
        match signature.owner {
            None => self
                .overloads
                .entry(signature.name.clone())
                .or_default()
                .push(id),
            Some(owner) => self
                .methods
                .entry((owner, signature.name.clone()))
                .or_default()
                .push(id),
        }
        tracing::debug!(%id, name = %signature.name, has_body, "declared function");
        self.functions.push(FunctionEntry {
            signature,
            defined: has_body,
            body: None,
        });
        Ok(id)
    }

    /// Hand off a fully compiled function.
    pub fn install(&mut self, id: FunctionId, function: CompiledFunction) -> Result<()> {
        let entry = self
            .functions
            .get_mut(id.index())
            .ok_or_else(|| CompilationError::internal(format!("install of unknown {id}")))?;
        tracing::debug!(
            %id,
            name = %function.name(),
            instructions = function.code.len(),
            frame_size = function.frame_size,
            "function compiled"
        );
        entry.body = Some(function);
        Ok(())
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn constants(&self) -> &ConstantPool {
        &self.constants
    }

    pub fn globals(&self) -> &[GlobalVar] {
        &self.globals
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// Pick an overload. Without hints the first declared wins; with hints,
    /// an exact parameter match beats one reached by implicit conversion.
    fn select(&self, candidates: &[FunctionId], hints: Option<&[Type]>) -> Option<FunctionId> {
        let Some(hints) = hints else {
            return candidates.first().copied();
        };

        let params_of = |id: FunctionId| &self.functions[id.index()].signature.params;
        let same_arity: Vec<FunctionId> = candidates
            .iter()
            .copied()
            .filter(|&id| params_of(id).len() == hints.len())
            .collect();

        let exact = same_arity
            .iter()
            .copied()
            .find(|&id| params_of(id).iter().zip(hints).all(|(p, h)| p.ty == *h));
        exact.or_else(|| {
            same_arity.iter().copied().find(|&id| {
                params_of(id)
                    .iter()
                    .zip(hints)
                    .all(|(p, h)| is_implicitly_convertible(h, &p.ty))
            })
        })
    }

    /// Close the program: check for undefined functions and the entry
    /// point, and assemble the executable if no errors were reported.
    ///
    /// A prototype that never got a body is only an error when something
    /// calls it. Unused ones are left out of the executable, and the
    /// remaining functions are renumbered to stay dense.
    pub fn finish(self, options: &CompilerOptions) -> std::result::Result<Executable, Diagnostics> {
        let mut diagnostics = self.diagnostics;

        let mut referenced = vec![false; self.functions.len()];
        for instruction in self
            .functions
            .iter()
            .filter_map(|entry| entry.body.as_ref())
            .flat_map(|body| body.code.iter())
        {
            if let Some(slot) = instruction
                .callee()
                .and_then(|id| referenced.get_mut(id.index()))
            {
                *slot = true;
            }
        }

        for (entry, _) in self
            .functions
            .iter()
            .zip(&referenced)
            .filter(|(entry, referenced)| !entry.defined && **referenced)
        {
            diagnostics.push(CompilationError::UndefinedFunction {
                name: entry.signature.name.clone(),
                span: entry.signature.span,
            });
        }

        let entry_point = self
            .overloads
            .get(&options.entry_point)
            .and_then(|ids| ids.first().copied());
        if entry_point.is_none() && options.require_entry_point {
            diagnostics.push(CompilationError::MissingEntryPoint {
                name: options.entry_point.clone(),
            });
        }

        if !diagnostics.is_empty() {
            return Err(diagnostics);
        }

        // Old id -> position in the executable.
        let mut renumbered: Vec<Option<FunctionId>> = vec![None; self.functions.len()];
        let mut functions = Vec::with_capacity(self.functions.len());
        for (old, entry) in self.functions.into_iter().enumerate() {
            if !entry.defined {
                tracing::debug!(name = %entry.signature.name, "unused prototype dropped");
                continue;
            }
            let Some(body) = entry.body else {
                diagnostics.push(CompilationError::internal(format!(
                    "function '{}' was defined but never compiled",
                    entry.signature.name
                )));
                return Err(diagnostics);
            };
            renumbered[old] = Some(FunctionId(functions.len() as u32));
            functions.push(body);
        }

        for instruction in functions.iter_mut().flat_map(|f| f.code.iter_mut()) {
            let Some(old) = instruction.callee() else {
                continue;
            };
            match renumbered.get(old.index()).copied().flatten() {
                Some(new) => instruction.set_callee(new),
                None => {
                    diagnostics.push(CompilationError::internal(format!(
                        "call to {old}, which has no body"
                    )));
                    return Err(diagnostics);
                }
            }
        }
        let entry_point = entry_point.and_then(|id| renumbered.get(id.index()).copied().flatten());

        tracing::debug!(
            functions = functions.len(),
            constants = self.constants.len(),
            global_size = self.global_size,
            "executable assembled"
        );
        Ok(Executable {
            constants: self.constants,
            functions,
            globals: self.globals,
            global_size: self.global_size,
            entry_point,
        })
    }
}

impl Resolver for ProgramScope {
    fn parent(&self) -> Option<&dyn Resolver> {
        None
    }

    fn parent_mut(&mut self) -> Option<&mut dyn Resolver> {
        None
    }

    fn resolve_variable(&self, name: &str, hints: Option<&[Type]>) -> Option<Symbol> {
        if let Some(&index) = self.global_index.get(name) {
            let global = &self.globals[index];
            return Some(Symbol::new(
                name,
                global.ty.clone(),
                Storage::Global(global.address),
            ));
        }

        let id = self.select(self.overloads.get(name)?, hints)?;
        let signature = &self.functions[id.index()].signature;
        Some(Symbol::new(
            name,
            signature.return_type.clone(),
            Storage::Function(id),
        ))
    }

    fn resolve_method(
        &self,
        owner: StructId,
        name: &str,
        hints: Option<&[Type]>,
    ) -> Option<FunctionId> {
        self.select(self.methods.get(&(owner, name.to_string()))?, hints)
    }

    fn function_signature(&self, id: FunctionId) -> Option<&Signature> {
        self.functions.get(id.index()).map(|e| &e.signature)
    }

    fn target(&self) -> TargetMachine {
        self.target
    }

    fn intern(&mut self, constant: Constant) -> Result<u32> {
        Ok(self.constants.add(constant))
    }

    fn report(&mut self, error: CompilationError) {
        tracing::debug!(%error, "diagnostic reported");
        self.diagnostics.push(error);
    }

    fn error_count(&self) -> usize {
        self.diagnostics.len()
    }
}
