//! The resolver chain.
//!
//! Every lexical construct being compiled is represented by one node of a
//! chain, innermost first. Each node borrows its enclosing node mutably for
//! as long as it is active, and every lookup or emission request issued
//! during the walk goes to the innermost node. [`Resolver`]'s provided
//! methods forward to the parent, so a node only overrides the hooks it
//! answers itself:
//!
//! | Node | Answers |
//! |---|---|
//! | [`ProgramScope`] | globals, functions, methods, constant pool, diagnostics |
//! | [`UnitScope`] | typedefs, struct/enum tags, file-scope enum constants |
//! | [`FunctionScope`] | parameters, active locals, receiver, labels, emission |
//! | [`BlockScope`] | nothing (marks block entry/exit) |
//! | [`LoopScope`] | `break` and `continue` targets |
//! | [`EnumScope`] | members of one enum |
//!
//! A lookup that reaches the root unanswered yields `None`; the caller turns
//! that into a diagnostic.

mod block;
mod enum_scope;
mod frame;
mod function;
mod loops;
mod program;
mod unit;

use stackc_core::{CompilationError, EnumId, FunctionId, StructId, TargetMachine, Type};

use crate::bytecode::{Constant, Instruction};
use crate::emit::Label;
use crate::executable::Signature;
use crate::types::{EnumDef, StructDef};

pub use block::BlockScope;
pub use enum_scope::EnumScope;
pub use frame::{BlockFrame, Local};
pub use function::FunctionScope;
pub use loops::LoopScope;
pub use program::ProgramScope;
pub use unit::UnitScope;

type Result<T> = std::result::Result<T, CompilationError>;

/// Name of the implicit receiver inside instance functions.
pub const RECEIVER_NAME: &str = "this";

/// Argument slot of the receiver, outside the ordinary parameter numbering.
pub const RECEIVER_SLOT: i32 = -1;

/// Where a resolved name lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    /// Argument slot. [`RECEIVER_SLOT`] for the receiver.
    Parameter(i32),
    /// Offset in the function's frame.
    Local(u32),
    /// Address in the data segment.
    Global(u32),
    /// Compile-time value; no storage.
    EnumConstant(i64),
    Function(FunctionId),
}

/// [`Storage`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageClass {
    Parameter,
    Local,
    Global,
    EnumConstant,
    Function,
}

impl Storage {
    pub fn class(&self) -> StorageClass {
        match self {
            Storage::Parameter(_) => StorageClass::Parameter,
            Storage::Local(_) => StorageClass::Local,
            Storage::Global(_) => StorageClass::Global,
            Storage::EnumConstant(_) => StorageClass::EnumConstant,
            Storage::Function(_) => StorageClass::Function,
        }
    }
}

/// A resolved name.
///
/// For functions `ty` is the return type.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub ty: Type,
    pub storage: Storage,
}

impl Symbol {
    pub fn new(name: impl Into<String>, ty: Type, storage: Storage) -> Self {
        Self {
            name: name.into(),
            ty,
            storage,
        }
    }

    pub fn class(&self) -> StorageClass {
        self.storage.class()
    }
}

fn outside_function(operation: &str) -> CompilationError {
    CompilationError::internal(format!("{operation} requested outside a function"))
}

/// One node of the resolver chain.
pub trait Resolver {
    /// The enclosing node; `None` at the root.
    fn parent(&self) -> Option<&dyn Resolver>;

    fn parent_mut(&mut self) -> Option<&mut dyn Resolver>;

    // =========================================================================
    // Name resolution
    // =========================================================================

    /// Resolve a value name. `hints` carries argument types when the name is
    /// being called, to select among overloads.
    fn resolve_variable(&self, name: &str, hints: Option<&[Type]>) -> Option<Symbol> {
        self.parent()?.resolve_variable(name, hints)
    }

    fn resolve_type_name(&self, name: &str) -> Option<Type> {
        self.parent()?.resolve_type_name(name)
    }

    fn resolve_struct_tag(&self, tag: &str) -> Option<StructId> {
        self.parent()?.resolve_struct_tag(tag)
    }

    fn resolve_enum_tag(&self, tag: &str) -> Option<EnumId> {
        self.parent()?.resolve_enum_tag(tag)
    }

    fn resolve_method(
        &self,
        owner: StructId,
        name: &str,
        hints: Option<&[Type]>,
    ) -> Option<FunctionId> {
        self.parent()?.resolve_method(owner, name, hints)
    }

    // =========================================================================
    // Definitions
    // =========================================================================

    fn function_signature(&self, id: FunctionId) -> Option<&Signature> {
        self.parent()?.function_signature(id)
    }

    fn struct_def(&self, id: StructId) -> Option<&StructDef> {
        self.parent()?.struct_def(id)
    }

    fn enum_def(&self, id: EnumId) -> Option<&EnumDef> {
        self.parent()?.enum_def(id)
    }

    fn target(&self) -> TargetMachine {
        self.parent()
            .map_or_else(TargetMachine::default, |parent| parent.target())
    }

    /// Return type of the function being compiled.
    fn return_type(&self) -> Option<&Type> {
        self.parent()?.return_type()
    }

    // =========================================================================
    // Control-flow targets
    // =========================================================================

    fn break_label(&self) -> Option<Label> {
        self.parent()?.break_label()
    }

    fn continue_label(&self) -> Option<Label> {
        self.parent()?.continue_label()
    }

    // =========================================================================
    // Emission, serviced by the function node
    // =========================================================================

    fn define_label(&mut self) -> Result<Label> {
        match self.parent_mut() {
            Some(parent) => parent.define_label(),
            None => Err(outside_function("label")),
        }
    }

    fn bind_label(&mut self, label: Label) -> Result<()> {
        match self.parent_mut() {
            Some(parent) => parent.bind_label(label),
            None => Err(outside_function("label binding")),
        }
    }

    /// Append an instruction; returns its index.
    fn emit(&mut self, instruction: Instruction) -> Result<usize> {
        match self.parent_mut() {
            Some(parent) => parent.emit(instruction),
            None => Err(outside_function("emission")),
        }
    }

    fn set_line(&mut self, line: u32) {
        if let Some(parent) = self.parent_mut() {
            parent.set_line(line);
        }
    }

    /// Push a block's locals onto the active-block stack.
    fn begin_block(&mut self, frame: BlockFrame) -> Result<()> {
        match self.parent_mut() {
            Some(parent) => parent.begin_block(frame),
            None => Err(outside_function("block entry")),
        }
    }

    fn end_block(&mut self) -> Result<()> {
        match self.parent_mut() {
            Some(parent) => parent.end_block(),
            None => Err(outside_function("block exit")),
        }
    }

    // =========================================================================
    // Program-wide services, serviced by the root
    // =========================================================================

    fn intern(&mut self, constant: Constant) -> Result<u32> {
        match self.parent_mut() {
            Some(parent) => parent.intern(constant),
            None => Err(CompilationError::internal("no constant pool in scope")),
        }
    }

    fn report(&mut self, error: CompilationError) {
        match self.parent_mut() {
            Some(parent) => parent.report(error),
            None => tracing::warn!(%error, "diagnostic dropped: no sink in scope"),
        }
    }

    /// Total errors reported so far.
    fn error_count(&self) -> usize {
        self.parent().map_or(0, |parent| parent.error_count())
    }

    // =========================================================================
    // Provided helpers
    // =========================================================================

    /// Logical width of a value of type `ty`.
    ///
    /// `None` for `void` and for incomplete structs.
    fn width_of(&self, ty: &Type) -> Option<u32> {
        let target = self.target();
        match ty {
            Type::Primitive(kind) => (!ty.is_void()).then(|| target.width_of(*kind)),
            Type::Pointer(_) => Some(target.pointer_width),
            Type::Enum(_) => Some(target.enum_width()),
            Type::Struct(id) => self
                .struct_def(*id)
                .filter(|def| def.complete)
                .map(|def| def.width),
        }
    }

    /// Human-readable spelling of `ty`, for diagnostics.
    fn describe(&self, ty: &Type) -> String {
        match ty {
            Type::Primitive(kind) => kind.name().to_string(),
            Type::Pointer(inner) => format!("{}*", self.describe(inner)),
            Type::Struct(id) => match self.struct_def(*id) {
                Some(def) => format!("struct {}", def.name),
                None => format!("struct #{}", id.0),
            },
            Type::Enum(id) => match self.enum_def(*id) {
                Some(def) => format!("enum {}", def.name),
                None => format!("enum #{}", id.0),
            },
        }
    }
}
