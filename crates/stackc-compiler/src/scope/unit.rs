//! Translation-unit resolver node.
//!
//! Owns the file-scope typedefs, struct and enum tags, and the enum
//! constants. Variable lookups go to the program first: a global with a
//! real address takes precedence over a same-named enum constant, which is
//! only consulted when the program has nothing by that name.

use rustc_hash::FxHashMap;
use stackc_core::{CompilationError, EnumId, Span, StructId, Type};

use crate::types::{EnumDef, EnumMemberDef, StructDef, TypeTable};

use super::{ProgramScope, Resolver, Result, Storage, Symbol};

/// File-scope resolver node.
pub struct UnitScope<'p> {
    program: &'p mut ProgramScope,
    types: TypeTable,
    typedefs: FxHashMap<String, Type>,
    struct_tags: FxHashMap<String, StructId>,
    enum_tags: FxHashMap<String, EnumId>,
    enum_constants: FxHashMap<String, (i64, EnumId)>,
}

impl<'p> UnitScope<'p> {
    pub fn new(program: &'p mut ProgramScope) -> Self {
        Self {
            program,
            types: TypeTable::new(),
            typedefs: FxHashMap::default(),
            struct_tags: FxHashMap::default(),
            enum_tags: FxHashMap::default(),
            enum_constants: FxHashMap::default(),
        }
    }

    pub fn program(&self) -> &ProgramScope {
        &*self.program
    }

    pub fn program_mut(&mut self) -> &mut ProgramScope {
        &mut *self.program
    }

    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    /// Declare a struct tag; its layout comes later.
    pub fn declare_struct(&mut self, name: &str, span: Span) -> Result<StructId> {
        if self.struct_tags.contains_key(name) {
            return Err(CompilationError::DuplicateDefinition {
                name: format!("struct {name}"),
                span,
            });
        }
        let id = self.types.declare_struct(name, span);
        self.struct_tags.insert(name.to_string(), id);
        Ok(id)
    }

    /// Complete a declared struct with fields of `(name, type, width)`.
    pub fn define_struct_layout(
        &mut self,
        id: StructId,
        fields: Vec<(String, Type, u32)>,
    ) -> Result<()> {
        let def = self
            .types
            .struct_def_mut(id)
            .ok_or_else(|| CompilationError::internal(format!("unknown struct #{}", id.0)))?;
        def.complete_with(fields);
        tracing::debug!(name = %def.name, width = def.width, "struct laid out");
        Ok(())
    }

    pub fn declare_enum(&mut self, name: &str, span: Span) -> Result<EnumId> {
        if self.enum_tags.contains_key(name) {
            return Err(CompilationError::DuplicateDefinition {
                name: format!("enum {name}"),
                span,
            });
        }
        let id = self.types.declare_enum(name, span);
        self.enum_tags.insert(name.to_string(), id);
        Ok(id)
    }

    /// Append a member to a declared enum, making it visible at file scope.
    pub fn add_enum_member(&mut self, id: EnumId, name: &str, value: i64, span: Span) -> Result<()> {
        if self.enum_constants.contains_key(name) {
            return Err(CompilationError::DuplicateDefinition {
                name: name.to_string(),
                span,
            });
        }
        let def = self
            .types
            .enum_def_mut(id)
            .ok_or_else(|| CompilationError::internal(format!("unknown enum #{}", id.0)))?;
        def.members.push(EnumMemberDef {
            name: name.to_string(),
            value,
        });
        self.enum_constants.insert(name.to_string(), (value, id));
        Ok(())
    }

    pub fn declare_typedef(&mut self, name: &str, ty: Type, span: Span) -> Result<()> {
        if self.typedefs.contains_key(name) {
            return Err(CompilationError::DuplicateDefinition {
                name: name.to_string(),
                span,
            });
        }
        self.typedefs.insert(name.to_string(), ty);
        Ok(())
    }
}

impl Resolver for UnitScope<'_> {
    fn parent(&self) -> Option<&dyn Resolver> {
        Some(&*self.program)
    }

    fn parent_mut(&mut self) -> Option<&mut dyn Resolver> {
        Some(&mut *self.program)
    }

    fn resolve_variable(&self, name: &str, hints: Option<&[Type]>) -> Option<Symbol> {
        self.program.resolve_variable(name, hints).or_else(|| {
            self.enum_constants.get(name).map(|&(value, id)| {
                Symbol::new(name, Type::Enum(id), Storage::EnumConstant(value))
            })
        })
    }

    fn resolve_type_name(&self, name: &str) -> Option<Type> {
        if let Some(ty) = self.typedefs.get(name) {
            return Some(ty.clone());
        }
        if let Some(&id) = self.struct_tags.get(name) {
            return Some(Type::Struct(id));
        }
        if let Some(&id) = self.enum_tags.get(name) {
            return Some(Type::Enum(id));
        }
        self.program.resolve_type_name(name)
    }

    fn resolve_struct_tag(&self, tag: &str) -> Option<StructId> {
        self.struct_tags.get(tag).copied()
    }

    fn resolve_enum_tag(&self, tag: &str) -> Option<EnumId> {
        self.enum_tags.get(tag).copied()
    }

    fn struct_def(&self, id: StructId) -> Option<&StructDef> {
        self.types.struct_def(id)
    }

    fn enum_def(&self, id: EnumId) -> Option<&EnumDef> {
        self.types.enum_def(id)
    }
}
