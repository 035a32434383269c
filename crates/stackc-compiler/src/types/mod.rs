//! User-defined type tables and type-expression resolution.
//!
//! - [`TypeTable`]: struct and enum definitions of a translation unit
//! - [`resolve_type`]: `TypeExpr` to [`Type`] through the resolver chain
//! - [`find_conversion`]: value conversion rules

mod conversion;
mod defs;

use stackc_ast::TypeExpr;
use stackc_core::{CompilationError, EnumId, Span, StructId, Type};

use crate::scope::Resolver;

pub use conversion::{Conversion, find_conversion, is_implicitly_convertible};
pub use defs::{EnumDef, EnumMemberDef, FieldDef, StructDef};

type Result<T> = std::result::Result<T, CompilationError>;

/// Struct and enum definitions, indexed by id.
#[derive(Debug, Clone, Default)]
pub struct TypeTable {
    structs: Vec<StructDef>,
    enums: Vec<EnumDef>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an incomplete struct.
    pub fn declare_struct(&mut self, name: &str, span: Span) -> StructId {
        let id = StructId(self.structs.len() as u32);
        self.structs.push(StructDef::incomplete(name, span));
        id
    }

    pub fn struct_def(&self, id: StructId) -> Option<&StructDef> {
        self.structs.get(id.0 as usize)
    }

    pub fn struct_def_mut(&mut self, id: StructId) -> Option<&mut StructDef> {
        self.structs.get_mut(id.0 as usize)
    }

    /// Declare an enum with no members yet.
    pub fn declare_enum(&mut self, name: &str, span: Span) -> EnumId {
        let id = EnumId(self.enums.len() as u32);
        self.enums.push(EnumDef::new(name, span));
        id
    }

    pub fn enum_def(&self, id: EnumId) -> Option<&EnumDef> {
        self.enums.get(id.0 as usize)
    }

    pub fn enum_def_mut(&mut self, id: EnumId) -> Option<&mut EnumDef> {
        self.enums.get_mut(id.0 as usize)
    }

    pub fn struct_count(&self) -> usize {
        self.structs.len()
    }

    pub fn enum_count(&self) -> usize {
        self.enums.len()
    }
}

/// Resolve a written type through the resolver chain.
pub fn resolve_type(scope: &dyn Resolver, ty: &TypeExpr<'_>) -> Result<Type> {
    resolve_type_with(scope, ty, &[])
}

/// Resolve a written type, consulting `pending` typedefs first.
///
/// `pending` holds typedefs declared earlier in a block that has not been
/// entered yet; later entries shadow earlier ones.
pub fn resolve_type_with(
    scope: &dyn Resolver,
    ty: &TypeExpr<'_>,
    pending: &[(String, Type)],
) -> Result<Type> {
    match ty {
        TypeExpr::Primitive(kind, _) => Ok(Type::Primitive(*kind)),
        TypeExpr::Named(ident) => pending
            .iter()
            .rev()
            .find(|(name, _)| name == ident.name)
            .map(|(_, ty)| ty.clone())
            .or_else(|| scope.resolve_type_name(ident.name))
            .ok_or_else(|| CompilationError::UnresolvedTypeName {
                name: ident.name.to_string(),
                span: ident.span,
            }),
        TypeExpr::Struct(tag) => scope
            .resolve_struct_tag(tag.name)
            .map(Type::Struct)
            .ok_or_else(|| CompilationError::UnresolvedTypeName {
                name: format!("struct {}", tag.name),
                span: tag.span,
            }),
        TypeExpr::Enum(tag) => scope
            .resolve_enum_tag(tag.name)
            .map(Type::Enum)
            .ok_or_else(|| CompilationError::UnresolvedTypeName {
                name: format!("enum {}", tag.name),
                span: tag.span,
            }),
        TypeExpr::Pointer(inner, _) => Ok(resolve_type_with(scope, inner, pending)?.pointer_to()),
    }
}
