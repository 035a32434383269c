//! Struct and enum definitions.

use stackc_core::{Span, Type};

/// One field of a struct, with its offset inside the struct.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub ty: Type,
    pub offset: u32,
    pub width: u32,
}

/// A struct tag and, once its declaration has been processed, its layout.
///
/// Tags are declared before any layout is computed so structs can point to
/// each other; until then the struct is incomplete and cannot be used by
/// value.
#[derive(Debug, Clone, PartialEq)]
pub struct StructDef {
    pub name: String,
    pub fields: Vec<FieldDef>,
    pub width: u32,
    pub complete: bool,
    pub span: Span,
}

impl StructDef {
    /// A declared but not yet laid out struct.
    pub fn incomplete(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            width: 0,
            complete: false,
            span,
        }
    }

    /// Lay out `fields` back to back, in order.
    ///
    /// `fields` holds `(name, type, width)`; offsets are the running sum of
    /// the preceding widths.
    pub fn complete_with(&mut self, fields: impl IntoIterator<Item = (String, Type, u32)>) {
        let mut offset = 0;
        self.fields = fields
            .into_iter()
            .map(|(name, ty, width)| {
                let field = FieldDef {
                    name,
                    ty,
                    offset,
                    width,
                };
                offset += width;
                field
            })
            .collect();
        self.width = offset;
        self.complete = true;
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMemberDef {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDef {
    pub name: String,
    pub members: Vec<EnumMemberDef>,
    pub span: Span,
}

impl EnumDef {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
            span,
        }
    }

    /// Value of the member called `name`.
    pub fn member(&self, name: &str) -> Option<i64> {
        self.members
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.value)
    }
}
