//! Semantic types.
//!
//! [`Type`] is the resolved form of a type expression: primitives, pointers,
//! and references to user-defined structs and enums by id. The struct and
//! enum definitions themselves live in the compiler's type tables; a `Type`
//! only names them.

use std::fmt;

/// Built-in scalar kinds, plus `void`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Void,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveKind {
    /// The keyword spelling of this kind.
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Void => "void",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            PrimitiveKind::Char | PrimitiveKind::Short | PrimitiveKind::Int | PrimitiveKind::Long
        )
    }

    pub fn is_floating(self) -> bool {
        matches!(self, PrimitiveKind::Float | PrimitiveKind::Double)
    }

    /// Rank used by the usual arithmetic conversions.
    pub(crate) fn rank(self) -> u8 {
        match self {
            PrimitiveKind::Void => 0,
            PrimitiveKind::Char => 1,
            PrimitiveKind::Short => 2,
            PrimitiveKind::Int => 3,
            PrimitiveKind::Long => 4,
            PrimitiveKind::Float => 5,
            PrimitiveKind::Double => 6,
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Index of a struct definition in the translation unit's type table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StructId(pub u32);

/// Index of an enum definition in the translation unit's type table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnumId(pub u32);

/// Index of a function in the executable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId(pub u32);

impl FunctionId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn#{}", self.0)
    }
}

/// A fully resolved type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Primitive(PrimitiveKind),
    Pointer(Box<Type>),
    Struct(StructId),
    Enum(EnumId),
}

impl Type {
    pub const VOID: Type = Type::Primitive(PrimitiveKind::Void);
    pub const CHAR: Type = Type::Primitive(PrimitiveKind::Char);
    pub const INT: Type = Type::Primitive(PrimitiveKind::Int);
    pub const LONG: Type = Type::Primitive(PrimitiveKind::Long);
    pub const DOUBLE: Type = Type::Primitive(PrimitiveKind::Double);

    /// Pointer to `self`.
    pub fn pointer_to(self) -> Type {
        Type::Pointer(Box::new(self))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Primitive(PrimitiveKind::Void))
    }

    /// Integer kinds and enums.
    pub fn is_integer(&self) -> bool {
        match self {
            Type::Primitive(kind) => kind.is_integer(),
            Type::Enum(_) => true,
            _ => false,
        }
    }

    pub fn is_floating(&self) -> bool {
        matches!(self, Type::Primitive(kind) if kind.is_floating())
    }

    pub fn is_arithmetic(&self) -> bool {
        self.is_integer() || self.is_floating()
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, Type::Pointer(_))
    }

    /// Usable as a condition: arithmetic or pointer.
    pub fn is_scalar(&self) -> bool {
        self.is_arithmetic() || self.is_pointer()
    }

    pub fn is_void_pointer(&self) -> bool {
        matches!(self, Type::Pointer(inner) if inner.is_void())
    }

    pub fn pointee(&self) -> Option<&Type> {
        match self {
            Type::Pointer(inner) => Some(inner),
            _ => None,
        }
    }

    pub fn struct_id(&self) -> Option<StructId> {
        match self {
            Type::Struct(id) => Some(*id),
            _ => None,
        }
    }

    pub fn enum_id(&self) -> Option<EnumId> {
        match self {
            Type::Enum(id) => Some(*id),
            _ => None,
        }
    }

    /// Result type of the usual arithmetic conversions, if both are arithmetic.
    ///
    /// Integers narrower than `int` (and enums) are promoted to `int`.
    pub fn common_arithmetic(&self, other: &Type) -> Option<Type> {
        if !self.is_arithmetic() || !other.is_arithmetic() {
            return None;
        }
        let promote = |ty: &Type| match ty {
            Type::Primitive(kind) if kind.rank() >= PrimitiveKind::Int.rank() => *kind,
            _ => PrimitiveKind::Int,
        };
        let (a, b) = (promote(self), promote(other));
        Some(Type::Primitive(if a.rank() >= b.rank() { a } else { b }))
    }
}

impl From<PrimitiveKind> for Type {
    fn from(kind: PrimitiveKind) -> Self {
        Type::Primitive(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_count_as_integers() {
        let ty = Type::Enum(EnumId(0));
        assert!(ty.is_integer());
        assert!(ty.is_scalar());
        assert!(!ty.is_floating());
    }

    #[test]
    fn common_arithmetic_promotes_small_integers() {
        let char_ty = Type::CHAR;
        let short_ty = Type::Primitive(PrimitiveKind::Short);
        assert_eq!(char_ty.common_arithmetic(&short_ty), Some(Type::INT));
    }

    #[test]
    fn common_arithmetic_prefers_floating() {
        assert_eq!(Type::LONG.common_arithmetic(&Type::DOUBLE), Some(Type::DOUBLE));
        let float_ty = Type::Primitive(PrimitiveKind::Float);
        assert_eq!(Type::INT.common_arithmetic(&float_ty), Some(float_ty));
    }

    #[test]
    fn common_arithmetic_rejects_pointers() {
        let ptr = Type::INT.pointer_to();
        assert_eq!(ptr.common_arithmetic(&Type::INT), None);
    }

    #[test]
    fn void_pointer_detection() {
        assert!(Type::VOID.pointer_to().is_void_pointer());
        assert!(!Type::CHAR.pointer_to().is_void_pointer());
        assert_eq!(Type::CHAR.pointer_to().pointee(), Some(&Type::CHAR));
    }
}
