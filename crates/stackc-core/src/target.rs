//! Target machine description.
//!
//! The compiler only needs the *logical width* of each primitive kind to
//! lay out stack frames, struct fields and the global data segment. The
//! value representation used by the VM at run time is not modelled here.

use crate::PrimitiveKind;

/// Logical widths, in bytes, of the primitive kinds and of pointers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetMachine {
    pub char_width: u32,
    pub short_width: u32,
    pub int_width: u32,
    pub long_width: u32,
    pub float_width: u32,
    pub double_width: u32,
    pub pointer_width: u32,
}

impl TargetMachine {
    /// A 64-bit target: 8-byte longs, doubles and pointers.
    pub const LP64: TargetMachine = TargetMachine {
        char_width: 1,
        short_width: 2,
        int_width: 4,
        long_width: 8,
        float_width: 4,
        double_width: 8,
        pointer_width: 8,
    };

    /// A 32-bit target: 4-byte longs and pointers.
    pub const ILP32: TargetMachine = TargetMachine {
        char_width: 1,
        short_width: 2,
        int_width: 4,
        long_width: 4,
        float_width: 4,
        double_width: 8,
        pointer_width: 4,
    };

    /// Width of a primitive kind. `void` has width 0.
    pub fn width_of(&self, kind: PrimitiveKind) -> u32 {
        match kind {
            PrimitiveKind::Void => 0,
            PrimitiveKind::Char => self.char_width,
            PrimitiveKind::Short => self.short_width,
            PrimitiveKind::Int => self.int_width,
            PrimitiveKind::Long => self.long_width,
            PrimitiveKind::Float => self.float_width,
            PrimitiveKind::Double => self.double_width,
        }
    }

    /// Width of an enum-typed value.
    pub fn enum_width(&self) -> u32 {
        self.int_width
    }
}

impl Default for TargetMachine {
    fn default() -> Self {
        Self::LP64
    }
}
