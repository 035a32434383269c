//! Stack machine instructions.
//!
//! Instructions are kept as an enum rather than encoded bytes: branch
//! operands hold a [`Label`] handle, and the label table of the compiled
//! function maps each handle to its bound instruction index.
//!
//! Stack effects use `[.. a, b]` with `b` on top.

use std::fmt;

use stackc_core::FunctionId;

use crate::emit::Label;

/// Integer and floating arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl ArithOp {
    pub fn mnemonic(self) -> &'static str {
        match self {
            ArithOp::Add => "add",
            ArithOp::Sub => "sub",
            ArithOp::Mul => "mul",
            ArithOp::Div => "div",
            ArithOp::Rem => "rem",
            ArithOp::BitAnd => "and",
            ArithOp::BitOr => "or",
            ArithOp::BitXor => "xor",
            ArithOp::Shl => "shl",
            ArithOp::Shr => "shr",
        }
    }
}

/// Comparison operators. Results are `0` or `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    pub fn mnemonic(self) -> &'static str {
        match self {
            CmpOp::Eq => "eq",
            CmpOp::Ne => "ne",
            CmpOp::Lt => "lt",
            CmpOp::Le => "le",
            CmpOp::Gt => "gt",
            CmpOp::Ge => "ge",
        }
    }
}

/// One VM instruction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Instruction {
    // =========================================================================
    // Constants and stack manipulation
    // =========================================================================
    /// Push an integer immediate.
    PushInt(i64),
    /// Push constant pool entry (floats, string addresses).
    PushConst(u32),
    /// `[.. a]` -> `[..]`
    Pop,
    /// `[.. a]` -> `[.. a, a]`
    Dup,
    /// `[.. a, b]` -> `[.. b, a]`
    Swap,

    // =========================================================================
    // Storage
    // =========================================================================
    /// Push the value of an argument slot. Slot `-1` is the receiver.
    LoadParam(i32),
    /// Push the address of an argument slot.
    AddrParam(i32),
    /// Push `width` bytes read from the frame at `offset`.
    LoadLocal { offset: u32, width: u32 },
    /// Push the address of the frame at `offset`.
    AddrLocal(u32),
    /// Push `width` bytes read from the data segment at `address`.
    LoadGlobal { address: u32, width: u32 },
    /// Push the address of the data segment at `address`.
    AddrGlobal(u32),
    /// `[.. addr]` -> `[.. value]`
    Load(u32),
    /// `[.. addr, value]` -> `[.. value]`
    Store(u32),

    // =========================================================================
    // Addresses
    // =========================================================================
    /// `[.. addr]` -> `[.. addr + n]`
    AddOffset(u32),
    /// `[.. ptr, i]` -> `[.. ptr + i * scale]`
    PtrAdd(u32),
    /// `[.. p, q]` -> `[.. (p - q) / scale]`
    PtrDiff(u32),

    // =========================================================================
    // Arithmetic
    // =========================================================================
    /// `[.. a, b]` -> `[.. a op b]` on integers
    Binary(ArithOp),
    /// `[.. a, b]` -> `[.. a op b]` on floats
    FloatBinary(ArithOp),
    Compare(CmpOp),
    FloatCompare(CmpOp),
    Neg,
    FloatNeg,
    /// Logical not: `0` -> `1`, anything else -> `0`.
    Not,
    BitNot,
    /// Convert the integer `depth` entries below the top to a float.
    IntToFloat(u8),
    /// Convert the float `depth` entries below the top to an integer.
    FloatToInt(u8),

    // =========================================================================
    // Control flow
    // =========================================================================
    Jump(Label),
    /// Pops the condition.
    JumpIfFalse(Label),
    /// Pops the condition.
    JumpIfTrue(Label),
    /// Call a free function; its `argc` arguments are on the stack.
    Call { function: FunctionId, argc: u32 },
    /// Call a method; the receiver pointer sits below the arguments.
    CallMethod { function: FunctionId, argc: u32 },
    /// Return the value on top of the stack.
    Return,
    ReturnVoid,
}

impl Instruction {
    /// The label this instruction branches to, if any.
    pub fn label(&self) -> Option<Label> {
        match self {
            Instruction::Jump(label)
            | Instruction::JumpIfFalse(label)
            | Instruction::JumpIfTrue(label) => Some(*label),
            _ => None,
        }
    }

    /// The function this instruction calls, if any.
    pub fn callee(&self) -> Option<FunctionId> {
        match self {
            Instruction::Call { function, .. } | Instruction::CallMethod { function, .. } => {
                Some(*function)
            }
            _ => None,
        }
    }

    /// Point a call at `function` instead; other instructions are unchanged.
    pub fn set_callee(&mut self, id: FunctionId) {
        if let Instruction::Call { function, .. } | Instruction::CallMethod { function, .. } = self {
            *function = id;
        }
    }

    /// Whether control never falls through to the next instruction.
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Instruction::Jump(_) | Instruction::Return | Instruction::ReturnVoid
        )
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::PushInt(value) => write!(f, "push.i {value}"),
            Instruction::PushConst(index) => write!(f, "push.k #{index}"),
            Instruction::Pop => f.write_str("pop"),
            Instruction::Dup => f.write_str("dup"),
            Instruction::Swap => f.write_str("swap"),
            Instruction::LoadParam(slot) => write!(f, "ld.arg {slot}"),
            Instruction::AddrParam(slot) => write!(f, "lea.arg {slot}"),
            Instruction::LoadLocal { offset, width } => write!(f, "ld.loc {offset}:{width}"),
            Instruction::AddrLocal(offset) => write!(f, "lea.loc {offset}"),
            Instruction::LoadGlobal { address, width } => write!(f, "ld.glob {address}:{width}"),
            Instruction::AddrGlobal(address) => write!(f, "lea.glob {address}"),
            Instruction::Load(width) => write!(f, "ld {width}"),
            Instruction::Store(width) => write!(f, "st {width}"),
            Instruction::AddOffset(offset) => write!(f, "addo {offset}"),
            Instruction::PtrAdd(scale) => write!(f, "padd {scale}"),
            Instruction::PtrDiff(scale) => write!(f, "pdiff {scale}"),
            Instruction::Binary(op) => write!(f, "{}.i", op.mnemonic()),
            Instruction::FloatBinary(op) => write!(f, "{}.f", op.mnemonic()),
            Instruction::Compare(op) => write!(f, "cmp.{}.i", op.mnemonic()),
            Instruction::FloatCompare(op) => write!(f, "cmp.{}.f", op.mnemonic()),
            Instruction::Neg => f.write_str("neg.i"),
            Instruction::FloatNeg => f.write_str("neg.f"),
            Instruction::Not => f.write_str("not"),
            Instruction::BitNot => f.write_str("bnot"),
            Instruction::IntToFloat(depth) => write!(f, "i2f {depth}"),
            Instruction::FloatToInt(depth) => write!(f, "f2i {depth}"),
            Instruction::Jump(label) => write!(f, "jmp {label}"),
            Instruction::JumpIfFalse(label) => write!(f, "jz {label}"),
            Instruction::JumpIfTrue(label) => write!(f, "jnz {label}"),
            Instruction::Call { function, argc } => write!(f, "call {function} ({argc})"),
            Instruction::CallMethod { function, argc } => {
                write!(f, "call.m {function} ({argc})")
            }
            Instruction::Return => f.write_str("ret"),
            Instruction::ReturnVoid => f.write_str("ret.v"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_label_extraction() {
        let label = Label::from_raw(3);
        assert_eq!(Instruction::Jump(label).label(), Some(label));
        assert_eq!(Instruction::JumpIfTrue(label).label(), Some(label));
        assert_eq!(Instruction::Pop.label(), None);
    }

    #[test]
    fn terminators() {
        assert!(Instruction::Return.is_terminator());
        assert!(Instruction::Jump(Label::from_raw(0)).is_terminator());
        assert!(!Instruction::JumpIfFalse(Label::from_raw(0)).is_terminator());
    }

    #[test]
    fn display_formats() {
        assert_eq!(Instruction::PushInt(-4).to_string(), "push.i -4");
        assert_eq!(
            Instruction::LoadLocal {
                offset: 8,
                width: 4
            }
            .to_string(),
            "ld.loc 8:4"
        );
        assert_eq!(Instruction::Binary(ArithOp::Shl).to_string(), "shl.i");
        assert_eq!(
            Instruction::FloatCompare(CmpOp::Ge).to_string(),
            "cmp.ge.f"
        );
        assert_eq!(
            Instruction::JumpIfFalse(Label::from_raw(2)).to_string(),
            "jz L2"
        );
        assert_eq!(
            Instruction::Call {
                function: FunctionId(1),
                argc: 2
            }
            .to_string(),
            "call fn#1 (2)"
        );
    }
}
