//! Instruction set and constant pool.

mod constant;
mod instruction;

pub use constant::{Constant, ConstantPool};
pub use instruction::{ArithOp, CmpOp, Instruction};
