//! Constant pool shared by every function of an executable.
//!
//! The pool stores literal data referenced by `PushConst` instructions:
//! floating-point literals and string data. Identical constants share one
//! slot.

use std::fmt;

use ordered_float::OrderedFloat;
use rustc_hash::FxHashMap;

/// Values stored in the constant pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Constant {
    Int(i64),
    /// Ordered so the pool can hash and deduplicate it.
    Float(OrderedFloat<f64>),
    /// Raw bytes, including the terminating NUL for string literals.
    StringData(Vec<u8>),
}

impl Constant {
    pub fn float(value: f64) -> Self {
        Constant::Float(OrderedFloat(value))
    }

    /// String literal data with its terminating NUL appended.
    pub fn string(bytes: &[u8]) -> Self {
        let mut data = Vec::with_capacity(bytes.len() + 1);
        data.extend_from_slice(bytes);
        data.push(0);
        Constant::StringData(data)
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int(value) => write!(f, "int {value}"),
            Constant::Float(value) => write!(f, "float {}", value.0),
            Constant::StringData(bytes) => {
                let text = bytes.strip_suffix(b"\0".as_slice()).unwrap_or(bytes);
                write!(f, "str {:?}", String::from_utf8_lossy(text))
            }
        }
    }
}

/// Deduplicating constant pool.
#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    constants: Vec<Constant>,
    index: FxHashMap<Constant, u32>,
}

impl ConstantPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a constant or find the identical one already present.
    pub fn add(&mut self, constant: Constant) -> u32 {
        if let Some(&slot) = self.index.get(&constant) {
            return slot;
        }

        let slot = self.constants.len() as u32;
        self.constants.push(constant.clone());
        self.index.insert(constant, slot);
        slot
    }

    pub fn add_f64(&mut self, value: f64) -> u32 {
        self.add(Constant::float(value))
    }

    /// Add string literal bytes (NUL-terminated in the pool).
    pub fn add_string(&mut self, bytes: &[u8]) -> u32 {
        self.add(Constant::string(bytes))
    }

    pub fn get(&self, slot: u32) -> Option<&Constant> {
        self.constants.get(slot as usize)
    }

    pub fn constants(&self) -> &[Constant] {
        &self.constants
    }

    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_share_a_slot() {
        let mut pool = ConstantPool::new();
        let a = pool.add_string(b"hello");
        let b = pool.add_string(b"hello");
        let c = pool.add_string(b"world");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn strings_are_nul_terminated() {
        let mut pool = ConstantPool::new();
        let slot = pool.add_string(b"hi");
        assert_eq!(
            pool.get(slot),
            Some(&Constant::StringData(vec![b'h', b'i', 0]))
        );
    }

    #[test]
    fn floats_deduplicate_by_value() {
        let mut pool = ConstantPool::new();
        let a = pool.add_f64(1.5);
        let b = pool.add_f64(1.5);
        assert_eq!(a, b);
        assert_ne!(pool.add_f64(2.5), a);
    }

    #[test]
    fn kinds_do_not_collide() {
        let mut pool = ConstantPool::new();
        let int = pool.add(Constant::Int(0));
        let float = pool.add_f64(0.0);
        let string = pool.add_string(b"");
        assert_eq!(pool.len(), 3);
        assert!(int != float && float != string);
    }

    #[test]
    fn display() {
        assert_eq!(Constant::string(b"a\n").to_string(), "str \"a\\n\"");
        assert_eq!(Constant::float(0.5).to_string(), "float 0.5");
    }
}
