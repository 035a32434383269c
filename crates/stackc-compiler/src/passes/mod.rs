//! Compiler passes.
//!
//! - [`registration`]: register types, globals and function signatures
//!   before any body is compiled, so bodies can refer to anything declared
//!   anywhere in the translation unit

pub mod registration;

pub use registration::{PendingFunction, RegistrationOutput, RegistrationPass};
