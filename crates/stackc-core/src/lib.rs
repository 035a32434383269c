//! Core types shared by the stackc crates.
//!
//! - [`Span`]: source locations
//! - [`Type`], [`PrimitiveKind`] and the id newtypes: resolved types
//! - [`TargetMachine`]: logical widths used for storage layout
//! - [`CompilationError`] and [`Diagnostics`]: error reporting

mod diagnostics;
mod error;
mod span;
mod target;
mod types;

pub use diagnostics::Diagnostics;
pub use error::CompilationError;
pub use span::Span;
pub use target::TargetMachine;
pub use types::{EnumId, FunctionId, PrimitiveKind, StructId, Type};
