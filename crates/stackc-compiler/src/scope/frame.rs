//! Per-block declarations handed to the function node on block entry.

use stackc_core::{Span, Type};

/// A local variable declared directly in a block.
#[derive(Debug, Clone, PartialEq)]
pub struct Local {
    pub name: String,
    pub ty: Type,
    pub width: u32,
    /// Frame offset, assigned by the function node on every block entry.
    pub offset: u32,
    pub span: Span,
}

impl Local {
    pub fn new(name: impl Into<String>, ty: Type, width: u32, span: Span) -> Self {
        Self {
            name: name.into(),
            ty,
            width,
            offset: 0,
            span,
        }
    }
}

/// The locals and typedefs of one block, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockFrame {
    pub locals: Vec<Local>,
    pub typedefs: Vec<(String, Type)>,
}

impl BlockFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_local(mut self, local: Local) -> Self {
        self.locals.push(local);
        self
    }

    pub fn with_typedef(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.typedefs.push((name.into(), ty));
        self
    }

    pub fn local(&self, name: &str) -> Option<&Local> {
        self.locals.iter().rev().find(|l| l.name == name)
    }

    /// Sum of the locals' widths.
    pub fn width(&self) -> u32 {
        self.locals.iter().map(|l| l.width).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.locals.is_empty() && self.typedefs.is_empty()
    }
}
