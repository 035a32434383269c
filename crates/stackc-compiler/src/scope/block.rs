//! Block resolver node.

use super::{BlockFrame, Resolver, Result};

/// Marks one active block.
///
/// The block's locals live in the enclosing function node's flattened
/// table; this node only brackets their lifetime. [`BlockScope::enter`]
/// pushes the frame and [`BlockScope::exit`] pops it, so every entered
/// block must be exited through `exit`.
pub struct BlockScope<'p> {
    parent: &'p mut dyn Resolver,
}

impl<'p> BlockScope<'p> {
    pub fn enter(parent: &'p mut dyn Resolver, frame: BlockFrame) -> Result<Self> {
        parent.begin_block(frame)?;
        Ok(Self { parent })
    }

    pub fn exit(self) -> Result<()> {
        self.parent.end_block()
    }
}

impl Resolver for BlockScope<'_> {
    fn parent(&self) -> Option<&dyn Resolver> {
        Some(&*self.parent)
    }

    fn parent_mut(&mut self) -> Option<&mut dyn Resolver> {
        Some(&mut *self.parent)
    }
}
