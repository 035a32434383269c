//! Break/continue target node.

use crate::emit::Label;

use super::Resolver;

/// Exposes the targets of `break` and `continue`.
///
/// Loops supply both labels. A `switch` supplies only a break target; a
/// `continue` inside it is answered by the nearest enclosing node that
/// has a continue target. `break` never looks past this node.
pub struct LoopScope<'p> {
    parent: &'p mut dyn Resolver,
    break_label: Label,
    continue_label: Option<Label>,
}

impl<'p> LoopScope<'p> {
    pub fn new(
        parent: &'p mut dyn Resolver,
        break_label: Label,
        continue_label: Option<Label>,
    ) -> Self {
        Self {
            parent,
            break_label,
            continue_label,
        }
    }
}

impl Resolver for LoopScope<'_> {
    fn parent(&self) -> Option<&dyn Resolver> {
        Some(&*self.parent)
    }

    fn parent_mut(&mut self) -> Option<&mut dyn Resolver> {
        Some(&mut *self.parent)
    }

    fn break_label(&self) -> Option<Label> {
        Some(self.break_label)
    }

    fn continue_label(&self) -> Option<Label> {
        self.continue_label
            .or_else(|| self.parent.continue_label())
    }
}
