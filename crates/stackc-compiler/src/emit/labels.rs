//! Forward-referenceable branch targets.
//!
//! A [`Label`] is a handle allocated before the position it names is known.
//! Instructions may reference it at any time; it is bound exactly once, to
//! the instruction index current at the moment of binding.

use std::fmt;

use stackc_core::CompilationError;

/// Handle to a branch target within one function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(u32);

impl Label {
    pub(crate) fn from_raw(id: u32) -> Self {
        Label(id)
    }

    pub fn id(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Binding state of every label of one function.
#[derive(Debug, Default)]
pub struct LabelTable {
    targets: Vec<Option<usize>>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new unbound label.
    pub fn define(&mut self) -> Label {
        let label = Label(self.targets.len() as u32);
        self.targets.push(None);
        label
    }

    /// Bind `label` to `index`.
    ///
    /// Fails with [`CompilationError::DoubleLabelBinding`] if it is already
    /// bound.
    pub fn bind(&mut self, label: Label, index: usize) -> Result<(), CompilationError> {
        let slot = self
            .targets
            .get_mut(label.index())
            .ok_or_else(|| CompilationError::internal(format!("unknown label {label}")))?;
        if slot.is_some() {
            return Err(CompilationError::DoubleLabelBinding { label: label.id() });
        }
        *slot = Some(index);
        Ok(())
    }

    /// The bound index, or `None` while unbound.
    pub fn target(&self, label: Label) -> Option<usize> {
        self.targets.get(label.index()).copied().flatten()
    }

    pub fn is_bound(&self, label: Label) -> bool {
        self.target(label).is_some()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Resolve every label to its index.
    ///
    /// Fails with [`CompilationError::UnboundLabel`] on the first label
    /// still unbound.
    pub fn into_bound(self) -> Result<Vec<usize>, CompilationError> {
        self.targets
            .into_iter()
            .enumerate()
            .map(|(id, target)| {
                target.ok_or(CompilationError::UnboundLabel { label: id as u32 })
            })
            .collect()
    }
}
