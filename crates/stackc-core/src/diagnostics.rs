//! Diagnostic sink.
//!
//! [`Diagnostics`] accumulates the errors reported during one compilation,
//! in the order they were reported. A compilation succeeds only if the sink
//! is empty when the walk finishes.

use std::fmt;

use crate::CompilationError;

/// Ordered collection of reported errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    errors: Vec<CompilationError>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error.
    pub fn push(&mut self, error: CompilationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompilationError> {
        self.errors.iter()
    }

    /// Whether any reported error is internal.
    pub fn has_internal(&self) -> bool {
        self.errors.iter().any(CompilationError::is_internal)
    }

    pub fn into_vec(self) -> Vec<CompilationError> {
        self.errors
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "error: {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostics {}

impl IntoIterator for Diagnostics {
    type Item = CompilationError;
    type IntoIter = std::vec::IntoIter<CompilationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl Extend<CompilationError> for Diagnostics {
    fn extend<T: IntoIterator<Item = CompilationError>>(&mut self, iter: T) {
        self.errors.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Span;

    #[test]
    fn keeps_report_order() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(CompilationError::NotConstant {
            span: Span::new(1, 1, 0),
        });
        diagnostics.push(CompilationError::MissingEntryPoint {
            name: "main".into(),
        });

        assert_eq!(diagnostics.len(), 2);
        let rendered = diagnostics.to_string();
        assert_eq!(
            rendered,
            "error: at 1:1: expression is not an integer constant\nerror: entry point 'main' is not defined"
        );
    }

    #[test]
    fn detects_internal_errors() {
        let mut diagnostics = Diagnostics::new();
        assert!(!diagnostics.has_internal());
        diagnostics.push(CompilationError::DoubleLabelBinding { label: 0 });
        assert!(diagnostics.has_internal());
    }
}
