//! Compiler configuration.

use stackc_core::TargetMachine;

/// Settings for one compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Logical widths used for frame, struct and data-segment layout.
    pub target: TargetMachine,
    /// Name of the free function the VM starts in.
    pub entry_point: String,
    /// Report [`MissingEntryPoint`](stackc_core::CompilationError::MissingEntryPoint)
    /// when no free function has the entry point's name.
    pub require_entry_point: bool,
    /// Stop compiling further function bodies once this many errors have
    /// been reported.
    pub max_errors: Option<usize>,
}

impl CompilerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target(mut self, target: TargetMachine) -> Self {
        self.target = target;
        self
    }

    pub fn with_entry_point(mut self, name: impl Into<String>) -> Self {
        self.entry_point = name.into();
        self
    }

    pub fn with_require_entry_point(mut self, require: bool) -> Self {
        self.require_entry_point = require;
        self
    }

    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = Some(max_errors);
        self
    }

    /// Whether `errors` reported errors reach the configured cap.
    pub fn error_limit_reached(&self, errors: usize) -> bool {
        self.max_errors.is_some_and(|max| errors >= max)
    }
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            target: TargetMachine::default(),
            entry_point: "main".to_string(),
            require_entry_point: false,
            max_errors: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = CompilerOptions::default();
        assert_eq!(options.target, TargetMachine::LP64);
        assert_eq!(options.entry_point, "main");
        assert!(!options.require_entry_point);
        assert!(!options.error_limit_reached(1000));
    }

    #[test]
    fn builders_override() {
        let options = CompilerOptions::new()
            .with_target(TargetMachine::ILP32)
            .with_entry_point("start")
            .with_require_entry_point(true)
            .with_max_errors(2);
        assert_eq!(options.target.pointer_width, 4);
        assert_eq!(options.entry_point, "start");
        assert!(options.require_entry_point);
        assert!(!options.error_limit_reached(1));
        assert!(options.error_limit_reached(2));
    }
}
