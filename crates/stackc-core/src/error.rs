//! Compilation errors.
//!
//! Every failure the resolver chain or the code generator can produce is a
//! [`CompilationError`]. Most variants are user-facing diagnostics: they are
//! reported to the sink and compilation continues with the next construct.
//! A few variants signal that the emitter's own discipline was violated;
//! those are [internal](CompilationError::is_internal) and abort the
//! function being compiled.

use thiserror::Error;

use crate::Span;

/// Errors produced while resolving names and emitting instructions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompilationError {
    /// A name was not found anywhere in the resolver chain.
    #[error("at {span}: unresolved identifier '{name}'")]
    UnresolvedIdentifier {
        /// The name that wasn't found.
        name: String,
        /// Where it was referenced.
        span: Span,
    },

    /// A type name was not found anywhere in the resolver chain.
    #[error("at {span}: unresolved type name '{name}'")]
    UnresolvedTypeName {
        /// The type name that wasn't found.
        name: String,
        /// Where it was referenced.
        span: Span,
    },

    /// `break` or `continue` used outside a construct exposing its target.
    #[error("at {span}: '{keyword}' is not inside a construct it can target")]
    InvalidBreakOrContinue {
        /// Either `break` or `continue`.
        keyword: &'static str,
        /// Where the statement appears.
        span: Span,
    },

    /// Two locals with the same name in the same block.
    #[error("at {new_span}: local '{name}' redeclared (originally declared at {original_span})")]
    DuplicateLocalDeclaration {
        /// The local's name.
        name: String,
        /// The earlier declaration.
        original_span: Span,
        /// The later declaration, which wins for storage.
        new_span: Span,
    },

    /// A file-scope entity (struct, enum, typedef, global, function) or a
    /// field/parameter was defined twice.
    #[error("at {span}: duplicate definition of '{name}'")]
    DuplicateDefinition {
        /// The duplicated name.
        name: String,
        /// Where the duplicate appears.
        span: Span,
    },

    /// Two `case` labels of one switch share a value.
    #[error("at {span}: duplicate case value {value}")]
    DuplicateCase {
        /// The repeated value.
        value: i64,
        /// Where the second label appears.
        span: Span,
    },

    /// An expression's type is not acceptable where it is used.
    #[error("at {span}: {message}")]
    TypeMismatch {
        /// Description of the mismatch.
        message: String,
        /// Where the mismatch occurred.
        span: Span,
    },

    /// Member access named a field the struct does not have.
    #[error("at {span}: struct '{struct_name}' has no field '{field}'")]
    UnknownField {
        /// The struct's tag.
        struct_name: String,
        /// The missing field.
        field: String,
        /// Where the access occurred.
        span: Span,
    },

    /// A function exists under this name but no overload accepts the arguments.
    #[error("at {span}: no overload of '{name}' accepts ({args})")]
    NoMatchingOverload {
        /// The function name.
        name: String,
        /// Argument types, comma separated.
        args: String,
        /// Where the call occurred.
        span: Span,
    },

    /// An operation that is not valid for its operands.
    #[error("at {span}: {message}")]
    InvalidOperation {
        /// Description of what's invalid.
        message: String,
        /// Where the operation occurred.
        span: Span,
    },

    /// An expression that must be an integer constant is not one.
    #[error("at {span}: expression is not an integer constant")]
    NotConstant {
        /// The offending expression.
        span: Span,
    },

    /// A struct was used by value before its definition was complete.
    #[error("at {span}: '{name}' has incomplete type")]
    IncompleteType {
        /// The struct's tag.
        name: String,
        /// Where it was used.
        span: Span,
    },

    /// A non-void function can reach its end without returning a value.
    #[error("at {span}: not all paths of '{name}' return a value")]
    MissingReturn {
        /// The function name.
        name: String,
        /// The function's declaration.
        span: Span,
    },

    /// A function was declared but never given a body.
    #[error("at {span}: function '{name}' is declared but never defined")]
    UndefinedFunction {
        /// The function name.
        name: String,
        /// The declaration.
        span: Span,
    },

    /// The configured entry point does not exist.
    #[error("entry point '{name}' is not defined")]
    MissingEntryPoint {
        /// The configured entry point name.
        name: String,
    },

    /// A label was bound twice. Emitter bug, not malformed input.
    #[error("internal error: label L{label} bound twice")]
    DoubleLabelBinding {
        /// The label's id.
        label: u32,
    },

    /// A label referenced by an instruction was never bound.
    #[error("internal error: label L{label} referenced but never bound")]
    UnboundLabel {
        /// The label's id.
        label: u32,
    },

    /// Any other violation of the compiler's own invariants.
    #[error("internal error: {message}")]
    Internal {
        /// The error message.
        message: String,
    },
}

impl CompilationError {
    /// Whether this error reflects a compiler bug rather than bad input.
    ///
    /// Internal errors abort compilation of the current function.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            CompilationError::DoubleLabelBinding { .. }
                | CompilationError::UnboundLabel { .. }
                | CompilationError::Internal { .. }
        )
    }

    /// Build an [`Internal`](CompilationError::Internal) error.
    pub fn internal(message: impl Into<String>) -> Self {
        CompilationError::Internal {
            message: message.into(),
        }
    }

    /// Where this error occurred, if it has a source location.
    pub fn span(&self) -> Option<Span> {
        match self {
            CompilationError::UnresolvedIdentifier { span, .. }
            | CompilationError::UnresolvedTypeName { span, .. }
            | CompilationError::InvalidBreakOrContinue { span, .. }
            | CompilationError::DuplicateDefinition { span, .. }
            | CompilationError::DuplicateCase { span, .. }
            | CompilationError::TypeMismatch { span, .. }
            | CompilationError::UnknownField { span, .. }
            | CompilationError::NoMatchingOverload { span, .. }
            | CompilationError::InvalidOperation { span, .. }
            | CompilationError::NotConstant { span }
            | CompilationError::IncompleteType { span, .. }
            | CompilationError::MissingReturn { span, .. }
            | CompilationError::UndefinedFunction { span, .. } => Some(*span),
            CompilationError::DuplicateLocalDeclaration { new_span, .. } => Some(*new_span),
            CompilationError::MissingEntryPoint { .. }
            | CompilationError::DoubleLabelBinding { .. }
            | CompilationError::UnboundLabel { .. }
            | CompilationError::Internal { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_errors_are_internal() {
        assert!(CompilationError::DoubleLabelBinding { label: 3 }.is_internal());
        assert!(CompilationError::UnboundLabel { label: 3 }.is_internal());
        assert!(CompilationError::internal("boom").is_internal());
    }

    #[test]
    fn resolution_errors_are_diagnostics() {
        let err = CompilationError::UnresolvedIdentifier {
            name: "x".into(),
            span: Span::new(4, 2, 1),
        };
        assert!(!err.is_internal());
        assert_eq!(err.span(), Some(Span::new(4, 2, 1)));
        assert_eq!(err.to_string(), "at 4:2: unresolved identifier 'x'");
    }

    #[test]
    fn duplicate_local_reports_new_span() {
        let err = CompilationError::DuplicateLocalDeclaration {
            name: "t".into(),
            original_span: Span::new(1, 1, 1),
            new_span: Span::new(2, 1, 1),
        };
        assert_eq!(err.span(), Some(Span::new(2, 1, 1)));
    }

    #[test]
    fn break_message_names_keyword() {
        let err = CompilationError::InvalidBreakOrContinue {
            keyword: "continue",
            span: Span::new(7, 9, 8),
        };
        assert_eq!(
            err.to_string(),
            "at 7:9: 'continue' is not inside a construct it can target"
        );
    }
}
