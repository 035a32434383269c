//! Expression compiler.
//!
//! The [`ExprCompiler`] lowers expressions to stack code through the
//! innermost node of the resolver chain. It works in three modes:
//! - `infer()` pushes the expression's value and returns its type
//! - `check()` pushes the value converted to an expected type
//! - `address()` pushes the address of an lvalue and returns the type
//!   stored there
//!
//! Struct values never travel on the stack. A struct is reached through
//! its address, with `.` and `->` adding field offsets.
//!
//! # Example
//!
//! ```ignore
//! let mut compiler = ExprCompiler::new(&mut scope);
//! let ty = compiler.infer(expr)?;
//! compiler.check(init, &Type::INT)?;
//! ```

mod assignment;
mod binary;
mod calls;
mod cast;
mod identifiers;
mod literals;
mod member;
mod ternary;
mod unary;

use stackc_ast::{Expr, UnaryOp};
use stackc_core::{CompilationError, Span, Type};

use crate::bytecode::{Constant, Instruction};
use crate::emit::Label;
use crate::scope::Resolver;
use crate::types::{Conversion, find_conversion};

type Result<T> = std::result::Result<T, CompilationError>;

/// Compiles expressions against a resolver chain.
pub struct ExprCompiler<'a> {
    scope: &'a mut dyn Resolver,
}

impl<'a> ExprCompiler<'a> {
    pub fn new(scope: &'a mut dyn Resolver) -> Self {
        Self { scope }
    }

    /// Push the value of `expr` and return its type.
    ///
    /// Calls to void functions push nothing and return `void`.
    pub fn infer(&mut self, expr: &Expr<'_>) -> Result<Type> {
        match expr {
            Expr::Literal(lit) => literals::compile_literal(self, lit),
            Expr::Ident(ident) => identifiers::compile_ident(self, ident),
            Expr::Binary(binary) => binary::compile_binary(self, binary),
            Expr::Unary(unary) => unary::compile_unary(self, unary),
            Expr::Postfix(postfix) => unary::compile_postfix(self, postfix),
            Expr::Assign(assign) => assignment::compile_assign(self, assign),
            Expr::Ternary(ternary) => ternary::compile_ternary(self, ternary),
            Expr::Call(call) => calls::compile_call(self, call),
            Expr::MethodCall(call) => calls::compile_method_call(self, call),
            Expr::Member(member) => member::compile_member(self, member),
            Expr::Index(index) => member::compile_index(self, index),
            Expr::Cast(cast) => cast::compile_cast(self, cast),
            Expr::SizeOf(size_of) => cast::compile_sizeof(self, size_of),
        }
    }

    /// Push the value of `expr` converted to `expected`.
    pub fn check(&mut self, expr: &Expr<'_>, expected: &Type) -> Result<()> {
        let ty = self.infer(expr)?;
        self.convert(&ty, expected, expr.is_zero_literal(), 0, expr.span())
    }

    /// Push a value usable by `JumpIfFalse`/`JumpIfTrue`.
    ///
    /// Integers and pointers test as-is; floats are compared against zero.
    pub fn condition(&mut self, expr: &Expr<'_>) -> Result<()> {
        let ty = self.infer(expr)?;
        if ty.is_floating() {
            let zero = self.scope.intern(Constant::float(0.0))?;
            self.emit(Instruction::PushConst(zero))?;
            self.emit(Instruction::FloatCompare(crate::bytecode::CmpOp::Ne))?;
        } else if !ty.is_scalar() {
            return Err(CompilationError::TypeMismatch {
                message: format!(
                    "condition must be a scalar value, found '{}'",
                    self.scope.describe(&ty)
                ),
                span: expr.span(),
            });
        }
        Ok(())
    }

    /// Push the address of the lvalue `expr` and return the type stored
    /// at that address.
    pub fn address(&mut self, expr: &Expr<'_>) -> Result<Type> {
        match expr {
            Expr::Ident(ident) => identifiers::address_of_ident(self, ident),
            Expr::Unary(unary) if unary.op == UnaryOp::Deref => {
                unary::address_of_deref(self, unary.operand, unary.span)
            }
            Expr::Member(member) => member::address_of_member(self, member),
            Expr::Index(index) => member::address_of_index(self, index),
            _ => Err(CompilationError::InvalidOperation {
                message: "expression is not assignable".to_string(),
                span: expr.span(),
            }),
        }
    }

    /// Evaluate `expr` for its side effects only.
    pub fn discard(&mut self, expr: &Expr<'_>) -> Result<()> {
        if !self.infer(expr)?.is_void() {
            self.emit(Instruction::Pop)?;
        }
        Ok(())
    }

    // =========================================================================
    // Shared helpers
    // =========================================================================

    fn emit(&mut self, instruction: Instruction) -> Result<()> {
        self.scope.emit(instruction).map(|_| ())
    }

    fn define_label(&mut self) -> Result<Label> {
        self.scope.define_label()
    }

    fn bind_label(&mut self, label: Label) -> Result<()> {
        self.scope.bind_label(label)
    }

    /// Convert the value `depth` entries below the top of the stack from
    /// `from` to `to`, implicitly.
    fn convert(
        &mut self,
        from: &Type,
        to: &Type,
        null_constant: bool,
        depth: usize,
        span: Span,
    ) -> Result<()> {
        match find_conversion(from, to, false, null_constant) {
            Some(conversion) => self.emit_conversion(conversion, depth, span),
            None => Err(CompilationError::TypeMismatch {
                message: format!(
                    "cannot convert '{}' to '{}'",
                    self.scope.describe(from),
                    self.scope.describe(to)
                ),
                span,
            }),
        }
    }

    fn emit_conversion(&mut self, conversion: Conversion, depth: usize, span: Span) -> Result<()> {
        let depth = u8::try_from(depth).map_err(|_| CompilationError::InvalidOperation {
            message: "too many arguments".to_string(),
            span,
        })?;
        match conversion {
            Conversion::Identity => Ok(()),
            Conversion::IntToFloat => self.emit(Instruction::IntToFloat(depth)),
            Conversion::FloatToInt => self.emit(Instruction::FloatToInt(depth)),
        }
    }

    /// Width of a value of type `ty` on the stack.
    ///
    /// Structs and `void` are not values.
    fn value_width(&self, ty: &Type, span: Span) -> Result<u32> {
        if ty.struct_id().is_some() {
            return Err(CompilationError::InvalidOperation {
                message: format!(
                    "'{}' cannot be used as a value; access a field or take its address",
                    self.scope.describe(ty)
                ),
                span,
            });
        }
        self.scope
            .width_of(ty)
            .ok_or_else(|| CompilationError::InvalidOperation {
                message: "void value not ignored".to_string(),
                span,
            })
    }

    /// Width of what `pointer` points at, for scaling arithmetic.
    fn pointee_width(&self, pointer: &Type, span: Span) -> Result<u32> {
        let pointee = pointer
            .pointee()
            .ok_or_else(|| CompilationError::internal("pointee of a non-pointer"))?;
        if pointee.is_void() {
            return Err(CompilationError::InvalidOperation {
                message: "arithmetic on 'void*'".to_string(),
                span,
            });
        }
        self.scope
            .width_of(pointee)
            .ok_or_else(|| CompilationError::IncompleteType {
                name: self.scope.describe(pointee),
                span,
            })
    }

    fn mismatch(&self, message: impl Into<String>, span: Span) -> CompilationError {
        CompilationError::TypeMismatch {
            message: message.into(),
            span,
        }
    }
}
