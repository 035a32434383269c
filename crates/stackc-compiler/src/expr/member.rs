//! Field access and indexing.
//!
//! Both are address computations; reading the value adds a `Load`.
//!
//! ```text
//! s.f:     [address s]  AddOffset(f)
//! p->f:    [p]          AddOffset(f)
//! p[i]:    [p]  [i]     PtrAdd(width of *p)
//! ```

use stackc_ast::{IndexExpr, MemberExpr};
use stackc_core::{CompilationError, Span, Type};

use crate::bytecode::Instruction;

use super::{ExprCompiler, Result};

pub(super) fn compile_member(compiler: &mut ExprCompiler<'_>, member: &MemberExpr<'_>) -> Result<Type> {
    let ty = address_of_member(compiler, member)?;
    load(compiler, ty, member.span)
}

pub(super) fn compile_index(compiler: &mut ExprCompiler<'_>, index: &IndexExpr<'_>) -> Result<Type> {
    let ty = address_of_index(compiler, index)?;
    load(compiler, ty, index.span)
}

fn load(compiler: &mut ExprCompiler<'_>, ty: Type, span: Span) -> Result<Type> {
    let width = compiler.value_width(&ty, span)?;
    compiler.emit(Instruction::Load(width))?;
    Ok(ty)
}

pub(super) fn address_of_member(
    compiler: &mut ExprCompiler<'_>,
    member: &MemberExpr<'_>,
) -> Result<Type> {
    let base = if member.arrow {
        compiler.infer(member.base)?
    } else {
        compiler.address(member.base)?
    };
    let owner = if member.arrow {
        base.pointee().and_then(Type::struct_id)
    } else {
        base.struct_id()
    };
    let Some(owner) = owner else {
        let operator = if member.arrow { "->" } else { "." };
        return Err(compiler.mismatch(
            format!(
                "'{operator}{}' applied to '{}'",
                member.field.name,
                compiler.scope.describe(&base)
            ),
            member.span,
        ));
    };

    let def = compiler
        .scope
        .struct_def(owner)
        .ok_or_else(|| CompilationError::internal(format!("unknown struct #{}", owner.0)))?;
    if !def.complete {
        return Err(CompilationError::IncompleteType {
            name: format!("struct {}", def.name),
            span: member.span,
        });
    }
    let Some(field) = def.field(member.field.name) else {
        return Err(CompilationError::UnknownField {
            struct_name: def.name.clone(),
            field: member.field.name.to_string(),
            span: member.field.span,
        });
    };
    let (offset, ty) = (field.offset, field.ty.clone());

    compiler.emit(Instruction::AddOffset(offset))?;
    Ok(ty)
}

pub(super) fn address_of_index(compiler: &mut ExprCompiler<'_>, index: &IndexExpr<'_>) -> Result<Type> {
    let base = compiler.infer(index.base)?;
    let Some(element) = base.pointee().cloned() else {
        return Err(compiler.mismatch(
            format!("cannot index '{}'", compiler.scope.describe(&base)),
            index.span,
        ));
    };

    let subscript = compiler.infer(index.index)?;
    if !subscript.is_integer() {
        return Err(compiler.mismatch(
            format!(
                "array subscript is '{}', not an integer",
                compiler.scope.describe(&subscript)
            ),
            index.index.span(),
        ));
    }

    let scale = compiler.pointee_width(&base, index.span)?;
    compiler.emit(Instruction::PtrAdd(scale))?;
    Ok(element)
}
