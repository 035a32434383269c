//! Identifier loads and addresses.

use stackc_ast::Ident;
use stackc_core::{CompilationError, Type};

use crate::bytecode::Instruction;
use crate::scope::{Storage, Symbol};

use super::{ExprCompiler, Result};

fn lookup(compiler: &ExprCompiler<'_>, ident: &Ident<'_>) -> Result<Symbol> {
    compiler
        .scope
        .resolve_variable(ident.name, None)
        .ok_or_else(|| CompilationError::UnresolvedIdentifier {
            name: ident.name.to_string(),
            span: ident.span,
        })
}

pub(super) fn compile_ident(compiler: &mut ExprCompiler<'_>, ident: &Ident<'_>) -> Result<Type> {
    let symbol = lookup(compiler, ident)?;
    let instruction = match symbol.storage {
        Storage::EnumConstant(value) => Instruction::PushInt(value),
        Storage::Function(_) => {
            return Err(CompilationError::InvalidOperation {
                message: format!("function '{}' used as a value", ident.name),
                span: ident.span,
            });
        }
        Storage::Parameter(slot) => {
            compiler.value_width(&symbol.ty, ident.span)?;
            Instruction::LoadParam(slot)
        }
        Storage::Local(offset) => Instruction::LoadLocal {
            offset,
            width: compiler.value_width(&symbol.ty, ident.span)?,
        },
        Storage::Global(address) => Instruction::LoadGlobal {
            address,
            width: compiler.value_width(&symbol.ty, ident.span)?,
        },
    };
    compiler.emit(instruction)?;
    Ok(symbol.ty)
}

pub(super) fn address_of_ident(compiler: &mut ExprCompiler<'_>, ident: &Ident<'_>) -> Result<Type> {
    let symbol = lookup(compiler, ident)?;
    let instruction = match symbol.storage {
        Storage::Parameter(slot) => Instruction::AddrParam(slot),
        Storage::Local(offset) => Instruction::AddrLocal(offset),
        Storage::Global(address) => Instruction::AddrGlobal(address),
        Storage::EnumConstant(_) | Storage::Function(_) => {
            return Err(CompilationError::InvalidOperation {
                message: format!("'{}' is not assignable", ident.name),
                span: ident.span,
            });
        }
    };
    compiler.emit(instruction)?;
    Ok(symbol.ty)
}
