//! Registration pass - declare everything a function body can refer to.
//!
//! Walks the translation unit once, before any body is compiled:
//!
//! 1. Every struct tag is declared up front, so a struct may point to one
//!    defined further down.
//! 2. Items are then registered in source order: struct layouts, enum
//!    members, typedefs, globals with their constant initializers, and
//!    function signatures.
//!
//! Errors are reported to the diagnostic sink and the offending item (or
//! member) is skipped; registration itself never stops early.

use rustc_hash::FxHashSet;
use stackc_ast::{
    EnumDecl, Expr, FunctionDecl, Item, LiteralExpr, LiteralKind, StructDecl, TranslationUnit,
    TypedefDecl, VarDeclStmt, VarDeclarator,
};
use stackc_core::{CompilationError, FunctionId, StructId, Type};

use crate::bytecode::Constant;
use crate::const_eval::{eval_float, eval_int, truncate};
use crate::executable::Signature;
use crate::scope::{EnumScope, Resolver, UnitScope};
use crate::types::resolve_type;

type Result<T> = std::result::Result<T, CompilationError>;

/// A function with a body, waiting for code generation.
#[derive(Debug, Clone, Copy)]
pub struct PendingFunction<'ast> {
    pub id: FunctionId,
    pub decl: &'ast FunctionDecl<'ast>,
}

/// Output of the registration pass.
#[derive(Debug, Default)]
pub struct RegistrationOutput<'ast> {
    pub structs_registered: usize,
    pub enums_registered: usize,
    pub globals_registered: usize,
    pub functions_registered: usize,
    /// Definitions in source order.
    pub pending: Vec<PendingFunction<'ast>>,
}

/// Registers the declarations of one translation unit into its unit node.
pub struct RegistrationPass<'a, 'p> {
    unit: &'a mut UnitScope<'p>,
    structs_registered: usize,
    enums_registered: usize,
    globals_registered: usize,
    functions_registered: usize,
}

impl<'a, 'p> RegistrationPass<'a, 'p> {
    pub fn new(unit: &'a mut UnitScope<'p>) -> Self {
        Self {
            unit,
            structs_registered: 0,
            enums_registered: 0,
            globals_registered: 0,
            functions_registered: 0,
        }
    }

    /// Run the pass over `translation_unit`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run<'ast>(mut self, translation_unit: &TranslationUnit<'ast>) -> RegistrationOutput<'ast> {
        let tags: Vec<Option<StructId>> = translation_unit
            .items
            .iter()
            .map(|item| match item {
                Item::Struct(decl) => self.declare_struct_tag(decl),
                _ => None,
            })
            .collect();

        let mut pending = Vec::new();
        for (item, tag) in translation_unit.items.iter().zip(tags) {
            let result = match item {
                Item::Struct(decl) => match tag {
                    Some(id) => self.register_struct_layout(decl, id),
                    None => Ok(()),
                },
                Item::Enum(decl) => self.register_enum(decl),
                Item::Typedef(decl) => self.register_typedef(decl),
                Item::Global(decl) => self.register_globals(decl),
                Item::Function(decl) => self.register_function(decl).map(|id| {
                    if decl.body.is_some() {
                        pending.push(PendingFunction { id, decl: *decl });
                    }
                }),
            };
            if let Err(error) = result {
                self.unit.report(error);
            }
        }

        tracing::debug!(
            structs = self.structs_registered,
            enums = self.enums_registered,
            globals = self.globals_registered,
            functions = self.functions_registered,
            definitions = pending.len(),
            "registration complete"
        );
        RegistrationOutput {
            structs_registered: self.structs_registered,
            enums_registered: self.enums_registered,
            globals_registered: self.globals_registered,
            functions_registered: self.functions_registered,
            pending,
        }
    }

    fn declare_struct_tag(&mut self, decl: &StructDecl<'_>) -> Option<StructId> {
        match self.unit.declare_struct(decl.name.name, decl.name.span) {
            Ok(id) => Some(id),
            Err(error) => {
                self.unit.report(error);
                None
            }
        }
    }

    /// Lay out the fields back to back. A bad field is reported and left
    /// out of the layout.
    fn register_struct_layout(&mut self, decl: &StructDecl<'_>, id: StructId) -> Result<()> {
        let mut seen = FxHashSet::default();
        let mut fields = Vec::with_capacity(decl.fields.len());

        for field in decl.fields {
            let laid_out = resolve_type(&*self.unit, &field.ty).and_then(|ty| {
                if !seen.insert(field.name.name) {
                    return Err(CompilationError::DuplicateDefinition {
                        name: format!("{}::{}", decl.name.name, field.name.name),
                        span: field.name.span,
                    });
                }
                let width = self.object_width(&ty, field.name.name, field.span)?;
                Ok((field.name.name.to_string(), ty, width))
            });
            match laid_out {
                Ok(field) => fields.push(field),
                Err(error) => self.unit.report(error),
            }
        }

        self.unit.define_struct_layout(id, fields)?;
        self.structs_registered += 1;
        Ok(())
    }

    /// Members without an initializer continue from the previous value.
    /// Initializers see the members declared before them.
    fn register_enum(&mut self, decl: &EnumDecl<'_>) -> Result<()> {
        let id = self.unit.declare_enum(decl.name.name, decl.name.span)?;
        let mut next = 0i64;

        for member in decl.members {
            let value = match member.value {
                Some(expr) => {
                    let evaluated = {
                        let scope = EnumScope::new(&mut *self.unit, id);
                        eval_int(&scope, expr)
                    };
                    evaluated.unwrap_or_else(|error| {
                        self.unit.report(error);
                        next
                    })
                }
                None => next,
            };
            if let Err(error) = self
                .unit
                .add_enum_member(id, member.name.name, value, member.name.span)
            {
                self.unit.report(error);
            }
            next = value.wrapping_add(1);
        }

        self.enums_registered += 1;
        Ok(())
    }

    fn register_typedef(&mut self, decl: &TypedefDecl<'_>) -> Result<()> {
        let ty = resolve_type(&*self.unit, &decl.ty)?;
        self.unit.declare_typedef(decl.name.name, ty, decl.name.span)
    }

    fn register_globals(&mut self, decl: &VarDeclStmt<'_>) -> Result<()> {
        let ty = resolve_type(&*self.unit, &decl.ty)?;
        for var in decl.vars {
            if let Err(error) = self.register_global(var, &ty) {
                self.unit.report(error);
            }
        }
        Ok(())
    }

    fn register_global(&mut self, var: &VarDeclarator<'_>, ty: &Type) -> Result<()> {
        let width = self.object_width(ty, var.name.name, var.span)?;
        let init = match var.init {
            Some(expr) => self.global_initializer(ty, width, expr)?,
            None => None,
        };
        self.unit
            .program_mut()
            .declare_global(var.name.name, ty.clone(), width, init, var.name.span)?;
        self.globals_registered += 1;
        Ok(())
    }

    /// Fold a global initializer into data-segment contents. A null
    /// pointer needs no initializer since the segment starts zeroed.
    fn global_initializer(&self, ty: &Type, width: u32, expr: &Expr<'_>) -> Result<Option<Constant>> {
        let scope: &dyn Resolver = &*self.unit;
        if ty.is_integer() {
            return Ok(Some(Constant::Int(truncate(eval_int(scope, expr)?, width))));
        }
        if ty.is_floating() {
            return Ok(Some(Constant::float(eval_float(scope, expr)?)));
        }
        if ty.is_pointer() {
            if expr.is_zero_literal() {
                return Ok(None);
            }
            if let Expr::Literal(LiteralExpr {
                kind: LiteralKind::String(bytes),
                ..
            }) = expr
                && *ty == Type::CHAR.pointer_to()
            {
                return Ok(Some(Constant::string(bytes)));
            }
            return Err(CompilationError::NotConstant { span: expr.span() });
        }
        Err(CompilationError::InvalidOperation {
            message: format!("cannot initialize a global of type '{}'", scope.describe(ty)),
            span: expr.span(),
        })
    }

    fn register_function(&mut self, decl: &FunctionDecl<'_>) -> Result<FunctionId> {
        let return_type = resolve_type(&*self.unit, &decl.return_type)?;
        if return_type.struct_id().is_some() {
            return Err(CompilationError::InvalidOperation {
                message: format!(
                    "function '{}' returns a struct by value; return a pointer instead",
                    decl.name.name
                ),
                span: decl.return_type.span(),
            });
        }

        let mut signature = Signature::new(decl.name.name, return_type, decl.span);
        if let Some(owner) = decl.owner {
            let id = self.unit.resolve_struct_tag(owner.name).ok_or_else(|| {
                CompilationError::UnresolvedTypeName {
                    name: format!("struct {}", owner.name),
                    span: owner.span,
                }
            })?;
            signature = signature.with_owner(id);
        }

        let mut seen = FxHashSet::default();
        for param in decl.params {
            let ty = resolve_type(&*self.unit, &param.ty)?;
            if ty.is_void() {
                return Err(CompilationError::InvalidOperation {
                    message: format!("parameter '{}' declared void", param.name.name),
                    span: param.span,
                });
            }
            if ty.struct_id().is_some() {
                return Err(CompilationError::InvalidOperation {
                    message: format!(
                        "parameter '{}' passes a struct by value; pass a pointer instead",
                        param.name.name
                    ),
                    span: param.span,
                });
            }
            if !seen.insert(param.name.name) {
                return Err(CompilationError::DuplicateDefinition {
                    name: param.name.name.to_string(),
                    span: param.name.span,
                });
            }
            signature = signature.with_param(param.name.name, ty);
        }

        let id = self
            .unit
            .program_mut()
            .declare_function(signature, decl.body.is_some())?;
        self.functions_registered += 1;
        Ok(id)
    }

    /// Width of a field or global of type `ty`.
    fn object_width(&self, ty: &Type, name: &str, span: stackc_core::Span) -> Result<u32> {
        if ty.is_void() {
            return Err(CompilationError::InvalidOperation {
                message: format!("'{name}' declared void"),
                span,
            });
        }
        self.unit
            .width_of(ty)
            .ok_or_else(|| CompilationError::IncompleteType {
                name: self.unit.describe(ty),
                span,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::ProgramScope;
    use bumpalo::Bump;
    use stackc_ast::{AstBuilder, BinaryOp, UnaryOp};
    use stackc_core::{PrimitiveKind, TargetMachine};

    fn errors(unit: &UnitScope<'_>) -> Vec<CompilationError> {
        unit.program().diagnostics().iter().cloned().collect()
    }

    #[test]
    fn struct_fields_are_laid_out_back_to_back() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let tu = b.unit(&[b.struct_decl(
            "Node",
            &[
                (b.int_ty(), "value"),
                (b.ptr(b.struct_ty("Node")), "next"),
                (b.double_ty(), "weight"),
            ],
        )]);

        let mut program = ProgramScope::new(TargetMachine::LP64);
        let mut unit = UnitScope::new(&mut program);
        let output = RegistrationPass::new(&mut unit).run(&tu);
        assert_eq!(output.structs_registered, 1);
        assert!(errors(&unit).is_empty());

        let id = unit.resolve_struct_tag("Node").unwrap();
        let def = unit.struct_def(id).unwrap();
        assert_eq!(def.width, 20);
        assert_eq!(def.field("next").map(|f| f.offset), Some(4));
        assert_eq!(def.field("weight").map(|f| f.offset), Some(12));
    }

    #[test]
    fn struct_tags_are_visible_before_their_definition() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let tu = b.unit(&[
            b.struct_decl("A", &[(b.ptr(b.struct_ty("B")), "b")]),
            b.struct_decl("C", &[(b.struct_ty("B"), "inline_b")]),
            b.struct_decl("B", &[(b.int_ty(), "x")]),
        ]);

        let mut program = ProgramScope::new(TargetMachine::LP64);
        let mut unit = UnitScope::new(&mut program);
        RegistrationPass::new(&mut unit).run(&tu);

        // A pointer to a later struct is fine; embedding it is not.
        assert!(matches!(
            errors(&unit).as_slice(),
            [CompilationError::IncompleteType { name, .. }] if name == "struct B"
        ));
        let a = unit.resolve_struct_tag("A").unwrap();
        assert_eq!(unit.struct_def(a).map(|d| d.width), Some(8));
    }

    #[test]
    fn duplicate_and_void_fields_are_reported() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let tu = b.unit(&[b.struct_decl(
            "S",
            &[(b.int_ty(), "x"), (b.char_ty(), "x"), (b.void_ty(), "v")],
        )]);

        let mut program = ProgramScope::new(TargetMachine::LP64);
        let mut unit = UnitScope::new(&mut program);
        RegistrationPass::new(&mut unit).run(&tu);

        assert!(matches!(
            errors(&unit).as_slice(),
            [
                CompilationError::DuplicateDefinition { .. },
                CompilationError::InvalidOperation { .. },
            ]
        ));
        let id = unit.resolve_struct_tag("S").unwrap();
        assert_eq!(unit.struct_def(id).map(|d| d.width), Some(4));
    }

    #[test]
    fn enum_members_count_up_and_see_earlier_members() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let tu = b.unit(&[b.enum_decl(
            "E",
            &[
                ("A", None),
                ("B", Some(b.int(10))),
                ("C", None),
                ("D", Some(b.binary(BinaryOp::Mul, b.var("B"), b.int(2)))),
            ],
        )]);

        let mut program = ProgramScope::new(TargetMachine::LP64);
        let mut unit = UnitScope::new(&mut program);
        let output = RegistrationPass::new(&mut unit).run(&tu);
        assert_eq!(output.enums_registered, 1);
        assert!(errors(&unit).is_empty());

        let id = unit.resolve_enum_tag("E").unwrap();
        let def = unit.enum_def(id).unwrap();
        assert_eq!(def.member("A"), Some(0));
        assert_eq!(def.member("C"), Some(11));
        assert_eq!(def.member("D"), Some(20));
    }

    #[test]
    fn bad_enum_initializer_falls_back_to_next_value() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let tu = b.unit(&[b.enum_decl(
            "E",
            &[("A", Some(b.int(4))), ("B", Some(b.float(1.5)))],
        )]);

        let mut program = ProgramScope::new(TargetMachine::LP64);
        let mut unit = UnitScope::new(&mut program);
        RegistrationPass::new(&mut unit).run(&tu);

        assert!(matches!(
            errors(&unit).as_slice(),
            [CompilationError::NotConstant { .. }]
        ));
        let id = unit.resolve_enum_tag("E").unwrap();
        assert_eq!(unit.enum_def(id).and_then(|d| d.member("B")), Some(5));
    }

    #[test]
    fn globals_fold_constant_initializers() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let tu = b.unit(&[
            b.typedef("Text", b.ptr(b.char_ty())),
            b.global(b.int_ty(), "size", Some(b.binary(BinaryOp::Mul, b.int(3), b.int(4)))),
            b.global(b.char_ty(), "wrapped", Some(b.int(300))),
            b.global(b.double_ty(), "scale", Some(b.unary(UnaryOp::Neg, b.float(1.5)))),
            b.global(b.named_ty("Text"), "greeting", Some(b.string("hi"))),
            b.global(b.ptr(b.int_ty()), "nothing", Some(b.int(0))),
        ]);

        let mut program = ProgramScope::new(TargetMachine::LP64);
        {
            let mut unit = UnitScope::new(&mut program);
            let output = RegistrationPass::new(&mut unit).run(&tu);
            assert_eq!(output.globals_registered, 5);
            assert!(errors(&unit).is_empty());
        }

        let globals = program.globals();
        let summary: Vec<(&str, u32, Option<&Constant>)> = globals
            .iter()
            .map(|g| (g.name.as_str(), g.address, g.init.as_ref()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("size", 0, Some(&Constant::Int(12))),
                ("wrapped", 4, Some(&Constant::Int(44))),
                ("scale", 5, Some(&Constant::float(-1.5))),
                ("greeting", 13, Some(&Constant::string(b"hi"))),
                ("nothing", 21, None),
            ]
        );
    }

    #[test]
    fn non_constant_global_initializer_is_reported() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let tu = b.unit(&[
            b.global(b.int_ty(), "a", Some(b.int(1))),
            b.global(b.int_ty(), "b", Some(b.var("a"))),
            b.global(b.ptr(b.int_ty()), "p", Some(b.string("no"))),
        ]);

        let mut program = ProgramScope::new(TargetMachine::LP64);
        let mut unit = UnitScope::new(&mut program);
        let output = RegistrationPass::new(&mut unit).run(&tu);
        assert_eq!(output.globals_registered, 1);
        assert!(matches!(
            errors(&unit).as_slice(),
            [
                CompilationError::NotConstant { .. },
                CompilationError::NotConstant { .. },
            ]
        ));
    }

    #[test]
    fn prototype_and_definition_share_one_function() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let tu = b.unit(&[
            b.prototype(b.int_ty(), "twice", &[(b.int_ty(), "n")]),
            b.function(
                b.int_ty(),
                "twice",
                &[(b.int_ty(), "value")],
                b.block(&[b.ret(Some(b.var("value")))]),
            ),
            b.prototype(b.void_ty(), "later", &[]),
        ]);

        let mut program = ProgramScope::new(TargetMachine::LP64);
        let mut unit = UnitScope::new(&mut program);
        let output = RegistrationPass::new(&mut unit).run(&tu);

        assert_eq!(output.functions_registered, 3);
        assert_eq!(unit.program().function_count(), 2);
        assert_eq!(output.pending.len(), 1);
        let pending = output.pending[0];
        assert_eq!(pending.id, FunctionId(0));
        assert_eq!(
            unit.function_signature(pending.id).map(|s| s.params[0].name.as_str()),
            Some("value")
        );
    }

    #[test]
    fn bad_signatures_are_reported() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let tu = b.unit(&[
            b.struct_decl("P", &[(b.int_ty(), "x")]),
            b.prototype(b.void_ty(), "by_value", &[(b.struct_ty("P"), "p")]),
            b.prototype(b.void_ty(), "twice", &[(b.int_ty(), "a"), (b.prim(PrimitiveKind::Long), "a")]),
            b.prototype(b.struct_ty("P"), "make", &[]),
            b.method("Q", b.void_ty(), "m", &[], b.block(&[])),
        ]);

        let mut program = ProgramScope::new(TargetMachine::LP64);
        let mut unit = UnitScope::new(&mut program);
        let output = RegistrationPass::new(&mut unit).run(&tu);

        assert!(output.pending.is_empty());
        assert!(matches!(
            errors(&unit).as_slice(),
            [
                CompilationError::InvalidOperation { .. },
                CompilationError::DuplicateDefinition { .. },
                CompilationError::InvalidOperation { .. },
                CompilationError::UnresolvedTypeName { name, .. },
            ] if name == "struct Q"
        ));
    }

    #[test]
    fn methods_are_keyed_by_owner() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let tu = b.unit(&[
            b.struct_decl("Counter", &[(b.int_ty(), "n")]),
            b.method(
                "Counter",
                b.int_ty(),
                "get",
                &[],
                b.block(&[b.ret(Some(b.arrow(b.var("this"), "n")))]),
            ),
        ]);

        let mut program = ProgramScope::new(TargetMachine::LP64);
        let mut unit = UnitScope::new(&mut program);
        let output = RegistrationPass::new(&mut unit).run(&tu);

        let counter = unit.resolve_struct_tag("Counter").unwrap();
        assert_eq!(
            unit.resolve_method(counter, "get", None),
            Some(output.pending[0].id)
        );
        assert!(unit.resolve_variable("get", None).is_none());
    }
}
