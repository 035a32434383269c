//! Switch statement compilation.
//!
//! Case values are integer constant expressions. When the scrutinee is an
//! enum, its members are injected ahead of the usual lookup while the
//! values are evaluated. The case bodies share one block, so a local
//! declared under one label is in scope for the labels after it.

use rustc_hash::FxHashSet;
use stackc_ast::SwitchStmt;
use stackc_core::{CompilationError, Type};

use crate::bytecode::{CmpOp, Instruction};
use crate::const_eval::eval_int;
use crate::emit::Label;
use crate::scope::{BlockScope, EnumScope, LoopScope};

use super::{FrameCollector, Result, StmtCompiler};

impl StmtCompiler<'_> {
    /// Compile a switch statement.
    ///
    /// Bytecode layout:
    /// ```text
    /// [scrutinee]
    /// Dup  PushInt(v0)  Compare(Eq)  JumpIfTrue -> match_0
    /// Dup  PushInt(v1)  Compare(Eq)  JumpIfTrue -> match_1
    /// ...
    /// Pop  Jump -> default body, or exit
    /// match_0: Pop  Jump -> body_0
    /// match_1: Pop  Jump -> body_1
    /// ...
    /// body_0: [statements]          (falls through)
    /// body_1: [statements]
    /// exit:
    /// ```
    pub fn compile_switch(&mut self, switch: &SwitchStmt<'_>) -> Result<()> {
        let ty = self.expr_compiler().infer(switch.scrutinee)?;
        if !ty.is_integer() {
            return Err(CompilationError::TypeMismatch {
                message: format!(
                    "switch requires an integer value, found '{}'",
                    self.scope.describe(&ty)
                ),
                span: switch.scrutinee.span(),
            });
        }
        let values = self.case_values(switch, &ty)?;

        let exit = self.scope.define_label()?;
        let mut bodies = Vec::with_capacity(values.len());
        let mut matches = Vec::with_capacity(values.len());
        for _ in &values {
            bodies.push(self.scope.define_label()?);
            matches.push(self.scope.define_label()?);
        }

        for (value, &matched) in values.iter().zip(&matches) {
            if let Some(value) = *value {
                self.emit(Instruction::Dup)?;
                self.emit(Instruction::PushInt(value))?;
                self.emit(Instruction::Compare(CmpOp::Eq))?;
                self.emit(Instruction::JumpIfTrue(matched))?;
            }
        }
        let fallback = values
            .iter()
            .position(Option::is_none)
            .map_or(exit, |index| bodies[index]);
        self.emit(Instruction::Pop)?;
        self.emit(Instruction::Jump(fallback))?;

        for (value, (&matched, &body)) in values.iter().zip(matches.iter().zip(&bodies)) {
            if value.is_some() {
                self.scope.bind_label(matched)?;
                self.emit(Instruction::Pop)?;
                self.emit(Instruction::Jump(body))?;
            }
        }

        self.compile_case_bodies(switch, &bodies, exit)?;
        self.scope.bind_label(exit)
    }

    /// Evaluate every case label; `None` marks `default`.
    fn case_values(&mut self, switch: &SwitchStmt<'_>, ty: &Type) -> Result<Vec<Option<i64>>> {
        let mut seen = FxHashSet::default();
        let mut has_default = false;
        let mut values = Vec::with_capacity(switch.cases.len());

        for case in switch.cases {
            let Some(expr) = case.value else {
                if has_default {
                    return Err(CompilationError::InvalidOperation {
                        message: "multiple default labels in one switch".to_string(),
                        span: case.span,
                    });
                }
                has_default = true;
                values.push(None);
                continue;
            };

            let value = match ty.enum_id() {
                Some(enum_id) => {
                    let members = EnumScope::new(&mut *self.scope, enum_id);
                    eval_int(&members, expr)?
                }
                None => eval_int(&*self.scope, expr)?,
            };
            if !seen.insert(value) {
                return Err(CompilationError::DuplicateCase {
                    value,
                    span: case.span,
                });
            }
            values.push(Some(value));
        }
        Ok(values)
    }

    fn compile_case_bodies(
        &mut self,
        switch: &SwitchStmt<'_>,
        bodies: &[Label],
        exit: Label,
    ) -> Result<()> {
        let (frame, errors) = {
            let mut collector = FrameCollector::new(&*self.scope);
            for case in switch.cases {
                collector.collect(case.stmts);
            }
            collector.finish()
        };
        self.report_all(errors);

        let mut block = BlockScope::enter(&mut *self.scope, frame)?;
        let result = {
            let mut breakable = LoopScope::new(&mut block, exit, None);
            let mut compiler = StmtCompiler::new(&mut breakable);
            switch
                .cases
                .iter()
                .zip(bodies)
                .try_for_each(|(case, &body)| {
                    compiler.scope.bind_label(body)?;
                    compiler.compile_statements(case.stmts)
                })
        };
        block.exit()?;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{compile_body, compile_body_with};
    use super::*;
    use bumpalo::Bump;
    use stackc_ast::AstBuilder;
    use stackc_core::Span;

    #[test]
    fn cases_dispatch_and_fall_through() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let outcome = compile_body(&[
            b.switch(
                b.var("x"),
                &[
                    b.case(Some(b.int(1)), &[b.ret(Some(b.int(10)))]),
                    b.case(None, &[b.brk()]),
                    b.case(Some(b.int(2)), &[]),
                ],
            ),
            b.ret(Some(b.int(0))),
        ]);
        assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
        let function = outcome.function.unwrap();
        let code = &function.code;

        assert_eq!(
            &code[..4],
            &[
                Instruction::LoadParam(0),
                Instruction::Dup,
                Instruction::PushInt(1),
                Instruction::Compare(CmpOp::Eq),
            ]
        );
        assert!(matches!(code[4], Instruction::JumpIfTrue(_)));
        assert_eq!(code[9], Instruction::Pop);
        let Instruction::Jump(fallback) = code[10] else {
            panic!("unexpected layout: {code:?}");
        };
        // match_0, match_2 stubs take 11..15; bodies start at 15.
        assert_eq!(function.jump_target(fallback), Some(17));
        assert_eq!(code[15], Instruction::PushInt(10));
        let Instruction::Jump(brk) = code[17] else {
            panic!("unexpected layout: {code:?}");
        };
        assert_eq!(function.jump_target(brk), Some(18));
        assert_eq!(code[18], Instruction::PushInt(0));
    }

    #[test]
    fn duplicate_case_values_are_reported() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let outcome = compile_body(&[b.switch(
            b.var("x"),
            &[
                b.case(Some(b.int(3)), &[]),
                b.case(Some(b.binary(stackc_ast::BinaryOp::Add, b.int(1), b.int(2))), &[]),
            ],
        )]);
        assert!(matches!(
            outcome.errors.as_slice(),
            [CompilationError::DuplicateCase { value: 3, .. }]
        ));
    }

    #[test]
    fn non_constant_case_is_reported() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let outcome = compile_body(&[b.switch(b.var("x"), &[b.case(Some(b.var("x")), &[])])]);
        assert!(matches!(
            outcome.errors.as_slice(),
            [CompilationError::NotConstant { .. }]
        ));
    }

    #[test]
    fn enum_members_are_visible_in_cases() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        // The global `Green` hides the file-scope member everywhere except
        // inside case labels, where the members of `Color` come first.
        let outcome = compile_body_with(
            |unit| {
                let color = unit.declare_enum("Color", Span::default()).unwrap();
                unit.add_enum_member(color, "Red", 0, Span::default())
                    .unwrap();
                unit.add_enum_member(color, "Green", 5, Span::default())
                    .unwrap();
                unit.program_mut()
                    .declare_global("Green", Type::INT, 4, None, Span::default())
                    .unwrap();
            },
            Type::INT,
            &[
                b.decl(b.enum_ty("Color"), "c", Some(b.var("x"))),
                b.switch(
                    b.var("c"),
                    &[
                        b.case(Some(b.var("Red")), &[b.ret(Some(b.int(1)))]),
                        b.case(Some(b.var("Green")), &[b.ret(Some(b.int(2)))]),
                    ],
                ),
                b.ret(Some(b.int(0))),
            ],
        );
        assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
        assert!(outcome.code.contains(&Instruction::PushInt(5)));
    }

    #[test]
    fn continue_in_switch_reaches_enclosing_loop() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let outcome = compile_body(&[
            b.while_(
                b.var("x"),
                b.switch(b.var("x"), &[b.case(None, &[b.cont()])]),
            ),
            b.ret(Some(b.int(0))),
        ]);
        assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
        let function = outcome.function.unwrap();
        // LoadParam, JumpIfFalse, LoadParam, Pop, Jump default, default: Jump start
        let Instruction::Jump(cont) = function.code[5] else {
            panic!("unexpected layout: {:?}", function.code);
        };
        assert_eq!(function.jump_target(cont), Some(0));
    }

    #[test]
    fn float_scrutinee_is_rejected() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let outcome = compile_body(&[b.switch(b.float(1.0), &[])]);
        assert!(matches!(
            outcome.errors.as_slice(),
            [CompilationError::TypeMismatch { .. }]
        ));
    }
}
