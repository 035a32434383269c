//! Enum-injection node.

use stackc_core::{EnumId, Type};

use super::{Resolver, Storage, Symbol};

/// Makes the members of one enum visible ahead of everything else.
///
/// Used while evaluating enum member initializers, so later members can
/// refer to earlier ones, and while evaluating `case` labels of a switch
/// over an enum value.
pub struct EnumScope<'p> {
    parent: &'p mut dyn Resolver,
    enum_id: EnumId,
    members: Vec<(String, i64)>,
}

impl<'p> EnumScope<'p> {
    /// Inject the members `enum_id` currently has.
    pub fn new(parent: &'p mut dyn Resolver, enum_id: EnumId) -> Self {
        let members = parent
            .enum_def(enum_id)
            .map(|def| {
                def.members
                    .iter()
                    .map(|m| (m.name.clone(), m.value))
                    .collect()
            })
            .unwrap_or_default();
        Self {
            parent,
            enum_id,
            members,
        }
    }

    pub fn enum_id(&self) -> EnumId {
        self.enum_id
    }
}

impl Resolver for EnumScope<'_> {
    fn parent(&self) -> Option<&dyn Resolver> {
        Some(&*self.parent)
    }

    fn parent_mut(&mut self) -> Option<&mut dyn Resolver> {
        Some(&mut *self.parent)
    }

    fn resolve_variable(&self, name: &str, hints: Option<&[Type]>) -> Option<Symbol> {
        match self.members.iter().find(|(member, _)| member == name) {
            Some(&(_, value)) => Some(Symbol::new(
                name,
                Type::Enum(self.enum_id),
                Storage::EnumConstant(value),
            )),
            None => self.parent.resolve_variable(name, hints),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executable::Signature;
    use crate::scope::{BlockFrame, FunctionScope, Local, ProgramScope, UnitScope};
    use stackc_core::{Span, TargetMachine};

    #[test]
    fn members_shadow_locals() {
        let mut program = ProgramScope::new(TargetMachine::LP64);
        let mut unit = UnitScope::new(&mut program);
        let mode = unit.declare_enum("Mode", Span::default()).unwrap();
        unit.add_enum_member(mode, "FAST", 2, Span::default()).unwrap();

        let mut function =
            FunctionScope::new(&mut unit, Signature::new("f", Type::VOID, Span::default()));
        function
            .begin_block(
                BlockFrame::new().with_local(Local::new("FAST", Type::INT, 4, Span::default())),
            )
            .unwrap();
        assert_eq!(
            function.resolve_variable("FAST", None).map(|s| s.storage),
            Some(Storage::Local(0))
        );

        let scope = EnumScope::new(&mut function, mode);
        let symbol = scope.resolve_variable("FAST", None).unwrap();
        assert_eq!(symbol.storage, Storage::EnumConstant(2));
        assert_eq!(symbol.ty, Type::Enum(mode));
    }

    #[test]
    fn misses_delegate_to_parent() {
        let mut program = ProgramScope::new(TargetMachine::LP64);
        program
            .declare_global("limit", Type::INT, 4, None, Span::default())
            .unwrap();
        let mut unit = UnitScope::new(&mut program);
        let mode = unit.declare_enum("Mode", Span::default()).unwrap();

        let scope = EnumScope::new(&mut unit, mode);
        assert_eq!(
            scope.resolve_variable("limit", None).map(|s| s.storage),
            Some(Storage::Global(0))
        );
        assert!(scope.resolve_variable("other", None).is_none());
        assert!(scope.resolve_type_name("Mode").is_some());
    }

    #[test]
    fn resolution_never_yields_storage() {
        let mut program = ProgramScope::new(TargetMachine::LP64);
        let mut unit = UnitScope::new(&mut program);
        let mode = unit.declare_enum("Mode", Span::default()).unwrap();
        for (i, name) in ["A", "B", "C"].iter().enumerate() {
            unit.add_enum_member(mode, name, i as i64, Span::default())
                .unwrap();
        }

        let scope = EnumScope::new(&mut unit, mode);
        for name in ["A", "B", "C"] {
            let storage = scope.resolve_variable(name, None).unwrap().storage;
            assert!(matches!(storage, Storage::EnumConstant(_)));
        }
    }
}
