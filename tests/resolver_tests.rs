//! The resolver chain driven directly, without a syntax tree.

use stackc::compiler::emit::Emitter;
use stackc::compiler::scope::{
    BlockFrame, BlockScope, EnumScope, FunctionScope, Local, LoopScope, ProgramScope,
    RECEIVER_NAME, RECEIVER_SLOT, Resolver, Storage, StorageClass, UnitScope,
};
use stackc::{CompilationError, Instruction, Signature, Span, TargetMachine, Type};

fn int_local(name: &str) -> Local {
    Local::new(name, Type::INT, 4, Span::default())
}

fn f_of_x() -> Signature {
    Signature::new("f", Type::VOID, Span::default()).with_param("x", Type::INT)
}

#[test]
fn test_offsets_follow_the_active_block_stack() {
    let mut program = ProgramScope::new(TargetMachine::LP64);
    let mut unit = UnitScope::new(&mut program);
    let mut function = FunctionScope::new(&mut unit, f_of_x());

    let mut outer = BlockScope::enter(
        &mut function,
        BlockFrame::new()
            .with_local(int_local("a"))
            .with_local(Local::new("b", Type::DOUBLE, 8, Span::default())),
    )
    .unwrap();
    {
        let inner =
            BlockScope::enter(&mut outer, BlockFrame::new().with_local(int_local("a"))).unwrap();
        let offsets: Vec<Storage> = ["a", "b", "x"]
            .iter()
            .filter_map(|name| inner.resolve_variable(name, None))
            .map(|symbol| symbol.storage)
            .collect();
        assert_eq!(
            offsets,
            vec![Storage::Local(12), Storage::Local(4), Storage::Parameter(0)]
        );
        inner.exit().unwrap();
    }
    assert_eq!(
        outer.resolve_variable("a", None).map(|s| s.storage),
        Some(Storage::Local(0))
    );
    outer.exit().unwrap();
}

#[test]
fn test_continue_passes_break_only_targets() {
    let mut program = ProgramScope::new(TargetMachine::LP64);
    let mut unit = UnitScope::new(&mut program);
    let mut function = FunctionScope::new(&mut unit, f_of_x());

    let exit = function.define_label().unwrap();
    let next = function.define_label().unwrap();
    let switch_exit = function.define_label().unwrap();

    let mut looped = LoopScope::new(&mut function, exit, Some(next));
    let mut block = BlockScope::enter(&mut looped, BlockFrame::new()).unwrap();
    {
        let switch = LoopScope::new(&mut block, switch_exit, None);
        assert_eq!(switch.break_label(), Some(switch_exit));
        assert_eq!(switch.continue_label(), Some(next));
    }
    assert_eq!(block.break_label(), Some(exit));
    block.exit().unwrap();
}

#[test]
fn test_loop_targets_are_absent_outside_loops() {
    let mut program = ProgramScope::new(TargetMachine::LP64);
    let mut unit = UnitScope::new(&mut program);
    let function = FunctionScope::new(&mut unit, f_of_x());
    assert_eq!(function.break_label(), None);
    assert_eq!(function.continue_label(), None);
}

#[test]
fn test_labels_bind_once_and_all_references_agree() {
    let mut emitter = Emitter::new();
    let target = emitter.define_label();
    emitter.emit(Instruction::Jump(target));
    emitter.emit(Instruction::PushInt(1));
    emitter.emit(Instruction::JumpIfTrue(target));
    emitter.bind_label(target).unwrap();
    emitter.emit(Instruction::ReturnVoid);

    assert!(matches!(
        emitter.bind_label(target),
        Err(CompilationError::DoubleLabelBinding { .. })
    ));

    let code = emitter.finish().unwrap();
    let targets: Vec<usize> = code
        .code
        .iter()
        .filter_map(Instruction::label)
        .map(|label| code.labels[label.index()])
        .collect();
    assert_eq!(targets, vec![3, 3]);
}

#[test]
fn test_unbound_referenced_label_blocks_the_hand_off() {
    let mut emitter = Emitter::new();
    let dangling = emitter.define_label();
    emitter.emit(Instruction::Jump(dangling));
    assert!(matches!(
        emitter.finish(),
        Err(CompilationError::UnboundLabel { .. })
    ));
}

#[test]
fn test_enum_members_resolve_without_storage() {
    let mut program = ProgramScope::new(TargetMachine::LP64);
    let mut unit = UnitScope::new(&mut program);
    let mode = unit.declare_enum("Mode", Span::default()).unwrap();
    unit.add_enum_member(mode, "READ", 1, Span::default()).unwrap();
    unit.add_enum_member(mode, "WRITE", 2, Span::default()).unwrap();

    let mut function = FunctionScope::new(&mut unit, f_of_x());
    let injected = EnumScope::new(&mut function, mode);
    for name in ["READ", "WRITE"] {
        let symbol = injected.resolve_variable(name, None).unwrap();
        assert_eq!(symbol.class(), StorageClass::EnumConstant);
        assert_eq!(symbol.ty, Type::Enum(mode));
    }
    // Everything else still comes from the chain.
    assert_eq!(
        injected.resolve_variable("x", None).map(|s| s.class()),
        Some(StorageClass::Parameter)
    );
}

#[test]
fn test_receiver_only_resolves_in_instance_functions() {
    let mut program = ProgramScope::new(TargetMachine::LP64);
    let mut unit = UnitScope::new(&mut program);
    let node = unit.declare_struct("Node", Span::default()).unwrap();
    assert!(unit.resolve_variable(RECEIVER_NAME, None).is_none());

    {
        let free = FunctionScope::new(&mut unit, f_of_x());
        assert!(free.resolve_variable(RECEIVER_NAME, None).is_none());
    }

    let method = FunctionScope::new(&mut unit, f_of_x().with_owner(node));
    let receiver = method.resolve_variable(RECEIVER_NAME, None).unwrap();
    assert_eq!(receiver.storage, Storage::Parameter(RECEIVER_SLOT));
    assert_eq!(receiver.ty, Type::Struct(node).pointer_to());
}

#[test]
fn test_globals_take_precedence_over_file_scope_enum_members() {
    let mut program = ProgramScope::new(TargetMachine::LP64);
    program
        .declare_global("LIMIT", Type::INT, 4, None, Span::default())
        .unwrap();
    let mut unit = UnitScope::new(&mut program);
    let limits = unit.declare_enum("Limits", Span::default()).unwrap();
    unit.add_enum_member(limits, "LIMIT", 99, Span::default())
        .unwrap();

    let symbol = unit.resolve_variable("LIMIT", None).unwrap();
    assert_eq!(symbol.storage, Storage::Global(0));

    // An enum-injection node still puts the member first.
    let injected = EnumScope::new(&mut unit, limits);
    assert_eq!(
        injected.resolve_variable("LIMIT", None).map(|s| s.storage),
        Some(Storage::EnumConstant(99))
    );
}

#[test]
fn test_constants_are_interned_through_any_node() {
    let mut program = ProgramScope::new(TargetMachine::LP64);
    let mut unit = UnitScope::new(&mut program);
    let mut function = FunctionScope::new(&mut unit, f_of_x());
    let first = function
        .intern(stackc::Constant::string(b"data"))
        .unwrap();
    let mut block = BlockScope::enter(&mut function, BlockFrame::new()).unwrap();
    let second = block.intern(stackc::Constant::string(b"data")).unwrap();
    assert_eq!(first, second);
    block.exit().unwrap();
}
