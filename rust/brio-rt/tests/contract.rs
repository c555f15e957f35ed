//! The fold/dispatch contract: for literal inputs, a call folded at
//! compile time must match the value the runtime path produces.

use brio_core::{Value, ValueKind};
use brio_rt::{compile_call, dispatch, ArgumentList, Instr, Operand, Program, RuntimeContext, Scope};

fn folded_result(ctx: &RuntimeContext, name: &str, args: &[Value]) -> Option<Value> {
    let operands: Vec<Operand> = args.iter().cloned().map(Operand::Const).collect();
    let program = compile_call(ctx.ops(), name, &operands).unwrap();
    match program.instrs() {
        [Instr::Push(v)] => Some(v.clone()),
        _ => None,
    }
}

#[test]
fn fold_matches_dispatch_for_builtins() {
    let ctx = RuntimeContext::new();
    let cases: Vec<(&str, Vec<Value>)> = vec![
        ("ABS", vec![Value::from(-7i64)]),
        ("ABS", vec![Value::from(-2.5)]),
        ("LEN", vec![Value::from("héllo")]),
        ("UPPER", vec![Value::from("mixed Case")]),
        ("LOWER", vec![Value::from("MIXED Case")]),
        (
            "MIN",
            vec![Value::from(4i64), Value::from(-1.5), Value::from(2i64)],
        ),
    ];
    for (name, args) in cases {
        let folded = folded_result(&ctx, name, &args)
            .unwrap_or_else(|| panic!("{name} should fold for constant arguments"));
        let dispatched = dispatch(&ctx, name, &ArgumentList::from_values(args)).unwrap();
        assert!(
            folded.matches(&dispatched),
            "{name}: folded {folded} != dispatched {dispatched}"
        );
    }
}

#[test]
fn unfoldable_op_matches_no_constant() {
    let ctx = RuntimeContext::new();
    assert!(folded_result(&ctx, "UNIQUEID", &[]).is_none());
    // The runtime path hands out fresh ids on every call.
    let first = dispatch(&ctx, "UNIQUEID", &ArgumentList::new()).unwrap();
    let second = dispatch(&ctx, "UNIQUEID", &ArgumentList::new()).unwrap();
    assert_eq!(first.compare(&second), -1);
}

#[test]
fn folded_program_survives_the_text_form() {
    let ctx = RuntimeContext::new();
    let scope = Scope::root("test");
    let program = compile_call(
        ctx.ops(),
        "min",
        &[
            Operand::Const(Value::from(8i64)),
            Operand::Const(Value::from(3i64)),
        ],
    )
    .unwrap();
    let lines = program.to_lines();
    assert_eq!(lines, vec!["_push 3"]);

    let reparsed = Program::parse_lines(&lines).unwrap();
    let result = reparsed.run(&ctx, &scope).unwrap();
    assert!(result.matches(&Value::from(3i64)));
}

#[test]
fn unfolded_program_dispatches_through_scope() {
    let ctx = RuntimeContext::new();
    let scope = Scope::root("test");
    scope.insert("limit", Value::from(-4i64));

    let program = compile_call(
        ctx.ops(),
        "min",
        &[
            Operand::Var("limit".into()),
            Operand::Const(Value::from(2i64)),
        ],
    )
    .unwrap();
    let result = program.run(&ctx, &scope).unwrap();
    assert!(result.matches(&Value::from(-4i64)));

    // Same instruction text, evaluated from its serialized form.
    let rehydrated = Program::parse_lines(&program.to_lines()).unwrap();
    assert!(rehydrated.run(&ctx, &scope).unwrap().matches(&result));
}

#[test]
fn folded_nan_constant_survives_the_text_form() {
    // Coercion can legitimately produce NaN doubles, so a folded call on
    // one must still serialize and rehydrate.
    let ctx = RuntimeContext::new();
    let scope = Scope::root("test");
    let program = compile_call(
        ctx.ops(),
        "abs",
        &[Operand::Const(Value::from(f64::NAN))],
    )
    .unwrap();
    let lines = program.to_lines();
    assert_eq!(lines, vec!["_push NaN"]);
    let result = Program::parse_lines(&lines)
        .unwrap()
        .run(&ctx, &scope)
        .unwrap();
    assert_eq!(result.kind(), ValueKind::Double);
    assert!(result.get_double().is_nan());
}

#[test]
fn fold_result_has_same_kind_as_dispatch() {
    let ctx = RuntimeContext::new();
    let args = vec![Value::from(-2.5)];
    let folded = folded_result(&ctx, "ABS", &args).unwrap();
    assert_eq!(folded.kind(), ValueKind::Double);
    let dispatched = dispatch(&ctx, "ABS", &ArgumentList::from_values(args)).unwrap();
    assert_eq!(dispatched.kind(), ValueKind::Double);
}
