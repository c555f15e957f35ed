//! Built-in operations and the compile/dispatch contract.
//!
//! Every operation offers the same two paths. At compile time a call whose
//! arguments are all constants is folded: the operation runs immediately
//! and the result is spliced into the program as a single push. Anything
//! else compiles to a generic runtime call that the dispatcher resolves by
//! name. Both paths must produce matching results for the same literal
//! inputs; operations that depend on runtime state opt out of folding by
//! returning `None`.

use crate::args::{ArgKind, ArgumentList};
use crate::context::RuntimeContext;
use crate::program::{Instr, Program};
use brio_core::{RecordValue, RuntimeError, Value, ValueData, ValueKind};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

pub trait Operation {
    /// Canonical (normalized) operation name.
    fn name(&self) -> &'static str;

    fn validate(&self, args: &ArgumentList) -> Result<(), RuntimeError>;

    /// Compile-time evaluation of a constant argument list. `Ok(None)`
    /// signals "not foldable"; the call then compiles to a runtime
    /// dispatch.
    fn fold(&self, args: &ArgumentList) -> Result<Option<Value>, RuntimeError>;

    fn execute(&self, ctx: &RuntimeContext, args: &ArgumentList) -> Result<Value, RuntimeError>;
}

/// Operations keyed by normalized name.
pub struct OpRegistry {
    ops: HashMap<String, Rc<dyn Operation>>,
}

impl OpRegistry {
    pub fn empty() -> Self {
        OpRegistry {
            ops: HashMap::new(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut registry = OpRegistry::empty();
        registry.register(Rc::new(AbsOp));
        registry.register(Rc::new(LenOp));
        registry.register(Rc::new(UpperOp));
        registry.register(Rc::new(LowerOp));
        registry.register(Rc::new(MinOp));
        registry.register(Rc::new(UniqueIdOp));
        registry
    }

    pub fn register(&mut self, op: Rc<dyn Operation>) {
        self.ops
            .insert(RecordValue::normalize_key(op.name()), op);
    }

    pub fn get(&self, name: &str) -> Option<Rc<dyn Operation>> {
        self.ops.get(&RecordValue::normalize_key(name)).cloned()
    }
}

impl fmt::Debug for OpRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.ops.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("OpRegistry").field("ops", &names).finish()
    }
}

/// A call-site argument as the compiler sees it.
#[derive(Debug, Clone)]
pub enum Operand {
    Const(Value),
    Var(String),
}

/// Compiles one call. A constant argument list is validated and folded
/// when the operation allows it, collapsing the whole call to one push;
/// otherwise the call compiles to pushes/loads plus a generic dispatch.
pub fn compile_call(
    ops: &OpRegistry,
    name: &str,
    operands: &[Operand],
) -> Result<Program, RuntimeError> {
    let op = ops
        .get(name)
        .ok_or_else(|| RuntimeError::NoSuchMethod(RecordValue::normalize_key(name)))?;

    let all_const = operands.iter().all(|o| matches!(o, Operand::Const(_)));
    if all_const {
        let mut args = ArgumentList::new();
        for operand in operands {
            if let Operand::Const(v) = operand {
                args.push(v.clone());
            }
        }
        op.validate(&args)?;
        if let Some(folded) = op.fold(&args)? {
            return Ok(Program::new(vec![Instr::Push(folded)]));
        }
    }

    let mut instrs: Vec<Instr> = operands
        .iter()
        .map(|operand| match operand {
            Operand::Const(v) => Instr::Push(v.clone()),
            Operand::Var(name) => Instr::Load(RecordValue::normalize_key(name)),
        })
        .collect();
    instrs.push(Instr::CallOp {
        name: op.name().to_string(),
        argc: operands.len(),
    });
    Ok(Program::new(instrs))
}

/// The generic runtime path: resolve by name, validate, execute.
pub fn dispatch(
    ctx: &RuntimeContext,
    name: &str,
    args: &ArgumentList,
) -> Result<Value, RuntimeError> {
    let op = ctx
        .ops()
        .get(name)
        .ok_or_else(|| RuntimeError::NoSuchMethod(RecordValue::normalize_key(name)))?;
    op.validate(args)?;
    op.execute(ctx, args)
}

fn arg(args: &ArgumentList, index: usize) -> &Value {
    // Arity is validated before any kernel runs.
    args.get(index).unwrap_or_else(|| {
        panic!("argument {index} missing after validation")
    })
}

// ---- builtins ----

struct AbsOp;

fn abs_value(v: &Value) -> Value {
    match v.data() {
        ValueData::Int(n) => Value::from(n.saturating_abs()),
        ValueData::Double(f) => Value::from(f.abs()),
        ValueData::Decimal(d) => Value::from(d.abs()),
        _ => v.clone(),
    }
}

impl Operation for AbsOp {
    fn name(&self) -> &'static str {
        "ABS"
    }

    fn validate(&self, args: &ArgumentList) -> Result<(), RuntimeError> {
        args.validate(1, 1, &[&[ArgKind::AnyNumber]])
    }

    fn fold(&self, args: &ArgumentList) -> Result<Option<Value>, RuntimeError> {
        Ok(Some(abs_value(arg(args, 0))))
    }

    fn execute(&self, _ctx: &RuntimeContext, args: &ArgumentList) -> Result<Value, RuntimeError> {
        Ok(abs_value(arg(args, 0)))
    }
}

struct LenOp;

fn len_value(v: &Value) -> Value {
    let n = match v.data() {
        ValueData::Str(s) => s.chars().count(),
        _ => v.element_count(),
    };
    Value::from(n as i64)
}

impl Operation for LenOp {
    fn name(&self) -> &'static str {
        "LEN"
    }

    fn validate(&self, args: &ArgumentList) -> Result<(), RuntimeError> {
        args.validate(
            1,
            1,
            &[&[
                ArgKind::Exact(ValueKind::String),
                ArgKind::Exact(ValueKind::Record),
                ArgKind::AnyArray,
            ]],
        )
    }

    fn fold(&self, args: &ArgumentList) -> Result<Option<Value>, RuntimeError> {
        Ok(Some(len_value(arg(args, 0))))
    }

    fn execute(&self, _ctx: &RuntimeContext, args: &ArgumentList) -> Result<Value, RuntimeError> {
        Ok(len_value(arg(args, 0)))
    }
}

struct UpperOp;

impl Operation for UpperOp {
    fn name(&self) -> &'static str {
        "UPPER"
    }

    fn validate(&self, args: &ArgumentList) -> Result<(), RuntimeError> {
        args.validate(1, 1, &[&[ArgKind::Exact(ValueKind::String)]])
    }

    fn fold(&self, args: &ArgumentList) -> Result<Option<Value>, RuntimeError> {
        Ok(Some(Value::from(arg(args, 0).get_string().to_uppercase())))
    }

    fn execute(&self, _ctx: &RuntimeContext, args: &ArgumentList) -> Result<Value, RuntimeError> {
        Ok(Value::from(arg(args, 0).get_string().to_uppercase()))
    }
}

struct LowerOp;

impl Operation for LowerOp {
    fn name(&self) -> &'static str {
        "LOWER"
    }

    fn validate(&self, args: &ArgumentList) -> Result<(), RuntimeError> {
        args.validate(1, 1, &[&[ArgKind::Exact(ValueKind::String)]])
    }

    fn fold(&self, args: &ArgumentList) -> Result<Option<Value>, RuntimeError> {
        Ok(Some(Value::from(arg(args, 0).get_string().to_lowercase())))
    }

    fn execute(&self, _ctx: &RuntimeContext, args: &ArgumentList) -> Result<Value, RuntimeError> {
        Ok(Value::from(arg(args, 0).get_string().to_lowercase()))
    }
}

struct MinOp;

fn min_value(args: &ArgumentList) -> Value {
    let mut best = arg(args, 0);
    for candidate in args.iter().skip(1) {
        if candidate.compare(best) < 0 {
            best = candidate;
        }
    }
    best.clone()
}

impl Operation for MinOp {
    fn name(&self) -> &'static str {
        "MIN"
    }

    fn validate(&self, args: &ArgumentList) -> Result<(), RuntimeError> {
        args.validate(1, usize::MAX, &[&[ArgKind::AnyNumber]])
    }

    fn fold(&self, args: &ArgumentList) -> Result<Option<Value>, RuntimeError> {
        Ok(Some(min_value(args)))
    }

    fn execute(&self, _ctx: &RuntimeContext, args: &ArgumentList) -> Result<Value, RuntimeError> {
        Ok(min_value(args))
    }
}

/// Allocates a fresh id from the context counter. Depends on runtime
/// state, so it never folds.
struct UniqueIdOp;

impl Operation for UniqueIdOp {
    fn name(&self) -> &'static str {
        "UNIQUEID"
    }

    fn validate(&self, args: &ArgumentList) -> Result<(), RuntimeError> {
        args.validate(0, 0, &[])
    }

    fn fold(&self, _args: &ArgumentList) -> Result<Option<Value>, RuntimeError> {
        Ok(None)
    }

    fn execute(&self, ctx: &RuntimeContext, _args: &ArgumentList) -> Result<Value, RuntimeError> {
        Ok(Value::from(ctx.next_object_id() as i64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_runs_builtin() {
        let ctx = RuntimeContext::new();
        let args = ArgumentList::from_values(vec![Value::from(-3i64)]);
        let result = dispatch(&ctx, "abs", &args).unwrap();
        assert!(result.matches(&Value::from(3i64)));
    }

    #[test]
    fn test_dispatch_unknown_name() {
        let ctx = RuntimeContext::new();
        let err = dispatch(&ctx, "nope", &ArgumentList::new()).unwrap_err();
        assert!(matches!(err, RuntimeError::NoSuchMethod(name) if name == "NOPE"));
    }

    #[test]
    fn test_dispatch_validates_first() {
        let ctx = RuntimeContext::new();
        let args = ArgumentList::from_values(vec![Value::from("minus three")]);
        assert!(matches!(
            dispatch(&ctx, "ABS", &args).unwrap_err(),
            RuntimeError::ArgumentTypeError { position: 1, .. }
        ));
    }

    #[test]
    fn test_min_varargs() {
        let ctx = RuntimeContext::new();
        let args = ArgumentList::from_values(vec![
            Value::from(4i64),
            Value::from(1.5),
            Value::from(2i64),
        ]);
        let result = dispatch(&ctx, "MIN", &args).unwrap();
        assert!(result.matches(&Value::from(1.5)));
    }

    #[test]
    fn test_constant_call_folds_to_single_push() {
        let ops = OpRegistry::with_builtins();
        let program = compile_call(
            &ops,
            "upper",
            &[Operand::Const(Value::from("abc"))],
        )
        .unwrap();
        assert_eq!(program.instrs().len(), 1);
        assert!(matches!(
            program.instrs()[0].clone(),
            Instr::Push(v) if v.matches(&Value::from("ABC"))
        ));
    }

    #[test]
    fn test_variable_call_compiles_to_dispatch() {
        let ops = OpRegistry::with_builtins();
        let program = compile_call(
            &ops,
            "min",
            &[Operand::Var("a".into()), Operand::Const(Value::from(2i64))],
        )
        .unwrap();
        let lines = program.to_lines();
        assert_eq!(lines, vec!["_load A", "_push 2", "_call MIN 2"]);
    }

    #[test]
    fn test_unfoldable_op_falls_through() {
        let ops = OpRegistry::with_builtins();
        let program = compile_call(&ops, "uniqueid", &[]).unwrap();
        assert_eq!(program.to_lines(), vec!["_call UNIQUEID 0"]);
    }

    #[test]
    fn test_fold_validates_constants() {
        let ops = OpRegistry::with_builtins();
        let err = compile_call(
            &ops,
            "abs",
            &[Operand::Const(Value::from("nope"))],
        )
        .unwrap_err();
        assert!(matches!(err, RuntimeError::ArgumentTypeError { .. }));
    }
}
