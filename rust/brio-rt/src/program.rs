//! The instruction-text form of compiled calls.
//!
//! A compiled operation is exchanged as an ordered sequence of
//! human-readable lines, one per instruction: `_push <literal>`,
//! `_load <name>`, `_call <name> <argc>`. Push payloads use the literal
//! syntax, so any kind with a literal form round-trips through
//! `to_lines`/`parse_lines`.

use crate::args::ArgumentList;
use crate::context::RuntimeContext;
use crate::ops::dispatch;
use crate::scope::Scope;
use brio_core::{parse_literal, quote, LiteralError, RecordValue, RuntimeError, Value, ValueKind};
use std::fmt;

#[derive(Debug, Clone)]
pub enum Instr {
    Push(Value),
    Load(String),
    CallOp { name: String, argc: usize },
}

/// Renders a push payload in literal syntax. Whole doubles keep one
/// fraction digit here so the line parses back to a double, unlike the
/// user-facing print form.
fn literal_text(value: &Value) -> String {
    match value.kind() {
        ValueKind::Undefined => "undefined".to_string(),
        ValueKind::String => quote(&value.get_string()),
        ValueKind::Double => {
            let f = value.get_double();
            if f.is_finite() && f.fract() == 0.0 {
                format!("{:.1}", f)
            } else {
                format!("{}", f)
            }
        }
        _ => value.to_string(),
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::Push(value) => write!(f, "_push {}", literal_text(value)),
            Instr::Load(name) => write!(f, "_load {}", name),
            Instr::CallOp { name, argc } => write!(f, "_call {} {}", name, argc),
        }
    }
}

impl Instr {
    pub fn parse(line: &str) -> Result<Instr, LiteralError> {
        let line = line.trim();
        let (opcode, rest) = match line.split_once(' ') {
            Some((opcode, rest)) => (opcode, rest.trim()),
            None => (line, ""),
        };
        let bad = |message: &str| LiteralError {
            offset: 0,
            message: message.to_string(),
        };
        match opcode {
            "_push" => Ok(Instr::Push(parse_literal(rest)?)),
            "_load" => {
                if rest.is_empty() {
                    return Err(bad("_load needs a name"));
                }
                Ok(Instr::Load(RecordValue::normalize_key(rest)))
            }
            "_call" => {
                let (name, argc) = rest
                    .rsplit_once(' ')
                    .ok_or_else(|| bad("_call needs a name and an argument count"))?;
                let argc = argc
                    .trim()
                    .parse()
                    .map_err(|_| bad("bad argument count"))?;
                Ok(Instr::CallOp {
                    name: RecordValue::normalize_key(name.trim()),
                    argc,
                })
            }
            other => Err(bad(&format!("unknown opcode '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Program {
    instrs: Vec<Instr>,
}

impl Program {
    pub fn new(instrs: Vec<Instr>) -> Self {
        Program { instrs }
    }

    pub fn instrs(&self) -> &[Instr] {
        &self.instrs
    }

    pub fn to_lines(&self) -> Vec<String> {
        self.instrs.iter().map(|i| i.to_string()).collect()
    }

    pub fn parse_lines<S: AsRef<str>>(lines: &[S]) -> Result<Program, LiteralError> {
        let instrs = lines
            .iter()
            .map(|line| Instr::parse(line.as_ref()))
            .collect::<Result<_, _>>()?;
        Ok(Program { instrs })
    }

    /// Evaluates the instruction sequence against a scope. The result is
    /// the value left on the stack, `Undefined` for an empty program.
    pub fn run(&self, ctx: &RuntimeContext, scope: &Scope) -> Result<Value, RuntimeError> {
        let mut stack: Vec<Value> = Vec::new();
        for instr in &self.instrs {
            match instr {
                Instr::Push(value) => stack.push(value.clone()),
                Instr::Load(name) => {
                    let value = scope
                        .lookup(name)
                        .ok_or_else(|| RuntimeError::NoSuchMember(name.clone()))?;
                    stack.push(value);
                }
                Instr::CallOp { name, argc } => {
                    if stack.len() < *argc {
                        return Err(RuntimeError::TooFewArguments {
                            min: *argc,
                            got: stack.len(),
                        });
                    }
                    let values = stack.split_off(stack.len() - argc);
                    let args = ArgumentList::from_values(values);
                    stack.push(dispatch(ctx, name, &args)?);
                }
            }
        }
        Ok(stack.pop().unwrap_or_else(Value::undefined))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_text_round_trip() {
        let program = Program::new(vec![
            Instr::Push(Value::from(3.0)),
            Instr::Push(Value::from("a\nb")),
            Instr::Load("X".into()),
            Instr::CallOp {
                name: "MIN".into(),
                argc: 3,
            },
        ]);
        let lines = program.to_lines();
        assert_eq!(lines[0], "_push 3.0");
        assert_eq!(lines[1], "_push \"a\\nb\"");
        let reparsed = Program::parse_lines(&lines).unwrap();
        assert_eq!(reparsed.to_lines(), lines);
    }

    #[test]
    fn test_nonfinite_double_push_round_trips() {
        let program = Program::new(vec![
            Instr::Push(Value::from(f64::NAN)),
            Instr::Push(Value::from(f64::NEG_INFINITY)),
        ]);
        let lines = program.to_lines();
        assert_eq!(lines, vec!["_push NaN", "_push -inf"]);
        let reparsed = Program::parse_lines(&lines).unwrap();
        match reparsed.instrs() {
            [Instr::Push(a), Instr::Push(b)] => {
                assert!(a.get_double().is_nan());
                assert_eq!(b.get_double(), f64::NEG_INFINITY);
            }
            other => panic!("unexpected instructions: {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_opcode() {
        assert!(Instr::parse("_jump 3").is_err());
        assert!(Instr::parse("_call MIN x").is_err());
        assert!(Instr::parse("_load").is_err());
    }

    #[test]
    fn test_run_executes_dispatch() {
        let ctx = RuntimeContext::new();
        let scope = Scope::root("test");
        scope.insert("a", Value::from(-9i64));
        let program = Program::parse_lines(&["_load a", "_call ABS 1"]).unwrap();
        let result = program.run(&ctx, &scope).unwrap();
        assert!(result.matches(&Value::from(9i64)));
    }

    #[test]
    fn test_run_missing_variable() {
        let ctx = RuntimeContext::new();
        let scope = Scope::root("test");
        let program = Program::parse_lines(&["_load ghost"]).unwrap();
        assert!(matches!(
            program.run(&ctx, &scope).unwrap_err(),
            RuntimeError::NoSuchMember(name) if name == "GHOST"
        ));
    }

    #[test]
    fn test_empty_program_yields_undefined() {
        let ctx = RuntimeContext::new();
        let scope = Scope::root("test");
        let result = Program::default().run(&ctx, &scope).unwrap();
        assert_eq!(result.kind(), brio_core::ValueKind::Undefined);
    }
}
