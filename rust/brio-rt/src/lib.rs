//! Runtime shell around the Brio value substrate: name-resolution scopes,
//! argument validation, the native-object bridge, and the compile-time
//! fold / runtime dispatch contract built-in operations follow.

pub mod args;
pub mod bridge;
pub mod context;
pub mod ops;
pub mod program;
pub mod scope;

pub use args::{ArgKind, ArgumentList};
pub use bridge::{
    host_to_value, value_to_host, BridgedObject, ClassRegistry, HostCallError, HostType,
    HostValue, NativeClass, NativeClassBuilder, METADATA_KEY,
};
pub use context::RuntimeContext;
pub use ops::{compile_call, dispatch, Operand, Operation, OpRegistry};
pub use program::{Instr, Program};
pub use scope::Scope;
