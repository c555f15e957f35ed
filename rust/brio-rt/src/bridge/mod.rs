//! The native-object bridge: presents one instance of a host (Rust) type
//! as a pseudo-record and routes late-bound method calls into it.
//!
//! There is no reflection. A host type is exposed by building a
//! [`NativeClass`] descriptor once at binding time: a table of field
//! getters/setters and a list of typed methods. Lookup at call time is a
//! data-structure query against that table, which makes the failure modes
//! (`AmbiguousField`, `NoSuchMethod`) concrete and testable.

mod call;
mod class;
mod object;

pub use call::{host_to_value, value_to_host, HostCallError, HostType, HostValue};
pub use class::{ClassRegistry, NativeClass, NativeClassBuilder};
pub use object::{BridgedObject, METADATA_KEY};
