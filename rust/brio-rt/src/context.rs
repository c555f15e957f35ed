//! The runtime context: owner of every piece of otherwise-global state.
//!
//! The unique-id counter, the exposed native classes, and the operation
//! registry all live here so nothing in the runtime reaches for a hidden
//! static.

use crate::bridge::ClassRegistry;
use crate::ops::OpRegistry;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug)]
pub struct RuntimeContext {
    object_ids: AtomicU64,
    classes: ClassRegistry,
    ops: OpRegistry,
}

impl RuntimeContext {
    pub fn new() -> Self {
        RuntimeContext {
            object_ids: AtomicU64::new(1),
            classes: ClassRegistry::new(),
            ops: OpRegistry::with_builtins(),
        }
    }

    /// Allocates a process-unique object id.
    pub fn next_object_id(&self) -> u64 {
        self.object_ids.fetch_add(1, Ordering::Relaxed)
    }

    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    pub fn classes_mut(&mut self) -> &mut ClassRegistry {
        &mut self.classes
    }

    pub fn ops(&self) -> &OpRegistry {
        &self.ops
    }

    pub fn ops_mut(&mut self) -> &mut OpRegistry {
        &mut self.ops
    }
}

impl Default for RuntimeContext {
    fn default() -> Self {
        RuntimeContext::new()
    }
}
