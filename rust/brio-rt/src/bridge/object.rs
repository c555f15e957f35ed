//! A bridged host instance presented as a pseudo-record.

use super::call::{dispatch_method, host_to_value, value_to_host};
use super::class::NativeClass;
use crate::context::RuntimeContext;
use brio_core::{
    NativeInstance, ObjectAttributes, RecordValue, RuntimeError, Value,
};
use std::any::Any;
use std::cell::{RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

/// Hidden member under which the object-metadata record is exposed.
pub const METADATA_KEY: &str = "_OBJECT";

/// One wrapped host instance. The instance is behind a shared handle:
/// copying the wrapping value shares it, it is never duplicated.
pub struct BridgedObject {
    class: Rc<NativeClass>,
    instance: RefCell<Box<dyn Any>>,
    attrs: ObjectAttributes,
}

impl BridgedObject {
    /// Wraps an instance, allocating its process-unique id from the
    /// runtime context.
    pub fn wrap(ctx: &RuntimeContext, class: Rc<NativeClass>, instance: Box<dyn Any>) -> Rc<Self> {
        let attrs = ObjectAttributes {
            class_name: class.name().to_string(),
            object_id: ctx.next_object_id(),
            native: true,
        };
        Rc::new(BridgedObject {
            class,
            instance: RefCell::new(instance),
            attrs,
        })
    }

    /// Wraps and registers in one step, returning the script value.
    pub fn wrap_value(
        ctx: &RuntimeContext,
        class: Rc<NativeClass>,
        instance: Box<dyn Any>,
    ) -> Value {
        Value::native(Self::wrap(ctx, class, instance))
    }

    pub(crate) fn class(&self) -> &NativeClass {
        &self.class
    }

    pub(crate) fn instance_mut(&self) -> RefMut<'_, Box<dyn Any>> {
        self.instance.borrow_mut()
    }

    fn metadata_record(&self) -> RecordValue {
        let mut rec = RecordValue::new();
        rec.set("CLASS", Value::from(self.attrs.class_name.clone()));
        rec.set("ID", Value::from(self.attrs.object_id as i64));
        rec.set("NATIVE", Value::from(self.attrs.native));
        rec.set_attrs(Some(self.attrs.clone()));
        rec
    }
}

impl fmt::Debug for BridgedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgedObject")
            .field("class", &self.attrs.class_name)
            .field("id", &self.attrs.object_id)
            .finish()
    }
}

impl NativeInstance for BridgedObject {
    fn class_name(&self) -> &str {
        self.class.name()
    }

    fn instance_id(&self) -> u64 {
        self.attrs.object_id
    }

    fn attributes(&self) -> ObjectAttributes {
        self.attrs.clone()
    }

    fn get_member(&self, name: &str) -> Result<Value, RuntimeError> {
        let key = RecordValue::normalize_key(name);
        if key == METADATA_KEY {
            return Ok(Value::from(self.metadata_record()));
        }
        let instance = self.instance.borrow();
        match self.class.read_field(&key, instance.as_ref()) {
            Some(host) => Ok(host_to_value(host)),
            None => Err(RuntimeError::NoSuchMember(key)),
        }
    }

    fn set_member(&self, name: &str, value: Value) -> Result<bool, RuntimeError> {
        let key = RecordValue::normalize_key(name);
        if key == METADATA_KEY {
            return Ok(false);
        }
        let host = value_to_host(&value)?;
        let mut instance = self.instance.borrow_mut();
        Ok(self.class.write_field(&key, instance.as_mut(), host))
    }

    fn member_names(&self) -> Vec<String> {
        self.class.field_names()
    }

    fn call_method(&self, name: &str, args: &[Value]) -> Result<Value, RuntimeError> {
        dispatch_method(self, name, args)
    }
}
