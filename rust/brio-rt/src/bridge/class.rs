//! Native class descriptors: the registration tables the bridge queries
//! instead of reflecting over host types.

use super::call::{HostCallError, HostType, HostValue};
use brio_core::{RecordValue, RuntimeError};
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

type Getter = Box<dyn Fn(&dyn Any) -> HostValue>;
type Setter = Box<dyn Fn(&mut dyn Any, HostValue) -> bool>;
type Invoker = Box<dyn Fn(&mut dyn Any, &[HostValue]) -> Result<HostValue, HostCallError>>;

pub(crate) struct FieldDef {
    get: Getter,
    set: Option<Setter>,
}

pub(crate) struct MethodDef {
    pub(crate) params: Vec<HostType>,
    name: String,
    invoke: Invoker,
}

impl MethodDef {
    pub(crate) fn call(
        &self,
        instance: &mut dyn Any,
        args: &[HostValue],
    ) -> Result<HostValue, HostCallError> {
        (self.invoke)(instance, args)
    }
}

/// One exposed host type: its accessible fields captured once at binding
/// time, and its callable methods. Built through [`NativeClassBuilder`].
pub struct NativeClass {
    name: String,
    fields: BTreeMap<String, FieldDef>,
    methods: Vec<MethodDef>,
}

impl NativeClass {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Normalized field names, sorted. Static-like fields carry their
    /// sentinel prefix.
    pub fn field_names(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }

    pub(crate) fn read_field(&self, key: &str, instance: &dyn Any) -> Option<HostValue> {
        self.fields.get(key).map(|f| (f.get)(instance))
    }

    pub(crate) fn write_field(
        &self,
        key: &str,
        instance: &mut dyn Any,
        value: HostValue,
    ) -> bool {
        match self.fields.get(key).and_then(|f| f.set.as_ref()) {
            Some(set) => set(instance, value),
            None => false,
        }
    }

    /// Methods sharing a normalized name, in registration order.
    pub(crate) fn methods_named<'c>(
        &'c self,
        name: &'c str,
    ) -> impl Iterator<Item = &'c MethodDef> {
        self.methods.iter().filter(move |m| m.name == name)
    }
}

impl fmt::Debug for NativeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeClass")
            .field("name", &self.name)
            .field("fields", &self.fields.len())
            .field("methods", &self.methods.len())
            .finish()
    }
}

impl<T> fmt::Debug for NativeClassBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeClassBuilder")
            .field("name", &self.name)
            .field("fields", &self.fields.len())
            .field("methods", &self.methods.len())
            .finish()
    }
}

/// Builds a [`NativeClass`] for host type `T`. Adding two fields whose
/// names collide after case normalization fails with `AmbiguousField`.
pub struct NativeClassBuilder<T> {
    name: String,
    fields: BTreeMap<String, FieldDef>,
    methods: Vec<MethodDef>,
    _marker: std::marker::PhantomData<fn(T)>,
}

impl<T: Any> NativeClassBuilder<T> {
    pub fn new(name: &str) -> Self {
        NativeClassBuilder {
            name: RecordValue::normalize_key(name),
            fields: BTreeMap::new(),
            methods: Vec::new(),
            _marker: std::marker::PhantomData,
        }
    }

    fn insert_field(&mut self, key: String, field: FieldDef) -> Result<(), RuntimeError> {
        if self.fields.contains_key(&key) {
            return Err(RuntimeError::AmbiguousField(key));
        }
        self.fields.insert(key, field);
        Ok(())
    }

    /// Exposes a read-only instance field.
    pub fn field(
        mut self,
        name: &str,
        get: impl Fn(&T) -> HostValue + 'static,
    ) -> Result<Self, RuntimeError> {
        let key = RecordValue::normalize_key(name);
        let getter: Getter = Box::new(move |any| match any.downcast_ref::<T>() {
            Some(t) => get(t),
            None => HostValue::Unit,
        });
        self.insert_field(key, FieldDef { get: getter, set: None })?;
        Ok(self)
    }

    /// Exposes a settable instance field. The setter reports whether the
    /// incoming host value was accepted.
    pub fn field_mut(
        mut self,
        name: &str,
        get: impl Fn(&T) -> HostValue + 'static,
        set: impl Fn(&mut T, HostValue) -> bool + 'static,
    ) -> Result<Self, RuntimeError> {
        let key = RecordValue::normalize_key(name);
        let getter: Getter = Box::new(move |any| match any.downcast_ref::<T>() {
            Some(t) => get(t),
            None => HostValue::Unit,
        });
        let setter: Setter = Box::new(move |any, value| match any.downcast_mut::<T>() {
            Some(t) => set(t, value),
            None => false,
        });
        self.insert_field(
            key,
            FieldDef {
                get: getter,
                set: Some(setter),
            },
        )?;
        Ok(self)
    }

    /// Exposes a class-level constant. Stored under a sentinel-prefixed
    /// name so it can never collide with an instance field.
    pub fn static_field(mut self, name: &str, value: HostValue) -> Result<Self, RuntimeError> {
        let key = format!("_{}", RecordValue::normalize_key(name));
        let getter: Getter = Box::new(move |_| value.clone());
        self.insert_field(key, FieldDef { get: getter, set: None })?;
        Ok(self)
    }

    /// Registers a method overload. Resolution order between overloads of
    /// one name is registration order.
    pub fn method(
        mut self,
        name: &str,
        params: Vec<HostType>,
        body: impl Fn(&mut T, &[HostValue]) -> Result<HostValue, HostCallError> + 'static,
    ) -> Self {
        let invoke: Invoker = Box::new(move |any, args| match any.downcast_mut::<T>() {
            Some(t) => body(t, args),
            None => Err(HostCallError::from("receiver has the wrong host type")),
        });
        self.methods.push(MethodDef {
            name: RecordValue::normalize_key(name),
            params,
            invoke,
        });
        self
    }

    pub fn build(self) -> NativeClass {
        NativeClass {
            name: self.name,
            fields: self.fields,
            methods: self.methods,
        }
    }
}

/// Classes exposed to the runtime, keyed by normalized name.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: HashMap<String, Rc<NativeClass>>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        ClassRegistry::default()
    }

    pub fn register(&mut self, class: NativeClass) -> Rc<NativeClass> {
        let class = Rc::new(class);
        self.classes
            .insert(class.name().to_string(), Rc::clone(&class));
        class
    }

    pub fn get(&self, name: &str) -> Option<Rc<NativeClass>> {
        self.classes.get(&RecordValue::normalize_key(name)).cloned()
    }
}
