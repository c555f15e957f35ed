//! Hierarchical name-resolution scopes.
//!
//! A scope is one named frame of variables plus an optional parent; lookup
//! walks up the chain, writes stay local. Evaluation contexts are
//! single-threaded, so frames hand out `Rc` handles and use interior
//! mutability.

use brio_core::{RecordValue, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug)]
pub struct Scope {
    name: String,
    vars: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Scope>>,
}

impl Scope {
    pub fn root(name: impl Into<String>) -> Rc<Scope> {
        Rc::new(Scope {
            name: name.into(),
            vars: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    pub fn child(parent: &Rc<Scope>, name: impl Into<String>) -> Rc<Scope> {
        Rc::new(Scope {
            name: name.into(),
            vars: RefCell::new(HashMap::new()),
            parent: Some(Rc::clone(parent)),
        })
    }

    /// Frame name, used in diagnostics only.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<Rc<Scope>> {
        self.parent.clone()
    }

    /// Walks up the parent chain on miss.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        let key = RecordValue::normalize_key(name);
        let mut scope = self;
        loop {
            if let Some(value) = scope.vars.borrow().get(&key) {
                return Some(value.clone());
            }
            match &scope.parent {
                Some(parent) => scope = parent,
                None => return None,
            }
        }
    }

    /// Inserts into this frame, shadowing any outer binding.
    pub fn insert(&self, name: &str, value: Value) {
        self.vars
            .borrow_mut()
            .insert(RecordValue::normalize_key(name), value);
    }

    /// Deletes from this frame only.
    pub fn delete(&self, name: &str) -> Option<Value> {
        self.vars
            .borrow_mut()
            .remove(&RecordValue::normalize_key(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_walks_parent_chain() {
        let root = Scope::root("global");
        root.insert("greeting", Value::from("hi"));
        let inner = Scope::child(&root, "block");
        assert!(inner.lookup("GREETING").unwrap().matches(&Value::from("hi")));
        assert!(inner.lookup("missing").is_none());
    }

    #[test]
    fn test_insert_shadows_not_overwrites() {
        let root = Scope::root("global");
        root.insert("n", Value::from(1i64));
        let inner = Scope::child(&root, "block");
        inner.insert("n", Value::from(2i64));
        assert!(inner.lookup("n").unwrap().matches(&Value::from(2i64)));
        assert!(root.lookup("n").unwrap().matches(&Value::from(1i64)));
    }

    #[test]
    fn test_delete_is_local() {
        let root = Scope::root("global");
        root.insert("n", Value::from(1i64));
        let inner = Scope::child(&root, "block");
        assert!(inner.delete("n").is_none());
        assert!(inner.lookup("n").is_some());
        assert!(root.delete("n").is_some());
        assert!(inner.lookup("n").is_none());
    }

    #[test]
    fn test_parent_accessor() {
        let root = Scope::root("global");
        let inner = Scope::child(&root, "block");
        assert_eq!(inner.parent().unwrap().name(), "global");
        assert!(root.parent().is_none());
    }
}
