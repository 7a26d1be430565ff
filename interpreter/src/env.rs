use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::value::Value;

/// A scope's name bindings. Scopes chain through `outer`: lookups walk the
/// chain outward, bindings always land in the innermost scope. Closures hold
/// an `Rc` to their defining scope, which is what keeps captured bindings
/// alive after the defining frame is gone.
#[derive(Debug, Default)]
pub struct Environment {
    outer: Option<Rc<RefCell<Environment>>>,
    store: HashMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Environment::default()
    }

    pub fn enclosed(outer: Rc<RefCell<Environment>>) -> Self {
        Environment {
            outer: Some(outer),
            store: HashMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.store.get(name) {
            Some(value.clone())
        } else if let Some(outer) = &self.outer {
            outer.borrow().get(name)
        } else {
            None
        }
    }

    pub fn set(&mut self, name: &str, value: Value) {
        self.store.insert(String::from(name), value);
    }
}
