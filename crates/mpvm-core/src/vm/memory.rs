//! VM Memory Model
//!
//! Run-scoped variable storage. Owned by one VM instance and dropped with it.

use std::collections::HashMap;

use crate::error::{VmError, VmResult};
use super::value::Value;

/// Global variable storage (name-keyed)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Globals {
    values: HashMap<String, Value>,
}

impl Globals {
    pub fn new() -> Self {
        Globals::default()
    }

    /// Read a bound variable; there is no implicit default
    pub fn load(&self, name: &str) -> VmResult<Value> {
        self.values
            .get(name)
            .copied()
            .ok_or_else(|| VmError::UnboundName(name.to_string()))
    }

    /// Create or overwrite a binding
    pub fn store(&mut self, name: &str, value: Value) {
        match self.values.get_mut(name) {
            Some(slot) => *slot = value,
            None => {
                self.values.insert(name.to_string(), value);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.values.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
