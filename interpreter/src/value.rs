use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use ahash::AHasher;

use crate::ast::{Block, Identifier};
use crate::builtins::Builtin;
use crate::env::Environment;
use crate::error::RuntimeError;

#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Str(Rc<String>),
    Array(Rc<Vec<Value>>),
    Hash(Rc<HashMap<HashKey, HashPair>>),
    Function(Rc<Function>),
    Builtin(Rc<Builtin>),
    Error(RuntimeError),
    Null,
}

/// Type tag reported by `Value::ty`, spelled the way error messages print it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Integer,
    Boolean,
    String,
    Array,
    Hash,
    Function,
    Builtin,
    Error,
    Null,
}

/// Key form under which a value can enter a hash. Only integers, booleans and
/// strings qualify; the variant tag keeps keys of different kinds distinct
/// even if their payload hashes collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashKey {
    Int(i64),
    Bool(bool),
    Str(u64),
}

/// A stored hash entry. The original key value is kept alongside the mapped
/// value so the pair can be printed back out.
#[derive(Debug, Clone, PartialEq)]
pub struct HashPair {
    pub key: Value,
    pub value: Value,
}

/// A closure: the literal's parameters and body plus the environment that was
/// current when the literal was evaluated.
#[derive(Clone)]
pub struct Function {
    pub params: Rc<Vec<Identifier>>,
    pub body: Rc<Block>,
    pub env: Rc<RefCell<Environment>>,
}

impl Value {
    pub fn ty(&self) -> Type {
        match self {
            Value::Int(_) => Type::Integer,
            Value::Bool(_) => Type::Boolean,
            Value::Str(_) => Type::String,
            Value::Array(_) => Type::Array,
            Value::Hash(_) => Type::Hash,
            Value::Function(_) => Type::Function,
            Value::Builtin(_) => Type::Builtin,
            Value::Error(_) => Type::Error,
            Value::Null => Type::Null,
        }
    }

    /// Human-readable rendering of the value, as shown by the REPL and
    /// written by `puts`.
    pub fn inspect(&self) -> String {
        self.to_string()
    }

    pub fn hash_key(&self) -> Option<HashKey> {
        match self {
            Value::Int(value) => Some(HashKey::Int(*value)),
            Value::Bool(value) => Some(HashKey::Bool(*value)),
            Value::Str(value) => {
                let mut hasher = AHasher::default();
                value.hash(&mut hasher);
                Some(HashKey::Str(hasher.finish()))
            }
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(lhs), Value::Int(rhs)) => lhs == rhs,
            (Value::Bool(lhs), Value::Bool(rhs)) => lhs == rhs,
            (Value::Str(lhs), Value::Str(rhs)) => lhs == rhs,
            (Value::Array(lhs), Value::Array(rhs)) => lhs == rhs,
            (Value::Hash(lhs), Value::Hash(rhs)) => lhs == rhs,
            // Functions and builtins have no structural equality, only
            // identity.
            (Value::Function(lhs), Value::Function(rhs)) => Rc::ptr_eq(lhs, rhs),
            (Value::Builtin(lhs), Value::Builtin(rhs)) => Rc::ptr_eq(lhs, rhs),
            (Value::Error(lhs), Value::Error(rhs)) => lhs == rhs,
            (Value::Null, Value::Null) => true,
            _ => false,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(Rc::new(String::from(value)))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(Rc::new(value))
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{}", value),
            Value::Bool(value) => write!(f, "{}", value),
            Value::Str(value) => f.write_str(value),
            Value::Array(elements) => {
                let elements = elements
                    .iter()
                    .map(Value::inspect)
                    .collect::<Vec<_>>();
                write!(f, "[{}]", elements.join(", "))
            }
            Value::Hash(pairs) => {
                let pairs = pairs
                    .values()
                    .map(|pair| format!("{}:{}", pair.key, pair.value))
                    .collect::<Vec<_>>();
                write!(f, "{{{}}}", pairs.join(", "))
            }
            Value::Function(function) => {
                let params = function
                    .params
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>();
                write!(f, "fn({}) {{\n{}\n}}", params.join(", "), function.body)
            }
            Value::Builtin(_) => f.write_str("builtin function"),
            Value::Error(err) => write!(f, "ERROR: {}", err),
            Value::Null => f.write_str("null"),
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Type::Integer => "INTEGER",
            Type::Boolean => "BOOLEAN",
            Type::String => "STRING",
            Type::Array => "ARRAY",
            Type::Hash => "HASH",
            Type::Function => "FUNCTION",
            Type::Builtin => "BUILTIN",
            Type::Error => "ERROR",
            Type::Null => "NULL",
        };
        f.write_str(s)
    }
}

// The captured environment stays out of the output; a closure bound in its
// own defining scope would otherwise print forever.
impl Debug for Function {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let params = self
            .params
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        write!(f, "<fn({})>", params.join(", "))
    }
}
