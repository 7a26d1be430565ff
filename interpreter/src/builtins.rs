use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::io::Write;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::value::Value;

pub(crate) type BuiltinFn = Box<dyn Fn(&[Value]) -> Result<Value, RuntimeError>>;

/// Bridges a native Rust function into the interpreter. Builtins are not
/// bound in any environment; identifier lookup falls back to the registry
/// after the environment chain misses.
pub struct Builtin {
    name: &'static str,
    func: BuiltinFn,
}

impl Builtin {
    fn new(name: &'static str, func: BuiltinFn) -> Self {
        Builtin { name, func }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, RuntimeError> {
        (self.func)(args)
    }
}

impl Debug for Builtin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "<builtin {}>", self.name)
    }
}

pub(crate) fn registry(stdout: Rc<RefCell<dyn Write>>) -> HashMap<&'static str, Rc<Builtin>> {
    let mut builtins: HashMap<&'static str, Rc<Builtin>> = HashMap::new();

    builtins.insert("len", Rc::new(Builtin::new("len", Box::new(builtin_len))));
    builtins.insert(
        "first",
        Rc::new(Builtin::new("first", Box::new(builtin_first))),
    );
    builtins.insert("last", Rc::new(Builtin::new("last", Box::new(builtin_last))));
    builtins.insert("rest", Rc::new(Builtin::new("rest", Box::new(builtin_rest))));
    builtins.insert("push", Rc::new(Builtin::new("push", Box::new(builtin_push))));

    let puts_out = stdout;
    let puts: BuiltinFn = Box::new(move |args| {
        for arg in args {
            writeln!(RefCell::borrow_mut(&puts_out), "{}", arg.inspect()).unwrap();
        }
        Ok(Value::Null)
    });
    builtins.insert("puts", Rc::new(Builtin::new("puts", puts)));

    builtins
}

fn want_args(args: &[Value], want: usize) -> Result<(), RuntimeError> {
    if args.len() != want {
        Err(RuntimeError::WrongArgumentCount {
            got: args.len(),
            want,
        })
    } else {
        Ok(())
    }
}

fn builtin_len(args: &[Value]) -> Result<Value, RuntimeError> {
    want_args(args, 1)?;
    match &args[0] {
        Value::Str(value) => Ok(Value::Int(value.len() as i64)),
        Value::Array(elements) => Ok(Value::Int(elements.len() as i64)),
        other => Err(RuntimeError::UnsupportedArgument {
            name: "len",
            got: other.ty(),
        }),
    }
}

fn builtin_first(args: &[Value]) -> Result<Value, RuntimeError> {
    want_args(args, 1)?;
    match &args[0] {
        Value::Array(elements) => Ok(elements.first().cloned().unwrap_or(Value::Null)),
        other => Err(RuntimeError::UnsupportedArgument {
            name: "first",
            got: other.ty(),
        }),
    }
}

fn builtin_last(args: &[Value]) -> Result<Value, RuntimeError> {
    want_args(args, 1)?;
    match &args[0] {
        Value::Array(elements) => Ok(elements.last().cloned().unwrap_or(Value::Null)),
        other => Err(RuntimeError::UnsupportedArgument {
            name: "last",
            got: other.ty(),
        }),
    }
}

fn builtin_rest(args: &[Value]) -> Result<Value, RuntimeError> {
    want_args(args, 1)?;
    match &args[0] {
        Value::Array(elements) => {
            if elements.is_empty() {
                Ok(Value::Null)
            } else {
                Ok(Value::Array(Rc::new(elements[1..].to_vec())))
            }
        }
        other => Err(RuntimeError::UnsupportedArgument {
            name: "rest",
            got: other.ty(),
        }),
    }
}

// Returns a fresh array; the argument array is never mutated.
fn builtin_push(args: &[Value]) -> Result<Value, RuntimeError> {
    want_args(args, 2)?;
    match &args[0] {
        Value::Array(elements) => {
            let mut pushed = elements.as_ref().clone();
            pushed.push(args[1].clone());
            Ok(Value::Array(Rc::new(pushed)))
        }
        other => Err(RuntimeError::UnsupportedArgument {
            name: "push",
            got: other.ty(),
        }),
    }
}
