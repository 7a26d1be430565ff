use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use monkey_core::{Token, TokenType};

use crate::ast::{Block, Expr, Program, Stmt};
use crate::builtins::{self, Builtin};
use crate::env::Environment;
use crate::error::{RuntimeError, Unwind};
use crate::value::{Function, HashPair, Type, Value};

type EvalResult = Result<Value, Unwind>;

/// Tree-walking evaluator. The instance itself is stateless apart from the
/// builtin registry; all bindings live in the environment passed to `eval`,
/// so one interpreter can serve many programs and a REPL can thread one
/// environment through many lines.
pub struct Interpreter {
    builtins: HashMap<&'static str, Rc<Builtin>>,
}

impl Interpreter {
    pub fn new(stdout: Rc<RefCell<dyn Write>>) -> Self {
        Interpreter {
            builtins: builtins::registry(stdout),
        }
    }

    /// Evaluates a program. A `return` at the top level stops evaluation and
    /// yields the returned value; a runtime failure stops evaluation and
    /// yields it as an `Error` value.
    pub fn eval(&self, program: &Program, env: &Rc<RefCell<Environment>>) -> Value {
        let mut result = Value::Null;

        for stmt in &program.statements {
            match self.eval_stmt(stmt, env) {
                Ok(value) => result = value,
                Err(Unwind::Return(value)) => return value,
                Err(Unwind::Fail(err)) => return Value::Error(err),
            }
        }

        result
    }

    fn eval_stmt(&self, stmt: &Stmt, env: &Rc<RefCell<Environment>>) -> EvalResult {
        match stmt {
            Stmt::Let { name, value } => {
                let value = self.eval_expr(value, env)?;
                env.borrow_mut().set(&name.value, value);
                Ok(Value::Null)
            }
            Stmt::Return { value } => Err(Unwind::Return(self.eval_expr(value, env)?)),
            Stmt::Expression { expression } => self.eval_expr(expression, env),
        }
    }

    // Blocks pass both returns and failures through untouched; only a call
    // frame or the program top level unwraps them. That is what lets a
    // `return` inside nested ifs unwind all the way out of the function.
    fn eval_block(&self, block: &Block, env: &Rc<RefCell<Environment>>) -> EvalResult {
        let mut result = Value::Null;
        for stmt in &block.statements {
            result = self.eval_stmt(stmt, env)?;
        }
        Ok(result)
    }

    fn eval_expr(&self, expr: &Expr, env: &Rc<RefCell<Environment>>) -> EvalResult {
        match expr {
            Expr::Integer { value } => Ok(Value::Int(*value)),
            Expr::Boolean { value } => Ok(Value::Bool(*value)),
            Expr::String { value } => Ok(Value::from(value.clone())),
            Expr::Identifier(ident) => self.eval_identifier(&ident.value, env),
            Expr::Prefix { operator, right } => {
                let right = self.eval_expr(right, env)?;
                Ok(eval_prefix(operator, right)?)
            }
            Expr::Infix {
                left,
                operator,
                right,
            } => {
                let left = self.eval_expr(left, env)?;
                let right = self.eval_expr(right, env)?;
                Ok(eval_infix(operator, left, right)?)
            }
            Expr::If {
                condition,
                consequence,
                alternative,
            } => {
                let condition = self.eval_expr(condition, env)?;
                if is_truthy(&condition) {
                    self.eval_block(consequence, env)
                } else if let Some(alternative) = alternative {
                    self.eval_block(alternative, env)
                } else {
                    Ok(Value::Null)
                }
            }
            Expr::Function { params, body } => Ok(Value::Function(Rc::new(Function {
                params: params.clone(),
                body: body.clone(),
                env: env.clone(),
            }))),
            Expr::Call { callee, args } => {
                let callee = self.eval_expr(callee, env)?;
                let args = self.eval_expressions(args, env)?;
                self.apply(callee, args)
            }
            Expr::Array { elements } => {
                let elements = self.eval_expressions(elements, env)?;
                Ok(Value::Array(Rc::new(elements)))
            }
            Expr::Hash { pairs } => self.eval_hash_literal(pairs, env),
            Expr::Index { left, index } => {
                let left = self.eval_expr(left, env)?;
                let index = self.eval_expr(index, env)?;
                Ok(eval_index(left, index)?)
            }
        }
    }

    fn eval_identifier(&self, name: &str, env: &Rc<RefCell<Environment>>) -> EvalResult {
        if let Some(value) = env.borrow().get(name) {
            Ok(value)
        } else if let Some(builtin) = self.builtins.get(name) {
            Ok(Value::Builtin(builtin.clone()))
        } else {
            Err(RuntimeError::IdentifierNotFound(String::from(name)).into())
        }
    }

    // The first failing element aborts the whole list.
    fn eval_expressions(
        &self,
        exprs: &[Expr],
        env: &Rc<RefCell<Environment>>,
    ) -> Result<Vec<Value>, Unwind> {
        exprs
            .iter()
            .map(|expr| self.eval_expr(expr, env))
            .collect()
    }

    fn apply(&self, callee: Value, args: Vec<Value>) -> EvalResult {
        match callee {
            Value::Function(function) => {
                // The call frame chains to the closure's captured scope, not
                // to the caller's.
                let mut frame = Environment::enclosed(function.env.clone());
                for (param, arg) in function.params.iter().zip(args) {
                    frame.set(&param.value, arg);
                }

                let frame = Rc::new(RefCell::new(frame));
                match self.eval_block(&function.body, &frame) {
                    Err(Unwind::Return(value)) => Ok(value),
                    other => other,
                }
            }
            Value::Builtin(builtin) => Ok(builtin.call(&args)?),
            other => Err(RuntimeError::NotAFunction(other.ty()).into()),
        }
    }

    fn eval_hash_literal(
        &self,
        pairs: &[(Expr, Expr)],
        env: &Rc<RefCell<Environment>>,
    ) -> EvalResult {
        let mut hash = HashMap::new();

        for (key_expr, value_expr) in pairs {
            let key = self.eval_expr(key_expr, env)?;
            let Some(hash_key) = key.hash_key() else {
                return Err(RuntimeError::UnusableHashKey(key.ty()).into());
            };

            let value = self.eval_expr(value_expr, env)?;
            hash.insert(hash_key, HashPair { key, value });
        }

        Ok(Value::Hash(Rc::new(hash)))
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new(Rc::new(RefCell::new(io::stdout())))
    }
}

// Everything except `false` and `null` is truthy, zero and the empty string
// included.
fn is_truthy(value: &Value) -> bool {
    !matches!(value, Value::Bool(false) | Value::Null)
}

fn eval_prefix(operator: &Token, right: Value) -> Result<Value, RuntimeError> {
    match operator.ty {
        TokenType::Bang => Ok(Value::Bool(!is_truthy(&right))),
        TokenType::Minus => match right {
            Value::Int(value) => Ok(Value::Int(-value)),
            other => Err(RuntimeError::UnknownPrefixOperator {
                operator: operator.literal.clone(),
                right: other.ty(),
            }),
        },
        _ => Err(RuntimeError::UnknownPrefixOperator {
            operator: operator.literal.clone(),
            right: right.ty(),
        }),
    }
}

fn eval_infix(operator: &Token, left: Value, right: Value) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::Int(left), Value::Int(right)) => eval_integer_infix(operator, left, right),
        (Value::Str(left), Value::Str(right)) => eval_string_infix(operator, &left, &right),
        (left, right) if left.ty() != right.ty() => Err(RuntimeError::TypeMismatch {
            left: left.ty(),
            operator: operator.literal.clone(),
            right: right.ty(),
        }),
        (left, right) => match operator.ty {
            TokenType::EqualEqual => Ok(Value::Bool(left == right)),
            TokenType::BangEqual => Ok(Value::Bool(left != right)),
            _ => Err(RuntimeError::UnknownInfixOperator {
                left: left.ty(),
                operator: operator.literal.clone(),
                right: right.ty(),
            }),
        },
    }
}

fn eval_integer_infix(operator: &Token, left: i64, right: i64) -> Result<Value, RuntimeError> {
    let value = match operator.ty {
        TokenType::Plus => Value::Int(left + right),
        TokenType::Minus => Value::Int(left - right),
        TokenType::Asterisk => Value::Int(left * right),
        // Truncating division, like the host's.
        TokenType::Slash => Value::Int(left / right),
        TokenType::Less => Value::Bool(left < right),
        TokenType::Greater => Value::Bool(left > right),
        TokenType::EqualEqual => Value::Bool(left == right),
        TokenType::BangEqual => Value::Bool(left != right),
        _ => {
            return Err(RuntimeError::UnknownInfixOperator {
                left: Type::Integer,
                operator: operator.literal.clone(),
                right: Type::Integer,
            })
        }
    };
    Ok(value)
}

fn eval_string_infix(operator: &Token, left: &str, right: &str) -> Result<Value, RuntimeError> {
    match operator.ty {
        TokenType::Plus => Ok(Value::from(format!("{}{}", left, right))),
        TokenType::EqualEqual => Ok(Value::Bool(left == right)),
        TokenType::BangEqual => Ok(Value::Bool(left != right)),
        _ => Err(RuntimeError::UnknownInfixOperator {
            left: Type::String,
            operator: operator.literal.clone(),
            right: Type::String,
        }),
    }
}

fn eval_index(left: Value, index: Value) -> Result<Value, RuntimeError> {
    match (left, index) {
        (Value::Array(elements), Value::Int(index)) => {
            // Out of range reads as null, not as an error.
            let element = usize::try_from(index)
                .ok()
                .and_then(|index| elements.get(index).cloned());
            Ok(element.unwrap_or(Value::Null))
        }
        (Value::Hash(pairs), key) => match key.hash_key() {
            Some(hash_key) => Ok(pairs
                .get(&hash_key)
                .map(|pair| pair.value.clone())
                .unwrap_or(Value::Null)),
            None => Err(RuntimeError::UnusableHashKey(key.ty())),
        },
        (left, _) => Err(RuntimeError::IndexNotSupported(left.ty())),
    }
}
