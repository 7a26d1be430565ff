use std::fmt::{Display, Formatter};
use std::rc::Rc;

use monkey_core::Token;

// Function literals share their parameter list and body with every closure
// value created from them, so those live behind `Rc` instead of being cloned
// into each closure at evaluation time.

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub value: String,
}

impl Identifier {
    pub fn new(value: impl Into<String>) -> Self {
        Identifier {
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Let { name: Identifier, value: Expr },
    Return { value: Expr },
    Expression { expression: Expr },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Identifier(Identifier),
    Integer {
        value: i64,
    },
    Boolean {
        value: bool,
    },
    String {
        value: String,
    },
    Prefix {
        operator: Token,
        right: Box<Expr>,
    },
    Infix {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
    If {
        condition: Box<Expr>,
        consequence: Block,
        alternative: Option<Block>,
    },
    Function {
        params: Rc<Vec<Identifier>>,
        body: Rc<Block>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Array {
        elements: Vec<Expr>,
    },
    // Pairs keep their source order so keys and values evaluate in the order
    // they were written.
    Hash {
        pairs: Vec<(Expr, Expr)>,
    },
    Index {
        left: Box<Expr>,
        index: Box<Expr>,
    },
}

impl Stmt {
    /// Literal of the token this statement was parsed from.
    pub fn token_literal(&self) -> String {
        match self {
            Stmt::Let { .. } => "let".to_string(),
            Stmt::Return { .. } => "return".to_string(),
            Stmt::Expression { expression } => expression.token_literal(),
        }
    }
}

impl Expr {
    pub fn token_literal(&self) -> String {
        match self {
            Expr::Identifier(ident) => ident.value.clone(),
            Expr::Integer { value } => value.to_string(),
            Expr::Boolean { value } => value.to_string(),
            Expr::String { value } => value.clone(),
            Expr::Prefix { operator, .. } => operator.literal.clone(),
            Expr::Infix { operator, .. } => operator.literal.clone(),
            Expr::If { .. } => "if".to_string(),
            Expr::Function { .. } => "fn".to_string(),
            Expr::Call { .. } => "(".to_string(),
            Expr::Array { .. } | Expr::Index { .. } => "[".to_string(),
            Expr::Hash { .. } => "{".to_string(),
        }
    }

    pub fn identifier(value: impl Into<String>) -> Self {
        Expr::Identifier(Identifier::new(value))
    }

    pub fn integer(value: i64) -> Self {
        Expr::Integer { value }
    }

    pub fn boolean(value: bool) -> Self {
        Expr::Boolean { value }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expr::String {
            value: value.into(),
        }
    }

    pub fn prefix(operator: Token, right: Expr) -> Self {
        Expr::Prefix {
            operator,
            right: Box::new(right),
        }
    }

    pub fn infix(left: Expr, operator: Token, right: Expr) -> Self {
        Expr::Infix {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee: Box::new(callee),
            args,
        }
    }

    pub fn index(left: Expr, index: Expr) -> Self {
        Expr::Index {
            left: Box::new(left),
            index: Box::new(index),
        }
    }
}

fn join(items: impl IntoIterator<Item = impl Display>, sep: &str) -> String {
    items
        .into_iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(sep)
}

impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for stmt in &self.statements {
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

impl Display for Block {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for stmt in &self.statements {
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

impl Display for Stmt {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Stmt::Let { name, value } => write!(f, "let {} = {};", name, value),
            Stmt::Return { value } => write!(f, "return {};", value),
            Stmt::Expression { expression } => write!(f, "{}", expression),
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Identifier(ident) => write!(f, "{}", ident),
            Expr::Integer { value } => write!(f, "{}", value),
            Expr::Boolean { value } => write!(f, "{}", value),
            Expr::String { value } => f.write_str(value),
            Expr::Prefix { operator, right } => write!(f, "({}{})", operator.literal, right),
            Expr::Infix {
                left,
                operator,
                right,
            } => write!(f, "({} {} {})", left, operator.literal, right),
            Expr::If {
                condition,
                consequence,
                alternative,
            } => {
                write!(f, "if{} {}", condition, consequence)?;
                if let Some(alternative) = alternative {
                    write!(f, "else {}", alternative)?;
                }
                Ok(())
            }
            Expr::Function { params, body } => {
                write!(f, "fn({}){}", join(params.iter(), ", "), body)
            }
            Expr::Call { callee, args } => {
                write!(f, "{}({})", callee, join(args.iter(), ", "))
            }
            Expr::Array { elements } => write!(f, "[{}]", join(elements.iter(), ", ")),
            Expr::Hash { pairs } => {
                let pairs = pairs
                    .iter()
                    .map(|(key, value)| format!("{}:{}", key, value))
                    .collect::<Vec<_>>();
                write!(f, "{{{}}}", pairs.join(", "))
            }
            Expr::Index { left, index } => write!(f, "({}[{}])", left, index),
        }
    }
}
