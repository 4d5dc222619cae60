use std::{fmt, rc::Rc};

use super::token::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    NotEq,
    Lt,
    Gt,
    Lte,
    Gte,
}

impl fmt::Display for InfixOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InfixOp::Add => "+",
            InfixOp::Sub => "-",
            InfixOp::Mul => "*",
            InfixOp::Div => "/",
            InfixOp::Eq => "==",
            InfixOp::NotEq => "!=",
            InfixOp::Lt => "<",
            InfixOp::Gt => ">",
            InfixOp::Lte => "<=",
            InfixOp::Gte => ">=",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    Bool(bool),
    Nothing,
    Ident(Rc<str>),
    Field {
        target: Box<Expr>,
        name: Rc<str>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
    },
    Prefix {
        op: PrefixOp,
        operand: Box<Expr>,
    },
    Infix {
        op: InfixOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Array(Vec<Expr>),
    Tuple(Vec<Expr>),
}

impl Expr {
    /// Longest path from this node down to a leaf, counting this node.
    pub fn height(&self) -> usize {
        let below = match self {
            Expr::Int(_)
            | Expr::Float(_)
            | Expr::Str(_)
            | Expr::Bool(_)
            | Expr::Nothing
            | Expr::Ident(_) => 0,
            Expr::Field { target, .. } => target.height(),
            Expr::Prefix { operand, .. } => operand.height(),
            Expr::Index { target, index } => target.height().max(index.height()),
            Expr::Infix { left, right, .. } => left.height().max(right.height()),
            Expr::Call { callee, args } => args
                .iter()
                .map(Expr::height)
                .fold(callee.height(), usize::max),
            Expr::Array(items) | Expr::Tuple(items) => {
                items.iter().map(Expr::height).max().unwrap_or(0)
            }
        };
        below + 1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expr(Expr),
    Assign {
        name: Rc<str>,
        value: Expr,
    },
    Function {
        name: Rc<str>,
        params: Rc<[Rc<str>]>,
        body: Rc<Expr>,
    },
    Struct {
        name: Rc<str>,
        fields: Vec<Rc<str>>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub stmt: Stmt,
    pub position: Position,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}
