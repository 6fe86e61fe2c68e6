//! AST node kinds

use super::NodeId;
use serde::Serialize;

/// Node payload. Child ids listed here are the only ownership edges of the tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum NodeKind {
    /// Integer literal
    Int(i64),
    /// Float literal
    Float(f64),
    /// Identifier reference
    Id(String),
    /// `?`: read an integer from input
    Qmark,
    /// `name = value`
    Assign { name: String, value: NodeId },
    /// `callee(args)`; `args` is an `ExprList`
    Apply { callee: NodeId, args: NodeId },
    /// Binary operation
    BinOp { op: BinOp, lhs: NodeId, rhs: NodeId },
    /// Unary operation
    UnOp { op: UnOp, operand: NodeId },
    /// Function literal: `func(params) [: name] { body }`
    Func {
        body: NodeId,
        params: NodeId,
        name: Option<String>,
    },
    /// Lexical block; owns a `BlockList`
    Scope { blocks: NodeId },
    /// Statement sequence
    BlockList(Vec<NodeId>),
    While { cond: NodeId, body: NodeId },
    If {
        cond: NodeId,
        then_branch: NodeId,
        else_branch: Option<NodeId>,
    },
    Return(NodeId),
    Print(NodeId),
    /// Call-argument list
    ExprList(Vec<NodeId>),
    /// Parameter-name list
    DeclList(Vec<String>),
    /// Empty statement
    Empty,
}

impl NodeKind {
    /// Direct children, in evaluation order.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            NodeKind::Int(_)
            | NodeKind::Float(_)
            | NodeKind::Id(_)
            | NodeKind::Qmark
            | NodeKind::DeclList(_)
            | NodeKind::Empty => Vec::new(),
            NodeKind::Assign { value, .. } => vec![*value],
            NodeKind::Apply { callee, args } => vec![*callee, *args],
            NodeKind::BinOp { lhs, rhs, .. } => vec![*lhs, *rhs],
            NodeKind::UnOp { operand, .. } => vec![*operand],
            NodeKind::Func { body, params, .. } => vec![*params, *body],
            NodeKind::Scope { blocks } => vec![*blocks],
            NodeKind::BlockList(items) | NodeKind::ExprList(items) => items.clone(),
            NodeKind::While { cond, body } => vec![*cond, *body],
            NodeKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let mut children = vec![*cond, *then_branch];
                children.extend(else_branch);
                children
            }
            NodeKind::Return(value) | NodeKind::Print(value) => vec![*value],
        }
    }

    /// Short name used in logs and dumps
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Int(_) => "int",
            NodeKind::Float(_) => "float",
            NodeKind::Id(_) => "id",
            NodeKind::Qmark => "qmark",
            NodeKind::Assign { .. } => "assign",
            NodeKind::Apply { .. } => "apply",
            NodeKind::BinOp { .. } => "binop",
            NodeKind::UnOp { .. } => "unop",
            NodeKind::Func { .. } => "func",
            NodeKind::Scope { .. } => "scope",
            NodeKind::BlockList(_) => "blocks",
            NodeKind::While { .. } => "while",
            NodeKind::If { .. } => "if",
            NodeKind::Return(_) => "return",
            NodeKind::Print(_) => "print",
            NodeKind::ExprList(_) => "exprs",
            NodeKind::DeclList(_) => "decls",
            NodeKind::Empty => "empty",
        }
    }
}

/// Binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinOp {
    // Arithmetic
    Mul,
    Div,
    Add,
    Sub,

    // Comparison
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,

    // Logical (both operands are always evaluated)
    And,
    Or,
}

impl std::fmt::Display for BinOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinOp::Mul => write!(f, "*"),
            BinOp::Div => write!(f, "/"),
            BinOp::Add => write!(f, "+"),
            BinOp::Sub => write!(f, "-"),
            BinOp::Lt => write!(f, "<"),
            BinOp::Gt => write!(f, ">"),
            BinOp::Le => write!(f, "<="),
            BinOp::Ge => write!(f, ">="),
            BinOp::Eq => write!(f, "=="),
            BinOp::Ne => write!(f, "!="),
            BinOp::And => write!(f, "&&"),
            BinOp::Or => write!(f, "||"),
        }
    }
}

/// Unary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnOp {
    /// Identity (+)
    Plus,
    /// Negation (-)
    Neg,
    /// Logical not (!)
    Not,
}

impl std::fmt::Display for UnOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnOp::Plus => write!(f, "+"),
            UnOp::Neg => write!(f, "-"),
            UnOp::Not => write!(f, "!"),
        }
    }
}
