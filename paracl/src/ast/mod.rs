//! Abstract Syntax Tree definitions
//!
//! Nodes live in an [`Ast`] arena and refer to each other through [`NodeId`]
//! indices. The parser builds the tree exclusively through the `make_*`
//! factory functions, which also record each child's parent link.

mod node;
mod span;

pub use node::*;
pub use span::*;

use serde::Serialize;

/// Index of a node inside its [`Ast`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node with its location and a non-owning link to its parent
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub parent: Option<NodeId>,
}

/// Arena owning every node of one or more parsed programs
#[derive(Debug, Clone, Default, Serialize)]
pub struct Ast {
    nodes: Vec<Node>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.0].span
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Parent chain of `id`, nearest first (excluding `id` itself)
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&node| self.parent(node))
    }

    /// Name of the nearest enclosing named function
    pub fn enclosing_function_name(&self, id: NodeId) -> Option<&str> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find_map(|node| match self.kind(node) {
                NodeKind::Func { name: Some(name), .. } => Some(name.as_str()),
                _ => None,
            })
    }

    /// Move the spans of every node from arena index `first` on by `delta`
    /// bytes, so a program parsed on its own lines up with a larger text.
    pub fn shift_spans(&mut self, first: usize, delta: usize) {
        for node in self.nodes.iter_mut().skip(first) {
            node.span = node.span.offset(delta);
        }
    }

    fn push(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len());
        for child in kind.children() {
            let slot = &mut self.nodes[child.0].parent;
            debug_assert!(slot.is_none(), "node {child} already has a parent");
            *slot = Some(id);
        }
        self.nodes.push(Node {
            kind,
            span,
            parent: None,
        });
        id
    }

    // ============ Factory functions ============

    pub fn make_int(&mut self, value: i64, span: Span) -> NodeId {
        self.push(NodeKind::Int(value), span)
    }

    pub fn make_float(&mut self, value: f64, span: Span) -> NodeId {
        self.push(NodeKind::Float(value), span)
    }

    pub fn make_id(&mut self, name: impl Into<String>, span: Span) -> NodeId {
        self.push(NodeKind::Id(name.into()), span)
    }

    pub fn make_qmark(&mut self, span: Span) -> NodeId {
        self.push(NodeKind::Qmark, span)
    }

    pub fn make_assign(&mut self, name: impl Into<String>, value: NodeId, span: Span) -> NodeId {
        self.push(
            NodeKind::Assign {
                name: name.into(),
                value,
            },
            span,
        )
    }

    pub fn make_apply(&mut self, callee: NodeId, args: NodeId, span: Span) -> NodeId {
        debug_assert!(matches!(self.kind(args), NodeKind::ExprList(_)));
        self.push(NodeKind::Apply { callee, args }, span)
    }

    pub fn make_binop(&mut self, op: BinOp, lhs: NodeId, rhs: NodeId, span: Span) -> NodeId {
        self.push(NodeKind::BinOp { op, lhs, rhs }, span)
    }

    pub fn make_unop(&mut self, op: UnOp, operand: NodeId, span: Span) -> NodeId {
        self.push(NodeKind::UnOp { op, operand }, span)
    }

    pub fn make_func(
        &mut self,
        body: NodeId,
        params: NodeId,
        name: Option<String>,
        span: Span,
    ) -> NodeId {
        debug_assert!(matches!(self.kind(body), NodeKind::Scope { .. }));
        debug_assert!(matches!(self.kind(params), NodeKind::DeclList(_)));
        self.push(NodeKind::Func { body, params, name }, span)
    }

    pub fn make_scope(&mut self, blocks: NodeId, span: Span) -> NodeId {
        debug_assert!(matches!(self.kind(blocks), NodeKind::BlockList(_)));
        self.push(NodeKind::Scope { blocks }, span)
    }

    pub fn make_block_list(&mut self, items: Vec<NodeId>, span: Span) -> NodeId {
        self.push(NodeKind::BlockList(items), span)
    }

    pub fn make_while(&mut self, cond: NodeId, body: NodeId, span: Span) -> NodeId {
        self.push(NodeKind::While { cond, body }, span)
    }

    pub fn make_if(
        &mut self,
        cond: NodeId,
        then_branch: NodeId,
        else_branch: Option<NodeId>,
        span: Span,
    ) -> NodeId {
        self.push(
            NodeKind::If {
                cond,
                then_branch,
                else_branch,
            },
            span,
        )
    }

    pub fn make_return(&mut self, value: NodeId, span: Span) -> NodeId {
        self.push(NodeKind::Return(value), span)
    }

    pub fn make_print(&mut self, value: NodeId, span: Span) -> NodeId {
        self.push(NodeKind::Print(value), span)
    }

    pub fn make_expr_list(&mut self, items: Vec<NodeId>, span: Span) -> NodeId {
        self.push(NodeKind::ExprList(items), span)
    }

    pub fn make_decl_list(&mut self, names: Vec<String>, span: Span) -> NodeId {
        self.push(NodeKind::DeclList(names), span)
    }

    pub fn make_empty(&mut self, span: Span) -> NodeId {
        self.push(NodeKind::Empty, span)
    }
}
