use crate::compiler_frontend::ast::ast_nodes::{AstNode, NodeId, NodeKind, TextLocation};
use crate::projects::settings::MAIN_METHOD_NAME;
use std::path::PathBuf;

/// Arena of AST nodes.
///
/// Nodes are pushed children-first and never change afterward.
/// A parent is a stored index, so upward walks for scope resolution are just index hops.
#[derive(Debug, Clone, Default)]
pub struct Ast {
    nodes: Vec<AstNode>,
    root: Option<NodeId>,

    // The original .jmm file, if the parser told us. Only used for error snippets.
    pub source_path: PathBuf,
}

impl Ast {
    pub fn new() -> Self {
        Ast::default()
    }

    /// Adds a node and claims every child its kind names.
    pub fn push(&mut self, kind: NodeKind, location: TextLocation) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);

        for child in kind.children() {
            if let Some(node) = self.nodes.get_mut(child.index()) {
                node.parent = Some(id);
            }
        }

        self.nodes.push(AstNode {
            kind,
            parent: None,
            location,
        });

        id
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &AstNode {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn location(&self, id: NodeId) -> &TextLocation {
        &self.node(id).location
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// Every node reachable from the root, parents before children
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let Some(root) = self.root else {
            return order;
        };

        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            order.push(id);

            // Reverse so the first child is visited first
            for child in self.kind(id).children().into_iter().rev() {
                stack.push(child);
            }
        }

        order
    }

    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |current| self.parent(*current))
    }

    /// The MainMethod or InstanceMethod node this node sits inside
    pub fn enclosing_method(&self, id: NodeId) -> Option<NodeId> {
        if self.kind(id).is_method() {
            return Some(id);
        }

        self.ancestors(id).find(|ancestor| self.kind(*ancestor).is_method())
    }

    /// Signature name of a method node. `main` is reserved for the static entry point.
    pub fn method_name(&self, method: NodeId) -> Option<&str> {
        match self.kind(method) {
            NodeKind::MainMethod { .. } => Some(MAIN_METHOD_NAME),
            NodeKind::InstanceMethod { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn class_declaration(&self) -> Option<NodeId> {
        match self.root.map(|root| self.kind(root)) {
            Some(NodeKind::Program { class, .. }) => Some(*class),
            Some(NodeKind::ClassDeclaration { .. }) => self.root,
            _ => None,
        }
    }
}
