//! Arena for nodes created during a rewrite session.
//!
//! Everything allocated here is addressed as [`NodeRef::Synthetic`] and is
//! rendered in full by the writer. Synthetic subtrees may point at parsed
//! nodes as children; those keep their original parent.

use crate::ast::{Node, NodeId, NodeKind, NodeRef, PointerOp};
use crate::error::SyntaxError;
use crate::types::{BasicType, CvQualifiers};

#[derive(Debug, Default)]
pub struct NodeFactory {
    nodes: Vec<Node>,
}

impl NodeFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocates a node and adopts its synthetic children.
    pub fn add(&mut self, kind: NodeKind, children: Vec<NodeRef>) -> NodeRef {
        let node = NodeRef::Synthetic(NodeId(self.nodes.len() as u32));
        for child in &children {
            if let NodeRef::Synthetic(id) = child {
                if let Some(data) = self.nodes.get_mut(id.index()) {
                    data.parent = Some(node);
                }
            }
        }
        self.nodes.push(Node {
            kind,
            parent: None,
            children,
            location: None,
        });
        node
    }

    /// A node standing for raw text. It renders verbatim and refuses
    /// structural queries.
    pub fn literal(&mut self, text: impl Into<String>) -> NodeRef {
        self.add(NodeKind::Literal(text.into()), Vec::new())
    }

    /// Verbatim token that, unlike a literal, takes part in copies.
    pub fn token(&mut self, text: impl Into<String>) -> NodeRef {
        self.add(NodeKind::Token(text.into()), Vec::new())
    }

    pub fn name(&mut self, text: impl Into<String>) -> NodeRef {
        self.add(NodeKind::Name(text.into()), Vec::new())
    }

    /// Empty name used by intermediate declarators.
    pub fn placeholder_name(&mut self) -> NodeRef {
        self.name(String::new())
    }

    pub fn simple_decl_spec(&mut self, basic: BasicType, cv: CvQualifiers) -> NodeRef {
        self.add(NodeKind::SimpleDeclSpec { cv, basic }, Vec::new())
    }

    pub fn pointer_operator(&mut self, op: PointerOp, class_name: Option<NodeRef>) -> NodeRef {
        self.add(NodeKind::PointerOperator(op), class_name.into_iter().collect())
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn node(&self, node: NodeRef) -> Result<&Node, SyntaxError> {
        match node {
            NodeRef::Synthetic(id) => self.get(id).ok_or(SyntaxError::DanglingNode(node)),
            NodeRef::Parsed(_) => Err(SyntaxError::DanglingNode(node)),
        }
    }

    fn structural(&self, node: NodeRef, operation: &'static str) -> Result<&Node, SyntaxError> {
        let data = self.node(node)?;
        if let NodeKind::Literal(_) = data.kind {
            return Err(SyntaxError::Unsupported {
                operation,
                node,
                kind: data.kind.label(),
            });
        }
        Ok(data)
    }

    pub fn parent(&self, node: NodeRef) -> Result<Option<NodeRef>, SyntaxError> {
        Ok(self.structural(node, "parent")?.parent)
    }

    pub fn children(&self, node: NodeRef) -> Result<&[NodeRef], SyntaxError> {
        Ok(&self.structural(node, "children")?.children)
    }

    /// Deep copy of a synthetic subtree. Parsed children are shared, not
    /// copied.
    pub fn copy(&mut self, node: NodeRef) -> Result<NodeRef, SyntaxError> {
        if !node.is_synthetic() {
            return Ok(node);
        }
        let data = self.structural(node, "copy")?;
        let kind = data.kind.clone();
        let children = data.children.clone();
        let copies = children
            .into_iter()
            .map(|child| self.copy(child))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.add(kind, copies))
    }

    /// Inserts `children` in front of the existing children of `node`.
    pub(crate) fn prepend_children(&mut self, node: NodeRef, children: Vec<NodeRef>) {
        let NodeRef::Synthetic(id) = node else {
            return;
        };
        for child in &children {
            if let NodeRef::Synthetic(child_id) = child {
                if let Some(data) = self.nodes.get_mut(child_id.index()) {
                    data.parent = Some(node);
                }
            }
        }
        if let Some(data) = self.nodes.get_mut(id.index()) {
            data.children.splice(0..0, children);
        }
    }
}
