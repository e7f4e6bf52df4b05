//! Node model shared by parsed trees and synthesized subtrees.
//!
//! A parsed file is assembled with a [`TreeBuilder`] and sealed into an
//! [`Ast`] by [`TreeBuilder::finish`]; nothing mutates an `Ast` afterwards.
//! Nodes are addressed by [`NodeRef`], never compared by content.

use std::ops::Range;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SyntaxError;
use crate::types::{BasicType, CvQualifiers};

/// Index of a node inside one arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identity of a node: which arena it lives in, and where.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeRef {
    /// Part of the original parsed tree.
    Parsed(NodeId),
    /// Created during the rewrite session; rendered in full.
    Synthetic(NodeId),
}

impl NodeRef {
    pub fn id(self) -> NodeId {
        match self {
            NodeRef::Parsed(id) | NodeRef::Synthetic(id) => id,
        }
    }

    pub fn is_synthetic(self) -> bool {
        matches!(self, NodeRef::Synthetic(_))
    }
}

/// Byte range of a node in its file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileLocation {
    pub offset: usize,
    pub length: usize,
}

impl FileLocation {
    pub fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    pub fn end(&self) -> usize {
        self.offset + self.length
    }

    pub fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }
}

impl From<Range<usize>> for FileLocation {
    fn from(range: Range<usize>) -> Self {
        FileLocation::new(range.start, range.end.saturating_sub(range.start))
    }
}

/// Pointer-like declarator operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerOp {
    Pointer(CvQualifiers),
    Reference { rvalue: bool },
    /// `C::*`; the owning class name is the operator node's only child.
    PointerToMember(CvQualifiers),
}

/// How siblings inside a container are separated in source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListStyle {
    /// One element per line.
    Lines,
    /// `a, b, c`
    Comma,
    /// `ns::Name`
    Scope,
    /// Elements written back to back, e.g. `[3][4]`.
    Adjacent,
    Space,
}

impl ListStyle {
    pub fn separator(&self) -> &'static str {
        match self {
            ListStyle::Lines => "\n",
            ListStyle::Comma => ", ",
            ListStyle::Scope => "::",
            ListStyle::Adjacent => "",
            ListStyle::Space => " ",
        }
    }
}

/// Syntax vocabulary of the C/C++ subset the engine understands.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    TranslationUnit,
    SimpleDeclaration,
    FunctionDefinition,
    CompoundStatement,
    Statement,
    Expression,
    Initializer,
    SimpleDeclSpec { cv: CvQualifiers, basic: BasicType },
    /// Children: the type's name.
    NamedTypeSpec { cv: CvQualifiers },
    /// Children: pointer operators, then a name or nested declarator,
    /// then an optional initializer.
    Declarator,
    /// Like [`NodeKind::Declarator`] plus array modifiers after the name.
    ArrayDeclarator,
    /// Like [`NodeKind::Declarator`] plus parameter declarations after the name.
    FunctionDeclarator { varargs: bool },
    /// Children: an optional size expression.
    ArrayModifier,
    PointerOperator(PointerOp),
    /// Children: decl-spec, declarator.
    ParameterDeclaration,
    Name(String),
    QualifiedName,
    /// Token spelled verbatim, such as an array size.
    Token(String),
    /// Raw text injected by a rewrite; never part of a parsed file.
    Literal(String),
}

impl NodeKind {
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::TranslationUnit => "translation unit",
            NodeKind::SimpleDeclaration => "simple declaration",
            NodeKind::FunctionDefinition => "function definition",
            NodeKind::CompoundStatement => "compound statement",
            NodeKind::Statement => "statement",
            NodeKind::Expression => "expression",
            NodeKind::Initializer => "initializer",
            NodeKind::SimpleDeclSpec { .. } => "simple decl-spec",
            NodeKind::NamedTypeSpec { .. } => "named type specifier",
            NodeKind::Declarator => "declarator",
            NodeKind::ArrayDeclarator => "array declarator",
            NodeKind::FunctionDeclarator { .. } => "function declarator",
            NodeKind::ArrayModifier => "array modifier",
            NodeKind::PointerOperator(_) => "pointer operator",
            NodeKind::ParameterDeclaration => "parameter declaration",
            NodeKind::Name(_) => "name",
            NodeKind::QualifiedName => "qualified name",
            NodeKind::Token(_) => "token",
            NodeKind::Literal(_) => "literal",
        }
    }

    pub fn is_declarator(&self) -> bool {
        matches!(
            self,
            NodeKind::Declarator | NodeKind::ArrayDeclarator | NodeKind::FunctionDeclarator { .. }
        )
    }

    pub fn is_name(&self) -> bool {
        matches!(self, NodeKind::Name(_) | NodeKind::QualifiedName)
    }

    /// Separator between a child of `kind` and its siblings when the child
    /// lives inside a node of this kind.
    pub fn list_style_for(&self, child: &NodeKind) -> ListStyle {
        match self {
            NodeKind::TranslationUnit | NodeKind::CompoundStatement => ListStyle::Lines,
            NodeKind::QualifiedName => ListStyle::Scope,
            NodeKind::FunctionDeclarator { .. }
                if matches!(child, NodeKind::ParameterDeclaration) =>
            {
                ListStyle::Comma
            }
            NodeKind::SimpleDeclaration if child.is_declarator() => ListStyle::Comma,
            _ if matches!(
                child,
                NodeKind::ArrayModifier | NodeKind::PointerOperator(_)
            ) =>
            {
                ListStyle::Adjacent
            }
            _ => ListStyle::Space,
        }
    }

    /// Delimiter that closes a container of this kind, if any. Appending to
    /// an empty container inserts right before it.
    pub fn closing_delimiter(&self) -> Option<char> {
        match self {
            NodeKind::CompoundStatement => Some('}'),
            NodeKind::FunctionDeclarator { .. } => Some(')'),
            NodeKind::ArrayModifier => Some(']'),
            NodeKind::SimpleDeclaration => Some(';'),
            _ => None,
        }
    }

    /// Text between the other children of a node of this kind and the first
    /// element of a list of `child` added after them.
    pub fn list_opener(&self, child: &NodeKind) -> &'static str {
        match self {
            NodeKind::SimpleDeclaration if child.is_declarator() => " ",
            _ => "",
        }
    }
}

/// One element of an arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeRef>,
    pub(crate) children: Vec<NodeRef>,
    pub(crate) location: Option<FileLocation>,
}

impl Node {
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn parent(&self) -> Option<NodeRef> {
        self.parent
    }

    pub fn children(&self) -> &[NodeRef] {
        &self.children
    }

    pub fn location(&self) -> Option<FileLocation> {
        self.location
    }
}

/// Immutable parsed syntax tree of one file.
#[derive(Debug, Clone)]
pub struct Ast {
    file: PathBuf,
    source: String,
    nodes: Vec<Node>,
    root: NodeId,
}

impl Ast {
    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> NodeRef {
        NodeRef::Parsed(self.root)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn node(&self, node: NodeRef) -> Result<&Node, SyntaxError> {
        match node {
            NodeRef::Parsed(id) => self.get(id).ok_or(SyntaxError::DanglingNode(node)),
            NodeRef::Synthetic(_) => Err(SyntaxError::DanglingNode(node)),
        }
    }

    /// Source text covered by a parsed node.
    pub fn text(&self, node: NodeRef) -> Result<&str, SyntaxError> {
        let location = self
            .node(node)?
            .location
            .ok_or(SyntaxError::DanglingNode(node))?;
        Ok(&self.source[location.range()])
    }

    /// All parsed nodes in document (pre-)order.
    pub fn preorder(&self) -> Vec<NodeRef> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root()];
        while let Some(node) = stack.pop() {
            order.push(node);
            if let Some(data) = self.get(node.id()) {
                stack.extend(data.children.iter().rev().copied());
            }
        }
        order
    }

    /// Whether `node` is `ancestor` or lies below it.
    pub fn is_descendant_of(&self, node: NodeRef, ancestor: NodeRef) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.node(n).ok().and_then(|data| data.parent);
        }
        false
    }

    /// Leading whitespace of the line containing `offset`.
    pub fn indentation_at(&self, offset: usize) -> &str {
        let bytes = self.source.as_bytes();
        let mut line_start = offset.min(bytes.len());
        while line_start > 0 && bytes[line_start - 1] != b'\n' {
            line_start -= 1;
        }
        let mut end = line_start;
        while end < bytes.len() && matches!(bytes[end], b' ' | b'\t') {
            end += 1;
        }
        &self.source[line_start..end]
    }
}

/// Mutable construction side of [`Ast`].
///
/// Nodes are opened with [`start_node`](Self::start_node) and closed with
/// [`finish_node`](Self::finish_node); the first node opened is the root.
#[derive(Debug)]
pub struct TreeBuilder {
    file: PathBuf,
    source: String,
    nodes: Vec<Node>,
    open: Vec<NodeId>,
}

impl TreeBuilder {
    pub fn new(file: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            source: source.into(),
            nodes: Vec::new(),
            open: Vec::new(),
        }
    }

    pub fn start_node(&mut self, kind: NodeKind, range: Range<usize>) -> NodeRef {
        let id = NodeId(self.nodes.len() as u32);
        let parent = self.open.last().map(|p| NodeRef::Parsed(*p));
        if let Some(parent) = self.open.last() {
            self.nodes[parent.index()].children.push(NodeRef::Parsed(id));
        }
        self.nodes.push(Node {
            kind,
            parent,
            children: Vec::new(),
            location: Some(range.into()),
        });
        self.open.push(id);
        NodeRef::Parsed(id)
    }

    pub fn finish_node(&mut self) {
        self.open.pop();
    }

    /// A node without children.
    pub fn leaf(&mut self, kind: NodeKind, range: Range<usize>) -> NodeRef {
        let node = self.start_node(kind, range);
        self.finish_node();
        node
    }

    /// Seals the tree. Unclosed nodes are closed implicitly.
    pub fn finish(self) -> Result<Ast, SyntaxError> {
        let len = self.source.len();
        for (index, node) in self.nodes.iter().enumerate() {
            let node_ref = NodeRef::Parsed(NodeId(index as u32));
            if matches!(node.kind, NodeKind::Literal(_)) {
                return Err(SyntaxError::LiteralInParsedTree);
            }
            let Some(location) = node.location.filter(|loc| loc.end() <= len) else {
                return Err(SyntaxError::DanglingNode(node_ref));
            };
            for offset in [location.offset, location.end()] {
                if !self.source.is_char_boundary(offset) {
                    return Err(SyntaxError::SplitCharacter {
                        node: node_ref,
                        offset,
                    });
                }
            }
        }
        if self.nodes.is_empty() {
            return Err(SyntaxError::DanglingNode(NodeRef::Parsed(NodeId(0))));
        }
        Ok(Ast {
            file: self.file,
            source: self.source,
            nodes: self.nodes,
            root: NodeId(0),
        })
    }
}
