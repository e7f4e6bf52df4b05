//! Association of source comments with the nodes they belong to.

use std::collections::HashMap;

use crate::ast::{FileLocation, NodeRef};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub location: FileLocation,
    pub text: String,
}

impl Comment {
    pub fn new(location: impl Into<FileLocation>, text: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            text: text.into(),
        }
    }
}

/// Comments attached to nodes, as decided by whoever parsed the file.
///
/// Leading comments precede a node, trailing comments follow it on the same
/// line.
#[derive(Debug, Clone, Default)]
pub struct CommentMap {
    leading: HashMap<NodeRef, Vec<Comment>>,
    trailing: HashMap<NodeRef, Vec<Comment>>,
}

impl CommentMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_leading(&mut self, node: NodeRef, comment: Comment) {
        self.leading.entry(node).or_default().push(comment);
    }

    pub fn add_trailing(&mut self, node: NodeRef, comment: Comment) {
        self.trailing.entry(node).or_default().push(comment);
    }

    pub fn leading(&self, node: NodeRef) -> &[Comment] {
        self.leading.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn trailing(&self, node: NodeRef) -> &[Comment] {
        self.trailing.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Range of `location` widened over the node's leading and trailing
    /// comments.
    pub fn extended_range(&self, node: NodeRef, location: FileLocation) -> (usize, usize) {
        let start = self
            .leading(node)
            .iter()
            .map(|c| c.location.offset)
            .chain(std::iter::once(location.offset))
            .min()
            .unwrap_or(location.offset);
        let end = self
            .trailing(node)
            .iter()
            .map(|c| c.location.end())
            .chain(std::iter::once(location.end()))
            .max()
            .unwrap_or(location.end());
        (start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeId;

    #[test]
    fn test_extended_range_covers_comments() {
        let node = NodeRef::Parsed(NodeId(3));
        let mut comments = CommentMap::new();
        comments.add_leading(node, Comment::new(0..10, "// leading"));
        comments.add_trailing(node, Comment::new(25..33, "/* end */"));

        let range = comments.extended_range(node, FileLocation::new(11, 12));
        assert_eq!(range, (0, 33));
        assert_eq!(comments.leading(node)[0].text, "// leading");
    }

    #[test]
    fn test_extended_range_without_comments() {
        let comments = CommentMap::new();
        let node = NodeRef::Parsed(NodeId(0));
        assert_eq!(comments.extended_range(node, FileLocation::new(5, 5)), (5, 10));
    }
}
