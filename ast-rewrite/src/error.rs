//! Error types for the rewrite engine.
//!
//! Contract violations on modification maps are reported through
//! [`ModificationError`]; the panicking entry points format the same message.

use thiserror::Error;

use crate::ast::NodeRef;
use crate::modification::ModificationKind;

/// A request that would break the ordering/conflict rules of a modification map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModificationError {
    /// The target already carries a `Replace` or `AppendChild`.
    #[error("{target:?} is already modified by {existing}, cannot add {requested}")]
    AlreadyModified {
        target: NodeRef,
        existing: ModificationKind,
        requested: ModificationKind,
    },
}

/// Structural query that is not meaningful for the node it was asked of.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("{operation} is not supported on {node:?} ({kind})")]
    Unsupported {
        operation: &'static str,
        node: NodeRef,
        kind: &'static str,
    },

    #[error("Node {0:?} does not exist in this arena")]
    DanglingNode(NodeRef),

    #[error("Literal nodes cannot be part of a parsed tree")]
    LiteralInParsedTree,

    #[error("Range of {node:?} splits a character at byte {offset}")]
    SplitCharacter { node: NodeRef, offset: usize },
}

/// Failure while turning a modification store into a change for one file.
#[derive(Debug, Error)]
pub enum RewriteError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("Node {0:?} has no file location")]
    MissingLocation(NodeRef),

    #[error("Overlapping edits at offsets {first} and {second}")]
    OverlappingEdits { first: usize, second: usize },

    #[error("Edit range {offset}..{end} lies outside the source ({len} bytes)")]
    OutOfBounds { offset: usize, end: usize, len: usize },

    #[error("Edit boundary at byte {0} splits a character")]
    SplitCharacter(usize),
}

pub type RewriteResult<T> = Result<T, RewriteError>;
