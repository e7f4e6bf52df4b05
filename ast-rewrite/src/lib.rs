pub mod ast;
pub mod change;
pub mod comments;
pub mod config;
pub mod error;
pub mod factory;
pub mod modification;
pub mod modification_map;
pub mod position;
pub mod rewriter;
pub mod store;
pub mod synthesizer;
pub mod types;
pub mod writer;


pub use ast::{Ast, FileLocation, NodeId, NodeKind, NodeRef, PointerOp, TreeBuilder};
pub use change::{generate_unified_diff, Change, CompositeChange, DiffStats, TextEdit};
pub use comments::{Comment, CommentMap};
pub use config::{DeclaratorStyle, RewriteConfig};
pub use error::{ModificationError, RewriteError, RewriteResult, SyntaxError};
pub use factory::NodeFactory;
pub use modification::{EditGroup, Modification, ModificationId, ModificationKind};
pub use modification_map::ModificationMap;
pub use position::TrackedNodePosition;
pub use rewriter::{RewriteSession, Rewriter};
pub use store::ModificationStore;
pub use synthesizer::DeclaratorSynthesizer;
pub use types::{ArraySize, BasicKind, BasicType, Binding, BindingKind, CvQualifiers, Type};
pub use writer::{render_synthetic, NodeWriter};
