//! Lowering of recorded modifications into text changes.

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::ast::Ast;
use crate::change::{Change, CompositeChange, DiffStats, TextEdit};
use crate::comments::CommentMap;
use crate::config::RewriteConfig;
use crate::error::RewriteResult;
use crate::factory::NodeFactory;
use crate::store::ModificationStore;
use crate::writer::NodeWriter;

/// Everything recorded against one parsed file.
#[derive(Debug, Clone, Copy)]
pub struct RewriteSession<'s> {
    pub ast: &'s Ast,
    pub store: &'s ModificationStore,
    pub factory: &'s NodeFactory,
    pub comments: &'s CommentMap,
}

#[derive(Debug, Clone, Default)]
pub struct Rewriter {
    config: RewriteConfig,
}

impl Rewriter {
    pub fn new(config: RewriteConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RewriteConfig {
        &self.config
    }

    /// Turns the modifications in `store` into a [`Change`] against the
    /// source of `ast`.
    ///
    /// Either every modification is lowered or none is: edit groups only
    /// learn about their edits once the whole change is known to apply.
    pub fn rewrite(
        &self,
        ast: &Ast,
        store: &ModificationStore,
        factory: &NodeFactory,
        comments: &CommentMap,
    ) -> RewriteResult<Change> {
        let writer = NodeWriter::new(ast, factory, store, comments, &self.config);
        let splices = writer.root_splices()?;
        debug!(file = %ast.file().display(), edits = splices.len(), "lowered modifications");

        let mut recorded = Vec::with_capacity(splices.len());
        let mut entries = Vec::with_capacity(splices.len());
        for splice in splices {
            let edit = TextEdit::new(splice.offset, splice.length, splice.text);
            entries.push((edit.clone(), splice.modification.edit_group().name()));
            recorded.push((splice.modification, edit));
        }

        let name = format!("Rewrite {}", ast.file().display());
        let change = Change::new(name, ast.file(), entries);
        change.apply(ast.source())?;

        for (modification, edit) in recorded {
            modification.edit_group().add_edit(edit);
        }
        Ok(change)
    }

    /// Unified diff of `change` against `source`, with the configured
    /// amount of context.
    pub fn preview(&self, change: &Change, source: &str) -> RewriteResult<(String, DiffStats)> {
        change.preview_diff(source, self.config.diff_context_lines)
    }

    /// Rewrites every session, collecting per-file failures instead of
    /// stopping at the first one. Setting `cancel` stops before the next
    /// file.
    pub fn rewrite_batch<'s>(
        &self,
        name: impl Into<String>,
        sessions: impl IntoIterator<Item = RewriteSession<'s>>,
        cancel: Option<&AtomicBool>,
    ) -> CompositeChange {
        let mut composite = CompositeChange::new(name);
        for session in sessions {
            if cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
                warn!("rewrite cancelled, {} file(s) done", composite.changes.len());
                break;
            }
            let file = session.ast.file().to_path_buf();
            let result = self
                .rewrite(session.ast, session.store, session.factory, session.comments)
                .with_context(|| format!("Failed to rewrite {}", file.display()));
            match result {
                Ok(change) => composite.changes.push(change),
                Err(err) => {
                    warn!(file = %file.display(), "{:#}", err);
                    composite.failures.push((file, err));
                }
            }
        }
        info!(
            changed = composite.changes.len(),
            failed = composite.failures.len(),
            "batch rewrite finished"
        );
        composite
    }
}
