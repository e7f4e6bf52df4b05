//! Rendering of nodes under a modification map.
//!
//! Parsed nodes render by copying their source range and splicing in the
//! text of whatever modifications apply inside it. Synthetic nodes have no
//! source and are written out in full from their kind and children.
//!
//! Rendering the new node of a modification always switches to that
//! modification's nested map, so edits on generated content apply at the
//! level they were recorded at.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::ast::{Ast, FileLocation, ListStyle, Node, NodeKind, NodeRef, PointerOp};
use crate::comments::CommentMap;
use crate::config::RewriteConfig;
use crate::error::{RewriteError, RewriteResult, SyntaxError};
use crate::factory::NodeFactory;
use crate::modification::Modification;
use crate::modification_map::ModificationMap;
use crate::store::ModificationStore;

/// A byte-range replacement in the original source, produced for one
/// modification.
#[derive(Debug)]
pub(crate) struct Splice<'a> {
    pub offset: usize,
    pub length: usize,
    pub text: String,
    pub modification: &'a Modification,
}

/// Rendered child of a synthetic node. `slot` is the kind of the node the
/// text stands in for, which decides where it goes; `kind` is the kind of
/// the node actually rendered.
struct Part<'a> {
    slot: &'a NodeKind,
    kind: &'a NodeKind,
    text: String,
}

pub struct NodeWriter<'a> {
    ast: Option<&'a Ast>,
    factory: &'a NodeFactory,
    store: Option<&'a ModificationStore>,
    comments: Option<&'a CommentMap>,
    config: &'a RewriteConfig,
}

/// Renders a synthetic subtree on its own, without any modifications.
pub fn render_synthetic(factory: &NodeFactory, node: NodeRef) -> RewriteResult<String> {
    let config = RewriteConfig::default();
    let writer = NodeWriter {
        ast: None,
        factory,
        store: None,
        comments: None,
        config: &config,
    };
    writer.content(node, None)
}

impl<'a> NodeWriter<'a> {
    pub fn new(
        ast: &'a Ast,
        factory: &'a NodeFactory,
        store: &'a ModificationStore,
        comments: &'a CommentMap,
        config: &'a RewriteConfig,
    ) -> Self {
        Self {
            ast: Some(ast),
            factory,
            store: Some(store),
            comments: Some(comments),
            config,
        }
    }

    /// Text of `modification`'s new node with its nested edits applied, or
    /// `None` when the modification carries no node.
    pub fn render_modification(&self, modification: &'a Modification) -> RewriteResult<Option<String>> {
        self.render_new(modification, None)
    }

    /// Splices for the whole file, in document order.
    pub(crate) fn root_splices(&self) -> RewriteResult<Vec<Splice<'a>>> {
        let mut splices = Vec::new();
        let (Some(ast), Some(map)) = (self.ast, self.store.and_then(|s| s.root_modifications()))
        else {
            return Ok(splices);
        };
        let root = ast.root();
        if !self.splice_own(root, None, map, None, &mut splices)? {
            self.splice_inner(root, map, &mut splices)?;
        }
        sort_splices(&mut splices);
        Ok(splices)
    }

    fn node(&self, node: NodeRef) -> Result<&'a Node, SyntaxError> {
        match node {
            NodeRef::Parsed(_) => self.ast.ok_or(SyntaxError::DanglingNode(node))?.node(node),
            NodeRef::Synthetic(_) => self.factory.node(node),
        }
    }

    fn ast(&self, node: NodeRef) -> Result<&'a Ast, SyntaxError> {
        self.ast.ok_or(SyntaxError::DanglingNode(node))
    }

    fn location(&self, node: NodeRef) -> RewriteResult<FileLocation> {
        self.node(node)?
            .location()
            .ok_or(RewriteError::MissingLocation(node))
    }

    fn nested(&self, modification: &Modification) -> Option<&'a ModificationMap> {
        self.store.and_then(|s| s.nested_modifications(modification))
    }

    fn render_new(
        &self,
        modification: &'a Modification,
        context: Option<&NodeKind>,
    ) -> RewriteResult<Option<String>> {
        let Some(new_node) = modification.new_node() else {
            return Ok(None);
        };
        let kind = &self.node(new_node)?.kind;
        let style = context.map_or(ListStyle::Lines, |c| c.list_style_for(kind));
        let parts = self.items(new_node, context, self.nested(modification))?;
        let mut text = join(parts.into_iter().map(|p| p.text), style.separator());

        // A parsed node moved elsewhere takes its comments along.
        if let (NodeRef::Parsed(_), Some(comments)) = (new_node, self.comments) {
            let mut wrapped = String::new();
            for comment in comments.leading(new_node) {
                wrapped.push_str(&comment.text);
                wrapped.push_str(&self.config.newline);
            }
            wrapped.push_str(&text);
            for comment in comments.trailing(new_node) {
                wrapped.push(' ');
                wrapped.push_str(&comment.text);
            }
            text = wrapped;
        }
        Ok(Some(text))
    }

    /// `node` as it appears under `map`: preceded by its insertions, or
    /// replaced.
    fn items(
        &self,
        node: NodeRef,
        context: Option<&NodeKind>,
        map: Option<&'a ModificationMap>,
    ) -> RewriteResult<Vec<Part<'a>>> {
        let data = self.node(node)?;
        let mut parts = Vec::new();
        if let Some(map) = map {
            for insert in map.inserts_before(node) {
                if let Some(text) = self.render_new(insert, context)? {
                    parts.push(self.part(&data.kind, insert, text)?);
                }
            }
            if let Some(replace) = map.replacement(node) {
                if let Some(text) = self.render_new(replace, context)? {
                    parts.push(self.part(&data.kind, replace, text)?);
                }
                return Ok(parts);
            }
        }
        parts.push(Part {
            slot: &data.kind,
            kind: &data.kind,
            text: self.content(node, map)?,
        });
        Ok(parts)
    }

    fn part(
        &self,
        slot: &'a NodeKind,
        modification: &Modification,
        text: String,
    ) -> RewriteResult<Part<'a>> {
        let kind = match modification.new_node() {
            Some(new_node) => &self.node(new_node)?.kind,
            None => slot,
        };
        Ok(Part { slot, kind, text })
    }

    /// The node's own text, with `map` applied below it.
    fn content(&self, node: NodeRef, map: Option<&'a ModificationMap>) -> RewriteResult<String> {
        match node {
            NodeRef::Parsed(_) => self.parsed_content(node, map),
            NodeRef::Synthetic(_) => self.synthetic_content(node, map),
        }
    }

    fn parsed_content(&self, node: NodeRef, map: Option<&'a ModificationMap>) -> RewriteResult<String> {
        let source = self.ast(node)?.source();
        let location = self.location(node)?;
        let mut splices = Vec::new();
        if let Some(map) = map {
            self.splice_inner(node, map, &mut splices)?;
        }
        sort_splices(&mut splices);

        let mut text = String::with_capacity(location.length);
        let mut cursor = location.offset;
        for splice in splices {
            if splice.offset < cursor {
                return Err(RewriteError::OverlappingEdits {
                    first: cursor,
                    second: splice.offset,
                });
            }
            if let Some(offset) = [splice.offset, splice.offset + splice.length]
                .into_iter()
                .find(|&o| !source.is_char_boundary(o))
            {
                return Err(RewriteError::SplitCharacter(offset));
            }
            if splice.offset + splice.length > location.end() {
                return Err(RewriteError::OutOfBounds {
                    offset: splice.offset,
                    end: splice.offset + splice.length,
                    len: location.end(),
                });
            }
            text.push_str(&source[cursor..splice.offset]);
            text.push_str(&splice.text);
            cursor = splice.offset + splice.length;
        }
        text.push_str(&source[cursor..location.end()]);
        Ok(text)
    }

    fn synthetic_content(&self, node: NodeRef, map: Option<&'a ModificationMap>) -> RewriteResult<String> {
        let data = self.node(node)?;
        if let NodeKind::Literal(text) = &data.kind {
            return Ok(text.clone());
        }

        let mut parts = Vec::new();
        for &child in &data.children {
            parts.extend(self.items(child, Some(&data.kind), map)?);
        }
        if let Some(map) = map {
            for append in map.appended_children(node) {
                let Some(new_node) = append.new_node() else {
                    continue;
                };
                let kind = &self.node(new_node)?.kind;
                let text = self
                    .render_new(append, Some(&data.kind))?
                    .unwrap_or_default();
                parts.push(Part {
                    slot: kind,
                    kind,
                    text,
                });
            }
        }
        Ok(self.write_kind(&data.kind, parts))
    }

    fn write_kind(&self, kind: &NodeKind, parts: Vec<Part<'_>>) -> String {
        let nl = self.config.newline.as_str();
        match kind {
            NodeKind::Literal(text) | NodeKind::Name(text) | NodeKind::Token(text) => text.clone(),
            NodeKind::QualifiedName => join(parts.into_iter().map(|p| p.text), "::"),
            NodeKind::SimpleDeclSpec { cv, basic } => {
                let basic = basic.to_string();
                join(
                    cv.keywords()
                        .map(String::from)
                        .chain(std::iter::once(basic))
                        .chain(parts.into_iter().map(|p| p.text)),
                    " ",
                )
            }
            NodeKind::NamedTypeSpec { cv } => join(
                cv.keywords()
                    .map(String::from)
                    .chain(parts.into_iter().map(|p| p.text)),
                " ",
            ),
            NodeKind::PointerOperator(op) => {
                let class = join(parts.into_iter().map(|p| p.text), "");
                let (prefix, cv) = match op {
                    PointerOp::Pointer(cv) => ("*".to_string(), *cv),
                    PointerOp::PointerToMember(cv) => (format!("{}::*", class), *cv),
                    PointerOp::Reference { rvalue: true } => return "&&".to_string(),
                    PointerOp::Reference { rvalue: false } => return "&".to_string(),
                };
                if cv.is_empty() {
                    prefix
                } else {
                    format!("{}{} ", prefix, join(cv.keywords().map(String::from), " "))
                }
            }
            NodeKind::ArrayModifier => {
                format!("[{}]", join(parts.into_iter().map(|p| p.text), ""))
            }
            NodeKind::Declarator
            | NodeKind::ArrayDeclarator
            | NodeKind::FunctionDeclarator { .. } => self.write_declarator(kind, parts),
            NodeKind::ParameterDeclaration => {
                join_non_empty(parts.into_iter().map(|p| p.text), " ")
            }
            NodeKind::SimpleDeclaration => {
                let (declarators, specs): (Vec<_>, Vec<_>) =
                    parts.into_iter().partition(|p| p.slot.is_declarator());
                let spec = join(specs.into_iter().map(|p| p.text), " ");
                let declarators = join(declarators.into_iter().map(|p| p.text), ", ");
                format!("{};", join_non_empty([spec, declarators], " "))
            }
            NodeKind::FunctionDefinition => join_non_empty(parts.into_iter().map(|p| p.text), " "),
            NodeKind::CompoundStatement => {
                let unit = self.config.indent_unit.as_str();
                let mut text = String::from("{");
                text.push_str(nl);
                for part in parts {
                    text.push_str(unit);
                    text.push_str(&indent_lines(&part.text, unit, nl));
                    text.push_str(nl);
                }
                text.push('}');
                text
            }
            NodeKind::TranslationUnit => join(parts.into_iter().map(|p| p.text), nl),
            NodeKind::Statement | NodeKind::Expression | NodeKind::Initializer => {
                join_non_empty(parts.into_iter().map(|p| p.text), " ")
            }
        }
    }

    fn write_declarator(&self, kind: &NodeKind, parts: Vec<Part<'_>>) -> String {
        let mut operators = String::new();
        let mut core = String::new();
        let mut suffix = String::new();
        let mut parameters = Vec::new();
        let mut trailing = Vec::new();

        for part in parts {
            match part.slot {
                NodeKind::PointerOperator(_) => operators.push_str(&part.text),
                NodeKind::ArrayModifier => suffix.push_str(&part.text),
                NodeKind::ParameterDeclaration => parameters.push(part.text),
                slot if (slot.is_name() || slot.is_declarator()) && core.is_empty() => {
                    if part.kind.is_declarator() {
                        core = format!("({})", part.text);
                    } else {
                        core = part.text;
                    }
                }
                _ => trailing.push(part.text),
            }
        }

        if let NodeKind::FunctionDeclarator { varargs } = kind {
            if *varargs {
                parameters.push("...".to_string());
            }
            suffix.push('(');
            suffix.push_str(&parameters.join(", "));
            suffix.push(')');
        }

        let declarator = format!("{}{}{}", operators, core, suffix);
        join_non_empty(std::iter::once(declarator).chain(trailing), " ")
    }

    /// Splices for the modifications of `node` itself. Returns whether the
    /// node was replaced, in which case its children are not visited.
    /// `list_removal` is the range to delete if the node vanishes from a
    /// comma list, as worked out by [`Self::list_removals`].
    fn splice_own(
        &self,
        node: NodeRef,
        context: Option<&NodeKind>,
        map: &'a ModificationMap,
        list_removal: Option<(usize, usize)>,
        out: &mut Vec<Splice<'a>>,
    ) -> RewriteResult<bool> {
        if !map.contains(node) {
            return Ok(false);
        }
        let ast = self.ast(node)?;
        let location = self.location(node)?;
        let kind = &self.node(node)?.kind;
        let (insert_at, extended_end) = self
            .comments
            .map_or((location.offset, location.end()), |c| c.extended_range(node, location));
        let style = context.map_or(ListStyle::Lines, |c| c.list_style_for(kind));
        let replace = map.replacement(node);
        let removed = replace.is_some_and(|r| r.new_node().is_none());

        // Inserts in front of a removed node take over its slot, so the last
        // of them carries no separator.
        let inserts: Vec<&'a Modification> = map
            .inserts_before(node)
            .filter(|m| m.new_node().is_some())
            .collect();
        for (i, &insert) in inserts.iter().enumerate() {
            let Some(text) = self.render_new(insert, context)? else {
                continue;
            };
            let takes_slot = removed && i + 1 == inserts.len();
            let text = match style {
                ListStyle::Lines => {
                    let indent = ast.indentation_at(insert_at);
                    let text = self.reindent(insert, &text, indent);
                    if takes_slot {
                        text
                    } else {
                        format!("{}{}{}", text, self.config.newline, indent)
                    }
                }
                _ if takes_slot => text,
                other => format!("{}{}", text, other.separator()),
            };
            trace!(?node, offset = insert_at, "insert before");
            out.push(Splice {
                offset: insert_at,
                length: 0,
                text,
                modification: insert,
            });
        }

        let Some(replace) = replace else {
            return Ok(false);
        };
        match self.render_new(replace, context)? {
            Some(text) => {
                let indent = ast.indentation_at(location.offset);
                trace!(?node, offset = location.offset, "replace");
                out.push(Splice {
                    offset: location.offset,
                    length: location.length,
                    text: self.reindent(replace, &text, indent),
                    modification: replace,
                });
            }
            None => {
                let (start, end) = if !inserts.is_empty() {
                    (insert_at, extended_end)
                } else if let Some(range) = list_removal {
                    range
                } else {
                    self.removal_range(ast, insert_at, extended_end, style)
                };
                trace!(?node, start, end, "remove");
                out.push(Splice {
                    offset: start,
                    length: end - start,
                    text: String::new(),
                    modification: replace,
                });
            }
        }
        self.log_superseded(ast, node, map);
        Ok(true)
    }

    /// Splices for everything below `node`.
    fn splice_inner(
        &self,
        node: NodeRef,
        map: &'a ModificationMap,
        out: &mut Vec<Splice<'a>>,
    ) -> RewriteResult<()> {
        let data = self.node(node)?;
        let removals = self.list_removals(data, map)?;
        for &child in &data.children {
            let removal = removals.get(&child).copied();
            if !self.splice_own(child, Some(&data.kind), map, removal, out)? {
                self.splice_inner(child, map, out)?;
            }
        }
        let appended: Vec<&'a Modification> = map
            .appended_children(node)
            .filter(|m| m.new_node().is_some())
            .collect();
        if !appended.is_empty() {
            self.splice_appended(node, data, map, &appended, out)?;
        }
        Ok(())
    }

    /// Ranges deleted for the comma-list children of `container` that
    /// vanish. Each element takes the separator after it, except for the
    /// elements closing the list, which take the separator before them.
    fn list_removals(
        &self,
        container: &Node,
        map: &ModificationMap,
    ) -> RewriteResult<HashMap<NodeRef, (usize, usize)>> {
        let mut removals = HashMap::new();
        if !container.children.iter().any(|&c| vanishes(map, c)) {
            return Ok(removals);
        }

        let mut siblings = Vec::new();
        for &child in &container.children {
            if container.kind.list_style_for(&self.node(child)?.kind) != ListStyle::Comma {
                continue;
            }
            let location = self.location(child)?;
            let range = self
                .comments
                .map_or((location.offset, location.end()), |c| c.extended_range(child, location));
            siblings.push((child, range, vanishes(map, child)));
        }

        let closing = siblings.iter().rev().take_while(|s| s.2).count();
        let first_closing = siblings.len() - closing;
        for (i, &(child, (start, end), gone)) in siblings.iter().enumerate() {
            if !gone {
                continue;
            }
            let next_start = siblings.get(i + 1).map(|s| s.1 .0);
            let range = match (first_closing, next_start) {
                (0, Some(next)) => (start, next),
                (0, None) => (start, end),
                (first, Some(next)) if i < first => (start, next),
                _ => (siblings[i - 1].1 .1, end),
            };
            removals.insert(child, range);
        }
        Ok(removals)
    }

    fn splice_appended(
        &self,
        node: NodeRef,
        data: &'a Node,
        map: &ModificationMap,
        appended: &[&'a Modification],
        out: &mut Vec<Splice<'a>>,
    ) -> RewriteResult<()> {
        let ast = self.ast(node)?;
        let source = ast.source();
        let location = self.location(node)?;
        let nl = self.config.newline.as_str();

        // Appends that start a list the container does not have yet.
        let mut into_empty = Vec::new();
        for &append in appended {
            let text = self.render_new(append, Some(&data.kind))?.unwrap_or_default();
            let style = self.appended_style(data, append)?;
            let Some(last) = self.last_sibling(data, map, style)? else {
                into_empty.push((append, style, text));
                continue;
            };
            let last_location = self.location(last)?;
            let point = self
                .comments
                .map_or(last_location.end(), |c| c.extended_range(last, last_location).1);
            let indent = ast.indentation_at(last_location.offset);
            let text = match style {
                ListStyle::Lines => format!("{}{}{}", nl, indent, self.reindent(append, &text, indent)),
                other => format!("{}{}", other.separator(), text),
            };
            trace!(?node, offset = point, "append child");
            out.push(Splice {
                offset: point,
                length: 0,
                text,
                modification: append,
            });
        }
        if into_empty.is_empty() {
            return Ok(());
        }

        // The new list goes right before the closing delimiter, replacing
        // the whitespace in front of it.
        let delimiter = data.kind.closing_delimiter().and_then(|d| {
            source[location.range()]
                .rfind(d)
                .map(|i| location.offset + i)
        });
        let (mut start, end) = match delimiter {
            Some(at) => {
                let trimmed = source[location.offset..at].trim_end().len();
                (location.offset + trimmed, at)
            }
            None => (location.end(), location.end()),
        };
        // A removed last child may already have taken that whitespace.
        let floor = out.iter().map(|s| s.offset + s.length).max().unwrap_or(0);
        let mut on_new_line = false;
        if floor > start {
            start = floor.min(end);
            on_new_line = source[..start].ends_with('\n');
        }
        let base_indent = ast.indentation_at(location.offset);
        let child_indent = format!("{}{}", base_indent, self.config.indent_unit);

        let count = into_empty.len();
        for (i, (append, style, text)) in into_empty.into_iter().enumerate() {
            let mut text = match style {
                ListStyle::Lines if delimiter.is_some() => {
                    let lead = if i == 0 && on_new_line { "" } else { nl };
                    format!("{}{}{}", lead, child_indent, self.reindent(append, &text, &child_indent))
                }
                ListStyle::Lines if i == 0 && location.length == 0 => text,
                ListStyle::Lines => format!("{}{}", nl, text),
                _ if i == 0 => format!("{}{}", self.list_opener(data, append, style)?, text),
                other => format!("{}{}", other.separator(), text),
            };
            if i + 1 == count && delimiter.is_some() && style == ListStyle::Lines {
                text.push_str(nl);
                text.push_str(base_indent);
            }
            let (offset, length) = if i == 0 { (start, end - start) } else { (end, 0) };
            trace!(?node, offset, "append child");
            out.push(Splice {
                offset,
                length,
                text,
                modification: append,
            });
        }
        Ok(())
    }

    /// Last child of `container` that lives in a list of `style` and stays.
    fn last_sibling(
        &self,
        container: &Node,
        map: &ModificationMap,
        style: ListStyle,
    ) -> RewriteResult<Option<NodeRef>> {
        for &child in container.children.iter().rev() {
            if vanishes(map, child) {
                continue;
            }
            if container.kind.list_style_for(&self.node(child)?.kind) == style {
                return Ok(Some(child));
            }
        }
        Ok(None)
    }

    /// Synthetic text is written at column zero; parsed text keeps the
    /// indentation it had in the source.
    fn reindent(&self, modification: &Modification, text: &str, indent: &str) -> String {
        match modification.new_node() {
            Some(node) if node.is_synthetic() => indent_lines(text, indent, &self.config.newline),
            _ => text.to_string(),
        }
    }

    /// Text in front of an appended node that starts a list of `style` the
    /// container never had, after the container's other children.
    fn list_opener(
        &self,
        container: &Node,
        append: &Modification,
        style: ListStyle,
    ) -> RewriteResult<&'static str> {
        let Some(new_node) = append.new_node() else {
            return Ok("");
        };
        if container.children.is_empty() {
            return Ok("");
        }
        for &child in &container.children {
            if container.kind.list_style_for(&self.node(child)?.kind) == style {
                return Ok("");
            }
        }
        Ok(container.kind.list_opener(&self.node(new_node)?.kind))
    }

    fn appended_style(&self, container: &Node, append: &Modification) -> RewriteResult<ListStyle> {
        let kind = match append.new_node() {
            Some(new_node) => &self.node(new_node)?.kind,
            None => &container.kind,
        };
        Ok(container.kind.list_style_for(kind))
    }

    /// Range to delete when a node spanning `start..end` (comments
    /// included) is removed from a list that is not comma separated. A node
    /// alone on its line takes the whole line.
    fn removal_range(&self, ast: &Ast, start: usize, end: usize, style: ListStyle) -> (usize, usize) {
        if style != ListStyle::Lines {
            return (start, end);
        }
        let bytes = ast.source().as_bytes();
        let is_blank = |b: u8| b == b' ' || b == b'\t';

        let mut after = end;
        while after < bytes.len() && is_blank(bytes[after]) {
            after += 1;
        }
        let mut before = start;
        while before > 0 && is_blank(bytes[before - 1]) {
            before -= 1;
        }
        let line_start = before == 0 || bytes[before - 1] == b'\n';
        let line_end = after < bytes.len() && bytes[after] == b'\n';
        match (line_start, line_end) {
            (true, true) => (before, after + 1),
            (false, true) => (start, after),
            _ => (start, end),
        }
    }

    fn log_superseded(&self, ast: &Ast, replaced: NodeRef, map: &ModificationMap) {
        for (target, _) in map.iter() {
            if target != replaced
                && !target.is_synthetic()
                && ast.is_descendant_of(target, replaced)
            {
                debug!(?target, ?replaced, "modification superseded by replaced ancestor");
            }
        }
    }
}

/// Document order; insertions go ahead of an edit starting at the same
/// offset.
fn sort_splices(splices: &mut [Splice<'_>]) {
    splices.sort_by_key(|s| (s.offset, s.length > 0));
}

/// Whether `node` is removed without anything taking its place.
fn vanishes(map: &ModificationMap, node: NodeRef) -> bool {
    map.replacement(node).is_some_and(|r| r.new_node().is_none())
        && map.inserts_before(node).all(|m| m.new_node().is_none())
}

fn join(items: impl IntoIterator<Item = String>, separator: &str) -> String {
    items.into_iter().collect::<Vec<_>>().join(separator)
}

fn join_non_empty(items: impl IntoIterator<Item = String>, separator: &str) -> String {
    join(items.into_iter().filter(|s| !s.is_empty()), separator)
}

/// Indents every line of `text` but the first.
fn indent_lines(text: &str, indent: &str, newline: &str) -> String {
    if indent.is_empty() || !text.contains(newline) {
        return text.to_string();
    }
    text.split(newline)
        .collect::<Vec<_>>()
        .join(&format!("{}{}", newline, indent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BasicType, CvQualifiers};

    #[test]
    fn test_literal_renders_verbatim() {
        let mut factory = NodeFactory::new();
        let lit = factory.literal("#pragma once");
        assert_eq!(render_synthetic(&factory, lit).unwrap(), "#pragma once");
    }

    #[test]
    fn test_compound_statement_indents_children() {
        let mut factory = NodeFactory::new();
        let inner_stmt = factory.literal("x++;");
        let inner = factory.add(NodeKind::CompoundStatement, vec![inner_stmt]);
        let first = factory.literal("int x = 0;");
        let block = factory.add(NodeKind::CompoundStatement, vec![first, inner]);
        assert_eq!(
            render_synthetic(&factory, block).unwrap(),
            "{\n    int x = 0;\n    {\n        x++;\n    }\n}"
        );
    }

    #[test]
    fn test_simple_declaration_with_several_declarators() {
        let mut factory = NodeFactory::new();
        let spec = factory.simple_decl_spec(BasicType::INT, CvQualifiers::CONST);
        let a = factory.name("a");
        let first = factory.add(NodeKind::Declarator, vec![a]);
        let op = factory.pointer_operator(PointerOp::Pointer(CvQualifiers::NONE), None);
        let b = factory.name("b");
        let second = factory.add(NodeKind::Declarator, vec![op, b]);
        let decl = factory.add(NodeKind::SimpleDeclaration, vec![spec, first, second]);
        assert_eq!(render_synthetic(&factory, decl).unwrap(), "const int a, *b;");
    }

    #[test]
    fn test_render_modification_applies_its_nested_edits() {
        let mut b = crate::ast::TreeBuilder::new("a.c", "int a;\n");
        b.start_node(NodeKind::TranslationUnit, 0..7);
        let target = b.leaf(NodeKind::SimpleDeclaration, 0..6);
        b.finish_node();
        let ast = b.finish().unwrap();

        let mut factory = NodeFactory::new();
        let spec = factory.simple_decl_spec(BasicType::INT, CvQualifiers::NONE);
        let name = factory.name("b");
        let declarator = factory.add(NodeKind::Declarator, vec![name]);
        let decl = factory.add(NodeKind::SimpleDeclaration, vec![spec, declarator]);
        let renamed = factory.name("renamed");

        let group = crate::modification::EditGroup::new("g");
        let replace = Modification::replace(target, Some(decl), group.clone());
        let removal = Modification::replace(target, None, group.clone());
        let mut store = ModificationStore::new();
        store.store_modification(None, replace.clone());
        store.store_modification(Some(&replace), Modification::replace(name, Some(renamed), group));

        let comments = CommentMap::new();
        let config = RewriteConfig::default();
        let writer = NodeWriter::new(&ast, &factory, &store, &comments, &config);
        assert_eq!(
            writer.render_modification(&replace).unwrap().as_deref(),
            Some("int renamed;")
        );
        assert_eq!(writer.render_modification(&removal).unwrap(), None);
    }

    #[test]
    fn test_indent_lines() {
        assert_eq!(indent_lines("a\nb", "  ", "\n"), "a\n  b");
        assert_eq!(indent_lines("a", "  ", "\n"), "a");
    }
}
