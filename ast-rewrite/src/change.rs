//! Text-level output of a rewrite.
//!
//! A [`Change`] is a list of byte-range replacements against the original
//! source of one file. Offsets always refer to the original text; applying
//! the change splices every edit in a single pass.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};

use crate::error::{RewriteError, RewriteResult};

/// Replace `length` bytes at `offset` with `text`. A zero length inserts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
    pub offset: usize,
    pub length: usize,
    pub text: String,
}

impl TextEdit {
    pub fn new(offset: usize, length: usize, text: impl Into<String>) -> Self {
        Self {
            offset,
            length,
            text: text.into(),
        }
    }

    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self::new(offset, 0, text)
    }

    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

impl Ord for TextEdit {
    fn cmp(&self, other: &Self) -> Ordering {
        self.offset.cmp(&other.offset)
    }
}

impl PartialOrd for TextEdit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Edits that belong to one named edit group, by index into [`Change::edits`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedEdits {
    pub name: String,
    pub edits: Vec<usize>,
}

/// All edits for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub name: String,
    pub file: PathBuf,
    pub edits: Vec<TextEdit>,
    #[serde(default)]
    pub groups: Vec<GroupedEdits>,
}

impl Change {
    /// Builds a change from edits in emission order, each tagged with the
    /// name of its edit group. Edits at the same offset keep that order.
    pub fn new(name: impl Into<String>, file: impl Into<PathBuf>, entries: Vec<(TextEdit, String)>) -> Self {
        let mut entries = entries;
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let mut edits = Vec::with_capacity(entries.len());
        let mut groups: Vec<GroupedEdits> = Vec::new();
        for (index, (edit, group)) in entries.into_iter().enumerate() {
            match groups.iter_mut().find(|g| g.name == group) {
                Some(existing) => existing.edits.push(index),
                None => groups.push(GroupedEdits {
                    name: group,
                    edits: vec![index],
                }),
            }
            edits.push(edit);
        }

        Self {
            name: name.into(),
            file: file.into(),
            edits,
            groups,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Applies the change to `source`, the text the offsets refer to.
    pub fn apply(&self, source: &str) -> RewriteResult<String> {
        let mut result = String::with_capacity(source.len());
        let mut cursor = 0usize;

        for (i, edit) in self.edits.iter().enumerate() {
            if edit.end() > source.len() {
                return Err(RewriteError::OutOfBounds {
                    offset: edit.offset,
                    end: edit.end(),
                    len: source.len(),
                });
            }
            if let Some(offset) = [edit.offset, edit.end()]
                .into_iter()
                .find(|&o| !source.is_char_boundary(o))
            {
                return Err(RewriteError::SplitCharacter(offset));
            }
            if i > 0 && edit.offset < cursor {
                return Err(RewriteError::OverlappingEdits {
                    first: self.edits[i - 1].offset,
                    second: edit.offset,
                });
            }
            result.push_str(&source[cursor..edit.offset]);
            result.push_str(&edit.text);
            cursor = edit.end();
        }

        result.push_str(&source[cursor..]);
        Ok(result)
    }

    /// Unified diff between `source` and the result of applying the change.
    pub fn preview_diff(&self, source: &str, context_lines: usize) -> RewriteResult<(String, DiffStats)> {
        let modified = self.apply(source)?;
        Ok(generate_unified_diff(&self.file, source, &modified, context_lines))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Statistics about a diff
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DiffStats {
    pub files_changed: usize,
    pub lines_added: usize,
    pub lines_removed: usize,
}

impl DiffStats {
    pub fn add(&mut self, other: &DiffStats) {
        self.files_changed += other.files_changed;
        self.lines_added += other.lines_added;
        self.lines_removed += other.lines_removed;
    }

    pub fn summary(&self) -> String {
        format!(
            "Files changed: {}\nLines added: {}\nLines removed: {}",
            self.files_changed, self.lines_added, self.lines_removed
        )
    }
}

/// Unified diff of `original` against `modified`, headed with `path` on
/// both sides, plus line counts.
pub fn generate_unified_diff(
    path: &Path,
    original: &str,
    modified: &str,
    context_lines: usize,
) -> (String, DiffStats) {
    let diff = TextDiff::from_lines(original, modified);

    let stats = diff
        .iter_all_changes()
        .fold(DiffStats::default(), |mut stats, change| {
            match change.tag() {
                ChangeTag::Insert => stats.lines_added += 1,
                ChangeTag::Delete => stats.lines_removed += 1,
                ChangeTag::Equal => {}
            }
            stats
        });
    let stats = DiffStats {
        files_changed: usize::from(stats.lines_added + stats.lines_removed > 0),
        ..stats
    };

    let path = path.display();
    let output = format!(
        "--- {path}\n+++ {path}\n{}",
        diff.unified_diff().context_radius(context_lines)
    );
    (output, stats)
}

/// Per-file changes of a batch rewrite. Files that failed carry no change.
#[derive(Debug, Default)]
pub struct CompositeChange {
    pub name: String,
    pub changes: Vec<Change>,
    pub failures: Vec<(PathBuf, anyhow::Error)>,
}

impl CompositeChange {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn change_for(&self, file: &Path) -> Option<&Change> {
        self.changes.iter().find(|c| c.file == file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(edits: Vec<TextEdit>) -> Change {
        Change::new(
            "test",
            "test.c",
            edits.into_iter().map(|e| (e, "g".to_string())).collect(),
        )
    }

    #[test]
    fn test_single_replacement() {
        let source = "int f() {\n    return 1;\n}";
        let result = change(vec![TextEdit::new(21, 1, "42")]).apply(source).unwrap();
        assert_eq!(result, "int f() {\n    return 42;\n}");
    }

    #[test]
    fn test_edits_are_sorted_and_stable() {
        let source = "int a;\nint b;";
        let result = change(vec![
            TextEdit::new(11, 1, "y"),
            TextEdit::insert(0, "// one\n"),
            TextEdit::insert(0, "// two\n"),
            TextEdit::new(4, 1, "x"),
        ])
        .apply(source)
        .unwrap();
        assert_eq!(result, "// one\n// two\nint x;\nint y;");
    }

    #[test]
    fn test_overlapping_edits_are_rejected() {
        let source = "int abc;";
        let err = change(vec![TextEdit::new(4, 3, "x"), TextEdit::new(5, 1, "y")])
            .apply(source)
            .unwrap_err();
        assert!(matches!(err, RewriteError::OverlappingEdits { first: 4, second: 5 }));
    }

    #[test]
    fn test_edit_inside_a_character_is_rejected() {
        let err = change(vec![TextEdit::new(1, 1, "x")]).apply("é;").unwrap_err();
        assert!(matches!(err, RewriteError::SplitCharacter(1)));
    }

    #[test]
    fn test_out_of_bounds_edit() {
        let err = change(vec![TextEdit::new(3, 10, "x")]).apply("int").unwrap_err();
        assert!(matches!(err, RewriteError::OutOfBounds { .. }));
    }

    #[test]
    fn test_groups_index_sorted_edits() {
        let c = Change::new(
            "test",
            "test.c",
            vec![
                (TextEdit::insert(9, "b"), "second".to_string()),
                (TextEdit::insert(1, "a"), "first".to_string()),
                (TextEdit::insert(5, "c"), "second".to_string()),
            ],
        );
        let second = c.groups.iter().find(|g| g.name == "second").unwrap();
        assert_eq!(second.edits, vec![1, 2]);
        assert_eq!(c.edits[0].text, "a");
    }

    #[test]
    fn test_preview_diff_counts_lines() {
        let source = "int a;\n";
        let c = change(vec![TextEdit::insert(7, "int b;\n")]);
        let (diff, stats) = c.preview_diff(source, 3).unwrap();
        assert!(diff.contains("+int b;"));
        assert_eq!(stats.lines_added, 1);
        assert_eq!(stats.files_changed, 1);
        assert_eq!(stats.summary(), "Files changed: 1\nLines added: 1\nLines removed: 0");
    }

    #[test]
    fn test_change_serializes() {
        let json = change(vec![TextEdit::insert(0, "x")]).to_json().unwrap();
        let back: Change = serde_json::from_str(&json).unwrap();
        assert_eq!(back.edits, vec![TextEdit::insert(0, "x")]);
    }
}
