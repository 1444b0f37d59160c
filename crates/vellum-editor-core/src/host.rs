//! Host editor contract and a reference in-memory implementation.
//!
//! The reconciler does not own the document; the surrounding editor
//! runtime does. `HostEditor` is the slice of that runtime the reconciler
//! needs: selection queries, key/path lookups, and the text mutations that
//! merge a flushed native operation back into the model.

use std::ops::Range;

use crate::types::{EditRange, Key, Path, Point};

/// The document and selection surface a host editor must provide.
///
/// Offsets are character offsets. A `None` selection means the editor is
/// blurred; events that need an addressable selection are ignored in that
/// state rather than treated as errors.
pub trait HostEditor {
    /// Whether the surface rejects edits.
    fn is_read_only(&self) -> bool;

    /// Current logical selection, or `None` when blurred.
    fn selection(&self) -> Option<EditRange>;

    /// Whether the given node is void (non-text, non-editable content).
    fn is_void(&self, key: &Key) -> bool;

    /// Resolve a node's current path from its key.
    fn path_of(&self, key: &Key) -> Option<Path>;

    /// Text content of the node with the given key.
    fn text_of(&self, key: &Key) -> Option<String>;

    /// Replace a character range of the node's text.
    ///
    /// `path` and `key` must refer to the same node; the flush passes the
    /// snapshot pair so the host can detect staleness on its side too.
    fn replace_text(&mut self, path: &Path, key: &Key, range: Range<usize>, text: &str);

    /// Move the logical selection.
    fn set_selection(&mut self, range: EditRange);

    /// Delete the currently selected content and collapse the selection.
    fn delete_selection(&mut self);
}

/// A node in the reference document: a keyed text run or a void block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Text { key: Key, text: String },
    Void { key: Key },
}

impl Node {
    fn key(&self) -> &Key {
        match self {
            Node::Text { key, .. } | Node::Void { key } => key,
        }
    }
}

/// Minimal in-memory document implementing [`HostEditor`].
///
/// One root with a flat list of keyed children, enough to host the
/// reconciler in tests and small embedders. Paths are single-index.
#[derive(Clone, Debug, Default)]
pub struct BlockEditor {
    children: Vec<Node>,
    selection: Option<EditRange>,
    read_only: bool,
}

impl BlockEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text node.
    pub fn push_text(&mut self, key: impl Into<Key>, text: impl Into<String>) {
        self.children.push(Node::Text {
            key: key.into(),
            text: text.into(),
        });
    }

    /// Append a void node.
    pub fn push_void(&mut self, key: impl Into<Key>) {
        self.children.push(Node::Void { key: key.into() });
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Place a collapsed selection at `(key, offset)`.
    pub fn focus_at(&mut self, key: impl Into<Key>, offset: usize) {
        let key = key.into();
        if let Some(path) = self.path_of(&key) {
            self.selection = Some(EditRange::collapsed(Point::new(path, key, offset)));
        }
    }

    /// Select from `(key, anchor)` to `(key, focus)` within one node.
    pub fn select(&mut self, key: impl Into<Key>, anchor: usize, focus: usize) {
        let key = key.into();
        if let Some(path) = self.path_of(&key) {
            self.selection = Some(EditRange::new(
                Point::new(path.clone(), key.clone(), anchor),
                Point::new(path, key, focus),
            ));
        }
    }

    /// Drop the selection, putting the editor in the blurred state.
    pub fn blur(&mut self) {
        self.selection = None;
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    fn index_of(&self, key: &Key) -> Option<usize> {
        self.children.iter().position(|n| n.key() == key)
    }
}

impl HostEditor for BlockEditor {
    fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn selection(&self) -> Option<EditRange> {
        self.selection.clone()
    }

    fn is_void(&self, key: &Key) -> bool {
        matches!(
            self.children.get(self.index_of(key).unwrap_or(usize::MAX)),
            Some(Node::Void { .. })
        )
    }

    fn path_of(&self, key: &Key) -> Option<Path> {
        self.index_of(key).map(|i| Path::new([i]))
    }

    fn text_of(&self, key: &Key) -> Option<String> {
        match self.children.get(self.index_of(key)?) {
            Some(Node::Text { text, .. }) => Some(text.clone()),
            _ => None,
        }
    }

    fn replace_text(&mut self, path: &Path, key: &Key, range: Range<usize>, replacement: &str) {
        let Some(idx) = self.index_of(key) else {
            tracing::warn!(%key, "replace_text: unknown key");
            return;
        };
        if path.indices() != [idx] {
            tracing::warn!(%key, %path, idx, "replace_text: stale path for key");
        }
        if let Some(Node::Text { text, .. }) = self.children.get_mut(idx) {
            let start = char_to_byte(text, range.start);
            let end = char_to_byte(text, range.end);
            text.replace_range(start..end, replacement);
        }
    }

    fn set_selection(&mut self, range: EditRange) {
        self.selection = Some(range);
    }

    fn delete_selection(&mut self) {
        let Some(sel) = self.selection.clone() else {
            return;
        };
        if sel.is_collapsed() {
            return;
        }
        if sel.anchor.key == sel.focus.key {
            let (start, end) = if sel.anchor.offset <= sel.focus.offset {
                (sel.anchor.offset, sel.focus.offset)
            } else {
                (sel.focus.offset, sel.anchor.offset)
            };
            let key = sel.anchor.key.clone();
            if let Some(path) = self.path_of(&key) {
                self.replace_text(&path, &key, start..end, "");
                self.selection = Some(EditRange::collapsed(Point::new(path, key, start)));
            }
            return;
        }

        // Cross-node selection: trim the edge nodes, drop everything between.
        let (first, last) = {
            let a = self.index_of(&sel.anchor.key);
            let f = self.index_of(&sel.focus.key);
            let (Some(a), Some(f)) = (a, f) else { return };
            if a <= f {
                ((a, sel.anchor.offset), (f, sel.focus.offset))
            } else {
                ((f, sel.focus.offset), (a, sel.anchor.offset))
            }
        };
        if let Some(Node::Text { text, .. }) = self.children.get_mut(last.0) {
            let end = char_to_byte(text, last.1);
            text.replace_range(..end, "");
        }
        if let Some(Node::Text { text, .. }) = self.children.get_mut(first.0) {
            let start = char_to_byte(text, first.1);
            text.replace_range(start.., "");
        }
        self.children.drain(first.0 + 1..last.0);
        let key = self.children[first.0].key().clone();
        self.selection = Some(EditRange::collapsed(Point::new(
            Path::new([first.0]),
            key,
            first.1,
        )));
    }
}

fn char_to_byte(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(b, _)| b)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> BlockEditor {
        let mut ed = BlockEditor::new();
        ed.push_text("a", "hello");
        ed.push_void("v");
        ed.push_text("b", "world");
        ed
    }

    #[test]
    fn test_lookups() {
        let ed = doc();
        assert_eq!(ed.path_of(&Key::new("b")), Some(Path::new([2])));
        assert_eq!(ed.text_of(&Key::new("a")).as_deref(), Some("hello"));
        assert!(ed.is_void(&Key::new("v")));
        assert!(!ed.is_void(&Key::new("a")));
        assert_eq!(ed.path_of(&Key::new("missing")), None);
    }

    #[test]
    fn test_replace_text_char_offsets() {
        let mut ed = BlockEditor::new();
        ed.push_text("a", "héllo");
        let path = ed.path_of(&Key::new("a")).unwrap();
        ed.replace_text(&path, &Key::new("a"), 1..2, "e");
        assert_eq!(ed.text_of(&Key::new("a")).as_deref(), Some("hello"));
    }

    #[test]
    fn test_delete_selection_same_node() {
        let mut ed = doc();
        ed.select("a", 1, 4);
        ed.delete_selection();
        assert_eq!(ed.text_of(&Key::new("a")).as_deref(), Some("ho"));
        let sel = ed.selection().unwrap();
        assert!(sel.is_collapsed());
        assert_eq!(sel.anchor.offset, 1);
    }

    #[test]
    fn test_delete_selection_backward_range() {
        let mut ed = doc();
        ed.select("a", 4, 1);
        ed.delete_selection();
        assert_eq!(ed.text_of(&Key::new("a")).as_deref(), Some("ho"));
        assert_eq!(ed.selection().unwrap().anchor.offset, 1);
    }

    #[test]
    fn test_delete_selection_cross_node() {
        let mut ed = doc();
        let a_path = ed.path_of(&Key::new("a")).unwrap();
        let b_path = ed.path_of(&Key::new("b")).unwrap();
        ed.set_selection(EditRange::new(
            Point::new(a_path, Key::new("a"), 3),
            Point::new(b_path, Key::new("b"), 2),
        ));
        ed.delete_selection();
        assert_eq!(ed.text_of(&Key::new("a")).as_deref(), Some("hel"));
        assert_eq!(ed.text_of(&Key::new("b")).as_deref(), Some("rld"));
        // Void node between the edges is gone.
        assert_eq!(ed.children().len(), 2);
        let sel = ed.selection().unwrap();
        assert!(sel.is_collapsed());
        assert_eq!(sel.anchor.key, Key::new("a"));
        assert_eq!(sel.anchor.offset, 3);
    }

    #[test]
    fn test_blurred_selection() {
        let mut ed = doc();
        ed.focus_at("a", 2);
        assert!(ed.selection().is_some());
        ed.blur();
        assert!(ed.selection().is_none());
        // Deleting with no selection is a no-op.
        ed.delete_selection();
        assert_eq!(ed.text_of(&Key::new("a")).as_deref(), Some("hello"));
    }
}
