//! Logical document positions: keys, paths, points, and ranges.
//!
//! These identify locations in the editor's own document tree, distinct
//! from positions in the live DOM. A `Point` must stay resolvable to a DOM
//! node through the browser layer's lookups for reconciliation to work.

use std::fmt;

use smol_str::SmolStr;

/// Stable unique identifier of a logical node.
///
/// Keys survive re-renders; paths do not. The reconciler cross-checks both
/// when merging native mutations.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Key(SmolStr);

impl Key {
    /// Create a key from any string-like value.
    pub fn new(id: impl Into<SmolStr>) -> Self {
        Key(id.into())
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::new(s)
    }
}

/// Ordered sequence of child indices from the document root to a node.
#[derive(Clone, Debug, PartialEq, Eq, Default, Hash)]
pub struct Path(Vec<usize>);

impl Path {
    /// Create a path from its indices.
    pub fn new(indices: impl Into<Vec<usize>>) -> Self {
        Path(indices.into())
    }

    /// The indices, root first.
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Path depth.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the root path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<usize>> for Path {
    fn from(indices: Vec<usize>) -> Self {
        Path(indices)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for idx in &self.0 {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{idx}")?;
            first = false;
        }
        Ok(())
    }
}

/// A position inside the logical text model.
///
/// Offsets count characters, not bytes and not UTF-16 code units. The
/// browser layer converts native UTF-16 offsets before building a `Point`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Point {
    /// Path from the root to the node.
    pub path: Path,
    /// Stable key of the node.
    pub key: Key,
    /// Character offset within the node's text.
    pub offset: usize,
}

impl Point {
    /// Create a point.
    pub fn new(path: Path, key: Key, offset: usize) -> Self {
        Self { path, key, offset }
    }
}

/// A range between two logical points.
///
/// The anchor is where the selection started, the focus where it is now;
/// they may be in either document order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditRange {
    /// Where the selection started.
    pub anchor: Point,
    /// Where the selection is now.
    pub focus: Point,
}

impl EditRange {
    /// Create a range.
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    /// Create a collapsed range (caret) at the given point.
    pub fn collapsed(point: Point) -> Self {
        Self {
            anchor: point.clone(),
            focus: point,
        }
    }

    /// Whether anchor and focus coincide.
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapsed_range() {
        let p = Point::new(Path::new([0]), Key::new("a"), 3);
        let range = EditRange::collapsed(p.clone());
        assert!(range.is_collapsed());
        assert_eq!(range.anchor, p);
        assert_eq!(range.focus, p);
    }

    #[test]
    fn test_non_collapsed_range() {
        let a = Point::new(Path::new([0]), Key::new("a"), 0);
        let f = Point::new(Path::new([0]), Key::new("a"), 5);
        let range = EditRange::new(a, f);
        assert!(!range.is_collapsed());
    }

    #[test]
    fn test_path_display() {
        assert_eq!(Path::new([0, 2, 1]).to_string(), "0.2.1");
        assert_eq!(Path::default().to_string(), "");
    }

    #[test]
    fn test_key_equality() {
        assert_eq!(Key::new("n0"), Key::from("n0"));
        assert_ne!(Key::new("n0"), Key::new("n1"));
    }
}
