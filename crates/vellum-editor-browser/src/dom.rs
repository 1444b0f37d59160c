//! Live-DOM implementation of the reconciliation bridge.
//!
//! Handles the DOM side of a flush: reading the native selection, walking
//! up to the element hosting a logical node, stripping composition debris
//! from text runs, and collapsing the native selection after the logical
//! model has been updated.

use wasm_bindgen::JsCast;
use vellum_editor_core::text::{strip_zero_width, visible_char_count};
use vellum_editor_core::{DomBridge, Key};

use crate::{KEY_ATTR, LENGTH_ATTR, STRING_ATTR, ZERO_WIDTH_ATTR};

const SHOW_TEXT: u32 = 0x04;

/// Browser-based DOM bridge.
///
/// Holds the editor root element id; every lookup goes through the live
/// document so handles never go stale across re-renders.
pub struct BrowserDom {
    root_id: String,
}

impl BrowserDom {
    /// Create a bridge for the editor element with the given id.
    pub fn new(root_id: impl Into<String>) -> Self {
        Self {
            root_id: root_id.into(),
        }
    }

    /// Get the editor root element id.
    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    /// The editor root element, if currently in the document.
    pub fn root(&self) -> Option<web_sys::Element> {
        web_sys::window()?.document()?.get_element_by_id(&self.root_id)
    }

    fn document(&self) -> Option<web_sys::Document> {
        web_sys::window()?.document()
    }
}

impl DomBridge for BrowserDom {
    type Element = web_sys::Element;
    type TextNode = web_sys::Node;

    fn native_anchor(&self) -> Option<(web_sys::Node, usize)> {
        let window = web_sys::window()?;
        let selection = window.get_selection().ok()??;
        let node = selection.anchor_node()?;
        if node.node_type() != web_sys::Node::TEXT_NODE {
            tracing::trace!(
                node_name = %node.node_name(),
                "native anchor is not a text node"
            );
            return None;
        }
        // Browser offsets are UTF-16 code units; the bridge trades in
        // character offsets.
        let text = node.text_content().unwrap_or_default();
        let offset = utf16_to_char_offset(&text, selection.anchor_offset() as usize);
        Some((node, offset))
    }

    fn host_element(&self, node: &web_sys::Node) -> Option<web_sys::Element> {
        let root = self.root()?;
        let mut current = node.clone();
        loop {
            if let Some(element) = current.dyn_ref::<web_sys::Element>() {
                if element.has_attribute(KEY_ATTR) {
                    return Some(element.clone());
                }
                if element == &root {
                    return None;
                }
            }
            current = current.parent_node()?;
        }
    }

    fn element_for_key(&self, key: &Key) -> Option<web_sys::Element> {
        let selector = format!("[{}='{}']", KEY_ATTR, key);
        self.document()?.query_selector(&selector).ok().flatten()
    }

    fn key_of(&self, element: &web_sys::Element) -> Option<Key> {
        element.get_attribute(KEY_ATTR).map(Key::new)
    }

    fn is_attached(&self, node: &web_sys::Node) -> bool {
        node.parent_node().is_some()
    }

    fn normalize_runs(&self, container: &web_sys::Element) {
        let selector = format!("[{STRING_ATTR}], [{ZERO_WIDTH_ATTR}]");
        let Ok(runs) = container.query_selector_all(&selector) else {
            return;
        };
        for i in 0..runs.length() {
            let Some(node) = runs.get(i) else { continue };
            let Some(run) = node.dyn_ref::<web_sys::Element>() else {
                continue;
            };
            normalize_run(run);
        }
    }

    fn cleaned_text(&self, container: &web_sys::Element) -> String {
        let node: &web_sys::Node = container.as_ref();
        strip_zero_width(&node.text_content().unwrap_or_default()).into_owned()
    }

    fn point_at(&self, node: &web_sys::Node, offset: usize) -> Option<(Key, usize)> {
        if node.parent_node().is_none() {
            return None;
        }
        let host = self.host_element(node)?;
        let key = self.key_of(&host)?;

        // Characters of earlier sibling runs inside the host.
        let document = self.document()?;
        let walker = document
            .create_tree_walker_with_what_to_show(&host, SHOW_TEXT)
            .ok()?;
        let mut preceding = 0usize;
        let mut found = false;
        while let Ok(Some(text_node)) = walker.next_node() {
            if &text_node == node {
                found = true;
                break;
            }
            preceding += visible_char_count(&text_node.text_content().unwrap_or_default());
        }
        if !found {
            tracing::warn!(key = %key, "text node not reachable inside its host element");
            return None;
        }

        let node_text = node.text_content().unwrap_or_default();
        if offset > node_text.chars().count() {
            return None;
        }
        Some((key, preceding + offset))
    }

    fn collapse_native(&self, node: &web_sys::Node, offset: usize) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };
        let text = node.text_content().unwrap_or_default();
        let utf16 = char_to_utf16_offset(&text, offset);

        let range = match document.create_range() {
            Ok(range) => range,
            Err(e) => {
                tracing::warn!(?e, "create_range failed");
                return;
            }
        };
        if let Err(e) = range.set_start(node, utf16 as u32) {
            tracing::warn!(?e, offset, "set_start failed collapsing native selection");
            return;
        }
        range.collapse_with_to_start(true);

        let selection = match window.get_selection() {
            Ok(Some(selection)) => selection,
            _ => return,
        };
        if let Err(e) = selection.remove_all_ranges() {
            tracing::warn!(?e, "remove_all_ranges failed");
            return;
        }
        if let Err(e) = selection.add_range(&range) {
            tracing::warn!(?e, "add_range failed");
        }
    }

    fn active_element(&self) -> Option<web_sys::Element> {
        self.document()?.active_element()
    }
}

/// Strip composition debris from one text run.
///
/// Removes injected `<br>` markers and zero-width characters, then clears
/// the placeholder-tracking hints: after real text has been typed into it,
/// the run is no longer a placeholder.
fn normalize_run(run: &web_sys::Element) {
    if let Ok(breaks) = run.query_selector_all("br") {
        for i in 0..breaks.length() {
            if let Some(br) = breaks.get(i) {
                if let Some(parent) = br.parent_node() {
                    let _ = parent.remove_child(&br);
                }
            }
        }
    }

    let run_node: &web_sys::Node = run.as_ref();
    let text = run_node.text_content().unwrap_or_default();
    let cleaned = strip_zero_width(&text);
    if cleaned != text {
        let children = run_node.child_nodes();
        if children.length() == 1 {
            // Rewrite the lone child's data directly instead of replacing
            // the node's content, which would leave a spurious empty child.
            if let Some(child) = children.get(0) {
                child.set_text_content(Some(cleaned.as_ref()));
            }
        } else {
            run_node.set_text_content(Some(cleaned.as_ref()));
        }
    }

    let _ = run.remove_attribute(ZERO_WIDTH_ATTR);
    let _ = run.remove_attribute(LENGTH_ATTR);
}

/// Convert a UTF-16 code-unit offset to a character offset, clamped to
/// the end of the text.
pub(crate) fn utf16_to_char_offset(text: &str, utf16_offset: usize) -> usize {
    let mut units = 0usize;
    for (chars, c) in text.chars().enumerate() {
        if units >= utf16_offset {
            return chars;
        }
        units += c.len_utf16();
    }
    text.chars().count()
}

/// Convert a character offset back to UTF-16 code units, clamped.
pub(crate) fn char_to_utf16_offset(text: &str, char_offset: usize) -> usize {
    text.chars().take(char_offset).map(char::len_utf16).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf16_char_offset_roundtrip() {
        let text = "a𝄞b";
        assert_eq!(utf16_to_char_offset(text, 0), 0);
        assert_eq!(utf16_to_char_offset(text, 1), 1);
        assert_eq!(utf16_to_char_offset(text, 3), 2);
        assert_eq!(utf16_to_char_offset(text, 4), 3);
        assert_eq!(char_to_utf16_offset(text, 2), 3);
        assert_eq!(char_to_utf16_offset(text, 3), 4);
    }

    #[test]
    fn test_offset_clamping() {
        assert_eq!(utf16_to_char_offset("ab", 10), 2);
        assert_eq!(char_to_utf16_offset("ab", 10), 2);
    }
}
