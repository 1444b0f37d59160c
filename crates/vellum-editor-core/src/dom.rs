//! Seams between the reconciler and the platform.
//!
//! The reconciler never touches `web-sys` directly. Everything it needs
//! from the live DOM goes through [`DomBridge`], and deferred continuations
//! go through [`Scheduler`]. The browser crate implements both; core tests
//! drive a mock DOM and a manual task queue.

use crate::types::Key;

/// DOM-side operations the flush algorithm depends on.
///
/// `Element` and `TextNode` are opaque handles; equality must mean
/// same-node identity, because the flush compares the container resolved at
/// flush time against the one captured at composition start.
pub trait DomBridge {
    type Element: Clone + PartialEq + std::fmt::Debug;
    type TextNode: Clone + PartialEq + std::fmt::Debug;

    /// Text node and character offset of the native selection anchor.
    fn native_anchor(&self) -> Option<(Self::TextNode, usize)>;

    /// Closest ancestor element hosting a logical node.
    fn host_element(&self, node: &Self::TextNode) -> Option<Self::Element>;

    /// The host element currently rendering the node with the given key.
    fn element_for_key(&self, key: &Key) -> Option<Self::Element>;

    /// Logical node key the element maps to.
    fn key_of(&self, element: &Self::Element) -> Option<Key>;

    /// Whether the text node is still attached to the document.
    fn is_attached(&self, node: &Self::TextNode) -> bool;

    /// Strip composition debris from the text runs inside the container:
    /// injected line-break markers, zero-width placeholder characters, and
    /// the placeholder-tracking hints on runs that are no longer empty.
    fn normalize_runs(&self, container: &Self::Element);

    /// Full text content of the container with zero-width characters
    /// removed.
    fn cleaned_text(&self, container: &Self::Element) -> String;

    /// Map a native text node and character offset to a logical node and
    /// offset. Returns `None` when the offset lies beyond the node's
    /// content.
    fn point_at(&self, node: &Self::TextNode, offset: usize) -> Option<(Key, usize)>;

    /// Collapse the native selection onto the given node and offset.
    fn collapse_native(&self, node: &Self::TextNode, offset: usize);

    /// The window's current active element.
    fn active_element(&self) -> Option<Self::Element>;
}

/// Classification of a blur event's related target, computed by the
/// browser layer before the reconciler decides whether the blur is real.
#[derive(Clone, Debug, PartialEq)]
pub enum RelatedTarget<E> {
    /// The event carried no related target.
    None,
    /// The editor's own zero-width spacer for a void node.
    VoidSpacer,
    /// An editable element nested inside the editor.
    NestedEditable(E),
    /// Any other element, inside or outside the editor.
    Other(E),
}

/// Deferred continuation scheduling.
///
/// The browser implementation uses `requestAnimationFrame`. Tasks are
/// fire-and-forget; staleness is detected by the caller via generation
/// counters, not by cancellation.
pub trait Scheduler {
    fn defer(&self, task: Box<dyn FnOnce()>);
}

#[cfg(test)]
pub(crate) mod mock {
    //! Test doubles: an owned fake DOM and a manually-pumped scheduler.

    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::rc::Rc;

    use super::{DomBridge, Scheduler};
    use crate::text::{strip_zero_width, visible_char_count};
    use crate::types::Key;

    /// A text run inside a mock container, with the composition debris the
    /// real browser can leave behind.
    pub struct MockRun {
        pub text: String,
        pub line_breaks: usize,
        pub zero_width_hint: bool,
    }

    impl MockRun {
        pub fn text(text: impl Into<String>) -> Self {
            Self {
                text: text.into(),
                line_breaks: 0,
                zero_width_hint: false,
            }
        }

        pub fn placeholder(text: impl Into<String>) -> Self {
            Self {
                text: text.into(),
                line_breaks: 0,
                zero_width_hint: true,
            }
        }
    }

    pub struct MockContainer {
        pub key: Key,
        pub runs: Vec<MockRun>,
    }

    /// Fake DOM where both element and text-node handles are container
    /// indices (each container renders a single merged text node).
    /// Offsets are character offsets; the UTF-16 conversion the browser
    /// layer performs is out of scope here.
    #[derive(Default)]
    pub struct MockDom {
        containers: RefCell<Vec<MockContainer>>,
        anchor: RefCell<Option<(usize, usize)>>,
        detached: RefCell<HashSet<usize>>,
        active: RefCell<Option<usize>>,
        collapsed_to: RefCell<Option<(usize, usize)>>,
    }

    impl MockDom {
        pub fn new() -> Self {
            Self::default()
        }

        /// Add a container; returns its element handle.
        pub fn add_container(&self, key: impl Into<Key>, runs: Vec<MockRun>) -> usize {
            let mut containers = self.containers.borrow_mut();
            containers.push(MockContainer {
                key: key.into(),
                runs,
            });
            containers.len() - 1
        }

        /// Point the native selection anchor into a container's text node.
        pub fn set_anchor(&self, container: usize, offset: usize) {
            *self.anchor.borrow_mut() = Some((container, offset));
        }

        /// Replace the runs of a container, simulating an out-of-band
        /// browser mutation.
        pub fn mutate(&self, container: usize, runs: Vec<MockRun>) {
            self.containers.borrow_mut()[container].runs = runs;
        }

        pub fn detach(&self, container: usize) {
            self.detached.borrow_mut().insert(container);
        }

        /// Re-key a container, simulating a DOM/model desync.
        pub fn rekey(&self, container: usize, key: impl Into<Key>) {
            self.containers.borrow_mut()[container].key = key.into();
        }

        pub fn set_active(&self, element: Option<usize>) {
            *self.active.borrow_mut() = element;
        }

        /// Where `collapse_native` last put the caret.
        pub fn collapsed_to(&self) -> Option<(usize, usize)> {
            *self.collapsed_to.borrow()
        }

        pub fn run(&self, container: usize, idx: usize) -> (String, usize, bool) {
            let containers = self.containers.borrow();
            let run = &containers[container].runs[idx];
            (run.text.clone(), run.line_breaks, run.zero_width_hint)
        }
    }

    impl DomBridge for MockDom {
        type Element = usize;
        type TextNode = usize;

        fn native_anchor(&self) -> Option<(usize, usize)> {
            *self.anchor.borrow()
        }

        fn host_element(&self, node: &usize) -> Option<usize> {
            let containers = self.containers.borrow();
            (*node < containers.len()).then_some(*node)
        }

        fn element_for_key(&self, key: &Key) -> Option<usize> {
            self.containers
                .borrow()
                .iter()
                .position(|c| &c.key == key)
        }

        fn key_of(&self, element: &usize) -> Option<Key> {
            self.containers
                .borrow()
                .get(*element)
                .map(|c| c.key.clone())
        }

        fn is_attached(&self, node: &usize) -> bool {
            !self.detached.borrow().contains(node)
        }

        fn normalize_runs(&self, container: &usize) {
            let mut containers = self.containers.borrow_mut();
            for run in &mut containers[*container].runs {
                run.line_breaks = 0;
                run.text = strip_zero_width(&run.text).into_owned();
                run.zero_width_hint = false;
            }
        }

        fn cleaned_text(&self, container: &usize) -> String {
            self.containers.borrow()[*container]
                .runs
                .iter()
                .map(|r| strip_zero_width(&r.text).into_owned())
                .collect()
        }

        fn point_at(&self, node: &usize, offset: usize) -> Option<(Key, usize)> {
            if !self.is_attached(node) {
                return None;
            }
            let containers = self.containers.borrow();
            let container = containers.get(*node)?;
            let len: usize = container
                .runs
                .iter()
                .map(|r| visible_char_count(&r.text))
                .sum();
            (offset <= len).then(|| (container.key.clone(), offset))
        }

        fn collapse_native(&self, node: &usize, offset: usize) {
            *self.collapsed_to.borrow_mut() = Some((*node, offset));
        }

        fn active_element(&self) -> Option<usize> {
            *self.active.borrow()
        }
    }

    /// Scheduler that queues tasks until the test pumps them.
    #[derive(Clone, Default)]
    pub struct ManualScheduler {
        queue: Rc<RefCell<Vec<Box<dyn FnOnce()>>>>,
    }

    impl ManualScheduler {
        pub fn new() -> Self {
            Self::default()
        }

        /// Run everything queued so far, like a frame firing.
        pub fn run_all(&self) {
            let tasks: Vec<_> = self.queue.borrow_mut().drain(..).collect();
            for task in tasks {
                task();
            }
        }

        pub fn pending(&self) -> usize {
            self.queue.borrow().len()
        }
    }

    impl Scheduler for ManualScheduler {
        fn defer(&self, task: Box<dyn FnOnce()>) {
            self.queue.borrow_mut().push(task);
        }
    }
}
