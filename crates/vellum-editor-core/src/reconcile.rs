//! Native-event reconciliation.
//!
//! The browser's text-composition engine (IME input, spellcheck
//! corrections, autocomplete) mutates the contenteditable DOM out-of-band.
//! The reconciler owns the per-surface session state, captures a pending
//! native operation at composition start, and flushes it back into the
//! logical document when the composition ends or an input event lands.
//!
//! Handlers return [`EventOutcome`]: `Handled` absorbs the event (prevent
//! default, stop propagation to downstream layers), `Continue` lets the
//! handler chain proceed.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use crate::dom::{DomBridge, RelatedTarget, Scheduler};
use crate::error::ReconcileError;
use crate::host::HostEditor;
use crate::hotkeys::{self, KeyPress};
use crate::types::{EditRange, Point};

/// Whether an event was absorbed or should reach downstream handlers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventOutcome {
    /// Absorbed: prevent default and stop propagation.
    Handled,
    /// Not ours: let the next handler run.
    Continue,
}

/// What the focus handler wants the browser glue to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusResponse {
    Continue,
    /// Focus landed on a nested editable; force it back to the root
    /// editable element (Gecko only).
    RefocusRoot,
}

/// Response to a dragover event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DragOverResponse {
    /// Call preventDefault to signal that drops are allowed here.
    pub prevent_default: bool,
    /// Set the "move" drop-effect hint (first dragover of this drag).
    pub set_move_effect: bool,
}

/// A native mutation captured at composition start, waiting to be merged.
#[derive(Clone, Debug)]
struct PendingMutation<E> {
    /// Collapsed logical selection at composition start.
    at: EditRange,
    /// DOM container under the caret at composition start.
    container: E,
}

/// Transient per-surface session state.
///
/// One instance per editor surface, never ambient: multiple surfaces may
/// coexist in one page.
pub struct SessionState<E> {
    pub is_composing: bool,
    /// Monotonic; lets a deferred finalize detect that a newer composition
    /// superseded it.
    pub composition_count: u64,
    pub is_copying: bool,
    pub is_dragging: bool,
    pub user_action_performed: bool,
    pub last_active_element: Option<E>,
    pending: Option<PendingMutation<E>>,
}

impl<E> Default for SessionState<E> {
    fn default() -> Self {
        Self {
            is_composing: false,
            composition_count: 0,
            is_copying: false,
            is_dragging: false,
            user_action_performed: false,
            last_active_element: None,
            pending: None,
        }
    }
}

/// The native event reconciler for one editor surface.
///
/// Single-threaded by construction; the shared session state is only ever
/// touched from event handlers and frame callbacks on the UI thread.
pub struct Reconciler<B: DomBridge, S: Scheduler> {
    dom: B,
    scheduler: S,
    state: Rc<RefCell<SessionState<B::Element>>>,
}

impl<B, S> Reconciler<B, S>
where
    B: DomBridge,
    B::Element: 'static,
    S: Scheduler,
{
    pub fn new(dom: B, scheduler: S) -> Self {
        Self {
            dom,
            scheduler,
            state: Rc::new(RefCell::new(SessionState::default())),
        }
    }

    /// Read-only view of the session state.
    pub fn session(&self) -> Ref<'_, SessionState<B::Element>> {
        self.state.borrow()
    }

    pub fn is_composing(&self) -> bool {
        self.state.borrow().is_composing
    }

    /// Whether a captured native operation is waiting to be flushed.
    pub fn has_pending(&self) -> bool {
        self.state.borrow().pending.is_some()
    }

    /// Whether any user-initiated action occurred since the flag was last
    /// cleared. Hosts use this to suppress extraneous reflows.
    pub fn user_action_performed(&self) -> bool {
        self.state.borrow().user_action_performed
    }

    /// Clear the user-action flag.
    pub fn clear_user_action(&self) {
        self.state.borrow_mut().user_action_performed = false;
    }

    fn mark_user_action(&self) {
        self.state.borrow_mut().user_action_performed = true;
    }

    // === Composition lifecycle ===

    /// `compositionstart`: enter the composing state and capture the
    /// pending native operation.
    ///
    /// Starting from a non-collapsed selection, the selected content is
    /// deleted eagerly instead: browsers can drop DOM structure across the
    /// second composition keystroke, leaving a mismatch reconciliation
    /// cannot recover from.
    ///
    /// # Panics
    ///
    /// If a pending native operation already exists. Two live captures
    /// mean the previous flush never ran, which is a reconciler bug, not a
    /// runtime condition.
    pub fn on_composition_start<D: HostEditor>(&self, editor: &mut D) -> EventOutcome {
        if editor.is_read_only() {
            return EventOutcome::Continue;
        }
        {
            let mut st = self.state.borrow_mut();
            st.is_composing = true;
            st.composition_count += 1;
            st.user_action_performed = true;
            tracing::debug!(count = st.composition_count, "composition start");
        }

        let Some(selection) = editor.selection() else {
            return EventOutcome::Continue;
        };

        if !selection.is_collapsed() {
            tracing::debug!("composition over expanded selection, deleting eagerly");
            editor.delete_selection();
            return EventOutcome::Continue;
        }

        let Some(container) = self.dom.element_for_key(&selection.anchor.key) else {
            tracing::warn!(
                key = %selection.anchor.key,
                "composition start: caret node has no DOM container, skipping capture"
            );
            return EventOutcome::Continue;
        };

        let mut st = self.state.borrow_mut();
        assert!(
            st.pending.is_none(),
            "native mutation already pending at composition start"
        );
        tracing::trace!(
            key = %selection.anchor.key,
            offset = selection.anchor.offset,
            "captured pending native mutation"
        );
        st.pending = Some(PendingMutation {
            at: selection,
            container,
        });
        EventOutcome::Continue
    }

    /// `compositionend`: flush synchronously, then schedule the return to
    /// the idle state for the next frame.
    ///
    /// The deferred finalize compares the composition count captured here
    /// against the live one and no-ops if a newer composition started in
    /// the interim.
    pub fn on_composition_end<D: HostEditor>(
        &self,
        editor: &mut D,
    ) -> Result<EventOutcome, ReconcileError> {
        self.flush(editor)?;

        let count = self.state.borrow().composition_count;
        let state = Rc::clone(&self.state);
        self.scheduler.defer(Box::new(move || {
            let mut st = state.borrow_mut();
            if st.composition_count == count {
                tracing::trace!(count, "composition finalized");
                st.is_composing = false;
            } else {
                tracing::trace!(
                    stale = count,
                    current = st.composition_count,
                    "stale composition finalize, skipping"
                );
            }
        }));
        Ok(EventOutcome::Continue)
    }

    /// `input`: absorb anything the flush accounts for.
    ///
    /// While composing the event is ignored outright; the browser will
    /// emit a matching `compositionend`. Otherwise a successful flush
    /// means the input was the native mutation we captured, and downstream
    /// handlers must not treat it as a generic edit.
    pub fn on_input<D: HostEditor>(&self, editor: &mut D) -> Result<EventOutcome, ReconcileError> {
        if self.state.borrow().is_composing {
            return Ok(EventOutcome::Handled);
        }
        if self.flush(editor)? {
            return Ok(EventOutcome::Handled);
        }
        if editor.selection().is_none() {
            // A stray input with no addressable selection cannot be
            // reconciled.
            tracing::debug!("input with blurred selection, ignoring");
            return Ok(EventOutcome::Handled);
        }
        self.mark_user_action();
        Ok(EventOutcome::Continue)
    }

    // === Flush ===

    /// Merge the pending native mutation into the logical document.
    ///
    /// Returns `Ok(false)` when nothing was pending. Every `Err` is an
    /// unrecoverable DOM/model divergence; see [`ReconcileError`].
    pub fn flush<D: HostEditor>(&self, editor: &mut D) -> Result<bool, ReconcileError> {
        let Some(pending) = self.state.borrow_mut().pending.take() else {
            return Ok(false);
        };

        let (text_node, native_offset) = self
            .dom
            .native_anchor()
            .ok_or(ReconcileError::NoNativeSelection)?;

        let container = self
            .dom
            .host_element(&text_node)
            .ok_or(ReconcileError::ContainerUnresolved)?;
        if container != pending.container {
            return Err(ReconcileError::ContainerMoved);
        }

        let snapshot = pending.at.anchor;
        let resolved = self
            .dom
            .key_of(&container)
            .ok_or(ReconcileError::ContainerUnresolved)?;
        if resolved != snapshot.key {
            return Err(ReconcileError::NodeMismatch {
                snapshot: snapshot.key,
                resolved,
            });
        }
        let path = editor
            .path_of(&snapshot.key)
            .ok_or_else(|| ReconcileError::NodeUnresolved(snapshot.key.clone()))?;
        let old_len = editor
            .text_of(&snapshot.key)
            .ok_or_else(|| ReconcileError::NodeUnresolved(snapshot.key.clone()))?
            .chars()
            .count();

        self.dom.normalize_runs(&container);
        let text = self.dom.cleaned_text(&container);
        tracing::debug!(
            key = %snapshot.key,
            old_len,
            new_len = text.chars().count(),
            offset = native_offset,
            "flushing native mutation"
        );
        editor.replace_text(&path, &snapshot.key, 0..old_len, &text);

        if !self.dom.is_attached(&text_node) {
            return Err(ReconcileError::NodeDetached);
        }
        let (point_key, point_offset) = self
            .dom
            .point_at(&text_node, native_offset)
            .ok_or(ReconcileError::PointUnresolved {
                offset: native_offset,
            })?;
        let point_path = editor
            .path_of(&point_key)
            .ok_or_else(|| ReconcileError::NodeUnresolved(point_key.clone()))?;
        let point = Point::new(point_path, point_key, point_offset);

        // Keep both selection systems in lock-step: replacing text can
        // itself shift where the browser thinks the caret is.
        editor.set_selection(EditRange::collapsed(point));
        self.dom.collapse_native(&text_node, native_offset);
        Ok(true)
    }

    // === Focus handling ===

    /// `blur`: distinguish real focus loss from editor-internal shuffles
    /// and tab-visibility changes.
    pub fn on_blur(&self, related: &RelatedTarget<B::Element>) -> EventOutcome {
        let st = self.state.borrow();
        if st.is_copying {
            // The system copy affordance steals focus momentarily.
            return EventOutcome::Handled;
        }
        match related {
            RelatedTarget::VoidSpacer => EventOutcome::Handled,
            RelatedTarget::NestedEditable(_) => EventOutcome::Handled,
            RelatedTarget::None | RelatedTarget::Other(_) => {
                if let Some(last) = &st.last_active_element {
                    if self.dom.active_element().as_ref() == Some(last) {
                        // Window blur, not an editor blur.
                        return EventOutcome::Handled;
                    }
                }
                EventOutcome::Continue
            }
        }
    }

    /// `focus`: record the active element; on Gecko, bounce focus off
    /// nested editables back to the root.
    pub fn on_focus(&self, landed_on_nested_editable: bool, gecko: bool) -> FocusResponse {
        let mut st = self.state.borrow_mut();
        st.last_active_element = self.dom.active_element();
        if gecko && landed_on_nested_editable {
            return FocusResponse::RefocusRoot;
        }
        FocusResponse::Continue
    }

    // === Clipboard ===

    /// `copy`: raise the copying guard until the next frame so the blur
    /// the system affordance causes is not treated as real.
    pub fn on_copy(&self) -> EventOutcome {
        self.raise_copy_guard();
        EventOutcome::Continue
    }

    /// `cut`: same guard as copy; absorbed entirely on read-only surfaces.
    pub fn on_cut<D: HostEditor>(&self, editor: &D) -> EventOutcome {
        if editor.is_read_only() {
            return EventOutcome::Handled;
        }
        self.raise_copy_guard();
        EventOutcome::Continue
    }

    fn raise_copy_guard(&self) {
        {
            let mut st = self.state.borrow_mut();
            st.is_copying = true;
            st.user_action_performed = true;
        }
        let state = Rc::clone(&self.state);
        self.scheduler.defer(Box::new(move || {
            state.borrow_mut().is_copying = false;
        }));
    }

    // === Drag and drop ===

    pub fn on_drag_start(&self) -> EventOutcome {
        let mut st = self.state.borrow_mut();
        st.is_dragging = true;
        st.user_action_performed = true;
        EventOutcome::Continue
    }

    pub fn on_drag_enter(&self) -> EventOutcome {
        self.mark_user_action();
        EventOutcome::Continue
    }

    pub fn on_drag_exit(&self) -> EventOutcome {
        self.mark_user_action();
        EventOutcome::Continue
    }

    pub fn on_drag_leave(&self) -> EventOutcome {
        self.mark_user_action();
        EventOutcome::Continue
    }

    /// `dragover`: preventDefault only over void nodes (signals drops are
    /// allowed there); set the "move" effect once per drag.
    pub fn on_drag_over(&self, over_void: bool) -> DragOverResponse {
        let mut st = self.state.borrow_mut();
        let first = !st.is_dragging;
        st.is_dragging = true;
        DragOverResponse {
            prevent_default: over_void,
            set_move_effect: first,
        }
    }

    pub fn on_drag_end(&self) -> EventOutcome {
        self.state.borrow_mut().is_dragging = false;
        EventOutcome::Continue
    }

    pub fn on_drop<D: HostEditor>(&self, editor: &D) -> EventOutcome {
        self.state.borrow_mut().is_dragging = false;
        if editor.is_read_only() {
            return EventOutcome::Handled;
        }
        self.mark_user_action();
        EventOutcome::Continue
    }

    // === Keyboard and the rest of the surface ===

    /// `keydown`: suppress the browser default for classified editing
    /// hotkeys; during composition suppress only caret movers. Read-only
    /// surfaces take no editing defaults, so nothing needs suppressing.
    pub fn on_key_down<D: HostEditor>(&self, editor: &D, press: &KeyPress, mac: bool) -> EventOutcome {
        if editor.is_read_only() {
            return EventOutcome::Continue;
        }
        if self.state.borrow().is_composing {
            if hotkeys::moves_caret(press) {
                return EventOutcome::Handled;
            }
            return EventOutcome::Continue;
        }
        self.mark_user_action();
        match hotkeys::classify(press, mac) {
            Some(action) => {
                tracing::trace!(?action, key = %press.key, "suppressing hotkey default");
                EventOutcome::Handled
            }
            None => EventOutcome::Continue,
        }
    }

    pub fn on_before_input<D: HostEditor>(&self, editor: &D) -> EventOutcome {
        if self.state.borrow().is_composing {
            return EventOutcome::Handled;
        }
        if editor.selection().is_none() {
            return EventOutcome::Handled;
        }
        self.mark_user_action();
        EventOutcome::Continue
    }

    pub fn on_click<D: HostEditor>(&self, editor: &D) -> EventOutcome {
        if !editor.is_read_only() {
            self.mark_user_action();
        }
        EventOutcome::Continue
    }

    pub fn on_paste<D: HostEditor>(&self, editor: &D) -> EventOutcome {
        if editor.is_read_only() {
            return EventOutcome::Handled;
        }
        self.mark_user_action();
        EventOutcome::Continue
    }

    pub fn on_select<D: HostEditor>(&self, editor: &D) -> EventOutcome {
        {
            let st = self.state.borrow();
            if st.is_composing || st.is_copying || editor.is_read_only() {
                return EventOutcome::Handled;
            }
        }
        self.mark_user_action();
        EventOutcome::Continue
    }
}
