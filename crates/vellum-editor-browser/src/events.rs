//! Native event extraction and listener wiring.
//!
//! Translates `web_sys` events into the core reconciler's inputs and
//! binds the full handler surface onto an editor root element. Outcomes
//! map directly onto the platform: `Handled` prevents the default and
//! stops propagation, `Continue` lets the event flow to downstream
//! handlers.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::{EventListener, EventListenerOptions};
use wasm_bindgen::JsCast;

use vellum_editor_core::{
    EventOutcome, FocusResponse, HostEditor, KeyPress, Reconciler, ReconcileError, RelatedTarget,
};

use crate::dom::BrowserDom;
use crate::platform::Platform;
use crate::schedule::FrameScheduler;
use crate::{SPACER_ATTR, VOID_ATTR};

/// Build a [`KeyPress`] from a native keyboard event.
pub fn key_press_from_event(event: &web_sys::KeyboardEvent) -> KeyPress {
    KeyPress {
        key: event.key(),
        ctrl: event.ctrl_key(),
        alt: event.alt_key(),
        shift: event.shift_key(),
        meta: event.meta_key(),
    }
}

/// Classify a blur event's related target for the core blur guard.
pub fn classify_related_target(
    root: &web_sys::Element,
    related: Option<web_sys::EventTarget>,
) -> RelatedTarget<web_sys::Element> {
    let Some(target) = related else {
        return RelatedTarget::None;
    };
    let Ok(element) = target.dyn_into::<web_sys::Element>() else {
        return RelatedTarget::None;
    };
    if element
        .closest(&format!("[{SPACER_ATTR}]"))
        .ok()
        .flatten()
        .is_some()
    {
        return RelatedTarget::VoidSpacer;
    }
    if is_nested_editable(root, &element) {
        return RelatedTarget::NestedEditable(element);
    }
    RelatedTarget::Other(element)
}

/// Whether the element is an editable region nested inside the editor
/// root (and not the root itself).
pub fn is_nested_editable(root: &web_sys::Element, element: &web_sys::Element) -> bool {
    if element == root {
        return false;
    }
    let root_node: &web_sys::Node = root.as_ref();
    if !root_node.contains(Some(element.as_ref())) {
        return false;
    }
    element
        .closest("[contenteditable='true']")
        .ok()
        .flatten()
        .is_some_and(|editable| &editable != root)
}

/// Whether the event target sits inside a void node.
fn over_void(event: &web_sys::Event) -> bool {
    event
        .target()
        .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
        .and_then(|el| el.closest(&format!("[{VOID_ATTR}]")).ok().flatten())
        .is_some()
}

fn apply(outcome: EventOutcome, event: &web_sys::Event) {
    if outcome == EventOutcome::Handled {
        event.prevent_default();
        event.stop_propagation();
    }
}

fn fail(err: ReconcileError) -> ! {
    tracing::error!(%err, "unrecoverable DOM/model divergence");
    panic!("reconciliation failed: {err}");
}

type SharedReconciler = Rc<Reconciler<BrowserDom, FrameScheduler>>;

/// Live event listeners for one editor surface.
///
/// Dropping this detaches every listener.
pub struct EditorBindings {
    listeners: Vec<EventListener>,
}

impl EditorBindings {
    /// Attach the full handler surface to the editor root.
    ///
    /// `root` must be the contenteditable element the `BrowserDom` inside
    /// the reconciler was created for. Composition-end and input failures
    /// are unrecoverable and panic; see `ReconcileError`.
    pub fn attach<D>(
        root: &web_sys::Element,
        editor: Rc<RefCell<D>>,
        reconciler: SharedReconciler,
        platform: Platform,
    ) -> Self
    where
        D: HostEditor + 'static,
    {
        let mut listeners = Vec::new();
        let opts = EventListenerOptions::enable_prevent_default();
        let target: &web_sys::EventTarget = root.as_ref();

        {
            let (rec, ed) = (Rc::clone(&reconciler), Rc::clone(&editor));
            listeners.push(EventListener::new_with_options(
                target,
                "compositionstart",
                opts,
                move |event| {
                    apply(rec.on_composition_start(&mut *ed.borrow_mut()), event);
                },
            ));
        }
        {
            let (rec, ed) = (Rc::clone(&reconciler), Rc::clone(&editor));
            listeners.push(EventListener::new_with_options(
                target,
                "compositionend",
                opts,
                move |event| match rec.on_composition_end(&mut *ed.borrow_mut()) {
                    Ok(outcome) => apply(outcome, event),
                    Err(err) => fail(err),
                },
            ));
        }
        {
            let (rec, ed) = (Rc::clone(&reconciler), Rc::clone(&editor));
            listeners.push(EventListener::new_with_options(
                target,
                "input",
                opts,
                move |event| match rec.on_input(&mut *ed.borrow_mut()) {
                    Ok(outcome) => apply(outcome, event),
                    Err(err) => fail(err),
                },
            ));
        }
        {
            let (rec, ed) = (Rc::clone(&reconciler), Rc::clone(&editor));
            listeners.push(EventListener::new_with_options(
                target,
                "beforeinput",
                opts,
                move |event| {
                    apply(rec.on_before_input(&*ed.borrow()), event);
                },
            ));
        }
        {
            let (rec, ed) = (Rc::clone(&reconciler), Rc::clone(&editor));
            let mac = platform.mac;
            listeners.push(EventListener::new_with_options(
                target,
                "keydown",
                opts,
                move |event| {
                    let Some(key_event) = event.dyn_ref::<web_sys::KeyboardEvent>() else {
                        return;
                    };
                    let press = key_press_from_event(key_event);
                    apply(rec.on_key_down(&*ed.borrow(), &press, mac), event);
                },
            ));
        }
        {
            let rec = Rc::clone(&reconciler);
            let root = root.clone();
            listeners.push(EventListener::new_with_options(
                target,
                "blur",
                opts,
                move |event| {
                    let related = event
                        .dyn_ref::<web_sys::FocusEvent>()
                        .and_then(|focus| focus.related_target());
                    apply(rec.on_blur(&classify_related_target(&root, related)), event);
                },
            ));
        }
        {
            let rec = Rc::clone(&reconciler);
            let root = root.clone();
            let gecko = platform.gecko;
            listeners.push(EventListener::new_with_options(
                target,
                "focus",
                opts,
                move |event| {
                    let nested = event
                        .target()
                        .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
                        .is_some_and(|el| is_nested_editable(&root, &el));
                    if rec.on_focus(nested, gecko) == FocusResponse::RefocusRoot {
                        if let Some(html) = root.dyn_ref::<web_sys::HtmlElement>() {
                            let _ = html.focus();
                        }
                        event.prevent_default();
                    }
                },
            ));
        }
        {
            let rec = Rc::clone(&reconciler);
            listeners.push(EventListener::new_with_options(
                target,
                "copy",
                opts,
                move |event| {
                    apply(rec.on_copy(), event);
                },
            ));
        }
        {
            let (rec, ed) = (Rc::clone(&reconciler), Rc::clone(&editor));
            listeners.push(EventListener::new_with_options(
                target,
                "cut",
                opts,
                move |event| {
                    apply(rec.on_cut(&*ed.borrow()), event);
                },
            ));
        }
        {
            let (rec, ed) = (Rc::clone(&reconciler), Rc::clone(&editor));
            listeners.push(EventListener::new_with_options(
                target,
                "paste",
                opts,
                move |event| {
                    apply(rec.on_paste(&*ed.borrow()), event);
                },
            ));
        }
        {
            let (rec, ed) = (Rc::clone(&reconciler), Rc::clone(&editor));
            listeners.push(EventListener::new_with_options(
                target,
                "click",
                opts,
                move |event| {
                    apply(rec.on_click(&*ed.borrow()), event);
                },
            ));
        }
        {
            let rec = Rc::clone(&reconciler);
            listeners.push(EventListener::new_with_options(
                target,
                "dragstart",
                opts,
                move |event| {
                    apply(rec.on_drag_start(), event);
                },
            ));
        }
        {
            let rec = Rc::clone(&reconciler);
            listeners.push(EventListener::new_with_options(
                target,
                "dragenter",
                opts,
                move |event| {
                    apply(rec.on_drag_enter(), event);
                },
            ));
        }
        {
            let rec = Rc::clone(&reconciler);
            listeners.push(EventListener::new_with_options(
                target,
                "dragexit",
                opts,
                move |event| {
                    apply(rec.on_drag_exit(), event);
                },
            ));
        }
        {
            let rec = Rc::clone(&reconciler);
            listeners.push(EventListener::new_with_options(
                target,
                "dragleave",
                opts,
                move |event| {
                    apply(rec.on_drag_leave(), event);
                },
            ));
        }
        {
            let rec = Rc::clone(&reconciler);
            listeners.push(EventListener::new_with_options(
                target,
                "dragover",
                opts,
                move |event| {
                    let response = rec.on_drag_over(over_void(event));
                    if response.prevent_default {
                        event.prevent_default();
                    }
                    if response.set_move_effect {
                        if let Some(transfer) = event
                            .dyn_ref::<web_sys::DragEvent>()
                            .and_then(|drag| drag.data_transfer())
                        {
                            transfer.set_drop_effect("move");
                        }
                    }
                },
            ));
        }
        {
            let rec = Rc::clone(&reconciler);
            listeners.push(EventListener::new_with_options(
                target,
                "dragend",
                opts,
                move |event| {
                    apply(rec.on_drag_end(), event);
                },
            ));
        }
        {
            let (rec, ed) = (Rc::clone(&reconciler), Rc::clone(&editor));
            listeners.push(EventListener::new_with_options(
                target,
                "drop",
                opts,
                move |event| {
                    apply(rec.on_drop(&*ed.borrow()), event);
                },
            ));
        }
        if let Some(document) = web_sys::window().and_then(|w| w.document()) {
            // Selection changes for contenteditable surface on the
            // document, not the element.
            let (rec, ed) = (Rc::clone(&reconciler), Rc::clone(&editor));
            let doc_target: &web_sys::EventTarget = document.as_ref();
            listeners.push(EventListener::new_with_options(
                doc_target,
                "selectionchange",
                opts,
                move |event| {
                    apply(rec.on_select(&*ed.borrow()), event);
                },
            ));
        }

        tracing::debug!(count = listeners.len(), "attached editor event listeners");
        Self { listeners }
    }

    /// Number of live listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}
