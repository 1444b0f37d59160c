//! Frame-deferred task scheduling.
//!
//! The reconciler defers two things to the next frame: the composition
//! finalize and the copy-guard reset. Both are fire-and-forget; staleness
//! is handled by the caller's generation counter, so nothing here needs a
//! cancel handle.

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

use vellum_editor_core::Scheduler;

/// `requestAnimationFrame`-backed [`Scheduler`].
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameScheduler;

impl FrameScheduler {
    pub fn new() -> Self {
        Self
    }
}

impl Scheduler for FrameScheduler {
    fn defer(&self, task: Box<dyn FnOnce()>) {
        let Some(window) = web_sys::window() else {
            tracing::warn!("no window, dropping deferred task");
            return;
        };
        let closure = Closure::once_into_js(move || task());
        if let Err(e) = window.request_animation_frame(closure.unchecked_ref()) {
            tracing::warn!(?e, "requestAnimationFrame failed, dropping deferred task");
        }
    }
}
