//! Browser DOM layer for the vellum editor reconciler.
//!
//! This crate implements the `DomBridge` and `Scheduler` seams from
//! `vellum-editor-core` on top of `web-sys`, and wires the reconciler's
//! handler surface to native DOM events. It assumes a
//! `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `dom`: `BrowserDom`, the live-DOM side of reconciliation (selection
//!   reads, host-element walk-up, text-run normalization, caret collapse)
//! - `events`: event field extraction and `gloo-events` listener wiring
//! - `platform`: browser/OS detection for platform-specific behavior
//! - `schedule`: `requestAnimationFrame`-backed deferred tasks
//!
//! # DOM conventions
//!
//! The renderer (out of scope here) marks the tree with data attributes
//! this layer reads:
//!
//! - `data-vellum-key` on the element hosting a logical node
//! - `data-vellum-string` on text runs
//! - `data-vellum-zero-width` / `data-vellum-length` on zero-width
//!   placeholder runs
//! - `data-vellum-spacer` on void-node spacer elements
//! - `data-vellum-void` on void-node wrappers
//!
//! # Re-exports
//!
//! This crate re-exports `vellum-editor-core` for convenience, so
//! consumers only need to depend on `vellum-editor-browser`.

// Re-export core crate
pub use vellum_editor_core;
pub use vellum_editor_core::*;

pub mod dom;
pub mod events;
pub mod platform;
pub mod schedule;

pub use dom::BrowserDom;
pub use events::EditorBindings;
pub use platform::{Platform, platform};
pub use schedule::FrameScheduler;

/// Attribute marking the element that hosts a logical node.
pub const KEY_ATTR: &str = "data-vellum-key";
/// Attribute marking a text run.
pub const STRING_ATTR: &str = "data-vellum-string";
/// Attribute marking a zero-width placeholder run.
pub const ZERO_WIDTH_ATTR: &str = "data-vellum-zero-width";
/// Placeholder length hint, cleared when a run stops being a placeholder.
pub const LENGTH_ATTR: &str = "data-vellum-length";
/// Attribute marking a void-node spacer element.
pub const SPACER_ATTR: &str = "data-vellum-spacer";
/// Attribute marking a void-node wrapper.
pub const VOID_ATTR: &str = "data-vellum-void";
