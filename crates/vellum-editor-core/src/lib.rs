//! vellum-editor-core: platform-free reconciliation logic for a
//! contenteditable editor.
//!
//! This crate provides:
//! - `Point`/`Path`/`Key` - logical document positions, distinct from the DOM
//! - `HostEditor` trait - the contract the surrounding editor runtime provides
//! - `DomBridge`/`Scheduler` traits - seams implemented by the browser layer
//! - `Reconciler` - the native-event state machine and flush algorithm that
//!   merges out-of-band DOM text mutations back into the logical document
//! - `BlockEditor` - a minimal in-memory `HostEditor` for hosts and tests
//!
//! Nothing in this crate touches `web-sys`; the browser half lives in
//! `vellum-editor-browser`.

pub mod dom;
pub mod error;
pub mod host;
pub mod hotkeys;
pub mod reconcile;
pub mod text;
pub mod types;

pub use dom::{DomBridge, RelatedTarget, Scheduler};
pub use error::ReconcileError;
pub use host::{BlockEditor, HostEditor, Node};
pub use hotkeys::{EditAction, KeyPress, classify, moves_caret};
pub use reconcile::{DragOverResponse, EventOutcome, FocusResponse, Reconciler, SessionState};
pub use smol_str::SmolStr;
pub use text::{ZERO_WIDTH, contains_zero_width, strip_zero_width};
pub use types::{EditRange, Key, Path, Point};
