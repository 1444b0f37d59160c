//! Fatal reconciliation failures.

use thiserror::Error;

use crate::types::Key;

/// Conditions under which a flush cannot safely repair DOM/model
/// divergence.
///
/// These are not user errors; they indicate a reconciliation bug or a
/// browser mutation the mapping cannot follow. Callers must surface them
/// loudly - the browser glue logs and panics - rather than continue with a
/// silently corrupted document.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("no native selection available while flushing a pending mutation")]
    NoNativeSelection,

    #[error("native selection anchor has no logical host container")]
    ContainerUnresolved,

    #[error("native selection left the container captured at composition start")]
    ContainerMoved,

    #[error("snapshot node {snapshot} disagrees with DOM-resolved node {resolved}")]
    NodeMismatch { snapshot: Key, resolved: Key },

    #[error("snapshot node {0} is no longer present in the document")]
    NodeUnresolved(Key),

    #[error("mutated native text node is detached from the document")]
    NodeDetached,

    #[error("native offset {offset} has no corresponding logical point")]
    PointUnresolved { offset: usize },
}
