//! Hotkey classification for keydown suppression.
//!
//! These chords trigger browser editing behavior that mutates the
//! contenteditable DOM directly, desyncing it from the logical document.
//! The reconciler prevents the default for every classified chord; the
//! host dispatches the corresponding editor command itself.

/// A normalized key press, extracted from the native keyboard event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPress {
    /// The `KeyboardEvent.key` value (`"b"`, `"Backspace"`, `"ArrowLeft"`, ...).
    pub key: String,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl KeyPress {
    /// A press with no modifiers.
    pub fn bare(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ctrl: false,
            alt: false,
            shift: false,
            meta: false,
        }
    }

    /// The platform "mod" chord: meta on macOS, ctrl elsewhere.
    fn has_mod(&self, mac: bool) -> bool {
        if mac { self.meta } else { self.ctrl }
    }

    fn lower_key(&self) -> String {
        self.key.to_lowercase()
    }
}

/// Editing actions whose browser default must be suppressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditAction {
    ToggleBold,
    ToggleItalic,
    DeleteBackward,
    DeleteForward,
    DeleteWordBackward,
    DeleteWordForward,
    DeleteLineBackward,
    DeleteLineForward,
    Undo,
    Redo,
    SplitBlock,
    TransposeCharacter,
}

/// Classify a key press into a suppressed editing action, if any.
///
/// `mac` selects the platform chord set: the mod key is meta on macOS and
/// ctrl elsewhere, and macOS adds the classic ctrl-based emacs bindings
/// the system text engine honors (`ctrl+h`, `ctrl+d`, `ctrl+k`, `ctrl+t`).
pub fn classify(press: &KeyPress, mac: bool) -> Option<EditAction> {
    let key = press.lower_key();
    let has_mod = press.has_mod(mac);

    if has_mod && !press.alt {
        match (key.as_str(), press.shift) {
            ("b", false) => return Some(EditAction::ToggleBold),
            ("i", false) => return Some(EditAction::ToggleItalic),
            ("z", false) => return Some(EditAction::Undo),
            ("z", true) => return Some(EditAction::Redo),
            ("y", false) if !mac => return Some(EditAction::Redo),
            _ => {}
        }
    }

    // macOS line deletion: cmd+backspace.
    if mac && press.meta && !press.alt && key == "backspace" {
        return Some(EditAction::DeleteLineBackward);
    }

    // Word deletion: alt+backspace/delete on macOS, ctrl+backspace/delete elsewhere.
    let word_mod = if mac { press.alt } else { press.ctrl };
    if word_mod {
        match key.as_str() {
            "backspace" => return Some(EditAction::DeleteWordBackward),
            "delete" => return Some(EditAction::DeleteWordForward),
            _ => {}
        }
    }

    // macOS ctrl bindings handled by the system text engine.
    if mac && press.ctrl && !press.alt && !press.meta {
        match key.as_str() {
            "h" => return Some(EditAction::DeleteBackward),
            "d" => return Some(EditAction::DeleteForward),
            "k" => return Some(EditAction::DeleteLineForward),
            "t" => return Some(EditAction::TransposeCharacter),
            _ => {}
        }
    }

    if !press.ctrl && !press.alt && !press.meta {
        match key.as_str() {
            "backspace" => return Some(EditAction::DeleteBackward),
            "delete" => return Some(EditAction::DeleteForward),
            "enter" => return Some(EditAction::SplitBlock),
            _ => {}
        }
    }

    None
}

/// Whether the key would move the caret.
///
/// During composition only these are suppressed: moving the caret
/// mid-composition would detach the native selection from the text run
/// being composed into.
pub fn moves_caret(press: &KeyPress) -> bool {
    matches!(
        press.key.as_str(),
        "ArrowLeft" | "ArrowRight" | "ArrowUp" | "ArrowDown" | "Home" | "End" | "PageUp"
            | "PageDown"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(key: &str, ctrl: bool, alt: bool, shift: bool, meta: bool) -> KeyPress {
        KeyPress {
            key: key.to_string(),
            ctrl,
            alt,
            shift,
            meta,
        }
    }

    #[test]
    fn test_bold_italic() {
        assert_eq!(
            classify(&press("b", true, false, false, false), false),
            Some(EditAction::ToggleBold)
        );
        assert_eq!(
            classify(&press("i", false, false, false, true), true),
            Some(EditAction::ToggleItalic)
        );
        // Wrong mod key for the platform.
        assert_eq!(classify(&press("b", true, false, false, false), true), None);
    }

    #[test]
    fn test_undo_redo() {
        assert_eq!(
            classify(&press("z", true, false, false, false), false),
            Some(EditAction::Undo)
        );
        assert_eq!(
            classify(&press("z", true, false, true, false), false),
            Some(EditAction::Redo)
        );
        assert_eq!(
            classify(&press("y", true, false, false, false), false),
            Some(EditAction::Redo)
        );
        // ctrl+y is not redo on macOS.
        assert_eq!(classify(&press("y", true, false, false, false), true), None);
    }

    #[test]
    fn test_plain_deletion_and_split() {
        assert_eq!(
            classify(&KeyPress::bare("Backspace"), false),
            Some(EditAction::DeleteBackward)
        );
        assert_eq!(
            classify(&KeyPress::bare("Delete"), false),
            Some(EditAction::DeleteForward)
        );
        assert_eq!(
            classify(&KeyPress::bare("Enter"), false),
            Some(EditAction::SplitBlock)
        );
    }

    #[test]
    fn test_word_deletion_per_platform() {
        assert_eq!(
            classify(&press("Backspace", true, false, false, false), false),
            Some(EditAction::DeleteWordBackward)
        );
        assert_eq!(
            classify(&press("Delete", false, true, false, false), true),
            Some(EditAction::DeleteWordForward)
        );
    }

    #[test]
    fn test_mac_ctrl_bindings() {
        assert_eq!(
            classify(&press("h", true, false, false, false), true),
            Some(EditAction::DeleteBackward)
        );
        assert_eq!(
            classify(&press("k", true, false, false, false), true),
            Some(EditAction::DeleteLineForward)
        );
        assert_eq!(
            classify(&press("t", true, false, false, false), true),
            Some(EditAction::TransposeCharacter)
        );
        // Not active off macOS.
        assert_eq!(classify(&press("t", true, false, false, false), false), None);
    }

    #[test]
    fn test_line_delete_backward_mac() {
        assert_eq!(
            classify(&press("Backspace", false, false, false, true), true),
            Some(EditAction::DeleteLineBackward)
        );
    }

    #[test]
    fn test_unclassified() {
        assert_eq!(classify(&KeyPress::bare("a"), false), None);
        assert_eq!(classify(&KeyPress::bare("ArrowLeft"), false), None);
        assert_eq!(classify(&press("b", true, true, false, false), false), None);
    }

    #[test]
    fn test_moves_caret() {
        assert!(moves_caret(&KeyPress::bare("ArrowLeft")));
        assert!(moves_caret(&KeyPress::bare("End")));
        assert!(!moves_caret(&KeyPress::bare("a")));
        assert!(!moves_caret(&KeyPress::bare("Backspace")));
    }
}
