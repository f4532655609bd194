//! Content protection layer.
//!
//! Best-effort deterrents against casual copying and inspection of a
//! protected document: suppress the inspect-tooling key chords, the context
//! menu, selection/drag initiation, and warn on the PrintScreen key. This is
//! a deterrent, not a security boundary: anyone with basic tooling or an
//! external camera defeats it, and OS-level screenshot capture cannot be
//! intercepted from here at all.
//!
//! The layer is active only while a protected view is mounted: installed on
//! entry, fully removed on exit, with nothing leaking into other screens.
//! Installation is synchronous, infallible, and idempotent.

use std::sync::atomic::{AtomicBool, Ordering};

/// Warning surfaced when the PrintScreen key is released over a protected view.
pub const SCREENSHOT_WARNING: &str = "Screenshots and screen recording are not allowed";

/// Key
///
/// The keys the protection layer cares about, plus a catch-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Function(u8),
    PrintScreen,
    Esc,
    Other,
}

/// KeyChord
///
/// A key together with its modifier state, as reported by the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyChord {
    pub key: Key,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyChord {
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            shift: false,
            alt: false,
        }
    }

    pub fn ctrl(key: Key) -> Self {
        Self {
            key,
            ctrl: true,
            shift: false,
            alt: false,
        }
    }

    pub fn ctrl_shift(key: Key) -> Self {
        Self {
            key,
            ctrl: true,
            shift: true,
            alt: false,
        }
    }
}

/// InputEvent
///
/// The front-end events routed through the layer while it is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(KeyChord),
    KeyUp(KeyChord),
    ContextMenu,
    SelectStart,
    DragStart,
}

/// Verdict
///
/// What the front end should do with an event it routed through the layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Deliver the event normally.
    Allow,
    /// Swallow the event; its default behavior must not run.
    Suppress,
    /// Deliver the event but show [`SCREENSHOT_WARNING`] to the user.
    Warn,
}

/// ProtectionPolicy
///
/// The four behaviors, each independently toggled. All on by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtectionPolicy {
    /// Suppress the key chords conventionally bound to developer tools and
    /// view-source (F12, Ctrl+Shift+I, Ctrl+Shift+C, Ctrl+U). Menus and
    /// external tools remain reachable.
    pub block_inspect_keys: bool,
    /// Suppress the context-menu trigger.
    pub block_context_menu: bool,
    /// Suppress selection and drag initiation, deterring casual copy.
    pub block_selection: bool,
    /// Surface a warning when the PrintScreen key is released. Detection
    /// only; the capture itself cannot be observed or blocked.
    pub detect_print_screen: bool,
}

impl Default for ProtectionPolicy {
    fn default() -> Self {
        Self {
            block_inspect_keys: true,
            block_context_menu: true,
            block_selection: true,
            detect_print_screen: true,
        }
    }
}

/// ContentProtection
///
/// One instance guards one protected view. `install` and `remove` bracket the
/// view's lifetime; both are idempotent, so a double mount or unmount leaves
/// no residual suppression. Events are judged through [`inspect`]; while the
/// layer is not installed every event is allowed through untouched.
///
/// [`inspect`]: ContentProtection::inspect
#[derive(Debug, Default)]
pub struct ContentProtection {
    policy: ProtectionPolicy,
    installed: AtomicBool,
}

impl ContentProtection {
    pub fn new(policy: ProtectionPolicy) -> Self {
        Self {
            policy,
            installed: AtomicBool::new(false),
        }
    }

    /// Activates the layer. Returns `true` if this call changed the state,
    /// `false` if it was already active.
    pub fn install(&self) -> bool {
        !self.installed.swap(true, Ordering::SeqCst)
    }

    /// Deactivates the layer. Returns `true` if this call changed the state.
    pub fn remove(&self) -> bool {
        self.installed.swap(false, Ordering::SeqCst)
    }

    pub fn is_active(&self) -> bool {
        self.installed.load(Ordering::SeqCst)
    }

    pub fn policy(&self) -> ProtectionPolicy {
        self.policy
    }

    /// Judges one input event against the policy. Pure apart from reading the
    /// installed flag; surfacing the warning and swallowing the event are the
    /// caller's job.
    pub fn inspect(&self, event: &InputEvent) -> Verdict {
        if !self.is_active() {
            return Verdict::Allow;
        }
        match event {
            InputEvent::KeyDown(chord) => {
                if self.policy.block_inspect_keys && is_inspect_chord(chord) {
                    Verdict::Suppress
                } else {
                    Verdict::Allow
                }
            }
            // PrintScreen registers on release, not press.
            InputEvent::KeyUp(chord) => {
                if self.policy.detect_print_screen && chord.key == Key::PrintScreen {
                    Verdict::Warn
                } else {
                    Verdict::Allow
                }
            }
            InputEvent::ContextMenu => {
                if self.policy.block_context_menu {
                    Verdict::Suppress
                } else {
                    Verdict::Allow
                }
            }
            InputEvent::SelectStart | InputEvent::DragStart => {
                if self.policy.block_selection {
                    Verdict::Suppress
                } else {
                    Verdict::Allow
                }
            }
        }
    }
}

/// Matches the developer-tools / view-source chords. Character comparison is
/// case-insensitive so the chord fires whether the platform reports the
/// shifted or unshifted character.
fn is_inspect_chord(chord: &KeyChord) -> bool {
    match chord.key {
        Key::Function(12) => true,
        Key::Char(c) => {
            let c = c.to_ascii_lowercase();
            (chord.ctrl && chord.shift && (c == 'i' || c == 'c'))
                || (chord.ctrl && !chord.shift && c == 'u')
        }
        _ => false,
    }
}
