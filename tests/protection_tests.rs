use exam_portal::protection::{
    ContentProtection, InputEvent, Key, KeyChord, ProtectionPolicy, SCREENSHOT_WARNING, Verdict,
};

// --- Test Data Helpers ---

fn active_layer() -> ContentProtection {
    let layer = ContentProtection::default();
    layer.install();
    layer
}

fn key_down(chord: KeyChord) -> InputEvent {
    InputEvent::KeyDown(chord)
}

fn key_up(chord: KeyChord) -> InputEvent {
    InputEvent::KeyUp(chord)
}

// --- Lifecycle Tests ---

#[test]
fn test_layer_is_inert_until_installed() {
    let layer = ContentProtection::default();

    assert!(!layer.is_active());
    assert_eq!(
        layer.inspect(&key_down(KeyChord::plain(Key::Function(12)))),
        Verdict::Allow
    );
    assert_eq!(layer.inspect(&InputEvent::ContextMenu), Verdict::Allow);
    assert_eq!(
        layer.inspect(&key_up(KeyChord::plain(Key::PrintScreen))),
        Verdict::Allow
    );
}

#[test]
fn test_install_and_remove_bracket_activity() {
    let layer = ContentProtection::default();

    assert!(layer.install(), "first install must report a state change");
    assert!(layer.is_active());
    assert_eq!(layer.inspect(&InputEvent::SelectStart), Verdict::Suppress);

    assert!(layer.remove(), "first remove must report a state change");
    assert!(!layer.is_active());
    assert_eq!(layer.inspect(&InputEvent::SelectStart), Verdict::Allow);
}

#[test]
fn test_double_mount_and_unmount_leave_no_residue() {
    let layer = ContentProtection::default();

    // 1. A second install is a no-op.
    assert!(layer.install());
    assert!(!layer.install());
    assert!(layer.is_active());

    // 2. A second remove is a no-op and the layer stays inactive.
    assert!(layer.remove());
    assert!(!layer.remove());
    assert!(!layer.is_active());
    assert_eq!(layer.inspect(&InputEvent::ContextMenu), Verdict::Allow);
}

// --- Inspect Chord Tests ---

#[test]
fn test_inspect_chords_are_suppressed() {
    let layer = active_layer();

    let blocked = [
        KeyChord::plain(Key::Function(12)),
        KeyChord::ctrl_shift(Key::Char('i')),
        KeyChord::ctrl_shift(Key::Char('I')),
        KeyChord::ctrl_shift(Key::Char('c')),
        KeyChord::ctrl_shift(Key::Char('C')),
        KeyChord::ctrl(Key::Char('u')),
        KeyChord::ctrl(Key::Char('U')),
    ];
    for chord in blocked {
        assert_eq!(
            layer.inspect(&key_down(chord)),
            Verdict::Suppress,
            "chord should be blocked: {:?}",
            chord
        );
    }
}

#[test]
fn test_ordinary_chords_pass_through() {
    let layer = active_layer();

    let allowed = [
        KeyChord::plain(Key::Char('u')),
        KeyChord::plain(Key::Char('i')),
        // Ctrl+C without Shift is a plain copy/interrupt, not an inspect chord.
        KeyChord::ctrl(Key::Char('c')),
        KeyChord::ctrl(Key::Char('i')),
        // Shift moves Ctrl+U out of the view-source binding.
        KeyChord::ctrl_shift(Key::Char('u')),
        KeyChord::plain(Key::Function(5)),
        KeyChord::plain(Key::Function(11)),
        KeyChord::plain(Key::Esc),
        KeyChord::plain(Key::Other),
    ];
    for chord in allowed {
        assert_eq!(
            layer.inspect(&key_down(chord)),
            Verdict::Allow,
            "chord should pass: {:?}",
            chord
        );
    }
}

#[test]
fn test_f12_is_blocked_with_any_modifiers() {
    let layer = active_layer();

    assert_eq!(
        layer.inspect(&key_down(KeyChord::ctrl(Key::Function(12)))),
        Verdict::Suppress
    );
    assert_eq!(
        layer.inspect(&key_down(KeyChord::ctrl_shift(Key::Function(12)))),
        Verdict::Suppress
    );
}

// --- Context Menu and Selection Tests ---

#[test]
fn test_context_menu_is_suppressed() {
    let layer = active_layer();

    assert_eq!(layer.inspect(&InputEvent::ContextMenu), Verdict::Suppress);
}

#[test]
fn test_selection_and_drag_are_suppressed() {
    let layer = active_layer();

    assert_eq!(layer.inspect(&InputEvent::SelectStart), Verdict::Suppress);
    assert_eq!(layer.inspect(&InputEvent::DragStart), Verdict::Suppress);
}

// --- PrintScreen Tests ---

#[test]
fn test_print_screen_warns_on_release_only() {
    let layer = active_layer();

    // The capture has already happened by the time the key comes up; the
    // verdict is a warning, not suppression.
    assert_eq!(
        layer.inspect(&key_up(KeyChord::plain(Key::PrintScreen))),
        Verdict::Warn
    );
    assert_eq!(
        layer.inspect(&key_down(KeyChord::plain(Key::PrintScreen))),
        Verdict::Allow
    );
    assert_eq!(
        layer.inspect(&key_up(KeyChord::plain(Key::Char('x')))),
        Verdict::Allow
    );
}

#[test]
fn test_warning_text_names_the_behavior() {
    assert!(SCREENSHOT_WARNING.contains("Screenshots"));
    assert!(SCREENSHOT_WARNING.contains("not allowed"));
}

// --- Policy Toggle Tests ---

#[test]
fn test_default_policy_enables_all_behaviors() {
    let policy = ProtectionPolicy::default();

    assert!(policy.block_inspect_keys);
    assert!(policy.block_context_menu);
    assert!(policy.block_selection);
    assert!(policy.detect_print_screen);
}

#[test]
fn test_each_toggle_disables_only_its_behavior() {
    // 1. Inspect keys off: chords pass, the context menu stays blocked.
    let layer = ContentProtection::new(ProtectionPolicy {
        block_inspect_keys: false,
        ..ProtectionPolicy::default()
    });
    layer.install();
    assert_eq!(
        layer.inspect(&key_down(KeyChord::plain(Key::Function(12)))),
        Verdict::Allow
    );
    assert_eq!(layer.inspect(&InputEvent::ContextMenu), Verdict::Suppress);

    // 2. Context menu off: the menu passes, selection stays blocked.
    let layer = ContentProtection::new(ProtectionPolicy {
        block_context_menu: false,
        ..ProtectionPolicy::default()
    });
    layer.install();
    assert_eq!(layer.inspect(&InputEvent::ContextMenu), Verdict::Allow);
    assert_eq!(layer.inspect(&InputEvent::SelectStart), Verdict::Suppress);

    // 3. Selection off: select and drag pass, PrintScreen still warns.
    let layer = ContentProtection::new(ProtectionPolicy {
        block_selection: false,
        ..ProtectionPolicy::default()
    });
    layer.install();
    assert_eq!(layer.inspect(&InputEvent::SelectStart), Verdict::Allow);
    assert_eq!(layer.inspect(&InputEvent::DragStart), Verdict::Allow);
    assert_eq!(
        layer.inspect(&key_up(KeyChord::plain(Key::PrintScreen))),
        Verdict::Warn
    );

    // 4. PrintScreen detection off: release passes, inspect keys stay blocked.
    let layer = ContentProtection::new(ProtectionPolicy {
        detect_print_screen: false,
        ..ProtectionPolicy::default()
    });
    layer.install();
    assert_eq!(
        layer.inspect(&key_up(KeyChord::plain(Key::PrintScreen))),
        Verdict::Allow
    );
    assert_eq!(
        layer.inspect(&key_down(KeyChord::ctrl(Key::Char('u')))),
        Verdict::Suppress
    );
}

#[test]
fn test_policy_accessor_reports_the_configured_policy() {
    let policy = ProtectionPolicy {
        block_inspect_keys: true,
        block_context_menu: false,
        block_selection: true,
        detect_print_screen: false,
    };

    let layer = ContentProtection::new(policy);
    assert_eq!(layer.policy(), policy);
}
