//! MenuHost trait + CrosstermHost implementation.
//!
//! The menu core depends on this trait, not on a concrete runtime. The host
//! owns the real controller and item elements: it reports the controller's
//! geometry, delivers activations to item rows, moves focus back to the
//! controller and supplies key presses.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::types::{ActivationMechanism, KeyInput, MenuKey};

// ============================================================================
// MenuHost Trait
// ============================================================================

pub trait MenuHost: Send {
    /// Height of the controller element; the menu opens directly below it.
    fn controller_height(&self) -> u16;

    /// Deliver an activation to the element backing container row `row`.
    fn dispatch_activation(&mut self, row: usize, mechanism: ActivationMechanism)
        -> Result<(), String>;

    /// Move keyboard focus back to the controller element.
    fn focus_controller(&mut self) -> Result<(), String>;

    /// Key presses that arrived since the last call.
    fn read_keys(&mut self, timeout_ms: u32) -> Vec<KeyInput>;

    /// Downcast support for test code. Returns self as Any for type-safe downcasting.
    #[cfg(test)]
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}

// ============================================================================
// CrosstermHost
// ============================================================================

/// Host for a menu rendered in the terminal. Activations and focus changes
/// are reported through the event buffer, so delivering them always succeeds.
pub struct CrosstermHost {
    controller_height: u16,
}

impl CrosstermHost {
    pub fn new(controller_height: u16) -> Self {
        Self { controller_height }
    }
}

/// Translate a crossterm key event. Releases and repeats of non-press kinds
/// are dropped, as are chorded keys other than Shift.
pub fn translate_key_event(key_event: &KeyEvent) -> Option<KeyInput> {
    if key_event.kind != KeyEventKind::Press {
        return None;
    }
    if key_event
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER)
    {
        return None;
    }

    let named = match key_event.code {
        KeyCode::Char(c) => return Some(KeyInput::character(c)),
        KeyCode::Enter => MenuKey::Enter,
        KeyCode::Esc => MenuKey::Escape,
        KeyCode::Up => MenuKey::ArrowUp,
        KeyCode::Down => MenuKey::ArrowDown,
        KeyCode::Left => MenuKey::ArrowLeft,
        KeyCode::Right => MenuKey::ArrowRight,
        KeyCode::Home => MenuKey::Home,
        KeyCode::End => MenuKey::End,
        KeyCode::PageUp => MenuKey::PageUp,
        KeyCode::PageDown => MenuKey::PageDown,
        KeyCode::Tab => MenuKey::Tab,
        _ => MenuKey::Other,
    };
    Some(KeyInput::named(named))
}

impl MenuHost for CrosstermHost {
    fn controller_height(&self) -> u16 {
        self.controller_height
    }

    fn dispatch_activation(
        &mut self,
        _row: usize,
        _mechanism: ActivationMechanism,
    ) -> Result<(), String> {
        Ok(())
    }

    fn focus_controller(&mut self) -> Result<(), String> {
        Ok(())
    }

    fn read_keys(&mut self, timeout_ms: u32) -> Vec<KeyInput> {
        use crossterm::event::{self, Event};

        let mut keys = Vec::new();
        let timeout = std::time::Duration::from_millis(timeout_ms as u64);

        if event::poll(timeout).unwrap_or(false) {
            while event::poll(std::time::Duration::ZERO).unwrap_or(false) {
                match event::read() {
                    Ok(Event::Key(key_event)) => {
                        if let Some(input) = translate_key_event(&key_event) {
                            keys.push(input);
                        }
                    }
                    Ok(_) => continue,
                    Err(_) => break,
                }
            }
        }

        keys
    }

    #[cfg(test)]
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

// ============================================================================
// HeadlessHost (FFI hosts and CI environments)
// ============================================================================

/// Accepts every request and produces no input. Hosts driving the menu over
/// the C ABI learn about activations and focus moves from the event buffer.
pub struct HeadlessHost {
    pub controller_height: u16,
}

impl HeadlessHost {
    pub fn new(controller_height: u16) -> Self {
        Self { controller_height }
    }
}

impl MenuHost for HeadlessHost {
    fn controller_height(&self) -> u16 {
        self.controller_height
    }

    fn dispatch_activation(
        &mut self,
        _row: usize,
        _mechanism: ActivationMechanism,
    ) -> Result<(), String> {
        Ok(())
    }

    fn focus_controller(&mut self) -> Result<(), String> {
        Ok(())
    }

    fn read_keys(&mut self, _timeout_ms: u32) -> Vec<KeyInput> {
        Vec::new()
    }

    #[cfg(test)]
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

// ============================================================================
// MockHost (for Rust unit tests only)
// ============================================================================

#[cfg(test)]
pub struct MockHost {
    pub controller_height: u16,
    pub activations: Vec<(usize, ActivationMechanism)>,
    pub controller_focus_count: u32,
    pub injected_keys: Vec<KeyInput>,
    pub fail_native: bool,
    pub fail_synthetic: bool,
    pub fail_focus: bool,
}

#[cfg(test)]
impl MockHost {
    pub fn new(controller_height: u16) -> Self {
        Self {
            controller_height,
            activations: Vec::new(),
            controller_focus_count: 0,
            injected_keys: Vec::new(),
            fail_native: false,
            fail_synthetic: false,
            fail_focus: false,
        }
    }
}

#[cfg(test)]
impl MenuHost for MockHost {
    fn controller_height(&self) -> u16 {
        self.controller_height
    }

    fn dispatch_activation(
        &mut self,
        row: usize,
        mechanism: ActivationMechanism,
    ) -> Result<(), String> {
        let fail = match mechanism {
            ActivationMechanism::Native => self.fail_native,
            ActivationMechanism::Synthetic => self.fail_synthetic,
        };
        if fail {
            return Err(format!("{mechanism:?} activation unsupported"));
        }
        self.activations.push((row, mechanism));
        Ok(())
    }

    fn focus_controller(&mut self) -> Result<(), String> {
        if self.fail_focus {
            return Err("controller is not focusable".to_string());
        }
        self.controller_focus_count += 1;
        Ok(())
    }

    fn read_keys(&mut self, _timeout_ms: u32) -> Vec<KeyInput> {
        std::mem::take(&mut self.injected_keys)
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_named_keys() {
        let ev = KeyEvent::new(KeyCode::Down, KeyModifiers::NONE);
        assert_eq!(
            translate_key_event(&ev),
            Some(KeyInput::named(MenuKey::ArrowDown))
        );

        let ev = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(
            translate_key_event(&ev),
            Some(KeyInput::named(MenuKey::Escape))
        );
    }

    #[test]
    fn test_translate_characters() {
        let ev = KeyEvent::new(KeyCode::Char('C'), KeyModifiers::SHIFT);
        assert_eq!(translate_key_event(&ev), Some(KeyInput::character('C')));

        let ev = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);
        assert_eq!(translate_key_event(&ev).unwrap().key, MenuKey::Space);
    }

    #[test]
    fn test_translate_drops_chords_and_releases() {
        let ev = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(translate_key_event(&ev), None);

        let mut ev = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        ev.kind = KeyEventKind::Release;
        assert_eq!(translate_key_event(&ev), None);
    }

    #[test]
    fn test_unnamed_key_maps_to_other() {
        let ev = KeyEvent::new(KeyCode::F(5), KeyModifiers::NONE);
        assert_eq!(translate_key_event(&ev), Some(KeyInput::named(MenuKey::Other)));
    }
}
