//! Router Module: key classification and dispatch.
//!
//! The router holds no state. `classify` maps a key press to at most one
//! action; `dispatch` performs it through the focus and visibility modules.
//! Activation is the only path to "selection" and goes through the host.

use crate::error::{MenuError, Result};
use crate::focus;
use crate::menu::PopupMenu;
use crate::text_utils::is_printable;
use crate::types::{ActivationMechanism, KeyInput, MenuEvent, MenuKey};
use crate::visibility;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    ActivateCurrent,
    Close,
    MovePrevious,
    MoveNext,
    MovePreviousAndClose,
    MoveNextAndClose,
    MoveFirst,
    MoveLast,
    Typeahead(char),
    ReturnToControllerAndClose,
}

/// Whether the input event should continue to propagate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    /// Consumed; stop propagation and default handling.
    Handled,
    Propagate,
}

pub fn classify(input: KeyInput) -> Option<MenuAction> {
    let action = match input.key {
        MenuKey::Enter | MenuKey::Space => MenuAction::ActivateCurrent,
        MenuKey::Escape => MenuAction::Close,
        MenuKey::ArrowUp => MenuAction::MovePrevious,
        MenuKey::ArrowDown => MenuAction::MoveNext,
        MenuKey::ArrowLeft => MenuAction::MovePreviousAndClose,
        MenuKey::ArrowRight => MenuAction::MoveNextAndClose,
        MenuKey::Home | MenuKey::PageUp => MenuAction::MoveFirst,
        MenuKey::End | MenuKey::PageDown => MenuAction::MoveLast,
        MenuKey::Tab => MenuAction::ReturnToControllerAndClose,
        MenuKey::Other => match input.character {
            Some(ch) if is_printable(ch) => MenuAction::Typeahead(ch),
            _ => return None,
        },
    };
    Some(action)
}

/// Move to the previous item; with no current item, land on the last.
fn step_previous(menu: &mut PopupMenu) {
    match menu.current() {
        Some(cur) => focus::move_previous(menu, cur),
        None => focus::move_to_last(menu),
    }
}

/// Move to the next item; with no current item, land on the first.
fn step_next(menu: &mut PopupMenu) {
    match menu.current() {
        Some(cur) => focus::move_next(menu, cur),
        None => focus::move_to_first(menu),
    }
}

/// Deliver an activation to the current item's row, falling back to the
/// synthetic mechanism when the native one fails. No current item: nothing
/// to activate.
fn activate_current(menu: &mut PopupMenu) -> Result<()> {
    let Some(item) = menu.current() else {
        return Ok(());
    };

    let mechanism = match menu
        .host
        .dispatch_activation(item.row, ActivationMechanism::Native)
    {
        Ok(()) => ActivationMechanism::Native,
        Err(native) => {
            tracing::warn!(
                handle = menu.handle,
                row = item.row,
                error = native.as_str(),
                "native activation failed, using synthetic fallback"
            );
            menu.host
                .dispatch_activation(item.row, ActivationMechanism::Synthetic)
                .map_err(|synthetic| MenuError::Activation {
                    item: item.index,
                    native,
                    synthetic,
                })?;
            ActivationMechanism::Synthetic
        }
    };

    menu.push_event(MenuEvent::activated(menu.handle, item, mechanism));
    Ok(())
}

fn return_to_controller(menu: &mut PopupMenu) -> Result<()> {
    menu.host.focus_controller().map_err(MenuError::Host)?;
    menu.push_event(MenuEvent::controller_focused(menu.handle));
    Ok(())
}

pub fn dispatch(menu: &mut PopupMenu, action: MenuAction) -> Result<()> {
    tracing::debug!(handle = menu.handle, ?action, "dispatch");
    match action {
        MenuAction::ActivateCurrent => activate_current(menu)?,
        MenuAction::Close => {
            visibility::request_close(menu, true);
        }
        MenuAction::MovePrevious => step_previous(menu),
        MenuAction::MoveNext => step_next(menu),
        MenuAction::MovePreviousAndClose => {
            step_previous(menu);
            visibility::request_close(menu, true);
        }
        MenuAction::MoveNextAndClose => {
            step_next(menu);
            visibility::request_close(menu, true);
        }
        MenuAction::MoveFirst => focus::move_to_first(menu),
        MenuAction::MoveLast => focus::move_to_last(menu),
        MenuAction::Typeahead(ch) => {
            let from = menu.current();
            focus::move_by_typeahead(menu, from, ch);
        }
        MenuAction::ReturnToControllerAndClose => {
            let focused = return_to_controller(menu);
            visibility::request_close(menu, true);
            focused?;
        }
    }
    Ok(())
}

/// Classify and dispatch one key press. A closed menu consumes nothing.
pub fn handle_key(menu: &mut PopupMenu, input: KeyInput) -> Result<KeyDisposition> {
    if !menu.is_open() {
        tracing::debug!(handle = menu.handle, key = ?input.key, "menu closed, key propagated");
        return Ok(KeyDisposition::Propagate);
    }
    match classify(input) {
        Some(action) => {
            dispatch(menu, action)?;
            Ok(KeyDisposition::Handled)
        }
        None => Ok(KeyDisposition::Propagate),
    }
}
