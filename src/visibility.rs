//! Visibility Module: open/closed state and the close gate.
//!
//! Responsibilities:
//! - Open (position below the controller, mark it expanded)
//! - Gated and forced close
//! - Hover/focus bookkeeping for the menu and its controller
//! - Debounced close, advanced by delta time like every other timer in the
//!   core (no threads, no wall clock)

use crate::focus;
use crate::menu::{PendingClose, PopupMenu};
use crate::types::{InteractionFlags, MenuEvent, OpenFocus};

/// `Closed → Open`, optionally landing on the first or last item.
pub fn open(menu: &mut PopupMenu, focus_on: OpenFocus) {
    // A re-open must not be undone by a close scheduled before it.
    menu.visibility.pending_close = None;

    if !menu.visibility.open {
        let top = menu.host.controller_height();
        let left = menu.config.left_offset;
        menu.visibility.open = true;
        menu.push_event(MenuEvent::visibility(menu.handle, true, top, left));
        menu.push_event(MenuEvent::controller_expanded(menu.handle, true));
        tracing::debug!(handle = menu.handle, top, left, "menu opened");
    }

    match focus_on {
        OpenFocus::None => {}
        OpenFocus::First => focus::move_to_first(menu),
        OpenFocus::Last => focus::move_to_last(menu),
    }
}

/// Close the menu. Unless `force` is set, the close only happens when the
/// menu has neither focus nor hover and the controller has no hover.
/// Returns whether the menu transitioned to closed.
pub fn request_close(menu: &mut PopupMenu, force: bool) -> bool {
    if !force {
        let interaction = menu.interaction();
        if !interaction.is_empty() {
            tracing::debug!(handle = menu.handle, ?interaction, "close suppressed by gate");
            return false;
        }
    }

    menu.visibility.pending_close = None;
    if !menu.visibility.open {
        return false;
    }

    menu.visibility.open = false;
    menu.push_event(MenuEvent::visibility(menu.handle, false, 0, 0));
    menu.push_event(MenuEvent::controller_expanded(menu.handle, false));
    tracing::debug!(handle = menu.handle, force, "menu closed");
    true
}

pub fn on_pointer_enter(menu: &mut PopupMenu) {
    menu.nav.has_hover = true;
    cancel_pending_close(menu);
}

pub fn on_pointer_leave(menu: &mut PopupMenu) {
    menu.nav.has_hover = false;
    schedule_close(menu);
}

pub fn on_focus(menu: &mut PopupMenu) {
    menu.nav.has_focus = true;
}

pub fn on_blur(menu: &mut PopupMenu) {
    menu.nav.has_focus = false;
    schedule_close(menu);
}

/// Record the controller's hover flag. Losing hover starts the same
/// debounced close as the pointer leaving the menu.
pub fn set_controller_hover(menu: &mut PopupMenu, hover: bool) {
    menu.controller.has_hover = hover;
    if hover {
        cancel_pending_close(menu);
    } else {
        schedule_close(menu);
    }
}

/// Start (or restart) the debounced close. Replaces any pending one.
pub(crate) fn schedule_close(menu: &mut PopupMenu) {
    if !menu.visibility.open {
        return;
    }
    menu.visibility.pending_close = Some(PendingClose { elapsed_ms: 0.0 });
    tracing::debug!(
        handle = menu.handle,
        delay_ms = menu.config.close_delay_ms,
        "close scheduled"
    );
}

pub fn cancel_pending_close(menu: &mut PopupMenu) {
    if menu.visibility.pending_close.take().is_some() {
        tracing::debug!(handle = menu.handle, "pending close cancelled");
    }
}

/// Advance the debounced close by `elapsed_ms`. When the delay is reached the
/// timer is consumed and a gated close is attempted. Returns whether the menu
/// closed.
pub fn tick(menu: &mut PopupMenu, elapsed_ms: f32) -> bool {
    let delay = menu.config.close_delay_ms as f32;
    let Some(pending) = menu.visibility.pending_close.as_mut() else {
        return false;
    };

    // Non-positive (or NaN) deltas add nothing but a zero delay still fires.
    if elapsed_ms > 0.0 {
        pending.elapsed_ms += elapsed_ms;
    }
    if pending.elapsed_ms < delay {
        return false;
    }

    menu.visibility.pending_close = None;
    tracing::debug!(handle = menu.handle, "close timer fired");
    request_close(menu, false)
}

/// True when nothing holds the menu open.
pub fn gate_allows_close(menu: &PopupMenu) -> bool {
    menu.interaction() == InteractionFlags::empty()
}
