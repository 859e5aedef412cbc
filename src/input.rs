//! Input Module: host input pipeline and notification drain.
//!
//! Responsibilities:
//! - Read key presses from the MenuHost
//! - Route each through the key router
//! - Buffer view notifications for the poll-drain model

use crate::error::Result;
use crate::menu::PopupMenu;
use crate::router::{self, KeyDisposition};
use crate::types::MenuEvent;

/// Read pending key presses from the host and route them.
/// Returns the number of keys the menu consumed.
///
/// Every key is routed even if an earlier one failed to activate; the first
/// such failure is returned once the batch is done. Keys that arrive after
/// the menu closed in the same batch are not consumed.
pub fn read_input(menu: &mut PopupMenu, timeout_ms: u32) -> Result<usize> {
    let keys = menu.host.read_keys(timeout_ms);
    let mut handled = 0;
    let mut first_error = None;

    for key in keys {
        match router::handle_key(menu, key) {
            Ok(KeyDisposition::Handled) => handled += 1,
            Ok(KeyDisposition::Propagate) => {}
            Err(e) => {
                tracing::warn!(handle = menu.handle, error = %e, "key handling failed");
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(handled),
    }
}

/// Drain one notification from the buffer. Returns None if empty.
pub fn next_event(menu: &mut PopupMenu) -> Option<MenuEvent> {
    if menu.event_buffer.is_empty() {
        None
    } else {
        Some(menu.event_buffer.remove(0))
    }
}
