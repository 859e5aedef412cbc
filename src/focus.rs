//! Focus Module: current-item state machine.
//!
//! Responsibilities:
//! - Own `current ∈ {none} ∪ item`
//! - First/last, previous/next (wrapping) and typeahead moves
//! - Emit one atomic CurrentItem notification per successful move
//!
//! Every move funnels through `set_focus`, so `current` is always a registry
//! member or none.

use crate::menu::PopupMenu;
use crate::text_utils::char_key;
use crate::types::{ItemRef, MenuEvent};

/// Make `item` the current item. Clears the previous marking and announces
/// decoration + active item in a single event. Non-members are ignored.
pub(crate) fn set_focus(menu: &mut PopupMenu, item: ItemRef) -> bool {
    if !menu.registry.contains(item) {
        tracing::debug!(handle = menu.handle, ?item, "set_focus: not a menu item");
        return false;
    }

    let previous = menu.nav.current.replace(item);
    let event = MenuEvent::current_item(menu.handle, previous, item);
    menu.push_event(event);
    tracing::debug!(handle = menu.handle, index = item.index, "current item");
    true
}

pub fn move_to_first(menu: &mut PopupMenu) {
    if let Some(first) = menu.registry.first() {
        set_focus(menu, first);
    }
}

pub fn move_to_last(menu: &mut PopupMenu) {
    if let Some(last) = menu.registry.last() {
        set_focus(menu, last);
    }
}

/// Select the item before `from`, wrapping from the first item to the last.
pub fn move_previous(menu: &mut PopupMenu, from: ItemRef) {
    let Some(idx) = menu.registry.index_of(from) else {
        return;
    };
    let len = menu.registry.len();
    let target = if idx == 0 { len - 1 } else { idx - 1 };
    if let Some(item) = menu.registry.get(target) {
        set_focus(menu, item);
    }
}

/// Select the item after `from`, wrapping from the last item to the first.
pub fn move_next(menu: &mut PopupMenu, from: ItemRef) {
    let Some(idx) = menu.registry.index_of(from) else {
        return;
    };
    let target = (idx + 1) % menu.registry.len();
    if let Some(item) = menu.registry.get(target) {
        set_focus(menu, item);
    }
}

/// Move to the next item whose label starts with `ch` (case-insensitive).
///
/// The scan starts just after `from` and runs to the end; only when that
/// finds nothing does it restart at index 0 and stop before the start
/// position. Returns whether a match was found.
pub fn move_by_typeahead(menu: &mut PopupMenu, from: Option<ItemRef>, ch: char) -> bool {
    let len = menu.registry.len();
    if len == 0 {
        return false;
    }

    let key = char_key(ch);
    let mut start = from
        .and_then(|item| menu.registry.index_of(item))
        .map_or(0, |i| i + 1);
    if start == len {
        start = 0;
    }

    let found = menu
        .registry
        .find_first_char(start, &key)
        .or_else(|| menu.registry.find_first_char(0, &key).filter(|&i| i < start));

    match found.and_then(|i| menu.registry.get(i)) {
        Some(item) => set_focus(menu, item),
        None => {
            tracing::debug!(handle = menu.handle, %ch, "typeahead: no match");
            false
        }
    }
}
