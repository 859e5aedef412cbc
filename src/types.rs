//! Shared types, enums, and constants.
//!
//! All types that cross module boundaries or define the FFI data model live here.

use bitflags::bitflags;

/// Sentinel used in event records for "no item".
pub const NO_ITEM: u32 = u32::MAX;

// ============================================================================
// Keys
// ============================================================================

/// The closed set of keys the menu reacts to by name.
///
/// Printable characters travel separately in [`KeyInput::character`].
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuKey {
    Enter = 0x0101,
    Space = 0x0120,
    Escape = 0x010E,
    ArrowUp = 0x0104,
    ArrowDown = 0x0105,
    ArrowLeft = 0x0102,
    ArrowRight = 0x0103,
    Home = 0x0106,
    End = 0x0107,
    PageUp = 0x0108,
    PageDown = 0x0109,
    Tab = 0x010A,
    /// A key that produces a character (or an unnamed control key).
    Other = 0,
}

impl MenuKey {
    pub fn from_u32(v: u32) -> Option<Self> {
        match v {
            0x0101 => Some(Self::Enter),
            0x0120 => Some(Self::Space),
            0x010E => Some(Self::Escape),
            0x0104 => Some(Self::ArrowUp),
            0x0105 => Some(Self::ArrowDown),
            0x0102 => Some(Self::ArrowLeft),
            0x0103 => Some(Self::ArrowRight),
            0x0106 => Some(Self::Home),
            0x0107 => Some(Self::End),
            0x0108 => Some(Self::PageUp),
            0x0109 => Some(Self::PageDown),
            0x010A => Some(Self::Tab),
            0 => Some(Self::Other),
            _ => None,
        }
    }
}

/// One key press as seen by the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: MenuKey,
    pub character: Option<char>,
}

impl KeyInput {
    pub fn named(key: MenuKey) -> Self {
        Self {
            key,
            character: None,
        }
    }

    pub fn character(ch: char) -> Self {
        // The space bar is a named key for routing purposes.
        if ch == ' ' {
            return Self {
                key: MenuKey::Space,
                character: Some(' '),
            };
        }
        Self {
            key: MenuKey::Other,
            character: Some(ch),
        }
    }

    /// Decode the FFI pair `(key_code, codepoint)`. A zero codepoint means
    /// the key carries no character.
    pub fn from_raw(key_code: u32, codepoint: u32) -> Option<Self> {
        let key = MenuKey::from_u32(key_code)?;
        let character = if codepoint == 0 {
            None
        } else {
            Some(char::from_u32(codepoint)?)
        };
        match (key, character) {
            (MenuKey::Other, Some(ch)) => Some(Self::character(ch)),
            _ => Some(Self { key, character }),
        }
    }
}

// ============================================================================
// Container rows
// ============================================================================

bitflags! {
    /// Per-row facts read from the container element.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RowFlags: u8 {
        /// Row is marked as a separator.
        const SEPARATOR             = 0b0000_0001;
        /// Row already contains a nested interactive element.
        const HAS_INTERACTIVE_CHILD = 0b0000_0010;
    }
}

/// A child row of the container, as described by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSpec {
    pub text: String,
    pub flags: RowFlags,
}

impl RowSpec {
    pub fn item(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            flags: RowFlags::empty(),
        }
    }

    pub fn separator() -> Self {
        Self {
            text: String::new(),
            flags: RowFlags::SEPARATOR,
        }
    }

    pub fn with_flags(mut self, flags: RowFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn is_selectable(&self) -> bool {
        !self
            .flags
            .intersects(RowFlags::SEPARATOR | RowFlags::HAS_INTERACTIVE_CHILD)
    }
}

/// Identity of a menu item: its position in the registry plus the
/// container row that backs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemRef {
    pub index: usize,
    pub row: usize,
}

// ============================================================================
// Interaction state (gate inputs)
// ============================================================================

bitflags! {
    /// Hover/focus facts consulted by the close gate.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct InteractionFlags: u8 {
        const MENU_FOCUS       = 0b0000_0001;
        const MENU_HOVER       = 0b0000_0010;
        const CONTROLLER_HOVER = 0b0000_0100;
    }
}

// ============================================================================
// Activation
// ============================================================================

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationMechanism {
    /// The host's native interaction event.
    Native = 0,
    /// Fallback construction path used when the native one is unavailable.
    Synthetic = 1,
}

/// Which item `open` should land on.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenFocus {
    #[default]
    None = 0,
    First = 1,
    Last = 2,
}

impl OpenFocus {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::None),
            1 => Some(Self::First),
            2 => Some(Self::Last),
            _ => None,
        }
    }
}

// ============================================================================
// Event Types
// ============================================================================

#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEventType {
    None = 0,
    CurrentItem = 1,
    Visibility = 2,
    ControllerExpanded = 3,
    Activated = 4,
    ControllerFocused = 5,
}

/// FFI-safe view notification. Fixed layout, 24 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuEvent {
    pub event_type: u32,
    pub target: u32,
    pub data: [u32; 4],
}

fn index_bits(item: Option<ItemRef>) -> (u32, u32) {
    match item {
        Some(i) => (i.index as u32, i.row as u32),
        None => (NO_ITEM, NO_ITEM),
    }
}

impl MenuEvent {
    pub fn none() -> Self {
        Self {
            event_type: MenuEventType::None as u32,
            target: 0,
            data: [0; 4],
        }
    }

    /// Focus decoration and active-item reference in one record.
    pub fn current_item(target: u32, previous: Option<ItemRef>, current: ItemRef) -> Self {
        let (prev_index, _) = index_bits(previous);
        Self {
            event_type: MenuEventType::CurrentItem as u32,
            target,
            data: [prev_index, current.index as u32, current.row as u32, 0],
        }
    }

    pub fn visibility(target: u32, open: bool, top: u16, left: u16) -> Self {
        Self {
            event_type: MenuEventType::Visibility as u32,
            target,
            data: [open as u32, top as u32, left as u32, 0],
        }
    }

    pub fn controller_expanded(target: u32, expanded: bool) -> Self {
        Self {
            event_type: MenuEventType::ControllerExpanded as u32,
            target,
            data: [expanded as u32, 0, 0, 0],
        }
    }

    pub fn activated(target: u32, item: ItemRef, mechanism: ActivationMechanism) -> Self {
        Self {
            event_type: MenuEventType::Activated as u32,
            target,
            data: [item.index as u32, item.row as u32, mechanism as u32, 0],
        }
    }

    pub fn controller_focused(target: u32) -> Self {
        Self {
            event_type: MenuEventType::ControllerFocused as u32,
            target,
            data: [0; 4],
        }
    }

    pub fn kind(&self) -> Option<MenuEventType> {
        match self.event_type {
            0 => Some(MenuEventType::None),
            1 => Some(MenuEventType::CurrentItem),
            2 => Some(MenuEventType::Visibility),
            3 => Some(MenuEventType::ControllerExpanded),
            4 => Some(MenuEventType::Activated),
            5 => Some(MenuEventType::ControllerFocused),
            _ => None,
        }
    }
}
