//! PopupMenu: one menu-button widget instance.
//!
//! The struct owns all mutable state of a single popup menu. State fields are
//! crate-private: navigation state is written only by the `focus` module,
//! visibility state only by the `visibility` module.

use crate::config::MenuConfig;
use crate::error::Result;
use crate::host::MenuHost;
use crate::registry::ItemRegistry;
use crate::types::{InteractionFlags, ItemRef, MenuEvent, RowSpec};

#[derive(Debug, Clone, Default)]
pub struct NavigationState {
    pub(crate) current: Option<ItemRef>,
    pub(crate) has_focus: bool,
    pub(crate) has_hover: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PendingClose {
    pub(crate) elapsed_ms: f32,
}

#[derive(Debug, Clone, Default)]
pub struct VisibilityState {
    pub(crate) open: bool,
    /// At most one outstanding debounced close.
    pub(crate) pending_close: Option<PendingClose>,
}

/// The controlling button as far as the menu is concerned.
#[derive(Debug, Clone, Default)]
pub struct ControllerState {
    pub label: String,
    pub(crate) has_hover: bool,
}

pub struct PopupMenu {
    pub(crate) handle: u32,
    pub(crate) registry: ItemRegistry,
    pub(crate) nav: NavigationState,
    pub(crate) visibility: VisibilityState,
    pub(crate) controller: ControllerState,
    pub(crate) config: MenuConfig,
    pub(crate) host: Box<dyn MenuHost>,
    pub(crate) event_buffer: Vec<MenuEvent>,
}

impl std::fmt::Debug for PopupMenu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PopupMenu")
            .field("handle", &self.handle)
            .field("items", &self.registry.len())
            .field("nav", &self.nav)
            .field("visibility", &self.visibility)
            .field("controller", &self.controller)
            .finish_non_exhaustive()
    }
}

impl PopupMenu {
    pub fn handle(&self) -> u32 {
        self.handle
    }

    pub fn registry(&self) -> &ItemRegistry {
        &self.registry
    }

    pub fn current(&self) -> Option<ItemRef> {
        self.nav.current
    }

    pub fn is_open(&self) -> bool {
        self.visibility.open
    }

    pub fn has_pending_close(&self) -> bool {
        self.visibility.pending_close.is_some()
    }

    pub fn config(&self) -> &MenuConfig {
        &self.config
    }

    /// Accessible name of the menu: the configured label, else the
    /// controller's label.
    pub fn label(&self) -> &str {
        self.config
            .label
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or(self.controller.label.as_str())
    }

    /// Snapshot of the inputs to the close gate.
    pub fn interaction(&self) -> InteractionFlags {
        let mut flags = InteractionFlags::empty();
        flags.set(InteractionFlags::MENU_FOCUS, self.nav.has_focus);
        flags.set(InteractionFlags::MENU_HOVER, self.nav.has_hover);
        flags.set(InteractionFlags::CONTROLLER_HOVER, self.controller.has_hover);
        flags
    }

    pub(crate) fn push_event(&mut self, event: MenuEvent) {
        self.event_buffer.push(event);
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Collects the container's rows and the controller description before the
/// widget exists.
#[derive(Debug, Clone, Default)]
pub struct MenuBuilder {
    rows: Vec<RowSpec>,
    controller_label: String,
    config: MenuConfig,
}

impl MenuBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(mut self, row: RowSpec) -> Self {
        self.rows.push(row);
        self
    }

    pub fn rows(mut self, rows: impl IntoIterator<Item = RowSpec>) -> Self {
        self.rows.extend(rows);
        self
    }

    pub fn controller_label(mut self, label: impl Into<String>) -> Self {
        self.controller_label = label.into();
        self
    }

    pub fn config(mut self, config: MenuConfig) -> Self {
        self.config = config;
        self
    }

    pub(crate) fn push_row(&mut self, row: RowSpec) {
        self.rows.push(row);
    }

    pub(crate) fn set_controller_label(&mut self, label: String) {
        self.controller_label = label;
    }

    pub(crate) fn set_config(&mut self, config: MenuConfig) {
        self.config = config;
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Build the widget. Fails without producing anything when the container
    /// has no rows.
    pub fn build(self, handle: u32, host: Box<dyn MenuHost>) -> Result<PopupMenu> {
        let registry = ItemRegistry::build(&self.rows)?;
        tracing::debug!(
            handle,
            rows = self.rows.len(),
            items = registry.len(),
            "menu built"
        );

        Ok(PopupMenu {
            handle,
            registry,
            nav: NavigationState::default(),
            visibility: VisibilityState::default(),
            controller: ControllerState {
                label: self.controller_label,
                has_hover: false,
            },
            config: self.config,
            host,
            event_buffer: Vec::new(),
        })
    }
}
