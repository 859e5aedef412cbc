//! Construction-time configuration.
//!
//! Defaults reproduce the fixed behaviour: a 300 ms debounced close and a
//! menu placed flush with the controller's left edge.

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const DEFAULT_CLOSE_DELAY_MS: u32 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MenuConfig {
    /// Delay between a hover/focus loss and the gated close attempt.
    pub close_delay_ms: u32,
    /// Horizontal offset of the menu relative to the controller.
    pub left_offset: u16,
    /// Accessible label. Falls back to the controller label when unset.
    pub label: Option<String>,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            close_delay_ms: DEFAULT_CLOSE_DELAY_MS,
            left_offset: 0,
            label: None,
        }
    }
}

impl MenuConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
