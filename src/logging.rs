//! Debug logging setup.
//!
//! The core logs through `tracing`. The first `set_debug` call installs a
//! stderr subscriber whose filter sits behind a reload handle; every later
//! call swaps that filter in place, so debug mode can be toggled any number
//! of times. `MENU_BUTTON_LOG` overrides the filter.

use std::sync::Mutex;

use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter, Registry};

use crate::error::{MenuError, Result};

pub const LOG_ENV_VAR: &str = "MENU_BUTTON_LOG";

static FILTER_HANDLE: Mutex<Option<reload::Handle<EnvFilter, Registry>>> = Mutex::new(None);

fn filter(debug: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| {
        if debug {
            EnvFilter::new("menu_button=debug")
        } else {
            EnvFilter::new("warn")
        }
    })
}

/// Turn debug logging on or off.
///
/// Fails if some other global subscriber was installed before the first call.
pub fn set_debug(debug: bool) -> Result<()> {
    let mut slot = FILTER_HANDLE
        .lock()
        .map_err(|_| MenuError::LockPoisoned("log filter"))?;

    if let Some(handle) = slot.as_ref() {
        return handle
            .reload(filter(debug))
            .map_err(|e| MenuError::Logging(e.to_string()));
    }

    let (filter_layer, handle) = reload::Layer::new(filter(debug));
    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .try_init()
        .map_err(|e| MenuError::Logging(e.to_string()))?;
    *slot = Some(handle);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn test_filter_levels() {
        if std::env::var_os(LOG_ENV_VAR).is_some() {
            return;
        }
        assert_eq!(filter(true).max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(filter(false).max_level_hint(), Some(LevelFilter::WARN));
    }
}
