//! Menu Button: Native Core FFI Entry Points
//!
//! The Rust API lives in the modules below. This file adds the `extern "C"`
//! surface a host runtime drives over the C ABI. Each entry point:
//! 1. Wraps its body in `catch_unwind`
//! 2. Validates inputs at the boundary
//! 3. Delegates to the appropriate module function
//! 4. Returns a status code
//!
//! No widget logic lives here.

// Raw-pointer arguments are part of the FFI contract; pointers are
// null-checked inside each body before they are dereferenced.
#![allow(clippy::not_unsafe_ptr_arg_deref)]

pub mod config;
mod context;
pub mod error;
pub mod focus;
pub mod host;
pub mod input;
pub mod logging;
pub mod menu;
pub mod registry;
pub mod router;
mod text_utils;
pub mod types;
pub mod visibility;

use std::panic::{catch_unwind, AssertUnwindSafe};

pub use config::MenuConfig;
pub use error::{MenuError, Result};
pub use host::{CrosstermHost, HeadlessHost, MenuHost};
pub use menu::{MenuBuilder, PopupMenu};
pub use router::KeyDisposition;
pub use types::{
    ActivationMechanism, ItemRef, KeyInput, MenuEvent, MenuEventType, MenuKey, OpenFocus,
    RowFlags, RowSpec,
};

use context::{context, destroy_context, init_context, set_last_error, PendingMenu};

// ============================================================================
// Safety wrapper: every FFI entry point uses this pattern
// ============================================================================

/// Wrap an FFI function body. Returns the body's value on success, -1 on
/// error, -2 on panic.
fn ffi_wrap(f: impl FnOnce() -> Result<i32>) -> i32 {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(code)) => code,
        Ok(Err(e)) => {
            set_last_error(e.to_string());
            -1
        }
        Err(_) => {
            set_last_error("internal panic".to_string());
            -2
        }
    }
}

/// Wrap an FFI function that returns a u32 handle. Returns 0 on error.
fn ffi_wrap_handle(f: impl FnOnce() -> Result<u32>) -> u32 {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(handle)) => handle,
        Ok(Err(e)) => {
            set_last_error(e.to_string());
            0
        }
        Err(_) => {
            set_last_error("internal panic".to_string());
            0
        }
    }
}

/// Borrow `len` bytes at `ptr` as UTF-8. A null pointer or zero length is the
/// empty string.
fn read_utf8(ptr: *const u8, len: u32) -> Result<String> {
    if ptr.is_null() || len == 0 {
        return Ok(String::new());
    }
    let slice = unsafe { std::slice::from_raw_parts(ptr, len as usize) };
    std::str::from_utf8(slice)
        .map(str::to_string)
        .map_err(|_| MenuError::InvalidArgument("text is not valid UTF-8".to_string()))
}

// ============================================================================
// Lifecycle
// ============================================================================

#[no_mangle]
pub extern "C" fn menu_init() -> i32 {
    ffi_wrap(|| {
        init_context()?;
        Ok(0)
    })
}

/// Destroy the context and every menu and pending builder it owns.
#[no_mangle]
pub extern "C" fn menu_shutdown() -> i32 {
    ffi_wrap(|| {
        let dropped = destroy_context()?;
        tracing::debug!(dropped, "context destroyed");
        Ok(0)
    })
}

// ============================================================================
// Construction
// ============================================================================

/// Start describing a menu. The returned handle identifies the builder and,
/// after `menu_create`, the menu itself.
#[no_mangle]
pub extern "C" fn menu_builder_create() -> u32 {
    ffi_wrap_handle(|| {
        let mut ctx = context()?;
        let handle = ctx.allocate_handle();
        ctx.pending.insert(handle, PendingMenu::default());
        Ok(handle)
    })
}

/// Append a container row. `flags` is a `RowFlags` bit set.
#[no_mangle]
pub extern "C" fn menu_builder_add_row(handle: u32, ptr: *const u8, len: u32, flags: u8) -> i32 {
    ffi_wrap(|| {
        let flags = RowFlags::from_bits(flags)
            .ok_or_else(|| MenuError::InvalidArgument(format!("unknown row flags: {flags:#04x}")))?;
        let text = read_utf8(ptr, len)?;

        let mut ctx = context()?;
        let pending = ctx.pending_mut(handle)?;
        pending.builder.push_row(RowSpec::item(text).with_flags(flags));
        Ok(pending.builder.row_count() as i32)
    })
}

#[no_mangle]
pub extern "C" fn menu_builder_set_controller(
    handle: u32,
    label_ptr: *const u8,
    label_len: u32,
    height: u16,
) -> i32 {
    ffi_wrap(|| {
        let label = read_utf8(label_ptr, label_len)?;

        let mut ctx = context()?;
        let pending = ctx.pending_mut(handle)?;
        pending.builder.set_controller_label(label);
        pending.controller_height = height;
        Ok(0)
    })
}

/// Replace the builder's config with one parsed from JSON.
#[no_mangle]
pub extern "C" fn menu_builder_set_config(handle: u32, json_ptr: *const u8, json_len: u32) -> i32 {
    ffi_wrap(|| {
        let json = read_utf8(json_ptr, json_len)?;
        let config = MenuConfig::from_json(&json)?;

        let mut ctx = context()?;
        ctx.pending_mut(handle)?.builder.set_config(config);
        Ok(0)
    })
}

#[no_mangle]
pub extern "C" fn menu_builder_discard(handle: u32) -> i32 {
    ffi_wrap(|| {
        let mut ctx = context()?;
        ctx.pending
            .remove(&handle)
            .ok_or(MenuError::InvalidHandle(handle))?;
        Ok(0)
    })
}

/// Turn a builder into a live menu under the same handle. The builder is
/// consumed even when the container turns out to be unusable.
#[no_mangle]
pub extern "C" fn menu_create(handle: u32) -> i32 {
    ffi_wrap(|| {
        let mut ctx = context()?;
        let pending = ctx
            .pending
            .remove(&handle)
            .ok_or(MenuError::InvalidHandle(handle))?;

        let host = Box::new(HeadlessHost::new(pending.controller_height));
        let menu = pending.builder.build(handle, host)?;
        let count = menu.registry().len();
        ctx.menus.insert(handle, menu);
        Ok(count as i32)
    })
}

#[no_mangle]
pub extern "C" fn menu_destroy(handle: u32) -> i32 {
    ffi_wrap(|| {
        let mut ctx = context()?;
        ctx.menus
            .remove(&handle)
            .ok_or(MenuError::InvalidHandle(handle))?;
        tracing::debug!(handle, "menu destroyed");
        Ok(0)
    })
}

// ============================================================================
// Visibility
// ============================================================================

/// `initial_focus`: 0 = leave the current item, 1 = first item, 2 = last item.
#[no_mangle]
pub extern "C" fn menu_open(handle: u32, initial_focus: u8) -> i32 {
    ffi_wrap(|| {
        let focus_on = OpenFocus::from_u8(initial_focus)
            .ok_or_else(|| MenuError::InvalidArgument(format!("invalid open focus: {initial_focus}")))?;
        let mut ctx = context()?;
        visibility::open(ctx.menu_mut(handle)?, focus_on);
        Ok(0)
    })
}

/// Returns 1 if the menu closed, 0 if it was already closed or the gate held
/// it open.
#[no_mangle]
pub extern "C" fn menu_close(handle: u32, force: u8) -> i32 {
    ffi_wrap(|| {
        let mut ctx = context()?;
        let closed = visibility::request_close(ctx.menu_mut(handle)?, force != 0);
        Ok(i32::from(closed))
    })
}

#[no_mangle]
pub extern "C" fn menu_pointer_enter(handle: u32) -> i32 {
    ffi_wrap(|| {
        let mut ctx = context()?;
        visibility::on_pointer_enter(ctx.menu_mut(handle)?);
        Ok(0)
    })
}

#[no_mangle]
pub extern "C" fn menu_pointer_leave(handle: u32) -> i32 {
    ffi_wrap(|| {
        let mut ctx = context()?;
        visibility::on_pointer_leave(ctx.menu_mut(handle)?);
        Ok(0)
    })
}

#[no_mangle]
pub extern "C" fn menu_focus(handle: u32) -> i32 {
    ffi_wrap(|| {
        let mut ctx = context()?;
        visibility::on_focus(ctx.menu_mut(handle)?);
        Ok(0)
    })
}

#[no_mangle]
pub extern "C" fn menu_blur(handle: u32) -> i32 {
    ffi_wrap(|| {
        let mut ctx = context()?;
        visibility::on_blur(ctx.menu_mut(handle)?);
        Ok(0)
    })
}

#[no_mangle]
pub extern "C" fn menu_set_controller_hover(handle: u32, hover: u8) -> i32 {
    ffi_wrap(|| {
        let mut ctx = context()?;
        visibility::set_controller_hover(ctx.menu_mut(handle)?, hover != 0);
        Ok(0)
    })
}

#[no_mangle]
pub extern "C" fn menu_cancel_pending_close(handle: u32) -> i32 {
    ffi_wrap(|| {
        let mut ctx = context()?;
        visibility::cancel_pending_close(ctx.menu_mut(handle)?);
        Ok(0)
    })
}

/// Advance the close timer by `elapsed_ms`. Returns 1 if the menu closed.
#[no_mangle]
pub extern "C" fn menu_tick(handle: u32, elapsed_ms: f32) -> i32 {
    ffi_wrap(|| {
        if !elapsed_ms.is_finite() {
            return Err(MenuError::InvalidArgument(format!(
                "elapsed time must be finite, got {elapsed_ms}"
            )));
        }
        let mut ctx = context()?;
        let closed = visibility::tick(ctx.menu_mut(handle)?, elapsed_ms);
        Ok(i32::from(closed))
    })
}

// ============================================================================
// Input
// ============================================================================

/// Route one key press. `codepoint` is the typed character, 0 for none.
/// Returns 1 if the menu consumed the key, 0 if it should propagate.
#[no_mangle]
pub extern "C" fn menu_handle_key(handle: u32, key_code: u32, codepoint: u32) -> i32 {
    ffi_wrap(|| {
        let input = KeyInput::from_raw(key_code, codepoint).ok_or_else(|| {
            MenuError::InvalidArgument(format!("unknown key code: {key_code:#06x}"))
        })?;
        let mut ctx = context()?;
        let disposition = router::handle_key(ctx.menu_mut(handle)?, input)?;
        Ok(i32::from(disposition == KeyDisposition::Handled))
    })
}

/// Read and route pending host input. Returns the number of keys consumed.
#[no_mangle]
pub extern "C" fn menu_read_input(handle: u32, timeout_ms: u32) -> i32 {
    ffi_wrap(|| {
        let mut ctx = context()?;
        let count = input::read_input(ctx.menu_mut(handle)?, timeout_ms)?;
        Ok(count as i32)
    })
}

/// Drain one notification into `out`. Returns 1 if one was written, 0 if the
/// buffer is empty.
#[no_mangle]
pub extern "C" fn menu_next_event(handle: u32, out: *mut MenuEvent) -> i32 {
    ffi_wrap(|| {
        let mut ctx = context()?;
        match input::next_event(ctx.menu_mut(handle)?) {
            Some(evt) => {
                if !out.is_null() {
                    unsafe {
                        *out = evt;
                    }
                }
                Ok(1)
            }
            None => Ok(0),
        }
    })
}

// ============================================================================
// Queries
// ============================================================================

/// Index of the current item, or -1 when there is none (check
/// `menu_get_last_error` to tell that apart from a failure).
#[no_mangle]
pub extern "C" fn menu_get_current(handle: u32) -> i32 {
    ffi_wrap(|| {
        let ctx = context()?;
        let menu = ctx.menu(handle)?;
        Ok(menu.current().map_or(-1, |item| item.index as i32))
    })
}

#[no_mangle]
pub extern "C" fn menu_is_open(handle: u32) -> i32 {
    ffi_wrap(|| {
        let ctx = context()?;
        Ok(i32::from(ctx.menu(handle)?.is_open()))
    })
}

#[no_mangle]
pub extern "C" fn menu_get_item_count(handle: u32) -> i32 {
    ffi_wrap(|| {
        let ctx = context()?;
        Ok(ctx.menu(handle)?.registry().len() as i32)
    })
}

/// Copy the accessible label into `buffer`, NUL-terminated if space allows.
/// Returns the number of bytes copied. With a null `buffer` nothing is
/// copied and the full label length in bytes is returned instead, so hosts
/// can size their buffer first.
#[no_mangle]
pub extern "C" fn menu_get_label(handle: u32, buffer: *mut u8, buffer_len: u32) -> i32 {
    ffi_wrap(|| {
        let ctx = context()?;
        let label = ctx.menu(handle)?.label().as_bytes();
        if buffer.is_null() {
            return Ok(label.len() as i32);
        }

        let copy_len = label.len().min(buffer_len as usize);
        if copy_len > 0 {
            unsafe {
                std::ptr::copy_nonoverlapping(label.as_ptr(), buffer, copy_len);
            }
        }
        if (buffer_len as usize) > copy_len {
            unsafe {
                *buffer.add(copy_len) = 0;
            }
        }

        Ok(copy_len as i32)
    })
}

// ============================================================================
// Diagnostics
// ============================================================================

/// NUL-terminated message of the last failed call, or null. Owned by the
/// library; valid until the next failure or `menu_clear_error`.
#[no_mangle]
pub extern "C" fn menu_get_last_error() -> *const std::os::raw::c_char {
    catch_unwind(context::last_error_ptr).unwrap_or(std::ptr::null())
}

#[no_mangle]
pub extern "C" fn menu_clear_error() {
    let _ = catch_unwind(context::clear_last_error);
}

/// Toggle debug logging to stderr. Logging is process-wide, so this works
/// before `menu_init` and can be switched any number of times.
#[no_mangle]
pub extern "C" fn menu_set_debug(enabled: u8) -> i32 {
    ffi_wrap(|| {
        logging::set_debug(enabled != 0)?;
        Ok(0)
    })
}

/// Every string crossing the boundary is either library-owned
/// (`menu_get_last_error`) or copied into a caller buffer (`menu_get_label`),
/// so there is nothing to free. Kept so hosts can bind a stable symbol set.
#[no_mangle]
pub extern "C" fn menu_free_string(_ptr: *const u8) {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;
    use std::sync::Mutex;

    // The context is process-global; FFI tests take turns.
    static FFI_LOCK: Mutex<()> = Mutex::new(());

    fn with_context(f: impl FnOnce()) {
        let _guard = FFI_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        menu_shutdown();
        assert_eq!(menu_init(), 0);
        f();
        assert_eq!(menu_shutdown(), 0);
    }

    fn add_row(handle: u32, text: &str, flags: u8) -> i32 {
        menu_builder_add_row(handle, text.as_ptr(), text.len() as u32, flags)
    }

    fn fruit_menu() -> u32 {
        let handle = menu_builder_create();
        assert_ne!(handle, 0);
        add_row(handle, "Apple", 0);
        add_row(handle, "", RowFlags::SEPARATOR.bits());
        add_row(handle, "Banana", 0);
        add_row(handle, "Cherry", 0);
        let label = "Fruit";
        assert_eq!(
            menu_builder_set_controller(handle, label.as_ptr(), label.len() as u32, 3),
            0
        );
        assert_eq!(menu_create(handle), 3);
        handle
    }

    fn last_error() -> String {
        let ptr = menu_get_last_error();
        assert!(!ptr.is_null(), "expected an error message");
        unsafe { CStr::from_ptr(ptr) }
            .to_str()
            .unwrap()
            .to_string()
    }

    fn drain(handle: u32) -> Vec<MenuEvent> {
        let mut events = Vec::new();
        let mut evt = MenuEvent::none();
        while menu_next_event(handle, &mut evt) == 1 {
            events.push(evt);
        }
        events
    }

    #[test]
    fn test_calls_before_init_fail() {
        let _guard = FFI_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        menu_shutdown();
        assert_eq!(menu_builder_create(), 0);
        assert!(last_error().contains("not initialized"));
        assert_eq!(menu_is_open(1), -1);
    }

    #[test]
    fn test_double_init_is_error() {
        with_context(|| {
            assert_eq!(menu_init(), -1);
            assert!(last_error().contains("already initialized"));
        });
    }

    #[test]
    fn test_last_error_null_terminated_and_clearable() {
        with_context(|| {
            assert_eq!(menu_destroy(999), -1);
            assert!(last_error().contains("invalid handle: 999"));

            menu_clear_error();
            assert!(menu_get_last_error().is_null());
        });
    }

    #[test]
    fn test_builder_lifecycle() {
        with_context(|| {
            let handle = fruit_menu();
            assert_eq!(menu_get_item_count(handle), 3);
            assert_eq!(menu_is_open(handle), 0);
            assert_eq!(menu_get_current(handle), -1);

            // The builder is gone once the menu exists.
            assert_eq!(add_row(handle, "Date", 0), -1);
            assert_eq!(menu_destroy(handle), 0);
            assert_eq!(menu_is_open(handle), -1);
        });
    }

    #[test]
    fn test_empty_container_is_configuration_error() {
        with_context(|| {
            let handle = menu_builder_create();
            assert_eq!(menu_create(handle), -1);
            assert!(last_error().contains("configuration error"));
            assert_eq!(menu_is_open(handle), -1);
        });
    }

    #[test]
    fn test_discard_builder() {
        with_context(|| {
            let handle = menu_builder_create();
            assert_eq!(menu_builder_discard(handle), 0);
            assert_eq!(menu_create(handle), -1);
        });
    }

    #[test]
    fn test_invalid_arguments_are_rejected() {
        with_context(|| {
            let handle = menu_builder_create();
            let bad = [0xffu8, 0xfe];
            assert_eq!(menu_builder_add_row(handle, bad.as_ptr(), 2, 0), -1);
            assert!(last_error().contains("UTF-8"));
            assert_eq!(add_row(handle, "Apple", 0x80), -1);

            assert_eq!(menu_create(handle), -1);
            let handle = fruit_menu();
            assert_eq!(menu_open(handle, 7), -1);
            assert_eq!(menu_handle_key(handle, 0x0999, 0), -1);
            assert_eq!(menu_tick(handle, f32::NAN), -1);
        });
    }

    #[test]
    fn test_config_json() {
        with_context(|| {
            let handle = menu_builder_create();
            add_row(handle, "Apple", 0);
            let json = r#"{"close_delay_ms": 100, "label": "Fruit menu"}"#;
            assert_eq!(
                menu_builder_set_config(handle, json.as_ptr(), json.len() as u32),
                0
            );
            let bad = r#"{"delay": 1}"#;
            assert_eq!(
                menu_builder_set_config(handle, bad.as_ptr(), bad.len() as u32),
                -1
            );
            assert_eq!(menu_create(handle), 1);

            let mut buf = [0u8; 32];
            let n = menu_get_label(handle, buf.as_mut_ptr(), buf.len() as u32);
            assert_eq!(&buf[..n as usize], b"Fruit menu");
            assert_eq!(buf[n as usize], 0);

            menu_open(handle, 0);
            menu_pointer_leave(handle);
            assert_eq!(menu_tick(handle, 99.0), 0);
            assert_eq!(menu_tick(handle, 1.0), 1);
        });
    }

    #[test]
    fn test_label_falls_back_to_controller() {
        with_context(|| {
            let handle = fruit_menu();
            let mut buf = [0u8; 3];
            assert_eq!(menu_get_label(handle, buf.as_mut_ptr(), 3), 3);
            assert_eq!(&buf, b"Fru");
        });
    }

    #[test]
    fn test_open_navigate_activate() {
        with_context(|| {
            let handle = fruit_menu();
            assert_eq!(menu_open(handle, 1), 0);
            let events = drain(handle);
            assert_eq!(events[0].kind(), Some(MenuEventType::Visibility));
            // Opens below a controller of height 3
            assert_eq!(events[0].data[1], 3);
            assert_eq!(menu_get_current(handle), 0);

            assert_eq!(menu_handle_key(handle, MenuKey::ArrowDown as u32, 0), 1);
            assert_eq!(menu_get_current(handle), 1);

            assert_eq!(menu_handle_key(handle, 0, 'c' as u32), 1);
            assert_eq!(menu_get_current(handle), 2);

            assert_eq!(menu_handle_key(handle, MenuKey::Other as u32, 0), 0);

            drain(handle);
            assert_eq!(menu_handle_key(handle, MenuKey::Enter as u32, 0), 1);
            let events = drain(handle);
            assert_eq!(events[0].kind(), Some(MenuEventType::Activated));
            // Cherry sits in row 3, after the separator
            assert_eq!(events[0].data[..3], [2, 3, ActivationMechanism::Native as u32]);
            // Activation alone leaves the menu open; Escape closes it
            assert_eq!(menu_is_open(handle), 1);
            assert_eq!(menu_handle_key(handle, MenuKey::Escape as u32, 0), 1);
            assert_eq!(menu_is_open(handle), 0);
        });
    }

    #[test]
    fn test_gate_over_ffi() {
        with_context(|| {
            let handle = fruit_menu();
            menu_open(handle, 0);
            menu_focus(handle);
            assert_eq!(menu_close(handle, 0), 0);
            menu_blur(handle);
            menu_set_controller_hover(handle, 1);
            assert_eq!(menu_close(handle, 0), 0);
            assert_eq!(menu_close(handle, 1), 1);
            assert_eq!(menu_close(handle, 1), 0);
        });
    }

    #[test]
    fn test_cancel_pending_close() {
        with_context(|| {
            let handle = fruit_menu();
            menu_open(handle, 0);
            menu_pointer_enter(handle);
            menu_pointer_leave(handle);
            assert_eq!(menu_cancel_pending_close(handle), 0);
            assert_eq!(menu_tick(handle, 1000.0), 0);
            assert_eq!(menu_is_open(handle), 1);
        });
    }

    #[test]
    fn test_headless_read_input_is_empty() {
        with_context(|| {
            let handle = fruit_menu();
            assert_eq!(menu_read_input(handle, 0), 0);
        });
    }

    #[test]
    fn test_set_debug_toggles_repeatedly() {
        let _guard = FFI_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        if std::env::var_os(logging::LOG_ENV_VAR).is_some() {
            return;
        }
        let debug_enabled = || tracing::enabled!(target: "menu_button", tracing::Level::DEBUG);

        assert_eq!(menu_set_debug(0), 0);
        assert!(!debug_enabled());
        assert_eq!(menu_set_debug(1), 0);
        assert!(debug_enabled());
        assert_eq!(menu_set_debug(0), 0);
        assert!(!debug_enabled());
        assert_eq!(menu_set_debug(1), 0);
        assert!(debug_enabled());
        assert_eq!(menu_set_debug(0), 0);
    }

    #[test]
    fn test_label_size_query_with_null_buffer() {
        with_context(|| {
            let handle = fruit_menu();
            assert_eq!(menu_get_label(handle, std::ptr::null_mut(), 0), 5);
            assert_eq!(menu_get_label(handle, std::ptr::null_mut(), 2), 5);

            let mut buf = [0u8; 6];
            assert_eq!(menu_get_label(handle, buf.as_mut_ptr(), 6), 5);
            assert_eq!(&buf, b"Fruit\0");
        });
    }
}
